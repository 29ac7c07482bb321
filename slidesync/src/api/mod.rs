mod extractors;
mod middleware;
mod routes;
pub mod slides;
mod state;
pub mod v1;

pub use routes::create_router;
pub use state::AppState;
