use std::fmt;

use image::{imageops, GrayImage};

/// Images with more pixels than this are split into quadrants before
/// extraction, keeping each vision request within payload limits.
pub const SPLIT_PIXEL_THRESHOLD: u64 = 1_000_000;

/// Position of a chunk inside the source image. The discriminant is the
/// processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Quadrant {
    TopLeft = 0,
    TopRight = 1,
    BottomLeft = 2,
    BottomRight = 3,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Quadrant::TopLeft => "top-left",
            Quadrant::TopRight => "top-right",
            Quadrant::BottomLeft => "bottom-left",
            Quadrant::BottomRight => "bottom-right",
        };
        f.write_str(name)
    }
}

/// Non-overlapping sub-region of a normalized image.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub quadrant: Quadrant,
    /// Offset of the chunk's top-left pixel in the source image.
    pub origin: (u32, u32),
    pub image: GrayImage,
}

pub fn should_split(width: u32, height: u32) -> bool {
    u64::from(width) * u64::from(height) > SPLIT_PIXEL_THRESHOLD
}

/// Cut `image` into four quadrants around `(width / 2, height / 2)`.
///
/// With odd dimensions the right column and bottom row go to the right and
/// bottom chunks. Chunks are returned in [`Quadrant::ALL`] order.
pub fn split_quadrants(image: &GrayImage) -> [Chunk; 4] {
    let (width, height) = image.dimensions();
    let w_mid = width / 2;
    let h_mid = height / 2;

    Quadrant::ALL.map(|quadrant| {
        let (x, w) = match quadrant {
            Quadrant::TopLeft | Quadrant::BottomLeft => (0, w_mid),
            Quadrant::TopRight | Quadrant::BottomRight => (w_mid, width - w_mid),
        };
        let (y, h) = match quadrant {
            Quadrant::TopLeft | Quadrant::TopRight => (0, h_mid),
            Quadrant::BottomLeft | Quadrant::BottomRight => (h_mid, height - h_mid),
        };

        Chunk {
            quadrant,
            origin: (x, y),
            image: imageops::crop_imm(image, x, y, w, h).to_image(),
        }
    })
}
