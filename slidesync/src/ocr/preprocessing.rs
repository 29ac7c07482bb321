use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage, Luma};

/// Target dimensions when `width x height` exceeds `max_dim` on either side.
///
/// The larger side becomes `max_dim`; the other side is
/// `round(other * max_dim / larger)`, never below 1. Returns `None` when the
/// image already fits.
pub fn scaled_dimensions(width: u32, height: u32, max_dim: u32) -> Option<(u32, u32)> {
    if width <= max_dim && height <= max_dim {
        return None;
    }

    let scale = |other: u32, larger: u32| -> u32 {
        let scaled = (f64::from(other) * f64::from(max_dim) / f64::from(larger)).round();
        (scaled as u32).max(1)
    };

    if width >= height {
        Some((max_dim, scale(height, width)))
    } else {
        Some((scale(width, height), max_dim))
    }
}

/// Downscale an image so neither side exceeds `max_dim`, keeping aspect ratio.
///
/// Uses Lanczos3 filter for high-quality downscaling
pub fn resize_to_cap(img: &DynamicImage, max_dim: u32) -> DynamicImage {
    let (width, height) = img.dimensions();

    match scaled_dimensions(width, height, max_dim) {
        Some((new_width, new_height)) => {
            img.resize_exact(new_width, new_height, FilterType::Lanczos3)
        }
        None => img.clone(),
    }
}

/// Collapse any pixel layout to a single luminance channel.
///
/// Grayscale input is taken as-is (alpha dropped); colour input goes through
/// the usual luma weighting.
fn to_single_channel(img: &DynamicImage) -> GrayImage {
    match img {
        DynamicImage::ImageLuma8(gray) => gray.clone(),
        DynamicImage::ImageLumaA8(luma_a) => {
            GrayImage::from_fn(luma_a.width(), luma_a.height(), |x, y| {
                Luma([luma_a.get_pixel(x, y)[0]])
            })
        }
        other => other.to_luma8(),
    }
}

/// Global threshold chosen by Otsu's method.
///
/// Picks the level that maximizes between-class variance (equivalently,
/// minimizes intra-class variance) over the 256-bin histogram. Pixels
/// `<= threshold` form the dark class. A uniform image yields 0.
pub fn otsu_threshold(gray: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for pixel in gray.pixels() {
        histogram[pixel[0] as usize] += 1;
    }

    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return 0;
    }

    let sum_all: f64 = histogram
        .iter()
        .enumerate()
        .map(|(level, &count)| level as f64 * count as f64)
        .sum();

    let mut weight_dark = 0u64;
    let mut sum_dark = 0.0f64;
    let mut best_variance = 0.0f64;
    let mut threshold = 0u8;

    for (level, &count) in histogram.iter().enumerate() {
        weight_dark += count;
        if weight_dark == 0 {
            continue;
        }
        let weight_light = total - weight_dark;
        if weight_light == 0 {
            break;
        }

        sum_dark += level as f64 * count as f64;
        let mean_dark = sum_dark / weight_dark as f64;
        let mean_light = (sum_all - sum_dark) / weight_light as f64;
        let between =
            weight_dark as f64 * weight_light as f64 * (mean_dark - mean_light).powi(2);

        if between > best_variance {
            best_variance = between;
            threshold = level as u8;
        }
    }

    threshold
}

/// Two-level output: `> threshold` becomes 255, everything else 0.
pub fn binarize(gray: &GrayImage, threshold: u8) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y)[0] > threshold {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Prepare an image for text extraction.
///
/// Applies the following transformations to a copy of `img`:
/// 1. Resizes when either side exceeds `max_dim` (aspect ratio kept)
/// 2. Converts to a single channel
/// 3. Binarizes with an Otsu threshold
///
/// # Arguments
/// * `img` - Decoded image, colour or grayscale
/// * `max_dim` - Resolution cap for the longer side
///
/// # Returns
/// Binary grayscale image (every pixel is 0 or 255)
pub fn normalize(img: &DynamicImage, max_dim: u32) -> GrayImage {
    let (width, height) = img.dimensions();

    let gray = match scaled_dimensions(width, height, max_dim) {
        Some((new_width, new_height)) => {
            to_single_channel(&img.resize_exact(new_width, new_height, FilterType::Lanczos3))
        }
        None => to_single_channel(img),
    };

    let threshold = otsu_threshold(&gray);
    tracing::debug!(
        width = gray.width(),
        height = gray.height(),
        threshold,
        "Normalized image for OCR"
    );

    binarize(&gray, threshold)
}
