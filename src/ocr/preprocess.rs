//! Page image preprocessing before OCR.
//!
//! Scans are converted to grayscale, denoised with a median filter,
//! contrast-stretched, sharpened and optionally binarized. Each step can
//! be switched off through [`PreprocessOptions`].

use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::otsu_level;
use imageproc::filter::median_filter;

/// Options for page preprocessing.
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessOptions {
    /// Median filter radius in pixels (0 = no denoising)
    pub denoise_radius: u32,

    /// Percentage of darkest/brightest pixels clipped by auto-contrast
    /// (None = no auto-contrast)
    pub autocontrast_cutoff: Option<f32>,

    /// Extra contrast adjustment, as accepted by `image::imageops::contrast`
    pub contrast: f32,

    /// Unsharp mask `(sigma, threshold)` (None = no sharpening)
    pub sharpen: Option<(f32, i32)>,

    /// Apply Otsu binarization as the last step
    pub binarize: bool,
}

impl PreprocessOptions {
    /// Create preprocessing options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable binarization.
    pub fn with_binarize(mut self, binarize: bool) -> Self {
        self.binarize = binarize;
        self
    }

    /// Set the median filter radius.
    pub fn with_denoise_radius(mut self, radius: u32) -> Self {
        self.denoise_radius = radius;
        self
    }
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            denoise_radius: 1,
            autocontrast_cutoff: Some(1.0),
            contrast: 25.0,
            sharpen: Some((1.0, 2)),
            binarize: false,
        }
    }
}

/// Applies [`PreprocessOptions`] to page images.
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    options: PreprocessOptions,
}

impl Preprocessor {
    /// Create a preprocessor.
    pub fn new(options: PreprocessOptions) -> Self {
        Self { options }
    }

    /// Run the pipeline and return a grayscale image.
    pub fn process(&self, image: &DynamicImage) -> GrayImage {
        let mut gray = image.to_luma8();
        let (width, height) = gray.dimensions();

        if self.options.denoise_radius > 0 {
            gray = median_filter(&gray, self.options.denoise_radius, self.options.denoise_radius);
        }

        if let Some(cutoff) = self.options.autocontrast_cutoff {
            gray = autocontrast(&gray, cutoff);
        }

        if self.options.contrast != 0.0 {
            gray = image::imageops::contrast(&gray, self.options.contrast);
        }

        if let Some((sigma, threshold)) = self.options.sharpen {
            gray = image::imageops::unsharpen(&gray, sigma, threshold);
        }

        if self.options.binarize {
            let level = otsu_level(&gray);
            log::trace!("Otsu level {}", level);
            for pixel in gray.pixels_mut() {
                *pixel = if pixel.0[0] > level { Luma([255]) } else { Luma([0]) };
            }
        }

        log::debug!("Preprocessed {}x{} page image", width, height);
        gray
    }
}

/// Stretch intensities so that `cutoff` percent of pixels at each end of
/// the histogram saturate.
pub fn autocontrast(image: &GrayImage, cutoff: f32) -> GrayImage {
    let total = (image.width() as u64) * (image.height() as u64);
    if total == 0 {
        return image.clone();
    }

    let mut histogram = [0u64; 256];
    for pixel in image.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let clip = ((total as f64) * (cutoff.clamp(0.0, 49.0) as f64) / 100.0) as u64;
    let low = percentile_index(histogram.iter(), clip);
    let high = 255 - percentile_index(histogram.iter().rev(), clip);

    if high <= low {
        return image.clone();
    }

    let scale = 255.0 / (high - low) as f32;
    let mut output = image.clone();
    for pixel in output.pixels_mut() {
        let value = pixel.0[0].clamp(low, high);
        pixel.0[0] = ((value - low) as f32 * scale).round() as u8;
    }
    output
}

/// First histogram index where the running count exceeds `clip`.
fn percentile_index<'a>(bins: impl Iterator<Item = &'a u64>, clip: u64) -> u8 {
    let mut seen = 0u64;
    for (index, count) in bins.enumerate() {
        seen += count;
        if seen > clip {
            return index as u8;
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32, lo: u8, hi: u8) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| {
            let span = (hi - lo) as u32;
            Luma([lo + (x * span / (width - 1)) as u8])
        })
    }

    #[test]
    fn test_autocontrast_stretches_range() {
        let image = gradient(64, 4, 100, 150);
        let out = autocontrast(&image, 0.0);
        let min = out.pixels().map(|p| p.0[0]).min().unwrap();
        let max = out.pixels().map(|p| p.0[0]).max().unwrap();
        assert_eq!(min, 0);
        assert_eq!(max, 255);
    }

    #[test]
    fn test_autocontrast_flat_image_unchanged() {
        let image = GrayImage::from_pixel(8, 8, Luma([128]));
        assert_eq!(autocontrast(&image, 1.0), image);
    }

    #[test]
    fn test_process_keeps_dimensions() {
        let image = DynamicImage::ImageLuma8(gradient(32, 16, 20, 230));
        let out = Preprocessor::new(PreprocessOptions::default()).process(&image);
        assert_eq!(out.dimensions(), (32, 16));
    }

    #[test]
    fn test_binarize_outputs_two_levels() {
        let image = DynamicImage::ImageLuma8(gradient(32, 8, 0, 255));
        let options = PreprocessOptions::default().with_binarize(true);
        let out = Preprocessor::new(options).process(&image);
        assert!(out.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }
}
