//! Pre-classification image enhancement
//!
//! Pretrained emotion models are sensitive to lighting and sensor noise,
//! so frames get a brightness/contrast lift and an edge-preserving
//! bilateral smoothing pass before inference. The whole pass is a pure,
//! deterministic function of its input.

use image::{Rgb, RgbImage};

use crate::constants::{
    BILATERAL_RADIUS, BILATERAL_SIGMA_COLOR, BILATERAL_SIGMA_SPACE, BRIGHTNESS_FACTOR,
    CONTRAST_FACTOR,
};

/// Apply the full enhancement pass: brightness x1.2, contrast x1.3, then
/// bilateral smoothing. Output has the same dimensions as the input.
pub fn enhance_image(img: &RgbImage) -> RgbImage {
    let adjusted = adjust_brightness_contrast(img);
    bilateral_filter(
        &adjusted,
        BILATERAL_RADIUS,
        BILATERAL_SIGMA_COLOR,
        BILATERAL_SIGMA_SPACE,
    )
}

/// Scale brightness, then stretch contrast around the mean luminance.
///
/// Contrast uses the mean-luminance blend (out = mean + factor * (p - mean))
/// so uniform images are unaffected by the contrast step.
fn adjust_brightness_contrast(img: &RgbImage) -> RgbImage {
    // Mean luminance of the brightened image, ITU-R 601 weights
    let mut luma_sum = 0f64;
    for p in img.pixels() {
        let r = (p.0[0] as f32 * BRIGHTNESS_FACTOR).min(255.0);
        let g = (p.0[1] as f32 * BRIGHTNESS_FACTOR).min(255.0);
        let b = (p.0[2] as f32 * BRIGHTNESS_FACTOR).min(255.0);
        luma_sum += (r * 0.299 + g * 0.587 + b * 0.114) as f64;
    }
    let pixel_count = (img.width() * img.height()).max(1);
    let mean = (luma_sum / pixel_count as f64) as f32;

    let mut output = RgbImage::new(img.width(), img.height());
    for (x, y, p) in img.enumerate_pixels() {
        let mut channels = [0u8; 3];
        for (i, c) in p.0.iter().enumerate() {
            let brightened = (*c as f32 * BRIGHTNESS_FACTOR).min(255.0);
            let contrasted = mean + CONTRAST_FACTOR * (brightened - mean);
            channels[i] = contrasted.round().clamp(0.0, 255.0) as u8;
        }
        output.put_pixel(x, y, Rgb(channels));
    }
    output
}

/// Edge-preserving bilateral smoothing over an RGB image.
///
/// Each output pixel is a weighted average of its spatial neighborhood
/// where the weight combines spatial distance and color similarity, so
/// flat regions smooth out while strong edges survive.
fn bilateral_filter(img: &RgbImage, radius: u32, sigma_color: f32, sigma_space: f32) -> RgbImage {
    let (w, h) = (img.width(), img.height());
    let mut output = RgbImage::new(w, h);
    let color_sq_2 = 2.0 * sigma_color * sigma_color;
    let space_sq_2 = 2.0 * sigma_space * sigma_space;

    for y in 0..h {
        for x in 0..w {
            let center = img.get_pixel(x, y);
            let center_r = center.0[0] as f32;
            let center_g = center.0[1] as f32;
            let center_b = center.0[2] as f32;

            let mut sum = [0f32; 3];
            let mut weight_sum = 0f32;

            let y_start = y.saturating_sub(radius);
            let y_end = (y + radius + 1).min(h);
            let x_start = x.saturating_sub(radius);
            let x_end = (x + radius + 1).min(w);

            for ny in y_start..y_end {
                for nx in x_start..x_end {
                    let neighbor = img.get_pixel(nx, ny);
                    let nr = neighbor.0[0] as f32;
                    let ng = neighbor.0[1] as f32;
                    let nb = neighbor.0[2] as f32;

                    let diff_r = nr - center_r;
                    let diff_g = ng - center_g;
                    let diff_b = nb - center_b;
                    let color_dist_sq = diff_r * diff_r + diff_g * diff_g + diff_b * diff_b;

                    let dx = nx as f32 - x as f32;
                    let dy = ny as f32 - y as f32;
                    let space_dist_sq = dx * dx + dy * dy;

                    let weight =
                        (-color_dist_sq / color_sq_2).exp() * (-space_dist_sq / space_sq_2).exp();

                    sum[0] += nr * weight;
                    sum[1] += ng * weight;
                    sum[2] += nb * weight;
                    weight_sum += weight;
                }
            }

            if weight_sum > 0.0 {
                output.put_pixel(
                    x,
                    y,
                    Rgb([
                        (sum[0] / weight_sum).round().clamp(0.0, 255.0) as u8,
                        (sum[1] / weight_sum).round().clamp(0.0, 255.0) as u8,
                        (sum[2] / weight_sum).round().clamp(0.0, 255.0) as u8,
                    ]),
                );
            } else {
                output.put_pixel(x, y, *center);
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_image(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| {
            Rgb([(x * 17 % 256) as u8, (y * 31 % 256) as u8, ((x + y) % 256) as u8])
        })
    }

    #[test]
    fn test_preserves_dimensions() {
        let img = gradient_image(13, 7);
        let out = enhance_image(&img);
        assert_eq!(out.dimensions(), (13, 7));
    }

    #[test]
    fn test_deterministic() {
        let img = gradient_image(16, 16);
        assert_eq!(enhance_image(&img), enhance_image(&img));
    }

    #[test]
    fn test_brightens_dark_images() {
        let img = RgbImage::from_pixel(8, 8, Rgb([100, 100, 100]));
        let out = enhance_image(&img);
        // Uniform image: contrast and smoothing are identity, only the
        // brightness scale applies (100 * 1.2 = 120).
        assert_eq!(out.get_pixel(4, 4), &Rgb([120, 120, 120]));
    }

    #[test]
    fn test_white_saturates_instead_of_wrapping() {
        let img = RgbImage::from_pixel(4, 4, Rgb([255, 255, 255]));
        let out = enhance_image(&img);
        assert_eq!(out.get_pixel(0, 0), &Rgb([255, 255, 255]));
    }
}
