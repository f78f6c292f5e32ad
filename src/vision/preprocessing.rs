// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for YOLO models

use image::{imageops::FilterType, DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Default square input edge for exported YOLO models
pub const YOLO_INPUT_SIZE: u32 = 640;

/// Letterbox padding colour used at export time
const PAD_VALUE: u8 = 114;

/// Geometry of a letterbox resize, for mapping boxes back to the source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    pub source_width: u32,
    pub source_height: u32,
}

impl Letterbox {
    /// Map a point in model-input space back to source pixels, clamped to the image
    pub fn to_source(&self, x: f32, y: f32) -> (f32, f32) {
        let sx = (x - self.pad_x) / self.scale;
        let sy = (y - self.pad_y) / self.scale;
        (
            sx.clamp(0.0, self.source_width as f32),
            sy.clamp(0.0, self.source_height as f32),
        )
    }
}

/// Resize preserving aspect ratio, centred on a grey `target_size` square
pub fn letterbox(image: &DynamicImage, target_size: u32) -> (RgbImage, Letterbox) {
    let (orig_w, orig_h) = image.dimensions();

    if orig_w == 0 || orig_h == 0 {
        let canvas = RgbImage::from_pixel(target_size, target_size, Rgb([PAD_VALUE; 3]));
        let geometry = Letterbox {
            scale: 1.0,
            pad_x: 0.0,
            pad_y: 0.0,
            source_width: orig_w,
            source_height: orig_h,
        };
        return (canvas, geometry);
    }

    let scale = (target_size as f32 / orig_w as f32).min(target_size as f32 / orig_h as f32);
    let new_w = ((orig_w as f32 * scale).round() as u32).clamp(1, target_size);
    let new_h = ((orig_h as f32 * scale).round() as u32).clamp(1, target_size);

    let resized = image.resize_exact(new_w, new_h, FilterType::Triangle).to_rgb8();

    let offset_x = (target_size - new_w) / 2;
    let offset_y = (target_size - new_h) / 2;

    let mut canvas = RgbImage::from_pixel(target_size, target_size, Rgb([PAD_VALUE; 3]));
    image::imageops::replace(&mut canvas, &resized, offset_x as i64, offset_y as i64);

    let geometry = Letterbox {
        scale,
        pad_x: offset_x as f32,
        pad_y: offset_y as f32,
        source_width: orig_w,
        source_height: orig_h,
    };

    (canvas, geometry)
}

/// Letterbox to `target_size` and build a `[1, 3, H, W]` tensor scaled to 0..1
pub fn preprocess_for_detection(image: &DynamicImage, target_size: u32) -> (Array4<f32>, Letterbox) {
    let (canvas, geometry) = letterbox(image, target_size);
    (to_nchw(&canvas), geometry)
}

/// Stretch to `target_size` square and build a `[1, 3, H, W]` tensor scaled to 0..1
pub fn preprocess_for_classification(image: &DynamicImage, target_size: u32) -> Array4<f32> {
    let resized = image
        .resize_exact(target_size, target_size, FilterType::Triangle)
        .to_rgb8();
    to_nchw(&resized)
}

fn to_nchw(rgb: &RgbImage) -> Array4<f32> {
    let (width, height) = rgb.dimensions();
    let mut tensor = Array4::zeros((1, 3, height as usize, width as usize));

    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }

    tensor
}
