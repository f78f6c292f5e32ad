// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection overlays for client display

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::io::Cursor;

use super::detector::BoundingBox;
use super::image_utils::ImageError;
use crate::taxonomy::SignCategory;

/// Outline thickness in pixels
const OUTLINE_PX: u32 = 3;

fn category_color(category: SignCategory) -> Rgb<u8> {
    match category {
        SignCategory::Regulatory => Rgb([220, 38, 38]),
        SignCategory::Warning => Rgb([234, 179, 8]),
        SignCategory::Guide => Rgb([37, 99, 235]),
        SignCategory::Construction => Rgb([234, 88, 12]),
        SignCategory::Unknown => Rgb([148, 163, 184]),
    }
}

/// Draw box outlines, coloured by category, onto a copy of `image`
pub fn draw_boxes(image: &DynamicImage, boxes: &[(BoundingBox, SignCategory)]) -> RgbImage {
    let mut canvas = image.to_rgb8();
    let (img_w, img_h) = canvas.dimensions();

    for (bbox, category) in boxes {
        let color = category_color(*category);

        let x1 = bbox.x1.max(0.0).min(img_w as f32);
        let y1 = bbox.y1.max(0.0).min(img_h as f32);
        let x2 = bbox.x2.max(0.0).min(img_w as f32);
        let y2 = bbox.y2.max(0.0).min(img_h as f32);

        let width = (x2 - x1).round() as u32;
        let height = (y2 - y1).round() as u32;
        if width == 0 || height == 0 {
            continue;
        }

        for inset in 0..OUTLINE_PX {
            let w = width.saturating_sub(inset * 2);
            let h = height.saturating_sub(inset * 2);
            if w == 0 || h == 0 {
                break;
            }
            let rect = Rect::at(x1 as i32 + inset as i32, y1 as i32 + inset as i32).of_size(w, h);
            draw_hollow_rect_mut(&mut canvas, rect, color);
        }
    }

    canvas
}

/// Encode an RGB image as a `data:image/jpeg;base64,...` URL
pub fn to_jpeg_data_url(image: &RgbImage) -> Result<String, ImageError> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image.clone())
        .write_to(&mut buf, ImageFormat::Jpeg)
        .map_err(|e| ImageError::EncodeFailed(e.to_string()))?;

    Ok(format!(
        "data:image/jpeg;base64,{}",
        STANDARD.encode(buf.into_inner())
    ))
}

/// Draw detections and return the result as a JPEG data URL
pub fn annotate_detections(
    image: &DynamicImage,
    boxes: &[(BoundingBox, SignCategory)],
) -> Result<String, ImageError> {
    to_jpeg_data_url(&draw_boxes(image, boxes))
}
