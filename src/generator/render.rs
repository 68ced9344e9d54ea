// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Card image rendering: QR code and card number composited onto a template.

use super::GenerateError;
use image::{imageops, Rgba, RgbaImage};
use qrcode::types::Color;
use qrcode::{EcLevel, QrCode};
use std::path::{Path, PathBuf};

/// Card text color, also used for the QR modules.
pub const DARK: Rgba<u8> = Rgba([0x34, 0x2b, 0x4a, 0xff]);
/// Card background color, also used for the card numbers.
pub const LIGHT: Rgba<u8> = Rgba([0xfc, 0xf6, 0xea, 0xff]);

/// Rendered QR code edge length in pixels.
pub const QR_SIZE: u32 = 400;
/// Quiet zone around the QR code, in modules.
pub const QR_MARGIN: usize = 1;
/// Top edge of the QR code on the card.
pub const QR_TOP: i64 = 850;

const GLYPH_WIDTH: i64 = 5;
const GLYPH_HEIGHT: i64 = 7;
/// Pixels per glyph cell; 7 rows at this scale is about an 80px font.
const GLYPH_SCALE: i64 = 10;

/// 5x7 digit bitmaps, one byte per row, high bit on the left.
static DIGITS: [[u8; 7]; 10] = [
    [0x0e, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0e],
    [0x04, 0x0c, 0x04, 0x04, 0x04, 0x04, 0x0e],
    [0x0e, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1f],
    [0x1f, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0e],
    [0x02, 0x06, 0x0a, 0x12, 0x1f, 0x02, 0x02],
    [0x1f, 0x10, 0x1e, 0x01, 0x01, 0x11, 0x0e],
    [0x06, 0x08, 0x10, 0x1e, 0x11, 0x11, 0x0e],
    [0x1f, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
    [0x0e, 0x11, 0x11, 0x0e, 0x11, 0x11, 0x0e],
    [0x0e, 0x11, 0x11, 0x0f, 0x01, 0x02, 0x0c],
];

/// Renders card images from a template.
#[derive(Debug, Clone)]
pub struct CardRenderer {
    template: RgbaImage,
}

impl CardRenderer {
    pub fn new(template: RgbaImage) -> Self {
        Self { template }
    }

    /// Load the template image from disk.
    pub fn from_path(path: &Path) -> Result<Self, GenerateError> {
        let template = image::open(path)?.to_rgba8();
        tracing::debug!(
            path = %path.display(),
            width = template.width(),
            height = template.height(),
            "Loaded card template"
        );
        Ok(Self::new(template))
    }

    /// Render one card: QR code centered horizontally at `QR_TOP`, card
    /// number in the top-left and bottom-right corners.
    pub fn render(&self, card_number: u32, url: &str) -> Result<RgbaImage, GenerateError> {
        let mut card = self.template.clone();
        let (width, height) = card.dimensions();

        let qr = qr_image(url)?;
        let qr_left = (i64::from(width) - i64::from(QR_SIZE)) / 2;
        imageops::overlay(&mut card, &qr, qr_left, QR_TOP);

        let text = card_number.to_string();
        draw_text(&mut card, &text, 120, 180);
        draw_text(
            &mut card,
            &text,
            i64::from(width) - 140,
            i64::from(height) - 150,
        );

        Ok(card)
    }

    /// Render a card and write it as `card-<n>.png` in `output_dir`.
    pub fn render_to_file(
        &self,
        card_number: u32,
        url: &str,
        output_dir: &Path,
    ) -> Result<PathBuf, GenerateError> {
        let card = self.render(card_number, url)?;
        let path = output_dir.join(card_file_name(card_number));
        card.save(&path)?;
        Ok(path)
    }
}

pub fn card_file_name(card_number: u32) -> String {
    format!("card-{}.png", card_number)
}

/// Encode `data` as a `QR_SIZE` square image with high error correction.
///
/// Modules are scaled to fill the square exactly, so module edges may fall
/// on fractional pixel boundaries.
pub fn qr_image(data: &str) -> Result<RgbaImage, GenerateError> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::H)?;
    let modules = code.width();
    let total = modules + 2 * QR_MARGIN;

    let img = RgbaImage::from_fn(QR_SIZE, QR_SIZE, |x, y| {
        let mx = (x as usize * total) / QR_SIZE as usize;
        let my = (y as usize * total) / QR_SIZE as usize;

        let inside = (QR_MARGIN..QR_MARGIN + modules).contains(&mx)
            && (QR_MARGIN..QR_MARGIN + modules).contains(&my);
        if inside && code[(mx - QR_MARGIN, my - QR_MARGIN)] == Color::Dark {
            DARK
        } else {
            LIGHT
        }
    });

    Ok(img)
}

/// Width in pixels of `text` drawn with the digit font.
fn text_width(text: &str) -> i64 {
    let n = text.chars().count() as i64;
    if n == 0 {
        return 0;
    }
    (n * (GLYPH_WIDTH + 1) - 1) * GLYPH_SCALE
}

/// Draw digits centered on `center_x` with their bottom edge on `baseline_y`.
/// Pixels outside the image are clipped; non-digits leave a gap.
pub fn draw_text(img: &mut RgbaImage, text: &str, center_x: i64, baseline_y: i64) {
    let left = center_x - text_width(text) / 2;
    let top = baseline_y - GLYPH_HEIGHT * GLYPH_SCALE;
    let (width, height) = (i64::from(img.width()), i64::from(img.height()));

    for (i, ch) in text.chars().enumerate() {
        let Some(glyph) = ch.to_digit(10).map(|d| &DIGITS[d as usize]) else {
            continue;
        };
        let glyph_left = left + i as i64 * (GLYPH_WIDTH + 1) * GLYPH_SCALE;

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (0x10 >> col) == 0 {
                    continue;
                }
                let x0 = glyph_left + col * GLYPH_SCALE;
                let y0 = top + row as i64 * GLYPH_SCALE;
                for y in y0.max(0)..(y0 + GLYPH_SCALE).min(height) {
                    for x in x0.max(0)..(x0 + GLYPH_SCALE).min(width) {
                        img.put_pixel(x as u32, y as u32, LIGHT);
                    }
                }
            }
        }
    }
}
