use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use lanshare_core::AppError;
use qrcode::{Color, QrCode};

/// Turns a download URL into an inline, scan-readable image.
pub trait LinkEncoder: Send + Sync {
    /// Returns a `data:` URL that can be used directly as an `<img>` source.
    fn encode(&self, url: &str) -> Result<String, AppError>;
}

/// Renders the URL as a QR code PNG.
#[derive(Debug, Clone, Copy)]
pub struct QrCodeEncoder {
    /// Pixels per QR module.
    module_px: u32,
    /// Light border, in modules.
    quiet_zone: u32,
}

impl QrCodeEncoder {
    pub fn new(module_px: u32, quiet_zone: u32) -> Self {
        Self {
            module_px: module_px.max(1),
            quiet_zone,
        }
    }

    fn render(&self, code: &QrCode) -> GrayImage {
        let width = code.width() as u32;
        let colors = code.to_colors();
        let side = (width + 2 * self.quiet_zone) * self.module_px;

        GrayImage::from_fn(side, side, |x, y| {
            let mx = (x / self.module_px).checked_sub(self.quiet_zone);
            let my = (y / self.module_px).checked_sub(self.quiet_zone);
            match (mx, my) {
                (Some(mx), Some(my)) if mx < width && my < width => {
                    match colors[(my * width + mx) as usize] {
                        Color::Dark => Luma([0u8]),
                        Color::Light => Luma([255u8]),
                    }
                }
                _ => Luma([255u8]),
            }
        })
    }
}

impl Default for QrCodeEncoder {
    fn default() -> Self {
        Self::new(8, 4)
    }
}

impl LinkEncoder for QrCodeEncoder {
    fn encode(&self, url: &str) -> Result<String, AppError> {
        let code = QrCode::new(url.as_bytes())
            .map_err(|e| AppError::Encoding(format!("QR encoding failed: {}", e)))?;

        let img = DynamicImage::ImageLuma8(self.render(&code));

        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);
        img.write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| AppError::Encoding(format!("PNG encoding failed: {}", e)))?;

        Ok(format!("data:image/png;base64,{}", STANDARD.encode(&buffer)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "data:image/png;base64,";

    fn decode(data_url: &str) -> DynamicImage {
        let payload = data_url.strip_prefix(PREFIX).unwrap();
        let bytes = STANDARD.decode(payload).unwrap();
        image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap()
    }

    #[test]
    fn encodes_url_as_png_data_url() {
        let encoder = QrCodeEncoder::default();
        let data_url = encoder
            .encode("http://192.168.1.20:3000/download/1700000000000_report.pdf")
            .unwrap();

        assert!(data_url.starts_with(PREFIX));
        let img = decode(&data_url);
        assert_eq!(img.width(), img.height());
        assert_eq!(img.width() % 8, 0);
    }

    #[test]
    fn quiet_zone_is_light() {
        let encoder = QrCodeEncoder::new(2, 4);
        let img = decode(&encoder.encode("http://localhost:3000/download/1_a.txt").unwrap())
            .to_luma8();

        assert_eq!(img.get_pixel(0, 0), &Luma([255u8]));
        assert_eq!(img.get_pixel(7, 7), &Luma([255u8]));
        // Top-left finder pattern starts right after the quiet zone.
        assert_eq!(img.get_pixel(8, 8), &Luma([0u8]));
    }

    #[test]
    fn encoding_is_deterministic() {
        let encoder = QrCodeEncoder::default();
        let url = "http://10.0.0.5:3000/download/1_a.txt";
        assert_eq!(encoder.encode(url).unwrap(), encoder.encode(url).unwrap());
    }

    #[test]
    fn oversized_payload_is_an_encoding_error() {
        let url = format!("http://10.0.0.5:3000/download/{}", "x".repeat(8000));
        let result = QrCodeEncoder::default().encode(&url);
        assert!(matches!(result, Err(AppError::Encoding(_))));
    }
}
