//! Synthetic gauge photo for exercising the upload endpoint without a camera

use std::convert::Infallible;

use embedded_graphics::mono_font::ascii::FONT_10X20;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};

use crate::error::{HarnessError, Result};

pub const DUMMY_WIDTH: u32 = 640;
pub const DUMMY_HEIGHT: u32 = 480;
pub const DUMMY_TEXT: &str = "Test Image";
pub const JPEG_QUALITY: u8 = 90;

/// Name every upload is sent under
pub const UPLOAD_FILE_NAME: &str = "test-image.jpg";

const BACKGROUND: Rgb<u8> = Rgb([0x4a, 0x55, 0x68]);

/// Encoded image ready to upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlob {
    pub media_type: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// `DrawTarget` over an in-memory RGB buffer
struct Canvas(RgbImage);

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.0.width(), self.0.height())
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> std::result::Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (width, height) = self.0.dimensions();
        for Pixel(point, color) in pixels {
            // Glyphs may overhang the canvas edge
            let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            if x < width && y < height {
                self.0
                    .put_pixel(x, y, Rgb([color.r(), color.g(), color.b()]));
            }
        }
        Ok(())
    }
}

/// Draw the 640x480 test card and encode it as JPEG
pub fn create_dummy_image() -> Result<ImageBlob> {
    let mut canvas = Canvas(RgbImage::from_pixel(DUMMY_WIDTH, DUMMY_HEIGHT, BACKGROUND));

    let style = MonoTextStyle::new(&FONT_10X20, Rgb888::WHITE);
    let Ok(_) = Text::with_baseline(DUMMY_TEXT, Point::new(250, 240), style, Baseline::Alphabetic)
        .draw(&mut canvas);

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY)
        .encode_image(&canvas.0)
        .map_err(|e| HarnessError::Image(e.to_string()))?;

    tracing::debug!("Created dummy image ({} bytes)", bytes.len());
    Ok(ImageBlob {
        media_type: "image/jpeg".to_string(),
        file_name: UPLOAD_FILE_NAME.to_string(),
        bytes,
    })
}
