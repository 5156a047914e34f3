use std::io::Cursor;

use image::{ImageFormat, ImageResult};
use ims_types::MimeType;
use serde::{Deserialize, Serialize};

/// Bounding box thumbnails are scaled into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailBounds {
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for ThumbnailBounds {
    fn default() -> Self {
        Self {
            max_width: 200,
            max_height: 300,
        }
    }
}

/// The decoder/encoder format for a page type, if it has one.
pub fn image_format(mime: MimeType) -> Option<ImageFormat> {
    match mime {
        MimeType::Png => Some(ImageFormat::Png),
        MimeType::Jpg => Some(ImageFormat::Jpeg),
        MimeType::Unknown => None,
    }
}

/// The type the bytes actually contain, judged by their magic number.
pub fn sniff(data: &[u8]) -> MimeType {
    match image::guess_format(data) {
        Ok(ImageFormat::Png) => MimeType::Png,
        Ok(ImageFormat::Jpeg) => MimeType::Jpg,
        _ => MimeType::Unknown,
    }
}

/// Check that `data` fully decodes as `format`.
pub fn verify(data: &[u8], format: ImageFormat) -> ImageResult<()> {
    image::load_from_memory_with_format(data, format).map(|_| ())
}

/// Scale `data` to fit `bounds`, preserving aspect ratio and format.
/// Images already inside the bounds are returned as-is.
pub fn render(data: &[u8], format: ImageFormat, bounds: ThumbnailBounds) -> ImageResult<Vec<u8>> {
    let img = image::load_from_memory_with_format(data, format)?;
    if img.width() <= bounds.max_width && img.height() <= bounds.max_height {
        return Ok(data.to_vec());
    }
    let thumb = img.thumbnail(bounds.max_width, bounds.max_height);
    let mut out = Cursor::new(Vec::new());
    thumb.write_to(&mut out, format)?;
    Ok(out.into_inner())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    pub(crate) fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([90, 20, 200])));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn sniffs_magic_numbers() {
        assert_eq!(sniff(&encoded(4, 4, ImageFormat::Png)), MimeType::Png);
        assert_eq!(sniff(&encoded(4, 4, ImageFormat::Jpeg)), MimeType::Jpg);
        assert_eq!(sniff(b"definitely not an image"), MimeType::Unknown);
        assert_eq!(sniff(&[]), MimeType::Unknown);
    }

    #[test]
    fn large_image_is_scaled_into_bounds() {
        let data = encoded(800, 600, ImageFormat::Png);
        let thumb = render(&data, ImageFormat::Png, ThumbnailBounds::default()).unwrap();
        let img = image::load_from_memory_with_format(&thumb, ImageFormat::Png).unwrap();
        assert!(img.width() <= 200 && img.height() <= 300);
        // 4:3 landscape is limited by width
        assert_eq!(img.width(), 200);
        assert_eq!(img.height(), 150);
    }

    #[test]
    fn jpeg_stays_jpeg() {
        let data = encoded(400, 900, ImageFormat::Jpeg);
        let thumb = render(&data, ImageFormat::Jpeg, ThumbnailBounds::default()).unwrap();
        assert_eq!(sniff(&thumb), MimeType::Jpg);
    }

    #[test]
    fn small_image_untouched() {
        let data = encoded(20, 30, ImageFormat::Png);
        assert_eq!(
            render(&data, ImageFormat::Png, ThumbnailBounds::default()).unwrap(),
            data
        );
    }

    #[test]
    fn verify_rejects_truncated_data() {
        let data = encoded(16, 16, ImageFormat::Png);
        assert!(verify(&data, ImageFormat::Png).is_ok());
        assert!(verify(&data[..data.len() / 2], ImageFormat::Png).is_err());
    }

    #[test]
    fn formats_follow_mime() {
        assert_eq!(image_format(MimeType::Png), Some(ImageFormat::Png));
        assert_eq!(image_format(MimeType::Jpg), Some(ImageFormat::Jpeg));
        assert_eq!(image_format(MimeType::Unknown), None);
    }
}
