//! Content sniffing from magic bytes.

use image::{ImageFormat, ImageReader};
use std::io::Cursor;

/// What the leading bytes of a payload say it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SniffedImage {
    pub format: ImageFormat,
    pub content_type: &'static str,
    pub extension: &'static str,
    /// Width and height, when the header could be read.
    pub dimensions: Option<(u32, u32)>,
}

/// Identify an image by its magic bytes. `None` for anything that is not a
/// recognised image format.
pub fn sniff(data: &[u8]) -> Option<SniffedImage> {
    let format = image::guess_format(data).ok()?;
    let extension = format.extensions_str().first().copied().unwrap_or("img");
    // Only the header is parsed; pixel data is never decoded here.
    let dimensions = ImageReader::with_format(Cursor::new(data), format)
        .into_dimensions()
        .ok();

    Some(SniffedImage {
        format,
        content_type: format.to_mime_type(),
        extension,
        dimensions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn encode(format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        let mut cursor = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut cursor, format)
            .unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_sniff_png() {
        let sniffed = sniff(&encode(ImageFormat::Png, 3, 2)).unwrap();
        assert_eq!(sniffed.format, ImageFormat::Png);
        assert_eq!(sniffed.content_type, "image/png");
        assert_eq!(sniffed.extension, "png");
        assert_eq!(sniffed.dimensions, Some((3, 2)));
    }

    #[test]
    fn test_sniff_gif() {
        let sniffed = sniff(&encode(ImageFormat::Gif, 4, 4)).unwrap();
        assert_eq!(sniffed.content_type, "image/gif");
        assert_eq!(sniffed.extension, "gif");
    }

    #[test]
    fn test_sniff_truncated_image_keeps_type() {
        let png = encode(ImageFormat::Png, 3, 2);
        let sniffed = sniff(&png[..12]).unwrap();
        assert_eq!(sniffed.content_type, "image/png");
        assert_eq!(sniffed.dimensions, None);
    }

    #[test]
    fn test_sniff_rejects_text() {
        assert!(sniff(b"hello").is_none());
        assert!(sniff(b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>").is_none());
    }
}
