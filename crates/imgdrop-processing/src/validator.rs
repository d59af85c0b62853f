use crate::format::Decoder;
use std::io::{self, Read};

/// Validation errors for uploaded image content
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large (max: {max} bytes)")]
    FileTooLarge { max: u64 },

    #[error("Failed to read upload: {0}")]
    Read(#[source] io::Error),

    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
}

/// Dimensions of a successfully decoded image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Image content validator
///
/// Reads an upload exactly once, enforcing the byte limit while reading, and confirms
/// the buffered bytes decode with the resolved decoder. The same buffer is what gets
/// persisted afterwards.
#[derive(Debug, Clone, Copy)]
pub struct ImageValidator {
    max_file_size: u64,
}

impl ImageValidator {
    /// `max_file_size` of 0 disables the limit.
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    /// Read the whole source into memory.
    ///
    /// With a limit set, at most `max_file_size + 1` bytes are pulled from the source, which
    /// is enough to tell "exactly at the limit" from "over it".
    pub fn read_source<R: Read>(&self, mut source: R) -> Result<Vec<u8>, ValidationError> {
        let mut data = Vec::new();

        if self.max_file_size == 0 {
            source
                .read_to_end(&mut data)
                .map_err(ValidationError::Read)?;
            return Ok(data);
        }

        source
            .take(self.max_file_size.saturating_add(1))
            .read_to_end(&mut data)
            .map_err(ValidationError::Read)?;

        if data.len() as u64 > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                max: self.max_file_size,
            });
        }

        Ok(data)
    }

    /// Fully decode `data`. Header sniffing alone is not enough: truncated and corrupt
    /// files must fail here.
    pub fn validate_decodes(
        &self,
        decoder: &Decoder,
        data: &[u8],
    ) -> Result<ImageDimensions, ValidationError> {
        let img = decoder.decode(data).map_err(ValidationError::Decode)?;
        Ok(ImageDimensions {
            width: img.width(),
            height: img.height(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn create_test_png() -> Vec<u8> {
        let img = RgbaImage::from_pixel(4, 3, Rgba([255, 0, 0, 255]));
        let mut cursor = Cursor::new(Vec::new());
        img.write_to(&mut cursor, ImageFormat::Png).unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_read_source_unlimited() {
        let validator = ImageValidator::new(0);
        let data = vec![7u8; 64 * 1024];

        let read = validator.read_source(Cursor::new(data.clone())).unwrap();
        assert_eq!(read, data);
    }

    #[test]
    fn test_read_source_exactly_at_limit() {
        let validator = ImageValidator::new(10);
        let read = validator.read_source(Cursor::new(vec![1u8; 10])).unwrap();
        assert_eq!(read.len(), 10);
    }

    #[test]
    fn test_read_source_one_byte_over_limit() {
        let validator = ImageValidator::new(10);
        let result = validator.read_source(Cursor::new(vec![1u8; 11]));
        assert!(matches!(result, Err(ValidationError::FileTooLarge { max: 10 })));
    }

    #[test]
    fn test_read_source_stops_after_limit() {
        let validator = ImageValidator::new(10);
        let mut cursor = Cursor::new(vec![1u8; 1000]);

        let result = validator.read_source(&mut cursor);
        assert!(result.is_err());
        assert_eq!(cursor.position(), 11);
    }

    #[test]
    fn test_validate_valid_image() {
        let validator = ImageValidator::new(0);
        let decoder = Decoder::for_format(ImageFormat::Png);

        let dims = validator
            .validate_decodes(&decoder, &create_test_png())
            .unwrap();
        assert_eq!(dims, ImageDimensions { width: 4, height: 3 });
    }

    #[test]
    fn test_validate_rejects_mislabeled_image() {
        let validator = ImageValidator::new(0);
        let decoder = Decoder::for_format(ImageFormat::Jpeg);

        let result = validator.validate_decodes(&decoder, &create_test_png());
        assert!(matches!(result, Err(ValidationError::Decode(_))));
    }

    #[test]
    fn test_validate_rejects_truncated_image() {
        let validator = ImageValidator::new(0);
        let decoder = Decoder::for_format(ImageFormat::Png);
        let png = create_test_png();

        let result = validator.validate_decodes(&decoder, &png[..png.len() / 2]);
        assert!(matches!(result, Err(ValidationError::Decode(_))));
    }

    #[test]
    fn test_validate_rejects_empty_input() {
        let validator = ImageValidator::new(0);
        for format in [ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::Gif] {
            let decoder = Decoder::for_format(format);
            assert!(validator.validate_decodes(&decoder, &[]).is_err());
        }
    }
}
