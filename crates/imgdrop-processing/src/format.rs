//! Format resolution
//!
//! Maps a claimed format token ("jpg", "png", "gif") to the decoder that validates it,
//! and extracts extension tokens from file names.
//!
//! Lookups are exact string matches: "JPG" and " jpg" are not "jpg". Callers that want
//! case-insensitive tokens must normalize before resolving.

use image::{DynamicImage, ImageFormat, ImageResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};
use thiserror::Error;

/// Tokens registered in the default registry.
pub const DEFAULT_FORMATS: [&str; 3] = ["jpg", "png", "gif"];

/// Tokens that [`FormatRegistryBuilder::builtin`] knows how to decode.
pub const BUILTIN_FORMATS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

static DEFAULT_REGISTRY: LazyLock<Arc<FormatRegistry>> =
    LazyLock::new(|| Arc::new(FormatRegistry::builtin_defaults()));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("Unsupported format: {0}")]
    Unsupported(String),

    #[error("Unknown built-in format: {0} (known: {known:?})", known = BUILTIN_FORMATS)]
    UnknownBuiltin(String),
}

type DecodeFn = dyn Fn(&[u8]) -> ImageResult<DynamicImage> + Send + Sync;

/// A named decode function.
#[derive(Clone)]
pub struct Decoder {
    name: String,
    decode: Arc<DecodeFn>,
}

impl Decoder {
    /// Decoder backed by the `image` crate for a single format. Content in any other
    /// format fails to decode, which is what rejects mislabeled uploads.
    pub fn for_format(format: ImageFormat) -> Self {
        Self {
            name: format!("{:?}", format).to_lowercase(),
            decode: Arc::new(move |data| image::load_from_memory_with_format(data, format)),
        }
    }

    pub fn custom<F>(name: impl Into<String>, decode: F) -> Self
    where
        F: Fn(&[u8]) -> ImageResult<DynamicImage> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            decode: Arc::new(decode),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn decode(&self, data: &[u8]) -> ImageResult<DynamicImage> {
        (self.decode)(data)
    }
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder").field("name", &self.name).finish()
    }
}

fn builtin_format(token: &str) -> Option<ImageFormat> {
    match token {
        "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
        "png" => Some(ImageFormat::Png),
        "gif" => Some(ImageFormat::Gif),
        "webp" => Some(ImageFormat::WebP),
        _ => None,
    }
}

/// Immutable token -> decoder table.
#[derive(Clone, Debug, Default)]
pub struct FormatRegistry {
    decoders: HashMap<String, Decoder>,
}

impl FormatRegistry {
    pub fn builder() -> FormatRegistryBuilder {
        FormatRegistryBuilder::default()
    }

    /// The process-wide default registry (`jpg`, `png`, `gif`), built on first use.
    pub fn global() -> Arc<FormatRegistry> {
        Arc::clone(&DEFAULT_REGISTRY)
    }

    /// Registry restricted to the given built-in tokens, e.g. from configuration.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self, FormatError> {
        tokens
            .iter()
            .try_fold(Self::builder(), |builder, token| builder.builtin(token.as_ref()))
            .map(FormatRegistryBuilder::build)
    }

    fn builtin_defaults() -> Self {
        let decoders = DEFAULT_FORMATS
            .iter()
            .filter_map(|token| {
                builtin_format(token).map(|format| (token.to_string(), Decoder::for_format(format)))
            })
            .collect();
        Self { decoders }
    }

    pub fn resolve(&self, token: &str) -> Result<&Decoder, FormatError> {
        self.decoders
            .get(token)
            .ok_or_else(|| FormatError::Unsupported(token.to_string()))
    }

    pub fn contains(&self, token: &str) -> bool {
        self.decoders.contains_key(token)
    }

    /// Registered tokens, sorted.
    pub fn tokens(&self) -> Vec<&str> {
        let mut tokens: Vec<&str> = self.decoders.keys().map(String::as_str).collect();
        tokens.sort_unstable();
        tokens
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

#[derive(Default)]
pub struct FormatRegistryBuilder {
    decoders: HashMap<String, Decoder>,
}

impl FormatRegistryBuilder {
    /// Register one of [`BUILTIN_FORMATS`] under its own name.
    pub fn builtin(self, token: &str) -> Result<Self, FormatError> {
        let format =
            builtin_format(token).ok_or_else(|| FormatError::UnknownBuiltin(token.to_string()))?;
        Ok(self.register(token, Decoder::for_format(format)))
    }

    /// Register (or replace) the decoder for `token`.
    pub fn register(mut self, token: impl Into<String>, decoder: Decoder) -> Self {
        self.decoders.insert(token.into(), decoder);
        self
    }

    pub fn build(self) -> FormatRegistry {
        FormatRegistry {
            decoders: self.decoders,
        }
    }
}

/// Look up `token` in the default registry.
pub fn resolve(token: &str) -> Result<&'static Decoder, FormatError> {
    DEFAULT_REGISTRY.resolve(token)
}

/// The substring after the last `.` of `filename`.
///
/// A name without a dot is returned whole, so "imgjpg" yields "imgjpg". Callers must not
/// assume the result is a real extension.
pub fn extension_of(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(idx) => &filename[idx + 1..],
        None => filename,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        let cases = [
            ("img.jpg", "jpg"),
            ("imgjpg", "imgjpg"),
            ("img.gif.jpg", "jpg"),
            ("photo.JPG", "JPG"),
            ("trailing.", ""),
            ("", ""),
        ];

        for (input, expected) in cases {
            assert_eq!(extension_of(input), expected, "input: {input:?}");
        }
    }

    #[test]
    fn test_default_registry_formats() {
        let registry = FormatRegistry::global();
        assert_eq!(registry.tokens(), vec!["gif", "jpg", "png"]);

        assert_eq!(resolve("jpg").unwrap().name(), "jpeg");
        assert_eq!(resolve("png").unwrap().name(), "png");
        assert_eq!(resolve("gif").unwrap().name(), "gif");
    }

    #[test]
    fn test_resolve_is_exact_match() {
        assert_eq!(
            resolve("unknown").unwrap_err(),
            FormatError::Unsupported("unknown".to_string())
        );
        assert!(resolve("JPG").is_err());
        assert!(resolve(" jpg").is_err());
        assert!(resolve("jpeg").is_err());
        assert!(resolve("").is_err());
    }

    #[test]
    fn test_global_registry_is_shared() {
        assert!(Arc::ptr_eq(&FormatRegistry::global(), &FormatRegistry::global()));
    }

    #[test]
    fn test_from_tokens() {
        let registry = FormatRegistry::from_tokens(&["jpeg", "webp"]).unwrap();
        assert_eq!(registry.tokens(), vec!["jpeg", "webp"]);
        assert!(!registry.contains("jpg"));

        let err = FormatRegistry::from_tokens(&["png", "tiff"]).unwrap_err();
        assert_eq!(err, FormatError::UnknownBuiltin("tiff".to_string()));
    }

    #[test]
    fn test_register_custom_decoder() {
        let registry = FormatRegistry::builder()
            .register(
                "bmp",
                Decoder::custom("bmp", |data| {
                    image::load_from_memory_with_format(data, ImageFormat::Bmp)
                }),
            )
            .build();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve("bmp").unwrap().name(), "bmp");
        assert!(registry.resolve("bmp").unwrap().decode(b"nop").is_err());
    }

    #[test]
    fn test_empty_registry() {
        let registry = FormatRegistry::builder().build();
        assert!(registry.is_empty());
        assert!(registry.resolve("jpg").is_err());
    }
}
