//! Error metadata contract
//!
//! Library errors stay strongly typed (`thiserror` enums in each crate). Hosts such as an
//! HTTP layer or the CLI translate them through [`ErrorMetadata`] instead of matching on
//! every variant themselves.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like rejected uploads
    Debug,
    /// Warning level - for recoverable issues like resource limits
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code a web host should return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "DECODE_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether the caller may retry the same request later
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}
