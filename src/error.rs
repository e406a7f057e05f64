//! Unified error types for magic-run.

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    /// No usable model/url after checking the config file and environment.
    /// Displays the sample-config help text.
    Missing,
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Missing => write!(f, "{}", crate::config::SAMPLE_CONFIG_HELP),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Errors from the Ollama HTTP layer.
#[derive(Debug)]
pub enum ApiError {
    /// Network / reqwest-level error.
    Http(reqwest::Error),
    /// Non-2xx status from the API.
    Status(u16, String),
    /// The stream produced a payload we couldn't parse.
    InvalidResponse(String),
}

impl ApiError {
    /// Status code for HTTP-level failures, when one is known.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Status(code, _) => Some(*code),
            Self::InvalidResponse(_) => None,
        }
    }

    /// True when the failure looks like "no server listening at the URL".
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_connect() || e.is_timeout())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "http: {e}"),
            Self::Status(code, body) => write!(f, "status {code}: {body}"),
            Self::InvalidResponse(msg) => write!(f, "invalid response: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

// ---------------------------------------------------------------------------
// TerminalError
// ---------------------------------------------------------------------------

/// Errors from the interactive terminal layer.
///
/// All variants degrade to a cancelled review rather than aborting the
/// process; a broken terminal session must never execute an unreviewed
/// command.
#[derive(Debug)]
pub enum TerminalError {
    /// `/dev/tty` could not be opened (no controlling terminal).
    Unavailable(std::io::Error),
    /// I/O failure mid-read on the terminal device.
    ReadFailed(std::io::Error),
    /// Write to the terminal device failed.
    WriteFailed(std::io::Error),
    /// Raw-mode entry failed (termios get/set).
    RawModeFailed(nix::errno::Errno),
}

impl fmt::Display for TerminalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(e) => write!(f, "cannot open /dev/tty: {e}"),
            Self::ReadFailed(e) => write!(f, "terminal read failed: {e}"),
            Self::WriteFailed(e) => write!(f, "terminal write failed: {e}"),
            Self::RawModeFailed(e) => write!(f, "cannot enter raw mode: {e}"),
        }
    }
}

impl std::error::Error for TerminalError {}

// ---------------------------------------------------------------------------
// MagicError — top-level
// ---------------------------------------------------------------------------

/// Top-level error type for the binary.
#[derive(Debug)]
pub enum MagicError {
    Config(ConfigError),
    Api(ApiError),
    Terminal(TerminalError),
    /// The model stream ended without producing any content.
    EmptyGeneration,
}

impl fmt::Display for MagicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Api(e) => write!(f, "api: {e}"),
            Self::Terminal(e) => write!(f, "terminal: {e}"),
            Self::EmptyGeneration => write!(f, "model produced no command"),
        }
    }
}

impl std::error::Error for MagicError {}

impl From<ConfigError> for MagicError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ApiError> for MagicError {
    fn from(e: ApiError) -> Self {
        Self::Api(e)
    }
}

impl From<TerminalError> for MagicError {
    fn from(e: TerminalError) -> Self {
        Self::Terminal(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let e = ConfigError::from(io_err);
        let s = e.to_string();
        assert!(s.starts_with("io:"), "got: {s}");
        assert!(s.contains("file not found"));
    }

    #[test]
    fn config_error_from_toml() {
        let toml_err: toml::de::Error = toml::from_str::<toml::Value>("x = [unclosed").unwrap_err();
        let e = ConfigError::from(toml_err);
        assert!(e.to_string().starts_with("toml:"));
    }

    #[test]
    fn config_error_missing_shows_sample_config() {
        let s = ConfigError::Missing.to_string();
        assert!(s.contains("~/.config/magic/config.toml"), "got: {s}");
        assert!(s.contains("MAGIC_MODEL"));
        assert!(s.contains("MAGIC_OLLAMA_URL"));
    }

    #[test]
    fn api_error_status_display_and_code() {
        let e = ApiError::Status(404, "model not found".into());
        assert_eq!(e.to_string(), "status 404: model not found");
        assert_eq!(e.status_code(), Some(404));
    }

    #[test]
    fn api_error_invalid_response_has_no_code() {
        let e = ApiError::InvalidResponse("truncated line".into());
        assert_eq!(e.status_code(), None);
        assert!(e.to_string().contains("truncated line"));
    }

    #[test]
    fn terminal_error_display_variants() {
        let open = TerminalError::Unavailable(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such device",
        ));
        assert!(open.to_string().starts_with("cannot open /dev/tty:"));

        let read =
            TerminalError::ReadFailed(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof"));
        assert!(read.to_string().starts_with("terminal read failed:"));
    }

    #[test]
    fn magic_error_wraps_config_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let e = MagicError::from(ConfigError::from(io_err));
        assert!(e.to_string().starts_with("config:"), "got: {e}");
    }

    #[test]
    fn magic_error_empty_generation_display() {
        assert_eq!(
            MagicError::EmptyGeneration.to_string(),
            "model produced no command"
        );
    }
}
