//! Replies sent back to the host.

use serde::Serialize;

use glasskit_thumbnail::{ErrorCode, ThumbnailError};

/// The outcome of a method call.
///
/// Serializes as `{"status": "success", "bytes": [...]}`,
/// `{"status": "error", "code": ..., "message": ...}` or
/// `{"status": "notImplemented"}`.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MethodResponse {
    /// The encoded PNG.
    Success {
        /// PNG bytes.
        bytes: Vec<u8>,
    },
    /// A structured failure.
    Error {
        /// Machine-readable error kind.
        code: ErrorCode,
        /// Human-readable description.
        message: String,
    },
    /// The operation name is not handled by this channel.
    NotImplemented,
}

impl MethodResponse {
    /// Whether this is a [`MethodResponse::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The PNG bytes of a successful response.
    #[must_use]
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Success { bytes } => Some(bytes),
            _ => None,
        }
    }

    /// The error code of a failed response.
    #[must_use]
    pub const fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Error { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Serialize for hosts that exchange JSON.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl std::fmt::Debug for MethodResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success { bytes } => f
                .debug_struct("Success")
                .field("bytes_len", &bytes.len())
                .finish(),
            Self::Error { code, message } => f
                .debug_struct("Error")
                .field("code", code)
                .field("message", message)
                .finish(),
            Self::NotImplemented => f.write_str("NotImplemented"),
        }
    }
}

impl From<ThumbnailError> for MethodResponse {
    fn from(error: ThumbnailError) -> Self {
        Self::Error {
            code: error.code(),
            message: error.to_string(),
        }
    }
}

impl From<Result<Vec<u8>, ThumbnailError>> for MethodResponse {
    fn from(result: Result<Vec<u8>, ThumbnailError>) -> Self {
        match result {
            Ok(bytes) => Self::Success { bytes },
            Err(error) => error.into(),
        }
    }
}
