//! Incoming method calls.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use glasskit_thumbnail::ThumbnailError;

/// A call as delivered by the host's method channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    /// Operation name, e.g. `getThumbnail`.
    pub method: String,
    /// Operation arguments, normally a JSON object.
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    /// Create a call.
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    /// Parse a `{"method": ..., "arguments": {...}}` envelope.
    ///
    /// # Errors
    /// Returns an error if `json` is not such an envelope.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Arguments of `getThumbnail`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetThumbnailArgs {
    /// Bundled asset identifier or filesystem path.
    pub video_path: String,
    /// Requested maximum width, as sent by the host.
    pub max_width: Option<i64>,
}

impl GetThumbnailArgs {
    fn from_arguments(arguments: &Value) -> Result<Self, ThumbnailError> {
        let invalid = || ThumbnailError::InvalidArguments("videoPath is required".into());

        let arguments = arguments.as_object().ok_or_else(invalid)?;
        let video_path = arguments
            .get("videoPath")
            .and_then(Value::as_str)
            .filter(|path| !path.is_empty())
            .ok_or_else(invalid)?;
        // Non-integer widths are ignored like absent ones.
        let max_width = arguments.get("maxWidth").and_then(Value::as_i64);

        Ok(Self {
            video_path: video_path.to_owned(),
            max_width,
        })
    }
}

/// The operations this channel implements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// `getThumbnail`
    GetThumbnail(GetThumbnailArgs),
}

impl Method {
    /// Wire name of [`Method::GetThumbnail`].
    pub const GET_THUMBNAIL: &'static str = "getThumbnail";

    /// Decode `call` into a known operation.
    ///
    /// Returns `Ok(None)` for operations this channel does not implement.
    ///
    /// # Errors
    /// Returns [`ThumbnailError::InvalidArguments`] if a known operation is
    /// missing required arguments.
    pub fn parse(call: &MethodCall) -> Result<Option<Self>, ThumbnailError> {
        match call.method.as_str() {
            Self::GET_THUMBNAIL => {
                GetThumbnailArgs::from_arguments(&call.arguments).map(|args| Some(Self::GetThumbnail(args)))
            }
            _ => Ok(None),
        }
    }

    /// Wire name of this operation.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GetThumbnail(_) => Self::GET_THUMBNAIL,
        }
    }
}
