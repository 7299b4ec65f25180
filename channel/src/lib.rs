//! Method-channel bridge for video thumbnails.
//!
//! The host framework delivers [`MethodCall`]s by name; this crate dispatches
//! them onto background workers and hands back a future of the
//! [`MethodResponse`]. Marshalling that response onto the host's main thread
//! is the host adapter's job.
//!
//! ```no_run
//! use glasskit_channel::{MethodCall, ThumbnailChannel};
//! use glasskit_thumbnail::AssetDirectory;
//! use serde_json::json;
//!
//! # async fn run() {
//! let channel = ThumbnailChannel::new(AssetDirectory::ios_bundle("/Applications/Glasso.app"));
//! let call = MethodCall::new("getThumbnail", json!({"videoPath": "assets/intro.mp4", "maxWidth": 320}));
//! let response = channel.handle(&call).await;
//! # }
//! ```

#![warn(missing_docs)]

mod call;
mod handler;
mod response;

pub use call::{GetThumbnailArgs, Method, MethodCall};
pub use handler::ThumbnailChannel;
pub use response::MethodResponse;

/// Name of the channel the host registers this plugin on.
pub const CHANNEL_NAME: &str = "com.glasso/video_thumbnail";
