//! # Glasskit
//!
//! Native video thumbnails for the Glasso app.
//!
//! Glasskit decodes the very first frame of a local video, applies the track's
//! display orientation, scales it down to a maximum width and hands it back as
//! PNG bytes. The host framework reaches it through a method channel.
//!
//! ## Features
//!
//! - `thumbnail`: First-frame extraction, resizing and PNG encoding.
//! - `channel`: The `getThumbnail` method-channel bridge.
//! - `ffmpeg`: Decode through FFmpeg. Without it every request fails with a
//!   generation error.
//!
//! Use the `full` feature to enable everything.
//!
//! ## Example
//!
//! ```toml
//! [dependencies]
//! glasskit = { version = "0.1", features = ["full"] }
//! ```
//!
//! ```rust,no_run
//! use glasskit::thumbnail::{NoAssets, ThumbnailConfig, generate_thumbnail};
//!
//! let png = generate_thumbnail("/tmp/clip.mp4", Some(320), &NoAssets, &ThumbnailConfig::default());
//! if let Ok(bytes) = png {
//!     println!("{} bytes of PNG", bytes.len());
//! }
//! ```

#[cfg(feature = "thumbnail")]
pub use glasskit_thumbnail as thumbnail;

#[cfg(feature = "channel")]
pub use glasskit_channel as channel;
