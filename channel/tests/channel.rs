//! End-to-end tests of the thumbnail channel with an in-memory decoder.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use glasskit_channel::{CHANNEL_NAME, MethodCall, MethodResponse, ThumbnailChannel};
use glasskit_thumbnail::{
    AssetManifest, Backend, ErrorCode, Frame, FrameSource, NoAssets, Orientation, SourceError,
    ThumbnailConfig,
};
use serde_json::json;

/// Decodes files whose contents are `"<width>x<height>"` into a flat grey frame.
///
/// Anything else is treated as a corrupt stream.
#[derive(Debug, Default)]
struct TextBackend {
    opened: Arc<AtomicUsize>,
    decoded: Arc<AtomicUsize>,
    delay: Duration,
}

struct TextSource {
    contents: String,
    decoded: Arc<AtomicUsize>,
    delay: Duration,
}

impl Backend for TextBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn FrameSource>, SourceError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let contents = std::fs::read_to_string(path).map_err(|e| SourceError::Open(e.to_string()))?;
        Ok(Box::new(TextSource {
            contents,
            decoded: Arc::clone(&self.decoded),
            delay: self.delay,
        }))
    }
}

impl FrameSource for TextSource {
    fn orientation(&self) -> Orientation {
        Orientation::Identity
    }

    fn decode_frame_at_zero(&mut self) -> Result<Frame, SourceError> {
        std::thread::sleep(self.delay);
        let parsed = self
            .contents
            .trim()
            .split_once('x')
            .and_then(|(w, h)| Some((w.parse::<u32>().ok()?, h.parse::<u32>().ok()?)));
        let result = match parsed {
            Some((width, height)) => Ok(Frame {
                data: vec![0x80; width as usize * height as usize * 4],
                width,
                height,
            }),
            None => Err(SourceError::Decode("invalid data found when processing input".into())),
        };
        self.decoded.fetch_add(1, Ordering::SeqCst);
        result
    }
}

fn video(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn get_thumbnail(video_path: &Path, max_width: Option<i64>) -> MethodCall {
    let mut arguments = json!({ "videoPath": video_path.to_str().unwrap() });
    if let Some(width) = max_width {
        arguments["maxWidth"] = json!(width);
    }
    MethodCall::new("getThumbnail", arguments)
}

fn png_size(response: &MethodResponse) -> (u32, u32) {
    let bytes = response
        .bytes()
        .unwrap_or_else(|| panic!("expected success, got {response:?}"));
    image::load_from_memory(bytes).unwrap().into_rgba8().dimensions()
}

#[test]
fn channel_name_matches_host_registration() {
    assert_eq!(CHANNEL_NAME, "com.glasso/video_thumbnail");
}

#[tokio::test]
async fn thumbnail_respects_max_width() {
    let dir = tempfile::tempdir().unwrap();
    let path = video(dir.path(), "wide.mp4", "1280x720");
    let channel = ThumbnailChannel::with_backend(TextBackend::default(), NoAssets);

    let response = channel.handle(&get_thumbnail(&path, Some(320))).await;
    assert_eq!(png_size(&response), (320, 180));

    let response = channel.handle(&get_thumbnail(&path, None)).await;
    assert_eq!(png_size(&response), (400, 225));

    // non-positive widths fall back to the default
    let response = channel.handle(&get_thumbnail(&path, Some(-5))).await;
    assert_eq!(png_size(&response), (400, 225));

    let small = video(dir.path(), "small.mp4", "160x90");
    let response = channel.handle(&get_thumbnail(&small, Some(320))).await;
    assert_eq!(png_size(&response), (160, 90));
}

#[tokio::test]
async fn configured_default_width_applies() {
    let dir = tempfile::tempdir().unwrap();
    let path = video(dir.path(), "wide.mp4", "1000x500");
    let config = ThumbnailConfig::from_json(r#"{"defaultMaxWidth": 100}"#).unwrap();
    let channel =
        ThumbnailChannel::with_backend(TextBackend::default(), NoAssets).with_config(config);

    let response = channel.handle(&get_thumbnail(&path, None)).await;
    assert_eq!(png_size(&response), (100, 50));
}

#[tokio::test]
async fn bundled_assets_resolve_through_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let path = video(dir.path(), "intro.mp4", "640x480");
    let manifest = AssetManifest::new().with_entry("assets/videos/intro.mp4", &path);
    let channel = ThumbnailChannel::with_backend(TextBackend::default(), manifest);

    let call = MethodCall::new(
        "getThumbnail",
        json!({"videoPath": "assets/videos/intro.mp4", "maxWidth": 64}),
    );
    let response = channel.handle(&call).await;
    assert_eq!(png_size(&response), (64, 48));
}

#[tokio::test]
async fn missing_asset_is_file_not_found() {
    let backend = TextBackend::default();
    let opened = Arc::clone(&backend.opened);
    let channel = ThumbnailChannel::with_backend(backend, AssetManifest::new());

    let call = MethodCall::new("getThumbnail", json!({"videoPath": "assets/none.mp4"}));
    let response = channel.handle(&call).await;
    assert_eq!(
        response,
        MethodResponse::Error {
            code: ErrorCode::FileNotFound,
            message: "Video file not found: assets/none.mp4".into(),
        }
    );
    assert_eq!(opened.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_path_is_file_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let channel = ThumbnailChannel::with_backend(TextBackend::default(), NoAssets);
    let response = channel
        .handle(&get_thumbnail(&dir.path().join("gone.mp4"), None))
        .await;
    assert_eq!(response.error_code(), Some(ErrorCode::FileNotFound));
}

#[tokio::test]
async fn missing_video_path_is_rejected_without_io() {
    let backend = TextBackend::default();
    let opened = Arc::clone(&backend.opened);
    let channel = ThumbnailChannel::with_backend(backend, NoAssets);

    let response = channel
        .handle(&MethodCall::new("getThumbnail", json!({"maxWidth": 100})))
        .await;
    assert_eq!(
        response,
        MethodResponse::Error {
            code: ErrorCode::InvalidArgs,
            message: "videoPath is required".into(),
        }
    );
    assert_eq!(opened.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unknown_method_is_not_implemented() {
    let channel = ThumbnailChannel::with_backend(TextBackend::default(), NoAssets);
    let call = MethodCall::from_json(r#"{"method": "getVideoDuration", "arguments": {}}"#).unwrap();
    assert_eq!(channel.handle(&call).await, MethodResponse::NotImplemented);
}

#[tokio::test]
async fn corrupt_video_is_generation_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = video(dir.path(), "corrupt.mp4", "garbage");
    let channel = ThumbnailChannel::with_backend(TextBackend::default(), NoAssets);

    let response = channel.handle(&get_thumbnail(&path, None)).await;
    assert_eq!(
        response,
        MethodResponse::Error {
            code: ErrorCode::GenerationError,
            message: "Failed to generate thumbnail: invalid data found when processing input"
                .into(),
        }
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_calls_complete_independently() {
    let dir = tempfile::tempdir().unwrap();
    let backend = TextBackend {
        delay: Duration::from_millis(20),
        ..TextBackend::default()
    };
    let channel = ThumbnailChannel::with_backend(backend, NoAssets);

    let sizes: Vec<(u32, u32)> = (1..=8).map(|i| (100 * i, 50 * i)).collect();
    let pending: Vec<_> = sizes
        .iter()
        .enumerate()
        .map(|(i, (w, h))| {
            let path = video(dir.path(), &format!("clip{i}.mp4"), &format!("{w}x{h}"));
            channel.handle(&get_thumbnail(&path, Some(400)))
        })
        .collect();

    // await in reverse start order
    let mut responses = Vec::new();
    for future in pending.into_iter().rev() {
        responses.push(future.await);
    }
    responses.reverse();

    for ((w, h), response) in sizes.into_iter().zip(&responses) {
        let expected = if w > 400 { (400, h * 400 / w) } else { (w, h) };
        assert_eq!(png_size(response), expected);
    }
}

#[tokio::test]
async fn pending_response_outlives_call_and_channel() {
    let dir = tempfile::tempdir().unwrap();
    let path = video(dir.path(), "clip.mp4", "20x10");

    let pending = {
        let channel = ThumbnailChannel::with_backend(TextBackend::default(), NoAssets);
        let call = get_thumbnail(&path, Some(10));
        channel.handle(&call)
    };
    let response = tokio::spawn(pending).await.unwrap();
    assert_eq!(png_size(&response), (10, 5));
}

#[test]
fn dropped_request_still_finishes_quietly() {
    let dir = tempfile::tempdir().unwrap();
    let path = video(dir.path(), "clip.mp4", "64x64");
    let backend = TextBackend {
        delay: Duration::from_millis(50),
        ..TextBackend::default()
    };
    let decoded = Arc::clone(&backend.decoded);
    let channel = ThumbnailChannel::with_backend(backend, NoAssets);

    drop(channel.handle(&get_thumbnail(&path, None)));

    let deadline = Instant::now() + Duration::from_secs(5);
    while decoded.load(Ordering::SeqCst) == 0 {
        assert!(Instant::now() < deadline, "worker never ran");
        std::thread::sleep(Duration::from_millis(5));
    }

    // the channel keeps working afterwards
    let response = channel.handle_blocking(&get_thumbnail(&path, None));
    assert_eq!(png_size(&response), (64, 64));
}
