//! Dispatch of method calls onto background workers.

use std::future::Future;
use std::sync::Arc;
use std::thread;

use futures::channel::oneshot;

use glasskit_thumbnail::{
    AssetLookup, Backend, DefaultBackend, Extractor, ThumbnailConfig, ThumbnailError,
    ThumbnailRequest, resolve,
};

use crate::{GetThumbnailArgs, Method, MethodCall, MethodResponse};

const WORKER_NAME: &str = "glasskit-thumbnail";

/// Handles calls arriving on the thumbnail channel.
///
/// Cloning is cheap; clones share the backend and asset lookup, both of which
/// are read-only.
#[derive(Debug, Clone)]
pub struct ThumbnailChannel {
    backend: Arc<dyn Backend>,
    assets: Arc<dyn AssetLookup>,
    config: ThumbnailConfig,
}

enum Pending {
    Ready(MethodResponse),
    Worker(oneshot::Receiver<MethodResponse>),
}

impl ThumbnailChannel {
    /// Create a channel using the default decode backend.
    pub fn new(assets: impl AssetLookup + 'static) -> Self {
        Self::with_backend(DefaultBackend::default(), assets)
    }

    /// Create a channel with an explicit decode backend.
    pub fn with_backend(backend: impl Backend + 'static, assets: impl AssetLookup + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
            assets: Arc::new(assets),
            config: ThumbnailConfig::default(),
        }
    }

    /// Replace the defaults used for every call.
    #[must_use]
    pub fn with_config(mut self, config: ThumbnailConfig) -> Self {
        self.config = config;
        self
    }

    /// The defaults used for every call.
    #[must_use]
    pub const fn config(&self) -> &ThumbnailConfig {
        &self.config
    }

    /// Handle `call`.
    ///
    /// Arguments are validated immediately, without any I/O. Valid thumbnail
    /// requests run on their own background thread; the returned future
    /// resolves once the worker is done. Dropping the future is fine: the
    /// worker finishes and discards its result.
    ///
    /// The future borrows neither the channel nor `call`.
    pub fn handle(
        &self,
        call: &MethodCall,
    ) -> impl Future<Output = MethodResponse> + Send + 'static + use<> {
        let pending = match Method::parse(call) {
            Ok(Some(Method::GetThumbnail(args))) => self.spawn_thumbnail(args),
            Ok(None) => {
                log::debug!("method {} not implemented", call.method);
                Pending::Ready(MethodResponse::NotImplemented)
            }
            Err(error) => Pending::Ready(error.into()),
        };

        async move {
            match pending {
                Pending::Ready(response) => response,
                Pending::Worker(receiver) => receiver.await.unwrap_or_else(|_| {
                    ThumbnailError::Generation("worker exited without a result".into()).into()
                }),
            }
        }
    }

    /// Handle `call`, blocking the current thread until the response is ready.
    pub fn handle_blocking(&self, call: &MethodCall) -> MethodResponse {
        futures::executor::block_on(self.handle(call))
    }

    fn spawn_thumbnail(&self, args: GetThumbnailArgs) -> Pending {
        let backend = Arc::clone(&self.backend);
        let assets = Arc::clone(&self.assets);
        let config = self.config.clone();
        let (sender, receiver) = oneshot::channel();

        let spawned = thread::Builder::new()
            .name(WORKER_NAME.into())
            .spawn(move || {
                let result = thumbnail(&*backend, &*assets, &config, &args);
                // The caller may have stopped waiting.
                let _ = sender.send(result.into());
            });

        match spawned {
            Ok(_) => Pending::Worker(receiver),
            Err(e) => {
                log::error!("failed to spawn thumbnail worker: {e}");
                Pending::Ready(
                    ThumbnailError::Generation(format!("failed to start worker: {e}")).into(),
                )
            }
        }
    }
}

fn thumbnail(
    backend: &dyn Backend,
    assets: &dyn AssetLookup,
    config: &ThumbnailConfig,
    args: &GetThumbnailArgs,
) -> Result<Vec<u8>, ThumbnailError> {
    let reference = config.parse_reference(&args.video_path);
    let location = resolve(&reference, assets)?;
    let request = ThumbnailRequest::new(location, config.max_width(args.max_width));
    Extractor::new(backend).extract(&request)
}
