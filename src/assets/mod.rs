//! # Asynchronous model loading
//!
//! Furniture and door models are fetched and decoded off the main thread.
//! Every [`ModelRequest`] runs on its own worker thread and reports back as
//! a [`ModelEvent`] over an unbounded channel; the render loop drains the
//! channel between frames and applies the results to the scene.
//!
//! Loads are independent and unordered. There is no cancellation and no
//! retry; a failed load leaves the scene as it was.

pub mod fetch;
pub mod model;

use std::path::PathBuf;
use std::sync::Arc;

use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::{FutureExt, StreamExt};
use thiserror::Error;

use crate::gfx::scene::{NodeId, Transform};

pub use fetch::{DefaultFetcher, ModelFetcher, ModelSource};
pub use model::{decode_model, sibling_url, LoadedModel, ModelFormat, ModelMesh};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode model: {0}")]
    Decode(String),
    #[error("unsupported model format: {0}")]
    UnsupportedFormat(String),
    #[error("model contains no triangle meshes")]
    EmptyModel,
    #[error("could not start loader thread: {0}")]
    Spawn(String),
}

/// The layout entity a model belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelTarget {
    Furniture { item: String },
    Door { hole: String },
}

/// A model to load and where to put it once loaded
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub target: ModelTarget,
    pub url: String,
    pub placement: Transform,
    /// Node to remove once the model arrives
    pub placeholder: Option<NodeId>,
}

/// Completion message from a worker
#[derive(Debug)]
pub struct ModelEvent {
    pub request: ModelRequest,
    pub result: Result<LoadedModel, LoadError>,
}

/// Spawns model loads and collects their completions
pub struct AssetLoader {
    fetcher: Arc<dyn ModelFetcher>,
    sender: UnboundedSender<ModelEvent>,
    receiver: UnboundedReceiver<ModelEvent>,
    in_flight: usize,
}

impl AssetLoader {
    pub fn new(fetcher: Arc<dyn ModelFetcher>) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            fetcher,
            sender,
            receiver,
            in_flight: 0,
        }
    }

    /// Starts loading a model on a worker thread
    pub fn request(&mut self, request: ModelRequest) {
        let fetcher = Arc::clone(&self.fetcher);
        let sender = self.sender.clone();
        let fallback = request.clone();
        log::debug!("Requesting {}", request.url);

        let spawned = std::thread::Builder::new()
            .name("model-loader".into())
            .spawn(move || {
                let result = fetcher
                    .fetch(&request.url)
                    .and_then(|bytes| decode_model(&bytes, &request.url, fetcher.as_ref()));
                // The receiver only goes away when the viewer is shutting down
                let _ = sender.unbounded_send(ModelEvent { request, result });
            });

        if let Err(e) = spawned {
            let _ = self.sender.unbounded_send(ModelEvent {
                request: fallback,
                result: Err(LoadError::Spawn(e.to_string())),
            });
        }
        self.in_flight += 1;
    }

    /// Collects every completion that is ready, without blocking
    pub fn drain(&mut self) -> Vec<ModelEvent> {
        let mut events = Vec::new();
        while let Some(Some(event)) = self.receiver.next().now_or_never() {
            events.push(event);
        }
        self.in_flight = self.in_flight.saturating_sub(events.len());
        events
    }

    /// Number of requests whose completion has not been drained yet
    pub fn pending(&self) -> usize {
        self.in_flight
    }
}
