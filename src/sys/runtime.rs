use crate::config::ApiConfig;
use crate::events::{AppEvent, RuntimeRequest};
use async_channel::{Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use skiphire::{FetchError, HttpSkipSource, ImageUrl, Normalizer, SkipSource};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::runtime::Runtime;

fn build_source(api: &ApiConfig) -> Result<HttpSkipSource, FetchError> {
    HttpSkipSource::new(
        api.base_url.clone(),
        Duration::from_secs(api.timeout_secs),
        Normalizer::new(api.image_url_template.clone()),
    )
}

/// Runs GUI requests against the network and reports back as [`AppEvent`]s.
struct Downloads {
    source: RwLock<Arc<HttpSkipSource>>,
    pending_images: Mutex<HashSet<ImageUrl>>,
    tx: Sender<AppEvent>,
}

impl Downloads {
    fn source(&self) -> Arc<HttpSkipSource> {
        self.source.read().clone()
    }

    fn handle(self: &Arc<Self>, request: RuntimeRequest) {
        match request {
            RuntimeRequest::FetchSkips { ticket, location } => {
                let this = self.clone();
                tokio::spawn(async move {
                    let result = this.source().fetch(&location).await;
                    match &result {
                        Ok(skips) => {
                            log::info!("Fetched {} skips for {} ({})", skips.len(), location, ticket);
                        }
                        Err(e) => log::error!("Fetching skips for {} failed: {}", location, e),
                    }
                    let result = result.map_err(Arc::new);
                    let _ = this.tx.send(AppEvent::SkipsLoaded { ticket, result }).await;
                });
            }
            RuntimeRequest::FetchImages(urls) => {
                for url in urls {
                    if !self.pending_images.lock().insert(url.clone()) {
                        continue;
                    }
                    let this = self.clone();
                    tokio::spawn(async move {
                        match this.source().download(url.as_str()).await {
                            Ok(bytes) => {
                                let event = AppEvent::ImageLoaded {
                                    url: url.clone(),
                                    bytes,
                                };
                                let _ = this.tx.send(event).await;
                            }
                            Err(e) => log::warn!("Skip image {} unavailable: {}", url, e),
                        }
                        this.pending_images.lock().remove(&url);
                    });
                }
            }
            RuntimeRequest::FetchMap { ticket, url } => {
                let this = self.clone();
                tokio::spawn(async move {
                    match this.source().download(&url).await {
                        Ok(bytes) => {
                            let _ = this.tx.send(AppEvent::MapLoaded { ticket, bytes }).await;
                        }
                        // the key is part of the URL, keep it out of the log
                        Err(e) => log::warn!("Static map unavailable ({}): {}", ticket, e.redacted()),
                    }
                });
            }
            RuntimeRequest::Reconfigure(api) => match build_source(&api) {
                Ok(source) => *self.source.write() = Arc::new(source),
                Err(e) => log::error!("Keeping previous API client: {}", e),
            },
        }
    }
}

pub fn start_background_services(
    tx: Sender<AppEvent>,
    requests: Receiver<RuntimeRequest>,
    api: ApiConfig,
) {
    thread::spawn(move || {
        let rt = match Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                log::error!("Failed to create Tokio runtime: {}", e);
                return;
            }
        };

        rt.block_on(async move {
            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    crate::sys::server::run_server(tx).await;
                });
            }

            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    crate::config::run_async_watcher(tx).await;
                });
            }

            let source = match build_source(&api) {
                Ok(source) => source,
                Err(e) => {
                    log::error!("Failed to create API client: {}", e);
                    return;
                }
            };
            let downloads = Arc::new(Downloads {
                source: RwLock::new(Arc::new(source)),
                pending_images: Mutex::new(HashSet::new()),
                tx,
            });

            while let Ok(request) = requests.recv().await {
                downloads.handle(request);
            }
        });
    });
}
