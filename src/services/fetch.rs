//! Paged enumeration of backend libraries.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::backends::MediaBackend;
use crate::config::SyncConfig;
use crate::mapper::ConverterRegistry;
use crate::models::{ClientId, MediaItem, MediaType};
use crate::utils::errors::{BackendError, ConversionError};

/// A raw item that could not be converted and was skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    pub key: Option<String>,
    pub error: ConversionError,
}

#[derive(Debug, Clone)]
pub struct FetchReport {
    pub client_id: ClientId,
    pub media_type: MediaType,
    pub items: Vec<MediaItem>,
    pub failures: Vec<FetchFailure>,
    pub pages: usize,
    pub duration: Duration,
}

impl FetchReport {
    fn new(client_id: ClientId, media_type: MediaType) -> Self {
        Self {
            client_id,
            media_type,
            items: Vec::new(),
            failures: Vec::new(),
            pages: 0,
            duration: Duration::ZERO,
        }
    }

    /// Raw items seen, converted or not.
    pub fn seen(&self) -> usize {
        self.items.len() + self.failures.len()
    }
}

/// Converts whole libraries page by page.
#[derive(Debug, Clone)]
pub struct LibraryFetcher {
    registry: Arc<ConverterRegistry>,
    page_size: usize,
    max_concurrent_backends: usize,
}

impl LibraryFetcher {
    pub fn new(registry: Arc<ConverterRegistry>, page_size: usize) -> Self {
        Self {
            registry,
            page_size: page_size.max(1),
            max_concurrent_backends: crate::constants::DEFAULT_MAX_CONCURRENT_BACKENDS,
        }
    }

    pub fn from_config(registry: Arc<ConverterRegistry>, config: &SyncConfig) -> Self {
        Self::new(registry, config.page_size)
            .with_max_concurrent_backends(config.max_concurrent_backends)
    }

    pub fn with_max_concurrent_backends(mut self, limit: usize) -> Self {
        self.max_concurrent_backends = limit.max(1);
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Enumerate every item of `media_type` on one backend.
    ///
    /// Items that fail conversion are logged and recorded in the report. Any
    /// error from the backend itself ends the enumeration.
    pub async fn fetch_all(
        &self,
        backend: &dyn MediaBackend,
        media_type: MediaType,
    ) -> Result<FetchReport, BackendError> {
        let start = Instant::now();
        let ctx = backend.context();
        let mut report = FetchReport::new(ctx.client_id, media_type);
        let mut offset = 0;

        info!(
            client_id = %ctx.client_id,
            client_type = %ctx.client_type,
            %media_type,
            "Starting library fetch"
        );

        loop {
            let page = backend
                .fetch_page(media_type, offset, self.page_size)
                .await
                .map_err(|e| match e {
                    BackendError::Transport { context, message } => BackendError::transport(
                        format!(
                            "fetching {} page at offset {} from client {} ({})",
                            media_type, offset, ctx.client_id, context
                        ),
                        message,
                    ),
                    other => other,
                })?;
            let page_len = page.len();
            report.pages += 1;

            for raw in &page {
                match self.registry.convert_item(ctx, raw, media_type) {
                    Ok(item) => report.items.push(item),
                    Err(error) => {
                        warn!(
                            client_id = %ctx.client_id,
                            key = raw.key().unwrap_or("<none>"),
                            "Skipping item that failed conversion: {}",
                            error
                        );
                        report.failures.push(FetchFailure {
                            key: raw.key().map(str::to_string),
                            error,
                        });
                    }
                }
            }

            debug!(offset, page_len, "Fetched page");
            if page_len < self.page_size {
                break;
            }
            offset += page_len;
        }

        report.duration = start.elapsed();
        info!(
            client_id = %ctx.client_id,
            %media_type,
            converted = report.items.len(),
            skipped = report.failures.len(),
            pages = report.pages,
            "Library fetch completed in {:?}",
            report.duration
        );
        Ok(report)
    }

    /// Enumerate several backends at once, at most `max_concurrent_backends`
    /// in flight. Results arrive in completion order.
    pub async fn fetch_from_backends(
        &self,
        backends: &[Arc<dyn MediaBackend>],
        media_type: MediaType,
    ) -> Vec<(ClientId, Result<FetchReport, BackendError>)> {
        stream::iter(backends.iter().cloned())
            .map(|backend| async move {
                let client_id = backend.context().client_id;
                let result = self.fetch_all(backend.as_ref(), media_type).await;
                if let Err(e) = &result {
                    warn!(%client_id, "Library fetch failed: {}", e);
                }
                (client_id, result)
            })
            .buffer_unordered(self.max_concurrent_backends)
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockBackend, plex_movie};

    fn fetcher(page_size: usize) -> LibraryFetcher {
        LibraryFetcher::new(Arc::new(ConverterRegistry::with_defaults()), page_size)
    }

    #[tokio::test]
    async fn test_fetch_all_walks_every_page() {
        let items = (1..=7).map(|n| plex_movie(&n.to_string(), &format!("Movie {n}"))).collect();
        let backend = MockBackend::plex(1).with_items(MediaType::Movie, items);

        let report = fetcher(3).fetch_all(&backend, MediaType::Movie).await.unwrap();
        assert_eq!(report.items.len(), 7);
        assert_eq!(report.pages, 3);
        assert!(report.failures.is_empty());
        assert_eq!(backend.requested_offsets(), vec![0, 3, 6]);
        assert_eq!(report.items[6].client_key(ClientId::new(1)), Some("7"));
    }

    #[tokio::test]
    async fn test_exact_multiple_ends_with_empty_page() {
        let items = (1..=4).map(|n| plex_movie(&n.to_string(), "M")).collect();
        let backend = MockBackend::plex(1).with_items(MediaType::Movie, items);

        let report = fetcher(2).fetch_all(&backend, MediaType::Movie).await.unwrap();
        assert_eq!(report.items.len(), 4);
        assert_eq!(report.pages, 3);
    }

    #[tokio::test]
    async fn test_bad_items_are_skipped() {
        let mut broken = plex_movie("x", "Broken");
        if let crate::backends::RawItem::Plex(meta) = &mut broken {
            meta.rating_key = None;
        }
        let items = vec![plex_movie("1", "Heat"), broken, plex_movie("3", "Alien")];
        let backend = MockBackend::plex(1).with_items(MediaType::Movie, items);

        let report = fetcher(10).fetch_all(&backend, MediaType::Movie).await.unwrap();
        assert_eq!(report.items.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.seen(), 3);
        assert!(matches!(report.failures[0].error, ConversionError::MissingField { .. }));
    }

    #[tokio::test]
    async fn test_transport_error_aborts_with_context() {
        let items = (1..=5).map(|n| plex_movie(&n.to_string(), "M")).collect();
        let backend = MockBackend::plex(1)
            .with_items(MediaType::Movie, items)
            .failing_at_offset(2);

        let err = fetcher(2).fetch_all(&backend, MediaType::Movie).await.unwrap_err();
        assert!(err.is_batch_fatal());
        assert!(err.to_string().contains("offset 2"));
    }

    #[tokio::test]
    async fn test_fetch_from_backends() {
        let plex: Arc<dyn MediaBackend> = Arc::new(
            MockBackend::plex(1).with_items(MediaType::Movie, vec![plex_movie("1", "Heat")]),
        );
        let broken: Arc<dyn MediaBackend> = Arc::new(MockBackend::plex(2).failing_at_offset(0));

        let mut results = fetcher(10)
            .with_max_concurrent_backends(1)
            .fetch_from_backends(&[plex, broken], MediaType::Movie)
            .await;
        results.sort_by_key(|(client_id, _)| *client_id);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].1.as_ref().unwrap().items.len(), 1);
        assert!(results[1].1.is_err());
    }
}
