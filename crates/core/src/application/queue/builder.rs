// Two-phase queue construction: synchronous validation, then async open

use super::EventQueue;
use crate::config::{ConnectionParams, QueueConfig};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, StorageAdapter, StorageAdapterFactory, UuidProvider};
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct EventQueueBuilder {
    config: QueueConfig,
    factory: Option<Arc<dyn StorageAdapterFactory>>,
    id_provider: Arc<dyn IdProvider>,
}

impl EventQueueBuilder {
    pub fn new(config: QueueConfig) -> Self {
        Self {
            config,
            factory: None,
            id_provider: Arc::new(UuidProvider),
        }
    }

    pub fn with_adapter_factory(mut self, factory: Arc<dyn StorageAdapterFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Override id generation (deterministic ids in tests)
    pub fn with_id_provider(mut self, id_provider: Arc<dyn IdProvider>) -> Self {
        self.id_provider = id_provider;
        self
    }

    /// Validate the configuration.
    ///
    /// Fails with `MissingConfiguration` when a persistent backend lacks host,
    /// port or path, and with `Config` when no adapter factory was supplied for it.
    pub fn build(self) -> Result<PendingQueue> {
        self.config.validate()?;

        let target = match (self.config.backend.is_persistent(), self.factory) {
            (false, _) => None,
            (true, Some(factory)) => {
                let params = self.config.connection().ok_or_else(|| {
                    AppError::Internal("validated config has no connection".to_string())
                })?;
                Some((factory, params))
            }
            (true, None) => {
                return Err(AppError::Config(format!(
                    "Backend {} requires a storage adapter factory",
                    self.config.backend
                )))
            }
        };

        Ok(PendingQueue {
            config: self.config,
            target,
            id_provider: self.id_provider,
        })
    }
}

/// Validated configuration waiting for its storage adapter to come up
pub struct PendingQueue {
    config: QueueConfig,
    target: Option<(Arc<dyn StorageAdapterFactory>, ConnectionParams)>,
    id_provider: Arc<dyn IdProvider>,
}

impl PendingQueue {
    /// Create and initialize the storage adapter, then hand out the queue.
    ///
    /// Adapter problems never fail the open: the queue comes up memory-only
    /// and the cause is logged.
    pub async fn open(self) -> EventQueue {
        let storage = match &self.target {
            None => {
                warn!(backend = %self.config.backend, "Queue will not persist");
                None
            }
            Some((factory, params)) => self.connect(factory.as_ref(), params).await,
        };

        if storage.is_some() {
            info!(backend = %self.config.backend, "Queue opened with persistence");
        }

        EventQueue::from_parts(self.config, storage, self.id_provider)
    }

    async fn connect(
        &self,
        factory: &dyn StorageAdapterFactory,
        params: &ConnectionParams,
    ) -> Option<Arc<dyn StorageAdapter>> {
        let backend = self.config.backend;

        let adapter = match factory.create(backend, params) {
            Ok(adapter) => adapter,
            Err(e) => {
                error!(error = %e, %backend, "Failed to create storage adapter, running memory-only");
                return None;
            }
        };

        if adapter.backend() != backend {
            let e = AppError::InvalidAdapter {
                expected: backend,
                actual: adapter.backend(),
            };
            warn!(error = %e, "Invalid storage adapter provided, running memory-only");
            return None;
        }

        match adapter.initialize().await {
            Ok(()) => Some(adapter),
            Err(e) => {
                error!(error = %e, %backend, "Storage adapter failed to initialize, running memory-only");
                None
            }
        }
    }
}

impl EventQueue {
    /// Validate `config` and open it against `factory` in one step
    pub async fn open(
        config: QueueConfig,
        factory: Arc<dyn StorageAdapterFactory>,
    ) -> Result<EventQueue> {
        Ok(EventQueueBuilder::new(config)
            .with_adapter_factory(factory)
            .build()?
            .open()
            .await)
    }
}
