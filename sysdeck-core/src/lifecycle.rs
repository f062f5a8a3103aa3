use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{format_error, CoreError};
use crate::log::LogSink;

/// Initialization state of one named component plus the sink its lifecycle
/// messages go to.
///
/// `Lifecycle` only tracks state; the setup and teardown work lives in the
/// owning component's [`ManagedComponent`] hooks.
pub struct Lifecycle {
    name: String,
    initialized: AtomicBool,
    log: Arc<dyn LogSink>,
}

impl Lifecycle {
    pub fn new(name: impl Into<String>, log: Arc<dyn LogSink>) -> Self {
        Self {
            name: name.into(),
            initialized: AtomicBool::new(false),
            log,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn log(&self) -> &Arc<dyn LogSink> {
        &self.log
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Guard for every public operation besides initialize/shutdown.
    pub fn check_initialized(&self) -> Result<(), CoreError> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(CoreError::not_initialized(&self.name))
        }
    }

    /// Run `hook` as this component's initialization.
    ///
    /// Not idempotent: calling it on an initialized component runs the hook again.
    pub async fn initialize<F>(&self, hook: F) -> Result<(), CoreError>
    where
        F: std::future::Future<Output = anyhow::Result<()>>,
    {
        self.log
            .info(&self.name, &format!("Initializing {}", self.name), None);

        match hook.await {
            Ok(()) => {
                self.initialized.store(true, Ordering::Release);
                self.log
                    .info(&self.name, &format!("{} initialized successfully", self.name), None);
                Ok(())
            }
            Err(e) => {
                let message = format_error(&e);
                self.log.error(
                    &self.name,
                    &format!("Failed to initialize {}: {}", self.name, message),
                    None,
                );
                Err(CoreError::Initialization {
                    component: self.name.clone(),
                    message,
                })
            }
        }
    }

    /// Run `hook` as this component's teardown. The component counts as shut
    /// down once the hook has run, whether or not it succeeded.
    pub async fn shutdown<F>(&self, hook: F) -> Result<(), CoreError>
    where
        F: std::future::Future<Output = anyhow::Result<()>>,
    {
        self.log
            .info(&self.name, &format!("Shutting down {}", self.name), None);

        let result = hook.await;
        self.initialized.store(false, Ordering::Release);

        match result {
            Ok(()) => {
                self.log
                    .info(&self.name, &format!("{} shutdown completed", self.name), None);
                Ok(())
            }
            Err(e) => {
                let message = format_error(&e);
                self.log.error(
                    &self.name,
                    &format!("Failed to shut down {}: {}", self.name, message),
                    None,
                );
                Err(CoreError::Shutdown {
                    component: self.name.clone(),
                    message,
                })
            }
        }
    }
}

/// A component with an init/shutdown lifecycle.
///
/// Implementors supply [`ManagedComponent::lifecycle`] and, when they have setup
/// or teardown work, the `on_initialize` / `on_shutdown` hooks. The provided
/// `initialize` / `shutdown` methods do the state tracking and logging.
#[async_trait]
pub trait ManagedComponent: Send + Sync {
    fn lifecycle(&self) -> &Lifecycle;

    async fn on_initialize(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_shutdown(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        self.lifecycle().name()
    }

    fn is_initialized(&self) -> bool {
        self.lifecycle().is_initialized()
    }

    async fn initialize(&self) -> Result<(), CoreError> {
        self.lifecycle().initialize(self.on_initialize()).await
    }

    async fn shutdown(&self) -> Result<(), CoreError> {
        self.lifecycle().shutdown(self.on_shutdown()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::{LogLevel, MemoryLogSink};

    #[tokio::test]
    async fn failed_hook_leaves_component_uninitialized() {
        let sink = Arc::new(MemoryLogSink::new());
        let lifecycle = Lifecycle::new("Widgets", sink.clone());

        let result = lifecycle
            .initialize(async { Err(anyhow::anyhow!("disk on fire")) })
            .await;

        assert!(matches!(result, Err(CoreError::Initialization { .. })));
        assert!(!lifecycle.is_initialized());
        let errors = sink.search(crate::log::LogFilter {
            level: Some(LogLevel::Error),
            ..Default::default()
        });
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("disk on fire"));
    }

    #[tokio::test]
    async fn shutdown_clears_flag_even_when_hook_fails() {
        let lifecycle = Lifecycle::new("Widgets", Arc::new(crate::log::NullLogSink));
        lifecycle.initialize(async { Ok(()) }).await.unwrap();

        let result = lifecycle
            .shutdown(async { Err(anyhow::anyhow!("stuck")) })
            .await;

        assert!(matches!(result, Err(CoreError::Shutdown { .. })));
        assert!(!lifecycle.is_initialized());
    }
}
