//! Priority-ordered startup pipeline
//!
//! Services run once, lowest priority first, after the event loop is live.
//! The first service that reports failure stops the pipeline; the caller is
//! expected to shut the application down.

use tracing::{debug, error, info};

use crate::error::StartupFailure;

/// One-shot initialization step
pub trait StartupService {
    /// Short name used in logs and in [`StartupFailure`]
    fn name(&self) -> &str;

    /// Perform initialization; `false` aborts startup
    fn startup(&mut self) -> bool;
}

/// Services sorted ascending by priority, ties in registration order
pub struct StartupPipeline {
    services: Vec<(i32, Box<dyn StartupService>)>,
}

impl StartupPipeline {
    #[must_use]
    pub fn new(mut services: Vec<(i32, Box<dyn StartupService>)>) -> Self {
        // sort_by_key is stable: equal priorities keep registration order
        services.sort_by_key(|(priority, _)| *priority);
        Self { services }
    }

    /// Service names in execution order
    #[must_use]
    pub fn order(&self) -> Vec<&str> {
        self.services.iter().map(|(_, s)| s.name()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Run every service once, in order, stopping at the first failure
    ///
    /// Consumes the pipeline: services never run twice.
    ///
    /// # Errors
    /// Returns [`StartupFailure`] naming the service that reported failure.
    pub fn run(self) -> Result<(), StartupFailure> {
        let total = self.services.len();
        for (priority, mut service) in self.services {
            debug!("Starting service '{}' (priority {})", service.name(), priority);
            if !service.startup() {
                error!("Startup service '{}' failed; aborting startup", service.name());
                return Err(StartupFailure {
                    service: service.name().to_string(),
                });
            }
        }
        info!("Startup complete ({} services)", total);
        Ok(())
    }
}
