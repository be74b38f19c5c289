//! Shared application state handed to every handler.

use std::sync::Arc;

use netmotif_events::ProgressNotifier;
use netmotif_graph::{GenerationStrategy, GeneratorConfig};

use crate::config::{Config, JobsConfig};

/// Cheap-to-clone handle on the notifier and configuration.
#[derive(Clone)]
pub struct AppState {
    pub notifier: Arc<ProgressNotifier>,
    pub generator: Arc<GeneratorConfig>,
    pub jobs: Arc<JobsConfig>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            notifier: Arc::new(ProgressNotifier::new(config.jobs.channel_capacity)),
            generator: Arc::new(config.generator.clone()),
            jobs: Arc::new(config.jobs.clone()),
        }
    }

    /// Server generator settings with per-request overrides applied.
    pub fn generator_config(
        &self,
        seed: Option<u64>,
        strategy: Option<GenerationStrategy>,
    ) -> GeneratorConfig {
        let base = self.generator.as_ref().clone();
        let strategy = strategy.unwrap_or(base.strategy);
        let seed = seed.or(base.seed);
        base.with_strategy(strategy).with_seed(seed)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_overrides_win() {
        let state = AppState::default();
        let config = state.generator_config(Some(9), Some(GenerationStrategy::Multiplet));
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.strategy, GenerationStrategy::Multiplet);
    }

    #[test]
    fn test_server_defaults_apply_without_overrides() {
        let mut config = Config::default();
        config.generator.seed = Some(1);
        let state = AppState::new(&config);

        let generator = state.generator_config(None, None);
        assert_eq!(generator.seed, Some(1));
        assert_eq!(generator.strategy, GenerationStrategy::Uniform);
    }
}
