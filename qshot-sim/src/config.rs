//! Executor configuration

use qshot_core::{QuantumError, Result};

/// Default number of shots one worker runs with one generator
pub const DEFAULT_SHOTS_PER_CHUNK: usize = 64;

/// Default upper bound on the shot count of one execution
pub const DEFAULT_MAX_SHOTS: usize = 100_000_000;

/// Configuration for the shot executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Random number generator seed for reproducibility
    ///
    /// If None, a fresh seed is drawn from the operating system for every
    /// execution. With Some(seed), histograms are identical for every
    /// thread count.
    ///
    /// Default: None (random)
    pub seed: Option<u64>,

    /// Run chunks of shots on the rayon thread pool
    ///
    /// Default: true
    pub parallel: bool,

    /// Size of a dedicated thread pool; None uses the global rayon pool
    ///
    /// Default: None
    pub num_threads: Option<usize>,

    /// Shots per chunk
    ///
    /// Chunk boundaries depend only on this value and the shot count, and
    /// each chunk owns one generator.
    ///
    /// Default: 64
    pub shots_per_chunk: usize,

    /// Largest accepted shot count
    ///
    /// Default: 10^8
    pub max_shots: usize,

    /// Collect timing and counting statistics
    ///
    /// Default: false
    pub collect_statistics: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            parallel: true,
            num_threads: None,
            shots_per_chunk: DEFAULT_SHOTS_PER_CHUNK,
            max_shots: DEFAULT_MAX_SHOTS,
            collect_statistics: false,
        }
    }
}

impl ExecutorConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Reproducible configuration with a fixed seed
    pub fn deterministic(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    /// Single-threaded configuration
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Default::default()
        }
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enable or disable parallel chunks
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run on a dedicated pool of `threads` workers
    pub fn with_num_threads(mut self, threads: usize) -> Self {
        self.num_threads = Some(threads);
        self
    }

    /// Set the chunk size
    pub fn with_shots_per_chunk(mut self, shots: usize) -> Self {
        self.shots_per_chunk = shots;
        self
    }

    /// Set the shot limit
    pub fn with_max_shots(mut self, max_shots: usize) -> Self {
        self.max_shots = max_shots;
        self
    }

    /// Enable statistics collection
    pub fn with_statistics(mut self, enabled: bool) -> Self {
        self.collect_statistics = enabled;
        self
    }

    /// Validate the configuration
    ///
    /// # Errors
    /// `InvalidArgument` for a zero chunk size, a zero shot limit or a
    /// dedicated pool of zero threads
    pub fn validate(&self) -> Result<()> {
        if self.shots_per_chunk == 0 {
            return Err(QuantumError::InvalidArgument(
                "shots_per_chunk must be > 0".to_string(),
            ));
        }
        if self.max_shots == 0 {
            return Err(QuantumError::InvalidArgument(
                "max_shots must be > 0".to_string(),
            ));
        }
        if self.num_threads == Some(0) {
            return Err(QuantumError::InvalidArgument(
                "num_threads must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExecutorConfig::new();
        assert!(config.parallel);
        assert_eq!(config.seed, None);
        assert_eq!(config.shots_per_chunk, 64);
        assert_eq!(config.max_shots, 100_000_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        assert_eq!(ExecutorConfig::deterministic(7).seed, Some(7));
        assert!(!ExecutorConfig::sequential().parallel);
    }

    #[test]
    fn test_builder_chain() {
        let config = ExecutorConfig::new()
            .with_seed(3)
            .with_num_threads(2)
            .with_shots_per_chunk(10)
            .with_statistics(true);
        assert_eq!(config.num_threads, Some(2));
        assert_eq!(config.shots_per_chunk, 10);
        assert!(config.collect_statistics);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            ExecutorConfig::new().with_shots_per_chunk(0).validate(),
            Err(QuantumError::InvalidArgument(_))
        ));
        assert!(ExecutorConfig::new().with_num_threads(0).validate().is_err());
        assert!(ExecutorConfig::new().with_max_shots(0).validate().is_err());
    }
}
