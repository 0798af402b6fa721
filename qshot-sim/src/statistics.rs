//! Execution statistics tracking

use std::fmt;
use std::time::Duration;

/// Statistics for one execution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionStatistics {
    /// Wall time from validation to merged histogram
    pub total_time: Duration,

    /// Time spent running shots (all chunks, wall clock)
    pub shot_time: Duration,

    /// Time spent merging per-chunk histograms
    pub merge_time: Duration,

    /// Shots completed
    pub shots: usize,

    /// Number of chunks the shots were split into
    pub chunks: usize,

    /// Worker threads available to the execution
    pub threads: usize,

    /// Logged operations replayed per shot
    pub operations_per_shot: usize,

    /// Gate applications summed over all shots
    pub gates_applied: usize,

    /// Measurements (destructive and peeks) summed over all shots
    pub measurements: usize,
}

impl ExecutionStatistics {
    /// Create a new statistics object
    pub fn new() -> Self {
        Self::default()
    }

    /// Shot throughput
    pub fn shots_per_second(&self) -> f64 {
        let secs = self.shot_time.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.shots as f64 / secs
        }
    }

    /// Average wall time per shot
    pub fn time_per_shot(&self) -> Duration {
        match u32::try_from(self.shots) {
            Ok(shots) if shots > 0 => self.shot_time / shots,
            _ => Duration::ZERO,
        }
    }
}

impl fmt::Display for ExecutionStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Execution Statistics:")?;
        writeln!(f, "  Total time: {:?}", self.total_time)?;
        writeln!(f, "    Shots: {:?}", self.shot_time)?;
        writeln!(f, "    Merge: {:?}", self.merge_time)?;
        writeln!(
            f,
            "  Shots: {} in {} chunk(s) on {} thread(s)",
            self.shots, self.chunks, self.threads
        )?;
        writeln!(f, "    Rate: {:.0} shots/sec", self.shots_per_second())?;
        writeln!(f, "  Operations per shot: {}", self.operations_per_shot)?;
        writeln!(f, "  Gates applied: {}", self.gates_applied)?;
        writeln!(f, "  Measurements: {}", self.measurements)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates() {
        let stats = ExecutionStatistics {
            shot_time: Duration::from_secs(2),
            shots: 1000,
            ..Default::default()
        };
        assert!((stats.shots_per_second() - 500.0).abs() < 1e-9);
        assert_eq!(stats.time_per_shot(), Duration::from_millis(2));
    }

    #[test]
    fn test_zero_time() {
        let stats = ExecutionStatistics::new();
        assert_eq!(stats.shots_per_second(), 0.0);
        assert_eq!(stats.time_per_shot(), Duration::ZERO);
        assert!(stats.to_string().contains("Execution Statistics"));
    }
}
