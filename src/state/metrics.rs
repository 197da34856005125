// Run metrics

use serde::Serialize;

/// Counters collected while a run is aggregated
#[derive(Debug, Clone, Serialize)]
pub struct RunMetrics {
    pub total_duration_ms: u64,
    pub start_time: i64,
    pub end_time: i64,
    pub events_handled: u64,
    pub protocol_violations: u64,
    pub parallel_jobs: usize,
}

impl Default for RunMetrics {
    fn default() -> Self {
        Self {
            total_duration_ms: 0,
            start_time: crate::time::now_unix_millis(),
            end_time: 0,
            events_handled: 0,
            protocol_violations: 0,
            parallel_jobs: 1,
        }
    }
}

impl RunMetrics {
    /// Stamp the end of the run and compute the duration
    pub fn finish(&mut self) {
        self.end_time = crate::time::now_unix_millis();
        self.total_duration_ms = self.end_time.saturating_sub(self.start_time).max(0) as u64;
    }
}
