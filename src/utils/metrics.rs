//! Observability and Metrics
//!
//! Counters for clone-mode sessions and codec anomalies.
//!
//! Uses atomic counters so the global collector can be shared freely, even
//! though sessions themselves are strictly sequential.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Global metrics collector for session and codec operations
#[derive(Debug)]
pub struct Metrics {
    /// Total handshake attempts
    pub handshakes_total: AtomicU64,
    /// Successful handshakes
    pub handshakes_success: AtomicU64,
    /// Failed handshakes
    pub handshakes_failed: AtomicU64,
    /// Baud-rate escalations during greeting
    pub baud_escalations: AtomicU64,
    /// Pages read from the radio
    pub pages_read: AtomicU64,
    /// Pages written to the radio
    pub pages_written: AtomicU64,
    /// Page read retries
    pub page_retries: AtomicU64,
    /// Total bytes sent
    pub bytes_sent: AtomicU64,
    /// Total bytes received
    pub bytes_received: AtomicU64,
    /// Completed downloads
    pub downloads_completed: AtomicU64,
    /// Completed uploads
    pub uploads_completed: AtomicU64,
    /// Failed transfers
    pub transfers_failed: AtomicU64,
    /// Decode substitutions (snapped DCS codes, lossy text)
    pub decode_warnings: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            handshakes_total: AtomicU64::new(0),
            handshakes_success: AtomicU64::new(0),
            handshakes_failed: AtomicU64::new(0),
            baud_escalations: AtomicU64::new(0),
            pages_read: AtomicU64::new(0),
            pages_written: AtomicU64::new(0),
            page_retries: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            downloads_completed: AtomicU64::new(0),
            uploads_completed: AtomicU64::new(0),
            transfers_failed: AtomicU64::new(0),
            decode_warnings: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a handshake attempt
    pub fn handshake_attempt(&self) {
        self.handshakes_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful handshake
    pub fn handshake_success(&self) {
        self.handshakes_success.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed handshake
    pub fn handshake_failed(&self) {
        self.handshakes_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn baud_escalated(&self) {
        self.baud_escalations.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a page received from the radio
    pub fn page_read(&self, byte_count: u64) {
        self.pages_read.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a page sent to the radio
    pub fn page_written(&self, byte_count: u64) {
        self.pages_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(byte_count, Ordering::Relaxed);
    }

    pub fn page_retry(&self) {
        self.page_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn download_completed(&self) {
        self.downloads_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn upload_completed(&self) {
        self.uploads_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn transfer_failed(&self) {
        self.transfers_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a locally recovered decode anomaly
    pub fn decode_warning(&self) {
        self.decode_warnings.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            handshakes_total: self.handshakes_total.load(Ordering::Relaxed),
            handshakes_success: self.handshakes_success.load(Ordering::Relaxed),
            handshakes_failed: self.handshakes_failed.load(Ordering::Relaxed),
            baud_escalations: self.baud_escalations.load(Ordering::Relaxed),
            pages_read: self.pages_read.load(Ordering::Relaxed),
            pages_written: self.pages_written.load(Ordering::Relaxed),
            page_retries: self.page_retries.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            downloads_completed: self.downloads_completed.load(Ordering::Relaxed),
            uploads_completed: self.uploads_completed.load(Ordering::Relaxed),
            transfers_failed: self.transfers_failed.load(Ordering::Relaxed),
            decode_warnings: self.decode_warnings.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            handshakes_total = snapshot.handshakes_total,
            handshakes_success = snapshot.handshakes_success,
            handshakes_failed = snapshot.handshakes_failed,
            baud_escalations = snapshot.baud_escalations,
            pages_read = snapshot.pages_read,
            pages_written = snapshot.pages_written,
            page_retries = snapshot.page_retries,
            bytes_sent = snapshot.bytes_sent,
            bytes_received = snapshot.bytes_received,
            downloads_completed = snapshot.downloads_completed,
            uploads_completed = snapshot.uploads_completed,
            transfers_failed = snapshot.transfers_failed,
            decode_warnings = snapshot.decode_warnings,
            uptime_seconds = snapshot.uptime_seconds,
            "Codeplug metrics snapshot"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub handshakes_total: u64,
    pub handshakes_success: u64,
    pub handshakes_failed: u64,
    pub baud_escalations: u64,
    pub pages_read: u64,
    pub pages_written: u64,
    pub page_retries: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub downloads_completed: u64,
    pub uploads_completed: u64,
    pub transfers_failed: u64,
    pub decode_warnings: u64,
    pub uptime_seconds: u64,
}

static METRICS: once_cell::sync::Lazy<Metrics> = once_cell::sync::Lazy::new(Metrics::new);

/// Get the global metrics instance
pub fn global_metrics() -> &'static Metrics {
    &METRICS
}

/// Timer for measuring operation duration
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    /// Start timing an operation
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        debug!(
            operation = self.operation,
            duration_ms = duration.as_millis(),
            "Operation completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_counters_track_bytes() {
        let m = Metrics::new();
        m.page_read(4096);
        m.page_read(4096);
        m.page_written(4096);
        m.page_retry();
        let s = m.snapshot();
        assert_eq!(s.pages_read, 2);
        assert_eq!(s.bytes_received, 8192);
        assert_eq!(s.pages_written, 1);
        assert_eq!(s.bytes_sent, 4096);
        assert_eq!(s.page_retries, 1);
    }
}
