//! Turns cumulative network counters into per-second rates.

use std::time::{Duration, Instant};

use crate::types::NetCounters;

/// Readings closer together than this keep the previous rate.
pub const MIN_RATE_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateSample {
    pub down_bytes_per_sec: u64,
    pub up_bytes_per_sec: u64,
    pub computed_at: Instant,
}

#[derive(Debug, Clone)]
pub struct RateComputer {
    baseline: NetCounters,
    baseline_at: Instant,
    last: RateSample,
}

impl RateComputer {
    pub fn new(initial: NetCounters, at: Instant) -> Self {
        Self {
            baseline: initial,
            baseline_at: at,
            last: RateSample {
                down_bytes_per_sec: 0,
                up_bytes_per_sec: 0,
                computed_at: at,
            },
        }
    }

    pub fn update(&mut self, sent: u64, recv: u64, now: Instant) -> RateSample {
        let dt = now.saturating_duration_since(self.baseline_at);
        if dt <= MIN_RATE_INTERVAL {
            return self.last;
        }
        let secs = dt.as_secs_f64();
        // saturating_sub: a counter that went backwards (provider restart) reads as zero traffic
        let down = recv.saturating_sub(self.baseline.bytes_recv) as f64 / secs;
        let up = sent.saturating_sub(self.baseline.bytes_sent) as f64 / secs;

        self.baseline = NetCounters {
            bytes_sent: sent,
            bytes_recv: recv,
        };
        self.baseline_at = now;
        self.last = RateSample {
            down_bytes_per_sec: down.round() as u64,
            up_bytes_per_sec: up.round() as u64,
            computed_at: now,
        };
        self.last
    }

    pub fn last(&self) -> RateSample {
        self.last
    }
}

const UNITS: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];

fn human_binary(b: u64, suffix: &str) -> String {
    const K: u64 = 1024;
    if b < K {
        return format!("{b} B{suffix}");
    }
    let mut div = K;
    let mut exp = 0;
    let mut n = b / K;
    while n >= K && exp < UNITS.len() - 1 {
        div *= K;
        exp += 1;
        n /= K;
    }
    format!("{:.2} {}B{suffix}", b as f64 / div as f64, UNITS[exp])
}

/// `488.28 KB/s` style rate label (1024-based units).
pub fn format_rate(bytes_per_sec: u64) -> String {
    human_binary(bytes_per_sec, "/s")
}

/// Same scale as [`format_rate`] without the `/s`, for session totals.
pub fn format_bytes(bytes: u64) -> String {
    human_binary(bytes, "")
}
