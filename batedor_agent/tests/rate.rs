//! Network rate derivation and its labels.
use std::time::{Duration, Instant};

use batedor_agent::rate::{format_rate, RateComputer};
use batedor_agent::types::NetCounters;

fn counters(sent: u64, recv: u64) -> NetCounters {
    NetCounters {
        bytes_sent: sent,
        bytes_recv: recv,
    }
}

#[test]
fn one_second_of_traffic() {
    let t0 = Instant::now();
    let mut rc = RateComputer::new(counters(0, 1_000_000), t0);
    let s = rc.update(0, 1_500_000, t0 + Duration::from_secs(1));
    assert_eq!(s.down_bytes_per_sec, 500_000);
    assert_eq!(s.up_bytes_per_sec, 0);
    assert_eq!(format_rate(s.down_bytes_per_sec), "488.28 KB/s");
}

#[test]
fn too_soon_keeps_previous_sample_and_baseline() {
    let t0 = Instant::now();
    let mut rc = RateComputer::new(counters(0, 0), t0);
    let before = rc.last();

    let s = rc.update(1000, 1000, t0 + Duration::from_millis(50));
    assert_eq!(s, before);

    // Baseline stayed at t0, so the full second counts.
    let s = rc.update(0, 500_000, t0 + Duration::from_secs(1));
    assert_eq!(s.down_bytes_per_sec, 500_000);
    assert_eq!(s.up_bytes_per_sec, 0);
}

#[test]
fn counter_reset_reads_as_zero_and_rebases() {
    let t0 = Instant::now();
    let mut rc = RateComputer::new(counters(5000, 10_000), t0);
    let s = rc.update(100, 100, t0 + Duration::from_secs(1));
    assert_eq!(s.down_bytes_per_sec, 0);
    assert_eq!(s.up_bytes_per_sec, 0);

    // next delta is measured from the lower value
    let s = rc.update(2148, 1124, t0 + Duration::from_secs(2));
    assert_eq!(s.down_bytes_per_sec, 1024);
    assert_eq!(s.up_bytes_per_sec, 2048);
    assert_eq!(format_rate(s.up_bytes_per_sec), "2.00 KB/s");
}

#[test]
fn small_rates_print_whole_bytes() {
    assert_eq!(format_rate(512), "512 B/s");
}
