//! Service health statistics.
//!
//! Tracks HTTP traffic, snapshot collection timing and how often each
//! metrics source had to fall back to its default value. Rendered as a
//! plain-text table by the `/health` endpoint.

use std::collections::VecDeque;
use std::fmt::Write as FmtWrite;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::collector::Source;

/// Running statistics for a single metric.
#[derive(Clone, Copy, Default)]
pub struct RunningStat {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
    last: f64,
}

impl RunningStat {
    pub fn add(&mut self, value: f64) {
        if self.count == 0 {
            *self = Self {
                count: 1,
                sum: value,
                min: value,
                max: value,
                last: value,
            };
            return;
        }
        self.count += 1;
        self.sum += value;
        self.last = value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / (self.count as f64)
        }
    }
}

/// Thread-safe wrapper for running statistics.
#[derive(Default)]
pub struct Stat {
    inner: Mutex<RunningStat>,
}

impl Stat {
    pub fn add_sample(&self, value: f64) {
        if let Ok(mut s) = self.inner.lock() {
            s.add(value);
        }
    }

    /// Returns (last, avg, max, min, count).
    pub fn snapshot(&self) -> (f64, f64, f64, f64, u64) {
        if let Ok(s) = self.inner.lock() {
            (s.last, s.avg(), s.max, s.min, s.count)
        } else {
            (0.0, 0.0, 0.0, 0.0, 0)
        }
    }
}

/// Sliding window of request timestamps.
pub struct RequestTimestamps {
    inner: Mutex<VecDeque<Instant>>,
}

impl Default for RequestTimestamps {
    fn default() -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(256)),
        }
    }
}

impl RequestTimestamps {
    pub fn record(&self) {
        if let Ok(mut guard) = self.inner.lock() {
            let now = Instant::now();
            guard.push_back(now);
            // Only the last minute is ever reported
            while guard
                .front()
                .is_some_and(|&t| now.duration_since(t) > Duration::from_secs(60))
            {
                guard.pop_front();
            }
        }
    }

    pub fn count_last_minute(&self) -> u64 {
        if let Ok(guard) = self.inner.lock() {
            let now = Instant::now();
            guard
                .iter()
                .filter(|&&t| now.duration_since(t) <= Duration::from_secs(60))
                .count() as u64
        } else {
            0
        }
    }
}

pub struct HealthStats {
    pub http_requests_total: AtomicU64,
    pub http_request_timestamps: RequestTimestamps,
    pub snapshots_total: AtomicU64,
    pub collect_duration_ms: Stat,
    degraded: [AtomicU64; 5],
}

impl Default for HealthStats {
    fn default() -> Self {
        Self {
            http_requests_total: AtomicU64::new(0),
            http_request_timestamps: RequestTimestamps::default(),
            snapshots_total: AtomicU64::new(0),
            collect_duration_ms: Stat::default(),
            degraded: Default::default(),
        }
    }
}

impl HealthStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_http_request(&self) {
        self.http_requests_total.fetch_add(1, Ordering::Relaxed);
        self.http_request_timestamps.record();
    }

    /// Records one finished collection and the sources it degraded.
    pub fn record_collection(&self, duration: Duration, degraded: &[Source]) {
        self.snapshots_total.fetch_add(1, Ordering::Relaxed);
        self.collect_duration_ms
            .add_sample(duration.as_secs_f64() * 1000.0);
        for source in degraded {
            self.degraded[source.index()].fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn degraded_count(&self, source: Source) -> u64 {
        self.degraded[source.index()].load(Ordering::Relaxed)
    }

    pub fn render_table(&self) -> String {
        let (cd_cur, cd_avg, cd_max, cd_min, _) = self.collect_duration_ms.snapshot();
        let snapshots = self.snapshots_total.load(Ordering::Relaxed);
        let requests = self.http_requests_total.load(Ordering::Relaxed);
        let last_minute = self.http_request_timestamps.count_last_minute();

        let left_col = 26usize;
        let col_w = 12usize;

        let mut out = String::new();

        writeln!(out, "HEALTH ENDPOINT - DASHBOARD INTERNAL STATS").ok();
        writeln!(out, "==========================================").ok();
        writeln!(out).ok();

        writeln!(out, "HTTP SERVER").ok();
        writeln!(out, "-----------").ok();
        writeln!(out, "{:left$} | {}", "requests_total", requests, left = left_col).ok();
        writeln!(
            out,
            "{:left$} | {}",
            "requests_last_minute",
            last_minute,
            left = left_col
        )
        .ok();
        writeln!(out).ok();

        writeln!(out, "SNAPSHOT COLLECTION").ok();
        writeln!(out, "-------------------").ok();
        writeln!(out, "{:left$} | {}", "snapshots_total", snapshots, left = left_col).ok();
        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "",
            "current",
            "average",
            "max",
            "min",
            left = left_col,
            col = col_w
        )
        .ok();
        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "collect_duration_ms",
            format!("{:.1}", cd_cur),
            format!("{:.1}", cd_avg),
            format!("{:.1}", cd_max),
            format!("{:.1}", cd_min),
            left = left_col,
            col = col_w
        )
        .ok();
        writeln!(out).ok();

        writeln!(out, "DEGRADED SOURCES").ok();
        writeln!(out, "----------------").ok();
        for source in Source::ALL {
            writeln!(
                out,
                "{:left$} | {}",
                source.name(),
                self.degraded_count(source),
                left = left_col
            )
            .ok();
        }

        out
    }
}
