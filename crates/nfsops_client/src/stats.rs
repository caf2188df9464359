//! Per-operation latency and error accounting.
//!
//! Two parallel maps are kept: one over all attempts and one over
//! successful attempts, so success-only latency figures are available
//! alongside overall counts.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use nfsops_types::nfs3::nfsstat3;

/// One recorded error: the status mnemonic (or the transport error
/// string) and the raw value, -1 when the failure never reached the
/// wire-status plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpError {
    pub status: String,
    pub value: i32,
}

impl OpError {
    fn from_status(status: nfsstat3) -> Self {
        Self {
            status: status.name().to_owned(),
            value: status.0,
        }
    }

    fn from_failure(description: &str) -> Self {
        Self {
            status: description.to_owned(),
            value: -1,
        }
    }
}

/// Latency figures for a single procedure.
#[derive(Debug, Clone, Default)]
pub struct OpLatency {
    pub count: u64,
    pub success_count: u64,
    pub total: Duration,
    /// Fastest wire response and the status it carried.
    pub min: Option<(Duration, nfsstat3)>,
    /// Slowest wire response and the status it carried.
    pub max: Option<(Duration, nfsstat3)>,
    pub errors: Vec<OpError>,
}

impl OpLatency {
    pub fn mean(&self) -> Duration {
        if self.count == 0 {
            return Duration::ZERO;
        }
        self.total / u32::try_from(self.count).unwrap_or(u32::MAX)
    }

    fn record(&mut self, elapsed: Duration, status: Result<nfsstat3, &str>) {
        self.count += 1;
        self.total += elapsed;
        match status {
            Ok(status) => {
                if status.is_err() {
                    self.errors.push(OpError::from_status(status));
                } else {
                    self.success_count += 1;
                }
                // min/max cover wire responses only
                if self.min.is_none_or(|(min, _)| elapsed < min) {
                    self.min = Some((elapsed, status));
                }
                if self.max.is_none_or(|(max, _)| elapsed > max) {
                    self.max = Some((elapsed, status));
                }
            }
            Err(description) => {
                self.errors.push(OpError::from_failure(description));
            }
        }
    }
}

impl fmt::Display for OpLatency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 {
            return write!(f, "no ops");
        }
        match (self.min, self.max) {
            (Some((min, min_status)), Some((max, max_status))) => write!(
                f,
                "min={:.6},{} max={:.6},{} count={} mean={:.6}",
                min.as_secs_f64(),
                min_status.0,
                max.as_secs_f64(),
                max_status.0,
                self.count,
                self.mean().as_secs_f64(),
            ),
            _ => write!(f, "count={} (no wire responses)", self.count),
        }
    }
}

/// Tracks latencies for every procedure a client has issued.
#[derive(Debug, Default)]
pub struct LatencyTracker {
    all: BTreeMap<&'static str, OpLatency>,
    succeeded: BTreeMap<&'static str, OpLatency>,
    success: bool,
}

impl LatencyTracker {
    pub fn new() -> Self {
        Self {
            all: BTreeMap::new(),
            succeeded: BTreeMap::new(),
            success: true,
        }
    }

    /// Records a completed attempt. `status` is the wire status when a
    /// reply was decoded, or the transport failure rendered as a string.
    pub fn complete(&mut self, op: &'static str, elapsed: Duration, status: Result<nfsstat3, String>) {
        let ok = matches!(status, Ok(s) if !s.is_err());
        if !ok {
            self.success = false;
        }
        self.all
            .entry(op)
            .or_default()
            .record(elapsed, status.as_ref().map(|s| *s).map_err(String::as_str));
        if ok {
            self.succeeded
                .entry(op)
                .or_default()
                .record(elapsed, status.as_ref().map(|s| *s).map_err(String::as_str));
        }
    }

    /// False once any attempt failed or returned a non-OK status.
    pub const fn success(&self) -> bool {
        self.success
    }

    /// All attempts, keyed by procedure name.
    pub const fn ops(&self) -> &BTreeMap<&'static str, OpLatency> {
        &self.all
    }

    /// Successful attempts only, keyed by procedure name.
    pub const fn successful_ops(&self) -> &BTreeMap<&'static str, OpLatency> {
        &self.succeeded
    }

    pub fn op(&self, name: &str) -> Option<&OpLatency> {
        self.all.get(name)
    }
}

impl fmt::Display for LatencyTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, op) in &self.all {
            writeln!(f, "{name} {op}")?;
        }
        write!(f, "success={}", self.success)
    }
}
