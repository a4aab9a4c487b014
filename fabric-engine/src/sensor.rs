//! Sensor telemetry ingestion.
//!
//! A long-lived task reads lines of the form
//! `Temp: 25.00 C, Hum: 60.00 %, MQ-3: 400, LDR: 300` and publishes each
//! parsed reading as a whole new snapshot. Readers clone an `Arc` to the
//! latest snapshot, so they never observe fields from two different
//! readings. Malformed lines are logged and dropped; connection loss only
//! flips the connected flag.

use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("Malformed sensor line '{line}': {reason}")]
    Parse { line: String, reason: String },

    #[error("Sensor connection error: {0}")]
    Connection(#[from] std::io::Error),
}

/// One complete sensor reading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SensorReading {
    pub temperature: f64,
    pub humidity: f64,
    pub mq3_value: i64,
    pub ldr_value: i64,
}

/// Latest reading plus connectivity, as served to readers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TelemetryView {
    #[serde(flatten)]
    pub reading: SensorReading,
    pub connected: bool,
}

/// Parse one telemetry line.
pub fn parse_reading(line: &str) -> Result<SensorReading, SensorError> {
    let fail = |reason: String| SensorError::Parse {
        line: line.to_string(),
        reason,
    };
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < 4 {
        return Err(fail(format!("expected 4 fields, got {}", parts.len())));
    }

    let value = |part: &str, unit: &str| -> Result<String, SensorError> {
        let (_, raw) = part
            .split_once(':')
            .ok_or_else(|| fail(format!("field '{}' has no ':'", part.trim())))?;
        let raw = raw.trim();
        Ok(raw.strip_suffix(unit).unwrap_or(raw).trim().to_string())
    };

    let temperature = value(parts[0], "C")?
        .parse::<f64>()
        .map_err(|e| fail(format!("temperature: {}", e)))?;
    let humidity = value(parts[1], "%")?
        .parse::<f64>()
        .map_err(|e| fail(format!("humidity: {}", e)))?;
    let mq3_value = value(parts[2], "")?
        .parse::<i64>()
        .map_err(|e| fail(format!("MQ-3: {}", e)))?;
    let ldr_value = value(parts[3], "")?
        .parse::<i64>()
        .map_err(|e| fail(format!("LDR: {}", e)))?;

    Ok(SensorReading {
        temperature,
        humidity,
        mq3_value,
        ldr_value,
    })
}

/// Shared telemetry state: an atomically replaced snapshot and a flag.
#[derive(Debug, Default)]
pub struct SensorHub {
    latest: RwLock<Arc<SensorReading>>,
    connected: AtomicBool,
    accepted: AtomicU64,
    dropped: AtomicU64,
}

impl SensorHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent complete reading (all zeros before the first one).
    pub fn snapshot(&self) -> Arc<SensorReading> {
        let guard = self.latest.read().unwrap_or_else(|poisoned| {
            log::warn!("SensorHub read lock was poisoned, recovering");
            poisoned.into_inner()
        });
        Arc::clone(&guard)
    }

    /// Replace the snapshot with a new reading.
    pub fn publish(&self, reading: SensorReading) {
        let next = Arc::new(reading);
        let mut guard = self.latest.write().unwrap_or_else(|poisoned| {
            log::warn!("SensorHub write lock was poisoned, recovering");
            poisoned.into_inner()
        });
        *guard = next;
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Release);
    }

    pub fn view(&self) -> TelemetryView {
        TelemetryView {
            reading: *self.snapshot(),
            connected: self.is_connected(),
        }
    }

    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }
}

/// Read telemetry lines until EOF, publishing every valid reading.
///
/// The hub is marked connected for the duration and disconnected on EOF
/// or on a read error, which is returned.
pub async fn run_ingestion<R>(mut reader: R, hub: Arc<SensorHub>) -> Result<(), SensorError>
where
    R: AsyncBufRead + Unpin,
{
    hub.set_connected(true);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let text = String::from_utf8_lossy(&buf);
                let line = text.trim();
                if line.is_empty() {
                    continue;
                }
                log::trace!("sensor raw line={}", line);
                match parse_reading(line) {
                    Ok(reading) => hub.publish(reading),
                    Err(e) => {
                        hub.record_dropped();
                        log::warn!("dropped sensor line: {}", e);
                    }
                }
            }
            Err(e) => {
                hub.set_connected(false);
                log::error!("sensor stream failed: {}", e);
                return Err(SensorError::Connection(e));
            }
        }
    }
    hub.set_connected(false);
    log::info!(
        "sensor stream closed accepted={} dropped={}",
        hub.accepted(),
        hub.dropped()
    );
    Ok(())
}

/// Spawn the ingestion task over a device or file path.
///
/// A failed open leaves the hub disconnected and ends the task; there is
/// no retry.
pub fn spawn_from_path(path: PathBuf, hub: Arc<SensorHub>) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::fs::File::open(&path).await {
            Ok(file) => {
                log::info!("connected to sensor path={}", path.display());
                if let Err(e) = run_ingestion(BufReader::new(file), hub).await {
                    log::error!("sensor ingestion stopped path={}: {}", path.display(), e);
                }
            }
            Err(e) => {
                hub.set_connected(false);
                log::error!(
                    "sensor unavailable path={}: {}",
                    path.display(),
                    SensorError::Connection(e)
                );
            }
        }
    })
}
