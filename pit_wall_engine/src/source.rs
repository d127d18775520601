use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use std::{
    collections::HashMap,
    fmt,
    io::ErrorKind,
    path::PathBuf,
    sync::Arc,
    time::{Duration, SystemTime},
};
use telemetry_align::{LapRecord, TelemetrySample};
use thiserror::Error;

// ---------- Session identity ----------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub year: i32,
    /// Race name as a path slug: lowercase, words joined by `_`
    pub race: String,
    /// Session identifier, e.g. `Q`, `R`, `FP1`
    pub session: String,
}

impl SessionKey {
    pub fn new(year: i32, race: &str, session: &str) -> Self {
        Self {
            year,
            race: race
                .split_whitespace()
                .map(str::to_lowercase)
                .collect::<Vec<_>>()
                .join("_"),
            session: session.trim().to_uppercase(),
        }
    }

    /// Location of the session file relative to the cache root.
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(self.year.to_string())
            .join(&self.race)
            .join(format!("{}.json", self.session))
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.year, self.race, self.session)
    }
}

// ---------- Session data ----------

/// One lap: its metadata plus the car telemetry recorded during it.
#[derive(Debug, Clone, Deserialize)]
pub struct LapEntry {
    #[serde(flatten)]
    pub record: LapRecord,
    #[serde(rename = "Telemetry", default)]
    pub telemetry: Vec<TelemetrySample>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionData {
    /// Driver codes entered in the session
    #[serde(default)]
    pub drivers: Vec<String>,
    #[serde(default)]
    pub laps: Vec<LapEntry>,
}

#[derive(Debug, Clone)]
pub struct FastestLap {
    pub driver: String,
    pub lap_number: Option<u32>,
    pub lap_time: Duration,
    pub telemetry: Vec<TelemetrySample>,
}

/// A driver's data cannot be used for a comparison.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Driver {0} did not take part in this session.")]
    UnknownDriver(String),
    #[error("Driver {0} found but no laps recorded.")]
    NoLaps(String),
    #[error("Driver {0} has no timed laps in this session.")]
    NoTimedLaps(String),
}

impl SessionData {
    pub fn has_driver(&self, driver: &str) -> bool {
        self.drivers.iter().any(|d| d == driver)
            || self.laps.iter().any(|lap| lap.record.driver == driver)
    }

    /// The driver's lap with the lowest lap time. The earlier lap wins a tie.
    pub fn fastest_lap(&self, driver: &str) -> Result<FastestLap, FetchError> {
        if !self.has_driver(driver) {
            return Err(FetchError::UnknownDriver(driver.to_string()));
        }

        let mut laps = self
            .laps
            .iter()
            .filter(|lap| lap.record.driver == driver)
            .peekable();
        if laps.peek().is_none() {
            return Err(FetchError::NoLaps(driver.to_string()));
        }

        let (lap_time, lap) = laps
            .filter_map(|lap| lap.record.lap_time.map(|t| (t, lap)))
            .min_by_key(|(t, _)| *t)
            .ok_or_else(|| FetchError::NoTimedLaps(driver.to_string()))?;

        Ok(FastestLap {
            driver: driver.to_string(),
            lap_number: lap.record.lap_number,
            lap_time,
            telemetry: lap.telemetry.clone(),
        })
    }

    /// Lap metadata of the given drivers, in session order.
    pub fn lap_records<S: AsRef<str>>(&self, drivers: &[S]) -> Vec<LapRecord> {
        self.laps
            .iter()
            .filter(|lap| drivers.iter().any(|d| d.as_ref() == lap.record.driver))
            .map(|lap| lap.record.clone())
            .collect()
    }
}

// ---------- Source adapter ----------

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("session {0} is not available")]
    SessionNotFound(SessionKey),
    #[error("failed to read session {key}: {source}")]
    Io {
        key: SessionKey,
        #[source]
        source: std::io::Error,
    },
    #[error("session {key} is malformed: {source}")]
    Parse {
        key: SessionKey,
        #[source]
        source: serde_json::Error,
    },
}

impl SourceError {
    /// Short description safe to hand to API clients.
    pub fn public_message(&self) -> String {
        match self {
            SourceError::SessionNotFound(key) => format!("session {key} is not available"),
            SourceError::Io { key, .. } | SourceError::Parse { key, .. } => {
                format!("failed to load session {key}")
            }
        }
    }
}

/// Supplies session lap data and telemetry.
#[async_trait]
pub trait SessionSource: Send + Sync {
    async fn load_session(&self, key: &SessionKey) -> Result<Arc<SessionData>, SourceError>;
}

/// Sessions stored as JSON under `<root>/<year>/<race>/<session>.json`.
///
/// Parsed sessions are kept in memory while their file's modification time
/// is unchanged. A rewritten file is parsed again, a deleted one is dropped.
pub struct DiskSessionStore {
    root: PathBuf,
    loaded: RwLock<HashMap<SessionKey, Memo>>,
}

struct Memo {
    modified: SystemTime,
    session: Arc<SessionData>,
}

impl DiskSessionStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            loaded: RwLock::new(HashMap::new()),
        }
    }

    pub fn session_path(&self, key: &SessionKey) -> PathBuf {
        self.root.join(key.relative_path())
    }

    fn memoised(&self, key: &SessionKey, modified: SystemTime) -> Option<Arc<SessionData>> {
        self.loaded
            .read()
            .get(key)
            .filter(|memo| memo.modified == modified)
            .map(|memo| Arc::clone(&memo.session))
    }
}

fn read_error(key: &SessionKey, e: std::io::Error) -> SourceError {
    match e.kind() {
        ErrorKind::NotFound => SourceError::SessionNotFound(key.clone()),
        _ => SourceError::Io {
            key: key.clone(),
            source: e,
        },
    }
}

#[async_trait]
impl SessionSource for DiskSessionStore {
    async fn load_session(&self, key: &SessionKey) -> Result<Arc<SessionData>, SourceError> {
        let path = self.session_path(key);
        let modified = match tokio::fs::metadata(&path).await {
            Ok(meta) => meta.modified().ok(),
            Err(e) => {
                self.loaded.write().remove(key);
                return Err(read_error(key, e));
            }
        };
        if let Some(session) = modified.and_then(|m| self.memoised(key, m)) {
            return Ok(session);
        }

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| read_error(key, e))?;
        let session: SessionData =
            serde_json::from_slice(&bytes).map_err(|e| SourceError::Parse {
                key: key.clone(),
                source: e,
            })?;
        tracing::debug!(
            "loaded session {} from {}: drivers={} laps={}",
            key,
            path.display(),
            session.drivers.len(),
            session.laps.len()
        );

        let session = Arc::new(session);
        let mut loaded = self.loaded.write();
        match modified {
            Some(modified) => {
                loaded.insert(
                    key.clone(),
                    Memo {
                        modified,
                        session: Arc::clone(&session),
                    },
                );
            }
            // no usable timestamp, so nothing to validate a memo against
            None => {
                loaded.remove(key);
            }
        }
        Ok(session)
    }
}
