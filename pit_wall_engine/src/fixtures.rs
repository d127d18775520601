//! Deterministic session data for tests.

use async_trait::async_trait;
use std::sync::Arc;

use crate::source::{SessionData, SessionKey, SessionSource, SourceError};

/// Qualifying session with five drivers:
/// VER and NOR have usable laps, SAR has none, ALB has no timed lap and
/// HAM's fastest lap carries a single telemetry sample.
pub const SESSION_JSON: &str = r#"{
  "Drivers": ["VER", "NOR", "SAR", "ALB", "HAM"],
  "Laps": [
    {"Driver": "VER", "LapNumber": 1, "LapTime": null, "Stint": 1, "Compound": "SOFT"},
    {"Driver": "VER", "LapNumber": 2, "LapTime": 88.5, "Stint": 1, "Compound": "SOFT",
     "Telemetry": [
       {"Distance": 0, "Speed": 280, "Throttle": 100, "Brake": false, "X": 0, "Y": 0, "Time": 0},
       {"Distance": 300, "Speed": 300, "Throttle": 100, "Brake": false, "X": 300, "Y": 0, "Time": 3.75}
     ]},
    {"Driver": "VER", "LapNumber": 3, "LapTime": 87.25, "Stint": 2, "Compound": "SOFT",
     "Telemetry": [
       {"Distance": 150, "Speed": 240, "Throttle": 100, "Brake": false, "X": 150, "Y": 0, "Time": 2.0},
       {"Distance": 0, "Speed": 290, "Throttle": 100, "Brake": false, "X": 0, "Y": 0, "Time": 0},
       {"Distance": 300, "Speed": 120, "Throttle": 0, "Brake": true, "X": 300, "Y": 10, "Time": 4.0}
     ]},
    {"Driver": "NOR", "LapNumber": 1, "LapTime": 89.0, "Stint": 1, "Compound": "MEDIUM"},
    {"Driver": "NOR", "LapNumber": 2, "LapTime": 87.5, "Stint": 1, "Compound": "MEDIUM",
     "Telemetry": [
       {"Distance": 0, "Speed": 285, "Throttle": 100, "Brake": 0, "X": 0, "Y": 0, "Time": 0},
       {"Distance": 160, "Speed": 230, "Throttle": 90, "Brake": 0, "X": 160, "Y": 0, "Time": 2.25},
       {"Distance": 320, "Speed": 110, "Throttle": 0, "Brake": 1, "X": 320, "Y": 12, "Time": 4.5}
     ]},
    {"Driver": "ALB", "LapNumber": 1, "LapTime": null, "Stint": 1, "Compound": "HARD"},
    {"Driver": "HAM", "LapNumber": 1, "LapTime": 90.0, "Stint": 1, "Compound": "SOFT",
     "Telemetry": [
       {"Distance": 0, "Speed": 280, "Throttle": 100, "Brake": false, "X": 0, "Y": 0, "Time": 0}
     ]}
  ]
}"#;

pub fn session() -> SessionData {
    serde_json::from_str(SESSION_JSON).expect("fixture session parses")
}

/// The fixture session without stint numbers, as older timing feeds deliver.
pub fn session_without_stints() -> SessionData {
    let mut session = session();
    for lap in &mut session.laps {
        lap.record.stint = None;
    }
    session
}

/// Serves one session for any key, or fails every load.
pub struct StaticSource {
    session: Option<Arc<SessionData>>,
}

impl StaticSource {
    pub fn new(session: SessionData) -> Self {
        Self {
            session: Some(Arc::new(session)),
        }
    }

    pub fn failing() -> Self {
        Self { session: None }
    }
}

#[async_trait]
impl SessionSource for StaticSource {
    async fn load_session(&self, key: &SessionKey) -> Result<Arc<SessionData>, SourceError> {
        self.session
            .clone()
            .ok_or_else(|| SourceError::SessionNotFound(key.clone()))
    }
}
