use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use telemetry_align::{
    aggregate_stints, align, format_lap_time, ResampleError, ResampledChannels, Side, StintRecord,
};

use crate::error::ApiError;
use crate::source::{SessionKey, SessionSource};

// ---------- Request/Response types ----------

#[derive(Deserialize, Debug)]
pub struct ComparisonQuery {
    pub year: i32,
    /// Race name or round number
    pub race: String,
    #[serde(default = "default_session")]
    pub session: String,
    pub driver1: String,
    pub driver2: String,
}

fn default_session() -> String {
    "Q".to_string()
}

impl ComparisonQuery {
    fn session_key(&self) -> SessionKey {
        SessionKey::new(self.year, &self.race, &self.session)
    }

    fn drivers(&self) -> [String; 2] {
        [driver_code(&self.driver1), driver_code(&self.driver2)]
    }
}

fn driver_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

#[derive(Serialize, Debug)]
pub struct TelemetryResponse {
    pub distance: Vec<f64>,
    pub delta: Vec<f64>,
    pub d1: ResampledChannels,
    pub d2: ResampledChannels,
    pub d1_best: String,
    pub d2_best: String,
}

// ---------- Server state ----------

#[derive(Clone)]
pub struct AppState {
    source: Arc<dyn SessionSource>,
}

impl AppState {
    pub fn new(source: Arc<dyn SessionSource>) -> Self {
        Self { source }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/telemetry", get(telemetry))
        .route("/stints", get(stints))
        .route("/health", get(health))
        .with_state(state)
}

// ---------- Handlers ----------

async fn telemetry(
    State(state): State<AppState>,
    Query(query): Query<ComparisonQuery>,
) -> Result<Json<TelemetryResponse>, ApiError> {
    let key = query.session_key();
    let [d1, d2] = query.drivers();
    tracing::info!("telemetry {} {} vs {}", key, d1, d2);

    let session = state.source.load_session(&key).await?;
    let first = session.fastest_lap(&d1)?;
    let second = session.fastest_lap(&d2)?;
    tracing::debug!(
        "fastest laps: {} lap {:?} ({} samples), {} lap {:?} ({} samples)",
        first.driver,
        first.lap_number,
        first.telemetry.len(),
        second.driver,
        second.lap_number,
        second.telemetry.len()
    );

    let pair = align(&first.telemetry, &second.telemetry).map_err(|e| match e {
        ResampleError::InsufficientSamples { side, count } => ApiError::InsufficientTelemetry {
            driver: match side {
                Side::First => d1.clone(),
                Side::Second => d2.clone(),
            },
            count,
        },
    })?;

    let delta = pair.delta();
    if let Some(reason) = delta.reason() {
        tracing::warn!("delta for {} vs {} fell back to zeros: {}", d1, d2, reason);
    }

    Ok(Json(TelemetryResponse {
        distance: pair.distance,
        delta: delta.into_value(),
        d1: pair.first,
        d2: pair.second,
        d1_best: format_lap_time(first.lap_time),
        d2_best: format_lap_time(second.lap_time),
    }))
}

async fn stints(
    State(state): State<AppState>,
    Query(query): Query<ComparisonQuery>,
) -> Result<Json<Vec<StintRecord>>, ApiError> {
    let key = query.session_key();
    let drivers = query.drivers();
    tracing::info!("stints {} {} vs {}", key, drivers[0], drivers[1]);

    let session = state.source.load_session(&key).await?;
    let laps = session.lap_records(&drivers);
    let stints = aggregate_stints(&laps, &drivers);
    if let Some(reason) = stints.reason() {
        tracing::warn!("no stint data for {}: {}", key, reason);
    }
    Ok(Json(stints.into_value()))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, StaticSource};
    use crate::source::DiskSessionStore;
    use axum::{
        http::StatusCode,
        response::{IntoResponse, Response},
    };
    use pretty_assertions::assert_eq;
    use telemetry_align::RESOLUTION;

    fn state(source: StaticSource) -> State<AppState> {
        State(AppState::new(Arc::new(source)))
    }

    fn query(driver1: &str, driver2: &str) -> Query<ComparisonQuery> {
        Query(ComparisonQuery {
            year: 2024,
            race: "Silverstone".into(),
            session: default_session(),
            driver1: driver1.into(),
            driver2: driver2.into(),
        })
    }

    async fn body_json(resp: Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn error_of<T: std::fmt::Debug>(res: Result<T, ApiError>) -> (StatusCode, String) {
        let resp = res.unwrap_err().into_response();
        let status = resp.status();
        let body = body_json(resp).await;
        (status, body["detail"].as_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn telemetry_returns_aligned_traces() {
        let src = StaticSource::new(fixtures::session());
        let Json(resp) = telemetry(state(src), query("ver", " NOR ")).await.unwrap();

        assert_eq!(resp.distance.len(), RESOLUTION);
        assert_eq!(resp.delta.len(), RESOLUTION);
        assert_eq!(resp.distance[0], 0.0);
        assert_eq!(resp.distance[RESOLUTION - 1], 300.0);
        assert_eq!(resp.d1.speed[0], 290.0);
        assert_eq!(resp.d1.speed[RESOLUTION - 1], 120.0);
        assert_eq!(resp.d1.brake[RESOLUTION - 1], 1.0);
        assert_eq!(resp.d1_best, "1:27.250");
        assert_eq!(resp.d2_best, "1:27.500");
        for i in 0..RESOLUTION {
            assert_eq!(resp.delta[i], resp.d2.time[i] - resp.d1.time[i]);
        }

        let json = serde_json::to_value(&resp).unwrap();
        for key in ["Speed", "Throttle", "Brake", "X", "Y", "Time"] {
            assert_eq!(json["d1"][key].as_array().unwrap().len(), RESOLUTION);
            assert_eq!(json["d2"][key].as_array().unwrap().len(), RESOLUTION);
        }
    }

    #[tokio::test]
    async fn telemetry_driver_without_laps_is_bad_request() {
        let src = StaticSource::new(fixtures::session());
        let (status, detail) = error_of(telemetry(state(src), query("VER", "SAR")).await).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(detail.contains("SAR"), "{detail}");
    }

    #[tokio::test]
    async fn telemetry_unknown_driver_is_bad_request() {
        let src = StaticSource::new(fixtures::session());
        let (status, detail) = error_of(telemetry(state(src), query("XYZ", "VER")).await).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(detail.contains("XYZ"), "{detail}");
    }

    #[tokio::test]
    async fn telemetry_single_sample_lap_is_bad_request() {
        let src = StaticSource::new(fixtures::session());
        let (status, detail) = error_of(telemetry(state(src), query("VER", "HAM")).await).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(detail.contains("HAM"), "{detail}");
    }

    #[tokio::test]
    async fn telemetry_session_failure_is_server_error() {
        let (status, detail) =
            error_of(telemetry(state(StaticSource::failing()), query("VER", "NOR")).await).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(detail.starts_with("Internal Server Error"), "{detail}");
    }

    #[tokio::test]
    async fn stints_summarise_both_drivers() {
        let src = StaticSource::new(fixtures::session());
        let Json(records) = stints(state(src), query("VER", "NOR")).await.unwrap();
        let summary: Vec<(&str, u32, &str, u32, u32, u32)> = records
            .iter()
            .map(|s| {
                (
                    s.driver.as_str(),
                    s.stint,
                    s.compound.as_str(),
                    s.start_lap,
                    s.end_lap,
                    s.tyre_life,
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("VER", 1, "SOFT", 1, 2, 2),
                ("VER", 2, "SOFT", 3, 3, 1),
                ("NOR", 1, "MEDIUM", 1, 2, 2),
            ]
        );
    }

    #[tokio::test]
    async fn stints_tolerate_odd_lap_metadata() {
        let json = fixtures::SESSION_JSON
            .replace(r#""LapNumber": 3, "LapTime": 87.25, "Stint": 2,"#, r#""LapNumber": 3, "LapTime": 87.25, "Stint": 2.0,"#)
            .replace(r#""LapNumber": 1, "LapTime": null, "Stint": 1, "Compound": "SOFT""#, r#""LapNumber": null, "LapTime": null, "Stint": 1, "Compound": "SOFT""#)
            .replace(r#""LapTime": 89.0, "Stint": 1, "Compound": "MEDIUM""#, r#""LapTime": 89.0, "Stint": 1, "Compound": 7"#);
        assert_ne!(json, fixtures::SESSION_JSON);

        let root = tempfile::tempdir().unwrap();
        let store = DiskSessionStore::new(root.path().to_path_buf());
        let path = store.session_path(&SessionKey::new(2024, "Silverstone", "Q"));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, &json).unwrap();
        let state = State(AppState::new(Arc::new(store)));

        let Json(records) = stints(state.clone(), query("VER", "NOR")).await.unwrap();
        let summary: Vec<(&str, u32, &str, u32, u32, u32)> = records
            .iter()
            .map(|s| {
                (
                    s.driver.as_str(),
                    s.stint,
                    s.compound.as_str(),
                    s.start_lap,
                    s.end_lap,
                    s.tyre_life,
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("VER", 1, "SOFT", 2, 2, 1),
                ("VER", 2, "SOFT", 3, 3, 1),
                ("NOR", 1, "MEDIUM", 1, 2, 2),
            ]
        );

        // a file that is not JSON at all still fails the request
        std::fs::write(&path, b"{ not json").unwrap();
        std::fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(std::time::SystemTime::now() + std::time::Duration::from_secs(5))
            .unwrap();
        let (status, _) = error_of(stints(state, query("VER", "NOR")).await).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn stints_without_stint_field_is_empty_array() {
        let src = StaticSource::new(fixtures::session_without_stints());
        let resp = stints(state(src), query("VER", "NOR"))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!([]));
    }

    #[tokio::test]
    async fn stints_session_failure_is_server_error() {
        let (status, _) =
            error_of(stints(state(StaticSource::failing()), query("VER", "NOR")).await).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn query_defaults_to_qualifying() {
        let q: ComparisonQuery = serde_json::from_value(json!({
            "year": 2024, "race": "Silverstone", "driver1": "VER", "driver2": "NOR"
        }))
        .unwrap();
        assert_eq!(q.session, "Q");
        assert_eq!(q.session_key().relative_path(), std::path::PathBuf::from("2024/silverstone/Q.json"));
    }
}
