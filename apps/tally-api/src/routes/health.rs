//! `GET /health`

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::state::SharedState;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// "ok" or "degraded"
    pub status: &'static str,
    pub database: bool,
    /// Database file the server was configured with
    pub database_path: String,
    pub version: &'static str,
    pub server_time: String,
}

/// Reports whether the server is up and the database answers queries.
///
/// Answers 503 when the database is unreachable.
pub async fn health(State(state): State<SharedState>) -> (StatusCode, Json<HealthResponse>) {
    let database = state.db.health_check().await;

    let (status_code, status) = if database {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status_code,
        Json(HealthResponse {
            status,
            database,
            database_path: state.config.database_path.display().to_string(),
            version: env!("CARGO_PKG_VERSION"),
            server_time: chrono::Utc::now().to_rfc3339(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::seeded_state;

    #[tokio::test]
    async fn test_health_ok() {
        let (status, Json(body)) = health(State(seeded_state().await)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert!(body.database);
    }

    #[tokio::test]
    async fn test_health_reports_configured_database() {
        let state = seeded_state().await;
        let expected = state.config.database_path.display().to_string();

        let (_, Json(body)) = health(State(state)).await;
        assert_eq!(body.database_path, expected);
        assert_eq!(body.database_path, ":memory:");
    }

    #[tokio::test]
    async fn test_health_degraded_after_close() {
        let state = seeded_state().await;
        state.db.close().await;

        let (status, Json(body)) = health(State(state)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!body.database);
    }
}
