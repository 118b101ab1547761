use adventurer_engine::{EventRecord, HistorySink, StepOutcome, Walker};
use axum::{extract::State, response::Json};
use std::sync::Arc;
use tracing::info;

use crate::models::{ApiError, ApiResponse, StateView};

#[derive(Clone)]
pub struct AppState {
    pub walker: Arc<Walker>,
    pub history: Arc<HistorySink>,
}

pub async fn step(
    State(app): State<AppState>,
) -> Result<Json<ApiResponse<StepOutcome>>, ApiError> {
    let outcome = app.walker.step().await.ok_or(ApiError::Busy)?;
    info!("step -> {} (floor {})", outcome.event, outcome.state.current());

    let message = outcome.message.clone();
    Ok(Json(ApiResponse::ok(outcome, message)))
}

pub async fn get_state(State(app): State<AppState>) -> Json<ApiResponse<StateView>> {
    let state = app.walker.snapshot().await;
    let view = StateView {
        progress: state.progress(),
        busy: app.walker.is_busy(),
        state,
    };
    Json(ApiResponse::ok(view, "State retrieved successfully"))
}

pub async fn get_events(State(app): State<AppState>) -> Json<ApiResponse<Vec<EventRecord>>> {
    let records = app.history.recent().await;
    let message = format!("{} recent events", records.len());
    Json(ApiResponse::ok(records, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use adventurer_engine::{FanoutSink, LogSink, Pacing, TraversalEngine, TraversalEvent};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::time::Duration;

    fn app_state(floors: usize, pacing: Pacing) -> AppState {
        let history = Arc::new(HistorySink::default());
        let sink = FanoutSink::new()
            .with(Arc::new(LogSink))
            .with(history.clone());
        let walker = Walker::with_sink(TraversalEngine::new(floors).unwrap(), pacing, Arc::new(sink));
        AppState {
            walker: Arc::new(walker),
            history,
        }
    }

    #[tokio::test]
    async fn test_step_then_state_and_events() {
        let app = app_state(3, Pacing::none());

        let Json(response) = step(State(app.clone())).await.unwrap();
        assert!(response.success);
        let outcome = response.data.unwrap();
        assert_eq!(outcome.event, TraversalEvent::Discovery(2));
        assert_eq!(response.message.as_deref(), Some("Conquered floor 2!"));

        let Json(response) = get_state(State(app.clone())).await;
        let view = response.data.unwrap();
        assert_eq!(view.state.stack(), &[1, 2]);
        assert_eq!(view.progress.conquered, 2);
        assert_eq!(view.progress.total, 3);
        assert!(!view.busy);

        let Json(response) = get_events(State(app)).await;
        let records = response.data.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event, TraversalEvent::Discovery(2));
    }

    #[tokio::test]
    async fn test_step_response_json() {
        let app = app_state(2, Pacing::none());
        let Json(response) = step(State(app)).await.unwrap();
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["event"]["kind"], "discovery");
        assert_eq!(json["data"]["event"]["floor"], 2);
        assert_eq!(json["data"]["state"]["current"], 2);
        assert_eq!(json["data"]["state"]["stack"], serde_json::json!([1, 2]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_step_is_rejected_with_conflict() {
        let app = app_state(4, Pacing::default());

        let first = tokio::spawn(step(State(app.clone())));
        tokio::time::sleep(Duration::from_millis(50)).await;

        let err = step(State(app.clone())).await.unwrap_err();
        assert!(matches!(err, ApiError::Busy));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);

        let Json(response) = get_state(State(app.clone())).await;
        let view = response.data.unwrap();
        assert!(view.busy);
        assert_eq!(view.state.stack(), &[1, 2]);

        assert!(first.await.unwrap().is_ok());
        assert_eq!(app.history.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_request_still_blocks_until_delay_ends() {
        let app = app_state(4, Pacing::default());

        let abandoned =
            tokio::time::timeout(Duration::from_millis(5), step(State(app.clone()))).await;
        assert!(abandoned.is_err());

        let err = step(State(app.clone())).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);

        tokio::time::sleep(Duration::from_millis(600)).await;
        let Json(response) = step(State(app.clone())).await.unwrap();
        assert_eq!(response.data.unwrap().event, TraversalEvent::Discovery(3));
        assert_eq!(app.history.len().await, 2);
    }
}
