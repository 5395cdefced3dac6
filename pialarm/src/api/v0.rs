//! API v0 endpoints.
//!
//! Version 0 signals an unstable API -- breaking changes are expected
//! until the daemon reaches 1.0.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::{router::OpenApiRouter, routes};

use super::server::SharedState;
use crate::alarm::router::Command;
use crate::alarm::{AlarmDefinition, AlarmId, TimeOfDay, Weekday};
use crate::api_client::types::{AlarmBody, AlarmResponse, StatusResponse};
use crate::error::Error;
use crate::store::NewAlarm;
use crate::tracing::prelude::*;

/// Build the v0 API routes with OpenAPI metadata.
pub fn routes() -> OpenApiRouter<SharedState> {
    OpenApiRouter::new()
        .routes(routes!(health))
        .routes(routes!(get_status))
        .routes(routes!(list_alarms, create_alarm))
        .routes(routes!(get_alarm, update_alarm, delete_alarm))
        .routes(routes!(toggle_alarm))
        .routes(routes!(snooze))
        .routes(routes!(dismiss))
}

fn error_status(err: &Error) -> StatusCode {
    match err {
        Error::InvalidAlarm(_) => StatusCode::BAD_REQUEST,
        Error::AlarmNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Validate an incoming alarm body into store-ready fields.
fn parse_body(body: AlarmBody) -> Result<NewAlarm, Error> {
    let time_of_day = TimeOfDay::new(body.hour, body.minute)?;
    let days_of_week = body
        .days_of_week
        .iter()
        .map(|day| {
            Weekday::from_str(day)
                .map_err(|_| Error::InvalidAlarm(format!("unknown weekday: {day}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NewAlarm {
        label: body.label,
        time_of_day,
        days_of_week,
        enabled: body.enabled,
        sound_reference: body.sound_reference,
    })
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = OK, description = "Server is running", body = String),
    ),
)]
async fn health() -> &'static str {
    "OK"
}

/// Return the current session state and daemon time.
#[utoipa::path(
    get,
    path = "/status",
    tag = "session",
    responses(
        (status = OK, description = "Current session snapshot", body = StatusResponse),
    ),
)]
async fn get_status(State(state): State<SharedState>) -> Json<StatusResponse> {
    let snapshot = state.snapshot_rx.borrow().clone();
    Json(StatusResponse::new(&snapshot, state.clock.now()))
}

/// Return all configured alarms.
#[utoipa::path(
    get,
    path = "/alarms",
    tag = "alarms",
    responses(
        (status = OK, description = "All alarms, ordered by trigger time", body = Vec<AlarmResponse>),
    ),
)]
async fn list_alarms(
    State(state): State<SharedState>,
) -> Result<Json<Vec<AlarmResponse>>, StatusCode> {
    let alarms = state.store.list().await.map_err(|err| error_status(&err))?;
    Ok(Json(alarms.into_iter().map(AlarmResponse::from).collect()))
}

/// Create a new alarm.
#[utoipa::path(
    post,
    path = "/alarms",
    tag = "alarms",
    request_body = AlarmBody,
    responses(
        (status = CREATED, description = "Alarm created", body = AlarmResponse),
        (status = BAD_REQUEST, description = "Malformed alarm definition"),
    ),
)]
async fn create_alarm(
    State(state): State<SharedState>,
    Json(body): Json<AlarmBody>,
) -> Result<(StatusCode, Json<AlarmResponse>), StatusCode> {
    let new = parse_body(body).map_err(|err| {
        warn!(%err, "Rejected alarm creation");
        error_status(&err)
    })?;
    let alarm = state
        .store
        .create(new)
        .await
        .map_err(|err| error_status(&err))?;
    Ok((StatusCode::CREATED, Json(alarm.into())))
}

/// Return a single alarm, or 404 if not found.
#[utoipa::path(
    get,
    path = "/alarms/{id}",
    tag = "alarms",
    params(
        ("id" = u64, Path, description = "Alarm id"),
    ),
    responses(
        (status = OK, description = "Alarm details", body = AlarmResponse),
        (status = NOT_FOUND, description = "Alarm not found"),
    ),
)]
async fn get_alarm(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
) -> Result<Json<AlarmResponse>, StatusCode> {
    state
        .store
        .get(AlarmId(id))
        .await
        .map_err(|err| error_status(&err))?
        .map(|alarm| Json(alarm.into()))
        .ok_or(StatusCode::NOT_FOUND)
}

/// Replace an alarm's definition. Fire history is preserved.
#[utoipa::path(
    put,
    path = "/alarms/{id}",
    tag = "alarms",
    params(
        ("id" = u64, Path, description = "Alarm id"),
    ),
    request_body = AlarmBody,
    responses(
        (status = OK, description = "Updated alarm", body = AlarmResponse),
        (status = BAD_REQUEST, description = "Malformed alarm definition"),
        (status = NOT_FOUND, description = "Alarm not found"),
    ),
)]
async fn update_alarm(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
    Json(body): Json<AlarmBody>,
) -> Result<Json<AlarmResponse>, StatusCode> {
    let existing = state
        .store
        .get(AlarmId(id))
        .await
        .map_err(|err| error_status(&err))?
        .ok_or(StatusCode::NOT_FOUND)?;
    let new = parse_body(body).map_err(|err| error_status(&err))?;

    let alarm = AlarmDefinition {
        id: existing.id,
        label: new.label,
        time_of_day: new.time_of_day,
        days_of_week: new.days_of_week,
        enabled: new.enabled,
        sound_reference: new.sound_reference,
        last_fired_date: existing.last_fired_date,
    };
    let updated = state
        .store
        .upsert(alarm)
        .await
        .map_err(|err| error_status(&err))?;
    Ok(Json(updated.into()))
}

/// Delete an alarm.
#[utoipa::path(
    delete,
    path = "/alarms/{id}",
    tag = "alarms",
    params(
        ("id" = u64, Path, description = "Alarm id"),
    ),
    responses(
        (status = NO_CONTENT, description = "Alarm deleted"),
        (status = NOT_FOUND, description = "Alarm not found"),
    ),
)]
async fn delete_alarm(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, StatusCode> {
    let existed = state
        .store
        .delete(AlarmId(id))
        .await
        .map_err(|err| error_status(&err))?;
    if existed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

/// Flip an alarm's enabled state.
#[utoipa::path(
    post,
    path = "/alarms/{id}/toggle",
    tag = "alarms",
    params(
        ("id" = u64, Path, description = "Alarm id"),
    ),
    responses(
        (status = OK, description = "Alarm with its new enabled state", body = AlarmResponse),
        (status = NOT_FOUND, description = "Alarm not found"),
    ),
)]
async fn toggle_alarm(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
) -> Result<Json<AlarmResponse>, StatusCode> {
    let mut alarm = state
        .store
        .get(AlarmId(id))
        .await
        .map_err(|err| error_status(&err))?
        .ok_or(StatusCode::NOT_FOUND)?;
    alarm.enabled = !alarm.enabled;
    let updated = state
        .store
        .upsert(alarm)
        .await
        .map_err(|err| error_status(&err))?;
    Ok(Json(updated.into()))
}

/// Snooze the active alarm. A no-op when nothing is ringing.
#[utoipa::path(
    post,
    path = "/snooze",
    tag = "session",
    responses(
        (status = ACCEPTED, description = "Command queued"),
    ),
)]
async fn snooze(State(state): State<SharedState>) -> StatusCode {
    state.commands.submit(Command::Snooze).await;
    StatusCode::ACCEPTED
}

/// Dismiss the active alarm for the day. A no-op when nothing is ringing.
#[utoipa::path(
    post,
    path = "/dismiss",
    tag = "session",
    responses(
        (status = ACCEPTED, description = "Command queued"),
    ),
)]
async fn dismiss(State(state): State<SharedState>) -> StatusCode {
    state.commands.submit(Command::Dismiss).await;
    StatusCode::ACCEPTED
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, header};
    use http_body_util::BodyExt;
    use serde_json::json;
    use time::macros::datetime;
    use tokio::sync::{mpsc, watch};
    use tower::ServiceExt;

    use super::*;
    use crate::alarm::router::CommandRouter;
    use crate::alarm::session::{SessionSnapshot, SessionState};
    use crate::api::server::build_router;
    use crate::clock::FixedClock;
    use crate::store::AlarmStore;
    use crate::store::MemoryStore;

    fn test_router() -> (axum::Router, mpsc::Receiver<Command>, Arc<MemoryStore>) {
        let (command_tx, command_rx) = mpsc::channel(8);
        let store = Arc::new(MemoryStore::new());
        let (_snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot {
            state: SessionState::Idle,
            active_alarm_id: None,
            ring_started_at: None,
            snooze_until: None,
        });

        let state = SharedState {
            commands: CommandRouter::new(command_tx),
            store: store.clone(),
            clock: Arc::new(FixedClock::new(datetime!(2026-08-24 07:00:00 UTC))),
            snapshot_rx,
        };
        (build_router(state), command_rx, store)
    }

    fn alarm_json() -> serde_json::Value {
        json!({
            "label": "workday",
            "hour": 7,
            "minute": 0,
            "days_of_week": ["Mon", "Tue"],
            "sound_reference": "chime.mp3",
        })
    }

    fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let (router, _rx, _store) = test_router();
        let response = router
            .oneshot(Request::get("/v0/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn status_reports_idle_session() {
        let (router, _rx, _store) = test_router();
        let response = router
            .oneshot(Request::get("/v0/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["state"], "idle");
        assert_eq!(body["now"], "2026-08-24T07:00:00Z");
    }

    #[tokio::test]
    async fn create_then_list_round_trips() {
        let (router, _rx, _store) = test_router();

        let response = router
            .clone()
            .oneshot(post_json("/v0/alarms", &alarm_json()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["id"], 1);
        assert_eq!(created["time_display"], "07:00");
        assert_eq!(created["enabled"], true);

        let response = router
            .oneshot(Request::get("/v0/alarms").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let listed = body_json(response).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_rejects_invalid_time() {
        let (router, _rx, _store) = test_router();
        let mut body = alarm_json();
        body["hour"] = json!(24);

        let response = router.oneshot(post_json("/v0/alarms", &body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_rejects_unknown_weekday() {
        let (router, _rx, _store) = test_router();
        let mut body = alarm_json();
        body["days_of_week"] = json!(["Monday"]);

        let response = router.oneshot(post_json("/v0/alarms", &body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn toggle_flips_enabled() {
        let (router, _rx, _store) = test_router();
        router
            .clone()
            .oneshot(post_json("/v0/alarms", &alarm_json()))
            .await
            .unwrap();

        let response = router
            .oneshot(post_json("/v0/alarms/1/toggle", &json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["enabled"], false);
    }

    #[tokio::test]
    async fn missing_alarm_is_404() {
        let (router, _rx, _store) = test_router();
        let response = router
            .oneshot(Request::get("/v0/alarms/42").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn snooze_queues_command() {
        let (router, mut command_rx, _store) = test_router();
        let response = router
            .oneshot(post_json("/v0/snooze", &json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(command_rx.recv().await, Some(Command::Snooze));
    }

    #[tokio::test]
    async fn dismiss_queues_command() {
        let (router, mut command_rx, _store) = test_router();
        let response = router
            .oneshot(post_json("/v0/dismiss", &json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(command_rx.recv().await, Some(Command::Dismiss));
    }

    #[tokio::test]
    async fn delete_removes_alarm() {
        let (router, _rx, store) = test_router();
        router
            .clone()
            .oneshot(post_json("/v0/alarms", &alarm_json()))
            .await
            .unwrap();

        let response = router
            .oneshot(
                Request::delete("/v0/alarms/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(store.get(AlarmId(1)).await.unwrap().is_none());
    }
}
