use crate::motion_file::load_motion_file;
use crate::state::DaemonState;
use api::TrackingMode;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use common::retarget::TargetSkeleton;
use common::{CalibrationProfile, CalibrationStep, ParallaxError, RetargetConfig};
use log::{info, warn};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;

type Reply = (StatusCode, Json<Value>);

pub fn get_router(state: DaemonState) -> Router {
    Router::new()
        .route("/status", get(status_handler))
        .route(
            "/calibration",
            get(calibration_handler).put(replace_calibration_handler),
        )
        .route("/calibration/step/:step", post(calibration_step_handler))
        .route("/calibration/distance", post(distance_handler))
        .route("/tracking/mode", put(tracking_mode_handler))
        .route(
            "/retarget/config",
            get(retarget_config_handler).put(replace_retarget_config_handler),
        )
        .route("/retarget/load", post(retarget_load_handler))
        .route("/retarget/clip", get(retarget_clip_handler))
        .route("/skeleton", put(skeleton_handler))
        .with_state(state)
}

fn ok(body: Value) -> Reply {
    (StatusCode::OK, Json(body))
}

fn error_reply(err: &ParallaxError) -> Reply {
    let (code, status) = match err {
        ParallaxError::MissingTarget(_) => (StatusCode::PRECONDITION_FAILED, "missing_target"),
        ParallaxError::MalformedSource { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "malformed_source")
        }
        ParallaxError::RetargetInFlight => (StatusCode::CONFLICT, "retarget_in_flight"),
        ParallaxError::InvalidConfig { .. } => (StatusCode::BAD_REQUEST, "invalid_config"),
    };
    (
        code,
        Json(json!({
            "status": status,
            "message": err.to_string()
        })),
    )
}

fn internal_reply(message: String) -> Reply {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "status": "error", "message": message })),
    )
}

async fn status_handler(State(state): State<DaemonState>) -> Reply {
    ok(json!({
        "status": "ok",
        "tracking": state.status()
    }))
}

async fn calibration_handler(State(state): State<DaemonState>) -> Reply {
    ok(json!({
        "status": "ok",
        "calibration": state.profile()
    }))
}

async fn replace_calibration_handler(
    State(state): State<DaemonState>,
    Json(profile): Json<CalibrationProfile>,
) -> Reply {
    match state.set_profile(profile) {
        Ok(()) => ok(json!({
            "status": "ok",
            "calibration": state.profile()
        })),
        Err(e) => error_reply(&e),
    }
}

async fn calibration_step_handler(
    State(state): State<DaemonState>,
    Path(step): Path<String>,
) -> Reply {
    let Some(parsed) = CalibrationStep::parse(&step) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({
                "status": "unknown_step",
                "message": format!("Unknown calibration step '{}'", step)
            })),
        );
    };

    match state.calibration_step(parsed) {
        Ok(profile) => ok(json!({
            "status": "ok",
            "step": step,
            "calibration": profile
        })),
        Err(e) => {
            warn!("Calibration step {} rejected: {}", step, e);
            error_reply(&e)
        }
    }
}

async fn distance_handler(State(state): State<DaemonState>) -> Reply {
    state.request_distance_calibration();
    ok(json!({ "status": "requested" }))
}

#[derive(Debug, Deserialize)]
struct ModePayload {
    mode: TrackingMode,
}

async fn tracking_mode_handler(
    State(state): State<DaemonState>,
    Json(payload): Json<ModePayload>,
) -> Reply {
    state.request_mode(payload.mode);
    ok(json!({
        "status": "requested",
        "mode": payload.mode
    }))
}

async fn retarget_config_handler(State(state): State<DaemonState>) -> Reply {
    ok(json!({
        "status": "ok",
        "config": state.retarget.config()
    }))
}

async fn replace_retarget_config_handler(
    State(state): State<DaemonState>,
    Json(config): Json<RetargetConfig>,
) -> Reply {
    let session = state.retarget.clone();
    let result = tokio::task::spawn_blocking(move || session.set_config(config)).await;
    match result {
        Ok(Ok(clip)) => ok(json!({
            "status": "ok",
            "config": state.retarget.config(),
            "retargeted": clip.is_some()
        })),
        Ok(Err(e)) => error_reply(&e),
        Err(e) => internal_reply(e.to_string()),
    }
}

async fn skeleton_handler(
    State(state): State<DaemonState>,
    Json(skeleton): Json<TargetSkeleton>,
) -> Reply {
    let session = state.retarget.clone();
    let result = tokio::task::spawn_blocking(move || session.load_skeleton(skeleton)).await;
    match result {
        Ok(Ok(clip)) => ok(json!({
            "status": "ok",
            "retargeted": clip.is_some()
        })),
        Ok(Err(e)) => error_reply(&e),
        Err(e) => internal_reply(e.to_string()),
    }
}

#[derive(Debug, Deserialize)]
struct LoadPayload {
    path: PathBuf,
}

async fn retarget_load_handler(
    State(state): State<DaemonState>,
    Json(payload): Json<LoadPayload>,
) -> Reply {
    let session = state.retarget.clone();
    let path = payload.path;
    let result = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
        let source = load_motion_file(&path)?;
        Ok(session.load_source(source)?)
    })
    .await;

    match result {
        Ok(Ok(clip)) => {
            info!("Clip '{}' ready ({:.2}s)", clip.name, clip.duration);
            ok(json!({
                "status": "ok",
                "duration": clip.duration,
                "tracks": clip.tracks.len(),
                "diagnostics": clip.diagnostics
            }))
        }
        Ok(Err(e)) => match e.downcast_ref::<ParallaxError>() {
            Some(p) => error_reply(p),
            None => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "status": "io_error",
                    "message": format!("{:#}", e)
                })),
            ),
        },
        Err(e) => internal_reply(e.to_string()),
    }
}

async fn retarget_clip_handler(State(state): State<DaemonState>) -> Reply {
    match state.retarget.clip() {
        Some(clip) => ok(json!({
            "status": "ok",
            "clip": clip.as_ref()
        })),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "status": "no_clip" })),
        ),
    }
}
