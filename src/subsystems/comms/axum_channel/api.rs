//! Axum handlers for `/api/*` routes.
//!
//! Each handler receives [`AxumState`] via [`axum::extract::State`] and
//! returns an axum [`Response`]. Errors are JSON bodies of the form
//! `{"error": code, "message": text}`.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::appointment::{self, AppointmentError, AppointmentRequest};
use crate::knowledge::Locale;

use super::AxumState;
use super::super::CommsEvent;

const NO_SESSION_ID: &str = "00000000-0000-0000-0000-000000000000";

// ── Request types ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct MessageRequest {
    #[serde(default)]
    message: String,
    session_id: Option<String>,
    locale: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct AppointmentBody {
    #[serde(flatten)]
    request: AppointmentRequest,
    locale: Option<String>,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Build a JSON error response body.
fn json_error(code: &str, msg: impl std::fmt::Display) -> Json<serde_json::Value> {
    Json(json!({ "error": code, "message": format!("{msg}") }))
}

/// Parse an optional locale code; `Ok(None)` when absent or blank.
fn parse_locale(code: Option<&str>) -> Result<Option<Locale>, Response> {
    match code.map(str::trim).filter(|c| !c.is_empty()) {
        None => Ok(None),
        Some(code) => Locale::parse(code)
            .map(Some)
            .map_err(|e| (StatusCode::BAD_REQUEST, json_error("config", e)).into_response()),
    }
}

fn unknown_session(id: &str) -> Response {
    (StatusCode::NOT_FOUND, json_error("not_found", format!("unknown session '{id}'")))
        .into_response()
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET /api/health
pub(super) async fn health(State(state): State<AxumState>) -> Response {
    let body = json!({
        "status": "ok",
        "bot_name": &*state.bot_name,
        "channel_id": &*state.channel_id,
        "sessions": state.sessions.len(),
        "default_locale": state.comms.chat().default_locale,
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// GET /api/content/{locale}: display strings, office info, form labels.
pub(super) async fn content(
    State(state): State<AxumState>,
    Path(locale): Path<String>,
) -> Response {
    match state.comms.matcher().content().lookup(&locale) {
        Ok(content) => (StatusCode::OK, Json(content)).into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, json_error("config", e)).into_response(),
    }
}

/// POST /api/message
pub(super) async fn message(
    State(state): State<AxumState>,
    Json(req): Json<MessageRequest>,
) -> Response {
    if req.message.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, json_error("bad_request", "message must not be empty"))
            .into_response();
    }

    let locale = match parse_locale(req.locale.as_deref()) {
        Ok(locale) => locale,
        Err(resp) => return resp,
    };

    let session_id = match req
        .session_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != NO_SESSION_ID)
    {
        None => None,
        Some(raw) => match Uuid::parse_str(raw) {
            Ok(id) => Some(id),
            Err(_) => return unknown_session(raw),
        },
    };

    let Some(outcome) = state.sessions.turn(
        &state.channel_id,
        session_id,
        locale,
        state.comms.chat().default_locale,
        &req.message,
        &state.comms,
    ) else {
        let raw = session_id.map(|id| id.to_string()).unwrap_or_default();
        warn!(channel_id = %state.channel_id, session_id = %raw, "message for unknown session");
        return unknown_session(&raw);
    };

    if outcome.created {
        state.comms.report_event(CommsEvent::SessionStarted {
            channel_id: state.channel_id.to_string(),
            session_id: outcome.session_id,
        });
    }

    let body = json!({
        "session_id": outcome.session_id,
        "locale": outcome.locale,
        "category": outcome.turn.category,
        "reply": outcome.turn.reply,
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// GET /api/sessions
pub(super) async fn sessions(State(state): State<AxumState>) -> Response {
    let body = json!({ "sessions": state.sessions.list() });
    (StatusCode::OK, Json(body)).into_response()
}

/// GET /api/session/{session_id}: full transcript.
pub(super) async fn session_detail(
    State(state): State<AxumState>,
    Path(session_id): Path<String>,
) -> Response {
    let Some(conversation) = Uuid::parse_str(&session_id)
        .ok()
        .and_then(|id| state.sessions.get(id))
    else {
        return unknown_session(&session_id);
    };

    let body = json!({
        "session_id": conversation.id(),
        "locale": conversation.locale(),
        "started_at": conversation.started_at(),
        "messages": conversation.messages(),
        "transcript": conversation.to_markdown(),
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// POST /api/appointment
pub(super) async fn appointment(
    State(state): State<AxumState>,
    Json(body): Json<AppointmentBody>,
) -> Response {
    let locale = match parse_locale(body.locale.as_deref()) {
        Ok(locale) => locale.unwrap_or(state.comms.chat().default_locale),
        Err(resp) => return resp,
    };
    let content = state.comms.matcher().content().get(locale);

    match appointment::submit(&body.request, content) {
        Ok(receipt) => (
            StatusCode::OK,
            Json(json!({ "reference": receipt.reference, "message": receipt.message })),
        )
            .into_response(),
        Err(e) => {
            debug!(channel_id = %state.channel_id, "appointment rejected: {e}");
            let AppointmentError::MissingRequired(fields) = &e;
            let missing: Vec<&str> = fields.iter().map(|f| f.as_str()).collect();
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "error": "validation",
                    "message": e.user_message(content),
                    "missing": missing,
                })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use serde_json::Value;
    use tokio::sync::mpsc;
    use tower::ServiceExt as _;

    use super::super::{AxumState, build_router, sessions::SessionTable};
    use super::*;
    use crate::config::Config;
    use crate::intent::IntentMatcher;
    use crate::subsystems::comms::CommsState;

    fn state() -> AxumState {
        let (tx, _rx) = mpsc::channel(64);
        AxumState {
            channel_id: Arc::from("axum-test"),
            comms: Arc::new(CommsState::new(IntentMatcher::builtin(), Config::test_default().chat, tx)),
            sessions: Arc::new(SessionTable::new(16)),
            bot_name: Arc::from("test"),
        }
    }

    async fn call(state: &AxumState, req: Request<Body>) -> (StatusCode, Value) {
        let resp = build_router(state.clone()).oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_ok() {
        let (status, body) = call(&state(), get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["default_locale"], "es");
    }

    #[tokio::test]
    async fn content_by_locale() {
        let s = state();
        let (status, body) = call(&s, get("/api/content/en")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["locale"], "en");
        assert_eq!(body["office"]["email"], "vera@lawenergyconsultants.com");

        let (status, body) = call(&s, get("/api/content/fr")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "config");
    }

    #[tokio::test]
    async fn message_opens_session_and_classifies() {
        let s = state();
        let (status, body) = call(
            &s,
            post("/api/message", json!({ "message": "How much do solar panels cost?", "locale": "en" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["category"], "renewable");
        assert_eq!(body["locale"], "en");
        assert!(body["reply"].as_str().unwrap().contains("renewable energy systems"));

        let id = body["session_id"].as_str().unwrap().to_string();
        let (status, detail) = call(&s, get(&format!("/api/session/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["messages"].as_array().unwrap().len(), 2);
        assert!(detail["transcript"].as_str().unwrap().contains("### user"));
    }

    #[tokio::test]
    async fn message_defaults_to_spanish() {
        let (status, body) =
            call(&state(), post("/api/message", json!({ "message": "tengo un caso en el tribunal" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["locale"], "es");
        assert_eq!(body["category"], "legal");
    }

    #[tokio::test]
    async fn nil_session_id_opens_new_session() {
        let (status, body) = call(
            &state(),
            post("/api/message", json!({ "message": "hola", "session_id": NO_SESSION_ID })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_ne!(body["session_id"], NO_SESSION_ID);
        assert_eq!(body["category"], "fallback");
    }

    #[tokio::test]
    async fn missing_message_field_is_json_bad_request() {
        let (status, body) =
            call(&state(), post("/api/message", json!({ "locale": "en" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn message_rejections() {
        let s = state();
        let (status, _) = call(&s, post("/api/message", json!({ "message": "   " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) =
            call(&s, post("/api/message", json!({ "message": "hi", "locale": "de" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "config");

        let unknown = Uuid::new_v4().to_string();
        let (status, _) =
            call(&s, post("/api/message", json!({ "message": "hi", "session_id": unknown }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&s, get("/api/session/not-a-uuid")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn sessions_lists_open_sessions() {
        let s = state();
        call(&s, post("/api/message", json!({ "message": "permit" }))).await;
        call(&s, post("/api/message", json!({ "message": "generator" }))).await;
        let (status, body) = call(&s, get("/api/sessions")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sessions"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn appointment_accepts_and_rejects() {
        let s = state();
        let (status, body) = call(
            &s,
            post("/api/appointment", json!({ "name": "Ana", "phone": "787-555-0100", "locale": "en" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "✅ Sent! We will contact you shortly.");

        let (status, body) =
            call(&s, post("/api/appointment", json!({ "name": "Ana", "email": "a@b.c" }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["missing"], json!(["phone"]));
        assert_eq!(body["message"], "⚠️ Por favor llene Nombre y Teléfono.");
    }
}
