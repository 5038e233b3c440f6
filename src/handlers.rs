use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::{Form, Json};
use log::{info, warn};

use crate::dispatch::{dispatch_broadcast, BroadcastJob};
use crate::error::AppError;
use crate::provider::{Credentials, OutboundSms};
use crate::responder::handle_incoming;
use crate::state::AppState;
use crate::types::{
    HealthResponse, IncomingForm, MessagesResponse, ReplyRequest, ReplyResponse, SendRequest,
    SendResponse, TestConnectionRequest, TestConnectionResponse,
};

/// A body that isn't JSON at all reads as an empty request, so the usual
/// field validation answers it. Broken JSON is a 400 with the parser's text.
fn json_or_default<T: Default>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match payload {
        Ok(Json(req)) => Ok(req),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
    }
}

pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn test_connection(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TestConnectionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let req = json_or_default(payload)?;
    let creds = Credentials::from_parts(req.account_sid.as_deref(), req.auth_token.as_deref())
        .ok_or_else(|| AppError::BadRequest("Missing credentials.".to_string()))?;

    let account = state
        .connector
        .connect(&creds)
        .fetch_account()
        .await
        .map_err(|e| {
            warn!("Connection test for {} failed: {}", creds.account_sid, e);
            AppError::Unauthorized(e.to_string())
        })?;

    info!("Connection test ok for {} ({})", account.sid, account.friendly_name);
    Ok(Json(TestConnectionResponse {
        success: true,
        account_name: account.friendly_name,
    }))
}

pub async fn send_broadcast(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SendRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let req = json_or_default(payload)?;
    let creds = Credentials::from_parts(req.account_sid.as_deref(), req.auth_token.as_deref());
    let from = req.from.filter(|f| !f.is_empty());
    let (creds, from) = match (creds, from) {
        (Some(creds), Some(from)) => (creds, from),
        _ => return Err(AppError::BadRequest("Missing Twilio credentials.".to_string())),
    };

    let contacts = req.contacts.unwrap_or_default();
    if contacts.is_empty() {
        return Err(AppError::BadRequest("No contacts provided.".to_string()));
    }

    info!("Broadcast from {} to {} contacts", from, contacts.len());
    let provider = state.connector.connect(&creds);
    let job = BroadcastJob {
        from,
        template: req.message_template,
        footer: req.opt_out_footer,
        contacts,
    };
    let result = dispatch_broadcast(&state, provider.as_ref(), job).await;

    Ok(Json(SendResponse {
        success: true,
        sent: result.sent,
        failed: result.failed,
        errors: result.truncated_errors(),
    }))
}

pub async fn incoming(
    State(state): State<Arc<AppState>>,
    Form(form): Form<IncomingForm>,
) -> impl IntoResponse {
    let outcome = handle_incoming(&state, &form.from, &form.body).await;
    ([(header::CONTENT_TYPE, "text/xml")], outcome.twiml())
}

pub async fn list_messages(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let messages = state.messages.read().await.to_vec();
    let opted_out = state.opt_outs.read().await.to_vec();
    Json(MessagesResponse {
        messages,
        opted_out,
    })
}

pub async fn reply(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ReplyRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let req = json_or_default(payload)?;
    let creds = Credentials::from_parts(req.account_sid.as_deref(), req.auth_token.as_deref())
        .ok_or_else(|| anyhow::anyhow!("Missing credentials."))?;

    let sms = OutboundSms {
        from: req.from,
        to: req.to,
        body: req.body,
    };
    let receipt = state.connector.connect(&creds).send_message(&sms).await?;
    info!("Reply {} sent to {}", receipt.sid, sms.to);

    Ok(Json(ReplyResponse { success: true }))
}
