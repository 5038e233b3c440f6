use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default)]
    pub phone: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub city: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConnectionRequest {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConnectionResponse {
    pub success: bool,
    pub account_name: String,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub from: Option<String>,
    pub contacts: Option<Vec<Contact>>,
    pub message_template: Option<String>,
    pub opt_out_footer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendError {
    pub phone: String,
    pub reason: String,
}

#[derive(Serialize)]
pub struct SendResponse {
    pub success: bool,
    pub sent: usize,
    pub failed: usize,
    pub errors: Vec<SendError>,
}

/// Webhook form posted by the provider for each inbound SMS.
#[derive(Debug, Default, Deserialize)]
pub struct IncomingForm {
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "Body", default)]
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomingMessage {
    pub phone: String,
    pub body: String,
    pub timestamp: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesResponse {
    pub messages: Vec<IncomingMessage>,
    pub opted_out: Vec<String>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Serialize)]
pub struct ReplyResponse {
    pub success: bool,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}
