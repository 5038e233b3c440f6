//! Messaging provider client (Twilio REST API)

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response};
use serde::Deserialize;

use crate::error::ProviderError;

const API_VERSION: &str = "2010-04-01";

#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub account_sid: String,
    pub auth_token: String,
}

impl Credentials {
    /// Both values must be present and non-empty.
    pub fn from_parts(account_sid: Option<&str>, auth_token: Option<&str>) -> Option<Self> {
        match (account_sid, auth_token) {
            (Some(sid), Some(token)) if !sid.is_empty() && !token.is_empty() => Some(Self {
                account_sid: sid.to_string(),
                auth_token: token.to_string(),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutboundSms {
    pub from: String,
    pub to: String,
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageReceipt {
    pub sid: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfo {
    pub sid: String,
    pub friendly_name: String,
}

#[async_trait]
pub trait SmsProvider: Send + Sync {
    async fn send_message(&self, sms: &OutboundSms) -> Result<MessageReceipt, ProviderError>;

    async fn fetch_account(&self) -> Result<AccountInfo, ProviderError>;
}

/// Builds a provider client for the credentials carried by a request.
pub trait ProviderConnector: Send + Sync {
    fn connect(&self, credentials: &Credentials) -> Arc<dyn SmsProvider>;
}

pub struct TwilioConnector {
    http: Client,
    base_url: String,
}

impl TwilioConnector {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl ProviderConnector for TwilioConnector {
    fn connect(&self, credentials: &Credentials) -> Arc<dyn SmsProvider> {
        Arc::new(TwilioClient {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            credentials: credentials.clone(),
        })
    }
}

pub struct TwilioClient {
    http: Client,
    base_url: String,
    credentials: Credentials,
}

#[derive(Deserialize)]
struct TwilioErrorBody {
    code: Option<i64>,
    message: Option<String>,
}

impl TwilioClient {
    fn account_url(&self) -> String {
        format!(
            "{}/{}/Accounts/{}",
            self.base_url, API_VERSION, self.credentials.account_sid
        )
    }

    async fn decode<T: for<'de> Deserialize<'de>>(resp: Response) -> Result<T, ProviderError> {
        let status = resp.status();
        if status.is_success() {
            return resp
                .json::<T>()
                .await
                .map_err(|e| ProviderError::Decode(e.to_string()));
        }

        let text = resp.text().await.unwrap_or_default();
        let parsed = serde_json::from_str::<TwilioErrorBody>(&text).ok();
        let code = parsed.as_ref().and_then(|b| b.code);
        let message = parsed
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Provider request failed")
                    .to_string()
            });

        Err(ProviderError::Api {
            status: status.as_u16(),
            code,
            message,
        })
    }
}

#[async_trait]
impl SmsProvider for TwilioClient {
    async fn send_message(&self, sms: &OutboundSms) -> Result<MessageReceipt, ProviderError> {
        debug!("POST Messages.json to {}", sms.to);
        let resp = self
            .http
            .post(format!("{}/Messages.json", self.account_url()))
            .basic_auth(&self.credentials.account_sid, Some(&self.credentials.auth_token))
            .form(&[
                ("Body", sms.body.as_str()),
                ("From", sms.from.as_str()),
                ("To", sms.to.as_str()),
            ])
            .send()
            .await?;

        Self::decode(resp).await
    }

    async fn fetch_account(&self) -> Result<AccountInfo, ProviderError> {
        let resp = self
            .http
            .get(format!("{}.json", self.account_url()))
            .basic_auth(&self.credentials.account_sid, Some(&self.credentials.auth_token))
            .send()
            .await?;

        Self::decode(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn creds() -> Credentials {
        Credentials {
            account_sid: "AC123".to_string(),
            auth_token: "secret".to_string(),
        }
    }

    #[test]
    fn test_credentials_require_both() {
        assert!(Credentials::from_parts(Some("AC1"), Some("tok")).is_some());
        assert!(Credentials::from_parts(Some("AC1"), None).is_none());
        assert!(Credentials::from_parts(Some(""), Some("tok")).is_none());
        assert!(Credentials::from_parts(None, None).is_none());
    }

    #[tokio::test]
    async fn test_send_message_posts_form() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/2010-04-01/Accounts/AC123/Messages.json")
            .match_header("authorization", Matcher::Regex("^Basic ".to_string()))
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("To".into(), "+16175551234".into()),
                Matcher::UrlEncoded("From".into(), "+18005550100".into()),
                Matcher::UrlEncoded("Body".into(), "Hi Ana\nReply STOP to opt out.".into()),
            ]))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"sid":"SM1","status":"queued"}"#)
            .create_async()
            .await;

        let client = TwilioConnector::new(server.url()).connect(&creds());
        let receipt = client
            .send_message(&OutboundSms {
                from: "+18005550100".to_string(),
                to: "+16175551234".to_string(),
                body: "Hi Ana\nReply STOP to opt out.".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(receipt.sid, "SM1");
        assert_eq!(receipt.status.as_deref(), Some("queued"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_message_surfaces_provider_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/2010-04-01/Accounts/AC123/Messages.json")
            .with_status(400)
            .with_body(r#"{"code":21211,"message":"The 'To' number 123 is not a valid phone number.","status":400}"#)
            .create_async()
            .await;

        let client = TwilioConnector::new(server.url()).connect(&creds());
        let err = client
            .send_message(&OutboundSms {
                from: "+18005550100".to_string(),
                to: "123".to_string(),
                body: "hi".to_string(),
            })
            .await
            .unwrap_err();

        match &err {
            ProviderError::Api { status, code, .. } => {
                assert_eq!(*status, 400);
                assert_eq!(*code, Some(21211));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.to_string(), "The 'To' number 123 is not a valid phone number.");
    }

    #[tokio::test]
    async fn test_fetch_account() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/2010-04-01/Accounts/AC123.json")
            .with_status(200)
            .with_body(r#"{"sid":"AC123","friendly_name":"Campaign HQ","status":"active"}"#)
            .create_async()
            .await;

        let client = TwilioConnector::new(server.url()).connect(&creds());
        let account = client.fetch_account().await.unwrap();
        assert_eq!(account.friendly_name, "Campaign HQ");
    }

    #[tokio::test]
    async fn test_fetch_account_unparseable_error_uses_status_text() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/2010-04-01/Accounts/AC123.json")
            .with_status(401)
            .with_body("nope")
            .create_async()
            .await;

        let client = TwilioConnector::new(server.url()).connect(&creds());
        let err = client.fetch_account().await.unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized");
        assert_eq!(err.status(), Some(401));
    }
}
