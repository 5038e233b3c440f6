//! Broadcast dispatcher: one templated SMS per contact, in order

use log::{debug, info, warn};

use crate::provider::{OutboundSms, SmsProvider};
use crate::state::AppState;
use crate::template::render_message;
use crate::types::{Contact, SendError};

/// Error entries returned to the caller; the failure count stays exact.
pub const MAX_REPORTED_ERRORS: usize = 20;

pub struct BroadcastJob {
    pub from: String,
    pub template: Option<String>,
    pub footer: Option<String>,
    pub contacts: Vec<Contact>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SendResult {
    pub sent: usize,
    pub failed: usize,
    pub errors: Vec<SendError>,
}

impl SendResult {
    pub fn truncated_errors(&self) -> Vec<SendError> {
        self.errors.iter().take(MAX_REPORTED_ERRORS).cloned().collect()
    }
}

pub async fn dispatch_broadcast(
    state: &AppState,
    provider: &dyn SmsProvider,
    job: BroadcastJob,
) -> SendResult {
    let mut result = SendResult::default();
    let mut limiter = state.rate_policy.limiter();

    for contact in &job.contacts {
        // opted-out numbers count as failed but carry no error entry
        if state.is_opted_out(&contact.phone).await {
            debug!("Skipping opted-out number {}", contact.phone);
            result.failed += 1;
            continue;
        }

        let sms = OutboundSms {
            from: job.from.clone(),
            to: contact.phone.clone(),
            body: render_message(job.template.as_deref(), contact, job.footer.as_deref()),
        };

        limiter.acquire().await;
        let outcome = provider.send_message(&sms).await;
        limiter.completed();

        match outcome {
            Ok(receipt) => {
                debug!(
                    "Sent {} to {} ({})",
                    receipt.sid,
                    contact.phone,
                    receipt.status.as_deref().unwrap_or("unknown")
                );
                result.sent += 1;
            }
            Err(e) => {
                warn!("Send to {} failed: {}", contact.phone, e);
                result.failed += 1;
                result.errors.push(SendError {
                    phone: contact.phone.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        "Broadcast from {} finished: {} sent, {} failed",
        job.from, result.sent, result.failed
    );
    result
}
