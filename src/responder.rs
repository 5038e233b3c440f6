//! Inbound SMS handling: opt-outs and canned informational replies

use chrono::{SecondsFormat, Utc};
use log::info;

use crate::state::AppState;
use crate::types::IncomingMessage;

/// Exact (trimmed, lowercased) bodies that opt the sender out.
pub const STOP_KEYWORDS: &[&str] = &["stop", "unsubscribe", "cancel", "quit", "end"];

pub const OPT_OUT_CONFIRMATION: &str = "You have been removed from our list. -- Campaign HQ";

pub const EMPTY_TWIML: &str = "<Response></Response>";

pub struct ReplyRule {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub reply: &'static str,
}

impl ReplyRule {
    fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k))
    }
}

/// Evaluated in order; the first rule with a keyword inside the body wins.
pub static REPLY_RULES: &[ReplyRule] = &[
    ReplyRule {
        name: "polling-location",
        keywords: &["poll", "polling", "vote", "where", "location"],
        reply: "Find your polling location at vote.gov. Polls open 7am-7pm on Election Day! -- Campaign HQ",
    },
    ReplyRule {
        name: "polling-hours",
        keywords: &["time", "open", "close", "hours", "when"],
        reply: "Polls are open 7:00 AM - 7:00 PM on Election Day. Check vote.gov for early voting! -- Campaign HQ",
    },
    ReplyRule {
        name: "registration",
        keywords: &["register", "registration"],
        reply: "Register or check your status at vote.org. -- Campaign HQ",
    },
];

pub fn normalize(body: &str) -> String {
    body.trim().to_lowercase()
}

pub fn is_stop_request(normalized: &str) -> bool {
    STOP_KEYWORDS.contains(&normalized)
}

pub fn classify(normalized: &str) -> Option<&'static ReplyRule> {
    REPLY_RULES.iter().find(|rule| rule.matches(normalized))
}

#[derive(Debug, Clone, PartialEq)]
pub enum InboundOutcome {
    OptedOut,
    Replied(&'static str),
    Acknowledged,
}

impl InboundOutcome {
    pub fn twiml(&self) -> String {
        match self {
            Self::OptedOut => message_twiml(OPT_OUT_CONFIRMATION),
            Self::Replied(text) => message_twiml(text),
            Self::Acknowledged => EMPTY_TWIML.to_string(),
        }
    }
}

pub async fn handle_incoming(state: &AppState, from: &str, body: &str) -> InboundOutcome {
    let text = normalize(body);

    if is_stop_request(&text) {
        let added = state.opt_out(from).await;
        info!("Opt-out from {} (new: {})", from, added);
        return InboundOutcome::OptedOut;
    }

    state.messages.write().await.push(IncomingMessage {
        phone: from.to_string(),
        body: body.to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    });

    match classify(&text) {
        Some(rule) => {
            info!("Inbound from {} matched {}", from, rule.name);
            InboundOutcome::Replied(rule.reply)
        }
        None => {
            info!("Inbound from {} logged without reply", from);
            InboundOutcome::Acknowledged
        }
    }
}

pub fn message_twiml(text: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
        escape_xml(text)
    )
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
