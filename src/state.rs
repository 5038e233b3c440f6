//! Process-wide opt-out list and inbound message log
//!
//! Both live only in memory and are lost on restart. Handlers take short
//! locks and never hold one across a provider call, so a number opted out in
//! the middle of a broadcast is seen by that broadcast's later contacts.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::provider::{ProviderConnector, TwilioConnector};
use crate::rate_limit::RatePolicy;
use crate::types::IncomingMessage;

/// Grow-only set of numbers that must not receive broadcasts, kept in the
/// order they opted out.
#[derive(Debug, Default)]
pub struct OptOutList {
    seen: HashSet<String>,
    order: Vec<String>,
}

impl OptOutList {
    /// Returns false if the number was already opted out.
    pub fn insert(&mut self, phone: &str) -> bool {
        if self.seen.insert(phone.to_string()) {
            self.order.push(phone.to_string());
            true
        } else {
            false
        }
    }

    pub fn contains(&self, phone: &str) -> bool {
        self.seen.contains(phone)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.order.clone()
    }
}

#[derive(Debug, Default)]
pub struct MessageLog {
    entries: VecDeque<IncomingMessage>,
    capacity: Option<usize>,
}

impl MessageLog {
    /// `Some(0)` is treated as unbounded.
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.filter(|c| *c > 0),
        }
    }

    pub fn push(&mut self, message: IncomingMessage) {
        if let Some(cap) = self.capacity {
            while self.entries.len() >= cap {
                if self.entries.pop_front().is_none() {
                    break;
                }
            }
        }
        self.entries.push_back(message);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_vec(&self) -> Vec<IncomingMessage> {
        self.entries.iter().cloned().collect()
    }
}

pub struct AppState {
    pub opt_outs: RwLock<OptOutList>,
    pub messages: RwLock<MessageLog>,
    pub connector: Arc<dyn ProviderConnector>,
    pub rate_policy: RatePolicy,
}

impl AppState {
    pub fn new(connector: Arc<dyn ProviderConnector>, rate_policy: RatePolicy) -> Self {
        Self {
            opt_outs: RwLock::new(OptOutList::default()),
            messages: RwLock::new(MessageLog::default()),
            connector,
            rate_policy,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let connector = Arc::new(TwilioConnector::new(config.provider_base_url.clone()));
        let mut state = Self::new(connector, RatePolicy::default());
        state.messages = RwLock::new(MessageLog::with_capacity(config.message_log_capacity));
        state
    }

    pub async fn is_opted_out(&self, phone: &str) -> bool {
        self.opt_outs.read().await.contains(phone)
    }

    pub async fn opt_out(&self, phone: &str) -> bool {
        self.opt_outs.write().await.insert(phone)
    }
}
