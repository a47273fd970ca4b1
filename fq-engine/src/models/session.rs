//! Per-visit session state machine
//!
//! One session per screen visit:
//! IDLE → RESOLVING_DESIGN_CODE → RESOLVING_ITEMS → ACTIVE → ENDED
//!
//! The session owns every piece of state the end-of-session routine needs,
//! so teardown reads it directly instead of through shared references.

use crate::models::{HistoryKind, ItemRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Which screen flow a session serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    /// Identifiers typed one by one (duplicates merge)
    List,
    /// Identifiers taken from a design code (one row per line)
    Code,
}

impl SessionKind {
    pub fn history_kind(self) -> HistoryKind {
        match self {
            SessionKind::List => HistoryKind::List,
            SessionKind::Code => HistoryKind::Code,
        }
    }
}

/// Session workflow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    /// Waiting for input
    Idle,
    /// Design-code lookup in flight
    ResolvingDesignCode,
    /// Identifiers being resolved one at a time
    ResolvingItems,
    /// All identifiers processed
    Active,
    /// Torn down, history written if there was anything to write
    Ended,
}

/// State transition event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub session_id: Uuid,
    pub old_state: SessionState,
    pub new_state: SessionState,
    pub transitioned_at: DateTime<Utc>,
}

/// Session (in-memory state)
#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: Uuid,
    pub kind: SessionKind,
    pub state: SessionState,
    /// Accumulated rows, in display order
    pub items: Vec<ItemRecord>,
    /// Upper-cased design code, set once its lookup succeeded
    pub design_code: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    teardown: CancellationToken,
}

impl Session {
    pub fn new(kind: SessionKind) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            kind,
            state: SessionState::Idle,
            items: Vec::new(),
            design_code: None,
            started_at: Utc::now(),
            ended_at: None,
            teardown: CancellationToken::new(),
        }
    }

    /// Transition to new state
    pub fn transition_to(&mut self, new_state: SessionState) -> StateTransition {
        let transition = StateTransition {
            session_id: self.session_id,
            old_state: self.state,
            new_state,
            transitioned_at: Utc::now(),
        };
        self.state = new_state;

        if new_state == SessionState::Ended {
            self.ended_at = Some(Utc::now());
        }

        transition
    }

    /// Token cancelled when the surrounding context goes away
    ///
    /// The UI may clone it and cancel from elsewhere; in-flight resolution
    /// stops and late results are dropped.
    pub fn teardown_token(&self) -> CancellationToken {
        self.teardown.clone()
    }

    pub fn is_torn_down(&self) -> bool {
        self.teardown.is_cancelled()
    }

    pub(crate) fn cancel(&self) {
        self.teardown.cancel();
    }

    /// Merge by `clean_id`: bump an existing row or insert a new one at the top
    ///
    /// Returns the resulting quantity of the affected row.
    pub fn merge_item(&mut self, item: ItemRecord) -> u32 {
        if let Some(existing) = self.items.iter_mut().find(|i| i.clean_id == item.clean_id) {
            existing.quantity = existing.quantity.saturating_add(item.quantity.max(1));
            existing.quantity
        } else {
            let quantity = item.quantity.max(1);
            self.items.insert(0, item.with_quantity(quantity));
            quantity
        }
    }

    /// Append a row without merging
    pub fn push_row(&mut self, item: ItemRecord) {
        self.items.push(item);
    }

    /// Drop one row by position
    pub fn remove_row(&mut self, index: usize) -> Option<ItemRecord> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Human label for the history record
    pub fn history_title(&self) -> String {
        match (self.kind, &self.design_code) {
            (SessionKind::Code, Some(code)) => format!("Project: {}", code),
            _ => format!("List: {} items", self.items.len()),
        }
    }
}
