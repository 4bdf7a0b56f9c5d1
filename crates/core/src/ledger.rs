//! Capabilities the tally consumes from the surrounding node, and an
//! in-memory snapshot that provides all of them.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Error, Event, EventId, MilestoneIndex, Result};

/// Which balance figure to read for an answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BalanceKind {
    /// Vote balance at the confirmed milestone.
    Current,
    /// Vote balance accumulated over the holding period.
    Accumulated,
}

/// Looks up events by id.
pub trait EventStore: Send + Sync {
    fn event(&self, event_id: &EventId) -> Option<Event>;
}

/// Reports the latest confirmed milestone.
pub trait ConfirmationTracker: Send + Sync {
    fn confirmed_milestone_index(&self) -> MilestoneIndex;
}

/// Answers per-answer vote balances.
pub trait BalanceLedger: Send + Sync {
    fn balance(
        &self,
        event_id: &EventId,
        question_index: u8,
        answer_value: u8,
        kind: BalanceKind,
    ) -> Result<u64>;
}

/// Balance figures for one answer of one question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceEntry {
    pub event_id: EventId,
    pub question: u8,
    pub answer: u8,
    #[serde(default)]
    pub current: u64,
    #[serde(default)]
    pub accumulated: u64,
}

/// A point-in-time view of events and their balances.
///
/// Answers without an entry read as zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    pub confirmed_milestone_index: MilestoneIndex,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub balances: Vec<BalanceEntry>,
}

impl LedgerSnapshot {
    pub fn new(confirmed_milestone_index: MilestoneIndex) -> Self {
        Self {
            confirmed_milestone_index,
            ..Default::default()
        }
    }

    /// Parse a snapshot from JSON bytes.
    pub fn from_json_slice(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Load a snapshot from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_json_slice(&data)
    }

    pub fn with_event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }

    /// Set the balances for one answer, replacing any previous entry.
    pub fn set_balance(
        &mut self,
        event_id: EventId,
        question: u8,
        answer: u8,
        current: u64,
        accumulated: u64,
    ) {
        self.balances
            .retain(|b| !(b.event_id == event_id && b.question == question && b.answer == answer));
        self.balances.push(BalanceEntry {
            event_id,
            question,
            answer,
            current,
            accumulated,
        });
    }
}

impl EventStore for LedgerSnapshot {
    fn event(&self, event_id: &EventId) -> Option<Event> {
        self.events.iter().find(|e| &e.id == event_id).cloned()
    }
}

impl ConfirmationTracker for LedgerSnapshot {
    fn confirmed_milestone_index(&self) -> MilestoneIndex {
        self.confirmed_milestone_index
    }
}

impl BalanceLedger for LedgerSnapshot {
    fn balance(
        &self,
        event_id: &EventId,
        question_index: u8,
        answer_value: u8,
        kind: BalanceKind,
    ) -> Result<u64> {
        if !self.events.iter().any(|e| &e.id == event_id) {
            return Err(Error::Ledger(format!("no balances recorded for event {}", event_id)));
        }

        let entry = self.balances.iter().find(|b| {
            &b.event_id == event_id && b.question == question_index && b.answer == answer_value
        });

        Ok(match (entry, kind) {
            (Some(b), BalanceKind::Current) => b.current,
            (Some(b), BalanceKind::Accumulated) => b.accumulated,
            (None, _) => 0,
        })
    }
}
