//! Event status: per-answer tallies and a checksum over all of them.
//!
//! The checksum is SHA-256 over, for every question in declaration order:
//! ```text
//! question_index: u8
//! for each declared answer, then skipped (0), then invalid (255):
//!     value: u8, current: u64 LE, accumulated: u64 LE
//! ```
//! Two observers with the same ledger state get the same checksum, so they
//! can compare tallies without exchanging them.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::{self, Write};
use tracing::{debug, trace, warn};

use crate::ledger::{BalanceKind, BalanceLedger, ConfirmationTracker, EventStore};
use crate::{ANSWER_VALUE_INVALID, ANSWER_VALUE_SKIPPED, Error, EventId, MilestoneIndex, Result};

/// Current and accumulated vote for an answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerStatus {
    pub value: u8,
    pub current: u64,
    pub accumulated: u64,
}

/// The answers recorded for a question.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionStatus {
    pub answers: Vec<AnswerStatus>,
}

impl QuestionStatus {
    /// The status recorded for `answer_value`, if any.
    pub fn status_for_answer_value(&self, answer_value: u8) -> Option<&AnswerStatus> {
        self.answers.iter().find(|a| a.value == answer_value)
    }
}

/// Status of an event at a confirmed milestone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStatus {
    pub milestone_index: MilestoneIndex,
    pub status: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub questions: Vec<QuestionStatus>,
    pub checksum: String,
}

impl EventStatus {
    pub fn answer_status(&self, question_index: usize, answer_value: u8) -> Option<&AnswerStatus> {
        self.questions
            .get(question_index)?
            .status_for_answer_value(answer_value)
    }
}

/// Streaming SHA-256 over fixed-width little-endian fields.
struct StatusHasher<W: Write = Sha256> {
    inner: W,
}

impl StatusHasher {
    fn new() -> Self {
        Self {
            inner: Sha256::new(),
        }
    }

    fn finalize_hex(self) -> String {
        hex::encode(self.inner.finalize())
    }
}

impl<W: Write> StatusHasher<W> {
    fn write_u8(&mut self, value: u8) -> io::Result<()> {
        self.inner.write_all(&[value])
    }

    fn write_u64(&mut self, value: u64) -> io::Result<()> {
        self.inner.write_all(&value.to_le_bytes())
    }

    fn write_answer(&mut self, answer: &AnswerStatus) -> io::Result<()> {
        self.write_u8(answer.value)?;
        self.write_u64(answer.current)?;
        self.write_u64(answer.accumulated)
    }
}

/// Computes [`EventStatus`] reports from the node's event store, confirmation
/// tracker and balance ledger.
pub struct StatusAggregator<'a> {
    events: &'a dyn EventStore,
    tracker: &'a dyn ConfirmationTracker,
    balances: &'a dyn BalanceLedger,
}

impl<'a> StatusAggregator<'a> {
    pub fn new(
        events: &'a dyn EventStore,
        tracker: &'a dyn ConfirmationTracker,
        balances: &'a dyn BalanceLedger,
    ) -> Self {
        Self {
            events,
            tracker,
            balances,
        }
    }

    /// Use one value that provides all three capabilities.
    pub fn from_ledger<L>(ledger: &'a L) -> Self
    where
        L: EventStore + ConfirmationTracker + BalanceLedger,
    {
        Self::new(ledger, ledger, ledger)
    }

    /// Compute the status of `event_id` at the confirmed milestone.
    pub fn event_status(&self, event_id: &EventId) -> Result<EventStatus> {
        let milestone_index = self.tracker.confirmed_milestone_index();

        let event = self.events.event(event_id).ok_or_else(|| {
            warn!(%event_id, "status requested for unknown event");
            Error::EventNotFound(*event_id)
        })?;

        let mut hasher = StatusHasher::new();
        let mut questions = Vec::with_capacity(event.ballot_questions().len());

        for (idx, question) in event.ballot_questions().iter().enumerate() {
            let question_index = u8::try_from(idx).map_err(|_| {
                Error::InvalidEvent(format!("event {} declares more than 256 questions", event_id))
            })?;
            hasher.write_u8(question_index)?;

            let answer_values = question
                .answer_values()
                .chain([ANSWER_VALUE_SKIPPED, ANSWER_VALUE_INVALID]);

            let mut question_status = QuestionStatus::default();
            for answer_value in answer_values {
                let answer = self.answer_status(event_id, question_index, answer_value)?;
                hasher.write_answer(&answer)?;
                question_status.answers.push(answer);
            }
            questions.push(question_status);
        }

        let status = EventStatus {
            milestone_index,
            status: event.status(milestone_index).to_string(),
            questions,
            checksum: hasher.finalize_hex(),
        };
        debug!(
            %event_id,
            milestone_index,
            status = %status.status,
            checksum = %status.checksum,
            "computed event status"
        );
        Ok(status)
    }

    fn answer_status(&self, event_id: &EventId, question_index: u8, answer_value: u8) -> Result<AnswerStatus> {
        let current = self
            .balances
            .balance(event_id, question_index, answer_value, BalanceKind::Current)?;
        let accumulated = self
            .balances
            .balance(event_id, question_index, answer_value, BalanceKind::Accumulated)?;
        trace!(question_index, answer_value, current, accumulated, "answer balance");

        Ok(AnswerStatus {
            value: answer_value,
            current,
            accumulated,
        })
    }
}
