//! Voting event definitions.
//!
//! Only the parts the tally needs: the ballot's questions and their valid
//! answer values, and the milestone indexes that drive the status label.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::EventId;

/// Index of a confirmed milestone.
pub type MilestoneIndex = u32;

/// Answer value recorded when a question was skipped.
pub const ANSWER_VALUE_SKIPPED: u8 = 0;

/// Answer value recorded when the given answer was not a valid choice.
pub const ANSWER_VALUE_INVALID: u8 = 255;

/// A valid answer to a ballot question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub value: u8,
    #[serde(default)]
    pub text: String,
}

/// A ballot question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub text: String,
    pub answers: Vec<Answer>,
}

/// A voting event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    #[serde(default)]
    pub name: String,
    pub milestone_index_commence: MilestoneIndex,
    pub milestone_index_start: MilestoneIndex,
    pub milestone_index_end: MilestoneIndex,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Where an event is in its lifecycle at a given milestone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventState {
    Upcoming,
    Commencing,
    Holding,
    Ended,
}

impl EventState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventState::Upcoming => "upcoming",
            EventState::Commencing => "commencing",
            EventState::Holding => "holding",
            EventState::Ended => "ended",
        }
    }
}

impl fmt::Display for EventState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Event {
    /// Lifecycle state at `index`.
    pub fn status(&self, index: MilestoneIndex) -> EventState {
        if index < self.milestone_index_commence {
            EventState::Upcoming
        } else if index < self.milestone_index_start {
            EventState::Commencing
        } else if index < self.milestone_index_end {
            EventState::Holding
        } else {
            EventState::Ended
        }
    }

    /// The ballot questions, in declaration order.
    pub fn ballot_questions(&self) -> &[Question] {
        &self.questions
    }
}

impl Question {
    /// The declared answer values, in declaration order.
    pub fn answer_values(&self) -> impl Iterator<Item = u8> + '_ {
        self.answers.iter().map(|a| a.value)
    }
}
