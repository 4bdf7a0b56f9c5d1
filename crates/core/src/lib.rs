//! ezvote-participation: participation codec and event status tally.
//!
//! This crate implements two pieces of the ezvote ledger's voting subsystem:
//! - `Participations`: a bounded, length-prefixed collection of votes with a
//!   binary and a JSON form
//! - `StatusAggregator`: folds per-answer vote balances from the ledger into
//!   an `EventStatus` report and a SHA-256 checksum over the whole tally

mod codec;
mod error;
mod event;
mod event_id;
pub mod ledger;
mod participation;
mod participations;
mod status;

pub use error::{Error, Result};
pub use event::{
    ANSWER_VALUE_INVALID, ANSWER_VALUE_SKIPPED, Answer, Event, EventState, MilestoneIndex, Question,
};
pub use event_id::EventId;
pub use ledger::{BalanceKind, BalanceLedger, ConfirmationTracker, EventStore, LedgerSnapshot};
pub use participation::{MAX_ANSWERS, Participation};
pub use participations::{MAX_PARTICIPATIONS, MIN_PARTICIPATIONS, Participations};
pub use status::{AnswerStatus, EventStatus, QuestionStatus, StatusAggregator};
