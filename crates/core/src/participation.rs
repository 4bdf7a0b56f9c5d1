//! A single participation: one vote cast for one event.
//!
//! Binary layout:
//! ```text
//! [event_id: 32 bytes][answers_len: 1 byte][answers: answers_len bytes]
//! ```

use bytes::{Buf, BufMut};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec;
use crate::event_id::{decode_hex, encode_hex};
use crate::{Error, EventId, Result};

/// Maximum number of answers a participation may carry (one per ballot question).
pub const MAX_ANSWERS: usize = 10;

/// One vote cast for one event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participation {
    /// The event this participation targets.
    pub event_id: EventId,

    /// One answer value per ballot question, in question order.
    #[serde(with = "hex_bytes")]
    pub answers: Vec<u8>,
}

impl Participation {
    pub fn new(event_id: EventId, answers: Vec<u8>) -> Self {
        Self { event_id, answers }
    }

    /// Decode one record from the front of `buf`, advancing it.
    pub(crate) fn read_from(buf: &mut &[u8], validate: bool) -> Result<Self> {
        let mut event_id = [0u8; EventId::LENGTH];
        codec::ensure_remaining(buf, EventId::LENGTH)?;
        buf.copy_to_slice(&mut event_id);

        let len = codec::read_u8(buf)? as usize;
        codec::ensure_remaining(buf, len)?;
        let answers = buf[..len].to_vec();
        buf.advance(len);

        let participation = Self {
            event_id: EventId(event_id),
            answers,
        };
        if validate {
            participation.validate()?;
        }
        Ok(participation)
    }

    /// Append this record to `out`.
    pub(crate) fn write_to(&self, out: &mut Vec<u8>, validate: bool) -> Result<()> {
        if validate {
            self.validate()?;
        }
        let len = u8::try_from(self.answers.len()).map_err(|_| {
            Error::InvalidParticipation(format!(
                "{} answers exceed the one-byte length prefix",
                self.answers.len()
            ))
        })?;
        out.put_slice(self.event_id.as_bytes());
        out.put_u8(len);
        out.put_slice(&self.answers);
        Ok(())
    }

    /// Decode a single record. Returns the record and the number of bytes consumed.
    pub fn decode(data: &[u8], validate: bool) -> Result<(Self, usize)> {
        let mut buf = data;
        let participation = Self::read_from(&mut buf, validate)?;
        Ok((participation, data.len() - buf.len()))
    }

    /// Encode a single record.
    pub fn encode(&self, validate: bool) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.write_to(&mut out, validate)?;
        Ok(out)
    }

    /// Size of the binary form.
    pub fn encoded_len(&self) -> usize {
        EventId::LENGTH + 1 + self.answers.len()
    }

    /// Record-level checks applied when validation is requested.
    pub fn validate(&self) -> Result<()> {
        if self.answers.len() > MAX_ANSWERS {
            return Err(Error::InvalidParticipation(format!(
                "{} answers exceed the maximum of {}",
                self.answers.len(),
                MAX_ANSWERS
            )));
        }
        Ok(())
    }
}

mod hex_bytes {
    use super::*;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode_hex(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        decode_hex(&s).map_err(serde::de::Error::custom)
    }
}
