//! Bounded collections of participations.
//!
//! Binary layout:
//! ```text
//! [count: 1 byte][participation_1]...[participation_count]
//! ```
//!
//! JSON layout:
//! ```text
//! {"participations": [<participation>, ...]}
//! ```

use bytes::BufMut;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::codec::{self, ArrayBounds};
use crate::{Error, Participation, Result};

/// Minimum number of participations in a validated collection.
pub const MIN_PARTICIPATIONS: usize = 1;

/// Maximum number of participations in a validated collection.
pub const MAX_PARTICIPATIONS: usize = 255;

const PARTICIPATION_BOUNDS: ArrayBounds = ArrayBounds {
    min: MIN_PARTICIPATIONS,
    max: MAX_PARTICIPATIONS,
};

/// Participations for multiple events, in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Participations {
    pub participations: Vec<Participation>,
}

impl Participations {
    /// Wrap records as-is; nothing is validated until encode or [`Participations::validate`].
    pub fn new(participations: Vec<Participation>) -> Self {
        Self { participations }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.participations.len()
    }

    /// Whether the collection holds no records.
    pub fn is_empty(&self) -> bool {
        self.participations.is_empty()
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Participation> {
        self.participations.iter()
    }

    /// Decode a collection. Returns the collection and the number of bytes consumed.
    ///
    /// With `validate` set, the count must be within bounds, every record must
    /// pass record-level validation, and no two records may target the same event.
    pub fn decode(data: &[u8], validate: bool) -> Result<(Self, usize)> {
        let mut buf = data;
        let count = codec::read_u8(&mut buf)? as usize;

        if validate {
            PARTICIPATION_BOUNDS.check(count).inspect_err(|e| warn!("{}", e))?;
        }

        let mut participations = Vec::with_capacity(count);
        for _ in 0..count {
            participations.push(Participation::read_from(&mut buf, validate)?);
        }

        let decoded = Self { participations };
        if validate {
            decoded.check_unique_events()?;
        }

        let consumed = data.len() - buf.len();
        debug!(count, consumed, validate, "decoded participations");
        Ok((decoded, consumed))
    }

    /// Encode the collection, running the same checks as [`Participations::decode`]
    /// first when `validate` is set.
    pub fn encode(&self, validate: bool) -> Result<Vec<u8>> {
        if validate {
            self.validate()?;
        }

        let count = u8::try_from(self.participations.len())
            .map_err(|_| Error::TooManyParticipations(self.participations.len()))?;

        let capacity = 1 + self
            .participations
            .iter()
            .map(Participation::encoded_len)
            .sum::<usize>();
        let mut out = Vec::with_capacity(capacity);
        out.put_u8(count);
        for participation in &self.participations {
            participation.write_to(&mut out, validate)?;
        }

        debug!(count, bytes = out.len(), validate, "encoded participations");
        Ok(out)
    }

    /// Run the validated-mode checks on an in-memory collection.
    ///
    /// Bounds are checked before duplicates, so a collection violating both
    /// reports the bounds error.
    pub fn validate(&self) -> Result<()> {
        PARTICIPATION_BOUNDS
            .check(self.participations.len())
            .inspect_err(|e| warn!("{}", e))?;
        for participation in &self.participations {
            participation.validate()?;
        }
        self.check_unique_events()
    }

    fn check_unique_events(&self) -> Result<()> {
        let mut seen_events = HashSet::with_capacity(self.participations.len());
        for participation in &self.participations {
            if !seen_events.insert(participation.event_id) {
                warn!(event_id = %participation.event_id, "multiple participations for the same event");
                return Err(Error::MultipleEventParticipation(participation.event_id));
            }
        }
        Ok(())
    }

    /// Render as `{"participations": [...]}`.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let elements = self
            .participations
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(serde_json::json!({ "participations": elements }))
    }

    /// Parse from the `{"participations": [...]}` wrapper.
    ///
    /// Elements are parsed in order; the first failure is reported with its
    /// position. A missing or `null` list reads as empty. Validation is not
    /// applied.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let wrapper: JsonParticipations = serde_json::from_value(value)?;
        wrapper.into_participations()
    }

    /// Same as [`Participations::from_json`], reading from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let wrapper: JsonParticipations = serde_json::from_str(s)?;
        wrapper.into_participations()
    }
}

impl From<Vec<Participation>> for Participations {
    fn from(participations: Vec<Participation>) -> Self {
        Self { participations }
    }
}

impl<'a> IntoIterator for &'a Participations {
    type Item = &'a Participation;
    type IntoIter = std::slice::Iter<'a, Participation>;

    fn into_iter(self) -> Self::IntoIter {
        self.participations.iter()
    }
}

/// JSON representation of [`Participations`] with elements left unparsed.
#[derive(Deserialize)]
struct JsonParticipations {
    #[serde(default)]
    participations: Option<Vec<serde_json::Value>>,
}

impl JsonParticipations {
    fn into_participations(self) -> Result<Participations> {
        let participations = self
            .participations
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(pos, element)| {
                serde_json::from_value::<Participation>(element)
                    .map_err(|source| Error::JsonElement { pos, source })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Participations { participations })
    }
}

#[derive(Serialize)]
struct JsonParticipationsRef<'a> {
    participations: &'a [Participation],
}

impl Serialize for Participations {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        JsonParticipationsRef {
            participations: &self.participations,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Participations {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        JsonParticipations::deserialize(deserializer)?
            .into_participations()
            .map_err(serde::de::Error::custom)
    }
}
