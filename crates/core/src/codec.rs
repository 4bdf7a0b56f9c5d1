//! Low-level helpers shared by the binary codecs.

use bytes::Buf;

use crate::{Error, Result};

/// Inclusive bounds on the number of elements in a length-prefixed array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ArrayBounds {
    pub min: usize,
    pub max: usize,
}

impl ArrayBounds {
    pub fn check(&self, count: usize) -> Result<()> {
        if count < self.min || count > self.max {
            return Err(Error::ParticipationCount {
                count,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Fail unless at least `needed` bytes remain.
pub(crate) fn ensure_remaining(buf: &[u8], needed: usize) -> Result<()> {
    if buf.remaining() < needed {
        return Err(Error::UnexpectedEof {
            needed,
            remaining: buf.remaining(),
        });
    }
    Ok(())
}

pub(crate) fn read_u8(buf: &mut &[u8]) -> Result<u8> {
    ensure_remaining(buf, 1)?;
    Ok(buf.get_u8())
}
