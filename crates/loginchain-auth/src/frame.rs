//! Length-prefixed login buffer framing.
//!
//! A login buffer is two consecutive segments, each a little-endian `u32`
//! length followed by that many bytes:
//!
//! | Segment | Contents |
//! |---------|----------|
//! | chain   | UTF-8 JSON `{"chain": [token, ...]}` |
//! | skin    | one compact client data token |
//!
//! Bytes after the skin segment are ignored.

use crate::error::LoginError;

const LENGTH_PREFIX: usize = 4;

/// Cursor over an in-memory login buffer.
pub struct FrameReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FrameReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Read a little-endian `u32` length, then that many bytes.
    ///
    /// The declared length is checked against `limit` before any bytes are
    /// touched.
    pub fn read_segment(
        &mut self,
        segment: &'static str,
        limit: usize,
    ) -> Result<&'a [u8], LoginError> {
        let len = self.read_len(segment)?;
        if len > limit {
            return Err(LoginError::SegmentTooLarge {
                segment,
                len,
                limit,
            });
        }
        if len > self.remaining() {
            return Err(LoginError::Truncated {
                segment,
                expected: len,
                available: self.remaining(),
            });
        }

        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn read_len(&mut self, segment: &'static str) -> Result<usize, LoginError> {
        let prefix: [u8; LENGTH_PREFIX] = self
            .buf
            .get(self.pos..self.pos + LENGTH_PREFIX)
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or(LoginError::Truncated {
                segment,
                expected: LENGTH_PREFIX,
                available: self.remaining(),
            })?;
        self.pos += LENGTH_PREFIX;
        Ok(u32::from_le_bytes(prefix) as usize)
    }
}

/// The two raw segments of a login buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginFrame<'a> {
    /// Chain JSON bytes.
    pub chain: &'a [u8],
    /// Client data token bytes.
    pub skin: &'a [u8],
}

impl<'a> LoginFrame<'a> {
    /// Split a login buffer into its chain and skin segments.
    pub fn decode(buffer: &'a [u8], max_segment_len: usize) -> Result<Self, LoginError> {
        let mut reader = FrameReader::new(buffer);
        let chain = reader.read_segment("chain", max_segment_len)?;
        let skin = reader.read_segment("skin", max_segment_len)?;
        Ok(Self { chain, skin })
    }

    /// Build a login buffer from its two segments.
    pub fn encode(chain: &[u8], skin: &[u8]) -> Result<Vec<u8>, LoginError> {
        let mut out = Vec::with_capacity(2 * LENGTH_PREFIX + chain.len() + skin.len());
        for (segment, bytes) in [("chain", chain), ("skin", skin)] {
            let len = u32::try_from(bytes.len()).map_err(|_| LoginError::SegmentTooLarge {
                segment,
                len: bytes.len(),
                limit: u32::MAX as usize,
            })?;
            out.extend_from_slice(&len.to_le_bytes());
            out.extend_from_slice(bytes);
        }
        Ok(out)
    }
}
