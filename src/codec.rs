// Copyright 2019 Stichting Organism
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The shared wire layout.
//!
//! Every serializable entity is encoded as
//!
//! ```text
//! scheme_id: u8 | role_tag: u8 | (len: u32 or u64, payload)*
//! ```
//!
//! with little-endian length prefixes and fields in the fixed order each
//! type documents. Membership and revocation list entries omit the role
//! tag (their layout is pinned by the list formats). Decoding validates
//! every length against the remaining buffer before touching the payload,
//! checks the scheme byte against the decoder that was invoked, and
//! rejects buffers with trailing bytes.

use crate::errors::GroupsigError;

/// Structure-role tags, the second byte of every tagged encoding.
pub(crate) mod role {
    pub const GROUP_KEY: u8 = 0x01;
    pub const MANAGER_KEY: u8 = 0x02;
    pub const MEMBER_KEY: u8 = 0x03;
    pub const SIGNATURE: u8 = 0x04;
    pub const PROOF_LINK: u8 = 0x05;
    pub const PROOF_SEQ: u8 = 0x06;
}

/// Incremental encoder. `finish` returns the buffer; the caller is
/// expected to have precomputed the same length via `serialized_size` and
/// the two are asserted equal in tests.
pub(crate) struct FieldWriter {
    buf: Vec<u8>,
}

impl FieldWriter {
    /// Start an encoding with scheme and role bytes.
    pub(crate) fn new(scheme: u8, role: u8) -> FieldWriter {
        let mut buf = Vec::new();
        buf.push(scheme);
        buf.push(role);
        FieldWriter { buf }
    }

    /// Start an encoding with a scheme byte only (list entries).
    pub(crate) fn tagless(scheme: u8) -> FieldWriter {
        FieldWriter { buf: vec![scheme] }
    }

    /// Append a bare u64, little endian. Used for list counts and
    /// entry references, which are not length-prefixed fields.
    pub(crate) fn raw_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    /// Append pre-encoded, self-delimiting bytes verbatim.
    pub(crate) fn raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append one field with a u32 length prefix.
    pub(crate) fn field(&mut self, payload: &[u8]) {
        debug_assert!(payload.len() <= u32::max_value() as usize);
        self.buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        self.buf.extend_from_slice(payload);
    }

    /// Append one field with a u64 length prefix.
    pub(crate) fn field_wide(&mut self, payload: &[u8]) {
        self.buf.extend_from_slice(&(payload.len() as u64).to_le_bytes());
        self.buf.extend_from_slice(payload);
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Exact serialized size of a u32-prefixed field.
pub(crate) fn field_len(payload_len: usize) -> usize {
    4 + payload_len
}

/// Exact serialized size of a u64-prefixed field.
pub(crate) fn field_wide_len(payload_len: usize) -> usize {
    8 + payload_len
}

/// Bounds-checked decoder over a byte slice.
#[derive(Debug)]
pub(crate) struct FieldReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    /// Open a tagged encoding, checking scheme and role bytes.
    pub(crate) fn new(buf: &'a [u8], scheme: u8, role: u8) -> Result<FieldReader<'a>, GroupsigError> {
        let mut r = FieldReader::tagless(buf, scheme)?;
        let tag = r.raw_u8()?;
        if tag != role {
            return Err(GroupsigError::Decode("unexpected role tag"));
        }
        Ok(r)
    }

    /// Open a tagless encoding (list entries), checking the scheme byte.
    pub(crate) fn tagless(buf: &'a [u8], scheme: u8) -> Result<FieldReader<'a>, GroupsigError> {
        let mut r = FieldReader { buf, pos: 0 };
        let found = r.raw_u8()?;
        if found != scheme {
            return Err(GroupsigError::SchemeMismatch {
                expected: scheme,
                found,
            });
        }
        Ok(r)
    }

    /// The scheme byte of an encoding, without consuming anything.
    /// Used by the generic wrappers to select a decoder.
    pub(crate) fn peek_scheme(buf: &[u8]) -> Result<u8, GroupsigError> {
        buf.first()
            .copied()
            .ok_or(GroupsigError::Decode("empty buffer"))
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], GroupsigError> {
        if n > self.buf.len() - self.pos {
            return Err(GroupsigError::Decode("truncated input"));
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub(crate) fn raw_u8(&mut self) -> Result<u8, GroupsigError> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn raw_u64(&mut self) -> Result<u64, GroupsigError> {
        let mut b = [0u8; 8];
        b.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(b))
    }

    /// Read one u32-prefixed field, validating the length against the
    /// remaining buffer before reading the payload.
    pub(crate) fn field(&mut self) -> Result<&'a [u8], GroupsigError> {
        let mut b = [0u8; 4];
        b.copy_from_slice(self.take(4)?);
        self.take(u32::from_le_bytes(b) as usize)
    }

    /// Read one u64-prefixed field.
    pub(crate) fn field_wide(&mut self) -> Result<&'a [u8], GroupsigError> {
        let len = self.raw_u64()?;
        if len > self.buf.len() as u64 {
            return Err(GroupsigError::Decode("truncated input"));
        }
        self.take(len as usize)
    }

    /// Bytes consumed so far.
    pub(crate) fn consumed(&self) -> usize {
        self.pos
    }

    /// Everything not yet consumed.
    pub(crate) fn tail(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    /// Skip `n` bytes already consumed through `tail`.
    pub(crate) fn advance(&mut self, n: usize) -> Result<(), GroupsigError> {
        self.take(n).map(|_| ())
    }

    /// Assert the whole buffer was consumed; padding is as much of a
    /// decode failure as truncation.
    pub(crate) fn finish(self) -> Result<(), GroupsigError> {
        if self.pos != self.buf.len() {
            return Err(GroupsigError::Decode("trailing bytes"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn roundtrip_fields() {
        let mut w = FieldWriter::new(3, role::SIGNATURE);
        w.field(b"abc");
        w.field_wide(b"defg");
        w.raw_u64(7);
        let bytes = w.finish();

        let mut r = FieldReader::new(&bytes, 3, role::SIGNATURE).unwrap();
        assert_eq!(r.field().unwrap(), b"abc");
        assert_eq!(r.field_wide().unwrap(), b"defg");
        assert_eq!(r.raw_u64().unwrap(), 7);
        r.finish().unwrap();
    }

    #[test]
    fn scheme_and_role_checked() {
        let bytes = FieldWriter::new(1, role::GROUP_KEY).finish();
        assert_eq!(
            FieldReader::new(&bytes, 2, role::GROUP_KEY).unwrap_err(),
            GroupsigError::SchemeMismatch {
                expected: 2,
                found: 1
            }
        );
        assert!(FieldReader::new(&bytes, 1, role::MEMBER_KEY).is_err());
    }

    #[test]
    fn length_overrun_rejected() {
        // A field claiming 200 bytes with 3 present.
        let mut bytes = vec![1u8, role::SIGNATURE];
        bytes.extend_from_slice(&200u32.to_le_bytes());
        bytes.extend_from_slice(b"abc");
        let mut r = FieldReader::new(&bytes, 1, role::SIGNATURE).unwrap();
        assert_eq!(
            r.field().unwrap_err(),
            GroupsigError::Decode("truncated input")
        );
    }

    #[test]
    fn wide_length_overrun_rejected() {
        let mut bytes = vec![1u8, role::SIGNATURE];
        bytes.extend_from_slice(&u64::max_value().to_le_bytes());
        let mut r = FieldReader::new(&bytes, 1, role::SIGNATURE).unwrap();
        assert!(r.field_wide().is_err());
    }

    #[test]
    fn trailing_bytes_rejected() {
        let mut w = FieldWriter::new(1, role::SIGNATURE);
        w.field(b"x");
        let mut bytes = w.finish();
        bytes.push(0);
        let mut r = FieldReader::new(&bytes, 1, role::SIGNATURE).unwrap();
        r.field().unwrap();
        assert_eq!(
            r.finish().unwrap_err(),
            GroupsigError::Decode("trailing bytes")
        );
    }
}
