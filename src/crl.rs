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

//! The certificate revocation list (CRL).
//!
//! Append-only list of revoked members. Each entry references a GML
//! record by index and carries the scheme's revocation-enabling value
//! (for `vlr`, the revocation exponent a verifier tests signatures
//! against). Entries are added by [`crate::opener::reveal`] and consulted
//! by CRL-aware verification and by [`crate::opener::trace`].

use crate::codec::{field_len, FieldReader, FieldWriter};
use crate::errors::GroupsigError;
use crate::registry::Scheme;

/// One revocation record.
///
/// Wire layout: `scheme_id: u8 | gml_index: u64 | value_len: u32, value`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CrlEntry {
    index: u64,
    value: Vec<u8>,
}

impl CrlEntry {
    pub(crate) fn new(index: u64, value: Vec<u8>) -> CrlEntry {
        CrlEntry { index, value }
    }

    /// Index of the revoked GML record.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// The scheme-specific revocation value.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn serialized_size(&self) -> usize {
        1 + 8 + field_len(self.value.len())
    }

    pub fn to_bytes(&self, scheme: Scheme) -> Vec<u8> {
        let mut w = FieldWriter::tagless(scheme.code());
        w.raw_u64(self.index);
        w.field(&self.value);
        w.finish()
    }

    fn decode_prefix(bytes: &[u8], scheme: Scheme) -> Result<(CrlEntry, usize), GroupsigError> {
        let mut r = FieldReader::tagless(bytes, scheme.code())?;
        let index = r.raw_u64()?;
        let value = r.field()?.to_vec();
        let consumed = r.consumed();
        Ok((CrlEntry { index, value }, consumed))
    }

    pub fn from_bytes(bytes: &[u8], scheme: Scheme) -> Result<CrlEntry, GroupsigError> {
        let (entry, consumed) = CrlEntry::decode_prefix(bytes, scheme)?;
        if consumed != bytes.len() {
            return Err(GroupsigError::Decode("trailing bytes"));
        }
        Ok(entry)
    }
}

/// The revocation store.
///
/// Wire layout: `scheme_id: u8 | count: u64 | entry*`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Crl {
    scheme: Scheme,
    entries: Vec<CrlEntry>,
}

impl Crl {
    /// An empty revocation list. Fails for schemes without revocation
    /// support.
    pub fn new(scheme: Scheme) -> Result<Crl, GroupsigError> {
        if !scheme.description().has_crl {
            return Err(GroupsigError::Unsupported {
                scheme: scheme.name(),
                op: "revocation",
            });
        }
        Ok(Crl {
            scheme,
            entries: Vec::new(),
        })
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a revocation record. The list never shrinks.
    pub(crate) fn push(&mut self, entry: CrlEntry) {
        self.entries.push(entry);
    }

    pub fn iter(&self) -> impl Iterator<Item = &CrlEntry> {
        self.entries.iter()
    }

    pub fn serialized_size(&self) -> usize {
        1 + 8 + self
            .entries
            .iter()
            .map(|e| e.serialized_size())
            .sum::<usize>()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::tagless(self.scheme.code());
        w.raw_u64(self.entries.len() as u64);
        for entry in &self.entries {
            w.raw(&entry.to_bytes(self.scheme));
        }
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Crl, GroupsigError> {
        let scheme = Scheme::from_code(FieldReader::peek_scheme(bytes)?)?;
        let mut crl = Crl::new(scheme)?;
        let mut r = FieldReader::tagless(bytes, scheme.code())?;
        let count = r.raw_u64()?;
        if count > (r.tail().len() as u64) / 13 + 1 {
            return Err(GroupsigError::Decode("entry count exceeds buffer"));
        }
        for _ in 0..count {
            let (entry, consumed) = CrlEntry::decode_prefix(r.tail(), scheme)?;
            r.advance(consumed)?;
            crl.entries.push(entry);
        }
        r.finish()?;
        Ok(crl)
    }
}

serde_boilerplate!(Crl, "A serialized revocation list.");

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn crl_requires_support() {
        assert!(Crl::new(Scheme::Vlr).is_ok());
        assert_eq!(
            Crl::new(Scheme::Ps16).unwrap_err(),
            GroupsigError::Unsupported {
                scheme: "ps16",
                op: "revocation"
            }
        );
    }

    #[test]
    fn export_import_roundtrip() {
        let mut crl = Crl::new(Scheme::Vlr).unwrap();
        crl.push(CrlEntry::new(0, vec![7u8; 32]));
        crl.push(CrlEntry::new(4, vec![9u8; 32]));
        let bytes = crl.to_bytes();
        assert_eq!(bytes.len(), crl.serialized_size());
        let back = Crl::from_bytes(&bytes).unwrap();
        assert_eq!(back, crl);
        assert_eq!(back.iter().map(|e| e.index()).collect::<Vec<_>>(), [0, 4]);
    }

    #[test]
    fn truncated_import_rejected() {
        let mut crl = Crl::new(Scheme::Vlr).unwrap();
        crl.push(CrlEntry::new(0, vec![7u8; 32]));
        let bytes = crl.to_bytes();
        assert!(Crl::from_bytes(&bytes[..bytes.len() - 1]).is_err());
    }
}
