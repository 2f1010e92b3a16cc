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

//! The group membership list (GML).
//!
//! The manager-held, ordered, index-addressable record of who joined the
//! group. Entries are created by the manager's final join step and never
//! mutated afterwards; removal hands the entry back to the caller.
//! Indices grow monotonically and are never reused, including across
//! removals.
//!
//! The list is the one shared-mutable structure in the crate. It is
//! `Send + Sync`; an embedder that writes from several threads must
//! serialize inserts behind its own lock (a single-writer discipline),
//! while read-only use needs no coordination.
//!
//! Trapdoors are deliberately not an index: they are unlinkable without
//! the opening secret, so [`crate::opener::open`] scans linearly.

use crate::codec::{field_len, field_wide_len, FieldReader, FieldWriter};
use crate::errors::GroupsigError;
use crate::registry::Scheme;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// An opaque member identifier, unique within one group's GML.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Identity(Vec<u8>);

impl Identity {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Identity {
        Identity(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// A scheme-specific opening trapdoor. Lives only in the GML; never
/// shown to verifiers.
#[derive(Clone, Debug)]
pub struct Trapdoor(Vec<u8>);

impl Trapdoor {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Trapdoor {
        Trapdoor(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq for Trapdoor {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && bool::from(self.0[..].ct_eq(&other.0[..]))
    }
}

impl Eq for Trapdoor {}

impl Drop for Trapdoor {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// One membership record.
///
/// Wire layout (no role tag; the layout is pinned by the list format):
///
/// ```text
/// scheme_id: u8 | id_len: u64, id | trapdoor_len: u32, trapdoor
/// ```
///
/// The index is not serialized; see [`Gml::from_bytes`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GmlEntry {
    index: u64,
    id: Identity,
    trapdoor: Trapdoor,
}

impl GmlEntry {
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn id(&self) -> &Identity {
        &self.id
    }

    pub fn trapdoor(&self) -> &Trapdoor {
        &self.trapdoor
    }

    /// Exact size of `to_bytes` output.
    pub fn serialized_size(&self) -> usize {
        1 + field_wide_len(self.id.0.len()) + field_len(self.trapdoor.0.len())
    }

    /// Encode this entry for the given scheme.
    pub fn to_bytes(&self, scheme: Scheme) -> Vec<u8> {
        let mut w = FieldWriter::tagless(scheme.code());
        w.field_wide(&self.id.0);
        w.field(&self.trapdoor.0);
        w.finish()
    }

    /// Decode one entry from the front of `bytes`, returning it together
    /// with the number of bytes consumed. The caller assigns the index.
    fn decode_prefix(
        bytes: &[u8],
        scheme: Scheme,
        index: u64,
    ) -> Result<(GmlEntry, usize), GroupsigError> {
        let mut r = FieldReader::tagless(bytes, scheme.code())?;
        let id = r.field_wide()?.to_vec();
        let trapdoor = r.field()?.to_vec();
        let consumed = r.consumed();
        Ok((
            GmlEntry {
                index,
                id: Identity(id),
                trapdoor: Trapdoor(trapdoor),
            },
            consumed,
        ))
    }

    /// Decode a standalone entry encoding. The index is the caller's to
    /// assign, since the wire format does not carry one.
    pub fn from_bytes(bytes: &[u8], scheme: Scheme, index: u64) -> Result<GmlEntry, GroupsigError> {
        let (entry, consumed) = GmlEntry::decode_prefix(bytes, scheme, index)?;
        if consumed != bytes.len() {
            return Err(GroupsigError::Decode("trailing bytes"));
        }
        Ok(entry)
    }
}

/// The membership store.
///
/// Wire layout: `scheme_id: u8 | count: u64 | entry*`, each entry
/// self-delimiting in the [`GmlEntry`] layout.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Gml {
    scheme: Scheme,
    next_index: u64,
    entries: Vec<GmlEntry>,
}

impl Gml {
    /// An empty list for the given scheme.
    pub fn new(scheme: Scheme) -> Gml {
        Gml {
            scheme,
            next_index: 0,
            entries: Vec::new(),
        }
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

    /// Append a record, assigning the next index. Identities must be
    /// unique within the list.
    pub fn insert(&mut self, id: Identity, trapdoor: Trapdoor) -> Result<u64, GroupsigError> {
        if self.entries.iter().any(|e| e.id == id) {
            return Err(GroupsigError::InvalidArgument("duplicate identity"));
        }
        let index = self.next_index;
        self.next_index += 1;
        self.entries.push(GmlEntry {
            index,
            id,
            trapdoor,
        });
        Ok(index)
    }

    /// Borrow the entry at `index`, if present.
    pub fn get(&self, index: u64) -> Option<&GmlEntry> {
        self.entries
            .binary_search_by_key(&index, |e| e.index)
            .ok()
            .map(|pos| &self.entries[pos])
    }

    /// Remove the entry at `index`, returning ownership to the caller.
    /// The store never frees removed records, and the index is never
    /// handed out again.
    pub fn remove(&mut self, index: u64) -> Option<GmlEntry> {
        self.entries
            .binary_search_by_key(&index, |e| e.index)
            .ok()
            .map(|pos| self.entries.remove(pos))
    }

    /// Entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = &GmlEntry> {
        self.entries.iter()
    }

    /// Exact size of `to_bytes` output.
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

    /// Import a previously exported list.
    ///
    /// The wire format carries no per-entry indices, so entries are
    /// renumbered `0..count` in order and the next index is reset to
    /// `count`: an import is a snapshot of a group, not a resumption of
    /// the exporting store's index sequence.
    pub fn from_bytes(bytes: &[u8]) -> Result<Gml, GroupsigError> {
        let scheme = Scheme::from_code(FieldReader::peek_scheme(bytes)?)?;
        let mut r = FieldReader::tagless(bytes, scheme.code())?;
        let count = r.raw_u64()?;
        // Each entry is at least scheme + two length prefixes.
        if count > (r.tail().len() as u64) / 13 + 1 {
            return Err(GroupsigError::Decode("entry count exceeds buffer"));
        }
        let mut entries = Vec::with_capacity(count as usize);
        for index in 0..count {
            let (entry, consumed) = GmlEntry::decode_prefix(r.tail(), scheme, index)?;
            r.advance(consumed)?;
            entries.push(entry);
        }
        r.finish()?;
        Ok(Gml {
            scheme,
            next_index: count,
            entries,
        })
    }
}

serde_boilerplate!(Gml, "A serialized group membership list.");

#[cfg(test)]
mod test {
    use super::*;

    fn sample(scheme: Scheme) -> Gml {
        let mut gml = Gml::new(scheme);
        gml.insert(Identity::new(&b"alice"[..]), Trapdoor::new(vec![1u8; 96]))
            .unwrap();
        gml.insert(Identity::new(&b"bob"[..]), Trapdoor::new(vec![2u8; 96]))
            .unwrap();
        gml.insert(Identity::new(&b"carol"[..]), Trapdoor::new(vec![3u8; 96]))
            .unwrap();
        gml
    }

    #[test]
    fn indices_are_monotone_and_never_reused() {
        let mut gml = sample(Scheme::Ps16);
        assert_eq!(gml.len(), 3);
        let removed = gml.remove(1).unwrap();
        assert_eq!(removed.index(), 1);
        assert_eq!(removed.id().as_bytes(), b"bob");
        assert!(gml.get(1).is_none());

        // Entries inserted after a removal continue the sequence.
        let idx = gml
            .insert(Identity::new(&b"dave"[..]), Trapdoor::new(vec![4u8; 96]))
            .unwrap();
        assert_eq!(idx, 3);
        let idx = gml
            .insert(Identity::new(&b"erin"[..]), Trapdoor::new(vec![5u8; 96]))
            .unwrap();
        assert_eq!(idx, 4);
        assert!(gml.get(1).is_none());
        assert_eq!(gml.get(3).unwrap().id().as_bytes(), b"dave");
    }

    #[test]
    fn duplicate_identity_rejected() {
        let mut gml = sample(Scheme::Ps16);
        assert_eq!(
            gml.insert(Identity::new(&b"alice"[..]), Trapdoor::new(vec![9u8; 96]))
                .unwrap_err(),
            GroupsigError::InvalidArgument("duplicate identity")
        );
    }

    #[test]
    fn export_import_roundtrip() {
        let gml = sample(Scheme::Nym);
        let bytes = gml.to_bytes();
        assert_eq!(bytes.len(), gml.serialized_size());
        let back = Gml::from_bytes(&bytes).unwrap();
        assert_eq!(back, gml);
    }

    #[test]
    fn entry_roundtrip() {
        let gml = sample(Scheme::Vlr);
        let entry = gml.get(2).unwrap();
        let bytes = entry.to_bytes(Scheme::Vlr);
        assert_eq!(bytes.len(), entry.serialized_size());
        let back = GmlEntry::from_bytes(&bytes, Scheme::Vlr, 2).unwrap();
        assert_eq!(&back, entry);
    }

    #[test]
    fn import_checks_scheme_and_truncation() {
        let gml = sample(Scheme::Ps16);
        let mut bytes = gml.to_bytes();

        // Unknown scheme byte.
        bytes[0] = 42;
        assert!(Gml::from_bytes(&bytes).is_err());
        bytes[0] = Scheme::Ps16.code();

        // Truncated entry payload.
        let cut = bytes.len() - 3;
        assert!(Gml::from_bytes(&bytes[..cut]).is_err());

        // Count larger than the buffer can hold.
        let mut w = FieldWriter::tagless(Scheme::Ps16.code());
        w.raw_u64(u64::max_value());
        assert!(Gml::from_bytes(&w.finish()).is_err());
    }

    #[test]
    fn stores_are_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Gml>();
        assert_send_sync::<crate::crl::Crl>();
        assert_send_sync::<crate::GroupKey>();
        assert_send_sync::<crate::Signature>();
    }

    #[test]
    fn trapdoor_compares_by_content() {
        let a = Trapdoor::new(vec![1u8, 2, 3]);
        let b = Trapdoor::new(vec![1u8, 2, 3]);
        let c = Trapdoor::new(vec![1u8, 2, 4]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
