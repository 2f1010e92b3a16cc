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

//! Keys to the kingdom
//!
//! Scheme-dispatching wrappers around the per-scheme key types, plus
//! group setup. Every wrapper decodes from the shared wire layout by
//! reading the leading scheme byte and handing the buffer to that
//! scheme's decoder, which re-validates it.

use crate::codec::FieldReader;
use crate::errors::GroupsigError;
use crate::hash::HashAlg;
use crate::registry::Scheme;
use crate::schemes::{nym, ps16, vlr};
use rand::{CryptoRng, RngCore};

pub(crate) fn check_scheme(expected: Scheme, found: Scheme) -> Result<(), GroupsigError> {
    if expected != found {
        return Err(GroupsigError::SchemeMismatch {
            expected: expected.code(),
            found: found.code(),
        });
    }
    Ok(())
}

/// Public parameters shared by all members and verifiers of one group.
#[derive(Clone, Debug, PartialEq)]
pub enum GroupKey {
    Ps16(ps16::GroupKey),
    Nym(nym::GroupKey),
    Vlr(vlr::GroupKey),
}

impl GroupKey {
    pub fn scheme(&self) -> Scheme {
        match self {
            GroupKey::Ps16(_) => Scheme::Ps16,
            GroupKey::Nym(_) => Scheme::Nym,
            GroupKey::Vlr(_) => Scheme::Vlr,
        }
    }

    pub fn serialized_size(&self) -> usize {
        match self {
            GroupKey::Ps16(k) => k.serialized_size(),
            GroupKey::Nym(k) => k.serialized_size(),
            GroupKey::Vlr(k) => k.serialized_size(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            GroupKey::Ps16(k) => k.to_bytes(),
            GroupKey::Nym(k) => k.to_bytes(),
            GroupKey::Vlr(k) => k.to_bytes(),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<GroupKey, GroupsigError> {
        match Scheme::from_code(FieldReader::peek_scheme(bytes)?)? {
            Scheme::Ps16 => Ok(GroupKey::Ps16(ps16::GroupKey::from_bytes(bytes)?)),
            Scheme::Nym => Ok(GroupKey::Nym(nym::GroupKey::from_bytes(bytes)?)),
            Scheme::Vlr => Ok(GroupKey::Vlr(vlr::GroupKey::from_bytes(bytes)?)),
        }
    }
}

serde_boilerplate!(GroupKey, "A serialized group public key.");

/// The manager's secret material (issuer and/or opener roles).
#[derive(Clone, Debug)]
pub enum ManagerKey {
    Ps16(ps16::ManagerKey),
    Nym(nym::ManagerKey),
    Vlr(vlr::ManagerKey),
}

impl ManagerKey {
    pub fn scheme(&self) -> Scheme {
        match self {
            ManagerKey::Ps16(_) => Scheme::Ps16,
            ManagerKey::Nym(_) => Scheme::Nym,
            ManagerKey::Vlr(_) => Scheme::Vlr,
        }
    }

    pub fn serialized_size(&self) -> usize {
        match self {
            ManagerKey::Ps16(k) => k.serialized_size(),
            ManagerKey::Nym(k) => k.serialized_size(),
            ManagerKey::Vlr(k) => k.serialized_size(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            ManagerKey::Ps16(k) => k.to_bytes(),
            ManagerKey::Nym(k) => k.to_bytes(),
            ManagerKey::Vlr(k) => k.to_bytes(),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<ManagerKey, GroupsigError> {
        match Scheme::from_code(FieldReader::peek_scheme(bytes)?)? {
            Scheme::Ps16 => Ok(ManagerKey::Ps16(ps16::ManagerKey::from_bytes(bytes)?)),
            Scheme::Nym => Ok(ManagerKey::Nym(nym::ManagerKey::from_bytes(bytes)?)),
            Scheme::Vlr => Ok(ManagerKey::Vlr(vlr::ManagerKey::from_bytes(bytes)?)),
        }
    }
}

serde_boilerplate!(ManagerKey, "A serialized group manager key.");

/// A member's signing key, produced only by a completed join exchange.
#[derive(Clone, Debug, PartialEq)]
pub enum MemberKey {
    Ps16(ps16::MemberKey),
    Nym(nym::MemberKey),
    Vlr(vlr::MemberKey),
}

impl MemberKey {
    pub fn scheme(&self) -> Scheme {
        match self {
            MemberKey::Ps16(_) => Scheme::Ps16,
            MemberKey::Nym(_) => Scheme::Nym,
            MemberKey::Vlr(_) => Scheme::Vlr,
        }
    }

    pub fn serialized_size(&self) -> usize {
        match self {
            MemberKey::Ps16(k) => k.serialized_size(),
            MemberKey::Nym(k) => k.serialized_size(),
            MemberKey::Vlr(k) => k.serialized_size(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            MemberKey::Ps16(k) => k.to_bytes(),
            MemberKey::Nym(k) => k.to_bytes(),
            MemberKey::Vlr(k) => k.to_bytes(),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<MemberKey, GroupsigError> {
        match Scheme::from_code(FieldReader::peek_scheme(bytes)?)? {
            Scheme::Ps16 => Ok(MemberKey::Ps16(ps16::MemberKey::from_bytes(bytes)?)),
            Scheme::Nym => Ok(MemberKey::Nym(nym::MemberKey::from_bytes(bytes)?)),
            Scheme::Vlr => Ok(MemberKey::Vlr(vlr::MemberKey::from_bytes(bytes)?)),
        }
    }
}

serde_boilerplate!(MemberKey, "A serialized group member key.");

/// Create a new group: the shared public key and the manager secrets.
/// Members are added afterwards through the join exchange; the embedder
/// provides the membership list via [`crate::Gml::new`].
pub fn setup<R: RngCore + CryptoRng>(
    scheme: Scheme,
    hash: HashAlg,
    rng: &mut R,
) -> Result<(GroupKey, ManagerKey), GroupsigError> {
    match scheme {
        Scheme::Ps16 => {
            let (grp, mgr) = ps16::setup(hash, rng);
            Ok((GroupKey::Ps16(grp), ManagerKey::Ps16(mgr)))
        }
        Scheme::Nym => {
            let (grp, mgr) = nym::setup(hash, rng);
            Ok((GroupKey::Nym(grp), ManagerKey::Nym(mgr)))
        }
        Scheme::Vlr => {
            let (grp, mgr) = vlr::setup(hash, rng);
            Ok((GroupKey::Vlr(grp), ManagerKey::Vlr(mgr)))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::thread_rng;

    #[test]
    fn wrapper_roundtrips_every_scheme() {
        for scheme in &[Scheme::Ps16, Scheme::Nym, Scheme::Vlr] {
            let (grp, mgr) = setup(*scheme, HashAlg::Sha512, &mut thread_rng()).unwrap();
            assert_eq!(grp.scheme(), *scheme);
            assert_eq!(mgr.scheme(), *scheme);

            let bytes = grp.to_bytes();
            assert_eq!(bytes.len(), grp.serialized_size());
            assert_eq!(bytes[0], scheme.code());
            assert_eq!(GroupKey::from_bytes(&bytes).unwrap(), grp);

            let bytes = mgr.to_bytes();
            assert_eq!(bytes.len(), mgr.serialized_size());
            let back = ManagerKey::from_bytes(&bytes).unwrap();
            assert_eq!(back.to_bytes(), mgr.to_bytes());
        }
    }

    #[test]
    fn decoding_unknown_scheme_fails() {
        let (grp, _) = setup(Scheme::Vlr, HashAlg::Blake2b, &mut thread_rng()).unwrap();
        let mut bytes = grp.to_bytes();
        bytes[0] = 77;
        assert_eq!(
            GroupKey::from_bytes(&bytes).unwrap_err(),
            GroupsigError::UnknownScheme(77)
        );
    }

    #[test]
    fn cross_type_decoding_fails() {
        // A manager key buffer is not a group key buffer: role tag.
        let (_, mgr) = setup(Scheme::Vlr, HashAlg::Blake2b, &mut thread_rng()).unwrap();
        assert!(GroupKey::from_bytes(&mgr.to_bytes()).is_err());
    }
}
