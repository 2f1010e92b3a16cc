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

//! Signing and verification.
//!
//! These are the generic entry points: they check that all inputs belong
//! to one scheme and dispatch to it. The per-signature randomness is
//! derived as documented in [`crate::tools::signing_rng`]; passing a
//! `seed` makes exactly that one call deterministic and touches no
//! shared generator state.

use crate::codec::FieldReader;
use crate::crl::Crl;
use crate::errors::GroupsigError;
use crate::keys::{check_scheme, GroupKey, MemberKey};
use crate::registry::Scheme;
use crate::schemes::{nym, ps16, vlr};

/// A group signature, verifiable under the group key alone.
#[derive(Clone, Debug, PartialEq)]
pub enum Signature {
    Ps16(ps16::Signature),
    Nym(nym::Signature),
    Vlr(vlr::Signature),
}

impl Signature {
    pub fn scheme(&self) -> Scheme {
        match self {
            Signature::Ps16(_) => Scheme::Ps16,
            Signature::Nym(_) => Scheme::Nym,
            Signature::Vlr(_) => Scheme::Vlr,
        }
    }

    pub fn serialized_size(&self) -> usize {
        match self {
            Signature::Ps16(s) => s.serialized_size(),
            Signature::Nym(s) => s.serialized_size(),
            Signature::Vlr(s) => s.serialized_size(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Signature::Ps16(s) => s.to_bytes(),
            Signature::Nym(s) => s.to_bytes(),
            Signature::Vlr(s) => s.to_bytes(),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Signature, GroupsigError> {
        match Scheme::from_code(FieldReader::peek_scheme(bytes)?)? {
            Scheme::Ps16 => Ok(Signature::Ps16(ps16::Signature::from_bytes(bytes)?)),
            Scheme::Nym => Ok(Signature::Nym(nym::Signature::from_bytes(bytes)?)),
            Scheme::Vlr => Ok(Signature::Vlr(vlr::Signature::from_bytes(bytes)?)),
        }
    }
}

serde_boilerplate!(Signature, "A serialized group signature.");

/// Sign a message under the group key.
///
/// The member key is taken mutably because the `nym` scheme spends one
/// hash-chain position per signature; the other schemes leave the key
/// untouched.
pub fn sign(
    msg: &[u8],
    key: &mut MemberKey,
    grp: &GroupKey,
    seed: Option<[u8; 32]>,
) -> Result<Signature, GroupsigError> {
    match (key, grp) {
        (MemberKey::Ps16(k), GroupKey::Ps16(g)) => ps16::sign(msg, k, g, seed).map(Signature::Ps16),
        (MemberKey::Nym(k), GroupKey::Nym(g)) => nym::sign(msg, k, g, seed).map(Signature::Nym),
        (MemberKey::Vlr(k), GroupKey::Vlr(g)) => vlr::sign(msg, k, g, seed).map(Signature::Vlr),
        (key, grp) => Err(GroupsigError::SchemeMismatch {
            expected: grp.scheme().code(),
            found: key.scheme().code(),
        }),
    }
}

/// Verify a signature over a message.
///
/// For schemes with revocation support, passing a CRL additionally
/// rejects signatures produced by revoked members; passing one to any
/// other scheme is a contract violation.
pub fn verify(
    sig: &Signature,
    msg: &[u8],
    grp: &GroupKey,
    crl: Option<&Crl>,
) -> Result<bool, GroupsigError> {
    if let Some(crl) = crl {
        if !sig.scheme().description().has_crl {
            return Err(GroupsigError::Unsupported {
                scheme: sig.scheme().name(),
                op: "revocation",
            });
        }
        check_scheme(sig.scheme(), crl.scheme())?;
    }
    match (sig, grp) {
        (Signature::Ps16(s), GroupKey::Ps16(g)) => ps16::verify(s, msg, g),
        (Signature::Nym(s), GroupKey::Nym(g)) => nym::verify(s, msg, g),
        (Signature::Vlr(s), GroupKey::Vlr(g)) => vlr::verify(s, msg, g, crl),
        (sig, grp) => Err(GroupsigError::SchemeMismatch {
            expected: grp.scheme().code(),
            found: sig.scheme().code(),
        }),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::gml::Gml;
    use crate::hash::HashAlg;
    use crate::join::tests_support::{enroll, enroll_with_gml};
    use crate::keys::setup;
    use crate::opener::open;
    use rand::thread_rng;

    #[test]
    fn sign_verify_every_scheme_and_hash() {
        for scheme in &[Scheme::Ps16, Scheme::Nym, Scheme::Vlr] {
            for hash in &[HashAlg::Blake2b, HashAlg::Sha512] {
                let (grp, mgr) = setup(*scheme, *hash, &mut thread_rng()).unwrap();
                let mut key = enroll(b"alice", &grp, &mgr);

                let sig = sign(b"test message", &mut key, &grp, None).unwrap();
                assert_eq!(sig.scheme(), *scheme);
                assert!(verify(&sig, b"test message", &grp, None).unwrap());
                assert!(!verify(&sig, b"wrong message", &grp, None).unwrap());

                let empty = sign(b"", &mut key, &grp, None).unwrap();
                assert!(verify(&empty, b"", &grp, None).unwrap());

                let bytes = sig.to_bytes();
                assert_eq!(bytes.len(), sig.serialized_size());
                assert_eq!(Signature::from_bytes(&bytes).unwrap(), sig);
            }
        }
    }

    #[test]
    fn scheme_mismatch_fails_fast() {
        let (grp_a, mgr_a) = setup(Scheme::Ps16, HashAlg::Blake2b, &mut thread_rng()).unwrap();
        let (grp_b, _) = setup(Scheme::Vlr, HashAlg::Blake2b, &mut thread_rng()).unwrap();
        let mut key = enroll(b"alice", &grp_a, &mgr_a);

        assert!(matches!(
            sign(b"m", &mut key, &grp_b, None).unwrap_err(),
            GroupsigError::SchemeMismatch { .. }
        ));

        let sig = sign(b"m", &mut key, &grp_a, None).unwrap();
        assert!(matches!(
            verify(&sig, b"m", &grp_b, None).unwrap_err(),
            GroupsigError::SchemeMismatch { .. }
        ));
    }

    #[test]
    fn crl_with_wrong_scheme_is_a_contract_violation() {
        let (grp, mgr) = setup(Scheme::Ps16, HashAlg::Blake2b, &mut thread_rng()).unwrap();
        let mut key = enroll(b"alice", &grp, &mgr);
        let sig = sign(b"m", &mut key, &grp, None).unwrap();

        let crl = Crl::new(Scheme::Vlr).unwrap();
        assert_eq!(
            verify(&sig, b"m", &grp, Some(&crl)).unwrap_err(),
            GroupsigError::Unsupported {
                scheme: "ps16",
                op: "revocation"
            }
        );
    }

    /// The end-to-end scenario: setup, join at index 0, sign "hello",
    /// verify, reject "hullo", open back to index 0.
    #[test]
    fn hello_scenario() {
        for scheme in &[Scheme::Ps16, Scheme::Nym, Scheme::Vlr] {
            let (grp, mgr) = setup(*scheme, HashAlg::Blake2b, &mut thread_rng()).unwrap();
            let mut gml = Gml::new(*scheme);

            let mut key = enroll_with_gml(b"member-a", &grp, &mgr, &mut gml);
            assert_eq!(gml.get(0).unwrap().id().as_bytes(), b"member-a");

            let sig = sign(b"hello", &mut key, &grp, None).unwrap();
            assert!(verify(&sig, b"hello", &grp, None).unwrap());
            assert!(!verify(&sig, b"hullo", &grp, None).unwrap());
            assert_eq!(open(&sig, &grp, &mgr, &gml).unwrap(), Some(0));
        }
    }
}
