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

//! Cross-signature linkage proofs.
//!
//! Three variants: a link proof (`nym`) shows one hidden exponent under
//! several signatures' pseudonyms; a sequential-link proof additionally
//! carries one ordered per-signature value backing the claimed signing
//! order; an equality proof (`vlr`) shows one exponent under several
//! signatures' tag pairs. Verification recomputes each embedded
//! challenge exactly as the prover computed it.

use crate::codec::{role, FieldReader};
use crate::errors::GroupsigError;
use crate::keys::{GroupKey, MemberKey};
use crate::registry::Scheme;
use crate::schemes::{nym, vlr};
use crate::signature::Signature;

/// A linkage proof over a set of signatures.
#[derive(Clone, Debug, PartialEq)]
pub enum Proof {
    /// Equality of the pseudonym exponent (`nym`).
    Link(nym::LinkProof),
    /// Equality plus proven signing order (`nym`).
    SeqLink(nym::SeqProof),
    /// Equality of the tag-pair exponent (`vlr`).
    Equality(vlr::EqProof),
}

impl Proof {
    pub fn scheme(&self) -> Scheme {
        match self {
            Proof::Link(_) | Proof::SeqLink(_) => Scheme::Nym,
            Proof::Equality(_) => Scheme::Vlr,
        }
    }

    pub fn serialized_size(&self) -> usize {
        match self {
            Proof::Link(p) => p.serialized_size(),
            Proof::SeqLink(p) => p.serialized_size(),
            Proof::Equality(p) => p.serialized_size(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Proof::Link(p) => p.to_bytes(),
            Proof::SeqLink(p) => p.to_bytes(),
            Proof::Equality(p) => p.to_bytes(),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Proof, GroupsigError> {
        let scheme = Scheme::from_code(FieldReader::peek_scheme(bytes)?)?;
        let tag = *bytes
            .get(1)
            .ok_or(GroupsigError::Decode("truncated input"))?;
        match (scheme, tag) {
            (Scheme::Nym, role::PROOF_LINK) => {
                Ok(Proof::Link(nym::LinkProof::from_bytes(bytes)?))
            }
            (Scheme::Nym, role::PROOF_SEQ) => {
                Ok(Proof::SeqLink(nym::SeqProof::from_bytes(bytes)?))
            }
            (Scheme::Vlr, role::PROOF_LINK) => {
                Ok(Proof::Equality(vlr::EqProof::from_bytes(bytes)?))
            }
            _ => Err(GroupsigError::Decode("unexpected role tag")),
        }
    }
}

serde_boilerplate!(Proof, "A serialized linkage proof.");

/// Unwrap a homogeneous signature set for one scheme.
fn unwrap_nym(sigs: &[Signature]) -> Result<Vec<nym::Signature>, GroupsigError> {
    sigs.iter()
        .map(|sig| match sig {
            Signature::Nym(s) => Ok(s.clone()),
            other => Err(GroupsigError::SchemeMismatch {
                expected: Scheme::Nym.code(),
                found: other.scheme().code(),
            }),
        })
        .collect()
}

fn unwrap_vlr(sigs: &[Signature]) -> Result<Vec<vlr::Signature>, GroupsigError> {
    sigs.iter()
        .map(|sig| match sig {
            Signature::Vlr(s) => Ok(s.clone()),
            other => Err(GroupsigError::SchemeMismatch {
                expected: Scheme::Vlr.code(),
                found: other.scheme().code(),
            }),
        })
        .collect()
}

/// Prove the given signatures share a signer. `nym` only.
pub fn link(
    key: &MemberKey,
    grp: &GroupKey,
    sigs: &[Signature],
    msgs: &[&[u8]],
    seed: Option<[u8; 32]>,
) -> Result<Proof, GroupsigError> {
    match (key, grp) {
        (MemberKey::Nym(k), GroupKey::Nym(g)) => {
            nym::link(k, g, &unwrap_nym(sigs)?, msgs, seed).map(Proof::Link)
        }
        (key, _) if key.scheme() != Scheme::Nym => Err(GroupsigError::Unsupported {
            scheme: key.scheme().name(),
            op: "link",
        }),
        (key, grp) => Err(GroupsigError::SchemeMismatch {
            expected: grp.scheme().code(),
            found: key.scheme().code(),
        }),
    }
}

/// Verify a link proof over the given signatures and their messages.
pub fn verify_link(
    proof: &Proof,
    grp: &GroupKey,
    sigs: &[Signature],
    msgs: &[&[u8]],
) -> Result<bool, GroupsigError> {
    match (proof, grp) {
        (Proof::Link(p), GroupKey::Nym(g)) => nym::verify_link(p, g, &unwrap_nym(sigs)?, msgs),
        (Proof::SeqLink(p), GroupKey::Nym(g)) => {
            nym::verify_seqlink(p, g, &unwrap_nym(sigs)?, msgs)
        }
        (Proof::Equality(_), _) => Err(GroupsigError::Unsupported {
            scheme: Scheme::Vlr.name(),
            op: "link",
        }),
        (proof, grp) => Err(GroupsigError::SchemeMismatch {
            expected: grp.scheme().code(),
            found: proof.scheme().code(),
        }),
    }
}

/// Prove the given signatures share a signer *and* were produced in the
/// given order. `nym` only.
pub fn seqlink(
    key: &MemberKey,
    grp: &GroupKey,
    sigs: &[Signature],
    msgs: &[&[u8]],
    seed: Option<[u8; 32]>,
) -> Result<Proof, GroupsigError> {
    match (key, grp) {
        (MemberKey::Nym(k), GroupKey::Nym(g)) => {
            nym::seqlink(k, g, &unwrap_nym(sigs)?, msgs, seed).map(Proof::SeqLink)
        }
        (key, _) if key.scheme() != Scheme::Nym => Err(GroupsigError::Unsupported {
            scheme: key.scheme().name(),
            op: "seqlink",
        }),
        (key, grp) => Err(GroupsigError::SchemeMismatch {
            expected: grp.scheme().code(),
            found: key.scheme().code(),
        }),
    }
}

/// Prove equality of the signing exponent across signatures. `vlr` only.
pub fn prove_equality(
    key: &MemberKey,
    grp: &GroupKey,
    sigs: &[Signature],
    seed: Option<[u8; 32]>,
) -> Result<Proof, GroupsigError> {
    match (key, grp) {
        (MemberKey::Vlr(k), GroupKey::Vlr(g)) => {
            vlr::prove_equality(k, g, &unwrap_vlr(sigs)?, seed).map(Proof::Equality)
        }
        (key, _) if key.scheme() != Scheme::Vlr => Err(GroupsigError::Unsupported {
            scheme: key.scheme().name(),
            op: "prove-equality",
        }),
        (key, grp) => Err(GroupsigError::SchemeMismatch {
            expected: grp.scheme().code(),
            found: key.scheme().code(),
        }),
    }
}

/// Verify an equality proof over the given signatures.
pub fn verify_equality(
    proof: &Proof,
    grp: &GroupKey,
    sigs: &[Signature],
) -> Result<bool, GroupsigError> {
    match (proof, grp) {
        (Proof::Equality(p), GroupKey::Vlr(g)) => vlr::verify_equality(p, g, &unwrap_vlr(sigs)?),
        (Proof::Link(_), _) | (Proof::SeqLink(_), _) => Err(GroupsigError::Unsupported {
            scheme: Scheme::Nym.name(),
            op: "prove-equality",
        }),
        (proof, grp) => Err(GroupsigError::SchemeMismatch {
            expected: grp.scheme().code(),
            found: proof.scheme().code(),
        }),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hash::HashAlg;
    use crate::join::tests_support::enroll;
    use crate::keys::setup;
    use crate::signature::sign;
    use rand::thread_rng;

    #[test]
    fn link_and_seqlink_roundtrip() {
        let (grp, mgr) = setup(Scheme::Nym, HashAlg::Blake2b, &mut thread_rng()).unwrap();
        let mut key = enroll(b"alice", &grp, &mgr);

        let s1 = sign(b"one", &mut key, &grp, None).unwrap();
        let s2 = sign(b"two", &mut key, &grp, None).unwrap();
        let sigs = vec![s1, s2];
        let msgs: Vec<&[u8]> = vec![b"one", b"two"];

        let proof = link(&key, &grp, &sigs, &msgs, None).unwrap();
        assert!(verify_link(&proof, &grp, &sigs, &msgs).unwrap());
        let bytes = proof.to_bytes();
        assert_eq!(bytes.len(), proof.serialized_size());
        assert_eq!(Proof::from_bytes(&bytes).unwrap(), proof);

        let sproof = seqlink(&key, &grp, &sigs, &msgs, None).unwrap();
        assert!(verify_link(&sproof, &grp, &sigs, &msgs).unwrap());
        let bytes = sproof.to_bytes();
        assert_eq!(bytes.len(), sproof.serialized_size());
        assert_eq!(Proof::from_bytes(&bytes).unwrap(), sproof);
    }

    #[test]
    fn different_signers_do_not_link() {
        let (grp, mgr) = setup(Scheme::Nym, HashAlg::Blake2b, &mut thread_rng()).unwrap();
        let mut alice = enroll(b"alice", &grp, &mgr);
        let mut bob = enroll(b"bob", &grp, &mgr);

        let s_a1 = sign(b"one", &mut alice, &grp, None).unwrap();
        let s_a2 = sign(b"two", &mut alice, &grp, None).unwrap();
        let s_b = sign(b"two", &mut bob, &grp, None).unwrap();

        let own = vec![s_a1.clone(), s_a2];
        let msgs: Vec<&[u8]> = vec![b"one", b"two"];
        let proof = link(&alice, &grp, &own, &msgs, None).unwrap();

        let mixed = vec![s_a1, s_b];
        assert!(!verify_link(&proof, &grp, &mixed, &msgs).unwrap());
    }

    #[test]
    fn equality_proof_roundtrip() {
        let (grp, mgr) = setup(Scheme::Vlr, HashAlg::Blake2b, &mut thread_rng()).unwrap();
        let mut key = enroll(b"alice", &grp, &mgr);

        let sigs = vec![
            sign(b"one", &mut key, &grp, None).unwrap(),
            sign(b"two", &mut key, &grp, None).unwrap(),
        ];
        let proof = prove_equality(&key, &grp, &sigs, None).unwrap();
        assert!(verify_equality(&proof, &grp, &sigs).unwrap());

        let bytes = proof.to_bytes();
        assert_eq!(bytes.len(), proof.serialized_size());
        assert_eq!(Proof::from_bytes(&bytes).unwrap(), proof);
    }

    #[test]
    fn absent_operations_are_reported() {
        let (grp, mgr) = setup(Scheme::Ps16, HashAlg::Blake2b, &mut thread_rng()).unwrap();
        let mut key = enroll(b"alice", &grp, &mgr);
        let sig = sign(b"m", &mut key, &grp, None).unwrap();

        assert_eq!(
            link(&key, &grp, &[sig.clone()], &[b"m"], None).unwrap_err(),
            GroupsigError::Unsupported {
                scheme: "ps16",
                op: "link"
            }
        );
        assert_eq!(
            seqlink(&key, &grp, &[sig.clone()], &[b"m"], None).unwrap_err(),
            GroupsigError::Unsupported {
                scheme: "ps16",
                op: "seqlink"
            }
        );
        assert_eq!(
            prove_equality(&key, &grp, &[sig], None).unwrap_err(),
            GroupsigError::Unsupported {
                scheme: "ps16",
                op: "prove-equality"
            }
        );
    }
}
