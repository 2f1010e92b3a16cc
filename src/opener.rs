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

//! De-anonymization and revocation.
//!
//! `open` recomputes, with the opener secret, the trapdoor a signature
//! hides and scans the membership list for it; finding nothing is a
//! legitimate outcome (`Ok(None)`), distinct from every error. `reveal`
//! publishes one member's revocation value into the CRL; `trace` tests a
//! single signature against the CRL without touching the membership
//! list.

use crate::crl::Crl;
use crate::errors::GroupsigError;
use crate::gml::{Gml, Trapdoor};
use crate::keys::{check_scheme, GroupKey, ManagerKey};
use crate::registry::Scheme;
use crate::schemes::{nym, ps16, vlr};
use crate::signature::Signature;

/// Recover the membership index behind a signature, or `None` if no
/// entry matches (a non-member, or an anomalous forgery).
pub fn open(
    sig: &Signature,
    grp: &GroupKey,
    mgr: &ManagerKey,
    gml: &Gml,
) -> Result<Option<u64>, GroupsigError> {
    check_scheme(sig.scheme(), mgr.scheme())?;
    check_scheme(sig.scheme(), gml.scheme())?;
    match (sig, grp, mgr) {
        (Signature::Ps16(s), GroupKey::Ps16(g), ManagerKey::Ps16(m)) => ps16::open(s, g, m, gml),
        (Signature::Nym(s), GroupKey::Nym(g), ManagerKey::Nym(m)) => nym::open(s, g, m, gml),
        (Signature::Vlr(s), GroupKey::Vlr(g), ManagerKey::Vlr(m)) => vlr::open(s, g, m, gml),
        (sig, grp, _) => Err(GroupsigError::SchemeMismatch {
            expected: grp.scheme().code(),
            found: sig.scheme().code(),
        }),
    }
}

/// Publish the revocation value of the member at `index` into the CRL,
/// returning it to the caller as well.
pub fn reveal(index: u64, gml: &Gml, crl: &mut Crl) -> Result<Trapdoor, GroupsigError> {
    match gml.scheme() {
        Scheme::Vlr => {
            check_scheme(gml.scheme(), crl.scheme())?;
            vlr::reveal(index, gml, crl)
        }
        scheme => Err(GroupsigError::Unsupported {
            scheme: scheme.name(),
            op: "reveal",
        }),
    }
}

/// Whether a signature was produced by any member on the CRL.
pub fn trace(sig: &Signature, grp: &GroupKey, crl: &Crl) -> Result<bool, GroupsigError> {
    match (sig, grp) {
        (Signature::Vlr(s), GroupKey::Vlr(g)) => {
            check_scheme(sig.scheme(), crl.scheme())?;
            vlr::trace(s, g, crl)
        }
        (Signature::Ps16(_), _) | (Signature::Nym(_), _) => Err(GroupsigError::Unsupported {
            scheme: sig.scheme().name(),
            op: "trace",
        }),
        (sig, grp) => Err(GroupsigError::SchemeMismatch {
            expected: grp.scheme().code(),
            found: sig.scheme().code(),
        }),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hash::HashAlg;
    use crate::join::tests_support::enroll_with_gml;
    use crate::keys::setup;
    use crate::signature::{sign, verify};
    use rand::thread_rng;

    #[test]
    fn open_returns_the_joined_index() {
        for scheme in &[Scheme::Ps16, Scheme::Nym, Scheme::Vlr] {
            let (grp, mgr) = setup(*scheme, HashAlg::Blake2b, &mut thread_rng()).unwrap();
            let mut gml = Gml::new(*scheme);
            let mut alice = enroll_with_gml(b"alice", &grp, &mgr, &mut gml);
            let mut bob = enroll_with_gml(b"bob", &grp, &mgr, &mut gml);

            let sig_b = sign(b"from bob", &mut bob, &grp, None).unwrap();
            let sig_a = sign(b"from alice", &mut alice, &grp, None).unwrap();
            assert_eq!(open(&sig_a, &grp, &mgr, &gml).unwrap(), Some(0));
            assert_eq!(open(&sig_b, &grp, &mgr, &gml).unwrap(), Some(1));
        }
    }

    #[test]
    fn open_after_removal_is_not_found() {
        let (grp, mgr) = setup(Scheme::Vlr, HashAlg::Blake2b, &mut thread_rng()).unwrap();
        let mut gml = Gml::new(Scheme::Vlr);
        let mut alice = enroll_with_gml(b"alice", &grp, &mgr, &mut gml);
        let sig = sign(b"m", &mut alice, &grp, None).unwrap();

        let removed = gml.remove(0).unwrap();
        assert_eq!(removed.index(), 0);
        assert_eq!(open(&sig, &grp, &mgr, &gml).unwrap(), None);
    }

    #[test]
    fn reveal_and_trace_are_vlr_only() {
        let (grp, mgr) = setup(Scheme::Ps16, HashAlg::Blake2b, &mut thread_rng()).unwrap();
        let mut gml = Gml::new(Scheme::Ps16);
        let mut key = enroll_with_gml(b"alice", &grp, &mgr, &mut gml);
        let _sig = sign(b"m", &mut key, &grp, None).unwrap();

        // No CRL can even be constructed for ps16; invoking the
        // revocation operations against its stores is reported as an
        // absent capability, never a crash.
        let crl = Crl::new(Scheme::Vlr).unwrap();
        let mut crl_mut = Crl::new(Scheme::Vlr).unwrap();
        assert_eq!(
            reveal(0, &gml, &mut crl_mut).unwrap_err(),
            GroupsigError::Unsupported {
                scheme: "ps16",
                op: "reveal"
            }
        );
        assert_eq!(
            trace(&_sig, &grp, &crl).unwrap_err(),
            GroupsigError::Unsupported {
                scheme: "ps16",
                op: "trace"
            }
        );
    }

    #[test]
    fn revocation_end_to_end() {
        let (grp, mgr) = setup(Scheme::Vlr, HashAlg::Blake2b, &mut thread_rng()).unwrap();
        let mut gml = Gml::new(Scheme::Vlr);
        let mut crl = Crl::new(Scheme::Vlr).unwrap();
        let mut alice = enroll_with_gml(b"alice", &grp, &mgr, &mut gml);
        let mut bob = enroll_with_gml(b"bob", &grp, &mgr, &mut gml);

        let sig_a = sign(b"m", &mut alice, &grp, None).unwrap();
        let sig_b = sign(b"m", &mut bob, &grp, None).unwrap();
        assert!(!trace(&sig_a, &grp, &crl).unwrap());

        reveal(0, &gml, &mut crl).unwrap();
        assert_eq!(crl.iter().next().unwrap().index(), 0);

        assert!(trace(&sig_a, &grp, &crl).unwrap());
        assert!(!trace(&sig_b, &grp, &crl).unwrap());
        assert!(!verify(&sig_a, b"m", &grp, Some(&crl)).unwrap());
        assert!(verify(&sig_b, b"m", &grp, Some(&crl)).unwrap());
    }
}
