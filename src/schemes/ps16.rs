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

//! Pointcheval-Sanders group signatures over BLS12-381.
//!
//! The issuer holds `(x, y)` with public `X = x*g2, Y = y*g2`. A member
//! with secret `sk` receives the randomizable credential
//! `(sigma1, sigma2) = (u*g1, u*(x*g1 + y*tau))` over its commitment
//! `tau = sk*g1`. To sign, the member rerandomizes the credential and
//! proves knowledge of `sk` in a signature of knowledge whose commitment
//! stays in G1 (the pairing image is what the verification equation
//! pins down; the target group has no canonical byte encoding to hash).
//!
//! Opening walks the membership list and tests, with the opener secret
//! `y`, which stored trapdoor `tt = sk*g2` explains the signature's
//! hidden exponent.

#![allow(non_snake_case)]

use crate::codec::{field_len, role, FieldReader, FieldWriter};
use crate::errors::GroupsigError;
use crate::gml::{Gml, Identity, Trapdoor};
use crate::hash::{HashAlg, Hasher};
use crate::registry::Scheme;
use crate::tools::{bls_challenge, bls_random_scalar, read_bls_scalar, read_g1, read_g2, signing_rng};
use bls12_381::{pairing, G1Affine, G1Projective, G2Affine, G2Projective, Scalar};
use rand::{CryptoRng, RngCore};

const SCHEME: Scheme = Scheme::Ps16;

/// Public group parameters.
///
/// Layout: `| 1 | 0x01 | hash | g | gg | X | Y |`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GroupKey {
    pub(crate) hash: HashAlg,
    pub(crate) g: G1Affine,
    pub(crate) gg: G2Affine,
    pub(crate) X: G2Affine,
    pub(crate) Y: G2Affine,
}

/// Issuer/opener secrets. One key serves both roles in this scheme.
///
/// Layout: `| 1 | 0x02 | x | y |`.
#[derive(Clone, Debug)]
pub struct ManagerKey {
    pub(crate) x: Scalar,
    pub(crate) y: Scalar,
}

impl Drop for ManagerKey {
    fn drop(&mut self) {
        self.x = Scalar::zero();
        self.y = Scalar::zero();
    }
}

/// Member secret and credential.
///
/// Layout: `| 1 | 0x03 | sk | sigma1 | sigma2 |`.
#[derive(Clone, Debug, PartialEq)]
pub struct MemberKey {
    pub(crate) sk: Scalar,
    pub(crate) sigma1: G1Affine,
    pub(crate) sigma2: G1Affine,
}

impl Drop for MemberKey {
    fn drop(&mut self) {
        self.sk = Scalar::zero();
    }
}

/// A group signature: the rerandomized credential and the signature of
/// knowledge `(K, c, s)` of the member secret.
///
/// Layout: `| 1 | 0x04 | sigma1 | sigma2 | K | c | s |`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Signature {
    pub(crate) sigma1: G1Affine,
    pub(crate) sigma2: G1Affine,
    pub(crate) K: G1Affine,
    pub(crate) c: Scalar,
    pub(crate) s: Scalar,
}

/// Create a group.
pub(crate) fn setup<R: RngCore + CryptoRng>(hash: HashAlg, rng: &mut R) -> (GroupKey, ManagerKey) {
    let x = bls_random_scalar(rng);
    let y = bls_random_scalar(rng);
    let gg = G2Affine::generator();
    let grp = GroupKey {
        hash,
        g: G1Affine::generator(),
        gg,
        X: G2Affine::from(G2Projective::from(&gg) * x),
        Y: G2Affine::from(G2Projective::from(&gg) * y),
    };
    (grp, ManagerKey { x, y })
}

/// Challenge over `sigma1 | sigma2 | K | message`, in that order.
fn sign_challenge(
    hash: HashAlg,
    sigma1: &G1Affine,
    sigma2: &G1Affine,
    K: &G1Affine,
    msg: &[u8],
) -> Scalar {
    let mut h = Hasher::new(hash, b"groupsig.ps16.sign");
    h.update(&sigma1.to_compressed());
    h.update(&sigma2.to_compressed());
    h.update(&K.to_compressed());
    h.update(msg);
    bls_challenge(h)
}

/// Rerandomize the credential and prove knowledge of the member secret.
pub(crate) fn sign(
    msg: &[u8],
    key: &MemberKey,
    grp: &GroupKey,
    seed: Option<[u8; 32]>,
) -> Result<Signature, GroupsigError> {
    if bool::from(key.sigma1.is_identity()) {
        return Err(GroupsigError::InvalidArgument("member key has no credential"));
    }
    let mut rng = signing_rng(b"groupsig.ps16.sign", &key.sk.to_bytes(), seed);

    // Randomize sigma1 and sigma2.
    let t = bls_random_scalar(&mut rng);
    let sigma1 = G1Affine::from(&key.sigma1 * t);
    let sigma2 = G1Affine::from(&key.sigma2 * t);

    // Signature of knowledge of sk: commitment K = k*sigma1, whose
    // pairing image e(K, Y) the verifier reconstructs.
    let k = bls_random_scalar(&mut rng);
    let K = G1Affine::from(&sigma1 * k);

    let c = sign_challenge(grp.hash, &sigma1, &sigma2, &K, msg);
    let s = k + c * key.sk;

    Ok(Signature {
        sigma1,
        sigma2,
        K,
        c,
        s,
    })
}

/// Check the challenge and the pairing-product equation
/// `e(K, Y) == e(s*sigma1, Y) + c*(e(sigma1, X) - e(sigma2, gg))`.
pub(crate) fn verify(
    sig: &Signature,
    msg: &[u8],
    grp: &GroupKey,
) -> Result<bool, GroupsigError> {
    if bool::from(sig.sigma1.is_identity()) {
        return Ok(false);
    }
    if sign_challenge(grp.hash, &sig.sigma1, &sig.sigma2, &sig.K, msg) != sig.c {
        return Ok(false);
    }

    let s_sigma1 = G1Affine::from(&sig.sigma1 * sig.s);
    let lhs = pairing(&sig.K, &grp.Y);
    let rhs = pairing(&s_sigma1, &grp.Y)
        + (pairing(&sig.sigma1, &grp.X) - pairing(&sig.sigma2, &grp.gg)) * sig.c;
    Ok(lhs == rhs)
}

/// Scan the membership list for the trapdoor explaining this signature.
///
/// For the honest signer, `e(sigma2, gg) - e(sigma1, X)` equals
/// `e(y*sigma1, tt)` for exactly that member's trapdoor `tt = sk*gg`.
pub(crate) fn open(
    sig: &Signature,
    grp: &GroupKey,
    mgr: &ManagerKey,
    gml: &Gml,
) -> Result<Option<u64>, GroupsigError> {
    let hidden = pairing(&sig.sigma2, &grp.gg) - pairing(&sig.sigma1, &grp.X);
    let y_sigma1 = G1Affine::from(&sig.sigma1 * mgr.y);

    for entry in gml.iter() {
        let tt = read_g2(entry.trapdoor().as_bytes())?;
        if pairing(&y_sigma1, &tt) == hidden {
            return Ok(Some(entry.index()));
        }
    }
    Ok(None)
}

// ------------------------------------------------------------------
// Join protocol: 3 messages, manager starts.
//
//   m0 manager -> member : nonce
//   m1 member  -> manager: id, tau, tt, proof of knowledge of sk
//   m2 manager -> member : credential (sigma1, sigma2)
//                          (manager commits to GML before sending)
// ------------------------------------------------------------------

/// Challenge for the join proof of knowledge. Hash order:
/// `tau | tt | U1 | U2 | nonce | id`.
fn join_challenge(
    hash: HashAlg,
    tau: &G1Affine,
    tt: &G2Affine,
    U1: &G1Affine,
    U2: &G2Affine,
    nonce: &[u8],
    id: &[u8],
) -> Scalar {
    let mut h = Hasher::new(hash, b"groupsig.ps16.join");
    h.update(&tau.to_compressed());
    h.update(&tt.to_compressed());
    h.update(&U1.to_compressed());
    h.update(&U2.to_compressed());
    h.update(nonce);
    h.update(id);
    bls_challenge(h)
}

/// Member side of the join exchange.
pub(crate) enum MemberJoin {
    Start { id: Vec<u8> },
    AwaitCredential { id: Vec<u8>, sk: Scalar },
    Done { key: MemberKey },
    Dead,
}

impl MemberJoin {
    pub(crate) fn new(id: &[u8]) -> MemberJoin {
        MemberJoin::Start { id: id.to_vec() }
    }

    pub(crate) fn step(
        &mut self,
        round: u8,
        incoming: Option<&[u8]>,
        grp: &GroupKey,
    ) -> Result<Option<Vec<u8>>, GroupsigError> {
        match std::mem::replace(self, MemberJoin::Dead) {
            MemberJoin::Start { id } => {
                let bytes = incoming.ok_or(GroupsigError::InvalidArgument("missing message"))?;
                let mut r = FieldReader::tagless(bytes, SCHEME.code())?;
                let nonce = r.field()?.to_vec();
                r.finish()?;
                if nonce.len() != 32 {
                    return Err(GroupsigError::ProtocolAbort { round });
                }

                let mut rng = mohan::mohan_rand();
                let sk = bls_random_scalar(&mut rng);
                let tau = G1Affine::from(&grp.g * sk);
                let tt = G2Affine::from(&grp.gg * sk);

                let k = bls_random_scalar(&mut rng);
                let U1 = G1Affine::from(&grp.g * k);
                let U2 = G2Affine::from(&grp.gg * k);
                let c = join_challenge(grp.hash, &tau, &tt, &U1, &U2, &nonce, &id);
                let s = k + c * sk;

                let mut w = FieldWriter::tagless(SCHEME.code());
                w.field(&id);
                w.field(&tau.to_compressed());
                w.field(&tt.to_compressed());
                w.field(&c.to_bytes());
                w.field(&s.to_bytes());
                *self = MemberJoin::AwaitCredential { id, sk };
                Ok(Some(w.finish()))
            }
            MemberJoin::AwaitCredential { id: _, sk } => {
                let bytes = incoming.ok_or(GroupsigError::InvalidArgument("missing message"))?;
                let mut r = FieldReader::tagless(bytes, SCHEME.code())?;
                let sigma1 = read_g1(r.field()?)?;
                let sigma2 = read_g1(r.field()?)?;
                r.finish()?;

                // The credential must certify sk under the group key
                // before the join is complete:
                //   e(sigma1, X + sk*Y) == e(sigma2, gg).
                if bool::from(sigma1.is_identity()) {
                    return Err(GroupsigError::ProtocolAbort { round });
                }
                let lhs = pairing(&sigma1, &grp.X)
                    + pairing(&G1Affine::from(&sigma1 * sk), &grp.Y);
                if lhs != pairing(&sigma2, &grp.gg) {
                    return Err(GroupsigError::ProtocolAbort { round });
                }

                *self = MemberJoin::Done {
                    key: MemberKey { sk, sigma1, sigma2 },
                };
                Ok(None)
            }
            MemberJoin::Done { .. } | MemberJoin::Dead => {
                Err(GroupsigError::InvalidArgument("join already finished"))
            }
        }
    }

    pub(crate) fn into_key(self) -> Option<MemberKey> {
        match self {
            MemberJoin::Done { key } => Some(key),
            _ => None,
        }
    }
}

/// Manager side of the join exchange.
pub(crate) enum ManagerJoin {
    Start,
    AwaitRequest { nonce: [u8; 32] },
    Done,
    Dead,
}

impl ManagerJoin {
    pub(crate) fn new() -> ManagerJoin {
        ManagerJoin::Start
    }

    pub(crate) fn step(
        &mut self,
        round: u8,
        incoming: Option<&[u8]>,
        mgr: &ManagerKey,
        grp: &GroupKey,
        gml: &mut Gml,
    ) -> Result<Option<Vec<u8>>, GroupsigError> {
        match std::mem::replace(self, ManagerJoin::Dead) {
            ManagerJoin::Start => {
                if incoming.is_some() {
                    return Err(GroupsigError::InvalidArgument("manager speaks first"));
                }
                let mut nonce = [0u8; 32];
                mohan::mohan_rand().fill_bytes(&mut nonce);
                let mut w = FieldWriter::tagless(SCHEME.code());
                w.field(&nonce);
                *self = ManagerJoin::AwaitRequest { nonce };
                Ok(Some(w.finish()))
            }
            ManagerJoin::AwaitRequest { nonce } => {
                let bytes = incoming.ok_or(GroupsigError::InvalidArgument("missing message"))?;
                let mut r = FieldReader::tagless(bytes, SCHEME.code())?;
                let id = r.field()?.to_vec();
                let tau = read_g1(r.field()?)?;
                let tt = read_g2(r.field()?)?;
                let c = read_bls_scalar(r.field()?)?;
                let s = read_bls_scalar(r.field()?)?;
                r.finish()?;

                // Recompute the commitments: U1 = s*g - c*tau in G1 and
                // its G2 twin, then the challenge.
                let U1 = G1Affine::from(G1Projective::from(&grp.g) * s - tau * c);
                let U2 = G2Affine::from(G2Projective::from(&grp.gg) * s - &tt * c);
                if join_challenge(grp.hash, &tau, &tt, &U1, &U2, &nonce, &id) != c {
                    return Err(GroupsigError::ProtocolAbort { round });
                }

                // Issue the credential and commit the member.
                let u = bls_random_scalar(&mut mohan::mohan_rand());
                let sigma1 = G1Affine::from(&grp.g * u);
                let base = G1Projective::from(&grp.g) * mgr.x + tau * mgr.y;
                let sigma2 = G1Affine::from(base * u);

                gml.insert(
                    Identity::new(id),
                    Trapdoor::new(tt.to_compressed().to_vec()),
                )?;

                let mut w = FieldWriter::tagless(SCHEME.code());
                w.field(&sigma1.to_compressed());
                w.field(&sigma2.to_compressed());
                *self = ManagerJoin::Done;
                Ok(Some(w.finish()))
            }
            ManagerJoin::Done | ManagerJoin::Dead => {
                Err(GroupsigError::InvalidArgument("join already finished"))
            }
        }
    }
}

// ------------------------------------------------------------------
// Wire codecs.
// ------------------------------------------------------------------

impl GroupKey {
    pub(crate) fn serialized_size(&self) -> usize {
        2 + field_len(1) + field_len(48) + 3 * field_len(96)
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new(SCHEME.code(), role::GROUP_KEY);
        w.field(&[self.hash as u8]);
        w.field(&self.g.to_compressed());
        w.field(&self.gg.to_compressed());
        w.field(&self.X.to_compressed());
        w.field(&self.Y.to_compressed());
        w.finish()
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<GroupKey, GroupsigError> {
        let mut r = FieldReader::new(bytes, SCHEME.code(), role::GROUP_KEY)?;
        let alg = r.field()?;
        if alg.len() != 1 {
            return Err(GroupsigError::Decode("expected 1-byte field"));
        }
        let hash = HashAlg::from_code(alg[0])?;
        let g = read_g1(r.field()?)?;
        let gg = read_g2(r.field()?)?;
        let X = read_g2(r.field()?)?;
        let Y = read_g2(r.field()?)?;
        r.finish()?;
        Ok(GroupKey { hash, g, gg, X, Y })
    }
}

impl ManagerKey {
    pub(crate) fn serialized_size(&self) -> usize {
        2 + 2 * field_len(32)
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new(SCHEME.code(), role::MANAGER_KEY);
        w.field(&self.x.to_bytes());
        w.field(&self.y.to_bytes());
        w.finish()
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<ManagerKey, GroupsigError> {
        let mut r = FieldReader::new(bytes, SCHEME.code(), role::MANAGER_KEY)?;
        let x = read_bls_scalar(r.field()?)?;
        let y = read_bls_scalar(r.field()?)?;
        r.finish()?;
        Ok(ManagerKey { x, y })
    }
}

impl MemberKey {
    pub(crate) fn serialized_size(&self) -> usize {
        2 + field_len(32) + 2 * field_len(48)
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new(SCHEME.code(), role::MEMBER_KEY);
        w.field(&self.sk.to_bytes());
        w.field(&self.sigma1.to_compressed());
        w.field(&self.sigma2.to_compressed());
        w.finish()
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<MemberKey, GroupsigError> {
        let mut r = FieldReader::new(bytes, SCHEME.code(), role::MEMBER_KEY)?;
        let sk = read_bls_scalar(r.field()?)?;
        let sigma1 = read_g1(r.field()?)?;
        let sigma2 = read_g1(r.field()?)?;
        r.finish()?;
        Ok(MemberKey { sk, sigma1, sigma2 })
    }
}

impl Signature {
    pub(crate) fn serialized_size(&self) -> usize {
        2 + 3 * field_len(48) + 2 * field_len(32)
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new(SCHEME.code(), role::SIGNATURE);
        w.field(&self.sigma1.to_compressed());
        w.field(&self.sigma2.to_compressed());
        w.field(&self.K.to_compressed());
        w.field(&self.c.to_bytes());
        w.field(&self.s.to_bytes());
        w.finish()
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<Signature, GroupsigError> {
        let mut r = FieldReader::new(bytes, SCHEME.code(), role::SIGNATURE)?;
        let sigma1 = read_g1(r.field()?)?;
        let sigma2 = read_g1(r.field()?)?;
        let K = read_g1(r.field()?)?;
        let c = read_bls_scalar(r.field()?)?;
        let s = read_bls_scalar(r.field()?)?;
        r.finish()?;
        Ok(Signature {
            sigma1,
            sigma2,
            K,
            c,
            s,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Run the whole join exchange in-process and return the new key.
    pub(crate) fn enroll(id: &[u8], grp: &GroupKey, mgr: &ManagerKey, gml: &mut Gml) -> MemberKey {
        let mut member = MemberJoin::new(id);
        let mut manager = ManagerJoin::new();

        let m0 = manager.step(0, None, mgr, grp, gml).unwrap().unwrap();
        let m1 = member.step(0, Some(&m0), grp).unwrap().unwrap();
        let m2 = manager.step(1, Some(&m1), mgr, grp, gml).unwrap().unwrap();
        assert!(member.step(2, Some(&m2), grp).unwrap().is_none());
        member.into_key().unwrap()
    }
}

#[cfg(test)]
mod test {
    use super::test_support::enroll;
    use super::*;
    use rand::thread_rng;

    fn group() -> (GroupKey, ManagerKey, Gml) {
        let (grp, mgr) = setup(HashAlg::Blake2b, &mut thread_rng());
        let gml = Gml::new(Scheme::Ps16);
        (grp, mgr, gml)
    }

    #[test]
    fn sign_verify() {
        let (grp, mgr, mut gml) = group();
        let key = enroll(b"alice", &grp, &mgr, &mut gml);

        let sig = sign(b"test message", &key, &grp, None).unwrap();
        assert!(verify(&sig, b"test message", &grp).unwrap());
        assert!(!verify(&sig, b"wrong message", &grp).unwrap());

        let empty = sign(b"", &key, &grp, None).unwrap();
        assert!(verify(&empty, b"", &grp).unwrap());
    }

    #[test]
    fn signatures_are_rerandomized() {
        let (grp, mgr, mut gml) = group();
        let key = enroll(b"alice", &grp, &mgr, &mut gml);
        let a = sign(b"m", &key, &grp, None).unwrap();
        let b = sign(b"m", &key, &grp, None).unwrap();
        assert_ne!(a.sigma1, b.sigma1);

        let s1 = sign(b"m", &key, &grp, Some([4u8; 32])).unwrap();
        let s2 = sign(b"m", &key, &grp, Some([4u8; 32])).unwrap();
        assert_eq!(s1, s2);
    }

    #[test]
    fn open_finds_the_signer() {
        let (grp, mgr, mut gml) = group();
        let alice = enroll(b"alice", &grp, &mgr, &mut gml);
        let bob = enroll(b"bob", &grp, &mgr, &mut gml);

        let sig_a = sign(b"hello", &alice, &grp, None).unwrap();
        let sig_b = sign(b"hello", &bob, &grp, None).unwrap();
        assert_eq!(open(&sig_a, &grp, &mgr, &gml).unwrap(), Some(0));
        assert_eq!(open(&sig_b, &grp, &mgr, &gml).unwrap(), Some(1));
    }

    #[test]
    fn open_of_foreign_signature_is_not_found() {
        let (grp, mgr, mut gml) = group();
        enroll(b"alice", &grp, &mgr, &mut gml);

        let (grp2, mgr2) = setup(HashAlg::Blake2b, &mut thread_rng());
        let mut gml2 = Gml::new(Scheme::Ps16);
        let stranger = enroll(b"mallory", &grp2, &mgr2, &mut gml2);
        let sig = sign(b"hello", &stranger, &grp2, None).unwrap();

        assert_eq!(open(&sig, &grp, &mgr, &gml).unwrap(), None);
    }

    #[test]
    fn join_abort_leaves_no_trace() {
        let (grp, mgr, mut gml) = group();
        let mut member = MemberJoin::new(b"alice");
        let mut manager = ManagerJoin::new();

        let m0 = manager.step(0, None, &mgr, &grp, &mut gml).unwrap().unwrap();
        let mut m1 = member.step(0, Some(&m0), &grp).unwrap().unwrap();

        // Corrupt the member's request: the manager aborts before its
        // commit step and the list stays empty.
        let last = m1.len() - 1;
        m1[last] ^= 0x01;
        assert!(manager.step(1, Some(&m1), &mgr, &grp, &mut gml).is_err());
        assert!(gml.is_empty());
        assert!(member.into_key().is_none());
    }

    #[test]
    fn tampered_credential_rejected_by_member() {
        let (grp, mgr, mut gml) = group();
        let mut member = MemberJoin::new(b"alice");
        let mut manager = ManagerJoin::new();

        let m0 = manager.step(0, None, &mgr, &grp, &mut gml).unwrap().unwrap();
        let m1 = member.step(0, Some(&m0), &grp).unwrap().unwrap();
        let m2 = manager.step(1, Some(&m1), &mgr, &grp, &mut gml).unwrap().unwrap();

        // Hand the member a credential for a different secret.
        let mut r = FieldReader::tagless(&m2, SCHEME.code()).unwrap();
        let sigma1 = read_g1(r.field().unwrap()).unwrap();
        let mut w = FieldWriter::tagless(SCHEME.code());
        w.field(&sigma1.to_compressed());
        w.field(&G1Affine::generator().to_compressed());
        assert!(member.step(2, Some(&w.finish()), &grp).is_err());
        assert!(member.into_key().is_none());
    }

    #[test]
    fn codec_roundtrips() {
        let (grp, mgr, mut gml) = group();
        let key = enroll(b"alice", &grp, &mgr, &mut gml);
        let sig = sign(b"msg", &key, &grp, None).unwrap();

        let b = grp.to_bytes();
        assert_eq!(b.len(), grp.serialized_size());
        assert_eq!(GroupKey::from_bytes(&b).unwrap(), grp);

        let b = mgr.to_bytes();
        assert_eq!(b.len(), mgr.serialized_size());
        let mgr2 = ManagerKey::from_bytes(&b).unwrap();
        assert_eq!(mgr2.x, mgr.x);
        assert_eq!(mgr2.y, mgr.y);

        let b = key.to_bytes();
        assert_eq!(b.len(), key.serialized_size());
        assert_eq!(MemberKey::from_bytes(&b).unwrap(), key);

        let b = sig.to_bytes();
        assert_eq!(b.len(), sig.serialized_size());
        assert_eq!(Signature::from_bytes(&b).unwrap(), sig);
    }

    #[test]
    fn flipped_signature_bytes_never_verify() {
        let (grp, mgr, mut gml) = group();
        let key = enroll(b"alice", &grp, &mgr, &mut gml);
        let sig = sign(b"msg", &key, &grp, None).unwrap();
        let bytes = sig.to_bytes();

        for i in 2..bytes.len() {
            let mut mutated = bytes.clone();
            mutated[i] ^= 0x01;
            if let Ok(s) = Signature::from_bytes(&mutated) {
                assert!(
                    !verify(&s, b"msg", &grp).unwrap(),
                    "byte {} flip slipped through",
                    i
                );
            }
        }
    }
}
