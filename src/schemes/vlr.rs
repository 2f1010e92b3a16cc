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

//! ElGamal-tracing group signatures over ristretto255, with
//! verifier-local revocation.
//!
//! A member holds an issuer-generated tracing exponent `z` with tag
//! `C = z*H`. A signature ElGamal-encrypts `C` under the opener key,
//! carries a per-signature tag pair `(P, Q = z*P)` under a base `P`
//! derived from the ciphertext, and proves knowledge of `(z, rho)` for
//! the whole relation. Opening decrypts `C` and scans the membership
//! list; revocation publishes `z`, after which anyone can test a
//! signature's tag pair against the revocation list.
//!
//! Join runs over four messages, member first: the candidate
//! authenticates an ephemeral key, answers a manager nonce with it, and
//! receives `(z, C)` plus an issuer credential over them. The credential
//! is re-checked every time the key signs.

use crate::codec::{field_len, role, FieldReader, FieldWriter};
use crate::crl::{Crl, CrlEntry};
use crate::errors::GroupsigError;
use crate::gml::{Gml, Identity, Trapdoor};
use crate::hash::{HashAlg, Hasher};
use crate::registry::Scheme;
use crate::tools::{read_ristretto, read_ristretto_scalar, ristretto_challenge, signing_rng};
use mohan::dalek::{
    constants::RISTRETTO_BASEPOINT_POINT,
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
};
use rand::{CryptoRng, RngCore};
use subtle::ConstantTimeEq;

const SCHEME: Scheme = Scheme::Vlr;

/// Second generator for tracing tags, derived by hashing so its
/// discrete log relative to the basepoint is unknown.
fn tracing_base() -> RistrettoPoint {
    let mut h = Hasher::new(HashAlg::Blake2b, b"groupsig.vlr.tracing-base");
    h.update(b"H");
    RistrettoPoint::from_uniform_bytes(&h.finalize())
}

/// Per-signature linking base, derived from the ciphertext so it is
/// unique per signature and recomputable by any verifier.
fn link_base(hash: HashAlg, e1: &CompressedRistretto, e2: &CompressedRistretto) -> RistrettoPoint {
    let mut h = Hasher::new(hash, b"groupsig.vlr.link-base");
    h.update(e1.as_bytes());
    h.update(e2.as_bytes());
    RistrettoPoint::from_uniform_bytes(&h.finalize())
}

/// Public group parameters.
///
/// Layout: `| 3 | 0x01 | hash | T | W |` (issuer then opener key).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GroupKey {
    pub(crate) hash: HashAlg,
    pub(crate) issuer: RistrettoPoint,
    pub(crate) opener: RistrettoPoint,
}

/// Issuing and opening secrets. The two exponents are distinct so an
/// embedder may hold them apart.
#[derive(Clone, Debug)]
pub struct ManagerKey {
    pub(crate) issue: Scalar,
    pub(crate) open: Scalar,
}

impl Drop for ManagerKey {
    fn drop(&mut self) {
        mohan::zeroize_hack(&mut self.issue);
        mohan::zeroize_hack(&mut self.open);
    }
}

/// A member's signing key: the tracing exponent, its tag, and the
/// issuer credential over both.
///
/// Layout: `| 3 | 0x03 | z | C | cred_R | cred_s | id |`.
#[derive(Clone, Debug, PartialEq)]
pub struct MemberKey {
    pub(crate) z: Scalar,
    pub(crate) tag: RistrettoPoint,
    pub(crate) cred_r: CompressedRistretto,
    pub(crate) cred_s: Scalar,
    pub(crate) id: Vec<u8>,
}

impl Drop for MemberKey {
    fn drop(&mut self) {
        mohan::zeroize_hack(&mut self.z);
    }
}

/// A group signature.
///
/// Layout: `| 3 | 0x04 | E1 | E2 | Q | c | z_z | z_r |`.
#[allow(non_snake_case)]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Signature {
    pub(crate) E1: CompressedRistretto,
    pub(crate) E2: CompressedRistretto,
    pub(crate) Q: CompressedRistretto,
    pub(crate) c: Scalar,
    pub(crate) z_z: Scalar,
    pub(crate) z_r: Scalar,
}

/// Proof that one exponent underlies the tag pairs of several
/// signatures.
///
/// Layout: `| 3 | 0x05 | c | s |`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EqProof {
    pub(crate) c: Scalar,
    pub(crate) s: Scalar,
}

/// Create a group: issuer and opener exponents plus their public halves.
pub(crate) fn setup<R: RngCore + CryptoRng>(hash: HashAlg, rng: &mut R) -> (GroupKey, ManagerKey) {
    let issue = Scalar::random(rng);
    let open = Scalar::random(rng);
    let grp = GroupKey {
        hash,
        issuer: &issue * &RISTRETTO_BASEPOINT_POINT,
        opener: &open * &RISTRETTO_BASEPOINT_POINT,
    };
    (grp, ManagerKey { issue, open })
}

/// Issuer Schnorr credential over `(C, id)`.
fn issue_credential<R: RngCore + CryptoRng>(
    mgr: &ManagerKey,
    grp: &GroupKey,
    tag: &RistrettoPoint,
    id: &[u8],
    rng: &mut R,
) -> (CompressedRistretto, Scalar) {
    let k = Scalar::random(rng);
    let r = (&k * &RISTRETTO_BASEPOINT_POINT).compress();
    let c = credential_challenge(grp, &r, tag, id);
    (r, k + c * mgr.issue)
}

fn credential_challenge(
    grp: &GroupKey,
    r: &CompressedRistretto,
    tag: &RistrettoPoint,
    id: &[u8],
) -> Scalar {
    let mut h = Hasher::new(grp.hash, b"groupsig.vlr.credential");
    h.update(grp.issuer.compress().as_bytes());
    h.update(r.as_bytes());
    h.update(tag.compress().as_bytes());
    h.update(id);
    ristretto_challenge(h)
}

/// `s*G == R + c*T` with the challenge recomputed.
fn credential_verifies(
    grp: &GroupKey,
    tag: &RistrettoPoint,
    id: &[u8],
    cred_r: &CompressedRistretto,
    cred_s: &Scalar,
) -> bool {
    let r = match cred_r.decompress() {
        Some(r) => r,
        None => return false,
    };
    let c = credential_challenge(grp, cred_r, tag, id);
    cred_s * &RISTRETTO_BASEPOINT_POINT == r + c * grp.issuer
}

/// Challenge for the signing proof of knowledge. Hash order: opener key,
/// ciphertext `E1`, `E2`, tag `Q`, commitments `U1`, `U2`, `U3`, message.
#[allow(non_snake_case)]
#[allow(clippy::too_many_arguments)]
fn sign_challenge(
    grp: &GroupKey,
    E1: &CompressedRistretto,
    E2: &CompressedRistretto,
    Q: &CompressedRistretto,
    U1: &CompressedRistretto,
    U2: &CompressedRistretto,
    U3: &CompressedRistretto,
    msg: &[u8],
) -> Scalar {
    let mut h = Hasher::new(grp.hash, b"groupsig.vlr.sign");
    h.update(grp.opener.compress().as_bytes());
    h.update(E1.as_bytes());
    h.update(E2.as_bytes());
    h.update(Q.as_bytes());
    h.update(U1.as_bytes());
    h.update(U2.as_bytes());
    h.update(U3.as_bytes());
    h.update(msg);
    ristretto_challenge(h)
}

/// Produce a signature: ElGamal-encrypt the tracing tag, derive the tag
/// pair, and prove knowledge of `(z, rho)` over the whole relation.
#[allow(non_snake_case)]
pub(crate) fn sign(
    msg: &[u8],
    key: &MemberKey,
    grp: &GroupKey,
    seed: Option<[u8; 32]>,
) -> Result<Signature, GroupsigError> {
    // A key that never finished (or aborted) a join has no valid
    // credential and must not produce signatures.
    if !credential_verifies(grp, &key.tag, &key.id, &key.cred_r, &key.cred_s) {
        return Err(GroupsigError::InvalidArgument(
            "member credential does not verify under this group key",
        ));
    }

    let mut rng = signing_rng(b"groupsig.vlr.sign", key.z.as_bytes(), seed);
    let H = tracing_base();

    let rho = Scalar::random(&mut rng);
    let E1 = (&rho * &RISTRETTO_BASEPOINT_POINT).compress();
    let E2 = (key.tag + rho * grp.opener).compress();
    let P = link_base(grp.hash, &E1, &E2);
    let Q = (key.z * P).compress();

    let a_z = Scalar::random(&mut rng);
    let a_r = Scalar::random(&mut rng);
    let U1 = (&a_r * &RISTRETTO_BASEPOINT_POINT).compress();
    let U2 = (a_z * H + a_r * grp.opener).compress();
    let U3 = (a_z * P).compress();

    let c = sign_challenge(grp, &E1, &E2, &Q, &U1, &U2, &U3, msg);

    Ok(Signature {
        E1,
        E2,
        Q,
        c,
        z_z: a_z + c * key.z,
        z_r: a_r + c * rho,
    })
}

/// Check a signature, optionally against a revocation list.
#[allow(non_snake_case)]
pub(crate) fn verify(
    sig: &Signature,
    msg: &[u8],
    grp: &GroupKey,
    crl: Option<&Crl>,
) -> Result<bool, GroupsigError> {
    let (E1, E2, Q) = match (sig.E1.decompress(), sig.E2.decompress(), sig.Q.decompress()) {
        (Some(a), Some(b), Some(c)) => (a, b, c),
        _ => return Ok(false),
    };
    let H = tracing_base();
    let P = link_base(grp.hash, &sig.E1, &sig.E2);

    // Recompute the commitments from the responses and the challenge.
    let U1 = (&sig.z_r * &RISTRETTO_BASEPOINT_POINT - sig.c * E1).compress();
    let U2 = (sig.z_z * H + sig.z_r * grp.opener - sig.c * E2).compress();
    let U3 = (sig.z_z * P - sig.c * Q).compress();

    if sign_challenge(grp, &sig.E1, &sig.E2, &sig.Q, &U1, &U2, &U3, msg) != sig.c {
        return Ok(false);
    }

    if let Some(crl) = crl {
        for entry in crl.iter() {
            let z_j = read_ristretto_scalar(entry.value())?;
            if z_j * P == Q {
                return Ok(false);
            }
        }
    }

    Ok(true)
}

/// Decrypt the tracing tag and scan the membership list for it.
#[allow(non_snake_case)]
pub(crate) fn open(
    sig: &Signature,
    _grp: &GroupKey,
    mgr: &ManagerKey,
    gml: &Gml,
) -> Result<Option<u64>, GroupsigError> {
    let (E1, E2) = match (sig.E1.decompress(), sig.E2.decompress()) {
        (Some(a), Some(b)) => (a, b),
        _ => return Ok(None),
    };
    let tag = (E2 - mgr.open * E1).compress();

    for entry in gml.iter() {
        let td = entry.trapdoor().as_bytes();
        if td.len() != 64 {
            return Err(GroupsigError::Decode("vlr trapdoor must be 64 bytes"));
        }
        if bool::from(td[32..].ct_eq(tag.as_bytes())) {
            return Ok(Some(entry.index()));
        }
    }
    Ok(None)
}

/// Publish the revocation exponent of one member into the CRL and hand
/// it to the caller.
pub(crate) fn reveal(index: u64, gml: &Gml, crl: &mut Crl) -> Result<Trapdoor, GroupsigError> {
    let entry = gml
        .get(index)
        .ok_or(GroupsigError::InvalidArgument("no entry at index"))?;
    let td = entry.trapdoor().as_bytes();
    if td.len() != 64 {
        return Err(GroupsigError::Decode("vlr trapdoor must be 64 bytes"));
    }
    let exponent = td[..32].to_vec();
    crl.push(CrlEntry::new(index, exponent.clone()));
    Ok(Trapdoor::new(exponent))
}

/// Test one signature against the revocation list: `Q == z_j*P` for a
/// revoked exponent means a revoked member produced it.
#[allow(non_snake_case)]
pub(crate) fn trace(sig: &Signature, grp: &GroupKey, crl: &Crl) -> Result<bool, GroupsigError> {
    let Q = match sig.Q.decompress() {
        Some(q) => q,
        None => return Ok(false),
    };
    let P = link_base(grp.hash, &sig.E1, &sig.E2);
    for entry in crl.iter() {
        let z_j = read_ristretto_scalar(entry.value())?;
        if z_j * P == Q {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Prove the tag pairs of all given signatures share one exponent.
/// Hash order per signature: commitment then base; opener key last.
#[allow(non_snake_case)]
pub(crate) fn prove_equality(
    key: &MemberKey,
    grp: &GroupKey,
    sigs: &[Signature],
    seed: Option<[u8; 32]>,
) -> Result<EqProof, GroupsigError> {
    if sigs.is_empty() {
        return Err(GroupsigError::InvalidArgument("no signatures to link"));
    }
    let mut rng = signing_rng(b"groupsig.vlr.prove-equality", key.z.as_bytes(), seed);
    let k = Scalar::random(&mut rng);

    let mut h = Hasher::new(grp.hash, b"groupsig.vlr.prove-equality");
    for sig in sigs {
        let P = link_base(grp.hash, &sig.E1, &sig.E2);
        let U = (k * P).compress();
        h.update(U.as_bytes());
        h.update(P.compress().as_bytes());
    }
    h.update(grp.opener.compress().as_bytes());

    let c = ristretto_challenge(h);
    Ok(EqProof {
        c,
        s: k + c * key.z,
    })
}

/// Mirror of [`prove_equality`]: rebuild every commitment from the
/// responses and recompute the challenge.
#[allow(non_snake_case)]
pub(crate) fn verify_equality(
    proof: &EqProof,
    grp: &GroupKey,
    sigs: &[Signature],
) -> Result<bool, GroupsigError> {
    if sigs.is_empty() {
        return Err(GroupsigError::InvalidArgument("no signatures to link"));
    }
    let mut h = Hasher::new(grp.hash, b"groupsig.vlr.prove-equality");
    for sig in sigs {
        let Q = match sig.Q.decompress() {
            Some(q) => q,
            None => return Ok(false),
        };
        let P = link_base(grp.hash, &sig.E1, &sig.E2);
        let U = (proof.s * P - proof.c * Q).compress();
        h.update(U.as_bytes());
        h.update(P.compress().as_bytes());
    }
    h.update(grp.opener.compress().as_bytes());
    Ok(ristretto_challenge(h) == proof.c)
}

// ------------------------------------------------------------------
// Join protocol: 4 messages, member starts.
//
//   m0 member  -> manager: id, ephemeral key Y, proof of knowledge
//   m1 manager -> member : nonce
//   m2 member  -> manager: Schnorr answer over the nonce
//   m3 manager -> member : z, C, credential   (manager commits to GML)
// ------------------------------------------------------------------

fn auth_challenge(
    grp: &GroupKey,
    y_pub: &CompressedRistretto,
    r: &CompressedRistretto,
    context: &[u8],
    domain: &'static [u8],
) -> Scalar {
    let mut h = Hasher::new(grp.hash, domain);
    h.update(y_pub.as_bytes());
    h.update(r.as_bytes());
    h.update(context);
    ristretto_challenge(h)
}

/// Member side of the join exchange.
pub(crate) enum MemberJoin {
    Start { id: Vec<u8> },
    AwaitNonce { id: Vec<u8>, y: Scalar, y_pub: CompressedRistretto },
    AwaitCredential { id: Vec<u8>, y: Scalar, y_pub: CompressedRistretto },
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
                if incoming.is_some() {
                    return Err(GroupsigError::InvalidArgument("member speaks first"));
                }
                let mut rng = mohan::mohan_rand();
                let y = Scalar::random(&mut rng);
                let y_pub = (&y * &RISTRETTO_BASEPOINT_POINT).compress();
                let k = Scalar::random(&mut rng);
                let r = (&k * &RISTRETTO_BASEPOINT_POINT).compress();
                let c = auth_challenge(grp, &y_pub, &r, &id, b"groupsig.vlr.join-auth");
                let s = k + c * y;

                let mut w = FieldWriter::tagless(SCHEME.code());
                w.field(&id);
                w.field(y_pub.as_bytes());
                w.field(c.as_bytes());
                w.field(s.as_bytes());
                *self = MemberJoin::AwaitNonce { id, y, y_pub };
                Ok(Some(w.finish()))
            }
            MemberJoin::AwaitNonce { id, y, y_pub } => {
                let bytes = incoming.ok_or(GroupsigError::InvalidArgument("missing message"))?;
                let mut r = FieldReader::tagless(bytes, SCHEME.code())?;
                let nonce = r.field()?.to_vec();
                r.finish()?;
                if nonce.len() != 32 {
                    return Err(GroupsigError::ProtocolAbort { round });
                }

                let mut rng = mohan::mohan_rand();
                let k = Scalar::random(&mut rng);
                let rr = (&k * &RISTRETTO_BASEPOINT_POINT).compress();
                let c = auth_challenge(grp, &y_pub, &rr, &nonce, b"groupsig.vlr.join-ack");
                let s = k + c * y;

                let mut w = FieldWriter::tagless(SCHEME.code());
                w.field(c.as_bytes());
                w.field(s.as_bytes());
                *self = MemberJoin::AwaitCredential { id, y, y_pub };
                Ok(Some(w.finish()))
            }
            MemberJoin::AwaitCredential { id, y: _, y_pub: _ } => {
                let bytes = incoming.ok_or(GroupsigError::InvalidArgument("missing message"))?;
                let mut r = FieldReader::tagless(bytes, SCHEME.code())?;
                let z = read_ristretto_scalar(r.field()?)?;
                let tag = read_ristretto(r.field()?)?;
                let cred_r = CompressedRistretto(crate::tools::array_32(r.field()?)?);
                let cred_s = read_ristretto_scalar(r.field()?)?;
                r.finish()?;

                // The tag must actually bind the exponent we were
                // handed, and the credential must verify under the
                // group key, or the whole exchange is void.
                if tag != z * tracing_base() {
                    return Err(GroupsigError::ProtocolAbort { round });
                }
                if !credential_verifies(grp, &tag, &id, &cred_r, &cred_s) {
                    return Err(GroupsigError::ProtocolAbort { round });
                }

                *self = MemberJoin::Done {
                    key: MemberKey {
                        z,
                        tag,
                        cred_r,
                        cred_s,
                        id,
                    },
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
    AwaitAck {
        id: Vec<u8>,
        y_pub: CompressedRistretto,
        nonce: [u8; 32],
    },
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
                let bytes = incoming.ok_or(GroupsigError::InvalidArgument("missing message"))?;
                let mut r = FieldReader::tagless(bytes, SCHEME.code())?;
                let id = r.field()?.to_vec();
                let y_pub = CompressedRistretto(crate::tools::array_32(r.field()?)?);
                let c = read_ristretto_scalar(r.field()?)?;
                let s = read_ristretto_scalar(r.field()?)?;
                r.finish()?;

                let y_point = y_pub
                    .decompress()
                    .ok_or(GroupsigError::ProtocolAbort { round })?;
                let rr = (&s * &RISTRETTO_BASEPOINT_POINT - c * y_point).compress();
                if auth_challenge(grp, &y_pub, &rr, &id, b"groupsig.vlr.join-auth") != c {
                    return Err(GroupsigError::ProtocolAbort { round });
                }

                let mut nonce = [0u8; 32];
                mohan::mohan_rand().fill_bytes(&mut nonce);
                let mut w = FieldWriter::tagless(SCHEME.code());
                w.field(&nonce);
                *self = ManagerJoin::AwaitAck { id, y_pub, nonce };
                Ok(Some(w.finish()))
            }
            ManagerJoin::AwaitAck { id, y_pub, nonce } => {
                let bytes = incoming.ok_or(GroupsigError::InvalidArgument("missing message"))?;
                let mut r = FieldReader::tagless(bytes, SCHEME.code())?;
                let c = read_ristretto_scalar(r.field()?)?;
                let s = read_ristretto_scalar(r.field()?)?;
                r.finish()?;

                let y_point = y_pub
                    .decompress()
                    .ok_or(GroupsigError::ProtocolAbort { round })?;
                let rr = (&s * &RISTRETTO_BASEPOINT_POINT - c * y_point).compress();
                if auth_challenge(grp, &y_pub, &rr, &nonce, b"groupsig.vlr.join-ack") != c {
                    return Err(GroupsigError::ProtocolAbort { round });
                }

                // Checks passed: mint the tracing exponent, credential
                // it, and commit the member to the list.
                let mut rng = mohan::mohan_rand();
                let z = Scalar::random(&mut rng);
                let tag = z * tracing_base();
                let (cred_r, cred_s) = issue_credential(mgr, grp, &tag, &id, &mut rng);

                let mut trapdoor = Vec::with_capacity(64);
                trapdoor.extend_from_slice(z.as_bytes());
                trapdoor.extend_from_slice(tag.compress().as_bytes());
                gml.insert(Identity::new(id), Trapdoor::new(trapdoor))?;

                let mut w = FieldWriter::tagless(SCHEME.code());
                w.field(z.as_bytes());
                w.field(tag.compress().as_bytes());
                w.field(cred_r.as_bytes());
                w.field(cred_s.as_bytes());
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
        2 + field_len(1) + field_len(32) + field_len(32)
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new(SCHEME.code(), role::GROUP_KEY);
        w.field(&[self.hash as u8]);
        w.field(self.issuer.compress().as_bytes());
        w.field(self.opener.compress().as_bytes());
        w.finish()
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<GroupKey, GroupsigError> {
        let mut r = FieldReader::new(bytes, SCHEME.code(), role::GROUP_KEY)?;
        let alg = r.field()?;
        if alg.len() != 1 {
            return Err(GroupsigError::Decode("expected 1-byte field"));
        }
        let hash = HashAlg::from_code(alg[0])?;
        let issuer = read_ristretto(r.field()?)?;
        let opener = read_ristretto(r.field()?)?;
        r.finish()?;
        Ok(GroupKey {
            hash,
            issuer,
            opener,
        })
    }
}

impl ManagerKey {
    pub(crate) fn serialized_size(&self) -> usize {
        2 + 2 * field_len(32)
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new(SCHEME.code(), role::MANAGER_KEY);
        w.field(self.issue.as_bytes());
        w.field(self.open.as_bytes());
        w.finish()
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<ManagerKey, GroupsigError> {
        let mut r = FieldReader::new(bytes, SCHEME.code(), role::MANAGER_KEY)?;
        let issue = read_ristretto_scalar(r.field()?)?;
        let open = read_ristretto_scalar(r.field()?)?;
        r.finish()?;
        Ok(ManagerKey { issue, open })
    }
}

impl MemberKey {
    pub(crate) fn serialized_size(&self) -> usize {
        2 + 4 * field_len(32) + field_len(self.id.len())
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new(SCHEME.code(), role::MEMBER_KEY);
        w.field(self.z.as_bytes());
        w.field(self.tag.compress().as_bytes());
        w.field(self.cred_r.as_bytes());
        w.field(self.cred_s.as_bytes());
        w.field(&self.id);
        w.finish()
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<MemberKey, GroupsigError> {
        let mut r = FieldReader::new(bytes, SCHEME.code(), role::MEMBER_KEY)?;
        let z = read_ristretto_scalar(r.field()?)?;
        let tag = read_ristretto(r.field()?)?;
        let cred_r = CompressedRistretto(crate::tools::array_32(r.field()?)?);
        let cred_s = read_ristretto_scalar(r.field()?)?;
        let id = r.field()?.to_vec();
        r.finish()?;
        Ok(MemberKey {
            z,
            tag,
            cred_r,
            cred_s,
            id,
        })
    }
}

impl Signature {
    pub(crate) fn serialized_size(&self) -> usize {
        2 + 6 * field_len(32)
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new(SCHEME.code(), role::SIGNATURE);
        w.field(self.E1.as_bytes());
        w.field(self.E2.as_bytes());
        w.field(self.Q.as_bytes());
        w.field(self.c.as_bytes());
        w.field(self.z_z.as_bytes());
        w.field(self.z_r.as_bytes());
        w.finish()
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<Signature, GroupsigError> {
        let mut r = FieldReader::new(bytes, SCHEME.code(), role::SIGNATURE)?;
        let e1 = CompressedRistretto(crate::tools::array_32(r.field()?)?);
        let e2 = CompressedRistretto(crate::tools::array_32(r.field()?)?);
        let q = CompressedRistretto(crate::tools::array_32(r.field()?)?);
        let c = read_ristretto_scalar(r.field()?)?;
        let z_z = read_ristretto_scalar(r.field()?)?;
        let z_r = read_ristretto_scalar(r.field()?)?;
        r.finish()?;
        Ok(Signature {
            E1: e1,
            E2: e2,
            Q: q,
            c,
            z_z,
            z_r,
        })
    }
}

impl EqProof {
    pub(crate) fn serialized_size(&self) -> usize {
        2 + 2 * field_len(32)
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new(SCHEME.code(), role::PROOF_LINK);
        w.field(self.c.as_bytes());
        w.field(self.s.as_bytes());
        w.finish()
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<EqProof, GroupsigError> {
        let mut r = FieldReader::new(bytes, SCHEME.code(), role::PROOF_LINK)?;
        let c = read_ristretto_scalar(r.field()?)?;
        let s = read_ristretto_scalar(r.field()?)?;
        r.finish()?;
        Ok(EqProof { c, s })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Run the whole join exchange in-process and return the new key.
    pub(crate) fn enroll(id: &[u8], grp: &GroupKey, mgr: &ManagerKey, gml: &mut Gml) -> MemberKey {
        let mut member = MemberJoin::new(id);
        let mut manager = ManagerJoin::new();

        let m0 = member.step(0, None, grp).unwrap().unwrap();
        let m1 = manager.step(0, Some(&m0), mgr, grp, gml).unwrap().unwrap();
        let m2 = member.step(1, Some(&m1), grp).unwrap().unwrap();
        let m3 = manager.step(2, Some(&m2), mgr, grp, gml).unwrap().unwrap();
        assert!(member.step(3, Some(&m3), grp).unwrap().is_none());
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
        let gml = Gml::new(Scheme::Vlr);
        (grp, mgr, gml)
    }

    #[test]
    fn sign_verify() {
        let (grp, mgr, mut gml) = group();
        let key = enroll(b"alice", &grp, &mgr, &mut gml);

        let good = sign(b"test message", &key, &grp, None).unwrap();
        assert!(verify(&good, b"test message", &grp, None).unwrap());
        assert!(!verify(&good, b"wrong message", &grp, None).unwrap());

        // Empty messages are messages too.
        let empty = sign(b"", &key, &grp, None).unwrap();
        assert!(verify(&empty, b"", &grp, None).unwrap());
    }

    #[test]
    fn seeded_signing_is_deterministic() {
        let (grp, mgr, mut gml) = group();
        let key = enroll(b"alice", &grp, &mgr, &mut gml);
        let a = sign(b"m", &key, &grp, Some([9u8; 32])).unwrap();
        let b = sign(b"m", &key, &grp, Some([9u8; 32])).unwrap();
        assert_eq!(a, b);
        let c = sign(b"m", &key, &grp, Some([10u8; 32])).unwrap();
        assert_ne!(a, c);
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

        // A structurally valid signature from a different group.
        let (grp2, mgr2) = setup(HashAlg::Blake2b, &mut thread_rng());
        let mut gml2 = Gml::new(Scheme::Vlr);
        let stranger = enroll(b"mallory", &grp2, &mgr2, &mut gml2);
        let sig = sign(b"hello", &stranger, &grp2, None).unwrap();

        assert_eq!(open(&sig, &grp, &mgr, &gml).unwrap(), None);
    }

    #[test]
    fn revocation_flips_verification_and_trace() {
        let (grp, mgr, mut gml) = group();
        let alice = enroll(b"alice", &grp, &mgr, &mut gml);
        let bob = enroll(b"bob", &grp, &mgr, &mut gml);
        let mut crl = Crl::new(Scheme::Vlr).unwrap();

        let sig_a = sign(b"msg", &alice, &grp, None).unwrap();
        let sig_b = sign(b"msg", &bob, &grp, None).unwrap();
        assert!(verify(&sig_a, b"msg", &grp, Some(&crl)).unwrap());

        reveal(0, &gml, &mut crl).unwrap();
        assert_eq!(crl.len(), 1);

        // Alice is revoked: her signatures (old and new) now fail and
        // trace to the CRL. Bob is untouched.
        assert!(!verify(&sig_a, b"msg", &grp, Some(&crl)).unwrap());
        assert!(trace(&sig_a, &grp, &crl).unwrap());
        assert!(verify(&sig_b, b"msg", &grp, Some(&crl)).unwrap());
        assert!(!trace(&sig_b, &grp, &crl).unwrap());
        // Without the CRL the revoked signature still verifies.
        assert!(verify(&sig_a, b"msg", &grp, None).unwrap());
    }

    #[test]
    fn equality_proof_links_one_signer() {
        let (grp, mgr, mut gml) = group();
        let alice = enroll(b"alice", &grp, &mgr, &mut gml);
        let bob = enroll(b"bob", &grp, &mgr, &mut gml);

        let sigs = vec![
            sign(b"one", &alice, &grp, None).unwrap(),
            sign(b"two", &alice, &grp, None).unwrap(),
            sign(b"three", &alice, &grp, None).unwrap(),
        ];
        let proof = prove_equality(&alice, &grp, &sigs, None).unwrap();
        assert!(verify_equality(&proof, &grp, &sigs).unwrap());

        // A set containing someone else's signature does not verify.
        let mixed = vec![sigs[0].clone(), sign(b"four", &bob, &grp, None).unwrap()];
        let bad = prove_equality(&alice, &grp, &mixed, None).unwrap();
        assert!(!verify_equality(&bad, &grp, &mixed).unwrap());
    }

    #[test]
    fn join_abort_leaves_no_trace() {
        let (grp, mgr, mut gml) = group();
        let mut member = MemberJoin::new(b"alice");
        let mut manager = ManagerJoin::new();

        let m0 = member.step(0, None, &grp).unwrap().unwrap();
        let m1 = manager
            .step(0, Some(&m0), &mgr, &grp, &mut gml)
            .unwrap()
            .unwrap();
        let mut m2 = member.step(1, Some(&m1), &grp).unwrap().unwrap();

        // Corrupt the member's nonce answer: the manager must abort
        // before its commit step, so the list stays empty.
        let last = m2.len() - 1;
        m2[last] ^= 0x01;
        assert!(manager.step(2, Some(&m2), &mgr, &grp, &mut gml).is_err());
        assert!(gml.is_empty());
        assert!(member.into_key().is_none());
    }

    #[test]
    fn tampered_credential_rejected_by_member() {
        let (grp, mgr, mut gml) = group();
        let mut member = MemberJoin::new(b"alice");
        let mut manager = ManagerJoin::new();

        let m0 = member.step(0, None, &grp).unwrap().unwrap();
        let m1 = manager
            .step(0, Some(&m0), &mgr, &grp, &mut gml)
            .unwrap()
            .unwrap();
        let m2 = member.step(1, Some(&m1), &grp).unwrap().unwrap();
        let mut m3 = manager
            .step(2, Some(&m2), &mgr, &grp, &mut gml)
            .unwrap()
            .unwrap();

        // Flip a byte of the credential: the member's final check fails
        // and no key is ever produced.
        let last = m3.len() - 1;
        m3[last] ^= 0x01;
        assert!(member.step(3, Some(&m3), &grp).is_err());
        assert!(member.into_key().is_none());
    }

    #[test]
    fn hand_built_key_cannot_sign() {
        let (grp, mgr, mut gml) = group();
        let real = enroll(b"alice", &grp, &mgr, &mut gml);

        // Same shape, never certified.
        let fake = MemberKey {
            z: Scalar::random(&mut thread_rng()),
            tag: Scalar::random(&mut thread_rng()) * tracing_base(),
            cred_r: real.cred_r,
            cred_s: real.cred_s,
            id: b"mallory".to_vec(),
        };
        assert!(sign(b"msg", &fake, &grp, None).is_err());
    }

    #[test]
    fn codec_roundtrips() {
        let (grp, mgr, mut gml) = group();
        let key = enroll(b"alice", &grp, &mgr, &mut gml);
        let sig = sign(b"msg", &key, &grp, None).unwrap();
        let proof = prove_equality(&key, &grp, &[sig.clone()], None).unwrap();

        let b = grp.to_bytes();
        assert_eq!(b.len(), grp.serialized_size());
        assert_eq!(GroupKey::from_bytes(&b).unwrap(), grp);

        let b = mgr.to_bytes();
        assert_eq!(b.len(), mgr.serialized_size());
        let mgr2 = ManagerKey::from_bytes(&b).unwrap();
        assert_eq!(mgr2.issue, mgr.issue);
        assert_eq!(mgr2.open, mgr.open);

        let b = key.to_bytes();
        assert_eq!(b.len(), key.serialized_size());
        assert_eq!(MemberKey::from_bytes(&b).unwrap(), key);

        let b = sig.to_bytes();
        assert_eq!(b.len(), sig.serialized_size());
        // scheme code 3, signature role tag 4
        assert_eq!(hex::encode(&b[..2]), "0304");
        assert_eq!(Signature::from_bytes(&b).unwrap(), sig);

        let b = proof.to_bytes();
        assert_eq!(b.len(), proof.serialized_size());
        assert_eq!(EqProof::from_bytes(&b).unwrap(), proof);
    }

    #[test]
    fn flipped_signature_bytes_never_verify() {
        let (grp, mgr, mut gml) = group();
        let key = enroll(b"alice", &grp, &mgr, &mut gml);
        let sig = sign(b"msg", &key, &grp, None).unwrap();
        let bytes = sig.to_bytes();

        // Skip the scheme/role header; every flip in the body must be
        // rejected, either at decode or at verify.
        for i in 2..bytes.len() {
            let mut mutated = bytes.clone();
            mutated[i] ^= 0x01;
            if let Ok(s) = Signature::from_bytes(&mutated) {
                assert!(
                    !verify(&s, b"msg", &grp, None).unwrap(),
                    "byte {} flip slipped through",
                    i
                );
            }
        }
    }
}
