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

//! BBS-style group signatures over BLS12-381 with per-signature
//! pseudonyms and sequential linking.
//!
//! The issuer holds `gamma` with public `W = gamma*g2` and certifies the
//! member secret `y` with the short credential
//! `A = (gamma + e)^-1 * (g1 + y*h1)`. A signature rerandomizes the
//! credential to `(A', Bbar)` and carries a pseudonym `nym = y*hb`,
//! where the base `hb` is hashed from the signature's hash-chain
//! commitment, so two signatures are unlinkable until their signer says
//! otherwise.
//!
//! Linking proves one exponent `y` under every pseudonym. Sequential
//! linking additionally reveals a window of the signer's hash chain:
//! each revealed state reproduces its signature's commitment, and each
//! state walks forward to the next one, so the claimed signing order is
//! the only one the proof accepts.

#![allow(non_snake_case)]

use crate::codec::{field_len, role, FieldReader, FieldWriter};
use crate::errors::GroupsigError;
use crate::gml::{Gml, Identity, Trapdoor};
use crate::hash::{HashAlg, Hasher};
use crate::registry::Scheme;
use crate::tools::{
    array_32, bls_challenge, bls_random_scalar, hash_to_g1, read_bls_scalar, read_g1, read_g2,
    signing_rng,
};
use bls12_381::{pairing, G1Affine, G1Projective, G2Affine, G2Projective, Scalar};
use rand::{CryptoRng, RngCore};

const SCHEME: Scheme = Scheme::Nym;

/// Sequence gaps past this bound are rejected rather than walked.
const MAX_SEQ_GAP: u64 = 1 << 16;

/// Public group parameters.
///
/// Layout: `| 2 | 0x01 | hash | h1 | W |`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GroupKey {
    pub(crate) hash: HashAlg,
    pub(crate) h1: G1Affine,
    pub(crate) W: G2Affine,
}

/// Issuer secret.
///
/// Layout: `| 2 | 0x02 | gamma |`.
#[derive(Clone, Debug)]
pub struct ManagerKey {
    pub(crate) gamma: Scalar,
}

impl Drop for ManagerKey {
    fn drop(&mut self) {
        self.gamma = Scalar::zero();
    }
}

/// Member secret, credential, and hash-chain signing state.
///
/// `seq_state` is the chain state the *next* signature will commit to;
/// it advances once per signature. The seed stays so the member can
/// reconstruct earlier states when asked for a sequential-link proof.
///
/// Layout: `| 2 | 0x03 | y | A | e | seq_seed | seq_state | seq_ctr |`.
#[derive(Clone, Debug, PartialEq)]
pub struct MemberKey {
    pub(crate) y: Scalar,
    pub(crate) A: G1Affine,
    pub(crate) e: Scalar,
    pub(crate) seq_seed: [u8; 32],
    pub(crate) seq_state: [u8; 32],
    pub(crate) seq_ctr: u64,
}

impl Drop for MemberKey {
    fn drop(&mut self) {
        self.y = Scalar::zero();
        for b in self.seq_seed.iter_mut() {
            *b = 0;
        }
        for b in self.seq_state.iter_mut() {
            *b = 0;
        }
    }
}

/// A group signature.
///
/// Layout:
/// `| 2 | 0x04 | A' | Bbar | nym | seq | c | z_r | z_m | z_e | z_y |`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Signature {
    pub(crate) A_prime: G1Affine,
    pub(crate) B_bar: G1Affine,
    pub(crate) nym: G1Affine,
    pub(crate) seq: [u8; 32],
    pub(crate) c: Scalar,
    pub(crate) z_r: Scalar,
    pub(crate) z_m: Scalar,
    pub(crate) z_e: Scalar,
    pub(crate) z_y: Scalar,
}

/// Proof of one exponent under the pseudonyms of several signatures.
///
/// Layout: `| 2 | 0x05 | c | z |`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LinkProof {
    pub(crate) c: Scalar,
    pub(crate) z: Scalar,
}

/// One revealed chain position inside a sequential-link proof.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SeqStep {
    pub(crate) state: [u8; 32],
    pub(crate) gap: u64,
}

/// A link proof plus the ordered chain window backing the claimed
/// signing order, one step per linked signature.
///
/// Layout: `| 2 | 0x06 | c | z | n: u64 | (len, state | gap)* |`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SeqProof {
    pub(crate) link: LinkProof,
    pub(crate) steps: Vec<SeqStep>,
}

fn chain_commit(hash: HashAlg, state: &[u8; 32]) -> [u8; 32] {
    let mut h = Hasher::new(hash, b"groupsig.nym.chain-commit");
    h.update(state);
    h.finalize_short()
}

fn chain_next(hash: HashAlg, state: &[u8; 32]) -> [u8; 32] {
    let mut h = Hasher::new(hash, b"groupsig.nym.chain-next");
    h.update(state);
    h.finalize_short()
}

/// Per-signature pseudonym base, recomputable from the signature alone.
fn nym_base(seq: &[u8; 32]) -> G1Projective {
    hash_to_g1(b"groupsig.nym.nym-base", seq)
}

/// Create a group.
pub(crate) fn setup<R: RngCore + CryptoRng>(hash: HashAlg, rng: &mut R) -> (GroupKey, ManagerKey) {
    let gamma = bls_random_scalar(rng);
    let grp = GroupKey {
        hash,
        h1: G1Affine::from(hash_to_g1(b"groupsig.nym.h1", b"h1")),
        W: G2Affine::from(G2Projective::generator() * gamma),
    };
    (grp, ManagerKey { gamma })
}

/// Challenge over `A' | Bbar | nym | seq | U1 | U2 | U3 | message`.
#[allow(clippy::too_many_arguments)]
fn sign_challenge(
    hash: HashAlg,
    A_prime: &G1Affine,
    B_bar: &G1Affine,
    nym: &G1Affine,
    seq: &[u8; 32],
    U1: &G1Affine,
    U2: &G1Affine,
    U3: &G1Affine,
    msg: &[u8],
) -> Scalar {
    let mut h = Hasher::new(hash, b"groupsig.nym.sign");
    h.update(&A_prime.to_compressed());
    h.update(&B_bar.to_compressed());
    h.update(&nym.to_compressed());
    h.update(seq);
    h.update(&U1.to_compressed());
    h.update(&U2.to_compressed());
    h.update(&U3.to_compressed());
    h.update(msg);
    bls_challenge(h)
}

/// Produce a signature and advance the member's hash chain.
///
/// Witnesses `(r, m, e, y)` with `m = r*y`, over:
///
/// ```text
/// Bbar = r*g1 + m*h1 - e*A'      nym = y*hb      0 = m*hb - r*nym
/// ```
pub(crate) fn sign(
    msg: &[u8],
    key: &mut MemberKey,
    grp: &GroupKey,
    seed: Option<[u8; 32]>,
) -> Result<Signature, GroupsigError> {
    if bool::from(key.A.is_identity()) {
        return Err(GroupsigError::InvalidArgument("member key has no credential"));
    }
    let mut rng = signing_rng(b"groupsig.nym.sign", &key.y.to_bytes(), seed);

    let seq = chain_commit(grp.hash, &key.seq_state);
    let hb = nym_base(&seq);

    let r = bls_random_scalar(&mut rng);
    let m = r * key.y;
    let B = G1Projective::generator() + &grp.h1 * key.y;
    let A_prime = G1Affine::from(&key.A * r);
    let B_bar = G1Affine::from(B * r - &A_prime * key.e);
    let nym = G1Affine::from(hb * key.y);

    let a_r = bls_random_scalar(&mut rng);
    let a_m = bls_random_scalar(&mut rng);
    let a_e = bls_random_scalar(&mut rng);
    let a_y = bls_random_scalar(&mut rng);

    let U1 = G1Affine::from(G1Projective::generator() * a_r + &grp.h1 * a_m - &A_prime * a_e);
    let U2 = G1Affine::from(hb * a_y);
    let U3 = G1Affine::from(hb * a_m - &nym * a_r);

    let c = sign_challenge(grp.hash, &A_prime, &B_bar, &nym, &seq, &U1, &U2, &U3, msg);

    // One chain position per signature, spent here.
    key.seq_state = chain_next(grp.hash, &key.seq_state);
    key.seq_ctr += 1;

    Ok(Signature {
        A_prime,
        B_bar,
        nym,
        seq,
        c,
        z_r: a_r + c * r,
        z_m: a_m + c * m,
        z_e: a_e + c * key.e,
        z_y: a_y + c * key.y,
    })
}

/// Check the pairing equation `e(A', W) == e(Bbar, g2)` and the
/// recomputed challenge.
pub(crate) fn verify(sig: &Signature, msg: &[u8], grp: &GroupKey) -> Result<bool, GroupsigError> {
    if bool::from(sig.A_prime.is_identity()) {
        return Ok(false);
    }
    if pairing(&sig.A_prime, &grp.W) != pairing(&sig.B_bar, &G2Affine::generator()) {
        return Ok(false);
    }

    let hb = nym_base(&sig.seq);
    let U1 = G1Affine::from(
        G1Projective::generator() * sig.z_r + &grp.h1 * sig.z_m
            - &sig.A_prime * sig.z_e
            - &sig.B_bar * sig.c,
    );
    let U2 = G1Affine::from(hb * sig.z_y - &sig.nym * sig.c);
    let U3 = G1Affine::from(hb * sig.z_m - &sig.nym * sig.z_r);

    Ok(sign_challenge(
        grp.hash,
        &sig.A_prime,
        &sig.B_bar,
        &sig.nym,
        &sig.seq,
        &U1,
        &U2,
        &U3,
        msg,
    ) == sig.c)
}

/// Scan the membership list: the signer's trapdoor `tt = y*g2`
/// satisfies `e(nym, g2) == e(hb, tt)`.
pub(crate) fn open(
    sig: &Signature,
    _grp: &GroupKey,
    _mgr: &ManagerKey,
    gml: &Gml,
) -> Result<Option<u64>, GroupsigError> {
    let hb = G1Affine::from(nym_base(&sig.seq));
    let lhs = pairing(&sig.nym, &G2Affine::generator());

    for entry in gml.iter() {
        let tt = read_g2(entry.trapdoor().as_bytes())?;
        if pairing(&hb, &tt) == lhs {
            return Ok(Some(entry.index()));
        }
    }
    Ok(None)
}

/// Challenge for link proofs: per signature `hb | nym | U`, nothing else.
fn link_challenge(
    hash: HashAlg,
    parts: impl Iterator<Item = (G1Affine, G1Affine, G1Affine)>,
) -> Scalar {
    let mut h = Hasher::new(hash, b"groupsig.nym.link");
    for (hb, nym, U) in parts {
        h.update(&hb.to_compressed());
        h.update(&nym.to_compressed());
        h.update(&U.to_compressed());
    }
    bls_challenge(h)
}

/// Prove every given signature's pseudonym hides this member's `y`.
pub(crate) fn link(
    key: &MemberKey,
    grp: &GroupKey,
    sigs: &[Signature],
    msgs: &[&[u8]],
    seed: Option<[u8; 32]>,
) -> Result<LinkProof, GroupsigError> {
    if sigs.is_empty() || sigs.len() != msgs.len() {
        return Err(GroupsigError::InvalidArgument(
            "need one message per signature",
        ));
    }
    for (sig, msg) in sigs.iter().zip(msgs) {
        if !verify(sig, msg, grp)? {
            return Err(GroupsigError::InvalidArgument("cannot link an invalid signature"));
        }
        if G1Affine::from(nym_base(&sig.seq) * key.y) != sig.nym {
            return Err(GroupsigError::InvalidArgument(
                "signature was not produced by this member key",
            ));
        }
    }

    let mut rng = signing_rng(b"groupsig.nym.link", &key.y.to_bytes(), seed);
    let k = bls_random_scalar(&mut rng);

    let parts: Vec<_> = sigs
        .iter()
        .map(|sig| {
            let hb = nym_base(&sig.seq);
            (G1Affine::from(hb), sig.nym, G1Affine::from(hb * k))
        })
        .collect();
    let c = link_challenge(grp.hash, parts.into_iter());

    Ok(LinkProof {
        c,
        z: k + c * key.y,
    })
}

/// Mirror of [`link`].
pub(crate) fn verify_link(
    proof: &LinkProof,
    grp: &GroupKey,
    sigs: &[Signature],
    msgs: &[&[u8]],
) -> Result<bool, GroupsigError> {
    if sigs.is_empty() || sigs.len() != msgs.len() {
        return Err(GroupsigError::InvalidArgument(
            "need one message per signature",
        ));
    }
    for (sig, msg) in sigs.iter().zip(msgs) {
        if !verify(sig, msg, grp)? {
            return Ok(false);
        }
    }

    let parts: Vec<_> = sigs
        .iter()
        .map(|sig| {
            let hb = nym_base(&sig.seq);
            let U = G1Affine::from(hb * proof.z - &sig.nym * proof.c);
            (G1Affine::from(hb), sig.nym, U)
        })
        .collect();
    Ok(link_challenge(grp.hash, parts.into_iter()) == proof.c)
}

/// Prove the given signatures were produced by this key *in the given
/// order*: a link proof plus the chain states backing each commitment.
pub(crate) fn seqlink(
    key: &MemberKey,
    grp: &GroupKey,
    sigs: &[Signature],
    msgs: &[&[u8]],
    seed: Option<[u8; 32]>,
) -> Result<SeqProof, GroupsigError> {
    let link = link(key, grp, sigs, msgs, seed)?;

    // Rebuild the chain from the seed and locate every signature on it.
    let mut states = Vec::with_capacity(key.seq_ctr as usize);
    let mut s = key.seq_seed;
    for _ in 0..key.seq_ctr {
        states.push(s);
        s = chain_next(grp.hash, &s);
    }
    let commits: Vec<[u8; 32]> = states.iter().map(|s| chain_commit(grp.hash, s)).collect();

    let mut positions = Vec::with_capacity(sigs.len());
    for sig in sigs {
        let pos = commits
            .iter()
            .position(|c| *c == sig.seq)
            .ok_or(GroupsigError::InvalidArgument(
                "signature is not on this member's chain",
            ))?;
        if let Some(prev) = positions.last() {
            if pos <= *prev {
                return Err(GroupsigError::InvalidArgument(
                    "signatures are not in signing order",
                ));
            }
        }
        positions.push(pos);
    }

    let steps = positions
        .iter()
        .enumerate()
        .map(|(j, pos)| SeqStep {
            state: states[*pos],
            gap: if j + 1 < positions.len() {
                (positions[j + 1] - pos) as u64
            } else {
                0
            },
        })
        .collect();

    Ok(SeqProof { link, steps })
}

/// Mirror of [`seqlink`]: the link proof must hold, every revealed state
/// must reproduce its signature's commitment, and each state must walk
/// forward to the next.
pub(crate) fn verify_seqlink(
    proof: &SeqProof,
    grp: &GroupKey,
    sigs: &[Signature],
    msgs: &[&[u8]],
) -> Result<bool, GroupsigError> {
    if !verify_link(&proof.link, grp, sigs, msgs)? {
        return Ok(false);
    }
    if proof.steps.len() != sigs.len() {
        return Ok(false);
    }

    for (step, sig) in proof.steps.iter().zip(sigs) {
        if chain_commit(grp.hash, &step.state) != sig.seq {
            return Ok(false);
        }
    }
    for j in 0..proof.steps.len().saturating_sub(1) {
        let gap = proof.steps[j].gap;
        if gap == 0 || gap > MAX_SEQ_GAP {
            return Ok(false);
        }
        let mut s = proof.steps[j].state;
        for _ in 0..gap {
            s = chain_next(grp.hash, &s);
        }
        if s != proof.steps[j + 1].state {
            return Ok(false);
        }
    }
    Ok(true)
}

// ------------------------------------------------------------------
// Join protocol: 2 messages, member starts.
//
//   m0 member  -> manager: id, Y1 = y*h1, tt = y*g2, proof of y
//   m1 manager -> member : credential (A, e)
//                          (manager commits to GML before sending)
// ------------------------------------------------------------------

/// Challenge for the join proof. Hash order: `Y1 | tt | U1 | U2 | id`.
fn join_challenge(
    hash: HashAlg,
    Y1: &G1Affine,
    tt: &G2Affine,
    U1: &G1Affine,
    U2: &G2Affine,
    id: &[u8],
) -> Scalar {
    let mut h = Hasher::new(hash, b"groupsig.nym.join");
    h.update(&Y1.to_compressed());
    h.update(&tt.to_compressed());
    h.update(&U1.to_compressed());
    h.update(&U2.to_compressed());
    h.update(id);
    bls_challenge(h)
}

/// Member side of the join exchange.
pub(crate) enum MemberJoin {
    Start { id: Vec<u8> },
    AwaitCredential { y: Scalar, seq_seed: [u8; 32] },
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
                let y = bls_random_scalar(&mut rng);
                let mut seq_seed = [0u8; 32];
                rng.fill_bytes(&mut seq_seed);

                let Y1 = G1Affine::from(&grp.h1 * y);
                let tt = G2Affine::from(G2Projective::generator() * y);

                let k = bls_random_scalar(&mut rng);
                let U1 = G1Affine::from(&grp.h1 * k);
                let U2 = G2Affine::from(G2Projective::generator() * k);
                let c = join_challenge(grp.hash, &Y1, &tt, &U1, &U2, &id);
                let s = k + c * y;

                let mut w = FieldWriter::tagless(SCHEME.code());
                w.field(&id);
                w.field(&Y1.to_compressed());
                w.field(&tt.to_compressed());
                w.field(&c.to_bytes());
                w.field(&s.to_bytes());
                *self = MemberJoin::AwaitCredential { y, seq_seed };
                Ok(Some(w.finish()))
            }
            MemberJoin::AwaitCredential { y, seq_seed } => {
                let bytes = incoming.ok_or(GroupsigError::InvalidArgument("missing message"))?;
                let mut r = FieldReader::tagless(bytes, SCHEME.code())?;
                let A = read_g1(r.field()?)?;
                let e = read_bls_scalar(r.field()?)?;
                r.finish()?;

                // The credential must certify y under the group key:
                //   e(A, W + e*g2) == e(g1 + y*h1, g2).
                if bool::from(A.is_identity()) {
                    return Err(GroupsigError::ProtocolAbort { round });
                }
                let lhs = pairing(
                    &A,
                    &G2Affine::from(G2Projective::from(&grp.W) + G2Projective::generator() * e),
                );
                let B = G1Affine::from(G1Projective::generator() + &grp.h1 * y);
                if lhs != pairing(&B, &G2Affine::generator()) {
                    return Err(GroupsigError::ProtocolAbort { round });
                }

                *self = MemberJoin::Done {
                    key: MemberKey {
                        y,
                        A,
                        e,
                        seq_seed,
                        seq_state: seq_seed,
                        seq_ctr: 0,
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
                let Y1 = read_g1(r.field()?)?;
                let tt = read_g2(r.field()?)?;
                let c = read_bls_scalar(r.field()?)?;
                let s = read_bls_scalar(r.field()?)?;
                r.finish()?;

                // Recompute the two commitments and the challenge; both
                // group images must hide the same exponent.
                let U1 = G1Affine::from(&grp.h1 * s - Y1 * c);
                let U2 = G2Affine::from(G2Projective::generator() * s - &tt * c);
                if join_challenge(grp.hash, &Y1, &tt, &U1, &U2, &id) != c {
                    return Err(GroupsigError::ProtocolAbort { round });
                }

                let e = bls_random_scalar(&mut mohan::mohan_rand());
                let denom = Option::<Scalar>::from((mgr.gamma + e).invert())
                    .ok_or(GroupsigError::Crypto("degenerate credential exponent"))?;
                let B = G1Projective::generator() + G1Projective::from(&Y1);
                let A = G1Affine::from(B * denom);

                gml.insert(
                    Identity::new(id),
                    Trapdoor::new(tt.to_compressed().to_vec()),
                )?;

                let mut w = FieldWriter::tagless(SCHEME.code());
                w.field(&A.to_compressed());
                w.field(&e.to_bytes());
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
        2 + field_len(1) + field_len(48) + field_len(96)
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new(SCHEME.code(), role::GROUP_KEY);
        w.field(&[self.hash as u8]);
        w.field(&self.h1.to_compressed());
        w.field(&self.W.to_compressed());
        w.finish()
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<GroupKey, GroupsigError> {
        let mut r = FieldReader::new(bytes, SCHEME.code(), role::GROUP_KEY)?;
        let alg = r.field()?;
        if alg.len() != 1 {
            return Err(GroupsigError::Decode("expected 1-byte field"));
        }
        let hash = HashAlg::from_code(alg[0])?;
        let h1 = read_g1(r.field()?)?;
        let W = read_g2(r.field()?)?;
        r.finish()?;
        Ok(GroupKey { hash, h1, W })
    }
}

impl ManagerKey {
    pub(crate) fn serialized_size(&self) -> usize {
        2 + field_len(32)
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new(SCHEME.code(), role::MANAGER_KEY);
        w.field(&self.gamma.to_bytes());
        w.finish()
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<ManagerKey, GroupsigError> {
        let mut r = FieldReader::new(bytes, SCHEME.code(), role::MANAGER_KEY)?;
        let gamma = read_bls_scalar(r.field()?)?;
        r.finish()?;
        Ok(ManagerKey { gamma })
    }
}

impl MemberKey {
    pub(crate) fn serialized_size(&self) -> usize {
        2 + field_len(32) + field_len(48) + 3 * field_len(32) + field_len(8)
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new(SCHEME.code(), role::MEMBER_KEY);
        w.field(&self.y.to_bytes());
        w.field(&self.A.to_compressed());
        w.field(&self.e.to_bytes());
        w.field(&self.seq_seed);
        w.field(&self.seq_state);
        w.field(&self.seq_ctr.to_le_bytes());
        w.finish()
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<MemberKey, GroupsigError> {
        let mut r = FieldReader::new(bytes, SCHEME.code(), role::MEMBER_KEY)?;
        let y = read_bls_scalar(r.field()?)?;
        let A = read_g1(r.field()?)?;
        let e = read_bls_scalar(r.field()?)?;
        let seq_seed = array_32(r.field()?)?;
        let seq_state = array_32(r.field()?)?;
        let ctr_bytes = r.field()?;
        if ctr_bytes.len() != 8 {
            return Err(GroupsigError::Decode("expected 8-byte field"));
        }
        let mut ctr = [0u8; 8];
        ctr.copy_from_slice(ctr_bytes);
        r.finish()?;
        Ok(MemberKey {
            y,
            A,
            e,
            seq_seed,
            seq_state,
            seq_ctr: u64::from_le_bytes(ctr),
        })
    }
}

impl Signature {
    pub(crate) fn serialized_size(&self) -> usize {
        2 + 3 * field_len(48) + 6 * field_len(32)
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new(SCHEME.code(), role::SIGNATURE);
        w.field(&self.A_prime.to_compressed());
        w.field(&self.B_bar.to_compressed());
        w.field(&self.nym.to_compressed());
        w.field(&self.seq);
        w.field(&self.c.to_bytes());
        w.field(&self.z_r.to_bytes());
        w.field(&self.z_m.to_bytes());
        w.field(&self.z_e.to_bytes());
        w.field(&self.z_y.to_bytes());
        w.finish()
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<Signature, GroupsigError> {
        let mut r = FieldReader::new(bytes, SCHEME.code(), role::SIGNATURE)?;
        let A_prime = read_g1(r.field()?)?;
        let B_bar = read_g1(r.field()?)?;
        let nym = read_g1(r.field()?)?;
        let seq = array_32(r.field()?)?;
        let c = read_bls_scalar(r.field()?)?;
        let z_r = read_bls_scalar(r.field()?)?;
        let z_m = read_bls_scalar(r.field()?)?;
        let z_e = read_bls_scalar(r.field()?)?;
        let z_y = read_bls_scalar(r.field()?)?;
        r.finish()?;
        Ok(Signature {
            A_prime,
            B_bar,
            nym,
            seq,
            c,
            z_r,
            z_m,
            z_e,
            z_y,
        })
    }
}

impl LinkProof {
    pub(crate) fn serialized_size(&self) -> usize {
        2 + 2 * field_len(32)
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new(SCHEME.code(), role::PROOF_LINK);
        w.field(&self.c.to_bytes());
        w.field(&self.z.to_bytes());
        w.finish()
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<LinkProof, GroupsigError> {
        let mut r = FieldReader::new(bytes, SCHEME.code(), role::PROOF_LINK)?;
        let c = read_bls_scalar(r.field()?)?;
        let z = read_bls_scalar(r.field()?)?;
        r.finish()?;
        Ok(LinkProof { c, z })
    }
}

impl SeqProof {
    pub(crate) fn serialized_size(&self) -> usize {
        // Size accumulator starts at zero: header, the embedded link
        // proof fields, the element count, then one slot per element.
        let mut size = 2 + 2 * field_len(32) + 8;
        for _ in &self.steps {
            size += field_len(40);
        }
        size
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut w = FieldWriter::new(SCHEME.code(), role::PROOF_SEQ);
        w.field(&self.link.c.to_bytes());
        w.field(&self.link.z.to_bytes());
        w.raw_u64(self.steps.len() as u64);
        for step in &self.steps {
            let mut slot = [0u8; 40];
            slot[..32].copy_from_slice(&step.state);
            slot[32..].copy_from_slice(&step.gap.to_le_bytes());
            w.field(&slot);
        }
        w.finish()
    }

    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<SeqProof, GroupsigError> {
        let mut r = FieldReader::new(bytes, SCHEME.code(), role::PROOF_SEQ)?;
        let c = read_bls_scalar(r.field()?)?;
        let z = read_bls_scalar(r.field()?)?;
        let count = r.raw_u64()?;
        if count > MAX_SEQ_GAP {
            return Err(GroupsigError::Decode("sequence too long"));
        }
        // One slot per element, each its own field.
        let mut steps = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let slot = r.field()?;
            if slot.len() != 40 {
                return Err(GroupsigError::Decode("expected 40-byte field"));
            }
            let state = array_32(&slot[..32])?;
            let mut gap = [0u8; 8];
            gap.copy_from_slice(&slot[32..]);
            steps.push(SeqStep {
                state,
                gap: u64::from_le_bytes(gap),
            });
        }
        r.finish()?;
        Ok(SeqProof {
            link: LinkProof { c, z },
            steps,
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

        let m0 = member.step(0, None, grp).unwrap().unwrap();
        let m1 = manager.step(0, Some(&m0), mgr, grp, gml).unwrap().unwrap();
        assert!(member.step(1, Some(&m1), grp).unwrap().is_none());
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
        let gml = Gml::new(Scheme::Nym);
        (grp, mgr, gml)
    }

    #[test]
    fn sign_verify() {
        let (grp, mgr, mut gml) = group();
        let mut key = enroll(b"alice", &grp, &mgr, &mut gml);

        let sig = sign(b"test message", &mut key, &grp, None).unwrap();
        assert!(verify(&sig, b"test message", &grp).unwrap());
        assert!(!verify(&sig, b"wrong message", &grp).unwrap());

        let empty = sign(b"", &mut key, &grp, None).unwrap();
        assert!(verify(&empty, b"", &grp).unwrap());
    }

    #[test]
    fn pseudonyms_differ_per_signature() {
        let (grp, mgr, mut gml) = group();
        let mut key = enroll(b"alice", &grp, &mgr, &mut gml);
        let a = sign(b"m", &mut key, &grp, None).unwrap();
        let b = sign(b"m", &mut key, &grp, None).unwrap();
        assert_ne!(a.nym, b.nym);
        assert_ne!(a.seq, b.seq);
        assert_eq!(key.seq_ctr, 2);
    }

    #[test]
    fn open_finds_the_signer() {
        let (grp, mgr, mut gml) = group();
        let mut alice = enroll(b"alice", &grp, &mgr, &mut gml);
        let mut bob = enroll(b"bob", &grp, &mgr, &mut gml);

        let sig_a = sign(b"hello", &mut alice, &grp, None).unwrap();
        let sig_b = sign(b"hello", &mut bob, &grp, None).unwrap();
        assert_eq!(open(&sig_a, &grp, &mgr, &gml).unwrap(), Some(0));
        assert_eq!(open(&sig_b, &grp, &mgr, &gml).unwrap(), Some(1));

        let (grp2, mgr2) = setup(HashAlg::Blake2b, &mut thread_rng());
        let mut gml2 = Gml::new(Scheme::Nym);
        let mut mallory = enroll(b"mallory", &grp2, &mgr2, &mut gml2);
        let foreign = sign(b"hello", &mut mallory, &grp2, None).unwrap();
        assert_eq!(open(&foreign, &grp, &mgr, &gml).unwrap(), None);
    }

    #[test]
    fn link_proof_binds_one_signer() {
        let (grp, mgr, mut gml) = group();
        let mut alice = enroll(b"alice", &grp, &mgr, &mut gml);
        let mut bob = enroll(b"bob", &grp, &mgr, &mut gml);

        let sigs = vec![
            sign(b"one", &mut alice, &grp, None).unwrap(),
            sign(b"two", &mut alice, &grp, None).unwrap(),
        ];
        let msgs: Vec<&[u8]> = vec![b"one", b"two"];
        let proof = link(&alice, &grp, &sigs, &msgs, None).unwrap();
        assert!(verify_link(&proof, &grp, &sigs, &msgs).unwrap());

        // Refuse to even produce a proof over someone else's signature.
        let sig_b = sign(b"three", &mut bob, &grp, None).unwrap();
        let mixed = vec![sigs[0].clone(), sig_b.clone()];
        let mixed_msgs: Vec<&[u8]> = vec![b"one", b"three"];
        assert!(link(&alice, &grp, &mixed, &mixed_msgs, None).is_err());

        // A proof transplanted onto a different set fails.
        assert!(!verify_link(&proof, &grp, &mixed, &mixed_msgs).unwrap());
    }

    #[test]
    fn seqlink_accepts_order_and_rejects_shuffles() {
        let (grp, mgr, mut gml) = group();
        let mut key = enroll(b"alice", &grp, &mgr, &mut gml);

        let s1 = sign(b"one", &mut key, &grp, None).unwrap();
        let _skipped = sign(b"noise", &mut key, &grp, None).unwrap();
        let s3 = sign(b"three", &mut key, &grp, None).unwrap();

        let sigs = vec![s1.clone(), s3.clone()];
        let msgs: Vec<&[u8]> = vec![b"one", b"three"];
        let proof = seqlink(&key, &grp, &sigs, &msgs, None).unwrap();
        assert_eq!(proof.steps.len(), 2);
        assert_eq!(proof.steps[0].gap, 2);
        assert!(verify_seqlink(&proof, &grp, &sigs, &msgs).unwrap());

        // The member cannot claim the reverse order...
        let rev = vec![s3.clone(), s1.clone()];
        let rev_msgs: Vec<&[u8]> = vec![b"three", b"one"];
        assert!(seqlink(&key, &grp, &rev, &rev_msgs, None).is_err());

        // ...and a shuffled verification fails the chain walk.
        let mut swapped = proof.clone();
        swapped.steps.swap(0, 1);
        assert!(!verify_seqlink(&swapped, &grp, &sigs, &msgs).unwrap());
    }

    #[test]
    fn join_abort_leaves_no_trace() {
        let (grp, mgr, mut gml) = group();
        let mut member = MemberJoin::new(b"alice");
        let mut manager = ManagerJoin::new();

        let mut m0 = member.step(0, None, &grp).unwrap().unwrap();
        let last = m0.len() - 1;
        m0[last] ^= 0x01;
        assert!(manager.step(0, Some(&m0), &mgr, &grp, &mut gml).is_err());
        assert!(gml.is_empty());
        assert!(member.into_key().is_none());
    }

    #[test]
    fn codec_roundtrips() {
        let (grp, mgr, mut gml) = group();
        let mut key = enroll(b"alice", &grp, &mgr, &mut gml);
        let sig = sign(b"msg", &mut key, &grp, None).unwrap();
        let sig2 = sign(b"msg2", &mut key, &grp, None).unwrap();
        let sigs = vec![sig.clone(), sig2];
        let msgs: Vec<&[u8]> = vec![b"msg", b"msg2"];
        let lp = link(&key, &grp, &sigs, &msgs, None).unwrap();
        let sp = seqlink(&key, &grp, &sigs, &msgs, None).unwrap();

        let b = grp.to_bytes();
        assert_eq!(b.len(), grp.serialized_size());
        assert_eq!(GroupKey::from_bytes(&b).unwrap(), grp);

        let b = mgr.to_bytes();
        assert_eq!(b.len(), mgr.serialized_size());
        assert_eq!(ManagerKey::from_bytes(&b).unwrap().gamma, mgr.gamma);

        let b = key.to_bytes();
        assert_eq!(b.len(), key.serialized_size());
        assert_eq!(MemberKey::from_bytes(&b).unwrap(), key);

        let b = sig.to_bytes();
        assert_eq!(b.len(), sig.serialized_size());
        assert_eq!(Signature::from_bytes(&b).unwrap(), sig);

        let b = lp.to_bytes();
        assert_eq!(b.len(), lp.serialized_size());
        assert_eq!(LinkProof::from_bytes(&b).unwrap(), lp);

        let b = sp.to_bytes();
        assert_eq!(b.len(), sp.serialized_size());
        assert_eq!(SeqProof::from_bytes(&b).unwrap(), sp);
    }

    #[test]
    fn flipped_signature_bytes_never_verify() {
        let (grp, mgr, mut gml) = group();
        let mut key = enroll(b"alice", &grp, &mgr, &mut gml);
        let sig = sign(b"msg", &mut key, &grp, None).unwrap();
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
