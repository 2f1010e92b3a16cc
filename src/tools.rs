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

//! The Extra Sauce
//!
//! Nonce derivation and the small arithmetic shims shared by the scheme
//! implementations: transcript-based signing RNGs, scalar sampling and
//! point (de)serialization for both curve stacks.

use crate::errors::GroupsigError;
use crate::hash::Hasher;
use bacteria::Transcript;
use bls12_381::hash_to_curve::{ExpandMsgXmd, HashToCurve};
use bls12_381::{G1Affine, G1Projective, G2Affine};
use mohan::dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaChaRng;

/// Derive the RNG feeding one signing (or proving) operation.
///
/// The transcript is rekeyed with the secret witness, so even a broken
/// entropy source never produces a nonce independent of the key. With a
/// caller seed the transcript is finalized from a locally seeded ChaCha
/// instance: deterministic for that one call, and no shared generator
/// state is ever reseeded.
pub(crate) fn signing_rng(
    domain: &'static [u8],
    witness: &[u8],
    seed: Option<[u8; 32]>,
) -> impl RngCore + CryptoRng {
    let t = Transcript::new(domain);
    let builder = t.build_rng().rekey_with_witness_bytes(b"witness", witness);
    match seed {
        Some(seed) => builder.finalize(&mut ChaChaRng::from_seed(seed)),
        None => builder.finalize(&mut mohan::mohan_rand()),
    }
}

/// Sample a BLS12-381 scalar from an RNG by wide reduction.
pub(crate) fn bls_random_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> bls12_381::Scalar {
    let mut wide = [0u8; 64];
    rng.fill_bytes(&mut wide);
    bls12_381::Scalar::from_bytes_wide(&wide)
}

/// Reduce a finished challenge hash into a BLS12-381 scalar.
pub(crate) fn bls_challenge(h: Hasher) -> bls12_381::Scalar {
    bls12_381::Scalar::from_bytes_wide(&h.finalize())
}

/// Reduce a finished challenge hash into a ristretto255 scalar.
pub(crate) fn ristretto_challenge(h: Hasher) -> mohan::dalek::scalar::Scalar {
    mohan::dalek::scalar::Scalar::from_bytes_mod_order_wide(&h.finalize())
}

/// Hash arbitrary bytes to a G1 point, domain separated per use.
pub(crate) fn hash_to_g1(dst: &[u8], msg: &[u8]) -> G1Projective {
    <G1Projective as HashToCurve<ExpandMsgXmd<sha2::Sha256>>>::hash_to_curve(msg, dst)
}

pub(crate) fn array_32(bytes: &[u8]) -> Result<[u8; 32], GroupsigError> {
    if bytes.len() != 32 {
        return Err(GroupsigError::Decode("expected 32-byte field"));
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(bytes);
    Ok(out)
}

pub(crate) fn array_48(bytes: &[u8]) -> Result<[u8; 48], GroupsigError> {
    if bytes.len() != 48 {
        return Err(GroupsigError::Decode("expected 48-byte field"));
    }
    let mut out = [0u8; 48];
    out.copy_from_slice(bytes);
    Ok(out)
}

pub(crate) fn array_96(bytes: &[u8]) -> Result<[u8; 96], GroupsigError> {
    if bytes.len() != 96 {
        return Err(GroupsigError::Decode("expected 96-byte field"));
    }
    let mut out = [0u8; 96];
    out.copy_from_slice(bytes);
    Ok(out)
}

/// Decode a compressed ristretto point, rejecting off-curve encodings.
pub(crate) fn read_ristretto(bytes: &[u8]) -> Result<RistrettoPoint, GroupsigError> {
    CompressedRistretto(array_32(bytes)?)
        .decompress()
        .ok_or(GroupsigError::Decode("invalid ristretto point"))
}

/// Decode a canonical ristretto scalar.
pub(crate) fn read_ristretto_scalar(
    bytes: &[u8],
) -> Result<mohan::dalek::scalar::Scalar, GroupsigError> {
    mohan::dalek::scalar::Scalar::from_canonical_bytes(array_32(bytes)?)
        .ok_or(GroupsigError::Decode("non-canonical scalar"))
}

/// Decode a compressed G1 point.
pub(crate) fn read_g1(bytes: &[u8]) -> Result<G1Affine, GroupsigError> {
    Option::<G1Affine>::from(G1Affine::from_compressed(&array_48(bytes)?))
        .ok_or(GroupsigError::Decode("invalid G1 point"))
}

/// Decode a compressed G2 point.
pub(crate) fn read_g2(bytes: &[u8]) -> Result<G2Affine, GroupsigError> {
    Option::<G2Affine>::from(G2Affine::from_compressed(&array_96(bytes)?))
        .ok_or(GroupsigError::Decode("invalid G2 point"))
}

/// Decode a canonical BLS12-381 scalar.
pub(crate) fn read_bls_scalar(bytes: &[u8]) -> Result<bls12_381::Scalar, GroupsigError> {
    Option::<bls12_381::Scalar>::from(bls12_381::Scalar::from_bytes(&array_32(bytes)?))
        .ok_or(GroupsigError::Decode("non-canonical scalar"))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn seeded_rng_is_deterministic() {
        let mut a = signing_rng(b"test", b"witness", Some([7u8; 32]));
        let mut b = signing_rng(b"test", b"witness", Some([7u8; 32]));
        let mut x = [0u8; 16];
        let mut y = [0u8; 16];
        a.fill_bytes(&mut x);
        b.fill_bytes(&mut y);
        assert_eq!(x, y);
    }

    #[test]
    fn witness_separates_streams() {
        let mut a = signing_rng(b"test", b"witness-a", Some([7u8; 32]));
        let mut b = signing_rng(b"test", b"witness-b", Some([7u8; 32]));
        let mut x = [0u8; 16];
        let mut y = [0u8; 16];
        a.fill_bytes(&mut x);
        b.fill_bytes(&mut y);
        assert_ne!(x, y);
    }

    #[test]
    fn off_curve_points_rejected() {
        assert!(read_ristretto(&[0xffu8; 32]).is_err());
        assert!(read_g1(&[0xffu8; 48]).is_err());
        assert!(read_ristretto(&[0u8; 7]).is_err());
    }
}
