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

//! Challenge hashing.
//!
//! Every Fiat-Shamir challenge in this crate is computed by streaming the
//! public values into a [`Hasher`] in the order documented by the scheme,
//! message last, and reducing the 512-bit output to a scalar. The hash
//! family is chosen once, at group setup, and travels inside the group
//! key, so signer and verifier can never disagree on it.

use crate::errors::GroupsigError;
use blake2::{Blake2b as Blake2b512, Digest as _};
use sha2::Sha512;

/// Hash family used for challenge computation within a group.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum HashAlg {
    /// BLAKE2b with 512-bit output. The default.
    Blake2b = 0,
    /// SHA-512.
    Sha512 = 1,
}

impl HashAlg {
    /// Decode a hash family from its wire byte.
    pub fn from_code(code: u8) -> Result<HashAlg, GroupsigError> {
        match code {
            0 => Ok(HashAlg::Blake2b),
            1 => Ok(HashAlg::Sha512),
            _ => Err(GroupsigError::Decode("unknown hash family")),
        }
    }
}

impl Default for HashAlg {
    fn default() -> HashAlg {
        HashAlg::Blake2b
    }
}

/// A streaming 512-bit hasher over one of the supported families.
///
/// Values are fed in with `update`; nothing is ever concatenated into an
/// intermediate buffer.
pub(crate) enum Hasher {
    Blake2b(Blake2b512),
    Sha512(Sha512),
}

impl Hasher {
    /// Start a domain-separated hash computation.
    pub(crate) fn new(alg: HashAlg, domain: &'static [u8]) -> Hasher {
        let mut h = match alg {
            HashAlg::Blake2b => Hasher::Blake2b(Blake2b512::new()),
            HashAlg::Sha512 => Hasher::Sha512(Sha512::new()),
        };
        h.update(domain);
        h
    }

    pub(crate) fn update(&mut self, data: &[u8]) {
        match self {
            Hasher::Blake2b(h) => h.update(data),
            Hasher::Sha512(h) => h.update(data),
        }
    }

    pub(crate) fn finalize(self) -> [u8; 64] {
        let mut out = [0u8; 64];
        match self {
            Hasher::Blake2b(h) => out.copy_from_slice(&h.finalize()),
            Hasher::Sha512(h) => out.copy_from_slice(&h.finalize()),
        }
        out
    }

    /// Finalize into a 256-bit value, used for hash-chain links where a
    /// full wide output buys nothing.
    pub(crate) fn finalize_short(self) -> [u8; 32] {
        let wide = self.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&wide[..32]);
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn families_disagree() {
        let mut a = Hasher::new(HashAlg::Blake2b, b"d");
        let mut b = Hasher::new(HashAlg::Sha512, b"d");
        a.update(b"same input");
        b.update(b"same input");
        assert_ne!(a.finalize()[..], b.finalize()[..]);
    }

    #[test]
    fn streaming_matches_oneshot() {
        let mut a = Hasher::new(HashAlg::Blake2b, b"d");
        a.update(b"hello ");
        a.update(b"world");
        let mut b = Hasher::new(HashAlg::Blake2b, b"d");
        b.update(b"hello world");
        assert_eq!(a.finalize()[..], b.finalize()[..]);
    }

    #[test]
    fn unknown_code_rejected() {
        assert!(HashAlg::from_code(2).is_err());
        assert_eq!(HashAlg::from_code(0).unwrap(), HashAlg::Blake2b);
        assert_eq!(HashAlg::from_code(1).unwrap(), HashAlg::Sha512);
    }
}
