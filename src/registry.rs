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

//! The scheme catalog.
//!
//! Every construction in this crate is identified by a stable one-byte
//! code (the first byte of every serialized entity) and described by a
//! [`Description`]: plain data a transport or embedder can inspect to
//! learn which operations exist and how to drive the join exchange,
//! without knowing anything scheme specific.

use crate::errors::GroupsigError;
use core::fmt;

/// Which party emits the first join message.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum JoinRole {
    /// The candidate member.
    Member,
    /// The group manager.
    Manager,
}

/// A registered group signature scheme.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Scheme {
    /// Pointcheval-Sanders credentials over BLS12-381: open-capable.
    Ps16 = 1,
    /// BBS-style credentials with per-signature pseudonyms: linkable,
    /// sequentially linkable, open-capable.
    Nym = 2,
    /// ElGamal tracing over ristretto255 with verifier-local revocation.
    Vlr = 3,
}

impl Scheme {
    /// The wire code of this scheme.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Look a scheme up by its wire code.
    pub fn from_code(code: u8) -> Result<Scheme, GroupsigError> {
        match code {
            1 => Ok(Scheme::Ps16),
            2 => Ok(Scheme::Nym),
            3 => Ok(Scheme::Vlr),
            _ => Err(GroupsigError::UnknownScheme(code)),
        }
    }

    /// The capability descriptor for this scheme.
    pub fn description(self) -> &'static Description {
        match self {
            Scheme::Ps16 => &PS16_DESCRIPTION,
            Scheme::Nym => &NYM_DESCRIPTION,
            Scheme::Vlr => &VLR_DESCRIPTION,
        }
    }

    pub(crate) fn name(self) -> &'static str {
        self.description().name
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Capability descriptor: what a scheme provides and how its join
/// protocol is shaped. Pure data; the operations themselves live behind
/// the generic entry points, which consult these flags and fail with
/// [`GroupsigError::Unsupported`] for anything a scheme omits.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Description {
    /// Wire code.
    pub code: u8,
    /// Short lowercase name.
    pub name: &'static str,
    /// Whether the manager maintains a membership list.
    pub has_gml: bool,
    /// Whether the scheme supports revocation via a CRL.
    pub has_crl: bool,
    /// Whether the arithmetic uses a pairing.
    pub uses_pairing: bool,
    /// Whether signatures can be opened to a membership index.
    pub has_open: bool,
    /// Whether signatures can be linked by their signer.
    pub has_link: bool,
    /// Whether ordered (sequential) linking is available.
    pub has_seqlink: bool,
    /// Whether the member can prove equality of signing exponents
    /// across signatures.
    pub has_prove_equality: bool,
    /// Whether the issuing and opening secrets live in the same
    /// manager key material.
    pub issuer_is_opener: bool,
    /// Number of messages exchanged during join.
    pub join_seq: u8,
    /// Which party sends the first join message.
    pub join_start: JoinRole,
}

pub(crate) static PS16_DESCRIPTION: Description = Description {
    code: 1,
    name: "ps16",
    has_gml: true,
    has_crl: false,
    uses_pairing: true,
    has_open: true,
    has_link: false,
    has_seqlink: false,
    has_prove_equality: false,
    issuer_is_opener: true,
    join_seq: 3,
    join_start: JoinRole::Manager,
};

pub(crate) static NYM_DESCRIPTION: Description = Description {
    code: 2,
    name: "nym",
    has_gml: true,
    has_crl: false,
    uses_pairing: true,
    has_open: true,
    has_link: true,
    has_seqlink: true,
    has_prove_equality: false,
    issuer_is_opener: true,
    join_seq: 2,
    join_start: JoinRole::Member,
};

pub(crate) static VLR_DESCRIPTION: Description = Description {
    code: 3,
    name: "vlr",
    has_gml: true,
    has_crl: true,
    uses_pairing: false,
    has_open: true,
    has_link: false,
    has_seqlink: false,
    has_prove_equality: true,
    issuer_is_opener: false,
    join_seq: 4,
    join_start: JoinRole::Member,
};

/// Every registered scheme, in wire-code order.
pub static CATALOG: [&Description; 3] = [&PS16_DESCRIPTION, &NYM_DESCRIPTION, &VLR_DESCRIPTION];

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn codes_roundtrip() {
        for desc in CATALOG.iter() {
            let scheme = Scheme::from_code(desc.code).unwrap();
            assert_eq!(scheme.description(), *desc);
            assert_eq!(scheme.code(), desc.code);
        }
    }

    #[test]
    fn unknown_code_is_not_found() {
        assert_eq!(
            Scheme::from_code(0).unwrap_err(),
            GroupsigError::UnknownScheme(0)
        );
        assert_eq!(
            Scheme::from_code(99).unwrap_err(),
            GroupsigError::UnknownScheme(99)
        );
    }

    #[test]
    fn catalog_is_consistent() {
        for desc in CATALOG.iter() {
            // Sequential linking implies plain linking.
            if desc.has_seqlink {
                assert!(desc.has_link);
            }
            // A CRL without a GML would have nothing to reference.
            if desc.has_crl {
                assert!(desc.has_gml);
            }
            assert!(desc.join_seq >= 1);
        }
    }
}
