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

//
// Group signatures
//

// Any registered member can sign on behalf of the group; verifiers learn
// only that *some* member signed. The manager can open a signature back
// to a membership index, and scheme permitting, revoke members or let
// them link their own signatures.
//
// Pick a scheme from the registry, run setup, drive the join exchange
// for each member, then sign/verify/open through the generic entry
// points. Everything that crosses a process boundary serializes through
// one canonical byte layout.

#[macro_use]
mod ser;

mod codec;
mod errors;
pub use errors::GroupsigError;

pub mod hash;
pub use crate::hash::HashAlg;

pub mod registry;
pub use crate::registry::{Description, JoinRole, Scheme, CATALOG};

pub mod gml;
pub use crate::gml::{Gml, GmlEntry, Identity, Trapdoor};

pub mod crl;
pub use crate::crl::{Crl, CrlEntry};

pub mod keys;
pub use crate::keys::{setup, GroupKey, ManagerKey, MemberKey};

pub mod join;
pub use crate::join::{JoinState, ManagerJoin, MemberJoin};

pub mod signature;
pub use crate::signature::{sign, verify, Signature};

pub mod proof;
pub use crate::proof::{
    link, prove_equality, seqlink, verify_equality, verify_link, Proof,
};

pub mod opener;
pub use crate::opener::{open, reveal, trace};

pub mod schemes;
mod tools;
