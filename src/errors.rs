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

//! Errors which may occur while running a group signature scheme or while
//! parsing keys, signatures, proofs and membership lists from wire formats.

use thiserror::Error;

/// The error type shared by every operation in this crate.
///
/// A failed open is *not* represented here: a signature that matches no
/// membership entry is a legitimate outcome and is reported as `Ok(None)`
/// by [`crate::opener::open`].
#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum GroupsigError {
    /// No scheme is registered under the given code.
    #[error("no scheme registered under code {0}")]
    UnknownScheme(u8),

    /// The scheme exists but does not provide the invoked operation.
    #[error("scheme {scheme} does not support {op}")]
    Unsupported {
        /// Name of the scheme that was invoked.
        scheme: &'static str,
        /// The operation the scheme does not provide.
        op: &'static str,
    },

    /// A function was called with arguments that can never succeed.
    /// Caller bug; retrying is pointless.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Two inputs that must belong to the same scheme do not.
    #[error("scheme mismatch: expected code {expected}, got {found}")]
    SchemeMismatch {
        /// Code of the scheme the operation was invoked for.
        expected: u8,
        /// Code carried by the offending input.
        found: u8,
    },

    /// A serialized input is malformed or truncated. Reported without
    /// detail beyond the failing field, on purpose.
    #[error("malformed encoding: {0}")]
    Decode(&'static str),

    /// An arithmetic-primitive operation failed (point decompression,
    /// non-invertible scalar, ...). Fatal to the current call only.
    #[error("arithmetic failure: {0}")]
    Crypto(&'static str),

    /// A join step's verification failed. The session that produced this
    /// is dead; the membership list and other sessions are untouched.
    #[error("join protocol aborted at message {round}")]
    ProtocolAbort {
        /// Index of the protocol message being processed when the
        /// exchange collapsed.
        round: u8,
    },
}

/// Convert `GroupsigError` into `::serde::de::Error`.
///
/// We should do this with `From` but right now the orphan rules prohibit
/// `impl From<GroupsigError> for E where E: ::serde::de::Error`.
pub(crate) fn serde_error_from_groupsig_error<E>(err: GroupsigError) -> E
where
    E: ::serde::de::Error,
{
    E::custom(err)
}
