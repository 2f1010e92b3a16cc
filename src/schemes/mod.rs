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

//! The scheme implementations.
//!
//! Each module realizes the generic key/sign/open/join contracts for one
//! construction. Nothing here is exported directly; the enum wrappers in
//! the crate root are the public surface.

pub mod nym;
pub mod ps16;
pub mod vlr;
