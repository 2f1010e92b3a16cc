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

//! Serde Support
//!
//! Serde views every entity as the byte string produced by its canonical
//! wire encoding, so a serde round-trip and a `to_bytes`/`from_bytes`
//! round-trip are the same bytes.

macro_rules! serde_boilerplate {
    ($t:ty, $desc:expr) => {
        impl ::serde::Serialize for $t {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                serializer.serialize_bytes(&self.to_bytes()[..])
            }
        }

        impl<'d> ::serde::Deserialize<'d> for $t {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'d>,
            {
                struct MyVisitor;

                impl<'d> ::serde::de::Visitor<'d> for MyVisitor {
                    type Value = $t;

                    fn expecting(
                        &self,
                        formatter: &mut ::core::fmt::Formatter<'_>,
                    ) -> ::core::fmt::Result {
                        formatter.write_str($desc)
                    }

                    fn visit_bytes<E>(self, bytes: &[u8]) -> Result<$t, E>
                    where
                        E: ::serde::de::Error,
                    {
                        Self::Value::from_bytes(bytes)
                            .map_err(crate::errors::serde_error_from_groupsig_error)
                    }
                }
                deserializer.deserialize_bytes(MyVisitor)
            }
        }
    };
} // macro_rules! serde_boilerplate

#[cfg(test)]
mod test {
    use crate::hash::HashAlg;
    use crate::keys::setup;
    use crate::registry::Scheme;
    use crate::signature::sign;
    use crate::{GroupKey, Signature};
    use rand::thread_rng;

    #[test]
    fn serde_group_key_roundtrip() {
        let (grp, _mgr) = setup(Scheme::Vlr, HashAlg::Blake2b, &mut thread_rng()).unwrap();
        let encoded: Vec<u8> = bincode::serialize(&grp).unwrap();
        let decoded: GroupKey = bincode::deserialize(&encoded).unwrap();
        assert_eq!(grp, decoded);
    }

    #[test]
    fn serde_signature_roundtrip() {
        let (grp, mgr) = setup(Scheme::Vlr, HashAlg::Blake2b, &mut thread_rng()).unwrap();
        let mut key = crate::join::tests_support::enroll(b"serde", &grp, &mgr);
        let sig = sign(b"a message", &mut key, &grp, None).unwrap();
        let encoded: Vec<u8> = bincode::serialize(&sig).unwrap();
        let decoded: Signature = bincode::deserialize(&encoded).unwrap();
        assert_eq!(sig, decoded);
    }
}
