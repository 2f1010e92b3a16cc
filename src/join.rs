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

//! The interactive join exchange.
//!
//! A scheme declares how many messages its join protocol exchanges and
//! who speaks first (see [`crate::registry::Description`]); the sessions
//! here drive either side of that exchange over opaque message blobs, so
//! a transport can ferry bytes without knowing anything about the scheme.
//!
//! Messages are numbered `0..join_seq` and alternate strictly between
//! the parties. The starter's first step consumes nothing; the receiver
//! of the last message takes a final step that produces nothing. The
//! manager's final producing step is the commit point: that is when the
//! new member lands in the membership list.
//!
//! Any failed check poisons the session permanently ([`JoinState::Aborted`]);
//! an aborted member session can never yield a key, so partial key
//! material cannot leak into signing. A transport that times out a peer
//! must treat the session as aborted and drop it. Other sessions and the
//! membership list are unaffected.

use crate::errors::GroupsigError;
use crate::gml::Gml;
use crate::keys::{check_scheme, GroupKey, ManagerKey, MemberKey};
use crate::registry::{JoinRole, Scheme};
use crate::schemes::{nym, ps16, vlr};

/// Where a join session stands.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum JoinState {
    /// No step taken yet.
    NotStarted,
    /// Waiting for the peer's message with this index.
    AwaitingPeer(u8),
    /// Exchange finished; a member session now holds a key.
    Completed,
    /// A check failed; the session is dead for good.
    Aborted,
}

enum MemberCtx {
    Ps16(ps16::MemberJoin),
    Nym(nym::MemberJoin),
    Vlr(vlr::MemberJoin),
}

enum ManagerCtx {
    Ps16(ps16::ManagerJoin),
    Nym(nym::ManagerJoin),
    Vlr(vlr::ManagerJoin),
}

/// Shared turn accounting for either side of the exchange.
struct Turn {
    seq: u8,
    /// Index of the next message this party will produce.
    next_out: u8,
}

impl Turn {
    fn new(seq: u8, starter: JoinRole, me: JoinRole) -> Turn {
        Turn {
            seq,
            next_out: if starter == me { 0 } else { 1 },
        }
    }

    /// Index of the message the upcoming step consumes, if any.
    fn incoming_index(&self) -> Option<u8> {
        if self.next_out == 0 {
            None
        } else {
            Some(self.next_out - 1)
        }
    }

    /// Whether the upcoming step produces a message.
    fn produces(&self) -> bool {
        self.next_out <= self.seq - 1
    }

    /// The round index a step error is attributed to.
    fn round(&self) -> u8 {
        self.incoming_index().unwrap_or(0)
    }

    /// Advance past one step; returns the new state.
    fn advance(&mut self) -> JoinState {
        if !self.produces() || self.next_out == self.seq - 1 {
            JoinState::Completed
        } else {
            let state = JoinState::AwaitingPeer(self.next_out + 1);
            self.next_out += 2;
            state
        }
    }

    fn check_incoming(&self, incoming: &Option<&[u8]>) -> Result<(), GroupsigError> {
        match (self.incoming_index(), incoming) {
            (None, None) | (Some(_), Some(_)) => Ok(()),
            (None, Some(_)) => Err(GroupsigError::InvalidArgument(
                "starter's first step takes no message",
            )),
            (Some(_), None) => Err(GroupsigError::InvalidArgument("missing peer message")),
        }
    }
}

/// The candidate member's side of the join exchange.
pub struct MemberJoin {
    scheme: Scheme,
    state: JoinState,
    turn: Turn,
    ctx: MemberCtx,
}

impl MemberJoin {
    /// Start a session for the group, announcing the given identity.
    pub fn new(id: &[u8], grp: &GroupKey) -> MemberJoin {
        let scheme = grp.scheme();
        let desc = scheme.description();
        let ctx = match scheme {
            Scheme::Ps16 => MemberCtx::Ps16(ps16::MemberJoin::new(id)),
            Scheme::Nym => MemberCtx::Nym(nym::MemberJoin::new(id)),
            Scheme::Vlr => MemberCtx::Vlr(vlr::MemberJoin::new(id)),
        };
        MemberJoin {
            scheme,
            state: JoinState::NotStarted,
            turn: Turn::new(desc.join_seq, desc.join_start, JoinRole::Member),
            ctx,
        }
    }

    pub fn state(&self) -> JoinState {
        self.state
    }

    /// Messages this exchange will carry in total.
    pub fn rounds(&self) -> u8 {
        self.turn.seq
    }

    /// Run one protocol step: consume the peer's message (absent for the
    /// starter's first step) and produce the reply (absent for the final
    /// step). Any error is terminal for this session.
    pub fn step(
        &mut self,
        incoming: Option<&[u8]>,
        grp: &GroupKey,
    ) -> Result<Option<Vec<u8>>, GroupsigError> {
        match self.state {
            JoinState::Completed | JoinState::Aborted => {
                return Err(GroupsigError::InvalidArgument("join session is finished"))
            }
            _ => {}
        }
        check_scheme(self.scheme, grp.scheme())?;
        self.turn.check_incoming(&incoming)?;

        let round = self.turn.round();
        let result = match (&mut self.ctx, grp) {
            (MemberCtx::Ps16(ctx), GroupKey::Ps16(g)) => ctx.step(round, incoming, g),
            (MemberCtx::Nym(ctx), GroupKey::Nym(g)) => ctx.step(round, incoming, g),
            (MemberCtx::Vlr(ctx), GroupKey::Vlr(g)) => ctx.step(round, incoming, g),
            _ => Err(GroupsigError::SchemeMismatch {
                expected: self.scheme.code(),
                found: grp.scheme().code(),
            }),
        };

        match result {
            Ok(out) => {
                self.state = self.turn.advance();
                Ok(out)
            }
            Err(err) => {
                self.state = JoinState::Aborted;
                Err(err)
            }
        }
    }

    /// Take the member key out of a completed session.
    pub fn finish(self) -> Result<MemberKey, GroupsigError> {
        if self.state != JoinState::Completed {
            return Err(GroupsigError::InvalidArgument(
                "join session did not complete",
            ));
        }
        let key = match self.ctx {
            MemberCtx::Ps16(ctx) => ctx.into_key().map(MemberKey::Ps16),
            MemberCtx::Nym(ctx) => ctx.into_key().map(MemberKey::Nym),
            MemberCtx::Vlr(ctx) => ctx.into_key().map(MemberKey::Vlr),
        };
        key.ok_or(GroupsigError::InvalidArgument(
            "join session did not complete",
        ))
    }
}

/// The manager's side of the join exchange. The final producing step
/// inserts the new member into the membership list.
pub struct ManagerJoin {
    scheme: Scheme,
    state: JoinState,
    turn: Turn,
    ctx: ManagerCtx,
}

impl ManagerJoin {
    pub fn new(grp: &GroupKey) -> ManagerJoin {
        let scheme = grp.scheme();
        let desc = scheme.description();
        let ctx = match scheme {
            Scheme::Ps16 => ManagerCtx::Ps16(ps16::ManagerJoin::new()),
            Scheme::Nym => ManagerCtx::Nym(nym::ManagerJoin::new()),
            Scheme::Vlr => ManagerCtx::Vlr(vlr::ManagerJoin::new()),
        };
        ManagerJoin {
            scheme,
            state: JoinState::NotStarted,
            turn: Turn::new(desc.join_seq, desc.join_start, JoinRole::Manager),
            ctx,
        }
    }

    pub fn state(&self) -> JoinState {
        self.state
    }

    pub fn rounds(&self) -> u8 {
        self.turn.seq
    }

    pub fn step(
        &mut self,
        incoming: Option<&[u8]>,
        mgr: &ManagerKey,
        grp: &GroupKey,
        gml: &mut Gml,
    ) -> Result<Option<Vec<u8>>, GroupsigError> {
        match self.state {
            JoinState::Completed | JoinState::Aborted => {
                return Err(GroupsigError::InvalidArgument("join session is finished"))
            }
            _ => {}
        }
        check_scheme(self.scheme, grp.scheme())?;
        check_scheme(self.scheme, mgr.scheme())?;
        check_scheme(self.scheme, gml.scheme())?;
        self.turn.check_incoming(&incoming)?;

        let round = self.turn.round();
        let result = match (&mut self.ctx, mgr, grp) {
            (ManagerCtx::Ps16(ctx), ManagerKey::Ps16(m), GroupKey::Ps16(g)) => {
                ctx.step(round, incoming, m, g, gml)
            }
            (ManagerCtx::Nym(ctx), ManagerKey::Nym(m), GroupKey::Nym(g)) => {
                ctx.step(round, incoming, m, g, gml)
            }
            (ManagerCtx::Vlr(ctx), ManagerKey::Vlr(m), GroupKey::Vlr(g)) => {
                ctx.step(round, incoming, m, g, gml)
            }
            _ => Err(GroupsigError::SchemeMismatch {
                expected: self.scheme.code(),
                found: grp.scheme().code(),
            }),
        };

        match result {
            Ok(out) => {
                self.state = self.turn.advance();
                Ok(out)
            }
            Err(err) => {
                self.state = JoinState::Aborted;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests_support {
    use super::*;

    /// Drive a full join exchange through the generic sessions.
    pub(crate) fn enroll_with_gml(
        id: &[u8],
        grp: &GroupKey,
        mgr: &ManagerKey,
        gml: &mut Gml,
    ) -> MemberKey {
        let desc = grp.scheme().description();
        let mut member = MemberJoin::new(id, grp);
        let mut manager = ManagerJoin::new(grp);

        let mut carried: Option<Vec<u8>> = None;
        let mut turn = desc.join_start;
        while member.state() != JoinState::Completed || manager.state() != JoinState::Completed {
            carried = match turn {
                JoinRole::Member => {
                    let out = member.step(carried.as_deref(), grp).unwrap();
                    turn = JoinRole::Manager;
                    out
                }
                JoinRole::Manager => {
                    let out = manager.step(carried.as_deref(), mgr, grp, gml).unwrap();
                    turn = JoinRole::Member;
                    out
                }
            };
        }
        member.finish().unwrap()
    }

    /// Same, with a throwaway membership list.
    pub(crate) fn enroll(id: &[u8], grp: &GroupKey, mgr: &ManagerKey) -> MemberKey {
        let mut gml = Gml::new(grp.scheme());
        enroll_with_gml(id, grp, mgr, &mut gml)
    }
}

#[cfg(test)]
mod test {
    use super::tests_support::enroll_with_gml;
    use super::*;
    use crate::hash::HashAlg;
    use crate::keys::setup;
    use rand::thread_rng;

    #[test]
    fn generic_join_completes_for_every_scheme() {
        for scheme in &[Scheme::Ps16, Scheme::Nym, Scheme::Vlr] {
            let (grp, mgr) = setup(*scheme, HashAlg::Blake2b, &mut thread_rng()).unwrap();
            let mut gml = Gml::new(*scheme);

            let key = enroll_with_gml(b"alice", &grp, &mgr, &mut gml);
            assert_eq!(key.scheme(), *scheme);
            assert_eq!(gml.len(), 1);
            assert_eq!(gml.get(0).unwrap().id().as_bytes(), b"alice");

            let key = enroll_with_gml(b"bob", &grp, &mgr, &mut gml);
            assert_eq!(key.scheme(), *scheme);
            assert_eq!(gml.get(1).unwrap().id().as_bytes(), b"bob");
        }
    }

    #[test]
    fn message_counts_match_descriptor() {
        for scheme in &[Scheme::Ps16, Scheme::Nym, Scheme::Vlr] {
            let desc = scheme.description();
            let (grp, mgr) = setup(*scheme, HashAlg::Blake2b, &mut thread_rng()).unwrap();
            let mut gml = Gml::new(*scheme);

            let mut member = MemberJoin::new(b"alice", &grp);
            let mut manager = ManagerJoin::new(&grp);
            assert_eq!(member.rounds(), desc.join_seq);

            let mut carried: Option<Vec<u8>> = None;
            let mut turn = desc.join_start;
            let mut messages = 0u8;
            while member.state() != JoinState::Completed
                || manager.state() != JoinState::Completed
            {
                carried = match turn {
                    JoinRole::Member => {
                        let out = member.step(carried.as_deref(), &grp).unwrap();
                        turn = JoinRole::Manager;
                        out
                    }
                    JoinRole::Manager => {
                        let out = manager.step(carried.as_deref(), &mgr, &grp, &mut gml).unwrap();
                        turn = JoinRole::Member;
                        out
                    }
                };
                if carried.is_some() {
                    messages += 1;
                }
            }
            assert_eq!(messages, desc.join_seq);
        }
    }

    #[test]
    fn corrupted_message_aborts_both_sides() {
        for scheme in &[Scheme::Ps16, Scheme::Nym, Scheme::Vlr] {
            let (grp, mgr) = setup(*scheme, HashAlg::Blake2b, &mut thread_rng()).unwrap();
            let mut gml = Gml::new(*scheme);
            let desc = scheme.description();

            let mut member = MemberJoin::new(b"alice", &grp);
            let mut manager = ManagerJoin::new(&grp);

            // Ferry messages but corrupt the member's first outgoing
            // message. The manager must abort without committing, and
            // the member session can never produce a key.
            let mut carried: Option<Vec<u8>> = None;
            if desc.join_start == JoinRole::Manager {
                carried = manager.step(None, &mgr, &grp, &mut gml).unwrap();
            }
            let mut bad = member.step(carried.as_deref(), &grp).unwrap().unwrap();
            let last = bad.len() - 1;
            bad[last] ^= 0x01;

            assert!(manager.step(Some(&bad), &mgr, &grp, &mut gml).is_err());
            assert_eq!(manager.state(), JoinState::Aborted);
            assert!(gml.is_empty());

            // A poisoned manager session refuses further steps.
            assert!(manager.step(Some(&bad), &mgr, &grp, &mut gml).is_err());

            // The member never completed, so no key exists.
            assert!(member.finish().is_err());
        }
    }

    #[test]
    fn wrong_turn_is_rejected() {
        let (grp, _mgr) = setup(Scheme::Ps16, HashAlg::Blake2b, &mut thread_rng()).unwrap();
        // ps16 starts with the manager; the member's first step must
        // consume a message.
        let mut member = MemberJoin::new(b"alice", &grp);
        assert!(member.step(None, &grp).is_err());
        assert_eq!(member.state(), JoinState::NotStarted);
    }

    #[test]
    fn scheme_mismatch_is_rejected() {
        let (grp_a, _) = setup(Scheme::Ps16, HashAlg::Blake2b, &mut thread_rng()).unwrap();
        let (grp_b, _) = setup(Scheme::Vlr, HashAlg::Blake2b, &mut thread_rng()).unwrap();
        let mut member = MemberJoin::new(b"alice", &grp_b);
        assert!(matches!(
            member.step(None, &grp_a).unwrap_err(),
            GroupsigError::SchemeMismatch { .. }
        ));
    }
}
