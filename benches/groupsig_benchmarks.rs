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

#[macro_use]
extern crate criterion;

mod groupsig_benches {
    use criterion::Criterion;
    use groupsig::*;

    /// Run a full join and hand back a signing-ready group.
    fn enrolled_group(scheme: Scheme) -> (GroupKey, ManagerKey, Gml, MemberKey) {
        let (grp, mgr) = setup(scheme, HashAlg::Blake2b, &mut mohan::mohan_rand()).unwrap();
        let mut gml = Gml::new(scheme);

        let desc = scheme.description();
        let mut member = MemberJoin::new(b"bench-member", &grp);
        let mut manager = ManagerJoin::new(&grp);
        let mut carried: Option<Vec<u8>> = None;
        let mut turn = desc.join_start;
        while member.state() != JoinState::Completed || manager.state() != JoinState::Completed {
            carried = match turn {
                JoinRole::Member => {
                    turn = JoinRole::Manager;
                    member.step(carried.as_deref(), &grp).unwrap()
                }
                JoinRole::Manager => {
                    turn = JoinRole::Member;
                    manager.step(carried.as_deref(), &mgr, &grp, &mut gml).unwrap()
                }
            };
        }
        let key = member.finish().unwrap();
        (grp, mgr, gml, key)
    }

    fn sign_vlr(c: &mut Criterion) {
        let (grp, _mgr, _gml, mut key) = enrolled_group(Scheme::Vlr);
        c.bench_function("vlr signing", move |b| {
            b.iter(|| sign(b"benchmark message", &mut key, &grp, None))
        });
    }

    fn verify_vlr(c: &mut Criterion) {
        let (grp, _mgr, _gml, mut key) = enrolled_group(Scheme::Vlr);
        let sig = sign(b"benchmark message", &mut key, &grp, None).unwrap();
        c.bench_function("vlr verification", move |b| {
            b.iter(|| verify(&sig, b"benchmark message", &grp, None))
        });
    }

    fn sign_ps16(c: &mut Criterion) {
        let (grp, _mgr, _gml, mut key) = enrolled_group(Scheme::Ps16);
        c.bench_function("ps16 signing", move |b| {
            b.iter(|| sign(b"benchmark message", &mut key, &grp, None))
        });
    }

    fn verify_ps16(c: &mut Criterion) {
        let (grp, _mgr, _gml, mut key) = enrolled_group(Scheme::Ps16);
        let sig = sign(b"benchmark message", &mut key, &grp, None).unwrap();
        c.bench_function("ps16 verification", move |b| {
            b.iter(|| verify(&sig, b"benchmark message", &grp, None))
        });
    }

    fn open_vlr(c: &mut Criterion) {
        let (grp, mgr, gml, mut key) = enrolled_group(Scheme::Vlr);
        let sig = sign(b"benchmark message", &mut key, &grp, None).unwrap();
        c.bench_function("vlr opening", move |b| {
            b.iter(|| open(&sig, &grp, &mgr, &gml))
        });
    }

    criterion_group! {
        name = groupsig_benches;
        config = Criterion::default();
        targets =
            sign_vlr,
            verify_vlr,
            sign_ps16,
            verify_ps16,
            open_vlr,
    }
}

criterion_main!(groupsig_benches::groupsig_benches);
