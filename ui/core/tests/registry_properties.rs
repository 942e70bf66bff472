//! Property tests for the window registry
//!
//! Random register / unregister / raise sequences over a small id pool and
//! a low ceiling, so that both the empty-registry reset and the ceiling
//! clamp are exercised often.

use proptest::prelude::*;

use ui_core::{WindowId, WindowRegistry, ZOrderPolicy};

const POOL: u64 = 6;

#[derive(Clone, Debug)]
enum Op {
    Register(u64),
    Unregister(u64),
    Raise(u64),
    Admit(u64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..POOL).prop_map(Op::Register),
        (0..POOL).prop_map(Op::Unregister),
        (0..POOL).prop_map(Op::Raise),
        (0..POOL).prop_map(Op::Admit),
    ]
}

fn policy() -> impl Strategy<Value = ZOrderPolicy> {
    (1u32..20, 0u32..20).prop_map(|(floor, span)| ZOrderPolicy {
        floor,
        ceiling: floor + span,
    })
}

proptest! {
    #[test]
    fn z_index_stays_within_bounds(policy in policy(), ops in prop::collection::vec(op(), 1..80)) {
        let registry = WindowRegistry::with_policy(policy);
        let mut top = None;

        for op in ops {
            match op {
                Op::Register(id) => {
                    registry.register(WindowId::from_raw(id));
                }
                Op::Unregister(id) => {
                    registry.unregister(WindowId::from_raw(id));
                    if registry.is_empty() {
                        top = None;
                    }
                }
                Op::Raise(id) => {
                    if let Some(z) = registry.bring_to_front(WindowId::from_raw(id)) {
                        if let Some(previous) = top {
                            prop_assert!(z >= previous, "raise went down: {} < {}", z, previous);
                        }
                        prop_assert_eq!(registry.front(), Some(WindowId::from_raw(id)));
                        top = Some(z);
                    }
                }
                Op::Admit(id) => {
                    let was_empty = registry.is_empty();
                    let z = registry.admit(WindowId::from_raw(id));
                    if was_empty {
                        prop_assert_eq!(z, policy.floor);
                    } else if let Some(previous) = top {
                        prop_assert!(z >= previous);
                    }
                    prop_assert_eq!(registry.front(), Some(WindowId::from_raw(id)));
                    top = Some(z);
                }
            }

            prop_assert!(registry.current_z() <= policy.ceiling);
            for entry in registry.windows() {
                if let Some(z) = entry.z_index {
                    prop_assert!(z >= policy.floor && z <= policy.ceiling);
                }
            }
        }
    }

    #[test]
    fn empty_registry_restarts_at_floor(policy in policy(), opened in 1u64..POOL) {
        let registry = WindowRegistry::with_policy(policy);
        for id in 0..opened {
            registry.admit(WindowId::from_raw(id));
        }
        for id in 0..opened {
            registry.unregister(WindowId::from_raw(id));
        }

        prop_assert!(registry.is_empty());
        prop_assert_eq!(registry.admit(WindowId::from_raw(POOL)), policy.floor);
    }

    #[test]
    fn any_policy_yields_bounded_z(floor in 0u32..40, ceiling in 0u32..40, opened in 1u64..POOL) {
        let registry = WindowRegistry::with_policy(ZOrderPolicy { floor, ceiling });
        let effective = registry.policy();
        prop_assert!(effective.floor >= 1 && effective.floor <= effective.ceiling);
        prop_assert!(registry.current_z() < effective.floor);

        for id in 0..opened {
            let z = registry.admit(WindowId::from_raw(id));
            if id == 0 {
                prop_assert_eq!(z, effective.floor);
            }
            prop_assert!(z >= effective.floor && z <= effective.ceiling);
        }
    }

    #[test]
    fn allocated_ids_never_repeat(count in 1usize..200) {
        let registry = WindowRegistry::new();
        let ids: Vec<WindowId> = (0..count).map(|_| registry.allocate_id()).collect();
        prop_assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
