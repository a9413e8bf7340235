//! Snapshot round-trip properties: loading a dump restores value-equal
//! state.

use aer::controller::Controller;
use aer::core::planner::Planner;
use aer::core::record::{DataTable, Payload, Theory};
use aer::core::state::CycleState;
use aer::io::snapshot::{dump_state, load_state};
use aer::registry::StepRegistry;
use aer::test_support::{ConstStep, observation, variables};
use proptest::prelude::*;

fn table_strategy() -> impl Strategy<Value = DataTable> {
    (
        prop::collection::vec("[a-z]{1,8}", 1..4),
        prop::collection::vec(prop::collection::vec(-1e6f64..1e6, 1..4), 0..4),
    )
        .prop_map(|(columns, rows)| DataTable { columns, rows })
}

fn payload_strategy() -> impl Strategy<Value = Payload> {
    prop_oneof![
        table_strategy().prop_map(Payload::Conditions),
        table_strategy().prop_map(Payload::Observations),
        ("[a-z ]{1,16}", prop::collection::vec(any::<u8>(), 0..32))
            .prop_map(|(label, blob)| Payload::Theory(Theory { label, blob })),
        Just(Payload::Metadata(variables())),
    ]
}

proptest! {
    #[test]
    fn snapshot_load_inverts_dump(payloads in prop::collection::vec(payload_strategy(), 0..8)) {
        let temp = tempfile::tempdir().expect("tempdir");
        let state = CycleState::seeded(payloads);
        dump_state(temp.path(), &state).expect("dump");
        let loaded = load_state(temp.path()).expect("load");
        prop_assert_eq!(loaded, state);
    }
}

#[test]
fn advanced_state_round_trips_with_bookkeeping() {
    let registry =
        StepRegistry::new().with_step("collect", ConstStep::new(vec![observation(1.0, 2.0)]));
    let mut controller = Controller::new(registry, Planner::fixed("collect"));
    controller.advance().expect("advance");

    let temp = tempfile::tempdir().expect("tempdir");
    controller.dump(temp.path()).expect("dump");
    let loaded = load_state(temp.path()).expect("load");
    assert_eq!(&loaded, controller.state());
    assert_eq!(loaded.steps_completed(), 1);
    assert_eq!(loaded.last_step(), Some("collect"));
}
