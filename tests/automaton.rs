use proptest::prelude::*;
use test_log::test;

use hysyn::automaton::dot::DotConfig;
use hysyn::automaton::Automaton;
use hysyn::error::{LoadWarning, XmlError};
use hysyn::types::StateId;

const STRATEGY: &str = "\
State 0 with rank 0 -> <env:0, sys:0>
\tWith successors : 1, 2
State 1 with rank 0 -> <env:1, sys:1>
\tWith successors : 3
State 2 with rank 1 -> <env:0, sys:0>
\tWith successors : 1, 2
State 3 with rank 0 -> <env:1, sys:1>
\tWith successors : 0
";

fn sid(i: usize) -> StateId {
    StateId::new(i)
}

fn replay(aut: &Automaton, observations: &[i64]) -> Vec<usize> {
    let mut visited = Vec::new();
    let mut current = None;
    for &env in observations {
        match aut.find_next_state(current, &[("env", env)]) {
            Some(next) => {
                visited.push(next.id().index());
                current = Some(next);
            }
            None => break,
        }
    }
    visited
}

#[test]
fn test_two_state_scenario() {
    let input = "State 0: x:0 y:1\n\tWith successors : 1\nState 1: x:1 y:0\n\tWith successors : 0\n";
    let (aut, warnings) = Automaton::from_aut_str(input, &["x", "y"]).unwrap();
    assert!(warnings.is_empty());
    assert_eq!(aut.len(), 2);
    let s0 = aut.state(sid(0)).unwrap();
    assert_eq!(aut.find_next_state(Some(s0), &[("x", 1)]).unwrap().id(), sid(1));
}

#[test]
fn test_text_to_xml_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let aut_path = dir.path().join("strategy.aut");
    let xml_path = dir.path().join("strategy.xml");
    std::fs::write(&aut_path, STRATEGY).unwrap();

    let (aut, warnings) = Automaton::read_aut_file(&aut_path, &["env", "sys"]).unwrap();
    assert!(warnings.is_empty());
    aut.write_xml_file(&xml_path, true).unwrap();

    let (loaded, warnings) = Automaton::read_xml_file(&xml_path).unwrap();
    assert!(warnings.is_empty());
    assert_eq!(loaded.len(), aut.len());
    for state in aut.states() {
        let other = loaded.state(state.id()).unwrap();
        assert_eq!(other.transitions(), state.transitions());
        assert_eq!(
            loaded.format_valuation(other.valuation()),
            aut.format_valuation(state.valuation())
        );
    }
    assert_eq!(replay(&loaded, &[0, 1, 1, 0]), replay(&aut, &[0, 1, 1, 0]));
}

#[test]
fn test_sparse_text_to_xml_file_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let xml_path = dir.path().join("sparse.xml");
    let input = "State 10 -> <env:0>\n\tWith successors : 4000000000\nState 4000000000 -> <env:1>\n\tWith successors : 10\n";
    let (aut, _) = Automaton::from_aut_str(input, &[]).unwrap();
    assert!(!aut.is_canonical());
    aut.write_xml_file(&xml_path, false).unwrap();

    let (loaded, warnings) = Automaton::read_xml_file(&xml_path).unwrap();
    assert!(warnings.is_empty());
    assert!(loaded.is_canonical());
    assert_eq!(replay(&loaded, &[0, 1, 0]), vec![0, 1, 0]);
}

#[test]
fn test_replay() {
    let (aut, _) = Automaton::from_aut_str(STRATEGY, &[]).unwrap();
    assert_eq!(replay(&aut, &[0, 1, 1, 0, 0]), vec![0, 1, 3, 0, 2]);
    // From state 1 the environment must report env = 1.
    assert_eq!(replay(&aut, &[0, 1, 0]), vec![0, 1]);
}

#[test]
fn test_reductions_on_loaded_strategy() {
    let (aut, _) = Automaton::from_aut_str(STRATEGY, &[]).unwrap();

    // 0 and 2 are bisimilar (same valuation, successors {1, 2} vs {1, 2});
    // 1 and 3 share a valuation but 1 -> 3 while 3 -> 0.
    let mut minimized = aut.clone();
    assert_eq!(minimized.minimize(), 1);
    assert_eq!(minimized.len(), 3);

    let mut collapsed = aut.clone();
    assert_eq!(collapsed.collapse_lossy(), 2);
    assert_eq!(collapsed.len(), 2);
    assert!(collapsed.find(&[("env", 0), ("sys", 0)]).is_some());
    assert!(collapsed.find(&[("env", 1), ("sys", 1)]).is_some());
}

#[test]
fn test_load_xml_keeps_previous_on_failure() {
    let (mut aut, _) = Automaton::from_aut_str(STRATEGY, &[]).unwrap();
    let before = aut.dump_xml(false);

    let err = aut.load_xml("<tulipcon version=\"2\"><aut/></tulipcon>").unwrap_err();
    assert!(matches!(err, XmlError::UnsupportedVersion(_)));
    assert_eq!(aut.dump_xml(false), before);

    let dup = before.replacen("<node><id>1</id>", "<node><id>0</id><name></name><child_list></child_list><state></state></node><node><id>1</id>", 1);
    let warnings = aut.load_xml(&dup).unwrap();
    assert_eq!(warnings, vec![LoadWarning::DuplicateState { state: sid(0) }]);
    assert_eq!(aut.dump_xml(false), before);
}

#[test]
fn test_dot_export() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("strategy.dot");
    let (aut, _) = Automaton::from_aut_str(STRATEGY, &[]).unwrap();
    aut.write_dot_file(&path, &DotConfig::default()).unwrap();
    let dot = std::fs::read_to_string(&path).unwrap();
    assert!(dot.starts_with("digraph A {"));
    assert_eq!(dot.matches(" -> ").count(), 6);
    assert!(dot.contains("\"0\\n; {}\" -> \"1;\\nenv: 1, sys: 1\";"));
}

fn arb_automaton() -> impl Strategy<Value = Automaton> {
    (1usize..6).prop_flat_map(|n| {
        prop::collection::vec(
            (
                prop::collection::vec((0usize..3, -5i64..5), 0..3),
                prop::collection::vec(0..n, 0..4),
            ),
            n,
        )
        .prop_map(|nodes| {
            let names = ["a", "b", "c"];
            let mut aut = Automaton::new();
            for (i, (values, succ)) in nodes.into_iter().enumerate() {
                let values: Vec<(&str, i64)> = values.into_iter().map(|(k, v)| (names[k], v)).collect();
                aut.add_state(sid(i), values, succ.into_iter().map(StateId::new));
            }
            aut
        })
    })
}

proptest! {
    #[test]
    fn prop_xml_dump_is_idempotent(aut in arb_automaton()) {
        let first = aut.dump_xml(true);
        let (loaded, warnings) = Automaton::from_xml_str(&first).unwrap();
        prop_assert!(warnings.is_empty());
        let (reloaded, _) = Automaton::from_xml_str(&loaded.dump_xml(true)).unwrap();
        prop_assert_eq!(reloaded.len(), aut.len());
        for state in aut.states() {
            let other = reloaded.state(state.id()).unwrap();
            prop_assert_eq!(other.transitions(), state.transitions());
            prop_assert_eq!(
                reloaded.format_valuation(other.valuation()),
                aut.format_valuation(state.valuation())
            );
        }
    }

    #[test]
    fn prop_empty_env_picks_first_successor(aut in arb_automaton()) {
        for state in aut.states() {
            let next = aut.find_next_state(Some(state), &[]).map(|s| s.id());
            prop_assert_eq!(next, state.successors().next());
        }
    }
}
