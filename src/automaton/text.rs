//! Line-oriented automaton format, as printed by GR(1) synthesis tools.
//!
//! ```text
//! State 0 with rank 0 -> <x:0, y:1>
//!     With successors : 1, 2
//! State 1 with rank 1 -> <x:1, y:0>
//!     With successors : 0
//! ```
//!
//! A line containing `State <id>` starts a record; every `name:value` pair on
//! that line (values may be signed) becomes the valuation of the state. A later
//! line containing `successors` lists the successor ids of the most recent
//! record. Repeated successor ids are kept once.
//!
//! When a list of expected variable names is given, unknown names and
//! unassigned expected names are reported as [`LoadWarning`]s.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use log::{info, warn};
use regex::Regex;

use crate::automaton::Automaton;
use crate::error::{LoadWarning, TextError};
use crate::types::StateId;

fn state_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"State (\d+)").expect("valid regex"))
}

fn assignment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\w+):([-+]?\d+)").expect("valid regex"))
}

fn successor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r" (\d+)").expect("valid regex"))
}

fn parse_number<T: std::str::FromStr>(text: &str, line: usize) -> Result<T, TextError> {
    text.parse().map_err(|_| TextError::InvalidNumber {
        line,
        text: text.to_string(),
    })
}

impl Automaton {
    /// Parses an automaton from the line-oriented format.
    ///
    /// `expected_vars` may be empty, in which case no variable checks are made.
    pub fn from_aut_str(input: &str, expected_vars: &[&str]) -> Result<(Self, Vec<LoadWarning>), TextError> {
        let mut aut = Automaton::with_variables(expected_vars);
        let mut warnings = Vec::new();
        let mut current: Option<StateId> = None;

        for (index, line) in input.lines().enumerate() {
            let line_no = index + 1;

            if let Some(caps) = state_re().captures(line) {
                let id: StateId = StateId::new(parse_number(&caps[1], line_no)?);
                let mut valuation = Vec::new();
                for caps in assignment_re().captures_iter(line) {
                    let value: i64 = parse_number(&caps[2], line_no)?;
                    valuation.push((caps[1].to_string(), value));
                }

                if !expected_vars.is_empty() {
                    for (name, _) in &valuation {
                        if !expected_vars.contains(&name.as_str()) {
                            warnings.push(LoadWarning::UnknownVariable {
                                state: id,
                                name: name.clone(),
                            });
                        }
                    }
                    for &name in expected_vars {
                        if !valuation.iter().any(|(n, _)| n == name) {
                            warnings.push(LoadWarning::UnassignedVariable {
                                state: id,
                                name: name.to_string(),
                            });
                        }
                    }
                }

                aut.set_state_valuation(id, valuation);
                current = Some(id);
            }

            if line.contains("successors") {
                let id = current.ok_or(TextError::OrphanSuccessors { line: line_no })?;
                let successors = successor_re()
                    .captures_iter(line)
                    .map(|caps| parse_number(&caps[1], line_no).map(StateId::new))
                    .collect::<Result<Vec<_>, _>>()?;
                aut.set_transitions(id, successors);
            }
        }

        for w in &warnings {
            warn!("{}", w);
        }
        info!("loaded automaton with {} states ({} warnings)", aut.len(), warnings.len());
        Ok((aut, warnings))
    }

    /// Reads an automaton from a file in the line-oriented format.
    ///
    /// See [`from_aut_str`](Self::from_aut_str).
    pub fn read_aut_file<P: AsRef<Path>>(path: P, expected_vars: &[&str]) -> Result<(Self, Vec<LoadWarning>), TextError> {
        let content = fs::read_to_string(path)?;
        Self::from_aut_str(&content, expected_vars)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    const JTLV: &str = "\
Smv file: spec.smv
State 0 with rank 0 -> <park:0, cellID:1, gear:-1>
\tWith successors : 1, 2, 1
State 1 with rank 1 -> <park:1, cellID:0, gear:0>
\tWith successors : 0
State 2 with rank 0 -> <park:0, cellID:0, gear:1>
\tWith no successors
";

    fn sid(i: usize) -> StateId {
        StateId::new(i)
    }

    #[test]
    fn test_parse_simple() {
        let input = "State 0: x:0 y:1\n successors 1\nState 1: x:1 y:0\n successors 0\n";
        let (aut, warnings) = Automaton::from_aut_str(input, &[]).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(aut.len(), 2);
        assert!(aut.is_canonical());

        let s0 = aut.state(sid(0)).unwrap();
        assert_eq!(aut.format_valuation(s0.valuation()), "x:0 y:1");
        assert_eq!(aut.find_next_state(Some(s0), &[("x", 1)]).unwrap().id(), sid(1));
    }

    #[test]
    fn test_parse_jtlv_output() {
        let (aut, warnings) = Automaton::from_aut_str(JTLV, &[]).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(aut.len(), 3);

        let s0 = aut.state(sid(0)).unwrap();
        assert_eq!(s0.successors().collect::<Vec<_>>(), vec![sid(1), sid(2)]);
        assert_eq!(aut.find(&[("park", 0), ("cellID", 1), ("gear", -1)]).unwrap().id(), sid(0));
        assert!(aut.state(sid(2)).unwrap().transitions().is_empty());
    }

    #[test]
    fn test_expected_variable_warnings() {
        let (aut, warnings) = Automaton::from_aut_str(JTLV, &["park", "cellID", "ccellID"]).unwrap();
        assert_eq!(aut.len(), 3);
        assert_eq!(warnings.len(), 6);
        assert_eq!(
            warnings[0],
            LoadWarning::UnknownVariable {
                state: sid(0),
                name: "gear".to_string()
            }
        );
        assert_eq!(
            warnings[1],
            LoadWarning::UnassignedVariable {
                state: sid(0),
                name: "ccellID".to_string()
            }
        );
        // The partial valuation is still accepted.
        let s1 = aut.state(sid(1)).unwrap();
        assert!(!s1.valuation().is_complete());
        assert_eq!(aut.format_valuation(s1.valuation()), "park:1 cellID:0 gear:0");
    }

    #[test]
    fn test_orphan_successors() {
        let err = Automaton::from_aut_str("With successors : 1\n", &[]).unwrap_err();
        assert!(matches!(err, TextError::OrphanSuccessors { line: 1 }));
    }

    #[test]
    fn test_out_of_range_number() {
        let err = Automaton::from_aut_str("State 0 -> <x:99999999999999999999>\n", &[]).unwrap_err();
        assert!(matches!(err, TextError::InvalidNumber { line: 1, .. }));
    }

    #[test]
    fn test_sparse_ids() {
        let input = "State 3 -> <x:1>\n successors 0\nState 0 -> <x:0>\n successors 3\n";
        let (aut, _) = Automaton::from_aut_str(input, &[]).unwrap();
        assert_eq!(aut.len(), 2);
        assert!(!aut.is_canonical());
        assert_eq!(aut.ids().collect::<Vec<_>>(), vec![sid(0), sid(3)]);
    }

    #[test]
    fn test_huge_sparse_ids() {
        let big = usize::MAX / 4 + 1;
        let input = format!(
            "State {} -> <x:0>\n\tWith successors : 0, {}\nState {} -> <x:1>\nState 1000000000 -> <x:2>\n\tWith successors : {}\n",
            usize::MAX,
            big,
            big,
            usize::MAX
        );
        let (aut, _) = Automaton::from_aut_str(&input, &[]).unwrap();
        assert_eq!(aut.len(), 3);
        assert!(!aut.is_canonical());
        assert_eq!(aut.ids().collect::<Vec<_>>(), vec![sid(1_000_000_000), sid(big), sid(usize::MAX)]);

        let start = aut.find(&[("x", 2)]).unwrap();
        let next = aut.find_next_state(Some(start), &[("x", 0)]).unwrap();
        assert_eq!(next.id(), sid(usize::MAX));
        assert_eq!(aut.find_next_state(Some(next), &[]).unwrap().id(), sid(big));
    }

    #[test]
    fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strategy.aut");
        std::fs::write(&path, JTLV).unwrap();
        let (aut, _) = Automaton::read_aut_file(&path, &[]).unwrap();
        assert_eq!(aut.len(), 3);

        let err = Automaton::read_aut_file(dir.path().join("missing.aut"), &[]).unwrap_err();
        assert!(matches!(err, TextError::Io(_)));
    }
}
