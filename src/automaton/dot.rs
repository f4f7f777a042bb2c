//! Automaton to DOT (Graphviz) conversion.
//!
//! Every state becomes a node labelled with its id and the variables it
//! assigns a nonzero value, e.g. `"3;\nx: 1, y: 2"`. A state with no such
//! variable is labelled `"3\n; {}"`. Each transition becomes one directed edge.
//!
//! # Examples
//!
//! ```
//! use hysyn::automaton::Automaton;
//! use hysyn::types::StateId;
//!
//! let mut aut = Automaton::new();
//! aut.add_state(StateId::new(0), [("x", 1)], [StateId::new(0)]);
//!
//! let dot = aut.to_dot().unwrap();
//! assert!(dot.contains("\"0;\\nx: 1\" -> \"0;\\nx: 1\";"));
//! // Render with: dot -Tpng aut.dot -o aut.png
//! ```

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use crate::automaton::{Automaton, AutomatonState};
use crate::types::StateId;

/// Configuration options for DOT output generation.
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Name of the digraph (default: "A")
    pub graph_name: &'static str,
    /// Shape of state nodes (default: "ellipse")
    pub node_shape: &'static str,
    /// Whether to list variables whose value is zero (default: false)
    pub show_zero_values: bool,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            graph_name: "A",
            node_shape: "ellipse",
            show_zero_values: false,
        }
    }
}

fn escape(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}

impl Automaton {
    fn dot_label(&self, state: &AutomatonState, config: &DotConfig) -> String {
        let shown: Vec<String> = state
            .valuation()
            .assigned()
            .filter(|&(_, value)| config.show_zero_values || value != 0)
            .map(|(var, value)| format!("{}: {}", escape(self.variables().name(var)), value))
            .collect();
        // The "\n" is DOT's line break escape, kept literally in the label.
        if shown.is_empty() {
            format!("{}\\n; {{}}", state.id())
        } else {
            format!("{};\\n{}", state.id(), shown.join(", "))
        }
    }

    /// Label of a successor, which may not exist.
    fn dot_target(&self, id: StateId, config: &DotConfig) -> String {
        match self.state(id) {
            Some(state) => self.dot_label(state, config),
            None => id.to_string(),
        }
    }

    /// Converts the automaton to DOT format with the default configuration.
    pub fn to_dot(&self) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(&DotConfig::default())
    }

    /// Converts the automaton to DOT format.
    pub fn to_dot_with_config(&self, config: &DotConfig) -> Result<String, std::fmt::Error> {
        let mut dot = String::new();
        writeln!(dot, "digraph {} {{", config.graph_name)?;
        writeln!(dot, "    node [shape={}];", config.node_shape)?;

        // Nodes first, so that states without transitions are shown too.
        for state in self.states() {
            writeln!(dot, "    {};", quote(&self.dot_label(state, config)))?;
        }
        for state in self.states() {
            let source = quote(&self.dot_label(state, config));
            for succ in state.successors() {
                writeln!(dot, "    {} -> {};", source, quote(&self.dot_target(succ, config)))?;
            }
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }

    /// Writes the DOT representation to `path`.
    pub fn write_dot_file<P: AsRef<Path>>(&self, path: P, config: &DotConfig) -> io::Result<()> {
        let dot = self.to_dot_with_config(config).map_err(io::Error::other)?;
        fs::write(path, dot)
    }
}

fn quote(label: &str) -> String {
    format!("\"{}\"", label)
}
