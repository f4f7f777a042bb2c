//! Structured automaton storage in the `tulipcon` XML format.
//!
//! ```xml
//! <tulipcon xmlns="http://tulip-control.sourceforge.net/ns/0" version="0">
//!   <aut>
//!     <node>
//!       <id>0</id><name></name>
//!       <child_list>1 2</child_list>
//!       <state>
//!         <item key="x" value="0" />
//!       </state>
//!     </node>
//!   </aut>
//! </tulipcon>
//! ```
//!
//! Loading is all-or-nothing: the node list is validated completely before
//! any automaton is built, and [`Automaton::load_xml`] replaces `self` only on
//! success. A repeated node id is skipped with a [`LoadWarning`]; after that
//! the ids must be exactly `0..N`.

use std::fs;
use std::io;
use std::path::Path;

use indexmap::IndexSet;
use log::{debug, info, warn};
use roxmltree::{Document, Node};

use crate::automaton::Automaton;
use crate::error::{LoadWarning, XmlError};
use crate::types::StateId;

/// Namespace of the root element.
pub const NAMESPACE: &str = "http://tulip-control.sourceforge.net/ns/0";

/// The only document version understood by the loader.
pub const VERSION: &str = "0";

/// One `<node>` record, before it is committed to an automaton.
struct NodeRecord {
    id: StateId,
    children: Vec<StateId>,
    items: Vec<(String, i64)>,
}

/// Characters allowed in an XML 1.0 document.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
}

/// Escapes an attribute value.
///
/// Whitespace other than plain spaces is written as character references so
/// it survives attribute-value normalization. Characters XML cannot carry at
/// all are replaced by U+FFFD.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            c if is_xml_char(c) => out.push(c),
            c => {
                warn!("character {:?} in {:?} cannot be stored in XML, replaced", c, text);
                out.push(char::REPLACEMENT_CHARACTER);
            }
        }
    }
    out
}

fn child<'a, 'input>(
    node: Node<'a, 'input>,
    parent: &'static str,
    tag: &'static str,
) -> Result<Node<'a, 'input>, XmlError> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == tag)
        .ok_or(XmlError::MissingTag { parent, tag })
}

fn parse_int<T: std::str::FromStr>(tag: &'static str, text: &str) -> Result<T, XmlError> {
    text.trim().parse().map_err(|_| XmlError::InvalidInteger {
        tag,
        text: text.to_string(),
    })
}

fn parse_node(node: Node) -> Result<NodeRecord, XmlError> {
    let id = child(node, "node", "id")?;
    let id = StateId::new(parse_int("id", id.text().unwrap_or(""))?);

    let child_list = child(node, "node", "child_list")?;
    let children = child_list
        .text()
        .unwrap_or("")
        .split_whitespace()
        .map(|s| parse_int("child_list", s).map(StateId::new))
        .collect::<Result<Vec<_>, _>>()?;

    let state = child(node, "node", "state")?;
    let mut items = Vec::new();
    for item in state.children().filter(|n| n.is_element() && n.tag_name().name() == "item") {
        let key = item.attribute("key").ok_or(XmlError::MissingAttribute("key"))?;
        let value = item.attribute("value").ok_or(XmlError::MissingAttribute("value"))?;
        items.push((key.to_string(), parse_int("item", value)?));
    }

    Ok(NodeRecord { id, children, items })
}

impl Automaton {
    /// Serializes the automaton, wrapped in a versioned `tulipcon` root element.
    ///
    /// With `pretty`, nodes are indented and put on separate lines. States are
    /// written in id order; unassigned variables are omitted.
    ///
    /// The format requires ids `0..N`. An automaton with sparse ids is written
    /// as its [`canonicalize`](Self::canonicalize)d copy, so the document can
    /// always be loaded back, but ids may differ from those in memory.
    pub fn dump_xml(&self, pretty: bool) -> String {
        if !self.is_canonical() {
            let mut canonical = self.clone();
            canonical.canonicalize();
            debug!("renumbered {} states to canonical ids for XML", canonical.len());
            return canonical.dump_xml(pretty);
        }
        let (nl, idt) = if pretty { ("\n", "  ") } else { ("", "") };
        let mut out = String::new();
        out.push_str(&format!("<tulipcon xmlns=\"{}\" version=\"{}\">{}", NAMESPACE, VERSION, nl));
        out.push_str(&format!("{}<aut>{}", idt, nl));
        for state in self.states() {
            out.push_str(&format!("{}<node>{}", idt.repeat(2), nl));
            out.push_str(&format!("{}<id>{}</id><name></name>{}", idt.repeat(3), state.id(), nl));
            let children: Vec<String> = state.successors().map(|s| s.to_string()).collect();
            out.push_str(&format!("{}<child_list>{}</child_list>{}", idt.repeat(3), children.join(" "), nl));
            out.push_str(&format!("{}<state>{}", idt.repeat(3), nl));
            for (var, value) in state.valuation().assigned() {
                out.push_str(&format!(
                    "{}<item key=\"{}\" value=\"{}\" />{}",
                    idt.repeat(4),
                    escape(self.variables().name(var)),
                    value,
                    nl
                ));
            }
            out.push_str(&format!("{}</state>{}", idt.repeat(3), nl));
            out.push_str(&format!("{}</node>{}", idt.repeat(2), nl));
        }
        out.push_str(&format!("{}</aut>{}", idt, nl));
        out.push_str("</tulipcon>\n");
        out
    }

    /// Parses an automaton from a `tulipcon` document.
    ///
    /// The result is canonical: the state with id `k` is the `k`-th state.
    pub fn from_xml_str(input: &str) -> Result<(Self, Vec<LoadWarning>), XmlError> {
        let doc = Document::parse(input)?;
        let root = doc.root_element();
        if root.tag_name().name() != "tulipcon" {
            return Err(XmlError::TagMismatch {
                expected: "tulipcon",
                found: root.tag_name().name().to_string(),
            });
        }
        match root.attribute("version") {
            None => return Err(XmlError::MissingVersion),
            Some(v) if v.trim() != VERSION => return Err(XmlError::UnsupportedVersion(v.to_string())),
            Some(_) => {}
        }
        let aut_node = child(root, "tulipcon", "aut")?;

        let mut warnings = Vec::new();
        let mut seen = IndexSet::new();
        let mut records = Vec::new();
        for node in aut_node.children().filter(|n| n.is_element() && n.tag_name().name() == "node") {
            let record = parse_node(node)?;
            if !seen.insert(record.id) {
                let w = LoadWarning::DuplicateState { state: record.id };
                warn!("{}", w);
                warnings.push(w);
                continue;
            }
            records.push(record);
        }

        let expected = records.len();
        let missing: Vec<StateId> = (0..expected)
            .map(StateId::new)
            .filter(|id| !seen.contains(id))
            .collect();
        if !missing.is_empty() {
            return Err(XmlError::MissingStates { expected, missing });
        }

        let mut aut = Automaton::new();
        for record in records {
            aut.add_state(record.id, record.items, record.children);
        }
        debug_assert!(aut.is_canonical());
        info!("loaded automaton with {} states from XML", aut.len());
        Ok((aut, warnings))
    }

    /// Replaces this automaton with one parsed from `input`.
    ///
    /// On failure `self` is left untouched.
    pub fn load_xml(&mut self, input: &str) -> Result<Vec<LoadWarning>, XmlError> {
        let (aut, warnings) = Self::from_xml_str(input)?;
        *self = aut;
        Ok(warnings)
    }

    pub fn read_xml_file<P: AsRef<Path>>(path: P) -> Result<(Self, Vec<LoadWarning>), XmlError> {
        let content = fs::read_to_string(path)?;
        Self::from_xml_str(&content)
    }

    pub fn write_xml_file<P: AsRef<Path>>(&self, path: P, pretty: bool) -> io::Result<()> {
        fs::write(path, self.dump_xml(pretty))
    }
}
