use crate::pattern::{NamedNodePattern, Predicate, TriplePattern};
use rustc_hash::{FxHashMap, FxHashSet};
use sparterm::vocab::rdf;
use sparterm::{Term, Variable};
use std::fmt::{self, Write};

/// How terms are written.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) enum TermMode<'a> {
    #[default]
    Plain,
    /// Blank nodes are written as the variables assigned to their label.
    BlankNodesAsVariables(&'a BlankNodeVariables),
}

/// The variables standing for the blank nodes of a set of patterns.
///
/// Each label gets a variable named after it, suffixed with `_2`, `_3`... when the name is
/// already taken by a variable of the patterns or by another label.
#[derive(Debug, Default)]
pub(crate) struct BlankNodeVariables {
    variables: FxHashMap<String, Variable>,
}

impl BlankNodeVariables {
    pub fn new<'a>(patterns: impl IntoIterator<Item = &'a TriplePattern>) -> Self {
        let mut taken = FxHashSet::default();
        let mut labels = Vec::new();
        for pattern in patterns {
            collect_names(&pattern.subject, &mut taken, &mut labels);
            collect_names(&pattern.object, &mut taken, &mut labels);
            if let Predicate::Variable(variable) = &pattern.predicate {
                taken.insert(variable.as_str().to_owned());
            }
            if let Some(NamedNodePattern::Variable(variable)) = &pattern.graph_name {
                taken.insert(variable.as_str().to_owned());
            }
        }
        let mut variables = FxHashMap::default();
        for label in labels {
            if variables.contains_key(&label) {
                continue;
            }
            let base = Variable::from_label(&label).into_string();
            let mut name = base.clone();
            let mut suffix = 2;
            while taken.contains(&name) {
                name = format!("{base}_{suffix}");
                suffix += 1;
            }
            taken.insert(name.clone());
            variables.insert(label, Variable::new_unchecked(name));
        }
        Self { variables }
    }

    fn get(&self, label: &str) -> Option<&Variable> {
        self.variables.get(label)
    }
}

fn collect_names(term: &Term, taken: &mut FxHashSet<String>, labels: &mut Vec<String>) {
    match term {
        Term::BlankNode(node) => labels.push(node.as_str().to_owned()),
        Term::Variable(variable) => {
            taken.insert(variable.as_str().to_owned());
        }
        Term::Triple(triple) => {
            collect_names(&triple.subject, taken, labels);
            collect_names(&triple.predicate, taken, labels);
            collect_names(&triple.object, taken, labels);
        }
        Term::NamedNode(_) | Term::Literal(_) => (),
    }
}

pub(crate) fn write_term(term: &Term, mode: TermMode<'_>, f: &mut impl Write) -> fmt::Result {
    match (term, mode) {
        (Term::BlankNode(node), TermMode::BlankNodesAsVariables(variables)) => {
            match variables.get(node.as_str()) {
                Some(variable) => write!(f, "{variable}"),
                None => write!(f, "{}", Variable::from_label(node.as_str())),
            }
        }
        (Term::Triple(triple), _) => {
            f.write_str("<<( ")?;
            write_term(&triple.subject, mode, f)?;
            f.write_str(" ")?;
            write_term(&triple.predicate, mode, f)?;
            f.write_str(" ")?;
            write_term(&triple.object, mode, f)?;
            f.write_str(" )>>")
        }
        (term, _) => write!(f, "{term}"),
    }
}

pub(crate) fn write_predicate(predicate: &Predicate, f: &mut impl Write) -> fmt::Result {
    match predicate {
        Predicate::NamedNode(node) if *node == rdf::TYPE => f.write_str("a"),
        Predicate::NamedNode(node) => write!(f, "{node}"),
        Predicate::Variable(var) => write!(f, "{var}"),
        Predicate::Path(path) => write!(f, "{path}"),
    }
}

/// Writes `s p o .`, inside of a `GRAPH` block if the pattern has its own graph.
pub(crate) fn write_pattern(
    pattern: &TriplePattern,
    mode: TermMode<'_>,
    f: &mut impl Write,
) -> fmt::Result {
    if let Some(graph_name) = &pattern.graph_name {
        write!(f, "GRAPH {graph_name} {{ ")?;
    }
    write_triple(pattern, mode, f)?;
    if pattern.graph_name.is_some() {
        f.write_str(" }")?;
    }
    Ok(())
}

/// Writes `s p o .` ignoring the pattern graph.
pub(crate) fn write_triple(
    pattern: &TriplePattern,
    mode: TermMode<'_>,
    f: &mut impl Write,
) -> fmt::Result {
    write_term(&pattern.subject, mode, f)?;
    f.write_str(" ")?;
    write_predicate(&pattern.predicate, f)?;
    f.write_str(" ")?;
    write_term(&pattern.object, mode, f)?;
    f.write_str(" .")
}

/// Accumulates tokens separated by a single space.
#[derive(Default)]
pub(crate) struct TokenWriter {
    buffer: String,
}

impl TokenWriter {
    pub fn token(&mut self, token: &str) {
        if !self.buffer.is_empty() {
            self.buffer.push(' ');
        }
        self.buffer.push_str(token);
    }

    /// Appends a token written by `write`.
    pub fn token_with(
        &mut self,
        write: impl FnOnce(&mut String) -> fmt::Result,
    ) -> fmt::Result {
        if !self.buffer.is_empty() {
            self.buffer.push(' ');
        }
        write(&mut self.buffer)
    }

    pub fn into_string(self) -> String {
        self.buffer
    }
}
