//! Decoders of the [SPARQL Query Results CSV and TSV Formats](https://www.w3.org/TR/sparql11-results-csv-tsv/).
//!
//! CSV only keeps term values: IRIs and blank nodes are recognized, every other value is a simple literal.
//! TSV keeps the N-Triples syntax of the terms and plain numbers are read back as numeric literals.

use crate::error::DecodeError;
use crate::solution::{QueryResults, SolutionSet};
use regex::{Regex, RegexSet};
use sparterm::vocab::xsd;
use sparterm::{BlankNodeMap, Literal, NamedNode, NamedNodeRef, Term, Variable};
use std::str::FromStr;
use tracing::debug;

/// Decodes a SPARQL CSV results document.
///
/// The header row gives the variables. In rows, empty cells are unbound values,
/// `_:label` cells are blank nodes resolved through `blank_nodes`
/// and whitespace-free `scheme:...` cells that are valid IRIs are named nodes.
///
/// ```
/// use sparresults::{QueryResults, read_csv_results};
/// use sparterm::{BlankNodeMap, Term};
///
/// let QueryResults::Solutions(solutions) = read_csv_results(
///     b"x,count\r\nhttp://example.com/a,12\r\n,\"a, b\"\r\n",
///     &mut BlankNodeMap::new(),
/// )?
/// else {
///     unreachable!()
/// };
/// assert!(solutions.solutions()[0]["x"].is_named_node());
/// assert_eq!(solutions.solutions()[0]["count"], Term::from("12"));
/// assert_eq!(solutions.solutions()[1].get("x"), None);
/// assert_eq!(solutions.solutions()[1]["count"], Term::from("a, b"));
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub fn read_csv_results(
    body: &[u8],
    blank_nodes: &mut BlankNodeMap,
) -> Result<QueryResults, DecodeError> {
    let iri = Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:\S*$")
        .map_err(|e| DecodeError::msg(e.to_string()))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body);
    let variables = reader
        .headers()?
        .iter()
        .map(|name| {
            Variable::new(name)
                .map_err(|e| DecodeError::located_message(format!("Invalid variable name '{name}': {e}"), 0))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line().saturating_sub(1));
        if record.len() > variables.len() {
            return Err(DecodeError::located_message(
                format!(
                    "This line contains {} values but there are only {} variables",
                    record.len(),
                    variables.len()
                ),
                line,
            ));
        }
        let row = record
            .iter()
            .map(|value| read_csv_value(value, &iri, blank_nodes))
            .collect::<Vec<_>>();
        rows.push(row);
    }
    Ok(SolutionSet::new(variables, rows).into())
}

fn read_csv_value(value: &str, iri: &Regex, blank_nodes: &mut BlankNodeMap) -> Option<Term> {
    if value.is_empty() {
        return None;
    }
    if let Some(label) = value.strip_prefix("_:") {
        if let Ok(node) = blank_nodes.get_or_insert(label) {
            return Some(node.into());
        }
    }
    if iri.is_match(value) {
        if let Ok(node) = NamedNode::new(value) {
            return Some(node.into());
        }
    }
    Some(Literal::new_simple_literal(value).into())
}

/// Patterns of the TSV plain numbers.
struct NumericPatterns {
    double: RegexSet,
    decimal: Regex,
    integer: Regex,
}

impl NumericPatterns {
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            double: RegexSet::new([
                r"^[0-9]+\.[0-9]*[eE][+-]?[0-9]+$",
                r"^\.[0-9]+[eE][+-]?[0-9]+$",
                r"^[0-9]+[eE][+-]?[0-9]+$",
            ])?,
            decimal: Regex::new(r"^[0-9]*\.[0-9]+$")?,
            integer: Regex::new(r"^[0-9]+$")?,
        })
    }

    fn datatype(&self, value: &str) -> Option<NamedNodeRef<'static>> {
        if self.double.is_match(value) {
            Some(xsd::DOUBLE)
        } else if self.decimal.is_match(value) {
            Some(xsd::DECIMAL)
        } else if self.integer.is_match(value) {
            Some(xsd::INTEGER)
        } else {
            None
        }
    }
}

/// Decodes a SPARQL TSV results document.
///
/// The header row gives the variables, with their `?` prefix.
/// Missing trailing cells and empty cells are unbound values.
/// Other cells are, in order: N-Triples terms (blank nodes being resolved through `blank_nodes`),
/// `xsd:double`, `xsd:decimal` and `xsd:integer` plain numbers and finally simple literals.
///
/// ```
/// use sparresults::{QueryResults, read_tsv_results};
/// use sparterm::{BlankNodeMap, Literal, Term};
///
/// let QueryResults::Solutions(solutions) = read_tsv_results(
///     b"?x\t?count\n<http://example.com/a>\t12\n\"chat\"@fr\n",
///     &mut BlankNodeMap::new(),
/// )?
/// else {
///     unreachable!()
/// };
/// assert_eq!(solutions.solutions()[0]["count"], Term::from(Literal::from(12)));
/// assert_eq!(
///     solutions.solutions()[1]["x"],
///     Term::from(Literal::new_language_tagged_literal("chat", "fr")?)
/// );
/// assert_eq!(solutions.solutions()[1].get("count"), None);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub fn read_tsv_results(
    body: &[u8],
    blank_nodes: &mut BlankNodeMap,
) -> Result<QueryResults, DecodeError> {
    let body = std::str::from_utf8(body)
        .map_err(|e| DecodeError::msg(format!("TSV results must be UTF-8: {e}")))?;
    let numbers = NumericPatterns::new().map_err(|e| DecodeError::msg(e.to_string()))?;
    let mut lines = body.split('\n');
    if body.ends_with('\n') {
        lines.next_back();
    }
    let mut lines = lines.map(|line| line.strip_suffix('\r').unwrap_or(line));
    let Some(header) = lines.next() else {
        return Ok(SolutionSet::new(Vec::new(), Vec::new()).into());
    };
    let mut variables = Vec::new();
    if !header.is_empty() {
        for name in header.split('\t') {
            let name = name.strip_prefix(['?', '$']).unwrap_or(name);
            let variable = Variable::new(name).map_err(|e| {
                DecodeError::located_message(format!("Invalid variable name '{name}': {e}"), 0)
            })?;
            if variables.contains(&variable) {
                return Err(DecodeError::located_message(
                    format!("The variable {variable} is declared twice"),
                    0,
                ));
            }
            variables.push(variable);
        }
    }
    let mut rows = Vec::new();
    for (line_number, line) in (1..).zip(lines) {
        let cells = line.split('\t').collect::<Vec<_>>();
        if cells.len() > variables.len() && !(variables.is_empty() && line.is_empty()) {
            return Err(DecodeError::located_message(
                format!(
                    "This line contains {} values but there are only {} variables",
                    cells.len(),
                    variables.len()
                ),
                line_number,
            ));
        }
        let mut row = Vec::with_capacity(variables.len());
        for cell in cells {
            row.push(read_tsv_value(cell, &numbers, blank_nodes, line_number));
        }
        rows.push(row);
    }
    Ok(SolutionSet::new(variables, rows).into())
}

fn read_tsv_value(
    value: &str,
    numbers: &NumericPatterns,
    blank_nodes: &mut BlankNodeMap,
    line: u64,
) -> Option<Term> {
    if value.is_empty() {
        return None;
    }
    if value.starts_with(['<', '"']) || value.starts_with("_:") {
        match Term::from_str(value) {
            Ok(term) => return Some(blank_nodes.intern_term(term)),
            Err(e) => debug!("TSV cell '{value}' on line {line} is not a term ({e}), reading it as a literal"),
        }
    }
    Some(match numbers.datatype(value) {
        Some(datatype) => Literal::new_typed_literal(value, datatype).into(),
        None => Literal::new_simple_literal(value).into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solutions(results: QueryResults) -> SolutionSet {
        let QueryResults::Solutions(solutions) = results else {
            panic!("solutions expected")
        };
        solutions
    }

    #[test]
    fn csv_blank_nodes_are_shared() -> Result<(), DecodeError> {
        let mut blank_nodes = BlankNodeMap::new();
        let first = solutions(read_csv_results(b"s\n_:b0\n", &mut blank_nodes)?);
        let second = solutions(read_csv_results(b"o\n_:b0\n", &mut blank_nodes)?);
        let (Term::BlankNode(a), Term::BlankNode(b)) =
            (&first.solutions()[0]["s"], &second.solutions()[0]["o"])
        else {
            panic!("blank nodes expected")
        };
        assert!(a.is_same_node(b));
        Ok(())
    }

    #[test]
    fn csv_values() -> Result<(), DecodeError> {
        let set = solutions(read_csv_results(
            b"a,b,c\nmailto:me@example.com,not an:iri,1.5\n",
            &mut BlankNodeMap::new(),
        )?);
        let row = &set.solutions()[0];
        assert_eq!(row["a"], Term::from(NamedNode::new_unchecked("mailto:me@example.com")));
        assert_eq!(row["b"], Term::from("not an:iri"));
        assert_eq!(row["c"], Term::from("1.5"));
        assert!(read_csv_results(b"a\n1,2\n", &mut BlankNodeMap::new()).is_err());
        Ok(())
    }

    #[test]
    fn tsv_numbers() -> Result<(), DecodeError> {
        let set = solutions(read_tsv_results(
            b"?a\t?b\t?c\t?d\t?e\n1.5e3\t.5E-1\t2.25\t42\t4 2\n",
            &mut BlankNodeMap::new(),
        )?);
        let row = &set.solutions()[0];
        assert_eq!(row["a"], Term::from(Literal::new_typed_literal("1.5e3", xsd::DOUBLE)));
        assert_eq!(row["b"], Term::from(Literal::new_typed_literal(".5E-1", xsd::DOUBLE)));
        assert_eq!(row["c"], Term::from(Literal::new_typed_literal("2.25", xsd::DECIMAL)));
        assert_eq!(row["d"], Term::from(Literal::new_typed_literal("42", xsd::INTEGER)));
        assert_eq!(row["e"], Term::from("4 2"));
        Ok(())
    }

    #[test]
    fn tsv_rows() -> Result<(), DecodeError> {
        let set = solutions(read_tsv_results(
            b"?s\t?o\r\n_:x\t\r\n\r\n",
            &mut BlankNodeMap::new(),
        )?);
        assert_eq!(set.len(), 2);
        assert!(set.solutions()[0]["s"].is_blank_node());
        assert_eq!(set.solutions()[0].get("o"), None);
        assert!(set.solutions()[1].is_empty());
        assert!(read_tsv_results(b"?a\n1\t2\n", &mut BlankNodeMap::new()).is_err());
        Ok(())
    }

    #[test]
    fn tsv_malformed_terms_are_literals() -> Result<(), DecodeError> {
        let set = solutions(read_tsv_results(
            b"?a\t?b\t?c\n<not closed\t\"open\t_:\n",
            &mut BlankNodeMap::new(),
        )?);
        let row = &set.solutions()[0];
        assert_eq!(row["a"], Term::from("<not closed"));
        assert_eq!(row["b"], Term::from("\"open"));
        assert_eq!(row["c"], Term::from("_:"));
        Ok(())
    }

    #[test]
    fn tsv_numbers_are_ascii_only() -> Result<(), DecodeError> {
        let set = solutions(read_tsv_results(
            "?a\t?b\t?c\n\u{663}\u{664}\t1.\u{665}\t\u{ff11}e3\n".as_bytes(),
            &mut BlankNodeMap::new(),
        )?);
        let row = &set.solutions()[0];
        assert_eq!(row["a"], Term::from("\u{663}\u{664}"));
        assert_eq!(row["b"], Term::from("1.\u{665}"));
        assert_eq!(row["c"], Term::from("\u{ff11}e3"));
        Ok(())
    }
}
