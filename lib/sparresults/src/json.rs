//! Decoder of the [SPARQL Query Results JSON Format](https://www.w3.org/TR/sparql11-results-json/).

use crate::error::DecodeError;
use crate::solution::{QueryResults, SolutionSet};
use json_event_parser::{JsonEvent, SliceJsonParser};
use sparterm::vocab::rdf;
use sparterm::{BlankNodeMap, Literal, NamedNode, Term, Triple, Variable};
use std::borrow::Cow;
use std::collections::HashMap;

const MAX_NUMBER_OF_NESTED_TRIPLES: usize = 128;

/// Decodes a SPARQL JSON results document.
///
/// Variables are the ones of `head.vars` followed by the keys of the bindings that were not declared, in the order they are first seen.
/// Blank nodes are resolved through `blank_nodes`.
///
/// ```
/// use sparresults::{QueryResults, read_json_results};
/// use sparterm::BlankNodeMap;
///
/// let results = read_json_results(br#"{"head":{},"boolean":true}"#, &mut BlankNodeMap::new())?;
/// assert_eq!(results, QueryResults::Boolean(true));
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub fn read_json_results(
    body: &[u8],
    blank_nodes: &mut BlankNodeMap,
) -> Result<QueryResults, DecodeError> {
    let mut reader = JsonReader {
        parser: SliceJsonParser::new(body),
        blank_nodes,
    };
    reader.read_document()
}

type RawSolution = Vec<(String, Term)>;

struct JsonReader<'a, 'b> {
    parser: SliceJsonParser<'a>,
    blank_nodes: &'b mut BlankNodeMap,
}

impl JsonReader<'_, '_> {
    /// Returns the next event, owning its strings.
    fn next(&mut self) -> Result<JsonEvent<'static>, DecodeError> {
        Ok(match self.parser.parse_next()? {
            JsonEvent::String(value) => JsonEvent::String(Cow::Owned(value.into_owned())),
            JsonEvent::Number(value) => JsonEvent::Number(Cow::Owned(value.into_owned())),
            JsonEvent::ObjectKey(key) => JsonEvent::ObjectKey(Cow::Owned(key.into_owned())),
            JsonEvent::Boolean(value) => JsonEvent::Boolean(value),
            JsonEvent::Null => JsonEvent::Null,
            JsonEvent::StartArray => JsonEvent::StartArray,
            JsonEvent::EndArray => JsonEvent::EndArray,
            JsonEvent::StartObject => JsonEvent::StartObject,
            JsonEvent::EndObject => JsonEvent::EndObject,
            JsonEvent::Eof => JsonEvent::Eof,
        })
    }

    fn read_document(&mut self) -> Result<QueryResults, DecodeError> {
        if self.next()? != JsonEvent::StartObject {
            return Err(DecodeError::msg("SPARQL JSON results must be an object"));
        }
        let mut variables = None;
        let mut solutions = None;
        let mut boolean = None;
        loop {
            match self.next()? {
                JsonEvent::ObjectKey(key) => match key.as_ref() {
                    "head" => variables = Some(self.read_head()?),
                    "results" => solutions = Some(self.read_results()?),
                    "boolean" => {
                        if let JsonEvent::Boolean(value) = self.next()? {
                            boolean = Some(value);
                        } else {
                            return Err(DecodeError::msg("Unexpected boolean value"));
                        }
                    }
                    _ => self.skip_value()?,
                },
                JsonEvent::EndObject => break,
                _ => return Err(DecodeError::msg("Unexpected JSON event in the root object")),
            }
        }
        if self.next()? != JsonEvent::Eof {
            return Err(DecodeError::msg(
                "Unexpected content after the SPARQL JSON results object",
            ));
        }
        if let Some(value) = boolean {
            return Ok(QueryResults::Boolean(value));
        }
        let Some(solutions) = solutions else {
            return Err(DecodeError::msg(
                "SPARQL JSON results must contain a 'boolean' or a 'results' key",
            ));
        };
        Ok(build_solution_set(variables.unwrap_or_default(), solutions)?.into())
    }

    fn read_head(&mut self) -> Result<Vec<Variable>, DecodeError> {
        if self.next()? != JsonEvent::StartObject {
            return Err(DecodeError::msg(
                "SPARQL JSON results head must be an object",
            ));
        }
        let mut variables = Vec::new();
        loop {
            match self.next()? {
                JsonEvent::ObjectKey(key) if key == "vars" => {
                    if self.next()? != JsonEvent::StartArray {
                        return Err(DecodeError::msg(
                            "SPARQL JSON results vars must be an array",
                        ));
                    }
                    loop {
                        match self.next()? {
                            JsonEvent::String(name) => {
                                let variable = Variable::new(&*name).map_err(|e| {
                                    DecodeError::msg(format!(
                                        "Invalid variable name '{name}': {e}"
                                    ))
                                })?;
                                if variables.contains(&variable) {
                                    return Err(DecodeError::msg(format!(
                                        "The variable {variable} is declared twice"
                                    )));
                                }
                                variables.push(variable);
                            }
                            JsonEvent::EndArray => break,
                            _ => {
                                return Err(DecodeError::msg(
                                    "Variables name in the vars array must be strings",
                                ));
                            }
                        }
                    }
                }
                JsonEvent::ObjectKey(_) => self.skip_value()?,
                JsonEvent::EndObject => return Ok(variables),
                _ => return Err(DecodeError::msg("Unexpected JSON event in the head object")),
            }
        }
    }

    fn read_results(&mut self) -> Result<Vec<RawSolution>, DecodeError> {
        if self.next()? != JsonEvent::StartObject {
            return Err(DecodeError::msg(
                "SPARQL JSON results result must be an object",
            ));
        }
        let mut solutions = None;
        loop {
            match self.next()? {
                JsonEvent::ObjectKey(key) if key == "bindings" => {
                    solutions = Some(self.read_bindings()?);
                }
                JsonEvent::ObjectKey(_) => self.skip_value()?,
                JsonEvent::EndObject => break,
                _ => return Err(DecodeError::msg("Unexpected JSON event in the results object")),
            }
        }
        solutions.ok_or_else(|| {
            DecodeError::msg("The results object must contains a 'bindings' key")
        })
    }

    fn read_bindings(&mut self) -> Result<Vec<RawSolution>, DecodeError> {
        if self.next()? != JsonEvent::StartArray {
            return Err(DecodeError::msg(
                "SPARQL JSON results bindings must be an array",
            ));
        }
        let mut solutions = Vec::new();
        loop {
            match self.next()? {
                JsonEvent::StartObject => {
                    let mut solution = Vec::new();
                    loop {
                        match self.next()? {
                            JsonEvent::ObjectKey(variable) => {
                                let term = self.read_term(0)?;
                                solution.push((variable.into_owned(), term));
                            }
                            JsonEvent::EndObject => break,
                            _ => {
                                return Err(DecodeError::msg(
                                    "Unexpected JSON event in a solution object",
                                ));
                            }
                        }
                    }
                    solutions.push(solution);
                }
                JsonEvent::EndArray => return Ok(solutions),
                _ => return Err(DecodeError::msg("Expecting a new solution object")),
            }
        }
    }

    fn read_term(&mut self, number_of_recursive_calls: usize) -> Result<Term, DecodeError> {
        if number_of_recursive_calls == MAX_NUMBER_OF_NESTED_TRIPLES {
            return Err(DecodeError::msg(
                "Too many nested triples. The parser fails here to avoid a stack overflow.",
            ));
        }
        if self.next()? != JsonEvent::StartObject {
            return Err(DecodeError::msg("RDF terms must be encoded using objects"));
        }
        let mut term_type = None;
        let mut value = None;
        let mut triple = None;
        let mut lang = None;
        let mut datatype = None;
        loop {
            match self.next()? {
                JsonEvent::ObjectKey(key) => match key.as_ref() {
                    "type" => {
                        let JsonEvent::String(t) = self.next()? else {
                            return Err(DecodeError::msg("Term type must be a string"));
                        };
                        term_type = Some(t.into_owned());
                    }
                    "value" => match self.next()? {
                        JsonEvent::String(v) => value = Some(v.into_owned()),
                        JsonEvent::StartObject => {
                            triple = Some(self.read_triple_value(number_of_recursive_calls)?);
                        }
                        _ => return Err(DecodeError::msg("Term value must be a string")),
                    },
                    "xml:lang" => {
                        let JsonEvent::String(l) = self.next()? else {
                            return Err(DecodeError::msg("Term lang must be a string"));
                        };
                        lang = Some(l.into_owned());
                    }
                    "datatype" => {
                        let JsonEvent::String(d) = self.next()? else {
                            return Err(DecodeError::msg("Term datatype must be a string"));
                        };
                        datatype = Some(NamedNode::new(&*d).map_err(|e| {
                            DecodeError::msg(format!("Invalid datatype '{d}': {e}"))
                        })?);
                    }
                    _ => {
                        return Err(DecodeError::msg(format!(
                            "Unsupported term key: {key}"
                        )));
                    }
                },
                JsonEvent::EndObject => break,
                _ => return Err(DecodeError::msg("Unexpected JSON event in a term object")),
            }
        }
        let Some(term_type) = term_type else {
            return Err(DecodeError::msg(
                "Term serialization should have a 'type' key",
            ));
        };
        match term_type.as_str() {
            "uri" => {
                let value = value.ok_or_else(|| {
                    DecodeError::msg("uri serialization should have a 'value' key")
                })?;
                Ok(NamedNode::new(value)
                    .map_err(|e| DecodeError::msg(format!("Invalid uri value: {e}")))?
                    .into())
            }
            "bnode" => {
                let value = value.ok_or_else(|| {
                    DecodeError::msg("bnode serialization should have a 'value' key")
                })?;
                Ok(self
                    .blank_nodes
                    .get_or_insert(&value)
                    .map_err(|e| DecodeError::msg(format!("Invalid bnode value '{value}': {e}")))?
                    .into())
            }
            "literal" | "typed-literal" => {
                let value = value.ok_or_else(|| {
                    DecodeError::msg("literal serialization should have a 'value' key")
                })?;
                Ok(build_literal(value, lang, datatype)?.into())
            }
            "triple" => triple
                .ok_or_else(|| {
                    DecodeError::msg("triple serialization should have an object 'value' key")
                })
                .map(Term::from),
            _ => Err(DecodeError::msg(format!(
                "Unexpected term type: '{term_type}'"
            ))),
        }
    }

    /// Reads the `{"subject": ..., "predicate": ..., "object": ...}` value of a triple term, its opening brace already consumed.
    fn read_triple_value(&mut self, number_of_recursive_calls: usize) -> Result<Triple, DecodeError> {
        let mut subject = None;
        let mut predicate = None;
        let mut object = None;
        loop {
            match self.next()? {
                JsonEvent::ObjectKey(key) => {
                    let term = self.read_term(number_of_recursive_calls + 1)?;
                    match key.as_ref() {
                        "subject" => subject = Some(term),
                        "predicate" => predicate = Some(term),
                        "object" => object = Some(term),
                        _ => {
                            return Err(DecodeError::msg(format!(
                                "Unsupported value key: {key}"
                            )));
                        }
                    }
                }
                JsonEvent::EndObject => break,
                _ => return Err(DecodeError::msg("Unexpected JSON event in a triple value")),
            }
        }
        let subject = subject
            .ok_or_else(|| DecodeError::msg("triple serialization should have a 'subject' key"))?;
        if subject.is_literal() {
            return Err(DecodeError::msg(
                "The 'subject' value should not be a literal",
            ));
        }
        let predicate = predicate.ok_or_else(|| {
            DecodeError::msg("triple serialization should have a 'predicate' key")
        })?;
        if !predicate.is_named_node() {
            return Err(DecodeError::msg("The 'predicate' value should be a uri"));
        }
        let object = object
            .ok_or_else(|| DecodeError::msg("triple serialization should have a 'object' key"))?;
        Ok(Triple::new(subject, predicate, object))
    }

    /// Skips the next value, whatever its nesting.
    fn skip_value(&mut self) -> Result<(), DecodeError> {
        let mut level = 0_usize;
        loop {
            match self.next()? {
                JsonEvent::StartArray | JsonEvent::StartObject => level += 1,
                JsonEvent::EndArray | JsonEvent::EndObject => level = level.saturating_sub(1),
                JsonEvent::Eof => return Err(DecodeError::msg("Unexpected end of the JSON document")),
                JsonEvent::String(_)
                | JsonEvent::Number(_)
                | JsonEvent::Boolean(_)
                | JsonEvent::Null
                | JsonEvent::ObjectKey(_) => (),
            }
            if level == 0 {
                return Ok(());
            }
        }
    }
}

fn build_solution_set(
    mut variables: Vec<Variable>,
    solutions: Vec<RawSolution>,
) -> Result<SolutionSet, DecodeError> {
    let mut mapping = variables
        .iter()
        .enumerate()
        .map(|(i, v)| (v.as_str().to_owned(), i))
        .collect::<HashMap<_, _>>();
    let mut rows = Vec::with_capacity(solutions.len());
    for solution in solutions {
        let mut row = vec![None; variables.len()];
        for (name, term) in solution {
            let position = if let Some(position) = mapping.get(&name) {
                *position
            } else {
                let variable = Variable::new(name.as_str()).map_err(|e| {
                    DecodeError::msg(format!("Invalid variable name '{name}': {e}"))
                })?;
                variables.push(variable);
                mapping.insert(name, variables.len() - 1);
                variables.len() - 1
            };
            if position >= row.len() {
                row.resize(position + 1, None);
            }
            row[position] = Some(term);
        }
        rows.push(row);
    }
    Ok(SolutionSet::new(variables, rows))
}

fn build_literal(
    value: String,
    lang: Option<String>,
    datatype: Option<NamedNode>,
) -> Result<Literal, DecodeError> {
    match lang {
        Some(lang) => {
            if let Some(datatype) = &datatype {
                if *datatype != rdf::LANG_STRING {
                    return Err(DecodeError::msg(format!(
                        "xml:lang value '{lang}' provided with the datatype {datatype}"
                    )));
                }
            }
            Literal::new_language_tagged_literal(value, &lang).map_err(|e| {
                DecodeError::msg(format!("Invalid xml:lang value '{lang}': {e}"))
            })
        }
        None => Ok(if let Some(datatype) = datatype {
            Literal::new_typed_literal(value, datatype)
        } else {
            Literal::new_simple_literal(value)
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(body: &str) -> Result<QueryResults, DecodeError> {
        read_json_results(body.as_bytes(), &mut BlankNodeMap::new())
    }

    #[test]
    fn boolean() -> Result<(), DecodeError> {
        assert_eq!(read(r#"{"boolean": true}"#)?, QueryResults::Boolean(true));
        assert_eq!(
            read(r#"{"head": {"link": ["http://example.com"]}, "boolean": false}"#)?,
            QueryResults::Boolean(false)
        );
        Ok(())
    }

    #[test]
    fn undeclared_keys_are_appended() -> Result<(), DecodeError> {
        let QueryResults::Solutions(solutions) = read(
            r#"{"head": {"vars": ["a", "unused"]}, "results": {"bindings": [
                {"b": {"type": "literal", "value": "1"}},
                {"a": {"type": "uri", "value": "http://example.com/a"}, "c": {"type": "bnode", "value": "x"}}
            ]}}"#,
        )?
        else {
            panic!("solutions expected")
        };
        let names = solutions
            .variables()
            .iter()
            .map(Variable::as_str)
            .collect::<Vec<_>>();
        assert_eq!(names, ["a", "unused", "b", "c"]);
        assert_eq!(solutions.solutions()[0].values().len(), 4);
        assert_eq!(solutions.solutions()[0].get("b"), Some(&Term::from("1")));
        assert_eq!(
            solutions.solutions()[1].get("a"),
            Some(&Term::from(NamedNode::new_unchecked("http://example.com/a")))
        );
        Ok(())
    }

    #[test]
    fn literals() -> Result<(), DecodeError> {
        let QueryResults::Solutions(solutions) = read(
            r#"{"head": {"vars": ["l", "t", "o"]}, "results": {"bindings": [{
                "l": {"type": "literal", "value": "chat", "xml:lang": "FR"},
                "t": {"type": "typed-literal", "value": "1", "datatype": "http://www.w3.org/2001/XMLSchema#integer"},
                "o": {"type": "literal", "value": "x", "datatype": "http://www.w3.org/2001/XMLSchema#string"}
            }]}}"#,
        )?
        else {
            panic!("solutions expected")
        };
        let solution = &solutions.solutions()[0];
        assert_eq!(
            solution["l"],
            Term::from(Literal::new_language_tagged_literal_unchecked("chat", "fr"))
        );
        assert_eq!(solution["t"], Term::from(Literal::from(1)));
        assert_eq!(solution["o"], Term::from("x"));
        Ok(())
    }

    #[test]
    fn triple_terms() -> Result<(), DecodeError> {
        let QueryResults::Solutions(solutions) = read(
            r#"{"head": {"vars": ["t"]}, "results": {"bindings": [{"t": {"type": "triple", "value": {
                "subject": {"type": "bnode", "value": "b"},
                "predicate": {"type": "uri", "value": "http://example.com/p"},
                "object": {"type": "literal", "value": "o"}
            }}}]}}"#,
        )?
        else {
            panic!("solutions expected")
        };
        assert!(solutions.solutions()[0]["t"].is_triple());
        Ok(())
    }

    #[test]
    fn errors() {
        assert!(read("[]").is_err());
        assert!(read(r#"{"head": {"vars": []}}"#).is_err());
        assert!(read(r#"{"head": {"vars": ["a", "a"]}, "results": {"bindings": []}}"#).is_err());
        assert!(read(r#"{"results": {"bindings": [{"a": {"type": "foo", "value": "x"}}]}}"#).is_err());
        assert!(read(r#"{"results": {"bindings": [{"a": {"value": "x"}}]}}"#).is_err());
        assert!(read(r#"{"boolean": true"#).is_err());
    }
}
