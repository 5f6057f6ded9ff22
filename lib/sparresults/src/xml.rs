//! Decoders of the [SPARQL Query Results XML Format](https://www.w3.org/TR/rdf-sparql-XMLres/).
//!
//! Two engines are available, see [`XmlEngine`]. They give the same results.

use crate::error::DecodeError;
use crate::solution::{QueryResults, SolutionSet};
use quick_xml::Reader;
use quick_xml::events::{BytesCData, BytesStart, Event};
use sparterm::vocab::rdf;
use sparterm::{BlankNode, BlankNodeMap, Literal, NamedNode, Term, Triple, Variable};
use std::collections::HashMap;

const SPARQL_RESULTS_NAMESPACE: &str = "http://www.w3.org/2005/sparql-results#";
const MAX_NUMBER_OF_NESTED_TRIPLES: usize = 128;

/// How XML documents are read.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash)]
pub enum XmlEngine {
    /// Reacts to the parser events with a state machine, without building the document in memory.
    #[default]
    Streaming,
    /// Builds the element tree first then looks up the values in it.
    Tree,
}

/// Decodes a SPARQL XML results document.
///
/// ```
/// use sparresults::{QueryResults, XmlEngine, read_xml_results};
/// use sparterm::BlankNodeMap;
///
/// let body = br#"<sparql xmlns="http://www.w3.org/2005/sparql-results#"><head/><boolean>true</boolean></sparql>"#;
/// for engine in [XmlEngine::Streaming, XmlEngine::Tree] {
///     assert_eq!(
///         read_xml_results(body, &mut BlankNodeMap::new(), engine)?,
///         QueryResults::Boolean(true)
///     );
/// }
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub fn read_xml_results(
    body: &[u8],
    blank_nodes: &mut BlankNodeMap,
    engine: XmlEngine,
) -> Result<QueryResults, DecodeError> {
    match engine {
        XmlEngine::Streaming => StreamingReader::new(body, blank_nodes).read(),
        XmlEngine::Tree => {
            let root = Element::parse(body)?;
            read_tree(&root, blank_nodes)
        }
    }
}

fn new_reader(body: &[u8]) -> Reader<&[u8]> {
    let mut reader = Reader::from_reader(body);
    reader.expand_empty_elements(true);
    reader
}

fn cdata_text(event: BytesCData<'_>) -> Result<String, DecodeError> {
    String::from_utf8(event.into_inner().into_owned())
        .map_err(|e| DecodeError::msg(format!("Invalid UTF-8 in CDATA: {e}")))
}

fn unexpected_text(data: &str) -> Result<(), DecodeError> {
    if data.trim().is_empty() {
        Ok(())
    } else {
        Err(DecodeError::msg(format!(
            "Unexpected textual value found: '{data}'"
        )))
    }
}

fn check_root(local_name: &[u8], namespace: Option<&str>) -> Result<(), DecodeError> {
    if local_name != b"sparql" {
        return Err(DecodeError::msg(format!(
            "Expecting <sparql> tag, found <{}>",
            String::from_utf8_lossy(local_name)
        )));
    }
    match namespace {
        Some(namespace) if namespace != SPARQL_RESULTS_NAMESPACE => Err(DecodeError::msg(
            format!("The <sparql> tag should be in the {SPARQL_RESULTS_NAMESPACE} namespace, found {namespace}"),
        )),
        _ => Ok(()),
    }
}

fn default_namespace(event: &BytesStart<'_>) -> Result<Option<String>, DecodeError> {
    for attr in event.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"xmlns" {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn name_attribute(event: &BytesStart<'_>, tag: &str) -> Result<String, DecodeError> {
    for attr in event.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == b"name" {
            return Ok(attr.unescape_value()?.into_owned());
        }
    }
    Err(DecodeError::msg(format!(
        "No name attribute found for the <{tag}> tag"
    )))
}

/// The `xml:lang` and `datatype` attributes of a `<literal>`.
fn literal_attributes(
    event: &BytesStart<'_>,
) -> Result<(Option<String>, Option<NamedNode>), DecodeError> {
    let mut lang = None;
    let mut datatype = None;
    for attr in event.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"xml:lang" {
            lang = Some(attr.unescape_value()?.into_owned());
        } else if attr.key.local_name().as_ref() == b"datatype" {
            let iri = attr.unescape_value()?;
            datatype = Some(NamedNode::new(&*iri).map_err(|e| {
                DecodeError::msg(format!("Invalid datatype IRI '{iri}': {e}"))
            })?);
        }
    }
    Ok((lang, datatype))
}

fn declare_variable(variables: &mut Vec<Variable>, name: &str) -> Result<(), DecodeError> {
    let variable = Variable::new(name)
        .map_err(|e| DecodeError::msg(format!("Invalid variable name '{name}': {e}")))?;
    if variables.contains(&variable) {
        return Err(DecodeError::msg(format!(
            "The variable {variable} is declared twice"
        )));
    }
    variables.push(variable);
    Ok(())
}

fn variable_position(mapping: &HashMap<String, usize>, name: &str) -> Result<usize, DecodeError> {
    mapping.get(name).copied().ok_or_else(|| {
        DecodeError::msg(format!(
            "The variable '{name}' is used in a binding but not declared in the variables list"
        ))
    })
}

fn variable_mapping(variables: &[Variable]) -> HashMap<String, usize> {
    variables
        .iter()
        .enumerate()
        .map(|(i, v)| (v.as_str().to_owned(), i))
        .collect()
}

fn build_iri(value: &str) -> Result<Term, DecodeError> {
    Ok(NamedNode::new(value)
        .map_err(|e| DecodeError::msg(format!("Invalid IRI value '{value}': {e}")))?
        .into())
}

/// Resolves a blank node label through the map, an empty `<bnode/>` gets a fresh node.
fn build_blank_node(value: &str, blank_nodes: &mut BlankNodeMap) -> Result<Term, DecodeError> {
    if value.is_empty() {
        return Ok(blank_nodes.intern(BlankNode::default()).into());
    }
    Ok(blank_nodes
        .get_or_insert(value)
        .map_err(|e| DecodeError::msg(format!("Invalid blank node value '{value}': {e}")))?
        .into())
}

fn build_literal(
    value: impl Into<String>,
    lang: Option<String>,
    datatype: Option<NamedNode>,
) -> Result<Literal, DecodeError> {
    match lang {
        Some(lang) => {
            if let Some(datatype) = datatype {
                if datatype != rdf::LANG_STRING {
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

fn parse_boolean(value: &str) -> Result<bool, DecodeError> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        value => Err(DecodeError::msg(format!(
            "Unexpected boolean value. Found '{value}'"
        ))),
    }
}

fn build_triple(subject: Term, predicate: Term, object: Term) -> Result<Term, DecodeError> {
    if subject.is_literal() {
        return Err(DecodeError::msg(
            "The <subject> value should not be a <literal>",
        ));
    }
    if !predicate.is_named_node() {
        return Err(DecodeError::msg("The <predicate> value should be an <uri>"));
    }
    Ok(Triple::new(subject, predicate, object).into())
}

#[derive(Clone, Copy)]
enum HeaderState {
    Start,
    Sparql,
    Head,
    AfterHead,
}

#[derive(Clone, Copy)]
enum State {
    Start,
    Result,
    Binding,
    Uri,
    BNode,
    Literal,
    Triple,
    Subject,
    Predicate,
    Object,
    End,
}

struct StreamingReader<'a, 'b> {
    reader: Reader<&'a [u8]>,
    buffer: Vec<u8>,
    blank_nodes: &'b mut BlankNodeMap,
}

impl<'a, 'b> StreamingReader<'a, 'b> {
    fn new(body: &'a [u8], blank_nodes: &'b mut BlankNodeMap) -> Self {
        Self {
            reader: new_reader(body),
            buffer: Vec::new(),
            blank_nodes,
        }
    }

    fn read(mut self) -> Result<QueryResults, DecodeError> {
        let Some(variables) = self.read_header()? else {
            return self.read_boolean().map(QueryResults::Boolean);
        };
        let mapping = variable_mapping(&variables);
        let mut rows = Vec::new();
        while let Some(row) = self.read_solution(&mapping)? {
            rows.push(row);
        }
        Ok(SolutionSet::new(variables, rows).into())
    }

    /// Reads up to the `<results>` or `<boolean>` tag, returns the declared variables in the first case.
    fn read_header(&mut self) -> Result<Option<Vec<Variable>>, DecodeError> {
        let mut variables = Vec::new();
        let mut state = HeaderState::Start;
        loop {
            self.buffer.clear();
            match self.reader.read_event_into(&mut self.buffer)? {
                Event::Start(event) => match state {
                    HeaderState::Start => {
                        check_root(event.local_name().as_ref(), default_namespace(&event)?.as_deref())?;
                        state = HeaderState::Sparql;
                    }
                    HeaderState::Sparql => {
                        if event.local_name().as_ref() == b"head" {
                            state = HeaderState::Head;
                        } else {
                            return Err(DecodeError::msg(format!(
                                "Expecting <head> tag, found <{}>",
                                String::from_utf8_lossy(event.name().as_ref())
                            )));
                        }
                    }
                    HeaderState::Head => {
                        if event.local_name().as_ref() == b"variable" {
                            declare_variable(&mut variables, &name_attribute(&event, "variable")?)?;
                        } else if event.local_name().as_ref() != b"link" {
                            return Err(DecodeError::msg(format!(
                                "Expecting <variable> or <link> tag, found <{}>",
                                String::from_utf8_lossy(event.name().as_ref())
                            )));
                        }
                    }
                    HeaderState::AfterHead => {
                        if event.local_name().as_ref() == b"boolean" {
                            return Ok(None);
                        } else if event.local_name().as_ref() == b"results" {
                            return Ok(Some(variables));
                        } else if event.local_name().as_ref() != b"link" {
                            return Err(DecodeError::msg(format!(
                                "Expecting <results> or <boolean> tag, found <{}>",
                                String::from_utf8_lossy(event.name().as_ref())
                            )));
                        }
                    }
                },
                Event::Text(event) => unexpected_text(&event.unescape()?)?,
                Event::CData(event) => unexpected_text(&cdata_text(event)?)?,
                Event::End(event) => match state {
                    HeaderState::Head if event.local_name().as_ref() == b"head" => {
                        state = HeaderState::AfterHead;
                    }
                    HeaderState::Head | HeaderState::AfterHead => (),
                    _ => {
                        return Err(DecodeError::msg(
                            "Unexpected early file end. All results file should have a <head> and a <result> or <boolean> tag",
                        ));
                    }
                },
                Event::Eof => {
                    return Err(DecodeError::msg(
                        "Unexpected early file end. All results file should have a <head> and a <result> or <boolean> tag",
                    ));
                }
                _ => (),
            }
        }
    }

    fn read_boolean(&mut self) -> Result<bool, DecodeError> {
        let mut value = String::new();
        loop {
            self.buffer.clear();
            match self.reader.read_event_into(&mut self.buffer)? {
                Event::Text(event) => value.push_str(&event.unescape()?),
                Event::CData(event) => value.push_str(&cdata_text(event)?),
                Event::Start(_) => {
                    return Err(DecodeError::msg(
                        "Unexpected tag inside of <boolean> tag",
                    ));
                }
                Event::End(_) => return parse_boolean(&value),
                Event::Eof => {
                    return Err(DecodeError::msg("The <boolean> tag should contain a value"));
                }
                _ => (),
            }
        }
    }

    /// Reads the next `<result>`, `None` after `</results>`.
    fn read_solution(
        &mut self,
        mapping: &HashMap<String, usize>,
    ) -> Result<Option<Vec<Option<Term>>>, DecodeError> {
        let mut state = State::Start;
        let mut stack = Vec::new();
        let mut subject_stack = Vec::new();
        let mut predicate_stack = Vec::new();
        let mut object_stack = Vec::new();
        let mut new_bindings = vec![None; mapping.len()];
        let mut current_var = None;
        let mut term: Option<Term> = None;
        let mut text = String::new();
        let mut lang = None;
        let mut datatype = None;
        loop {
            self.buffer.clear();
            match self.reader.read_event_into(&mut self.buffer)? {
                Event::Start(event) => match state {
                    State::Start => {
                        if event.local_name().as_ref() == b"result" {
                            state = State::Result;
                        } else {
                            return Err(DecodeError::msg(format!(
                                "Expecting <result>, found <{}>",
                                String::from_utf8_lossy(event.name().as_ref())
                            )));
                        }
                    }
                    State::Result => {
                        if event.local_name().as_ref() == b"binding" {
                            current_var = Some(name_attribute(&event, "binding")?);
                            state = State::Binding;
                        } else {
                            return Err(DecodeError::msg(format!(
                                "Expecting <binding>, found <{}>",
                                String::from_utf8_lossy(event.name().as_ref())
                            )));
                        }
                    }
                    State::Binding | State::Subject | State::Predicate | State::Object => {
                        if term.is_some() {
                            return Err(DecodeError::msg(
                                "There is already a value for the current binding",
                            ));
                        }
                        stack.push(state);
                        state = match event.local_name().as_ref() {
                            b"uri" => State::Uri,
                            b"bnode" => State::BNode,
                            b"literal" => {
                                (lang, datatype) = literal_attributes(&event)?;
                                State::Literal
                            }
                            b"triple" => {
                                if stack.len() > MAX_NUMBER_OF_NESTED_TRIPLES {
                                    return Err(DecodeError::msg(
                                        "Too many nested triples. The parser fails here to avoid a stack overflow.",
                                    ));
                                }
                                State::Triple
                            }
                            _ => {
                                return Err(DecodeError::msg(format!(
                                    "Expecting <uri>, <bnode>, <literal> or <triple> found <{}>",
                                    String::from_utf8_lossy(event.name().as_ref())
                                )));
                            }
                        };
                    }
                    State::Triple => {
                        state = match event.local_name().as_ref() {
                            b"subject" => State::Subject,
                            b"predicate" => State::Predicate,
                            b"object" => State::Object,
                            _ => {
                                return Err(DecodeError::msg(format!(
                                    "Expecting <subject>, <predicate> or <object> found <{}>",
                                    String::from_utf8_lossy(event.name().as_ref())
                                )));
                            }
                        };
                    }
                    State::Uri | State::BNode | State::Literal | State::End => {
                        return Err(DecodeError::msg(format!(
                            "Unexpected tag <{}>",
                            String::from_utf8_lossy(event.name().as_ref())
                        )));
                    }
                },
                Event::Text(event) => {
                    let data = event.unescape()?;
                    match state {
                        State::Uri | State::BNode | State::Literal => text.push_str(&data),
                        _ => unexpected_text(&data)?,
                    }
                }
                Event::CData(event) => {
                    let data = cdata_text(event)?;
                    match state {
                        State::Uri | State::BNode | State::Literal => text.push_str(&data),
                        _ => unexpected_text(&data)?,
                    }
                }
                Event::End(_) => match state {
                    State::Start => state = State::End,
                    State::Result => return Ok(Some(new_bindings)),
                    State::Binding => {
                        let Some(var) = current_var.take() else {
                            return Err(DecodeError::msg("No name found for <binding> tag"));
                        };
                        new_bindings[variable_position(mapping, &var)?] = term.take();
                        state = State::Result;
                    }
                    State::Subject => {
                        if let Some(subject) = term.take() {
                            subject_stack.push(subject);
                        }
                        state = State::Triple;
                    }
                    State::Predicate => {
                        if let Some(predicate) = term.take() {
                            predicate_stack.push(predicate);
                        }
                        state = State::Triple;
                    }
                    State::Object => {
                        if let Some(object) = term.take() {
                            object_stack.push(object);
                        }
                        state = State::Triple;
                    }
                    State::Uri | State::BNode | State::Literal => {
                        let value = std::mem::take(&mut text);
                        term = Some(match state {
                            State::Uri => build_iri(value.trim())?,
                            State::BNode => build_blank_node(value.trim(), self.blank_nodes)?,
                            _ => build_literal(value, lang.take(), datatype.take())?.into(),
                        });
                        state = stack
                            .pop()
                            .ok_or_else(|| DecodeError::msg("Empty stack"))?;
                    }
                    State::Triple => {
                        let (Some(subject), Some(predicate), Some(object)) = (
                            subject_stack.pop(),
                            predicate_stack.pop(),
                            object_stack.pop(),
                        ) else {
                            return Err(DecodeError::msg(
                                "A <triple> should contain a <subject>, a <predicate> and an <object>",
                            ));
                        };
                        term = Some(build_triple(subject, predicate, object)?);
                        state = stack
                            .pop()
                            .ok_or_else(|| DecodeError::msg("Empty stack"))?;
                    }
                    State::End => (),
                },
                Event::Eof => return Ok(None),
                _ => (),
            }
        }
    }
}

/// An XML element, with its local name.
#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

#[derive(Debug)]
enum Node {
    Element(Element),
    Text(String),
}

impl Element {
    fn parse(body: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = new_reader(body);
        let mut buffer = Vec::new();
        let mut stack = vec![Self::default()];
        loop {
            buffer.clear();
            match reader.read_event_into(&mut buffer)? {
                Event::Start(event) => {
                    let mut attributes = Vec::new();
                    for attr in event.attributes() {
                        let attr = attr?;
                        attributes.push((
                            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                            attr.unescape_value()?.into_owned(),
                        ));
                    }
                    stack.push(Self {
                        name: String::from_utf8_lossy(event.local_name().as_ref()).into_owned(),
                        attributes,
                        children: Vec::new(),
                    });
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| DecodeError::msg("Unbalanced XML end tag"))?;
                    stack
                        .last_mut()
                        .ok_or_else(|| DecodeError::msg("Unbalanced XML end tag"))?
                        .children
                        .push(Node::Element(element));
                }
                Event::Text(event) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(Node::Text(event.unescape()?.into_owned()));
                    }
                }
                Event::CData(event) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(Node::Text(cdata_text(event)?));
                    }
                }
                Event::Eof => break,
                _ => (),
            }
        }
        let document = stack.pop().ok_or_else(|| DecodeError::msg("Empty XML document"))?;
        if !stack.is_empty() {
            return Err(DecodeError::msg("Unexpected early file end"));
        }
        let mut root = None;
        for child in document.children {
            match child {
                Node::Element(element) if root.is_none() => root = Some(element),
                Node::Text(text) if text.trim().is_empty() => (),
                _ => {
                    return Err(DecodeError::msg(
                        "The XML document should have a single root element",
                    ));
                }
            }
        }
        root.ok_or_else(|| DecodeError::msg("The XML document should have a single root element"))
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match child {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }
}

fn read_tree(root: &Element, blank_nodes: &mut BlankNodeMap) -> Result<QueryResults, DecodeError> {
    check_root(root.name.as_bytes(), root.attribute("xmlns"))?;
    let head = root
        .child("head")
        .ok_or_else(|| DecodeError::msg("All results file should have a <head> tag"))?;
    if let Some(boolean) = root.child("boolean") {
        return parse_boolean(&boolean.text()).map(QueryResults::Boolean);
    }
    let mut variables = Vec::new();
    for element in head.elements() {
        match element.name.as_str() {
            "variable" => {
                let name = element.attribute("name").ok_or_else(|| {
                    DecodeError::msg("No name attribute found for the <variable> tag")
                })?;
                declare_variable(&mut variables, name)?;
            }
            "link" => (),
            name => {
                return Err(DecodeError::msg(format!(
                    "Expecting <variable> or <link> tag, found <{name}>"
                )));
            }
        }
    }
    let results = root.child("results").ok_or_else(|| {
        DecodeError::msg("All results file should have a <result> or <boolean> tag")
    })?;
    let mapping = variable_mapping(&variables);
    let mut rows = Vec::new();
    for result in results.elements() {
        if result.name != "result" {
            return Err(DecodeError::msg(format!(
                "Expecting <result>, found <{}>",
                result.name
            )));
        }
        let mut row = vec![None; variables.len()];
        for binding in result.elements() {
            if binding.name != "binding" {
                return Err(DecodeError::msg(format!(
                    "Expecting <binding>, found <{}>",
                    binding.name
                )));
            }
            let name = binding.attribute("name").ok_or_else(|| {
                DecodeError::msg("No name attribute found for the <binding> tag")
            })?;
            let position = variable_position(&mapping, name)?;
            row[position] = Some(single_term(binding, blank_nodes, 0)?);
        }
        rows.push(row);
    }
    Ok(SolutionSet::new(variables, rows).into())
}

/// Reads the single term element inside of `parent`.
fn single_term(
    parent: &Element,
    blank_nodes: &mut BlankNodeMap,
    number_of_recursive_calls: usize,
) -> Result<Term, DecodeError> {
    let mut elements = parent.elements();
    let (Some(element), None) = (elements.next(), elements.next()) else {
        return Err(DecodeError::msg(format!(
            "The <{}> tag should contain exactly one value",
            parent.name
        )));
    };
    match element.name.as_str() {
        "uri" => build_iri(element.text().trim()),
        "bnode" => build_blank_node(element.text().trim(), blank_nodes),
        "literal" => {
            let datatype = element
                .attributes
                .iter()
                .find(|(k, _)| k == "datatype" || k.ends_with(":datatype"))
                .map(|(_, iri)| {
                    NamedNode::new(iri.as_str()).map_err(|e| {
                        DecodeError::msg(format!("Invalid datatype IRI '{iri}': {e}"))
                    })
                })
                .transpose()?;
            let lang = element.attribute("xml:lang").map(ToOwned::to_owned);
            Ok(build_literal(element.text(), lang, datatype)?.into())
        }
        "triple" => {
            if number_of_recursive_calls == MAX_NUMBER_OF_NESTED_TRIPLES {
                return Err(DecodeError::msg(
                    "Too many nested triples. The parser fails here to avoid a stack overflow.",
                ));
            }
            let mut component = |name: &str| {
                let child = element.child(name).ok_or_else(|| {
                    DecodeError::msg(
                        "A <triple> should contain a <subject>, a <predicate> and an <object>",
                    )
                })?;
                single_term(child, blank_nodes, number_of_recursive_calls + 1)
            };
            let subject = component("subject")?;
            let predicate = component("predicate")?;
            let object = component("object")?;
            build_triple(subject, predicate, object)
        }
        name => Err(DecodeError::msg(format!(
            "Expecting <uri>, <bnode>, <literal> or <triple> found <{name}>"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SELECT: &str = r#"<?xml version="1.0"?>
<sparql xmlns="http://www.w3.org/2005/sparql-results#">
  <head>
    <variable name="s"/>
    <variable name="label"/>
    <variable name="t"/>
    <link href="metadata.rdf"/>
  </head>
  <results>
    <result>
      <binding name="s"><bnode>r1</bnode></binding>
      <binding name="label"><literal xml:lang="en">Alice &amp; Bob</literal></binding>
    </result>
    <result>
      <binding name="label"><literal datatype="http://www.w3.org/2001/XMLSchema#integer">1</literal></binding>
      <binding name="t"><triple>
        <subject><bnode>r1</bnode></subject>
        <predicate><uri>http://example.com/p</uri></predicate>
        <object><literal></literal></object>
      </triple></binding>
    </result>
  </results>
</sparql>"#;

    #[test]
    fn engines_agree() -> Result<(), DecodeError> {
        let mut streaming_map = BlankNodeMap::new();
        let streaming = read_xml_results(SELECT.as_bytes(), &mut streaming_map, XmlEngine::Streaming)?;
        let mut tree_map = BlankNodeMap::new();
        let tree = read_xml_results(SELECT.as_bytes(), &mut tree_map, XmlEngine::Tree)?;
        assert_eq!(streaming, tree);
        assert_eq!(streaming_map.len(), 1);
        assert_eq!(tree_map.len(), 1);

        let QueryResults::Solutions(solutions) = streaming else {
            panic!("solutions expected")
        };
        assert_eq!(solutions.variables().len(), 3);
        assert_eq!(
            solutions.solutions()[0]["label"],
            Term::from(Literal::new_language_tagged_literal_unchecked("Alice & Bob", "en"))
        );
        assert_eq!(solutions.solutions()[1]["label"], Term::from(Literal::from(1)));
        assert_eq!(solutions.solutions()[1].get("s"), None);
        let Term::Triple(triple) = &solutions.solutions()[1]["t"] else {
            panic!("triple expected")
        };
        let (Term::BlankNode(first), Term::BlankNode(second)) =
            (&solutions.solutions()[0]["s"], &triple.subject)
        else {
            panic!("blank nodes expected")
        };
        assert!(first.is_same_node(second));
        assert_eq!(triple.object, Term::from(""));
        Ok(())
    }

    #[test]
    fn engines_agree_on_split_literal_text() -> Result<(), DecodeError> {
        for (literal, expected) in [
            (
                "<literal><![CDATA[a<b]]></literal>",
                Literal::new_simple_literal("a<b"),
            ),
            (
                r#"<literal xml:lang="en">ab<!-- c -->cd</literal>"#,
                Literal::new_language_tagged_literal_unchecked("abcd", "en"),
            ),
            (
                "<literal>x &amp; <![CDATA[<y>]]> z</literal>",
                Literal::new_simple_literal("x & <y> z"),
            ),
            ("<literal> a </literal>", Literal::new_simple_literal(" a ")),
        ] {
            let body = format!(
                r#"<sparql xmlns="http://www.w3.org/2005/sparql-results#"><head><variable name="v"/></head><results><result><binding name="v">{literal}</binding></result></results></sparql>"#
            );
            for engine in [XmlEngine::Streaming, XmlEngine::Tree] {
                let QueryResults::Solutions(solutions) =
                    read_xml_results(body.as_bytes(), &mut BlankNodeMap::new(), engine)?
                else {
                    panic!("solutions expected")
                };
                assert_eq!(
                    solutions.solutions()[0]["v"],
                    Term::from(expected.clone()),
                    "{literal} with {engine:?}"
                );
            }
        }
        Ok(())
    }

    #[test]
    fn boolean() -> Result<(), DecodeError> {
        for engine in [XmlEngine::Streaming, XmlEngine::Tree] {
            assert_eq!(
                read_xml_results(
                    br#"<sparql xmlns="http://www.w3.org/2005/sparql-results#"><head></head><boolean>false</boolean></sparql>"#,
                    &mut BlankNodeMap::new(),
                    engine
                )?,
                QueryResults::Boolean(false)
            );
        }
        Ok(())
    }

    #[test]
    fn errors() {
        for engine in [XmlEngine::Streaming, XmlEngine::Tree] {
            for body in [
                r#"<foo/>"#,
                r#"<sparql xmlns="http://example.com/"><head/><boolean>true</boolean></sparql>"#,
                r#"<sparql><head/><boolean>maybe</boolean></sparql>"#,
                r#"<sparql><head><variable name="a"/></head><results><result><binding name="b"><uri>http://example.com</uri></binding></result></results></sparql>"#,
                r#"<sparql><head/><results><result><binding name="a"><foo/></binding></result></results></sparql>"#,
            ] {
                assert!(
                    read_xml_results(body.as_bytes(), &mut BlankNodeMap::new(), engine).is_err(),
                    "{body} should fail with {engine:?}"
                );
            }
        }
    }
}
