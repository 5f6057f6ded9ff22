#![cfg(test)]
#![allow(clippy::panic_in_result_fn)]

use sparresults::{DecodeError, QueryResults, ResultsDecoder, SolutionSet, XmlEngine};
use sparterm::vocab::xsd;
use sparterm::{BlankNodeMap, Literal, NamedNode, Term, Variable};

const JSON: &str = r#"{
  "head": {"vars": ["s", "name", "age"]},
  "results": {"bindings": [
    {"s": {"type": "uri", "value": "http://example.org/alice"}, "name": {"type": "literal", "value": "Alice"}, "age": {"type": "literal", "value": "42", "datatype": "http://www.w3.org/2001/XMLSchema#integer"}},
    {"s": {"type": "bnode", "value": "b0"}, "name": {"type": "literal", "value": "Bob", "xml:lang": "en"}}
  ]}
}"#;

const XML: &str = r#"<?xml version="1.0"?>
<sparql xmlns="http://www.w3.org/2005/sparql-results#">
  <head><variable name="s"/><variable name="name"/><variable name="age"/></head>
  <results>
    <result>
      <binding name="s"><uri>http://example.org/alice</uri></binding>
      <binding name="name"><literal>Alice</literal></binding>
      <binding name="age"><literal datatype="http://www.w3.org/2001/XMLSchema#integer">42</literal></binding>
    </result>
    <result>
      <binding name="s"><bnode>b0</bnode></binding>
      <binding name="name"><literal xml:lang="en">Bob</literal></binding>
    </result>
  </results>
</sparql>"#;

const TSV: &str = "?s\t?name\t?age\n<http://example.org/alice>\t\"Alice\"\t42\n_:b0\t\"Bob\"@en\n";

const CSV: &str = "s,name,age\r\nhttp://example.org/alice,Alice,42\r\n_:b0,Bob,\r\n";

fn decode(content_type: &str, body: &str, blank_nodes: &mut BlankNodeMap) -> Result<SolutionSet, DecodeError> {
    match ResultsDecoder::new().decode(Some(content_type), body.as_bytes(), blank_nodes)? {
        QueryResults::Solutions(solutions) => Ok(solutions),
        results => panic!("solutions expected, found {results:?}"),
    }
}

fn expected_variables() -> Vec<Variable> {
    ["s", "name", "age"]
        .into_iter()
        .map(Variable::new_unchecked)
        .collect()
}

#[test]
fn test_json_xml_tsv_parity() -> Result<(), DecodeError> {
    let json = decode("application/sparql-results+json", JSON, &mut BlankNodeMap::new())?;
    let xml = decode("application/sparql-results+xml", XML, &mut BlankNodeMap::new())?;
    let tree_xml = match ResultsDecoder::new()
        .with_xml_engine(XmlEngine::Tree)
        .decode(Some("application/xml"), XML.as_bytes(), &mut BlankNodeMap::new())?
    {
        QueryResults::Solutions(solutions) => solutions,
        results => panic!("solutions expected, found {results:?}"),
    };
    let tsv = decode("text/tab-separated-values", TSV, &mut BlankNodeMap::new())?;
    assert_eq!(json, xml);
    assert_eq!(xml, tree_xml);
    assert_eq!(json, tsv);
    assert_eq!(json.variables(), expected_variables());

    let alice = &json.solutions()[0];
    assert_eq!(alice["s"], Term::from(NamedNode::new_unchecked("http://example.org/alice")));
    assert_eq!(alice["name"], Term::from("Alice"));
    assert_eq!(alice["age"], Term::from(Literal::new_typed_literal("42", xsd::INTEGER)));
    let bob = &json.solutions()[1];
    assert!(bob["s"].is_blank_node());
    assert_eq!(bob["name"], Term::from(Literal::new_language_tagged_literal_unchecked("Bob", "en")));
    assert_eq!(bob.get("age"), None);
    Ok(())
}

#[test]
fn test_csv_loses_datatypes() -> Result<(), DecodeError> {
    let json = decode("application/sparql-results+json", JSON, &mut BlankNodeMap::new())?;
    let csv = decode("text/csv", CSV, &mut BlankNodeMap::new())?;
    assert_eq!(csv.variables(), expected_variables());
    assert_ne!(json, csv);

    let alice = &csv.solutions()[0];
    assert_eq!(alice["s"], json.solutions()[0]["s"]);
    assert_eq!(alice["name"], json.solutions()[0]["name"]);
    assert_eq!(alice["age"], Term::from("42"));
    assert_ne!(alice["age"], json.solutions()[0]["age"]);
    let bob = &csv.solutions()[1];
    assert_eq!(bob["s"], json.solutions()[1]["s"]);
    assert_eq!(bob["name"], Term::from("Bob"));
    assert_eq!(bob.get("age"), None);
    Ok(())
}

#[test]
fn test_blank_node_identity() -> Result<(), DecodeError> {
    let mut session = BlankNodeMap::new();
    let from_json = decode("application/sparql-results+json", JSON, &mut session)?;
    let from_xml = decode("application/sparql-results+xml", XML, &mut session)?;
    let from_csv = decode("text/csv", CSV, &mut session)?;
    let from_tsv = decode("text/tab-separated-values", TSV, &mut session)?;
    let mut other_session = BlankNodeMap::new();
    let elsewhere = decode("application/sparql-results+json", JSON, &mut other_session)?;

    let Term::BlankNode(reference) = &from_json.solutions()[1]["s"] else {
        panic!("blank node expected")
    };
    for solutions in [&from_xml, &from_csv, &from_tsv] {
        let Term::BlankNode(node) = &solutions.solutions()[1]["s"] else {
            panic!("blank node expected")
        };
        assert!(reference.is_same_node(node));
    }
    let Term::BlankNode(foreign) = &elsewhere.solutions()[1]["s"] else {
        panic!("blank node expected")
    };
    assert_eq!(reference, foreign);
    assert!(!reference.is_same_node(foreign));
    assert_eq!(session.len(), 1);
    Ok(())
}

#[test]
fn test_csv_blank_node_reuse() -> Result<(), DecodeError> {
    let mut session = BlankNodeMap::new();
    let solutions = decode("text/csv", "a,b\r\n_:b0,_:b0\r\n_:b0,\r\n", &mut session)?;
    let nodes = solutions
        .iter()
        .flat_map(|solution| solution.iter().map(|(_, term)| term.clone()))
        .collect::<Vec<_>>();
    assert_eq!(nodes.len(), 3);
    for node in &nodes {
        let (Term::BlankNode(first), Term::BlankNode(other)) = (&nodes[0], node) else {
            panic!("blank nodes expected")
        };
        assert!(first.is_same_node(other));
    }
    Ok(())
}

#[test]
fn test_json_boolean() -> Result<(), DecodeError> {
    let results = ResultsDecoder::new().decode(
        Some("application/sparql-results+json"),
        br#"{"boolean": true}"#,
        &mut BlankNodeMap::new(),
    )?;
    assert_eq!(results, QueryResults::Boolean(true));
    assert!(results.is_true());
    Ok(())
}

#[test]
fn test_declared_but_unbound_variables() -> Result<(), DecodeError> {
    let solutions = decode(
        "application/sparql-results+json",
        r#"{"head": {"vars": ["x", "never"]}, "results": {"bindings": [{"x": {"type": "literal", "value": "1"}}]}}"#,
        &mut BlankNodeMap::new(),
    )?;
    assert_eq!(solutions.variables().len(), 2);
    assert_eq!(solutions.solutions()[0].get("never"), None);
    Ok(())
}

#[test]
fn test_empty_results_are_not_errors() -> Result<(), DecodeError> {
    let solutions = decode(
        "application/sparql-results+json",
        r#"{"head": {"vars": []}, "results": {"bindings": []}}"#,
        &mut BlankNodeMap::new(),
    )?;
    assert!(solutions.is_empty());
    assert!(!QueryResults::Solutions(solutions).is_true());
    Ok(())
}

#[test]
fn test_literal_whitespace_is_kept_by_both_xml_engines() -> Result<(), DecodeError> {
    let json = decode(
        "application/sparql-results+json",
        r#"{"head": {"vars": ["v"]}, "results": {"bindings": [{"v": {"type": "literal", "value": " a "}}]}}"#,
        &mut BlankNodeMap::new(),
    )?;
    let xml = r#"<?xml version="1.0"?>
<sparql xmlns="http://www.w3.org/2005/sparql-results#">
  <head><variable name="v"/></head>
  <results>
    <result><binding name="v"><literal> a </literal></binding></result>
  </results>
</sparql>"#;
    for engine in [XmlEngine::Streaming, XmlEngine::Tree] {
        let QueryResults::Solutions(solutions) = ResultsDecoder::new()
            .with_xml_engine(engine)
            .decode(Some("application/sparql-results+xml"), xml.as_bytes(), &mut BlankNodeMap::new())?
        else {
            panic!("solutions expected")
        };
        assert_eq!(solutions, json, "{engine:?}");
    }
    assert_eq!(json.solutions()[0]["v"], Term::from(" a "));
    Ok(())
}
