//! End-to-end tests of the query builder and serializer

use sparbuild::{ArgumentError, OrderCondition, PathToken, QueryBuilder, ValuesRow};
use sparterm::vocab::rdf;
use sparterm::{Literal, NamedNode, Term, Variable};

fn vars<const N: usize>(names: [&str; N]) -> [Variable; N] {
    names.map(Variable::new_unchecked)
}

fn iri(value: &str) -> NamedNode {
    NamedNode::new_unchecked(value)
}

#[test]
fn test_select_distinct() -> Result<(), ArgumentError> {
    let [s, p, o] = vars(["s", "p", "o"]);
    let query = QueryBuilder::select([s.clone()])
        .where_([(s, p, o)])?
        .distinct()
        .build();
    assert_eq!(query.to_string(), "SELECT DISTINCT ?s WHERE { ?s ?p ?o . }");
    Ok(())
}

#[test]
fn test_construct() -> Result<(), ArgumentError> {
    let [s, p, o] = vars(["s", "p", "o"]);
    let query = QueryBuilder::construct([(s.clone(), p.clone(), o.clone())])?
        .where_([(s, p, o)])?
        .build();
    assert_eq!(
        query.to_string(),
        "CONSTRUCT { ?s ?p ?o . } WHERE { ?s ?p ?o . }"
    );
    assert!(query.expects_statements());
    Ok(())
}

#[test]
fn test_ask() -> Result<(), ArgumentError> {
    let [s] = vars(["s"]);
    let query = QueryBuilder::ask()
        .where_([(s, rdf::TYPE, iri("http://xmlns.com/foaf/0.1/Person"))])?
        .build();
    assert_eq!(
        query.to_string(),
        "ASK WHERE { ?s a <http://xmlns.com/foaf/0.1/Person> . }"
    );
    assert!(!query.expects_statements());
    Ok(())
}

#[test]
fn test_property_paths() -> Result<(), ArgumentError> {
    let [s, o] = vars(["s", "o"]);
    let p = iri("http://example.com/P");
    let q = iri("http://example.com/Q");
    let cases: [(Vec<PathToken>, &str); 4] = [
        (
            vec!["^".into(), p.clone().into()],
            "?s ^<http://example.com/P> ?o .",
        ),
        (
            vec![p.clone().into(), "/".into(), q.clone().into()],
            "?s <http://example.com/P>/<http://example.com/Q> ?o .",
        ),
        (
            vec![p.clone().into(), "*".into()],
            "?s <http://example.com/P>* ?o .",
        ),
        (
            vec![
                "!".into(),
                PathToken::Group(vec![p.clone().into(), "|".into(), q.clone().into()]),
            ],
            "?s !(<http://example.com/P>|<http://example.com/Q>) ?o .",
        ),
    ];
    for (tokens, expected) in cases {
        let query = QueryBuilder::select([])
            .where_([(s.clone(), tokens, o.clone())])?
            .build();
        assert_eq!(query.to_string(), format!("SELECT * WHERE {{ {expected} }}"));
    }
    Ok(())
}

#[test]
fn test_prefixes_keep_declaration_order() -> Result<(), ArgumentError> {
    let query = QueryBuilder::select([])
        .prefix("dc: <http://purl.org/dc/elements/1.1/>")?
        .prefix("foaf: <http://xmlns.com/foaf/0.1/>")?
        .build();
    assert_eq!(
        query.to_string(),
        "PREFIX dc: <http://purl.org/dc/elements/1.1/> PREFIX foaf: <http://xmlns.com/foaf/0.1/> SELECT * WHERE { }"
    );
    Ok(())
}

#[test]
fn test_serialization_is_deterministic() -> Result<(), ArgumentError> {
    let [s, p, o, label] = vars(["s", "p", "o", "label"]);
    let query = QueryBuilder::select([s.clone(), label.clone()])
        .graph(iri("http://example.com/g"))
        .where_([(s.clone(), p, o.clone())])?
        .optional([(
            s.clone(),
            iri("http://www.w3.org/2000/01/rdf-schema#label"),
            label.clone(),
        )])?
        .filter("isIRI(?o)")
        .values([o], [ValuesRow::scalar(iri("http://example.com/a"))])?
        .union_with(|b| b.where_([(s.clone(), iri("http://example.com/q"), label.clone())]))?
        .order_by([OrderCondition::parse_direction(label, "desc")?])
        .limit(3)
        .build();
    assert_eq!(query.to_string(), query.to_string());
    assert_eq!(query.to_string(), query.clone().to_string());
    assert_eq!(
        query.to_string(),
        "SELECT ?s ?label WHERE { { GRAPH <http://example.com/g> { ?s ?p ?o . OPTIONAL { ?s <http://www.w3.org/2000/01/rdf-schema#label> ?label . } FILTER(isIRI(?o)) VALUES (?o) { ( <http://example.com/a> ) } } } UNION { ?s <http://example.com/q> ?label . } } ORDER BY DESC(?label) LIMIT 3"
    );
    Ok(())
}

#[test]
fn test_values_cells() -> Result<(), ArgumentError> {
    let [a, b] = vars(["a", "b"]);
    let rows = [
        ValuesRow::Tuple(vec![Some(Term::from("x")), None]),
        ValuesRow::Tuple(vec![None, Some(Literal::new_language_tagged_literal_unchecked("y", "en").into())]),
        ValuesRow::Tuple(vec![None, None]),
    ];
    let query = QueryBuilder::select([a.clone()])
        .values([a, b], rows)?
        .build()
        .to_string();
    assert_eq!(
        query,
        "SELECT ?a WHERE { VALUES (?a ?b) { ( \"x\" UNDEF ) ( UNDEF \"y\"@en ) ( UNDEF UNDEF ) } }"
    );
    assert_eq!(query.matches("UNDEF").count(), 4);
    Ok(())
}

#[test]
fn test_invalid_order_direction() {
    let [o] = vars(["o"]);
    assert!(OrderCondition::parse_direction(o, "upward").is_err());
}

#[test]
fn test_describe() -> Result<(), ArgumentError> {
    let [s] = vars(["s"]);
    let query = QueryBuilder::describe([s.clone()])
        .where_([(s, rdf::TYPE, iri("http://example.com/C"))])?
        .build();
    assert_eq!(
        query.to_string(),
        "DESCRIBE ?s WHERE { ?s a <http://example.com/C> . }"
    );
    Ok(())
}
