//! [SPARQL 1.1 Update](https://www.w3.org/TR/sparql11-update/) operations.
//!
//! Each operation renders its own fixed-shape text:
//! ```
//! use sparbuild::update::{Clear, GraphTarget, InsertData};
//! use sparterm::{Graph, NamedNode};
//!
//! assert_eq!(InsertData::new(Graph::new())?.to_string(), "INSERT DATA {\n}\n");
//! assert_eq!(
//!     Clear::new(GraphTarget::NamedNode(NamedNode::new("http://example.com/g")?)).to_string(),
//!     "CLEAR GRAPH <http://example.com/g>"
//! );
//! # Result::<_, Box<dyn std::error::Error>>::Ok(())
//! ```

use crate::error::{ArgumentError, UpdateError};
use crate::pattern::{RawPattern, TriplePattern, build_patterns};
use crate::serializer::{BlankNodeVariables, TermMode, TokenWriter, write_pattern};
use sparterm::{Graph, NamedNode};
use std::fmt::{self, Write};

/// A sequence of update operations, separated by ` ;\n` once serialized.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Update {
    pub operations: Vec<GraphUpdateOperation>,
}

impl Update {
    /// Fails if one of the operations can not be serialized.
    pub fn to_sparql(&self) -> Result<String, UpdateError> {
        Ok(self
            .operations
            .iter()
            .map(GraphUpdateOperation::to_sparql)
            .collect::<Result<Vec<_>, _>>()?
            .join(" ;\n"))
    }

    /// Checks if any operation returns a graph.
    pub fn expects_statements(&self) -> bool {
        self.operations
            .iter()
            .any(GraphUpdateOperation::expects_statements)
    }
}

impl FromIterator<GraphUpdateOperation> for Update {
    fn from_iter<I: IntoIterator<Item = GraphUpdateOperation>>(iter: I) -> Self {
        Self {
            operations: iter.into_iter().collect(),
        }
    }
}

/// A [graph update operation](https://www.w3.org/TR/sparql11-update/#formalModelGraphUpdate).
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum GraphUpdateOperation {
    InsertData(InsertData),
    DeleteData(DeleteData),
    DeleteInsert(DeleteInsert),
    Load(Load),
    Clear(Clear),
    Create(Create),
    Drop(Drop),
    Copy(Copy),
    Move(Move),
    Add(Add),
}

impl GraphUpdateOperation {
    /// Serializes the operation.
    ///
    /// `COPY`, `MOVE` and `ADD` return [`UpdateError::NotImplemented`].
    pub fn to_sparql(&self) -> Result<String, UpdateError> {
        match self {
            Self::InsertData(op) => Ok(op.to_string()),
            Self::DeleteData(op) => Ok(op.to_string()),
            Self::DeleteInsert(op) => Ok(op.to_string()),
            Self::Load(op) => Ok(op.to_string()),
            Self::Clear(op) => Ok(op.to_string()),
            Self::Create(op) => Ok(op.to_string()),
            Self::Drop(op) => Ok(op.to_string()),
            Self::Copy(_) => Err(UpdateError::NotImplemented("COPY")),
            Self::Move(_) => Err(UpdateError::NotImplemented("MOVE")),
            Self::Add(_) => Err(UpdateError::NotImplemented("ADD")),
        }
    }

    /// Checks if the operation returns a graph, which selects the `Accept` header sent along.
    pub fn expects_statements(&self) -> bool {
        matches!(
            self,
            Self::Load(_) | Self::Copy(_) | Self::Move(_) | Self::Add(_)
        )
    }
}

macro_rules! impl_from_operation {
    ($($name:ident),*) => {
        $(
            impl From<$name> for GraphUpdateOperation {
                #[inline]
                fn from(op: $name) -> Self {
                    Self::$name(op)
                }
            }
        )*
    };
}

impl_from_operation!(
    InsertData,
    DeleteData,
    DeleteInsert,
    Load,
    Clear,
    Create,
    Drop,
    Copy,
    Move,
    Add
);

/// [INSERT DATA](https://www.w3.org/TR/sparql11-update/#insertData): adds ground triples.
///
/// ```
/// use sparbuild::update::InsertData;
/// use sparterm::{Graph, NamedNode, Triple};
///
/// let ex = NamedNode::new("http://example.com")?;
/// let graph = Graph::from_iter([Triple::new(ex.clone(), ex.clone(), "foo")]);
/// assert_eq!(
///     InsertData::new(graph)?.with_graph(ex).to_string(),
///     "INSERT DATA { GRAPH <http://example.com> {\n<http://example.com> <http://example.com> \"foo\" .\n}}\n"
/// );
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct InsertData {
    data: Graph,
    graph: Option<NamedNode>,
}

impl InsertData {
    /// Fails if the data contains variables.
    pub fn new(data: Graph) -> Result<Self, ArgumentError> {
        if let Some(triple) = data.iter().find(|t| !t.is_ground()) {
            return Err(ArgumentError::msg(format!(
                "INSERT DATA does not allow variables, found {triple}"
            )));
        }
        Ok(Self { data, graph: None })
    }

    /// Inserts into the given named graph instead of the default graph.
    #[must_use]
    pub fn with_graph(mut self, graph: NamedNode) -> Self {
        self.graph = Some(graph);
        self
    }
}

impl fmt::Display for InsertData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_data_block(f, "INSERT DATA", &self.data, self.graph.as_ref())
    }
}

/// [DELETE DATA](https://www.w3.org/TR/sparql11-update/#deleteData): removes ground triples.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DeleteData {
    data: Graph,
    graph: Option<NamedNode>,
}

impl DeleteData {
    /// Fails if the data contains variables or blank nodes.
    pub fn new(data: Graph) -> Result<Self, ArgumentError> {
        if let Some(triple) = data
            .iter()
            .find(|t| !t.is_ground() || t.has_blank_nodes())
        {
            return Err(ArgumentError::msg(format!(
                "DELETE DATA does not allow variables or blank nodes, found {triple}"
            )));
        }
        Ok(Self { data, graph: None })
    }

    #[must_use]
    pub fn with_graph(mut self, graph: NamedNode) -> Self {
        self.graph = Some(graph);
        self
    }
}

impl fmt::Display for DeleteData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_data_block(f, "DELETE DATA", &self.data, self.graph.as_ref())
    }
}

fn write_data_block(
    f: &mut fmt::Formatter<'_>,
    keyword: &str,
    data: &Graph,
    graph: Option<&NamedNode>,
) -> fmt::Result {
    write!(f, "{keyword} {{")?;
    if let Some(graph) = graph {
        write!(f, " GRAPH {graph} {{")?;
    }
    writeln!(f)?;
    write!(f, "{data}")?;
    if graph.is_some() {
        f.write_str("}")?;
    }
    f.write_str("}\n")
}

/// [DELETE/INSERT](https://www.w3.org/TR/sparql11-update/#deleteInsert): updates triples matching patterns.
///
/// Blank nodes in the patterns are written as variables.
/// Without explicit `WHERE` patterns, the `DELETE` patterns are used.
///
/// ```
/// use sparbuild::update::DeleteInsert;
/// use sparterm::{NamedNode, Variable};
///
/// let p = NamedNode::new("http://example.com/p")?;
/// let [s, o] = ["s", "o"].map(Variable::new_unchecked);
/// let op = DeleteInsert::new([(s.clone(), p.clone(), o.clone())], [(s, p, "new")])?;
/// assert_eq!(
///     op.to_string(),
///     "DELETE {\n ?s <http://example.com/p> ?o . }\n INSERT {\n ?s <http://example.com/p> \"new\" . }\n WHERE {\n ?s <http://example.com/p> ?o . }\n"
/// );
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DeleteInsert {
    delete: Vec<TriplePattern>,
    insert: Vec<TriplePattern>,
    where_: Option<Vec<TriplePattern>>,
    graph: Option<NamedNode>,
}

impl DeleteInsert {
    pub fn new<D: Into<RawPattern>, I: Into<RawPattern>>(
        delete: impl IntoIterator<Item = D>,
        insert: impl IntoIterator<Item = I>,
    ) -> Result<Self, ArgumentError> {
        Ok(Self {
            delete: build_patterns(delete)?,
            insert: build_patterns(insert)?,
            where_: None,
            graph: None,
        })
    }

    /// Sets the `WHERE` patterns.
    pub fn with_where<P: Into<RawPattern>>(
        mut self,
        patterns: impl IntoIterator<Item = P>,
    ) -> Result<Self, ArgumentError> {
        self.where_ = Some(build_patterns(patterns)?);
        Ok(self)
    }

    /// Adds a `WITH <graph>` clause.
    #[must_use]
    pub fn with_graph(mut self, graph: NamedNode) -> Self {
        self.graph = Some(graph);
        self
    }
}

impl fmt::Display for DeleteInsert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let where_ = self.where_.as_ref().unwrap_or(&self.delete);
        let variables =
            BlankNodeVariables::new(self.delete.iter().chain(&self.insert).chain(where_));
        let mode = TermMode::BlankNodesAsVariables(&variables);
        let mut w = TokenWriter::default();
        if let Some(graph) = &self.graph {
            w.token("WITH");
            w.token_with(|f| write!(f, "{graph}"))?;
        }
        if !self.delete.is_empty() {
            w.token("DELETE {\n");
            write_patterns(&mut w, &self.delete, mode)?;
            w.token("}\n");
        }
        if !self.insert.is_empty() {
            w.token("INSERT {\n");
            write_patterns(&mut w, &self.insert, mode)?;
            w.token("}\n");
        }
        w.token("WHERE {\n");
        write_patterns(&mut w, where_, mode)?;
        w.token("}\n");
        f.write_str(&w.into_string())
    }
}

fn write_patterns(
    w: &mut TokenWriter,
    patterns: &[TriplePattern],
    mode: TermMode<'_>,
) -> fmt::Result {
    for pattern in patterns {
        w.token_with(|f| write_pattern(pattern, mode, f))?;
    }
    Ok(())
}

/// [LOAD](https://www.w3.org/TR/sparql11-update/#load): loads a remote document.
///
/// ```
/// use sparbuild::update::Load;
/// use sparterm::NamedNode;
///
/// let op = Load::new(NamedNode::new("http://example.com/data.ttl")?)
///     .silent()
///     .into_graph(NamedNode::new("http://example.com/g")?);
/// assert_eq!(
///     op.to_string(),
///     "LOAD SILENT <http://example.com/data.ttl> INTO GRAPH <http://example.com/g>"
/// );
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Load {
    from: NamedNode,
    into: Option<NamedNode>,
    silent: bool,
}

impl Load {
    pub fn new(from: NamedNode) -> Self {
        Self {
            from,
            into: None,
            silent: false,
        }
    }

    /// Loads into the given named graph instead of the default graph.
    #[must_use]
    pub fn into_graph(mut self, graph: NamedNode) -> Self {
        self.into = Some(graph);
        self
    }

    #[must_use]
    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }
}

impl fmt::Display for Load {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LOAD ")?;
        if self.silent {
            f.write_str("SILENT ")?;
        }
        write!(f, "{}", self.from)?;
        if let Some(into) = &self.into {
            write!(f, " INTO GRAPH {into}")?;
        }
        Ok(())
    }
}

/// The target of a [`Clear`] or [`Drop`] operation.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum GraphTarget {
    NamedNode(NamedNode),
    DefaultGraph,
    NamedGraphs,
    AllGraphs,
}

impl GraphTarget {
    /// Parses a target name: `graph` (with a graph IRI), `default`, `named` or `all`.
    ///
    /// ```
    /// use sparbuild::update::GraphTarget;
    ///
    /// assert_eq!(GraphTarget::parse("ALL", None)?, GraphTarget::AllGraphs);
    /// GraphTarget::parse("graph", None).unwrap_err();
    /// GraphTarget::parse("everything", None).unwrap_err();
    /// # Result::<_, sparbuild::ArgumentError>::Ok(())
    /// ```
    pub fn parse(target: &str, graph: Option<NamedNode>) -> Result<Self, ArgumentError> {
        match (target.to_ascii_lowercase().as_str(), graph) {
            ("graph", Some(graph)) => Ok(Self::NamedNode(graph)),
            ("graph", None) => Err(ArgumentError::msg("The graph target needs a graph IRI")),
            ("default", None) => Ok(Self::DefaultGraph),
            ("named", None) => Ok(Self::NamedGraphs),
            ("all", None) => Ok(Self::AllGraphs),
            ("default" | "named" | "all", Some(graph)) => Err(ArgumentError::msg(format!(
                "The {target} target does not take a graph IRI, found {graph}"
            ))),
            _ => Err(ArgumentError::msg(format!(
                "Invalid graph target: {target}"
            ))),
        }
    }
}

impl fmt::Display for GraphTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NamedNode(node) => write!(f, "GRAPH {node}"),
            Self::DefaultGraph => f.write_str("DEFAULT"),
            Self::NamedGraphs => f.write_str("NAMED"),
            Self::AllGraphs => f.write_str("ALL"),
        }
    }
}

impl From<NamedNode> for GraphTarget {
    fn from(node: NamedNode) -> Self {
        Self::NamedNode(node)
    }
}

/// [CLEAR](https://www.w3.org/TR/sparql11-update/#clear): removes all triples of graphs.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Clear {
    target: GraphTarget,
    silent: bool,
}

impl Clear {
    pub fn new(target: GraphTarget) -> Self {
        Self {
            target,
            silent: false,
        }
    }

    #[must_use]
    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }
}

impl fmt::Display for Clear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CLEAR ")?;
        if self.silent {
            f.write_str("SILENT ")?;
        }
        write!(f, "{}", self.target)
    }
}

/// [DROP](https://www.w3.org/TR/sparql11-update/#drop): removes graphs.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Drop {
    target: GraphTarget,
    silent: bool,
}

impl Drop {
    pub fn new(target: GraphTarget) -> Self {
        Self {
            target,
            silent: false,
        }
    }

    #[must_use]
    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }
}

impl fmt::Display for Drop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DROP ")?;
        if self.silent {
            f.write_str("SILENT ")?;
        }
        write!(f, "{}", self.target)
    }
}

/// [CREATE](https://www.w3.org/TR/sparql11-update/#create): creates an empty graph.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Create {
    graph: NamedNode,
    silent: bool,
}

impl Create {
    pub fn new(graph: NamedNode) -> Self {
        Self {
            graph,
            silent: false,
        }
    }

    #[must_use]
    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }
}

impl fmt::Display for Create {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CREATE ")?;
        if self.silent {
            f.write_str("SILENT ")?;
        }
        write!(f, "GRAPH {}", self.graph)
    }
}

/// Source or destination of a [`Copy`], [`Move`] or [`Add`] operation.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum GraphName {
    NamedNode(NamedNode),
    DefaultGraph,
}

/// [COPY](https://www.w3.org/TR/sparql11-update/#copy). Serializing it is not implemented.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Copy {
    pub from: GraphName,
    pub to: GraphName,
}

/// [MOVE](https://www.w3.org/TR/sparql11-update/#move). Serializing it is not implemented.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Move {
    pub from: GraphName,
    pub to: GraphName,
}

/// [ADD](https://www.w3.org/TR/sparql11-update/#add). Serializing it is not implemented.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Add {
    pub from: GraphName,
    pub to: GraphName,
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparterm::{BlankNode, Triple, Variable};

    fn iri(name: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.com/{name}"))
    }

    #[test]
    fn data_blocks() {
        let graph = Graph::from_iter([Triple::new(iri("s"), iri("p"), iri("o"))]);
        assert_eq!(
            InsertData::new(graph.clone()).unwrap().to_string(),
            "INSERT DATA {\n<http://example.com/s> <http://example.com/p> <http://example.com/o> .\n}\n"
        );
        assert_eq!(
            DeleteData::new(Graph::new())
                .unwrap()
                .with_graph(iri("g"))
                .to_string(),
            "DELETE DATA { GRAPH <http://example.com/g> {\n}}\n"
        );
    }

    #[test]
    fn data_blocks_validation() {
        let with_variable = Graph::from_iter([Triple::new(
            Variable::new_unchecked("s"),
            iri("p"),
            iri("o"),
        )]);
        InsertData::new(with_variable.clone()).unwrap_err();
        DeleteData::new(with_variable).unwrap_err();
        let with_blank_node =
            Graph::from_iter([Triple::new(BlankNode::new_unchecked("b"), iri("p"), iri("o"))]);
        InsertData::new(with_blank_node.clone()).unwrap();
        DeleteData::new(with_blank_node).unwrap_err();
    }

    #[test]
    fn delete_insert_with_graph_and_blank_nodes() {
        let op = DeleteInsert::new(
            [(BlankNode::new_unchecked("b"), iri("p"), iri("o"))],
            Vec::<TriplePattern>::new(),
        )
        .unwrap()
        .with_graph(iri("g"));
        assert_eq!(
            op.to_string(),
            "WITH <http://example.com/g> DELETE {\n ?b <http://example.com/p> <http://example.com/o> . }\n WHERE {\n ?b <http://example.com/p> <http://example.com/o> . }\n"
        );
        let op = DeleteInsert::new(
            Vec::<TriplePattern>::new(),
            [(iri("s"), iri("p"), iri("o"))],
        )
        .unwrap()
        .with_where([(Variable::new_unchecked("x"), iri("q"), iri("o"))])
        .unwrap();
        assert_eq!(
            op.to_string(),
            "INSERT {\n <http://example.com/s> <http://example.com/p> <http://example.com/o> . }\n WHERE {\n ?x <http://example.com/q> <http://example.com/o> . }\n"
        );
    }

    #[test]
    fn graph_management() {
        assert_eq!(
            Clear::new(GraphTarget::AllGraphs).silent().to_string(),
            "CLEAR SILENT ALL"
        );
        assert_eq!(
            Clear::new(GraphTarget::parse("graph", Some(NamedNode::new_unchecked("x"))).unwrap())
                .to_string(),
            "CLEAR GRAPH <x>"
        );
        assert_eq!(
            Drop::new(GraphTarget::parse("default", None).unwrap()).to_string(),
            "DROP DEFAULT"
        );
        assert_eq!(
            Drop::new(GraphTarget::NamedGraphs).silent().to_string(),
            "DROP SILENT NAMED"
        );
        assert_eq!(
            Create::new(iri("g")).silent().to_string(),
            "CREATE SILENT GRAPH <http://example.com/g>"
        );
        assert_eq!(
            Load::new(iri("d")).to_string(),
            "LOAD <http://example.com/d>"
        );
        GraphTarget::parse("default", Some(iri("g"))).unwrap_err();
    }

    #[test]
    fn not_implemented_operations() {
        let op = GraphUpdateOperation::from(Copy {
            from: GraphName::DefaultGraph,
            to: GraphName::NamedNode(iri("g")),
        });
        assert!(matches!(
            op.to_sparql(),
            Err(UpdateError::NotImplemented("COPY"))
        ));
        let update = Update::from_iter([
            Clear::new(GraphTarget::AllGraphs).into(),
            GraphUpdateOperation::Move(Move {
                from: GraphName::DefaultGraph,
                to: GraphName::DefaultGraph,
            }),
        ]);
        update.to_sparql().unwrap_err();
    }

    #[test]
    fn update_sequence() {
        let update = Update::from_iter([
            GraphUpdateOperation::from(Create::new(iri("g"))),
            Load::new(iri("d")).into_graph(iri("g")).into(),
        ]);
        assert_eq!(
            update.to_sparql().unwrap(),
            "CREATE GRAPH <http://example.com/g> ;\nLOAD <http://example.com/d> INTO GRAPH <http://example.com/g>"
        );
        assert!(update.expects_statements());
        assert!(!GraphUpdateOperation::from(Clear::new(GraphTarget::DefaultGraph)).expects_statements());
    }
}
