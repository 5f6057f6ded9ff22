use crate::error::ArgumentError;
use crate::pattern::{NamedNodePattern, RawPattern, TriplePattern, build_patterns};
use crate::serializer::{TermMode, TokenWriter, write_pattern, write_term, write_triple};
use sparterm::{NamedNode, Term, Variable};
use std::fmt::{self, Write};

/// The [form](https://www.w3.org/TR/sparql11-query/#QueryForms) of a query.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum QueryForm {
    Ask,
    Select,
    Describe,
    Construct,
}

impl QueryForm {
    fn keyword(self) -> &'static str {
        match self {
            Self::Ask => "ASK",
            Self::Select => "SELECT",
            Self::Describe => "DESCRIBE",
            Self::Construct => "CONSTRUCT",
        }
    }
}

/// A built SPARQL query.
///
/// It is immutable: use [`QueryBuilder`] to build one.
/// The default string formatter is returning a single line SPARQL query,
/// identical for equal queries.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Query {
    form: QueryForm,
    prefixes: Vec<String>,
    distinct: bool,
    reduced: bool,
    projection: Vec<NamedNodePattern>,
    counts: Vec<CountAggregate>,
    template: Vec<TriplePattern>,
    from: Vec<NamedNode>,
    where_: GroupGraphPattern,
    group_by: Vec<Variable>,
    order_by: Vec<OrderCondition>,
    offset: Option<usize>,
    limit: Option<usize>,
}

impl Query {
    fn new(form: QueryForm) -> Self {
        Self {
            form,
            prefixes: Vec::new(),
            distinct: false,
            reduced: false,
            projection: Vec::new(),
            counts: Vec::new(),
            template: Vec::new(),
            from: Vec::new(),
            where_: GroupGraphPattern::default(),
            group_by: Vec::new(),
            order_by: Vec::new(),
            offset: None,
            limit: None,
        }
    }

    #[inline]
    pub fn form(&self) -> QueryForm {
        self.form
    }

    /// Checks if the query returns a graph (`CONSTRUCT` and `DESCRIBE`) instead of solutions or a boolean.
    #[inline]
    pub fn expects_statements(&self) -> bool {
        matches!(self.form, QueryForm::Construct | QueryForm::Describe)
    }

    fn write(&self, w: &mut TokenWriter, with_prefixes: bool) -> fmt::Result {
        if with_prefixes {
            for prefix in &self.prefixes {
                w.token_with(|f| write!(f, "PREFIX {prefix}"))?;
            }
        }
        w.token(self.form.keyword());
        match self.form {
            QueryForm::Select | QueryForm::Describe => {
                let only_counts = self.projection.is_empty() && !self.counts.is_empty();
                if self.distinct && !only_counts {
                    w.token("DISTINCT");
                } else if self.reduced {
                    w.token("REDUCED");
                }
                if self.projection.is_empty() && self.counts.is_empty() {
                    w.token("*");
                }
                for term in &self.projection {
                    w.token_with(|f| write!(f, "{term}"))?;
                }
                for count in &self.counts {
                    w.token_with(|f| count.write(self.distinct, f))?;
                }
            }
            QueryForm::Construct => {
                w.token("{");
                for pattern in &self.template {
                    w.token_with(|f| write_triple(pattern, TermMode::default(), f))?;
                }
                w.token("}");
            }
            QueryForm::Ask => (),
        }
        for graph in &self.from {
            w.token_with(|f| write!(f, "FROM {graph}"))?;
        }
        if self.form != QueryForm::Describe || !self.where_.is_empty() {
            w.token("WHERE {");
            self.where_.write(w, TermMode::default())?;
            w.token("}");
        }
        if !self.group_by.is_empty() {
            w.token("GROUP BY");
            for var in &self.group_by {
                w.token_with(|f| write!(f, "{var}"))?;
            }
        }
        if !self.order_by.is_empty() {
            w.token("ORDER BY");
            for condition in &self.order_by {
                w.token_with(|f| write!(f, "{condition}"))?;
            }
        }
        if let Some(offset) = self.offset {
            w.token_with(|f| write!(f, "OFFSET {offset}"))?;
        }
        if let Some(limit) = self.limit {
            w.token_with(|f| write!(f, "LIMIT {limit}"))?;
        }
        Ok(())
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut w = TokenWriter::default();
        self.write(&mut w, true)?;
        f.write_str(&w.into_string())
    }
}

/// The content of a `{ ... }` block.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Default)]
pub(crate) struct GroupGraphPattern {
    graph: Option<NamedNodePattern>,
    subqueries: Vec<Query>,
    patterns: Vec<TriplePattern>,
    optionals: Vec<GroupGraphPattern>,
    filters: Vec<String>,
    values: Option<ValuesBlock>,
    minuses: Vec<GroupGraphPattern>,
    unions: Vec<GroupGraphPattern>,
}

impl GroupGraphPattern {
    fn is_empty(&self) -> bool {
        self.subqueries.is_empty()
            && self.patterns.is_empty()
            && self.optionals.is_empty()
            && self.filters.is_empty()
            && self.values.is_none()
            && self.minuses.is_empty()
            && self.unions.is_empty()
    }

    pub(crate) fn write(&self, w: &mut TokenWriter, mode: TermMode<'_>) -> fmt::Result {
        if self.unions.is_empty() {
            return self.write_body(w, mode);
        }
        w.token("{");
        self.write_body(w, mode)?;
        w.token("}");
        for union in &self.unions {
            w.token("UNION {");
            union.write(w, mode)?;
            w.token("}");
        }
        Ok(())
    }

    fn write_body(&self, w: &mut TokenWriter, mode: TermMode<'_>) -> fmt::Result {
        if let Some(graph) = &self.graph {
            w.token_with(|f| write!(f, "GRAPH {graph} {{"))?;
        }
        for subquery in &self.subqueries {
            w.token("{");
            subquery.write(w, false)?;
            w.token("} .");
        }
        for pattern in &self.patterns {
            w.token_with(|f| write_pattern(pattern, mode, f))?;
        }
        for optional in &self.optionals {
            w.token("OPTIONAL {");
            optional.write(w, mode)?;
            w.token("}");
        }
        for filter in &self.filters {
            w.token_with(|f| write!(f, "FILTER({filter})"))?;
        }
        if let Some(values) = &self.values {
            values.write(w)?;
        }
        if self.graph.is_some() {
            w.token("}");
        }
        for minus in &self.minuses {
            w.token("MINUS {");
            minus.write(w, mode)?;
            w.token("}");
        }
        Ok(())
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Hash)]
struct ValuesBlock {
    variables: Vec<Variable>,
    rows: Vec<Vec<Option<Term>>>,
}

impl ValuesBlock {
    fn write(&self, w: &mut TokenWriter) -> fmt::Result {
        w.token("VALUES");
        w.token_with(|f| {
            f.push('(');
            for (i, var) in self.variables.iter().enumerate() {
                if i > 0 {
                    f.push(' ');
                }
                write!(f, "{var}")?;
            }
            f.push(')');
            Ok(())
        })?;
        w.token("{");
        for row in &self.rows {
            w.token("(");
            for cell in row {
                match cell {
                    Some(term) => w.token_with(|f| write_term(term, TermMode::default(), f))?,
                    None => w.token("UNDEF"),
                }
            }
            w.token(")");
        }
        w.token("}");
        Ok(())
    }
}

/// A row of a `VALUES` block.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum ValuesRow {
    /// A single value, only allowed if the block has exactly one variable. `None` is `UNDEF`.
    Scalar(Option<Term>),
    /// One value per variable. `None` is `UNDEF`.
    Tuple(Vec<Option<Term>>),
}

impl ValuesRow {
    #[inline]
    pub fn scalar(value: impl Into<Term>) -> Self {
        Self::Scalar(Some(value.into()))
    }

    /// Builds a tuple row without `UNDEF` cells.
    #[inline]
    pub fn tuple<T: Into<Term>>(values: impl IntoIterator<Item = T>) -> Self {
        Self::Tuple(values.into_iter().map(|v| Some(v.into())).collect())
    }
}

impl From<Vec<Option<Term>>> for ValuesRow {
    #[inline]
    fn from(values: Vec<Option<Term>>) -> Self {
        Self::Tuple(values)
    }
}

/// A `( COUNT(...) AS ?alias )` projection.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
struct CountAggregate {
    alias: Variable,
    expression: Option<Variable>,
}

impl CountAggregate {
    fn write(&self, distinct: bool, f: &mut String) -> fmt::Result {
        f.push_str("( COUNT(");
        if distinct {
            f.push_str("DISTINCT ");
        }
        match &self.expression {
            Some(var) => write!(f, "{var}")?,
            None => f.push('*'),
        }
        write!(f, ") AS {} )", self.alias)
    }
}

/// An `ORDER BY` condition.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum OrderCondition {
    Variable(Variable),
    /// Written as is, for example `?o DESC`.
    Raw(String),
    Asc(Variable),
    Desc(Variable),
}

impl OrderCondition {
    /// Builds an ascending or descending condition from a direction name (`asc` or `desc`, in any case).
    ///
    /// ```
    /// use sparbuild::OrderCondition;
    /// use sparterm::Variable;
    ///
    /// let o = Variable::new("o")?;
    /// assert_eq!(
    ///     OrderCondition::parse_direction(o.clone(), "DESC")?.to_string(),
    ///     "DESC(?o)"
    /// );
    /// OrderCondition::parse_direction(o, "down").unwrap_err();
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    pub fn parse_direction(variable: Variable, direction: &str) -> Result<Self, ArgumentError> {
        if direction.eq_ignore_ascii_case("asc") {
            Ok(Self::Asc(variable))
        } else if direction.eq_ignore_ascii_case("desc") {
            Ok(Self::Desc(variable))
        } else {
            Err(ArgumentError::msg(format!(
                "The order direction must be asc or desc, found {direction}"
            )))
        }
    }
}

impl fmt::Display for OrderCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(var) => var.fmt(f),
            Self::Raw(condition) => f.write_str(condition),
            Self::Asc(var) => write!(f, "ASC({var})"),
            Self::Desc(var) => write!(f, "DESC({var})"),
        }
    }
}

impl From<Variable> for OrderCondition {
    #[inline]
    fn from(var: Variable) -> Self {
        Self::Variable(var)
    }
}

impl From<&str> for OrderCondition {
    #[inline]
    fn from(condition: &str) -> Self {
        Self::Raw(condition.into())
    }
}

impl From<String> for OrderCondition {
    #[inline]
    fn from(condition: String) -> Self {
        Self::Raw(condition)
    }
}

/// An item of a `WHERE` clause: a pattern or a sub-query.
#[derive(Debug, Clone)]
pub enum WhereItem {
    Pattern(RawPattern),
    Query(Query),
}

impl From<RawPattern> for WhereItem {
    #[inline]
    fn from(pattern: RawPattern) -> Self {
        Self::Pattern(pattern)
    }
}

impl From<TriplePattern> for WhereItem {
    #[inline]
    fn from(pattern: TriplePattern) -> Self {
        Self::Pattern(pattern.into())
    }
}

impl From<Query> for WhereItem {
    #[inline]
    fn from(query: Query) -> Self {
        Self::Query(query)
    }
}

impl<S, P, O> From<(S, P, O)> for WhereItem
where
    (S, P, O): Into<RawPattern>,
{
    #[inline]
    fn from(pattern: (S, P, O)) -> Self {
        Self::Pattern(pattern.into())
    }
}

/// Builds a [`Query`] step by step.
///
/// Every method mutates the builder and returns it for chaining.
/// Methods that validate their input return an [`ArgumentError`] right away.
///
/// ```
/// use sparbuild::{OrderCondition, QueryBuilder};
/// use sparterm::{NamedNode, Variable};
///
/// let [person, name] = ["person", "name"].map(Variable::new_unchecked);
/// let foaf_name = NamedNode::new("http://xmlns.com/foaf/0.1/name")?;
/// let query = QueryBuilder::select([person.clone(), name.clone()])
///     .prefix("foaf: <http://xmlns.com/foaf/0.1/>")?
///     .where_([(person, foaf_name, name.clone())])?
///     .order_by([OrderCondition::Desc(name)])
///     .limit(10)
///     .build();
/// assert_eq!(
///     query.to_string(),
///     "PREFIX foaf: <http://xmlns.com/foaf/0.1/> SELECT ?person ?name WHERE { ?person <http://xmlns.com/foaf/0.1/name> ?name . } ORDER BY DESC(?name) LIMIT 10"
/// );
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    /// Starts an `ASK` query.
    pub fn ask() -> Self {
        Self {
            query: Query::new(QueryForm::Ask),
        }
    }

    /// Starts a `SELECT` query. No variables means `SELECT *`.
    pub fn select(variables: impl IntoIterator<Item = Variable>) -> Self {
        let mut query = Query::new(QueryForm::Select);
        query.projection = variables.into_iter().map(Into::into).collect();
        Self { query }
    }

    /// Starts a `DESCRIBE` query. No terms means `DESCRIBE *`.
    pub fn describe<T: Into<NamedNodePattern>>(terms: impl IntoIterator<Item = T>) -> Self {
        let mut query = Query::new(QueryForm::Describe);
        query.projection = terms.into_iter().map(Into::into).collect();
        Self { query }
    }

    /// Starts a `CONSTRUCT` query with the given template.
    pub fn construct<P: Into<RawPattern>>(
        template: impl IntoIterator<Item = P>,
    ) -> Result<Self, ArgumentError> {
        let mut query = Query::new(QueryForm::Construct);
        query.template = build_patterns(template)?;
        Ok(Self { query })
    }

    /// A builder for nested blocks, of which only the `WHERE` content is used.
    fn block() -> Self {
        Self::select([])
    }

    /// Adds patterns and sub-queries to the `WHERE` clause.
    ///
    /// Sub-queries are written as `{ ... } .` blocks before the patterns.
    pub fn where_<I: Into<WhereItem>>(
        &mut self,
        items: impl IntoIterator<Item = I>,
    ) -> Result<&mut Self, ArgumentError> {
        for item in items {
            match item.into() {
                WhereItem::Pattern(pattern) => self.query.where_.patterns.push(pattern.build()?),
                WhereItem::Query(query) => self.query.where_.subqueries.push(query),
            }
        }
        Ok(self)
    }

    /// Runs `f` on this builder.
    ///
    /// ```
    /// use sparbuild::QueryBuilder;
    /// use sparterm::Variable;
    ///
    /// let [s, p, o] = ["s", "p", "o"].map(Variable::new_unchecked);
    /// let query = QueryBuilder::ask()
    ///     .where_with(|b| b.where_([(s, p, o)]))?
    ///     .build();
    /// assert_eq!(query.to_string(), "ASK WHERE { ?s ?p ?o . }");
    /// # Result::<_, sparbuild::ArgumentError>::Ok(())
    /// ```
    pub fn where_with<F>(&mut self, f: F) -> Result<&mut Self, ArgumentError>
    where
        F: for<'a> FnOnce(&'a mut Self) -> Result<&'a mut Self, ArgumentError>,
    {
        f(self)
    }

    /// Adds an `OPTIONAL` block made of the given patterns.
    pub fn optional<P: Into<RawPattern>>(
        &mut self,
        patterns: impl IntoIterator<Item = P>,
    ) -> Result<&mut Self, ArgumentError> {
        let group = Self::patterns_group(patterns)?;
        self.query.where_.optionals.push(group);
        Ok(self)
    }

    /// Adds an `OPTIONAL` block with the `WHERE` content of `query`.
    pub fn optional_query(&mut self, query: &Query) -> &mut Self {
        self.query.where_.optionals.push(query.where_.clone());
        self
    }

    /// Adds an `OPTIONAL` block filled by `f` on a fresh builder.
    pub fn optional_with<F>(&mut self, f: F) -> Result<&mut Self, ArgumentError>
    where
        F: for<'a> FnOnce(&'a mut Self) -> Result<&'a mut Self, ArgumentError>,
    {
        let group = Self::callback_group(f)?;
        self.query.where_.optionals.push(group);
        Ok(self)
    }

    /// Adds a `UNION` branch made of the given patterns.
    ///
    /// The previous content of the `WHERE` clause becomes the first branch.
    pub fn union<P: Into<RawPattern>>(
        &mut self,
        patterns: impl IntoIterator<Item = P>,
    ) -> Result<&mut Self, ArgumentError> {
        let group = Self::patterns_group(patterns)?;
        self.query.where_.unions.push(group);
        Ok(self)
    }

    pub fn union_query(&mut self, query: &Query) -> &mut Self {
        self.query.where_.unions.push(query.where_.clone());
        self
    }

    pub fn union_with<F>(&mut self, f: F) -> Result<&mut Self, ArgumentError>
    where
        F: for<'a> FnOnce(&'a mut Self) -> Result<&'a mut Self, ArgumentError>,
    {
        let group = Self::callback_group(f)?;
        self.query.where_.unions.push(group);
        Ok(self)
    }

    /// Adds a `MINUS` block made of the given patterns.
    pub fn minus<P: Into<RawPattern>>(
        &mut self,
        patterns: impl IntoIterator<Item = P>,
    ) -> Result<&mut Self, ArgumentError> {
        let group = Self::patterns_group(patterns)?;
        self.query.where_.minuses.push(group);
        Ok(self)
    }

    pub fn minus_query(&mut self, query: &Query) -> &mut Self {
        self.query.where_.minuses.push(query.where_.clone());
        self
    }

    pub fn minus_with<F>(&mut self, f: F) -> Result<&mut Self, ArgumentError>
    where
        F: for<'a> FnOnce(&'a mut Self) -> Result<&'a mut Self, ArgumentError>,
    {
        let group = Self::callback_group(f)?;
        self.query.where_.minuses.push(group);
        Ok(self)
    }

    fn patterns_group<P: Into<RawPattern>>(
        patterns: impl IntoIterator<Item = P>,
    ) -> Result<GroupGraphPattern, ArgumentError> {
        Ok(GroupGraphPattern {
            patterns: build_patterns(patterns)?,
            ..GroupGraphPattern::default()
        })
    }

    fn callback_group<F>(f: F) -> Result<GroupGraphPattern, ArgumentError>
    where
        F: for<'a> FnOnce(&'a mut Self) -> Result<&'a mut Self, ArgumentError>,
    {
        let mut builder = Self::block();
        f(&mut builder)?;
        Ok(builder.query.where_)
    }

    /// Sets the `VALUES` block of the `WHERE` clause, replacing any previous one.
    ///
    /// Only `SELECT` and `DESCRIBE` queries accept it.
    ///
    /// ```
    /// use sparbuild::{QueryBuilder, ValuesRow};
    /// use sparterm::{Term, Variable};
    ///
    /// let [s, p, o] = ["s", "p", "o"].map(Variable::new_unchecked);
    /// let query = QueryBuilder::select([])
    ///     .where_([(s.clone(), p, o.clone())])?
    ///     .values(
    ///         [s, o],
    ///         [
    ///             ValuesRow::tuple(["a", "b"]),
    ///             ValuesRow::Tuple(vec![None, Some(Term::from("c"))]),
    ///         ],
    ///     )?
    ///     .build();
    /// assert_eq!(
    ///     query.to_string(),
    ///     "SELECT * WHERE { ?s ?p ?o . VALUES (?s ?o) { ( \"a\" \"b\" ) ( UNDEF \"c\" ) } }"
    /// );
    /// # Result::<_, sparbuild::ArgumentError>::Ok(())
    /// ```
    pub fn values(
        &mut self,
        variables: impl IntoIterator<Item = Variable>,
        rows: impl IntoIterator<Item = ValuesRow>,
    ) -> Result<&mut Self, ArgumentError> {
        self.check_solution_form("VALUES")?;
        let variables = variables.into_iter().collect::<Vec<_>>();
        if variables.is_empty() {
            return Err(ArgumentError::msg(
                "A VALUES block needs at least one variable",
            ));
        }
        let mut has_scalars = false;
        let mut has_tuples = false;
        let rows = rows
            .into_iter()
            .map(|row| {
                let cells = match row {
                    ValuesRow::Scalar(value) => {
                        if variables.len() != 1 {
                            return Err(ArgumentError::msg(format!(
                                "Scalar VALUES rows are only allowed with a single variable, found {} variables",
                                variables.len()
                            )));
                        }
                        has_scalars = true;
                        vec![value]
                    }
                    ValuesRow::Tuple(values) => {
                        if values.len() != variables.len() {
                            return Err(ArgumentError::msg(format!(
                                "A VALUES row has {} values for {} variables",
                                values.len(),
                                variables.len()
                            )));
                        }
                        has_tuples = true;
                        values
                    }
                };
                if has_scalars && has_tuples {
                    return Err(ArgumentError::msg(
                        "Scalar and tuple VALUES rows can not be mixed",
                    ));
                }
                if let Some(term) = cells
                    .iter()
                    .flatten()
                    .find(|t| t.is_variable() || t.has_blank_nodes())
                {
                    return Err(ArgumentError::msg(format!(
                        "{term} is not allowed in a VALUES block"
                    )));
                }
                Ok(cells)
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.query.where_.values = Some(ValuesBlock { variables, rows });
        Ok(self)
    }

    /// Adds a `( COUNT(expression) AS ?alias )` projection, `COUNT(*)` if there is no expression.
    ///
    /// Only `SELECT` and `DESCRIBE` queries accept it.
    pub fn count(
        &mut self,
        alias: Variable,
        expression: Option<Variable>,
    ) -> Result<&mut Self, ArgumentError> {
        self.check_solution_form("COUNT")?;
        self.query.counts.push(CountAggregate { alias, expression });
        Ok(self)
    }

    fn check_solution_form(&self, what: &str) -> Result<(), ArgumentError> {
        if matches!(self.query.form, QueryForm::Select | QueryForm::Describe) {
            Ok(())
        } else {
            Err(ArgumentError::msg(format!(
                "{what} is only allowed in SELECT and DESCRIBE queries, not in {}",
                self.query.form.keyword()
            )))
        }
    }

    pub fn group_by(&mut self, variables: impl IntoIterator<Item = Variable>) -> &mut Self {
        self.query.group_by.extend(variables);
        self
    }

    pub fn order_by<C: Into<OrderCondition>>(
        &mut self,
        conditions: impl IntoIterator<Item = C>,
    ) -> &mut Self {
        self.query
            .order_by
            .extend(conditions.into_iter().map(Into::into));
        self
    }

    pub fn limit(&mut self, length: usize) -> &mut Self {
        self.query.limit = Some(length);
        self
    }

    pub fn offset(&mut self, start: usize) -> &mut Self {
        self.query.offset = Some(start);
        self
    }

    /// Sets both `OFFSET` and `LIMIT`.
    pub fn slice(&mut self, start: usize, length: usize) -> &mut Self {
        self.offset(start).limit(length)
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.query.distinct = true;
        self
    }

    pub fn reduced(&mut self) -> &mut Self {
        self.query.reduced = true;
        self
    }

    /// Scopes the whole `WHERE` clause to a `GRAPH` block.
    pub fn graph(&mut self, graph: impl Into<NamedNodePattern>) -> &mut Self {
        self.query.where_.graph = Some(graph.into());
        self
    }

    /// Adds a `FROM` dataset clause.
    pub fn from(&mut self, graph: NamedNode) -> &mut Self {
        self.query.from.push(graph);
        self
    }

    /// Declares a prefix written as `name: <iri>`.
    pub fn prefix(&mut self, prefix: &str) -> Result<&mut Self, ArgumentError> {
        let Some((name, iri)) = prefix.split_once(':') else {
            return Err(ArgumentError::msg(format!(
                "A prefix must be written 'name: <iri>', found '{prefix}'"
            )));
        };
        let Some(iri) = iri
            .trim()
            .strip_prefix('<')
            .and_then(|iri| iri.strip_suffix('>'))
        else {
            return Err(ArgumentError::msg(format!(
                "A prefix must be written 'name: <iri>', found '{prefix}'"
            )));
        };
        let iri = NamedNode::new(iri)
            .map_err(|e| ArgumentError::msg(format!("Invalid prefix IRI <{iri}>: {e}")))?;
        self.prefix_iri(name.trim(), &iri)
    }

    /// Declares the prefix `name` for `iri`.
    pub fn prefix_iri(&mut self, name: &str, iri: &NamedNode) -> Result<&mut Self, ArgumentError> {
        if !is_valid_prefix_name(name) {
            return Err(ArgumentError::msg(format!("Invalid prefix name '{name}'")));
        }
        self.query.prefixes.push(format!("{name}: {iri}"));
        Ok(self)
    }

    /// Adds a `FILTER(expression)`. The expression is written as is.
    pub fn filter(&mut self, expression: impl Into<String>) -> &mut Self {
        self.query.where_.filters.push(expression.into());
        self
    }

    pub fn build(&self) -> Query {
        self.query.clone()
    }
}

fn is_valid_prefix_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return true;
    };
    first.is_alphabetic()
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '\u{00B7}'))
        && !name.ends_with('.')
}
