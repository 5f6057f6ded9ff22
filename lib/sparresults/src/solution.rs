//! Definition of [`QuerySolution`], [`SolutionSet`] and [`QueryResults`].

use sparterm::{Graph, Term, Variable};
use std::fmt;
use std::iter::Zip;
use std::ops::Index;
use std::sync::Arc;

/// Tuple associating variables and terms that are the result of a SPARQL query.
///
/// It is the equivalent of a row in SQL.
///
/// ```
/// use sparresults::QuerySolution;
/// use sparterm::{Literal, Term, Variable};
///
/// let solution = QuerySolution::from((
///     vec![Variable::new("foo")?, Variable::new("bar")?],
///     vec![Some(Literal::from(1).into()), None],
/// ));
/// assert_eq!(solution.get("foo"), Some(&Term::from(Literal::from(1)))); // Get the value of the variable ?foo if it exists (here yes).
/// assert_eq!(solution.get(1), None); // Get the value of the second column if it exists (here no).
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Clone)]
pub struct QuerySolution {
    variables: Arc<[Variable]>,
    values: Vec<Option<Term>>,
}

impl QuerySolution {
    /// Returns a value for a given position in the tuple ([`usize`]) or a given variable name ([`&str`](str) or [`Variable`]).
    #[inline]
    pub fn get(&self, index: impl VariableSolutionIndex) -> Option<&Term> {
        self.values.get(index.index(self)?).and_then(Option::as_ref)
    }

    /// The number of variables which could be bound.
    ///
    /// It is also the number of columns in the solutions table.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Is there any variable bound in the table?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// Returns an iterator over bound variables.
    ///
    /// ```
    /// use sparresults::QuerySolution;
    /// use sparterm::{Literal, Term, Variable};
    ///
    /// let solution = QuerySolution::from((
    ///     vec![Variable::new("foo")?, Variable::new("bar")?],
    ///     vec![Some(Literal::from(1).into()), None],
    /// ));
    /// assert_eq!(
    ///     solution.iter().collect::<Vec<_>>(),
    ///     vec![(&Variable::new("foo")?, &Term::from(Literal::from(1)))]
    /// );
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        self.into_iter()
    }

    /// Returns the ordered slice of variable values.
    #[inline]
    pub fn values(&self) -> &[Option<Term>] {
        &self.values
    }

    /// Returns the ordered slice of the solution variables, bound or not.
    #[inline]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }
}

impl<V: Into<Arc<[Variable]>>, S: Into<Vec<Option<Term>>>> From<(V, S)> for QuerySolution {
    #[inline]
    fn from((v, s): (V, S)) -> Self {
        Self {
            variables: v.into(),
            values: s.into(),
        }
    }
}

impl<'a> IntoIterator for &'a QuerySolution {
    type Item = (&'a Variable, &'a Term);
    type IntoIter = Iter<'a>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        Iter {
            inner: self.variables.iter().zip(&self.values),
        }
    }
}

impl Index<usize> for QuerySolution {
    type Output = Term;

    #[expect(clippy::panic)]
    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        self.get(index)
            .unwrap_or_else(|| panic!("The column {index} is not set in this solution"))
    }
}

impl Index<&str> for QuerySolution {
    type Output = Term;

    #[expect(clippy::panic)]
    #[inline]
    fn index(&self, index: &str) -> &Self::Output {
        self.get(index)
            .unwrap_or_else(|| panic!("The variable ?{index} is not set in this solution"))
    }
}

impl Index<&Variable> for QuerySolution {
    type Output = Term;

    #[inline]
    fn index(&self, index: &Variable) -> &Self::Output {
        self.index(index.as_str())
    }
}

impl PartialEq for QuerySolution {
    fn eq(&self, other: &Self) -> bool {
        self.iter().all(|(k, v)| other.get(k) == Some(v))
            && other.iter().all(|(k, v)| self.get(k) == Some(v))
    }
}

impl Eq for QuerySolution {}

impl fmt::Debug for QuerySolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// An iterator over [`QuerySolution`] bound variables.
pub struct Iter<'a> {
    inner: Zip<std::slice::Iter<'a, Variable>, std::slice::Iter<'a, Option<Term>>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a Variable, &'a Term);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        for (variable, value) in &mut self.inner {
            if let Some(value) = value {
                return Some((variable, value));
            }
        }
        None
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.inner.size_hint().1)
    }
}

/// A utility trait to get values for a given variable or tuple position.
///
/// See [`QuerySolution::get`].
pub trait VariableSolutionIndex {
    fn index(self, solution: &QuerySolution) -> Option<usize>;
}

impl VariableSolutionIndex for usize {
    #[inline]
    fn index(self, _: &QuerySolution) -> Option<usize> {
        Some(self)
    }
}

impl VariableSolutionIndex for &str {
    #[inline]
    fn index(self, solution: &QuerySolution) -> Option<usize> {
        solution.variables.iter().position(|v| v.as_str() == self)
    }
}

impl VariableSolutionIndex for &Variable {
    #[inline]
    fn index(self, solution: &QuerySolution) -> Option<usize> {
        VariableSolutionIndex::index(self.as_str(), solution)
    }
}

impl VariableSolutionIndex for Variable {
    #[inline]
    fn index(self, solution: &QuerySolution) -> Option<usize> {
        VariableSolutionIndex::index(self.as_str(), solution)
    }
}

/// The ordered solutions of a `SELECT` query together with the variables declared by the response.
///
/// Declared variables may be unbound in every row. Rows keep the order of the response document.
///
/// ```
/// use sparresults::SolutionSet;
/// use sparterm::{NamedNode, Variable};
///
/// let set = SolutionSet::new(
///     vec![Variable::new("s")?, Variable::new("o")?],
///     vec![vec![Some(NamedNode::new("http://example.com/a")?.into())]],
/// );
/// assert_eq!(set.len(), 1);
/// assert_eq!(set.solutions()[0].values().len(), 2);
/// assert_eq!(set.solutions()[0].get("o"), None);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SolutionSet {
    variables: Arc<[Variable]>,
    solutions: Vec<QuerySolution>,
}

impl SolutionSet {
    /// Builds a set from the declared variables and rows of values in the variables order.
    ///
    /// Short rows are padded with unbound values.
    pub fn new(variables: Vec<Variable>, rows: Vec<Vec<Option<Term>>>) -> Self {
        let variables: Arc<[Variable]> = variables.into();
        let solutions = rows
            .into_iter()
            .map(|mut values| {
                values.resize(variables.len(), None);
                QuerySolution {
                    variables: Arc::clone(&variables),
                    values,
                }
            })
            .collect();
        Self {
            variables,
            solutions,
        }
    }

    #[inline]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    #[inline]
    pub fn solutions(&self) -> &[QuerySolution] {
        &self.solutions
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, QuerySolution> {
        self.solutions.iter()
    }
}

impl<'a> IntoIterator for &'a SolutionSet {
    type Item = &'a QuerySolution;
    type IntoIter = std::slice::Iter<'a, QuerySolution>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for SolutionSet {
    type Item = QuerySolution;
    type IntoIter = std::vec::IntoIter<QuerySolution>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.solutions.into_iter()
    }
}

/// A decoded SPARQL endpoint response.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum QueryResults {
    /// Result of an `ASK` query.
    Boolean(bool),
    /// Results of a `SELECT` query.
    Solutions(SolutionSet),
    /// Statements returned by a `CONSTRUCT` or `DESCRIBE` query.
    Graph(Graph),
}

impl QueryResults {
    /// The boolean value of an `ASK` response, or whether there is at least one solution or triple.
    ///
    /// ```
    /// use sparresults::{QueryResults, SolutionSet};
    /// use sparterm::Graph;
    ///
    /// assert!(QueryResults::Boolean(true).is_true());
    /// assert!(!QueryResults::Solutions(SolutionSet::new(Vec::new(), Vec::new())).is_true());
    /// assert!(!QueryResults::Graph(Graph::new()).is_true());
    /// ```
    pub fn is_true(&self) -> bool {
        match self {
            Self::Boolean(value) => *value,
            Self::Solutions(solutions) => !solutions.is_empty(),
            Self::Graph(graph) => !graph.is_empty(),
        }
    }
}

impl From<bool> for QueryResults {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<SolutionSet> for QueryResults {
    #[inline]
    fn from(solutions: SolutionSet) -> Self {
        Self::Solutions(solutions)
    }
}

impl From<Graph> for QueryResults {
    #[inline]
    fn from(graph: Graph) -> Self {
        Self::Graph(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparterm::Literal;

    #[test]
    fn equality_ignores_column_order() {
        let a = Variable::new_unchecked("a");
        let b = Variable::new_unchecked("b");
        let first = QuerySolution::from((
            vec![a.clone(), b.clone()],
            vec![Some(Literal::from(1).into()), None],
        ));
        let second = QuerySolution::from((vec![b, a], vec![None, Some(Literal::from(1).into())]));
        assert_eq!(first, second);
    }

    #[test]
    fn rows_are_padded() {
        let set = SolutionSet::new(
            vec![Variable::new_unchecked("a"), Variable::new_unchecked("b")],
            vec![Vec::new(), vec![Some(Literal::from(true).into())]],
        );
        assert_eq!(set.len(), 2);
        assert!(set.solutions()[0].is_empty());
        assert_eq!(
            set.solutions()[1].values(),
            &[Some(Term::from(Literal::from(true))), None]
        );
        assert_eq!(set.solutions()[1]["a"], Term::from(Literal::from(true)));
    }
}
