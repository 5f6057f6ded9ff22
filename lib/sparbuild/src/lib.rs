#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod error;
mod path;
mod pattern;
mod query;
mod serializer;
pub mod update;

pub use crate::error::{ArgumentError, UpdateError};
pub use crate::path::{PathToken, PropertyPathExpression};
pub use crate::pattern::{
    NamedNodePattern, Predicate, RawPattern, RawPredicate, TriplePattern, build_patterns,
};
pub use crate::query::{
    OrderCondition, Query, QueryBuilder, QueryForm, ValuesRow, WhereItem,
};
