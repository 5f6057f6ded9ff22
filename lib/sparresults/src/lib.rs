#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod csv;
mod decode;
mod error;
mod format;
mod json;
mod reader;
mod solution;
mod xml;

pub use crate::csv::{read_csv_results, read_tsv_results};
pub use crate::decode::{ResultsDecoder, read_boolean_result};
pub use crate::error::DecodeError;
pub use crate::format::ResultFormat;
pub use crate::json::read_json_results;
pub use crate::reader::{NTriplesReader, RdfReader, RdfReaderRegistry};
pub use crate::solution::{Iter, QueryResults, QuerySolution, SolutionSet, VariableSolutionIndex};
pub use crate::xml::{XmlEngine, read_xml_results};
