//! Parsing of ticket descriptions into work requests.

mod parser;
mod types;

pub use parser::parse_request;
pub use types::{RequestConfig, RequestKind, WorkRequest};
