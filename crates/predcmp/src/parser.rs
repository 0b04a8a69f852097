use predcmp_core::ast::ExprNode;
use std::error::Error as StdError;

///
/// FilterParser
///
/// Seam for the query-language front end. predcmp never tokenizes filter
/// source itself; an implementation turns source text into the generic
/// expression AST and reports its own failures.
///

pub trait FilterParser {
    type Error: StdError;

    fn parse(&self, source: &str) -> Result<ExprNode, Self::Error>;
}

///
/// JsonParser
///
/// Reads filters that were already parsed elsewhere and serialized as a
/// JSON expression tree (the groq-js AST shape).
///

#[derive(Clone, Copy, Debug, Default)]
pub struct JsonParser;

impl FilterParser for JsonParser {
    type Error = serde_json::Error;

    fn parse(&self, source: &str) -> Result<ExprNode, Self::Error> {
        ExprNode::from_json(source)
    }
}
