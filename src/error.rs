use graphql_parser::Pos;
use thiserror::Error;

/// Failure while parsing the GraphQL schema document.
#[derive(Debug, Error)]
pub enum SchemaParseError {
    #[error("schema is not valid GraphQL SDL: {0}")]
    InvalidDocument(#[from] graphql_parser::schema::ParseError),
}

/// Failure while parsing the GraphQL operation document.
#[derive(Debug, Error)]
pub enum QueryParseError {
    #[error("query is not valid GraphQL: {0}")]
    InvalidDocument(#[from] graphql_parser::query::ParseError),

    #[error("document contains no query operation")]
    NoOperation,

    #[error("fragment cycle detected: {}", .cycle.join(" -> "))]
    FragmentCycle { cycle: Vec<String> },

    #[error("fragment spread references undefined fragment `{0}`")]
    FragmentUndefined(String),

    #[error(
        "unsupported {kind} value for argument `{name}` at {}:{}",
        .position.line,
        .position.column
    )]
    UnsupportedArgument {
        name: String,
        kind: &'static str,
        position: Pos,
    },
}

/// Any failure surfaced by [`compile`](crate::compile).
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to parse schema: {0}")]
    Schema(#[from] SchemaParseError),

    #[error("failed to parse query: {0}")]
    Query(#[from] QueryParseError),
}
