use thiserror::Error;

/// Compile-time errors raised while parsing a rule program, a statement, or
/// a selector expression. A program that fails to compile must not be run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("selector expression must not be empty")]
    EmptyExpression,

    #[error("unterminated string literal: {input}")]
    UnterminatedLiteral { input: String },

    #[error("unexpected text after closing quote in literal: {input}")]
    TrailingAfterLiteral { input: String },

    #[error("empty path segment in selector: {input}")]
    EmptySegment { input: String },

    #[error("invalid element index '{index}' in selector '{input}': {message}")]
    InvalidIndex {
        input: String,
        index: String,
        message: String,
    },

    #[error("metadata reference '@{field}' is only allowed at the end of a path: {input}")]
    FieldNotTerminal { input: String, field: String },

    #[error("empty metadata field name in selector: {input}")]
    EmptyFieldName { input: String },

    #[error("path selector must end in a metadata field reference: {input}")]
    MissingTerminalField { input: String },

    #[error("a string literal cannot be written to: {input}")]
    LiteralDestination { input: String },

    #[error("no known operator in statement: {statement}")]
    UnknownOperator { statement: String },

    #[error(
        "operator '{operator}' takes {min}..={max} source operands, \
         but statement '{statement}' has {found}"
    )]
    ArityViolation {
        statement: String,
        operator: &'static str,
        min: usize,
        max: usize,
        found: usize,
    },

    #[error("missing destination selector in statement: {statement}")]
    MissingSubject { statement: String },
}

/// Runtime faults while applying a single compiled rule to one dataset.
///
/// These are recoverable: the orchestrator records them and moves on to the
/// next rule. A selector that simply finds nothing is `None`, never an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    #[error("path selector is ambiguous: {count} siblings of type '{node_type}' match and no index was given")]
    AmbiguousSegment { node_type: String, count: usize },

    #[error("cannot create structural element for wildcard type '*' under '{parent_type}'")]
    CannotCreateWildcard { parent_type: String },
}
