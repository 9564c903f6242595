use crate::copier::CopierData;
use crate::selector::errors::{ApplyError, SyntaxError};
use crate::selector::path::SelectorPath;
use std::fmt;

const LITERAL_QUOTE: char = '"';

/// A readable source expression: either a quoted string literal or a path
/// into the structure tree ending in a metadata field reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSelector {
    Literal(String),
    Path(SelectorPath),
}

impl DataSelector {
    /// Parse a source expression. An expression wrapped in `"` quotes is a
    /// literal; anything else is parsed as a path.
    pub fn parse(expression: &str) -> Result<Self, SyntaxError> {
        if expression.is_empty() {
            return Err(SyntaxError::EmptyExpression);
        }

        let Some(rest) = expression.strip_prefix(LITERAL_QUOTE) else {
            return Ok(DataSelector::Path(SelectorPath::parse(expression)?));
        };

        let Some(close) = rest.find(LITERAL_QUOTE) else {
            return Err(SyntaxError::UnterminatedLiteral {
                input: expression.to_string(),
            });
        };
        if close + 1 != rest.len() {
            return Err(SyntaxError::TrailingAfterLiteral {
                input: expression.to_string(),
            });
        }
        Ok(DataSelector::Literal(rest[..close].to_string()))
    }

    /// Evaluate this selector against one working dataset.
    ///
    /// `Ok(None)` is the normal "nothing to copy" outcome: some part of the
    /// path, or the terminal field, is absent. Runtime faults (an ambiguous
    /// unindexed segment) surface as `ApplyError`.
    pub fn evaluate(&self, data: &CopierData<'_>) -> Result<Option<String>, ApplyError> {
        match self {
            DataSelector::Literal(text) => Ok(Some(text.clone())),
            DataSelector::Path(path) => match path.resolve_node(data.root())? {
                Some(node) => Ok(node.metadata(path.field()).map(str::to_string)),
                None => Ok(None),
            },
        }
    }
}

impl fmt::Display for DataSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSelector::Literal(text) => write!(f, "{LITERAL_QUOTE}{text}{LITERAL_QUOTE}"),
            DataSelector::Path(path) => write!(f, "{path}"),
        }
    }
}
