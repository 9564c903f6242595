//! Compiles one textual statement into a [`Rule`].
//!
//! A statement has the form `<destination> <operator> <source...>`. The
//! factory locates the operator token (longest candidate first, skipping
//! quoted literals), splits subject from objects, enforces the variant's
//! operand arity, and delegates selector parsing to the selector types.

use crate::rules::kinds::{Rule, COPY_IF_ABSENT_OPERATOR, OVERWRITE_OR_CREATE_OPERATOR};
use crate::selector::{DataSelector, SyntaxError, WritableSelector};

const LITERAL_QUOTE: char = '"';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleKind {
    OverwriteOrCreate,
    CopyIfAbsent,
}

impl RuleKind {
    /// Candidates in scan order, longest operator first, so that `""=` is
    /// never mis-tokenized as `=` preceded by an empty literal.
    const SCAN_ORDER: [RuleKind; 2] = [RuleKind::CopyIfAbsent, RuleKind::OverwriteOrCreate];

    fn operator(self) -> &'static str {
        match self {
            RuleKind::OverwriteOrCreate => OVERWRITE_OR_CREATE_OPERATOR,
            RuleKind::CopyIfAbsent => COPY_IF_ABSENT_OPERATOR,
        }
    }

    fn min_objects(self) -> usize {
        match self {
            RuleKind::OverwriteOrCreate | RuleKind::CopyIfAbsent => 1,
        }
    }

    fn max_objects(self) -> usize {
        match self {
            RuleKind::OverwriteOrCreate | RuleKind::CopyIfAbsent => 1,
        }
    }
}

/// Compile a single trimmed statement into a rule.
pub fn compile_statement(statement: &str) -> Result<Rule, SyntaxError> {
    let statement = statement.trim();
    let Some((kind, position)) = find_operator(statement) else {
        return Err(SyntaxError::UnknownOperator {
            statement: statement.to_string(),
        });
    };

    let subject = statement[..position].trim();
    if subject.is_empty() {
        return Err(SyntaxError::MissingSubject {
            statement: statement.to_string(),
        });
    }
    let objects = split_objects(statement[position + kind.operator().len()..].trim());

    let (min, max) = (kind.min_objects(), kind.max_objects());
    if objects.len() < min || objects.len() > max {
        return Err(SyntaxError::ArityViolation {
            statement: statement.to_string(),
            operator: kind.operator(),
            min,
            max,
            found: objects.len(),
        });
    }

    let destination = WritableSelector::parse(subject)?;
    // Both current variants take exactly one operand; the arity check above
    // guarantees the index.
    let source = DataSelector::parse(objects[0])?;

    Ok(match kind {
        RuleKind::OverwriteOrCreate => Rule::OverwriteOrCreate {
            destination,
            source,
        },
        RuleKind::CopyIfAbsent => Rule::CopyIfAbsent {
            destination,
            source,
        },
    })
}

/// Locate the leftmost operator occurrence outside quoted literals.
fn find_operator(statement: &str) -> Option<(RuleKind, usize)> {
    let mut in_literal = false;
    for (position, ch) in statement.char_indices() {
        if !in_literal {
            for kind in RuleKind::SCAN_ORDER {
                if statement[position..].starts_with(kind.operator()) {
                    return Some((kind, position));
                }
            }
        }
        if ch == LITERAL_QUOTE {
            in_literal = !in_literal;
        }
    }
    None
}

/// Split the object substring into whitespace-separated operand expressions,
/// keeping quoted literals (and any whitespace inside them) intact.
fn split_objects(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = None;
    let mut in_literal = false;
    for (position, ch) in text.char_indices() {
        if ch == LITERAL_QUOTE {
            in_literal = !in_literal;
        }
        if ch.is_whitespace() && !in_literal {
            if let Some(token_start) = start.take() {
                tokens.push(&text[token_start..position]);
            }
        } else if start.is_none() {
            start = Some(position);
        }
    }
    if let Some(token_start) = start {
        tokens.push(&text[token_start..]);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_overwrite_statement() {
        let rule = compile_statement("/@Foo = /@Bar").unwrap();
        assert!(matches!(rule, Rule::OverwriteOrCreate { .. }));
    }

    #[test]
    fn compile_copy_if_absent_statement() {
        let rule = compile_statement("/@Foo \"\"= /@Bar").unwrap();
        assert!(matches!(rule, Rule::CopyIfAbsent { .. }));
    }

    #[test]
    fn longest_operator_wins() {
        // `""=` contains `=`; the scan must not split at the shorter token.
        let rule = compile_statement("/TitleDocMain@Title \"\"= \"untitled\"").unwrap();
        assert!(matches!(rule, Rule::CopyIfAbsent { .. }));
        assert_eq!(
            rule.to_string(),
            "/TitleDocMain@Title \"\"= \"untitled\""
        );
    }

    #[test]
    fn operator_inside_literal_is_ignored() {
        let rule = compile_statement("/@Foo = \"a = b\"").unwrap();
        assert_eq!(rule.to_string(), "/@Foo = \"a = b\"");
    }

    #[test]
    fn reject_unknown_operator() {
        let err = compile_statement("/@Foo ?? /@Bar").unwrap_err();
        assert!(matches!(err, SyntaxError::UnknownOperator { .. }));
    }

    #[test]
    fn reject_missing_subject() {
        let err = compile_statement("= /@Bar").unwrap_err();
        assert!(matches!(err, SyntaxError::MissingSubject { .. }));
    }

    #[test]
    fn reject_too_many_objects() {
        let err = compile_statement("/@Foo = /@Bar /@Baz").unwrap_err();
        assert!(matches!(
            err,
            SyntaxError::ArityViolation {
                min: 1,
                max: 1,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn reject_missing_objects() {
        let err = compile_statement("/@Foo =").unwrap_err();
        assert!(matches!(err, SyntaxError::ArityViolation { found: 0, .. }));
    }

    #[test]
    fn subject_syntax_errors_surface_at_compile_time() {
        let err = compile_statement("/Chapter = /@Bar").unwrap_err();
        assert!(matches!(err, SyntaxError::MissingTerminalField { .. }));
    }

    #[test]
    fn object_syntax_errors_surface_at_compile_time() {
        let err = compile_statement("/@Foo = /Chapter[x]@Bar").unwrap_err();
        assert!(matches!(err, SyntaxError::InvalidIndex { .. }));
    }

    #[test]
    fn split_objects_respects_literals() {
        assert_eq!(split_objects("\"a b\" /@Foo"), vec!["\"a b\"", "/@Foo"]);
        assert_eq!(split_objects(""), Vec::<&str>::new());
    }
}
