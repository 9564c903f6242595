use crate::copier::CopierData;
use crate::selector::{ApplyError, DataSelector, WritableSelector};
use std::fmt;

/// Operator token of the unconditional overwrite-or-create rule.
pub const OVERWRITE_OR_CREATE_OPERATOR: &str = "=";

/// Operator token of the copy-if-absent rule. The leading empty-literal
/// marker keeps it from being mis-tokenized as `=`.
pub const COPY_IF_ABSENT_OPERATOR: &str = "\"\"=";

/// A compiled copy rule: one statement binding a destination selector to a
/// source selector under a specific write policy.
///
/// Rules form a closed set matched exhaustively in [`Rule::apply`]; a new
/// behavior is added as a new variant plus a new operator token, never by
/// open-ended dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// `=`: copy the source value, creating missing destination structure
    /// and replacing any existing destination value.
    OverwriteOrCreate {
        destination: WritableSelector,
        source: DataSelector,
    },
    /// `""=`: copy the source value only into an existing structural path
    /// whose terminal field holds no value yet.
    CopyIfAbsent {
        destination: WritableSelector,
        source: DataSelector,
    },
}

impl Rule {
    /// The operator token this rule renders with.
    pub fn operator(&self) -> &'static str {
        match self {
            Rule::OverwriteOrCreate { .. } => OVERWRITE_OR_CREATE_OPERATOR,
            Rule::CopyIfAbsent { .. } => COPY_IF_ABSENT_OPERATOR,
        }
    }

    /// Apply this rule to one working dataset.
    ///
    /// `Ok(true)` when the source yielded a value and the write policy ran;
    /// `Ok(false)` when the source had nothing to copy (a silent no-op).
    pub fn apply(&self, data: &mut CopierData<'_>) -> Result<bool, ApplyError> {
        match self {
            Rule::OverwriteOrCreate {
                destination,
                source,
            } => match source.evaluate(data)? {
                Some(value) => {
                    destination.create_or_overwrite(data, &value)?;
                    Ok(true)
                }
                None => Ok(false),
            },
            Rule::CopyIfAbsent {
                destination,
                source,
            } => match source.evaluate(data)? {
                Some(value) => {
                    destination.create_if_path_exists_only(data, &value)?;
                    Ok(true)
                }
                None => Ok(false),
            },
        }
    }
}

impl fmt::Display for Rule {
    /// Canonical statement form: `<destination> <operator> <source>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (Rule::OverwriteOrCreate {
            destination,
            source,
        }
        | Rule::CopyIfAbsent {
            destination,
            source,
        }) = self;
        write!(f, "{destination} {} {source}", self.operator())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::StructureNode;
    use crate::rules::compile_statement;

    #[test]
    fn overwrite_rule_copies_value() {
        let mut root = StructureNode::new("Monograph");
        root.set_metadata("Bar", "X");
        let mut data = CopierData::new(&mut root, "p");
        let rule = compile_statement("/@Foo = /@Bar").unwrap();
        assert!(rule.apply(&mut data).unwrap());
        assert_eq!(root.metadata("Foo"), Some("X"));
    }

    #[test]
    fn overwrite_rule_replaces_existing_value() {
        let mut root = StructureNode::new("Monograph");
        root.set_metadata("Foo", "Y");
        root.set_metadata("Bar", "X");
        let mut data = CopierData::new(&mut root, "p");
        let rule = compile_statement("/@Foo = /@Bar").unwrap();
        rule.apply(&mut data).unwrap();
        assert_eq!(root.metadata("Foo"), Some("X"));
    }

    #[test]
    fn absent_source_is_a_silent_noop() {
        let mut root = StructureNode::new("Monograph");
        let mut data = CopierData::new(&mut root, "p");
        for statement in ["/@Foo = /@Missing", "/@Foo \"\"= /@Missing"] {
            let rule = compile_statement(statement).unwrap();
            assert!(!rule.apply(&mut data).unwrap());
        }
        assert_eq!(root.metadata("Foo"), None);
    }

    #[test]
    fn copy_if_absent_rule_never_overwrites() {
        let mut root = StructureNode::new("Monograph");
        root.set_metadata("Foo", "V1");
        root.set_metadata("Bar", "V2");
        let mut data = CopierData::new(&mut root, "p");
        let rule = compile_statement("/@Foo \"\"= /@Bar").unwrap();
        rule.apply(&mut data).unwrap();
        assert_eq!(root.metadata("Foo"), Some("V1"));
    }

    #[test]
    fn display_renders_canonical_statement() {
        let rule = compile_statement("  /@Foo   =  \"constant\" ").unwrap();
        assert_eq!(rule.to_string(), "/@Foo = \"constant\"");
        let rule = compile_statement("/*[0]@Foo \"\"= /@Bar").unwrap();
        assert_eq!(rule.to_string(), "/*[0]@Foo \"\"= /@Bar");
    }
}
