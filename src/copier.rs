//! Program orchestration: compile a rule program once, apply it to one
//! working dataset at a time with per-rule fault isolation.

use crate::document::StructureNode;
use crate::rules::{compile_statement, Rule};
use crate::selector::SyntaxError;
use std::fmt;

const STATEMENT_SEPARATOR: char = ';';

/// The working dataset of one `process` call: the mutable structure tree
/// plus a human-readable identifier used only for diagnostics.
///
/// Owned by the caller and never retained by the engine.
#[derive(Debug)]
pub struct CopierData<'a> {
    root: &'a mut StructureNode,
    identifier: String,
}

impl<'a> CopierData<'a> {
    pub fn new(root: &'a mut StructureNode, identifier: impl Into<String>) -> Self {
        Self {
            root,
            identifier: identifier.into(),
        }
    }

    pub fn root(&self) -> &StructureNode {
        self.root
    }

    pub fn root_mut(&mut self) -> &mut StructureNode {
        self.root
    }

    /// Diagnostic identifier, e.g. a process title.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

/// Outcome of applying one rule to one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    /// The source yielded a value and the rule's write policy ran.
    Applied { rule: String },
    /// The source selector found nothing; the rule was a silent no-op.
    NothingToCopy { rule: String },
    /// A runtime fault; the rule was skipped, later rules still ran.
    Failed { rule: String, reason: String },
}

impl RuleOutcome {
    pub fn rule(&self) -> &str {
        match self {
            RuleOutcome::Applied { rule }
            | RuleOutcome::NothingToCopy { rule }
            | RuleOutcome::Failed { rule, .. } => rule,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, RuleOutcome::Failed { .. })
    }
}

impl fmt::Display for RuleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleOutcome::Applied { rule } => write!(f, "applied: {rule}"),
            RuleOutcome::NothingToCopy { rule } => write!(f, "nothing to copy: {rule}"),
            RuleOutcome::Failed { rule, reason } => write!(f, "failed: {rule} ({reason})"),
        }
    }
}

/// Per-dataset diagnostic sink: one [`RuleOutcome`] per rule, in program
/// order, tagged with the dataset's identifier. Replaces a global logging
/// side channel so callers and tests can observe rule failures directly.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "ProcessReport should be checked for failed rules"]
pub struct ProcessReport {
    identifier: String,
    outcomes: Vec<RuleOutcome>,
}

impl ProcessReport {
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn outcomes(&self) -> &[RuleOutcome] {
        &self.outcomes
    }

    pub fn failures(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(RuleOutcome::is_failure)
    }

    pub fn applied_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RuleOutcome::Applied { .. }))
            .count()
    }
}

impl fmt::Display for ProcessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            writeln!(f, "[{}] {outcome}", self.identifier)?;
        }
        Ok(())
    }
}

/// A compiled rule program: an ordered list of rules built from one textual
/// rule-definition string.
///
/// Compilation is fail-fast: any malformed statement rejects the whole
/// program. A compiled copier is immutable and may be shared across threads
/// and applied to many distinct datasets; rules are applied strictly in
/// declared order because a later rule's source may depend on an earlier
/// rule's write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataCopier {
    rules: Vec<Rule>,
}

impl DataCopier {
    /// Compile a `;`-separated rule program. Empty statements are ignored.
    pub fn new(program: &str) -> Result<Self, SyntaxError> {
        let mut rules = Vec::new();
        for statement in program.split(STATEMENT_SEPARATOR) {
            let statement = statement.trim();
            if statement.is_empty() {
                continue;
            }
            rules.push(compile_statement(statement)?);
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Apply every rule, in declared order, to one working dataset.
    ///
    /// A runtime fault in one rule is recorded in the report and the
    /// remaining rules still run; no rule failure is ever fatal to the
    /// enclosing batch.
    pub fn process(&self, data: &mut CopierData<'_>) -> ProcessReport {
        let mut outcomes = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            let outcome = match rule.apply(data) {
                Ok(true) => RuleOutcome::Applied {
                    rule: rule.to_string(),
                },
                Ok(false) => RuleOutcome::NothingToCopy {
                    rule: rule.to_string(),
                },
                Err(fault) => RuleOutcome::Failed {
                    rule: rule.to_string(),
                    reason: fault.to_string(),
                },
            };
            outcomes.push(outcome);
        }
        ProcessReport {
            identifier: data.identifier().to_string(),
            outcomes,
        }
    }
}

impl fmt::Display for DataCopier {
    /// Canonical rule-list form, for diagnostics.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for rule in &self.rules {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{rule}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_statements_are_ignored() {
        let copier = DataCopier::new("; /@Foo = /@Bar ;;").unwrap();
        assert_eq!(copier.rules().len(), 1);
    }

    #[test]
    fn compilation_is_fail_fast() {
        let err = DataCopier::new("/@Foo = /@Bar; /@Foo ?? /@Bar").unwrap_err();
        assert!(matches!(err, SyntaxError::UnknownOperator { .. }));
    }

    #[test]
    fn display_renders_canonical_program() {
        let copier = DataCopier::new("  /@Foo =   /@Bar ;/@Baz \"\"= \"x\"").unwrap();
        assert_eq!(copier.to_string(), "/@Foo = /@Bar; /@Baz \"\"= \"x\"");
    }

    #[test]
    fn rules_run_in_declared_order() {
        // The second rule reads what the first one wrote.
        let mut root = StructureNode::new("Monograph");
        root.set_metadata("A", "value");
        let copier = DataCopier::new("/@B = /@A; /@C = /@B").unwrap();
        let mut data = CopierData::new(&mut root, "p");
        let report = copier.process(&mut data);
        assert!(!report.has_failures());
        assert_eq!(report.applied_count(), 2);
        assert_eq!(root.metadata("C"), Some("value"));
    }

    #[test]
    fn report_carries_identifier_and_rule_text() {
        let mut root = StructureNode::new("Monograph");
        root.add_child("Chapter");
        root.add_child("Chapter");
        let copier = DataCopier::new("/Chapter@Foo = \"x\"").unwrap();
        let mut data = CopierData::new(&mut root, "Process 42");
        let report = copier.process(&mut data);
        assert_eq!(report.identifier(), "Process 42");
        let failure = report.failures().next().unwrap();
        assert_eq!(failure.rule(), "/Chapter@Foo = \"x\"");
        assert!(report.to_string().contains("[Process 42]"));
    }
}
