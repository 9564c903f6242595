//! Metadata Copier: rule-driven metadata propagation for digitization
//! workflows.
//!
//! A tiny domain-specific language lets operators declare, as short textual
//! statements, how metadata values are derived or propagated across a
//! hierarchical document structure tree during process creation or import:
//!
//! ```text
//! /@TitleDocMain ""= "untitled"; /Chapter[0]@Author = /@Author
//! ```
//!
//! # Architecture
//!
//! A program compiles once ([`DataCopier::new`], fail-fast on any syntax
//! error) into an ordered list of [`Rule`]s, each binding a destination
//! [`WritableSelector`] to a source [`DataSelector`] under a write policy
//! (`=` overwrite-or-create, `""=` copy-if-absent). [`DataCopier::process`]
//! applies the rules strictly in declared order to one [`CopierData`]
//! dataset; per-rule runtime faults are captured in the [`ProcessReport`]
//! and never abort the rest of the program.
//!
//! # Outcome channels
//!
//! - A source that finds nothing is `Option::None`, the normal "nothing to
//!   copy" case, not an error.
//! - Malformed programs fail compilation with [`SyntaxError`].
//! - Runtime faults while applying one rule ([`ApplyError`]) are isolated
//!   per rule and reported, never propagated.
//!
//! # Example
//!
//! ```
//! use metadata_copier::{CopierData, DataCopier, StructureNode};
//!
//! let mut root = StructureNode::new("Monograph");
//! root.set_metadata("Bar", "X");
//!
//! let copier = DataCopier::new("/@Foo = /@Bar").unwrap();
//! let mut data = CopierData::new(&mut root, "demo process");
//! let report = copier.process(&mut data);
//!
//! assert!(!report.has_failures());
//! assert_eq!(root.metadata("Foo"), Some("X"));
//! ```

pub mod copier;
pub mod document;
pub mod rules;
pub mod selector;

// Re-exports
pub use copier::{CopierData, DataCopier, ProcessReport, RuleOutcome};
pub use document::StructureNode;
pub use rules::{compile_statement, Rule};
pub use selector::{
    ApplyError, DataSelector, SegmentIndex, SelectorPath, SyntaxError, WritableSelector,
};
