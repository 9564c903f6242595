use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One node of a logical document structure tree.
///
/// The real document model lives in an external metadata library; this tree
/// carries exactly the capability the copy-rule engine consumes: a type name,
/// named metadata fields, and ordered children. It serializes to/from JSON so
/// rule programs can be exercised against fixture documents and from the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureNode {
    /// Structure type name, e.g. "Monograph" or "Chapter".
    #[serde(rename = "type")]
    node_type: String,
    /// Metadata fields attached to this node. One value per field name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    metadata: BTreeMap<String, String>,
    /// Child nodes in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<StructureNode>,
}

impl StructureNode {
    /// Create an empty node of the given structure type.
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            metadata: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    /// Value of the named metadata field, if one is set.
    pub fn metadata(&self, field: &str) -> Option<&str> {
        self.metadata.get(field).map(String::as_str)
    }

    pub fn has_metadata(&self, field: &str) -> bool {
        self.metadata.contains_key(field)
    }

    /// Set the named field, replacing any existing value.
    pub fn set_metadata(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(field.into(), value.into());
    }

    pub fn children(&self) -> &[StructureNode] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [StructureNode] {
        &mut self.children
    }

    /// Append a new child of the given type and return a reference to it.
    pub fn add_child(&mut self, node_type: impl Into<String>) -> &mut StructureNode {
        self.push_child(StructureNode::new(node_type))
    }

    /// Append an already-built child node.
    pub fn push_child(&mut self, child: StructureNode) -> &mut StructureNode {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }
}
