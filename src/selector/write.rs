use crate::copier::CopierData;
use crate::selector::errors::{ApplyError, SyntaxError};
use crate::selector::path::{SelectorPath, ANY_TYPE};
use std::fmt;

/// A destination expression: a path whose terminal metadata field reference
/// is mandatory. Writable selectors may fabricate missing structure on
/// `create_or_overwrite`, and mutate the structure tree in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritableSelector {
    path: SelectorPath,
}

impl WritableSelector {
    pub fn parse(expression: &str) -> Result<Self, SyntaxError> {
        if expression.starts_with('"') {
            return Err(SyntaxError::LiteralDestination {
                input: expression.to_string(),
            });
        }
        Ok(Self {
            path: SelectorPath::parse(expression)?,
        })
    }

    /// Navigate to the terminal node, appending a missing child of the
    /// declared segment type along the way, then set the terminal field,
    /// replacing any existing value.
    ///
    /// A wildcard type segment gives no creation template, so a missing node
    /// at such a segment is a runtime fault.
    pub fn create_or_overwrite(
        &self,
        data: &mut CopierData<'_>,
        value: &str,
    ) -> Result<(), ApplyError> {
        let mut node = data.root_mut();
        for segment in self.path.segments() {
            let position = match segment.resolve(node)? {
                Some(position) => position,
                None => {
                    if segment.node_type() == ANY_TYPE {
                        return Err(ApplyError::CannotCreateWildcard {
                            parent_type: node.node_type().to_string(),
                        });
                    }
                    node.add_child(segment.node_type());
                    node.children().len() - 1
                }
            };
            node = &mut node.children_mut()[position];
        }
        node.set_metadata(self.path.field(), value);
        Ok(())
    }

    /// Navigate to the terminal node without creating anything; set the
    /// terminal field only when the full structural path already exists and
    /// the field holds no value yet. Never overwrites, never fabricates.
    pub fn create_if_path_exists_only(
        &self,
        data: &mut CopierData<'_>,
        value: &str,
    ) -> Result<(), ApplyError> {
        let mut node = data.root_mut();
        for segment in self.path.segments() {
            match segment.resolve(node)? {
                Some(position) => node = &mut node.children_mut()[position],
                None => return Ok(()),
            }
        }
        if !node.has_metadata(self.path.field()) {
            node.set_metadata(self.path.field(), value);
        }
        Ok(())
    }
}

impl fmt::Display for WritableSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::StructureNode;

    #[test]
    fn reject_destination_without_field() {
        let err = WritableSelector::parse("/Chapter[0]").unwrap_err();
        assert!(matches!(err, SyntaxError::MissingTerminalField { .. }));
    }

    #[test]
    fn reject_literal_destination() {
        let err = WritableSelector::parse("\"text\"").unwrap_err();
        assert!(matches!(err, SyntaxError::LiteralDestination { .. }));
    }

    #[test]
    fn overwrite_existing_root_field() {
        let mut root = StructureNode::new("Monograph");
        root.set_metadata("Foo", "old");
        let mut data = CopierData::new(&mut root, "p");
        let selector = WritableSelector::parse("/@Foo").unwrap();
        selector.create_or_overwrite(&mut data, "new").unwrap();
        assert_eq!(root.metadata("Foo"), Some("new"));
    }

    #[test]
    fn create_missing_intermediate_nodes() {
        let mut root = StructureNode::new("Monograph");
        let mut data = CopierData::new(&mut root, "p");
        let selector = WritableSelector::parse("/Chapter/Page@Foo").unwrap();
        selector.create_or_overwrite(&mut data, "X").unwrap();

        let chapter = &root.children()[0];
        assert_eq!(chapter.node_type(), "Chapter");
        let page = &chapter.children()[0];
        assert_eq!(page.node_type(), "Page");
        assert_eq!(page.metadata("Foo"), Some("X"));
    }

    #[test]
    fn create_reuses_existing_nodes() {
        let mut root = StructureNode::new("Monograph");
        root.add_child("Chapter").set_metadata("Title", "kept");
        let mut data = CopierData::new(&mut root, "p");
        let selector = WritableSelector::parse("/Chapter@Foo").unwrap();
        selector.create_or_overwrite(&mut data, "X").unwrap();

        assert_eq!(root.children().len(), 1);
        assert_eq!(root.children()[0].metadata("Title"), Some("kept"));
        assert_eq!(root.children()[0].metadata("Foo"), Some("X"));
    }

    #[test]
    fn cannot_fabricate_wildcard_segment() {
        let mut root = StructureNode::new("Monograph");
        let mut data = CopierData::new(&mut root, "p");
        let selector = WritableSelector::parse("/*@Foo").unwrap();
        let err = selector.create_or_overwrite(&mut data, "X").unwrap_err();
        assert!(matches!(err, ApplyError::CannotCreateWildcard { .. }));
        assert!(root.children().is_empty());
    }

    #[test]
    fn if_path_exists_only_fills_gap() {
        let mut root = StructureNode::new("Monograph");
        root.add_child("Chapter");
        let mut data = CopierData::new(&mut root, "p");
        let selector = WritableSelector::parse("/Chapter@Foo").unwrap();
        selector.create_if_path_exists_only(&mut data, "X").unwrap();
        assert_eq!(root.children()[0].metadata("Foo"), Some("X"));
    }

    #[test]
    fn if_path_exists_only_never_overwrites() {
        let mut root = StructureNode::new("Monograph");
        root.set_metadata("Foo", "V1");
        let mut data = CopierData::new(&mut root, "p");
        let selector = WritableSelector::parse("/@Foo").unwrap();
        selector.create_if_path_exists_only(&mut data, "V2").unwrap();
        assert_eq!(root.metadata("Foo"), Some("V1"));
    }

    #[test]
    fn if_path_exists_only_never_fabricates() {
        let mut root = StructureNode::new("Monograph");
        let mut data = CopierData::new(&mut root, "p");
        let selector = WritableSelector::parse("/Chapter@Foo").unwrap();
        selector.create_if_path_exists_only(&mut data, "X").unwrap();
        assert!(root.children().is_empty());
    }
}
