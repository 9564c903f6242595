use crate::document::StructureNode;
use crate::selector::errors::{ApplyError, SyntaxError};
use std::fmt;

/// Structure type name matching any child type.
pub const ANY_TYPE: &str = "*";

const PATH_SEPARATOR: char = '/';
const FIELD_MARKER: char = '@';
const WILDCARD_SYMBOL: &str = "*";
const LAST_CHILD_SYMBOL: &str = ">";

/// Sibling quantifier of one path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentIndex {
    /// `[n]`: the n-th matching sibling, 0-based.
    Position(usize),
    /// `[*]`: the first matching sibling in document order.
    Wildcard,
    /// `[>]`: the last matching sibling in document order.
    Last,
}

impl fmt::Display for SegmentIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentIndex::Position(n) => write!(f, "{n}"),
            SegmentIndex::Wildcard => f.write_str(WILDCARD_SYMBOL),
            SegmentIndex::Last => f.write_str(LAST_CHILD_SYMBOL),
        }
    }
}

/// One structural step of a path expression: a type name with an optional
/// sibling quantifier, e.g. `Chapter`, `Chapter[2]`, `*[>]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    node_type: String,
    index: Option<SegmentIndex>,
}

impl PathSegment {
    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    pub fn index(&self) -> Option<SegmentIndex> {
        self.index
    }

    fn matches(&self, child: &StructureNode) -> bool {
        self.node_type == ANY_TYPE || self.node_type == child.node_type()
    }

    /// Resolve this segment against a parent node, returning the position of
    /// the selected child in `parent.children()`, or `None` if no child is
    /// selected (absent sibling, out-of-range index).
    ///
    /// A segment without a quantifier selects a sole match; several matches
    /// without a quantifier are ambiguous and fault at runtime.
    pub fn resolve(&self, parent: &StructureNode) -> Result<Option<usize>, ApplyError> {
        let matches: Vec<usize> = parent
            .children()
            .iter()
            .enumerate()
            .filter(|(_, child)| self.matches(child))
            .map(|(position, _)| position)
            .collect();

        let selected = match self.index {
            None => match matches.len() {
                0 => None,
                1 => Some(matches[0]),
                count => {
                    return Err(ApplyError::AmbiguousSegment {
                        node_type: self.node_type.clone(),
                        count,
                    })
                }
            },
            Some(SegmentIndex::Position(n)) => matches.get(n).copied(),
            Some(SegmentIndex::Wildcard) => matches.first().copied(),
            Some(SegmentIndex::Last) => matches.last().copied(),
        };
        Ok(selected)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.node_type)?;
        if let Some(index) = self.index {
            write!(f, "[{index}]")?;
        }
        Ok(())
    }
}

/// A parsed path expression into the structure tree: zero or more structural
/// segments plus a terminal metadata field name.
///
/// The grammar is `/`-separated segments with the field reference bound
/// directly after the last segment: `/@Foo`, `/Chapter[0]@Title`,
/// `/*[*]@Foo`. A missing leading `/` anchors at the root all the same.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorPath {
    segments: Vec<PathSegment>,
    field: String,
}

impl SelectorPath {
    /// Parse a path expression. The terminal `@field` reference is required;
    /// a purely structural path addresses no readable or writable value.
    pub fn parse(input: &str) -> Result<Self, SyntaxError> {
        if input.is_empty() {
            return Err(SyntaxError::EmptyExpression);
        }

        let mut segments = Vec::new();
        let mut field = None;
        let mut current = String::new();
        let body = input.strip_prefix(PATH_SEPARATOR).unwrap_or(input);

        let mut chars = body.chars();
        while let Some(ch) = chars.next() {
            match ch {
                PATH_SEPARATOR => {
                    segments.push(parse_segment(&current, input)?);
                    current.clear();
                }
                FIELD_MARKER => {
                    if !current.is_empty() {
                        segments.push(parse_segment(&current, input)?);
                        current.clear();
                    }
                    let name: String = chars.collect();
                    if name.is_empty() {
                        return Err(SyntaxError::EmptyFieldName {
                            input: input.to_string(),
                        });
                    }
                    if name.contains(PATH_SEPARATOR) || name.contains(FIELD_MARKER) {
                        return Err(SyntaxError::FieldNotTerminal {
                            input: input.to_string(),
                            field: name,
                        });
                    }
                    field = Some(name);
                    break;
                }
                other => current.push(other),
            }
        }

        let Some(field) = field else {
            return Err(SyntaxError::MissingTerminalField {
                input: input.to_string(),
            });
        };
        Ok(Self { segments, field })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Name of the terminal metadata field this path addresses.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Walk the structural segments from `root` down, without creating
    /// anything. `None` when any segment fails to resolve.
    pub fn resolve_node<'a>(
        &self,
        root: &'a StructureNode,
    ) -> Result<Option<&'a StructureNode>, ApplyError> {
        let mut node = root;
        for segment in &self.segments {
            match segment.resolve(node)? {
                Some(position) => node = &node.children()[position],
                None => return Ok(None),
            }
        }
        Ok(Some(node))
    }
}

impl fmt::Display for SelectorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "{PATH_SEPARATOR}{segment}")?;
        }
        if self.segments.is_empty() {
            f.write_str("/")?;
        }
        write!(f, "{FIELD_MARKER}{}", self.field)
    }
}

fn parse_segment(text: &str, input: &str) -> Result<PathSegment, SyntaxError> {
    if text.is_empty() {
        return Err(SyntaxError::EmptySegment {
            input: input.to_string(),
        });
    }

    let Some(open) = text.find('[') else {
        return Ok(PathSegment {
            node_type: text.to_string(),
            index: None,
        });
    };

    let Some(inner) = text[open..].strip_prefix('[').and_then(|s| s.strip_suffix(']')) else {
        return Err(SyntaxError::InvalidIndex {
            input: input.to_string(),
            index: text[open..].to_string(),
            message: "expected a closing ']' at the end of the segment".to_string(),
        });
    };
    let node_type = &text[..open];
    if node_type.is_empty() {
        return Err(SyntaxError::EmptySegment {
            input: input.to_string(),
        });
    }

    let index = match inner {
        WILDCARD_SYMBOL => SegmentIndex::Wildcard,
        LAST_CHILD_SYMBOL => SegmentIndex::Last,
        number => match number.parse::<usize>() {
            Ok(position) => SegmentIndex::Position(position),
            Err(_) => {
                return Err(SyntaxError::InvalidIndex {
                    input: input.to_string(),
                    index: number.to_string(),
                    message: "index must be a non-negative integer, '*' or '>'".to_string(),
                })
            }
        },
    };

    Ok(PathSegment {
        node_type: node_type.to_string(),
        index: Some(index),
    })
}
