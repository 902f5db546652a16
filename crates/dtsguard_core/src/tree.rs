use oxc_span::Span;

use crate::trivia::comment_ranges;

/// Index of a node inside its [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The node kinds the public API pipeline cares about. Everything else is
/// [`NodeKind::Syntax`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,
    ClassBody,
    InterfaceBody,
    /// The members of a class or interface body, without the braces
    MemberList,
    Property,
    Accessor,
    CallSignature,
    Constructor,
    ConstructSignature,
    IndexSignature,
    Method,
    /// Type-position dotted name, `a.b.C`
    QualifiedName,
    /// Expression-position dotted name, `a.b.c`
    PropertyAccess,
    Identifier,
    Literal,
    /// Punctuation or keyword that has no AST node of its own
    Token,
    Syntax,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeFlags {
    pub exported: bool,
    pub private: bool,
    pub is_static: bool,
}

#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub(crate) kind: NodeKind,
    pub(crate) span: Span,
    pub(crate) full_start: u32,
    pub(crate) flags: NodeFlags,
    pub(crate) name: Option<String>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
}

impl SyntaxNode {
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Span of the node itself, without leading trivia.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Offset where the node's leading trivia starts.
    pub fn full_start(&self) -> u32 {
        self.full_start
    }

    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    /// Member name for class and interface members.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Immutable syntax tree of one source file.
///
/// Every non-trivia character of the file belongs to exactly one leaf, and a
/// leaf's leading trivia runs from the end of the previous leaf to its start.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    source: String,
    nodes: Vec<SyntaxNode>,
    root: NodeId,
}

impl SyntaxTree {
    pub(crate) fn new(source: String, nodes: Vec<SyntaxNode>, root: NodeId) -> Self {
        Self { source, nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn text(&self, span: Span) -> &str {
        &self.source[span.start as usize..span.end as usize]
    }

    /// Text of the node without its leading trivia.
    pub fn node_text(&self, id: NodeId) -> &str {
        self.text(self.node(id).span)
    }

    /// Comments in the leading trivia of `id`, in source order.
    pub fn leading_comments(&self, id: NodeId) -> Vec<Span> {
        let node = self.node(id);
        comment_ranges(&self.source, node.full_start, node.span.start)
    }

    /// `id` followed by its ancestors up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), |&current| self.node(current).parent)
    }

    /// Leaves under `id` in document order.
    pub fn leaves(&self, id: NodeId) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.node(current);
            if node.is_leaf() {
                leaves.push(current);
            } else {
                stack.extend(node.children.iter().rev());
            }
        }
        leaves
    }

    /// 1-based line and column of a byte offset. Columns count characters.
    pub fn line_col(&self, offset: u32) -> (usize, usize) {
        let offset = (offset as usize).min(self.source.len());
        let before = &self.source[..offset];
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let line = before.matches('\n').count() + 1;
        let column = before[line_start..].chars().count() + 1;
        (line, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(kind: NodeKind, start: u32, end: u32, full_start: u32, parent: usize) -> SyntaxNode {
        SyntaxNode {
            kind,
            span: Span::new(start, end),
            full_start,
            flags: NodeFlags::default(),
            name: None,
            children: vec![],
            parent: Some(NodeId::new(parent)),
        }
    }

    fn sample() -> SyntaxTree {
        let source = "/* a */ foo\n  bar".to_string();
        let nodes = vec![
            leaf(NodeKind::Identifier, 8, 11, 0, 2),
            leaf(NodeKind::Identifier, 14, 17, 11, 2),
            SyntaxNode {
                kind: NodeKind::Program,
                span: Span::new(0, 17),
                full_start: 0,
                flags: NodeFlags::default(),
                name: None,
                children: vec![NodeId::new(0), NodeId::new(1)],
                parent: None,
            },
        ];
        SyntaxTree::new(source, nodes, NodeId::new(2))
    }

    #[test]
    fn test_leading_comments() {
        let tree = sample();
        let comments = tree.leading_comments(NodeId::new(0));
        assert_eq!(comments, vec![Span::new(0, 7)]);
        assert!(tree.leading_comments(NodeId::new(1)).is_empty());
    }

    #[test]
    fn test_ancestors_and_leaves() {
        let tree = sample();
        let ancestors: Vec<_> = tree.ancestors(NodeId::new(1)).collect();
        assert_eq!(ancestors, vec![NodeId::new(1), NodeId::new(2)]);
        assert_eq!(tree.leaves(tree.root()), vec![NodeId::new(0), NodeId::new(1)]);
        assert_eq!(tree.node_text(NodeId::new(1)), "bar");
    }

    #[test]
    fn test_line_col() {
        let tree = sample();
        assert_eq!(tree.line_col(0), (1, 1));
        assert_eq!(tree.line_col(8), (1, 9));
        assert_eq!(tree.line_col(14), (2, 3));
    }
}
