use dtsguard_core::{NodeId, NodeKind, SourceFile, SyntaxTree};
use log::trace;

use crate::{
    config::Options,
    error::{PublicApiError, Result},
};

/// Rank of each member kind in a rendered class or interface body.
const MEMBER_ORDER: &[(NodeKind, u8)] = &[
    (NodeKind::Property, 0),
    (NodeKind::Accessor, 0),
    (NodeKind::CallSignature, 1),
    (NodeKind::Constructor, 2),
    (NodeKind::ConstructSignature, 2),
    (NodeKind::IndexSignature, 3),
    (NodeKind::Method, 4),
];

fn member_rank(kind: NodeKind) -> Option<u8> {
    MEMBER_ORDER.iter().find(|(k, _)| *k == kind).map(|(_, rank)| *rank)
}

/// Produces the canonical text of a subtree of one file.
pub struct Sanitizer<'a> {
    file: &'a SourceFile,
    options: &'a Options,
}

impl<'a> Sanitizer<'a> {
    pub fn new(file: &'a SourceFile, options: &'a Options) -> Self {
        Self { file, options }
    }

    fn tree(&self) -> &'a SyntaxTree {
        self.file.tree()
    }

    pub fn sanitize(&self, id: NodeId) -> Result<String> {
        let mut out = String::new();
        self.write(id, &mut out)?;
        Ok(out)
    }

    fn write(&self, id: NodeId, out: &mut String) -> Result<()> {
        let tree = self.tree();
        let node = tree.node(id);

        if node.flags().private {
            trace!("Pruning private node {:?}", node.name());
            return Ok(());
        }
        if matches!(node.kind(), NodeKind::QualifiedName | NodeKind::PropertyAccess) {
            self.check_qualifier(id)?;
        }
        if node.is_leaf() {
            out.push_str(self.leaf_text(id));
            return Ok(());
        }
        for child in self.render_order(id) {
            self.write(child, out)?;
        }
        Ok(())
    }

    /// Source text of a leaf, without the comments of its leading trivia.
    fn leaf_text(&self, id: NodeId) -> &'a str {
        let tree = self.tree();
        let node = tree.node(id);
        let start = tree
            .leading_comments(id)
            .last()
            .map_or(node.full_start(), |comment| comment.end.max(node.full_start()));
        &tree.source()[start as usize..node.span().end as usize]
    }

    fn check_qualifier(&self, id: NodeId) -> Result<()> {
        let tree = self.tree();
        let mut current = id;
        while matches!(tree.node(current).kind(), NodeKind::QualifiedName | NodeKind::PropertyAccess) {
            match tree.node(current).children().first() {
                Some(&first) => current = first,
                None => return Ok(()),
            }
        }
        let leftmost = tree.node(current);
        if leftmost.kind() != NodeKind::Identifier {
            return Ok(());
        }
        let identifier = tree.node_text(current);
        if self.options.is_allowed_module_identifier(identifier) {
            return Ok(());
        }
        let (line, column) = tree.line_col(leftmost.span().start);
        Err(PublicApiError::UnlistedModuleIdentifier {
            identifier: identifier.to_string(),
            file: self.file.path().to_path_buf(),
            line,
            column,
        })
    }

    /// Children in the order they are rendered. Member lists whose members
    /// all have a known kind are sorted, everything else keeps source order.
    fn render_order(&self, id: NodeId) -> Vec<NodeId> {
        let tree = self.tree();
        let node = tree.node(id);
        let mut children = node.children().to_vec();
        if node.kind() != NodeKind::MemberList {
            return children;
        }
        if children.iter().any(|&c| member_rank(tree.node(c).kind()).is_none()) {
            trace!("Keeping source order of a member list with unranked members");
            return children;
        }
        children.sort_by_key(|&c| {
            let member = tree.node(c);
            (!member.flags().is_static, member_rank(member.kind()), member.name().unwrap_or_default())
        });
        children
    }
}
