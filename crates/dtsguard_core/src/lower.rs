//! Lowering of the oxc AST into a [`SyntaxTree`].
//!
//! The builder hooks `enter_node`/`leave_node` of the oxc visitor, so every
//! AST node with an [`AstKind`] becomes a tree node. The text between AST
//! children is split into token leaves, which makes the tree cover the whole
//! source the way a full-fidelity syntax tree does.

use std::{cmp::Reverse, collections::HashMap, mem};

use log::{debug, trace};
use oxc_ast::{
    AstKind,
    ast::{ExportDefaultDeclarationKind, MethodDefinitionKind, PropertyKey, TSAccessibility, TSMethodSignatureKind},
};
use oxc_ast_visit::Visit;
use oxc_span::{GetSpan, Span};

use crate::{
    tree::{NodeFlags, NodeId, NodeKind, SyntaxNode, SyntaxTree},
    trivia,
};

struct Frame {
    kind: NodeKind,
    span: Span,
    flags: NodeFlags,
    name: Option<String>,
    atomic: bool,
    children: Vec<NodeId>,
}

enum Part {
    Token(Span),
    Node(NodeId),
}

pub(crate) struct TreeBuilder<'s> {
    source: &'s str,
    nodes: Vec<SyntaxNode>,
    stack: Vec<Frame>,
    top: Vec<NodeId>,
    declarations: HashMap<Span, NodeId>,
}

impl<'s> TreeBuilder<'s> {
    pub(crate) fn new(source: &'s str) -> Self {
        Self { source, nodes: Vec::new(), stack: Vec::new(), top: Vec::new(), declarations: HashMap::new() }
    }

    /// Finishes the tree. The returned map goes from the span of each
    /// declaration-like AST node to its tree node.
    pub(crate) fn finish(mut self) -> (SyntaxTree, HashMap<Span, NodeId>) {
        let program = match self.top.as_slice() {
            [only] if self.nodes[only.index()].kind == NodeKind::Program => Some(*only),
            _ => None,
        };
        let root = match program {
            Some(root) => root,
            None => {
                let children = mem::take(&mut self.top);
                let span = Span::new(0, self.source.len() as u32);
                self.build(Frame {
                    kind: NodeKind::Program,
                    span,
                    flags: NodeFlags::default(),
                    name: None,
                    atomic: false,
                    children,
                })
            }
        };
        let root = self.compact(root);
        self.assign_full_starts(root);
        trace!("Lowered {} nodes", self.nodes.len());
        (SyntaxTree::new(self.source.to_string(), self.nodes, root), self.declarations)
    }

    /// Removes nodes that are not reachable from `root`, keeping arena order.
    fn compact(&mut self, root: NodeId) -> NodeId {
        let mut reachable = vec![false; self.nodes.len()];
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            reachable[id.index()] = true;
            stack.extend(self.nodes[id.index()].children.iter().copied());
        }

        let mut remap: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        let mut nodes = Vec::new();
        for (index, node) in mem::take(&mut self.nodes).into_iter().enumerate() {
            if reachable[index] {
                remap[index] = Some(NodeId::new(nodes.len()));
                nodes.push(node);
            }
        }
        if nodes.len() < remap.len() {
            debug!("Discarded {} unreachable nodes", remap.len() - nodes.len());
        }
        for node in &mut nodes {
            node.children = node.children.iter().filter_map(|c| remap[c.index()]).collect();
            node.parent = node.parent.and_then(|p| remap[p.index()]);
        }
        self.declarations = mem::take(&mut self.declarations)
            .into_iter()
            .filter_map(|(span, id)| remap[id.index()].map(|id| (span, id)))
            .collect();
        self.nodes = nodes;
        remap[root.index()].unwrap_or(root)
    }

    fn assign_full_starts(&mut self, root: NodeId) {
        let mut cursor = 0;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = &mut self.nodes[id.index()];
            if node.children.is_empty() {
                node.full_start = cursor.min(node.span.start);
                cursor = node.span.end;
            } else {
                stack.extend(node.children.iter().rev());
            }
        }
        // children always precede their parent in the arena
        for index in 0..self.nodes.len() {
            if let Some(first) = self.nodes[index].children.first().copied() {
                self.nodes[index].full_start = self.nodes[first.index()].full_start;
            }
        }
    }

    fn span_of(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    fn push(&mut self, node: SyntaxNode) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        for child in &node.children {
            self.nodes[child.index()].parent = Some(id);
        }
        self.nodes.push(node);
        id
    }

    fn push_token(&mut self, span: Span) -> NodeId {
        self.push(leaf(NodeKind::Token, span, NodeFlags::default(), None))
    }

    fn tokens(&self, start: u32, end: u32) -> Vec<Span> {
        if start >= end {
            return Vec::new();
        }
        trivia::tokens(self.source, start, end)
    }

    fn build(&mut self, frame: Frame) -> NodeId {
        let Frame { kind, span, flags, name, atomic, mut children } = frame;

        children.sort_by_key(|c| {
            let s = self.span_of(*c);
            (s.start, Reverse(s.end))
        });
        let mut cursor = span.start;
        children.retain(|c| {
            let s = self.nodes[c.index()].span;
            let keep = s.start < s.end && s.start >= cursor && s.end <= span.end;
            if keep {
                cursor = s.end;
            } else if s.start < s.end {
                let child = self.nodes[c.index()].kind;
                debug!("Dropping {:?} at {:?}, it overlaps a sibling inside {:?} {:?}", child, s, kind, span);
            }
            keep
        });

        if atomic && children.is_empty() {
            return self.push(leaf(kind, span, flags, name));
        }

        let parts = if matches!(kind, NodeKind::ClassBody | NodeKind::InterfaceBody) && !children.is_empty() {
            self.member_body(span, children)
        } else {
            let mut parts = Vec::new();
            let mut cursor = span.start;
            for child in children {
                let s = self.span_of(child);
                parts.extend(self.tokens(cursor, s.start).into_iter().map(Part::Token));
                parts.push(Part::Node(child));
                cursor = s.end;
            }
            parts.extend(self.tokens(cursor, span.end).into_iter().map(Part::Token));
            parts
        };

        match parts.as_slice() {
            [] => return self.push(leaf(kind, span, flags, name)),
            [Part::Token(only)] if *only == span => return self.push(leaf(kind, span, flags, name)),
            _ => {}
        }

        let children = parts
            .into_iter()
            .map(|part| match part {
                Part::Token(s) => self.push_token(s),
                Part::Node(id) => id,
            })
            .collect();
        self.push(SyntaxNode { kind, span, full_start: span.start, flags, name, children, parent: None })
    }

    /// Lays out a class or interface body as `{`, a member list, `}`.
    ///
    /// Tokens between members (`;`, `,`) are appended to the preceding member
    /// so the member list holds nothing but members.
    fn member_body(&mut self, span: Span, members: Vec<NodeId>) -> Vec<Part> {
        let first = self.span_of(members[0]);
        let mut parts: Vec<Part> = self.tokens(span.start, first.start).into_iter().map(Part::Token).collect();
        let mut closing = Vec::new();

        for (i, member) in members.iter().enumerate() {
            let gap_start = self.span_of(*member).end;
            let trailing = match members.get(i + 1) {
                Some(next) => self.tokens(gap_start, self.span_of(*next).start),
                None => {
                    let mut trailing = self.tokens(gap_start, span.end);
                    closing.extend(trailing.pop());
                    trailing
                }
            };
            self.append_tokens(*member, trailing);
        }

        let list_span = Span::new(first.start, self.span_of(members[members.len() - 1]).end);
        let list = self.push(SyntaxNode {
            kind: NodeKind::MemberList,
            span: list_span,
            full_start: list_span.start,
            flags: NodeFlags::default(),
            name: None,
            children: members,
            parent: None,
        });
        parts.push(Part::Node(list));
        parts.extend(closing.into_iter().map(Part::Token));
        parts
    }

    fn append_tokens(&mut self, id: NodeId, spans: Vec<Span>) {
        let Some(last) = spans.last().copied() else {
            return;
        };
        if self.nodes[id.index()].children.is_empty() {
            let own = self.span_of(id);
            let token = self.push_token(own);
            self.nodes[id.index()].children.push(token);
            self.nodes[token.index()].parent = Some(id);
        }
        for span in spans {
            let token = self.push_token(span);
            self.nodes[id.index()].children.push(token);
            self.nodes[token.index()].parent = Some(id);
        }
        self.nodes[id.index()].span.end = last.end;
    }

    /// Narrows an identifier span to the name itself. Binding identifiers
    /// of typed declarations otherwise span their type annotation too.
    fn name_span(&self, span: Span, name: &str) -> Span {
        let end = span.start as usize + name.len();
        if end < span.end as usize && self.source.get(span.start as usize..end) == Some(name) {
            Span::new(span.start, end as u32)
        } else {
            span
        }
    }

    fn member_name(&self, key: &PropertyKey<'_>, computed: bool) -> Option<String> {
        let span = key.span();
        let text = self.source.get(span.start as usize..span.end as usize)?;
        Some(if computed { format!("[{text}]") } else { text.to_string() })
    }

    fn frame_for(&self, ast: &AstKind<'_>) -> Frame {
        let mut frame = Frame {
            kind: NodeKind::Syntax,
            span: ast.span(),
            flags: NodeFlags::default(),
            name: None,
            atomic: false,
            children: Vec::new(),
        };
        let flags = &mut frame.flags;

        match ast {
            AstKind::Program(_) => frame.kind = NodeKind::Program,
            AstKind::ExportNamedDeclaration(decl) => flags.exported = decl.declaration.is_some(),
            AstKind::ExportDefaultDeclaration(decl) => {
                flags.exported = matches!(
                    decl.declaration,
                    ExportDefaultDeclarationKind::FunctionDeclaration(_)
                        | ExportDefaultDeclarationKind::ClassDeclaration(_)
                        | ExportDefaultDeclarationKind::TSInterfaceDeclaration(_)
                );
            }
            AstKind::ClassBody(_) => frame.kind = NodeKind::ClassBody,
            AstKind::TSInterfaceBody(_) => frame.kind = NodeKind::InterfaceBody,
            AstKind::PropertyDefinition(prop) => {
                frame.kind = NodeKind::Property;
                flags.is_static = prop.r#static;
                flags.private = matches!(prop.accessibility, Some(TSAccessibility::Private));
                frame.name = self.member_name(&prop.key, prop.computed);
            }
            AstKind::AccessorProperty(prop) => {
                frame.kind = NodeKind::Accessor;
                flags.is_static = prop.r#static;
                flags.private = matches!(prop.accessibility, Some(TSAccessibility::Private));
                frame.name = self.member_name(&prop.key, prop.computed);
            }
            AstKind::MethodDefinition(method) => {
                frame.kind = match method.kind {
                    MethodDefinitionKind::Constructor => NodeKind::Constructor,
                    MethodDefinitionKind::Get | MethodDefinitionKind::Set => NodeKind::Accessor,
                    MethodDefinitionKind::Method => NodeKind::Method,
                };
                flags.is_static = method.r#static;
                flags.private = matches!(method.accessibility, Some(TSAccessibility::Private));
                frame.name = self.member_name(&method.key, method.computed);
            }
            AstKind::TSPropertySignature(sig) => {
                frame.kind = NodeKind::Property;
                frame.name = self.member_name(&sig.key, sig.computed);
            }
            AstKind::TSMethodSignature(sig) => {
                frame.kind = match sig.kind {
                    TSMethodSignatureKind::Get | TSMethodSignatureKind::Set => NodeKind::Accessor,
                    TSMethodSignatureKind::Method => NodeKind::Method,
                };
                frame.name = self.member_name(&sig.key, sig.computed);
            }
            AstKind::TSCallSignatureDeclaration(_) => frame.kind = NodeKind::CallSignature,
            AstKind::TSConstructSignatureDeclaration(_) => frame.kind = NodeKind::ConstructSignature,
            AstKind::TSIndexSignature(sig) => {
                frame.kind = NodeKind::IndexSignature;
                flags.is_static = sig.r#static;
            }
            AstKind::TSQualifiedName(_) => frame.kind = NodeKind::QualifiedName,
            AstKind::StaticMemberExpression(_) => frame.kind = NodeKind::PropertyAccess,
            AstKind::IdentifierReference(ident) => {
                frame.kind = NodeKind::Identifier;
                frame.span = self.name_span(frame.span, &ident.name);
                frame.atomic = true;
            }
            AstKind::IdentifierName(ident) => {
                frame.kind = NodeKind::Identifier;
                frame.span = self.name_span(frame.span, &ident.name);
                frame.atomic = true;
            }
            AstKind::BindingIdentifier(ident) => {
                frame.kind = NodeKind::Identifier;
                frame.span = self.name_span(frame.span, &ident.name);
                frame.atomic = true;
            }
            AstKind::PrivateIdentifier(_) => {
                frame.kind = NodeKind::Identifier;
                frame.atomic = true;
            }
            AstKind::StringLiteral(_)
            | AstKind::NumericLiteral(_)
            | AstKind::BigIntLiteral(_)
            | AstKind::BooleanLiteral(_)
            | AstKind::NullLiteral(_)
            | AstKind::RegExpLiteral(_)
            | AstKind::TemplateElement(_) => {
                frame.kind = NodeKind::Literal;
                frame.atomic = true;
            }
            _ => {}
        }
        frame
    }
}

/// AST nodes that the symbol table refers to by span.
fn is_declaration(ast: &AstKind<'_>) -> bool {
    matches!(
        ast,
        AstKind::Class(_)
            | AstKind::Function(_)
            | AstKind::VariableDeclarator(_)
            | AstKind::TSInterfaceDeclaration(_)
            | AstKind::TSTypeAliasDeclaration(_)
            | AstKind::TSEnumDeclaration(_)
            | AstKind::TSModuleDeclaration(_)
            | AstKind::ExportSpecifier(_)
            | AstKind::ImportSpecifier(_)
            | AstKind::ImportDefaultSpecifier(_)
            | AstKind::ImportNamespaceSpecifier(_)
    )
}

fn leaf(kind: NodeKind, span: Span, flags: NodeFlags, name: Option<String>) -> SyntaxNode {
    SyntaxNode { kind, span, full_start: span.start, flags, name, children: Vec::new(), parent: None }
}

impl<'a> Visit<'a> for TreeBuilder<'_> {
    fn enter_node(&mut self, kind: AstKind<'a>) {
        let frame = self.frame_for(&kind);
        self.stack.push(frame);
    }

    fn leave_node(&mut self, kind: AstKind<'a>) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let id = self.build(frame);
        if is_declaration(&kind) {
            self.declarations.insert(kind.span(), id);
        }
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(id),
            None => self.top.push(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parser::parse_declaration_file, program::FileId};
    use std::path::Path;

    fn parse(source: &str) -> SyntaxTree {
        parse_declaration_file(FileId::default(), Path::new("/test.d.ts"), source).unwrap().tree
    }

    /// Nodes of `kind` reachable from the root, in document order.
    fn find(tree: &SyntaxTree, kind: NodeKind) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![tree.root()];
        while let Some(id) = stack.pop() {
            let node = tree.node(id);
            if node.kind() == kind {
                found.push(id);
            }
            stack.extend(node.children().iter().rev());
        }
        found
    }

    #[test]
    fn test_leaves_cover_source() {
        let source = "/** doc */\nexport declare class A<T> extends B implements C {\n    // note\n    private x;\n    static y: number;\n    m(a: string, ...rest: T[]): void;\n}\nexport interface I { a: 'x' | \"y\"; b?: number, [k: string]: unknown }\n";
        let tree = parse(source);
        let rebuilt: String = tree
            .leaves(tree.root())
            .into_iter()
            .map(|id| {
                let node = tree.node(id);
                &source[node.full_start() as usize..node.span().end as usize]
            })
            .collect();
        assert_eq!(rebuilt, source.trim_end());
    }

    #[test]
    fn test_class_members_live_in_member_list() {
        let tree = parse("export declare class W {\n    zeta(): void;\n    alpha: string;\n    constructor();\n}\n");
        let bodies = find(&tree, NodeKind::ClassBody);
        assert_eq!(bodies.len(), 1);

        let body = tree.node(bodies[0]);
        let kinds: Vec<NodeKind> = body.children().iter().map(|c| tree.node(*c).kind()).collect();
        assert_eq!(kinds, vec![NodeKind::Token, NodeKind::MemberList, NodeKind::Token]);

        let list = tree.node(body.children()[1]);
        let members: Vec<(NodeKind, Option<&str>)> =
            list.children().iter().map(|c| (tree.node(*c).kind(), tree.node(*c).name())).collect();
        assert_eq!(
            members,
            vec![
                (NodeKind::Method, Some("zeta")),
                (NodeKind::Property, Some("alpha")),
                (NodeKind::Constructor, Some("constructor")),
            ]
        );
        let last = tree.node(list.children()[2]).span();
        assert!(tree.source()[..last.end as usize].ends_with("constructor();"));
    }

    #[test]
    fn test_interface_members() {
        let tree = parse("export interface I {\n    (): void;\n    new (): I;\n    [key: string]: any;\n    get v(): number;\n    m(): void;\n}\n");
        let list = find(&tree, NodeKind::MemberList);
        assert_eq!(list.len(), 1);
        let kinds: Vec<NodeKind> = tree.node(list[0]).children().iter().map(|c| tree.node(*c).kind()).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::CallSignature,
                NodeKind::ConstructSignature,
                NodeKind::IndexSignature,
                NodeKind::Accessor,
                NodeKind::Method,
            ]
        );
    }

    #[test]
    fn test_member_flags() {
        let tree = parse("export declare class A {\n    private a;\n    static b: number;\n    protected c: string;\n}\n");
        let props = find(&tree, NodeKind::Property);
        let flags: Vec<(Option<&str>, bool, bool)> = props
            .iter()
            .map(|p| (tree.node(*p).name(), tree.node(*p).flags().private, tree.node(*p).flags().is_static))
            .collect();
        assert_eq!(flags, vec![(Some("a"), true, false), (Some("b"), false, true), (Some("c"), false, false)]);
    }

    #[test]
    fn test_export_flags() {
        let tree = parse("declare const a: number;\nexport { a };\nexport declare const b: number;\n");
        let program = tree.node(tree.root());
        let exported: Vec<bool> = program.children().iter().map(|c| tree.node(*c).flags().exported).collect();
        assert_eq!(exported, vec![false, false, true]);
    }

    #[test]
    fn test_qualified_references() {
        let tree = parse("export declare class C extends ns.Base {}\nexport declare const v: a.b.C;\n");
        assert_eq!(find(&tree, NodeKind::PropertyAccess).len(), 1);
        let qualified = find(&tree, NodeKind::QualifiedName);
        assert_eq!(qualified.len(), 2);
        let texts: Vec<&str> = qualified.iter().map(|q| tree.node_text(*q)).collect();
        assert!(texts.contains(&"a.b"));
        assert!(texts.contains(&"a.b.C"));
    }

    #[test]
    fn test_parents_are_linked() {
        let tree = parse("export declare function f(a: string): void;\n");
        for leaf in tree.leaves(tree.root()) {
            assert_eq!(tree.ancestors(leaf).last(), Some(tree.root()));
        }
    }

    #[test]
    fn test_typed_bindings_keep_their_annotation() {
        let tree = parse("export declare function f(a: ns.T): void;\nexport declare const b: Outer.Inner.Type;\n");
        let identifiers: Vec<&str> = find(&tree, NodeKind::Identifier).iter().map(|i| tree.node_text(*i)).collect();
        assert!(identifiers.contains(&"a"));
        assert!(identifiers.contains(&"b"));
        assert!(!identifiers.iter().any(|text| text.contains(':')));

        let qualified: Vec<&str> = find(&tree, NodeKind::QualifiedName).iter().map(|q| tree.node_text(*q)).collect();
        assert_eq!(qualified, vec!["ns.T", "Outer.Inner.Type", "Outer.Inner"]);
    }

    #[test]
    fn test_arena_holds_only_reachable_nodes() {
        let tree = parse("export declare class A {\n    m(a: x.Y, b?: string): void;\n}\nexport declare const c: number, d: z.W;\n");
        for index in 0..tree.len() {
            assert_eq!(tree.ancestors(NodeId::new(index)).last(), Some(tree.root()));
        }
    }
}
