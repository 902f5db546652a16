//! Module symbol tables.
//!
//! The table is collected from the typed oxc AST of one file. Declarations
//! are referred to by the tree node the lowering produced for them.

use std::collections::HashMap;

use log::{debug, trace};
use oxc_ast::ast::{
    Declaration, ExportDefaultDeclarationKind, ImportDeclarationSpecifier, Statement, TSModuleDeclarationName,
};
use oxc_span::{GetSpan, Span};

use crate::{program::FileId, tree::NodeId};

/// Where an alias points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasTarget {
    /// A binding of the same file, `export { a }`
    Local(String),
    /// An export of another module, `export { a } from './a'` or an import
    Export { request: String, name: String },
    /// A whole module, `import * as ns from './a'`
    Namespace { request: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolKind {
    Direct,
    Alias(AliasTarget),
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// File whose tree holds the declarations
    pub file: FileId,
    pub declarations: Vec<NodeId>,
    /// First value declaration (class, function, variable, enum, namespace)
    pub primary: Option<NodeId>,
}

impl Symbol {
    fn new(name: &str, kind: SymbolKind, file: FileId) -> Self {
        Self { name: name.to_string(), kind, file, declarations: Vec::new(), primary: None }
    }

    fn add_declaration(&mut self, node: Option<NodeId>, is_value: bool) {
        let Some(node) = node else {
            return;
        };
        self.declarations.push(node);
        if is_value && self.primary.is_none() {
            self.primary = Some(node);
        }
    }

    /// The node a lookup of this symbol starts from.
    pub fn declaration(&self) -> Option<NodeId> {
        self.primary.or_else(|| self.declarations.first().copied())
    }

    pub fn is_alias(&self) -> bool {
        matches!(self.kind, SymbolKind::Alias(_))
    }
}

/// Exports and top-level bindings of one module.
#[derive(Debug, Clone, Default)]
pub struct ModuleSymbols {
    exports: Vec<Symbol>,
    export_index: HashMap<String, usize>,
    locals: HashMap<String, Symbol>,
    star_requests: Vec<String>,
}

impl ModuleSymbols {
    /// Exports declared by the module itself, in declaration order.
    pub fn exports(&self) -> &[Symbol] {
        &self.exports
    }

    pub fn export(&self, name: &str) -> Option<&Symbol> {
        self.export_index.get(name).map(|&i| &self.exports[i])
    }

    pub fn local(&self, name: &str) -> Option<&Symbol> {
        self.locals.get(name)
    }

    /// Specifiers of `export * from` statements.
    pub fn star_requests(&self) -> &[String] {
        &self.star_requests
    }

    fn declare_local(&mut self, file: FileId, name: &str, node: Option<NodeId>, is_value: bool) {
        self.locals
            .entry(name.to_string())
            .or_insert_with(|| Symbol::new(name, SymbolKind::Direct, file))
            .add_declaration(node, is_value);
    }

    fn declare_export(&mut self, file: FileId, name: &str, node: Option<NodeId>, is_value: bool) {
        match self.export_index.get(name) {
            Some(&i) if !self.exports[i].is_alias() => self.exports[i].add_declaration(node, is_value),
            Some(_) => debug!("Ignoring declaration of '{}', the name is already re-exported", name),
            None => {
                let mut symbol = Symbol::new(name, SymbolKind::Direct, file);
                symbol.add_declaration(node, is_value);
                self.push_export(symbol);
            }
        }
    }

    fn export_alias(&mut self, file: FileId, name: &str, target: AliasTarget, node: Option<NodeId>) {
        if self.export_index.contains_key(name) {
            debug!("Ignoring duplicate export of '{}'", name);
            return;
        }
        let mut symbol = Symbol::new(name, SymbolKind::Alias(target), file);
        symbol.add_declaration(node, false);
        self.push_export(symbol);
    }

    fn bind_alias(&mut self, file: FileId, name: &str, target: AliasTarget, node: Option<NodeId>) {
        let mut symbol = Symbol::new(name, SymbolKind::Alias(target), file);
        symbol.add_declaration(node, false);
        self.locals.insert(name.to_string(), symbol);
    }

    fn push_export(&mut self, symbol: Symbol) {
        self.export_index.insert(symbol.name.clone(), self.exports.len());
        self.exports.push(symbol);
    }
}

/// Result of [`collect_module`].
pub(crate) struct CollectedModule {
    /// `None` for scripts, files without any import or export
    pub(crate) symbols: Option<ModuleSymbols>,
    /// Every module specifier the file refers to
    pub(crate) requests: Vec<String>,
}

/// Names declared by `decl` with the span of the declaring AST node and
/// whether the declaration is a value.
fn declared_names(decl: &Declaration<'_>) -> Vec<(String, Span, bool)> {
    match decl {
        Declaration::VariableDeclaration(var) => var
            .declarations
            .iter()
            .filter_map(|d| d.id.get_binding_identifier().map(|id| (id.name.to_string(), d.span, true)))
            .collect(),
        Declaration::FunctionDeclaration(func) => {
            func.id.iter().map(|id| (id.name.to_string(), func.span, true)).collect()
        }
        Declaration::ClassDeclaration(class) => {
            class.id.iter().map(|id| (id.name.to_string(), class.span, true)).collect()
        }
        Declaration::TSTypeAliasDeclaration(alias) => vec![(alias.id.name.to_string(), alias.span, false)],
        Declaration::TSInterfaceDeclaration(iface) => vec![(iface.id.name.to_string(), iface.span, false)],
        Declaration::TSEnumDeclaration(e) => vec![(e.id.name.to_string(), e.span, true)],
        Declaration::TSModuleDeclaration(module) => match &module.id {
            TSModuleDeclarationName::Identifier(id) => vec![(id.name.to_string(), module.span, true)],
            _ => vec![],
        },
        _ => vec![],
    }
}

/// Builds the symbol table of one file from its top-level statements.
pub(crate) fn collect_module(file: FileId, body: &[Statement<'_>], nodes: &HashMap<Span, NodeId>) -> CollectedModule {
    let mut symbols = ModuleSymbols::default();
    let mut requests = Vec::new();
    let mut is_module = false;
    let node = |span: Span| nodes.get(&span).copied();

    for stmt in body {
        match stmt {
            Statement::ImportDeclaration(decl) => {
                is_module = true;
                let request = decl.source.value.to_string();
                trace!("Found import from '{}'", request);
                for spec in decl.specifiers.iter().flatten() {
                    let (local, target) = match spec {
                        ImportDeclarationSpecifier::ImportSpecifier(s) => (
                            &s.local.name,
                            AliasTarget::Export { request: request.clone(), name: s.imported.name().to_string() },
                        ),
                        ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => (
                            &s.local.name,
                            AliasTarget::Export { request: request.clone(), name: "default".to_string() },
                        ),
                        ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                            (&s.local.name, AliasTarget::Namespace { request: request.clone() })
                        }
                    };
                    symbols.bind_alias(file, local.as_str(), target, node(spec.span()));
                }
                requests.push(request);
            }
            Statement::ExportNamedDeclaration(decl) => {
                is_module = true;
                if let Some(declaration) = &decl.declaration {
                    for (name, span, is_value) in declared_names(declaration) {
                        trace!("Found exported declaration '{}'", name);
                        symbols.declare_local(file, &name, node(span), is_value);
                        symbols.declare_export(file, &name, node(span), is_value);
                    }
                    continue;
                }
                let source = decl.source.as_ref().map(|s| s.value.to_string());
                for spec in &decl.specifiers {
                    let local = spec.local.name().to_string();
                    let exported = spec.exported.name().to_string();
                    let target = match &source {
                        Some(request) => AliasTarget::Export { request: request.clone(), name: local },
                        None => AliasTarget::Local(local),
                    };
                    trace!("Found export specifier '{}' -> {:?}", exported, target);
                    symbols.export_alias(file, &exported, target, node(spec.span));
                }
                requests.extend(source);
            }
            Statement::ExportDefaultDeclaration(decl) => {
                is_module = true;
                let declared = match &decl.declaration {
                    ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
                        Some((func.id.as_ref().map(|id| id.name.to_string()), func.span, true))
                    }
                    ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                        Some((class.id.as_ref().map(|id| id.name.to_string()), class.span, true))
                    }
                    ExportDefaultDeclarationKind::TSInterfaceDeclaration(iface) => {
                        Some((Some(iface.id.name.to_string()), iface.span, false))
                    }
                    ExportDefaultDeclarationKind::Identifier(ident) => {
                        symbols.export_alias(file, "default", AliasTarget::Local(ident.name.to_string()), None);
                        None
                    }
                    _ => {
                        debug!("Skipping default export of an expression");
                        None
                    }
                };
                if let Some((local, span, is_value)) = declared {
                    if let Some(local) = local {
                        symbols.declare_local(file, &local, node(span), is_value);
                    }
                    symbols.declare_export(file, "default", node(span), is_value);
                }
            }
            Statement::ExportAllDeclaration(decl) => {
                is_module = true;
                let request = decl.source.value.to_string();
                match &decl.exported {
                    Some(name) => symbols.export_alias(
                        file,
                        name.name().as_str(),
                        AliasTarget::Namespace { request: request.clone() },
                        None,
                    ),
                    None => symbols.star_requests.push(request.clone()),
                }
                requests.push(request);
            }
            Statement::TSExportAssignment(_) | Statement::TSNamespaceExportDeclaration(_) => {
                is_module = true;
                debug!("Skipping `export =` / `export as namespace`, they are not part of the export table");
            }
            other => {
                if let Some(declaration) = other.as_declaration() {
                    for (name, span, is_value) in declared_names(declaration) {
                        symbols.declare_local(file, &name, node(span), is_value);
                    }
                }
            }
        }
    }

    CollectedModule { symbols: is_module.then_some(symbols), requests }
}
