use std::path::Path;

use log::{debug, trace};
use oxc_allocator::Allocator;
use oxc_ast_visit::Visit;
use oxc_parser::{Parser as OxcParser, ParserReturn};
use oxc_span::SourceType;

use crate::{
    error::FrontEndError,
    lower::TreeBuilder,
    program::FileId,
    symbols::{ModuleSymbols, collect_module},
    tree::SyntaxTree,
};

/// One parsed declaration file, before module specifiers are linked.
pub(crate) struct ParsedFile {
    pub(crate) tree: SyntaxTree,
    pub(crate) module: Option<ModuleSymbols>,
    pub(crate) requests: Vec<String>,
}

pub(crate) fn parse_declaration_file(file: FileId, path: &Path, source: &str) -> Result<ParsedFile, FrontEndError> {
    trace!("Parsing declaration file: {}", path.display());
    let source_type = source_type_for(path);
    let allocator = Allocator::default();
    let ParserReturn { program, errors, panicked, .. } = OxcParser::new(&allocator, source, source_type).parse();

    if panicked || !errors.is_empty() {
        let message = errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; ");
        return Err(FrontEndError::Parse { path: path.to_path_buf(), message });
    }

    let mut builder = TreeBuilder::new(source);
    builder.visit_program(&program);
    let (tree, declarations) = builder.finish();

    let collected = collect_module(file, &program.body, &declarations);
    debug!(
        "Parsed {}: {} nodes, {} module requests",
        path.display(),
        tree.len(),
        collected.requests.len()
    );

    Ok(ParsedFile { tree, module: collected.symbols, requests: collected.requests })
}

fn source_type_for(path: &Path) -> SourceType {
    // every loaded file is a declaration file, whatever its exact extension
    SourceType::from_path(path)
        .unwrap_or_else(|_| SourceType::default().with_typescript(true).with_module(true))
        .with_typescript_definition(true)
}
