use dtsguard_core::{NodeId, Program, Symbol};
use log::trace;

/// Finds the smallest exported statement enclosing the declaration of
/// `symbol`, starting at the declaration itself.
pub fn locate_export_statement(program: &Program, symbol: &Symbol) -> Option<NodeId> {
    let declaration = symbol.declaration()?;
    let tree = program.file(symbol.file).tree();
    let found = tree.ancestors(declaration).find(|&id| tree.node(id).flags().exported);
    trace!("Export statement of '{}': {:?}", symbol.name, found);
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtsguard_core::{FrontEnd, FrontEndConfig, MemoryHost, OxcFrontEnd};
    use std::path::Path;

    fn program(source: &str) -> Program {
        OxcFrontEnd::new(MemoryHost::new().with_file("/index.d.ts", source))
            .load(Path::new("/index.d.ts"), &FrontEndConfig::default())
            .unwrap()
    }

    fn statement_text(program: &Program, name: &str) -> Option<String> {
        let file = program.find(Path::new("/index.d.ts")).unwrap();
        let symbol = program.export_named(file, name)?;
        let tree = program.file(file).tree();
        locate_export_statement(program, symbol).map(|id| tree.node_text(id).to_string())
    }

    #[test]
    fn test_locates_whole_export_statement() {
        let program = program("export declare class A {\n    x: number;\n}\n");
        assert_eq!(statement_text(&program, "A").as_deref(), Some("export declare class A {\n    x: number;\n}"));
    }

    #[test]
    fn test_variable_declarator_finds_its_statement() {
        let program = program("export declare const a: number, b: string;\n");
        let expected = Some("export declare const a: number, b: string;");
        assert_eq!(statement_text(&program, "a").as_deref(), expected);
        assert_eq!(statement_text(&program, "b").as_deref(), expected);
    }

    #[test]
    fn test_default_export() {
        let program = program("export default interface Options {\n    a: string;\n}\n");
        assert_eq!(
            statement_text(&program, "default").as_deref(),
            Some("export default interface Options {\n    a: string;\n}")
        );
    }

    #[test]
    fn test_local_alias_has_no_exported_statement() {
        let program = program("declare const a: number;\nexport { a };\n");
        let file = program.find(Path::new("/index.d.ts")).unwrap();
        let alias = program.export_named(file, "a").unwrap();
        let target = program.resolve_alias(alias).unwrap();
        assert!(locate_export_statement(&program, target).is_none());
    }
}
