use dtsguard_core::{Program, Symbol};
use log::{debug, trace, warn};

use crate::{
    config::Options,
    error::Result,
    locator::locate_export_statement,
    sanitizer::Sanitizer,
    types::{ApiEntry, ApiReport, Warning, WarningKind},
};

/// Renders resolved exports into a report, sorted by name.
pub fn assemble(program: &Program, mut symbols: Vec<&Symbol>, options: &Options) -> Result<ApiReport> {
    symbols.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));

    let mut report = ApiReport::default();
    for symbol in symbols {
        if options.is_stripped(&symbol.name) {
            debug!("Stripping export '{}'", symbol.name);
            continue;
        }
        if symbol.declarations.is_empty() {
            warn!("Symbol '{}' has no declaration, skipping", symbol.name);
            report.warnings.push(Warning { symbol: symbol.name.clone(), kind: WarningKind::NoDeclaration });
            continue;
        }
        let Some(statement) = locate_export_statement(program, symbol) else {
            warn!("Symbol '{}' has no exported statement, skipping", symbol.name);
            report.warnings.push(Warning { symbol: symbol.name.clone(), kind: WarningKind::NoExportStatement });
            continue;
        };

        let file = program.file(symbol.file);
        let text = Sanitizer::new(file, options).sanitize(statement)?;
        trace!("Rendered '{}' from {}", symbol.name, file.path().display());
        report.entries.push(ApiEntry {
            name: symbol.name.clone(),
            file: file.path().to_path_buf(),
            text: drop_empty_lines(&text),
        });
    }
    Ok(report)
}

/// Drops zero-length lines. `\r\n` line endings come out as `\n`.
fn drop_empty_lines(text: &str) -> String {
    text.lines().filter(|line| !line.is_empty()).collect::<Vec<_>>().join("\n")
}
