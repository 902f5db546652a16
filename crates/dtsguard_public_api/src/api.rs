use dtsguard_core::{FrontEnd, FrontEndConfig, OxcFrontEnd, is_declaration_file};
use log::{debug, info, warn};
use std::path::Path;

use crate::{
    assembler::assemble,
    config::Options,
    error::{PublicApiError, Result},
    resolver::resolve_exports,
    types::{ApiReport, Warning, WarningKind},
};

/// Renders the public API of the declaration file at `path`.
///
/// Relative module references are followed on the file system, package
/// references are not.
pub fn public_api(path: &Path, options: &Options) -> Result<String> {
    public_api_report(path, options).map(|report| report.render())
}

/// Like [`public_api`], keeping the entries and warnings apart.
pub fn public_api_report(path: &Path, options: &Options) -> Result<ApiReport> {
    public_api_internal(&OxcFrontEnd::default(), path, &FrontEndConfig::default(), options)
}

/// Renders the public API of `path` with an explicit front end.
pub fn public_api_internal(
    front_end: &dyn FrontEnd,
    path: &Path,
    config: &FrontEndConfig,
    options: &Options,
) -> Result<ApiReport> {
    if !is_declaration_file(path) {
        return Err(PublicApiError::NotADeclarationFile { path: path.to_path_buf() });
    }

    info!("Rendering public API of {}", path.display());
    let program = front_end.load(path, config)?;
    let entry = program.find(path).ok_or_else(|| PublicApiError::EntryFileNotFound { path: path.to_path_buf() })?;
    debug!("Loaded {} files", program.files().len());

    let Some(exports) = program.exports(entry) else {
        warn!("{} is not a module, nothing is exported", path.display());
        return Ok(ApiReport {
            entries: Vec::new(),
            warnings: vec![Warning { symbol: path.display().to_string(), kind: WarningKind::NotAModule }],
        });
    };
    debug!("Found {} exports", exports.len());

    let symbols = resolve_exports(&program, exports)?;
    let report = assemble(&program, symbols, options)?;
    info!("Rendered {} entries with {} warnings", report.entries.len(), report.warnings.len());
    Ok(report)
}
