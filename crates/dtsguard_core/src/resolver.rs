use std::path::{Path, PathBuf};

use log::trace;
use path_clean::clean;

use crate::{
    constants::{DECLARATION_EXTENSIONS, INDEX_FILES, RUNTIME_TO_DECLARATION, is_declaration_file},
    host::SourceHost,
};

/// Returns true for specifiers that point into the local file tree.
pub fn is_relative(request: &str) -> bool {
    request.starts_with("./") || request.starts_with("../") || request.starts_with('/') || request == "." || request == ".."
}

/// Resolves `request`, imported from `from_file`, to a declaration file.
///
/// Only relative and absolute specifiers are resolved. Package specifiers
/// always yield `None`.
pub fn resolve(host: &dyn SourceHost, from_file: &Path, request: &str) -> Option<PathBuf> {
    if !is_relative(request) {
        trace!("Not following package specifier '{}'", request);
        return None;
    }
    let base = from_file.parent().unwrap_or(Path::new(""));
    let target = clean(base.join(request));
    let resolved = resolve_declaration(host, &target);
    match &resolved {
        Some(path) => trace!("Resolved '{}' from {} to {}", request, from_file.display(), path.display()),
        None => trace!("Failed to resolve '{}' from {}", request, from_file.display()),
    }
    resolved
}

fn resolve_declaration(host: &dyn SourceHost, p: &Path) -> Option<PathBuf> {
    // Exact path, when it already names a declaration file
    if is_declaration_file(p) && host.exists(p) {
        return Some(p.to_path_buf());
    }

    // ./foo.js is described by ./foo.d.ts
    if let Some(ext) = p.extension().and_then(|e| e.to_str())
        && let Some((_, declaration)) = RUNTIME_TO_DECLARATION.iter().find(|(runtime, _)| *runtime == ext)
    {
        let candidate = p.with_extension(declaration);
        if host.exists(&candidate) {
            return Some(candidate);
        }
    }

    // Try adding declaration extensions
    for ext in DECLARATION_EXTENSIONS {
        let candidate = PathBuf::from(format!("{}.{}", p.display(), ext));
        if host.exists(&candidate) {
            return Some(candidate);
        }
    }

    // Try index files
    for index_file in INDEX_FILES {
        let candidate = p.join(index_file);
        if host.exists(&candidate) {
            return Some(candidate);
        }
    }

    None
}
