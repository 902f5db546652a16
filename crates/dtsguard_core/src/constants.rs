//! Constants for declaration file names and module resolution.
//!
//! Only declaration files are ever loaded, so every list here is about the
//! `.d.ts` family:
//!
//! - `.d.ts`: plain TypeScript declarations
//! - `.d.mts` / `.d.cts`: declarations for ES module / CommonJS output
//! - `.d.<ext>.ts`: declarations for arbitrary extensions (e.g. `styles.d.css.ts`)

/// Declaration file suffixes, in resolution priority order
pub const DECLARATION_EXTENSIONS: &[&str] = &["d.ts", "d.mts", "d.cts"];

/// Runtime extensions a specifier may carry, paired with the declaration
/// extension that describes them (`./foo.js` is typed by `./foo.d.ts`)
pub const RUNTIME_TO_DECLARATION: &[(&str, &str)] =
    &[("js", "d.ts"), ("mjs", "d.mts"), ("cjs", "d.cts"), ("ts", "d.ts")];

/// Index file names to try when a specifier names a directory
pub const INDEX_FILES: &[&str] = &["index.d.ts", "index.d.mts", "index.d.cts"];

/// Returns true when `path` names a declaration file.
///
/// This is a pure check on the file name, the file is never opened.
pub fn is_declaration_file(path: &std::path::Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if DECLARATION_EXTENSIONS.iter().any(|ext| name.len() > ext.len() + 1 && name.ends_with(&format!(".{ext}"))) {
        return true;
    }
    // foo.d.css.ts
    let Some(stem) = name.strip_suffix(".ts") else {
        return false;
    };
    match stem.rsplit_once('.') {
        Some((head, ext)) => !ext.is_empty() && head.len() > 2 && head.ends_with(".d"),
        None => false,
    }
}
