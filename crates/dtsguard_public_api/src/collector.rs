use anyhow::{Result, anyhow};
use dtsguard_core::is_declaration_file;
use ignore::WalkBuilder;
use log::{debug, trace};
use std::path::{Path, PathBuf};

/// Expands the command line entries into declaration files.
///
/// Files are taken as given, directories are walked for declaration files
/// (respecting ignore files, skipping `node_modules`). The result is sorted
/// and free of duplicates.
pub fn collect_entries(root: &Path, entries: &[PathBuf]) -> Result<Vec<PathBuf>> {
    debug!("Collecting entry files");
    let mut files: Vec<PathBuf> = Vec::new();

    for entry in entries {
        let path = if entry.is_absolute() { entry.clone() } else { root.join(entry) };
        if path.is_file() {
            trace!("Using entry file: {}", path.display());
            files.push(path);
            continue;
        }
        if !path.is_dir() {
            return Err(anyhow!("Entry does not exist: {}", path.display()));
        }

        debug!("Walking directory tree from: {}", path.display());
        let walker = WalkBuilder::new(&path)
            .hidden(false)
            .ignore(true)
            .git_ignore(true)
            .filter_entry(|dent| dent.file_name() != "node_modules")
            .build();
        for res in walker {
            let dent = res?;
            let p = dent.path();
            if p.is_file() && is_declaration_file(p) {
                trace!("Found declaration file: {}", p.display());
                files.push(p.to_path_buf());
            }
        }
    }

    files.sort();
    files.dedup();
    debug!("Collected {} entry files", files.len());
    Ok(files)
}
