use anyhow::{Context, Result};
use log::{debug, trace};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::types::Verification;

const GOLDEN_EXTENSION: &str = "api.md";

/// Golden file of `entry`: its path relative to `root`, inside `dir`, with
/// the declaration extension replaced by `.api.md`.
pub fn golden_path(dir: &Path, root: &Path, entry: &Path) -> PathBuf {
    let rel = entry.strip_prefix(root).unwrap_or(entry);
    let file_name = rel.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
    let stem = match file_name.rfind(".d.") {
        Some(i) => &file_name[..i],
        None => file_name.as_str(),
    };
    let golden = format!("{stem}.{GOLDEN_EXTENSION}");
    match rel.parent().filter(|p| !p.as_os_str().is_empty() && !p.has_root()) {
        Some(parent) => dir.join(parent).join(golden),
        None => dir.join(golden),
    }
}

/// Golden files end with a newline, rendered text does not.
pub fn write_golden(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, format!("{text}\n")).with_context(|| format!("failed to write {}", path.display()))?;
    debug!("Wrote golden file {}", path.display());
    Ok(())
}

pub fn verify_golden(path: &Path, text: &str) -> Result<Verification> {
    let golden = match fs::read_to_string(path) {
        Ok(golden) => golden,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("Golden file {} is missing", path.display());
            return Ok(Verification::Missing);
        }
        Err(e) => return Err(e).with_context(|| format!("failed to read {}", path.display())),
    };
    let expected = golden.strip_suffix('\n').unwrap_or(&golden);
    trace!("Comparing against {}", path.display());
    Ok(compare(expected, text))
}

fn compare(expected: &str, actual: &str) -> Verification {
    if expected == actual {
        return Verification::Match;
    }
    let mut expected_lines = expected.lines();
    let mut actual_lines = actual.lines();
    let mut line = 1;
    loop {
        match (expected_lines.next(), actual_lines.next()) {
            (Some(e), Some(a)) if e == a => line += 1,
            (None, None) => {
                // same lines, different line endings
                return Verification::Changed { line, expected: None, actual: None };
            }
            (e, a) => {
                return Verification::Changed { line, expected: e.map(str::to_string), actual: a.map(str::to_string) };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_golden_path() {
        let root = Path::new("/repo");
        let dir = Path::new("/repo/goldens");
        assert_eq!(
            golden_path(dir, root, Path::new("/repo/packages/core/index.d.ts")),
            PathBuf::from("/repo/goldens/packages/core/index.api.md")
        );
        assert_eq!(golden_path(dir, root, Path::new("/repo/esm.d.mts")), PathBuf::from("/repo/goldens/esm.api.md"));
        assert_eq!(golden_path(dir, root, Path::new("/repo/styles.d.css.ts")), PathBuf::from("/repo/goldens/styles.api.md"));
    }

    #[test]
    fn test_golden_path_outside_root() {
        let path = golden_path(Path::new("/goldens"), Path::new("/repo"), Path::new("/elsewhere/index.d.ts"));
        assert_eq!(path, PathBuf::from("/goldens/index.api.md"));
    }

    #[test]
    fn test_write_then_verify() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/index.api.md");
        write_golden(&path, "export declare const a: number;").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "export declare const a: number;\n");
        assert_eq!(verify_golden(&path, "export declare const a: number;").unwrap(), Verification::Match);
    }

    #[test]
    fn test_verify_missing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("index.api.md");
        assert_eq!(verify_golden(&path, "x").unwrap(), Verification::Missing);
    }

    #[test]
    fn test_compare_reports_first_difference() {
        assert_eq!(
            compare("a\nb\nc", "a\nB\nc"),
            Verification::Changed { line: 2, expected: Some("b".to_string()), actual: Some("B".to_string()) }
        );
        assert_eq!(
            compare("a", "a\n\nb"),
            Verification::Changed { line: 2, expected: None, actual: Some(String::new()) }
        );
    }
}
