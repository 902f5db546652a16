use anyhow::{Result, anyhow};
use clap::Parser;
use log::{debug, info, trace};
use regex::Regex;
use std::{
    collections::BTreeSet,
    env,
    path::{Path, PathBuf},
};

use crate::error::PublicApiError;

/// Settings of one public API rendering.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Exported names matching this pattern are left out entirely
    pub strip_export_pattern: Option<Regex>,
    /// Identifiers allowed as the leftmost part of a dotted reference
    pub allow_module_identifiers: BTreeSet<String>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strip_export_pattern(mut self, pattern: &str) -> Result<Self, PublicApiError> {
        self.strip_export_pattern = Some(Regex::new(pattern)?);
        Ok(self)
    }

    pub fn allow_module_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.allow_module_identifiers.insert(identifier.into());
        self
    }

    pub fn is_stripped(&self, name: &str) -> bool {
        self.strip_export_pattern.as_ref().is_some_and(|pattern| pattern.is_match(name))
    }

    pub fn is_allowed_module_identifier(&self, identifier: &str) -> bool {
        self.allow_module_identifiers.contains(identifier)
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "public-api")]
#[command(about = "Render the public API of TypeScript declaration files as diffable text")]
pub struct Config {
    /// Declaration files, or directories to search for them
    #[arg(required = true)]
    pub entries: Vec<PathBuf>,

    /// Root directory used for display and golden file names (defaults to git root)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Leave out exported symbols whose name matches this regular expression
    #[arg(long)]
    pub strip_export_pattern: Option<String>,

    /// Namespace identifier allowed to qualify references (repeatable)
    #[arg(long = "allow-module-identifier", value_name = "IDENT")]
    pub allow_module_identifiers: Vec<String>,

    /// Write golden files into this directory
    #[arg(long, conflicts_with = "verify_dir")]
    pub out_dir: Option<PathBuf>,

    /// Compare the rendered API against golden files in this directory
    #[arg(long)]
    pub verify_dir: Option<PathBuf>,

    /// Print reports as JSON
    #[arg(long)]
    pub json: bool,
}

impl Config {
    /// Resolve the root directory: the given one, else the git root, else the
    /// current directory
    pub fn initialize(&mut self) -> Result<()> {
        let root = if let Some(r) = self.root.take() {
            debug!("Using provided root directory: {:?}", r);
            r.canonicalize().unwrap_or(r)
        } else {
            debug!("No root provided, searching for git root");
            match find_git_root() {
                Ok(root) => root,
                Err(e) => {
                    debug!("{}, using the current directory", e);
                    env::current_dir()?
                }
            }
        };
        info!("Using root directory: {}", root.display());
        self.root = Some(root);
        Ok(())
    }

    /// Get the root directory, returning an error if not initialized
    pub fn root(&self) -> Result<&PathBuf> {
        self.root.as_ref().ok_or_else(|| anyhow!("Config not initialized - call initialize() first"))
    }

    pub fn options(&self) -> Result<Options, PublicApiError> {
        let mut options = Options::new();
        if let Some(pattern) = &self.strip_export_pattern {
            options = options.with_strip_export_pattern(pattern)?;
        }
        for identifier in &self.allow_module_identifiers {
            options = options.allow_module_identifier(identifier.as_str());
        }
        Ok(options)
    }
}

pub(crate) fn find_git_root() -> Result<PathBuf> {
    debug!("Searching for git root");
    find_git_root_from(&env::current_dir()?)
}

fn find_git_root_from(start: &Path) -> Result<PathBuf> {
    let mut current_dir = start.to_path_buf();
    trace!("Starting search from: {:?}", current_dir);

    loop {
        let git_dir = current_dir.join(".git");
        trace!("Checking for .git at: {:?}", git_dir);
        if git_dir.exists() {
            debug!("Found git root at: {:?}", current_dir);
            return Ok(current_dir);
        }

        // Try to move up to parent directory
        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => {
                debug!("Could not find .git directory in any parent folder");
                return Err(anyhow!("Could not find .git directory in any parent folder"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_git_root_from_subdirectory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join(".git")).unwrap();
        let subdir = root.join("packages").join("core");
        fs::create_dir_all(&subdir).unwrap();

        let git_root = find_git_root_from(&subdir).unwrap();
        assert_eq!(git_root.canonicalize().unwrap(), root.canonicalize().unwrap());
    }

    #[test]
    fn test_parse_cli_arguments() {
        let cfg = Config::try_parse_from([
            "public-api",
            "dist/index.d.ts",
            "--strip-export-pattern",
            "^ɵ",
            "--allow-module-identifier",
            "React",
            "--allow-module-identifier",
            "NodeJS",
            "--json",
        ])
        .unwrap();
        assert_eq!(cfg.entries, vec![PathBuf::from("dist/index.d.ts")]);
        assert!(cfg.json);

        let options = cfg.options().unwrap();
        assert!(options.is_stripped("ɵinternal"));
        assert!(!options.is_stripped("public"));
        assert!(options.is_allowed_module_identifier("React"));
        assert!(options.is_allowed_module_identifier("NodeJS"));
        assert!(!options.is_allowed_module_identifier("Other"));
    }

    #[test]
    fn test_out_dir_conflicts_with_verify_dir() {
        let result = Config::try_parse_from(["public-api", "a.d.ts", "--out-dir", "golden", "--verify-dir", "golden"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_entries_are_required() {
        assert!(Config::try_parse_from(["public-api"]).is_err());
    }

    #[test]
    fn test_invalid_pattern() {
        let cfg = Config::try_parse_from(["public-api", "a.d.ts", "--strip-export-pattern", "("]).unwrap();
        assert!(matches!(cfg.options(), Err(PublicApiError::InvalidPattern(_))));
    }

    #[test]
    fn test_initialize_with_explicit_root() {
        let temp_dir = TempDir::new().unwrap();
        let mut cfg = Config::try_parse_from(["public-api", "a.d.ts"]).unwrap();
        cfg.root = Some(temp_dir.path().to_path_buf());
        cfg.initialize().unwrap();
        assert_eq!(cfg.root().unwrap(), &temp_dir.path().canonicalize().unwrap());
    }
}
