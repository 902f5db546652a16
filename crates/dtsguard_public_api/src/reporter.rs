use std::{
    env,
    io::{self, Write},
    path::{Component, Path, PathBuf},
};

use colored::Colorize;
use log::{debug, trace};

use crate::types::{RunResult, Verification};

/// Relativize a path to the current working directory for clickable links
fn relativize_to_cwd(path: &Path) -> String {
    let cwd = match env::current_dir() {
        Ok(cwd) => cwd,
        Err(_) => {
            debug!("Failed to get current directory");
            return path.display().to_string();
        }
    };
    trace!("Relativizing {:?} to cwd {:?}", path, cwd);
    match make_relative(path, &cwd) {
        Some(rel_path) => rel_path.to_string_lossy().to_string(),
        None => path.display().to_string(),
    }
}

/// Create a relative path from `base` to `target`
fn make_relative(target: &Path, base: &Path) -> Option<PathBuf> {
    if target.has_root() != base.has_root() {
        return None;
    }
    let target_parts: Vec<Component> = target.components().collect();
    let base_parts: Vec<Component> = base.components().collect();
    let common = target_parts.iter().zip(&base_parts).take_while(|(t, b)| t == b).count();
    if common == 0 && target.has_root() {
        return None;
    }

    let mut result = PathBuf::new();
    for _ in common..base_parts.len() {
        result.push("..");
    }
    for component in &target_parts[common..] {
        match component {
            Component::Normal(p) => result.push(p),
            Component::ParentDir => result.push(".."),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    if result.as_os_str().is_empty() { Some(PathBuf::from(".")) } else { Some(result) }
}

/// Prints the rendered API of each entry. A `// <entry>` header precedes
/// each one when there is more than one entry.
pub fn print_reports<W: Write>(writer: &mut W, run: &RunResult) -> io::Result<()> {
    let with_headers = run.entries.len() > 1;
    for (idx, result) in run.entries.iter().enumerate() {
        if with_headers {
            if idx > 0 {
                writeln!(writer)?;
            }
            writeln!(writer, "// {}", result.entry)?;
        }
        let text = result.report.render();
        if !text.is_empty() {
            writeln!(writer, "{text}")?;
        }
    }
    writer.flush()
}

pub fn print_json<W: Write>(writer: &mut W, run: &RunResult) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, run)?;
    writeln!(writer)?;
    writer.flush()
}

/// Prints the warnings of every entry to `writer`, usually stderr.
pub fn print_warnings<W: Write>(writer: &mut W, run: &RunResult) -> io::Result<()> {
    for result in &run.entries {
        for warning in &result.report.warnings {
            writeln!(writer, "{} {}: {}", "⚠".yellow().bold(), result.entry.blue(), warning.message())?;
        }
    }
    writer.flush()
}

pub fn print_written<W: Write>(writer: &mut W, run: &RunResult) -> io::Result<()> {
    for result in &run.entries {
        if let Some(golden) = &result.golden {
            writeln!(writer, "{} {} -> {}", "✓".green().bold(), result.entry, relativize_to_cwd(golden).blue())?;
        }
    }
    writer.flush()
}

pub fn print_verification<W: Write>(writer: &mut W, run: &RunResult) -> io::Result<()> {
    debug!("Printing verification results for {} entries", run.entries.len());
    for result in &run.entries {
        let golden = result.golden.as_deref().map(relativize_to_cwd).unwrap_or_default();
        match &result.verification {
            Some(Verification::Match) => {
                writeln!(writer, "{} {}", "✓".green().bold(), result.entry)?;
            }
            Some(Verification::Missing) => {
                writeln!(writer, "{} {} (golden file {} is missing)", "✗".red().bold(), result.entry, golden.blue())?;
            }
            Some(Verification::Changed { line, expected, actual }) => {
                writeln!(
                    writer,
                    "{} {} differs from {}:{}",
                    "✗".red().bold(),
                    result.entry,
                    golden.blue(),
                    line.to_string().yellow()
                )?;
                print_line(writer, "-", expected.as_deref())?;
                print_line(writer, "+", actual.as_deref())?;
            }
            None => {}
        }
    }
    print_summary(writer, run)?;
    writer.flush()
}

fn print_line<W: Write>(writer: &mut W, prefix: &str, line: Option<&str>) -> io::Result<()> {
    let text = match line {
        Some(line) => format!("{prefix} {line}"),
        None => format!("{prefix} <end of file>"),
    };
    let styled = if prefix == "-" { text.red() } else { text.green() };
    writeln!(writer, "    {styled}")
}

fn print_summary<W: Write>(writer: &mut W, run: &RunResult) -> io::Result<()> {
    let failed = run.failed_verifications().count();
    if failed == 0 {
        return Ok(());
    }
    writeln!(writer, "\n{}", "─".repeat(60).dimmed())?;
    writeln!(writer, "{}", "Summary".bold())?;
    writeln!(writer, "  Out of date: {} of {} entries", failed.to_string().red().bold(), run.entries.len())?;
    writeln!(writer, "  Run again with {} to update the golden files", "--out-dir".cyan())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ApiEntry, ApiReport, EntryResult, Warning, WarningKind};

    fn result(entry: &str, text: &str) -> EntryResult {
        EntryResult {
            entry: entry.to_string(),
            report: ApiReport {
                entries: vec![ApiEntry { name: "a".to_string(), file: PathBuf::from(entry), text: text.to_string() }],
                warnings: vec![],
            },
            golden: None,
            verification: None,
        }
    }

    #[test]
    fn test_make_relative_child_dir() {
        let result = make_relative(Path::new("/project/src/index.d.ts"), Path::new("/project"));
        assert_eq!(result, Some(PathBuf::from("src/index.d.ts")));
    }

    #[test]
    fn test_make_relative_sibling_dir() {
        let result = make_relative(Path::new("/project/apps/web/index.d.ts"), Path::new("/project/apps/api"));
        assert_eq!(result, Some(PathBuf::from("../web/index.d.ts")));
    }

    #[test]
    fn test_make_relative_same_path() {
        let result = make_relative(Path::new("/project/src"), Path::new("/project/src"));
        assert_eq!(result, Some(PathBuf::from(".")));
    }

    #[test]
    fn test_single_entry_has_no_header() {
        let run = RunResult { entries: vec![result("index.d.ts", "export declare const a: number;")] };
        let mut out = Vec::new();
        print_reports(&mut out, &run).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "export declare const a: number;\n");
    }

    #[test]
    fn test_several_entries_have_headers() {
        let run = RunResult { entries: vec![result("a.d.ts", "A"), result("b.d.ts", "B")] };
        let mut out = Vec::new();
        print_reports(&mut out, &run).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "// a.d.ts\nA\n\n// b.d.ts\nB\n");
    }

    #[test]
    fn test_json_output() {
        let mut entry = result("index.d.ts", "A");
        entry.report.warnings.push(Warning { symbol: "x".to_string(), kind: WarningKind::NoDeclaration });
        let run = RunResult { entries: vec![entry] };
        let mut out = Vec::new();
        print_json(&mut out, &run).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["entries"][0]["entry"], "index.d.ts");
        assert_eq!(value["entries"][0]["report"]["entries"][0]["text"], "A");
        assert_eq!(value["entries"][0]["report"]["warnings"][0]["kind"], "no_declaration");
        assert!(value["entries"][0].get("verification").is_none());
    }
}
