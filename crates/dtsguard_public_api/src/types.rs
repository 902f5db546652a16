use serde::Serialize;
use std::path::PathBuf;

/// Rendered text of one exported symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiEntry {
    pub name: String,
    /// File holding the rendered statement
    pub file: PathBuf,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// The symbol has no declaration in the loaded files
    NoDeclaration,
    /// No exported statement encloses the declaration
    NoExportStatement,
    /// The entry file has no import or export statement
    NotAModule,
}

/// A symbol that was skipped while rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub symbol: String,
    pub kind: WarningKind,
}

impl Warning {
    pub fn message(&self) -> String {
        match self.kind {
            WarningKind::NoDeclaration => format!("'{}' has no declaration and was skipped", self.symbol),
            WarningKind::NoExportStatement => {
                format!("'{}' has no exported statement and was skipped", self.symbol)
            }
            WarningKind::NotAModule => format!("{} is not a module, nothing is exported", self.symbol),
        }
    }
}

/// Public API of one entry file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApiReport {
    pub entries: Vec<ApiEntry>,
    pub warnings: Vec<Warning>,
}

impl ApiReport {
    /// Entries separated by exactly one blank line, without a trailing newline.
    pub fn render(&self) -> String {
        self.entries.iter().map(|entry| entry.text.as_str()).collect::<Vec<_>>().join("\n\n")
    }
}

/// Outcome of comparing a rendered API with its golden file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verification {
    Match,
    Missing,
    /// 1-based line of the first difference, with both versions of it
    Changed { line: usize, expected: Option<String>, actual: Option<String> },
}

/// Result for one entry of a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct EntryResult {
    /// Entry path relative to the root
    pub entry: String,
    pub report: ApiReport,
    /// Golden file written or compared, when one was used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub golden: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<Verification>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub entries: Vec<EntryResult>,
}

impl RunResult {
    pub fn warning_count(&self) -> usize {
        self.entries.iter().map(|e| e.report.warnings.len()).sum()
    }

    /// Entries whose golden file is missing or out of date.
    pub fn failed_verifications(&self) -> impl Iterator<Item = &EntryResult> {
        self.entries
            .iter()
            .filter(|e| matches!(e.verification, Some(Verification::Missing | Verification::Changed { .. })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, text: &str) -> ApiEntry {
        ApiEntry { name: name.to_string(), file: PathBuf::from("/a.d.ts"), text: text.to_string() }
    }

    #[test]
    fn test_render_joins_with_single_blank_line() {
        let report = ApiReport {
            entries: vec![entry("a", "export declare const a: number;"), entry("b", "export declare const b: string;")],
            warnings: vec![],
        };
        assert_eq!(report.render(), "export declare const a: number;\n\nexport declare const b: string;");
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(ApiReport::default().render(), "");
    }

    #[test]
    fn test_warning_serializes_kind_in_snake_case() {
        let warning = Warning { symbol: "Thing".to_string(), kind: WarningKind::NoDeclaration };
        let json = serde_json::to_string(&warning).unwrap();
        assert_eq!(json, r#"{"symbol":"Thing","kind":"no_declaration"}"#);
    }

    #[test]
    fn test_failed_verifications() {
        let result = |verification| EntryResult {
            entry: "a.d.ts".to_string(),
            report: ApiReport::default(),
            golden: None,
            verification,
        };
        let run = RunResult {
            entries: vec![
                result(Some(Verification::Match)),
                result(Some(Verification::Missing)),
                result(None),
                result(Some(Verification::Changed { line: 2, expected: None, actual: Some("x".to_string()) })),
            ],
        };
        assert_eq!(run.failed_verifications().count(), 2);
    }
}
