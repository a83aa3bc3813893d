//! Capability snapshot of the external conversion backends.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::process::{Command, Stdio};

use serde::Serialize;

use crate::lang::LanguageSpec;

/// External programs the pipeline knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Layout-preserving PDF to DOCX converter
    Pdf2Docx,
    /// OCR-PDF pipeline (deskew, clean, OCR layer)
    Ocrmypdf,
    /// OCR engine
    Tesseract,
    /// Poppler page rasterizer
    Pdftoppm,
}

impl Tool {
    /// All known tools, in probing order.
    pub const ALL: [Tool; 4] = [Tool::Pdf2Docx, Tool::Ocrmypdf, Tool::Tesseract, Tool::Pdftoppm];

    /// Display name, also the default binary name.
    pub fn name(self) -> &'static str {
        match self {
            Tool::Pdf2Docx => "pdf2docx",
            Tool::Ocrmypdf => "ocrmypdf",
            Tool::Tesseract => "tesseract",
            Tool::Pdftoppm => "pdftoppm",
        }
    }

    /// Arguments that make the tool print its version and exit.
    fn version_args(self) -> &'static [&'static str] {
        match self {
            Tool::Pdf2Docx => &["--help"],
            Tool::Ocrmypdf | Tool::Tesseract => &["--version"],
            Tool::Pdftoppm => &["-v"],
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where to find each tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    programs: BTreeMap<Tool, OsString>,
}

impl ToolPaths {
    /// Create tool paths using the default binary names (looked up on PATH).
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the program used for a tool.
    pub fn with_program(mut self, tool: Tool, program: impl Into<OsString>) -> Self {
        self.programs.insert(tool, program.into());
        self
    }

    /// Program used for a tool.
    pub fn program(&self, tool: Tool) -> &OsStr {
        self.programs
            .get(&tool)
            .map(OsString::as_os_str)
            .unwrap_or_else(|| OsStr::new(tool.name()))
    }
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            programs: Tool::ALL
                .iter()
                .map(|&tool| (tool, OsString::from(tool.name())))
                .collect(),
        }
    }
}

/// Process-wide snapshot of which tools are installed.
///
/// Computed once with [`Capabilities::probe`] and passed to the strategy
/// selector; nothing in the pipeline queries the environment on its own.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Capabilities {
    /// Installed tools and the first line of their version output
    pub tools: BTreeMap<Tool, String>,

    /// Languages reported by `tesseract --list-langs`
    pub ocr_languages: Vec<String>,

    #[serde(skip)]
    paths: ToolPaths,
}

impl Capabilities {
    /// Snapshot with no tools installed.
    pub fn none() -> Self {
        Self::default()
    }

    /// Snapshot with no tools installed, using custom paths.
    pub fn none_with_paths(paths: ToolPaths) -> Self {
        Self {
            paths,
            ..Self::default()
        }
    }

    /// Probe the environment for every known tool.
    pub fn probe(paths: &ToolPaths) -> Self {
        let mut caps = Self::none_with_paths(paths.clone());

        for tool in Tool::ALL {
            match probe_version(paths.program(tool), tool.version_args()) {
                Some(version) => {
                    log::debug!("Found {}: {}", tool, version);
                    caps.tools.insert(tool, version);
                }
                None => log::debug!("{} not available", tool),
            }
        }

        if caps.has(Tool::Tesseract) {
            caps.ocr_languages = probe_languages(paths.program(Tool::Tesseract));
        }

        log::info!(
            "Capabilities: {} ({} OCR languages)",
            caps.summary(),
            caps.ocr_languages.len()
        );
        caps
    }

    /// Mark a tool as installed.
    pub fn with_tool(mut self, tool: Tool, version: impl Into<String>) -> Self {
        self.tools.insert(tool, version.into());
        self
    }

    /// Set the installed OCR languages.
    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ocr_languages = languages.into_iter().map(Into::into).collect();
        self
    }

    /// Check whether a tool is installed.
    pub fn has(&self, tool: Tool) -> bool {
        self.tools.contains_key(&tool)
    }

    /// Version line of an installed tool.
    pub fn version(&self, tool: Tool) -> Option<&str> {
        self.tools.get(&tool).map(String::as_str)
    }

    /// Tool paths the snapshot was taken with.
    pub fn paths(&self) -> &ToolPaths {
        &self.paths
    }

    /// Program to run for a tool.
    pub fn program(&self, tool: Tool) -> &OsStr {
        self.paths.program(tool)
    }

    /// Languages of `spec` that tesseract does not report as installed.
    ///
    /// Empty when the language list is unknown.
    pub fn missing_languages(&self, spec: &LanguageSpec) -> Vec<String> {
        if self.ocr_languages.is_empty() {
            return vec![];
        }
        spec.languages()
            .iter()
            .map(|l| l.code().to_string())
            .filter(|code| !self.ocr_languages.iter().any(|l| l == code))
            .collect()
    }

    /// Comma-separated list of installed tools.
    pub fn summary(&self) -> String {
        if self.tools.is_empty() {
            return "no external tools".to_string();
        }
        self.tools
            .keys()
            .map(|t| t.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Run a version command; any successfully spawned process counts as
/// installed, whatever its exit status.
fn probe_version(program: &OsStr, args: &[&str]) -> Option<String> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .ok()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let line = stdout
        .lines()
        .chain(stderr.lines())
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("unknown version");
    Some(line.to_string())
}

fn probe_languages(program: &OsStr) -> Vec<String> {
    match Command::new(program)
        .arg("--list-langs")
        .stdin(Stdio::null())
        .output()
    {
        Ok(output) => {
            // Older tesseract releases print the list on stderr.
            let mut text = String::from_utf8_lossy(&output.stdout).to_string();
            if text.trim().is_empty() {
                text = String::from_utf8_lossy(&output.stderr).to_string();
            }
            parse_language_list(&text)
        }
        Err(e) => {
            log::warn!("Could not list tesseract languages: {}", e);
            vec![]
        }
    }
}

/// Parse `tesseract --list-langs` output.
pub(crate) fn parse_language_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with("List of available languages"))
        .filter(|l| !l.contains(' '))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_paths_default_and_override() {
        let paths = ToolPaths::default();
        assert_eq!(paths.program(Tool::Tesseract), OsStr::new("tesseract"));

        let paths = paths.with_program(Tool::Tesseract, "/opt/tess/bin/tesseract");
        assert_eq!(
            paths.program(Tool::Tesseract),
            OsStr::new("/opt/tess/bin/tesseract")
        );
        assert_eq!(paths.program(Tool::Pdftoppm), OsStr::new("pdftoppm"));
    }

    #[test]
    fn test_capabilities_builder() {
        let caps = Capabilities::none()
            .with_tool(Tool::Tesseract, "tesseract 5.3.0")
            .with_languages(["ckb", "eng", "osd"]);

        assert!(caps.has(Tool::Tesseract));
        assert!(!caps.has(Tool::Pdf2Docx));
        assert_eq!(caps.version(Tool::Tesseract), Some("tesseract 5.3.0"));
        assert_eq!(caps.summary(), "tesseract");
        assert_eq!(Capabilities::none().summary(), "no external tools");
    }

    #[test]
    fn test_missing_languages() {
        let caps = Capabilities::none().with_languages(["ckb", "eng"]);
        let spec = LanguageSpec::parse("ckb+ara+eng").unwrap();
        assert_eq!(caps.missing_languages(&spec), vec!["ara".to_string()]);

        let unknown = Capabilities::none();
        assert!(unknown.missing_languages(&spec).is_empty());
    }

    #[test]
    fn test_parse_language_list() {
        let output = "List of available languages in \"/usr/share/tesseract-ocr/5/tessdata/\" (3):\nckb\neng\nosd\n";
        assert_eq!(parse_language_list(output), vec!["ckb", "eng", "osd"]);
    }

    #[test]
    fn test_probe_missing_tools() {
        let mut paths = ToolPaths::new();
        for tool in Tool::ALL {
            paths = paths.with_program(tool, "kurdocx-no-such-binary");
        }
        let caps = Capabilities::probe(&paths);
        assert!(caps.tools.is_empty());
        assert!(caps.ocr_languages.is_empty());
    }
}
