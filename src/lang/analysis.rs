//! # Analysis interface
//!
//! The `verify` subcommand drives any analyzer through the `Analysis` trait object.
//! Each call to `analyze` starts from scratch, nothing is carried over from a previous document.

use lsp_types as lsp;
use crate::STDRESULT;

pub trait Analysis {
    /// Analyze a document to produce diagnostic and symbol information.
    fn analyze(&mut self,doc: &super::Document) -> STDRESULT;
    /// Parse the JSON to update the configuration.
    /// Unknown keys or unexpected values are ignored.
    fn update_config(&mut self,json_str: &str) -> STDRESULT;
    /// Get a clone of the diagnostics from the last analysis.
    fn get_diags(&self,doc: &super::Document) -> Vec<lsp::Diagnostic>;
    fn err_warn_info_counts(&self) -> [usize;3];
    fn eprint_lines_sexpr(&self,program: &str) -> STDRESULT;
    /// If console start interactive entry, otherwise empty input pipe into string.
    fn read_stdin(&self) -> Result<String,crate::DYNERR>;
}

pub fn basic_diag(range: lsp::Range,mess: &str,severity: lsp::DiagnosticSeverity) -> lsp::Diagnostic {
    lsp::Diagnostic {
        range,
        severity: Some(severity),
        code: None,
        code_description: None,
        source: None,
        message: mess.to_string(),
        related_information: None,
        tags: None,
        data: None
    }
}

/// Count diagnostics by severity, returns `[errors,warnings,information]`.
pub fn count_severities(diags: &[lsp::Diagnostic]) -> [usize;3] {
    let mut ans = [0,0,0];
    for item in diags {
        match item.severity {
            Some(lsp::DiagnosticSeverity::ERROR) => ans[0] += 1,
            Some(lsp::DiagnosticSeverity::WARNING) => ans[1] += 1,
            Some(lsp::DiagnosticSeverity::INFORMATION) => ans[2] += 1,
            _ => {}
        }
    }
    ans
}
