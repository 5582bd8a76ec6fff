//! Parse settings string sent by any client.
//!
//! The keys mirror the ones an editor extension would send, grouped by concern.
//! Each consumer copies what it needs when `set_config` is called.

use serde_json;
use crate::DYNERR;
use crate::lang::{update_json_i64,update_json_vec,update_json_severity};
use lsp_types::DiagnosticSeverity;

#[derive(Clone,Debug,PartialEq)]
pub struct Flag {
    pub case_sensitive: Option<DiagnosticSeverity>,
    pub undeclared_arrays: Option<DiagnosticSeverity>,
    pub undefined_variables: Option<DiagnosticSeverity>,
    pub bad_references: Option<DiagnosticSeverity>,
    pub immediate_mode: Option<DiagnosticSeverity>
}
#[derive(Clone,Debug,PartialEq)]
pub struct Warn {
    pub length: i64
}
#[derive(Clone,Debug,PartialEq)]
pub struct Detokenizer {
    /// stored bytes that are always rendered as hex escapes
    pub escapes: Vec<i64>,
    pub max_lines: i64,
    pub max_line_length: i64
}
#[derive(Clone,Debug,PartialEq)]
pub struct Settings {
    pub flag: Flag,
    pub warn: Warn,
    pub detokenizer: Detokenizer
}

impl Settings {
    pub fn new() -> Self {
        Self {
            flag : Flag {
                case_sensitive: None,
                undeclared_arrays: Some(DiagnosticSeverity::WARNING),
                undefined_variables: Some(DiagnosticSeverity::WARNING),
                bad_references: Some(DiagnosticSeverity::ERROR),
                immediate_mode: Some(DiagnosticSeverity::ERROR)
            },
            warn : Warn {
                length: 150
            },
            detokenizer : Detokenizer {
                escapes: vec![138,141],
                max_lines: 5000,
                max_line_length: 255
            }
        }
    }
}

/// Start from the defaults and apply whatever can be understood in `json`.
/// Text that is not JSON at all is an error, anything else is forgiven.
pub fn parse(json: &str) -> Result<Settings,DYNERR> {
    let mut ans = Settings::new();
    let root = serde_json::from_str::<serde_json::Value>(json)?;
    if let Some(obj) = root.as_object() {
        for (key,val) in obj {
            match key.as_str() {
                "flag" => {
                    update_json_severity(val,"caseSensitive",&mut ans.flag.case_sensitive);
                    update_json_severity(val,"undeclaredArrays",&mut ans.flag.undeclared_arrays);
                    update_json_severity(val,"undefinedVariables",&mut ans.flag.undefined_variables);
                    update_json_severity(val,"badReferences",&mut ans.flag.bad_references);
                    update_json_severity(val,"immediateMode",&mut ans.flag.immediate_mode);
                },
                "warn" => {
                    update_json_i64(val,"length",&mut ans.warn.length);
                },
                "detokenizer" => {
                    update_json_i64(val,"maxLineLength",&mut ans.detokenizer.max_line_length);
                    update_json_i64(val,"maxLines",&mut ans.detokenizer.max_lines);
                    update_json_vec(val,"escapes",&mut ans.detokenizer.escapes);
                },
                _ => {}
            }
        }
    }
    Ok(ans)
}

#[cfg(test)]
mod settings_tests {
    use lsp_types::DiagnosticSeverity;
    #[test]
    fn defaults_survive_junk() {
        let s = super::parse(r#"{"flag": {"caseSensitive": 5}, "warn": {"length": "long"}, "other": 1}"#).expect("parse failed");
        assert_eq!(s,super::Settings::new());
    }
    #[test]
    fn nested_keys() {
        let s = super::parse(r#"{"flag": {"caseSensitive": "warn", "immediateMode": "ignore"},
            "warn": {"length": 80}, "detokenizer": {"escapes": [141], "maxLines": 10}}"#).expect("parse failed");
        assert_eq!(s.flag.case_sensitive,Some(DiagnosticSeverity::WARNING));
        assert_eq!(s.flag.immediate_mode,None);
        assert_eq!(s.warn.length,80);
        assert_eq!(s.detokenizer.escapes,vec![141]);
        assert_eq!(s.detokenizer.max_lines,10);
        assert_eq!(s.detokenizer.max_line_length,255);
    }
    #[test]
    fn not_json() {
        assert!(super::parse("flag=on").is_err());
    }
}
