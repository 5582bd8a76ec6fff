//! # Language Module
//!
//! Objects that want to walk a syntax tree can provide the `Navigate` trait.
//! Such objects can take some action depending on the status of `TreeCursor`,
//! and then tell the walker where to go next.
//! Language specific operations such as tokenization are in the submodules.

pub mod integer;
pub mod linenum;
pub mod analysis;

use tree_sitter;
use lsp_types as lsp;
use colored::*;
use thiserror::Error;
use std::io;
use std::io::{Read,Write};
use std::str::FromStr;
use atty;
use log::{debug,error};

use crate::{STDRESULT,DYNERR};

/// Directive returned by a visitor, tells the walker where to go next.
pub enum Navigation {
    /// descend to the first child, if there is no child treat as `GotoSibling`
    GotoChild,
    /// go to the next sibling, if there is none ascend and do the same from there
    GotoSibling,
    /// go up to the parent and then to its next sibling
    GotoParentSibling,
    /// terminate the walk
    Exit
}

#[derive(Error,Debug)]
pub enum Error {
    #[error("Syntax error")]
    Syntax,
    #[error("Invalid Line Number")]
    LineNumber,
    #[error("Line too long")]
    LineTooLong,
    #[error("Tokenization error")]
    Tokenization,
    #[error("Detokenization error")]
    Detokenization,
    #[error("Parser did not produce a tree")]
    ParsingError,
    #[error("Parameter out of range")]
    OutOfRange
}

/// Text document owned by the caller.
/// The analyzers never hold on to it, they only read it.
#[derive(Clone)]
pub struct Document {
    pub text: String,
    pub version: Option<i32>
}

impl Document {
    pub fn from_string(text: String, version: i32) -> Self {
        Self {
            text,
            version: Some(version)
        }
    }
    pub fn from_file_path(path: &std::path::Path) -> Result<Self,DYNERR> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self {
            text,
            version: None
        })
    }
}

/// Walks a syntax tree depth first under control of the visitor.
/// The walk is iterative, there is no recursion no matter how deep the tree is.
pub trait Navigate {
    fn visit(&mut self,curs: &tree_sitter::TreeCursor) -> Result<Navigation,DYNERR>;
    fn walk(&mut self,tree: &tree_sitter::Tree) -> STDRESULT
    {
        let mut curs = tree.walk();
        let mut choice = Navigation::GotoChild;
        while !matches!(choice,Navigation::Exit)
        {
            if matches!(choice,Navigation::GotoChild) && curs.goto_first_child() {
                choice = self.visit(&curs)?;
            } else if matches!(choice,Navigation::GotoParentSibling) && curs.goto_parent() && curs.goto_next_sibling() {
                choice = self.visit(&curs)?;
            } else if matches!(choice,Navigation::GotoSibling) && curs.goto_next_sibling() {
                choice = self.visit(&curs)?;
            } else if curs.goto_next_sibling() {
                choice = self.visit(&curs)?;
            } else if curs.goto_parent() {
                choice = Navigation::GotoSibling;
            } else {
                choice = Navigation::Exit;
            }
        }
        Ok(())
    }
}

/// Get text of the node, source should be a single line.
/// Prevents panics if the range runs past the source, a trailing line separator is dropped.
pub fn node_text(node: &tree_sitter::Node,source: &str) -> String {
    let rng = node.byte_range();
    match source.get(rng) {
        Some(s) => s.trim_end_matches(&['\r','\n'][..]).to_string(),
        None => String::new()
    }
}

/// Parse the node text as a number, ignoring any spaces.
pub fn node_integer<T: FromStr + num_traits::PrimInt>(node: &tree_sitter::Node,source: &str) -> Option<T> {
    let txt = node_text(node,source).replace(" ","");
    match txt.parse::<T>() {
        Ok(num) => Some(num),
        Err(_) => None
    }
}

/// Convert a tree-sitter range to an LSP range.
/// The row and column are offsets, needed when the tree covers only a piece of the document.
/// Columns are byte offsets into the line, as tree-sitter reports them.
pub fn lsp_range(rng: tree_sitter::Range,row: isize,col: isize) -> lsp::Range {
    lsp::Range {
        start: lsp::Position {
            line: (row + rng.start_point.row as isize) as u32,
            character: (col + rng.start_point.column as isize) as u32
        },
        end: lsp::Position {
            line: (row + rng.end_point.row as isize) as u32,
            character: (col + rng.end_point.column as isize) as u32
        }
    }
}

/// Range of the node extended to the end of the line, `len` is the line length.
pub fn extended_range(node: &tree_sitter::Node,len: usize) -> tree_sitter::Range {
    let mut rng = node.range();
    let trimmed = match len > 0 {
        true => len - 1,
        false => 0
    };
    rng.end_point = tree_sitter::Point::new(rng.end_point.row,usize::max(trimmed,rng.end_point.column));
    rng.end_byte = usize::max(trimmed,rng.end_byte);
    rng
}

pub fn range_contains_pos(rng: &lsp::Range, pos: &lsp::Position) -> bool {
    if pos.line < rng.start.line || pos.line > rng.end.line {
        return false;
    }
    if pos.line == rng.start.line && pos.character < rng.start.character {
        return false;
    }
    if pos.line == rng.end.line && pos.character > rng.end.character {
        return false;
    }
    true
}

pub fn range_contains_range(outer: &lsp::Range, inner: &lsp::Range) -> bool {
    range_contains_pos(outer,&inner.start) && range_contains_pos(outer,&inner.end)
}

/// Apply a set of non-overlapping single line edits to `txt`.
/// Edit rows are relative to the document, `row_offset` is the document row of the first line of `txt`.
/// Edit columns are byte offsets, same as `lsp_range` produces.
/// Line separators are preserved.
pub fn apply_edits(txt: &str, edits: &Vec<lsp::TextEdit>, row_offset: u32) -> Result<String,DYNERR> {
    let mut lines: Vec<String> = txt.split_inclusive('\n').map(|s| s.to_string()).collect();
    let mut sorted = edits.clone();
    // apply right to left so earlier columns stay valid
    sorted.sort_by(|a,b| (b.range.start.line,b.range.start.character).cmp(&(a.range.start.line,a.range.start.character)));
    for edit in sorted {
        if edit.range.start.line != edit.range.end.line || edit.range.start.line < row_offset {
            error!("edit spans lines or precedes the text");
            return Err(Box::new(Error::OutOfRange));
        }
        let row = (edit.range.start.line - row_offset) as usize;
        let line = match lines.get_mut(row) {
            Some(l) => l,
            None => {
                error!("edit row {} is past the end of the text",edit.range.start.line);
                return Err(Box::new(Error::OutOfRange));
            }
        };
        let (c0,c1) = (edit.range.start.character as usize,edit.range.end.character as usize);
        let new_line = match (line.get(0..c0),line.get(c0..c1),line.get(c1..)) {
            (Some(before),Some(_),Some(after)) => [before,&edit.new_text,after].concat(),
            _ => {
                error!("edit columns {}..{} out of bounds",c0,c1);
                return Err(Box::new(Error::OutOfRange));
            }
        };
        *line = new_line;
    }
    Ok(lines.concat())
}

/// Try to update an integer from a serde `Value` presumed to be an object.
/// If there is any error do not change the value.
pub fn update_json_i64(maybe_obj: &serde_json::Value, key: &str, curr: &mut i64) {
    if let Some(obj) = maybe_obj.as_object() {
        if let Some(x) = obj.get(key) {
            if let Some(val) = x.as_i64() {
                *curr = val;
            }
        }
    }
}

/// Try to update an integer list from a serde `Value` presumed to be an object.
/// If there is any error do not change the value.
pub fn update_json_vec(maybe_obj: &serde_json::Value, key: &str, curr: &mut Vec<i64>) {
    if let Some(obj) = maybe_obj.as_object() {
        if let Some(x) = obj.get(key) {
            if let Some(a) = x.as_array() {
                let mut ans = Vec::new();
                for v in a {
                    match v.as_i64() {
                        Some(i) => ans.push(i),
                        None => return
                    }
                }
                *curr = ans;
            }
        }
    }
}

/// Try to update a diagnostic severity from a serde `Value` presumed to be an object.
/// The value `"ignore"` sets the option to `None`.
/// If there is any error do not change the value.
pub fn update_json_severity(maybe_obj: &serde_json::Value, key: &str, curr: &mut Option<lsp::DiagnosticSeverity>) {
    if let Some(obj) = maybe_obj.as_object() {
        if let Some(x) = obj.get(key) {
            match x.as_str() {
                Some("error") => *curr = Some(lsp::DiagnosticSeverity::ERROR),
                Some("warn") => *curr = Some(lsp::DiagnosticSeverity::WARNING),
                Some("info") => *curr = Some(lsp::DiagnosticSeverity::INFORMATION),
                Some("hint") => *curr = Some(lsp::DiagnosticSeverity::HINT),
                Some("ignore") => *curr = None,
                _ => {}
            }
        }
    }
}

pub struct SyntaxCheckVisitor {
    pub code: String,
    pub err_count: usize,
    pub curr_line: usize
}

impl SyntaxCheckVisitor {
    fn new(prog: String) -> Self {
        Self { code: prog, err_count: 0, curr_line: 0 }
    }
}

impl Navigate for SyntaxCheckVisitor {
    fn visit(&mut self,curs: &tree_sitter::TreeCursor) -> Result<Navigation,DYNERR>
    {
        if curs.node().is_error() || curs.node().is_missing()
        {
            self.err_count += 1;
            let b1 = curs.node().start_byte();
            let b2 = curs.node().end_byte();
            let l2 = self.code.trim_end().len();
            eprintln!("{} row {} col {}","ERROR".red(),self.curr_line,b1);
            debug!("error bounds {} {} {}",b1,b2,l2);
            eprintln!("    {}{}{}",
                match self.code.get(0..b1) { None => "???", Some(s) => s },
                match self.code.get(b1..b2) { None => "???".normal(), Some(s) => s.red().bold() },
                match self.code.get(b2..l2) { None => "", Some(s) => s });
        }
        return Ok(Navigation::GotoChild);
    }
}

/// Simple verify, returns an error if any issues
pub fn verify_str(lang: &tree_sitter::Language,code: &str) -> STDRESULT {
    let mut parser = tree_sitter::Parser::new();
    parser.set_language(lang)?;
    let mut visitor = SyntaxCheckVisitor::new(String::new());
    for line in code.lines()
    {
        if line.trim().len()>0 {
            visitor.code = String::from(line) + "\n";
            match parser.parse(&visitor.code,None) {
                Some(tree) => visitor.walk(&tree)?,
                None => return Err(Box::new(Error::ParsingError))
            }
        }
        visitor.curr_line += 1;
    }
    if visitor.err_count > 0 {
        return Err(Box::new(Error::Syntax));
    }
    Ok(())
}

/// Console line entry, `bye` terminates.
pub fn line_entry(prompt: &str) -> String {
    let mut code = String::new();
    eprintln!("Line entry interface.");
    eprintln!("This is a blind accumulation of lines.");
    eprintln!("Analysis occurs when entry is terminated.");
    eprintln!("`bye` terminates.");
    loop {
        eprint!("{} ",prompt);
        let mut line = String::new();
        if io::stderr().flush().is_err() {
            break;
        }
        match io::stdin().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        };
        if line.trim_end()=="bye" {
            break;
        }
        code += &line;
    }
    code
}

/// If stdin is the console start line entry, otherwise read the pipe into a string.
pub fn read_stdin(prompt: &str) -> Result<String,DYNERR> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(line_entry(prompt));
    }
    let mut program = String::new();
    io::stdin().read_to_string(&mut program)?;
    Ok(program)
}

/// Write each line and its S-expression to stderr
pub fn eprint_lines_sexpr(lang: &tree_sitter::Language, program: &str) -> STDRESULT {
    let mut parser = tree_sitter::Parser::new();
    parser.set_language(lang)?;
    for line in program.lines() {
        if line.trim().len()==0 {
            continue;
        }
        match parser.parse(String::from(line) + "\n",None) {
            Some(tree) => eprintln!("{}\n{}",line,tree.root_node().to_sexp()),
            None => return Err(Box::new(Error::ParsingError))
        }
    }
    Ok(())
}

/// Display a diagnostic on the console, with the offending text highlighted
pub fn eprint_diagnostic(diag: &lsp::Diagnostic, program: &str) {
    let (label,highlight) = match diag.severity {
        Some(lsp::DiagnosticSeverity::ERROR) => ("ERROR".red(),Color::Red),
        Some(lsp::DiagnosticSeverity::WARNING) => ("WARNING".bright_yellow(),Color::BrightYellow),
        _ => ("INFO".bright_blue(),Color::BrightBlue)
    };
    let row = diag.range.start.line as usize;
    eprintln!("{} row {} col {}: {}",label,row+1,diag.range.start.character+1,diag.message);
    if let Some(line) = program.lines().nth(row) {
        let c0 = usize::min(diag.range.start.character as usize,line.len());
        let c1 = match diag.range.end.line as usize == row {
            true => usize::min(diag.range.end.character as usize,line.len()),
            false => line.len()
        };
        let c1 = usize::max(c0,c1);
        match (line.get(0..c0),line.get(c0..c1),line.get(c1..)) {
            (Some(before),Some(mid),Some(after)) => eprintln!("    {}{}{}",before,mid.color(highlight).bold(),after),
            _ => eprintln!("    {}",line)
        }
    }
}

#[cfg(test)]
mod lang_tests {
    use lsp_types as lsp;
    #[test]
    fn edits_keep_separators() {
        let txt = "10 GOTO 20\r\n20 END\r\n";
        let edits = vec![
            lsp::TextEdit::new(lsp::Range::new(lsp::Position::new(0,8),lsp::Position::new(0,10)),"30".to_string()),
            lsp::TextEdit::new(lsp::Range::new(lsp::Position::new(1,0),lsp::Position::new(1,2)),"30".to_string()),
            lsp::TextEdit::new(lsp::Range::new(lsp::Position::new(0,0),lsp::Position::new(0,2)),"100".to_string())
        ];
        let ans = super::apply_edits(txt,&edits,0).expect("edits failed");
        assert_eq!(ans,"100 GOTO 30\r\n30 END\r\n");
    }
    #[test]
    fn edit_out_of_bounds() {
        let edits = vec![
            lsp::TextEdit::new(lsp::Range::new(lsp::Position::new(3,0),lsp::Position::new(3,1)),"1".to_string())
        ];
        assert!(super::apply_edits("10 END\n",&edits,0).is_err());
    }
    #[test]
    fn edits_after_multibyte_text() {
        // the label column counts the two bytes of each accented letter
        let txt = "10 PRINT \"\u{e9}\u{e9}\": GOTO 20\n";
        let edits = vec![
            lsp::TextEdit::new(lsp::Range::new(lsp::Position::new(0,22),lsp::Position::new(0,24)),"110".to_string())
        ];
        let ans = super::apply_edits(txt,&edits,0).expect("edits failed");
        assert_eq!(ans,"10 PRINT \"\u{e9}\u{e9}\": GOTO 110\n");
    }
    #[test]
    fn edit_inside_multibyte_char() {
        let edits = vec![
            lsp::TextEdit::new(lsp::Range::new(lsp::Position::new(0,1),lsp::Position::new(0,2)),"x".to_string())
        ];
        assert!(super::apply_edits("\u{e9}\n",&edits,0).is_err());
    }
    #[test]
    fn severity_from_json() {
        let val = serde_json::json!({"a": "ignore", "b": "info", "c": 3});
        let mut a = Some(lsp::DiagnosticSeverity::ERROR);
        let mut b = None;
        let mut c = Some(lsp::DiagnosticSeverity::WARNING);
        super::update_json_severity(&val,"a",&mut a);
        super::update_json_severity(&val,"b",&mut b);
        super::update_json_severity(&val,"c",&mut c);
        assert_eq!(a,None);
        assert_eq!(b,Some(lsp::DiagnosticSeverity::INFORMATION));
        assert_eq!(c,Some(lsp::DiagnosticSeverity::WARNING));
    }
}
