//! # Integer BASIC analysis and transformations
//!
//! This uses `tree_sitter_integerbasic` to provide language parsing.
//! Tokenization and detokenization is in `tokenizer`, diagnostics and
//! the symbol table are in `diagnostics`, renumbering is in `renumber`.

mod token_maps;
#[cfg(test)]
mod detokenize_test;
pub mod tokenizer;
pub mod diagnostics;
pub mod renumber;
pub mod settings;

use std::collections::{HashMap,HashSet};
use lsp_types as lsp;
use super::{node_text,lsp_range,range_contains_pos};

/// Any node that can be assigned to
pub const LEXPR: [&str;4] = ["str_name","int_name","str_array","int_array"];
/// Innermost variable nodes
pub const SIMPLE_VAR_TYPES: [&str;2] = ["str_name","int_name"];
/// If one of these follows a variable name, the variable is an array.
/// A subscripted string is a substring or a length, never an array.
pub const ARRAY_OPEN: [&str;2] = ["open_int","open_dim_int"];

/// Information about a specific line label.
/// The label itself is a key that maps to this information.
#[derive(Clone,Debug,PartialEq)]
pub struct Line {
    /// remark at the end of the line, if any
    pub rem: Option<String>,
    /// the range of the primary line number
    pub primary: lsp::Range,
    /// GOSUB statements referencing this line
    pub gosubs: Vec<lsp::Range>,
    /// GOTO and THEN statements referencing this line
    pub gotos: Vec<lsp::Range>
}

/// Information about a specific variable.
/// The key is always put in uppercase, but all case variations that occur are saved.
/// An integer array and its scalar form share one key, so does a string and its slice.
#[derive(Clone,Debug,PartialEq)]
pub struct Variable {
    pub decs: Vec<lsp::Range>,
    pub defs: Vec<lsp::Range>,
    pub refs: Vec<lsp::Range>,
    pub is_array: bool,
    pub is_string: bool,
    pub case: HashSet<String>
}

impl Variable {
    pub fn new() -> Self {
        Self {
            decs: Vec::new(),
            defs: Vec::new(),
            refs: Vec::new(),
            is_array: false,
            is_string: false,
            case: HashSet::new()
        }
    }
}

/// Symbol table for one document snapshot, rebuilt by every analysis
#[derive(Clone,Debug,PartialEq)]
pub struct Symbols {
    pub lines: HashMap<i64,Line>,
    pub vars: HashMap<String,Variable>
}

impl Symbols {
    pub fn new() -> Self {
        Self {
            lines: HashMap::new(),
            vars: HashMap::new()
        }
    }
    pub fn docstring(&self,linenum: i64) -> Option<String> {
        match self.lines.get(&linenum) {
            Some(l) => l.rem.clone(),
            None => None
        }
    }
    /// All the places that branch to `linenum`, subroutine calls first
    pub fn line_refs(&self,linenum: i64) -> Vec<lsp::Range> {
        match self.lines.get(&linenum) {
            Some(l) => [l.gosubs.clone(),l.gotos.clone()].concat(),
            None => Vec::new()
        }
    }
    /// Find the variable with any occurrence at `pos`, returns the key and the information
    pub fn var_at(&self,pos: &lsp::Position) -> Option<(String,&Variable)> {
        for (key,var) in &self.vars {
            for rng in var.decs.iter().chain(var.defs.iter()).chain(var.refs.iter()) {
                if range_contains_pos(rng,pos) {
                    return Some((key.clone(),var));
                }
            }
        }
        None
    }
}

/// Gather key information for a variable.
/// `node` must be the inner name, `str_name` or `int_name`.
/// Returns (normalized name,specific name,is_array,is_string), the key includes `$` if a string.
pub fn var_to_key(node: tree_sitter::Node,line: &str) -> (String,String,bool,bool)
{
    let is_string = node.kind() == "str_name";
    let is_array = match node.next_named_sibling() {
        Some(next) => !is_string && ARRAY_OPEN.contains(&next.kind()),
        None => false
    };
    let n = node_text(&node,line).replace(" ","");
    (n.to_uppercase(),n,is_array,is_string)
}

/// Calls `var_to_key`, going down to find the inner name if necessary.
/// `node` can be any LEXPR type, the range returned is that of the inner name.
pub fn lexpr_to_key(node: tree_sitter::Node,row: isize,line: &str) -> Option<(String,String,bool,bool,lsp::Range)>
{
    if SIMPLE_VAR_TYPES.contains(&node.kind()) {
        let (k,c,a,s) = var_to_key(node,line);
        return Some((k,c,a,s,lsp_range(node.range(),row,0)));
    }
    match node.named_child(0) {
        Some(child) => {
            let (k,c,a,s) = var_to_key(child,line);
            Some((k,c,a,s,lsp_range(child.range(),row,0)))
        },
        None => None
    }
}

/// Assuming we are on an opening parenthesis in a DIM statement,
/// return the node following the corresponding closing parenthesis.
/// This is needed because DIM variables are parsed as a flat sequence.
pub fn pass_through_subscript<'a>(node: tree_sitter::Node<'a>,line: &str) -> Option<tree_sitter::Node<'a>>
{
    let mut depth = 1;
    let mut maybe_next = node.next_named_sibling();
    while let Some(next) = maybe_next {
        if depth == 0 {
            break;
        }
        if next.kind().starts_with("open_") {
            depth += 1;
        } else if next.kind().starts_with("close") {
            depth -= 1;
        } else if next.kind().starts_with("fcall_") && node_text(&next,line).ends_with("(") {
            depth += 1;
        }
        maybe_next = next.next_named_sibling();
    }
    maybe_next
}

/// Starting in a negative ASCII stringlike context, where the trigger byte
/// has already been consumed, escape the remaining bytes within that context.
/// Bytes in `escapes`, or outside the printable negative ASCII range, are put as `\xhh`.
/// If there is a literal hex escape the backslash is put as `\x5c`.
/// Return the escaped string and the index to the terminator.
/// The terminator is not part of the returned string.
pub fn bytes_to_escaped_string(escapes: &[i64], bytes: &[u8], offset: usize, terminator: &[u8]) -> (String,usize)
{
    const BACKSLASH: u8 = 128 + 92;
    const LOWER_X: u8 = 128 + 120;
    let is_hex = |x: u8| -> bool {
        x>=176 && x<=185 || x>=193 && x<=198 || x>=225 && x<=230
    };
    let mut ans = String::new();
    let mut idx = offset;
    while idx < bytes.len() {
        if terminator.contains(&bytes[idx]) {
            break;
        }
        if bytes[idx] == BACKSLASH && idx + 3 < bytes.len() {
            if bytes[idx+1]==LOWER_X && is_hex(bytes[idx+2]) && is_hex(bytes[idx+3]) {
                ans += "\\x5c";
            } else {
                ans += "\\";
            }
        } else if escapes.contains(&(bytes[idx] as i64)) || bytes[idx] > 254 || bytes[idx] < 128 {
            ans += &format!("\\x{:02x}",bytes[idx]);
        } else {
            ans.push(char::from(bytes[idx] - 128));
        }
        idx += 1;
    }
    (ans,idx)
}

#[cfg(test)]
mod symbol_tests {
    use lsp_types as lsp;
    #[test]
    fn line_refs_order() {
        let mut sym = super::Symbols::new();
        let rng = |c: u32| lsp::Range::new(lsp::Position::new(0,c),lsp::Position::new(0,c+2));
        sym.lines.insert(10,super::Line {
            rem: Some("START".to_string()),
            primary: rng(0),
            gosubs: vec![rng(20)],
            gotos: vec![rng(10)]
        });
        assert_eq!(sym.line_refs(10),vec![rng(20),rng(10)]);
        assert_eq!(sym.docstring(10),Some("START".to_string()));
        assert_eq!(sym.line_refs(20),Vec::<lsp::Range>::new());
    }
    #[test]
    fn var_at_position() {
        let mut sym = super::Symbols::new();
        let mut var = super::Variable::new();
        var.refs.push(lsp::Range::new(lsp::Position::new(3,5),lsp::Position::new(3,7)));
        sym.vars.insert("AB".to_string(),var);
        assert!(sym.var_at(&lsp::Position::new(3,6)).is_some());
        assert!(sym.var_at(&lsp::Position::new(2,6)).is_none());
    }
    #[test]
    fn escaped_context() {
        // "\x41" stored literally, then a control character, then the close quote
        let bytes = [0xdc,0xf8,0xb4,0xb1,0x84,0xc1,0x29,0xc2];
        let (s,idx) = super::bytes_to_escaped_string(&[138,141],&bytes,0,&[0x29,0x01]);
        assert_eq!(s,"\\x5cx41\x04A");
        assert_eq!(idx,6);
    }
    #[test]
    fn configured_escapes() {
        let bytes = [0x8a,0xc1,0x8d,0xff,0x01];
        let (s,idx) = super::bytes_to_escaped_string(&[138,141],&bytes,0,&[0x01]);
        assert_eq!(s,"\\x8aA\\x8d\\xff");
        assert_eq!(idx,4);
    }
}
