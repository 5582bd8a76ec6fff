//! Integer diagnostics module.
//!
//! Builds the symbol table and the diagnostics for one document.
//! There are two passes over the lines.  The first finds line labels and
//! variable declarations and assignments.  The second resolves references
//! against what the first found and checks operand values.

use tree_sitter;
use lsp_types::{Diagnostic,DiagnosticSeverity};
use crate::lang::{Document,Navigate,Navigation,lsp_range,node_text,node_integer,extended_range};
use crate::lang::analysis::{Analysis,basic_diag,count_severities};
use crate::{DYNERR,STDRESULT};
use super::settings::Settings;
use super::{Symbols,Line,Variable};
use log::{trace,warn};

const CASE_CHECK: [&str;5] = ["statement_", "fcall_", "str_name", "int_name", "op_"];
const BRANCHES: [&str;3] = ["statement_goto", "statement_gosub", "statement_then_line"];
const MAX_LINE_NUMBER: i64 = 32767;

#[derive(Clone,Copy,PartialEq)]
enum Pass {
    Primaries,
    References
}

pub struct Analyzer {
    config: Settings,
    pass: Pass,
    row: isize,
    line: String,
    diagnostics: Vec<Diagnostic>,
    symbols: Symbols,
    last_good_line_number: i64,
    in_dim_statement: bool,
    saved_depth: u32,
    keyword_prefix: regex::Regex
}

impl Navigate for Analyzer {
    fn visit(&mut self,curs: &tree_sitter::TreeCursor) -> Result<Navigation,DYNERR> {
        if curs.depth() < self.saved_depth {
            self.saved_depth = 0;
            self.in_dim_statement = false;
        }
        match self.pass {
            Pass::Primaries => self.visit_primaries(curs),
            Pass::References => self.visit_references(curs)
        }
    }
}

impl Analysis for Analyzer {
    fn analyze(&mut self,doc: &Document) -> STDRESULT {
        self.diagnostics = Vec::new();
        self.symbols = Symbols::new();
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&tree_sitter_integerbasic::LANGUAGE.into())?;
        for pass in [Pass::Primaries,Pass::References] {
            self.pass = pass;
            self.last_good_line_number = -1;
            self.saved_depth = 0;
            self.in_dim_statement = false;
            for (row,line) in doc.text.lines().enumerate() {
                self.row = row as isize;
                if line.trim_start().len()==0 {
                    continue;
                }
                trace!("analyze row {}",row);
                self.line = String::from(line) + "\n";
                match parser.parse(&self.line,None) {
                    Some(tree) => self.walk(&tree)?,
                    None => return Err(Box::new(crate::lang::Error::ParsingError))
                };
            }
        }
        Ok(())
    }
    fn update_config(&mut self,json_str: &str) -> STDRESULT {
        self.config = super::settings::parse(json_str)?;
        Ok(())
    }
    fn get_diags(&self,_doc: &Document) -> Vec<Diagnostic> {
        self.diagnostics.clone()
    }
    fn err_warn_info_counts(&self) -> [usize;3] {
        count_severities(&self.diagnostics)
    }
    fn eprint_lines_sexpr(&self,program: &str) -> STDRESULT {
        crate::lang::eprint_lines_sexpr(&tree_sitter_integerbasic::LANGUAGE.into(),program)
    }
    fn read_stdin(&self) -> Result<String,DYNERR> {
        crate::lang::read_stdin(">")
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            config: Settings::new(),
            pass: Pass::Primaries,
            row: 0,
            line: String::new(),
            diagnostics: Vec::new(),
            symbols: Symbols::new(),
            last_good_line_number: -1,
            in_dim_statement: false,
            saved_depth: 0,
            // the parser cannot see these, e.g., NEXTA=1 is illegal, but NEXT=1 or NEXT1=1 is fine
            keyword_prefix: regex::Regex::new(r"^(?i) *(D *S *P|N *O *D *S *P|N *E *X *T|I *N *P *U *T) *[A-Z]").expect("regex failure")
        }
    }
    pub fn set_config(&mut self,config: Settings) {
        self.config = config;
    }
    /// Symbols from the last analysis
    pub fn get_symbols(&self) -> Symbols {
        self.symbols.clone()
    }
    fn push(&mut self,rng: tree_sitter::Range,mess: &str,severity: DiagnosticSeverity) {
        self.diagnostics.push(basic_diag(lsp_range(rng,self.row,0),mess,severity));
    }
    /// Push only if the configured severity is not `None`
    fn push_flagged(&mut self,rng: tree_sitter::Range,mess: &str,flag: Option<DiagnosticSeverity>) {
        if let Some(severity) = flag {
            self.push(rng,mess,severity);
        }
    }
    /// Record up to `nmax` declarations or definitions starting with `maybe_node`
    /// and proceeding through its named siblings.
    fn process_variable_defs(&mut self,maybe_node: Option<tree_sitter::Node>,nmax: usize) {
        let mut maybe_next = maybe_node;
        let mut num_found = 0;
        while let Some(next) = maybe_next {
            if num_found >= nmax {
                return;
            }
            if super::LEXPR.contains(&next.kind()) {
                num_found += 1;
                if let Some((keyname,cased,is_array,is_string,rng)) = super::lexpr_to_key(next,self.row,&self.line) {
                    let var_info = self.symbols.vars.entry(keyname).or_insert_with(Variable::new);
                    var_info.is_array |= is_array;
                    var_info.is_string |= is_string;
                    match self.in_dim_statement {
                        true => var_info.decs.push(rng),
                        false => var_info.defs.push(rng)
                    }
                    var_info.case.insert(cased);
                }
            }
            maybe_next = match next.kind() {
                "open_dim_str" | "open_dim_int" => super::pass_through_subscript(next,&self.line),
                _ => next.next_named_sibling()
            };
        }
    }
    /// Trailing remark among the statements following the line label
    fn find_remark(&self,label: tree_sitter::Node) -> Option<String> {
        let mut remark = None;
        let mut maybe_statement = label.next_named_sibling();
        while let Some(statement) = maybe_statement {
            if let Some(keyword) = statement.named_child(0) {
                if keyword.kind()=="statement_rem" {
                    if let Some(txt) = keyword.next_named_sibling() {
                        remark = Some(node_text(&txt,&self.line).trim().to_string());
                    }
                }
            }
            maybe_statement = statement.next_named_sibling();
        }
        remark
    }
    fn visit_primaries(&mut self,curs: &tree_sitter::TreeCursor) -> Result<Navigation,DYNERR> {
        let node = curs.node();
        let kind = node.kind();
        if node.is_error() || node.is_missing() {
            return Ok(Navigation::GotoSibling);
        }
        let is_label = match node.parent() {
            Some(parent) => kind=="linenum" && parent.kind()=="line",
            None => false
        };
        if is_label {
            let rng = node.range();
            match node_integer::<i64>(&node,&self.line) {
                Some(num) if num < 0 || num > MAX_LINE_NUMBER => self.push(rng,"Out of range (0,32767)",DiagnosticSeverity::ERROR),
                Some(num) if num <= self.last_good_line_number => self.push(rng,"Line number out of order",DiagnosticSeverity::ERROR),
                Some(num) => {
                    let rem = self.find_remark(node);
                    self.symbols.lines.insert(num,Line {
                        rem,
                        primary: lsp_range(rng,self.row,0),
                        gosubs: Vec::new(),
                        gotos: Vec::new()
                    });
                    self.last_good_line_number = num;
                },
                None => {
                    // digits that do not even fit the integer type
                    trace!("line label did not parse: {}",node_text(&node,&self.line));
                    self.push(rng,"Out of range (0,32767)",DiagnosticSeverity::ERROR);
                }
            }
            return Ok(Navigation::GotoSibling);
        }
        if kind.starts_with("statement_dim_") {
            self.in_dim_statement = true;
            self.saved_depth = curs.depth();
            self.process_variable_defs(Some(node),64);
            return Ok(Navigation::GotoParentSibling);
        }
        if kind.starts_with("assignment_") {
            self.process_variable_defs(node.named_child(0),1);
            return Ok(Navigation::GotoParentSibling);
        }
        if kind.starts_with("statement_input_") {
            self.process_variable_defs(Some(node),64);
            return Ok(Navigation::GotoParentSibling);
        }
        if kind=="statement_for" {
            self.process_variable_defs(Some(node),1);
            return Ok(Navigation::GotoParentSibling);
        }
        // definitions are never more than 3 levels down
        match curs.depth() < 4 {
            true => Ok(Navigation::GotoChild),
            false => Ok(Navigation::GotoSibling)
        }
    }
    /// Error if a literal operand is outside `[low,high]`, other expressions are not checked
    fn value_range(&mut self,node: tree_sitter::Node,low: i64,high: i64) {
        if node.kind()!="integer" && node.kind()!="unary_aexpr" {
            return;
        }
        match node_integer::<i64>(&node,&self.line) {
            Some(val) if val < low || val > high => {
                self.push(node.range(),&format!("Out of range ({},{})",low,high),DiagnosticSeverity::ERROR);
            },
            Some(_) => {},
            None => warn!("parsing numerical node failed {}",node_text(&node,&self.line))
        }
    }
    /// Resolve a literal branch target, `branch` is the GOTO, GOSUB, or THEN node.
    fn process_linenum_ref(&mut self,branch: tree_sitter::Node) -> Navigation {
        let target = match branch.next_named_sibling() {
            Some(n) if n.kind()=="integer" => n,
            _ => return Navigation::GotoChild
        };
        let rng = lsp_range(target.range(),self.row,0);
        let maybe_line = match node_integer::<i64>(&target,&self.line) {
            Some(num) => self.symbols.lines.get_mut(&num),
            None => None
        };
        if let Some(line) = maybe_line {
            match branch.kind() {
                "statement_gosub" => line.gosubs.push(rng),
                _ => line.gotos.push(rng)
            }
            return Navigation::GotoChild;
        }
        let parent_has_error = match target.parent() {
            Some(p) => p.has_error(),
            None => false
        };
        if parent_has_error {
            self.push(target.range(),"Maybe unanalyzed (fix line)",DiagnosticSeverity::WARNING);
            return Navigation::GotoSibling;
        }
        self.push_flagged(target.range(),"Line does not exist",self.config.flag.bad_references);
        Navigation::GotoChild
    }
    /// Takes only the inner name node.
    /// Sibling and child are used to identify strings and arrays.
    fn process_variable_ref(&mut self,node: tree_sitter::Node) -> Navigation {
        if node.has_error() {
            return Navigation::GotoSibling;
        }
        let (keyname,cased,is_array,is_string) = super::var_to_key(node,&self.line);
        if self.in_dim_statement {
            if let Some(next) = node.next_named_sibling() {
                if next.kind()=="open_dim_str" || next.kind()=="open_dim_int" {
                    return Navigation::GotoSibling;
                }
            }
        }
        let var_info = self.symbols.vars.entry(keyname).or_insert_with(Variable::new);
        var_info.is_array |= is_array;
        var_info.is_string |= is_string;
        var_info.refs.push(lsp_range(node.range(),self.row,0));
        var_info.case.insert(cased);
        let is_declared = var_info.decs.len() > 0;
        let is_defined = var_info.defs.len() > 0;
        let rng = node.range();
        if !is_declared && is_string {
            self.push_flagged(rng,"string is never DIM'd",self.config.flag.undeclared_arrays);
        } else if !is_declared && is_array {
            self.push_flagged(rng,"array is never DIM'd",self.config.flag.undeclared_arrays);
        }
        if !is_defined {
            self.push_flagged(rng,"variable is never assigned",self.config.flag.undefined_variables);
        }
        if is_declared && !is_array && !is_string {
            self.push(rng,"unsubscripted integer array returns the first element",DiagnosticSeverity::INFORMATION);
        }
        Navigation::GotoSibling
    }
    /// Report syntax errors at the innermost node
    fn process_error(&mut self,node: tree_sitter::Node) -> Option<Navigation> {
        if node.is_missing() {
            let (outer,mess) = match node.parent() {
                Some(p) => (p,["something is missing after ",&p.to_sexp()].concat()),
                None => (node,"something is missing".to_string())
            };
            let rng = extended_range(&outer,self.line.len());
            self.push(rng,&mess,DiagnosticSeverity::ERROR);
            return Some(Navigation::GotoSibling);
        }
        if node.is_error() {
            let mut curs = node.walk();
            if node.children(&mut curs).any(|child| child.has_error()) {
                return Some(Navigation::GotoChild);
            }
            self.push(node.range(),&["syntax error: ",&node.to_sexp()].concat(),DiagnosticSeverity::ERROR);
            return Some(Navigation::GotoSibling);
        }
        None
    }
    fn visit_references(&mut self,curs: &tree_sitter::TreeCursor) -> Result<Navigation,DYNERR> {
        let node = curs.node();
        let kind = node.kind();
        let rng = node.range();
        if self.config.flag.case_sensitive.is_some() && CASE_CHECK.iter().any(|chk| kind.starts_with(*chk)) {
            let txt = node_text(&node,&self.line);
            if txt != txt.to_uppercase() {
                self.push_flagged(rng,"settings require upper case",self.config.flag.case_sensitive);
            }
        }
        if let Some(nav) = self.process_error(node) {
            return Ok(nav);
        }
        if kind=="line" {
            if self.line.trim_end().len() as i64 > self.config.warn.length {
                self.push(rng,"Line may be too long",DiagnosticSeverity::WARNING);
            }
        } else if BRANCHES.contains(&kind) {
            return Ok(self.process_linenum_ref(node));
        } else if kind=="statement_poke" {
            if let Some(addr) = node.next_named_sibling() {
                self.value_range(addr,-32767,32767);
                if let Some(byte) = addr.next_named_sibling().and_then(|sep| sep.next_named_sibling()) {
                    self.value_range(byte,0,255);
                }
            }
        } else if kind=="fcall_peek" {
            if let Some(addr) = node.next_named_sibling().and_then(|open| open.next_named_sibling()) {
                self.value_range(addr,-32767,32767);
            }
        } else if kind=="statement_coloreq" {
            if let Some(color) = node.next_named_sibling() {
                self.value_range(color,0,255);
            }
        } else if kind=="statement_call" {
            if let Some(addr) = node.next_named_sibling() {
                self.value_range(addr,-32767,32767);
            }
        } else if kind.starts_with("assignment") {
            if let Some(child) = node.named_child(0) {
                if child.kind()!="statement_let" && self.keyword_prefix.is_match(&node_text(&child,&self.line)) {
                    self.push(child.range(),"illegal variable name, try LET",DiagnosticSeverity::ERROR);
                }
            }
        } else if super::SIMPLE_VAR_TYPES.contains(&kind) {
            // arrays are covered by looking at the context
            return Ok(self.process_variable_ref(node));
        } else if kind.starts_with("statement_dim_") {
            self.in_dim_statement = true;
            self.saved_depth = curs.depth();
        } else if kind.starts_with("com_") {
            self.push_flagged(rng,"Immediate mode command, Apple tokenizer will reject",self.config.flag.immediate_mode);
        }
        Ok(Navigation::GotoChild)
    }
}
