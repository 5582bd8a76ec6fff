//! ## Integer BASIC Renumber Module
//!
//! Finds the primary and secondary line numbers, the rest is done by `lang::linenum`.

use tree_sitter;
use tree_sitter_integerbasic;
use lsp_types::{Range,Position,TextEdit};
use crate::lang;
use crate::lang::{Navigate,Navigation};
use crate::lang::linenum::{LabelInformation,Renumber,RenumberError};
use log::{error,debug};
use crate::{STDRESULT,DYNERR};

pub mod flags {
    /// leave references alone, only change the primary line numbers
    pub const PASS_OVER_REFS: u64 = 1;
}

const BRANCHES: [&str;3] = ["statement_goto","statement_gosub","statement_then_line"];
const MAX_LINE_NUMBER: usize = 32767;

#[derive(PartialEq)]
enum Gather {
    Primaries,
    Secondaries
}

pub struct Renumberer {
    flags: u64,
    gather: Gather,
    row: isize,
    line: String,
    info: Vec<(usize,LabelInformation)>
}

impl Navigate for Renumberer {
    fn visit(&mut self,curs: &tree_sitter::TreeCursor) -> Result<Navigation,DYNERR> {
        let node = curs.node();
        let grab_it = match (node.kind(),&self.gather) {
            ("linenum",gather) => {
                let is_label = match node.parent() {
                    Some(parent) => parent.kind()=="line",
                    None => false
                };
                is_label == (*gather==Gather::Primaries)
            },
            ("integer",Gather::Secondaries) => match node.prev_named_sibling() {
                Some(prev) => BRANCHES.contains(&prev.kind()),
                None => false
            },
            _ => false
        };
        if grab_it {
            self.push_linenum(curs)?;
            return Ok(Navigation::GotoSibling);
        }
        Ok(Navigation::GotoChild)
    }
}

impl Renumber for Renumberer {
    fn gather_defs(&mut self,source: &str,row: isize) -> Result<Vec<(usize,LabelInformation)>,DYNERR> {
        self.gather = Gather::Primaries;
        self.gather_lines(source,row)?;
        Ok(std::mem::take(&mut self.info))
    }
    fn gather_refs(&mut self,source: &str,row: isize) -> Result<Vec<(usize,LabelInformation)>,DYNERR> {
        self.gather = Gather::Secondaries;
        self.gather_lines(source,row)?;
        Ok(std::mem::take(&mut self.info))
    }
}

impl Renumberer {
    pub fn new() -> Self {
        Self {
            flags: 0,
            gather: Gather::Primaries,
            row: 0,
            line: String::new(),
            info: Vec::new()
        }
    }
    pub fn set_flags(&mut self,flags: u64) {
        self.flags = flags;
    }
    fn gather_lines(&mut self,source: &str,row: isize) -> STDRESULT {
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&tree_sitter_integerbasic::LANGUAGE.into())?;
        self.info = Vec::new();
        for (offset,line) in source.lines().enumerate() {
            if line.trim().len()==0 {
                continue;
            }
            self.row = row + offset as isize;
            self.line = line.to_string() + "\n";
            match parser.parse(&self.line,None) {
                Some(tree) => self.walk(&tree)?,
                None => return Err(Box::new(lang::Error::ParsingError))
            }
        }
        Ok(())
    }
    fn push_linenum(&mut self,curs: &tree_sitter::TreeCursor) -> STDRESULT {
        let found = Self::get_one(curs,&self.line,self.row)?;
        self.info.push(found);
        Ok(())
    }
    /// Get edits for a selection, this wraps the trait default
    pub fn get_edits(&mut self,all_txt: &str,ext_sel: Option<Range>,start: &str,step: &str) -> Result<Vec<TextEdit>,RenumberError> {
        self.build_edits(all_txt,ext_sel,start,step,
            self.flags & flags::PASS_OVER_REFS == 0,
            0,MAX_LINE_NUMBER)
    }
    /// Renumber all lines with number >= beg && number < end, as [first,first+step,...].
    /// The lines in the range are selected, so the neighboring lines form the guards.
    /// References are updated globally unless the flags say otherwise.
    pub fn renumber(&mut self,source: &str,beg: usize,end: usize,first: usize,step: usize) -> Result<String,DYNERR> {
        let all_primaries = self.gather_defs(source,0)?;
        let rows: Vec<u32> = all_primaries.iter()
            .filter(|(num,_)| *num >= beg && *num < end)
            .map(|(_,info)| info.rng.start.line)
            .collect();
        let (r0,rn) = match (rows.iter().min(),rows.iter().max()) {
            (Some(r0),Some(rn)) => (*r0,*rn),
            _ => {
                error!("no lines in the range [{},{})",beg,end);
                return Err(Box::new(lang::Error::LineNumber));
            }
        };
        debug!("renumber rows {} to {}",r0,rn);
        let ext_sel = Range::new(Position::new(r0,0),Position::new(rn+1,0));
        match self.get_edits(source,Some(ext_sel),&first.to_string(),&step.to_string()) {
            Ok(edits) => {
                debug!("apply {} edits",edits.len());
                lang::apply_edits(source,&edits,0)
            },
            Err(e) => {
                error!("{}",e);
                Err(Box::new(lang::Error::LineNumber))
            }
        }
    }
}
