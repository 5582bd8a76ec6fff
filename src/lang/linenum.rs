//! # Module for handling line numbers
//!
//! A task we want to support for any BASIC dialect is renumbering.
//! This provides tools that any dialect should be able to use.
//! The dialect only has to find the primary and secondary line numbers,
//! the guard ranges and edits are worked out here.

use tree_sitter;
use lsp_types::{TextEdit,Range,Position};
use crate::lang;
use std::collections::HashMap;
use regex::Regex;
use log::{trace,debug};
use thiserror::Error;
use crate::DYNERR;

/// Reasons a renumbering request is refused, the document is never partially changed
#[derive(Error,Debug,PartialEq)]
pub enum RenumberError {
    #[error("invalid start")]
    InvalidStart,
    #[error("invalid step")]
    InvalidStep,
    #[error("start and step parameters invalid")]
    BadParameters,
    #[error("nothing to renumber")]
    NothingToRenumber,
    #[error("selection is empty")]
    EmptySelection,
    #[error("unable to gather {0}")]
    Gather(&'static str),
    #[error("no primaries to change")]
    NoPrimaries,
    #[error("new range starting at {start} with step {step} exceeds bounds ({lower},{upper})")]
    Overflow { start: i64, step: i64, lower: usize, upper: usize },
    #[error("new range ({start},{end}) exceeds bounds ({lower},{upper})")]
    ExceedsBounds { start: i64, end: i64, lower: usize, upper: usize },
    #[error("duplicated primary line number {0}")]
    DuplicatePrimary(usize)
}

#[derive(Clone,Debug,PartialEq)]
pub struct LabelInformation {
    pub rng: Range,
    pub leading_space: usize,
    pub trailing_space: usize
}

/// Form the edit that changes a line label, spaces around the label are kept
fn apply_mapping(new_num: usize,info: &LabelInformation) -> TextEdit {
    let mut fmt_num = " ".repeat(info.leading_space);
    fmt_num += &new_num.to_string();
    fmt_num += &" ".repeat(info.trailing_space);
    TextEdit::new(info.rng,fmt_num)
}

/// Find the guard range for a selection, i.e., the interval new line numbers
/// have to fall into so as not to collide with neighboring lines.
/// The guards are one past the nearest numbered lines above and below the selection,
/// clamped to `[min_num,max_num]`.
pub fn guards(lines: &[&str], sel: &Range, min_num: usize, max_num: usize) -> (usize,usize) {
    let patt = Regex::new(r"^\s*[0-9 ]+").expect("unreachable");
    let leading_num = |line: &str| -> Option<i64> {
        match patt.find(line) {
            Some(m) => m.as_str().replace(" ","").trim().parse::<i64>().ok(),
            None => None
        }
    };
    let mut lower: Option<i64> = None;
    let mut upper: Option<i64> = None;
    for row in (0..sel.start.line as usize).rev() {
        if row >= lines.len() {
            continue;
        }
        if let Some(num) = leading_num(lines[row]) {
            lower = Some(num + 1);
            break;
        }
    }
    for row in sel.end.line as usize + 1..lines.len() {
        if let Some(num) = leading_num(lines[row]) {
            upper = Some(num - 1);
            break;
        }
    }
    let lower = lower.unwrap_or(min_num as i64).clamp(min_num as i64, max_num as i64);
    let upper = upper.unwrap_or(max_num as i64).clamp(min_num as i64, max_num as i64);
    (lower as usize,upper as usize)
}

pub trait Renumber {
    /// Default method should usually suffice
    fn get_one(curs: &tree_sitter::TreeCursor,source: &str,row: isize) -> Result<(usize,LabelInformation),DYNERR> {
        if let Some(num) = lang::node_integer::<usize>(&curs.node(), source) {
            let txt = lang::node_text(&curs.node(), source);
            trace!("found line number {} at row {}",num,row);
            return Ok((num, LabelInformation {
                rng: lang::lsp_range(curs.node().range(),row,0),
                leading_space: txt.len() - txt.trim_start().len(),
                trailing_space: txt.len() - txt.trim_end().len()
            }));
        }
        Err(Box::new(lang::Error::Syntax))
    }
    /// This must gather every primary line number with its location, in document order.
    /// Once you have the cursor on the label, you can usually call the default `get_one`.
    fn gather_defs(&mut self, source: &str, row: isize) -> Result<Vec<(usize,LabelInformation)>,DYNERR>;
    /// This must gather every secondary line number (a reference) with its location, in document order.
    /// Once you have the cursor on the label, you can usually call the default `get_one`.
    fn gather_refs(&mut self, source: &str, row: isize) -> Result<Vec<(usize,LabelInformation)>,DYNERR>;
    /// Build edits to renumber a selected range of lines as `start, start+step, ...`.
    /// The new numbers must fit within the guards formed by the neighboring lines, otherwise
    /// the whole operation is rejected.  Primary line numbers are only changed within the selection.
    /// If `update_refs`, references that point into the selection are changed wherever they are.
    /// If you want to apply the returned edits outside the LSP context, use `crate::lang::apply_edits`.
    fn build_edits(&mut self,all_txt: &str, ext_sel: Option<Range>, start: &str, step: &str, update_refs: bool,
        min_num: usize, max_num: usize) -> Result<Vec<TextEdit>,RenumberError> {
        let line_sep = match all_txt.contains("\r\n") {
            true => "\r\n",
            false => "\n"
        };

        // parse client parameters
        let l0 = match start.trim().parse::<i64>() { Ok(n) => n, Err(_) => return Err(RenumberError::InvalidStart) };
        let dl = match step.trim().parse::<i64>() { Ok(n) => n, Err(_) => return Err(RenumberError::InvalidStep) };
        if l0 < 0 || dl < 1 {
            return Err(RenumberError::BadParameters);
        }
        let lines = all_txt.lines().collect::<Vec<&str>>();
        if lines.len()==0 {
            return Err(RenumberError::NothingToRenumber);
        }
        let sel = match ext_sel {
            Some(raw) => {
                let mut sel = raw;
                if sel.end.character==0 && sel.end.line > sel.start.line {
                    sel.end.line -= 1;
                }
                if sel.end.line as usize >= lines.len() {
                    sel.end.line = lines.len() as u32 - 1;
                }
                if sel.start.line > sel.end.line {
                    return Err(RenumberError::EmptySelection);
                }
                sel.start.character = 0;
                sel.end.character = lines[sel.end.line as usize].len() as u32;
                sel
            },
            None => Range::new(Position::new(0,0),Position::new(
                lines.len() as u32 - 1,
                lines[lines.len()-1].len() as u32
            ))
        };
        let (lower_guard,upper_guard) = match ext_sel {
            Some(_) => guards(&lines,&sel,min_num,max_num),
            None => (min_num,max_num)
        };
        let mut sel_txt = "".to_string();
        for l in sel.start.line..=sel.end.line {
            sel_txt += lines[l as usize];
            sel_txt += line_sep;
        }

        // gather line number info
        debug!("gather primaries in selection");
        let sel_primaries = match self.gather_defs(&sel_txt,sel.start.line as isize) {
            Ok(result) => result,
            Err(_) => return Err(RenumberError::Gather("primaries"))
        };
        if sel_primaries.len()<1 {
            return Err(RenumberError::NoPrimaries);
        }

        // check bounds and build the mapping
        let ln = match dl.checked_mul(sel_primaries.len() as i64 - 1).and_then(|span| span.checked_add(l0)) {
            Some(n) => n,
            None => return Err(RenumberError::Overflow { start: l0, step: dl, lower: lower_guard, upper: upper_guard })
        };
        debug!("proposed range ({},{}) with guards ({},{})",l0,ln,lower_guard,upper_guard);
        if l0 < lower_guard as i64 || ln > upper_guard as i64 {
            return Err(RenumberError::ExceedsBounds { start: l0, end: ln, lower: lower_guard, upper: upper_guard });
        }
        // every intermediate number is now known to lie in [l0,ln]
        let mut mapping = HashMap::new();
        for (i,(primary,_info)) in sel_primaries.iter().enumerate() {
            if mapping.insert(*primary,(l0 + dl * i as i64) as usize).is_some() {
                return Err(RenumberError::DuplicatePrimary(*primary));
            }
        }

        // primaries are changed only within the selection
        debug!("gather all primaries");
        let all_primaries = match self.gather_defs(all_txt,0) {
            Ok(result) => result,
            Err(_) => return Err(RenumberError::Gather("primaries"))
        };
        let mut ans = Vec::new();
        for (primary,info) in &all_primaries {
            if lang::range_contains_range(&sel,&info.rng) {
                if let Some(new_num) = mapping.get(primary) {
                    ans.push(apply_mapping(*new_num, info));
                }
            }
        }

        // references are changed anywhere
        if update_refs {
            debug!("gather all secondaries");
            let all_secondaries = match self.gather_refs(all_txt,0) {
                Ok(result) => result,
                Err(_) => return Err(RenumberError::Gather("secondaries"))
            };
            for (secondary,info) in &all_secondaries {
                if let Some(new_num) = mapping.get(secondary) {
                    ans.push(apply_mapping(*new_num, info));
                }
            }
        }
        Ok(ans)
    }
}

#[cfg(test)]
mod guard_tests {
    use lsp_types::{Range,Position};
    #[test]
    fn neighbors() {
        let lines = vec!["10 PRINT","","20 END"," 3 0 GOTO 10"];
        let sel = Range::new(Position::new(2,0),Position::new(2,6));
        assert_eq!(super::guards(&lines,&sel,0,32767),(11,29));
    }
    #[test]
    fn no_neighbors() {
        let lines = vec!["10 PRINT","20 END"];
        let sel = Range::new(Position::new(0,0),Position::new(1,6));
        assert_eq!(super::guards(&lines,&sel,0,32767),(0,32767));
    }
    #[test]
    fn clamped() {
        let lines = vec!["40000 PRINT","20 END","0 END"];
        let sel = Range::new(Position::new(1,0),Position::new(1,6));
        assert_eq!(super::guards(&lines,&sel,0,32767),(32767,0));
    }
}
