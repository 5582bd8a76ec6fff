//! # `a2int` main library
//!
//! This library converts Apple II Integer BASIC between source text and the
//! tokenized form the interpreter keeps in memory, and analyzes the source.
//!
//! ## Architecture
//!
//! Language services are built on the `tree_sitter_integerbasic` parser.
//! Every consumer walks the syntax tree using the `lang::Navigate` trait.
//! * `lang::integer::tokenizer` handles (de)tokenization
//! * `lang::integer::diagnostics` builds the symbol table and diagnostics
//! * `lang::integer::renumber` remaps line numbers and references
//! * `lang::linenum` has the renumbering machinery any BASIC dialect could use
//!
//! ## Escapes
//!
//! Bytes that have no printable representation appear in source text as hex escapes,
//! e.g., `\x8a`.  The sign of the escaped byte is never changed.

pub mod lang;
pub mod commands;

use regex::Regex;
use hex;

type DYNERR = Box<dyn std::error::Error>;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

/// Display binary to stdout in columns of hex, +ascii, and -ascii
pub fn display_block(start_addr: u16,block: &[u8]) {
    let mut slice_start = 0;
    loop {
        let row_label = start_addr as usize + slice_start;
        let mut slice_end = slice_start + 16;
        if slice_end > block.len() {
            slice_end = block.len();
        }
        let slice = block[slice_start..slice_end].to_vec();
        let txt: Vec<u8> = slice.iter().map(|c| match *c {
            x if x<32 => '.' as u8,
            x if x<127 => x,
            _ => '.' as u8
        }).collect();
        let neg_txt: Vec<u8> = slice.iter().map(|c| match *c {
            x if x>=160 && x<255 => x - 128,
            _ => 46
        }).collect();
        print!("{:04X} : ",row_label);
        for byte in slice {
            print!("{:02X} ",byte);
        }
        for _blank in slice_end..slice_start+16 {
            print!("   ");
        }
        print!("|+| {} ",String::from_utf8_lossy(&txt));
        for _blank in slice_end..slice_start+16 {
            print!(" ");
        }
        println!("|-| {}",String::from_utf8_lossy(&neg_txt));
        slice_start += 16;
        if slice_end==block.len() {
            break;
        }
    }
}

/// Interpret a string with hex escapes (`\xHH`) as a sequence of bytes.
/// If `inverted` the ordinary characters are put in negative ASCII, escaped bytes are taken as is.
/// If `caps` ordinary characters are put in upper case.
/// Non-ASCII characters are dropped.
pub fn parse_escaped_ascii(s: &str,inverted: bool,caps: bool) -> Vec<u8> {
    let mut ans: Vec<u8> = Vec::new();
    let hex_patt = Regex::new(r"\\x[0-9A-Fa-f][0-9A-Fa-f]").expect("unreachable");
    let mut hexes = hex_patt.find_iter(s);
    let mut maybe_hex = hexes.next();
    for (curs,c) in s.char_indices() {
        if let Some(hex) = maybe_hex {
            if curs >= hex.end() {
                maybe_hex = hexes.next();
            }
        }
        if let Some(hex) = maybe_hex {
            if curs==hex.start() {
                if let Ok(mut val) = hex::decode(&s[curs+2..curs+4]) {
                    ans.append(&mut val);
                }
                continue;
            }
            if curs > hex.start() && curs < hex.end() {
                continue;
            }
        }
        if c.is_ascii() {
            let b = match caps {
                true => c.to_ascii_uppercase() as u8,
                false => c as u8
            };
            ans.push(b + match inverted { true => 128, false => 0 });
        }
    }
    return ans;
}

#[cfg(test)]
mod lib_tests {
    #[test]
    fn escapes_are_not_inverted() {
        let bytes = super::parse_escaped_ascii("a\\x8aB",true,true);
        assert_eq!(bytes,vec![0xc1,0x8a,0xc2]);
    }
    #[test]
    fn plain_ascii() {
        let bytes = super::parse_escaped_ascii("Ab\\x5c",false,false);
        assert_eq!(bytes,vec![0x41,0x62,0x5c]);
    }
    #[test]
    fn incomplete_escape() {
        let bytes = super::parse_escaped_ascii("\\x4",false,true);
        assert_eq!(bytes,vec![0x5c,0x58,0x34]);
    }
}
