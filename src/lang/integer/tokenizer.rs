//! Module containing the Integer BASIC tokenizer and detokenizer

use std::collections::HashMap;

use tree_sitter;
use tree_sitter_integerbasic;
use crate::lang;
use crate::lang::{Navigate,Navigation,node_text};
use super::token_maps::{self,OPEN_QUOTE,CLOSE_QUOTE,REM_TOK,EOL,DOLLAR_TOK};
use super::settings::Settings;
use log::{trace,warn,error};
use crate::{STDRESULT,DYNERR};

/// bytes available to a tokenized line, the line number included
const MAX_LINE_BYTES: usize = 126;
/// program pointer in main memory
const PP: usize = 0xca;
const HIMEM: usize = 0x4c;

/// Finds the first number lexeme that is shorter than 3 digits
struct ShortNumber {
    line: String,
    found: Option<std::ops::Range<usize>>
}

impl Navigate for ShortNumber {
    fn visit(&mut self,curs: &tree_sitter::TreeCursor) -> Result<Navigation,DYNERR> {
        let node = curs.node();
        if node.kind()=="integer" || node.kind()=="linenum" {
            if node_text(&node,&self.line).replace(" ","").len() < 3 {
                self.found = Some(node.byte_range());
                return Ok(Navigation::Exit);
            }
            return Ok(Navigation::GotoSibling);
        }
        Ok(Navigation::GotoChild)
    }
}

/// Handles tokenization of Integer BASIC
pub struct Tokenizer
{
    line: String,
    tokenized_line: Vec<u8>,
    tok_map: HashMap<&'static str,u8>,
    detok_map: HashMap<u8,&'static str>,
    config: Settings
}

impl Navigate for Tokenizer
{
    fn visit(&mut self,curs: &tree_sitter::TreeCursor) -> Result<Navigation,DYNERR>
    {
        let node = curs.node();
        let kind = node.kind();

        // Numbers to binary
        if kind=="linenum" || kind=="integer" {
            let cleaned = node_text(&node,&self.line).replace(" ","");
            match cleaned.parse::<u16>() {
                Ok(num) => {
                    let is_label = match node.parent() {
                        Some(parent) => parent.kind()=="line",
                        None => false
                    };
                    if kind=="integer" || !is_label {
                        // leading zeros are gone once the value is parsed
                        self.tokenized_line.push(num.to_string().as_bytes()[0] + 128);
                    }
                    self.tokenized_line.append(&mut u16::to_le_bytes(num).to_vec());
                    return Ok(Navigation::GotoSibling);
                },
                Err(_) => {
                    warn!("number node did not parse as a number: {}",cleaned);
                    return Err(Box::new(lang::Error::Tokenization));
                }
            }
        }

        // Positive ASCII tokens
        if let Some(tok) = self.tok_map.get(kind) {
            self.tokenized_line.push(*tok);
            return Ok(Navigation::GotoSibling);
        }

        // Variables to upper case and negative ASCII
        if super::SIMPLE_VAR_TYPES.contains(&kind) {
            let cleaned = node_text(&node,&self.line).to_uppercase().replace(" ","");
            let mut neg: Vec<u8> = cleaned.as_bytes().iter().map(|b| match *b {
                b'$' => DOLLAR_TOK,
                x => x + 128
            }).collect();
            self.tokenized_line.append(&mut neg);
            return Ok(Navigation::GotoSibling);
        }

        // Strings including tokenized quotes and escapes
        if kind=="string" {
            let txt = crate::parse_escaped_ascii(&node_text(&node,&self.line),true,true);
            self.tokenized_line.push(OPEN_QUOTE);
            if txt.len() > 1 {
                self.tokenized_line.append(&mut txt[1..txt.len()-1].to_vec());
            }
            self.tokenized_line.push(CLOSE_QUOTE);
            return Ok(Navigation::GotoSibling);
        }

        // Comment text with escapes
        if kind=="comment_text" {
            let mut neg = crate::parse_escaped_ascii(&node_text(&node,&self.line),true,true);
            self.tokenized_line.append(&mut neg);
            return Ok(Navigation::GotoSibling);
        }

        // If none of the above, look for terminal nodes and strip spaces
        if node.named_child_count()==0 {
            let cleaned = node_text(&node,&self.line).to_uppercase().replace(" ","");
            self.tokenized_line.append(&mut cleaned.as_bytes().to_vec());
            return Ok(Navigation::GotoSibling);
        }

        Ok(Navigation::GotoChild)
    }
}

impl Tokenizer
{
    /// Create a new `Tokenizer` structure
    pub fn new() -> Self
    {
        Self {
            line: String::new(),
            tokenized_line: Vec::new(),
            tok_map: HashMap::from(token_maps::TOK_MAP),
            detok_map: HashMap::from(token_maps::DETOK_MAP),
            config: Settings::new()
        }
    }
    pub fn set_config(&mut self,config: Settings) {
        self.config = config;
    }
    fn parse_line(&self,parser: &mut tree_sitter::Parser) -> Result<tree_sitter::Tree,DYNERR> {
        match parser.parse(&self.line,None) {
            Some(tree) => Ok(tree),
            None => Err(Box::new(lang::Error::ParsingError))
        }
    }
    /// Pad every number lexeme to at least 3 digits, re-parsing after each change.
    /// Each pass fixes one lexeme, so the line length bounds the number of passes.
    fn zero_pad(&mut self,parser: &mut tree_sitter::Parser) -> STDRESULT {
        let mut finder = ShortNumber { line: self.line.clone(), found: None };
        for _pass in 0..self.line.len() {
            finder.found = None;
            finder.walk(&self.parse_line(parser)?)?;
            let rng = match finder.found.take() {
                Some(rng) => rng,
                None => return Ok(())
            };
            let lexeme = &finder.line[rng.clone()];
            let digits = lexeme.replace(" ","").len();
            let first = match lexeme.find(|c: char| c.is_ascii_digit()) {
                Some(offset) => rng.start + offset,
                None => {
                    warn!("number lexeme without digits: {}",lexeme);
                    return Err(Box::new(lang::Error::Tokenization));
                }
            };
            finder.line.insert_str(first,&"0".repeat(3 - digits));
            trace!("padded to {}",finder.line.trim_end());
            self.line = finder.line.clone();
        }
        Ok(())
    }
    fn tokenize_line(&mut self,parser: &mut tree_sitter::Parser) -> STDRESULT {
        self.zero_pad(parser)?;
        self.tokenized_line = Vec::new();
        let tree = self.parse_line(parser)?;
        self.walk(&tree)?;
        if self.tokenized_line.len() > MAX_LINE_BYTES {
            error!("integer BASIC line too long: {}",self.line.trim_end());
            return Err(Box::new(lang::Error::LineTooLong));
        }
        self.tokenized_line.insert(0,self.tokenized_line.len() as u8 + 2);
        self.tokenized_line.push(EOL);
        Ok(())
    }
    /// Tokenize a program contained in a UTF8 string, result is an array of bytes.
    /// Blank lines are skipped, one line that is too long fails the whole program.
    pub fn tokenize(&mut self,program: &str) -> Result<Vec<u8>,DYNERR> {
        let mut tokenized_program = Vec::new();
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&tree_sitter_integerbasic::LANGUAGE.into())?;
        for line in program.lines() {
            if line.trim().len()==0 {
                continue;
            }
            self.line = String::from(line) + "\n";
            self.tokenize_line(&mut parser)?;
            tokenized_program.append(&mut self.tokenized_line);
        }
        Ok(tokenized_program)
    }
    /// Detokenize a bare sequence of line records into a UTF8 string.
    /// Malformed records produce an empty string.
    pub fn detokenize(&self,img: &[u8]) -> String {
        self.detokenize_range(img,0,img.len())
    }
    /// Detokenize starting from a main memory image, the bounds are found at
    /// the program pointer ($CA) and HIMEM ($4C).
    /// Malformed images produce an empty string.
    pub fn detokenize_from_ram(&self,ram: &[u8]) -> String {
        if ram.len() < PP + 2 {
            error!("memory image is too small to hold the program pointers");
            return String::new();
        }
        let start = u16::from_le_bytes([ram[PP],ram[PP+1]]) as usize;
        let end = u16::from_le_bytes([ram[HIMEM],ram[HIMEM+1]]) as usize;
        self.detokenize_range(ram,start,end)
    }
    /// Detokenize the records that tile `[start,end)` within `img`.
    /// Malformed images produce an empty string.
    pub fn detokenize_range(&self,img: &[u8],start: usize,end: usize) -> String {
        match self.detokenize_checked(img,start,end) {
            Ok(code) => code,
            Err(_) => String::new()
        }
    }
    fn detokenize_checked(&self,img: &[u8],start: usize,end: usize) -> Result<String,DYNERR> {
        if start > end || end > img.len() {
            error!("program bounds ({},{}) are outside the image",start,end);
            return Err(Box::new(lang::Error::Detokenization));
        }
        let img = &img[0..end];
        let escapes = &self.config.detokenizer.escapes;
        let max_line_length = usize::try_from(self.config.detokenizer.max_line_length).unwrap_or(0);
        let max_lines = usize::try_from(self.config.detokenizer.max_lines).unwrap_or(0);
        let mut addr = start;
        let mut line_count = 0;
        let mut code = String::new();
        while addr < end {
            if line_count >= max_lines {
                error!("program has more than {} lines",max_lines);
                return Err(Box::new(lang::Error::Detokenization));
            }
            if addr + 3 >= end {
                error!("program ended while processing line header");
                return Err(Box::new(lang::Error::Detokenization));
            }
            addr += 1; // skip record length
            let line_num = u16::from_le_bytes([img[addr],img[addr+1]]);
            code += &(u16::to_string(&line_num) + " ");
            addr += 2;
            let body_start = addr;
            loop {
                if addr >= end {
                    error!("program ended while processing line {}",line_num);
                    return Err(Box::new(lang::Error::Detokenization));
                }
                if addr - body_start > max_line_length {
                    error!("integer BASIC line {} is too long",line_num);
                    return Err(Box::new(lang::Error::Detokenization));
                }
                let escaped: String;
                if img[addr]==EOL {
                    code += "\n";
                    addr += 1;
                    break;
                } else if img[addr]==OPEN_QUOTE {
                    code += "\"";
                    (escaped,addr) = super::bytes_to_escaped_string(escapes,img,addr+1,&[CLOSE_QUOTE,EOL]);
                    code += &escaped;
                    if addr < end && img[addr]==CLOSE_QUOTE {
                        code += "\"";
                        addr += 1;
                    }
                } else if img[addr]==REM_TOK {
                    if !code.ends_with(" ") {
                        code += " ";
                    }
                    code += "REM"; // real Apple II would add trailing space, breaking symmetry with tokenizer
                    (escaped,addr) = super::bytes_to_escaped_string(escapes,img,addr+1,&[EOL]);
                    code += &escaped;
                } else if img[addr] < 128 {
                    let tok = match self.detok_map.get(&img[addr]) {
                        Some(tok) => tok.to_uppercase(),
                        None => {
                            error!("unrecognized integer BASIC token {:02X} in line {}",img[addr],line_num);
                            return Err(Box::new(lang::Error::Detokenization));
                        }
                    };
                    let spaced = tok.len() > 1 && tok!="<>";
                    if spaced && !code.ends_with(" ") {
                        code += " ";
                    }
                    code += &tok;
                    if spaced && !tok.ends_with("(") && !tok.ends_with("=") {
                        code += " ";
                    }
                    addr += 1;
                } else if token_maps::NUM_PREFIX.contains(&img[addr]) {
                    // next 2 bytes are a binary number
                    if addr + 2 >= end {
                        error!("program ended while processing integer");
                        return Err(Box::new(lang::Error::Detokenization));
                    }
                    code += &u16::to_string(&u16::from_le_bytes([img[addr+1],img[addr+2]]));
                    addr += 3;
                } else {
                    // this is a variable name
                    while addr < end && img[addr] >= 128 {
                        code.push(char::from(img[addr] - 128));
                        addr += 1;
                    }
                }
            }
            line_count += 1;
        }
        Ok(code)
    }
}
