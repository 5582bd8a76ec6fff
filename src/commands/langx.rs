//! ## Language Analysis and Transformations

use std::io::{Read,Write};
use colored::Colorize;
use super::CommandError;
use crate::lang;
use crate::lang::integer;
use crate::lang::analysis::Analysis;
use crate::{STDRESULT,DYNERR};

/// largest image that fits in the 6502 address space
const MAX_RAM: usize = 0x10000;
const RCH: &str = "unreachable was reached";

fn read_program(subcommand: &str) -> Result<String,DYNERR> {
    if atty::is(atty::Stream::Stdin) {
        log::error!("line entry is not supported for `{}`, please pipe something in",subcommand);
        return Err(Box::new(CommandError::InvalidCommand));
    }
    let mut program = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut program) {
        log::error!("the file to {} could not be interpreted as a string",subcommand);
        return Err(Box::new(e));
    }
    if program.len()==0 {
        log::error!("{} did not receive any data from previous node",subcommand);
        return Err(Box::new(CommandError::InvalidCommand));
    }
    Ok(program)
}

pub fn verify(cmd: &clap::ArgMatches) -> STDRESULT {
    let mut analyzer = integer::diagnostics::Analyzer::new();
    if let Some(json) = cmd.get_one::<String>("config") {
        analyzer.update_config(json)?;
    }
    let doc = lang::Document::from_string(analyzer.read_stdin()?,0);
    if doc.text.len()==0 {
        log::error!("verify was handed an empty string");
        return Err(Box::new(CommandError::InvalidCommand));
    }
    if cmd.get_flag("sexpr") {
        analyzer.eprint_lines_sexpr(&doc.text)?;
    }
    analyzer.analyze(&doc)?;
    for diag in analyzer.get_diags(&doc) {
        lang::eprint_diagnostic(&diag,&doc.text);
    }
    let [err,warn,_info] = analyzer.err_warn_info_counts();
    if warn > 0 {
        eprintln!("! {} {}",warn.to_string().bright_yellow(),"warnings".bright_yellow());
    }
    if err==0 {
        eprintln!("\u{2713} {}","Passing".green());
        if !atty::is(atty::Stream::Stdout) {
            // if not the console, pipe the code to the next node
            println!("{}",doc.text);
        }
        return Ok(());
    } else {
        eprintln!("\u{2717} {} {}",err.to_string().red(),"errors".red());
        return Err(Box::new(lang::Error::Syntax));
    }
}

pub fn renumber(cmd: &clap::ArgMatches) -> STDRESULT {
    let beg = *cmd.get_one::<usize>("beg").expect(RCH);
    let end = *cmd.get_one::<usize>("end").expect(RCH);
    let first = *cmd.get_one::<usize>("first").expect(RCH);
    let step = *cmd.get_one::<usize>("step").expect(RCH);
    if beg >= end {
        log::error!("renumber range [{},{}) is empty",beg,end);
        return Err(Box::new(CommandError::OutOfRange));
    }
    let program = read_program("renumber")?;
    lang::verify_str(&tree_sitter_integerbasic::LANGUAGE.into(),&program)?;
    let mut renumberer = integer::renumber::Renumberer::new();
    if cmd.get_flag("pass-over-refs") {
        renumberer.set_flags(integer::renumber::flags::PASS_OVER_REFS);
    }
    let new_prog = renumberer.renumber(&program,beg,end,first,step)?;
    log::warn!("line number expressions must be manually adjusted");
    print!("{}",&new_prog);
    if !new_prog.ends_with("\n") {
        println!();
    }
    Ok(())
}

pub fn tokenize(cmd: &clap::ArgMatches) -> STDRESULT {
    let program = read_program("tokenize")?;
    lang::verify_str(&tree_sitter_integerbasic::LANGUAGE.into(),&program)?;
    let mut tokenizer = integer::tokenizer::Tokenizer::new();
    let object = tokenizer.tokenize(&program)?;
    if atty::is(atty::Stream::Stdout) || cmd.get_flag("console") {
        crate::display_block(0,&object);
    } else {
        std::io::stdout().write_all(&object)?;
    }
    Ok(())
}

pub fn detokenize(cmd: &clap::ArgMatches) -> STDRESULT {
    if atty::is(atty::Stream::Stdin) {
        log::error!("line entry is not supported for `detokenize`, please pipe something in");
        return Err(Box::new(CommandError::InvalidCommand));
    }
    let mut tokenizer = integer::tokenizer::Tokenizer::new();
    if let Some(json) = cmd.get_one::<String>("config") {
        tokenizer.set_config(integer::settings::parse(json)?);
    }
    let mut tok: Vec<u8> = Vec::new();
    std::io::stdin().read_to_end(&mut tok)?;
    if tok.len()==0 {
        log::error!("detokenize did not receive any data from previous node");
        return Err(Box::new(CommandError::InvalidCommand));
    }
    let program = match cmd.get_flag("ram") {
        true => {
            if tok.len() > MAX_RAM {
                log::error!("memory image is larger than 64K");
                return Err(Box::new(CommandError::OutOfRange));
            }
            tokenizer.detokenize_from_ram(&tok)
        },
        false => tokenizer.detokenize(&tok)
    };
    if program.len()==0 {
        log::error!("tokens could not be interpreted as Integer BASIC");
        return Err(Box::new(lang::Error::Detokenization));
    }
    for line in program.lines() {
        println!("{}",line);
    }
    Ok(())
}
