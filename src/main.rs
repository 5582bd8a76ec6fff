//! # Command Line Interface
//!
//! The argument parser is built in `cli.rs`.
//! The subcommands are run by the `commands` module.

mod cli;

use env_logger;
#[cfg(windows)]
use colored;
use a2int::commands;
use a2int::commands::CommandError;

fn main() -> Result<(),Box<dyn std::error::Error>>
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();
    let matches = cli::build_cli().get_matches();

    if let Some(cmd) = matches.subcommand_matches("verify") {
        return commands::langx::verify(cmd);
    }
    if let Some(cmd) = matches.subcommand_matches("renumber") {
        return commands::langx::renumber(cmd);
    }
    if let Some(cmd) = matches.subcommand_matches("tokenize") {
        return commands::langx::tokenize(cmd);
    }
    if let Some(cmd) = matches.subcommand_matches("detokenize") {
        return commands::langx::detokenize(cmd);
    }

    log::error!("No subcommand was found, try `a2int --help`");
    return Err(Box::new(CommandError::InvalidCommand));
}
