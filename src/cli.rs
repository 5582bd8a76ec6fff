use clap::{crate_version, Arg, ArgAction, Command};

fn console_arg() -> Arg {
    Arg::new("console").long("console").help("format for console unconditionally")
        .required(false)
        .action(ArgAction::SetTrue)
        .long_help("even if the output context is a file or pipe, format it for the console")
}

fn num_arg(name: &'static str, short: char, help: &'static str) -> Arg {
    Arg::new(name).long(name).short(short).value_name("NUM").help(help)
        .required(true)
        .value_parser(clap::value_parser!(usize))
}

pub fn build_cli() -> Command {
    let long_help = "a2int is always invoked with exactly one of several subcommands.
The subcommands are designed to function as nodes in a pipeline.
Set RUST_LOG environment variable to control logging level.
  levels: trace,debug,info,warn,error

Examples:
---------
line entry:            `a2int verify`
file check:            `cat myprog.ibas | a2int verify`
tokenize to file:      `cat myprog.ibas | a2int tokenize > myprog.itok`
detokenize:            `cat myprog.itok | a2int detokenize`
detokenize from RAM:   `cat ram.bin | a2int detokenize --ram`
renumber everything:   `cat myprog.ibas | a2int renumber -b 0 -e 32768 -f 10 -s 10`";

    let mut main_cmd = Command::new("a2int")
        .about("Transforms and analyzes Apple II Integer BASIC programs.")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(
        Command::new("verify")
            .arg(Arg::new("sexpr").long("sexpr").short('s').help("write S-expressions to stderr").action(ArgAction::SetTrue))
            .arg(Arg::new("config").long("config").short('c').value_name("JSON").help("modify diagnostic configuration")
                .required(false)
            )
            .about("read from stdin and perform language analysis"),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("renumber")
            .arg(num_arg("beg",'b',"lowest number to renumber"))
            .arg(num_arg("end",'e',"highest number to renumber plus 1"))
            .arg(num_arg("first",'f',"first number"))
            .arg(num_arg("step",'s',"step between numbers"))
            .arg(Arg::new("pass-over-refs").long("pass-over-refs").help("do not update references").action(ArgAction::SetTrue))
            .about("renumber BASIC program lines"),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("tokenize")
            .arg(console_arg())
            .visible_alias("tok")
            .about("read from stdin, tokenize, write to stdout"),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("detokenize")
            .arg(Arg::new("ram").long("ram").help("input is a main memory image").action(ArgAction::SetTrue)
                .long_help("find the program using the pointers at $CA and $4C rather than treating the input as bare line records")
            )
            .arg(Arg::new("config").long("config").short('c').value_name("JSON").help("modify detokenizer configuration")
                .required(false)
            )
            .visible_alias("dtok")
            .about("read from stdin, detokenize, write to stdout"),
    );
    return main_cmd;
}
