use std::env;
use std::io;
use std::process::ExitCode;

use save_cli::{parse_args, run, usage_text, Invocation};

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::from(1)
        }
    }
}

fn run_cli() -> Result<(), String> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    match parse_args(&args)? {
        Invocation::Help => {
            println!("{}", usage_text());
            Ok(())
        }
        Invocation::Run(kind, options) => run(kind, options, &mut io::stdout()),
    }
}
