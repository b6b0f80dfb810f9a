//! cstyle command-line interface.
//!
//! Exit status: 0 for a completed scan (however many diagnostics were
//! printed) or `--help`; 1 when the file cannot be opened, the indent
//! override is not an integer, or the file is structurally unparseable.

use std::io;
use std::process::ExitCode;

use cstyle_rules::{CheckError, Checker, RunOptions};
use cstyle_source::{LexicalIndex, SourceFile};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut file: Option<String> = None;
    let mut indent_arg: Option<String> = None;
    let mut check_whitespace = false;
    let mut print_headers = false;
    let mut strict = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                return ExitCode::SUCCESS;
            }
            "-f" | "--file" => {
                i += 1;
                let Some(value) = args.get(i) else {
                    eprintln!("error: missing argument for --file");
                    print_usage();
                    return ExitCode::FAILURE;
                };
                file = Some(value.clone());
            }
            "-i" | "--indent" => {
                i += 1;
                let Some(value) = args.get(i) else {
                    eprintln!("error: missing argument for --indent");
                    print_usage();
                    return ExitCode::FAILURE;
                };
                indent_arg = Some(value.clone());
            }
            "-w" | "--whitespace-check" => check_whitespace = true,
            "-p" | "--print-headers" => print_headers = true,
            "-s" | "--strict" => strict = true,
            other => {
                eprintln!("Unknown option: {other}");
                print_usage();
                return ExitCode::FAILURE;
            }
        }
        i += 1;
    }

    let Some(file) = file else {
        print_usage();
        return ExitCode::FAILURE;
    };

    let indent_override = match indent_arg {
        None => None,
        Some(arg) => match arg.parse::<u32>() {
            Ok(value) => Some(value),
            Err(_) => {
                eprintln!("Indent must be able to convert to an integer");
                return ExitCode::FAILURE;
            }
        },
    };

    let Ok(text) = std::fs::read_to_string(&file) else {
        eprintln!("Could not open file");
        return ExitCode::FAILURE;
    };

    let mut options = RunOptions::new(&file);
    options.indent_override = indent_override;
    options.check_whitespace = check_whitespace;
    options.print_headers = print_headers;
    options.strict = strict;

    let src = SourceFile::new(&text);
    let index = LexicalIndex::new(&src);

    let stdout = io::stdout();
    match check(&src, &index, &options, stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn check<W: io::Write>(
    src: &SourceFile,
    index: &LexicalIndex<'_>,
    options: &RunOptions,
    out: W,
) -> Result<(), CheckError> {
    let mut checker = Checker::new(src, index, options, out)?;
    if options.print_headers {
        checker.print_headers()?;
    }
    checker.run()?;
    Ok(())
}

fn print_usage() {
    println!("cstyle: structural style checker for C sources");
    println!();
    println!("Usage: cstyle [-h] -f <file> [-i <indent>] [-w] [-p] [-s]");
    println!();
    println!("Options:");
    println!("  -h, --help              Show this help message");
    println!("  -f, --file <file>       File to style check (required)");
    println!("  -i, --indent <n>        Override the auto-detected indent amount");
    println!("  -w, --whitespace-check  Report excess whitespace");
    println!("  -p, --print-headers     List function headers before checking");
    println!("  -s, --strict            Require braces and exact brace spacing");
    println!();
    println!("Examples:");
    println!("  cstyle -f main.c");
    println!("  cstyle -f main.c -i 4");
    println!("  cstyle -f main.c -w -s");
}
