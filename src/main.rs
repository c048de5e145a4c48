//! cfgl CLI: evaluate cfglang files or inline code.

use std::env;
use std::fs;
use std::process;

use colored::Colorize;
use tracing::Level;

use cfglang::config::{Options, Phase};
use cfglang::logging::{self, LogFormat};
use cfglang::vm::disassemble;
use cfglang::{CfgError, Vm};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// What to evaluate.
enum Input {
    File(String),
    Eval(String),
}

/// CLI options parsed from arguments.
struct Cli {
    input: Input,
    options: Options,
    log_format: LogFormat,
}

fn print_usage() {
    eprintln!("cfgl {} - cfglang evaluator", VERSION);
    eprintln!();
    eprintln!("Usage: cfgl [options] <file.cf>");
    eprintln!("       cfgl [options] -e <code>");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -e <code>               Evaluate code from the command line");
    eprintln!("  --disassemble           Print the compiled bytecode before running");
    eprintln!("  --dump                  Print the root bindings as JSON after running");
    eprintln!("  -v, -vv                 Log at debug / trace level");
    eprintln!("  --log-<phase> <level>   Log level for lexer, parser, compiler or vm");
    eprintln!("  --log-format <format>   pretty, compact (default) or json");
    eprintln!("  --max-stack N           Data stack limit (default: 1024)");
    eprintln!("  --max-depth N           Frame depth limit (default: 256)");
    eprintln!("  --help, -h              Show this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  cfgl app.cf");
    eprintln!("  cfgl --dump -e 'let port: int = 8080'");
    eprintln!("  cfgl --log-vm trace app.cf");
}

fn usage_error(message: &str) -> ! {
    eprintln!("{}", message);
    print_usage();
    process::exit(64);
}

fn next_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> &'a str {
    *i += 1;
    match args.get(*i) {
        Some(value) => value,
        None => usage_error(&format!("{} requires a value", flag)),
    }
}

fn parse_level(value: &str) -> Level {
    value
        .parse()
        .unwrap_or_else(|_| usage_error(&format!("Unknown log level: {}", value)))
}

fn parse_count(value: &str, flag: &str) -> usize {
    value
        .parse()
        .unwrap_or_else(|_| usage_error(&format!("{} expects a number, got {}", flag, value)))
}

fn parse_args() -> Cli {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut options = Options::default();
    let mut log_format = LogFormat::default();
    let mut input = None;

    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        match arg {
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            "-e" => {
                let code = next_value(&args, &mut i, "-e");
                input = Some(Input::Eval(code.to_string()));
            }
            "--disassemble" => options.disassemble = true,
            "--dump" => options.dump = true,
            "-v" => options.log.global = Level::DEBUG,
            "-vv" => options.log.global = Level::TRACE,
            "--log-format" => {
                let value = next_value(&args, &mut i, arg);
                log_format = LogFormat::from_name(value)
                    .unwrap_or_else(|| usage_error(&format!("Unknown log format: {}", value)));
            }
            "--max-stack" => {
                let value = next_value(&args, &mut i, arg);
                options.limits.max_stack_size = parse_count(value, arg);
            }
            "--max-depth" => {
                let value = next_value(&args, &mut i, arg);
                options.limits.max_frame_depth = parse_count(value, arg);
            }
            flag if flag.starts_with("--log-") => {
                let phase = Phase::from_name(&flag["--log-".len()..])
                    .unwrap_or_else(|| usage_error(&format!("Unknown option: {}", flag)));
                let level = parse_level(next_value(&args, &mut i, flag));
                options.log.set_phase(phase, level);
            }
            flag if flag.starts_with('-') => usage_error(&format!("Unknown option: {}", flag)),
            file => {
                if input.is_some() {
                    usage_error(&format!("Unexpected argument: {}", file));
                }
                input = Some(Input::File(file.to_string()));
            }
        }
        i += 1;
    }

    let Some(input) = input else {
        usage_error("No input given");
    };

    Cli {
        input,
        options,
        log_format,
    }
}

/// Error line for the terminal. Every message except I/O failures already ends with its location.
fn error_line(error: &CfgError, origin: &str) -> String {
    format!("{}: {}", origin, error)
}

fn report(error: &CfgError, origin: &str) -> ! {
    eprintln!("{}", error_line(error, origin).red());
    process::exit(1);
}

/// Read, compile and evaluate the input, printing the listing first when asked.
fn evaluate(input: &Input, options: &Options) -> Result<Vm, CfgError> {
    let source = match input {
        Input::File(path) => fs::read_to_string(path)?,
        Input::Eval(code) => code.clone(),
    };
    let chunk = cfglang::compile(&source)?;

    if options.disassemble {
        print!("{}", disassemble(&chunk));
        println!("---");
    }

    cfglang::run_chunk(chunk, options)
}

fn main() {
    let cli = parse_args();
    logging::init(&cli.options.log, cli.log_format);

    let origin = match &cli.input {
        Input::File(path) => path.as_str(),
        Input::Eval(_) => "<eval>",
    };

    let vm = match evaluate(&cli.input, &cli.options) {
        Ok(vm) => vm,
        Err(error) => report(&error, origin),
    };

    if cli.options.dump {
        match vm.dump_json() {
            Ok(json) => println!("{}", json),
            Err(error) => {
                eprintln!("{}", format!("Failed to serialize bindings: {}", error).red());
                process::exit(1);
            }
        }
    }
}
