use calc::{is_matched, repl, runner, Limits};
use clap::{value_parser, Arg, ArgMatches, Command};
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let matches = cli().get_matches();

    init_tracing(matches.get_flag("verbose"));

    if let Some(text) = matches.get_one::<String>("check-brackets") {
        println!("{}", is_matched(text));
        return ExitCode::SUCCESS;
    }

    let limits = limits_from(&matches);

    let success = if let Some(program) = matches.get_one::<String>("expr") {
        Some(runner::run(program, None, limits).is_ok())
    } else {
        matches
            .get_one::<String>("file")
            .map(|file_path| run_file(file_path, limits))
    };

    if starts_repl(&matches) {
        repl::start(limits);
    }

    exit_code(success.unwrap_or(true))
}

fn cli() -> Command {
    Command::new("calc")
        .about("A decimal calculator with variables, constants and functions")
        .arg(
            Arg::new("file")
                .help("A program file to evaluate")
                .value_name("FILE")
                .index(1),
        )
        .arg(
            Arg::new("expr")
                .short('e')
                .long("expr")
                .help("Evaluate a program given on the command line")
                .value_name("PROGRAM")
                .conflicts_with("file"),
        )
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .help("Start the REPL, after running FILE or --expr if given")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("check-brackets")
                .long("check-brackets")
                .help("Report whether the brackets in TEXT are balanced, then exit")
                .value_name("TEXT"),
        )
        .arg(
            Arg::new("max-depth")
                .long("max-depth")
                .help("Deepest nesting of parentheses, calls and signs")
                .value_name("N")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("max-length")
                .long("max-length")
                .help("Longest accepted program, in characters")
                .value_name("N")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("precision")
                .long("precision")
                .help("Significant digits shown for non-integer results")
                .value_name("N")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log evaluation details to stderr")
                .action(clap::ArgAction::SetTrue),
        )
}

/// With no program to run the REPL is the default; `-i` asks for it anyway.
fn starts_repl(matches: &ArgMatches) -> bool {
    matches.get_flag("interactive")
        || !(matches.contains_id("expr") || matches.contains_id("file"))
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("calc=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("calc=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn limits_from(matches: &ArgMatches) -> Limits {
    let defaults = Limits::default();
    Limits::default()
        .with_max_depth(
            matches
                .get_one::<usize>("max-depth")
                .copied()
                .unwrap_or(defaults.max_depth),
        )
        .with_max_input_len(
            matches
                .get_one::<usize>("max-length")
                .copied()
                .unwrap_or(defaults.max_input_len),
        )
        .with_precision(
            matches
                .get_one::<u64>("precision")
                .copied()
                .unwrap_or(defaults.precision),
        )
}

fn run_file(path: &str, limits: Limits) -> bool {
    let path = Path::new(path);

    match fs::read_to_string(path) {
        Ok(source) => {
            let filename = path.display().to_string();
            runner::run(&source, Some(&filename), limits).is_ok()
        }
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            false
        }
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
