use crate::builtins;
use crate::config::Limits;
use crate::runner;
use std::io::{self, Write};

/// Read programs line by line. Each line is its own request with its own
/// variables, so use ';' to chain statements that share them.
pub fn start(limits: Limits) {
    println!("calc {}", env!("CARGO_PKG_VERSION"));
    println!("Type 'help' for the built-in names, 'exit' or Ctrl+D to quit");
    println!();

    loop {
        print!("> ");
        if let Err(error) = io::stdout().flush() {
            tracing::warn!(error = %error, "could not flush prompt");
        }

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                // EOF reached (Ctrl+D or piped input ended)
                println!();
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "exit" || line == "quit" {
                    println!("Goodbye!");
                    break;
                }
                if line == "help" {
                    print_help();
                    continue;
                }

                // Errors are already reported to the user.
                let _ = runner::run(line, None, limits);
            }
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                break;
            }
        }
    }
}

fn print_help() {
    println!("operators: + - * / % ^ ! and parentheses");
    println!("constants: {}", builtins::constant_names().join(" "));
    println!("functions: {}", builtins::function_names().join(" "));
    println!("example:   r = 2; pi * r ^ 2");
}
