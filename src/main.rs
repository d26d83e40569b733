use std::io::{self, BufRead, Write};

use citrus_calc::{parse, Error, State, SymbolTable};
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

// RUST_LOG overrides the default filter
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

enum Command<'a> {
    Declare { name: &'a str, initial: f64 },
    ShowState,
    Quit,
    Evaluate(&'a str),
}

fn command(line: &str) -> Result<Command<'_>, String> {
    let line = line.trim();
    match line {
        ":quit" | ":q" => return Ok(Command::Quit),
        ":state" => return Ok(Command::ShowState),
        _ => {}
    }

    let Some(declaration) = line.strip_prefix("let ") else {
        return Ok(Command::Evaluate(line));
    };
    let (name, initial) = match declaration.split_once('=') {
        Some((name, value)) => (
            name.trim(),
            value
                .trim()
                .parse::<f64>()
                .map_err(|e| format!("invalid initial value: {}", e))?,
        ),
        None => (declaration.trim(), 0.0),
    };
    let valid = name.chars().next().map_or(false, |c| c.is_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_');
    if !valid {
        return Err(format!("invalid variable name '{}'", name));
    }

    Ok(Command::Declare { name, initial })
}

fn show_state(out: &mut impl Write, symbols: &SymbolTable, state: &State) -> io::Result<()> {
    for (slot, (name, _)) in symbols.iter().enumerate() {
        match state.get(slot) {
            Ok(value) => writeln!(out, "\t{} = {}", name, value)?,
            Err(e) => writeln!(out, "\t{}: {}", name, e)?,
        }
    }
    Ok(())
}

// names the user can refer to, for hints after an unknown name
fn known_names(symbols: &SymbolTable) -> String {
    let names: Vec<&str> = symbols.visible().map(|(name, _)| name).collect();
    if names.is_empty() {
        "none declared, use `let x = 1`".to_string()
    } else {
        names.join(", ")
    }
}

fn main() -> io::Result<()> {
    init_logging();

    let mut symbols = SymbolTable::new();
    let mut state = symbols.state();
    let stdin = io::stdin();
    let mut out = io::stdout();

    writeln!(out, "declare with `let x = 1`, evaluate with `x += 2`, `:state`, `:quit`")?;

    loop {
        write!(out, "> ")?;
        out.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        match command(&line) {
            Ok(Command::Quit) => break,
            Ok(Command::ShowState) => show_state(&mut out, &symbols, &state)?,
            Ok(Command::Declare { name, initial }) => {
                symbols.declare(name, initial);
                symbols.sync_state(&mut state);
            }
            Ok(Command::Evaluate(input)) => match parse(input, &symbols) {
                Ok(expr) => {
                    write!(out, "\t{}", expr.display(&symbols))?;
                    match expr.evaluate(&mut state) {
                        Ok(value) => writeln!(out, " = {}", value)?,
                        Err(e) => writeln!(out, "\n\terror: {}", e)?,
                    }
                }
                Err(e) => {
                    warn!(input, "rejected input");
                    writeln!(out, "\terror: {}", e)?;
                    if let Error::UndefinedVariable { .. } = e {
                        writeln!(out, "\tknown: {}", known_names(&symbols))?;
                    }
                }
            },
            Err(e) => writeln!(out, "\terror: {}", e)?,
        }
    }

    Ok(())
}
