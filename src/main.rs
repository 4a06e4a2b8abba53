//! Punto de entrada ("driver").
//!
//! Este módulo expone una CLI delgada sobre el pipeline: lee líneas,
//! las entrega al pipeline de [`mc`] y presenta el resultado o los
//! diagnósticos. No contiene lógica de análisis ni de evaluación.

use anyhow::{self, bail, Context};
use bitflags::bitflags;
use clap::{crate_version, Arg, ArgAction, Command};
use mc::{
    error::{Diagnostic, Report},
    evaluate_tree,
    lex::Lexer,
    parse, Failure,
};
use tracing_subscriber::EnvFilter;
use unicase::Ascii as NoCase;

use std::io::{self, BufRead, Write};

bitflags! {
    /// Información de depuración a mostrar antes de cada resultado.
    struct Echo: u32 {
        /// Flujo de tokens, incluyendo espacios en blanco.
        const TOKENS = 0x01;

        /// Árbol sintáctico.
        const TREE = 0x02;
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Parsing de CLI
    let args = Command::new("mc")
        .version(crate_version!())
        .about("Integer arithmetic expression evaluator")
        .arg(
            Arg::new("eval")
                .short('e')
                .long("eval")
                .value_name("EXPR")
                .help("Evaluate a single expression and exit"),
        )
        .arg(
            Arg::new("tree")
                .long("tree")
                .action(ArgAction::SetTrue)
                .help("Print the syntax tree of each line"),
        )
        .arg(
            Arg::new("tokens")
                .long("tokens")
                .action(ArgAction::SetTrue)
                .help("Print the token stream of each line"),
        )
        .get_matches();

    let mut echo = Echo::empty();
    if args.get_flag("tree") {
        echo |= Echo::TREE;
    }

    if args.get_flag("tokens") {
        echo |= Echo::TOKENS;
    }

    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    match args.get_one::<String>("eval") {
        Some(line) => {
            if !run_line(line, echo, &mut stdout).context("Failed to write to stdout")? {
                bail!("Expression did not evaluate");
            }
        }

        None => repl(echo, &mut stdout)?,
    }

    Ok(())
}

/// Ciclo interactivo. Termina con EOF o con una línea vacía.
fn repl<W: Write>(mut echo: Echo, output: &mut W) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdin = stdin.lock();
    let mut line = String::new();

    loop {
        write!(output, "> ")?;
        output.flush().context("Failed to flush stdout")?;

        line.clear();
        let read = stdin.read_line(&mut line).context("Failed to read from stdin")?;

        let line = line.trim_end_matches(&['\r', '\n'][..]);
        if read == 0 || line.trim().is_empty() {
            return Ok(());
        }

        if let Some(toggle) = command(line.trim()) {
            echo.toggle(toggle);

            let state = if echo.contains(toggle) { "on" } else { "off" };
            writeln!(output, "{} {}", line.trim(), state)?;
            continue;
        }

        run_line(line, echo, output).context("Failed to write to stdout")?;
    }
}

/// Reconoce comandos de la forma `#tree`, sin distinguir mayúsculas.
fn command(line: &str) -> Option<Echo> {
    const COMMANDS: &[(NoCase<&str>, Echo)] = &[
        (NoCase::new("#tree"),   Echo::TREE),
        (NoCase::new("#tokens"), Echo::TOKENS),
    ];

    COMMANDS
        .iter()
        .find(|&&(name, _)| name == NoCase::new(line))
        .map(|&(_, echo)| echo)
}

/// Procesa una línea. Retorna si se obtuvo un valor.
fn run_line<W: Write>(line: &str, echo: Echo, output: &mut W) -> io::Result<bool> {
    if echo.contains(Echo::TOKENS) {
        for token in Lexer::new(line) {
            write!(output, "{}: '{}'", token.kind(), token.text())?;
            if let Some(value) = token.value() {
                write!(output, " {}", value)?;
            }

            writeln!(output)?;
        }
    }

    let tree = parse::parse(line);
    if echo.contains(Echo::TREE) {
        write!(output, "{}", tree)?;
    }

    match evaluate_tree(tree) {
        Ok(value) => {
            writeln!(output, "{}", value)?;
            Ok(true)
        }

        Err(Failure::Syntax(diagnostics)) => {
            eprint!("{}", diagnostics.report(line).kind("syntax error"));
            Ok(false)
        }

        Err(Failure::Runtime(error)) => {
            let diagnostics = [Diagnostic::from(error)];
            eprint!("{}", Report::new(line, &diagnostics).kind("runtime error"));
            Ok(false)
        }
    }
}
