use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::Level;

use pascal_interp::ast::printer;
use pascal_interp::error::CompileError;
use pascal_interp::interpreter::Interpreter;
use pascal_interp::interpreter::resolver::Resolver;
use pascal_interp::{InterpretError, parser, scanner};

#[derive(Parser, Debug)]
#[command(name = "pascal-interp", about = "An interpreter for a small Pascal subset")]
struct Cli {
    /// Pascal source file to run
    file: PathBuf,

    /// Dump tokens and exit
    #[arg(long)]
    dump_tokens: bool,

    /// Dump AST and exit
    #[arg(long)]
    dump_ast: bool,

    /// AST output format
    #[arg(long, value_enum, default_value_t = AstFormat::Sexp)]
    ast_format: AstFormat,

    /// Print the symbol table after resolution
    #[arg(long)]
    symbols: bool,

    /// Format of the final variable bindings
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AstFormat {
    Sexp,
    Json,
    Pascal,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn read_source(cli: &Cli) -> Result<String> {
    std::fs::read_to_string(&cli.file)
        .with_context(|| format!("read source file '{}'", cli.file.display()))
}

/// Render a diagnostic against the source it came from.
fn report(cli: &Cli, source: &str, error: InterpretError) -> anyhow::Error {
    let kind = error.kind();
    match error {
        InterpretError::Compile(e) => {
            let report =
                miette::Report::new(e.with_source_code(cli.file.display().to_string(), source));
            eprintln!("{report:?}");
        }
        InterpretError::Runtime(e) => eprintln!("{}", e.display_with_line(source)),
    }
    anyhow::anyhow!("{kind}")
}

fn compile_error(cli: &Cli, source: &str, error: CompileError) -> anyhow::Error {
    report(cli, source, error.into())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let source = read_source(&cli)?;

    if cli.dump_tokens {
        let tokens = scanner::scan(&source).map_err(|e| compile_error(&cli, &source, e))?;
        for token in &tokens {
            println!("{token}");
        }
        return Ok(());
    }

    let program = parser::parse(&source).map_err(|e| compile_error(&cli, &source, e))?;

    if cli.dump_ast {
        match cli.ast_format {
            AstFormat::Sexp => print!("{}", printer::to_sexp(&program)),
            AstFormat::Json => {
                println!("{}", printer::to_json(&program).context("serialize AST to JSON")?)
            }
            AstFormat::Pascal => print!("{}", printer::to_source(&program)),
        }
        return Ok(());
    }

    let symbols = Resolver::new()
        .resolve(&program)
        .map_err(|e| compile_error(&cli, &source, e))?;
    if cli.symbols {
        println!("{symbols}");
    }

    let mut interpreter = Interpreter::new();
    if let Err(e) = interpreter.interpret(&program) {
        return Err(report(&cli, &source, e.into()));
    }

    let globals = interpreter.globals();
    match cli.output {
        OutputFormat::Text => print!("{globals}"),
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(globals).context("serialize bindings to JSON")?;
            println!("{json}");
        }
    }
    Ok(())
}
