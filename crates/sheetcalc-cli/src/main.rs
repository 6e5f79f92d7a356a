//! sheetcalc CLI - evaluate spreadsheet formulas from the command line

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sheetcalc::prelude::*;
use std::io::{self, Write};

#[derive(Parser)]
#[command(name = "sheetcalc")]
#[command(author, version, about = "Spreadsheet formula evaluator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a formula against cells given on the command line
    Eval {
        /// Formula to evaluate, e.g. "=SUM(A1:A3)"
        formula: String,

        /// Cell contents as ADDRESS=INPUT; INPUT is typed like cell entry
        /// (number, TRUE/FALSE, =formula, otherwise text)
        #[arg(short, long = "cell", value_name = "ADDRESS=INPUT")]
        cells: Vec<String>,

        /// Cell the formula is evaluated at [default: first row below the
        /// given cells]
        #[arg(long)]
        at: Option<String>,

        /// Operator precedence
        #[arg(long, value_enum, default_value_t = PrecedenceArg::FirstMatch)]
        precedence: PrecedenceArg,

        /// Return the first error operand instead of treating it as 0
        #[arg(long)]
        propagate_errors: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the built-in functions
    Functions,
}

#[derive(Clone, Copy, ValueEnum)]
enum PrecedenceArg {
    FirstMatch,
    Standard,
}

impl From<PrecedenceArg> for Precedence {
    fn from(arg: PrecedenceArg) -> Self {
        match arg {
            PrecedenceArg::FirstMatch => Precedence::FirstMatch,
            PrecedenceArg::Standard => Precedence::Standard,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Eval {
            formula,
            cells,
            at,
            precedence,
            propagate_errors,
            json,
        } => {
            let policy = if propagate_errors {
                ErrorPolicy::Propagate
            } else {
                ErrorPolicy::Absorb
            };
            let settings = EvaluatorSettings::new()
                .with_precedence(precedence.into())
                .with_error_policy(policy);
            eval(&formula, &cells, at.as_deref(), settings, json)
        }
        Commands::Functions => list_functions(),
    }
}

/// Split an `ADDRESS=INPUT` argument at its first `=`
fn parse_cell_arg(arg: &str) -> Result<(&str, &str)> {
    match arg.split_once('=') {
        Some((addr, input)) if !addr.trim().is_empty() => Ok((addr.trim(), input)),
        _ => bail!("Expected ADDRESS=INPUT, got '{}'", arg),
    }
}

/// Build a one-sheet document from `ADDRESS=INPUT` arguments
fn load_document(cells: &[String], settings: EvaluatorSettings) -> Result<Document> {
    let mut document = Document::with_settings(settings);
    let sheet = document
        .sheet_mut(0)
        .context("Document has no sheet")?;

    for arg in cells {
        let (addr, input) = parse_cell_arg(arg)?;
        sheet
            .set_cell_input(addr, input)
            .with_context(|| format!("Invalid cell '{}'", addr))?;
    }
    log::debug!("Loaded {} cells", cells.len());
    Ok(document)
}

/// The cell to evaluate at: `at` if given, else column A of the first row
/// below every loaded cell, so the formula never reads its own cell
fn evaluation_cell(document: &Document, at: Option<&str>) -> String {
    match at {
        Some(at) => at.to_string(),
        None => document
            .sheet(0)
            .and_then(|sheet| sheet.used_range())
            .map_or_else(
                || "A1".to_string(),
                |used| CellAddress::new(used.end.row + 1, 0).to_string(),
            ),
    }
}

fn eval(
    formula: &str,
    cells: &[String],
    at: Option<&str>,
    settings: EvaluatorSettings,
    json: bool,
) -> Result<()> {
    let document = load_document(cells, settings)?;
    let at = evaluation_cell(&document, at);
    log::debug!("Evaluating at {}", at);

    let result = document
        .evaluate(0, formula, &at)
        .with_context(|| format!("Cannot evaluate at '{}'", at))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &result).context("Failed to write JSON")?;
        writeln!(out)?;
    } else {
        writeln!(out, "{}", result)?;
        if let Some(message) = result.error_message() {
            eprintln!("{}: {}", result.result_type(), message);
        }
    }
    Ok(())
}

fn list_functions() -> Result<()> {
    let evaluator = Evaluator::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for name in evaluator.registry().names() {
        writeln!(out, "{}", name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell_arg() {
        assert_eq!(parse_cell_arg("A1=10").unwrap(), ("A1", "10"));
        assert_eq!(parse_cell_arg("B2==A1*2").unwrap(), ("B2", "=A1*2"));
        assert_eq!(parse_cell_arg("C3=").unwrap(), ("C3", ""));
        assert!(parse_cell_arg("=5").is_err());
        assert!(parse_cell_arg("A1").is_err());
    }

    #[test]
    fn test_default_evaluation_cell() {
        let cells = vec!["A1==2+3".to_string(), "B3=7".to_string()];
        let document = load_document(&cells, EvaluatorSettings::new()).unwrap();
        assert_eq!(evaluation_cell(&document, None), "A4");
        assert_eq!(evaluation_cell(&document, Some("A1")), "A1");

        let at = evaluation_cell(&document, None);
        let result = document.evaluate(0, "=A1*2", &at).unwrap();
        assert_eq!(result.as_number(), Some(10.0));

        let empty = load_document(&[], EvaluatorSettings::new()).unwrap();
        assert_eq!(evaluation_cell(&empty, None), "A1");
    }

    #[test]
    fn test_load_document_rejects_bad_cells() {
        assert!(load_document(&["A1".to_string()], EvaluatorSettings::new()).is_err());
        assert!(load_document(&["1A=3".to_string()], EvaluatorSettings::new()).is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
