//! `esexpr` CLI — convert between the JSON fixture form and ESExpr binary
//! streams, and inspect binary streams.
//!
//! ## Usage
//!
//! ```sh
//! # JSON fixture → binary (stdin → stdout)
//! echo '{"constructor_name":"point","args":[{"int":"3"},{"int":"4"}]}' | esexpr encode > point.esxb
//!
//! # Encode from file to file
//! esexpr encode -i vectors.json -o vectors.esxb
//!
//! # Binary → JSON fixture array
//! esexpr decode -i vectors.esxb --pretty
//!
//! # Show stream statistics (expression count, string table)
//! esexpr stats -i vectors.esxb
//! ```
//!
//! Encode input is either a single fixture value or a JSON array of fixture
//! values; each element becomes one expression in the output stream, after
//! the embedded string table.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use esexpr_core::{json, read_embedded, write_embedded, Expr};

#[derive(Parser)]
#[command(name = "esexpr", version, about = "ESExpr binary format CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode JSON fixture values into a binary stream
    Encode {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Decode a binary stream back into JSON fixture values
    Decode {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Show statistics about a binary stream
    Stats {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode { input, output } => {
            let text = read_input_string(input.as_deref())?;
            let value: serde_json::Value =
                serde_json::from_str(&text).context("input is not valid JSON")?;

            let exprs = fixture_values(value)?;

            let mut bytes = Vec::new();
            write_embedded(&mut bytes, exprs.iter())
                .context("failed to encode expressions")?;
            write_output_bytes(output.as_deref(), &bytes)?;
        }
        Commands::Decode {
            input,
            output,
            pretty,
        } => {
            let bytes = read_input_bytes(input.as_deref())?;
            let exprs = decode_stream(&bytes)?;

            let values: Vec<serde_json::Value> = exprs.iter().map(json::to_json).collect();
            let rendered = if pretty {
                serde_json::to_string_pretty(&values)?
            } else {
                serde_json::to_string(&values)?
            };
            write_output_bytes(output.as_deref(), rendered.as_bytes())?;
        }
        Commands::Stats { input } => {
            let bytes = read_input_bytes(input.as_deref())?;
            let reader = read_embedded(bytes.as_slice())
                .context("failed to read embedded string table")?;
            let table: Vec<String> = reader.pool().strings().to_vec();

            let mut count = 0usize;
            for expr in reader {
                expr.context("failed to decode expression")?;
                count += 1;
            }

            println!("Stream size:   {} bytes", bytes.len());
            println!("Expressions:   {}", count);
            println!("Table entries: {}", table.len());
            for (i, entry) in table.iter().enumerate() {
                println!("  [{i}] {entry}");
            }
        }
    }

    Ok(())
}

/// Interpret the input JSON as one fixture value, or an array of them.
///
/// A top-level array is ambiguous (it could be a fixture list), but the
/// fixture form has no bare-array encoding of a single expression, so an
/// array always means "several expressions".
fn fixture_values(value: serde_json::Value) -> Result<Vec<Expr>> {
    let values = match value {
        serde_json::Value::Array(items) => items,
        single => vec![single],
    };

    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| json::from_json(v).with_context(|| format!("invalid fixture at index {i}")))
        .collect()
}

fn decode_stream(bytes: &[u8]) -> Result<Vec<Expr>> {
    let reader = read_embedded(bytes).context("failed to read embedded string table")?;
    reader
        .collect::<Result<Vec<_>, _>>()
        .context("failed to decode expression stream")
}

fn read_input_string(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("failed to read file: {path}"))
        }
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn read_input_bytes(path: Option<&str>) -> Result<Vec<u8>> {
    match path {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("failed to read file: {path}"))
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output_bytes(path: Option<&str>, content: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content).with_context(|| format!("failed to write file: {path}"))?;
        }
        None => {
            std::io::stdout()
                .write_all(content)
                .context("failed to write to stdout")?;
        }
    }
    Ok(())
}
