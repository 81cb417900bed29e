//! Command-line driver for the RV32I+M instruction/cache simulator.
//!
//! Loads a binary image, runs it once under true LRU and once under
//! bit-pLRU replacement, and prints a hit-rate report for each. With
//! `-o`, the LRU run additionally flushes its cache and writes a
//! register/memory snapshot to a second file.

use std::fs::File;
use std::io::Write;
use std::process::ExitCode;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use rv32sim_core::sim::{image, report, run_policy, PolicyKind, WindowRequest};
use rv32sim_core::ExecError;

const ARG_COUNT_INPUT_ONLY: usize = 2;
const ARG_COUNT_WITH_OUTPUT: usize = 6;
const ARG_ORDER_ERROR: &str = "Неправильное количество аргументов";

/// Errors the CLI can report before exiting non-zero.
#[derive(Debug, Error)]
enum CliError {
    /// The argument count didn't match either supported invocation shape.
    #[error("{ARG_ORDER_ERROR}")]
    ArgCount,

    /// A hex-formatted argument (the window base address) failed to parse.
    #[error("invalid hexadecimal address {0:?}")]
    BadHex(String),

    /// A decimal-formatted argument (the window length) failed to parse.
    #[error("invalid decimal length {0:?}")]
    BadLen(String),

    /// The input image file couldn't be opened.
    #[error("failed to open input file {path:?}: {source}")]
    Input {
        /// The path that failed to open.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The output file couldn't be created or written.
    #[error("failed to write output file {path:?}: {source}")]
    Output {
        /// The path that failed to write.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The input image failed to parse.
    #[error(transparent)]
    Image(#[from] image::ImageError),

    /// Execution hit a fatal error.
    #[error(transparent)]
    Exec(#[from] ExecError),
}

/// The parsed command line: an input path, and optionally an output path
/// plus the RAM window to snapshot into it.
struct ParsedArgs {
    input: String,
    output: Option<(String, WindowRequest)>,
}

/// Parses `argv[1..]` the way the original tool's flag scanner does:
/// walk every argument looking for `-i`/`-o`, consuming the following
/// one to four values as they're found, rather than requiring a fixed
/// argument order.
fn parse_args(raw: &[String]) -> Result<ParsedArgs, CliError> {
    if raw.len() != ARG_COUNT_INPUT_ONLY && raw.len() != ARG_COUNT_WITH_OUTPUT {
        return Err(CliError::ArgCount);
    }

    let mut input = None;
    let mut output_path = None;
    let mut base = None;
    let mut len = None;

    let mut i = 0;
    while i < raw.len() {
        match raw[i].as_str() {
            "-i" => {
                i += 1;
                input = raw.get(i).cloned();
            }
            "-o" => {
                output_path = raw.get(i + 1).cloned();
                base = raw.get(i + 2).cloned();
                len = raw.get(i + 3).cloned();
                i += 3;
            }
            _ => {}
        }
        i += 1;
    }

    let input = input.ok_or(CliError::ArgCount)?;

    let output = match (output_path, base, len) {
        (Some(path), Some(base_str), Some(len_str)) => {
            let base = u32::from_str_radix(base_str.trim_start_matches("0x"), 16)
                .map_err(|_| CliError::BadHex(base_str.clone()))?;
            let len = len_str
                .parse::<u32>()
                .map_err(|_| CliError::BadLen(len_str.clone()))?;
            Some((path, WindowRequest { base, len }))
        }
        _ => None,
    };

    Ok(ParsedArgs { input, output })
}

fn run(args: &ParsedArgs) -> Result<(), CliError> {
    let input_file = File::open(&args.input).map_err(|source| CliError::Input {
        path: args.input.clone(),
        source,
    })?;
    let image = image::load(input_file)?;

    println!("{}", report::format_header());

    let window = args.output.as_ref().map(|(_, window)| *window);
    let lru_report = run_policy(&image, PolicyKind::Lru, window)?;
    println!(
        "{}",
        report::format_rate_line(PolicyKind::Lru.label(), &lru_report.stats)
    );

    let plru_report = run_policy(&image, PolicyKind::Plru, None)?;
    println!(
        "{}",
        report::format_rate_line(PolicyKind::Plru.label(), &plru_report.stats)
    );

    if let Some((path, window)) = &args.output {
        write_output(path, &lru_report, window)?;
    }

    Ok(())
}

fn write_output(
    path: &str,
    report: &rv32sim_core::sim::RunReport,
    window: &WindowRequest,
) -> Result<(), CliError> {
    let mut file = File::create(path).map_err(|source| CliError::Output {
        path: path.to_string(),
        source,
    })?;

    let write_err = |source| CliError::Output {
        path: path.to_string(),
        source,
    };

    for reg in &report.final_regs {
        file.write_all(&reg.to_le_bytes()).map_err(write_err)?;
    }
    file.write_all(&window.base.to_le_bytes())
        .map_err(write_err)?;
    file.write_all(&window.len.to_le_bytes()).map_err(write_err)?;
    if let Some(bytes) = &report.window {
        file.write_all(bytes).map_err(write_err)?;
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let raw: Vec<String> = std::env::args().skip(1).collect();

    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = run(&args) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_input_only_invocation() {
        let raw = vec!["-i".to_string(), "image.bin".to_string()];
        let parsed = parse_args(&raw).unwrap();
        assert_eq!(parsed.input, "image.bin");
        assert!(parsed.output.is_none());
    }

    #[test]
    fn accepts_input_and_output_invocation() {
        let raw = vec![
            "-i".to_string(),
            "image.bin".to_string(),
            "-o".to_string(),
            "out.bin".to_string(),
            "1000".to_string(),
            "64".to_string(),
        ];
        let parsed = parse_args(&raw).unwrap();
        assert_eq!(parsed.input, "image.bin");
        let (path, window) = parsed.output.unwrap();
        assert_eq!(path, "out.bin");
        assert_eq!(window.base, 0x1000);
        assert_eq!(window.len, 64);
    }

    #[test]
    fn rejects_wrong_argument_count() {
        let raw = vec!["-i".to_string()];
        assert!(matches!(parse_args(&raw), Err(CliError::ArgCount)));
    }

    #[test]
    fn rejects_bad_hex_address() {
        let raw = vec![
            "-i".to_string(),
            "image.bin".to_string(),
            "-o".to_string(),
            "out.bin".to_string(),
            "zzzz".to_string(),
            "64".to_string(),
        ];
        assert!(matches!(parse_args(&raw), Err(CliError::BadHex(_))));
    }
}
