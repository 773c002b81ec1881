use clap::{crate_version, Parser};

use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use shard_consensus::config::SolverConfig;
use shard_consensus::consensus::consensus;
use shard_consensus::interpolate::lagrange_constant;
use shard_consensus::report::{render, render_interpolation, InterpolationReport};
use shard_consensus::share::ShareDocument;
use shard_consensus::ShardError;

#[derive(Debug, Parser)]
#[command(name = "shard")]
#[command(version = crate_version!())]
#[command(
    about = "SHARD - recover a Shamir secret from shares, some of which may be corrupted",
    long_about = "SHARD reads a JSON share document, decodes every share from its declared base, and searches all threshold-sized subsets of shares for the secret that the most shares agree on. Shares that never agree with the winning secret are reported as outliers. All arithmetic is exact, so even very large share values are recovered without rounding. The document is read from --input, or from stdin when no file is given."
)]
enum CliArgument {
    /// Recover the consensus secret and report inlying and outlying shares.
    Recover {
        /// Share document to read, stdin if omitted.
        #[clap(long, short)]
        input: Option<PathBuf>,

        /// Share threshold, if none is provided, uses `k` from the document
        #[clap(long, short)]
        threshold: Option<usize>,

        /// Print single-line JSON regardless of the config.
        #[clap(long)]
        compact: bool,

        /// Verbose mode displays the decoded shares
        #[clap(long, short)]
        verbose: bool,
    },
    /// Interpolate the constant term through the first shares of a document, with no outlier detection.
    Interpolate {
        /// Share document to read, stdin if omitted.
        #[clap(long, short)]
        input: Option<PathBuf>,

        /// Number of shares to use, if none is provided, uses `k` from the document
        #[clap(long, short)]
        count: Option<usize>,

        /// Print single-line JSON regardless of the config.
        #[clap(long)]
        compact: bool,
    },
    /// Write a config file holding the default settings.
    InitConfig {
        /// Where to write the config.
        #[clap(long, short)]
        path: PathBuf,
    },
}

#[derive(Parser, Debug)]
#[clap(name = "shard")]
struct Opt {
    /// TOML config file, settings may also come from SHARD_* environment variables.
    #[clap(long, short)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[clap(subcommand)]
    argument: CliArgument,
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();

    match run(Opt::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", error_message(err.as_ref()));
            ExitCode::FAILURE
        }
    }
}

/// The user-facing line for a failed run: the error's `Display` form.
fn error_message(err: &dyn Error) -> String {
    format!("❌ Error: {err}")
}

fn run(opt: Opt) -> Result<(), Box<dyn Error>> {
    match opt.argument {
        CliArgument::Recover {
            input,
            threshold,
            compact,
            verbose,
        } => {
            let config = SolverConfig::load(opt.config.as_deref())?;
            let doc = read_document(input.as_deref())?;

            // check if threshold is set, if not use the document's k
            let k = threshold.unwrap_or(doc.k);
            debug!("Using threshold {} over {} shares", k, doc.shares.len());

            if verbose {
                eprintln!("🐛 shares: ");
                for share in &doc.shares {
                    eprintln!("  {}: {}", share.index, share.y);
                }
            }

            config.check_budget(doc.shares.len(), k)?;
            let result = consensus(&doc.shares, k)?;
            info!(
                "🔑 Recovered secret with {} inliers and {} outliers",
                result.inliers.len(),
                result.outliers.len()
            );

            println!("{}", render(&result, config.pretty && !compact)?);
        }

        CliArgument::Interpolate {
            input,
            count,
            compact,
        } => {
            let config = SolverConfig::load(opt.config.as_deref())?;
            let doc = read_document(input.as_deref())?;

            let count = count.unwrap_or(doc.k);
            if count == 0 || count > doc.shares.len() {
                return Err(ShardError::InsufficientShares {
                    got: doc.shares.len(),
                    need: count.max(1),
                }
                .into());
            }

            let points = &doc.shares[..count];
            let report = InterpolationReport {
                secret: lagrange_constant(points)?,
                shares: points.iter().map(|share| share.index).collect(),
            };

            println!(
                "{}",
                render_interpolation(&report, config.pretty && !compact)?
            );
        }

        CliArgument::InitConfig { path } => {
            SolverConfig::write_default(&path)?;
            println!("📝 Wrote default config to {}", path.display());
        }
    }

    Ok(())
}

fn read_document(path: Option<&Path>) -> Result<ShareDocument, Box<dyn Error>> {
    let text = match path {
        Some(path) => {
            debug!("Reading share document from {:?}", path);
            fs::read_to_string(path)?
        }
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            text
        }
    };

    if text.trim().is_empty() {
        return Err("No input provided. Provide a JSON share document on stdin or with --input.".into());
    }

    Ok(ShareDocument::from_json(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_uses_display() {
        let err: Box<dyn Error> = ShardError::InsufficientShares { got: 2, need: 3 }.into();
        let message = error_message(err.as_ref());

        assert_eq!(message, format!("❌ Error: {err}"));
        assert!(!message.contains("InsufficientShares"));
    }

    #[test]
    fn test_missing_input_reports_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        fs::write(&path, "  \n").unwrap();

        let err = read_document(Some(path.as_path())).unwrap_err();
        assert_eq!(
            error_message(err.as_ref()),
            "❌ Error: No input provided. Provide a JSON share document on stdin or with --input."
        );
    }

    #[test]
    fn test_zero_index_document_fails_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shares.json");
        fs::write(
            &path,
            r#"{ "keys": { "n": 2, "k": 2 }, "0": { "base": "10", "value": "3" },
                 "1": { "base": "10", "value": "4" } }"#,
        )
        .unwrap();

        let opt = Opt::parse_from(["shard", "recover", "--input", path.to_str().unwrap()]);
        let err = run(opt).unwrap_err();
        assert_eq!(error_message(err.as_ref()), "❌ Error: invalid share index \"0\"");
    }
}
