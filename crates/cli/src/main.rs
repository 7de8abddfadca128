//! CLI for the contract-tools library
//!
//! Merges, documents and fingerprints Solidity compiler artifacts.

use clap::{Parser, Subcommand};
use contract_tools::{
    build_artifacts, build_docs, build_metadata, build_standard_json, merge_abi,
    BuildArtifactsOptions, BuildDocsOptions, BuildMetadataOptions, BuildStandardJsonOptions,
    MergeAbiOptions, ToolConfig,
};
use eyre::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Build utilities for Solidity compilation pipelines
#[derive(Parser, Debug)]
#[command(name = "contract-tools")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all logging except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// TOML file overriding the default tool configuration
    #[arg(long, global = true, value_name = "FILE")]
    tool_config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge each contract with its interface into one documented artifact
    BuildArtifacts {
        /// Standard-JSON compiler output file
        #[arg(long = "in")]
        input: PathBuf,

        /// Artifacts output directory
        #[arg(long)]
        out: PathBuf,

        /// Only emit these contracts
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        filter: Vec<String>,
    },

    /// Render one Markdown document per artifact
    BuildDocs {
        /// Artifacts input directory
        #[arg(long = "in")]
        input: PathBuf,

        /// Docs output directory (emptied first)
        #[arg(long)]
        out: PathBuf,

        /// Directory containing a replacement template
        #[arg(long)]
        templates: Option<PathBuf>,
    },

    /// Compute sizes and bytecode hashes of compiled contracts
    BuildMetadata {
        /// Standard-JSON compiler output file
        #[arg(long = "in")]
        input: PathBuf,

        /// Metadata output file
        #[arg(long)]
        out: PathBuf,

        /// Only include these contracts
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        filter: Vec<String>,

        /// Additional source path patterns to ignore
        #[arg(long = "ignorePath", value_delimiter = ',', num_args = 1..)]
        ignore_path: Vec<String>,

        /// Include the raw deployed bytecode
        #[arg(short, long)]
        raw: bool,
    },

    /// Write a Standard-JSON compiler input per source file
    BuildStandardJson {
        /// Contracts directory
        #[arg(long = "in")]
        input: PathBuf,

        /// Standard-JSON output directory
        #[arg(long)]
        out: PathBuf,

        /// Base Standard-JSON input
        #[arg(long)]
        config: PathBuf,
    },

    /// Document a contract's ABI with the devdoc of the contracts it inherits
    MergeAbi {
        /// Main contract name
        #[arg(long)]
        name: String,

        /// Foundry output directory
        #[arg(long = "in")]
        input: PathBuf,

        /// Output directory
        #[arg(long)]
        out: PathBuf,

        /// Contracts whose devdoc is merged (include the main contract for its own docs)
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        filter: Vec<String>,

        /// Output file name, defaults to the contract name
        #[arg(long = "outName")]
        out_name: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.quiet {
        LevelFilter::ERROR
    } else if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder().with_default_directive(log_level.into()).from_env_lossy(),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:?}");
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<ToolConfig> {
    match path {
        Some(path) => ToolConfig::from_toml_file(path),
        None => Ok(ToolConfig::default()),
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.tool_config.as_deref())?;

    match cli.command {
        Commands::BuildArtifacts { input, out, filter } => {
            let written = build_artifacts(&BuildArtifactsOptions {
                input,
                output_dir: out,
                filter,
                config,
            })
            .context("build-artifacts failed")?;
            println!("✅ Wrote {} artifacts", written.len());
        }
        Commands::BuildDocs { input, out, templates } => {
            let written = build_docs(&BuildDocsOptions {
                input_dir: input,
                output_dir: out,
                templates_dir: templates,
                config,
            })
            .context("build-docs failed")?;
            println!("✅ Wrote {} documents", written.len());
        }
        Commands::BuildMetadata { input, out, filter, ignore_path, raw } => {
            let fingerprints = build_metadata(&BuildMetadataOptions {
                input,
                output: out.clone(),
                filter,
                include_raw_bytecode: raw,
                config: config.with_extra_ignore_paths(ignore_path),
            })
            .context("build-metadata failed")?;
            println!("✅ Fingerprinted {} contracts into {}", fingerprints.len(), out.display());
        }
        Commands::BuildStandardJson { input, out, config: base_config } => {
            let written = build_standard_json(&BuildStandardJsonOptions {
                input_dir: input,
                output_dir: out,
                base_config,
                config,
            })
            .context("build-standard-json failed")?;
            println!("✅ Wrote {} Standard-JSON inputs", written.len());
        }
        Commands::MergeAbi { name, input, out, filter, out_name } => {
            let path = merge_abi(&MergeAbiOptions {
                name,
                input_dir: input,
                output_dir: out,
                filter,
                output_name: out_name,
                config,
            })
            .context("merge-abi failed")?;
            println!("✅ Wrote {}", path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "contract-tools",
            "build-artifacts",
            "--in",
            "out/combined.json",
            "--out",
            "artifacts",
        ]);
        assert!(matches!(cli.command, Commands::BuildArtifacts { .. }));

        let cli = Cli::parse_from([
            "contract-tools",
            "build-standard-json",
            "--in",
            "contracts",
            "--out",
            "standard",
            "--config",
            "base.json",
        ]);
        assert!(matches!(cli.command, Commands::BuildStandardJson { .. }));
    }

    #[test]
    fn test_filter_accepts_commas_and_repeats() {
        let cli = Cli::parse_from([
            "contract-tools",
            "merge-abi",
            "--name",
            "Pool",
            "--in",
            "out",
            "--out",
            "docs-abi",
            "--filter",
            "A,B",
            "--filter",
            "Pool",
            "--outName",
            "PoolV2",
        ]);

        if let Commands::MergeAbi { name, filter, out_name, .. } = cli.command {
            assert_eq!(name, "Pool");
            assert_eq!(filter, vec!["A", "B", "Pool"]);
            assert_eq!(out_name.as_deref(), Some("PoolV2"));
        } else {
            panic!("expected merge-abi");
        }
    }

    #[test]
    fn test_build_metadata_flags() {
        let cli = Cli::parse_from([
            "contract-tools",
            "build-metadata",
            "--in",
            "out/combined.json",
            "--out",
            "metadata.json",
            "--ignorePath",
            "/mocks/",
            "-r",
            "--verbose",
        ]);

        assert!(cli.verbose);
        if let Commands::BuildMetadata { ignore_path, raw, filter, .. } = cli.command {
            assert_eq!(ignore_path, vec!["/mocks/"]);
            assert!(raw);
            assert!(filter.is_empty());
        } else {
            panic!("expected build-metadata");
        }
    }

    #[test]
    fn test_missing_required_argument_is_rejected() {
        assert!(Cli::try_parse_from(["contract-tools", "build-docs", "--in", "artifacts"]).is_err());
    }

    #[test]
    fn test_unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["contract-tools", "calculate-airdrop"]).is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tools.toml");
        std::fs::write(&path, "ignore_paths = [\"vendor/\"]\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.ignore_paths, vec!["vendor/"]);
        assert_eq!(load_config(None).unwrap(), ToolConfig::default());
    }
}
