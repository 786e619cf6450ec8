use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{debug, warn};

use calltree::config::{self, Config, OutputFormat};
use calltree::ui::{self, call_tree};
use calltree::{logging, AbiDecoder, AbiLoader, AbiRegistry, AlloyAbiDecoder, DecodeOutcome};

#[derive(Debug, Parser)]
#[command(
    name = "calltree",
    version,
    about = "calltree: decode nested EVM calldata into a call tree"
)]
struct Args {
    /// ABI file or directory to load (repeatable). Defaults to the bundled MultiSigWallet ABI.
    #[arg(long, global = true)]
    abi: Vec<PathBuf>,

    /// Human-readable function signature, e.g. "transfer(address to, uint256 amount)" (repeatable)
    #[arg(long = "sig", global = true)]
    signatures: Vec<String>,

    /// Config file (default: $CALLTREE_CONFIG or ~/.config/calltree/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decode calldata (hex, or "-" to read from stdin)
    Decode {
        calldata: String,

        /// Nested calls expanded below the root
        #[arg(long)]
        max_depth: Option<usize>,

        /// Nested calls expanded in total before the rest is left opaque
        #[arg(long)]
        max_nested_calls: Option<usize>,

        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// List the loaded functions, or the one matching a selector
    Methods {
        /// 4-byte selector, e.g. 0xa9059cbb
        selector: Option<String>,
    },
    /// Print the 4-byte selector of a function signature
    Selector { signature: String },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => config::load_from(path)?,
        None => config::load(),
    };
    logging::init(config.log_level.as_deref())?;

    match args.command {
        Command::Decode {
            ref calldata,
            max_depth,
            max_nested_calls,
            format,
        } => {
            let registry = registry_from_args_and_config(&args, &config)?;
            let max_depth = max_depth
                .or(config.max_depth)
                .unwrap_or(AlloyAbiDecoder::DEFAULT_MAX_DEPTH);
            let max_nested_calls = max_nested_calls
                .or(config.max_nested_calls)
                .unwrap_or(AlloyAbiDecoder::DEFAULT_MAX_NESTED_CALLS);
            let decoder = AlloyAbiDecoder::new(registry)
                .with_max_depth(max_depth)
                .with_max_nested_calls(max_nested_calls);
            debug!(
                functions = decoder.registry().len(),
                max_depth = decoder.max_depth(),
                max_nested_calls = decoder.max_nested_calls(),
                "decoder ready"
            );
            let input = read_calldata(calldata)?;
            let format = format.or(config.format).unwrap_or_default();
            print_decoded(&decoder, &input, format)
        }
        Command::Methods { ref selector } => {
            let registry = registry_from_args_and_config(&args, &config)?;
            let functions = match selector {
                Some(selector) => match registry.lookup_hex(selector) {
                    Some(function) => vec![function],
                    None => anyhow::bail!("no loaded function has selector {}", selector),
                },
                None => registry.functions(),
            };
            for function in functions {
                println!(
                    "{}  {:<10} {}",
                    function.selector_hex(),
                    function.state_mutability,
                    function.signature
                );
            }
            Ok(())
        }
        Command::Selector { ref signature } => {
            let function = AbiLoader::parse_signature(signature)?;
            println!("{}  {}", function.selector_hex(), function.signature);
            Ok(())
        }
    }
}

fn registry_from_args_and_config(args: &Args, config: &Config) -> Result<AbiRegistry> {
    let paths = if args.abi.is_empty() {
        config.abi_paths()
    } else {
        args.abi.clone()
    };
    let signatures = if args.signatures.is_empty() {
        &config.signatures
    } else {
        &args.signatures
    };

    let mut registry = AbiLoader::load_paths(&paths);
    registry.merge(AbiLoader::parse_signatures(signatures)?);

    for error in &registry.errors {
        warn!("{}", error);
    }

    if paths.is_empty() && signatures.is_empty() {
        registry = AbiLoader::bundled_multisig()?;
    } else if registry.is_empty() {
        anyhow::bail!("no functions loaded from the given ABI sources");
    }

    debug!(
        files = registry.scanned_files,
        functions = registry.len(),
        "interface description loaded"
    );
    Ok(registry)
}

fn read_calldata(arg: &str) -> Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("read calldata from stdin")?;
    Ok(input.trim().to_string())
}

fn print_decoded(decoder: &AlloyAbiDecoder, input: &str, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!("{}", ui::render_input(decoder, input).to_text());
        }
        OutputFormat::Json => {
            let report = match call_tree::parse_hex(input) {
                Some(calldata) => {
                    let result = decoder.decode(&calldata);
                    match &result {
                        Ok(node) => json!({
                            "outcome": DecodeOutcome::of(&result),
                            "call": node,
                        }),
                        Err(failure) => json!({
                            "outcome": DecodeOutcome::Undecodable,
                            "error": failure,
                            "raw": input,
                        }),
                    }
                }
                None => json!({
                    "outcome": DecodeOutcome::Undecodable,
                    "error": { "kind": "invalid_hex" },
                    "raw": input,
                }),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
