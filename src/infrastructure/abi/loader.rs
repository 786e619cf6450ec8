//! ABI loading - JSON ABI files, artifact directories, human-readable signatures

use std::fs;
use std::path::Path;

use alloy_json_abi::{Function, JsonAbi, StateMutability};
use alloy_primitives::keccak256;
use anyhow::{Context, Result};
use tracing::debug;
use walkdir::WalkDir;

use crate::domain::abi::{AbiRegistry, FunctionSignature, ParamSpec};

/// Interface of the MultiSigWallet contract operated by the multisig UI
const MULTISIG_WALLET_ABI: &str = include_str!("multisig_wallet.json");

/// Files above this size are never ABI files worth parsing
const MAX_ABI_FILE_BYTES: u64 = 5 * 1024 * 1024;

/// ABI loader
pub struct AbiLoader;

impl AbiLoader {
    /// Load a single ABI file, or every ABI file below a directory
    pub fn load_path(path: impl AsRef<Path>) -> AbiRegistry {
        let path = path.as_ref();
        if path.is_dir() {
            return Self::scan(path);
        }

        let mut registry = AbiRegistry::new();
        registry.scanned_files = 1;
        if let Err(err) = Self::load_file(path, &mut registry) {
            registry.errors.push(format!("{}: {:#}", path.display(), err));
        }
        registry
    }

    /// Load several paths; earlier paths win on selector collisions
    pub fn load_paths<P: AsRef<Path>>(paths: &[P]) -> AbiRegistry {
        let mut registry = AbiRegistry::new();
        for path in paths {
            registry.merge(Self::load_path(path));
        }
        registry
    }

    /// Scan a directory tree for JSON ABI files
    pub fn scan(root: impl AsRef<Path>) -> AbiRegistry {
        let root = root.as_ref();
        let mut registry = AbiRegistry::new();
        let mut scanned_files = 0;
        let mut errors = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !Self::is_ignored_dir(e.path()))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    errors.push(err.to_string());
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(meta) => meta,
                Err(err) => {
                    errors.push(format!("{}: {}", path.display(), err));
                    continue;
                }
            };
            if metadata.len() > MAX_ABI_FILE_BYTES {
                debug!(path = %path.display(), "skipping oversized json file");
                continue;
            }

            scanned_files += 1;

            if let Err(err) = Self::load_file(path, &mut registry) {
                errors.push(format!("{}: {:#}", path.display(), err));
            }
        }

        registry.scanned_files = scanned_files;
        registry.errors = errors;

        debug!(
            root = %root.display(),
            files = registry.scanned_files,
            functions = registry.len(),
            "abi scan finished"
        );

        registry
    }

    /// Load a single ABI file into `registry`
    pub fn load_file(path: &Path, registry: &mut AbiRegistry) -> Result<usize> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?;
        Self::load_json(&content, &path.display().to_string(), registry)
    }

    /// Parse ABI JSON into `registry`, returning the number of functions seen
    ///
    /// Accepts a raw ABI array or an artifact object with an `abi` field
    /// (Foundry `out/`, Hardhat `artifacts/`). Objects without one are skipped.
    pub fn load_json(content: &str, source: &str, registry: &mut AbiRegistry) -> Result<usize> {
        let value: serde_json::Value = serde_json::from_str(content).context("invalid json")?;

        let abi_value = if value.is_array() {
            value
        } else if let Some(abi) = value.get("abi") {
            abi.clone()
        } else {
            return Ok(0);
        };

        let abi: JsonAbi = serde_json::from_value(abi_value).context("not a contract ABI")?;

        let mut count = 0;
        for function in abi.functions() {
            registry.insert(Self::function_signature(function, source));
            count += 1;
        }

        Ok(count)
    }

    /// Parse one human-readable signature, e.g. `transfer(address to, uint256 amount)`
    pub fn parse_signature(signature: &str) -> Result<FunctionSignature> {
        let trimmed = signature.trim();
        let declaration = if trimmed.starts_with("function ") {
            trimmed.to_string()
        } else {
            format!("function {}", trimmed)
        };

        let function = Function::parse(&declaration)
            .with_context(|| format!("invalid function signature '{}'", trimmed))?;
        Ok(Self::function_signature(&function, "<signature>"))
    }

    /// Build a registry from human-readable signatures
    pub fn parse_signatures<S: AsRef<str>>(signatures: &[S]) -> Result<AbiRegistry> {
        let mut registry = AbiRegistry::new();
        for signature in signatures {
            registry.insert(Self::parse_signature(signature.as_ref())?);
        }
        Ok(registry)
    }

    /// The MultiSigWallet interface shipped with the binary
    pub fn bundled_multisig() -> Result<AbiRegistry> {
        let mut registry = AbiRegistry::new();
        Self::load_json(MULTISIG_WALLET_ABI, "<bundled:MultiSigWallet>", &mut registry)?;
        Ok(registry)
    }

    fn function_signature(function: &Function, source: &str) -> FunctionSignature {
        let signature = function.signature();
        let selector = Self::compute_selector(&signature);

        let inputs = function
            .inputs
            .iter()
            .map(|input| ParamSpec::new(input.name.clone(), input.selector_type().into_owned()))
            .collect();

        FunctionSignature {
            selector,
            name: function.name.clone(),
            signature,
            state_mutability: mutability_name(function.state_mutability).to_string(),
            inputs,
            source: source.to_string(),
        }
    }

    /// Compute the 4-byte function selector from a signature
    pub fn compute_selector(signature: &str) -> [u8; 4] {
        let hash = keccak256(signature.as_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }

    /// Check if a path should be ignored
    fn is_ignored_dir(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|name| {
                matches!(
                    name,
                    ".git" | "target" | "node_modules" | ".next" | "cache" | "typechain-types"
                )
            })
            .unwrap_or(false)
    }
}

fn mutability_name(mutability: StateMutability) -> &'static str {
    match mutability {
        StateMutability::Pure => "pure",
        StateMutability::View => "view",
        StateMutability::NonPayable => "nonpayable",
        StateMutability::Payable => "payable",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_selector() {
        // transfer(address,uint256) -> 0xa9059cbb
        let selector = AbiLoader::compute_selector("transfer(address,uint256)");
        assert_eq!(selector, [0xa9, 0x05, 0x9c, 0xbb]);

        // approve(address,uint256) -> 0x095ea7b3
        let selector = AbiLoader::compute_selector("approve(address,uint256)");
        assert_eq!(selector, [0x09, 0x5e, 0xa7, 0xb3]);
    }

    #[test]
    fn test_is_ignored_dir() {
        assert!(AbiLoader::is_ignored_dir(Path::new(".git")));
        assert!(AbiLoader::is_ignored_dir(Path::new("node_modules")));
        assert!(!AbiLoader::is_ignored_dir(Path::new("src")));
        assert!(!AbiLoader::is_ignored_dir(Path::new("out")));
    }

    #[test]
    fn test_parse_signature() {
        let function = AbiLoader::parse_signature("transfer(address to, uint256 amount)").unwrap();
        assert_eq!(function.name, "transfer");
        assert_eq!(function.signature, "transfer(address,uint256)");
        assert_eq!(function.selector_hex(), "0xa9059cbb");
        assert_eq!(
            function.inputs,
            vec![
                ParamSpec::new("to", "address"),
                ParamSpec::new("amount", "uint256"),
            ]
        );

        let function = AbiLoader::parse_signature("function balanceOf(address) view").unwrap();
        assert_eq!(function.selector_hex(), "0x70a08231");
        assert_eq!(function.state_mutability, "view");

        assert!(AbiLoader::parse_signature("not a signature (").is_err());
    }

    #[test]
    fn test_load_json_array_and_artifact() {
        let abi = r#"[
            {"type": "function", "name": "transfer", "stateMutability": "nonpayable",
             "inputs": [{"name": "to", "type": "address"}, {"name": "amount", "type": "uint256"}],
             "outputs": [{"name": "", "type": "bool"}]},
            {"type": "event", "name": "Transfer", "anonymous": false,
             "inputs": [{"name": "from", "type": "address", "indexed": true}]}
        ]"#;

        let mut registry = AbiRegistry::new();
        let count = AbiLoader::load_json(abi, "erc20.json", &mut registry).unwrap();
        assert_eq!(count, 1);
        assert_eq!(registry.lookup_hex("0xa9059cbb").unwrap().source, "erc20.json");

        let artifact = format!(r#"{{"abi": {}, "bytecode": "0x"}}"#, abi);
        let mut registry = AbiRegistry::new();
        assert_eq!(AbiLoader::load_json(&artifact, "out/Token.json", &mut registry).unwrap(), 1);

        let mut registry = AbiRegistry::new();
        assert_eq!(AbiLoader::load_json(r#"{"name": "pkg"}"#, "package.json", &mut registry).unwrap(), 0);
        assert!(AbiLoader::load_json("{", "broken.json", &mut registry).is_err());
    }

    #[test]
    fn test_tuple_params_use_selector_type() {
        let abi = r#"[
            {"type": "function", "name": "batch", "stateMutability": "payable",
             "inputs": [{"name": "calls", "type": "tuple[]", "components": [
                {"name": "target", "type": "address"},
                {"name": "data", "type": "bytes"}
             ]}],
             "outputs": []}
        ]"#;

        let mut registry = AbiRegistry::new();
        AbiLoader::load_json(abi, "batch.json", &mut registry).unwrap();

        let function = registry.functions()[0].clone();
        assert_eq!(function.signature, "batch((address,bytes)[])");
        assert_eq!(function.inputs[0].kind, "(address,bytes)[]");
        assert_eq!(function.state_mutability, "payable");
    }

    #[test]
    fn test_bundled_multisig() {
        let registry = AbiLoader::bundled_multisig().unwrap();
        let submit = registry
            .lookup(AbiLoader::compute_selector(
                "submitTransaction(address,uint256,bytes)",
            ))
            .unwrap();
        assert_eq!(submit.name, "submitTransaction");
        assert_eq!(submit.inputs[2], ParamSpec::new("data", "bytes"));

        for signature in [
            "confirmTransaction(uint256)",
            "revokeConfirmation(uint256)",
            "executeTransaction(uint256)",
            "addOwner(address)",
            "removeOwner(address)",
            "replaceOwner(address,address)",
            "changeRequirement(uint256)",
        ] {
            assert!(
                registry.lookup(AbiLoader::compute_selector(signature)).is_some(),
                "missing {signature}"
            );
        }
    }

    #[test]
    fn test_scan_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        fs::create_dir_all(&out).unwrap();
        fs::create_dir_all(dir.path().join("node_modules")).unwrap();

        fs::write(out.join("Multisig.json"), MULTISIG_WALLET_ABI).unwrap();
        fs::write(
            dir.path().join("node_modules").join("Token.json"),
            r#"[{"type": "function", "name": "mint", "inputs": [], "outputs": [], "stateMutability": "nonpayable"}]"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "not json").unwrap();
        fs::write(dir.path().join("broken.json"), "[{").unwrap();

        let registry = AbiLoader::load_path(dir.path());
        assert_eq!(registry.scanned_files, 2);
        assert_eq!(registry.errors.len(), 1);
        assert!(registry.errors[0].contains("broken.json"));
        assert!(registry.lookup_hex("0x1249c58b").is_none()); // mint(), ignored dir
        assert!(registry
            .lookup(AbiLoader::compute_selector("addOwner(address)"))
            .is_some());
    }

    #[test]
    fn test_load_missing_file() {
        let registry = AbiLoader::load_path("/definitely/not/here.json");
        assert!(registry.is_empty());
        assert_eq!(registry.errors.len(), 1);
    }
}
