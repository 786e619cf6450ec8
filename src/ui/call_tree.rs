//! Call tree rendering
//!
//! Turns a decoded [`CallNode`] into display units: a nested
//! [`RenderedCall`] that mirrors the tree, flattened into indented
//! [`TreeLine`]s for terminal output. Anything that did not decode is
//! shown as the original input, untouched.

use serde::Serialize;

use crate::domain::abi::{AbiDecoder, CallNode, DecodeFailure, DecodedValue};

/// Display form of a decode request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum Rendered {
    Call(RenderedCall),
    /// The input exactly as given
    Raw(String),
}

/// Display form of one call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedCall {
    pub name: String,
    /// Hex of the call data this node came from
    pub calldata: String,
    pub params: Vec<RenderedParam>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedParam {
    pub name: String,
    pub kind: String,
    pub body: ParamBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamBody {
    Nested(RenderedCall),
    Value(String),
    /// Bytes naming a known method that were left unexpanded
    Opaque { raw: String, reason: String },
}

/// One indented line of rendered output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLine {
    pub depth: usize,
    pub text: String,
}

/// Render a decoded call tree
pub fn render(node: &CallNode) -> RenderedCall {
    RenderedCall {
        name: node.name.clone(),
        calldata: format!("0x{}", hex::encode(&node.calldata)),
        params: node
            .parameters
            .iter()
            .map(|param| RenderedParam {
                name: param.name.clone(),
                kind: param.kind.clone(),
                body: match (param.nested.as_deref(), &param.opaque) {
                    (Some(nested), _) => ParamBody::Nested(render(nested)),
                    (None, Some(failure)) => ParamBody::Opaque {
                        raw: format_value(&param.value),
                        reason: failure.to_string(),
                    },
                    (None, None) => ParamBody::Value(format_value(&param.value)),
                },
            })
            .collect(),
    }
}

/// Render a decode result, falling back to the raw bytes as hex
pub fn render_result(calldata: &[u8], result: &Result<CallNode, DecodeFailure>) -> Rendered {
    match result {
        Ok(node) => Rendered::Call(render(node)),
        Err(_) => Rendered::Raw(format!("0x{}", hex::encode(calldata))),
    }
}

/// Decode and render hex input; anything undecodable comes back verbatim
pub fn render_input(decoder: &dyn AbiDecoder, input: &str) -> Rendered {
    match parse_hex(input) {
        Some(calldata) => match decoder.decode(&calldata) {
            Ok(node) => Rendered::Call(render(&node)),
            Err(_) => Rendered::Raw(input.to_string()),
        },
        None => Rendered::Raw(input.to_string()),
    }
}

/// Parse `0x`-prefixed (or bare) hex, ignoring surrounding whitespace
pub fn parse_hex(input: &str) -> Option<Vec<u8>> {
    let trimmed = input.trim();
    let normalized = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    hex::decode(normalized).ok()
}

/// Lossless text form of a decoded value
pub fn format_value(value: &DecodedValue) -> String {
    match value {
        DecodedValue::Address { value } => format!("0x{}", hex::encode(value.as_slice())),
        DecodedValue::Bool { value } => value.to_string(),
        DecodedValue::Int { value, .. } => value.to_string(),
        DecodedValue::Uint { value, .. } => value.to_string(),
        DecodedValue::FixedBytes { value }
        | DecodedValue::Bytes { value }
        | DecodedValue::Function { value } => format!("0x{}", hex::encode(value)),
        DecodedValue::String { value } => format!("{:?}", value),
        DecodedValue::Array { items } | DecodedValue::FixedArray { items } => {
            format!("[{}]", join_values(items))
        }
        DecodedValue::Tuple { items } => format!("({})", join_values(items)),
    }
}

fn join_values(items: &[DecodedValue]) -> String {
    items.iter().map(format_value).collect::<Vec<_>>().join(", ")
}

impl Rendered {
    /// Flatten into indented display lines
    pub fn lines(&self) -> Vec<TreeLine> {
        match self {
            Self::Call(call) => call.lines(),
            Self::Raw(raw) => vec![TreeLine {
                depth: 0,
                text: raw.clone(),
            }],
        }
    }

    /// Plain text, two spaces of indentation per level
    pub fn to_text(&self) -> String {
        lines_to_text(&self.lines())
    }
}

impl RenderedCall {
    pub fn lines(&self) -> Vec<TreeLine> {
        let mut out = Vec::new();
        self.push_lines(0, String::new(), &mut out);
        out
    }

    fn push_lines(&self, depth: usize, prefix: String, out: &mut Vec<TreeLine>) {
        if self.params.is_empty() {
            out.push(TreeLine {
                depth,
                text: format!("{}{}()", prefix, self.name),
            });
            return;
        }

        out.push(TreeLine {
            depth,
            text: format!("{}{}(", prefix, self.name),
        });
        for param in &self.params {
            let label = format!("{} ({}): ", param.name, param.kind);
            match &param.body {
                ParamBody::Value(value) => out.push(TreeLine {
                    depth: depth + 1,
                    text: format!("{}{}", label, value),
                }),
                ParamBody::Opaque { raw, reason } => out.push(TreeLine {
                    depth: depth + 1,
                    text: format!("{}{} [not expanded: {}]", label, raw, reason),
                }),
                ParamBody::Nested(call) => {
                    call.push_lines(depth + 1, format!("{}parsed method call: ", label), out)
                }
            }
        }
        out.push(TreeLine {
            depth,
            text: ")".to_string(),
        });
    }
}

pub fn lines_to_text(lines: &[TreeLine]) -> String {
    lines
        .iter()
        .map(|line| format!("{}{}", "  ".repeat(line.depth), line.text))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::abi::ParameterNode;
    use alloy_primitives::{Address, I256, U256};

    fn param(name: &str, kind: &str, value: DecodedValue) -> ParameterNode {
        ParameterNode {
            name: name.to_string(),
            kind: kind.to_string(),
            value,
            nested: None,
            opaque: None,
        }
    }

    fn transfer_node() -> CallNode {
        CallNode {
            calldata: vec![0xa9, 0x05, 0x9c, 0xbb],
            name: "transfer".to_string(),
            signature: "transfer(address,uint256)".to_string(),
            parameters: vec![
                param(
                    "to",
                    "address",
                    DecodedValue::Address {
                        value: Address::repeat_byte(0xab),
                    },
                ),
                param(
                    "amount",
                    "uint256",
                    DecodedValue::Uint {
                        value: U256::from(1000),
                        bits: 256,
                    },
                ),
            ],
        }
    }

    #[test]
    fn test_render_flat_call() {
        let rendered = Rendered::Call(render(&transfer_node()));
        assert_eq!(
            rendered.to_text(),
            "transfer(\n  to (address): 0xabababababababababababababababababababab\n  amount (uint256): 1000\n)"
        );
    }

    #[test]
    fn test_render_nested_call() {
        let mut data = param(
            "data",
            "bytes",
            DecodedValue::Bytes {
                value: vec![0xa9, 0x05, 0x9c, 0xbb],
            },
        );
        data.nested = Some(Box::new(transfer_node()));
        let outer = CallNode {
            calldata: vec![0xc6, 0x42, 0x74, 0x74],
            name: "submitTransaction".to_string(),
            signature: "submitTransaction(address,uint256,bytes)".to_string(),
            parameters: vec![
                param(
                    "value",
                    "uint256",
                    DecodedValue::Uint {
                        value: U256::ZERO,
                        bits: 256,
                    },
                ),
                data,
            ],
        };

        let lines = Rendered::Call(render(&outer)).lines();
        let texts: Vec<(usize, &str)> = lines
            .iter()
            .map(|line| (line.depth, line.text.as_str()))
            .collect();
        assert_eq!(
            texts,
            vec![
                (0, "submitTransaction("),
                (1, "value (uint256): 0"),
                (1, "data (bytes): parsed method call: transfer("),
                (2, "to (address): 0xabababababababababababababababababababab"),
                (2, "amount (uint256): 1000"),
                (1, ")"),
                (0, ")"),
            ]
        );
    }

    #[test]
    fn test_render_marks_opaque_branch() {
        let mut cut = param(
            "data",
            "bytes",
            DecodedValue::Bytes {
                value: vec![0xa9, 0x05, 0x9c, 0xbb, 0x00],
            },
        );
        cut.opaque = Some(DecodeFailure::DepthExceeded { limit: 3 });
        let node = CallNode {
            calldata: vec![0x01, 0x02, 0x03, 0x04],
            name: "exec".to_string(),
            signature: "exec(bytes,bytes)".to_string(),
            parameters: vec![
                cut,
                param("plain", "bytes", DecodedValue::Bytes { value: vec![0x00] }),
            ],
        };

        let rendered = render(&node);
        assert_eq!(
            rendered.params[0].body,
            ParamBody::Opaque {
                raw: "0xa9059cbb00".to_string(),
                reason: "nesting depth limit of 3 exceeded".to_string(),
            }
        );
        assert_eq!(
            Rendered::Call(rendered).to_text(),
            [
                "exec(",
                "  data (bytes): 0xa9059cbb00 [not expanded: nesting depth limit of 3 exceeded]",
                "  plain (bytes): 0x00",
                ")",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_render_no_params() {
        let node = CallNode {
            calldata: vec![0xa0, 0xe6, 0x7e, 0x2b],
            name: "getOwners".to_string(),
            signature: "getOwners()".to_string(),
            parameters: vec![],
        };
        assert_eq!(Rendered::Call(render(&node)).to_text(), "getOwners()");
    }

    #[test]
    fn test_format_values_lossless() {
        assert_eq!(
            format_value(&DecodedValue::Uint {
                value: U256::MAX,
                bits: 256
            }),
            "115792089237316195423570985008687907853269984665640564039457584007913129639935"
        );
        assert_eq!(
            format_value(&DecodedValue::Int {
                value: I256::MINUS_ONE,
                bits: 256
            }),
            "-1"
        );
        let long = vec![0x5a; 100];
        assert_eq!(
            format_value(&DecodedValue::Bytes { value: long.clone() }),
            format!("0x{}", hex::encode(long))
        );
        assert_eq!(
            format_value(&DecodedValue::String {
                value: "say \"hi\"".to_string()
            }),
            r#""say \"hi\"""#
        );
        assert_eq!(
            format_value(&DecodedValue::Array {
                items: vec![
                    DecodedValue::Bool { value: true },
                    DecodedValue::Tuple {
                        items: vec![
                            DecodedValue::Uint {
                                value: U256::from(1),
                                bits: 8
                            },
                            DecodedValue::FixedBytes {
                                value: vec![0xde, 0xad]
                            },
                        ]
                    },
                ]
            }),
            "[true, (1, 0xdead)]"
        );
    }

    #[test]
    fn test_raw_fallback() {
        let calldata = vec![0xde, 0xad];
        let rendered = render_result(&calldata, &Err(DecodeFailure::TooShort { len: 2 }));
        assert_eq!(rendered, Rendered::Raw("0xdead".to_string()));
        assert_eq!(rendered.to_text(), "0xdead");
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("0xa9059cbb"), Some(vec![0xa9, 0x05, 0x9c, 0xbb]));
        assert_eq!(parse_hex(" A9059CBB\n"), Some(vec![0xa9, 0x05, 0x9c, 0xbb]));
        assert_eq!(parse_hex("0x"), Some(vec![]));
        assert_eq!(parse_hex("0xabc"), None);
        assert_eq!(parse_hex("hello"), None);
    }

    #[test]
    fn test_render_is_stable() {
        let node = transfer_node();
        assert_eq!(render(&node), render(&node));
        assert_eq!(
            Rendered::Call(render(&node)).to_text(),
            Rendered::Call(render(&node)).to_text()
        );
    }
}
