// Licensed under the Apache-2.0 license

//! The node index shipped to the browser as `js/data.js`.
//!
//! Addresses, sizes and reset values are written as native JavaScript
//! BigInt literals (`0x1000n`) so 64-bit values survive unchanged.

use crate::error::ExportResult;
use std::fmt::Write;

/// A JavaScript literal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JsValue {
    Null,
    Number(u64),
    BigInt(u64),
    Str(String),
    Array(Vec<JsValue>),
    Object(Vec<(String, JsValue)>),
}

impl JsValue {
    pub fn write(&self, out: &mut String) -> ExportResult<()> {
        match self {
            JsValue::Null => out.push_str("null"),
            JsValue::Number(v) => {
                let _ = write!(out, "{v}");
            }
            JsValue::BigInt(v) => {
                let _ = write!(out, "0x{v:x}n");
            }
            JsValue::Str(s) => out.push_str(&serde_json::to_string(s)?),
            JsValue::Array(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i != 0 {
                        out.push(',');
                    }
                    item.write(out)?;
                }
                out.push(']');
            }
            JsValue::Object(members) => {
                out.push('{');
                for (i, (key, value)) in members.iter().enumerate() {
                    if i != 0 {
                        out.push(',');
                    }
                    out.push_str(&serde_json::to_string(key)?);
                    out.push(':');
                    value.write(out)?;
                }
                out.push('}');
            }
        }
        Ok(())
    }
}

/// One field of a register entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RalField {
    pub name: String,
    pub lsb: u32,
    pub msb: u32,
    pub reset: u64,
    pub access: String,
    pub encode: Vec<(String, u64)>,
}

impl RalField {
    fn to_js(&self) -> JsValue {
        let mut members = vec![
            ("name".to_string(), JsValue::Str(self.name.clone())),
            ("lsb".to_string(), JsValue::Number(u64::from(self.lsb))),
            ("msb".to_string(), JsValue::Number(u64::from(self.msb))),
            ("reset".to_string(), JsValue::BigInt(self.reset)),
            ("access".to_string(), JsValue::Str(self.access.clone())),
            ("disp".to_string(), JsValue::Str("H".to_string())),
        ];
        if !self.encode.is_empty() {
            let encode = self
                .encode
                .iter()
                .map(|(name, value)| (name.clone(), JsValue::BigInt(*value)))
                .collect();
            members.push(("encode".to_string(), JsValue::Object(encode)));
        }
        JsValue::Object(members)
    }
}

/// Index record of one visited node. Its position in the index is its id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RalEntry {
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub name: String,
    pub offset: u64,
    pub size: u64,
    /// Array dimensions and stride.
    pub array: Option<(Vec<u64>, u64)>,
    /// Present for registers only.
    pub fields: Option<Vec<RalField>>,
}

impl RalEntry {
    fn to_js(&self) -> JsValue {
        let mut members = vec![
            (
                "parent".to_string(),
                self.parent
                    .map_or(JsValue::Null, |p| JsValue::Number(p as u64)),
            ),
            (
                "children".to_string(),
                JsValue::Array(
                    self.children
                        .iter()
                        .map(|c| JsValue::Number(*c as u64))
                        .collect(),
                ),
            ),
            ("name".to_string(), JsValue::Str(self.name.clone())),
            ("offset".to_string(), JsValue::BigInt(self.offset)),
            ("size".to_string(), JsValue::BigInt(self.size)),
        ];
        if let Some((dims, stride)) = &self.array {
            members.push((
                "dims".to_string(),
                JsValue::Array(dims.iter().map(|d| JsValue::Number(*d)).collect()),
            ));
            members.push(("stride".to_string(), JsValue::BigInt(*stride)));
            members.push((
                "idxs".to_string(),
                JsValue::Array(dims.iter().map(|_| JsValue::Number(0)).collect()),
            ));
        }
        if let Some(fields) = &self.fields {
            members.push((
                "fields".to_string(),
                JsValue::Array(fields.iter().map(RalField::to_js).collect()),
            ));
        }
        JsValue::Object(members)
    }
}

/// Contents of `js/data.js`.
pub fn data_js(index: &[RalEntry], title: &str) -> ExportResult<String> {
    let mut out = String::from("var RALIndex = ");
    JsValue::Array(index.iter().map(RalEntry::to_js).collect()).write(&mut out)?;
    out.push_str(";\nvar PageInfo = ");
    JsValue::Object(vec![("title".to_string(), JsValue::Str(title.to_string()))]).write(&mut out)?;
    out.push_str(";\n");
    Ok(out)
}
