// Licensed under the Apache-2.0 license

//! The elaborated register-map tree.
//!
//! The front-end that parses SystemRDL and resolves addresses lives outside
//! this crate. It hands over a [`Design`] whose nodes already carry their
//! relative offsets, sizes and array geometry. The exporters only read it.
//!
//! ## Architecture Overview
//!
//! ```text
//! Design
//! └── top: Node (addrmap or mem)
//!     ├── properties: Properties        # name, desc, ispresent, regwidth, ...
//!     ├── array: Option<ArrayDims>      # dimensions + stride
//!     ├── children: Vec<Node>           # addrmap / regfile / reg / mem
//!     └── fields: Vec<Field>            # registers only
//!         └── properties                # sw, hw, reset, encode, onread, ...
//! ```
//!
//! Nodes can be built programmatically with the builder methods
//! ([`Node::addrmap`], [`Node::reg`], [`Node::at`], ...) or deserialized
//! from the JSON document the front-end writes.

use crate::error::{ExportError, ModelError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use strum_macros::{Display, EnumString};

//=============================================================================
// Access kinds
//=============================================================================

/// Software access to a field (or memory).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SwAccess {
    #[default]
    Rw,
    R,
    W,
    Rw1,
    W1,
    Na,
}

impl SwAccess {
    pub fn is_readable(self) -> bool {
        matches!(self, SwAccess::Rw | SwAccess::R | SwAccess::Rw1)
    }

    pub fn is_writable(self) -> bool {
        matches!(
            self,
            SwAccess::Rw | SwAccess::W | SwAccess::Rw1 | SwAccess::W1
        )
    }
}

/// Hardware access to a field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum HwAccess {
    #[default]
    #[strum(to_string = "rw", serialize = "wr")]
    Rw,
    R,
    W,
    Na,
}

impl HwAccess {
    pub fn is_readable(self) -> bool {
        matches!(self, HwAccess::Rw | HwAccess::R)
    }

    pub fn is_writable(self) -> bool {
        matches!(self, HwAccess::Rw | HwAccess::W)
    }
}

/// Side effect of a software read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum OnReadType {
    Rclr,
    Rset,
    Ruser,
}

/// Side effect of a software write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum OnWriteType {
    Woset,
    Woclr,
    Wot,
    Wzs,
    Wzc,
    Wzt,
    Wclr,
    Wset,
    Wuser,
}

//=============================================================================
// Properties
//=============================================================================

/// A named value in a field's encoding.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct EnumeratedValue {
    pub name: String,
    pub value: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl EnumeratedValue {
    pub fn new(name: &str, value: u64) -> Self {
        Self {
            name: name.to_string(),
            value,
            display_name: None,
            desc: None,
        }
    }

    pub fn with_desc(mut self, desc: &str) -> Self {
        self.desc = Some(desc.to_string());
        self
    }
}

/// A property value as delivered by the front-end.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(u64),
    Str(String),
    Encode(Vec<EnumeratedValue>),
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<u64> for PropertyValue {
    fn from(value: u64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Str(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Str(value)
    }
}

impl From<Vec<EnumeratedValue>> for PropertyValue {
    fn from(value: Vec<EnumeratedValue>) -> Self {
        PropertyValue::Encode(value)
    }
}

/// Property lookup table of a node or field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, PropertyValue>);

impl Properties {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn set(&mut self, key: &str, value: impl Into<PropertyValue>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(PropertyValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn int(&self, key: &str) -> Option<u64> {
        match self.0.get(key) {
            Some(PropertyValue::Int(v)) => Some(*v),
            Some(PropertyValue::Bool(b)) => Some(u64::from(*b)),
            _ => None,
        }
    }

    /// Boolean lookup; integers are true when non-zero.
    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        match self.0.get(key) {
            Some(PropertyValue::Bool(b)) => *b,
            Some(PropertyValue::Int(v)) => *v != 0,
            _ => default,
        }
    }

    pub fn encode(&self) -> Option<&[EnumeratedValue]> {
        match self.0.get("encode") {
            Some(PropertyValue::Encode(values)) => Some(values),
            _ => None,
        }
    }

    /// Parse a string-valued property, reporting values that do not parse.
    fn parsed<T: FromStr>(&self, key: &'static str, path: &str) -> Result<Option<T>, ModelError> {
        match self.0.get(key) {
            None => Ok(None),
            Some(PropertyValue::Str(s)) => {
                s.parse().map(Some).map_err(|_| ModelError::BadProperty {
                    path: path.to_string(),
                    key,
                    value: s.clone(),
                })
            }
            Some(other) => Err(ModelError::BadProperty {
                path: path.to_string(),
                key,
                value: format!("{other:?}"),
            }),
        }
    }

    /// Typed lookup for a property already checked by [`Node::validate`].
    fn typed<T: FromStr>(&self, key: &str) -> Option<T> {
        self.str(key).and_then(|s| s.parse().ok())
    }
}

//=============================================================================
// Nodes
//=============================================================================

/// The addressable component kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NodeKind {
    Addrmap,
    Regfile,
    Reg,
    Mem,
}

/// Array geometry of an arrayed instance.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArrayDims {
    /// Dimension sizes, outermost first.
    pub dimensions: Vec<u64>,
    /// Address increment between consecutive elements.
    pub stride: u64,
}

/// An addressable node of the elaborated tree.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Node {
    pub inst_name: String,
    pub kind: NodeKind,
    /// Address offset relative to the parent (for arrays, of element 0).
    #[serde(default)]
    pub offset: u64,
    /// Size of one element in bytes. Derived when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array: Option<ArrayDims>,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
    /// Source file the node was defined in, used to resolve relative paths
    /// in descriptions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
}

impl Node {
    pub fn new(kind: NodeKind, inst_name: &str) -> Self {
        Self {
            inst_name: inst_name.to_string(),
            kind,
            offset: 0,
            size: None,
            array: None,
            properties: Properties::default(),
            children: Vec::new(),
            fields: Vec::new(),
            source: None,
        }
    }

    pub fn addrmap(inst_name: &str) -> Self {
        Self::new(NodeKind::Addrmap, inst_name)
    }

    pub fn regfile(inst_name: &str) -> Self {
        Self::new(NodeKind::Regfile, inst_name)
    }

    pub fn reg(inst_name: &str) -> Self {
        Self::new(NodeKind::Reg, inst_name)
    }

    /// A memory of `entries` words of `width` bits.
    pub fn mem(inst_name: &str, entries: u64, width: u64) -> Self {
        Self::new(NodeKind::Mem, inst_name)
            .prop("mementries", entries)
            .prop("memwidth", width)
    }

    pub fn at(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub fn sized(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn array(mut self, dimensions: &[u64], stride: u64) -> Self {
        self.array = Some(ArrayDims {
            dimensions: dimensions.to_vec(),
            stride,
        });
        self
    }

    pub fn prop(mut self, key: &str, value: impl Into<PropertyValue>) -> Self {
        self.properties.set(key, value);
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    pub fn is_array(&self) -> bool {
        self.array.is_some()
    }

    /// The `name` property.
    pub fn display_name(&self) -> Option<&str> {
        self.properties.str("name")
    }

    pub fn desc(&self) -> Option<&str> {
        self.properties.str("desc")
    }

    pub fn is_present(&self) -> bool {
        self.properties.bool_or("ispresent", true)
    }

    pub fn regwidth(&self) -> u32 {
        self.properties.int("regwidth").map_or(32, saturate)
    }

    pub fn accesswidth(&self) -> u32 {
        self.properties
            .int("accesswidth")
            .map_or_else(|| self.regwidth(), saturate)
    }

    pub fn mementries(&self) -> Option<u64> {
        self.properties.int("mementries")
    }

    pub fn memwidth(&self) -> Option<u32> {
        self.properties.int("memwidth").map(saturate)
    }

    pub fn sw(&self) -> SwAccess {
        self.properties.typed("sw").unwrap_or_default()
    }

    /// Size of one element in bytes.
    pub fn size(&self) -> u64 {
        if let Some(size) = self.size {
            return size;
        }
        match self.kind {
            NodeKind::Reg => u64::from(self.regwidth()) / 8,
            NodeKind::Mem => {
                let entries = self.mementries().unwrap_or(0);
                let width = u64::from(self.memwidth().unwrap_or(32));
                entries * width.div_ceil(8)
            }
            NodeKind::Addrmap | NodeKind::Regfile => self
                .children
                .iter()
                .map(|child| child.offset + child.total_size())
                .max()
                .unwrap_or(0),
        }
    }

    /// Bytes spanned by all elements of this instance.
    pub fn total_size(&self) -> u64 {
        match &self.array {
            Some(array) => {
                let count: u64 = array.dimensions.iter().product();
                array.stride * count.saturating_sub(1) + self.size()
            }
            None => self.size(),
        }
    }

    /// Check the invariants every exporter relies on.
    pub fn validate(&self) -> Result<(), ModelError> {
        self.validate_at(&self.inst_name)
    }

    fn validate_at(&self, path: &str) -> Result<(), ModelError> {
        if let Some(array) = &self.array {
            let span = array
                .checked_count()
                .filter(|count| *count > 0)
                .and_then(|count| array.stride.checked_mul(count - 1));
            if array.dimensions.is_empty() || span.is_none() {
                return Err(ModelError::BadArray {
                    path: path.to_string(),
                });
            }
        }
        let kind = match self.kind {
            NodeKind::Addrmap => "addrmap",
            NodeKind::Regfile => "regfile",
            NodeKind::Reg => "reg",
            NodeKind::Mem => "mem",
        };
        match self.kind {
            NodeKind::Reg => {
                if !self.children.is_empty() {
                    return Err(ModelError::BadNesting {
                        path: path.to_string(),
                        kind,
                        what: "child nodes",
                    });
                }
                // Masks, resets and encodings are 64-bit values.
                let regwidth = self.properties.int("regwidth").unwrap_or(32);
                if regwidth == 0 || regwidth % 8 != 0 || regwidth > 64 {
                    return Err(ModelError::BadProperty {
                        path: path.to_string(),
                        key: "regwidth",
                        value: regwidth.to_string(),
                    });
                }
                check_width(&self.properties, "accesswidth", path)?;
                let regwidth = self.regwidth();
                for field in &self.fields {
                    field.validate(path, regwidth)?;
                }
                check_overlap(path, &self.fields)?;
            }
            NodeKind::Mem => {
                if !self.children.is_empty() || !self.fields.is_empty() {
                    return Err(ModelError::BadNesting {
                        path: path.to_string(),
                        kind,
                        what: "children or fields",
                    });
                }
                check_width(&self.properties, "memwidth", path)?;
                self.properties.parsed::<SwAccess>("sw", path)?;
            }
            NodeKind::Addrmap | NodeKind::Regfile => {
                if !self.fields.is_empty() {
                    return Err(ModelError::BadNesting {
                        path: path.to_string(),
                        kind,
                        what: "fields",
                    });
                }
                for child in &self.children {
                    child.validate_at(&format!("{path}.{}", child.inst_name))?;
                }
            }
        }
        Ok(())
    }
}

/// Width properties larger than `u32` would otherwise be truncated.
fn saturate(width: u64) -> u32 {
    u32::try_from(width).unwrap_or(u32::MAX)
}

fn check_width(
    properties: &Properties,
    key: &'static str,
    path: &str,
) -> Result<(), ModelError> {
    match properties.int(key) {
        Some(w) if w == 0 || u32::try_from(w).is_err() => Err(ModelError::BadProperty {
            path: path.to_string(),
            key,
            value: w.to_string(),
        }),
        _ => Ok(()),
    }
}

fn check_overlap(path: &str, fields: &[Field]) -> Result<(), ModelError> {
    let mut sorted: Vec<&Field> = fields.iter().collect();
    sorted.sort_by_key(|f| f.lsb);
    for pair in sorted.windows(2) {
        if pair[1].lsb <= pair[0].msb {
            return Err(ModelError::FieldOverlap {
                path: path.to_string(),
                first: pair[0].inst_name.clone(),
                second: pair[1].inst_name.clone(),
            });
        }
    }
    Ok(())
}

//=============================================================================
// Fields
//=============================================================================

/// A bit range within a register.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Field {
    pub inst_name: String,
    pub lsb: u32,
    pub msb: u32,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
}

impl Field {
    /// A field spanning bits `[high:low]`.
    pub fn new(inst_name: &str, low: u32, high: u32) -> Self {
        Self {
            inst_name: inst_name.to_string(),
            lsb: low,
            msb: high,
            properties: Properties::default(),
        }
    }

    pub fn prop(mut self, key: &str, value: impl Into<PropertyValue>) -> Self {
        self.properties.set(key, value);
        self
    }

    pub fn low(&self) -> u32 {
        self.lsb
    }

    pub fn high(&self) -> u32 {
        self.msb
    }

    pub fn width(&self) -> u32 {
        self.msb - self.lsb + 1
    }

    /// Bit mask of the field in register position.
    pub fn mask(&self) -> u64 {
        let ones = if self.width() >= 64 {
            u64::MAX
        } else {
            (1u64 << self.width()) - 1
        };
        ones.checked_shl(self.lsb).unwrap_or(0)
    }

    pub fn display_name(&self) -> Option<&str> {
        self.properties.str("name")
    }

    pub fn desc(&self) -> Option<&str> {
        self.properties.str("desc")
    }

    pub fn is_present(&self) -> bool {
        self.properties.bool_or("ispresent", true)
    }

    pub fn sw(&self) -> SwAccess {
        self.properties.typed("sw").unwrap_or_default()
    }

    pub fn hw(&self) -> HwAccess {
        self.properties.typed("hw").unwrap_or_default()
    }

    pub fn onread(&self) -> Option<OnReadType> {
        self.properties.typed("onread")
    }

    pub fn onwrite(&self) -> Option<OnWriteType> {
        self.properties.typed("onwrite")
    }

    pub fn reset(&self) -> Option<u64> {
        self.properties.int("reset")
    }

    pub fn encode(&self) -> Option<&[EnumeratedValue]> {
        self.properties.encode()
    }

    pub fn donttest(&self) -> bool {
        self.properties.bool_or("donttest", false)
    }

    pub fn is_sw_readable(&self) -> bool {
        self.sw().is_readable()
    }

    pub fn is_sw_writable(&self) -> bool {
        self.sw().is_writable()
    }

    pub fn is_hw_readable(&self) -> bool {
        self.hw().is_readable()
    }

    pub fn is_hw_writable(&self) -> bool {
        self.hw().is_writable()
    }

    /// Explicit `volatile` property, otherwise true when hardware can change
    /// the value or reads have side effects.
    pub fn is_volatile(&self) -> bool {
        match self.properties.get("volatile") {
            Some(_) => self.properties.bool_or("volatile", false),
            None => self.is_hw_writable() || self.onread().is_some(),
        }
    }

    fn validate(&self, reg_path: &str, regwidth: u32) -> Result<(), ModelError> {
        let path = format!("{reg_path}.{}", self.inst_name);
        if self.lsb > self.msb || self.msb >= regwidth {
            return Err(ModelError::FieldRange {
                path,
                lsb: self.lsb,
                msb: self.msb,
                regwidth,
            });
        }
        self.properties.parsed::<SwAccess>("sw", &path)?;
        self.properties.parsed::<HwAccess>("hw", &path)?;
        self.properties.parsed::<OnReadType>("onread", &path)?;
        self.properties.parsed::<OnWriteType>("onwrite", &path)?;
        Ok(())
    }
}

//=============================================================================
// Design
//=============================================================================

/// The elaborated design handed over by the front-end.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Design {
    top: Node,
}

impl Design {
    pub fn new(top: Node) -> Self {
        Self { top }
    }

    /// The top-level address map (or memory).
    pub fn top(&self) -> &Node {
        &self.top
    }

    pub fn from_json_str(input: &str) -> Result<Self, ExportError> {
        let design: Design = serde_json::from_str(input)?;
        design.top.validate()?;
        Ok(design)
    }

    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let input = std::fs::read_to_string(path).map_err(|e| ExportError::io(path, e))?;
        Self::from_json_str(&input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        Node::addrmap("chip").child(
            Node::reg("ctrl")
                .at(0x4)
                .field(Field::new("enable", 0, 0).prop("sw", "rw"))
                .field(Field::new("mode", 1, 3).prop("reset", 2)),
        )
    }

    #[test]
    fn test_defaults() {
        let reg = Node::reg("r");
        assert_eq!(reg.regwidth(), 32);
        assert_eq!(reg.accesswidth(), 32);
        assert_eq!(reg.size(), 4);
        assert!(reg.is_present());
        assert_eq!(reg.display_name(), None);

        let field = Field::new("f", 4, 7);
        assert_eq!(field.width(), 4);
        assert_eq!(field.mask(), 0xf0);
        assert_eq!(field.sw(), SwAccess::Rw);
        assert_eq!(field.hw(), HwAccess::Rw);
        assert_eq!(field.reset(), None);
        assert!(field.is_volatile());
    }

    #[test]
    fn test_full_width_mask() {
        assert_eq!(Field::new("all", 0, 63).mask(), u64::MAX);
        assert_eq!(Field::new("top", 31, 31).mask(), 0x8000_0000);
    }

    #[test]
    fn test_derived_container_size() {
        let map = Node::addrmap("m")
            .child(Node::reg("a").at(0x0))
            .child(Node::reg("b").at(0x10).array(&[4], 4));
        assert_eq!(map.size(), 0x20);
        assert_eq!(Node::mem("sram", 256, 32).size(), 1024);
    }

    #[test]
    fn test_validate_accepts_sample() {
        assert_eq!(sample().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_overlap() {
        let node = Node::addrmap("chip").child(
            Node::reg("r")
                .field(Field::new("a", 0, 3))
                .field(Field::new("b", 3, 4)),
        );
        assert!(matches!(
            node.validate(),
            Err(ModelError::FieldOverlap { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_sw() {
        let node = Node::addrmap("chip")
            .child(Node::reg("r").field(Field::new("a", 0, 0).prop("sw", "sometimes")));
        let err = node.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "chip.r.a: property 'sw' has unsupported value 'sometimes'"
        );
    }

    #[test]
    fn test_validate_rejects_field_outside_register() {
        let node = Node::reg("r").field(Field::new("a", 30, 32));
        assert!(matches!(node.validate(), Err(ModelError::FieldRange { .. })));
    }

    #[test]
    fn test_validate_rejects_zero_dimension() {
        let node = Node::addrmap("chip").child(Node::reg("r").array(&[0], 4));
        assert!(matches!(node.validate(), Err(ModelError::BadArray { .. })));
    }

    #[test]
    fn test_validate_rejects_wide_register() {
        let node = Node::addrmap("chip").child(
            Node::reg("wide")
                .prop("regwidth", 128)
                .field(Field::new("hi", 64, 71)),
        );
        let err = node.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "chip.wide: property 'regwidth' has unsupported value '128'"
        );
        assert_eq!(Node::reg("r").prop("regwidth", 64).validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_truncated_widths() {
        let huge = (1u64 << 32) + 8;
        let reg = Node::reg("r").prop("regwidth", huge);
        assert!(matches!(
            reg.validate(),
            Err(ModelError::BadProperty { key: "regwidth", .. })
        ));
        let reg = Node::reg("r").prop("accesswidth", huge);
        assert!(matches!(
            reg.validate(),
            Err(ModelError::BadProperty { key: "accesswidth", .. })
        ));
        let mem = Node::addrmap("m").child(Node::mem("sram", 16, 32).prop("memwidth", huge));
        assert!(matches!(
            mem.validate(),
            Err(ModelError::BadProperty { key: "memwidth", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_unaddressable_array() {
        let node = Node::addrmap("chip").child(Node::reg("r").array(&[u64::MAX, 2], 4));
        assert!(matches!(node.validate(), Err(ModelError::BadArray { .. })));
        let node = Node::addrmap("chip").child(Node::reg("r").array(&[1 << 40], 1 << 40));
        assert!(matches!(node.validate(), Err(ModelError::BadArray { .. })));
    }

    #[test]
    fn test_json_round_trip() {
        let json = r#"{
            "top": {
                "inst_name": "chip",
                "kind": "addrmap",
                "properties": { "desc": "Top level" },
                "children": [{
                    "inst_name": "status",
                    "kind": "reg",
                    "offset": 8,
                    "properties": { "regwidth": 16 },
                    "fields": [{
                        "inst_name": "state",
                        "lsb": 0,
                        "msb": 1,
                        "properties": {
                            "sw": "r",
                            "hw": "w",
                            "onread": "rclr",
                            "encode": [
                                { "name": "idle", "value": 0 },
                                { "name": "busy", "value": 1, "desc": "Working" }
                            ]
                        }
                    }]
                }]
            }
        }"#;
        let design = Design::from_json_str(json).unwrap();
        let top = design.top();
        assert_eq!(top.desc(), Some("Top level"));
        let status = &top.children[0];
        assert_eq!(status.kind, NodeKind::Reg);
        assert_eq!(status.offset, 8);
        assert_eq!(status.size(), 2);
        let state = &status.fields[0];
        assert_eq!(state.sw(), SwAccess::R);
        assert_eq!(state.hw(), HwAccess::W);
        assert_eq!(state.onread(), Some(OnReadType::Rclr));
        let encode = state.encode().unwrap();
        assert_eq!(encode.len(), 2);
        assert_eq!(encode[1].desc.as_deref(), Some("Working"));
    }

    #[test]
    fn test_hw_alias() {
        assert_eq!("wr".parse::<HwAccess>(), Ok(HwAccess::Rw));
        assert_eq!(HwAccess::Rw.to_string(), "rw");
        assert_eq!(OnWriteType::Woclr.to_string(), "woclr");
    }
}
