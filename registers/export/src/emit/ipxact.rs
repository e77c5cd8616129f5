// Licensed under the Apache-2.0 license

//! IP-XACT component description.
//!
//! Address blocks, register files, registers and fields become nested
//! elements of one `memoryMap`. The format declares the bus width only per
//! address block, so the block's `width` element is written as a
//! placeholder and filled in once every register below it has been seen.
//!
//! Two things cannot be expressed and are dropped with a warning: memories
//! nested below an address block, and register arrays with gaps between
//! elements.

use crate::access::AccessCode;
use crate::array::{range_size, StrideCheck};
use crate::config::{IpxactOptions, WalkOptions};
use crate::error::{ExportError, ExportResult};
use crate::explode::Explosion;
use crate::model::{Field, NodeKind, OnReadType, OnWriteType, SwAccess};
use crate::output::Artifact;
use crate::session::ExportSession;
use crate::util::sv_hex;
use crate::walk::{visit_children, visit_fields, Emitter, NodeRef};
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// IP-XACT `access` value for a software access kind.
pub fn access_from_sw(sw: SwAccess) -> Option<&'static str> {
    match sw {
        SwAccess::Rw => Some("read-write"),
        SwAccess::R => Some("read-only"),
        SwAccess::W => Some("write-only"),
        SwAccess::Rw1 => Some("read-writeOnce"),
        SwAccess::W1 => Some("writeOnce"),
        SwAccess::Na => None,
    }
}

/// IP-XACT `modifiedWriteValue` for a write side effect.
pub fn modified_write_value(onwrite: OnWriteType) -> &'static str {
    match onwrite {
        OnWriteType::Woset => "oneToSet",
        OnWriteType::Woclr => "oneToClear",
        OnWriteType::Wot => "oneToToggle",
        OnWriteType::Wzs => "zeroToSet",
        OnWriteType::Wzc => "zeroToClear",
        OnWriteType::Wzt => "zeroToToggle",
        OnWriteType::Wclr => "clear",
        OnWriteType::Wset => "set",
        OnWriteType::Wuser => "modify",
    }
}

/// IP-XACT `readAction` for a read side effect.
pub fn read_action(onread: OnReadType) -> &'static str {
    match onread {
        OnReadType::Rclr => "clear",
        OnReadType::Rset => "set",
        OnReadType::Ruser => "modify",
    }
}

/// An element of the document being built.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<XmlElement>,
}

impl XmlElement {
    fn new(name: String) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    fn write<W: std::io::Write>(&self, writer: &mut Writer<W>) -> ExportResult<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }
        if self.text.is_none() && self.children.is_empty() {
            return write_event(writer, Event::Empty(start));
        }
        write_event(writer, Event::Start(start))?;
        if let Some(text) = &self.text {
            let escaped = partial_escape(text);
            write_event(writer, Event::Text(BytesText::from_escaped(escaped)))?;
        }
        for child in &self.children {
            child.write(writer)?;
        }
        write_event(writer, Event::End(BytesEnd::new(self.name.as_str())))
    }
}

fn write_event<W: std::io::Write>(writer: &mut Writer<W>, event: Event<'_>) -> ExportResult<()> {
    writer
        .write_event(event)
        .map_err(|e| ExportError::Xml(e.to_string()))
}

#[derive(Debug, Default)]
pub struct IpxactState {
    /// Open elements, innermost last. The first is the memory map.
    stack: Vec<XmlElement>,
}

#[derive(Clone, Debug, Default)]
pub struct IpxactEmitter {
    options: IpxactOptions,
}

impl IpxactEmitter {
    pub fn new(options: IpxactOptions) -> Self {
        Self { options }
    }

    fn tag(&self, name: &str) -> String {
        format!("{}:{name}", self.options.standard.prefix())
    }

    fn open(&self, session: &mut ExportSession<'_, IpxactState>, name: &str) {
        session.state.stack.push(XmlElement::new(self.tag(name)));
    }

    /// Close the innermost element and attach it to its parent.
    fn close(&self, session: &mut ExportSession<'_, IpxactState>) -> ExportResult<()> {
        let stack = &mut session.state.stack;
        if stack.len() < 2 {
            return Err(ExportError::Fatal("XML element stack underflow".to_string()));
        }
        if let Some(element) = stack.pop() {
            if let Some(parent) = stack.last_mut() {
                parent.children.push(element);
            }
        }
        Ok(())
    }

    fn value(
        &self,
        session: &mut ExportSession<'_, IpxactState>,
        name: &str,
        text: impl Into<String>,
    ) -> ExportResult<()> {
        let mut element = XmlElement::new(self.tag(name));
        element.text = Some(text.into());
        let parent = session
            .state
            .stack
            .last_mut()
            .ok_or_else(|| ExportError::Fatal("no open XML element".to_string()))?;
        parent.children.push(element);
        Ok(())
    }

    fn name_group(
        &self,
        session: &mut ExportSession<'_, IpxactState>,
        name: &str,
        display_name: Option<&str>,
        desc: Option<&str>,
    ) -> ExportResult<()> {
        self.value(session, "name", name)?;
        if let Some(display_name) = display_name {
            self.value(session, "displayName", display_name)?;
        }
        if let Some(desc) = desc {
            self.value(session, "description", desc)?;
        }
        Ok(())
    }

    fn dims(&self, session: &mut ExportSession<'_, IpxactState>, node: &NodeRef<'_>) -> ExportResult<()> {
        if let Some(array) = &node.node.array {
            for dim in &array.dimensions {
                self.value(session, "dim", dim.to_string())?;
            }
        }
        Ok(())
    }

    fn nested_memory(&self, node: &NodeRef<'_>, session: &mut ExportSession<'_, IpxactState>) {
        session.warn(format!(
            "IP-XACT does not support 'mem' nodes that are nested in hierarchy. Discarding '{}'",
            node.path
        ));
    }
}

impl Emitter for IpxactEmitter {
    type State = IpxactState;

    fn walk_options(&self) -> WalkOptions {
        WalkOptions::new().skip_not_present(self.options.skip_not_present)
    }

    fn begin(
        &self,
        top: &NodeRef<'_>,
        session: &mut ExportSession<'_, Self::State>,
    ) -> ExportResult<()> {
        self.open(session, "memoryMap");
        let explosion = session.cx().explosion;
        match explosion {
            // The top node becomes the memory map itself.
            Explosion::Explode => {
                self.name_group(session, top.inst_name(), top.node.display_name(), top.node.desc())
            }
            Explosion::Wrap => self.value(session, "name", format!("{}_mmap", top.inst_name())),
        }
    }

    fn on_address_block(
        &self,
        node: &NodeRef<'_>,
        session: &mut ExportSession<'_, Self::State>,
    ) -> ExportResult<()> {
        session.reset_bus_width();
        self.open(session, "addressBlock");
        self.name_group(session, node.inst_name(), node.node.display_name(), node.node.desc())?;
        if !node.node.is_present() {
            self.value(session, "isPresent", "0")?;
        }
        self.value(session, "baseAddress", sv_hex(node.absolute_address))?;
        self.value(session, "range", sv_hex(node.size()))?;

        // Filled in after the children are visited.
        self.value(session, "width", String::new())?;
        let width_slot = session
            .state
            .stack
            .last()
            .map_or(0, |block| block.children.len() - 1);

        if node.kind() == NodeKind::Mem {
            self.value(session, "usage", "memory")?;
            if let Some(access) = access_from_sw(node.node.sw()) {
                self.value(session, "access", access)?;
            }
        }

        visit_children(self, node, session)?;

        let width = match session.bus_width() {
            Some(width) => width,
            None if node.kind() == NodeKind::Mem => node.node.memwidth().unwrap_or(32),
            None => 32,
        };
        if let Some(block) = session.state.stack.last_mut() {
            if let Some(slot) = block.children.get_mut(width_slot) {
                slot.text = Some(width.to_string());
            }
        }
        self.close(session)?;
        Ok(())
    }

    fn on_register_file(
        &self,
        node: &NodeRef<'_>,
        _parent: &NodeRef<'_>,
        session: &mut ExportSession<'_, Self::State>,
    ) -> ExportResult<()> {
        self.open(session, "registerFile");
        self.name_group(session, node.inst_name(), node.node.display_name(), node.node.desc())?;
        if !node.node.is_present() {
            self.value(session, "isPresent", "0")?;
        }
        self.dims(session, node)?;
        self.value(session, "addressOffset", sv_hex(node.node.offset))?;
        // For arrays the range is also the increment between elements.
        self.value(session, "range", sv_hex(range_size(node.node)))?;
        visit_children(self, node, session)?;
        self.close(session)?;
        Ok(())
    }

    fn on_register(
        &self,
        node: &NodeRef<'_>,
        _parent: &NodeRef<'_>,
        session: &mut ExportSession<'_, Self::State>,
    ) -> ExportResult<()> {
        if let StrideCheck::Sparse { stride, size } = super::check_register_array(node, session)? {
            session.warn(format!(
                "IP-XACT does not support register arrays whose stride ({stride}) is larger than the register's size ({size}). Discarding '{}'",
                node.path
            ));
            return Ok(());
        }
        let reg = node.node;
        self.open(session, "register");
        self.name_group(session, node.inst_name(), reg.display_name(), reg.desc())?;
        if !reg.is_present() {
            self.value(session, "isPresent", "0")?;
        }
        self.dims(session, node)?;
        self.value(session, "addressOffset", sv_hex(reg.offset))?;
        self.value(session, "size", reg.regwidth().to_string())?;
        session.observe_bus_width(reg.accesswidth().max(reg.regwidth()));
        visit_fields(self, node, session)?;
        self.close(session)?;
        Ok(())
    }

    fn on_memory(
        &self,
        node: &NodeRef<'_>,
        _parent: &NodeRef<'_>,
        session: &mut ExportSession<'_, Self::State>,
    ) -> ExportResult<()> {
        self.nested_memory(node, session);
        Ok(())
    }

    fn on_field(
        &self,
        field: &Field,
        _access: AccessCode,
        _parent: &NodeRef<'_>,
        session: &mut ExportSession<'_, Self::State>,
    ) -> ExportResult<()> {
        self.open(session, "field");
        self.name_group(session, &field.inst_name, field.display_name(), field.desc())?;
        if !field.is_present() {
            self.value(session, "isPresent", "0")?;
        }
        self.value(session, "bitOffset", field.low().to_string())?;
        if let Some(reset) = field.reset() {
            self.open(session, "resets");
            self.open(session, "reset");
            self.value(session, "value", sv_hex(reset))?;
            self.close(session)?;
            self.close(session)?;
        }
        self.value(session, "bitWidth", field.width().to_string())?;
        if field.is_volatile() {
            self.value(session, "volatile", "true")?;
        }
        if let Some(access) = access_from_sw(field.sw()) {
            self.value(session, "access", access)?;
        }
        if let Some(encode) = field.encode() {
            self.open(session, "enumeratedValues");
            for value in encode {
                self.open(session, "enumeratedValue");
                self.name_group(
                    session,
                    &value.name,
                    value.display_name.as_deref(),
                    value.desc.as_deref(),
                )?;
                self.value(session, "value", sv_hex(value.value))?;
                self.close(session)?;
            }
            self.close(session)?;
        }
        if let Some(onwrite) = field.onwrite() {
            self.value(session, "modifiedWriteValue", modified_write_value(onwrite))?;
        }
        if let Some(onread) = field.onread() {
            self.value(session, "readAction", read_action(onread))?;
        }
        if field.donttest() {
            self.value(session, "testable", "false")?;
        }
        self.close(session)?;
        Ok(())
    }

    fn finish(&self, session: &mut ExportSession<'_, Self::State>) -> ExportResult<Artifact> {
        let memory_map = session
            .state
            .stack
            .pop()
            .ok_or_else(|| session.fatal("memory map missing"))?;
        let top = session.cx().top;

        let mut component = XmlElement::new(self.tag("component"));
        component.attributes.push((
            format!("xmlns:{}", self.options.standard.prefix()),
            self.options.standard.namespace().to_string(),
        ));
        for (name, text) in [
            ("vendor", self.options.vendor.as_str()),
            ("library", self.options.library.as_str()),
            ("name", top.inst_name.as_str()),
            ("version", self.options.version.as_str()),
        ] {
            let mut element = XmlElement::new(self.tag(name));
            element.text = Some(text.to_string());
            component.children.push(element);
        }
        let mut memory_maps = XmlElement::new(self.tag("memoryMaps"));
        memory_maps.children.push(memory_map);
        component.children.push(memory_maps);

        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        write_event(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;
        component.write(&mut writer)?;
        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        Ok(Artifact::File(bytes))
    }
}
