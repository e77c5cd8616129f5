// Licensed under the Apache-2.0 license

//! Address and bit-field constants for C and Verilog.
//!
//! Every register gets `<PARENT>_<REG>` bound to its absolute address, and
//! every field `<REG>_<FIELD>_OFFSET` and `<REG>_<FIELD>_MASK`. Arrays are
//! unrolled, so each element has its own address constant. The C and
//! Verilog dialects differ only in the directive prefix.

use crate::access::AccessCode;
use crate::config::{HeaderDialect, HeaderOptions, WalkOptions};
use crate::error::ExportResult;
use crate::model::{Field, NodeKind};
use crate::output::Artifact;
use crate::session::ExportSession;
use crate::util::{hex, include_guard, macro_name};
use crate::walk::{visit_children, visit_fields, Emitter, NodeRef};
use std::collections::BTreeMap;
use std::fmt::Write;

#[derive(Clone, Debug, Default)]
pub struct HeaderEmitter {
    options: HeaderOptions,
}

impl HeaderEmitter {
    pub fn new(options: HeaderOptions) -> Self {
        Self { options }
    }

    /// `#define` dialect.
    pub fn c() -> Self {
        Self::new(HeaderOptions::default().dialect(HeaderDialect::C))
    }

    /// `` `define `` dialect.
    pub fn verilog() -> Self {
        Self::new(HeaderOptions::default().dialect(HeaderDialect::Verilog))
    }

    pub fn dialect(&self) -> HeaderDialect {
        self.options.dialect
    }

    fn define(&self, output: &mut String, name: &str, value: &str) {
        // Writing to a String cannot fail.
        let _ = writeln!(output, "{}define {name} {value}", self.options.dialect.prefix());
    }

    /// Define `name` unless it already exists. The first value wins; a
    /// different later value is reported and dropped.
    fn define_once(
        &self,
        session: &mut ExportSession<'_, HeaderState>,
        path: &str,
        name: String,
        value: String,
    ) {
        match session.state.defined.get(&name) {
            Some(previous) if *previous == value => {}
            Some(previous) => {
                let message = format!(
                    "{path}: '{name}' already defined as {previous}, keeping it instead of {value}"
                );
                session.warn(message);
            }
            None => {
                self.define(&mut session.state.body, &name, &value);
                session.state.defined.insert(name, value);
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct HeaderState {
    body: String,
    /// Constants already emitted, with their values.
    defined: BTreeMap<String, String>,
}

impl Emitter for HeaderEmitter {
    type State = HeaderState;

    fn walk_options(&self) -> WalkOptions {
        WalkOptions::new()
            .unroll(true)
            .skip_not_present(self.options.skip_not_present)
    }

    fn on_address_block(
        &self,
        node: &NodeRef<'_>,
        session: &mut ExportSession<'_, Self::State>,
    ) -> ExportResult<()> {
        let _ = writeln!(session.state.body, "\n// {}", node.path);
        if node.kind() == NodeKind::Mem {
            return self.memory_constants(node, node, session);
        }
        visit_children(self, node, session)
    }

    fn on_register_file(
        &self,
        node: &NodeRef<'_>,
        _parent: &NodeRef<'_>,
        session: &mut ExportSession<'_, Self::State>,
    ) -> ExportResult<()> {
        visit_children(self, node, session)
    }

    fn on_register(
        &self,
        node: &NodeRef<'_>,
        parent: &NodeRef<'_>,
        session: &mut ExportSession<'_, Self::State>,
    ) -> ExportResult<()> {
        super::check_register_array(node, session)?;
        let name = macro_name(&[&parent.ident(), &node.ident()]);
        self.define_once(session, &node.path, name, hex(node.absolute_address));
        visit_fields(self, node, session)
    }

    fn on_memory(
        &self,
        node: &NodeRef<'_>,
        parent: &NodeRef<'_>,
        session: &mut ExportSession<'_, Self::State>,
    ) -> ExportResult<()> {
        self.memory_constants(node, parent, session)
    }

    fn on_field(
        &self,
        field: &Field,
        _access: AccessCode,
        parent: &NodeRef<'_>,
        session: &mut ExportSession<'_, Self::State>,
    ) -> ExportResult<()> {
        let reg = parent.inst_name();
        let constants = [
            (
                macro_name(&[reg, &field.inst_name, "OFFSET"]),
                field.low().to_string(),
            ),
            (macro_name(&[reg, &field.inst_name, "MASK"]), hex(field.mask())),
        ];
        for (name, value) in constants {
            self.define_once(session, &parent.path, name, value);
        }
        Ok(())
    }

    fn finish(&self, session: &mut ExportSession<'_, Self::State>) -> ExportResult<Artifact> {
        let guard = include_guard(session.cx().destination);
        let prefix = self.options.dialect.prefix();
        let mut output = String::new();
        let _ = writeln!(output, "{prefix}ifndef {guard}");
        let _ = writeln!(output, "{prefix}define {guard}");
        output.push_str(&session.state.body);
        let _ = writeln!(output, "\n{prefix}endif");
        Ok(Artifact::text(output))
    }
}

impl HeaderEmitter {
    fn memory_constants(
        &self,
        node: &NodeRef<'_>,
        parent: &NodeRef<'_>,
        session: &mut ExportSession<'_, HeaderState>,
    ) -> ExportResult<()> {
        let name = if std::ptr::eq(node.node, parent.node) {
            macro_name(&[&node.ident()])
        } else {
            macro_name(&[&parent.ident(), &node.ident()])
        };
        let base = hex(node.absolute_address);
        let size = hex(node.size());
        self.define_once(session, &node.path, format!("{name}_BASE"), base);
        self.define_once(session, &node.path, format!("{name}_SIZE"), size);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::MemorySink;
    use crate::export;
    use crate::model::Node;

    fn render(emitter: &HeaderEmitter, top: &Node, name: &str) -> (String, MemorySink) {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join(name);
        let sink = MemorySink::new();
        export(emitter, top, &dest, &sink).unwrap();
        (std::fs::read_to_string(dest).unwrap(), sink)
    }

    #[test]
    fn test_c_dialect() {
        let top = Node::addrmap("chip").child(
            Node::reg("ctrl")
                .field(Field::new("enable", 0, 0))
                .field(Field::new("mode", 4, 6)),
        );
        let (text, _) = render(&HeaderEmitter::c(), &top, "chip.h");
        assert_eq!(
            text,
            "#ifndef __CHIP_H__\n\
             #define __CHIP_H__\n\
             \n\
             // chip\n\
             #define CHIP_CTRL 0x0\n\
             #define CTRL_ENABLE_OFFSET 0\n\
             #define CTRL_ENABLE_MASK 0x1\n\
             #define CTRL_MODE_OFFSET 4\n\
             #define CTRL_MODE_MASK 0x70\n\
             \n\
             #endif\n"
        );
    }

    #[test]
    fn test_verilog_dialect() {
        let top = Node::addrmap("chip").child(Node::reg("ctrl").field(Field::new("enable", 0, 0)));
        let (text, _) = render(&HeaderEmitter::verilog(), &top, "chip.svh");
        assert!(text.starts_with("`ifndef __CHIP_SVH__\n`define __CHIP_SVH__\n"));
        assert!(text.contains("`define CHIP_CTRL 0x0\n"));
        assert!(text.ends_with("`endif\n"));
        assert!(!text.contains('#'));
    }

    #[test]
    fn test_unrolled_array_and_shared_fields() {
        let top = Node::addrmap("chip").child(
            Node::reg("entry")
                .at(0x10)
                .array(&[2], 4)
                .field(Field::new("valid", 31, 31)),
        );
        let (text, sink) = render(&HeaderEmitter::c(), &top, "chip.h");
        assert!(text.contains("#define CHIP_ENTRY_0 0x10\n"));
        assert!(text.contains("#define CHIP_ENTRY_1 0x14\n"));
        assert_eq!(text.matches("ENTRY_VALID_MASK").count(), 1);
        assert!(text.contains("#define ENTRY_VALID_MASK 0x80000000\n"));
        assert!(sink.messages().iter().all(|(s, _)| *s != crate::diag::Severity::Warning));
    }

    #[test]
    fn test_conflicting_field_constant_warns() {
        let top = Node::addrmap("soc")
            .child(Node::regfile("a").child(Node::reg("ctrl").field(Field::new("en", 0, 0))))
            .child(
                Node::regfile("b")
                    .at(0x100)
                    .child(Node::reg("ctrl").field(Field::new("en", 1, 1))),
            );
        let (text, sink) = render(&HeaderEmitter::c(), &top, "soc.h");
        assert!(text.contains("#define A_CTRL 0x0\n"));
        assert!(text.contains("#define B_CTRL 0x100\n"));
        assert!(text.contains("#define CTRL_EN_OFFSET 0\n"));
        assert_eq!(sink.with_severity(crate::diag::Severity::Warning).len(), 2);
    }

    #[test]
    fn test_conflicting_register_constant_warns() {
        let map = |name: &str, offset: u64| {
            Node::addrmap(name)
                .at(offset)
                .child(Node::regfile("rf").child(Node::reg("ctrl")))
        };
        let top = Node::addrmap("soc").child(map("a", 0)).child(map("b", 0x100));
        let (text, sink) = render(&HeaderEmitter::c(), &top, "soc.h");
        assert_eq!(text.matches("#define RF_CTRL ").count(), 1);
        assert!(text.contains("#define RF_CTRL 0x0\n"));
        let warnings = sink.with_severity(crate::diag::Severity::Warning);
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0],
            "soc.b.rf.ctrl: 'RF_CTRL' already defined as 0x0, keeping it instead of 0x100"
        );
    }

    #[test]
    fn test_sparse_array_reported() {
        let top = Node::addrmap("chip").child(Node::reg("slot").array(&[2], 8));
        let (text, sink) = render(&HeaderEmitter::c(), &top, "chip.h");
        assert!(text.contains("#define CHIP_SLOT_1 0x8\n"));
        let notes = sink.with_severity(crate::diag::Severity::Info);
        assert!(notes.iter().any(|m| m == "chip.slot[0]: stride 8 leaves gaps after each 4-byte register"));
        assert!(sink.with_severity(crate::diag::Severity::Warning).is_empty());
    }

    #[test]
    fn test_memory_constants() {
        let top = Node::addrmap("soc")
            .child(Node::reg("id"))
            .child(Node::mem("sram", 256, 32).at(0x1000));
        let (text, _) = render(&HeaderEmitter::c(), &top, "soc.h");
        assert!(text.contains("#define SOC_SRAM_BASE 0x1000\n"));
        assert!(text.contains("#define SOC_SRAM_SIZE 0x400\n"));

        let (text, _) = render(&HeaderEmitter::c(), &Node::mem("rom", 16, 64), "rom.h");
        assert!(text.contains("#define ROM_BASE 0x0\n#define ROM_SIZE 0x80\n"));
    }

    #[test]
    fn test_guard_follows_destination() {
        let top = Node::addrmap("chip");
        let (text, _) = render(&HeaderEmitter::c(), &top, "chip_regs.h");
        assert!(text.starts_with("#ifndef __CHIP_REGS_H__\n#define __CHIP_REGS_H__\n"));
    }
}
