// Licensed under the Apache-2.0 license

//! UVM register model.
//!
//! The output is one SystemVerilog package holding, in order, a `uvm_reg`
//! class per register, a `uvm_mem` class per memory, a `uvm_reg_block` class
//! per register file or block (children before parents), and finally the
//! `<top>_reg_model` block that maps every address block.
//!
//! Arrays get a single class. The parent declares an array of handles,
//! creates them in a `foreach` loop and then maps each element at its own
//! resolved offset.

use crate::access::AccessCode;
use crate::array::element_addresses;
use crate::config::{UvmOptions, WalkOptions};
use crate::error::ExportResult;
use crate::model::{ArrayDims, Field, NodeKind, SwAccess};
use crate::output::Artifact;
use crate::session::ExportSession;
use crate::util::{sv_hex, sv_ident};
use crate::walk::{fields, visit_children, visit_fields, Emitter, NodeRef};
use std::collections::BTreeSet;
use std::fmt::Write;

const INDENT: &str = "  ";

#[derive(Clone, Debug, Default)]
pub struct UvmEmitter {
    options: UvmOptions,
}

impl UvmEmitter {
    pub fn new(options: UvmOptions) -> Self {
        Self { options }
    }
}

/// What a block instantiates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Member {
    Reg,
    Block,
    Mem,
}

/// A `uvm_reg_block` class under construction.
#[derive(Debug, Default)]
struct BlockBuilder {
    class: String,
    declarations: Vec<String>,
    build: Vec<String>,
    /// Widest register seen in this block or below, in bits.
    width: Option<u32>,
}

impl BlockBuilder {
    fn new(class: String) -> Self {
        Self {
            class,
            ..Default::default()
        }
    }

    fn observe_width(&mut self, width: u32) {
        self.width = Some(self.width.map_or(width, |w| w.max(width)));
    }

    /// Declare, create and map `name`, once per element at `offsets`.
    fn instantiate(
        &mut self,
        member: Member,
        name: &str,
        class: &str,
        array: Option<&ArrayDims>,
        offsets: &[u64],
        rights: &str,
    ) {
        let dims: &[u64] = array.map_or(&[][..], |a| a.dimensions.as_slice());
        let dim_decl: String = dims.iter().map(|d| format!("[{d}]")).collect();
        let rand = if member == Member::Mem { "" } else { "rand " };
        self.declarations
            .push(format!("{rand}{class} {name}{dim_decl};"));

        let configure = match member {
            Member::Reg => vec![".configure(this, null, \"\");", ".build();"],
            Member::Block => vec![".configure(this, \"\");", ".build();"],
            Member::Mem => vec![".configure(this, \"\");"],
        };
        if dims.is_empty() {
            let handle = format!("this.{name}");
            self.build
                .push(format!("{handle} = {class}::type_id::create(\"{name}\");"));
            for call in &configure {
                self.build.push(format!("{handle}{call}"));
            }
        } else {
            let vars: Vec<String> = (0..dims.len()).map(|i| format!("i{i}")).collect();
            let subscript: String = vars.iter().map(|v| format!("[{v}]")).collect();
            let pattern: String = dims.iter().map(|_| "[%0d]").collect();
            let handle = format!("this.{name}{subscript}");
            self.build
                .push(format!("foreach (this.{name}[{}]) begin", vars.join(", ")));
            self.build.push(format!(
                "{INDENT}{handle} = {class}::type_id::create($sformatf(\"{name}{pattern}\", {}));",
                vars.join(", ")
            ));
            for call in &configure {
                self.build.push(format!("{INDENT}{handle}{call}"));
            }
            self.build.push("end".to_string());
        }

        for (linear, offset) in offsets.iter().enumerate() {
            let subscript: String = array
                .map(|a| a.unravel(linear as u64))
                .unwrap_or_default()
                .iter()
                .map(|i| format!("[{i}]"))
                .collect();
            let handle = format!("this.{name}{subscript}");
            let line = match member {
                Member::Reg => format!(
                    "this.default_map.add_reg({handle}, {}, \"{rights}\");",
                    sv_hex(*offset)
                ),
                Member::Block => format!(
                    "this.default_map.add_submap({handle}.default_map, {});",
                    sv_hex(*offset)
                ),
                Member::Mem => format!(
                    "this.default_map.add_mem({handle}, {}, \"{rights}\");",
                    sv_hex(*offset)
                ),
            };
            self.build.push(line);
        }
    }

    fn render(&self, output: &mut String, lock: bool) {
        let width_bytes = self.width.unwrap_or(32).div_ceil(8);
        let class = &self.class;
        let _ = writeln!(output, "{INDENT}class {class} extends uvm_reg_block;");
        let _ = writeln!(output, "{INDENT}{INDENT}`uvm_object_utils({class})");
        let _ = writeln!(output);
        for decl in &self.declarations {
            let _ = writeln!(output, "{INDENT}{INDENT}{decl}");
        }
        if !self.declarations.is_empty() {
            let _ = writeln!(output);
        }
        let _ = writeln!(output, "{INDENT}{INDENT}function new(string name = \"{class}\");");
        let _ = writeln!(output, "{INDENT}{INDENT}{INDENT}super.new(name, UVM_NO_COVERAGE);");
        let _ = writeln!(output, "{INDENT}{INDENT}endfunction");
        let _ = writeln!(output);
        let _ = writeln!(output, "{INDENT}{INDENT}virtual function void build();");
        let _ = writeln!(
            output,
            "{INDENT}{INDENT}{INDENT}this.default_map = create_map(\"default_map\", 0, {width_bytes}, UVM_LITTLE_ENDIAN);"
        );
        for line in &self.build {
            let _ = writeln!(output, "{INDENT}{INDENT}{INDENT}{line}");
        }
        if lock {
            let _ = writeln!(output, "{INDENT}{INDENT}{INDENT}lock_model();");
        }
        let _ = writeln!(output, "{INDENT}{INDENT}endfunction");
        let _ = writeln!(output, "{INDENT}endclass");
        let _ = writeln!(output);
    }
}

/// A `uvm_reg` class under construction.
#[derive(Debug, Default)]
struct RegBuilder {
    class: String,
    width: u32,
    declarations: Vec<String>,
    build: Vec<String>,
    /// The register holds a single field.
    single_field: bool,
    readable: bool,
    writable: bool,
}

impl RegBuilder {
    fn rights(&self) -> &'static str {
        match (self.readable, self.writable) {
            (true, false) => "RO",
            (false, true) => "WO",
            _ => "RW",
        }
    }

    fn render(&self, output: &mut String) {
        let class = &self.class;
        let _ = writeln!(output, "{INDENT}class {class} extends uvm_reg;");
        let _ = writeln!(output, "{INDENT}{INDENT}`uvm_object_utils({class})");
        let _ = writeln!(output);
        for decl in &self.declarations {
            let _ = writeln!(output, "{INDENT}{INDENT}{decl}");
        }
        if !self.declarations.is_empty() {
            let _ = writeln!(output);
        }
        let _ = writeln!(output, "{INDENT}{INDENT}function new(string name = \"{class}\");");
        let _ = writeln!(
            output,
            "{INDENT}{INDENT}{INDENT}super.new(name, {}, UVM_NO_COVERAGE);",
            self.width
        );
        let _ = writeln!(output, "{INDENT}{INDENT}endfunction");
        let _ = writeln!(output);
        let _ = writeln!(output, "{INDENT}{INDENT}virtual function void build();");
        for line in &self.build {
            let _ = writeln!(output, "{INDENT}{INDENT}{INDENT}{line}");
        }
        let _ = writeln!(output, "{INDENT}{INDENT}endfunction");
        let _ = writeln!(output, "{INDENT}endclass");
        let _ = writeln!(output);
    }
}

#[derive(Debug, Default)]
pub struct UvmState {
    regs: String,
    mems: String,
    blocks: String,
    /// Open blocks, innermost last. The first entry is the top model.
    stack: Vec<BlockBuilder>,
    reg: Option<RegBuilder>,
    classes: BTreeSet<String>,
}

impl UvmState {
    /// Reserve a class name, numbering repeats.
    fn class_name(&mut self, base: &str, suffix: &str) -> String {
        let mut name = format!("{base}_{suffix}");
        let mut n = 2;
        while self.classes.contains(&name) {
            name = format!("{base}_{n}_{suffix}");
            n += 1;
        }
        self.classes.insert(name.clone());
        name
    }
}

/// Identifier derived from the instance path, `chip_rf_ctrl`.
fn path_ident(node: &NodeRef<'_>) -> String {
    sv_ident(&node.path.replace('.', "_"))
}

fn mem_rights(node: &NodeRef<'_>) -> &'static str {
    match node.node.sw() {
        SwAccess::R => "RO",
        SwAccess::W | SwAccess::W1 => "WO",
        _ => "RW",
    }
}

impl UvmEmitter {
    fn package_name(&self, top: &str) -> String {
        self.options
            .package
            .clone()
            .unwrap_or_else(|| format!("{}_reg_pkg", sv_ident(top)))
    }

    /// Emit the `uvm_mem` class for `node` and return its name.
    fn memory_class(&self, node: &NodeRef<'_>, session: &mut ExportSession<'_, UvmState>) -> String {
        let class = session.state.class_name(&path_ident(node), "mem");
        let entries = node.node.mementries().unwrap_or(0);
        let width = node.node.memwidth().unwrap_or(32);
        let out = &mut session.state.mems;
        let _ = writeln!(out, "{INDENT}class {class} extends uvm_mem;");
        let _ = writeln!(out, "{INDENT}{INDENT}`uvm_object_utils({class})");
        let _ = writeln!(out);
        let _ = writeln!(out, "{INDENT}{INDENT}function new(string name = \"{class}\");");
        let _ = writeln!(
            out,
            "{INDENT}{INDENT}{INDENT}super.new(name, {entries}, {width}, \"{}\", UVM_NO_COVERAGE);",
            mem_rights(node)
        );
        let _ = writeln!(out, "{INDENT}{INDENT}endfunction");
        let _ = writeln!(out, "{INDENT}endclass");
        let _ = writeln!(out);
        class
    }

    /// Visit a container into a new block class; returns the class name and
    /// the width it observed.
    fn block_class(
        &self,
        node: &NodeRef<'_>,
        session: &mut ExportSession<'_, UvmState>,
    ) -> ExportResult<(String, Option<u32>)> {
        let class = session.state.class_name(&path_ident(node), "block");
        session.state.stack.push(BlockBuilder::new(class.clone()));
        visit_children(self, node, session)?;
        let builder = session
            .state
            .stack
            .pop()
            .ok_or_else(|| session.fatal("block stack underflow"))?;
        builder.render(&mut session.state.blocks, false);
        Ok((class, builder.width))
    }

    fn parent_block<'s>(
        &self,
        session: &'s mut ExportSession<'_, UvmState>,
    ) -> ExportResult<&'s mut BlockBuilder> {
        if session.state.stack.is_empty() {
            return Err(session.fatal("no enclosing block"));
        }
        let last = session.state.stack.len() - 1;
        Ok(&mut session.state.stack[last])
    }
}

impl Emitter for UvmEmitter {
    type State = UvmState;

    fn walk_options(&self) -> WalkOptions {
        WalkOptions::new().skip_not_present(self.options.skip_not_present)
    }

    fn begin(
        &self,
        top: &NodeRef<'_>,
        session: &mut ExportSession<'_, Self::State>,
    ) -> ExportResult<()> {
        let class = session
            .state
            .class_name(&sv_ident(top.inst_name()), "reg_model");
        session.state.stack.push(BlockBuilder::new(class));
        Ok(())
    }

    fn on_address_block(
        &self,
        node: &NodeRef<'_>,
        session: &mut ExportSession<'_, Self::State>,
    ) -> ExportResult<()> {
        session.reset_bus_width();
        session.info(format!("uvm: address block {}", node.path));
        let name = sv_ident(node.inst_name());
        let offsets = [node.absolute_address];
        if node.kind() == NodeKind::Mem {
            let class = self.memory_class(node, session);
            let width = node.node.memwidth().unwrap_or(32);
            let rights = mem_rights(node);
            let root = self.parent_block(session)?;
            root.instantiate(Member::Mem, &name, &class, None, &offsets, rights);
            root.observe_width(width);
            return Ok(());
        }
        let (class, _) = self.block_class(node, session)?;
        let width = session.bus_width();
        let root = self.parent_block(session)?;
        root.instantiate(Member::Block, &name, &class, None, &offsets, "RW");
        if let Some(width) = width {
            root.observe_width(width);
        }
        Ok(())
    }

    fn on_register_file(
        &self,
        node: &NodeRef<'_>,
        _parent: &NodeRef<'_>,
        session: &mut ExportSession<'_, Self::State>,
    ) -> ExportResult<()> {
        let (class, width) = self.block_class(node, session)?;
        let offsets = element_addresses(0, node.node);
        let parent = self.parent_block(session)?;
        parent.instantiate(
            Member::Block,
            &sv_ident(node.inst_name()),
            &class,
            node.node.array.as_ref(),
            &offsets,
            "RW",
        );
        if let Some(width) = width {
            parent.observe_width(width);
        }
        Ok(())
    }

    fn on_register(
        &self,
        node: &NodeRef<'_>,
        _parent: &NodeRef<'_>,
        session: &mut ExportSession<'_, Self::State>,
    ) -> ExportResult<()> {
        super::check_register_array(node, session)?;
        let class = session.state.class_name(&path_ident(node), "reg");
        let field_count = fields(node, self.walk_options()).count();
        session.state.reg = Some(RegBuilder {
            class: class.clone(),
            width: node.node.regwidth(),
            single_field: field_count == 1,
            ..Default::default()
        });
        visit_fields(self, node, session)?;
        let reg = session
            .state
            .reg
            .take()
            .ok_or_else(|| session.fatal(format!("{}: register state lost", node.path)))?;
        reg.render(&mut session.state.regs);

        let width = node.node.regwidth().max(node.node.accesswidth());
        session.observe_bus_width(width);
        let offsets = element_addresses(0, node.node);
        let parent = self.parent_block(session)?;
        parent.instantiate(
            Member::Reg,
            &sv_ident(node.inst_name()),
            &class,
            node.node.array.as_ref(),
            &offsets,
            reg.rights(),
        );
        parent.observe_width(width);
        Ok(())
    }

    fn on_memory(
        &self,
        node: &NodeRef<'_>,
        _parent: &NodeRef<'_>,
        session: &mut ExportSession<'_, Self::State>,
    ) -> ExportResult<()> {
        let class = self.memory_class(node, session);
        let offsets = element_addresses(0, node.node);
        let rights = mem_rights(node);
        let parent = self.parent_block(session)?;
        parent.instantiate(
            Member::Mem,
            &sv_ident(node.inst_name()),
            &class,
            node.node.array.as_ref(),
            &offsets,
            rights,
        );
        Ok(())
    }

    fn on_field(
        &self,
        field: &Field,
        access: AccessCode,
        parent: &NodeRef<'_>,
        session: &mut ExportSession<'_, Self::State>,
    ) -> ExportResult<()> {
        let Some(reg) = session.state.reg.as_mut() else {
            return Err(session.fatal(format!("{}: field outside a register", parent.path)));
        };
        let name = sv_ident(&field.inst_name);
        reg.readable |= field.is_sw_readable();
        reg.writable |= field.is_sw_writable();
        reg.declarations.push(format!("rand uvm_reg_field {name};"));
        reg.build.push(format!(
            "this.{name} = uvm_reg_field::type_id::create(\"{name}\", null, get_full_name());"
        ));
        reg.build.push(format!(
            "this.{name}.configure(this, {}, {}, \"{access}\", {}, {}, {}, {}, {});",
            field.width(),
            field.low(),
            u8::from(field.is_volatile()),
            sv_hex(field.reset().unwrap_or(0)),
            u8::from(field.reset().is_some()),
            u8::from(field.is_sw_writable()),
            u8::from(reg.single_field),
        ));
        Ok(())
    }

    fn finish(&self, session: &mut ExportSession<'_, Self::State>) -> ExportResult<Artifact> {
        let top = session.cx().top;
        let package = self.package_name(&top.inst_name);
        let root = session
            .state
            .stack
            .pop()
            .ok_or_else(|| session.fatal("top model missing"))?;
        let state = &session.state;

        let mut output = String::new();
        let _ = writeln!(output, "// UVM register model for '{}'", top.inst_name);
        let _ = writeln!(output, "package {package};");
        let _ = writeln!(output, "{INDENT}import uvm_pkg::*;");
        let _ = writeln!(output, "{INDENT}`include \"uvm_macros.svh\"");
        let _ = writeln!(output);
        output.push_str(&state.regs);
        output.push_str(&state.mems);
        output.push_str(&state.blocks);
        root.render(&mut output, true);
        let _ = writeln!(output, "endpackage");
        Ok(Artifact::text(output))
    }
}
