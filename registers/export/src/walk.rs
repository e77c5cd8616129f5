// Licensed under the Apache-2.0 license

//! Depth-first traversal and the emitter contract.
//!
//! [`export`] validates the top node, decides whether it explodes into
//! several address blocks, and hands each block to the emitter. From there
//! the emitter drives the walk itself: its handlers call
//! [`visit_children`] and [`visit_fields`], which dispatch each child to the
//! handler for its kind. Work done before that call is pre-order, work done
//! after it sees every descendant (the IP-XACT block width, for instance).

use crate::access::{self, AccessCode};
use crate::array::element_address;
use crate::config::WalkOptions;
use crate::diag::{MessageSink, Severity};
use crate::error::{ExportError, ExportResult};
use crate::explode::{self, Explosion};
use crate::model::{Field, Node, NodeKind};
use crate::output::{self, Artifact};
use crate::session::ExportSession;
use std::path::{Path, PathBuf};

/// A node as seen during a walk: the model node plus its resolved address,
/// and the element index when an array was unrolled.
#[derive(Clone, Debug)]
pub struct NodeRef<'a> {
    pub node: &'a Node,
    pub absolute_address: u64,
    /// Address of the structural parent.
    pub parent_address: u64,
    /// Index of this element when its array was unrolled.
    pub current_index: Option<Vec<u64>>,
    /// Dotted instance path from the top node.
    pub path: String,
}

impl<'a> NodeRef<'a> {
    /// The top node, placed at its own offset.
    pub fn top(node: &'a Node) -> Self {
        Self {
            node,
            absolute_address: node.offset,
            parent_address: 0,
            current_index: None,
            path: node.inst_name.clone(),
        }
    }

    fn child(&self, node: &'a Node, index: Option<(u64, Vec<u64>)>) -> Self {
        match index {
            Some((linear, current)) => {
                let stride = node.array.as_ref().map_or(0, |a| a.stride);
                let suffix: String = current.iter().map(|i| format!("[{i}]")).collect();
                Self {
                    node,
                    absolute_address: element_address(
                        self.absolute_address,
                        node.offset,
                        stride,
                        linear,
                    ),
                    parent_address: self.absolute_address,
                    current_index: Some(current),
                    path: format!("{}.{}{suffix}", self.path, node.inst_name),
                }
            }
            None => Self {
                node,
                absolute_address: self.absolute_address + node.offset,
                parent_address: self.absolute_address,
                current_index: None,
                path: format!("{}.{}", self.path, node.inst_name),
            },
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.node.kind
    }

    pub fn inst_name(&self) -> &'a str {
        &self.node.inst_name
    }

    /// Instance name with the element index appended, `entry_2` or
    /// `grid_1_0`.
    pub fn ident(&self) -> String {
        match &self.current_index {
            Some(index) => {
                let mut ident = self.node.inst_name.clone();
                for i in index {
                    ident.push_str(&format!("_{i}"));
                }
                ident
            }
            None => self.node.inst_name.clone(),
        }
    }

    /// Offset from the parent's address. For an unrolled element this
    /// includes the element's stride multiple.
    pub fn address_offset(&self) -> u64 {
        self.absolute_address - self.parent_address
    }

    pub fn is_array(&self) -> bool {
        self.node.is_array()
    }

    pub fn size(&self) -> u64 {
        self.node.size()
    }
}

/// Enumerate the children of `parent` in declaration order.
pub fn children<'a>(parent: &NodeRef<'a>, options: WalkOptions) -> Vec<NodeRef<'a>> {
    let node: &'a Node = parent.node;
    let mut out = Vec::with_capacity(node.children.len());
    for child in &node.children {
        if options.skip_not_present && !child.is_present() {
            continue;
        }
        match &child.array {
            Some(array) if options.unroll => {
                for (linear, index) in array.indices().enumerate() {
                    out.push(parent.child(child, Some((linear as u64, index))));
                }
            }
            _ => out.push(parent.child(child, None)),
        }
    }
    out
}

/// Enumerate the fields of a register.
pub fn fields<'a>(reg: &NodeRef<'a>, options: WalkOptions) -> impl Iterator<Item = &'a Field> {
    let node: &'a Node = reg.node;
    node.fields
        .iter()
        .filter(move |f| !options.skip_not_present || f.is_present())
}

/// Per-call facts shared by every handler.
#[derive(Clone, Copy, Debug)]
pub struct ExportContext<'a> {
    pub top: &'a Node,
    pub destination: &'a Path,
    pub explosion: Explosion,
}

/// What an export call produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportReport {
    pub explosion: Explosion,
    pub warnings: usize,
    /// Files written, in path order.
    pub files: Vec<PathBuf>,
}

/// One output format.
///
/// Handlers take `&self`: everything mutable lives in the session's
/// [`Emitter::State`]. Container handlers recurse by calling
/// [`visit_children`]; register handlers call [`visit_fields`].
pub trait Emitter {
    type State: Default;

    fn walk_options(&self) -> WalkOptions;

    /// Whether the top node may be split into several address blocks.
    fn explodes(&self) -> bool {
        true
    }

    /// Called once, before the first address block.
    fn begin(
        &self,
        _top: &NodeRef<'_>,
        _session: &mut ExportSession<'_, Self::State>,
    ) -> ExportResult<()> {
        Ok(())
    }

    /// One output unit: the top node, or one of its children when exploded.
    fn on_address_block(
        &self,
        node: &NodeRef<'_>,
        session: &mut ExportSession<'_, Self::State>,
    ) -> ExportResult<()>;

    /// A register file, or an address map nested below an address block.
    fn on_register_file(
        &self,
        node: &NodeRef<'_>,
        parent: &NodeRef<'_>,
        session: &mut ExportSession<'_, Self::State>,
    ) -> ExportResult<()>;

    fn on_register(
        &self,
        node: &NodeRef<'_>,
        parent: &NodeRef<'_>,
        session: &mut ExportSession<'_, Self::State>,
    ) -> ExportResult<()>;

    fn on_memory(
        &self,
        node: &NodeRef<'_>,
        parent: &NodeRef<'_>,
        session: &mut ExportSession<'_, Self::State>,
    ) -> ExportResult<()>;

    fn on_field(
        &self,
        field: &Field,
        access: AccessCode,
        parent: &NodeRef<'_>,
        session: &mut ExportSession<'_, Self::State>,
    ) -> ExportResult<()>;

    /// Turn the accumulated state into the artifact to write.
    fn finish(&self, session: &mut ExportSession<'_, Self::State>) -> ExportResult<Artifact>;
}

/// Dispatch every child of `node` to the handler for its kind.
pub fn visit_children<E: Emitter + ?Sized>(
    emitter: &E,
    node: &NodeRef<'_>,
    session: &mut ExportSession<'_, E::State>,
) -> ExportResult<()> {
    for child in children(node, emitter.walk_options()) {
        match child.kind() {
            NodeKind::Addrmap | NodeKind::Regfile => {
                emitter.on_register_file(&child, node, session)?
            }
            NodeKind::Reg => emitter.on_register(&child, node, session)?,
            NodeKind::Mem => emitter.on_memory(&child, node, session)?,
        }
    }
    Ok(())
}

/// Hand every field of `reg` to [`Emitter::on_field`] with its access code.
pub fn visit_fields<E: Emitter + ?Sized>(
    emitter: &E,
    reg: &NodeRef<'_>,
    session: &mut ExportSession<'_, E::State>,
) -> ExportResult<()> {
    for field in fields(reg, emitter.walk_options()) {
        let access = access::field_access(field);
        emitter.on_field(field, access, reg, session)?;
    }
    Ok(())
}

/// Export `top` with `emitter` to `destination`.
///
/// Fails before traversal when `top` is not an address map or memory, or
/// does not validate. Any error is reported to `sink` at fatal severity
/// before it is returned, and nothing is written in that case.
pub fn export<E: Emitter>(
    emitter: &E,
    top: &Node,
    destination: &Path,
    sink: &dyn MessageSink,
) -> ExportResult<ExportReport> {
    let result = run(emitter, top, destination, sink);
    if let Err(err) = &result {
        sink.emit(Severity::Fatal, &err.to_string());
    }
    result
}

fn run<E: Emitter>(
    emitter: &E,
    top: &Node,
    destination: &Path,
    sink: &dyn MessageSink,
) -> ExportResult<ExportReport> {
    if !matches!(top.kind, NodeKind::Addrmap | NodeKind::Mem) {
        return Err(ExportError::InvalidArgument(format!(
            "'{}' is a {} node; exports start from an addrmap or mem",
            top.inst_name, top.kind
        )));
    }
    top.validate()?;

    let explosion = if emitter.explodes() {
        explode::decide(top)
    } else {
        Explosion::Wrap
    };
    let cx = ExportContext {
        top,
        destination,
        explosion,
    };
    let mut session: ExportSession<'_, E::State> = ExportSession::new(cx, sink);
    session.debug(format!(
        "exporting '{}' to {} ({explosion:?})",
        top.inst_name,
        destination.display()
    ));

    let top_ref = NodeRef::top(top);
    emitter.begin(&top_ref, &mut session)?;
    match explosion {
        Explosion::Explode => {
            for child in children(&top_ref, emitter.walk_options()) {
                emitter.on_address_block(&child, &mut session)?;
            }
        }
        Explosion::Wrap => emitter.on_address_block(&top_ref, &mut session)?,
    }
    let artifact = emitter.finish(&mut session)?;
    let files = output::write_artifact(destination, &artifact)?;
    session.debug(format!("wrote {} file(s)", files.len()));

    Ok(ExportReport {
        explosion,
        warnings: session.warnings(),
        files,
    })
}
