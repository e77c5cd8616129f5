// Licensed under the Apache-2.0 license

//! The concrete output formats.

pub mod header;
pub mod html;
pub mod ipxact;
pub mod uvm;

pub use header::HeaderEmitter;
pub use html::HtmlEmitter;
pub use ipxact::IpxactEmitter;
pub use uvm::UvmEmitter;

use crate::array::{check_register_stride, StrideCheck};
use crate::error::{ExportError, ExportResult};
use crate::session::ExportSession;
use crate::walk::NodeRef;

/// Check a register array's stride. Overlapping elements make every
/// address after the first ambiguous and abort the export; gaps are noted
/// and returned for the caller to handle.
pub(crate) fn check_register_array<S>(
    node: &NodeRef<'_>,
    session: &ExportSession<'_, S>,
) -> ExportResult<StrideCheck> {
    let check = check_register_stride(node.node);
    let first_element = node
        .current_index
        .as_ref()
        .map_or(true, |index| index.iter().all(|i| *i == 0));
    match check {
        StrideCheck::Overlapping { stride, size } => {
            session.debug(format!("{}: stride {stride} < size {size}", node.path));
            return Err(ExportError::StructuralIncompatibility(format!(
                "register array '{}' has stride {stride}, smaller than its {size}-byte size",
                node.path
            )));
        }
        // Once per array, not per unrolled element.
        StrideCheck::Sparse { stride, size } if first_element => {
            session.info(format!(
                "{}: stride {stride} leaves gaps after each {size}-byte register",
                node.path
            ));
        }
        _ => {}
    }
    Ok(check)
}
