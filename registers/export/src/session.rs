// Licensed under the Apache-2.0 license

//! Per-call export state.
//!
//! An [`ExportSession`] is created by [`crate::export`] for exactly one call
//! and dropped when the call returns. Emitters keep everything they build in
//! the session's `state`, never on themselves, so one emitter value can be
//! reused for any number of exports.

use crate::diag::{MessageSink, Severity};
use crate::error::ExportError;
use crate::walk::ExportContext;

pub struct ExportSession<'s, S> {
    /// Emitter-owned buffers.
    pub state: S,
    cx: ExportContext<'s>,
    sink: &'s dyn MessageSink,
    warnings: usize,
    bus_width: Option<u32>,
    next_id: u64,
}

impl<'s, S: Default> ExportSession<'s, S> {
    pub fn new(cx: ExportContext<'s>, sink: &'s dyn MessageSink) -> Self {
        Self {
            state: S::default(),
            cx,
            sink,
            warnings: 0,
            bus_width: None,
            next_id: 0,
        }
    }
}

impl<'s, S> ExportSession<'s, S> {
    pub fn cx(&self) -> &ExportContext<'s> {
        &self.cx
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        self.sink.emit(Severity::Debug, message.as_ref());
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.sink.emit(Severity::Info, message.as_ref());
    }

    /// Report a warning; traversal continues.
    pub fn warn(&mut self, message: impl AsRef<str>) {
        self.warnings += 1;
        self.sink.emit(Severity::Warning, message.as_ref());
    }

    /// Build the error that aborts this export. It is reported to the sink
    /// by [`crate::export`] once it has unwound.
    pub fn fatal(&self, message: impl Into<String>) -> ExportError {
        ExportError::Fatal(message.into())
    }

    pub fn warnings(&self) -> usize {
        self.warnings
    }

    /// Forget the widths seen so far, at the start of a new address block.
    pub fn reset_bus_width(&mut self) {
        self.bus_width = None;
    }

    pub fn observe_bus_width(&mut self, width: u32) {
        self.bus_width = Some(self.bus_width.map_or(width, |w| w.max(width)));
    }

    /// Widest access observed since the last reset, if any.
    pub fn bus_width(&self) -> Option<u32> {
        self.bus_width
    }

    /// Next value of the per-call id counter, starting at zero.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
