// Licensed under the Apache-2.0 license

//! Register-map export engine.
//!
//! This crate turns an elaborated, address-resolved register map (as
//! produced by an external SystemRDL front-end) into downstream artifacts:
//! header constants, a UVM register model, an IP-XACT description and an
//! HTML documentation bundle.
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use registers_export::{export, diag::LogSink, emit::HeaderEmitter, model::Design};
//!
//! let design = Design::from_path(Path::new("chip.json")).unwrap();
//! let report = export(
//!     &HeaderEmitter::c(),
//!     design.top(),
//!     Path::new("out/chip.h"),
//!     &LogSink,
//! )
//! .unwrap();
//! println!("{} warnings", report.warnings);
//! ```
//!
//! ## Module Organization
//!
//! - [`model`]: The elaborated tree handed over by the front-end
//! - [`access`]: Field access-mode inference
//! - [`array`]: Array address resolution and stride checks
//! - [`explode`]: Top-level block splitting decision
//! - [`walk`]: Depth-first traversal and the [`Emitter`] contract
//! - [`session`]: Per-call mutable export state
//! - [`emit`]: The concrete emitters
//! - [`output`]: Artifact staging and writing
//! - [`config`]: Emitter options, loadable from TOML
//! - [`diag`]: Message severities and sinks
//! - [`util`]: Identifier and literal formatting helpers

pub mod access;
pub mod array;
pub mod config;
pub mod diag;
pub mod emit;
pub mod error;
pub mod explode;
pub mod model;
pub mod output;
pub mod session;
pub mod util;
pub mod walk;

pub use error::{ExportError, ModelError};
pub use walk::{export, Emitter, ExportContext, ExportReport};
