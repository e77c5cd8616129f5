// Licensed under the Apache-2.0 license

//! Field access-mode inference.
//!
//! Maps a field's software side effects and hardware capabilities to one
//! canonical [`AccessCode`]. The computation is a pure function of a single
//! field; nothing is carried from one field to the next.

use crate::model::{Field, OnReadType, OnWriteType};
use strum_macros::{Display, EnumString};

/// Canonical software access behavior of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum AccessCode {
    Ro,
    Rw,
    Wo,
    Rc,
    Wrc,
    W1src,
    Rs,
    Wrs,
    W1crs,
    W1c,
    W1s,
}

/// Software side effects of a field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AccessFlags {
    pub read_clears: bool,
    pub read_sets: bool,
    pub write_one_clears: bool,
    pub write_one_sets: bool,
}

impl AccessFlags {
    /// Derive the side-effect flags from a field's `onread`/`onwrite`.
    pub fn of(field: &Field) -> Self {
        Self {
            read_clears: field.onread() == Some(OnReadType::Rclr),
            read_sets: field.onread() == Some(OnReadType::Rset),
            write_one_clears: field.onwrite() == Some(OnWriteType::Woclr),
            write_one_sets: field.onwrite() == Some(OnWriteType::Woset),
        }
    }
}

/// Resolve the access code from side-effect flags and hardware capability.
///
/// The first matching branch wins: read-clear, then read-set, then the
/// write-one and plain modes.
pub fn infer(flags: AccessFlags, hw_writable: bool, hw_readable: bool) -> AccessCode {
    if flags.read_clears {
        if flags.write_one_sets {
            AccessCode::W1src
        } else if hw_writable {
            AccessCode::Wrc
        } else {
            AccessCode::Rc
        }
    } else if flags.read_sets {
        if flags.write_one_clears {
            AccessCode::W1crs
        } else if hw_writable {
            AccessCode::Wrs
        } else {
            AccessCode::Rs
        }
    } else if flags.write_one_clears {
        AccessCode::W1c
    } else if flags.write_one_sets {
        AccessCode::W1s
    } else if hw_writable && hw_readable {
        AccessCode::Rw
    } else if hw_writable {
        AccessCode::Wo
    } else {
        AccessCode::Ro
    }
}

/// Access code of `field`.
pub fn field_access(field: &Field) -> AccessCode {
    infer(
        AccessFlags::of(field),
        field.is_hw_writable(),
        field.is_hw_readable(),
    )
}
