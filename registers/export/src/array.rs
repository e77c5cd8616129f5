// Licensed under the Apache-2.0 license

//! Address resolution for arrayed nodes.
//!
//! Element `i` (row-major linear index) of an array instance lives at
//! `parent + offset + i * stride`. Registers additionally require a stride
//! equal to their byte size, because several output formats can only
//! describe contiguous register arrays.

use crate::model::{ArrayDims, Node};

impl ArrayDims {
    /// Total number of elements.
    pub fn count(&self) -> u64 {
        self.checked_count().unwrap_or(u64::MAX)
    }

    /// Total number of elements, or `None` if it does not fit a `u64`.
    pub fn checked_count(&self) -> Option<u64> {
        self.dimensions
            .iter()
            .try_fold(1u64, |count, dim| count.checked_mul(*dim))
    }

    /// Per-dimension index of the element at `linear` (row-major).
    pub fn unravel(&self, mut linear: u64) -> Vec<u64> {
        let mut index = vec![0; self.dimensions.len()];
        for (slot, dim) in index.iter_mut().zip(&self.dimensions).rev() {
            *slot = linear % dim;
            linear /= dim;
        }
        index
    }

    /// All element indices in linear order.
    pub fn indices(&self) -> impl Iterator<Item = Vec<u64>> + '_ {
        (0..self.count()).map(|i| self.unravel(i))
    }
}

/// Absolute address of element `linear_index` of an instance placed at
/// `raw_offset` inside a parent at `parent_address`.
pub fn element_address(parent_address: u64, raw_offset: u64, stride: u64, linear_index: u64) -> u64 {
    parent_address + raw_offset + linear_index * stride
}

/// Absolute addresses of every element of `node` (a single address for a
/// non-arrayed node).
pub fn element_addresses(parent_address: u64, node: &Node) -> Vec<u64> {
    match &node.array {
        Some(array) => (0..array.count())
            .map(|i| element_address(parent_address, node.offset, array.stride, i))
            .collect(),
        None => vec![parent_address + node.offset],
    }
}

/// Address span reported for a node: the stride for arrayed nodes, since
/// it includes any padding between elements, otherwise the node size.
pub fn range_size(node: &Node) -> u64 {
    match &node.array {
        Some(array) => array.stride,
        None => node.size(),
    }
}

/// Outcome of checking a register array's stride against its size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrideCheck {
    /// Not an array, or elements are packed back to back.
    Contiguous,
    /// Gaps between elements.
    Sparse { stride: u64, size: u64 },
    /// Elements overlap each other.
    Overlapping { stride: u64, size: u64 },
}

/// Compare a register array's stride with the register's byte size.
pub fn check_register_stride(node: &Node) -> StrideCheck {
    let Some(array) = &node.array else {
        return StrideCheck::Contiguous;
    };
    let size = u64::from(node.regwidth()) / 8;
    match array.stride.cmp(&size) {
        std::cmp::Ordering::Equal => StrideCheck::Contiguous,
        std::cmp::Ordering::Greater => StrideCheck::Sparse {
            stride: array.stride,
            size,
        },
        std::cmp::Ordering::Less => StrideCheck::Overlapping {
            stride: array.stride,
            size,
        },
    }
}
