// Licensed under the Apache-2.0 license

//! Top-level block splitting.
//!
//! An address map whose direct children are all non-arrayed address maps or
//! memories is split ("exploded") into one output unit per child. Anything
//! else is exported as one unit named after the top node.

use crate::model::{Node, NodeKind};

/// How the top node is turned into output units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Explosion {
    /// Each child becomes its own address block.
    Explode,
    /// The top node is the only address block.
    Wrap,
}

fn is_blockable(node: &Node) -> bool {
    matches!(node.kind, NodeKind::Addrmap | NodeKind::Mem) && !node.is_array()
}

/// Classify `top`. Memories are never exploded.
pub fn decide(top: &Node) -> Explosion {
    if top.kind != NodeKind::Addrmap {
        return Explosion::Wrap;
    }
    let (blockable, other) = top
        .children
        .iter()
        .fold((0usize, 0usize), |(b, o), child| {
            if is_blockable(child) {
                (b + 1, o)
            } else {
                (b, o + 1)
            }
        });
    if other == 0 && blockable >= 1 {
        Explosion::Explode
    } else {
        Explosion::Wrap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_only_explodes() {
        let top = Node::addrmap("soc")
            .child(Node::addrmap("uart").child(Node::reg("ctrl")))
            .child(Node::mem("sram", 16, 32).at(0x1000));
        assert_eq!(decide(&top), Explosion::Explode);
    }

    #[test]
    fn test_register_forces_wrap() {
        let top = Node::addrmap("soc")
            .child(Node::addrmap("uart"))
            .child(Node::reg("id").at(0x100));
        assert_eq!(decide(&top), Explosion::Wrap);
    }

    #[test]
    fn test_arrayed_block_forces_wrap() {
        let top = Node::addrmap("soc")
            .child(Node::addrmap("uart").array(&[2], 0x100))
            .child(Node::addrmap("spi").at(0x200));
        assert_eq!(decide(&top), Explosion::Wrap);
    }

    #[test]
    fn test_regfile_forces_wrap() {
        let top = Node::addrmap("soc").child(Node::regfile("rf"));
        assert_eq!(decide(&top), Explosion::Wrap);
    }

    #[test]
    fn test_empty_wraps() {
        assert_eq!(decide(&Node::addrmap("empty")), Explosion::Wrap);
    }

    #[test]
    fn test_memory_top_wraps() {
        assert_eq!(decide(&Node::mem("sram", 16, 32)), Explosion::Wrap);
    }
}
