//! Define-use chain validator.
//!
//! Re-derives the expected usage state from the instruction stream and
//! compares it against the recorded facts, exhaustively. Deliberately
//! expensive (every operand occurrence walks the referenced value's chain);
//! meant to run between passes in verification builds, never on a hot
//! optimization path.

#[cfg(test)]
mod test;

use crate::usages::DefUseCorruption;
use crate::{OperandKind, SpeshGraph};

/// Checks that the def-use chains of `graph` are well formed: every read
/// operand occurrence has a matching chain entry in the referenced value's
/// facts, and every write operand's recorded writer is the instruction
/// holding it. Returns the first divergence found, with the full graph dump
/// attached.
pub fn check_du_chains(graph: &SpeshGraph) -> Result<(), DefUseCorruption> {
    for (_, block) in graph.blocks_linear() {
        for &ins_id in block.instructions() {
            let ins = &graph[ins_id];
            for (i, &value) in ins.operands.iter().enumerate() {
                match ins.operand_kind(i) {
                    OperandKind::Read => {
                        if !graph.users(value).any(|user| user == ins_id) {
                            return Err(DefUseCorruption::MissingUse {
                                opcode: ins.opcode.name(),
                                value,
                                block: block.idx(),
                                dump: graph.to_string(),
                            });
                        }
                    }
                    OperandKind::Write => {
                        if graph.facts(value).writer() != Some(ins_id) {
                            return Err(DefUseCorruption::WrongWriter {
                                opcode: ins.opcode.name(),
                                value,
                                block: block.idx(),
                                dump: graph.to_string(),
                            });
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

impl SpeshGraph {
    /// Panics with the rendered [`DefUseCorruption`] if the def-use chains
    /// are malformed. Convenience for debug builds of embedders that want
    /// the original hard-stop behavior; [`check_du_chains`] is the
    /// non-panicking form.
    pub fn assert_du_chains(&self) {
        if let Err(corruption) = check_du_chains(self) {
            panic!("{corruption}");
        }
    }
}
