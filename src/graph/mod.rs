//! Specialization graph

#[cfg(test)]
mod test;

use crate::facts::{FactsTable, UsageChainEntry};
use crate::usages::DefUseCorruption;
use crate::{Facts, Instruction, Operand, OperandKind};
use generational_arena::{Arena, Index as ArenaIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(ArenaIndex);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InsId(ArenaIndex);

/// A straight-line sequence of instructions, linked into the graph's linear
/// traversal order through `linear_next`.
#[derive(Debug)]
pub struct BasicBlock {
    idx: u32,
    instructions: Vec<InsId>,
    linear_next: Option<BlockId>,
}

impl BasicBlock {
    fn new(idx: u32) -> Self {
        Self {
            idx,
            instructions: Vec::new(),
            linear_next: None,
        }
    }

    /// Dense index of this block within the graph, used in dumps and
    /// diagnostics.
    pub fn idx(&self) -> u32 {
        self.idx
    }

    pub fn instructions(&self) -> &[InsId] {
        &self.instructions
    }

    pub fn linear_next(&self) -> Option<BlockId> {
        self.linear_next
    }
}

/// Errors detected while recording an instruction's def-use edges during
/// graph construction. Both are SSA violations on the caller's side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A write operand names a value that already has a writer.
    MultipleWriters {
        value: Operand,
        opcode: &'static str,
    },
    /// A read operand names a value no instruction has written.
    UseBeforeDef {
        value: Operand,
        opcode: &'static str,
    },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MultipleWriters { value, opcode } => {
                write!(f, "second writer {opcode} for SSA value {value}")
            }
            Self::UseBeforeDef { value, opcode } => {
                write!(f, "reader {opcode} of SSA value {value} with no writer")
            }
        }
    }
}

impl std::error::Error for GraphError {}

/// The graph of one specialization attempt: basic blocks in linear order,
/// the instruction arena, the facts table, and the usage chain arena. All
/// of it shares the graph's lifetime and is torn down together when the
/// attempt completes or is discarded.
///
/// One worker owns the graph exclusively while optimizing (`&mut self` for
/// every mutation). A published graph is shared immutably; none of the
/// mutating operations can be reached through a shared reference.
#[derive(Debug, Default)]
pub struct SpeshGraph {
    entry: Option<BlockId>,
    last: Option<BlockId>,
    blocks: Arena<BasicBlock>,
    ins: Arena<Instruction>,
    pub(crate) facts: FactsTable,
    pub(crate) entries: Arena<UsageChainEntry>,
    next_idx: u32,
}

impl SpeshGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an empty block to the end of the linear chain and returns its
    /// id. The first block added becomes the entry block.
    pub fn add_block(&mut self) -> BlockId {
        let idx = self.next_idx;
        self.next_idx += 1;
        let id = BlockId(self.blocks.insert(BasicBlock::new(idx)));
        match self.last {
            Some(last) => self.blocks[last.0].linear_next = Some(id),
            None => self.entry = Some(id),
        }
        self.last = Some(id);
        id
    }

    pub fn entry(&self) -> Option<BlockId> {
        self.entry
    }

    /// Iterates over the blocks in linear order, starting from the entry
    /// block.
    pub fn blocks_linear(&self) -> LinearBlocks<'_> {
        LinearBlocks {
            graph: self,
            current: self.entry,
        }
    }

    pub fn facts(&self, value: Operand) -> &Facts {
        &self.facts[value]
    }

    pub(crate) fn facts_mut(&mut self, value: Operand) -> &mut Facts {
        match self.facts.get_mut(value) {
            Some(facts) => facts,
            None => panic!("no facts for unknown SSA value {value}"),
        }
    }

    /// The instruction defining `value`, if one has been recorded.
    pub fn writer(&self, value: Operand) -> Option<InsId> {
        self.facts(value).writer()
    }

    /// Appends `instruction` to `block` and records its def-use edges:
    /// the writer fact for each write slot, one usage chain entry per read
    /// slot occurrence. Reads must name values that already have a writer,
    /// and a value may only ever gain one writer; the instruction is not
    /// added if either is violated.
    pub fn append_ins(
        &mut self,
        block: BlockId,
        instruction: Instruction,
    ) -> Result<InsId, GraphError> {
        let opcode = instruction.opcode.name();
        let slots: Vec<(Operand, OperandKind)> = (0..instruction.num_operands())
            .map(|i| (instruction.operands[i], instruction.operand_kind(i)))
            .collect();
        for &(value, kind) in &slots {
            let written = self.facts.get(value).and_then(Facts::writer);
            match kind {
                OperandKind::Read if written.is_none() => {
                    return Err(GraphError::UseBeforeDef { value, opcode })
                }
                OperandKind::Write if written.is_some() => {
                    return Err(GraphError::MultipleWriters { value, opcode })
                }
                _ => {}
            }
        }
        let id = InsId(self.ins.insert(instruction));
        for (value, kind) in slots {
            match kind {
                OperandKind::Write => self.facts.ensure(value).writer = Some(id),
                OperandKind::Read => self.add_usage(value, id),
            }
        }
        self.blocks[block.0].instructions.push(id);
        Ok(id)
    }

    /// Unlinks `ins` from `block` and deletes one usage per read operand
    /// occurrence. The writer facts of its write slots are left in place;
    /// whether the values it defined are now dead is the calling pass's
    /// decision. Panics if `ins` is not in `block`.
    pub fn delete_ins(&mut self, block: BlockId, ins: InsId) -> Result<(), DefUseCorruption> {
        let pos = self.blocks[block.0]
            .instructions
            .iter()
            .position(|&id| id == ins);
        match pos {
            Some(pos) => self.blocks[block.0].instructions.remove(pos),
            None => panic!("instruction not in block BB{}", self.blocks[block.0].idx),
        };
        let reads: Vec<Operand> = self[ins].reads().collect();
        for value in reads {
            self.delete_usage(value, ins)?;
        }
        Ok(())
    }
}

impl std::ops::Index<BlockId> for SpeshGraph {
    type Output = BasicBlock;

    fn index(&self, index: BlockId) -> &Self::Output {
        &self.blocks[index.0]
    }
}

impl std::ops::Index<InsId> for SpeshGraph {
    type Output = Instruction;

    fn index(&self, index: InsId) -> &Self::Output {
        &self.ins[index.0]
    }
}

impl std::fmt::Display for SpeshGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (_, block) in self.blocks_linear() {
            writeln!(f, "BB{}:", block.idx)?;
            for &ins_id in &block.instructions {
                writeln!(f, "\t{}", self[ins_id])?;
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct LinearBlocks<'a> {
    graph: &'a SpeshGraph,
    current: Option<BlockId>,
}

impl<'a> Iterator for LinearBlocks<'a> {
    type Item = (BlockId, &'a BasicBlock);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.take()?;
        let block = &self.graph[current];
        self.current = block.linear_next;
        Some((current, block))
    }
}
