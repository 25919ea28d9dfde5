mod facts;
mod instruction;
mod operand;

pub mod graph;
pub mod usages;
pub mod validator;

pub use facts::{EntryId, Facts, FactsTable, Usage, UsageChainEntry};
pub use graph::{BasicBlock, BlockId, GraphError, InsId, SpeshGraph};
pub use instruction::{ins, Instruction, Opcode, OperandKind};
pub use operand::Operand;
pub use usages::{DefUseCorruption, Users};
pub use validator::check_du_chains;
