use crate::Operand;
use arrayvec::ArrayVec;

/// Convenience constructors for [`Instruction`]s.
pub mod ins {
    use super::*;

    pub fn nop() -> Instruction {
        Instruction::new(Opcode::Nop, Vec::new())
    }

    /// Load a literal into the first operand.
    pub fn constant(dst: Operand, value: i64) -> Instruction {
        let mut ins = Instruction::new(Opcode::Const, vec![dst]);
        ins.imm = Some(value);
        ins
    }

    /// Copy the value of the second operand into the first.
    pub fn set(dst: Operand, src: Operand) -> Instruction {
        Instruction::new(Opcode::Set, vec![dst, src])
    }

    /// Add the values in the second and third operand, and store the result
    /// in the first operand.
    pub fn add(dst: Operand, lhs: Operand, rhs: Operand) -> Instruction {
        Instruction::new(Opcode::Add, vec![dst, lhs, rhs])
    }

    /// Multiply the values in the second and third operand, and store the
    /// result in the first operand.
    pub fn mul(dst: Operand, lhs: Operand, rhs: Operand) -> Instruction {
        Instruction::new(Opcode::Mul, vec![dst, lhs, rhs])
    }

    /// Check a specialization assumption against the value in the first
    /// operand, deoptimizing if it no longer holds.
    pub fn guard(value: Operand) -> Instruction {
        Instruction::new(Opcode::Guard, vec![value])
    }

    pub fn ret(value: Operand) -> Instruction {
        Instruction::new(Opcode::Return, vec![value])
    }

    /// Merge one value per incoming control-flow edge into the first operand.
    pub fn phi(dst: Operand, inputs: Vec<Operand>) -> Instruction {
        let mut operands = Vec::with_capacity(1 + inputs.len());
        operands.push(dst);
        operands.extend(inputs);
        Instruction::new(Opcode::Phi, operands)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Nop,
    Const,
    Set,
    Add,
    Mul,
    Guard,
    Return,
    Phi,
}

/// Classification of a single operand slot of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    Read,
    Write,
}

impl Opcode {
    pub fn name(self) -> &'static str {
        match self {
            Self::Nop => "nop",
            Self::Const => "const",
            Self::Set => "set",
            Self::Add => "add",
            Self::Mul => "mul",
            Self::Guard => "guard",
            Self::Return => "return",
            Self::Phi => "phi",
        }
    }

    pub fn is_phi(self) -> bool {
        matches!(self, Self::Phi)
    }

    /// The per-slot classification for opcodes with a fixed operand shape.
    /// PHI is variadic and has no fixed descriptor; see
    /// [`Instruction::operand_kind`].
    fn fixed_operand_kinds(self) -> &'static [OperandKind] {
        use OperandKind::{Read, Write};
        match self {
            Self::Nop => &[],
            Self::Const => &[Write],
            Self::Set => &[Write, Read],
            Self::Add | Self::Mul => &[Write, Read, Read],
            Self::Guard | Self::Return => &[Read],
            Self::Phi => panic!("phi has no fixed operand descriptor"),
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operands: Vec<Operand>,
    /// Literal payload, only meaningful for `Const`.
    pub imm: Option<i64>,
}

impl Instruction {
    pub fn new(opcode: Opcode, operands: Vec<Operand>) -> Self {
        Self {
            opcode,
            operands,
            imm: None,
        }
    }

    pub fn num_operands(&self) -> usize {
        self.operands.len()
    }

    /// Classifies operand slot `i` as a read or a write. For PHI, slot 0 is
    /// the write and all remaining slots are one read per incoming edge; for
    /// every other opcode the classification comes from the opcode
    /// descriptor. Panics if `i` is not a valid slot of this instruction.
    pub fn operand_kind(&self, i: usize) -> OperandKind {
        if i >= self.operands.len() {
            panic!("operand slot {i} out of range for {}", self.opcode);
        }
        if self.opcode.is_phi() {
            match i {
                0 => OperandKind::Write,
                _ => OperandKind::Read,
            }
        } else {
            self.opcode.fixed_operand_kinds()[i]
        }
    }

    /// Iterates over every read operand occurrence, in slot order. A value
    /// read in two slots is yielded twice.
    pub fn reads(&self) -> impl Iterator<Item = Operand> + '_ {
        self.operands
            .iter()
            .enumerate()
            .filter(|&(i, _)| self.operand_kind(i) == OperandKind::Read)
            .map(|(_, &operand)| operand)
    }

    pub fn writes(&self) -> impl Iterator<Item = Operand> {
        let mut arr = ArrayVec::<Operand, 1>::new();
        for (i, &operand) in self.operands.iter().enumerate() {
            if self.operand_kind(i) == OperandKind::Write {
                arr.push(operand);
            }
        }
        arr.into_iter()
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.opcode)?;
        for (i, operand) in self.operands.iter().enumerate() {
            match i {
                0 => write!(f, "\t{operand}")?,
                _ => write!(f, ", {operand}")?,
            }
        }
        if let Some(imm) = self.imm {
            match self.operands.is_empty() {
                true => write!(f, "\t{imm}")?,
                false => write!(f, ", {imm}")?,
            }
        }
        Ok(())
    }
}
