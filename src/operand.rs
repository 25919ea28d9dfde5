/// Identifies an SSA value by the register-set slot it originates from and
/// its SSA version within that slot. The pair is stable for the lifetime of
/// the graph, so it doubles as the handle into the facts table.
///
/// Two operand slots (even of the same instruction) may name the same SSA
/// value; each occurrence is tracked independently in the usage chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Operand {
    pub reg: u16,
    pub version: u16,
}

impl Operand {
    pub fn new(reg: u16, version: u16) -> Self {
        Self { reg, version }
    }
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r{}({})", self.reg, self.version)
    }
}
