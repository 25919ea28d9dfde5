use crate::graph::InsId;
use crate::Operand;
use generational_arena::Index as ArenaIndex;

/// Handle to a [`UsageChainEntry`] in the graph's chain arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(pub(crate) ArenaIndex);

/// One link of a value's usage chain. Owned by the chain it belongs to;
/// unlinking an entry never frees it individually, the arena reclaims all
/// entries when the graph is torn down.
#[derive(Debug, Clone, Copy)]
pub struct UsageChainEntry {
    pub(crate) user: InsId,
    pub(crate) next: Option<EntryId>,
}

/// Usage bookkeeping of a single SSA value.
///
/// `deopt_required` and `handler_required` are monotonic within one
/// specialization attempt: passes only ever discover such requirements, they
/// never invalidate them, so there is no way to clear the flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct Usage {
    pub(crate) users: Option<EntryId>,
    pub(crate) deopt_required: bool,
    pub(crate) handler_required: bool,
}

/// Per-SSA-value metadata: the single writer and the usage bookkeeping.
#[derive(Debug, Clone, Copy, Default)]
pub struct Facts {
    pub(crate) writer: Option<InsId>,
    pub(crate) usage: Usage,
}

impl Facts {
    /// The instruction that defines this value. `None` only for values no
    /// instruction has been recorded for yet.
    pub fn writer(&self) -> Option<InsId> {
        self.writer
    }
}

/// Facts storage for the whole value namespace, indexed by [`Operand`]:
/// one row per register-set slot, one entry per SSA version of it.
#[derive(Debug, Default)]
pub struct FactsTable {
    table: Vec<Vec<Facts>>,
}

impl FactsTable {
    pub fn get(&self, value: Operand) -> Option<&Facts> {
        self.table
            .get(value.reg as usize)?
            .get(value.version as usize)
    }

    pub(crate) fn get_mut(&mut self, value: Operand) -> Option<&mut Facts> {
        self.table
            .get_mut(value.reg as usize)?
            .get_mut(value.version as usize)
    }

    /// Grows the table so `value` is addressable and returns its facts.
    pub(crate) fn ensure(&mut self, value: Operand) -> &mut Facts {
        let reg = value.reg as usize;
        let version = value.version as usize;
        if self.table.len() <= reg {
            self.table.resize_with(reg + 1, Vec::new);
        }
        let row = &mut self.table[reg];
        if row.len() <= version {
            row.resize_with(version + 1, Facts::default);
        }
        &mut row[version]
    }
}

impl std::ops::Index<Operand> for FactsTable {
    type Output = Facts;

    fn index(&self, value: Operand) -> &Self::Output {
        match self.get(value) {
            Some(facts) => facts,
            None => panic!("no facts for unknown SSA value {value}"),
        }
    }
}
