//! Usage chain maintenance and liveness queries.
//!
//! Every SSA value's facts carry a singly-linked chain with one entry per
//! read operand occurrence in the instruction stream, plus two monotonic
//! flags for values that must stay live across deoptimization or exception
//! handler boundaries. Optimization passes mutate the graph through these
//! operations and query them to decide what can be eliminated.


use crate::facts::{EntryId, UsageChainEntry};
use crate::graph::InsId;
use crate::{Operand, SpeshGraph};
use generational_arena::Arena;

/// An internal-consistency violation of the def-use bookkeeping. Always a
/// bug in an optimization pass, never a user-facing condition: the current
/// specialization attempt must be discarded, not published. Every variant
/// carries the offending instruction and value identity plus a full textual
/// dump of the graph for postmortem analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefUseCorruption {
    /// A usage deletion found no chain entry for the instruction: either a
    /// deletion with no matching registration, or a double-deletion.
    MissingChainEntry {
        opcode: &'static str,
        value: Operand,
        dump: String,
    },
    /// A read operand occurrence with no matching chain entry.
    MissingUse {
        opcode: &'static str,
        value: Operand,
        block: u32,
        dump: String,
    },
    /// A write operand whose recorded writer is a different instruction.
    WrongWriter {
        opcode: &'static str,
        value: Operand,
        block: u32,
        dump: String,
    },
}

impl std::fmt::Display for DefUseCorruption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingChainEntry {
                opcode,
                value,
                dump,
            } => write!(
                f,
                "instruction {opcode} missing from define-use chain of {value}\n{dump}"
            ),
            Self::MissingUse {
                opcode,
                value,
                block,
                dump,
            } => write!(
                f,
                "malformed DU chain: reader {opcode} of {value} in BB{block} missing\n{dump}"
            ),
            Self::WrongWriter {
                opcode,
                value,
                block,
                dump,
            } => write!(
                f,
                "malformed DU chain: writer {opcode} of {value} in BB{block} is incorrect\n{dump}"
            ),
        }
    }
}

impl std::error::Error for DefUseCorruption {}

impl SpeshGraph {
    /// Adds a usage of `value` by `user`. One call per operand slot
    /// occurrence: registering the same instruction twice creates two
    /// distinct entries.
    pub fn add_usage(&mut self, value: Operand, user: InsId) {
        let head = self.facts(value).usage.users;
        let entry = EntryId(self.entries.insert(UsageChainEntry { user, next: head }));
        self.facts_mut(value).usage.users = Some(entry);
    }

    /// Deletes one usage of `value` by `user`: the first matching chain
    /// entry is unlinked (the arena reclaims it with the graph). Exactly one
    /// entry is removed per call, mirroring one registration per call.
    ///
    /// A deletion with no matching entry means the bookkeeping was violated
    /// by a pass; the attempt cannot continue and the returned
    /// [`DefUseCorruption`] carries the full graph dump.
    pub fn delete_usage(&mut self, value: Operand, user: InsId) -> Result<(), DefUseCorruption> {
        let mut prev: Option<EntryId> = None;
        let mut current = self.facts(value).usage.users;
        while let Some(id) = current {
            let UsageChainEntry { user: u, next } = self.entries[id.0];
            if u == user {
                match prev {
                    Some(p) => self.entries[p.0].next = next,
                    None => self.facts_mut(value).usage.users = next,
                }
                return Ok(());
            }
            prev = current;
            current = next;
        }
        Err(DefUseCorruption::MissingChainEntry {
            opcode: self[user].opcode.name(),
            value,
            dump: self.to_string(),
        })
    }

    /// Marks `value` as required across a deoptimization boundary.
    /// Idempotent; there is no unmark (the flag is monotonic within one
    /// specialization attempt).
    pub fn add_deopt_usage(&mut self, value: Operand) {
        self.facts_mut(value).usage.deopt_required = true;
    }

    /// Marks `value` as required for exception handling. Idempotent, no
    /// unmark.
    pub fn add_handler_usage(&mut self, value: Operand) {
        self.facts_mut(value).usage.handler_required = true;
    }

    /// Iterates over the instructions using `value`, one item per operand
    /// slot occurrence, most recently registered first.
    pub fn users(&self, value: Operand) -> Users<'_> {
        Users {
            entries: &self.entries,
            current: self.facts(value).usage.users,
        }
    }

    /// Whether `value` is used: by an instruction, for deopt, or for
    /// exception handling.
    pub fn is_used(&self, value: Operand) -> bool {
        let usage = &self.facts(value).usage;
        usage.deopt_required || usage.handler_required || usage.users.is_some()
    }

    pub fn is_used_by_deopt(&self, value: Operand) -> bool {
        self.facts(value).usage.deopt_required
    }

    pub fn is_used_by_handler(&self, value: Operand) -> bool {
        self.facts(value).usage.handler_required
    }

    /// Whether there is precisely one known user of `value`. A deopt or
    /// handler requirement counts as a hidden extra consumer, so a flagged
    /// value is never considered single-user regardless of its chain length.
    pub fn used_once(&self, value: Operand) -> bool {
        let usage = &self.facts(value).usage;
        if usage.deopt_required || usage.handler_required {
            return false;
        }
        match usage.users {
            Some(head) => self.entries[head.0].next.is_none(),
            None => false,
        }
    }

    /// The number of chain entries for `value`, excluding any deopt or
    /// handler requirement.
    pub fn use_count(&self, value: Operand) -> usize {
        self.users(value).count()
    }
}

#[derive(Debug)]
pub struct Users<'a> {
    entries: &'a Arena<UsageChainEntry>,
    current: Option<EntryId>,
}

impl Iterator for Users<'_> {
    type Item = InsId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.take()?;
        let entry = self.entries[current.0];
        self.current = entry.next;
        Some(entry.user)
    }
}
