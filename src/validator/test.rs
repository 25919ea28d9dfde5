use super::*;
use crate::graph::{BlockId, InsId};
use crate::{ins, Operand};

/// BB0 defines two versions of r0, BB1 merges them with a PHI, guards the
/// result, and returns it.
fn well_formed_graph() -> (SpeshGraph, BlockId, InsId) {
    let mut graph = SpeshGraph::new();
    let b0 = graph.add_block();
    let b1 = graph.add_block();
    let v0 = Operand::new(0, 0);
    let v1 = Operand::new(0, 1);
    let merged = Operand::new(0, 2);

    graph.append_ins(b0, ins::constant(v0, 1)).unwrap();
    graph.append_ins(b0, ins::constant(v1, 2)).unwrap();
    graph.append_ins(b1, ins::phi(merged, vec![v0, v1])).unwrap();
    let guard = graph.append_ins(b1, ins::guard(merged)).unwrap();
    graph.append_ins(b1, ins::ret(merged)).unwrap();
    (graph, b1, guard)
}

#[test]
fn well_formed_graph_passes() {
    let (graph, _, _) = well_formed_graph();
    assert!(check_du_chains(&graph).is_ok());
    graph.assert_du_chains();
}

#[test]
fn stays_well_formed_across_instruction_deletion() {
    let (mut graph, b1, guard) = well_formed_graph();
    graph.delete_ins(b1, guard).unwrap();
    assert!(check_du_chains(&graph).is_ok());
}

#[test]
fn out_of_band_chain_removal_is_detected() {
    let (mut graph, _, guard) = well_formed_graph();
    let merged = Operand::new(0, 2);

    // Drop the guard's chain entry without touching the instruction stream,
    // simulating a pass that forgot half of its bookkeeping.
    graph.delete_usage(merged, guard).unwrap();

    match check_du_chains(&graph).unwrap_err() {
        DefUseCorruption::MissingUse {
            opcode,
            value,
            block,
            dump,
        } => {
            assert_eq!(opcode, "guard");
            assert_eq!(value, merged);
            assert_eq!(block, 1);
            assert!(dump.contains("BB1:"));
        }
        other => panic!("expected MissingUse, got {other:?}"),
    }
}

#[test]
fn wrong_writer_is_detected() {
    let (mut graph, _, guard) = well_formed_graph();
    let merged = Operand::new(0, 2);

    // Corrupt the writer fact of the PHI result.
    graph.facts_mut(merged).writer = Some(guard);

    match check_du_chains(&graph).unwrap_err() {
        DefUseCorruption::WrongWriter {
            opcode,
            value,
            block,
            ..
        } => {
            assert_eq!(opcode, "phi");
            assert_eq!(value, merged);
            assert_eq!(block, 1);
        }
        other => panic!("expected WrongWriter, got {other:?}"),
    }
}

#[test]
#[should_panic(expected = "malformed DU chain: reader guard of r0(2) in BB1 missing")]
fn assert_du_chains_panics_on_corruption() {
    let (mut graph, _, guard) = well_formed_graph();
    graph.delete_usage(Operand::new(0, 2), guard).unwrap();
    graph.assert_du_chains();
}
