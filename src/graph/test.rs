use super::*;
use crate::ins;
use pretty_assertions::assert_eq;

#[test]
fn first_block_is_entry_and_linear_order_follows_insertion() {
    let mut graph = SpeshGraph::new();
    assert!(graph.entry().is_none());
    assert!(graph.blocks_linear().next().is_none());

    let b0 = graph.add_block();
    let b1 = graph.add_block();
    let b2 = graph.add_block();

    assert_eq!(graph.entry(), Some(b0));
    let order: Vec<_> = graph.blocks_linear().map(|(id, bb)| (id, bb.idx())).collect();
    assert_eq!(order, vec![(b0, 0), (b1, 1), (b2, 2)]);
    assert_eq!(graph[b0].linear_next(), Some(b1));
    assert_eq!(graph[b2].linear_next(), None);
}

#[test]
fn append_records_writer_and_usages() {
    let mut graph = SpeshGraph::new();
    let block = graph.add_block();
    let v0 = Operand::new(0, 0);
    let v1 = Operand::new(1, 0);
    let v2 = Operand::new(2, 0);

    let c0 = graph.append_ins(block, ins::constant(v0, 1)).unwrap();
    let c1 = graph.append_ins(block, ins::constant(v1, 2)).unwrap();
    let sum = graph.append_ins(block, ins::add(v2, v0, v1)).unwrap();

    assert_eq!(graph.writer(v0), Some(c0));
    assert_eq!(graph.writer(v1), Some(c1));
    assert_eq!(graph.writer(v2), Some(sum));
    assert_eq!(graph.users(v0).collect::<Vec<_>>(), vec![sum]);
    assert_eq!(graph.users(v1).collect::<Vec<_>>(), vec![sum]);
    assert_eq!(graph.use_count(v2), 0);
    assert_eq!(graph[block].instructions(), &[c0, c1, sum]);
}

#[test]
fn use_before_def_is_rejected() {
    let mut graph = SpeshGraph::new();
    let block = graph.add_block();
    let v0 = Operand::new(0, 0);
    let v1 = Operand::new(1, 0);

    let err = graph.append_ins(block, ins::set(v1, v0)).unwrap_err();
    assert_eq!(
        err,
        GraphError::UseBeforeDef {
            value: v0,
            opcode: "set"
        }
    );
    // The instruction must not have been added.
    assert!(graph[block].instructions().is_empty());
}

#[test]
fn second_writer_is_rejected() {
    let mut graph = SpeshGraph::new();
    let block = graph.add_block();
    let v0 = Operand::new(0, 0);

    graph.append_ins(block, ins::constant(v0, 1)).unwrap();
    let err = graph.append_ins(block, ins::constant(v0, 2)).unwrap_err();
    assert_eq!(
        err,
        GraphError::MultipleWriters {
            value: v0,
            opcode: "const"
        }
    );
    assert_eq!(graph[block].instructions().len(), 1);
}

#[test]
fn phi_writes_first_slot_and_reads_the_rest() {
    let mut graph = SpeshGraph::new();
    let block = graph.add_block();
    let v0 = Operand::new(0, 0);
    let v1 = Operand::new(0, 1);
    let merged = Operand::new(0, 2);

    graph.append_ins(block, ins::constant(v0, 1)).unwrap();
    graph.append_ins(block, ins::constant(v1, 2)).unwrap();
    let phi = graph
        .append_ins(block, ins::phi(merged, vec![v0, v1]))
        .unwrap();

    assert_eq!(graph[phi].operand_kind(0), OperandKind::Write);
    assert_eq!(graph[phi].operand_kind(1), OperandKind::Read);
    assert_eq!(graph[phi].operand_kind(2), OperandKind::Read);
    assert_eq!(graph.writer(merged), Some(phi));
    assert_eq!(graph.users(v0).collect::<Vec<_>>(), vec![phi]);
    assert_eq!(graph.users(v1).collect::<Vec<_>>(), vec![phi]);
}

#[test]
fn delete_ins_clears_its_read_usages() {
    let mut graph = SpeshGraph::new();
    let block = graph.add_block();
    let v0 = Operand::new(0, 0);
    let v1 = Operand::new(1, 0);
    let v2 = Operand::new(2, 0);

    graph.append_ins(block, ins::constant(v0, 1)).unwrap();
    graph.append_ins(block, ins::constant(v1, 2)).unwrap();
    let sum = graph.append_ins(block, ins::add(v2, v0, v1)).unwrap();
    let ret = graph.append_ins(block, ins::ret(v2)).unwrap();

    graph.delete_ins(block, ret).unwrap();
    assert!(!graph.is_used(v2));
    graph.assert_du_chains();

    graph.delete_ins(block, sum).unwrap();
    assert!(!graph.is_used(v0));
    assert!(!graph.is_used(v1));
    assert_eq!(graph[block].instructions().len(), 2);
    graph.assert_du_chains();
}

#[test]
#[should_panic(expected = "instruction not in block")]
fn deleting_an_unlinked_instruction_panics() {
    let mut graph = SpeshGraph::new();
    let block = graph.add_block();
    let v0 = Operand::new(0, 0);

    let c0 = graph.append_ins(block, ins::constant(v0, 1)).unwrap();
    graph.delete_ins(block, c0).unwrap();
    graph.delete_ins(block, c0).unwrap();
}

#[test]
fn dump_renders_blocks_in_linear_order() {
    let mut graph = SpeshGraph::new();
    let b0 = graph.add_block();
    let b1 = graph.add_block();
    let v0 = Operand::new(0, 0);
    let v1 = Operand::new(1, 0);
    let v2 = Operand::new(2, 0);

    graph.append_ins(b0, ins::constant(v0, 1)).unwrap();
    graph.append_ins(b0, ins::constant(v1, 2)).unwrap();
    graph.append_ins(b1, ins::add(v2, v0, v1)).unwrap();
    graph.append_ins(b1, ins::ret(v2)).unwrap();

    assert_eq!(
        format!("{graph}"),
        "\
BB0:
\tconst\tr0(0), 1
\tconst\tr1(0), 2
BB1:
\tadd\tr2(0), r0(0), r1(0)
\treturn\tr2(0)
"
    );
}
