//! Benchmarks for building trees, calculating roots and generating proofs.
//!
//! Run with `cargo bench -p reserve-merkle`.
use divan::{
    black_box,
    Bencher,
};
use reserve_merkle::{
    generate_proof,
    root,
    Policy,
    Tree,
};

const SIZES: [usize; 4] = [8, 1_000, 10_000, 100_000];

fn balances(n: usize) -> Vec<String> {
    (1..=n).map(|id| format!("({id},{})", id * 1111)).collect()
}

#[divan::bench(args = SIZES)]
fn build_tree(bencher: Bencher, n: usize) {
    let policy = Policy::tagged("ProofOfReserve_Leaf", "ProofOfReserve_Branch");
    let leaves = balances(n);
    bencher.bench(|| Tree::build(black_box(&leaves), &policy));
}

#[divan::bench(args = SIZES)]
fn flat_root(bencher: Bencher, n: usize) {
    let policy = Policy::tagged("ProofOfReserve_Leaf", "ProofOfReserve_Branch");
    let leaves = balances(n);
    bencher.bench(|| root(black_box(&leaves), &policy));
}

#[divan::bench(args = SIZES)]
fn classic_root(bencher: Bencher, n: usize) {
    let policy = Policy::classic("Bitcoin_Transaction");
    let leaves = balances(n);
    bencher.bench(|| root(black_box(&leaves), &policy));
}

#[divan::bench(args = SIZES)]
fn proof_for_last_leaf(bencher: Bencher, n: usize) {
    let policy = Policy::tagged("ProofOfReserve_Leaf", "ProofOfReserve_Branch");
    let leaves = balances(n);
    let target = leaves.last().cloned().unwrap_or_default();
    bencher.bench(|| generate_proof(black_box(target.as_bytes()), &leaves, &policy));
}

fn main() {
    divan::main();
}
