//! A Merkle tree committing to an ordered sequence of leaves, with inclusion
//! proofs and their verification.
//!
//! Hashing is domain separated: leaves and branches are hashed with
//! [BIP340 style tagged hashes](https://github.com/bitcoin/bips/blob/master/bip-0340.mediawiki#design),
//! `SHA256(SHA256(tag) || SHA256(tag) || data)`, so that a digest computed
//! for one purpose can never stand in for a digest computed for another.
//! Alternatively, branches can be hashed Bitcoin style with double SHA256,
//! while leaves stay tagged. See [`Policy`].
//!
//! The tree is not order independent: permuting the leaves changes the root.
//!
//! # Usage and examples
//! ```
//! use reserve_merkle::{
//!     generate_proof,
//!     root,
//!     verify,
//!     Policy,
//! };
//! let policy = Policy::tagged("ProofOfReserve_Leaf", "ProofOfReserve_Branch");
//! let leaves = [
//!     "(1,1111)", "(2,2222)", "(3,3333)", "(4,4444)",
//!     "(5,5555)", "(6,6666)", "(7,7777)", "(8,8888)",
//! ];
//!
//! let root = root(leaves, &policy);
//! assert_eq!(
//!     "b1231de33da17c23cebd80c104b88198e0914b0463d0e14db163605b904a7ba3",
//!     hex::encode(root),
//! );
//!
//! let proof = generate_proof(b"(3,3333)", &leaves, &policy)
//!     .expect("(3,3333) is one of the leaves");
//! assert_eq!(3, proof.len());
//! assert!(verify(b"(3,3333)", &proof, &policy, &root));
//! assert!(!verify(b"(3,3334)", &proof, &policy, &root));
//! ```
//!
//! # Tree shape
//! Level `0` holds one hash per leaf, in leaf order. Every further level holds
//! one hash per adjacent pair of the level below. An unpaired last node is
//! combined with itself:
//! ```text
//!              root
//!            /      \
//!        h(ab)       h(cc)
//!        /   \       /   \
//!      a      b    c      c
//! ```
//! The root of zero leaves is the leaf hash of the empty string. The root of a
//! single leaf is that leaf's hash, and its proof is empty.
//!
//! # Proofs
//! A [`Proof`] lists the sibling of each node on the way from a leaf up to the
//! root, together with the side the sibling is on. The sibling of an unpaired
//! node is the node itself.

pub mod audit;
mod hash;
pub mod policy;
mod tree;

pub use audit::{
    generate_proof_with_payload,
    verify,
    Audit,
    InvalidProof,
    MerkleProof,
    PathNode,
    Position,
    Proof,
    RawPathNode,
};
pub use hash::{
    double_sha256,
    tagged_hash,
    Digest,
    DoubleSha256,
    Tagged,
    DIGEST_LEN,
};
pub use policy::{
    Branch,
    BranchHash,
    LeafHash,
    Policy,
};
pub use tree::{
    generate_proof,
    root,
    Tree,
};
