//! Inclusion proofs and their verification.
use std::slice;

use crate::{
    policy::{
        BranchHash,
        LeafHash,
        Policy,
    },
    Digest,
};

/// The side a sibling occupies relative to the node being authenticated.
///
/// At the boundary `Left` is represented as `0` and `Right` as `1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u8", into = "u8")
)]
pub enum Position {
    Left,
    Right,
}

impl Position {
    /// Returns the other side.
    #[must_use]
    pub const fn flip(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

impl From<Position> for u8 {
    fn from(position: Position) -> Self {
        match position {
            Position::Left => 0,
            Position::Right => 1,
        }
    }
}

impl TryFrom<u8> for Position {
    type Error = InvalidProof;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Left),
            1 => Ok(Self::Right),
            other => Err(InvalidProof::position(other)),
        }
    }
}

/// One step of an inclusion proof: a sibling digest and which side it is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawPathNode", into = "RawPathNode")
)]
pub struct PathNode {
    sibling: Digest,
    position: Position,
}

impl PathNode {
    #[must_use]
    pub const fn new(sibling: Digest, position: Position) -> Self {
        Self {
            sibling,
            position,
        }
    }

    #[must_use]
    pub fn sibling(&self) -> &Digest {
        &self.sibling
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Converts a node as received from outside the crate, validating it.
    ///
    /// # Errors
    /// Returns an error if `hash` is not the hex encoding of exactly
    /// [`DIGEST_LEN`](crate::DIGEST_LEN) bytes, or if `position` is neither `0` nor `1`.
    pub fn try_from_raw(raw: RawPathNode) -> Result<Self, InvalidProof> {
        let RawPathNode {
            hash,
            position,
        } = raw;
        let bytes = hex::decode(&hash).map_err(InvalidProof::hex)?;
        let sibling: Digest = bytes
            .try_into()
            .map_err(|bytes: Vec<u8>| InvalidProof::digest_length(bytes.len()))?;
        let position = Position::try_from(position)?;
        Ok(Self {
            sibling,
            position,
        })
    }

    #[must_use]
    pub fn into_raw(self) -> RawPathNode {
        RawPathNode {
            hash: hex::encode(self.sibling),
            position: self.position.into(),
        }
    }
}

/// The boundary representation of a [`PathNode`].
///
/// `hash` is the lower-cased hex encoding of the sibling digest, `position`
/// is `0` if the sibling is on the left and `1` if it is on the right.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawPathNode {
    pub hash: String,
    pub position: u8,
}

impl From<PathNode> for RawPathNode {
    fn from(node: PathNode) -> Self {
        node.into_raw()
    }
}

impl TryFrom<RawPathNode> for PathNode {
    type Error = InvalidProof;

    fn try_from(raw: RawPathNode) -> Result<Self, Self::Error> {
        Self::try_from_raw(raw)
    }
}

/// An inclusion proof: the sibling path from a leaf up to, but excluding, the root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Proof {
    path: Vec<PathNode>,
}

impl Proof {
    #[must_use]
    pub fn from_path(path: Vec<PathNode>) -> Self {
        Self {
            path,
        }
    }

    #[must_use]
    pub fn path(&self) -> &[PathNode] {
        &self.path
    }

    #[must_use]
    pub fn into_path(self) -> Vec<PathNode> {
        self.path
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.path.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, PathNode> {
        self.path.iter()
    }

    /// Converts a path as received from outside the crate, validating every node.
    ///
    /// # Errors
    /// Returns an error if any of the nodes is malformed. See [`PathNode::try_from_raw`].
    pub fn try_from_raw<I>(raw: I) -> Result<Self, InvalidProof>
    where
        I: IntoIterator<Item = RawPathNode>,
    {
        raw.into_iter()
            .map(PathNode::try_from_raw)
            .collect::<Result<_, _>>()
            .map(Self::from_path)
    }

    #[must_use]
    pub fn into_raw(self) -> Vec<RawPathNode> {
        self.path.into_iter().map(PathNode::into_raw).collect()
    }

    /// Attaches a caller chosen payload to the proof.
    ///
    /// The payload plays no part in hashing.
    #[must_use]
    pub fn with_payload<P>(self, payload: P) -> MerkleProof<P> {
        MerkleProof {
            payload,
            proof: self,
        }
    }

    /// Recomputes the root implied by `leaf` and this proof.
    pub fn reconstruct_root<L, B>(&self, leaf: &[u8], policy: &Policy<L, B>) -> Digest
    where
        L: LeafHash,
        B: BranchHash,
    {
        self.path
            .iter()
            .fold(policy.hash_leaf(leaf), |current, node| match node.position {
                Position::Right => policy.hash_branch(&current, &node.sibling),
                Position::Left => policy.hash_branch(&node.sibling, &current),
            })
    }

    /// Returns an [`Audit`] to check this proof against a leaf and a root.
    ///
    /// # Examples
    /// ```
    /// use reserve_merkle::{
    ///     Policy,
    ///     Tree,
    /// };
    /// let policy = Policy::tagged("leaf", "branch");
    /// let tree = Tree::build(["a", "b", "c", "d"], &policy);
    /// let proof = tree.construct_proof(1).expect("leaf 1 is inside the tree");
    /// assert!(proof
    ///     .audit(&policy)
    ///     .with_leaf(b"b")
    ///     .with_root(tree.root())
    ///     .perform());
    /// assert!(!proof
    ///     .audit(&policy)
    ///     .with_leaf(b"c")
    ///     .with_root(tree.root())
    ///     .perform());
    /// ```
    #[must_use = "an audit must be performed to be useful"]
    pub fn audit<'a, L, B>(&'a self, policy: &'a Policy<L, B>) -> Audit<'a, L, B, NoLeaf, NoRoot> {
        Audit {
            proof: self,
            policy,
            leaf: NoLeaf,
            root: NoRoot,
        }
    }
}

impl<'a> IntoIterator for &'a Proof {
    type IntoIter = slice::Iter<'a, PathNode>;
    type Item = &'a PathNode;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A [`Proof`] together with a payload bound to the proven leaf, e.g. a balance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleProof<P> {
    payload: P,
    proof: Proof,
}

impl<P> MerkleProof<P> {
    #[must_use]
    pub fn payload(&self) -> &P {
        &self.payload
    }

    #[must_use]
    pub fn proof(&self) -> &Proof {
        &self.proof
    }

    #[must_use]
    pub fn into_parts(self) -> (P, Proof) {
        (self.payload, self.proof)
    }
}

/// Typestate marker for an [`Audit`] without a leaf.
#[derive(Debug)]
pub struct NoLeaf;
/// Typestate marker for an [`Audit`] holding the leaf to check.
#[derive(Debug)]
pub struct WithLeaf<'a>(&'a [u8]);
/// Typestate marker for an [`Audit`] without an expected root.
#[derive(Debug)]
pub struct NoRoot;
/// Typestate marker for an [`Audit`] holding the expected root.
#[derive(Debug)]
pub struct WithRoot(Digest);

/// Checks a [`Proof`] once both a leaf and an expected root are provided.
///
/// Created by [`Proof::audit`].
#[derive(Debug)]
pub struct Audit<'a, L, B, TLeaf, TRoot> {
    proof: &'a Proof,
    policy: &'a Policy<L, B>,
    leaf: TLeaf,
    root: TRoot,
}

impl<'a, L, B, TLeaf, TRoot> Audit<'a, L, B, TLeaf, TRoot> {
    #[must_use = "an audit must be performed to be useful"]
    pub fn with_leaf(self, leaf: &'a [u8]) -> Audit<'a, L, B, WithLeaf<'a>, TRoot> {
        let Self {
            proof,
            policy,
            root,
            ..
        } = self;
        Audit {
            proof,
            policy,
            leaf: WithLeaf(leaf),
            root,
        }
    }

    #[must_use = "an audit must be performed to be useful"]
    pub fn with_root(self, root: Digest) -> Audit<'a, L, B, TLeaf, WithRoot> {
        let Self {
            proof,
            policy,
            leaf,
            ..
        } = self;
        Audit {
            proof,
            policy,
            leaf,
            root: WithRoot(root),
        }
    }
}

impl<'a, L, B> Audit<'a, L, B, WithLeaf<'a>, WithRoot>
where
    L: LeafHash,
    B: BranchHash,
{
    /// Returns `true` if the leaf and the proof evaluate to the expected root.
    #[must_use]
    pub fn perform(&self) -> bool {
        self.proof.reconstruct_root(self.leaf.0, self.policy) == self.root.0
    }
}

/// Returns `true` if `proof` shows `leaf` to be included under `root`.
///
/// Any tampering with the leaf, the sibling digests, their positions or their
/// order, as well as truncating or extending the path, yields `false`.
pub fn verify<L, B>(leaf: &[u8], proof: &Proof, policy: &Policy<L, B>, root: &Digest) -> bool
where
    L: LeafHash,
    B: BranchHash,
{
    proof
        .audit(policy)
        .with_leaf(leaf)
        .with_root(*root)
        .perform()
}

/// Generates the proof for `target` and attaches the payload extracted from it.
///
/// Returns `Ok(None)` if `target` is not among `leaves`; `extract` is only
/// called for leaves that were found.
///
/// # Errors
/// Returns the error of `extract` if the payload could not be extracted.
pub fn generate_proof_with_payload<T, L, B, P, E, F>(
    target: &[u8],
    leaves: &[T],
    policy: &Policy<L, B>,
    extract: F,
) -> Result<Option<MerkleProof<P>>, E>
where
    T: AsRef<[u8]>,
    L: LeafHash,
    B: BranchHash,
    F: FnOnce(&[u8]) -> Result<P, E>,
{
    let Some(proof) = crate::generate_proof(target, leaves, policy) else {
        return Ok(None);
    };
    let payload = extract(target)?;
    Ok(Some(proof.with_payload(payload)))
}

/// The error returned when a proof received from outside the crate is malformed.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct InvalidProof(InvalidProofKind);

impl InvalidProof {
    fn hex(source: hex::FromHexError) -> Self {
        Self(InvalidProofKind::Hex(source))
    }

    fn digest_length(actual: usize) -> Self {
        Self(InvalidProofKind::DigestLength(actual))
    }

    fn position(actual: u8) -> Self {
        Self(InvalidProofKind::Position(actual))
    }
}

#[derive(Debug, thiserror::Error)]
enum InvalidProofKind {
    #[error("sibling hash is not valid hex")]
    Hex(#[source] hex::FromHexError),
    #[error("sibling hash must be 32 bytes, but was {0} bytes")]
    DigestLength(usize),
    #[error("position must be 0 (left) or 1 (right), but was {0}")]
    Position(u8),
}
