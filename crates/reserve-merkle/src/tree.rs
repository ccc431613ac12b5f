use std::ops::Range;

use crate::{
    audit::{
        PathNode,
        Position,
        Proof,
    },
    policy::{
        BranchHash,
        LeafHash,
        Policy,
    },
    Digest,
};

/// A Merkle tree built level by level from an ordered sequence of leaves.
///
/// All node digests are stored in one flat buffer: first the leaf level, then
/// each parent level, ending with the root. `levels` records which range of
/// the buffer makes up each level.
///
/// If a level has an odd number of nodes, its last node is paired with itself
/// to form its parent. A tree over zero leaves consists of a single level
/// holding the leaf hash of the empty string.
///
/// # Examples
/// ```
/// use reserve_merkle::{
///     Policy,
///     Tree,
/// };
/// let policy = Policy::tagged("ProofOfReserve_Leaf", "ProofOfReserve_Branch");
/// let tree = Tree::build(["(1,1111)", "(2,2222)", "(3,3333)"], &policy);
/// assert_eq!(3, tree.leaf_count());
/// assert_eq!(3, tree.height());
/// assert_eq!(Some(2), tree.level(1).map(<[_]>::len));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<Digest>,
    levels: Vec<Range<usize>>,
    leaf_count: usize,
}

impl Tree {
    /// Builds the full tree over `leaves`, hashing with `policy`.
    pub fn build<I, T, L, B>(leaves: I, policy: &Policy<L, B>) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
        L: LeafHash,
        B: BranchHash,
    {
        let mut nodes: Vec<Digest> = leaves
            .into_iter()
            .map(|leaf| policy.hash_leaf(leaf.as_ref()))
            .collect();
        let leaf_count = nodes.len();
        if nodes.is_empty() {
            nodes.push(policy.hash_leaf(&[]));
        }
        // a tree over n leaves has fewer than 2n nodes
        nodes.reserve(nodes.len());

        let mut current = 0..nodes.len();
        let mut levels = vec![current.clone()];
        while current.len() > 1 {
            let start = nodes.len();
            for i in current.clone().step_by(2) {
                let left = nodes[i];
                let right = if i + 1 < current.end {
                    nodes[i + 1]
                } else {
                    left
                };
                nodes.push(policy.hash_branch(&left, &right));
            }
            current = start..nodes.len();
            levels.push(current.clone());
        }

        Self {
            nodes,
            levels,
            leaf_count,
        }
    }

    /// Returns the root hash of the tree.
    #[must_use]
    #[allow(clippy::missing_panics_doc)] // invariant of the system
    pub fn root(&self) -> Digest {
        *self
            .nodes
            .last()
            .expect("a tree always contains at least one node")
    }

    /// Returns the root hash as lower-cased hex.
    #[must_use]
    pub fn root_hex(&self) -> String {
        hex::encode(self.root())
    }

    /// Returns the number of leaves the tree was built from.
    ///
    /// This is `0` for the empty tree, even though its only level holds one digest.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leaf_count == 0
    }

    /// Returns the number of levels, including the leaf level and the root.
    #[must_use]
    pub fn height(&self) -> usize {
        self.levels.len()
    }

    /// Returns the `k`-th level, with level `0` holding the leaf hashes.
    #[must_use]
    pub fn level(&self, k: usize) -> Option<&[Digest]> {
        self.levels.get(k).map(|range| &self.nodes[range.clone()])
    }

    /// Iterates over all levels, from the leaf level up to the root.
    pub fn levels(&self) -> impl ExactSizeIterator<Item = &[Digest]> + '_ {
        self.levels.iter().map(|range| &self.nodes[range.clone()])
    }

    /// Returns the hash of the `i`-th leaf.
    #[must_use]
    pub fn leaf(&self, i: usize) -> Option<Digest> {
        (i < self.leaf_count).then(|| self.nodes[i])
    }

    /// Constructs the inclusion proof for the `i`-th leaf.
    ///
    /// Returns `None` if `i` is outside the tree. The proof of the only leaf of
    /// a single leaf tree is empty.
    ///
    /// # Examples
    /// ```
    /// use reserve_merkle::{
    ///     Policy,
    ///     Position,
    ///     Tree,
    /// };
    /// let policy = Policy::tagged("leaf", "branch");
    /// let tree = Tree::build(["a", "b", "c"], &policy);
    /// let proof = tree.construct_proof(2).expect("leaf 2 is inside the tree");
    ///
    /// // The unpaired leaf `c` is its own sibling.
    /// assert_eq!(tree.leaf(2), Some(*proof.path()[0].sibling()));
    /// assert_eq!(Position::Right, proof.path()[0].position());
    /// assert!(tree.construct_proof(3).is_none());
    /// ```
    #[must_use]
    pub fn construct_proof(&self, leaf_index: usize) -> Option<Proof> {
        if leaf_index >= self.leaf_count {
            return None;
        }
        let mut index = leaf_index;
        let mut path = Vec::with_capacity(self.height() - 1);
        for level in self.levels().take(self.height() - 1) {
            let (sibling_index, position) = if is_left(index) {
                (index + 1, Position::Right)
            } else {
                (index - 1, Position::Left)
            };
            let sibling = level.get(sibling_index).unwrap_or(&level[index]);
            path.push(PathNode::new(*sibling, position));
            index /= 2;
        }
        Some(Proof::from_path(path))
    }
}

/// Calculates the root over `leaves` without keeping the full tree around.
///
/// Each level is reduced into the front of the previous one, so memory stays
/// at one digest per leaf. The result is identical to [`Tree::root`].
///
/// # Examples
/// ```
/// use reserve_merkle::{
///     root,
///     Policy,
///     Tree,
/// };
/// let policy = Policy::classic("Bitcoin_Transaction");
/// let leaves = ["aaa", "bbb", "ccc", "ddd", "eee"];
/// assert_eq!(Tree::build(leaves, &policy).root(), root(leaves, &policy));
/// ```
pub fn root<I, T, L, B>(leaves: I, policy: &Policy<L, B>) -> Digest
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
    L: LeafHash,
    B: BranchHash,
{
    let mut level: Vec<Digest> = leaves
        .into_iter()
        .map(|leaf| policy.hash_leaf(leaf.as_ref()))
        .collect();
    if level.is_empty() {
        return policy.hash_leaf(&[]);
    }
    while level.len() > 1 {
        let len = level.len();
        for i in (0..len).step_by(2) {
            let left = level[i];
            let right = level.get(i + 1).copied().unwrap_or(left);
            level[i / 2] = policy.hash_branch(&left, &right);
        }
        level.truncate(len.div_ceil(2));
    }
    level[0]
}

/// Generates the inclusion proof for the first leaf equal to `target`.
///
/// Returns `None` if `target` is not among `leaves`. This is distinct from the
/// empty proof returned for the only leaf of a single leaf tree.
pub fn generate_proof<T, L, B>(target: &[u8], leaves: &[T], policy: &Policy<L, B>) -> Option<Proof>
where
    T: AsRef<[u8]>,
    L: LeafHash,
    B: BranchHash,
{
    let index = leaves.iter().position(|leaf| leaf.as_ref() == target)?;
    Tree::build(leaves, policy).construct_proof(index)
}

/// Leaves at even indices are the left child of their parent.
#[inline]
fn is_left(i: usize) -> bool {
    i & 0b1 == 0
}
