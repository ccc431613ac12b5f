//! Leaf and branch hashing policies.
//!
//! A tree never hard-codes how its nodes are hashed. It is always built with a
//! [`Policy`] pairing a [`LeafHash`] and a [`BranchHash`]. The two deployments
//! supported out of the box are:
//!
//! + [`Policy::tagged`]: tagged leaves and tagged branches, using distinct tags;
//! + [`Policy::classic`]: tagged leaves and Bitcoin style double SHA256 branches.
//!
//! Closures can be used as policies as well:
//! ```
//! use reserve_merkle::{
//!     double_sha256,
//!     DoubleSha256,
//!     Policy,
//! };
//! let policy = Policy::new(
//!     |leaf: &[u8]| double_sha256(leaf),
//!     |left: &[u8; 32], right: &[u8; 32]| DoubleSha256::hash_pair(left, right),
//! );
//! assert_eq!(double_sha256(b"hello"), policy.hash_leaf(b"hello"));
//! ```
use crate::{
    hash::{
        DoubleSha256,
        Tagged,
    },
    Digest,
};

/// Hashes a leaf value into the bottom level of a tree.
pub trait LeafHash {
    fn hash_leaf(&self, leaf: &[u8]) -> Digest;
}

/// Combines two child digests into their parent.
///
/// Implementations must hash `left` before `right`.
pub trait BranchHash {
    fn hash_branch(&self, left: &Digest, right: &Digest) -> Digest;
}

impl<F> LeafHash for F
where
    F: Fn(&[u8]) -> Digest,
{
    fn hash_leaf(&self, leaf: &[u8]) -> Digest {
        self(leaf)
    }
}

impl<F> BranchHash for F
where
    F: Fn(&Digest, &Digest) -> Digest,
{
    fn hash_branch(&self, left: &Digest, right: &Digest) -> Digest {
        self(left, right)
    }
}

impl LeafHash for Tagged {
    fn hash_leaf(&self, leaf: &[u8]) -> Digest {
        self.hash(leaf)
    }
}

impl BranchHash for Tagged {
    fn hash_branch(&self, left: &Digest, right: &Digest) -> Digest {
        self.hash_pair(left, right)
    }
}

impl BranchHash for DoubleSha256 {
    fn hash_branch(&self, left: &Digest, right: &Digest) -> Digest {
        Self::hash_pair(left, right)
    }
}

/// A branch policy chosen at runtime.
#[derive(Clone, Debug)]
pub enum Branch {
    Tagged(Tagged),
    Classic(DoubleSha256),
}

impl BranchHash for Branch {
    fn hash_branch(&self, left: &Digest, right: &Digest) -> Digest {
        match self {
            Self::Tagged(tagged) => tagged.hash_pair(left, right),
            Self::Classic(classic) => classic.hash_branch(left, right),
        }
    }
}

/// A leaf policy paired with a branch policy.
#[derive(Clone, Debug)]
pub struct Policy<L, B> {
    leaf: L,
    branch: B,
}

impl<L, B> Policy<L, B> {
    #[must_use]
    pub const fn new(leaf: L, branch: B) -> Self {
        Self {
            leaf,
            branch,
        }
    }
}

impl<L: LeafHash, B: BranchHash> Policy<L, B> {
    #[must_use]
    pub fn hash_leaf(&self, leaf: &[u8]) -> Digest {
        self.leaf.hash_leaf(leaf)
    }

    #[must_use]
    pub fn hash_branch(&self, left: &Digest, right: &Digest) -> Digest {
        self.branch.hash_branch(left, right)
    }
}

impl Policy<Tagged, Branch> {
    /// Leaves are hashed under `leaf_tag`, branches under `branch_tag`.
    #[must_use]
    pub fn tagged<T: AsRef<[u8]>, U: AsRef<[u8]>>(leaf_tag: T, branch_tag: U) -> Self {
        Self::new(Tagged::new(leaf_tag), Branch::Tagged(Tagged::new(branch_tag)))
    }

    /// Leaves are hashed under `leaf_tag`, branches with double SHA256.
    ///
    /// The leaf tag keeps a leaf from ever being mistaken for the
    /// concatenation of two child digests.
    #[must_use]
    pub fn classic<T: AsRef<[u8]>>(leaf_tag: T) -> Self {
        Self::new(Tagged::new(leaf_tag), Branch::Classic(DoubleSha256))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        double_sha256,
        tagged_hash,
    };

    #[test]
    fn tagged_policy_uses_distinct_tags_for_leaves_and_branches() {
        let policy = Policy::tagged("leaf", "branch");
        assert_eq!(tagged_hash(b"leaf", b"x"), policy.hash_leaf(b"x"));

        let mut pair = [3u8; 64];
        pair[32..].copy_from_slice(&[4; 32]);
        assert_eq!(
            tagged_hash(b"branch", &pair),
            policy.hash_branch(&[3; 32], &[4; 32])
        );
    }

    #[test]
    fn classic_policy_double_hashes_branches() {
        let policy = Policy::classic("leaf");
        assert_eq!(tagged_hash(b"leaf", b"x"), policy.hash_leaf(b"x"));

        let mut pair = [3u8; 64];
        pair[32..].copy_from_slice(&[4; 32]);
        assert_eq!(double_sha256(&pair), policy.hash_branch(&[3; 32], &[4; 32]));
    }

    #[test]
    fn branch_hashing_is_not_commutative() {
        let policy = Policy::tagged("leaf", "branch");
        assert_ne!(
            policy.hash_branch(&[3; 32], &[4; 32]),
            policy.hash_branch(&[4; 32], &[3; 32]),
        );
    }
}
