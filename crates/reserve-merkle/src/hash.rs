//! The two hash primitives underlying every tree: a BIP340-style tagged hash
//! and Bitcoin's double SHA256.
use std::fmt;

use sha2::{
    Digest as _,
    Sha256,
};

/// The length of every digest produced by this crate.
pub const DIGEST_LEN: usize = 32;

/// A raw SHA256 output. Rendered as hex only when leaving the crate.
pub type Digest = [u8; DIGEST_LEN];

/// Calculates `SHA256(SHA256(tag) || SHA256(tag) || data)`.
///
/// Prefer [`Tagged`] when hashing many values under the same tag.
///
/// # Examples
/// ```
/// use reserve_merkle::{
///     tagged_hash,
///     Tagged,
/// };
/// let leaf_hasher = Tagged::new("ProofOfReserve_Leaf");
/// assert_eq!(
///     tagged_hash(b"ProofOfReserve_Leaf", b"(1,1111)"),
///     leaf_hasher.hash(b"(1,1111)"),
/// );
/// ```
#[must_use]
pub fn tagged_hash(tag: &[u8], data: &[u8]) -> Digest {
    Tagged::new(tag).hash(data)
}

/// Calculates `SHA256(SHA256(data))`.
#[must_use]
pub fn double_sha256(data: &[u8]) -> Digest {
    Sha256::digest(Sha256::digest(data)).into()
}

/// A tagged hasher with the domain prefix already absorbed.
///
/// `SHA256(tag) || SHA256(tag)` is exactly one 64 byte SHA256 block. The
/// hasher state after consuming that block is kept and cloned for every
/// hash, so the tag itself is only hashed once.
#[derive(Clone)]
pub struct Tagged {
    tag_hash: Digest,
    prefix: Sha256,
}

impl Tagged {
    #[must_use]
    pub fn new<T: AsRef<[u8]>>(tag: T) -> Self {
        let tag_hash: Digest = Sha256::digest(tag.as_ref()).into();
        let mut prefix = Sha256::new();
        prefix.update(tag_hash);
        prefix.update(tag_hash);
        Self {
            tag_hash,
            prefix,
        }
    }

    /// Calculates `SHA256(SHA256(tag) || SHA256(tag) || data)`.
    #[must_use]
    pub fn hash(&self, data: &[u8]) -> Digest {
        let mut hasher = self.prefix.clone();
        hasher.update(data);
        hasher.finalize().into()
    }

    /// Calculates `SHA256(SHA256(tag) || SHA256(tag) || left || right)`.
    #[must_use]
    pub fn hash_pair(&self, left: &Digest, right: &Digest) -> Digest {
        let mut hasher = self.prefix.clone();
        hasher.update(left);
        hasher.update(right);
        hasher.finalize().into()
    }
}

impl fmt::Debug for Tagged {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tagged")
            .field("tag_hash", &hex::encode(self.tag_hash))
            .finish_non_exhaustive()
    }
}

/// Bitcoin style branch hashing without any domain tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DoubleSha256;

impl DoubleSha256 {
    /// Calculates `SHA256(SHA256(left || right))`.
    #[must_use]
    pub fn hash_pair(left: &Digest, right: &Digest) -> Digest {
        let inner = Sha256::new().chain_update(left).chain_update(right).finalize();
        Sha256::digest(inner).into()
    }
}
