use merkle::{
    Branch,
    Digest,
    MerkleProof,
    Policy,
    Tagged,
    Tree,
};

use crate::ledger::{
    parse_balance,
    Account,
    Ledger,
    ParseBalanceError,
};

/// The policy all commitments are hashed with.
pub type CommitmentPolicy = Policy<Tagged, Branch>;

/// The merkle commitment to a [`Ledger`], computed once and then only read.
///
/// The full tree is kept, so that a proof only walks from the proven leaf up
/// to the root.
#[derive(Debug)]
pub struct Commitment {
    ledger: Ledger,
    leaves: Vec<String>,
    policy: CommitmentPolicy,
    tree: Tree,
}

impl Commitment {
    #[must_use]
    pub fn new(ledger: Ledger, policy: CommitmentPolicy) -> Self {
        let leaves = ledger.leaves();
        let tree = Tree::build(&leaves, &policy);
        Self {
            ledger,
            leaves,
            policy,
            tree,
        }
    }

    #[must_use]
    pub fn root(&self) -> Digest {
        self.tree.root()
    }

    #[must_use]
    pub fn root_hex(&self) -> String {
        self.tree.root_hex()
    }

    #[must_use]
    pub fn policy(&self) -> &CommitmentPolicy {
        &self.policy
    }

    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.tree.leaf_count()
    }

    #[must_use]
    pub fn account(&self, id: u64) -> Option<&Account> {
        self.ledger.get(id)
    }

    /// Proves that `account` is committed to, attaching its balance as read
    /// back from the committed leaf.
    ///
    /// Returns `Ok(None)` if `account` is not part of the commitment.
    ///
    /// # Errors
    /// Returns an error if the balance could not be read back from the leaf.
    pub fn prove(&self, account: &Account) -> Result<Option<MerkleProof<u64>>, ParseBalanceError> {
        let Some(index) = self.ledger.index_of(account.id) else {
            return Ok(None);
        };
        let leaf = &self.leaves[index];
        if *leaf != account.leaf() {
            return Ok(None);
        }
        let Some(proof) = self.tree.construct_proof(index) else {
            return Ok(None);
        };
        let balance = parse_balance(leaf.as_bytes())?;
        Ok(Some(proof.with_payload(balance)))
    }
}

#[cfg(test)]
mod tests {
    use merkle::{
        verify,
        Position,
    };

    use super::*;

    fn scenario_commitment() -> Commitment {
        let ledger = "1:1111,2:2222,3:3333,4:4444,5:5555,6:6666,7:7777,8:8888"
            .parse()
            .unwrap();
        Commitment::new(
            ledger,
            Policy::tagged("ProofOfReserve_Leaf", "ProofOfReserve_Branch"),
        )
    }

    #[test]
    fn root_commits_to_ledger_leaves() {
        assert_eq!(
            "b1231de33da17c23cebd80c104b88198e0914b0463d0e14db163605b904a7ba3",
            scenario_commitment().root_hex(),
        );
    }

    #[test]
    fn proof_carries_balance_and_verifies() {
        let commitment = scenario_commitment();
        let account = *commitment.account(3).unwrap();
        let proof = commitment.prove(&account).unwrap().unwrap();

        assert_eq!(3333, *proof.payload());
        let positions: Vec<_> = proof.proof().iter().map(|node| node.position()).collect();
        assert_eq!(
            vec![Position::Right, Position::Left, Position::Right],
            positions
        );
        assert!(verify(
            account.leaf().as_bytes(),
            proof.proof(),
            commitment.policy(),
            &commitment.root(),
        ));
    }

    #[test]
    fn account_outside_the_ledger_has_no_proof() {
        let commitment = scenario_commitment();
        let stranger = Account {
            id: 3,
            balance: 3334,
        };
        assert!(commitment.prove(&stranger).unwrap().is_none());
        assert!(commitment.account(9).is_none());
    }

    #[test]
    fn proofs_from_the_held_tree_match_proofs_from_rebuilt_trees() {
        let commitment = scenario_commitment();
        let leaves = commitment.ledger.leaves();
        for account in commitment.ledger.accounts() {
            let leaf = account.leaf();
            let rebuilt =
                merkle::generate_proof(leaf.as_bytes(), &leaves, commitment.policy()).unwrap();
            let held = commitment.prove(account).unwrap().unwrap();
            assert_eq!(&rebuilt, held.proof(), "account `{}`", account.id);
            assert_eq!(account.balance, *held.payload());
        }
    }

    #[test]
    fn classic_branches_change_the_root() {
        let ledger: Ledger = "1:1111,2:2222".parse().unwrap();
        let tagged = Commitment::new(
            ledger.clone(),
            Policy::tagged("ProofOfReserve_Leaf", "ProofOfReserve_Branch"),
        );
        let classic = Commitment::new(ledger, Policy::classic("ProofOfReserve_Leaf"));
        assert_ne!(tagged.root(), classic.root());
    }

    #[test]
    fn single_account_is_proven_with_empty_path() {
        let ledger: Ledger = "7:70".parse().unwrap();
        let commitment = Commitment::new(ledger, Policy::tagged("leaf", "branch"));
        let account = *commitment.account(7).unwrap();
        let proof = commitment.prove(&account).unwrap().unwrap();
        assert_eq!(70, *proof.payload());
        assert!(proof.proof().is_empty());
    }
}
