use helpers::{
    TestProofApi,
    BRANCH_TAG,
    LEAF_TAG,
};
use merkle::{
    verify,
    Policy,
    Position,
    Proof,
    RawPathNode,
};
use serde_json::json;

pub mod helpers;

/// Reads the root and the path out of the API's responses.
fn parse_root_and_proof(
    root: &serde_json::Value,
    proof: &serde_json::Value,
) -> ([u8; 32], Proof) {
    let root = hex::decode(root["merkleRoot"].as_str().unwrap())
        .unwrap()
        .try_into()
        .unwrap();
    let raw: Vec<RawPathNode> = serde_json::from_value(proof["path"].clone()).unwrap();
    (root, Proof::try_from_raw(raw).unwrap())
}

#[tokio::test]
async fn serves_merkle_root() {
    let proof_api = TestProofApi::spawn().await;
    let (status, body) = proof_api.get("/merkle-root").await;
    assert_eq!(reqwest::StatusCode::OK, status);
    assert_eq!(
        json!({"merkleRoot": "b1231de33da17c23cebd80c104b88198e0914b0463d0e14db163605b904a7ba3"}),
        body,
    );
    proof_api.shutdown().await;
}

#[tokio::test]
async fn serves_proof_that_verifies_against_served_root() {
    let proof_api = TestProofApi::spawn().await;
    let (_, root) = proof_api.get("/merkle-root").await;
    let (status, proof) = proof_api.get("/merkle-proof/3").await;
    assert_eq!(reqwest::StatusCode::OK, status);
    assert_eq!(json!(3333), proof["userBalance"]);

    let (root, path) = parse_root_and_proof(&root, &proof);
    let positions: Vec<_> = path.iter().map(|node| node.position()).collect();
    assert_eq!(
        vec![Position::Right, Position::Left, Position::Right],
        positions
    );
    let policy = Policy::tagged(LEAF_TAG, BRANCH_TAG);
    assert!(verify(b"(3,3333)", &path, &policy, &root));
    assert!(!verify(b"(3,3334)", &path, &policy, &root));
    proof_api.shutdown().await;
}

#[tokio::test]
async fn every_account_has_a_verifying_proof() {
    let proof_api = TestProofApi::spawn().await;
    let (_, root) = proof_api.get("/merkle-root").await;
    let policy = Policy::tagged(LEAF_TAG, BRANCH_TAG);
    for id in 1..=8u64 {
        let (status, proof) = proof_api.get(&format!("/merkle-proof/{id}")).await;
        assert_eq!(reqwest::StatusCode::OK, status, "user id `{id}`");
        let balance = proof["userBalance"].as_u64().unwrap();
        assert_eq!(id * 1111, balance);

        let (root, path) = parse_root_and_proof(&root, &proof);
        let leaf = format!("({id},{balance})");
        assert!(verify(leaf.as_bytes(), &path, &policy, &root), "user id `{id}`");
    }
    proof_api.shutdown().await;
}

#[tokio::test]
async fn classic_branches_serve_verifying_proofs() {
    let proof_api = TestProofApi::spawn_with("10:1,20:2,30:3", true).await;
    let (_, root) = proof_api.get("/merkle-root").await;
    let (status, proof) = proof_api.get("/merkle-proof/30").await;
    assert_eq!(reqwest::StatusCode::OK, status);
    assert_eq!(json!(3), proof["userBalance"]);

    let (root, path) = parse_root_and_proof(&root, &proof);
    assert!(verify(b"(30,3)", &path, &Policy::classic(LEAF_TAG), &root));
    assert!(!verify(
        b"(30,3)",
        &path,
        &Policy::tagged(LEAF_TAG, BRANCH_TAG),
        &root
    ));
    proof_api.shutdown().await;
}

#[tokio::test]
async fn single_account_is_proven_with_empty_path() {
    let proof_api = TestProofApi::spawn_with("1:100", false).await;
    let (status, proof) = proof_api.get("/merkle-proof/1").await;
    assert_eq!(reqwest::StatusCode::OK, status);
    assert_eq!(json!({"userBalance": 100, "path": []}), proof);
    proof_api.shutdown().await;
}

#[tokio::test]
async fn non_numeric_user_id_is_a_bad_request() {
    let proof_api = TestProofApi::spawn().await;
    for user_id in ["abc", "3abc", "-1", "1.5"] {
        let (status, body) = proof_api.get(&format!("/merkle-proof/{user_id}")).await;
        assert_eq!(reqwest::StatusCode::BAD_REQUEST, status, "user id `{user_id}`");
        assert_eq!(json!({"error": "User ID must be a number."}), body);
    }
    proof_api.shutdown().await;
}

#[tokio::test]
async fn unknown_user_id_is_not_found() {
    let proof_api = TestProofApi::spawn().await;
    let (status, body) = proof_api.get("/merkle-proof/9").await;
    assert_eq!(reqwest::StatusCode::NOT_FOUND, status);
    assert_eq!(json!({"error": "User not found."}), body);
    proof_api.shutdown().await;
}

#[tokio::test]
async fn healthz_reports_ok() {
    let proof_api = TestProofApi::spawn().await;
    let (status, body) = proof_api.get("/healthz").await;
    assert_eq!(reqwest::StatusCode::OK, status);
    assert_eq!(json!({"status": "ok"}), body);
    proof_api.shutdown().await;
}

#[tokio::test]
async fn healthz_answers_alongside_proof_requests_for_a_large_ledger() {
    let accounts = (1..=100_000u64)
        .map(|id| format!("{id}:{id}"))
        .collect::<Vec<_>>()
        .join(",");
    let proof_api = TestProofApi::spawn_with(&accounts, false).await;

    let (proof, healthz) = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        tokio::join!(
            proof_api.get("/merkle-proof/99999"),
            proof_api.get("/healthz"),
        )
    })
    .await
    .expect("both requests must be answered within 5 seconds");

    let (status, proof) = proof;
    assert_eq!(reqwest::StatusCode::OK, status);
    assert_eq!(json!(99_999), proof["userBalance"]);
    assert_eq!(17, proof["path"].as_array().unwrap().len());
    assert_eq!(
        (reqwest::StatusCode::OK, json!({"status": "ok"})),
        healthz
    );
    proof_api.shutdown().await;
}
