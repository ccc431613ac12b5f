//! An HTTP API publishing a merkle root over account balances, and an
//! inclusion proof for the balance of every account.
//!
//! Accounts are committed to as leaves `(<id>,<balance>)` in configured order.
//! See [`ledger`] for the encoding and [`Config`] for the available settings.
pub(crate) mod api;
pub mod commitment;
pub(crate) mod config;
pub mod ledger;
pub(crate) mod metrics;
mod proof_api;

pub use config::Config;
pub use proof_api::{
    ProofApi,
    ShutdownHandle,
};
