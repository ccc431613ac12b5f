use std::{
    net::SocketAddr,
    sync::Arc,
};

use merkle::Policy;
use reserve_eyre::eyre::{
    self,
    WrapErr as _,
};
use telemetry::display;
use tokio_util::sync::CancellationToken;
use tracing::{
    info,
    instrument,
};

use crate::{
    api,
    commitment::{
        Commitment,
        CommitmentPolicy,
    },
    ledger::Ledger,
    metrics::Metrics,
    Config,
};

/// Serves the merkle root over the configured accounts and inclusion proofs
/// for each of them.
pub struct ProofApi {
    api_server: api::Serve,
}

impl ProofApi {
    /// Computes the commitment to the configured accounts and binds the API
    /// to `cfg.api_addr`.
    ///
    /// # Errors
    /// Returns an error if the accounts or the API address could not be
    /// parsed, or if the API address could not be bound.
    pub async fn from_config(cfg: &Config) -> eyre::Result<(Self, ShutdownHandle)> {
        let shutdown_handle = ShutdownHandle::new();

        let ledger: Ledger = cfg
            .accounts
            .parse()
            .wrap_err("failed to parse configured accounts")?;
        let commitment = Commitment::new(ledger, policy_from_config(cfg));
        info!(
            merkle_root = %display::hex(&commitment.root()),
            leaf_count = commitment.leaf_count(),
            classic_branches = cfg.classic_branches,
            "computed merkle root over all accounts",
        );

        let metrics = Metrics::new();
        metrics.set_committed_accounts(commitment.leaf_count());

        let api_socket_addr = cfg.api_addr.parse::<SocketAddr>().wrap_err_with(|| {
            format!(
                "failed to parse provided `api_addr` string as socket address: `{}`",
                cfg.api_addr,
            )
        })?;
        let api_server = api::serve(
            api_socket_addr,
            Arc::new(commitment),
            Arc::new(metrics),
            shutdown_handle.token(),
        )
        .await
        .wrap_err("failed to start API server")?;
        info!(
            local_addr = %api_server.local_addr(),
            "API server listening"
        );

        Ok((
            Self {
                api_server,
            },
            shutdown_handle,
        ))
    }

    /// Returns the address the API server is bound to.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.api_server.local_addr()
    }

    /// Serves requests until the [`ShutdownHandle`] returned alongside `self`
    /// is shut down or dropped.
    ///
    /// # Errors
    /// Returns an error if the API server exited with an error.
    pub async fn run_until_stopped(self) -> eyre::Result<()> {
        let Self {
            api_server,
        } = self;
        api_server.await.wrap_err("API server ended unexpectedly")?;
        info!("API server shut down");
        Ok(())
    }
}

fn policy_from_config(cfg: &Config) -> CommitmentPolicy {
    if cfg.classic_branches {
        Policy::classic(&cfg.leaf_tag)
    } else {
        Policy::tagged(&cfg.leaf_tag, &cfg.branch_tag)
    }
}

/// A handle for instructing the [`ProofApi`] to shut down.
///
/// It is returned along with its related `ProofApi` from [`ProofApi::from_config`]. The
/// `ProofApi` will begin to shut down as soon as [`ShutdownHandle::shutdown`] is called or
/// when the `ShutdownHandle` is dropped.
pub struct ShutdownHandle {
    token: CancellationToken,
}

impl ShutdownHandle {
    #[must_use]
    fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Returns a clone of the wrapped cancellation token.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Consumes `self` and cancels the wrapped cancellation token.
    pub fn shutdown(self) {
        self.token.cancel();
    }
}

impl Drop for ShutdownHandle {
    #[instrument(skip_all)]
    fn drop(&mut self) {
        if !self.token.is_cancelled() {
            info!("shutdown handle dropped, issuing shutdown to all services");
        }
        self.token.cancel();
    }
}
