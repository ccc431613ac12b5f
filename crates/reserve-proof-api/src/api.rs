use std::{
    future::{
        Future,
        IntoFuture as _,
    },
    net::SocketAddr,
    sync::Arc,
    time::Instant,
};

use axum::{
    extract::{
        FromRef,
        Path,
        State,
    },
    response::{
        IntoResponse,
        Response,
    },
    routing::get,
    Json,
    Router,
};
use futures::FutureExt as _;
use http::status::StatusCode;
use merkle::Proof;
use reserve_eyre::eyre::{
    self,
    WrapErr as _,
};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{
    info,
    instrument,
    warn,
};

use crate::{
    commitment::Commitment,
    metrics::Metrics,
};

/// A future wrapping a type-erased [`axum::serve::Serve`].
pub(crate) struct Serve {
    local_addr: SocketAddr,
    fut: futures::future::BoxFuture<'static, std::io::Result<()>>,
}

impl Serve {
    pub(crate) fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl Future for Serve {
    type Output = std::io::Result<()>;

    fn poll(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Self::Output> {
        self.fut.as_mut().poll(cx)
    }
}

#[derive(Clone)]
/// `AppState` is used for as an axum extractor in its method handlers.
struct AppState {
    commitment: Arc<Commitment>,
    metrics: Arc<Metrics>,
}

impl FromRef<AppState> for Arc<Commitment> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.commitment.clone()
    }
}

impl FromRef<AppState> for Arc<Metrics> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.metrics.clone()
    }
}

pub(crate) async fn serve(
    socket_addr: SocketAddr,
    commitment: Arc<Commitment>,
    metrics: Arc<Metrics>,
    shutdown_token: CancellationToken,
) -> eyre::Result<Serve> {
    let app = Router::new()
        .route("/healthz", get(get_healthz))
        .route("/merkle-root", get(get_merkle_root))
        .route("/merkle-proof/:user_id", get(get_merkle_proof))
        .with_state(AppState {
            commitment,
            metrics,
        });
    let listener = tokio::net::TcpListener::bind(socket_addr)
        .await
        .wrap_err_with(|| format!("failed to bind TCP socket at `{socket_addr}`"))?;
    let serve = axum::serve(listener, app).with_graceful_shutdown(shutdown_token.cancelled_owned());
    let local_addr = serve
        .local_addr()
        .wrap_err("bound TCP listener failed to produce local addr")?;

    Ok(Serve {
        local_addr,
        fut: serve.into_future().boxed(),
    })
}

#[instrument(skip_all)]
async fn get_healthz() -> Healthz {
    Healthz::Ok
}

#[instrument(skip_all)]
async fn get_merkle_root(
    State(commitment): State<Arc<Commitment>>,
    State(metrics): State<Arc<Metrics>>,
) -> MerkleRoot {
    metrics.increment_root_requests();
    info!("received request for merkle root");
    MerkleRoot {
        merkle_root: commitment.root_hex(),
    }
}

/// Handler of a call to `/merkle-proof/:user_id`.
///
/// The user id must be a non-negative integer. The proof is read out of the
/// tree held by the [`Commitment`].
#[instrument(skip_all)]
async fn get_merkle_proof(
    State(commitment): State<Arc<Commitment>>,
    State(metrics): State<Arc<Metrics>>,
    Path(user_id): Path<String>,
) -> MerkleProofResponse {
    metrics.increment_proof_requests();
    info!(%user_id, "received request for merkle proof");

    let Ok(id) = user_id.parse::<u64>() else {
        metrics.increment_proof_request_rejections();
        info!(%user_id, "rejected proof request: user id is not a number");
        return MerkleProofResponse::MalformedUserId;
    };
    let Some(account) = commitment.account(id) else {
        metrics.increment_proof_request_rejections();
        info!(user_id = id, "rejected proof request: user not found");
        return MerkleProofResponse::UserNotFound;
    };

    let start = Instant::now();
    let result = commitment.prove(account);
    metrics.record_proof_generation_latency(start.elapsed());
    match result {
        Ok(Some(proof)) => {
            let (user_balance, proof) = proof.into_parts();
            info!(
                user_id = id,
                path_len = proof.len(),
                "served merkle proof"
            );
            MerkleProofResponse::Ok {
                user_balance,
                path: proof,
            }
        }
        Ok(None) => {
            metrics.increment_proof_generation_failures();
            warn!("committed leaves did not contain the leaf of a known account");
            MerkleProofResponse::ProofUnavailable
        }
        Err(error) => {
            metrics.increment_proof_generation_failures();
            warn!(%error, "failed to read balance back from committed leaf");
            MerkleProofResponse::ProofUnavailable
        }
    }
}

enum Healthz {
    Ok,
}

impl IntoResponse for Healthz {
    fn into_response(self) -> Response {
        #[derive(Debug, Serialize)]
        struct HealthzBody {
            status: &'static str,
        }
        let (status, msg) = match self {
            Self::Ok => (StatusCode::OK, "ok"),
        };
        let mut response = Json(HealthzBody {
            status: msg,
        })
        .into_response();
        *response.status_mut() = status;
        response
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MerkleRoot {
    merkle_root: String,
}

impl IntoResponse for MerkleRoot {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

enum MerkleProofResponse {
    Ok { user_balance: u64, path: Proof },
    MalformedUserId,
    UserNotFound,
    ProofUnavailable,
}

impl IntoResponse for MerkleProofResponse {
    fn into_response(self) -> Response {
        #[derive(Debug, Serialize)]
        #[serde(rename_all = "camelCase")]
        struct ProofBody {
            user_balance: u64,
            path: Proof,
        }
        #[derive(Debug, Serialize)]
        struct ErrorBody {
            error: &'static str,
        }
        let (status, error) = match self {
            Self::Ok {
                user_balance,
                path,
            } => {
                return Json(ProofBody {
                    user_balance,
                    path,
                })
                .into_response();
            }
            Self::MalformedUserId => (StatusCode::BAD_REQUEST, "User ID must be a number."),
            Self::UserNotFound => (StatusCode::NOT_FOUND, "User not found."),
            Self::ProofUnavailable => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Could not generate proof.")
            }
        };
        let mut response = Json(ErrorBody {
            error,
        })
        .into_response();
        *response.status_mut() = status;
        response
    }
}
