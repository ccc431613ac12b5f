use std::{
    net::SocketAddr,
    time::Duration,
};

use once_cell::sync::Lazy;
use reserve_eyre::eyre;
use reserve_proof_api::{
    Config,
    ProofApi,
    ShutdownHandle,
};
use tokio::task::JoinHandle;

pub const LEAF_TAG: &str = "ProofOfReserve_Leaf";
pub const BRANCH_TAG: &str = "ProofOfReserve_Branch";
pub const ACCOUNTS: &str = "1:1111,2:2222,3:3333,4:4444,5:5555,6:6666,7:7777,8:8888";

static TELEMETRY: Lazy<()> = Lazy::new(|| {
    if std::env::var_os("TEST_LOG").is_some() {
        let filter_directives = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
        telemetry::configure()
            .set_stdout_writer(std::io::stdout)
            .set_force_stdout(true)
            .set_pretty_print(true)
            .set_filter_directives(&filter_directives)
            .try_init()
            .unwrap();
    } else {
        telemetry::configure()
            .set_stdout_writer(std::io::sink)
            .try_init()
            .unwrap();
    }
});

pub struct TestProofApi {
    pub local_addr: SocketAddr,
    shutdown_handle: Option<ShutdownHandle>,
    api_task: Option<JoinHandle<eyre::Result<()>>>,
}

impl TestProofApi {
    /// Spawns the API over the default accounts with tagged branches.
    pub async fn spawn() -> Self {
        Self::spawn_with(ACCOUNTS, false).await
    }

    pub async fn spawn_with(accounts: &str, classic_branches: bool) -> Self {
        Lazy::force(&TELEMETRY);

        let cfg = Config {
            api_addr: "127.0.0.1:0".to_string(),
            accounts: accounts.to_string(),
            leaf_tag: LEAF_TAG.to_string(),
            branch_tag: BRANCH_TAG.to_string(),
            classic_branches,
            log: String::new(),
            force_stdout: false,
            pretty_print: false,
            no_metrics: true,
            metrics_http_listener_addr: String::new(),
        };
        let (proof_api, shutdown_handle) = ProofApi::from_config(&cfg).await.unwrap();
        let local_addr = proof_api.local_addr();
        let api_task = tokio::spawn(proof_api.run_until_stopped());

        Self {
            local_addr,
            shutdown_handle: Some(shutdown_handle),
            api_task: Some(api_task),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.local_addr)
    }

    pub async fn get(&self, path: &str) -> (reqwest::StatusCode, serde_json::Value) {
        let response = reqwest::get(self.url(path))
            .await
            .expect("the API must be reachable");
        let status = response.status();
        let body = response
            .json()
            .await
            .expect("the API must always respond with JSON");
        (status, body)
    }

    /// Shuts the API down and waits for it to stop.
    pub async fn shutdown(mut self) {
        if let Some(shutdown_handle) = self.shutdown_handle.take() {
            shutdown_handle.shutdown();
        }
        if let Some(api_task) = self.api_task.take() {
            tokio::time::timeout(Duration::from_secs(5), api_task)
                .await
                .expect("the API must shut down within 5 seconds")
                .expect("the API task must not panic")
                .expect("the API must shut down without error");
        }
    }
}

impl Drop for TestProofApi {
    fn drop(&mut self) {
        if let Some(api_task) = self.api_task.take() {
            api_task.abort();
        }
    }
}
