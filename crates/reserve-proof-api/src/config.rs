use serde::{
    Deserialize,
    Serialize,
};

#[expect(
    clippy::struct_excessive_bools,
    reason = "This is used as a container for deserialization. Making this a builder-pattern is \
              not actionable"
)]
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
/// The single config for creating the proof of reserve API.
pub struct Config {
    /// The socket address at which the API is served.
    pub api_addr: String,
    /// The committed accounts as comma separated `<id>:<balance>` pairs.
    pub accounts: String,
    /// The domain tag under which leaves are hashed.
    pub leaf_tag: String,
    /// The domain tag under which branches are hashed, unless `classic_branches` is set.
    pub branch_tag: String,
    /// Hash branches with double SHA256 instead of a tagged hash.
    pub classic_branches: bool,
    pub log: String,
    /// Forces writing trace data to stdout no matter if connected to a tty or not.
    pub force_stdout: bool,
    /// Writes a human readable format to stdout instead of JSON formatted trace data.
    pub pretty_print: bool,
    /// Set to true to disable the metrics server
    pub no_metrics: bool,
    /// The endpoint which will be listened on for serving prometheus metrics
    pub metrics_http_listener_addr: String,
}

impl config::Config for Config {
    const PREFIX: &'static str = "RESERVE_PROOF_API_";
}
