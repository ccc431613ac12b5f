//! Reads a service configuration from prefixed environment variables.
//!
//! Every field of the config maps to an environment variable named after the
//! field in upper case, prepended with [`Config::PREFIX`]. `RUST_LOG` is
//! accepted as an alias of the `log` field.
//!
//! # Example
//! ```no_run
//! use reserve_config as config;
//! use serde::{
//!     Deserialize,
//!     Serialize,
//! };
//!
//! #[derive(Clone, Debug, Serialize, Deserialize)]
//! #[serde(deny_unknown_fields)]
//! pub struct MyConfig {
//!     pub log: String,
//!     pub api_addr: std::net::SocketAddr,
//! }
//!
//! impl config::Config for MyConfig {
//!     const PREFIX: &'static str = "MY_SERVICE_";
//! }
//!
//! // Reads `MY_SERVICE_LOG` and `MY_SERVICE_API_ADDR`.
//! let config: MyConfig = config::get().unwrap();
//! ```
use serde::{
    de::DeserializeOwned,
    Serialize,
};


/// Utility function to get a config without having to import the `Config` trait.
///
/// # Errors
/// Returns an error if a field is missing or could not be parsed.
pub fn get<T: Config>() -> Result<T, figment::Error> {
    T::get()
}

pub trait Config: Serialize + DeserializeOwned {
    const PREFIX: &'static str;

    /// Reads the config from environment variables prefixed with [`Config::PREFIX`].
    ///
    /// # Errors
    /// Returns an error if a field is missing or could not be parsed.
    fn get() -> Result<Self, figment::Error> {
        Self::get_with_prefix(Self::PREFIX, _internal::Internal)
    }

    #[doc(hidden)]
    fn get_with_prefix(
        prefix: &str,
        _internal: _internal::Internal,
    ) -> Result<Self, figment::Error> {
        use figment::{
            providers::Env as FigmentEnv,
            Figment,
        };
        Figment::new()
            .merge(FigmentEnv::prefixed("RUST_").split("_").only(&["log"]))
            .merge(FigmentEnv::prefixed(prefix))
            .extract()
    }
}

#[doc(hidden)]
pub mod _internal {
    pub struct Internal;
}
