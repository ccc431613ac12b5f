//! Exports metrics recorded through the [`metrics`](::metrics) facade to prometheus.
//!
//! Services record metrics with `metrics::counter!` and friends, naming them
//! with [`metric_name!`](crate::metric_name). Until an exporter is installed
//! those calls are no-ops.
use std::net::{
    AddrParseError,
    SocketAddr,
};

use metrics_exporter_prometheus::{
    BuildError,
    PrometheusBuilder,
};

/// The errors that can occur when starting the metrics exporter.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse metrics listening address `{address}`")]
    ListeningAddress {
        address: String,
        #[source]
        source: AddrParseError,
    },
    #[error("failed to install the prometheus exporter")]
    Install(#[source] BuildError),
}

/// Gathers the settings of the prometheus exporter.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    service_name: String,
    listening_address: String,
}

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All metrics will have a label applied of `service="<service_name>"`.
    ///
    /// If `service_name` is empty, the label is not applied.
    #[must_use]
    pub fn set_service_name(mut self, service_name: &str) -> Self {
        self.service_name = service_name.to_string();
        self
    }

    /// Sets the address the exporter serves `/metrics` on.
    #[must_use]
    pub fn set_listening_address(mut self, listening_address: &str) -> Self {
        self.listening_address = listening_address.to_string();
        self
    }

    /// Installs the global recorder and spawns the exporter's http server.
    ///
    /// # Errors
    /// Fails if the listening address is not a socket address or if a global
    /// recorder was already installed.
    pub fn build(self) -> Result<(), Error> {
        let Self {
            service_name,
            listening_address,
        } = self;
        let socket_addr: SocketAddr =
            listening_address
                .parse()
                .map_err(|source| Error::ListeningAddress {
                    address: listening_address.clone(),
                    source,
                })?;
        let mut builder = PrometheusBuilder::new().with_http_listener(socket_addr);
        if !service_name.is_empty() {
            builder = builder.add_global_label("service", service_name);
        }
        builder.install().map_err(Error::Install)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_listening_address_is_rejected() {
        let error = ConfigBuilder::new()
            .set_service_name("reserve-proof-api")
            .set_listening_address("not an address")
            .build()
            .unwrap_err();
        assert!(matches!(error, Error::ListeningAddress { .. }));
    }
}
