//! Initialize telemetry in the proof of reserve services.
//!
//! # Examples
//! ```no_run
//! reserve_telemetry::configure()
//!     .set_filter_directives("info")
//!     .try_init()
//!     .expect("must be able to initialize telemetry");
//! tracing::info!("telemetry initialized");
//! ```
use std::io::IsTerminal as _;

use tracing_subscriber::{
    filter::{
        LevelFilter,
        ParseError,
    },
    layer::SubscriberExt as _,
    util::{
        SubscriberInitExt as _,
        TryInitError,
    },
    EnvFilter,
};

#[cfg(feature = "display")]
pub mod display;
#[doc(hidden)]
pub mod macros;
pub mod metrics;

/// The errors that can occur when initializing telemetry.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Error(ErrorKind);

impl Error {
    fn filter_directives(source: ParseError) -> Self {
        Self(ErrorKind::FilterDirectives(source))
    }

    fn init_subscriber(source: TryInitError) -> Self {
        Self(ErrorKind::InitSubscriber(source))
    }
}

impl From<self::metrics::Error> for Error {
    fn from(source: self::metrics::Error) -> Self {
        Self(ErrorKind::Metrics(source))
    }
}

#[derive(Debug, thiserror::Error)]
enum ErrorKind {
    #[error("failed to parse filter directives")]
    FilterDirectives(#[source] ParseError),
    #[error("failed installing global tracing subscriber")]
    InitSubscriber(#[source] TryInitError),
    #[error(transparent)]
    Metrics(self::metrics::Error),
}

#[must_use = "the telemetry config must be initialized to be useful"]
pub fn configure() -> Config {
    Config::new()
}

struct BoxedMakeWriter(Box<dyn MakeWriter + Send + Sync + 'static>);

impl BoxedMakeWriter {
    fn new<M>(make_writer: M) -> Self
    where
        M: MakeWriter + Send + Sync + 'static,
    {
        Self(Box::new(make_writer))
    }
}

/// Constructs the writer that log lines are written to.
///
/// Implemented for all closures returning an [`std::io::Write`], like
/// [`std::io::stdout`] or [`std::io::sink`].
pub trait MakeWriter {
    fn make_writer(&self) -> Box<dyn std::io::Write + Send + Sync + 'static>;
}

impl<F, W> MakeWriter for F
where
    F: Fn() -> W,
    W: std::io::Write + Send + Sync + 'static,
{
    fn make_writer(&self) -> Box<dyn std::io::Write + Send + Sync + 'static> {
        Box::new((self)())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for BoxedMakeWriter {
    type Writer = Box<dyn std::io::Write + Send + Sync + 'static>;

    fn make_writer(&'a self) -> Self::Writer {
        self.0.make_writer()
    }
}

pub struct Config {
    filter_directives: String,
    force_stdout: bool,
    pretty_print: bool,
    stdout_writer: BoxedMakeWriter,
    metrics_config_builder: Option<self::metrics::ConfigBuilder>,
}

impl Config {
    #[must_use = "telemetry must be initialized to be useful"]
    fn new() -> Self {
        Self {
            filter_directives: String::new(),
            force_stdout: false,
            pretty_print: false,
            stdout_writer: BoxedMakeWriter::new(std::io::stdout),
            metrics_config_builder: None,
        }
    }
}

impl Config {
    #[must_use = "telemetry must be initialized to be useful"]
    pub fn set_filter_directives(mut self, filter_directives: &str) -> Self {
        self.filter_directives = filter_directives.to_string();
        self
    }

    /// Writes log lines even if stdout is not a terminal.
    #[must_use = "telemetry must be initialized to be useful"]
    pub fn set_force_stdout(mut self, force_stdout: bool) -> Self {
        self.force_stdout = force_stdout;
        self
    }

    /// Writes compact, human readable lines instead of JSON.
    #[must_use = "telemetry must be initialized to be useful"]
    pub fn set_pretty_print(mut self, pretty_print: bool) -> Self {
        self.pretty_print = pretty_print;
        self
    }

    #[must_use = "telemetry must be initialized to be useful"]
    pub fn set_stdout_writer<M>(mut self, stdout_writer: M) -> Self
    where
        M: MakeWriter + Send + Sync + 'static,
    {
        self.stdout_writer = BoxedMakeWriter::new(stdout_writer);
        self
    }

    /// Serves prometheus metrics at `listening_addr`, labeled with `service_name`.
    #[must_use = "telemetry must be initialized to be useful"]
    pub fn set_metrics(mut self, listening_addr: &str, service_name: &str) -> Self {
        let config_builder = self::metrics::ConfigBuilder::new()
            .set_service_name(service_name)
            .set_listening_address(listening_addr);
        self.metrics_config_builder = Some(config_builder);
        self
    }

    /// Initialize telemetry, consuming the config.
    ///
    /// Metrics are only exported if [`Config::set_metrics`] was called. This
    /// must then be called from within a tokio runtime.
    ///
    /// # Errors
    /// Fails if the filter directives could not be parsed, if the global
    /// tracing subscriber could not be installed, or if the metrics exporter
    /// could not be started.
    pub fn try_init(self) -> Result<(), Error> {
        let Self {
            filter_directives,
            force_stdout,
            pretty_print,
            stdout_writer,
            metrics_config_builder,
        } = self;

        let env_filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .parse(filter_directives)
            .map_err(Error::filter_directives)?;

        let mut json_printer = None;
        let mut pretty_printer = None;
        if force_stdout || std::io::stdout().is_terminal() {
            if pretty_print {
                pretty_printer = Some(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_writer(stdout_writer),
                );
            } else {
                json_printer = Some(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .flatten_event(true)
                        .with_current_span(true)
                        .with_writer(stdout_writer),
                );
            }
        }

        tracing_subscriber::registry()
            .with(json_printer)
            .with(pretty_printer)
            .with(env_filter)
            .try_init()
            .map_err(Error::init_subscriber)?;

        if let Some(config_builder) = metrics_config_builder {
            config_builder.build()?;
        }

        Ok(())
    }
}
