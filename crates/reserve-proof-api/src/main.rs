use std::process::ExitCode;

use reserve_eyre::eyre::WrapErr as _;
use reserve_proof_api::{
    Config,
    ProofApi,
};
use tokio::signal::unix::{
    signal,
    SignalKind,
};
use tracing::{
    error,
    info,
    warn,
};

#[tokio::main]
async fn main() -> ExitCode {
    reserve_eyre::install().expect("reserve eyre hook must be the first hook installed");

    let cfg: Config = config::get().expect("failed to read configuration");
    eprintln!("{}", telemetry::display::json(&cfg));

    let mut telemetry_conf = telemetry::configure()
        .set_force_stdout(cfg.force_stdout)
        .set_pretty_print(cfg.pretty_print)
        .set_filter_directives(&cfg.log);

    if !cfg.no_metrics {
        telemetry_conf =
            telemetry_conf.set_metrics(&cfg.metrics_http_listener_addr, env!("CARGO_PKG_NAME"));
    }

    if let Err(e) = telemetry_conf
        .try_init()
        .wrap_err("failed to setup telemetry")
    {
        eprintln!("initializing proof of reserve API failed:\n{e:?}");
        return ExitCode::FAILURE;
    }

    info!(
        config = %telemetry::display::json(&cfg),
        "initializing proof of reserve API"
    );

    let mut sigterm = signal(SignalKind::terminate())
        .expect("setting a SIGTERM listener should always work on Unix");
    let (proof_api, shutdown_handle) = match ProofApi::from_config(&cfg).await {
        Err(error) => {
            error!(%error, "failed initializing proof of reserve API");
            return ExitCode::FAILURE;
        }
        Ok(handles) => handles,
    };
    let mut api_handle = tokio::spawn(proof_api.run_until_stopped());

    tokio::select!(
        _ = sigterm.recv() => {
            info!("received SIGTERM, issuing shutdown to all services");
            shutdown_handle.shutdown();
        }
        _ = tokio::signal::ctrl_c() => {
            info!("received SIGINT, issuing shutdown to all services");
            shutdown_handle.shutdown();
        }
        res = &mut api_handle => {
            warn!("API server stopped before a shutdown was issued");
            drop(shutdown_handle);
            return report_exit(res);
        }
    );

    report_exit(api_handle.await)
}

fn report_exit(
    outcome: Result<reserve_eyre::eyre::Result<()>, tokio::task::JoinError>,
) -> ExitCode {
    match outcome {
        Ok(Ok(())) => {
            info!("proof of reserve API stopped");
            ExitCode::SUCCESS
        }
        Ok(Err(error)) => {
            error!(%error, "proof of reserve API returned with error");
            ExitCode::FAILURE
        }
        Err(error) => {
            error!(%error, "failed to join proof of reserve API task");
            ExitCode::FAILURE
        }
    }
}
