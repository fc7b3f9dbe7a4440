//! SwitchBot Bridge: standalone host for the climate sensors.
//!
//! Validates the configured credentials, discovers climate devices once,
//! then ticks every sensor until Ctrl-C. Each sensor decides on its own
//! whether a tick is worth a call against the daily request budget.

use anyhow::{Context, Result};
use tracing::{error, info};

use switchbot_bridge::adapters;
use switchbot_bridge::config::Config;
use switchbot_bridge::discovery::{poller, SensorRegistry};
use switchbot_bridge::setup;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "switchbot_bridge=info".into()),
        )
        .with_target(false)
        .init();

    info!("🌡️  SwitchBot Bridge v{}", env!("CARGO_PKG_VERSION"));
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = Config::from_env().context("Failed to load configuration")?;
    let credentials = config.credentials()?;
    info!(
        mode = credentials.mode(),
        daily_request_ceiling = config.daily_request_ceiling.get(),
        request_timeout_secs = config.request_timeout_secs,
        "Configuration loaded"
    );

    // ── Upstream Client ─────────────────────────────────────────────
    let client = adapters::from_credentials(credentials, config.request_timeout())
        .context("Failed to build upstream client")?;

    // ── Setup Check ─────────────────────────────────────────────────
    let setup_info = match setup::validate(client.as_ref()).await {
        Ok(info) => info,
        Err(e) => {
            error!(code = e.code(), "Setup failed: {}", e);
            return Err(e).context("Credential validation failed");
        }
    };
    info!(title = %setup_info.title, devices = setup_info.device_count, "Connected");

    // ── Discovery ───────────────────────────────────────────────────
    // One device-list call at startup; the quota plan reserves one slot.
    let registry =
        SensorRegistry::from_devices(client, setup_info.devices, config.daily_request_ceiling);

    let plan = *registry.plan();
    info!(
        sensors = plan.poller_count,
        interval_secs = format!("{:.2}", plan.interval_secs),
        refreshes_per_day = format!("{:.0}", plan.refreshes_per_day()),
        "Quota plan ready"
    );
    for sensor in registry.sensors() {
        info!(
            unique_id = %sensor.unique_id(),
            name = %sensor.name(),
            unit = sensor.unit_of_measurement(),
            "Sensor registered"
        );
    }

    // ── Poll Loop ───────────────────────────────────────────────────
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("SwitchBot Bridge ready, polling until Ctrl-C");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let mut sensors = registry.into_sensors();
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };
    poller::run_poller(&mut sensors, config.tick_interval(), shutdown).await;

    for sensor in &sensors {
        let snapshot = serde_json::to_string(&sensor.snapshot()).unwrap_or_default();
        info!(sensor = %snapshot, "Final state");
    }

    Ok(())
}
