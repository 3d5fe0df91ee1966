use anyhow::Result;
use spotova::Config;
use spotova::instance::InstanceLock;
use spotova::prices::{HttpPriceSource, PriceCoordinator, PriceService};
use spotova::sensor::{SensorSet, sensor_specs};
use spotova::web::AppState;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;
    config.validate()?;

    spotova::logging::init_logging(&config.logging)?;
    info!("Spotova price poller starting up ({})", env!("APP_VERSION"));

    let _lock = if config.instance.lock_file.trim().is_empty() {
        None
    } else {
        Some(InstanceLock::acquire(&config.instance.lock_file)?)
    };

    let source = Arc::new(HttpPriceSource::new(&config.api)?);
    let coordinator = PriceCoordinator::new(source, &config)?;
    let (service, handle) = PriceService::new(
        coordinator,
        Duration::from_secs(config.coordinator.poll_interval_secs),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let web_task = if config.web.enabled {
        let state = AppState {
            coordinator: handle.clone(),
            sensors: Arc::new(SensorSet::new(
                sensor_specs(&config.sensors),
                config.unit_label(),
            )),
            config: Arc::new(config.clone()),
        };
        let (host, port) = (config.web.host.clone(), config.web.port);
        Some(tokio::spawn(async move {
            if let Err(e) = spotova::web::serve(state, &host, port).await {
                error!("Web server error: {}", e);
            }
        }))
    } else {
        None
    };

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    let outcome = service.run(shutdown_rx).await;
    if let Some(task) = web_task {
        task.abort();
    }

    match outcome {
        Ok(()) => {
            info!("Poller shutdown complete");
            Ok(())
        }
        Err(e) => {
            error!("Poller failed with error: {}", e);
            Err(anyhow::anyhow!("Poller error: {}", e))
        }
    }
}
