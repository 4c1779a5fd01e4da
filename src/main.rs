use std::{net::TcpListener, time::Duration};

use actix_web::web;
use anyhow::Context;
use distress_scan::{
    configuration::get_configuration,
    domain::scan::ScanReport,
    services::{
        findings_persistance_handler, scan_scheduler_handler, LatestScan, RegistryClient,
        ScanOptions, ScanSchedule,
    },
    startup::run,
};
use env_logger::Env;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration()
        .and_then(|c| c.validate())
        .context("Failed to read configuration.")?;

    let pool_options = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(15 * 60)); // 15 minutes

    let connection_pool = pool_options.connect_lazy_with(configuration.database.with_db());
    if let Err(e) = sqlx::migrate!("./migrations").run(&connection_pool).await {
        log::error!("Failed to run migrations, findings will not be stored: {:?}", e);
    }

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener =
        TcpListener::bind(&address).with_context(|| format!("Failed to bind {}", address))?;

    let registry = RegistryClient::new(&configuration.registry)
        .context("Failed to build registry client")?;
    let schedule = ScanSchedule {
        codes: configuration.scan.codes(),
        options: ScanOptions::from_settings(&configuration.registry, &configuration.scan),
        interval: configuration.scan.interval(),
    };
    let latest_scan = web::Data::new(LatestScan::default());

    let (report_sender, report_receiver) = mpsc::unbounded_channel::<ScanReport>();

    // Spawn backgound tasks
    tokio::spawn(async move { scan_scheduler_handler(registry, schedule, report_sender).await });

    let latest_clone = latest_scan.clone();
    let pool_clone = connection_pool.clone();
    tokio::spawn(async move {
        findings_persistance_handler(report_receiver, latest_clone, pool_clone).await
    });

    run(listener, latest_scan)?.await?;

    Ok(())
}
