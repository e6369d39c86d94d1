use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::Context;
use chrono::Local;
use greenhouse_common::{ClientConfig, Device, Override};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::{
    client::{ClientError, CommandSink, RemoteClient},
    poller::Poller,
    reconciler::Reconciler,
    render::{render_intents, render_snapshot},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Toggle(Device),
    Override(Override),
    ShowState,
    Quit,
}

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = load_config().await;
    let client = Arc::new(RemoteClient::new(&config).context("failed to build http client")?);
    info!(
        remote = client.base_url(),
        poll_interval_ms = config.poll_interval_ms,
        request_timeout_ms = config.request_timeout_ms,
        "greenhouse monitor starting"
    );

    let mut poller = Poller::new(client.clone());
    poller
        .start(
            Duration::from_millis(config.poll_interval_ms),
            |snapshot| {
                for line in render_snapshot(&snapshot, &Local::now()) {
                    info!("{line}");
                }
            },
            |err| match &err {
                ClientError::Decode(decode) => warn!(
                    field = decode.field().unwrap_or("-"),
                    "capteur indisponible: {err}"
                ),
                _ => warn!("capteur indisponible: {err}"),
            },
        )
        .await?;

    let reconciler = Reconciler::new(client);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(err) => {
                        warn!("stdin read failed: {err}");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Some(Command::Quit) => break,
                    Some(command) => execute(&reconciler, command).await,
                    None => warn!(
                        "unknown command {:?} (humidifier, ventilation, leds, stop, auto, state, quit)",
                        line.trim()
                    ),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received");
                break;
            }
        }
    }

    poller.stop().await;
    poller.join().await;
    info!(state = ?poller.state().await, "greenhouse monitor stopped");
    Ok(())
}

async fn execute<C: CommandSink>(reconciler: &Reconciler<C>, command: Command) {
    match command {
        Command::Toggle(device) => match reconciler.toggle(device).await {
            Ok(outcome) => info!(
                device = outcome.device.as_str(),
                intent = outcome.intent.as_str(),
                "{} [{}]",
                outcome.status_label,
                outcome.button_label
            ),
            Err(err) => warn!("Erreur : {err}"),
        },
        Command::Override(action) => match reconciler.trigger(action).await {
            Ok(message) => info!("{message}"),
            Err(err) => warn!("Erreur : {err}"),
        },
        Command::ShowState => {
            for line in render_intents(&reconciler.intents().await) {
                info!("{line}");
            }
        }
        Command::Quit => {}
    }
}

fn parse_command(line: &str) -> Option<Command> {
    let word = line.trim().to_ascii_lowercase();
    if let Some(device) = Device::parse(&word) {
        return Some(Command::Toggle(device));
    }
    match word.as_str() {
        "stop" => Some(Command::Override(Override::EmergencyStop)),
        "auto" => Some(Command::Override(Override::AutoMode)),
        "state" => Some(Command::ShowState),
        "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

async fn load_config() -> ClientConfig {
    let path = std::env::var("GREENHOUSE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./greenhouse.json"));

    let mut config = match read_config_file(&path).await {
        Ok(config) => config,
        Err(err) => {
            warn!("failed to load config from {}: {err:#}", path.display());
            ClientConfig::default()
        }
    };

    if let Ok(addr) = std::env::var("GREENHOUSE_ADDR") {
        config.remote_addr = addr;
    }
    if let Some(ms) = env_u64("GREENHOUSE_POLL_MS") {
        config.poll_interval_ms = ms;
    }
    if let Some(ms) = env_u64("GREENHOUSE_TIMEOUT_MS") {
        config.request_timeout_ms = ms;
    }

    config.sanitize();
    config
}

async fn read_config_file(path: &Path) -> anyhow::Result<ClientConfig> {
    match tokio::fs::read(path).await {
        Ok(raw) => Ok(serde_json::from_slice::<ClientConfig>(&raw)?),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(ClientConfig::default()),
        Err(err) => Err(err.into()),
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
}
