use crate::config::{Args, DeviceConfig, Role};
use crate::console::{Action, ScriptLine};
use crate::data_layer::{DataLayer, LocalNode};
use crate::device::{Device, DeviceHandle};
use crate::listener::Listener;
use clap::Parser;
use common::messages::GameSnapshot;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod channel;
mod config;
mod console;
mod data_layer;
mod device;
mod listener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let file_appender = tracing_appender::rolling::daily(&args.log_dir, "device.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_new(&args.log_filter)?)
        .with_writer(non_blocking)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let layer = DataLayer::new();
    let primary = Station::start(&layer, Role::Primary, args.hot_seat).await;
    let companion = Station::start(&layer, Role::Companion, args.hot_seat).await;
    info!("stations started, hot seat {}", args.hot_seat);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let ScriptLine { role, action } = match console::parse_line(&line) {
            Ok(Some(script_line)) => script_line,
            Ok(None) => continue,
            Err(err) => {
                eprintln!("skipping {:?}: {}", line, err);
                warn!("bad script line {:?}: {}", line, err);
                continue;
            }
        };
        let station = match role {
            Role::Primary => &primary,
            Role::Companion => &companion,
        };
        match action {
            Action::Tap { row, col } => station.device.tap(row, col)?,
            Action::Reset => station.device.reset()?,
            Action::Show => {
                let snapshot = station.device.snapshot().await?;
                print_snapshot(role, &snapshot, args.json)?;
            }
        }
    }

    primary.stop(&layer).await;
    companion.stop(&layer).await;
    Ok(())
}

fn print_snapshot(role: Role, snapshot: &GameSnapshot, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(snapshot)?);
        return Ok(());
    }
    println!("[{}]", role);
    println!("{}", snapshot.board);
    println!("{}", snapshot.status);
    if let Some(peer_status) = &snapshot.peer_status {
        println!("peer: {}", peer_status);
    }
    Ok(())
}

// One device with its node on the data layer and its delivery pump
struct Station {
    role: Role,
    node: LocalNode,
    device: DeviceHandle,
    listener: Listener,
    device_task: JoinHandle<()>,
    pump_task: JoinHandle<()>,
}

impl Station {
    async fn start(layer: &DataLayer, role: Role, hot_seat: bool) -> Self {
        let config = DeviceConfig::for_role(role, hot_seat);
        let paired = config.is_paired();
        let (node, inbox) = layer.join().await;
        let (device, device_task) = Device::new(config, Arc::new(node.clone())).spawn();

        let listener = Listener::new();
        if paired {
            listener.attach(&device);
        }
        let pump_task = tokio::spawn(listener::listen(inbox, listener.clone()));

        Station {
            role,
            node,
            device,
            listener,
            device_task,
            pump_task,
        }
    }

    async fn stop(self, layer: &DataLayer) {
        self.listener.detach();
        layer.leave(self.node.id()).await;
        drop(self.device);

        if let Err(err) = self.pump_task.await {
            error!("{} listener failed: {}", self.role, err);
        }
        if let Err(err) = self.device_task.await {
            error!("{} device failed: {}", self.role, err);
        }
        info!("{} stopped", self.role);
    }
}
