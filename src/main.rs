use livehud::sequencer::SequencerClient;
use livehud::{
    BroadcastGateway, Hud, HudConfig, HudError, SimulatedSequencer, Tempo, create_command_channel,
    server,
};
use log::{error, info};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::LocalSet;

// Observer commands queued for the event loop before senders wait
const COMMAND_CHANNEL_CAPACITY: usize = 64;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("=== LiveHUD ===");

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = match HudConfig::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };

    let local = LocalSet::new();
    if let Err(e) = local.block_on(&runtime, run(config)) {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(config: HudConfig) -> Result<(), HudError> {
    // No DAW bridge attached: drive the display from the in-memory sequencer
    let sequencer = Rc::new(SimulatedSequencer::with_markers(
        config
            .demo_markers
            .iter()
            .map(|marker| (marker.name.clone(), marker.time)),
    ));
    if let Some(region) = sequencer.loop_silence_region() {
        info!("Silence loop between beats {} and {}", region.start, region.end);
    }
    let events = sequencer.subscribe();

    let gateway = BroadcastGateway::new(config.broadcast_capacity);
    let (command_tx, command_rx) = create_command_channel(COMMAND_CHANNEL_CAPACITY);

    let mut hud = Hud::new(Rc::clone(&sequencer), gateway.clone(), &config);
    hud.start().await?;

    let listener = TcpListener::bind(&config.listen_addr).await?;
    info!("Observers can connect on {}", listener.local_addr()?);

    tokio::task::spawn_local(async move {
        if let Err(e) = server::serve(listener, gateway, command_tx).await {
            error!("Observer server stopped: {}", e);
        }
    });

    let tempo = Tempo::new(config.demo_tempo_bpm);
    info!("Simulated playhead at {}", tempo);
    tokio::task::spawn_local(
        Rc::clone(&sequencer).drive_playhead(tempo, Duration::from_millis(config.demo_tick_ms)),
    );

    hud.run(events, command_rx).await;
    Ok(())
}
