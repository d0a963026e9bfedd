use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info};
use voicechat_client::{
    create_router, AppState, BroadcastSink, Config, HttpAgentApi, NatsTransport, SessionMarker,
    UiEvent, VoiceChatClient,
};

#[derive(Parser, Debug)]
#[command(about = "Voice chat client for a server-side conversational agent")]
struct Args {
    /// Configuration file (extension optional)
    #[arg(long, default_value = "config/voicechat")]
    config: String,

    /// Start the agent as soon as the room is joined
    #[arg(long)]
    auto_start: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("Loaded config: {}", cfg.service.name);

    let identity = cfg.identity();
    let snapshot = cfg.snapshot(&identity)?;

    info!(
        "Room {} as {} (agent {})",
        identity.room_id, identity.user_id, identity.agent_id
    );

    let transport = Arc::new(
        NatsTransport::connect(
            &cfg.rtc.nats_url,
            identity.room_id.clone(),
            identity.user_id.clone(),
        )
        .await?,
    );

    let agent_api = Arc::new(
        HttpAgentApi::new(
            &cfg.agent_api.base_url,
            &cfg.agent_api.version,
            Duration::from_secs(cfg.agent_api.timeout_secs),
        )
        .context("Failed to build agent API client")?,
    );

    let sink = Arc::new(BroadcastSink::default());
    let mut events = sink.subscribe();

    let client = Arc::new(VoiceChatClient::new(
        identity,
        transport,
        agent_api,
        sink.clone(),
        SessionMarker::new(&cfg.state.marker_path),
    ));

    // Live subtitles on the console
    tokio::spawn(async move {
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    info!("Console fell behind, skipped {} events", skipped);
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            match event {
                UiEvent::UserMessage { text, definite, .. }
                | UiEvent::AiMessage { text, definite, .. } => {
                    if definite {
                        println!("\r{}", text);
                    } else {
                        print!("\r{}", text);
                        std::io::stdout().flush().ok();
                    }
                }
                UiEvent::StatusUpdate { status, .. } => info!("Agent status: {:?}", status),
                UiEvent::SpeakingUpdate { .. } => {}
            }
        }
    });

    client.join_room().await?;

    if args.auto_start {
        if let Err(e) = client.start_agent(snapshot.clone()).await {
            error!("Auto-start failed: {}", e);
        }
    }

    let app = create_router(AppState::new(Arc::clone(&client), snapshot, sink));
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP control API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down");
        })
        .await?;

    if let Err(e) = client.leave_room().await {
        error!("Failed to leave room cleanly: {}", e);
    }

    Ok(())
}
