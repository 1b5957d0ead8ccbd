//! Print what shairport-sync is playing
//!
//! ```text
//! cargo run --example now_playing                      # default pipe
//! cargo run --example now_playing -- /path/to/pipe
//! cargo run --example now_playing -- udp 127.0.0.1:5555
//! ```

use std::time::Duration;

use shairport_metadata::types::{DatagramConfig, PipeConfig};
use shairport_metadata::{DacpCommand, ListenerConfig, ListenerEvent, MetadataListener};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let builder = match args.as_slice() {
        [mode, addr] if mode == "udp" => {
            ListenerConfig::builder().datagram(DatagramConfig::new(addr.parse()?))
        }
        [path] => ListenerConfig::builder().pipe(PipeConfig::new(path)),
        _ => ListenerConfig::builder(),
    };

    let listener = MetadataListener::start(builder.build()?).await?;
    let mut events = listener.subscribe();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => {
                let Ok(event) = event else { break };
                match event {
                    ListenerEvent::Connected { user_agent, client_name } => {
                        println!("Connected: {} ({})",
                            client_name.unwrap_or_default(),
                            user_agent.unwrap_or_default());
                    }
                    ListenerEvent::Disconnected => println!("Disconnected"),
                    ListenerEvent::TrackInfoChanged(track) => {
                        println!("Now playing: {} - {} [{}]",
                            track.artist().unwrap_or("?"),
                            track.title().unwrap_or("?"),
                            track.album().unwrap_or("?"));
                    }
                    ListenerEvent::PlaybackPhaseChanged(phase) => println!("State: {phase}"),
                    ListenerEvent::ProgressChanged(progress) => {
                        println!("Progress: {:.0}s / {:.0}s",
                            progress.position_secs, progress.duration_secs);
                    }
                    ListenerEvent::VolumeChanged(volume) => {
                        println!("Volume: {:.0}%{}",
                            volume.level * 100.0,
                            if volume.muted { " (muted)" } else { "" });
                    }
                    ListenerEvent::ArtworkChanged(Some(path)) => {
                        println!("Artwork: {}", path.display());
                    }
                    ListenerEvent::RemoteControlReady { device_id, .. } => {
                        println!("Looking for remote control of {device_id}...");
                        match listener.remote(Duration::from_secs(5)).await {
                            Ok(Some(remote)) => {
                                println!("Remote control at {}", remote.endpoint());
                                for command in DacpCommand::ALL {
                                    println!("  {:<14} {}", command.wire_name(), command.description());
                                }
                            }
                            Ok(None) => println!("Source not advertised"),
                            Err(e) => println!("Discovery failed: {e}"),
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    listener.stop().await?;
    Ok(())
}
