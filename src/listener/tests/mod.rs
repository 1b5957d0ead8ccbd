use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::ThreadId;
use std::time::Duration;

use bytes::Bytes;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

use super::{ChannelSource, DatagramSource, MetadataListener};
use crate::daemon::ReceiverDaemon;
use crate::error::MetadataError;
use crate::protocol::framing::{DatagramFramer, PipeFramer};
use crate::state::ListenerEvent;
use crate::types::{DatagramConfig, ListenerConfig, PlaybackPhase};

fn config(dir: &tempfile::TempDir) -> ListenerConfig {
    ListenerConfig::builder()
        .artwork_dir(dir.path())
        .build()
        .unwrap()
}

fn datagram(category: &[u8; 4], code: &[u8; 4], payload: &[u8]) -> Bytes {
    let mut out = Vec::new();
    out.extend_from_slice(category);
    out.extend_from_slice(code);
    out.extend_from_slice(payload);
    Bytes::from(out)
}

async fn next_event(rx: &mut tokio::sync::broadcast::Receiver<ListenerEvent>) -> ListenerEvent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for event")
        .unwrap()
}

fn channel_listener(dir: &tempfile::TempDir) -> (mpsc::Sender<Bytes>, MetadataListener) {
    let (tx, source) = ChannelSource::channel(16);
    let listener = MetadataListener::spawn_with(config(dir), source, DatagramFramer::new());
    (tx, listener)
}

#[tokio::test]
async fn test_channel_source_session() {
    let dir = tempfile::tempdir().unwrap();
    let (tx, listener) = channel_listener(&dir);
    let mut events = listener.subscribe();

    tx.send(datagram(b"ssnc", b"snua", b"AirPlay/371.4.7"))
        .await
        .unwrap();

    assert_eq!(
        next_event(&mut events).await,
        ListenerEvent::Connected {
            user_agent: Some("AirPlay/371.4.7".to_string()),
            client_name: None,
        }
    );
    assert!(matches!(
        next_event(&mut events).await,
        ListenerEvent::ItemReceived(_)
    ));

    let state = listener.state();
    assert!(state.connected);
    assert_eq!(state.user_agent.as_deref(), Some("AirPlay/371.4.7"));
}

#[tokio::test]
async fn test_track_info_published_before_event() {
    let dir = tempfile::tempdir().unwrap();
    let (tx, listener) = channel_listener(&dir);
    let mut filter = listener.filter(|e| matches!(e, ListenerEvent::TrackInfoChanged(_)));

    tx.send(datagram(b"ssnc", b"mdst", b"")).await.unwrap();
    tx.send(datagram(b"core", b"minm", b"Song")).await.unwrap();
    tx.send(datagram(b"core", b"asar", b"Artist")).await.unwrap();
    tx.send(datagram(b"ssnc", b"mden", b"")).await.unwrap();

    let event = tokio::time::timeout(Duration::from_secs(2), filter.recv())
        .await
        .unwrap()
        .unwrap();
    let ListenerEvent::TrackInfoChanged(track) = event else {
        panic!("expected track info");
    };
    assert_eq!(track.title(), Some("Song"));
    assert_eq!(track.artist(), Some("Artist"));
    assert_eq!(listener.state().track_info, track);
}

#[tokio::test]
async fn test_watch_follows_playback_phase() {
    let dir = tempfile::tempdir().unwrap();
    let (tx, listener) = channel_listener(&dir);
    let mut watch = listener.watch();

    tx.send(datagram(b"ssnc", b"pbeg", b"")).await.unwrap();
    tx.send(datagram(b"ssnc", b"prsm", b"")).await.unwrap();
    tx.send(datagram(b"ssnc", b"prgr", b"1000/45100/2000000"))
        .await
        .unwrap();

    tokio::time::timeout(
        Duration::from_secs(2),
        watch.wait_for(|state| state.phase == PlaybackPhase::Playing),
    )
    .await
    .unwrap()
    .unwrap();

    let state = listener.state();
    assert!((state.progress.position_secs - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_source_closed_ends_task() {
    let dir = tempfile::tempdir().unwrap();
    let (tx, listener) = channel_listener(&dir);
    assert!(listener.is_running());

    drop(tx);
    tokio::time::timeout(Duration::from_secs(2), async {
        while listener.is_running() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    listener.stop().await.unwrap();
}

#[tokio::test]
async fn test_stop_cancels_pending_read() {
    let dir = tempfile::tempdir().unwrap();
    let (_tx, listener) = channel_listener(&dir);

    tokio::time::timeout(Duration::from_secs(2), listener.stop())
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_remote_needs_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let (_tx, listener) = channel_listener(&dir);

    let result = listener.remote(Duration::from_millis(10)).await;
    assert!(matches!(result, Err(MetadataError::RemoteUnavailable)));
}

#[tokio::test]
async fn test_pipe_text_over_channel() {
    let dir = tempfile::tempdir().unwrap();
    let (tx, source) = ChannelSource::channel(4);
    let listener = MetadataListener::spawn_with(config(&dir), source, PipeFramer::new());
    let mut events = listener.subscribe();

    // Record split across two frames
    tx.send(Bytes::from_static(
        b"<item><type>73736e63</type><code>736e616d</code><length>6</length>\n",
    ))
    .await
    .unwrap();
    tx.send(Bytes::from_static(
        b"<data encoding=\"base64\">aVBob25l</data></item>\n",
    ))
    .await
    .unwrap();

    assert_eq!(
        next_event(&mut events).await,
        ListenerEvent::Connected {
            user_agent: None,
            client_name: Some("iPhone".to_string()),
        }
    );
}

#[tokio::test]
async fn test_datagram_source() {
    let dir = tempfile::tempdir().unwrap();
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let source = DatagramSource::from_socket(socket, 65000);
    let addr = source.local_addr().unwrap();

    let listener = MetadataListener::spawn_with(config(&dir), source, DatagramFramer::new());
    let mut events = listener.subscribe();

    let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    sender.send_to(b"ssncpend", addr).await.unwrap();

    assert!(matches!(
        next_event(&mut events).await,
        ListenerEvent::ItemReceived(_)
    ));
}

#[tokio::test]
async fn test_start_binds_datagram_socket() {
    let dir = tempfile::tempdir().unwrap();
    let config = ListenerConfig::builder()
        .datagram(DatagramConfig::new("127.0.0.1:0".parse().unwrap()))
        .artwork_dir(dir.path())
        .build()
        .unwrap();

    let listener = MetadataListener::start(config).await.unwrap();
    assert!(listener.is_running());
    listener.stop().await.unwrap();
}

#[tokio::test]
async fn test_start_rejects_invalid_config() {
    let config = ListenerConfig {
        sample_rate: 0,
        ..ListenerConfig::default()
    };

    let result = MetadataListener::start(config).await;
    assert!(matches!(
        result,
        Err(MetadataError::InvalidConfig {
            name: "sample_rate",
            ..
        })
    ));
}

#[derive(Default)]
struct FakeDaemon {
    fail_start: bool,
    started: AtomicUsize,
    stopped: AtomicUsize,
    threads: Mutex<Vec<ThreadId>>,
}

impl ReceiverDaemon for FakeDaemon {
    fn start(&self) -> crate::Result<()> {
        self.threads.lock().unwrap().push(std::thread::current().id());
        if self.fail_start {
            return Err(MetadataError::Daemon {
                message: "not installed".to_string(),
            });
        }
        self.started.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) -> crate::Result<()> {
        self.threads.lock().unwrap().push(std::thread::current().id());
        self.stopped.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn datagram_config(dir: &tempfile::TempDir) -> ListenerConfig {
    ListenerConfig::builder()
        .datagram(DatagramConfig::new("127.0.0.1:0".parse().unwrap()))
        .artwork_dir(dir.path())
        .manage_daemon(true)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_managed_daemon_stopped_with_listener() {
    let dir = tempfile::tempdir().unwrap();
    let daemon = Arc::new(FakeDaemon::default());

    let managed: Arc<dyn ReceiverDaemon> = daemon.clone();
    let listener = MetadataListener::start_with_daemon(datagram_config(&dir), Some(managed))
        .await
        .unwrap();
    assert_eq!(daemon.started.load(Ordering::SeqCst), 1);

    listener.stop().await.unwrap();
    assert_eq!(daemon.stopped.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_daemon_start_failure_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let daemon = Arc::new(FakeDaemon {
        fail_start: true,
        ..FakeDaemon::default()
    });

    let managed: Arc<dyn ReceiverDaemon> = daemon.clone();
    let listener = MetadataListener::start_with_daemon(datagram_config(&dir), Some(managed))
        .await
        .unwrap();
    assert!(listener.is_running());

    listener.stop().await.unwrap();
    assert_eq!(daemon.stopped.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_daemon_commands_run_off_runtime_thread() {
    let dir = tempfile::tempdir().unwrap();
    let daemon = Arc::new(FakeDaemon::default());

    let managed: Arc<dyn ReceiverDaemon> = daemon.clone();
    let listener = MetadataListener::start_with_daemon(datagram_config(&dir), Some(managed))
        .await
        .unwrap();
    listener.stop().await.unwrap();

    let runtime_thread = std::thread::current().id();
    let threads = daemon.threads.lock().unwrap();
    assert_eq!(threads.len(), 2);
    assert!(threads.iter().all(|id| *id != runtime_thread));
}

#[tokio::test]
async fn test_artwork_written_by_listener() {
    let dir = tempfile::tempdir().unwrap();
    let (tx, listener) = channel_listener(&dir);
    let mut filter = listener.filter(|e| matches!(e, ListenerEvent::ArtworkChanged(Some(_))));

    tx.send(datagram(b"ssnc", b"pcst", b"")).await.unwrap();
    tx.send(datagram(b"ssnc", b"PICT", b"\xff\xd8\xff\xe0jpeg"))
        .await
        .unwrap();
    tx.send(datagram(b"ssnc", b"pcen", b"")).await.unwrap();

    let event = tokio::time::timeout(Duration::from_secs(2), filter.recv())
        .await
        .unwrap()
        .unwrap();
    let ListenerEvent::ArtworkChanged(Some(path)) = event else {
        panic!("expected artwork");
    };
    assert!(path.starts_with(dir.path()));
    assert_eq!(std::fs::read(&path).unwrap(), b"\xff\xd8\xff\xe0jpeg");

    listener.stop().await.unwrap();
}
