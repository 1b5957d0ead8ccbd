use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use shairport_metadata::listener::{DatagramSource, MetadataListener};
use shairport_metadata::protocol::framing::DatagramFramer;
use shairport_metadata::types::{DatagramConfig, ListenerConfig, PipeConfig};
use shairport_metadata::{ListenerEvent, PlaybackPhase};
use tokio::net::UdpSocket;
use tokio::sync::broadcast;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR\x00\x00\x00\x01";

fn datagram(code: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    [b"ssnc".as_slice(), code, payload].concat()
}

fn chunk(index: u32, count: u32, code: &[u8; 4], data: &[u8]) -> Vec<u8> {
    [
        b"ssncchnk".as_slice(),
        &index.to_be_bytes(),
        &count.to_be_bytes(),
        b"ssnc",
        code,
        data,
    ]
    .concat()
}

fn record(category: &[u8; 4], code: &[u8; 4], payload: &[u8]) -> String {
    let hex = |id: &[u8; 4]| id.iter().map(|b| format!("{b:02x}")).collect::<String>();
    let mut out = format!(
        "<item><type>{}</type><code>{}</code><length>{}</length>\n",
        hex(category),
        hex(code),
        payload.len()
    );
    if !payload.is_empty() {
        out.push_str(&format!(
            "<data encoding=\"base64\">\n{}</data>\n",
            STANDARD.encode(payload)
        ));
    }
    out.push_str("</item>\n");
    out
}

async fn wait_for<F>(events: &mut broadcast::Receiver<ListenerEvent>, mut matches: F) -> ListenerEvent
where
    F: FnMut(&ListenerEvent) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let event = events.recv().await.unwrap();
            if matches(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

#[tokio::test]
async fn test_datagram_listener_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let config = ListenerConfig::builder()
        .artwork_dir(dir.path())
        .build()
        .unwrap();

    let source = DatagramSource::bind(&DatagramConfig::new("127.0.0.1:0".parse().unwrap()))
        .await
        .unwrap();
    let addr = source.local_addr().unwrap();
    let listener = MetadataListener::spawn_with(config, source, DatagramFramer::new());
    let mut events = listener.subscribe();

    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let sender = &socket;
    let send = move |bytes: Vec<u8>| async move {
        sender.send_to(&bytes, addr).await.unwrap();
    };

    send(datagram(b"snua", b"AirPlay/371.4.7")).await;
    wait_for(&mut events, |e| matches!(e, ListenerEvent::Connected { .. })).await;

    // Picture in three fragments, delivered out of order
    let (head, rest) = PNG.split_at(6);
    let (middle, tail) = rest.split_at(6);
    send(datagram(b"pcst", b"")).await;
    send(chunk(2, 3, b"PICT", tail)).await;
    send(chunk(0, 3, b"PICT", head)).await;
    send(chunk(1, 3, b"PICT", middle)).await;
    send(datagram(b"pcen", b"")).await;

    let ListenerEvent::ArtworkChanged(Some(path)) =
        wait_for(&mut events, |e| matches!(e, ListenerEvent::ArtworkChanged(_))).await
    else {
        panic!("expected committed artwork");
    };
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
    assert_eq!(std::fs::read(&path).unwrap(), PNG);

    send(datagram(b"prgr", b"0/44100/441000")).await;
    send(datagram(b"prsm", b"")).await;
    wait_for(&mut events, |e| {
        matches!(e, ListenerEvent::PlaybackPhaseChanged(PlaybackPhase::Playing))
    })
    .await;

    let state = listener.state();
    assert!((state.progress.duration_secs - 10.0).abs() < 1e-9);
    assert_eq!(state.artwork.as_deref(), Some(path.as_path()));

    send(datagram(b"pend", b"")).await;
    wait_for(&mut events, |e| matches!(e, ListenerEvent::Disconnected)).await;
    assert!(!listener.state().connected);

    listener.stop().await.unwrap();
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_pipe_listener_end_to_end() {
    use nix::sys::stat::Mode;
    use std::io::Write;

    let dir = tempfile::tempdir().unwrap();
    let fifo = dir.path().join("shairport-sync-metadata");
    nix::unistd::mkfifo(&fifo, Mode::S_IRUSR | Mode::S_IWUSR).unwrap();

    let config = ListenerConfig::builder()
        .pipe(PipeConfig::new(&fifo))
        .artwork_dir(dir.path())
        .build()
        .unwrap();
    let listener = MetadataListener::start(config).await.unwrap();
    let mut events = listener.subscribe();

    let text = [
        record(b"ssnc", b"snam", b"Kitchen iPad"),
        record(b"ssnc", b"mdst", b""),
        record(b"core", b"minm", b"So What"),
        record(b"core", b"asar", b"Miles Davis"),
        record(b"core", b"asal", b"Kind of Blue"),
        record(b"ssnc", b"mden", b""),
    ]
    .concat();

    // Opening for write blocks until the listener has the read end open
    let writer = tokio::task::spawn_blocking(move || {
        let mut pipe = std::fs::OpenOptions::new().write(true).open(fifo).unwrap();
        pipe.write_all(text.as_bytes()).unwrap();
    });

    let ListenerEvent::TrackInfoChanged(track) =
        wait_for(&mut events, |e| matches!(e, ListenerEvent::TrackInfoChanged(_))).await
    else {
        unreachable!();
    };
    writer.await.unwrap();

    assert_eq!(track.title(), Some("So What"));
    assert_eq!(track.artist(), Some("Miles Davis"));
    assert_eq!(track.album(), Some("Kind of Blue"));

    let state = listener.state();
    assert_eq!(state.client_name.as_deref(), Some("Kitchen iPad"));
    assert!(state.connected);

    listener.stop().await.unwrap();
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_pipe_listener_survives_unterminated_line() {
    use nix::sys::stat::Mode;
    use shairport_metadata::protocol::framing::MAX_RECORD_SIZE;
    use std::io::Write;

    let dir = tempfile::tempdir().unwrap();
    let fifo = dir.path().join("shairport-sync-metadata");
    nix::unistd::mkfifo(&fifo, Mode::S_IRUSR | Mode::S_IWUSR).unwrap();

    let config = ListenerConfig::builder()
        .pipe(PipeConfig::new(&fifo))
        .artwork_dir(dir.path())
        .build()
        .unwrap();
    let listener = MetadataListener::start(config).await.unwrap();
    let mut events = listener.subscribe();

    let writer = tokio::task::spawn_blocking(move || {
        let mut pipe = std::fs::OpenOptions::new().write(true).open(fifo).unwrap();
        let junk = vec![b'x'; 1024 * 1024];
        let mut written = 0;
        while written <= MAX_RECORD_SIZE {
            pipe.write_all(&junk).unwrap();
            written += junk.len();
        }
        pipe.write_all(b"\n").unwrap();
        pipe.write_all(record(b"ssnc", b"snam", b"Kitchen iPad").as_bytes())
            .unwrap();
    });

    let event = wait_for(&mut events, |e| matches!(e, ListenerEvent::Connected { .. })).await;
    writer.await.unwrap();
    assert_eq!(
        event,
        ListenerEvent::Connected {
            user_agent: None,
            client_name: Some("Kitchen iPad".to_string()),
        }
    );

    listener.stop().await.unwrap();
}

#[cfg(unix)]
#[tokio::test]
async fn test_pipe_listener_waits_for_missing_fifo() {
    let dir = tempfile::tempdir().unwrap();
    let config = ListenerConfig::builder()
        .pipe(PipeConfig {
            path: dir.path().join("missing"),
            retry_interval: Duration::from_millis(20),
        })
        .artwork_dir(dir.path())
        .build()
        .unwrap();

    let listener = MetadataListener::start(config).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(listener.is_running());

    listener.stop().await.unwrap();
}
