use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::error::{MetadataError, RemoteError};
use crate::protocol::dacp::{CommandResult, DacpCommand};
use crate::remote::{RemoteClient, RemoteControl};
use crate::types::RemoteEndpoint;

/// Answer one request with `status_line` and hand back the raw request head
async fn stub(status_line: &'static str) -> (SocketAddr, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let response =
            format!("HTTP/1.1 {status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = tx.send(String::from_utf8_lossy(&request).into_owned());
    });

    (addr, rx)
}

fn endpoint(addr: SocketAddr) -> RemoteEndpoint {
    RemoteEndpoint {
        device_id: "8AAA12C66D4A790A".to_string(),
        auth_token: "4137792918".to_string(),
        address: addr.ip(),
        port: addr.port(),
        hostname: None,
    }
}

#[tokio::test]
async fn test_send_command() {
    let (addr, request) = stub("200 OK").await;
    let client = RemoteClient::new().unwrap();

    let result = client
        .send(&endpoint(addr), DacpCommand::NextItem)
        .await
        .unwrap();
    assert_eq!(result, CommandResult::Success);

    let request = request.await.unwrap();
    assert!(request.starts_with("GET /ctrl-int/1/nextitem HTTP/1.1\r\n"));
    assert!(
        request
            .to_ascii_lowercase()
            .contains("active-remote: 4137792918\r\n")
    );
}

#[tokio::test]
async fn test_send_no_content() {
    let (addr, _request) = stub("204 No Content").await;
    let control = RemoteControl::new(endpoint(addr)).unwrap();
    assert_eq!(control.play_pause().await.unwrap(), CommandResult::Success);
}

#[tokio::test]
async fn test_send_not_supported() {
    let (addr, _request) = stub("501 Not Implemented").await;
    let control = RemoteControl::new(endpoint(addr)).unwrap();
    assert_eq!(
        control.send(DacpCommand::ShuffleSongs).await.unwrap(),
        CommandResult::NotSupported
    );
}

#[tokio::test]
async fn test_send_rejected() {
    let (addr, _request) = stub("403 Forbidden").await;
    let client = RemoteClient::new().unwrap();
    let result = client.send(&endpoint(addr), DacpCommand::Play).await.unwrap();
    assert_eq!(result, CommandResult::Failed("403 Forbidden".to_string()));
}

#[tokio::test]
async fn test_send_connection_refused() {
    // Bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let control = RemoteControl::new(endpoint(addr)).unwrap();
    let err = control.send(DacpCommand::Pause).await.unwrap_err();

    assert!(matches!(
        err,
        MetadataError::Network(RemoteError::Request { ref url, .. })
            if url.ends_with("/ctrl-int/1/pause")
    ));
    assert!(err.is_connection_lost());
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_invalid_token() {
    let mut ep = endpoint(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 1));
    ep.auth_token = "bad\ntoken".to_string();

    let client = RemoteClient::new().unwrap();
    let err = client.send(&ep, DacpCommand::Play).await.unwrap_err();
    assert!(matches!(err, RemoteError::InvalidToken(_)));
}
