use std::net::{IpAddr, Ipv4Addr};
use std::time::{Duration, Instant};

use crate::discovery::{DacpService, discover, discover_endpoint, parse_instance_name};

fn service(fullname: &str) -> DacpService {
    DacpService {
        fullname: fullname.to_string(),
        address: IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20)),
        port: 3689,
        hostname: Some("iPhone.local.".to_string()),
    }
}

#[test]
fn test_parse_instance_name() {
    assert_eq!(
        parse_instance_name("iTunes_Ctrl_8AAA12C66D4A790A._dacp._tcp.local."),
        Some("8AAA12C66D4A790A")
    );
    assert_eq!(
        parse_instance_name("iTunes_Ctrl_8AAA12C66D4A790A"),
        Some("8AAA12C66D4A790A")
    );
    assert_eq!(parse_instance_name("iTunes_Ctrl_"), None);
    assert_eq!(parse_instance_name("Living Room._raop._tcp.local."), None);
}

#[test]
fn test_service_matches_device() {
    let svc = service("iTunes_Ctrl_8AAA12C66D4A790A._dacp._tcp.local.");
    assert!(svc.matches("8AAA12C66D4A790A"));
    assert!(!svc.matches("0000000000000000"));
    assert_eq!(svc.device_id(), Some("8AAA12C66D4A790A"));

    let other = service("Other_8AAA12C66D4A790A._dacp._tcp.local.");
    assert!(!other.matches("8AAA12C66D4A790A"));
}

#[test]
fn test_service_into_endpoint() {
    let endpoint = service("iTunes_Ctrl_8AAA12C66D4A790A._dacp._tcp.local.")
        .into_endpoint("8AAA12C66D4A790A", "4137792918");

    assert_eq!(endpoint.device_id, "8AAA12C66D4A790A");
    assert_eq!(endpoint.auth_token, "4137792918");
    assert_eq!(endpoint.base_url(), "http://192.168.1.20:3689");
    assert_eq!(endpoint.hostname.as_deref(), Some("iPhone.local."));
}

#[tokio::test]
async fn test_discover_unknown_id_times_out() {
    let started = Instant::now();
    let result = discover("unknown-id", Duration::from_millis(500)).await;

    // The daemon may be unavailable in sandboxed environments
    if let Ok(found) = result {
        assert!(found.is_none());
        assert!(started.elapsed() < Duration::from_secs(3));
    }
}

#[tokio::test]
async fn test_discover_endpoint_unknown_id() {
    let result = discover_endpoint("unknown-id", "token", Duration::from_millis(200)).await;
    if let Ok(found) = result {
        assert!(found.is_none());
    }
}
