//! mDNS discovery of the DACP endpoint of the connected source
//!
//! An AirPlay source that accepts remote control advertises
//! `iTunes_Ctrl_<dacp id>` under `_dacp._tcp.local.`. The DACP id arrives in
//! the metadata stream (`daid`), so the endpoint can be looked up once a
//! session announced it.

mod browser;
#[cfg(test)]
mod tests;

pub use browser::{DacpBrowser, DacpEvent, DacpService, parse_instance_name};

use std::time::Duration;

use futures::StreamExt;

use crate::error::MetadataError;
use crate::types::RemoteEndpoint;

/// Wait for the advertisement of `device_id`
///
/// Returns `Ok(None)` if nothing matching shows up within `timeout`. The
/// mDNS browse is stopped before returning, and also when the returned
/// future is dropped mid-wait.
///
/// # Example
///
/// ```rust,no_run
/// use shairport_metadata::discovery::discover;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), shairport_metadata::MetadataError> {
/// if let Some(service) = discover("8AAA12C66D4A790A", Duration::from_secs(5)).await? {
///     println!("{} at {}:{}", service.fullname, service.address, service.port);
/// }
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if the mDNS daemon cannot be initialized.
pub async fn discover(device_id: &str, timeout: Duration) -> Result<Option<DacpService>, MetadataError> {
    let browser = DacpBrowser::new()?;
    let deadline = tokio::time::Instant::now() + timeout;

    tokio::pin!(browser);

    loop {
        tokio::select! {
            () = tokio::time::sleep_until(deadline) => {
                tracing::debug!(device_id, "No DACP service found before timeout");
                return Ok(None);
            }
            event = browser.next() => {
                match event {
                    Some(DacpEvent::Resolved(service)) if service.matches(device_id) => {
                        tracing::info!(
                            name = %service.fullname,
                            addr = %service.address,
                            port = service.port,
                            "Found DACP service"
                        );
                        return Ok(Some(service));
                    }
                    Some(DacpEvent::Resolved(service)) => {
                        tracing::debug!(name = %service.fullname, "Ignoring DACP service");
                    }
                    Some(DacpEvent::Removed(_)) => {}
                    None => return Ok(None),
                }
            }
        }
    }
}

/// Look up the endpoint for a `(device id, token)` pair
///
/// # Errors
///
/// Returns an error if the mDNS daemon cannot be initialized.
pub async fn discover_endpoint(
    device_id: &str,
    auth_token: &str,
    timeout: Duration,
) -> Result<Option<RemoteEndpoint>, MetadataError> {
    Ok(discover(device_id, timeout)
        .await?
        .map(|service| service.into_endpoint(device_id, auth_token)))
}
