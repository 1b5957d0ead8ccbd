use std::net::IpAddr;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;

use crate::error::MetadataError;
use crate::protocol::dacp::{DACP_INSTANCE_PREFIX, DACP_SERVICE_TYPE};
use crate::types::RemoteEndpoint;

/// A resolved DACP advertisement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DacpService {
    /// Full service name, e.g. `iTunes_Ctrl_8AAA12C66D4A790A._dacp._tcp.local.`
    pub fullname: String,
    /// Preferred address (IPv4 when available)
    pub address: IpAddr,
    /// DACP port
    pub port: u16,
    /// Advertised host name
    pub hostname: Option<String>,
}

impl DacpService {
    /// DACP id carried in the instance name
    #[must_use]
    pub fn device_id(&self) -> Option<&str> {
        parse_instance_name(&self.fullname)
    }

    /// Whether this advertisement belongs to `device_id`
    #[must_use]
    pub fn matches(&self, device_id: &str) -> bool {
        self.fullname
            .strip_prefix(DACP_INSTANCE_PREFIX)
            .is_some_and(|rest| rest.starts_with(device_id))
    }

    /// Combine with the token needed to send commands
    #[must_use]
    pub fn into_endpoint(self, device_id: &str, auth_token: &str) -> RemoteEndpoint {
        RemoteEndpoint {
            device_id: device_id.to_string(),
            auth_token: auth_token.to_string(),
            address: self.address,
            port: self.port,
            hostname: self.hostname,
        }
    }
}

/// Extract the DACP id from `iTunes_Ctrl_<id>[._dacp._tcp.local.]`
#[must_use]
pub fn parse_instance_name(name: &str) -> Option<&str> {
    let id = name.strip_prefix(DACP_INSTANCE_PREFIX)?;
    let id = id.split('.').next().unwrap_or(id);
    (!id.is_empty()).then_some(id)
}

/// Discovery events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DacpEvent {
    /// A source advertised its DACP endpoint
    Resolved(DacpService),
    /// An advertisement went away (full service name)
    Removed(String),
}

/// Stream of DACP advertisements
///
/// Browsing stops and the mDNS daemon shuts down when the stream is dropped.
pub struct DacpBrowser {
    mdns: mdns_sd::ServiceDaemon,
    stream: Box<dyn Stream<Item = mdns_sd::ServiceEvent> + Send + Unpin>,
}

impl DacpBrowser {
    /// Start browsing `_dacp._tcp.local.`
    ///
    /// # Errors
    ///
    /// Returns an error if the mDNS daemon cannot be initialized.
    pub fn new() -> Result<Self, MetadataError> {
        let mdns = mdns_sd::ServiceDaemon::new().map_err(|e| MetadataError::DiscoveryFailed {
            message: format!("Failed to create mDNS daemon: {e}"),
            source: Some(Box::new(e)),
        })?;

        let receiver = mdns
            .browse(DACP_SERVICE_TYPE)
            .map_err(|e| MetadataError::DiscoveryFailed {
                message: format!("Failed to browse: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            mdns,
            stream: Box::new(receiver.into_stream()),
        })
    }

    fn process_event(event: mdns_sd::ServiceEvent) -> Option<DacpEvent> {
        match event {
            mdns_sd::ServiceEvent::ServiceResolved(info) => {
                let addresses = info.get_addresses();
                let address = addresses
                    .iter()
                    .find(|addr| addr.is_ipv4())
                    .or_else(|| addresses.iter().next())
                    .copied()?;

                let hostname = info.get_hostname();
                Some(DacpEvent::Resolved(DacpService {
                    fullname: info.get_fullname().to_string(),
                    address,
                    port: info.get_port(),
                    hostname: (!hostname.is_empty()).then(|| hostname.to_string()),
                }))
            }
            mdns_sd::ServiceEvent::ServiceRemoved(_, fullname) => Some(DacpEvent::Removed(fullname)),
            _ => None,
        }
    }
}

impl Stream for DacpBrowser {
    type Item = DacpEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            let event = match Pin::new(&mut self.stream).poll_next(cx) {
                Poll::Ready(Some(event)) => event,
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            };

            if let Some(event) = Self::process_event(event) {
                return Poll::Ready(Some(event));
            }
        }
    }
}

impl Drop for DacpBrowser {
    fn drop(&mut self) {
        // Stop browsing
        let _ = self.mdns.stop_browse(DACP_SERVICE_TYPE);
        let _ = self.mdns.shutdown();
    }
}
