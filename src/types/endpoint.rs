use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::protocol::dacp::{CONTROL_PATH, DacpCommand};

/// DACP endpoint of the connected source
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteEndpoint {
    /// DACP id the endpoint was found for
    pub device_id: String,

    /// Active-Remote token sent with every command
    pub auth_token: String,

    /// Address of the source
    pub address: IpAddr,

    /// DACP port
    pub port: u16,

    /// Advertised host name
    pub hostname: Option<String>,
}

impl RemoteEndpoint {
    /// Get socket address for connection
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }

    /// `http://host:port`, with IPv6 hosts bracketed
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.socket_addr())
    }

    /// Full URL of a command
    #[must_use]
    pub fn command_url(&self, command: DacpCommand) -> String {
        format!("{}/{CONTROL_PATH}/{}", self.base_url(), command.wire_name())
    }
}

impl fmt::Display for RemoteEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.hostname {
            Some(host) => write!(f, "{} ({host}, {})", self.device_id, self.socket_addr()),
            None => write!(f, "{} ({})", self.device_id, self.socket_addr()),
        }
    }
}
