//! DACP (Digital Audio Control Protocol) remote control of an AirPlay source

mod commands;

pub use commands::{CONTROL_PATH, CommandResult, DacpCommand};

/// Service type under which AirPlay sources advertise their DACP endpoint
pub const DACP_SERVICE_TYPE: &str = "_dacp._tcp.local.";

/// Instance name prefix; the DACP id follows it
pub const DACP_INSTANCE_PREFIX: &str = "iTunes_Ctrl_";

/// Header carrying the token that authorizes a command
pub const ACTIVE_REMOTE_HEADER: &str = "Active-Remote";
