//! Default values applied when the configuration omits a field.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Loopback port the service listens on by default.
pub const DEFAULT_PORT: u16 = 7878;

/// Default tracing filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Loopback bind address used when none is configured.
#[must_use]
pub const fn default_bind_addr() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT)
}

pub(crate) fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bind_addr_is_loopback() {
        let addr = default_bind_addr();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), DEFAULT_PORT);
    }
}
