//! Relay configuration.

use std::time::Duration;

/// Settings for a [`RelayServer`](crate::RelayServer).
///
/// `Default` gives a loopback relay suitable for local play; override the
/// fields you care about:
///
/// ```rust
/// use std::time::Duration;
/// use quadring_relay::RelayConfig;
///
/// let config = RelayConfig {
///     bind_addr: "0.0.0.0:9000".into(),
///     ..RelayConfig::default()
/// }
/// .with_idle_timeout(Duration::from_secs(60));
/// assert_eq!(config.idle_timeout, Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,

    /// How long a new connection has to send its `Hello`.
    pub handshake_timeout: Duration,

    /// A connection that stays silent this long is dropped, and its
    /// opponent receives a `Withdrawal`. A match where one side thinks
    /// for a long time is normal, so keep this generous.
    pub idle_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:9000".to_string(),
            handshake_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
        }
    }
}

impl RelayConfig {
    pub fn with_bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_binds_loopback() {
        let config = RelayConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.handshake_timeout, Duration::from_secs(5));
        assert!(config.idle_timeout > config.handshake_timeout);
    }

    #[test]
    fn test_builder_setters_override_fields() {
        let config = RelayConfig::default()
            .with_bind_addr("0.0.0.0:1234")
            .with_handshake_timeout(Duration::from_millis(250));
        assert_eq!(config.bind_addr, "0.0.0.0:1234");
        assert_eq!(config.handshake_timeout, Duration::from_millis(250));
        assert_eq!(config.idle_timeout, RelayConfig::default().idle_timeout);
    }
}
