//! HTTP connection settings for the EC2 client

use std::time::Duration;

pub struct ClientConfig {
    pub max_idle_connections: usize,
    pub idle_timeout: Duration,
    pub connection_timeout: Duration,
    pub request_timeout: Duration,
    pub tcp_keepalive: Option<Duration>,
    /// Skip TLS certificate verification, for local endpoints
    pub insecure: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_idle_connections: 10,
            idle_timeout: Duration::from_secs(90),
            connection_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            tcp_keepalive: Some(Duration::from_secs(30)),
            insecure: false,
        }
    }
}

impl ClientConfig {
    pub fn build_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(self.insecure)
            .timeout(self.request_timeout)
            .connect_timeout(self.connection_timeout)
            .pool_idle_timeout(self.idle_timeout)
            .pool_max_idle_per_host(self.max_idle_connections);

        if let Some(keepalive) = self.tcp_keepalive {
            builder = builder.tcp_keepalive(keepalive);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.max_idle_connections, 10);
        assert_eq!(config.idle_timeout.as_secs(), 90);
        assert_eq!(config.connection_timeout.as_secs(), 10);
        assert_eq!(config.request_timeout.as_secs(), 30);
        assert_eq!(config.tcp_keepalive, Some(Duration::from_secs(30)));
        assert!(!config.insecure);
    }

    #[test]
    fn builds_insecure_client() {
        let config = ClientConfig {
            insecure: true,
            ..Default::default()
        };
        assert!(config.build_client().is_ok());
    }
}
