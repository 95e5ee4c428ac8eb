use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 8080;

/// Application configuration and constants
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub template_dir: PathBuf,
    pub port: u16,
    pub host: IpAddr,
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            template_dir: PathBuf::from("tmpl"),
            port: DEFAULT_PORT,
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        }
    }

    /// Create configuration with custom values
    pub fn with_custom(
        data_dir: Option<PathBuf>,
        template_dir: Option<PathBuf>,
        port: Option<u16>,
        host: Option<IpAddr>,
    ) -> Self {
        let defaults = Self::new();
        Self {
            data_dir: data_dir.unwrap_or(defaults.data_dir),
            template_dir: template_dir.unwrap_or(defaults.template_dir),
            port: port.unwrap_or(defaults.port),
            host: host.unwrap_or(defaults.host),
        }
    }

    /// Get the socket address for binding
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
