use std::net::SocketAddr;

use clap::Parser;
use tokio::time::Duration;
use ttn_exporter::{exporter::DEFAULT_INTERVAL, server::DEFAULT_LISTEN};

#[derive(Debug, Parser)]
pub struct Args {
    #[arg(long, env = "TTNDATA_PROJECT", default_value = "")]
    pub project: String,

    #[arg(long, env = "TTNDATA_TOKEN", default_value = "", hide_env_values = true)]
    pub token: String,

    #[arg(long, env = "TTNDATA_LISTEN", default_value = DEFAULT_LISTEN)]
    pub listen: SocketAddr,

    #[arg(
        long,
        env = "TTNDATA_INTERVAL_SECS",
        default_value_t = DEFAULT_INTERVAL.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval_secs: u64,

    /// Outbound request timeout. Requests never time out when unset.
    #[arg(
        long,
        env = "TTNDATA_TIMEOUT_SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub project: String,
    pub token: String,
    pub listen: SocketAddr,
    pub interval: Duration,
    pub timeout: Option<Duration>,
}

impl Args {
    /// `None` when the project or token is empty.
    pub fn into_config(self) -> Option<Config> {
        if self.project.is_empty() || self.token.is_empty() {
            return None;
        }

        Some(Config {
            project: self.project,
            token: self.token,
            listen: self.listen,
            interval: Duration::from_secs(self.interval_secs),
            timeout: self.timeout_secs.map(Duration::from_secs),
        })
    }
}
