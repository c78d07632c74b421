//! Runtime configuration.
//!
//! Values come from the command line, falling back to environment variables
//! (a `.env` file is loaded first by `main`).

use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;

/// Objects requested per page from a controller.
pub const DEFAULT_PAGE_SIZE: usize = 500;
/// Per request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Pause between pages of one query.
pub const SLEEP_MSEC: u64 = 50;
pub const DEFAULT_LOG_CONFIG: &str = "log4rs.yml";

#[derive(Parser, Debug, Clone)]
#[command(name = "fabric-route-audit")]
#[command(version)]
#[command(
    about = "Check for duplicate 0.0.0.0/0 and overlapping subnets in external networks of L3Outs",
    long_about = None
)]
pub struct Config {
    /// Controller IP addresses, comma separated
    #[arg(env = "APIC_HOSTS", value_delimiter = ',')]
    pub hosts: Vec<String>,

    /// Username to connect to the controllers
    #[arg(short, long, env = "APIC_USERNAME", default_value = "admin")]
    pub username: String,

    /// Password to connect to the controllers
    #[arg(short, long, env = "APIC_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Path to the CSV report
    #[arg(short, long)]
    pub outfile: Option<PathBuf>,

    /// Disable certificate verification
    #[arg(short = 'k', long, env = "APIC_INSECURE")]
    pub insecure: bool,

    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Read/write a dated snapshot cache per fabric
    #[arg(long, env = "AUDIT_CACHE")]
    pub cache: bool,

    /// Analyse saved snapshot files instead of querying controllers
    #[arg(long)]
    pub snapshot: Vec<PathBuf>,

    /// Timezone used for cache file dates and the report timestamp
    #[arg(long, env = "AUDIT_TIMEZONE", default_value = "UTC")]
    pub timezone: String,

    /// Print only the summary counters on the terminal
    #[arg(long)]
    pub summary_only: bool,

    /// log4rs configuration file
    #[arg(long, default_value = DEFAULT_LOG_CONFIG)]
    pub log_config: PathBuf,
}

impl Config {
    /// Controller base URLs for the configured hosts.
    ///
    /// Hosts that are not IP addresses are logged and skipped.
    pub fn fabric_urls(&self) -> Vec<String> {
        log::info!("Generating list of controller urls");
        let urls: Vec<String> = self
            .hosts
            .iter()
            .map(|h| h.trim())
            .filter(|h| !h.is_empty())
            .filter_map(|host| match host.parse::<IpAddr>() {
                Ok(IpAddr::V4(ip)) => Some(format!("https://{ip}")),
                Ok(IpAddr::V6(ip)) => Some(format!("https://[{ip}]")),
                Err(_) => {
                    log::error!("{host} is not a valid IP. Skipping...");
                    None
                }
            })
            .collect();
        log::info!("Controller urls = {urls:?}");
        urls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fabric_urls() {
        let config = Config::parse_from([
            "fabric-route-audit",
            "10.1.1.1, not-an-ip,2001:db8::10",
            "--password",
            "secret",
        ]);
        assert_eq!(
            config.fabric_urls(),
            vec!["https://10.1.1.1", "https://[2001:db8::10]"]
        );
    }

    #[test]
    fn test_defaults() {
        let config = Config::parse_from(["fabric-route-audit", "--snapshot", "a.json"]);
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.snapshot, vec![PathBuf::from("a.json")]);
        assert!(config.outfile.is_none());
    }
}
