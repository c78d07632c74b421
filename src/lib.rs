// cargo watch -x 'fmt' -x 'run'  // 'run -- --snapshot fabric_cache_x.json'

pub mod apic;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod processing;

use apic::{
    cache_file_name, collect_all, read_snapshot, read_snapshot_cache, ApicClient, FabricClient,
    FabricSnapshot,
};
use chrono::DateTime;
use chrono_tz::Tz;
use config::Config;
use error::ClientError;
use futures::future::join_all;
use models::{Finding, Inventory};
use output::{CsvReport, ReportEmitter, TerminalReport};
use processing::{find_conflicts, InventoryBuilder, Statistics};
use std::error::Error;
use std::path::PathBuf;

/// Outcome of one run: the hierarchy, its conflicts and the counters.
#[derive(Debug)]
pub struct Audit {
    pub inventory: Inventory,
    pub findings: Vec<Finding>,
    pub stats: Statistics,
}

impl Audit {
    /// Finish the builder and analyse the complete inventory.
    pub fn from_builder(builder: InventoryBuilder) -> Audit {
        let inventory = builder.finish();
        let findings = find_conflicts(&inventory);
        let stats = Statistics::collect(&inventory, &findings);
        Audit {
            inventory,
            findings,
            stats,
        }
    }
}

/// Load every fetched snapshot; failed fabrics are abandoned.
pub fn load_results(
    builder: &mut InventoryBuilder,
    results: Vec<(String, Result<FabricSnapshot, ClientError>)>,
) {
    for (fabric, result) in results {
        match result {
            Ok(snapshot) => builder.load_snapshot(&snapshot),
            Err(e) => builder.fabric_failed(&fabric, &e),
        }
    }
}

/// Collect all fabrics through their clients and audit them.
pub async fn audit_fabrics<C: FabricClient>(clients: &mut [C]) -> Audit {
    let results = collect_all(clients).await;
    let mut builder = InventoryBuilder::new();
    load_results(&mut builder, results);
    Audit::from_builder(builder)
}

/// Audit previously saved snapshot files. Unreadable files are logged and skipped.
pub fn audit_snapshot_files(files: &[PathBuf]) -> Audit {
    let mut builder = InventoryBuilder::new();
    for file in files {
        match read_snapshot(file) {
            Ok(snapshot) => builder.load_snapshot(&snapshot),
            Err(e) => log::error!("{e}"),
        }
    }
    Audit::from_builder(builder)
}

async fn fetch_fabrics(
    config: &Config,
    urls: &[String],
    now: &DateTime<Tz>,
) -> Vec<(String, Result<FabricSnapshot, ClientError>)> {
    let mut results = Vec::new();
    let mut clients = Vec::new();
    for url in urls {
        match ApicClient::new(url, config) {
            Ok(client) => clients.push(client),
            Err(e) => results.push((url.clone(), Err(e))),
        }
    }

    if config.cache {
        let jobs = clients.iter_mut().map(|client| async move {
            let fabric = client.fabric().to_string();
            let file = cache_file_name(&fabric, now);
            let result = read_snapshot_cache(client, &file).await;
            (fabric, result)
        });
        results.extend(join_all(jobs).await);
    } else {
        results.extend(collect_all(&mut clients).await);
    }
    results
}

/// Run the audit described by `config` and write its reports.
pub async fn run(config: &Config) -> Result<Audit, Box<dyn Error>> {
    let tz: Tz = config
        .timezone
        .parse()
        .map_err(|e| format!("Invalid timezone '{}': {e}", config.timezone))?;
    let now = chrono::Utc::now().with_timezone(&tz);

    let audit = if !config.snapshot.is_empty() {
        audit_snapshot_files(&config.snapshot)
    } else {
        let urls = config.fabric_urls();
        if urls.is_empty() {
            return Err("No valid controller address configured (APIC_HOSTS)".into());
        }
        let results = fetch_fabrics(config, &urls, &now).await;
        let mut builder = InventoryBuilder::new();
        load_results(&mut builder, results);
        Audit::from_builder(builder)
    };

    TerminalReport {
        summary_only: config.summary_only,
    }
    .emit(&audit.findings, &audit.stats)?;

    if let Some(outfile) = &config.outfile {
        let title = format!(
            "External-Network Subnet-Combinations {}",
            now.format("%Y-%m-%d %H:%M %Z")
        );
        CsvReport::create(outfile, &title)?.emit(&audit.findings, &audit.stats)?;
        log::info!("See {} for your report", outfile.display());
    }

    Ok(audit)
}
