//! Cache management for fabric snapshots.
//!
//! Provides caching functionality to avoid repeated controller queries.

use super::client::{collect_snapshot, FabricClient};
use super::records::FabricSnapshot;
use crate::error::ClientError;
use chrono::{DateTime, TimeZone};
use std::error::Error;
use std::path::{Path, PathBuf};

/// Dated cache file name for a fabric, e.g. `fabric_cache_10.1.1.1_2024-05-01.json`.
pub fn cache_file_name<Tz: TimeZone>(fabric: &str, now: &DateTime<Tz>) -> PathBuf
where
    Tz::Offset: std::fmt::Display,
{
    let host: String = fabric
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    PathBuf::from(format!("fabric_cache_{host}_{}.json", now.format("%Y-%m-%d")))
}

/// Read a snapshot file written by [`write_snapshot`].
pub fn read_snapshot(file: &Path) -> Result<FabricSnapshot, Box<dyn Error>> {
    let json = std::fs::read_to_string(file)
        .map_err(|e| format!("Error reading snapshot {}: {e}", file.display()))?;
    let mut deserializer = serde_json::Deserializer::from_str(&json);
    let snapshot: FabricSnapshot = serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|e| {
            format!(
                "Error parsing snapshot {}: path={} error={}",
                file.display(),
                e.path(),
                e
            )
        })?;
    log::info!(
        "Read snapshot of {} from {}",
        snapshot.fabric,
        file.display()
    );
    Ok(snapshot)
}

pub fn write_snapshot(file: &Path, snapshot: &FabricSnapshot) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(snapshot)
        .map_err(|e| format!("Error serializing JSON: {e}"))?;
    log::warn!("Writing snapshot of {} to {}", snapshot.fabric, file.display());
    std::fs::write(file, json)
        .map_err(|e| format!("Error writing cache file {}: {e}", file.display()))?;
    Ok(())
}

/// Read the fabric's snapshot from `cache_file`, or fetch it with `client`
/// and write it there.
///
/// A broken cache file is logged and refetched. Failing to write the cache
/// is logged and otherwise ignored.
pub async fn read_snapshot_cache<C: FabricClient>(
    client: &mut C,
    cache_file: &Path,
) -> Result<FabricSnapshot, ClientError> {
    if cache_file.exists() {
        match read_snapshot(cache_file) {
            Ok(snapshot) if snapshot.fabric == client.fabric() => return Ok(snapshot),
            Ok(snapshot) => log::warn!(
                "Cache file {} belongs to {}, not {}. Ignoring it",
                cache_file.display(),
                snapshot.fabric,
                client.fabric()
            ),
            Err(e) => log::warn!("Ignoring cache file: {e}"),
        }
    } else {
        log::warn!("Cache file not found: {}", cache_file.display());
    }

    let snapshot = collect_snapshot(client).await?;
    if let Err(e) = write_snapshot(cache_file, &snapshot) {
        log::error!("{e}");
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_cache_file_name() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 23, 0, 0).unwrap();
        assert_eq!(
            cache_file_name("https://10.1.1.1", &now),
            PathBuf::from("fabric_cache_10.1.1.1_2024-05-01.json")
        );
        assert_eq!(
            cache_file_name("https://[2001:db8::1]", &now),
            PathBuf::from("fabric_cache__2001_db8__1__2024-05-01.json")
        );
        let auckland = now.with_timezone(&chrono_tz::Pacific::Auckland);
        assert_eq!(
            cache_file_name("https://10.1.1.1", &auckland),
            PathBuf::from("fabric_cache_10.1.1.1_2024-05-02.json")
        );
    }

    #[test]
    fn test_read_snapshot() {
        let snapshot = read_snapshot(Path::new("src/tests/test_data/fabric_snapshot_01.json"))
            .expect("Error reading snapshot");
        assert_eq!(snapshot.fabric, "https://10.10.10.1");
        assert_eq!(snapshot.tenants.len(), 2);
        assert!(!snapshot.subnets.is_empty());
    }

    #[test]
    fn test_read_snapshot_missing() {
        let err = read_snapshot(Path::new("src/tests/test_data/does_not_exist.json")).unwrap_err();
        assert!(err.to_string().contains("does_not_exist.json"));
    }

    #[test]
    fn test_write_then_read_snapshot() {
        let file = std::env::temp_dir().join(format!(
            "fabric_route_audit_cache_test_{}.json",
            std::process::id()
        ));
        let snapshot = read_snapshot(Path::new("src/tests/test_data/fabric_snapshot_01.json"))
            .expect("Error reading snapshot");
        write_snapshot(&file, &snapshot).expect("Error writing snapshot");
        let back = read_snapshot(&file).expect("Error reading written snapshot");
        std::fs::remove_file(&file).ok();
        assert_eq!(back, snapshot);
    }
}
