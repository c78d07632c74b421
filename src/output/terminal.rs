//! Terminal output utilities.
//!
//! Provides the colored findings listing and the summary.

use super::ReportEmitter;
use crate::models::{ConflictKind, Finding};
use crate::processing::Statistics;
use colored::Colorize;
use std::error::Error;

/// Quote a report column and pad it on the left to `width`.
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    format!("{:>width$}", format!("\"{}\"", value.to_string()))
}

/// Prints findings and the statistics summary to stdout.
#[derive(Debug, Default)]
pub struct TerminalReport {
    /// Skip the per-finding listing, print the summary only.
    pub summary_only: bool,
}

impl ReportEmitter for TerminalReport {
    fn emit(&mut self, findings: &[Finding], stats: &Statistics) -> Result<(), Box<dyn Error>> {
        log::info!("print summary");
        if !self.summary_only {
            for (i, finding) in findings.iter().enumerate() {
                println!("{}", finding_line(i + 1, finding));
            }
        }

        println!("{}", "ALL DONE!".bold());
        for (name, value) in stats.entries() {
            println!("{name}: {value}");
        }
        if stats.subnets != 0 {
            println!("finding rate %: {:.2}", stats.finding_rate() * 100.0);
        }
        if stats.failed_fabrics > 0 {
            println!(
                "#{}# {} fabric(s) could not be audited, see the log",
                "NOTE".on_red(),
                stats.failed_fabrics
            );
        }
        log::info!("done summarizing");
        Ok(())
    }
}

fn finding_line(j: usize, f: &Finding) -> String {
    let kind = match f.kind {
        ConflictKind::Overlap => f.kind.to_string().yellow(),
        _ => f.kind.to_string().red(),
    };
    format!(
        "{j},{kind},{tenant},{vrf},{gw_a},{en_a},{subnet_a},{gw_b},{en_b},{subnet_b},{fabric}",
        j = format_field(j, 5),
        kind = kind,
        tenant = format_field(&f.tenant, 16),
        vrf = format_field(&f.routing_domain, 16),
        gw_a = format_field(&f.a.gateway_group, 20),
        en_a = format_field(&f.a.external_network, 20),
        subnet_a = format_field(f.a.subnet, 20),
        gw_b = format_field(&f.b.gateway_group, 20),
        en_b = format_field(&f.b.external_network, 20),
        subnet_b = format_field(f.b.subnet, 20),
        fabric = format_field(&f.fabric, 20),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Subnet, SubnetLocation};

    fn finding() -> Finding {
        let location = |gw: &str, subnet: &str| SubnetLocation {
            gateway_group: gw.to_string(),
            external_network: "EN1".to_string(),
            subnet: subnet.parse().unwrap(),
        };
        Finding {
            kind: ConflictKind::Overlap,
            fabric: "https://10.10.10.1".to_string(),
            tenant: "prod".to_string(),
            routing_domain: "VRF1".to_string(),
            a: location("L3OUT-A", "10.0.0.0/16"),
            b: location("L3OUT-B", "10.0.1.0/24"),
        }
    }

    #[test]
    fn test_format_field_pads_subnet() {
        let subnet: Subnet = "10.0.0.0/8".parse().unwrap();
        assert_eq!(format_field(subnet, 14), "  \"10.0.0.0/8\"");
    }

    #[test]
    fn test_format_field_keeps_long_names() {
        assert_eq!(
            format_field("L3OUT-INTERNET-EDGE", 5),
            "\"L3OUT-INTERNET-EDGE\""
        );
    }

    #[test]
    fn test_finding_line_columns() {
        let line = finding_line(1, &finding());
        let columns: Vec<&str> = line.split(',').map(str::trim).collect();
        assert_eq!(columns.len(), 11);
        assert_eq!(columns[0], "\"1\"");
        assert_eq!(columns[2], "\"prod\"");
        assert_eq!(columns[3], "\"VRF1\"");
        assert_eq!(columns[6], "\"10.0.0.0/16\"");
        assert_eq!(columns[9], "\"10.0.1.0/24\"");
        assert_eq!(columns[10], "\"https://10.10.10.1\"");
    }

    #[test]
    fn test_emit_summary_only() {
        let mut report = TerminalReport { summary_only: true };
        assert!(report.emit(&[], &Statistics::default()).is_ok());
    }
}
