//! CSV output of findings.

use super::ReportEmitter;
use crate::models::Finding;
use crate::processing::Statistics;
use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const CSV_HEADER: [&str; 10] = [
    "Fabric",
    "Tenant",
    "RoutingDomain",
    "GatewayGroup A",
    "ExternalNetwork A",
    "Subnet A",
    "GatewayGroup B",
    "ExternalNetwork B",
    "Subnet B",
    "Conflict",
];

/// Writes one row per finding below a title line and the header.
pub struct CsvReport<W: Write> {
    out: W,
    title: String,
}

impl<W: Write> CsvReport<W> {
    pub fn new(out: W, title: &str) -> CsvReport<W> {
        CsvReport {
            out,
            title: title.to_string(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl CsvReport<BufWriter<File>> {
    pub fn create(path: &Path, title: &str) -> Result<Self, Box<dyn Error>> {
        let file = File::create(path)
            .map_err(|e| format!("Error creating report {}: {e}", path.display()))?;
        Ok(CsvReport::new(BufWriter::new(file), title))
    }
}

impl<W: Write> ReportEmitter for CsvReport<W> {
    fn emit(&mut self, findings: &[Finding], _stats: &Statistics) -> Result<(), Box<dyn Error>> {
        log::info!("#Start CsvReport::emit() {} findings", findings.len());
        writeln!(self.out, "{}", escape_csv_field(&self.title))?;
        writeln!(self.out, "{}", CSV_HEADER.join(","))?;
        for finding in findings {
            writeln!(self.out, "{}", csv_row(finding))?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// One finding as a CSV line (without newline).
pub fn csv_row(f: &Finding) -> String {
    [
        f.fabric.clone(),
        f.tenant.clone(),
        f.routing_domain.clone(),
        f.a.gateway_group.clone(),
        f.a.external_network.clone(),
        f.a.subnet.to_string(),
        f.b.gateway_group.clone(),
        f.b.external_network.clone(),
        f.b.subnet.to_string(),
        f.kind.to_string(),
    ]
    .iter()
    .map(|field| escape_csv_field(field))
    .collect::<Vec<String>>()
    .join(",")
}

pub fn escape_csv_field(input: &str) -> String {
    if input.contains(',') || input.contains('"') || input.contains('\n') {
        // Enclose in double quotes and double any quotes inside.
        // Excel does not like spaces after the comma between fields.
        let escaped = input.replace('"', "\"\"");
        format!("\"{}\"", escaped)
    } else {
        input.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConflictKind, Subnet, SubnetLocation};

    fn finding() -> Finding {
        Finding {
            kind: ConflictKind::Overlap,
            fabric: "https://10.1.1.1".to_string(),
            tenant: "prod".to_string(),
            routing_domain: "VRF1".to_string(),
            a: SubnetLocation {
                gateway_group: "L3OUT-A".to_string(),
                external_network: "EN, \"any\"".to_string(),
                subnet: Subnet::new("10.0.0.0/24").unwrap(),
            },
            b: SubnetLocation {
                gateway_group: "L3OUT-B".to_string(),
                external_network: "EN-B".to_string(),
                subnet: Subnet::new("10.0.0.128/25").unwrap(),
            },
        }
    }

    #[test]
    fn test_escape_csv_field() {
        assert_eq!(escape_csv_field("plain"), "plain");
        assert_eq!(escape_csv_field("a,b"), "\"a,b\"");
        assert_eq!(escape_csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_csv_row() {
        assert_eq!(
            csv_row(&finding()),
            "https://10.1.1.1,prod,VRF1,L3OUT-A,\"EN, \"\"any\"\"\",10.0.0.0/24,L3OUT-B,EN-B,10.0.0.128/25,OVERLAP"
        );
    }

    #[test]
    fn test_emit() {
        let mut report = CsvReport::new(Vec::new(), "External-Network Subnet-Combinations");
        report
            .emit(&[finding()], &Statistics::default())
            .expect("Error writing report");
        let text = String::from_utf8(report.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "External-Network Subnet-Combinations");
        assert!(lines[1].starts_with("Fabric,Tenant,RoutingDomain,GatewayGroup A"));
        assert!(lines[2].ends_with(",OVERLAP"));
    }
}
