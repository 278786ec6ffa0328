//! Rendering of command results.
//!
//! Human output is either a key-value block (describe) or a borderless table
//! (list). `--output json|yaml` marshals the server payload instead.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use comfy_table::{Cell, Row, Table};
use serde::Serialize;

use crate::error::RosaError;
use crate::model::{
    BreakGlassCredential, Cluster, DnsDomain, ExternalAuth, MachineType, TuningConfig,
};

/// Layout of timestamps in human output. Always UTC.
pub const TIMESTAMP_FORMAT: &str = "%b %e %Y %H:%M:%S UTC";

/// Width of the label column in key-value blocks.
const LABEL_WIDTH: usize = 39;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn is_human(&self) -> bool {
        *self == OutputFormat::Human
    }
}

impl FromStr for OutputFormat {
    type Err = RosaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            other => Err(RosaError::Validation(format!(
                "Invalid output format '{}'. Allowed formats are 'json' and 'yaml'",
                other
            ))),
        }
    }
}

/// Marshal a server payload. Human format falls back to JSON.
pub fn serialize<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> crate::Result<String> {
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(value)
            .map_err(|e| RosaError::Remote(format!("failed to render yaml: {}", e))),
        OutputFormat::Json | OutputFormat::Human => serde_json::to_string_pretty(value)
            .map(|s| s + "\n")
            .map_err(|e| RosaError::Remote(format!("failed to render json: {}", e))),
    }
}

pub fn timestamp(t: &DateTime<Utc>) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

/// Rows that render as a list table.
pub trait TableOutput {
    fn header(&self) -> Row;
    fn content(&self) -> Vec<Row>;
}

/// Render a borderless table with a header row.
pub fn table<T: TableOutput + ?Sized>(val: &T) -> String {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::NOTHING);
    table.set_header(val.header());
    for row in val.content() {
        table.add_row(row);
    }
    format!("{}\n", table)
}

/// A describe block: one `Label:` per line, values aligned. Starts with a
/// blank line.
pub fn key_values(pairs: &[(&str, String)]) -> String {
    let mut out = String::from("\n");
    for (label, value) in pairs {
        out.push_str(&format!("{:<width$}{}\n", format!("{}:", label), value, width = LABEL_WIDTH));
    }
    out
}

pub fn describe_break_glass(credential: &BreakGlassCredential) -> String {
    let mut pairs = vec![
        ("ID", credential.id.clone()),
        ("Username", credential.username.clone()),
        (
            "Expire at",
            credential
                .expiration_timestamp
                .as_ref()
                .map(timestamp)
                .unwrap_or_default(),
        ),
        ("Status", credential.status.to_string()),
    ];
    if let Some(revoked) = &credential.revocation_timestamp {
        pairs.push(("Revoked at", timestamp(revoked)));
    }
    key_values(&pairs)
}

pub struct BreakGlassList<'a>(pub &'a [BreakGlassCredential]);

impl TableOutput for BreakGlassList<'_> {
    fn header(&self) -> Row {
        Row::from(["ID", "USERNAME", "STATUS"])
    }

    fn content(&self) -> Vec<Row> {
        self.0
            .iter()
            .map(|c| Row::from([c.id.clone(), c.username.clone(), c.status.to_string()]))
            .collect()
    }
}

pub fn describe_external_auth(cluster: &Cluster, auth: &ExternalAuth) -> String {
    let mappings = auth.claim.as_ref().and_then(|c| c.mappings.as_ref());
    let mut pairs = vec![
        ("ID", auth.id.clone()),
        ("Cluster ID", cluster.id.clone()),
        ("Issuer audiences", auth.issuer.audiences.join(", ")),
        ("Issuer Url", auth.issuer.url.clone()),
        (
            "Claim mappings group",
            mappings
                .and_then(|m| m.groups.as_ref())
                .map(|g| g.claim.clone())
                .unwrap_or_default(),
        ),
        (
            "Claim mappings username",
            mappings
                .and_then(|m| m.user_name.as_ref())
                .map(|u| u.claim.clone())
                .unwrap_or_default(),
        ),
    ];
    let rules: Vec<String> = auth
        .claim
        .iter()
        .flat_map(|c| c.validation_rules.iter())
        .map(|r| format!("{}:{}", r.claim, r.required_value))
        .collect();
    if !rules.is_empty() {
        pairs.push(("Claim validation rules", rules.join(", ")));
    }
    if let Some(client) = auth.clients.first() {
        pairs.push(("Console client id", client.id.clone()));
    }
    key_values(&pairs)
}

pub struct ExternalAuthList<'a>(pub &'a [ExternalAuth]);

impl TableOutput for ExternalAuthList<'_> {
    fn header(&self) -> Row {
        Row::from(["NAME", "ISSUER URL"])
    }

    fn content(&self) -> Vec<Row> {
        self.0
            .iter()
            .map(|a| Row::from([a.id.clone(), a.issuer.url.clone()]))
            .collect()
    }
}

pub fn describe_tuning_config(config: &TuningConfig) -> crate::Result<String> {
    let spec = serde_json::to_string_pretty(&config.spec)
        .map_err(|e| RosaError::Remote(format!("failed to render tuning spec: {}", e)))?;
    Ok(key_values(&[
        ("Name", config.name.clone()),
        ("ID", config.id.clone()),
        ("Spec", spec),
    ]))
}

pub struct TuningConfigList<'a>(pub &'a [TuningConfig]);

impl TableOutput for TuningConfigList<'_> {
    fn header(&self) -> Row {
        Row::from(["ID", "NAME"])
    }

    fn content(&self) -> Vec<Row> {
        self.0
            .iter()
            .map(|t| Row::from([t.id.clone(), t.name.clone()]))
            .collect()
    }
}

pub struct DnsDomainList<'a>(pub &'a [DnsDomain]);

impl TableOutput for DnsDomainList<'_> {
    fn header(&self) -> Row {
        Row::from(["ID", "CLUSTER", "USER DEFINED", "ARCHITECTURE"])
    }

    fn content(&self) -> Vec<Row> {
        self.0
            .iter()
            .map(|d| {
                Row::from([
                    d.id.clone(),
                    d.cluster.as_ref().map(|c| c.id.clone()).unwrap_or_default(),
                    if d.user_defined { "Yes" } else { "No" }.to_string(),
                    d.cluster_arch.to_string(),
                ])
            })
            .collect()
    }
}

pub struct MachineTypeList<'a>(pub &'a [MachineType]);

impl TableOutput for MachineTypeList<'_> {
    fn header(&self) -> Row {
        Row::from(["ID", "CATEGORY", "CPU_CORES", "MEMORY"])
    }

    fn content(&self) -> Vec<Row> {
        self.0
            .iter()
            .map(|m| {
                let mut row = Row::new();
                row.add_cell(Cell::new(&m.id))
                    .add_cell(Cell::new(&m.category))
                    .add_cell(Cell::new(format!("{}", m.cpu.value)))
                    .add_cell(Cell::new(format!("{} GiB", m.memory_gib())));
                row
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{credential, hosted_cluster};
    use crate::model::{
        BreakGlassStatus, ClaimMappings, ClaimRef, ClusterArchitecture, ExternalAuthClient,
        ClientComponent, ObjectRef, Quantity, TokenClaims, TokenIssuer, ValidationRule,
    };
    use chrono::TimeZone;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("".parse::<OutputFormat>().unwrap(), OutputFormat::Human);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("yaml".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert!(matches!("xml".parse::<OutputFormat>(), Err(RosaError::Validation(_))));
    }

    #[test]
    fn test_describe_break_glass_block() {
        let mut cred = credential("test-id", BreakGlassStatus::Issued, "");
        cred.username = "username".to_string();
        cred.expiration_timestamp = Some(Utc.with_ymd_and_hms(2024, 1, 5, 8, 3, 9).unwrap());

        assert_eq!(
            describe_break_glass(&cred),
            "\n\
             ID:                                    test-id\n\
             Username:                              username\n\
             Expire at:                             Jan  5 2024 08:03:09 UTC\n\
             Status:                                issued\n"
        );
    }

    #[test]
    fn test_describe_break_glass_revoked_at() {
        let mut cred = credential("test-id", BreakGlassStatus::Revoked, "");
        cred.revocation_timestamp = Some(Utc.with_ymd_and_hms(2024, 11, 21, 17, 0, 0).unwrap());

        let out = describe_break_glass(&cred);
        assert!(out.ends_with("Revoked at:                            Nov 21 2024 17:00:00 UTC\n"));
    }

    #[test]
    fn test_external_auth_block() {
        let auth = ExternalAuth {
            id: "microsoft-entra-id".to_string(),
            issuer: TokenIssuer {
                url: "https://login.example.com/v2.0".to_string(),
                audiences: vec!["abc".to_string(), "def".to_string()],
                ca: String::new(),
            },
            claim: Some(TokenClaims {
                mappings: Some(ClaimMappings {
                    groups: Some(ClaimRef { claim: "groups".to_string() }),
                    user_name: Some(ClaimRef { claim: "email".to_string() }),
                }),
                validation_rules: vec![ValidationRule {
                    claim: "org".to_string(),
                    required_value: "acme".to_string(),
                }],
            }),
            clients: vec![ExternalAuthClient {
                id: "console-id".to_string(),
                secret: String::new(),
                component: ClientComponent::console(),
            }],
        };

        let out = describe_external_auth(&hosted_cluster(), &auth);
        assert!(out.contains("Issuer audiences:                      abc, def\n"));
        assert!(out.contains("Claim mappings username:               email\n"));
        assert!(out.contains("Claim validation rules:                org:acme\n"));
        assert!(out.contains("Console client id:                     console-id\n"));
    }

    #[test]
    fn test_tables_have_headers() {
        let domains = vec![DnsDomain {
            id: "abc1.s1.devshift.org".to_string(),
            cluster_arch: ClusterArchitecture::Hcp,
            user_defined: true,
            cluster: Some(ObjectRef { id: "cluster-id".to_string() }),
        }];
        let out = table(&DnsDomainList(&domains));
        let header = out.lines().next().unwrap();
        for column in ["ID", "CLUSTER", "USER DEFINED", "ARCHITECTURE"] {
            assert!(header.contains(column));
        }
        assert!(out.contains("abc1.s1.devshift.org"));
        assert!(out.contains("hcp"));
    }

    #[test]
    fn test_machine_type_memory_in_gib() {
        let types = vec![MachineType {
            id: "m5.xlarge".to_string(),
            name: "m5.xlarge - General Purpose".to_string(),
            category: "general_purpose".to_string(),
            cpu: Quantity { value: 4.0, unit: "vCPU".to_string() },
            memory: Quantity { value: 17179869184.0, unit: "B".to_string() },
        }];
        let out = table(&MachineTypeList(&types));
        assert!(out.lines().next().unwrap().contains("CPU_CORES"));
        assert!(out.contains("16 GiB"));
    }

    #[test]
    fn test_serialize_formats() {
        let cred = credential("test-id", BreakGlassStatus::Issued, "");
        let json = serialize(&cred, OutputFormat::Json).unwrap();
        assert!(json.contains("\"id\": \"test-id\""));
        let yaml = serialize(&cred, OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("id: test-id"));
    }
}
