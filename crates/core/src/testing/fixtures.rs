//! Shared test data constructors.

use crate::scanner::{Organization, ProjectInfo, VulnRecord, Vulnerability};
use crate::tracker::ExistingTicket;

pub fn org(id: &str, name: &str) -> Organization {
    Organization {
        id: id.to_string(),
        name: name.to_string(),
    }
}

pub fn project_info(id: &str, name: &str) -> ProjectInfo {
    ProjectInfo {
        id: id.to_string(),
        name: name.to_string(),
        origin: Some("github".to_string()),
        branch: Some("main".to_string()),
    }
}

pub fn vuln(issue_id: &str, path: &str, maturity: &str) -> Vulnerability {
    Vulnerability {
        issue_id: issue_id.to_string(),
        path: path.to_string(),
        title: format!("Vulnerability {}", issue_id),
        severity: "high".to_string(),
        maturity: maturity.to_string(),
        package_name: "pkg".to_string(),
        package_version: "1.0.0".to_string(),
    }
}

pub fn resolved(issue_id: &str, path: &str, maturity: &str) -> VulnRecord {
    VulnRecord::Resolved(vuln(issue_id, path, maturity))
}

pub fn unresolved(issue_id: &str, maturity: &str) -> VulnRecord {
    VulnRecord::Unresolved(vuln(issue_id, "", maturity))
}

pub fn ticket(key: &str, issue_id: &str, path: Option<&str>) -> ExistingTicket {
    ExistingTicket {
        key: key.to_string(),
        issue_id: issue_id.to_string(),
        path: path.map(String::from),
    }
}
