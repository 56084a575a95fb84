use serde::{Deserialize, Serialize};

use crate::scanner::Vulnerability;

/// A ticket that already exists for a vulnerability identity.
///
/// `path: None` is an issue-level ticket covering every dependency path of
/// the issue; `Some(path)` covers that path only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingTicket {
    pub key: String,
    pub issue_id: String,
    #[serde(default)]
    pub path: Option<String>,
}

impl ExistingTicket {
    pub fn covers(&self, vuln: &Vulnerability) -> bool {
        self.issue_id == vuln.issue_id
            && self.path.as_deref().map_or(true, |p| p == vuln.path)
    }
}

/// Everything needed to create one ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketSpec {
    pub org_id: String,
    pub project_id: String,
    pub issue_id: String,
    pub summary: String,
    pub description: String,
    pub project_key: String,
    pub issue_type: String,
    #[serde(default)]
    pub assignee_id: Option<String>,
}

/// A successfully created ticket.
#[derive(Debug, Clone)]
pub struct CreatedTicket {
    pub key: String,
    /// Raw response metadata, kept verbatim for the run log.
    pub raw: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vuln(issue_id: &str, path: &str) -> Vulnerability {
        Vulnerability {
            issue_id: issue_id.to_string(),
            path: path.to_string(),
            title: "t".to_string(),
            severity: "high".to_string(),
            maturity: "mature".to_string(),
            package_name: "pkg".to_string(),
            package_version: "1.0.0".to_string(),
        }
    }

    #[test]
    fn test_issue_level_ticket_covers_every_path() {
        let ticket = ExistingTicket {
            key: "SEC-1".to_string(),
            issue_id: "ISSUE-1".to_string(),
            path: None,
        };
        assert!(ticket.covers(&vuln("ISSUE-1", "a@1 > b@2")));
        assert!(ticket.covers(&vuln("ISSUE-1", "a@1 > c@3")));
        assert!(!ticket.covers(&vuln("ISSUE-2", "a@1 > b@2")));
    }

    #[test]
    fn test_path_level_ticket_covers_exact_path_only() {
        let ticket = ExistingTicket {
            key: "SEC-2".to_string(),
            issue_id: "ISSUE-1".to_string(),
            path: Some("a@1 > b@2".to_string()),
        };
        assert!(ticket.covers(&vuln("ISSUE-1", "a@1 > b@2")));
        assert!(!ticket.covers(&vuln("ISSUE-1", "a@1 > c@3")));
    }
}
