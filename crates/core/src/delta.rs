//! Vulnerability delta computation.
//!
//! Given a project's open vulnerabilities and its existing tickets,
//! `compute_delta` classifies every record into exactly one of: needs a
//! ticket (grouped by dependency path), skipped (upstream data error), or
//! excluded (filtered out or already ticketed). Pure function, no I/O.

use std::collections::BTreeMap;

use crate::maturity::MaturityFilter;
use crate::scanner::{VulnRecord, Vulnerability};
use crate::tracker::ExistingTicket;

/// The vulnerabilities that need a new ticket, grouped by dependency path,
/// plus the ones that could not be evaluated.
#[derive(Debug, Clone, Default)]
pub struct DeltaResult {
    pub vulns_per_path: BTreeMap<String, Vec<Vulnerability>>,
    pub skipped: Vec<Vulnerability>,
}

impl DeltaResult {
    /// True when no ticket is required.
    pub fn is_empty(&self) -> bool {
        self.vulns_per_path.is_empty()
    }

    /// Number of vulnerabilities needing a ticket, across all paths.
    pub fn vuln_count(&self) -> usize {
        self.vulns_per_path.values().map(Vec::len).sum()
    }
}

/// Compute the set of vulnerabilities lacking a ticket.
///
/// Classification per record:
/// - fails the maturity filter: dropped (filtered-out is not a data error,
///   so it is not reported as skipped either)
/// - unresolved upstream: skipped
/// - identity already covered by an existing ticket: excluded
/// - otherwise: delta, grouped by path
pub fn compute_delta(
    records: &[VulnRecord],
    existing_tickets: &[ExistingTicket],
    filter: &MaturityFilter,
) -> DeltaResult {
    let mut result = DeltaResult::default();

    for record in records {
        if !filter.accepts(record.vulnerability()) {
            continue;
        }

        let vuln = match record {
            VulnRecord::Unresolved(v) => {
                result.skipped.push(v.clone());
                continue;
            }
            VulnRecord::Resolved(v) => v,
        };

        if existing_tickets.iter().any(|t| t.covers(vuln)) {
            continue;
        }

        result
            .vulns_per_path
            .entry(vuln.path.clone())
            .or_default()
            .push(vuln.clone());
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_filter_scenario_high_critical() {
        // Filter "high,critical", three vulnerabilities at high/medium/critical,
        // no existing tickets: the delta holds exactly the high and critical
        // ones, nothing is skipped.
        let records = vec![
            fixtures::resolved("ISSUE-1", "a@1 > b@2", "high"),
            fixtures::resolved("ISSUE-2", "a@1 > c@3", "medium"),
            fixtures::resolved("ISSUE-3", "a@1 > d@4", "critical"),
        ];
        let filter = MaturityFilter::from_spec("high,critical");

        let delta = compute_delta(&records, &[], &filter);

        assert_eq!(delta.vuln_count(), 2);
        assert!(delta.skipped.is_empty());
        assert!(delta.vulns_per_path.contains_key("a@1 > b@2"));
        assert!(delta.vulns_per_path.contains_key("a@1 > d@4"));
        assert!(!delta.vulns_per_path.contains_key("a@1 > c@3"));
    }

    #[test]
    fn test_ticketed_vulnerability_never_in_delta() {
        let records = vec![
            fixtures::resolved("ISSUE-1", "a@1 > b@2", "mature"),
            fixtures::resolved("ISSUE-1", "a@1 > c@3", "mature"),
        ];
        let tickets = vec![fixtures::ticket("SEC-1", "ISSUE-1", Some("a@1 > b@2"))];

        let delta = compute_delta(&records, &tickets, &MaturityFilter::default());

        // Only the unticketed path survives.
        assert_eq!(delta.vuln_count(), 1);
        assert!(delta.vulns_per_path.contains_key("a@1 > c@3"));
    }

    #[test]
    fn test_issue_level_ticket_excludes_all_paths() {
        let records = vec![
            fixtures::resolved("ISSUE-1", "a@1 > b@2", "mature"),
            fixtures::resolved("ISSUE-1", "a@1 > c@3", "mature"),
        ];
        let tickets = vec![fixtures::ticket("SEC-1", "ISSUE-1", None)];

        let delta = compute_delta(&records, &tickets, &MaturityFilter::default());
        assert!(delta.is_empty());
    }

    #[test]
    fn test_unresolved_goes_to_skipped() {
        let records = vec![
            fixtures::resolved("ISSUE-1", "a@1 > b@2", "mature"),
            fixtures::unresolved("ISSUE-2", "mature"),
        ];

        let delta = compute_delta(&records, &[], &MaturityFilter::default());

        assert_eq!(delta.vuln_count(), 1);
        assert_eq!(delta.skipped.len(), 1);
        assert_eq!(delta.skipped[0].issue_id, "ISSUE-2");
    }

    #[test]
    fn test_filtered_out_unresolved_is_dropped_not_skipped() {
        let records = vec![fixtures::unresolved("ISSUE-1", "no-data")];
        let filter = MaturityFilter::from_spec("mature");

        let delta = compute_delta(&records, &[], &filter);

        assert!(delta.is_empty());
        assert!(delta.skipped.is_empty());
    }

    #[test]
    fn test_groups_by_path() {
        let records = vec![
            fixtures::resolved("ISSUE-1", "a@1 > b@2", "mature"),
            fixtures::resolved("ISSUE-2", "a@1 > b@2", "mature"),
            fixtures::resolved("ISSUE-3", "a@1 > c@3", "mature"),
        ];

        let delta = compute_delta(&records, &[], &MaturityFilter::default());

        assert_eq!(delta.vulns_per_path.len(), 2);
        assert_eq!(delta.vulns_per_path["a@1 > b@2"].len(), 2);
        assert_eq!(delta.vulns_per_path["a@1 > c@3"].len(), 1);
    }

    #[test]
    fn test_classification_is_input_order_independent() {
        let mut records = vec![
            fixtures::resolved("ISSUE-1", "a@1 > b@2", "high"),
            fixtures::resolved("ISSUE-2", "a@1 > c@3", "medium"),
            fixtures::unresolved("ISSUE-3", "high"),
        ];
        let tickets = vec![fixtures::ticket("SEC-1", "ISSUE-1", None)];
        let filter = MaturityFilter::from_spec("high");

        let forward = compute_delta(&records, &tickets, &filter);
        records.reverse();
        let reversed = compute_delta(&records, &tickets, &filter);

        assert_eq!(
            forward.vulns_per_path.keys().collect::<Vec<_>>(),
            reversed.vulns_per_path.keys().collect::<Vec<_>>()
        );
        assert_eq!(forward.vuln_count(), reversed.vuln_count());
        assert_eq!(forward.skipped.len(), reversed.skipped.len());
    }

    #[test]
    fn test_recomputation_is_identical() {
        let records = vec![
            fixtures::resolved("ISSUE-1", "a@1 > b@2", "high"),
            fixtures::unresolved("ISSUE-2", "high"),
        ];
        let filter = MaturityFilter::from_spec("high");

        let first = compute_delta(&records, &[], &filter);
        let second = compute_delta(&records, &[], &filter);

        assert_eq!(first.vulns_per_path, second.vulns_per_path);
        assert_eq!(first.skipped, second.skipped);
    }
}
