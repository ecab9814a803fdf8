//! Group record fixtures and body generators

use dns_groups::GroupRecord;

/// Router group from the reference scenario
pub const ROUTER_GROUP: &str = r#"{"job_name":"router","link_name":"dns","link_type":"provides","group_id":42,"health_state":"running"}"#;

/// API group from the reference scenario
pub const API_GROUP: &str = r#"{"job_name":"api","link_name":"dns","link_type":"consumes","group_id":7,"health_state":"unhealthy"}"#;

/// A value that is not valid JSON
pub const MALFORMED_GROUP: &str = r#"{"job_name":"broken","group_id":}"#;

/// Five records with distinctive field values
pub fn five_records() -> Vec<GroupRecord> {
    vec![
        record("router", "dns", "provides", 42, "running"),
        record("api", "dns", "consumes", 7, "unhealthy"),
        record("worker", "queue-δ", "provides", 0, "unknown"),
        record("db", "postgres \"primary\"", "consumes", -3, "degraded"),
        record("edge", "", "provides", 9_007_199_254_740_993, ""),
    ]
}

/// Build a record
pub fn record(job: &str, link: &str, link_type: &str, id: i64, health: &str) -> GroupRecord {
    GroupRecord {
        job_name: job.to_string(),
        link_name: link.to_string(),
        link_type: link_type.to_string(),
        group_id: id,
        health_state: health.to_string(),
    }
}

/// Encode records as concatenated JSON values separated by `separator`
pub fn encode_body(records: &[GroupRecord], separator: &str) -> String {
    records
        .iter()
        .map(|r| serde_json::to_string(r).expect("record serializes"))
        .collect::<Vec<_>>()
        .join(separator)
}
