use crate::core::{Category, ClassificationRecord, ClassificationReport, Totals};
use serde::Serialize;

/// The traffic analytics response document.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficAnalytics {
    traffic_analysis: Vec<Record>,
    summary: Summary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Record {
    pod_name: String,
    namespace: Option<String>,
    service_name: String,
    vs_name: Option<String>,
    traffic_type: &'static str,
    subset: Option<String>,
    match_description: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
    total_pods: usize,
    #[serde(rename = "totalVS")]
    total_vs: usize,
    #[serde(rename = "totalDR")]
    total_dr: usize,
    basic_traffic: usize,
    gray_traffic: usize,
    no_traffic: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

fn traffic_type(category: Category) -> &'static str {
    match category {
        Category::Base => "base",
        Category::Canary => "canary",
        Category::NoRule => "none",
    }
}

// === impl TrafficAnalytics ===

impl From<ClassificationReport> for TrafficAnalytics {
    fn from(ClassificationReport { records, totals }: ClassificationReport) -> Self {
        Self {
            traffic_analysis: records.into_iter().map(Record::from).collect(),
            summary: totals.into(),
        }
    }
}

impl From<ClassificationRecord> for Record {
    fn from(record: ClassificationRecord) -> Self {
        Self {
            pod_name: record.instance_name,
            namespace: record.namespace,
            service_name: record.service_name,
            vs_name: record.rule_name,
            traffic_type: traffic_type(record.category),
            subset: record.subset,
            match_description: record.predicate_description,
        }
    }
}

impl From<Totals> for Summary {
    fn from(totals: Totals) -> Self {
        Self {
            total_pods: totals.instance_count,
            total_vs: totals.rule_count,
            total_dr: totals.versioning_rule_count,
            basic_traffic: totals.base_count,
            gray_traffic: totals.canary_count,
            no_traffic: totals.no_rule_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn encodes_report() {
        let report = ClassificationReport {
            records: vec![
                ClassificationRecord {
                    instance_name: "reviews-v2".to_string(),
                    namespace: Some("bookinfo".to_string()),
                    service_name: "reviews".to_string(),
                    rule_name: Some("reviews".to_string()),
                    category: Category::Canary,
                    subset: Some("v2".to_string()),
                    predicate_description: Some("Header end-user: jason".to_string()),
                },
                ClassificationRecord {
                    instance_name: "busybox".to_string(),
                    namespace: None,
                    service_name: String::new(),
                    rule_name: None,
                    category: Category::NoRule,
                    subset: None,
                    predicate_description: None,
                },
            ],
            totals: Totals {
                instance_count: 2,
                rule_count: 1,
                versioning_rule_count: 1,
                base_count: 0,
                canary_count: 1,
                no_rule_count: 1,
            },
        };

        let value = serde_json::to_value(TrafficAnalytics::from(report)).unwrap();
        assert_eq!(
            value,
            json!({
                "trafficAnalysis": [
                    {
                        "podName": "reviews-v2",
                        "namespace": "bookinfo",
                        "serviceName": "reviews",
                        "vsName": "reviews",
                        "trafficType": "canary",
                        "subset": "v2",
                        "matchDescription": "Header end-user: jason",
                    },
                    {
                        "podName": "busybox",
                        "namespace": null,
                        "serviceName": "",
                        "vsName": null,
                        "trafficType": "none",
                        "subset": null,
                        "matchDescription": null,
                    },
                ],
                "summary": {
                    "totalPods": 2,
                    "totalVS": 1,
                    "totalDR": 1,
                    "basicTraffic": 0,
                    "grayTraffic": 1,
                    "noTraffic": 1,
                },
            })
        );
    }
}
