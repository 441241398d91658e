use crate::{object_name, Skip};
use mesh_traffic_controller_core::{Subset, VersioningRule};
use mesh_traffic_controller_k8s_api::{Document, DynamicObject, ResourceExt, Selector};
use tracing::debug;

/// Shapes a `DestinationRule` into a versioning rule.
///
/// Subsets without a name, or whose labels cannot be read as a string map,
/// are dropped. When a subset name repeats, the first declaration is kept.
pub fn versioning_rule(obj: &DynamicObject) -> Result<VersioningRule, Skip> {
    let name = object_name(obj)?;
    let spec = Document::new(&obj.data).get("spec");
    let host = spec
        .get("host")
        .as_non_empty_str()
        .ok_or(Skip::Missing("spec.host"))?;

    let mut subsets = Vec::<Subset>::new();
    for subset in spec.get("subsets").items() {
        let Some(subset_name) = subset.get("name").as_non_empty_str() else {
            debug!(%name, "Ignoring unnamed subset");
            continue;
        };
        if subsets.iter().any(|s| s.name == subset_name) {
            debug!(%name, subset = %subset_name, "Ignoring duplicate subset");
            continue;
        }
        let Some(selector) = selector(subset.get("labels")) else {
            debug!(%name, subset = %subset_name, "Ignoring subset with invalid labels");
            continue;
        };
        subsets.push(Subset {
            name: subset_name.to_string(),
            selector,
        });
    }

    Ok(VersioningRule {
        name,
        namespace: obj.namespace(),
        host: host.to_string(),
        subsets,
    })
}

/// A subset without labels selects every instance of its host.
fn selector(labels: Document<'_>) -> Option<Selector> {
    if !labels.is_present() {
        return Some(Selector::default());
    }
    labels
        .as_map()?
        .map(|(k, v)| Some((k.to_string(), v.as_str()?.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::mk_object;
    use maplit::btreemap;
    use mesh_traffic_controller_k8s_api::ResourceKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn mk_destination_rule(spec: serde_json::Value) -> DynamicObject {
        mk_object(ResourceKind::VersioningRule, "reviews", json!({ "spec": spec }))
    }

    #[test]
    fn reviews_destination_rule() {
        let obj = mk_destination_rule(json!({
            "host": "reviews",
            "trafficPolicy": { "loadBalancer": { "simple": "RANDOM" } },
            "subsets": [
                { "name": "v1", "labels": { "version": "v1" } },
                {
                    "name": "v2",
                    "labels": { "version": "v2" },
                    "trafficPolicy": { "loadBalancer": { "simple": "ROUND_ROBIN" } },
                },
            ],
        }));

        assert_eq!(
            versioning_rule(&obj).expect("must be valid"),
            VersioningRule {
                name: "reviews".to_string(),
                namespace: Some("bookinfo".to_string()),
                host: "reviews".to_string(),
                subsets: vec![
                    Subset {
                        name: "v1".to_string(),
                        selector: Selector::from_map(btreemap! {
                            "version".to_string() => "v1".to_string(),
                        }),
                    },
                    Subset {
                        name: "v2".to_string(),
                        selector: Selector::from_map(btreemap! {
                            "version".to_string() => "v2".to_string(),
                        }),
                    },
                ],
            }
        );
    }

    #[test]
    fn drops_malformed_subsets() {
        let obj = mk_destination_rule(json!({
            "host": "reviews",
            "subsets": [
                { "labels": { "version": "v0" } },
                { "name": "v1", "labels": { "version": "v1" } },
                { "name": "v1", "labels": { "version": "v1-shadow" } },
                { "name": "v2", "labels": { "version": 2 } },
                { "name": "v3", "labels": ["version"] },
                { "name": "all" },
            ],
        }));

        let rule = versioning_rule(&obj).expect("must be valid");
        assert_eq!(
            rule.subsets,
            vec![
                Subset {
                    name: "v1".to_string(),
                    selector: Selector::from_iter(Some(("version", "v1"))),
                },
                Subset {
                    name: "all".to_string(),
                    selector: Selector::default(),
                },
            ]
        );
    }

    #[test]
    fn skips_rules_without_host() {
        let obj = mk_destination_rule(json!({ "subsets": [] }));
        assert_eq!(versioning_rule(&obj), Err(Skip::Missing("spec.host")));

        let obj = mk_destination_rule(json!({ "host": "" }));
        assert_eq!(versioning_rule(&obj), Err(Skip::Missing("spec.host")));

        let obj = mk_object(ResourceKind::VersioningRule, "reviews", json!({}));
        assert_eq!(versioning_rule(&obj), Err(Skip::Missing("spec.host")));
    }
}
