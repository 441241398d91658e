use crate::{host_match::HostMatch, routing::in_namespace};
use ahash::AHashMap as HashMap;
use mesh_traffic_controller_k8s_api::{Labels, Selector};

/// Defines the named subsets of a service's workloads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersioningRule {
    pub name: String,
    pub namespace: Option<String>,
    pub host: String,

    /// Subset names are unique within a rule.
    pub subsets: Vec<Subset>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subset {
    pub name: String,
    pub selector: Selector,
}

/// Finds the versioning rule for a service.
///
/// A rule whose host equals the service name wins. Otherwise the first rule
/// whose host loosely matches the service is used.
pub fn resolve_service<'r>(service: &str, rules: &'r [VersioningRule]) -> Option<&'r VersioningRule> {
    resolve_service_in(service, None, rules)
}

/// Finds the versioning rule for a service in `namespace`.
///
/// Rules in the namespace are preferred, exact hosts first, over rules in
/// other namespaces.
pub fn resolve_service_in<'r>(
    service: &str,
    namespace: Option<&str>,
    rules: &'r [VersioningRule],
) -> Option<&'r VersioningRule> {
    let local = |r: &&VersioningRule| in_namespace(r.namespace.as_deref(), namespace);
    let exact = |r: &&VersioningRule| HostMatch::of(&r.host, service) == Some(HostMatch::Exact);
    let loose = |r: &&VersioningRule| HostMatch::matches(&r.host, service);

    rules
        .iter()
        .find(|r| local(r) && exact(r))
        .or_else(|| rules.iter().find(|r| local(r) && loose(r)))
        .or_else(|| rules.iter().find(exact))
        .or_else(|| rules.iter().find(loose))
}

/// Returns the names of all of a rule's subsets whose selector matches the
/// labels, in declaration order.
pub fn subsets_matching_labels<'r>(rule: &'r VersioningRule, labels: &Labels) -> Vec<&'r str> {
    rule.subsets
        .iter()
        .filter(|s| s.selector.matches(labels))
        .map(|s| s.name.as_str())
        .collect()
}

/// Indexes versioning rules by host for the duration of one analysis.
///
/// Resolution is identical to [`resolve_service_in`]; exact hosts are looked
/// up directly instead of scanned.
#[derive(Debug)]
pub struct VersioningIndex<'r> {
    rules: &'r [VersioningRule],
    by_host: HashMap<&'r str, Vec<&'r VersioningRule>>,
}

// === impl VersioningIndex ===

impl<'r> VersioningIndex<'r> {
    pub fn new(rules: &'r [VersioningRule]) -> Self {
        let mut by_host = HashMap::<&str, Vec<_>>::with_capacity(rules.len());
        for rule in rules {
            by_host.entry(rule.host.as_str()).or_default().push(rule);
        }
        Self { rules, by_host }
    }

    pub fn resolve(&self, service: &str, namespace: Option<&str>) -> Option<&'r VersioningRule> {
        if service.is_empty() {
            return None;
        }
        let local = |r: &VersioningRule| in_namespace(r.namespace.as_deref(), namespace);
        let exact = self.by_host.get(service).map(Vec::as_slice).unwrap_or_default();

        exact
            .iter()
            .copied()
            .find(|r| local(*r))
            .or_else(|| {
                self.rules
                    .iter()
                    .find(|r| local(*r) && HostMatch::matches(&r.host, service))
            })
            .or_else(|| exact.first().copied())
            .or_else(|| {
                self.rules
                    .iter()
                    .find(|r| HostMatch::matches(&r.host, service))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::btreemap;

    fn rule(name: &str, host: &str, subsets: &[(&str, &str)]) -> VersioningRule {
        VersioningRule {
            name: name.to_string(),
            namespace: Some("bookinfo".to_string()),
            host: host.to_string(),
            subsets: subsets
                .iter()
                .map(|(name, version)| Subset {
                    name: name.to_string(),
                    selector: Selector::from_map(btreemap! {
                        "version".to_string() => version.to_string(),
                    }),
                })
                .collect(),
        }
    }

    #[test]
    fn exact_host_wins_over_earlier_loose_host() {
        let rules = vec![
            rule("reviews-fqdn", "reviews.bookinfo.svc.cluster.local", &[]),
            rule("reviews", "reviews", &[]),
        ];

        let index = VersioningIndex::new(&rules);
        assert_eq!(resolve_service("reviews", &rules).unwrap().name, "reviews");
        assert_eq!(index.resolve("reviews", None).unwrap().name, "reviews");
    }

    #[test]
    fn loose_host_is_a_fallback() {
        let rules = vec![
            rule("ratings", "ratings", &[]),
            rule("reviews-fqdn", "reviews.bookinfo.svc.cluster.local", &[]),
        ];

        let index = VersioningIndex::new(&rules);
        assert_eq!(
            resolve_service("reviews", &rules).unwrap().name,
            "reviews-fqdn"
        );
        assert_eq!(index.resolve("reviews", None).unwrap().name, "reviews-fqdn");
        assert!(resolve_service("details", &rules).is_none());
        assert!(index.resolve("details", None).is_none());
        assert!(index.resolve("", None).is_none());
    }

    #[test]
    fn first_duplicate_host_wins() {
        let rules = vec![rule("first", "reviews", &[]), rule("second", "reviews", &[])];
        assert_eq!(resolve_service("reviews", &rules).unwrap().name, "first");
        assert_eq!(VersioningIndex::new(&rules).resolve("reviews", None).unwrap().name, "first");
    }

    #[test]
    fn same_namespace_rules_are_preferred() {
        let mut shop = rule("reviews-shop", "reviews", &[]);
        shop.namespace = Some("shop".to_string());
        let local_fqdn = rule("reviews-fqdn", "reviews.bookinfo.svc.cluster.local", &[]);
        let rules = vec![shop, local_fqdn];
        let index = VersioningIndex::new(&rules);

        for (namespace, expected) in [
            (Some("bookinfo"), "reviews-fqdn"),
            (Some("shop"), "reviews-shop"),
            (Some("default"), "reviews-shop"),
            (None, "reviews-shop"),
        ] {
            assert_eq!(
                resolve_service_in("reviews", namespace, &rules).unwrap().name,
                expected,
                "{namespace:?}"
            );
            assert_eq!(
                index.resolve("reviews", namespace).unwrap().name,
                expected,
                "{namespace:?}"
            );
        }
    }

    #[test]
    fn matches_every_subset_selecting_the_labels() {
        let mut dr = rule("reviews", "reviews", &[("v1", "v1"), ("v2", "v2")]);
        dr.subsets.push(Subset {
            name: "all".to_string(),
            selector: Selector::default(),
        });
        dr.subsets.push(Subset {
            name: "stable".to_string(),
            selector: Selector::from_iter(vec![("version", "v1"), ("track", "stable")]),
        });

        let labels = Labels::from_iter(vec![("app", "reviews"), ("version", "v1")]);
        assert_eq!(subsets_matching_labels(&dr, &labels), vec!["v1", "all"]);

        let labels = Labels::from_iter(vec![
            ("app", "reviews"),
            ("version", "v1"),
            ("track", "stable"),
        ]);
        assert_eq!(
            subsets_matching_labels(&dr, &labels),
            vec!["v1", "all", "stable"]
        );
    }

    #[test]
    fn no_subset_matches() {
        let dr = rule("reviews", "reviews", &[("v1", "v1"), ("v2", "v2")]);
        let labels = Labels::from_iter(Some(("app", "reviews")));
        assert!(subsets_matching_labels(&dr, &labels).is_empty());
    }
}
