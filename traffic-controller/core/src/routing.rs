use crate::{host_match::HostMatch, predicate::MatchPredicate};
use std::fmt;

/// Describes how requests for a set of hosts are routed to destinations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutingRule {
    pub name: String,
    pub namespace: Option<String>,
    pub hosts: Vec<String>,
    pub entries: Vec<RouteEntry>,
}

/// An ordered route within a rule. Without a predicate it applies to all
/// requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteEntry {
    pub predicate: Option<MatchPredicate>,
    pub targets: Vec<RouteTarget>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteTarget {
    pub host: String,
    pub subset: Option<String>,
}

/// The class of traffic a workload receives.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// No route entry targets the workload.
    NoRule,

    /// An unconditional route entry targets the workload.
    Base,

    /// A route entry gated by a predicate targets the workload.
    Canary,
}

/// The outcome of classifying a (service, subset) pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleMatch {
    pub category: Category,
    pub rule_name: Option<String>,
    pub predicate_description: Option<String>,
}

/// Classifies traffic for a service's subset against routing rules.
///
/// Rules are scanned in the order given and the first route entry that
/// targets the pair wins, even when a later rule would be more specific.
/// When `subset` is absent (or empty), only targets naming the service with
/// no subset qualifier match.
pub fn classify(service: &str, subset: Option<&str>, rules: &[RoutingRule]) -> RuleMatch {
    classify_in(service, None, subset, rules)
}

/// Like [`classify`], for a service in `namespace`: rules in that namespace
/// are scanned before rules in other namespaces. Input order is kept within
/// each group.
pub fn classify_in(
    service: &str,
    namespace: Option<&str>,
    subset: Option<&str>,
    rules: &[RoutingRule],
) -> RuleMatch {
    let subset = subset.filter(|s| !s.is_empty());

    let (local, remote): (Vec<_>, Vec<_>) = rules
        .iter()
        .filter(|r| r.applies_to(service))
        .partition(|r| in_namespace(r.namespace.as_deref(), namespace));
    for rule in local.into_iter().chain(remote) {
        if let Some(entry) = rule.entries.iter().find(|e| e.targets(service, subset)) {
            tracing::trace!(rule = %rule.name, %service, ?subset, "Matched route entry");
            return RuleMatch::from_entry(rule, entry);
        }
    }

    RuleMatch::no_rule()
}

/// Rules and instances without a namespace are local to every namespace.
pub(crate) fn in_namespace(rule: Option<&str>, namespace: Option<&str>) -> bool {
    match (rule, namespace) {
        (Some(rule), Some(ns)) => rule == ns,
        _ => true,
    }
}

// === impl RoutingRule ===

impl RoutingRule {
    /// Indicates whether any of the rule's hosts names the service.
    pub fn applies_to(&self, service: &str) -> bool {
        self.hosts.iter().any(|h| HostMatch::matches(h, service))
    }
}

// === impl RouteEntry ===

impl RouteEntry {
    /// Indicates whether the entry sends traffic to the service's subset.
    pub fn targets(&self, service: &str, subset: Option<&str>) -> bool {
        self.targets.iter().any(|t| t.is(service, subset))
    }

    pub fn is_conditional(&self) -> bool {
        self.predicate.is_some()
    }
}

// === impl RouteTarget ===

impl RouteTarget {
    fn is(&self, service: &str, subset: Option<&str>) -> bool {
        HostMatch::matches(&self.host, service) && self.subset.as_deref() == subset
    }
}

// === impl Category ===

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoRule => "no_rule",
            Self::Base => "base",
            Self::Canary => "canary",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// === impl RuleMatch ===

impl RuleMatch {
    pub fn no_rule() -> Self {
        Self {
            category: Category::NoRule,
            rule_name: None,
            predicate_description: None,
        }
    }

    fn from_entry(rule: &RoutingRule, entry: &RouteEntry) -> Self {
        match &entry.predicate {
            Some(predicate) => Self {
                category: Category::Canary,
                rule_name: Some(rule.name.clone()),
                predicate_description: Some(predicate.describe()).filter(|d| !d.is_empty()),
            },
            None => Self {
                category: Category::Base,
                rule_name: Some(rule.name.clone()),
                predicate_description: None,
            },
        }
    }
}
