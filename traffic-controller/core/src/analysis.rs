use crate::{
    routing::{classify_in, Category, RoutingRule, RuleMatch},
    subset::{subsets_matching_labels, VersioningIndex, VersioningRule},
    workload::WorkloadInstance,
};
use mesh_traffic_controller_k8s_api::SERVICE_LABEL;

/// The objects one analysis runs against.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub routing_rules: Vec<RoutingRule>,
    pub versioning_rules: Vec<VersioningRule>,
    pub instances: Vec<WorkloadInstance>,
}

/// Describes the traffic one workload instance receives for one of its
/// subsets, or for its service as a whole.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassificationRecord {
    pub instance_name: String,
    pub namespace: Option<String>,

    /// Empty when the instance has no service label.
    pub service_name: String,
    pub rule_name: Option<String>,
    pub category: Category,
    pub subset: Option<String>,
    pub predicate_description: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Totals {
    pub instance_count: usize,
    pub rule_count: usize,
    pub versioning_rule_count: usize,
    pub base_count: usize,
    pub canary_count: usize,
    pub no_rule_count: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassificationReport {
    pub records: Vec<ClassificationRecord>,
    pub totals: Totals,
}

/// Classifies every workload instance in the snapshot, tying instances to
/// services with the conventional `app` label.
pub fn analyze(snapshot: &Snapshot) -> ClassificationReport {
    analyze_with(snapshot, SERVICE_LABEL)
}

/// Classifies every workload instance in the snapshot, tying instances to
/// services with `service_label`.
///
/// Every instance yields at least one record, and one record per subset it
/// belongs to. Records are ordered by instance and then by subset
/// declaration order.
pub fn analyze_with(snapshot: &Snapshot, service_label: &str) -> ClassificationReport {
    let versioning = VersioningIndex::new(&snapshot.versioning_rules);

    let mut records = Vec::with_capacity(snapshot.instances.len());
    for instance in &snapshot.instances {
        classify_instance(
            instance,
            service_label,
            &versioning,
            &snapshot.routing_rules,
            &mut records,
        );
    }

    let totals = Totals::tally(&records, snapshot);
    tracing::debug!(
        records = records.len(),
        base = totals.base_count,
        canary = totals.canary_count,
        no_rule = totals.no_rule_count,
        "Classified workload instances"
    );
    ClassificationReport { records, totals }
}

fn classify_instance(
    instance: &WorkloadInstance,
    service_label: &str,
    versioning: &VersioningIndex<'_>,
    routing_rules: &[RoutingRule],
    records: &mut Vec<ClassificationRecord>,
) {
    let Some(service) = instance.service(service_label) else {
        tracing::trace!(instance = %instance.name, "Instance has no service label");
        records.push(ClassificationRecord::new(
            instance,
            "",
            None,
            RuleMatch::no_rule(),
        ));
        return;
    };

    let namespace = instance.namespace.as_deref();
    let subsets = versioning
        .resolve(service, namespace)
        .map(|rule| subsets_matching_labels(rule, &instance.labels))
        .unwrap_or_default();

    if subsets.is_empty() {
        tracing::trace!(instance = %instance.name, %service, "Classifying whole service");
        let m = classify_in(service, namespace, None, routing_rules);
        records.push(ClassificationRecord::new(instance, service, None, m));
        return;
    }

    for subset in subsets {
        let m = classify_in(service, namespace, Some(subset), routing_rules);
        records.push(ClassificationRecord::new(instance, service, Some(subset), m));
    }
}

// === impl ClassificationRecord ===

impl ClassificationRecord {
    fn new(
        instance: &WorkloadInstance,
        service: &str,
        subset: Option<&str>,
        RuleMatch {
            category,
            rule_name,
            predicate_description,
        }: RuleMatch,
    ) -> Self {
        Self {
            instance_name: instance.name.clone(),
            namespace: instance.namespace.clone(),
            service_name: service.to_string(),
            rule_name,
            category,
            subset: subset.map(Into::into),
            predicate_description,
        }
    }
}

// === impl Totals ===

impl Totals {
    /// Counts records by category, alongside the sizes of the snapshot's
    /// collections.
    pub fn tally(records: &[ClassificationRecord], snapshot: &Snapshot) -> Self {
        let mut totals = Self {
            instance_count: snapshot.instances.len(),
            rule_count: snapshot.routing_rules.len(),
            versioning_rule_count: snapshot.versioning_rules.len(),
            ..Default::default()
        };
        for record in records {
            match record.category {
                Category::Base => totals.base_count += 1,
                Category::Canary => totals.canary_count += 1,
                Category::NoRule => totals.no_rule_count += 1,
            }
        }
        totals
    }

    pub fn record_count(&self) -> usize {
        self.base_count + self.canary_count + self.no_rule_count
    }
}
