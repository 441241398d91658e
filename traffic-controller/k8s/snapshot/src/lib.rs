//! Builds traffic snapshots from cluster objects.
//!
//! Objects are listed through an [`ObjectSource`] as untyped
//! `DynamicObject`s, one generic list call per [`ResourceKind`], and then
//! shaped into the core's typed entities. Shaping is tolerant: an object
//! that lacks a required field is logged and left out of the snapshot, so a
//! single misconfigured resource cannot blank out a report. Listing is not:
//! if any kind cannot be listed, no snapshot is produced.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod routing_rule;
mod source;
pub mod versioning_rule;
pub mod workload;


pub use self::source::{KubeSource, ObjectSource};
use mesh_traffic_controller_core::Snapshot;
use mesh_traffic_controller_k8s_api::{DynamicObject, ResourceExt, ResourceKind};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to list {kind} objects: {source}")]
    List {
        kind: ResourceKind,
        #[source]
        source: kube::Error,
    },

    #[error("{kind} objects are unavailable: {source}")]
    Unavailable {
        kind: ResourceKind,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

/// The reason an object was left out of a snapshot.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Skip {
    #[error("missing {0}")]
    Missing(&'static str),
}

/// Lists every kind from the source and builds a snapshot.
///
/// The kinds are listed concurrently; the first failure aborts the fetch.
pub async fn fetch<S>(source: &S, namespace: Option<&str>) -> Result<Snapshot, Error>
where
    S: ObjectSource + ?Sized,
{
    let (routing_rules, versioning_rules, workloads) = futures::try_join!(
        source.list(ResourceKind::RoutingRule, namespace),
        source.list(ResourceKind::VersioningRule, namespace),
        source.list(ResourceKind::WorkloadInstance, namespace),
    )?;
    Ok(build(&routing_rules, &versioning_rules, &workloads))
}

/// Shapes listed objects into a snapshot, skipping malformed objects.
pub fn build(
    routing_rules: &[DynamicObject],
    versioning_rules: &[DynamicObject],
    workloads: &[DynamicObject],
) -> Snapshot {
    Snapshot {
        routing_rules: adapt_all(
            ResourceKind::RoutingRule,
            routing_rules,
            routing_rule::routing_rule,
        ),
        versioning_rules: adapt_all(
            ResourceKind::VersioningRule,
            versioning_rules,
            versioning_rule::versioning_rule,
        ),
        instances: adapt_all(
            ResourceKind::WorkloadInstance,
            workloads,
            workload::workload_instance,
        ),
    }
}

fn adapt_all<T>(
    kind: ResourceKind,
    objects: &[DynamicObject],
    adapt: impl Fn(&DynamicObject) -> Result<T, Skip>,
) -> Vec<T> {
    let mut skipped = 0usize;
    let adapted = objects
        .iter()
        .filter_map(|obj| match adapt(obj) {
            Ok(item) => Some(item),
            Err(reason) => {
                debug!(
                    %kind,
                    namespace = %obj.namespace().unwrap_or_default(),
                    name = %obj.metadata.name.as_deref().unwrap_or_default(),
                    %reason,
                    "Skipping object"
                );
                skipped += 1;
                None
            }
        })
        .collect::<Vec<_>>();
    if skipped > 0 {
        info!(%kind, skipped, kept = adapted.len(), "Skipped malformed objects");
    }
    adapted
}

/// Reads an object's name, which every entity requires.
pub(crate) fn object_name(obj: &DynamicObject) -> Result<String, Skip> {
    obj.metadata
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .ok_or(Skip::Missing("metadata.name"))
}
