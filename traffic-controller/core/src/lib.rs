//! Mesh traffic classification
//!
//! Given snapshots of routing rules (`VirtualService`), versioning rules
//! (`DestinationRule`) and workload instances (`Pod`), the engine reports
//! which class of traffic each instance receives and which rule and predicate
//! are responsible:
//!
//! ```text
//! [ Pod ] -> labels -> [ DestinationRule subset ] <- route target <- [ VirtualService ]
//! ```
//!
//! An instance is first tied to a service through its service label. The
//! service's versioning rule partitions instances into subsets by label
//! selector, and each subset the instance belongs to is classified against
//! the routing rules independently. Instances in no subset are classified
//! against the service as a whole.
//!
//! The engine is a pure function of its inputs: it performs no I/O, holds no
//! state across calls and resolves every ambiguity by input order.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod analysis;
mod host_match;
pub mod predicate;
pub mod routing;
pub mod subset;
pub mod workload;


pub use self::{
    analysis::{analyze, analyze_with, ClassificationRecord, ClassificationReport, Snapshot, Totals},
    host_match::HostMatch,
    predicate::{MatchBlock, MatchPredicate, StringMatch},
    routing::{classify, classify_in, Category, RouteEntry, RouteTarget, RoutingRule, RuleMatch},
    subset::{resolve_service, resolve_service_in, subsets_matching_labels, Subset, VersioningIndex, VersioningRule},
    workload::WorkloadInstance,
};
pub use mesh_traffic_controller_k8s_api::{Labels, Selector, SERVICE_LABEL};
