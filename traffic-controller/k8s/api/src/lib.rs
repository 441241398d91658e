#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod document;
pub mod labels;

pub use self::{
    document::Document,
    labels::{Labels, Selector, SERVICE_LABEL},
};
pub use k8s_openapi::api::core::v1::Pod;
pub use kube::core::{ApiResource, DynamicObject, GroupVersionKind, ObjectMeta, ResourceExt};
use std::fmt;

/// API group of the mesh networking resources.
pub const NETWORKING_GROUP: &str = "networking.istio.io";

pub const NETWORKING_VERSION: &str = "v1beta1";

/// The kinds of cluster objects read to build a traffic snapshot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// `VirtualService`: how requests for a host are routed.
    RoutingRule,
    /// `DestinationRule`: named, label-selected subsets of a host.
    VersioningRule,
    /// `Pod`: a running workload instance.
    WorkloadInstance,
}

// === impl ResourceKind ===

impl ResourceKind {
    pub const ALL: [Self; 3] = [
        Self::RoutingRule,
        Self::VersioningRule,
        Self::WorkloadInstance,
    ];

    pub fn kind(self) -> &'static str {
        match self {
            Self::RoutingRule => "VirtualService",
            Self::VersioningRule => "DestinationRule",
            Self::WorkloadInstance => "Pod",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            Self::RoutingRule => "virtualservices",
            Self::VersioningRule => "destinationrules",
            Self::WorkloadInstance => "pods",
        }
    }

    pub fn api_resource(self) -> ApiResource {
        match self {
            Self::WorkloadInstance => ApiResource::erase::<Pod>(&()),
            Self::RoutingRule | Self::VersioningRule => ApiResource::from_gvk_with_plural(
                &GroupVersionKind::gvk(NETWORKING_GROUP, NETWORKING_VERSION, self.kind()),
                self.plural(),
            ),
        }
    }

    /// The REST path of the kind's collection, optionally scoped to a
    /// namespace.
    pub fn collection_path(self, namespace: Option<&str>) -> String {
        let prefix = match self {
            Self::WorkloadInstance => "/api/v1".to_string(),
            Self::RoutingRule | Self::VersioningRule => {
                format!("/apis/{NETWORKING_GROUP}/{NETWORKING_VERSION}")
            }
        };
        match namespace {
            Some(ns) => format!("{prefix}/namespaces/{ns}/{}", self.plural()),
            None => format!("{prefix}/{}", self.plural()),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}
