#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use mesh_traffic_controller_core as core;
pub use mesh_traffic_controller_k8s_api as k8s;
pub use mesh_traffic_controller_k8s_snapshot as snapshot;

mod analytics;
mod args;
mod metrics;
mod report;

pub use self::{
    analytics::Analytics,
    args::Args,
    metrics::AnalyticsMetrics,
    report::{ErrorBody, TrafficAnalytics},
};
