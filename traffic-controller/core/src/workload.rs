use mesh_traffic_controller_k8s_api::Labels;

/// A running workload instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkloadInstance {
    pub name: String,
    pub namespace: Option<String>,
    pub labels: Labels,
}

impl WorkloadInstance {
    /// Returns the service the instance belongs to, if it is labeled with one.
    pub fn service<'w>(&'w self, service_label: &str) -> Option<&'w str> {
        self.labels.service(service_label)
    }
}
