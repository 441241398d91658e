use crate::{object_name, Skip};
use mesh_traffic_controller_core::WorkloadInstance;
use mesh_traffic_controller_k8s_api::{DynamicObject, Labels, ResourceExt};

pub fn workload_instance(obj: &DynamicObject) -> Result<WorkloadInstance, Skip> {
    Ok(WorkloadInstance {
        name: object_name(obj)?,
        namespace: obj.namespace(),
        labels: Labels::from(obj.labels().clone()),
    })
}
