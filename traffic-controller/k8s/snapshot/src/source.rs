use crate::Error;
use kube::api::{Api, ListParams};
use mesh_traffic_controller_k8s_api::{ApiResource, DynamicObject, ResourceKind};
use tracing::{debug, warn};

/// Lists cluster objects of a kind.
///
/// Implementations carry whatever credentials they were built with; the
/// snapshot builder never selects its own.
#[async_trait::async_trait]
pub trait ObjectSource: Send + Sync {
    async fn list(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
    ) -> Result<Vec<DynamicObject>, Error>;
}

/// Lists objects from the Kubernetes API with the given client.
#[derive(Clone)]
pub struct KubeSource {
    client: kube::Client,
}

// === impl KubeSource ===

impl KubeSource {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }

    /// Mesh kinds are custom resources that may not be installed.
    ///
    /// A kind is absent only when its group version is not served or does
    /// not list it. Any other discovery failure is an error.
    async fn resource_exists(
        &self,
        kind: ResourceKind,
        resource: &ApiResource,
    ) -> Result<bool, Error> {
        match self
            .client
            .list_api_group_resources(&resource.api_version)
            .await
        {
            Ok(list) => Ok(list.resources.iter().any(|r| r.kind == resource.kind)),
            Err(kube::Error::Api(rsp)) if rsp.code == 404 => Ok(false),
            Err(source) => Err(Error::List { kind, source }),
        }
    }
}

#[async_trait::async_trait]
impl ObjectSource for KubeSource {
    async fn list(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
    ) -> Result<Vec<DynamicObject>, Error> {
        let resource = kind.api_resource();
        if kind != ResourceKind::WorkloadInstance && !self.resource_exists(kind, &resource).await? {
            warn!(%kind, "Resource kind not found, treating as empty");
            return Ok(Vec::new());
        }

        let api = match namespace {
            Some(ns) => Api::<DynamicObject>::namespaced_with(self.client.clone(), ns, &resource),
            None => Api::<DynamicObject>::all_with(self.client.clone(), &resource),
        };
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|source| Error::List { kind, source })?;
        debug!(%kind, namespace = namespace.unwrap_or_default(), items = list.items.len(), "Listed");
        Ok(list.items)
    }
}
