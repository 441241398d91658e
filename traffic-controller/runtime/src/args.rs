use crate::{analytics::Analytics, k8s::SERVICE_LABEL, metrics::AnalyticsMetrics, snapshot};
use anyhow::{bail, Result};
use clap::Parser;
use prometheus_client::registry::Registry;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[clap(
    name = "traffic",
    about = "Classifies mesh workload instances by the traffic they receive"
)]
pub struct Args {
    #[clap(
        long,
        default_value = "mesh_traffic=info,warn",
        env = "MESH_TRAFFIC_CONTROLLER_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    server: kubert::ServerArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,

    /// Disables the traffic analytics server.
    #[clap(long)]
    analytics_disabled: bool,

    /// The label that names the service a workload instance belongs to.
    #[clap(long, default_value = SERVICE_LABEL)]
    service_label: String,

    /// Scopes requests that don't name a namespace. All namespaces are read
    /// when unset.
    #[clap(long)]
    namespace: Option<String>,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            admin,
            client,
            log_level,
            log_format,
            server,
            analytics_disabled,
            service_label,
            namespace,
        } = self;

        let server = if analytics_disabled {
            None
        } else {
            Some(server)
        };

        let mut prom = <Registry>::default();
        let analytics_metrics =
            AnalyticsMetrics::register(prom.sub_registry_with_prefix("traffic_analytics"));
        let rt_metrics = kubert::RuntimeMetrics::register(prom.sub_registry_with_prefix("kube"));

        let runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_metrics(rt_metrics)
            .with_admin(admin.into_builder().with_prometheus(prom))
            .with_client(client)
            .with_optional_server(server)
            .build()
            .await?;

        info!(
            %service_label,
            namespace = namespace.as_deref().unwrap_or("*"),
            "Serving traffic analytics"
        );
        let source = Arc::new(snapshot::KubeSource::new(runtime.client()));
        let analytics = Analytics::new(source, service_label, namespace, analytics_metrics);
        let runtime = runtime.spawn_server(move || analytics);

        // Block the main thread on the shutdown signal.
        if runtime.run().await.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}
