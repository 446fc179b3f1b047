use crate::{k8s, sync};
use anyhow::{bail, Result};
use clap::Parser;
use kube::runtime::watcher;
use prometheus_client::registry::Registry;
use tokio::{sync::mpsc, time::Duration};
use tracing::{info, info_span, Instrument};

#[derive(Debug, Parser)]
#[clap(
    name = "grpcroute-translator",
    about = "Projects Gateway API GRPCRoutes onto equivalent HTTPRoutes"
)]
pub struct Args {
    #[clap(
        long,
        default_value = "grpcroute_translator=info,warn",
        env = "GRPCROUTE_TRANSLATOR_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,

    /// Prefix of the name of each generated HTTPRoute.
    ///
    /// HTTPRoutes are named `<prefix>-<grpcroute name>`, so names with this
    /// prefix must not be used by any other HTTPRoute.
    #[clap(long, default_value = sync::DEFAULT_ROUTE_NAME_PREFIX)]
    route_name_prefix: String,

    /// Only watch GRPCRoutes in this namespace. All namespaces are watched
    /// when unset.
    #[clap(long)]
    namespace: Option<String>,

    #[clap(long, default_value = "5000")]
    write_timeout_ms: u64,

    /// How often every generated HTTPRoute is re-applied, restoring routes
    /// that were edited or deleted out-of-band. Zero disables the resync.
    #[clap(long, default_value = "5")]
    resync_period_secs: u64,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            log_level,
            log_format,
            client,
            admin,
            route_name_prefix,
            namespace,
            write_timeout_ms,
            resync_period_secs,
        } = self;

        let mut prom = <Registry>::default();
        let reg = prom.sub_registry_with_prefix("grpcroute_translator");
        let index_metrics = sync::IndexMetrics::register(reg);
        let controller_metrics = sync::ControllerMetrics::register(reg);

        let mut runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_admin(admin.into_builder().with_prometheus(prom))
            .with_client(client)
            .build()
            .await?;

        if !k8s::api_resource_exists::<k8s::GrpcRoute>(&runtime.client()).await? {
            bail!("grpcroutes.gateway.networking.k8s.io resource kind not found");
        }

        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        let index = sync::Index::shared(route_name_prefix, updates_tx, index_metrics);

        if resync_period_secs > 0 {
            tokio::spawn(
                sync::Index::run(index.clone(), Duration::from_secs(resync_period_secs))
                    .instrument(info_span!("resync")),
            );
        }

        // Spawn the GRPCRoute watch. Every add, update, and delete is applied
        // to the index, which emits the corresponding HTTPRoute writes.
        match namespace {
            Some(ns) => {
                info!(namespace = %ns, "Watching GRPCRoutes");
                let routes = runtime
                    .watch_namespaced::<k8s::GrpcRoute>(ns, watcher::Config::default());
                tokio::spawn(
                    kubert::index::namespaced(index, routes).instrument(info_span!("grpcroutes")),
                );
            }
            None => {
                info!("Watching GRPCRoutes in all namespaces");
                let routes = runtime.watch_all::<k8s::GrpcRoute>(watcher::Config::default());
                tokio::spawn(
                    kubert::index::namespaced(index, routes).instrument(info_span!("grpcroutes")),
                );
            }
        }

        // Spawn the controller that writes HTTPRoutes to the API server.
        let controller = sync::Controller::new(
            runtime.client(),
            updates_rx,
            Duration::from_millis(write_timeout_ms),
            controller_metrics,
        );
        tokio::spawn(controller.run().instrument(info_span!("controller")));

        // Block the main thread on the shutdown signal.
        if runtime.run().await.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}
