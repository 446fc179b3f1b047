use crate::{metrics::IndexMetrics, resource_id::ResourceId};
use ahash::AHashMap as HashMap;
use grpcroute_translator_k8s_api::{self as k8s, gateway, GrpcRoute, Resource, ResourceExt};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::{sync::mpsc::UnboundedSender, time};

pub const DEFAULT_ROUTE_NAME_PREFIX: &str = "grpcroute-translator";

pub(crate) const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";
pub(crate) const SOURCE_LABEL: &str = "grpcroute-translator/source";

pub type SharedIndex = Arc<RwLock<Index>>;

/// Tracks GRPCRoutes and emits the HTTPRoute writes that keep their
/// translations in sync.
///
/// The index never talks to the API server itself. Writes are sent to the
/// [`Controller`](crate::Controller) in the order in which events are observed.
pub struct Index {
    route_name_prefix: String,
    updates: UnboundedSender<Update>,

    /// The last HTTPRoute sent to the controller for each GRPCRoute, keyed by
    /// the GRPCRoute's id.
    synced: HashMap<ResourceId, gateway::HttpRoute>,

    metrics: IndexMetrics,
}

/// A write against the HTTPRoute store.
#[derive(Clone, Debug)]
pub enum Update {
    /// Create the HTTPRoute, or replace it if it already exists.
    Upsert(gateway::HttpRoute),
    /// Delete the HTTPRoute. Deleting a route that does not exist succeeds.
    Delete(ResourceId),
}

/// Returns the name of the HTTPRoute generated for the named GRPCRoute.
pub fn target_name(prefix: &str, source: &str) -> String {
    format!("{prefix}-{source}")
}

// === impl Index ===

impl Index {
    pub fn shared(
        route_name_prefix: impl ToString,
        updates: UnboundedSender<Update>,
        metrics: IndexMetrics,
    ) -> SharedIndex {
        Arc::new(RwLock::new(Self {
            route_name_prefix: route_name_prefix.to_string(),
            updates,
            synced: HashMap::new(),
            metrics,
        }))
    }

    /// Periodically re-sends the last translation of every synced GRPCRoute
    /// so that HTTPRoutes edited or removed by someone else are restored.
    ///
    /// Returns once the controller has stopped receiving updates. `period`
    /// must be non-zero.
    pub async fn run(index: SharedIndex, period: time::Duration) {
        let mut resync = time::interval(period);
        resync.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        // The first tick completes immediately, while the watch is still
        // applying the initial list.
        resync.tick().await;
        loop {
            resync.tick().await;
            if !index.read().resync() {
                tracing::debug!("HTTPRoute updates closed");
                return;
            }
        }
    }

    pub fn is_synced(&self, namespace: &str, name: &str) -> bool {
        self.synced
            .contains_key(&ResourceId::new(namespace.to_string(), name.to_string()))
    }

    /// Re-sends an upsert for every synced route. Returns false if the
    /// controller is no longer receiving updates.
    fn resync(&self) -> bool {
        if self.updates.is_closed() {
            return false;
        }

        tracing::debug!(routes = self.synced.len(), "Resyncing HTTPRoutes");
        for route in self.synced.values() {
            if self.updates.send(Update::Upsert(route.clone())).is_err() {
                return false;
            }
        }
        self.metrics.resynced(self.synced.len());
        true
    }

    fn target_id(&self, source: &ResourceId) -> ResourceId {
        ResourceId::new(
            source.namespace.clone(),
            target_name(&self.route_name_prefix, &source.name),
        )
    }

    fn make_http_route(
        &self,
        target: &ResourceId,
        route: &GrpcRoute,
        spec: gateway::HttpRouteSpec,
    ) -> gateway::HttpRoute {
        let labels = [
            (MANAGED_BY_LABEL.to_string(), self.route_name_prefix.clone()),
            (SOURCE_LABEL.to_string(), route.name_unchecked()),
        ]
        .into_iter()
        .collect();

        gateway::HttpRoute {
            metadata: k8s::ObjectMeta {
                name: Some(target.name.clone()),
                namespace: Some(target.namespace.clone()),
                labels: Some(labels),
                // Only set when the GRPCRoute has a UID, i.e. it was read from
                // the API server.
                owner_references: route.controller_owner_ref(&()).map(|owner| vec![owner]),
                ..Default::default()
            },
            spec,
            status: None,
        }
    }

    fn send(&self, update: Update) {
        if let Err(error) = self.updates.send(update) {
            tracing::error!(%error, "Failed to send HTTPRoute update");
        }
    }
}

impl kubert::index::IndexNamespacedResource<GrpcRoute> for Index {
    fn apply(&mut self, route: GrpcRoute) {
        let Some(namespace) = route.namespace() else {
            tracing::warn!(name = %route.name_any(), "Ignoring GRPCRoute without a namespace");
            return;
        };
        let name = route.name_unchecked();
        let id = ResourceId::new(namespace, name);

        let spec = match grpcroute_translator_core::translate(&route.spec) {
            Ok(spec) => spec,
            Err(error) => {
                self.metrics.translation_failed();
                // A previously generated HTTPRoute, if any, is left in place.
                tracing::info!(namespace = %id.namespace, name = %id.name, %error, "Ignoring GRPCRoute");
                return;
            }
        };
        self.metrics.translated();

        if grpcroute_translator_core::has_filters(&route.spec) {
            tracing::info!(namespace = %id.namespace, name = %id.name, "GRPCRoute filters are not translated");
        }

        let target = self.target_id(&id);
        if self.synced.contains_key(&id) {
            tracing::info!(namespace = %id.namespace, name = %id.name, httproute = %target.name, "Updating HTTPRoute");
        } else {
            tracing::info!(namespace = %id.namespace, name = %id.name, httproute = %target.name, "Creating HTTPRoute");
        }

        let http_route = self.make_http_route(&target, &route, spec);
        self.send(Update::Upsert(http_route.clone()));
        self.synced.insert(id, http_route);
    }

    fn delete(&mut self, namespace: String, name: String) {
        let id = ResourceId::new(namespace, name);
        // The route may have been written by an earlier process even if it was
        // never synced by this one, so the delete is always sent.
        self.synced.remove(&id);
        let target = self.target_id(&id);
        tracing::info!(namespace = %id.namespace, name = %id.name, httproute = %target.name, "Deleting HTTPRoute");
        self.metrics.deleted();
        self.send(Update::Delete(target));
    }

    // Resets are handled by the default implementation: every live route is
    // re-applied and every removed route is deleted.
}
