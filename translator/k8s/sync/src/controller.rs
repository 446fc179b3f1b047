use crate::{index::Update, metrics::ControllerMetrics, store::RouteStore, ResourceId};
use grpcroute_translator_k8s_api::ResourceExt;
use tokio::{sync::mpsc::UnboundedReceiver, time};

/// Applies HTTPRoute writes to the store, one at a time and in order.
///
/// Failed writes are logged and dropped; they are not retried. A subsequent
/// change to the GRPCRoute (or a watch restart) produces a fresh write.
pub struct Controller<S> {
    store: S,
    updates: UnboundedReceiver<Update>,
    write_timeout: time::Duration,
    metrics: ControllerMetrics,
}

impl<S: RouteStore> Controller<S> {
    pub fn new(
        store: S,
        updates: UnboundedReceiver<Update>,
        write_timeout: time::Duration,
        metrics: ControllerMetrics,
    ) -> Self {
        Self {
            store,
            updates,
            write_timeout,
            metrics,
        }
    }

    /// Processes updates until every sender has been dropped.
    pub async fn run(mut self) {
        while let Some(update) = self.updates.recv().await {
            self.process(update).await;
        }
        tracing::debug!("Updates channel closed");
    }

    async fn process(&self, update: Update) {
        let (op, id, res) = match update {
            Update::Upsert(route) => {
                let id = ResourceId::new(route.namespace().unwrap_or_default(), route.name_any());
                let res = time::timeout(self.write_timeout, self.store.upsert(&route)).await;
                ("upsert", id, res)
            }
            Update::Delete(id) => {
                let res = time::timeout(self.write_timeout, self.store.delete(&id)).await;
                ("delete", id, res)
            }
        };

        match res {
            Ok(Ok(())) => {
                self.metrics.write(op, "ok");
                tracing::debug!(namespace = %id.namespace, name = %id.name, op, "Wrote HTTPRoute");
            }
            Ok(Err(error)) => {
                self.metrics.write(op, "error");
                tracing::error!(namespace = %id.namespace, name = %id.name, op, %error, "Failed to write HTTPRoute");
            }
            Err(_) => {
                self.metrics.write(op, "timeout");
                tracing::error!(
                    namespace = %id.namespace,
                    name = %id.name,
                    op,
                    timeout = ?self.write_timeout,
                    "Timed out writing HTTPRoute"
                );
            }
        }
    }
}
