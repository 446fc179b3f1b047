use crate::resource_id::ResourceId;
use anyhow::{anyhow, Result};
use grpcroute_translator_k8s_api::{self as k8s, gateway, ResourceExt};

pub const FIELD_MANAGER: &str = "grpcroute-translator";

/// The store into which generated HTTPRoutes are written.
///
/// Both operations must be idempotent: upserting identical content twice is
/// harmless and deleting an absent route succeeds.
#[async_trait::async_trait]
pub trait RouteStore {
    async fn upsert(&self, route: &gateway::HttpRoute) -> Result<()>;

    async fn delete(&self, id: &ResourceId) -> Result<()>;
}

#[async_trait::async_trait]
impl RouteStore for k8s::Client {
    async fn upsert(&self, route: &gateway::HttpRoute) -> Result<()> {
        let namespace = route
            .namespace()
            .ok_or_else(|| anyhow!("HTTPRoute {} has no namespace", route.name_any()))?;
        let api = k8s::Api::<gateway::HttpRoute>::namespaced(self.clone(), &namespace);

        // Server-side apply creates the route if it is absent and otherwise
        // replaces the fields owned by this controller.
        let params = k8s::PatchParams::apply(FIELD_MANAGER).force();
        api.patch(&route.name_any(), &params, &k8s::Patch::Apply(route))
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &ResourceId) -> Result<()> {
        let api = k8s::Api::<gateway::HttpRoute>::namespaced(self.clone(), &id.namespace);
        match api.delete(&id.name, &k8s::DeleteParams::default()).await {
            Ok(_) => Ok(()),
            Err(error) if k8s::is_not_found(&error) => {
                tracing::debug!(namespace = %id.namespace, name = %id.name, "HTTPRoute already deleted");
                Ok(())
            }
            Err(error) => Err(error.into()),
        }
    }
}
