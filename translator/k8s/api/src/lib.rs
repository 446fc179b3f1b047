#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod grpc_route;

pub use self::grpc_route::GrpcRoute;
pub use k8s_gateway_api as gateway;
pub use kube::{
    api::{Api, DeleteParams, ObjectMeta, Patch, PatchParams, Resource, ResourceExt},
    error::ErrorResponse,
    Client, Error,
};

/// Returns true if the API server reported that the requested object does not
/// exist.
pub fn is_not_found(error: &Error) -> bool {
    matches!(error, Error::Api(ErrorResponse { code: 404, .. }))
}

/// Returns true if the API server serves the given resource kind.
///
/// Discovery failures are returned rather than reported as a missing kind.
pub async fn api_resource_exists<T>(client: &Client) -> Result<bool, Error>
where
    T: Resource,
    T::DynamicType: Default,
{
    let dt = Default::default();
    let resources = client
        .list_api_group_resources(&T::api_version(&dt))
        .await?;
    Ok(resources.resources.iter().any(|r| r.kind == T::kind(&dt)))
}
