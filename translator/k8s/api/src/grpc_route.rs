use k8s_gateway_api as gateway;

/// GRPCRoute provides a way to route gRPC requests by service and method.
///
/// Match types are kept as the strings found on the wire, so that a route with
/// an unsupported or under-specified match still decodes and can be rejected
/// on its own rather than failing the whole watch.
#[derive(
    Clone,
    Debug,
    kube::CustomResource,
    serde::Deserialize,
    serde::Serialize,
    schemars::JsonSchema,
)]
#[kube(
    group = "gateway.networking.k8s.io",
    version = "v1alpha2",
    kind = "GRPCRoute",
    root = "GrpcRoute",
    namespaced
)]
pub struct GrpcRouteSpec {
    /// Common route information.
    #[serde(flatten)]
    pub inner: gateway::CommonRouteSpec,

    /// Hostnames that are matched against the request's `:authority`.
    pub hostnames: Option<Vec<String>>,

    /// Rules are a list of gRPC matchers and backends.
    pub rules: Option<Vec<GrpcRouteRule>>,
}

#[derive(
    Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize, schemars::JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub struct GrpcRouteRule {
    /// Each match is independent: the rule applies if any one of them does.
    pub matches: Option<Vec<GrpcRouteMatch>>,

    /// Filters are carried opaquely; they are never translated.
    pub filters: Option<Vec<serde_json::Value>>,

    pub backend_refs: Option<Vec<GrpcRouteBackendRef>>,
}

#[derive(
    Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize, schemars::JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub struct GrpcRouteMatch {
    pub method: Option<GrpcMethodMatch>,
    pub headers: Option<Vec<GrpcHeaderMatch>>,
}

/// Selects requests by gRPC service and method.
///
/// `type` defaults to `Exact` when unset.
#[derive(
    Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize, schemars::JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub struct GrpcMethodMatch {
    #[serde(rename = "type")]
    pub r#type: Option<String>,
    pub service: Option<String>,
    pub method: Option<String>,
}

/// Selects requests by header value. `type` defaults to `Exact` when unset.
#[derive(
    Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize, schemars::JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub struct GrpcHeaderMatch {
    #[serde(rename = "type")]
    pub r#type: Option<String>,
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GrpcRouteBackendRef {
    pub weight: Option<u16>,

    #[serde(flatten)]
    pub inner: gateway::BackendObjectReference,

    pub filters: Option<Vec<serde_json::Value>>,
}
