use grpcroute_translator_k8s_api::{gateway as http, grpc_route as grpc};

/// A GRPCRoute match that cannot be expressed as an HTTPRoute match.
///
/// The whole route is rejected; no partial HTTPRoute is ever produced.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("rule {rule} match {index}: {reason}")]
pub struct InvalidMatch {
    pub rule: usize,
    pub index: usize,
    pub reason: InvalidReason,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvalidReason {
    #[error("method match specified but neither service nor method given")]
    UnderSpecified,

    #[error("unsupported method match type {0:?}")]
    UnsupportedMethodType(String),

    #[error("unsupported header match type {0:?}")]
    UnsupportedHeaderType(String),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum MatchKind {
    Exact,
    RegularExpression,
}

/// Translates a GRPCRoute spec into the equivalent HTTPRoute spec.
///
/// Hostnames and parent references are copied verbatim. Each rule yields
/// exactly one HTTPRoute rule and each match exactly one HTTPRoute match, in
/// the same order. Filters are not translated.
pub fn translate(spec: &grpc::GrpcRouteSpec) -> Result<http::HttpRouteSpec, InvalidMatch> {
    let rules = spec
        .rules
        .as_ref()
        .map(|rules| {
            rules
                .iter()
                .enumerate()
                .map(|(idx, rule)| rule_to_http(idx, rule))
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?;

    Ok(http::HttpRouteSpec {
        inner: http::CommonRouteSpec {
            parent_refs: spec.inner.parent_refs.clone(),
        },
        hostnames: spec.hostnames.clone(),
        rules,
    })
}

/// Maps a gRPC method match onto an HTTP path match.
///
/// gRPC requests are HTTP/2 requests to `/{service}/{method}`. An unset type
/// means `Exact`, and empty strings are treated as unset. A match naming
/// neither a service nor a method would match every request, so it is an
/// error rather than an absent path.
pub fn path_match(
    method_match: &grpc::GrpcMethodMatch,
) -> Result<http::HttpPathMatch, InvalidReason> {
    let kind = match_kind(method_match.r#type.as_deref())
        .ok_or_else(|| InvalidReason::UnsupportedMethodType(type_name(&method_match.r#type)))?;
    let service = non_empty(&method_match.service);
    let method = non_empty(&method_match.method);

    match kind {
        MatchKind::Exact => match (service, method) {
            (Some(svc), Some(method)) => Ok(http::HttpPathMatch::Exact {
                value: format!("/{svc}/{method}"),
            }),
            (Some(svc), None) => Ok(http::HttpPathMatch::PathPrefix {
                value: format!("/{svc}/"),
            }),
            (None, Some(method)) => Ok(http::HttpPathMatch::RegularExpression {
                value: format!("/.+/{method}"),
            }),
            (None, None) => Err(InvalidReason::UnderSpecified),
        },

        // A regular expression match is never collapsed into an exact or
        // prefix match, even when both components are present.
        MatchKind::RegularExpression => {
            let value = match (service, method) {
                (Some(svc), Some(method)) => format!("/{svc}/{method}"),
                (Some(svc), None) => format!("/{svc}/.+"),
                (None, Some(method)) => format!("/.+/{method}"),
                (None, None) => return Err(InvalidReason::UnderSpecified),
            };
            Ok(http::HttpPathMatch::RegularExpression { value })
        }
    }
}

/// Returns true if any rule or backend reference in the spec carries filters,
/// which are dropped by [`translate`].
pub fn has_filters(spec: &grpc::GrpcRouteSpec) -> bool {
    spec.rules.iter().flatten().any(|rule| {
        rule.filters.as_ref().is_some_and(|f| !f.is_empty())
            || rule
                .backend_refs
                .iter()
                .flatten()
                .any(|backend| backend.filters.as_ref().is_some_and(|f| !f.is_empty()))
    })
}

fn rule_to_http(
    rule_idx: usize,
    grpc::GrpcRouteRule {
        matches,
        backend_refs,
        ..
    }: &grpc::GrpcRouteRule,
) -> Result<http::HttpRouteRule, InvalidMatch> {
    let matches = matches
        .as_ref()
        .map(|matches| {
            matches
                .iter()
                .enumerate()
                .map(|(idx, m)| {
                    match_to_http(m).map_err(|reason| InvalidMatch {
                        rule: rule_idx,
                        index: idx,
                        reason,
                    })
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?;

    let backend_refs = backend_refs
        .as_ref()
        .map(|backends| backends.iter().map(backend_to_http).collect());

    Ok(http::HttpRouteRule {
        matches,
        filters: None,
        backend_refs,
    })
}

fn match_to_http(
    grpc::GrpcRouteMatch { method, headers }: &grpc::GrpcRouteMatch,
) -> Result<http::HttpRouteMatch, InvalidReason> {
    let path = method.as_ref().map(path_match).transpose()?;

    let headers = headers
        .as_ref()
        .map(|headers| headers.iter().map(header_match).collect::<Result<Vec<_>, _>>())
        .transpose()?;

    Ok(http::HttpRouteMatch {
        path,
        headers,
        query_params: None,
        method: None,
    })
}

fn header_match(
    grpc::GrpcHeaderMatch {
        r#type,
        name,
        value,
    }: &grpc::GrpcHeaderMatch,
) -> Result<http::HttpHeaderMatch, InvalidReason> {
    let name = name.clone();
    let value = value.clone();
    match match_kind(r#type.as_deref()) {
        Some(MatchKind::Exact) => Ok(http::HttpHeaderMatch::Exact { name, value }),
        Some(MatchKind::RegularExpression) => {
            Ok(http::HttpHeaderMatch::RegularExpression { name, value })
        }
        None => Err(InvalidReason::UnsupportedHeaderType(type_name(r#type))),
    }
}

fn backend_to_http(
    grpc::GrpcRouteBackendRef { weight, inner, .. }: &grpc::GrpcRouteBackendRef,
) -> http::HttpBackendRef {
    http::HttpBackendRef {
        backend_ref: Some(http::BackendRef {
            weight: *weight,
            inner: inner.clone(),
        }),
        filters: None,
    }
}

fn match_kind(r#type: Option<&str>) -> Option<MatchKind> {
    match r#type {
        None | Some("Exact") => Some(MatchKind::Exact),
        Some("RegularExpression") => Some(MatchKind::RegularExpression),
        Some(_) => None,
    }
}

fn type_name(r#type: &Option<String>) -> String {
    r#type.clone().unwrap_or_default()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
