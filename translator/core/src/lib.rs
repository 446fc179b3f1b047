#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod grpc_route;


pub use self::grpc_route::{has_filters, path_match, translate, InvalidMatch, InvalidReason};
