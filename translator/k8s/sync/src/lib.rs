#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod controller;
mod index;
mod metrics;
mod resource_id;
mod store;


pub use self::{
    controller::Controller,
    index::{target_name, Index, SharedIndex, Update, DEFAULT_ROUTE_NAME_PREFIX},
    metrics::{ControllerMetrics, IndexMetrics},
    resource_id::ResourceId,
    store::{RouteStore, FIELD_MANAGER},
};
