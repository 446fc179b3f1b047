#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use grpcroute_translator_core as core;
pub use grpcroute_translator_k8s_api as k8s;
pub use grpcroute_translator_k8s_sync as sync;

mod args;

pub use self::args::Args;
