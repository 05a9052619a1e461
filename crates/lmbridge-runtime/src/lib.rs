#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

mod bridge;
mod config;
mod dylib;
mod error;
pub mod frame;
mod handle;
mod payload;
mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use bridge::Bridge;
pub use config::BridgeConfig;
pub use dylib::DylibEngine;
pub use error::BridgeError;
pub use frame::{EngineErrorFrame, Frame};
pub use handle::{EngineHandle, TaskGuard};
pub use payload::build_request_json;
pub use service::LocalChatService;
