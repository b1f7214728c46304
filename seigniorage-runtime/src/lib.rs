pub mod error;
pub mod types;
pub mod config;
pub mod units;
pub mod contracts;
pub mod chain;
pub mod registry;
pub mod token;
pub mod gas;
pub mod price_route;
pub mod stats;
pub mod treasury;
pub mod boardroom;
pub mod bank;
pub mod client;

pub use client::SeigniorageClient;
pub use error::ProtocolError;
pub use types::*;
