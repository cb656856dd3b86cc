pub mod config;
pub mod error;
pub mod http;
pub mod server;

pub use config::BridgeConfig;
pub use error::GatewayError;
pub use server::run;
