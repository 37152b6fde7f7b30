/// Network adapters for the vulnerability-intelligence service
mod xray_client;

pub use xray_client::{XrayClient, XrayCredentials, MINIMUM_XRAY_VERSION};
