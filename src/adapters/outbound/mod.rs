/// Outbound adapters - Infrastructure implementations of outbound ports
pub mod console;
pub mod events;
pub mod filesystem;
pub mod formatters;
pub mod network;
pub mod tooling;
