/// Inbound ports (Driving ports) - Use case interfaces
///
/// These ports define the interfaces that external adapters (e.g., CLI)
/// use to interact with the application core.
pub mod workspace_scan_port;

pub use workspace_scan_port::WorkspaceScanPort;
