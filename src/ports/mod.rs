/// Ports of the scan engine
///
/// Inbound ports are the entry points drivers (the CLI) call; outbound ports
/// are the tooling, network, cache and notification seams the scan managers
/// depend on.
pub mod inbound;
pub mod outbound;
