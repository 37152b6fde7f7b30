/// Adapters layer
///
/// Concrete outbound implementations: ecosystem tool runners, the Xray
/// client, the on-disk result cache, report formatters and presenters.
pub mod outbound;
