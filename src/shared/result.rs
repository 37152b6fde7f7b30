/// Result type used across the workspace scanner; errors carry context chains
pub type Result<T> = anyhow::Result<T>;
