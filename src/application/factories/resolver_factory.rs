use crate::adapters::outbound::tooling::{
    GoResolver, GradleResolver, MavenResolver, NpmResolver, PypiResolver, ToolCommand,
};
use crate::ports::outbound::DependencyResolver;
use crate::scan_engine::domain::Ecosystem;
use std::sync::Arc;
use std::time::Duration;

/// Factory for creating the tool-backed dependency resolver of each ecosystem
pub struct ResolverFactory;

impl ResolverFactory {
    /// Creates the resolver for `ecosystem`, limiting each tool run to `timeout`
    pub fn create(ecosystem: Ecosystem, timeout: Duration) -> Arc<dyn DependencyResolver> {
        match ecosystem {
            Ecosystem::Maven => Arc::new(MavenResolver::with_command(
                ToolCommand::new("mvn").with_timeout(timeout),
            )),
            Ecosystem::Gradle => Arc::new(GradleResolver::with_command(
                ToolCommand::new("gradle").with_timeout(timeout),
            )),
            Ecosystem::Npm => Arc::new(NpmResolver::with_command(
                ToolCommand::new("npm").with_timeout(timeout),
            )),
            Ecosystem::Go => Arc::new(GoResolver::with_command(
                ToolCommand::new("go").with_timeout(timeout),
            )),
            Ecosystem::Pypi => {
                let python3 = ToolCommand::new("python3");
                let command = if python3.is_available() {
                    python3
                } else {
                    ToolCommand::new("python")
                };
                Arc::new(PypiResolver::with_command(command.with_timeout(timeout)))
            }
        }
    }

    /// One resolver per supported ecosystem
    pub fn create_all(timeout: Duration) -> Vec<Arc<dyn DependencyResolver>> {
        Ecosystem::ALL
            .iter()
            .map(|ecosystem| Self::create(*ecosystem, timeout))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_reports_requested_ecosystem() {
        for ecosystem in Ecosystem::ALL {
            let resolver = ResolverFactory::create(ecosystem, Duration::from_secs(1));
            assert_eq!(resolver.ecosystem(), ecosystem);
        }
    }

    #[test]
    fn test_create_all_covers_every_ecosystem() {
        let resolvers = ResolverFactory::create_all(Duration::from_secs(1));
        assert_eq!(resolvers.len(), Ecosystem::ALL.len());
    }
}
