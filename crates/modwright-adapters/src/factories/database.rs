//! Cassandra database module factory.

use modwright_core::{
    application::ports::VersionRegistry,
    domain::{DependencyEntry, ModuleDescriptor},
    error::ModwrightResult,
};

use super::ModuleProperties;

const COMPOSE_FILE: &str = "docker/cassandra.yml";
const DATACENTER: &str = "datacenter1";

/// Builds the Cassandra module: a docker compose file, driver and test
/// dependencies pinned through version aliases, an executable keyspace
/// bootstrap script, and main/test connection properties.
pub struct DatabaseModuleFactory {
    registry: Box<dyn VersionRegistry>,
}

impl DatabaseModuleFactory {
    pub fn new(registry: Box<dyn VersionRegistry>) -> Self {
        Self { registry }
    }

    pub fn build_module(&self, properties: &ModuleProperties) -> ModwrightResult<ModuleDescriptor> {
        let keyspace = properties.project_name().replace('-', "_");

        let module = ModuleDescriptor::builder("cassandra")
            .context()
            .put("cassandraImage", self.image_tag())
            .put("datacenter", DATACENTER)
            .put("keyspace", keyspace.as_str())
            .and()
            .documentation("Cassandra", "database/cassandra.md")
            .startup_command(format!("docker compose -f {COMPOSE_FILE} up -d"))
            .dependencies()
            .add(
                DependencyEntry::new("io.datastore", "cassandra-driver")
                    .version_alias("cassandra-driver"),
            )
            .add(
                DependencyEntry::new("io.testkit", "cassandra")
                    .version_alias("testkit")
                    .test_scope(),
            )
            .and()
            .files()
            .add("database/cassandra.yml", COMPOSE_FILE)
            .add_executable("database/init-keyspace.sh", "scripts/init-keyspace.sh")
            .and()
            .main_properties()
            .set("cassandra.contact-points", "127.0.0.1")
            .set("cassandra.port", 9042i64)
            .set("cassandra.local-datacenter", DATACENTER)
            .set("cassandra.schema-action", "none")
            .and()
            .test_properties()
            .set("cassandra.port", "${TEST_CASSANDRA_PORT}")
            .set("cassandra.contact-points", "${TEST_CASSANDRA_CONTACT_POINT}")
            .set("cassandra.local-datacenter", "${TEST_CASSANDRA_DC}")
            .set("cassandra.keyspace-name", keyspace.as_str())
            .set("cassandra.schema-action", "create_if_not_exists")
            .and()
            .build()?;

        Ok(module)
    }

    fn image_tag(&self) -> String {
        self.registry
            .image_tag("cassandra")
            .unwrap_or_else(|| "latest".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::StaticVersionRegistry;
    use modwright_core::domain::{ContextValue, PropertyTarget, PropertyValue};

    fn factory() -> DatabaseModuleFactory {
        DatabaseModuleFactory::new(Box::new(StaticVersionRegistry::with_defaults()))
    }

    #[test]
    fn test_dependency_uses_a_version_alias() {
        let module = factory()
            .build_module(&ModuleProperties::new("shop"))
            .unwrap();

        let test_dep = module
            .changeset()
            .dependency_adds()
            .map(|(_, d)| d)
            .find(|d| d.artifact == "cassandra")
            .unwrap();
        assert_eq!(test_dep.version_alias.as_deref(), Some("testkit"));
        assert_eq!(test_dep.version, None);
    }

    #[test]
    fn keyspace_is_a_valid_identifier() {
        let module = factory()
            .build_module(&ModuleProperties::new("my-shop"))
            .unwrap();

        assert_eq!(
            module.context().get("keyspace"),
            Some(&ContextValue::from("my_shop"))
        );
        let keyspace = module
            .changeset()
            .property_sets(PropertyTarget::Test)
            .map(|(_, p)| p)
            .find(|p| p.key == "cassandra.keyspace-name")
            .unwrap();
        assert_eq!(keyspace.value, PropertyValue::from("my_shop"));
    }

    #[test]
    fn bootstrap_script_is_executable() {
        let module = factory()
            .build_module(&ModuleProperties::new("shop"))
            .unwrap();

        let script = module
            .changeset()
            .file_placements()
            .map(|(_, f)| f)
            .find(|f| f.destination.as_str() == "scripts/init-keyspace.sh")
            .unwrap();
        assert!(script.executable);
    }
}
