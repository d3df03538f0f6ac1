//! Message broker module factory.

use modwright_core::{
    application::ports::VersionRegistry,
    domain::{DependencyEntry, ModuleDescriptor, ReplacementRule},
    error::ModwrightResult,
};

use super::ModuleProperties;

const BROKER_IMAGE: &str = "streams/broker";
const COORDINATOR_IMAGE: &str = "streams/coordinator";
const COMPOSE_FILE: &str = "docker/broker.yml";
const SERVICES_MARKER: &str = "<!-- modwright:services -->";

/// Builds the message broker module: a docker compose file, client and test
/// dependencies, connection properties, and a README services entry.
pub struct BrokerModuleFactory {
    registry: Box<dyn VersionRegistry>,
}

impl BrokerModuleFactory {
    pub fn new(registry: Box<dyn VersionRegistry>) -> Self {
        Self { registry }
    }

    pub fn build_module(&self, properties: &ModuleProperties) -> ModwrightResult<ModuleDescriptor> {
        let project = properties.project_name();

        let module = ModuleDescriptor::builder("message-broker")
            .context()
            .put("brokerImage", self.image(BROKER_IMAGE))
            .put("coordinatorImage", self.image(COORDINATOR_IMAGE))
            .and()
            .documentation("Message Broker", "broker/broker.md")
            .dependencies()
            .add(self.client_dependency())
            .add(DependencyEntry::new("io.testkit", "broker").test_scope())
            .and()
            .files()
            .add("broker/broker.yml", COMPOSE_FILE)
            .and()
            .replacements()
            .add(ReplacementRule::insert_after_marker(
                "README.md",
                SERVICES_MARKER,
                format!("- Message broker (`{COMPOSE_FILE}`)"),
            ))
            .and()
            .main_properties()
            .set("broker.servers", "localhost:9092")
            .set("broker.consumer.group-id", project)
            .set("broker.consumer.auto-offset-reset", "earliest")
            .set("broker.polling.timeout", 10000i64)
            .set("broker.topic.events", format!("queue.{project}.events"))
            .and()
            .test_properties()
            .set("broker.topic.events", format!("queue.{project}.events"))
            .and()
            .startup_command(format!("docker compose -f {COMPOSE_FILE} up -d"))
            .build()?;

        Ok(module)
    }

    fn client_dependency(&self) -> DependencyEntry {
        let entry = DependencyEntry::new("io.streams", "broker-client");
        match self.registry.artifact_version("broker-client") {
            Some(version) => entry.version(version),
            None => entry,
        }
    }

    fn image(&self, name: &str) -> String {
        match self.registry.image_tag(name) {
            Some(tag) => format!("{name}:{tag}"),
            None => format!("{name}:latest"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::StaticVersionRegistry;
    use modwright_core::domain::{ContextValue, DependencyScope, PropertyTarget, PropertyValue};

    fn factory() -> BrokerModuleFactory {
        BrokerModuleFactory::new(Box::new(StaticVersionRegistry::with_defaults()))
    }

    #[test]
    fn module_pins_images_from_the_registry() {
        let module = factory()
            .build_module(&ModuleProperties::new("myapp"))
            .unwrap();

        let image = module.context().get("brokerImage").unwrap();
        assert_eq!(image, &ContextValue::from("streams/broker:7.5.3"));
    }

    #[test]
    fn module_declares_client_and_test_dependencies() {
        let module = factory()
            .build_module(&ModuleProperties::new("myapp"))
            .unwrap();

        let deps: Vec<_> = module
            .changeset()
            .dependency_adds()
            .map(|(_, d)| d)
            .collect();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].artifact, "broker-client");
        assert_eq!(deps[0].version.as_deref(), Some("3.7.1"));
        assert_eq!(deps[1].scope, DependencyScope::Test);
    }

    #[test]
    fn topic_property_derives_from_project_name() {
        let module = factory()
            .build_module(&ModuleProperties::new("shop"))
            .unwrap();

        let topic = module
            .changeset()
            .property_sets(PropertyTarget::Main)
            .map(|(_, p)| p)
            .find(|p| p.key == "broker.topic.events")
            .unwrap();
        assert_eq!(topic.value, PropertyValue::from("queue.shop.events"));
    }

    #[test]
    fn missing_registry_entries_fall_back() {
        let factory = BrokerModuleFactory::new(Box::new(StaticVersionRegistry::new()));
        let module = factory
            .build_module(&ModuleProperties::new("myapp"))
            .unwrap();

        assert_eq!(
            module.context().get("brokerImage"),
            Some(&ContextValue::from("streams/broker:latest"))
        );
    }
}
