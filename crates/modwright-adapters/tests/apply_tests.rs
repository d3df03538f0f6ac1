//! End-to-end apply scenarios over the in-memory and local adapters.

use std::path::Path;

use modwright_adapters::factories::{BrokerModuleFactory, DatabaseModuleFactory, ModuleProperties};
use modwright_adapters::{
    InMemoryTemplateStore, LocalFilesystem, MemoryFilesystem, StaticVersionRegistry,
};
use modwright_core::application::services::{
    DEPENDENCIES_MANIFEST, MAIN_PROPERTIES, MODULE_LEDGER, TEST_PROPERTIES,
};
use modwright_core::application::{ApplicationError, ModuleApplier};
use modwright_core::domain::{
    DependencyDocument, DependencyEntry, ModuleDescriptor, PropertyDocument, ReplacementRule,
    TargetTree,
};
use modwright_core::error::ModwrightError;

const ROOT: &str = "/project";

fn harness() -> (MemoryFilesystem, InMemoryTemplateStore, TargetTree) {
    let fs = MemoryFilesystem::with_root(ROOT);
    let store = InMemoryTemplateStore::with_builtin();
    (fs, store, TargetTree::new(ROOT))
}

fn applier(fs: &MemoryFilesystem, store: &InMemoryTemplateStore) -> ModuleApplier {
    ModuleApplier::new(Box::new(store.clone()), Box::new(fs.clone()))
}

fn broker_module() -> ModuleDescriptor {
    BrokerModuleFactory::new(Box::new(StaticVersionRegistry::with_defaults()))
        .build_module(&ModuleProperties::new("myapp"))
        .unwrap()
}

fn database_module() -> ModuleDescriptor {
    DatabaseModuleFactory::new(Box::new(StaticVersionRegistry::with_defaults()))
        .build_module(&ModuleProperties::new("myapp"))
        .unwrap()
}

#[test]
fn broker_module_shapes_the_tree() {
    let (fs, store, tree) = harness();
    fs.seed_file(
        format!("{ROOT}/README.md"),
        "# myapp\n\n## Services\n<!-- modwright:services -->\n",
    );

    let report = applier(&fs, &store).apply(&broker_module(), &tree).unwrap();
    assert!(report.is_success(), "failure: {:?}", report.failure);

    // compose file rendered with registry-pinned images
    let compose = fs
        .read_file(Path::new(&format!("{ROOT}/docker/broker.yml")))
        .unwrap();
    assert!(compose.contains("image: streams/broker:7.5.3"));
    assert!(!compose.contains("{{"));

    // dependency manifest created and parseable
    let manifest = fs
        .read_file(Path::new(&format!("{ROOT}/{DEPENDENCIES_MANIFEST}")))
        .unwrap();
    let doc = DependencyDocument::parse(&manifest).unwrap();
    assert_eq!(doc.dependencies.len(), 2);

    // properties merged into both documents
    let main = fs
        .read_file(Path::new(&format!("{ROOT}/{MAIN_PROPERTIES}")))
        .unwrap();
    assert!(main.contains("broker.servers=localhost:9092"));
    assert!(main.contains("broker.topic.events=queue.myapp.events"));
    let test = fs
        .read_file(Path::new(&format!("{ROOT}/{TEST_PROPERTIES}")))
        .unwrap();
    assert!(test.contains("broker.topic.events=queue.myapp.events"));

    // README gained the services entry, marker intact
    let readme = fs.read_file(Path::new(&format!("{ROOT}/README.md"))).unwrap();
    assert!(readme.contains("<!-- modwright:services -->\n- Message broker"));

    // ledger records documentation and startup command
    let ledger = fs
        .read_file(Path::new(&format!("{ROOT}/{MODULE_LEDGER}")))
        .unwrap();
    assert!(ledger.contains("- [Message Broker](docs/message-broker.md)"));
    assert!(ledger.contains("- startup: `docker compose -f docker/broker.yml up -d`"));
    assert!(fs.read_file(Path::new(&format!("{ROOT}/docs/message-broker.md"))).is_some());
}

#[test]
fn reapplying_a_module_is_a_noop() {
    let (fs, store, tree) = harness();
    fs.seed_file(
        format!("{ROOT}/README.md"),
        "# myapp\n<!-- modwright:services -->\n",
    );
    let applier = applier(&fs, &store);
    let module = broker_module();

    let first = applier.apply(&module, &tree).unwrap();
    assert!(first.is_success());
    assert!(!first.applied.is_empty());
    let snapshot = fs.snapshot();

    let second = applier.apply(&module, &tree).unwrap();
    assert!(second.is_success());
    assert!(second.is_noop(), "unexpected mutations: {:?}", second.applied);
    assert_eq!(fs.snapshot(), snapshot);
}

#[test]
fn version_collision_is_resolved_last_write_wins_with_advisory() {
    let (fs, store, tree) = harness();
    let applier = applier(&fs, &store);

    let older = ModuleDescriptor::builder("older")
        .dependencies()
        .add(DependencyEntry::new("io.streams", "broker-client").version("1.0"))
        .and()
        .build()
        .unwrap();
    let newer = ModuleDescriptor::builder("newer")
        .dependencies()
        .add(DependencyEntry::new("io.streams", "broker-client").version("2.0"))
        .and()
        .build()
        .unwrap();

    assert!(applier.apply(&older, &tree).unwrap().advisories.is_empty());
    let report = applier.apply(&newer, &tree).unwrap();
    assert!(report.is_success());
    assert_eq!(report.advisories.len(), 1);
    assert_eq!(report.advisories[0].kept, "2.0");
    assert_eq!(report.advisories[0].replaced, "1.0");

    let manifest = fs
        .read_file(Path::new(&format!("{ROOT}/{DEPENDENCIES_MANIFEST}")))
        .unwrap();
    let doc = DependencyDocument::parse(&manifest).unwrap();
    assert_eq!(doc.dependencies.len(), 1);
    assert_eq!(doc.dependencies[0].version.as_deref(), Some("2.0"));
}

#[test]
fn missing_template_fails_preflight_without_side_effects() {
    let (fs, _, tree) = harness();
    let store = InMemoryTemplateStore::new(); // no templates at all
    let before = fs.snapshot();

    let err = applier(&fs, &store)
        .apply(&broker_module(), &tree)
        .unwrap_err();
    assert!(matches!(
        err,
        ModwrightError::Application(ApplicationError::TemplateNotFound { .. })
    ));
    assert_eq!(fs.snapshot(), before);
}

#[test]
fn missing_target_root_fails_preflight() {
    let fs = MemoryFilesystem::new();
    let store = InMemoryTemplateStore::with_builtin();

    let err = applier(&fs, &store)
        .apply(&broker_module(), &TargetTree::new(ROOT))
        .unwrap_err();
    assert!(matches!(
        err,
        ModwrightError::Application(ApplicationError::MissingPrerequisite { .. })
    ));
}

#[test]
fn unresolved_variable_fails_preflight_without_side_effects() {
    let (fs, store, tree) = harness();
    store.insert_body("custom/needs-var.txt", "value = {{neverBound}}\n");
    let before = fs.snapshot();

    let module = ModuleDescriptor::builder("custom")
        .files()
        .add("custom/needs-var.txt", "conf/needs-var.txt")
        .and()
        .build()
        .unwrap();

    let err = applier(&fs, &store).apply(&module, &tree).unwrap_err();
    assert!(matches!(err, ModwrightError::Domain(_)));
    assert_eq!(fs.snapshot(), before);
}

#[test]
fn mandatory_replacement_on_missing_file_fails_preflight() {
    let (fs, store, tree) = harness();
    store.insert_body("custom/file.txt", "payload\n");
    let before = fs.snapshot();

    let module = ModuleDescriptor::builder("custom")
        .files()
        .add("custom/file.txt", "conf/file.txt")
        .and()
        .replacements()
        .add(
            ReplacementRule::insert_after_marker("README.md", "<!-- marker -->", "- entry")
                .mandatory(),
        )
        .and()
        .build()
        .unwrap();

    let err = applier(&fs, &store).apply(&module, &tree).unwrap_err();
    assert!(matches!(
        err,
        ModwrightError::Application(ApplicationError::MissingPrerequisite { .. })
    ));
    // nothing was written, not even the file placement declared first
    assert_eq!(fs.snapshot(), before);
}

#[test]
fn property_merge_preserves_existing_keys() {
    let (fs, store, tree) = harness();
    fs.seed_file(
        format!("{ROOT}/{MAIN_PROPERTIES}"),
        "server.port=8080\n",
    );

    let module = ModuleDescriptor::builder("jmx-off")
        .main_properties()
        .set("server.jmx", false)
        .and()
        .build()
        .unwrap();

    let report = applier(&fs, &store).apply(&module, &tree).unwrap();
    assert!(report.is_success());

    let main = fs
        .read_file(Path::new(&format!("{ROOT}/{MAIN_PROPERTIES}")))
        .unwrap();
    assert_eq!(main, "server.port=8080\nserver.jmx=false\n");
}

#[test]
fn mandatory_anchor_failure_reports_the_operation_index() {
    let (fs, store, tree) = harness();
    store.insert_body("custom/file.txt", "payload\n");
    fs.seed_file(format!("{ROOT}/README.md"), "# no marker here\n");

    let module = ModuleDescriptor::builder("custom")
        .files()
        .add("custom/file.txt", "conf/file.txt")
        .and()
        .replacements()
        .add(
            ReplacementRule::insert_after_marker("README.md", "<!-- absent -->", "- entry")
                .mandatory(),
        )
        .and()
        .build()
        .unwrap();

    let report = applier(&fs, &store).apply(&module, &tree).unwrap();
    let failure = report.failure.expect("mandatory anchor should fail");
    assert_eq!(failure.index, 1);
    assert!(matches!(
        failure.error,
        ModwrightError::Application(ApplicationError::AnchorNotFound { .. })
    ));

    // the file phase ran before the failure; idempotent re-apply converges
    assert!(fs.read_file(Path::new(&format!("{ROOT}/conf/file.txt"))).is_some());
}

#[test]
fn disjoint_modules_commute() {
    let run = |first: &ModuleDescriptor, second: &ModuleDescriptor| {
        let (fs, store, tree) = harness();
        fs.seed_file(
            format!("{ROOT}/README.md"),
            "# myapp\n<!-- modwright:services -->\n",
        );
        let applier = applier(&fs, &store);
        applier.apply(first, &tree).unwrap();
        applier.apply(second, &tree).unwrap();
        fs
    };

    let broker = broker_module();
    let database = database_module();
    let ab = run(&broker, &database);
    let ba = run(&database, &broker);

    // placed files are byte-identical regardless of order
    for file in ["docker/broker.yml", "docker/cassandra.yml", "README.md"] {
        let path = format!("{ROOT}/{file}");
        assert_eq!(ab.read_file(Path::new(&path)), ba.read_file(Path::new(&path)));
    }

    // property documents agree key by key (order may differ)
    for doc in [MAIN_PROPERTIES, TEST_PROPERTIES] {
        let path = format!("{ROOT}/{doc}");
        let first = PropertyDocument::parse(&ab.read_file(Path::new(&path)).unwrap());
        let second = PropertyDocument::parse(&ba.read_file(Path::new(&path)).unwrap());
        let mut first_keys = first.keys();
        let mut second_keys = second.keys();
        first_keys.sort_unstable();
        second_keys.sort_unstable();
        assert_eq!(first_keys, second_keys);
        for key in first_keys {
            assert_eq!(first.get(key), second.get(key), "key {key}");
        }
    }
}

#[test]
fn executable_placement_marks_the_script() {
    let (fs, store, tree) = harness();

    let report = applier(&fs, &store).apply(&database_module(), &tree).unwrap();
    assert!(report.is_success(), "failure: {:?}", report.failure);

    let script = format!("{ROOT}/scripts/init-keyspace.sh");
    assert!(fs.read_file(Path::new(&script)).is_some());
    assert!(fs.is_executable(Path::new(&script)));
}

#[test]
fn local_filesystem_applies_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let tree = TargetTree::new(dir.path());
    std::fs::write(
        dir.path().join("README.md"),
        "# myapp\n<!-- modwright:services -->\n",
    )
    .unwrap();

    let applier = ModuleApplier::new(
        Box::new(InMemoryTemplateStore::with_builtin()),
        Box::new(LocalFilesystem::new()),
    );
    let module = broker_module();

    let first = applier.apply(&module, &tree).unwrap();
    assert!(first.is_success(), "failure: {:?}", first.failure);

    let second = applier.apply(&module, &tree).unwrap();
    assert!(second.is_noop());

    let manifest = std::fs::read_to_string(dir.path().join(DEPENDENCIES_MANIFEST)).unwrap();
    assert!(DependencyDocument::parse(&manifest).is_ok());
    let main = std::fs::read_to_string(dir.path().join(MAIN_PROPERTIES)).unwrap();
    assert!(main.contains("broker.servers=localhost:9092"));
}
