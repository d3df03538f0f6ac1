//! Templates that ship with the binary.
//!
//! The built-in module factories reference these ids; seeding them into an
//! [`InMemoryTemplateStore`](crate::template_store::InMemoryTemplateStore)
//! via `with_builtin` makes the factories usable without any template
//! directory on disk. A `DirectoryTemplateStore` pointed at a user template
//! tree can serve the same ids to override them.

const BROKER_COMPOSE: &str = r#"services:
  coordinator:
    image: {{coordinatorImage}}
    environment:
      COORDINATOR_CLIENT_PORT: 2181
  broker:
    image: {{brokerImage}}
    depends_on:
      - coordinator
    ports:
      - "9092:9092"
    environment:
      BROKER_COORDINATOR_CONNECT: coordinator:2181
      BROKER_ADVERTISED_LISTENERS: PLAINTEXT://localhost:9092
"#;

const BROKER_DOC: &str = r#"# Message Broker

This project uses a message broker for asynchronous communication.

## Local usage

Start the broker:

```bash
docker compose -f docker/broker.yml up -d
```

The client connects to the servers configured under `broker.servers` in
`config/application.properties`.
"#;

const CASSANDRA_COMPOSE: &str = r#"services:
  cassandra:
    image: cassandra:{{cassandraImage}}
    ports:
      - "9042:9042"
    environment:
      CASSANDRA_DC: {{datacenter}}
      CASSANDRA_ENDPOINT_SNITCH: GossipingPropertyFileSnitch
"#;

const CASSANDRA_DOC: &str = r#"# Cassandra

This project persists data in Apache Cassandra.

## Local usage

Start the database:

```bash
docker compose -f docker/cassandra.yml up -d
```

Create the keyspace once the node is up:

```bash
./scripts/init-keyspace.sh
```
"#;

const CASSANDRA_INIT: &str = r#"#!/usr/bin/env bash
set -euo pipefail

KEYSPACE="{{keyspace}}"

docker compose -f docker/cassandra.yml exec cassandra cqlsh -e \
  "CREATE KEYSPACE IF NOT EXISTS ${KEYSPACE} WITH replication = {'class': 'SimpleStrategy', 'replication_factor': 1};"
"#;

/// All built-in templates as (id, body) pairs.
pub fn all() -> Vec<(&'static str, &'static str)> {
    vec![
        ("broker/broker.yml", BROKER_COMPOSE),
        ("broker/broker.md", BROKER_DOC),
        ("database/cassandra.yml", CASSANDRA_COMPOSE),
        ("database/cassandra.md", CASSANDRA_DOC),
        ("database/init-keyspace.sh", CASSANDRA_INIT),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use modwright_core::domain::placeholder_names;

    #[test]
    fn template_ids_are_unique() {
        let templates = all();
        let mut ids: Vec<_> = templates.iter().map(|(id, _)| *id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), templates.len());
    }

    #[test]
    fn broker_compose_declares_expected_variables() {
        assert_eq!(
            placeholder_names(BROKER_COMPOSE),
            vec!["coordinatorImage", "brokerImage"]
        );
    }
}
