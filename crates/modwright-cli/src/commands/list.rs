//! Implementation of the `modwright list` command.

use modwright_adapters::InMemoryTemplateStore;
use modwright_core::application::TemplateStore;

use crate::{
    cli::ListArgs,
    error::{CliResult, IntoCli as _},
    output::OutputManager,
};

pub fn execute(args: ListArgs, output: OutputManager) -> CliResult<()> {
    output.header("Available modules:");
    output.print("  broker     Message broker (compose file, client dependency, properties)");
    output.print("  cassandra  Cassandra database (compose file, driver, keyspace bootstrap)");

    if args.templates {
        let store = InMemoryTemplateStore::with_builtin();

        output.print("");
        output.header("Built-in templates:");
        for id in store.list().with_cli_context(|| "listing templates")? {
            output.print(&format!("  {id}"));
        }
    }

    Ok(())
}
