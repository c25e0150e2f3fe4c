use anyhow::{Context, Result};
use clap::Parser;

use vmrecon::produce::AbortFlag;
use vmrecon::report::builtin_groups;
use vmrecon::sink::DirectorySink;
use vmrecon::snapshot::JsonSnapshot;
use vmrecon::{Cli, Config, Orchestrator, Registry};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut registry = Registry::new();
    vmrecon::producers::install(&mut registry).context("producer registration")?;
    let orchestrator = Orchestrator::new(registry, builtin_groups());

    if cli.list_groups {
        for group in orchestrator.groups() {
            let mut flags = Vec::new();
            if group.experimental {
                flags.push("experimental");
            }
            if !group.default_enabled {
                flags.push("disabled by default");
            }
            let suffix = if flags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", flags.join(", "))
            };
            println!("{:<14}{}{}", group.name, group.description, suffix);
        }
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let policy = cli.selection_policy(&config);
    let output = cli.output_dir(&config);

    // Clap guarantees --snapshot is present once --list-groups is ruled
    // out, but keep the error path honest anyway.
    let snapshot_path = cli
        .snapshot
        .as_deref()
        .context("--snapshot is required")?;
    let snapshot = JsonSnapshot::open(snapshot_path)
        .with_context(|| format!("opening snapshot '{}'", snapshot_path.display()))?;

    let mut sink = DirectorySink::new(&output);
    let summary = orchestrator.run(&snapshot, &policy, &mut sink, &AbortFlag::new())?;

    for outcome in &summary.groups {
        if outcome.gated {
            println!("{:<14}inactive (not supported by this snapshot)", outcome.name);
        } else {
            println!(
                "{:<14}{} artifacts ({} reconstructed, {} stubbed)",
                outcome.name,
                outcome.total(),
                outcome.reconstructed,
                outcome.stubbed
            );
        }
    }
    println!(
        "wrote {} artifacts under {}",
        summary.total_artifacts(),
        output.display()
    );
    Ok(())
}
