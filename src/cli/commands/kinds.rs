//! Kinds command - show the pipeline's kind graph

use crate::config::Config;
use crate::error::SpecforgeResult;
use crate::generators::registry_from_config;
use crate::orchestrator::pipeline_graph;
use console::style;

/// Execute the kinds command
pub async fn execute(config: &Config) -> SpecforgeResult<()> {
    let (registry, missing) = registry_from_config(config);
    let snapshot = pipeline_graph(&registry)?.graph();

    if snapshot.edges.is_empty() {
        println!("No generators configured. Edit .specforge.toml to add some.");
        return Ok(());
    }

    println!("{}", style("Kinds").bold());
    for kind in &snapshot.kinds {
        println!("  {} ({})", kind.name, style(&kind.category).dim());
    }

    println!();
    println!("{}", style("Edges").bold());
    for edge in &snapshot.edges {
        let via = edge
            .transform
            .as_deref()
            .map(|t| format!(" via {}", t))
            .unwrap_or_default();
        println!("  {} -> {} ({}{})", edge.from, edge.to, edge.relation, via);
    }

    for name in &missing {
        println!();
        println!(
            "{} configured generator '{}' has no implementation",
            style("Warning:").yellow(),
            name
        );
    }
    Ok(())
}
