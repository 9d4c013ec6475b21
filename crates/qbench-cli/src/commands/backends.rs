//! Backends command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;

use super::common::{default_registry, load_config};

/// Execute the backends command.
pub async fn execute(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let registry = default_registry();

    println!("{} Available backends:\n", style("qbench").cyan().bold());

    for name in registry.available_backends() {
        let marker = if name == config.ground_truth {
            " (ground truth)"
        } else {
            ""
        };

        match registry.create(&name, config.backend_config(&name)) {
            Ok(backend) => {
                let available = backend.availability().await.is_ok_and(|a| a.is_available);
                let caps = backend.capabilities();
                let ceiling = config
                    .qubit_ceilings
                    .get(&name)
                    .copied()
                    .unwrap_or(caps.num_qubits);
                println!(
                    "  {} {} [{}]{}",
                    if available {
                        style("●").green()
                    } else {
                        style("○").yellow()
                    },
                    style(&name).bold(),
                    caps.kind(),
                    marker
                );
                println!("    Qubits: {} (ceiling {})", caps.num_qubits, ceiling);
                println!("    Max shots: {}", caps.max_shots);
                println!(
                    "    Gates: {}",
                    caps.gate_set.all().collect::<Vec<_>>().join(", ")
                );
                if !available {
                    println!("    Status: offline or unreachable");
                }
            }
            Err(e) => {
                println!(
                    "  {} {} (not configured)",
                    style("○").dim(),
                    style(&name).dim()
                );
                println!("    {e}");
            }
        }
        println!();
    }

    #[cfg(not(feature = "quantinuum"))]
    {
        println!(
            "  {} {} (not compiled)",
            style("○").dim(),
            style("quantinuum").dim()
        );
        println!("    Rebuild with --features quantinuum to enable");
        println!();
    }

    Ok(())
}
