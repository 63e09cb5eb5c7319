use super::load_topology;
use crate::cli::TopologyArgs;
use crate::error::{CliError, Result};
use mpnerf::core::models::residue::AminoAcid;
use mpnerf::core::topology::{SidechainTopology, TopologyTable};
use std::fmt::Write as _;
use tracing::info;

pub fn run(args: TopologyArgs) -> Result<()> {
    let table = load_topology(args.topology.as_deref())?;

    if let Some(path) = &args.export {
        let content = toml::to_string_pretty(&table.to_specs())
            .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to serialize topology: {e}")))?;
        std::fs::write(path, content)?;
        info!("Exported {} residue topologies to {:?}.", table.len(), path);
        return Ok(());
    }

    let report = match &args.residue {
        Some(code) => {
            let residue = code
                .parse::<AminoAcid>()
                .map_err(|e| CliError::Argument(e.to_string()))?;
            let topology = table.get(residue).ok_or_else(|| {
                CliError::Argument(format!("the topology table has no entry for {residue}"))
            })?;
            describe_residue(residue, topology)
        }
        None => summarize(&table),
    };
    print!("{report}");
    Ok(())
}

fn summarize(table: &TopologyTable) -> String {
    let mut out = format!("{:<5} {:>6} {:>5}  atoms\n", "res", "count", "chis");
    for residue in table.residue_types() {
        let Some(topology) = table.get(residue) else {
            continue;
        };
        let names: Vec<_> = topology.atoms().iter().map(|a| a.name.as_str()).collect();
        let _ = writeln!(
            out,
            "{:<5} {:>6} {:>5}  {}",
            residue.three_letter_code(),
            topology.len(),
            topology.chi_count(),
            names.join(" ")
        );
    }
    out
}

fn describe_residue(residue: AminoAcid, topology: &SidechainTopology) -> String {
    let mut out = format!(
        "{residue} ({}): {} side-chain atoms, {} chi angles\n",
        residue.one_letter_code(),
        topology.len(),
        topology.chi_count()
    );
    for atom in topology.atoms() {
        let parents = atom.parents.map(|p| topology.parent_name(p).to_string());
        let chi = atom.chi.map_or(String::from("-"), |k| format!("chi{}", k + 1));
        let _ = writeln!(
            out,
            "  {:<4} from {:<14} length {:>6.3}  angle {:>8.3}  torsion {:>9.3}  {chi}",
            atom.name,
            parents.join("-"),
            atom.coord.length,
            atom.coord.angle.to_degrees(),
            atom.coord.torsion.to_degrees(),
        );
    }
    out
}
