use crate::core::compute::backend::{Backend, BackendKind, Serial};
use crate::core::models::chain::ResolvedChain;
use crate::core::models::internal::{
    BackboneInternals, ChainInternals, ResidueInternals, ResidueTorsions, SidechainInternals,
};
use crate::core::models::residue::AminoAcid;
use crate::core::topology::TopologyTable;
use crate::engine::assembler::assemble;
use crate::engine::composer::compose_units;
use crate::engine::config::ConversionConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{ProgressReporter, Stage};
use crate::engine::sidechain::{attach_sidechains, resolve_topologies};
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use crate::core::compute::backend::Rayon;
#[cfg(not(feature = "parallel"))]
use crate::engine::config::ConfigError;

/// Builds the Cartesian coordinates of one chain on the configured backend.
#[instrument(skip_all, name = "build_workflow", fields(residues = chain.len(), backend = %config.backend))]
pub fn run(
    chain: &ChainInternals,
    table: &TopologyTable,
    config: &ConversionConfig,
    reporter: &ProgressReporter,
) -> Result<ResolvedChain, EngineError> {
    match config.backend {
        BackendKind::Serial => convert(&Serial, chain, table, config, reporter),
        #[cfg(feature = "parallel")]
        BackendKind::Parallel => convert(&Rayon, chain, table, config, reporter),
        #[cfg(not(feature = "parallel"))]
        kind @ BackendKind::Parallel => Err(ConfigError::UnavailableBackend(kind).into()),
    }
}

/// The full forward pipeline: validation, unit composition, backbone assembly and
/// side-chain attachment.
///
/// Every residue is checked against the topology table before the first atom is
/// placed, so a malformed chain fails without partial work.
pub fn convert<B: Backend>(
    backend: &B,
    chain: &ChainInternals,
    table: &TopologyTable,
    config: &ConversionConfig,
    reporter: &ProgressReporter,
) -> Result<ResolvedChain, EngineError> {
    let count = chain.len();
    if count == 0 {
        return Err(EngineError::shape(0, "chain has no residues"));
    }
    info!(
        residues = count,
        backend = backend.name(),
        "Building Cartesian coordinates."
    );

    let topologies = reporter.stage(Stage::Validation, count, || {
        resolve_topologies(&chain.residues, table)
    })?;

    let backbone = chain.backbone();
    let units = reporter.stage(Stage::UnitComposition, count, || {
        compose_units(backend, &backbone, config.degeneracy_epsilon)
    })?;

    let atoms = reporter.stage(Stage::BackboneAssembly, count, || {
        assemble(backend, &units, config)
    })?;

    let atoms = reporter.stage(Stage::SidechainAttachment, count, || {
        attach_sidechains(
            backend,
            &chain.residues,
            &topologies,
            atoms,
            config.degeneracy_epsilon,
        )
    })?;

    let resolved = ResolvedChain::new(chain.sequence(), atoms);
    info!(atoms = resolved.atom_count(), "Chain built.");
    Ok(resolved)
}

/// Assembles chain internals from a sequence and per-residue torsions, using ideal
/// bond geometry and the table's default side-chain coordinates.
///
/// An empty `torsions` slice means all-trans defaults for every residue.
pub fn chain_from_torsions(
    sequence: &[AminoAcid],
    torsions: &[ResidueTorsions],
    table: &TopologyTable,
) -> Result<ChainInternals, EngineError> {
    if !torsions.is_empty() && torsions.len() != sequence.len() {
        return Err(EngineError::shape(
            sequence.len().min(torsions.len()),
            format!(
                "{} torsion sets for {} residues",
                torsions.len(),
                sequence.len()
            ),
        ));
    }

    let defaults = ResidueTorsions::default();
    let last = sequence.len().saturating_sub(1);
    let residues = sequence
        .iter()
        .enumerate()
        .map(|(i, &residue_type)| {
            let topology = table
                .get(residue_type)
                .ok_or_else(|| EngineError::unknown_residue(i, residue_type.three_letter_code()))?;
            let t = torsions.get(i).unwrap_or(&defaults);
            let backbone = BackboneInternals::ideal(t.phi, t.psi, t.omega)
                .with_terminal_sentinels(i == 0, i == last);
            Ok(ResidueInternals::new(
                residue_type,
                backbone,
                SidechainInternals::from_topology(topology, &t.chis),
            ))
        })
        .collect::<Result<Vec<_>, EngineError>>()?;

    Ok(ChainInternals::new(residues))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::{AtomRole, BackboneAtom};
    use crate::core::utils::geometry::{angle_difference, dihedral, distance};
    use crate::engine::config::ConversionConfigBuilder;
    use crate::engine::progress::Progress;
    use std::f64::consts::PI;
    use std::sync::Mutex;

    fn serial_config() -> ConversionConfig {
        ConversionConfigBuilder::new()
            .backend(BackendKind::Serial)
            .build()
            .unwrap()
    }

    #[test]
    fn extended_glycine_tripeptide() {
        let table = TopologyTable::builtin();
        let chain = chain_from_torsions(&[AminoAcid::Glycine; 3], &[], table).unwrap();
        let resolved = run(&chain, table, &serial_config(), &ProgressReporter::new()).unwrap();

        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved.atom_count(), 12);
        let ca = resolved.ca_trace();
        for pair in ca.windows(2) {
            assert!((distance(&pair[0], &pair[1]) - 3.8).abs() < 0.05);
        }
        let trace = resolved.backbone_trace();
        for w in trace.windows(4) {
            assert!(angle_difference(dihedral(&w[0], &w[1], &w[2], &w[3]), PI).abs() < 1e-9);
        }
    }

    #[test]
    fn requested_torsions_are_reproduced() {
        let table = TopologyTable::builtin();
        let sequence = AminoAcid::parse_sequence("MKVLW").unwrap();
        let torsions: Vec<_> = (0..sequence.len())
            .map(|i| ResidueTorsions {
                phi: -1.0 - 0.1 * i as f64,
                psi: 2.2 + 0.05 * i as f64,
                omega: PI - 0.02 * i as f64,
                chis: vec![-1.1, 3.0],
            })
            .collect();
        let chain = chain_from_torsions(&sequence, &torsions, table).unwrap();
        let resolved = run(&chain, table, &serial_config(), &ProgressReporter::new()).unwrap();

        for i in 1..sequence.len() {
            let (prev, cur) = (&resolved.residues[i - 1], &resolved.residues[i]);
            let phi = dihedral(
                &prev.backbone(BackboneAtom::C),
                &cur.backbone(BackboneAtom::N),
                &cur.backbone(BackboneAtom::CA),
                &cur.backbone(BackboneAtom::C),
            );
            assert!(angle_difference(phi, torsions[i].phi).abs() < 1e-9);
        }

        // chi1 of lysine (index 1) is N-CA-CB-CG.
        let lys = &resolved.residues[1];
        let topology = table.get(AminoAcid::Lysine).unwrap();
        let cb = lys.sidechain(topology.index_of("CB").unwrap()).unwrap();
        let cg = lys.sidechain(topology.index_of("CG").unwrap()).unwrap();
        let chi1 = dihedral(
            &lys.backbone(BackboneAtom::N),
            &lys.backbone(BackboneAtom::CA),
            &cb,
            &cg,
        );
        assert!(angle_difference(chi1, -1.1).abs() < 1e-9);
    }

    #[test]
    fn stages_are_reported_in_pipeline_order() {
        let table = TopologyTable::builtin();
        let chain = chain_from_torsions(&[AminoAcid::Serine; 4], &[], table).unwrap();
        let stages = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event: Progress| {
            if let Progress::StageStart { stage, residues } = event {
                assert_eq!(residues, 4);
                stages.lock().unwrap().push(stage);
            }
        }));
        run(&chain, table, &serial_config(), &reporter).unwrap();
        drop(reporter);
        assert_eq!(
            stages.into_inner().unwrap(),
            vec![
                Stage::Validation,
                Stage::UnitComposition,
                Stage::BackboneAssembly,
                Stage::SidechainAttachment
            ]
        );
    }

    #[test]
    fn empty_chain_is_rejected() {
        let result = run(
            &ChainInternals::default(),
            TopologyTable::builtin(),
            &serial_config(),
            &ProgressReporter::new(),
        );
        assert!(matches!(result, Err(EngineError::ShapeMismatch { .. })));
    }

    #[test]
    fn torsion_count_must_match_sequence() {
        let result = chain_from_torsions(
            &[AminoAcid::Alanine; 3],
            &[ResidueTorsions::default()],
            TopologyTable::builtin(),
        );
        assert!(matches!(result, Err(EngineError::ShapeMismatch { .. })));
    }

    #[test]
    fn side_chain_mask_follows_the_sequence() {
        let table = TopologyTable::builtin();
        let sequence = [AminoAcid::Glycine, AminoAcid::Tryptophan, AminoAcid::Glycine];
        let chain = chain_from_torsions(&sequence, &[], table).unwrap();
        let resolved = run(&chain, table, &serial_config(), &ProgressReporter::new()).unwrap();
        assert_eq!(resolved.residues[0].sidechain_count(), 0);
        assert_eq!(resolved.residues[1].sidechain_count(), 10);
        assert_eq!(resolved.residues[2].sidechain_count(), 0);
        assert!(resolved.residues[0].get(AtomRole::Sidechain(0)).is_none());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_backend_matches_serial_backend() {
        let table = TopologyTable::builtin();
        let sequence: Vec<_> = AminoAcid::ALL.iter().cycle().take(120).copied().collect();
        let torsions: Vec<_> = (0..sequence.len())
            .map(|i| ResidueTorsions {
                phi: -1.2 + 0.01 * (i % 7) as f64,
                psi: -0.8 + 0.02 * (i % 5) as f64,
                omega: PI,
                chis: vec![1.0, -2.0, 0.5],
            })
            .collect();
        let chain = chain_from_torsions(&sequence, &torsions, table).unwrap();
        let serial = run(&chain, table, &serial_config(), &ProgressReporter::new()).unwrap();
        let parallel = run(
            &chain,
            table,
            &ConversionConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(serial, parallel);
    }
}
