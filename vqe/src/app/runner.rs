use crate::app::report::{
    report_restricted_summary, ActiveSpaceSummary, AnsatzSummary, ExactSummary, QubitSummary,
    RunReport, ScfSummary, VqeSummary,
};
use crate::app::workspace::CalculationWorkspace;
use crate::circuit_impl::{
    hartree_fock_state, Entanglement, EntanglementBlock, InitialStateKind, QuantumCircuit,
    RotationBlock, TwoLocal,
};
use crate::config::{Args, Config};
use crate::hamiltonian_impl::{ActiveSpaceTransformer, ElectronicStructureProblem, FermionicOp};
use crate::optim_impl::{create_optimizer, OptimizerSettings};
use crate::qubit_impl::{create_mapper, QubitConverter, SparsePauliOp};
use crate::scf_impl::{ScfOutcome, SimpleSCF, SCF};
use crate::solver_impl::{
    ExactEigensolver, ExactResult, GradientMethod, InitialPoint, Vqe, VqeResult,
};
use ::basis::basis::AOBasis;
use ::basis::cgto::AtomicBasis;
use color_eyre::eyre::{eyre, Result, WrapErr};
use tracing::{info, warn};

pub fn run_restricted(
    workspace: &CalculationWorkspace<AtomicBasis>,
    config: &Config,
) -> Result<(SimpleSCF<AtomicBasis>, ScfOutcome)> {
    let mut scf = SimpleSCF::<AtomicBasis>::new();
    configure_restricted(&mut scf, config)?;
    let outcome = initialize_and_run_scf(&mut scf, workspace)?;
    if !outcome.converged {
        warn!(
            "RHF did not converge in {} cycles; continuing with the last orbitals",
            outcome.cycles
        );
    }
    report_restricted_summary(&scf, &outcome);
    Ok((scf, outcome))
}

fn configure_restricted(scf: &mut SimpleSCF<AtomicBasis>, config: &Config) -> Result<()> {
    let multiplicity = config.multiplicity.unwrap_or(1);
    if multiplicity != 1 {
        return Err(eyre!(
            "Only closed-shell singlets are supported, got multiplicity {}",
            multiplicity
        ));
    }
    scf.set_charge(config.charge.unwrap_or(0));
    scf.density_mixing = config
        .scf_params
        .density_mixing
        .unwrap_or(scf.density_mixing);
    scf.max_cycle = config.scf_params.max_cycle.unwrap_or(scf.max_cycle);
    let convergence = config
        .scf_params
        .convergence_threshold
        .unwrap_or(scf.convergence_threshold);
    scf.set_convergence_threshold(convergence);

    if config.is_diis_enabled() {
        let diis_size = config.diis_subspace_size();
        info!("Enabling DIIS acceleration with subspace size {}", diis_size);
        scf.enable_diis(diis_size);
    } else {
        info!("DIIS acceleration disabled");
    }
    Ok(())
}

pub fn initialize_and_run_scf<B: AOBasis>(
    scf: &mut impl SCF<BasisType = B>,
    workspace: &CalculationWorkspace<B>,
) -> Result<ScfOutcome> {
    info!("\nInitializing SCF calculation...");
    scf.init_basis(&workspace.elements, workspace.basis_map())?;
    scf.init_geometry(&workspace.coords, &workspace.elements);
    scf.init_density_matrix();
    scf.init_fock_matrix();

    info!("\nStarting SCF cycle...\n");
    scf.scf_cycle()
}

/// MO-basis problem reduced to the configured active space.
pub fn build_problem(
    scf: &SimpleSCF<AtomicBasis>,
    workspace: &CalculationWorkspace<AtomicBasis>,
    config: &Config,
) -> Result<ElectronicStructureProblem> {
    let full = ElectronicStructureProblem::from_scf(scf);
    let transformer = ActiveSpaceTransformer::new(
        config.active_space.freeze_core.unwrap_or(true),
        config.remove_orbitals(),
    );
    let problem = transformer
        .transform(&full, &workspace.elements)
        .wrap_err("Active-space reduction failed")?;

    info!(
        "Active space: orbitals {:?}, {} spin orbitals, {} alpha + {} beta electrons",
        problem.active_orbitals,
        problem.num_spin_orbitals(),
        problem.num_alpha,
        problem.num_beta
    );
    info!("Frozen-core energy: {:.10} au", problem.constant);
    let hf_check = problem.total_energy(problem.hartree_fock_electronic_energy());
    info!(
        "HF energy from active-space integrals: {:.10} au (RHF {:.10} au)",
        hf_check, problem.reference_energy
    );
    Ok(problem)
}

pub fn build_converter(args: &Args, config: &Config) -> Result<QubitConverter> {
    let mapper_name = args
        .mapper
        .clone()
        .or(config.mapping.mapper.clone())
        .unwrap_or_else(|| "parity".to_string());
    let mapper = create_mapper(&mapper_name)?;
    let converter = QubitConverter::new(
        mapper,
        config.mapping.two_qubit_reduction.unwrap_or(true),
    )
    .with_threshold(config.mapping.threshold.unwrap_or(1e-8));
    Ok(converter)
}

/// Two-local ansatz on top of the mapped reference state.
pub fn build_ansatz(
    num_qubits: usize,
    reference: &[bool],
    args: &Args,
    config: &Config,
) -> Result<QuantumCircuit> {
    let params = &config.ansatz;
    let rotation_blocks = params
        .rotation_blocks
        .clone()
        .unwrap_or_default()
        .iter()
        .map(|s| s.parse::<RotationBlock>())
        .collect::<Result<Vec<_>>>()?;
    let entanglement_blocks = params
        .entanglement_blocks
        .clone()
        .unwrap_or_default()
        .iter()
        .map(|s| s.parse::<EntanglementBlock>())
        .collect::<Result<Vec<_>>>()?;
    let entanglement: Entanglement = params.entanglement.as_deref().unwrap_or("linear").parse()?;
    let reps = args.reps.or(params.reps).unwrap_or(1);

    let mut two_local = TwoLocal::new(
        num_qubits,
        rotation_blocks,
        entanglement_blocks,
        entanglement,
        reps,
    )
    .with_skip_final_rotation_layer(params.skip_final_rotation_layer.unwrap_or(false));

    let initial_state: InitialStateKind = params
        .initial_state
        .as_deref()
        .unwrap_or("hartree_fock")
        .parse()?;
    if initial_state == InitialStateKind::HartreeFock {
        two_local = two_local.with_initial_state(hartree_fock_state(reference)?);
    }

    let ansatz = two_local.build()?;
    info!(
        "Ansatz: {} qubits, {} parameters, depth {}, gates {:?}",
        ansatz.num_qubits(),
        ansatz.num_parameters(),
        ansatz.depth(),
        ansatz.count_ops()
    );
    Ok(ansatz)
}

pub fn run_vqe(
    ansatz: QuantumCircuit,
    hamiltonian: &SparsePauliOp,
    args: &Args,
    config: &Config,
) -> Result<VqeResult> {
    let opt = &config.optimizer;
    let algorithm = args
        .optimizer
        .clone()
        .or(opt.algorithm.clone())
        .unwrap_or_else(|| "slsqp".to_string());
    let seed = args.seed.or(config.vqe.seed).unwrap_or(42);
    let settings = OptimizerSettings {
        max_iterations: args.max_iterations.or(opt.max_iterations).unwrap_or(3000),
        tolerance: opt.tolerance.unwrap_or(1e-6),
        learning_rate: opt.learning_rate,
        perturbation: opt.perturbation.unwrap_or(0.2),
        seed,
        bounds: None,
    };
    let optimizer = create_optimizer(&algorithm, &settings)?;
    let gradient: GradientMethod = opt
        .gradient
        .as_deref()
        .unwrap_or("parameter_shift")
        .parse()?;
    let initial_point: InitialPoint = config
        .vqe
        .initial_point
        .as_deref()
        .unwrap_or("random")
        .parse()?;

    info!("\n===========================================");
    info!("       Starting VQE");
    info!("===========================================");
    let mut vqe = Vqe::new(ansatz, optimizer)
        .with_gradient(gradient)
        .with_initial_point(initial_point)
        .with_restarts(config.vqe.restarts.unwrap_or(1))
        .with_seed(seed);
    vqe.compute_minimum_eigenvalue(hamiltonian)
}

/// Exact ground state of the same qubit operator, optionally restricted to
/// the reference particle numbers.
pub fn run_exact(
    problem: &ElectronicStructureProblem,
    converter: &QubitConverter,
    hamiltonian: &SparsePauliOp,
    config: &Config,
) -> Result<ExactResult> {
    let mut solver = ExactEigensolver::new();
    if config.exact.filter_particle_number.unwrap_or(true) {
        let m = problem.num_spatial_orbitals;
        let particles = problem.num_particles();
        let n_alpha = converter.convert(&FermionicOp::alpha_number_op(m), particles)?;
        let n_beta = converter.convert(&FermionicOp::beta_number_op(m), particles)?;
        solver = solver
            .with_filter(n_alpha, problem.num_alpha as f64)
            .with_filter(n_beta, problem.num_beta as f64);
    }
    info!(
        "Exact diagonalization with {} particle-number filters",
        solver.num_filters()
    );
    let result = solver.compute_minimum_eigenvalue(hamiltonian)?;
    info!(
        "Exact electronic energy: {:.10} au (total {:.10} au)",
        result.eigenvalue,
        problem.total_energy(result.eigenvalue)
    );
    Ok(result)
}

/// One full pass: RHF, active space, qubit mapping, VQE and the exact reference.
pub fn run_pipeline(
    workspace: &CalculationWorkspace<AtomicBasis>,
    args: &Args,
    config: &Config,
) -> Result<RunReport> {
    let (scf, outcome) = run_restricted(workspace, config)?;
    let problem = build_problem(&scf, workspace, config)?;

    let converter = build_converter(args, config)?;
    let hamiltonian = converter.convert(&problem.hamiltonian(), problem.num_particles())?;
    let reference = converter.convert_occupations(&problem.hartree_fock_bitstring())?;
    info!(
        "Qubit Hamiltonian ({} mapper{}): {} qubits, {} Pauli terms",
        converter.mapper_name(),
        if converter.reduces() {
            ", two-qubit reduction"
        } else {
            ""
        },
        hamiltonian.num_qubits(),
        hamiltonian.num_terms()
    );

    let ansatz = build_ansatz(hamiltonian.num_qubits(), &reference, args, config)?;
    let ansatz_summary = AnsatzSummary {
        num_parameters: ansatz.num_parameters(),
        depth: ansatz.depth(),
        gate_counts: ansatz
            .count_ops()
            .into_iter()
            .map(|(name, n)| (name.to_string(), n))
            .collect(),
    };
    let optimizer_name = args
        .optimizer
        .clone()
        .or(config.optimizer.algorithm.clone())
        .unwrap_or_else(|| "slsqp".to_string());

    let vqe = run_vqe(ansatz, &hamiltonian, args, config)?;

    let exact = if config.is_exact_enabled() && !args.no_exact {
        let result = run_exact(&problem, &converter, &hamiltonian, config)?;
        Some(ExactSummary {
            electronic_energy: result.eigenvalue,
            total_energy: problem.total_energy(result.eigenvalue),
        })
    } else {
        None
    };

    let to_unit = config.length_unit()?.to_bohr();

    Ok(RunReport {
        molecule: workspace.formula(),
        bond_length: workspace.bond_length().map(|r| r / to_unit),
        units: config.units.clone().unwrap_or_else(|| "angstrom".to_string()),
        scf: ScfSummary {
            converged: outcome.converged,
            cycles: outcome.cycles,
            hf_energy: outcome.energy,
            nuclear_repulsion: problem.nuclear_repulsion,
            orbital_energies: scf.e_level.iter().copied().collect(),
        },
        active_space: ActiveSpaceSummary {
            active_orbitals: problem.active_orbitals.clone(),
            num_spatial_orbitals: problem.num_spatial_orbitals,
            num_alpha: problem.num_alpha,
            num_beta: problem.num_beta,
            frozen_core_energy: problem.constant,
        },
        qubits: QubitSummary {
            mapper: converter.mapper_name().to_string(),
            two_qubit_reduction: converter.reduces(),
            num_qubits: hamiltonian.num_qubits(),
            num_pauli_terms: hamiltonian.num_terms(),
            hf_bitstring: reference
                .iter()
                .rev()
                .map(|&b| if b { '1' } else { '0' })
                .collect(),
        },
        ansatz: ansatz_summary,
        vqe: VqeSummary {
            optimizer: optimizer_name,
            electronic_energy: vqe.eigenvalue,
            total_energy: problem.total_energy(vqe.eigenvalue),
            nfev: vqe.optimizer_result.nfev,
            njev: vqe.optimizer_result.njev,
            nit: vqe.optimizer_result.nit,
            converged: vqe.optimizer_result.converged,
            optimal_point: vqe.optimal_point.iter().copied().collect(),
            cost_history: vqe.cost_history,
        },
        exact,
    })
}
