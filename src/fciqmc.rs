use log::{debug, info, trace, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::time::Instant;

#[cfg(feature = "python-interface")]
use pyo3::prelude::*;

use crate::basis::Basis;
use crate::excitation::ExcitationGenerator;
use crate::hamiltonian::Hamiltonian;
use crate::profiler::Profiler;
use crate::{splitmix64, BitOps, Determinant, FciqmcError};

/// Parameters of a FCIQMC run.
/// # Fields
/// * __`time_step`__ - Imaginary time step $\delta\tau$.
/// * __`target_population`__ - Population $N_{target}$ the shift steers to.
/// * __`damping`__ - Shift damping $\xi$.
/// * __`growth_damping`__ - Damping $\zeta$ of the population growth rate.
/// `0` leaves only the target term.
/// * __`initiator_threshold`__ - Minimal $\vert N_i\vert$ allowed to spawn on
/// an empty determinant. `None` disables the initiator rule.
/// * __`seed`__ - Seed of every random stream.
/// * __`pruning_floor`__ - Amplitudes below this magnitude are removed.
/// * __`initial_population`__ - Walkers put on the reference.
/// * __`initial_shift`__ - Starting shift, defaults to the reference energy.
/// * __`n_electrons`__ - Electron count of the reference.
/// * __`n_steps`__ - Length of [run].
/// * __`single_probability`__ - Probability $p_s$ of proposing a single.
/// * __`spawning`__ - Disable to only apply death and growth.
#[derive(Debug, Clone, PartialEq)]
pub struct FciqmcParams {
    pub time_step: f64,
    pub target_population: f64,
    pub damping: f64,
    pub growth_damping: f64,
    pub initiator_threshold: Option<f64>,
    pub seed: u64,
    pub pruning_floor: f64,
    pub initial_population: f64,
    pub initial_shift: Option<f64>,
    pub n_electrons: usize,
    pub n_steps: usize,
    pub single_probability: f64,
    pub spawning: bool,
}

impl Default for FciqmcParams {
    fn default() -> Self {
        FciqmcParams {
            time_step: 0.001,
            target_population: 1000.0,
            damping: 0.01,
            growth_damping: 0.0,
            initiator_threshold: None,
            seed: 42,
            pruning_floor: 1e-9,
            initial_population: 10.0,
            initial_shift: None,
            n_electrons: 2,
            n_steps: 1000,
            single_probability: 0.5,
            spawning: true,
        }
    }
}

impl FciqmcParams {
    /// Rejects values the propagation cannot run with.
    pub fn validate(&self) -> Result<(), FciqmcError> {
        let positive = [
            ("time_step", self.time_step),
            ("target_population", self.target_population),
            ("initial_population", self.initial_population),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(FciqmcError::InvalidParameter {
                    name,
                    details: format!("expected a positive finite value, got {}", value),
                });
            }
        }
        let non_negative = [
            ("damping", self.damping),
            ("growth_damping", self.growth_damping),
            ("pruning_floor", self.pruning_floor),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(FciqmcError::InvalidParameter {
                    name,
                    details: format!("expected a non-negative finite value, got {}", value),
                });
            }
        }
        if !(0.0..=1.0).contains(&self.single_probability) {
            return Err(FciqmcError::InvalidParameter {
                name: "single_probability",
                details: format!("expected a probability, got {}", self.single_probability),
            });
        }
        if let Some(threshold) = self.initiator_threshold {
            if threshold.is_nan() || threshold < 0.0 {
                return Err(FciqmcError::InvalidParameter {
                    name: "initiator_threshold",
                    details: format!("expected a non-negative value, got {}", threshold),
                });
            }
        }
        Ok(())
    }
}

/// Estimators and counters of one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepStatistics {
    /// Number of steps done, starts at 1.
    pub step: usize,
    pub shift: f64,
    pub total_population: f64,
    pub projected_energy: f64,
    pub reference_population: f64,
    pub occupied_determinants: usize,
    pub spawn_attempts: usize,
    pub spawned_walkers: f64,
    pub initiator_rejections: usize,
}

/// Shift change driving the population towards the target.
/// # Definition
/// $$
/// \Delta S=\frac{\xi}{\delta\tau}\ln\frac{N_{target}}{\max(N,1)}
/// $$
/// Positive below target, so the death rate drops and the population grows.
pub fn shift_increment(total_population: f64, target_population: f64, damping: f64, time_step: f64) -> f64 {
    damping / time_step * (target_population / total_population.max(1.0)).ln()
}

/// Shift change opposing the population growth rate of the last step.
/// $$
/// \Delta S=-\frac{\zeta}{\delta\tau}\ln\frac{\max(N,1)}{\max(N_{prev},1)}
/// $$
pub fn growth_increment(total_population: f64, previous_population: f64, growth_damping: f64, time_step: f64) -> f64 {
    -growth_damping / time_step * (total_population.max(1.0) / previous_population.max(1.0)).ln()
}

/// Seed of the random stream of one determinant at one step.
#[inline(always)]
pub fn stream_seed(seed: u64, digest: u64, step: u64) -> u64 {
    splitmix64(splitmix64(seed ^ digest) ^ step.wrapping_mul(0x9E3779B97F4A7C15))
}

/// Signed walkers spawned out of one parent.
#[derive(Debug, Clone)]
struct SpawnBatch<T> {
    children: Vec<(Determinant<T>, f64)>,
    attempts: usize,
}

/// Counters gathered while annihilating.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct AnnihilationCounts {
    spawn_attempts: usize,
    spawned_walkers: f64,
    initiator_rejections: usize,
}

/// Sums every contribution per determinant and prunes the result.
/// # Order
/// Pre-step amplitude, then death, then spawns in snapshot and proposal
/// order. The sum is sequential so the result does not depend on threads.
fn annihilate<T: BitOps>(
    snapshot: &[(Determinant<T>, f64)],
    deaths: &[f64],
    spawns: Vec<SpawnBatch<T>>,
    initiator_threshold: Option<f64>,
    pruning_floor: f64,
) -> (BTreeMap<Determinant<T>, f64>, AnnihilationCounts) {
    let mut next: BTreeMap<Determinant<T>, f64> = BTreeMap::new();
    for ((det, amplitude), death) in snapshot.iter().zip(deaths.iter()) {
        next.insert(*det, amplitude + death);
    }
    let mut counts = AnnihilationCounts::default();
    for ((_, amplitude), batch) in snapshot.iter().zip(spawns.into_iter()) {
        counts.spawn_attempts += batch.attempts;
        let initiator = match initiator_threshold {
            Some(threshold) => amplitude.abs() > threshold,
            None => true,
        };
        for (target, child) in batch.children {
            if !initiator && snapshot.binary_search_by(|(d, _)| d.cmp(&target)).is_err() {
                counts.initiator_rejections += 1;
                continue;
            }
            counts.spawned_walkers += child.abs();
            *next.entry(target).or_insert(0.0) += child;
        }
    }
    next.retain(|_, amplitude| amplitude.abs() >= pruning_floor);
    (next, counts)
}

/// Walker population and shift of a FCIQMC simulation.
/// # Definition
/// Every step applies the stochastic projector $1-\delta\tau(H-S)$ to the
/// signed walker distribution $\{N_i\}$ over determinants:
/// * spawning of $-\text{sign}(N_iH_{ji})$ walkers on connected $D_j$,
/// * death or cloning $\Delta N_i=-N_i\delta\tau(H_{ii}-S)$,
/// * annihilation of opposite signs on a determinant,
/// * pruning, then the shift update.
///
/// The shift $S$ and the projected energy
/// $$
/// E_{proj}=\sum_j\frac{\langle D_0\vert H\vert D_j\rangle N_j}{N_0}
/// $$
/// estimate the ground state energy.
#[derive(Debug, Clone)]
pub struct Fciqmc<'a, T: BitOps = u128> {
    hamiltonian: &'a Hamiltonian,
    generator: ExcitationGenerator<'a>,
    params: FciqmcParams,
    walkers: BTreeMap<Determinant<T>, f64>,
    reference: Determinant<T>,
    reference_energy: f64,
    shift: f64,
    previous_population: f64,
    step: usize,
}

impl<'a, T: BitOps> Fciqmc<'a, T> {
    /// Initialises the walkers on [Hamiltonian::lowest_diagonal_reference].
    pub fn new(basis: &'a Basis, hamiltonian: &'a Hamiltonian, params: FciqmcParams) -> Result<Self, FciqmcError> {
        params.validate()?;
        let reference = hamiltonian.lowest_diagonal_reference(basis, params.n_electrons)?;
        Fciqmc::with_reference(basis, hamiltonian, reference, params)
    }

    /// Initialises the walkers on the given reference.
    pub fn with_reference(
        basis: &'a Basis,
        hamiltonian: &'a Hamiltonian,
        reference: Determinant<T>,
        params: FciqmcParams,
    ) -> Result<Self, FciqmcError> {
        params.validate()?;
        if basis.nmo() != hamiltonian.nmo() {
            return Err(FciqmcError::WidthMismatch { left: basis.nmo(), right: hamiltonian.nmo() });
        }
        hamiltonian.check_width(&reference)?;
        let reference_energy = hamiltonian.diagonal(&reference);
        let shift = params.initial_shift.unwrap_or(reference_energy);
        let mut walkers = BTreeMap::new();
        walkers.insert(reference, params.initial_population);
        info!(
            "Starting FCIQMC on {} with {} walkers, E_ref={}, S={}.",
            reference, params.initial_population, reference_energy, shift
        );
        Ok(Fciqmc {
            hamiltonian,
            generator: ExcitationGenerator::new(basis, params.single_probability),
            previous_population: params.initial_population,
            params,
            walkers,
            reference,
            reference_energy,
            shift,
            step: 0,
        })
    }

    pub fn shift(&self) -> f64 {
        self.shift
    }

    /// Number of steps done.
    pub fn steps_done(&self) -> usize {
        self.step
    }

    pub fn params(&self) -> &FciqmcParams {
        &self.params
    }

    pub fn reference(&self) -> &Determinant<T> {
        &self.reference
    }

    pub fn reference_energy(&self) -> f64 {
        self.reference_energy
    }

    /// Current population, ordered by bit pattern.
    pub fn walkers(&self) -> &BTreeMap<Determinant<T>, f64> {
        &self.walkers
    }

    /// $\sum_i\vert N_i\vert$
    pub fn total_population(&self) -> f64 {
        self.walkers.values().map(|n| n.abs()).sum()
    }

    /// Projected energy on the reference. NaN once the reference is empty.
    pub fn projected_energy(&self) -> f64 {
        let reference_population = self.walkers.get(&self.reference).cloned().unwrap_or(0.0);
        if reference_population == 0.0 {
            warn!("Reference {} is unoccupied, projected energy undefined.", self.reference);
            return f64::NAN;
        }
        let numerator: f64 = self
            .walkers
            .iter()
            .map(|(det, n)| self.hamiltonian.slater_condon(&self.reference, det) * n)
            .sum();
        numerator / reference_population
    }

    fn spawn_from(&self, det: &Determinant<T>, amplitude: f64) -> SpawnBatch<T> {
        let mut rng = SmallRng::seed_from_u64(stream_seed(self.params.seed, det.digest(), self.step as u64));
        let attempts = (amplitude.abs().ceil() as usize).max(1);
        let weight = amplitude.abs() / attempts as f64;
        let mut children = Vec::new();
        for _ in 0..attempts {
            let excitation = match self.generator.propose(det, &mut rng) {
                Some(e) => e,
                None => continue,
            };
            let hij = self.hamiltonian.slater_condon(&excitation.target, det);
            if hij == 0.0 {
                continue;
            }
            let m = weight * self.params.time_step * hij.abs() / excitation.pgen;
            let whole = m.floor();
            let n_children = if rng.gen::<f64>() < m - whole { whole + 1.0 } else { whole };
            if n_children == 0.0 {
                continue;
            }
            let child = -amplitude.signum() * hij.signum() * n_children;
            trace!("Spawned {} walkers {} -> {} (H={}, pgen={}).", child, det, excitation.target, hij, excitation.pgen);
            children.push((excitation.target, child));
        }
        SpawnBatch { children, attempts }
    }

    /// Applies one projector step and updates the shift.
    /// # Arguments
    /// * __`profiler`__ - Receives the time spent in every phase.
    pub fn step(&mut self, profiler: &mut Profiler) -> StepStatistics {
        let snapshot: Vec<(Determinant<T>, f64)> = self.walkers.iter().map(|(d, n)| (*d, *n)).collect();

        let timer = Instant::now();
        let spawns: Vec<SpawnBatch<T>> = if self.params.spawning {
            snapshot.par_iter().map(|(det, n)| self.spawn_from(det, *n)).collect()
        } else {
            Vec::new()
        };
        profiler.add_timing("spawning", timer.elapsed());

        let timer = Instant::now();
        let dt = self.params.time_step;
        let shift = self.shift;
        let deaths: Vec<f64> = snapshot
            .par_iter()
            .map(|(det, n)| -n * dt * (self.hamiltonian.diagonal(det) - shift))
            .collect();
        profiler.add_timing("death", timer.elapsed());

        let timer = Instant::now();
        let (next, counts) = annihilate(
            &snapshot,
            &deaths,
            spawns,
            self.params.initiator_threshold,
            self.params.pruning_floor,
        );
        self.walkers = next;
        profiler.add_timing("annihilation", timer.elapsed());

        let timer = Instant::now();
        let total_population = self.total_population();
        self.shift += shift_increment(total_population, self.params.target_population, self.params.damping, dt)
            + growth_increment(total_population, self.previous_population, self.params.growth_damping, dt);
        self.previous_population = total_population;
        self.step += 1;
        let projected_energy = self.projected_energy();
        profiler.add_timing("estimators", timer.elapsed());

        let stats = StepStatistics {
            step: self.step,
            shift: self.shift,
            total_population,
            projected_energy,
            reference_population: self.walkers.get(&self.reference).cloned().unwrap_or(0.0),
            occupied_determinants: self.walkers.len(),
            spawn_attempts: counts.spawn_attempts,
            spawned_walkers: counts.spawned_walkers,
            initiator_rejections: counts.initiator_rejections,
        };
        debug!(
            "Step {}: S={:.6} E_proj={:.6} N={:.2} Ndet={} spawned={} rejected={}",
            stats.step,
            stats.shift,
            stats.projected_energy,
            stats.total_population,
            stats.occupied_determinants,
            stats.spawned_walkers,
            stats.initiator_rejections
        );
        stats
    }
}

/// Lazy sequence of the step statistics of a run.
/// # Usage
/// Yields `n_steps` items. Building a new run with the same inputs replays
/// the identical trajectory.
#[derive(Debug, Clone)]
pub struct FciqmcRun<'a, T: BitOps = u128> {
    engine: Fciqmc<'a, T>,
    remaining: usize,
    profiler: Profiler,
}

impl<'a, T: BitOps> FciqmcRun<'a, T> {
    pub fn engine(&self) -> &Fciqmc<'a, T> {
        &self.engine
    }

    pub fn profiler(&self) -> &Profiler {
        &self.profiler
    }

    pub fn into_parts(self) -> (Fciqmc<'a, T>, Profiler) {
        (self.engine, self.profiler)
    }
}

impl<'a, T: BitOps> Iterator for FciqmcRun<'a, T> {
    type Item = StepStatistics;

    fn next(&mut self) -> Option<StepStatistics> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.engine.step(&mut self.profiler))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T: BitOps> ExactSizeIterator for FciqmcRun<'a, T> {}

/// Starts a run of `params.n_steps` steps from the lowest diagonal reference.
/// # Errors
/// Invalid parameters, mismatched basis and Hamiltonian, or too many electrons.
pub fn run<'a, T: BitOps>(basis: &'a Basis, hamiltonian: &'a Hamiltonian, params: FciqmcParams) -> Result<FciqmcRun<'a, T>, FciqmcError> {
    let remaining = params.n_steps;
    let engine = Fciqmc::new(basis, hamiltonian, params)?;
    Ok(FciqmcRun { engine, remaining, profiler: Profiler::new() })
}

/// Runs FCIQMC on the pairing model.
/// # Returns
/// Per step `(step, shift, total population, projected energy)`.
#[cfg(feature = "python-interface")]
#[pyfunction]
pub fn run_pairing(
    p_max: usize,
    delta: f64,
    g: f64,
    n_electrons: usize,
    n_steps: usize,
    seed: u64,
    time_step: f64,
    target_population: f64,
) -> PyResult<Vec<(usize, f64, f64, f64)>> {
    let basis = Basis::new(p_max, delta);
    let hamiltonian = Hamiltonian::pairing_model(&basis, g);
    let params = FciqmcParams {
        n_electrons,
        n_steps,
        seed,
        time_step,
        target_population,
        ..Default::default()
    };
    let trajectory: FciqmcRun = run(&basis, &hamiltonian, params)?;
    Ok(trajectory
        .map(|s| (s.step, s.shift, s.total_population, s.projected_energy))
        .collect())
}

#[cfg(test)]
mod test {
    use super::*;
    use assert::close;

    #[test]
    fn test_shift_increment() {
        let (xi, dt) = (0.01, 0.001);
        assert_eq!(shift_increment(1000.0, 1000.0, xi, dt), 0.0);
        let below = shift_increment(500.0, 1000.0, xi, dt);
        close(below, xi / dt * 2f64.ln(), 1e-12);
        assert!(below > 0.0);
        assert!(shift_increment(2000.0, 1000.0, xi, dt) < 0.0);
        // Empty and negative totals are floored to 1.
        assert_eq!(shift_increment(0.0, 1000.0, xi, dt), shift_increment(1.0, 1000.0, xi, dt));
        assert_eq!(shift_increment(-3.0, 1000.0, xi, dt), shift_increment(1.0, 1000.0, xi, dt));
        assert_eq!(growth_increment(10.0, 10.0, 0.1, dt), 0.0);
        assert!(growth_increment(20.0, 10.0, 0.1, dt) < 0.0);
    }

    #[test]
    fn test_validate() {
        assert!(FciqmcParams::default().validate().is_ok());
        let params = FciqmcParams { time_step: 0.0, ..Default::default() };
        assert!(matches!(
            params.validate(),
            Err(FciqmcError::InvalidParameter { name: "time_step", .. })
        ));
        let params = FciqmcParams { single_probability: 1.5, ..Default::default() };
        assert!(params.validate().is_err());
        let params = FciqmcParams { damping: -1.0, ..Default::default() };
        assert!(params.validate().is_err());
        let params = FciqmcParams { initiator_threshold: Some(-1.0), ..Default::default() };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_shift_converges_without_interaction() {
        let basis = Basis::new(2, 1.0);
        let hamiltonian = Hamiltonian::pairing_model(&basis, 0.0);
        let params = FciqmcParams {
            time_step: 0.01,
            damping: 0.01,
            growth_damping: 0.05,
            initial_population: 1000.0,
            target_population: 1000.0,
            initial_shift: Some(0.3),
            n_steps: 3000,
            spawning: false,
            ..Default::default()
        };
        let trajectory: FciqmcRun<u64> = run(&basis, &hamiltonian, params).unwrap();
        let last = trajectory.last().unwrap();
        let mut energies: Vec<f64> = basis.orbitals().iter().map(|o| o.energy).collect();
        energies.sort_by(|a, b| a.partial_cmp(b).unwrap());
        close(last.shift, energies[0] + energies[1], 1e-6);
        close(last.total_population, 1000.0, 1e-3);
        assert_eq!(last.occupied_determinants, 1);
        assert_eq!(last.spawn_attempts, 0);
    }

    #[test]
    fn test_reproducible_trajectory() {
        let basis = Basis::new(3, 1.0);
        let hamiltonian = Hamiltonian::pairing_model(&basis, 0.6);
        let params = FciqmcParams {
            time_step: 0.01,
            target_population: 200.0,
            growth_damping: 0.05,
            n_electrons: 2,
            n_steps: 150,
            seed: 7,
            ..Default::default()
        };
        let first: Vec<StepStatistics> = run::<u64>(&basis, &hamiltonian, params.clone()).unwrap().collect();
        let second: Vec<StepStatistics> = run::<u64>(&basis, &hamiltonian, params).unwrap().collect();
        assert_eq!(first.len(), 150);
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.step, b.step);
            assert_eq!(a.shift.to_bits(), b.shift.to_bits());
            assert_eq!(a.total_population.to_bits(), b.total_population.to_bits());
            assert_eq!(a.projected_energy.to_bits(), b.projected_energy.to_bits());
            assert_eq!(a.occupied_determinants, b.occupied_determinants);
            assert_eq!(a.spawned_walkers.to_bits(), b.spawned_walkers.to_bits());
        }
        assert!(first.iter().any(|s| s.spawned_walkers > 0.0));
    }

    #[test]
    fn test_pruning_floor() {
        let basis = Basis::new(3, 1.0);
        let hamiltonian = Hamiltonian::pairing_model(&basis, 1.0);
        let params = FciqmcParams {
            time_step: 0.01,
            target_population: 50.0,
            growth_damping: 0.05,
            pruning_floor: 0.5,
            n_steps: 100,
            ..Default::default()
        };
        let mut engine: Fciqmc<u64> = Fciqmc::new(&basis, &hamiltonian, params).unwrap();
        let mut prof = Profiler::new();
        for _ in 0..100 {
            engine.step(&mut prof);
            for amplitude in engine.walkers().values() {
                assert!(amplitude.abs() >= 0.5);
            }
        }
        assert!(prof.get("spawning").is_some());
    }

    #[test]
    fn test_annihilation_cancels_opposite_signs() {
        let a: Determinant<u64> = Determinant::new([0, 1], 4).unwrap();
        let b: Determinant<u64> = Determinant::new([2, 3], 4).unwrap();
        let c: Determinant<u64> = Determinant::new([0, 3], 4).unwrap();
        let snapshot = vec![(a, 3.0), (b, -2.0)];
        let deaths = vec![-0.5, 0.0];
        let spawns = vec![
            SpawnBatch { children: vec![(b, 2.0), (c, 1.0)], attempts: 3 },
            SpawnBatch { children: vec![(c, -1.0), (a, 1.0)], attempts: 2 },
        ];
        let (next, counts) = annihilate(&snapshot, &deaths, spawns, None, 1e-9);
        assert_eq!(next.len(), 1);
        assert_eq!(next.get(&a), Some(&3.5));
        assert_eq!(counts.spawn_attempts, 5);
        assert_eq!(counts.spawned_walkers, 5.0);
        assert_eq!(counts.initiator_rejections, 0);
    }

    #[test]
    fn test_initiator_rejects_spawns_on_empty_determinants() {
        let a: Determinant<u64> = Determinant::new([0, 1], 4).unwrap();
        let b: Determinant<u64> = Determinant::new([2, 3], 4).unwrap();
        let c: Determinant<u64> = Determinant::new([0, 3], 4).unwrap();
        let snapshot = vec![(a, 3.0), (b, -1.0)];
        let deaths = vec![0.0, 0.0];
        let spawns = vec![
            SpawnBatch { children: vec![(c, 1.0)], attempts: 3 },
            SpawnBatch { children: vec![(c, -1.0), (a, -1.0)], attempts: 1 },
        ];
        let (next, counts) = annihilate(&snapshot, &deaths, spawns, Some(2.0), 1e-9);
        // Only the initiator reaches c, the weak parent still feeds a.
        assert_eq!(next.get(&c), Some(&1.0));
        assert_eq!(next.get(&a), Some(&2.0));
        assert_eq!(counts.initiator_rejections, 1);
    }

    #[test]
    fn test_initiator_run_stays_on_reference() {
        let basis = Basis::new(3, 1.0);
        let hamiltonian = Hamiltonian::pairing_model(&basis, 1.0);
        let params = FciqmcParams {
            time_step: 0.05,
            target_population: 100.0,
            growth_damping: 0.05,
            initiator_threshold: Some(1e12),
            n_steps: 200,
            ..Default::default()
        };
        let stats: Vec<StepStatistics> = run::<u64>(&basis, &hamiltonian, params).unwrap().collect();
        assert!(stats.iter().all(|s| s.occupied_determinants == 1));
        assert!(stats.iter().map(|s| s.initiator_rejections).sum::<usize>() > 0);
    }

    #[test]
    fn test_projected_energy_on_reference_only() {
        let basis = Basis::new(2, 1.0);
        let hamiltonian = Hamiltonian::pairing_model(&basis, 0.7);
        let engine: Fciqmc<u64> = Fciqmc::new(&basis, &hamiltonian, FciqmcParams::default()).unwrap();
        close(engine.projected_energy(), engine.reference_energy(), 1e-14);
        close(engine.shift(), engine.reference_energy(), 1e-14);
        assert_eq!(engine.total_population(), 10.0);
    }

    #[test]
    fn test_run_errors() {
        let basis = Basis::new(2, 1.0);
        let hamiltonian = Hamiltonian::pairing_model(&basis, 0.7);
        let params = FciqmcParams { n_electrons: 5, ..Default::default() };
        assert!(matches!(
            run::<u64>(&basis, &hamiltonian, params),
            Err(FciqmcError::TooManyElectrons { n_electrons: 5, nmo: 4 })
        ));
        let other = Basis::new(3, 1.0);
        assert!(run::<u64>(&other, &hamiltonian, FciqmcParams::default()).is_err());
    }
}
