use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::error::Error;

use fciqmc::basis::Basis;
use fciqmc::exact::exact_ground_state;
use fciqmc::fciqmc::{run, FciqmcParams, FciqmcRun};
use fciqmc::hamiltonian::Hamiltonian;
use fciqmc::strings::{footer_message, header_message, section_message};

const SEED: u64 = 1434;
const P_MAX: usize = 4;
const DELTA: f64 = 1.0;
const CONS_G: f64 = 0.5;
const NELEC: usize = 4;
const NSTEPS: usize = 20000;
const TIME_STEP: f64 = 0.001;
const TARGET_POPULATION: f64 = 1000.0;
const INITIAL_POPULATION: f64 = 10.0;
const DAMPING: f64 = 0.01;
const GROWTH_DAMPING: f64 = 0.05;
const PRUNING_FLOOR: f64 = 1e-9;
const SINGLE_PROBABILITY: f64 = 0.5;
const OUTPUT_FILE: &str = "fciqmc_trajectory.csv";
// Steps dropped before averaging the estimators.
const NEQUILIBRATION: usize = NSTEPS / 2;

fn log_system_parameters(params: &FciqmcParams) {
    info!("System parameter P_MAX = {}", P_MAX);
    info!("System parameter DELTA = {}", DELTA);
    info!("System parameter CONS_G = {}", CONS_G);
    info!("Run parameters {:?}", params);
}

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logger
    env_logger::init();
    println!("{}", header_message());

    let params = FciqmcParams {
        time_step: TIME_STEP,
        target_population: TARGET_POPULATION,
        damping: DAMPING,
        growth_damping: GROWTH_DAMPING,
        initiator_threshold: None,
        seed: SEED,
        pruning_floor: PRUNING_FLOOR,
        initial_population: INITIAL_POPULATION,
        initial_shift: None,
        n_electrons: NELEC,
        n_steps: NSTEPS,
        single_probability: SINGLE_PROBABILITY,
        spawning: true,
    };
    log_system_parameters(&params);

    let basis = Basis::new(P_MAX, DELTA);
    let hamiltonian = Hamiltonian::pairing_model(&basis, CONS_G);

    println!("{}", section_message("Exact diagonalisation"));
    let reference = hamiltonian.lowest_diagonal_reference(&basis, NELEC)?;
    let exact = exact_ground_state::<u128>(&basis, &hamiltonian, &reference)?;
    println!("Reference {} with energy {:.8}", reference, hamiltonian.diagonal(&reference));
    println!("Exact ground state energy {:.8} ({} determinants)", exact.energy, exact.determinants.len());

    println!("{}", section_message("Walker propagation"));
    let mut trajectory: FciqmcRun = run(&basis, &hamiltonian, params)?;
    let mut writer = csv::Writer::from_path(OUTPUT_FILE)?;
    writer.write_record([
        "step",
        "shift",
        "total_population",
        "projected_energy",
        "reference_population",
        "occupied_determinants",
        "spawned_walkers",
    ])?;

    let progress_bar = ProgressBar::new(NSTEPS as u64);
    progress_bar.set_prefix("Propagation: ");
    progress_bar.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {prefix} {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")?
            .progress_chars("##-"),
    );

    let (mut shift_sum, mut projected_sum, mut nsamp) = (0.0, 0.0, 0);
    for stats in trajectory.by_ref() {
        writer.write_record(&[
            stats.step.to_string(),
            stats.shift.to_string(),
            stats.total_population.to_string(),
            stats.projected_energy.to_string(),
            stats.reference_population.to_string(),
            stats.occupied_determinants.to_string(),
            stats.spawned_walkers.to_string(),
        ])?;
        if stats.step > NEQUILIBRATION && stats.projected_energy.is_finite() {
            shift_sum += stats.shift;
            projected_sum += stats.projected_energy;
            nsamp += 1;
        }
        progress_bar.set_message(format!("S = {:.5}, N = {:.0}", stats.shift, stats.total_population));
        progress_bar.inc(1);
    }
    progress_bar.finish();
    writer.flush()?;

    let nsamp = nsamp.max(1) as f64;
    println!("Mean shift           {:.8}", shift_sum / nsamp);
    println!("Mean projected       {:.8}", projected_sum / nsamp);
    println!("Exact                {:.8}", exact.energy);
    println!("Trajectory written to {}", OUTPUT_FILE);
    println!("{}", trajectory.profiler());
    println!("{}", footer_message());
    Ok(())
}
