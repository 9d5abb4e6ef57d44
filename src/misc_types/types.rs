use std::num::NonZeroUsize;

pub const DEFAULT_TRANSMISSION_PROB: f64 = 0.1763;
pub const DEFAULT_RECOVERY_PROB: f64 = 0.14;
pub const DEFAULT_ORDERING_SEED: u64 = 875629289;
pub const DEFAULT_SIR_SEED: u64 = 1489264107025;
pub const DEFAULT_TRIALS: NonZeroUsize = match NonZeroUsize::new(1000) {
    Some(trials) => trials,
    None => unreachable!()
};
pub const DEFAULT_VACCINATED_FRACTION: f64 = 0.1;

/// Safety net against epidemics that never die out (e.g. gamma = 0)
pub const DEFAULT_MAX_ROUNDS: usize = 1_000_000;

/// Probability to follow an edge instead of teleporting in the biased walk
pub const DEFAULT_TELEPORT_RATIO: f64 = 0.9;

/// Live strategies give up after this many attempts per vertex of the network
pub const DEFAULT_ATTEMPTS_PER_VERTEX: usize = 100;

/// Trials handled by one worker before its partial result is merged.
/// Fixed, so results do not depend on the number of threads.
pub const TRIALS_PER_CHUNK: usize = 64;

pub fn check_probability(name: &str, value: f64) -> Result<(), String>
{
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{name} has to be in [0, 1], found {value}"))
    }
}
