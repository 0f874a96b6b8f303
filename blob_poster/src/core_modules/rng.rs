// THEORY:
// All randomness flows through an explicit generator handed to each function.
// Nothing in the crate reaches for a thread-local or global source on its own;
// the only place entropy enters is `poster_rng`, called at the outermost
// boundary (a render pass, a session host) when no seed was provided.
//
// The generator algorithm is pinned to xoshiro256++ seeded through
// `seed_from_u64`, so a seed reproduces the same poster across runs and
// across any implementation that pins the same algorithm and seed expansion.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// The pseudo-random generator used throughout the crate.
pub type PosterRng = Xoshiro256PlusPlus;

/// Builds a generator from an optional seed. `None` draws the seed material
/// from the thread-local entropy source.
pub fn poster_rng(seed: Option<u64>) -> PosterRng {
    match seed {
        Some(seed) => PosterRng::seed_from_u64(seed),
        None => PosterRng::from_rng(&mut rand::rng()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn same_seed_same_stream() {
        let mut a = poster_rng(Some(7));
        let mut b = poster_rng(Some(7));
        let xs: Vec<f64> = (0..16).map(|_| a.random()).collect();
        let ys: Vec<f64> = (0..16).map(|_| b.random()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = poster_rng(Some(1));
        let mut b = poster_rng(Some(2));
        assert_ne!(a.random::<u64>(), b.random::<u64>());
    }
}
