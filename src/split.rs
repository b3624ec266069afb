use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// A disjoint, exhaustive partition of example indices into the three output
/// splits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub validation: Vec<usize>,
    pub test: Vec<usize>,
}

/// Partitions `0..n` into train/validation/test by fractional allocation over
/// a single uniform shuffle.
///
/// The train and validation splits take `(n * fraction)` indices each
/// (truncated); the test split absorbs everything that remains, regardless of
/// the configured test fraction, so that no index is lost or duplicated to
/// rounding. The fractions are not required to sum to 1. Without a seed every
/// run produces a fresh random split.
pub fn split_indices(n: usize, fractions: [f64; 3], seed: Option<u64>) -> SplitIndices {
    let mut indices: Vec<usize> = (0..n).collect();

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    indices.shuffle(&mut rng);

    let n_train = ((n as f64 * fractions[0]) as usize).min(n);
    let n_validation = ((n as f64 * fractions[1]) as usize).min(n - n_train);

    let test = indices.split_off(n_train + n_validation);
    let validation = indices.split_off(n_train);

    SplitIndices {
        train: indices,
        validation,
        test,
    }
}
