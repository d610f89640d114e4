use rand::{rngs::SmallRng, seq::SliceRandom, SeedableRng};

/// Row indices assigned to each fold.
#[derive(Debug, Clone)]
pub struct SplitIndices {
    /// Training fold.
    pub train: Vec<usize>,
    /// Held-out evaluation fold.
    pub test: Vec<usize>,
}

/// Shuffles `0..rows` with the seed and holds out `ceil(rows * test_ratio)`
/// indices for the test fold. Identical inputs produce identical folds.
/// Callers validate that `rows` is large enough for both folds to be
/// non-empty.
#[must_use]
pub fn train_test_split(rows: usize, test_ratio: f64, seed: u64) -> SplitIndices {
    let mut indices: Vec<usize> = (0..rows).collect();
    indices.shuffle(&mut SmallRng::seed_from_u64(seed));
    let held_out = (rows as f64 * test_ratio).ceil() as usize;
    let held_out = held_out.clamp(1, rows.saturating_sub(1).max(1));
    SplitIndices {
        test: indices[..held_out].to_vec(),
        train: indices[held_out..].to_vec(),
    }
}
