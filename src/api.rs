use crate::{CellPolicy, ChartError, PolicyTraits};

/// Maximum sentence length the contribution table is sized for by default.
pub const DEFAULT_MAX_SENTENCE_LENGTH: usize = 70;

/// Chart configuration.
///
/// Consumed by [`ChartCellFactory::new`](crate::ChartCellFactory::new).
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    /// Admission policy for every cell.
    pub policy: CellPolicy,
    /// Longest sentence (in words) the structural hasher can fingerprint.
    pub max_sentence_length: usize,
    /// Seed for the contribution table. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self { policy: CellPolicy::default(), max_sentence_length: DEFAULT_MAX_SENTENCE_LENGTH, seed: None }
    }
}

impl ChartOptions {
    pub fn validate(&self) -> Result<(), ChartError> {
        self.policy.validate()?;
        if self.policy.traits().contains(PolicyTraits::STRUCTURAL_DEDUP) && self.max_sentence_length == 0 {
            return Err(ChartError::InvalidOption {
                name: "max_sentence_length",
                reason: "must be positive for policies that fingerprint derivations".to_string(),
            });
        }
        Ok(())
    }
}

/// Tagger pruning configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaggerOptions {
    /// Relative beam: candidates below `beta * best` (in probability space)
    /// are cut, except the first two.
    pub beta: f64,
    /// Hard cap on candidates per word.
    pub max_tags_per_word: usize,
}

impl Default for TaggerOptions {
    fn default() -> Self {
        Self { beta: 0.0001, max_tags_per_word: 50 }
    }
}

impl TaggerOptions {
    pub fn new(beta: f64, max_tags_per_word: usize) -> Result<Self, ChartError> {
        if !(0.0..=1.0).contains(&beta) {
            return Err(ChartError::InvalidOption { name: "beta", reason: format!("{beta} is not in [0, 1]") });
        }
        if max_tags_per_word == 0 {
            return Err(ChartError::InvalidOption {
                name: "max_tags_per_word",
                reason: "at least one tag per word is required".to_string(),
            });
        }
        Ok(Self { beta, max_tags_per_word })
    }
}
