use spacefield_common::{FieldConfig, RuleKind};

/// Masked draw value that triggers a random birth.
pub const BIRTH_DRAW: u32 = 1;

/// Decides a cell's next state from its current state and live neighbor count.
///
/// Rules that need randomness ask for it per neighbor count through
/// [`NeighborRule::wants_draw`]; the stepper only pulls a value from a random
/// stream when the rule says so, which keeps stream consumption identical
/// between runs.
pub trait NeighborRule: std::fmt::Debug + Send + Sync {
    /// Whether deciding a cell with this many neighbors consumes a random draw.
    fn wants_draw(&self, live_neighbors: u8) -> bool;

    /// Next state of a cell. `draw` is `Some` exactly when `wants_draw` was true.
    fn decide(&self, alive: bool, live_neighbors: u8, draw: Option<u32>) -> bool;
}

/// The asteroid rule.
///
/// - 3 neighbors: alive.
/// - 2 neighbors: alive if the masked draw equals [`BIRTH_DRAW`], otherwise unchanged.
/// - fewer than 2: dead.
/// - anything else: unchanged, so crowded cells persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StochasticRule {
    birth_mask: u32,
}

impl StochasticRule {
    /// `denominator` must be a power of two of at least 2.
    pub fn new(denominator: u32) -> Self {
        assert!(
            denominator >= 2 && denominator.is_power_of_two(),
            "birth denominator must be a power of two >= 2, got {denominator}"
        );
        Self::with_mask(denominator - 1)
    }

    /// A rule that births when `draw & birth_mask` equals [`BIRTH_DRAW`].
    pub fn with_mask(birth_mask: u32) -> Self {
        Self { birth_mask }
    }
}

impl Default for StochasticRule {
    fn default() -> Self {
        Self::new(32)
    }
}

impl NeighborRule for StochasticRule {
    fn wants_draw(&self, live_neighbors: u8) -> bool {
        live_neighbors == 2
    }

    fn decide(&self, alive: bool, live_neighbors: u8, draw: Option<u32>) -> bool {
        match live_neighbors {
            3 => true,
            2 => draw.is_some_and(|d| d & self.birth_mask == BIRTH_DRAW) || alive,
            0 | 1 => false,
            _ => alive,
        }
    }
}

/// Strict B3/S23. Never draws.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConwayRule;

impl NeighborRule for ConwayRule {
    fn wants_draw(&self, _live_neighbors: u8) -> bool {
        false
    }

    fn decide(&self, alive: bool, live_neighbors: u8, _draw: Option<u32>) -> bool {
        matches!((alive, live_neighbors), (true, 2) | (_, 3))
    }
}

/// The rule a config selects.
pub fn rule_for(config: &FieldConfig) -> Box<dyn NeighborRule> {
    match config.rule {
        RuleKind::Stochastic => Box::new(StochasticRule::with_mask(config.birth_mask())),
        RuleKind::Conway => Box::new(ConwayRule),
    }
}
