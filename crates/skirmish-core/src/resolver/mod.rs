//! Collision resolution.
//!
//! Each resolver owns the interaction rules of one actor kind and applies
//! them directly to the [`SimContext`]. The [`CombatResolver`] runs them in
//! the fixed per-tick order:
//!
//! 1. [`ShipResolver`]: power-ups, foreign drones, bombs, other ships,
//!    bullets, missiles
//! 2. [`AsteroidResolver`]: spawning, then power-ups, drones, bombs, ships,
//!    other asteroids, bullets, missiles, then splitting
//! 3. [`DroneResolver`]: power-ups, bombs, other drones
//!
//! # Invariants
//!
//! - Every pass iterates a snapshot of ids taken when the pass starts, in
//!   spawn order.
//! - An actor destroyed earlier in the tick is skipped by every later check.
//! - Ships only die through [`SimContext::kill_ship`].

pub mod asteroid;
pub mod bomb;
pub mod defense;
pub mod pickup;
pub mod player;

pub use asteroid::AsteroidResolver;
pub use defense::DroneResolver;
pub use player::ShipResolver;

use tracing::trace_span;

use crate::context::SimContext;

/// A pass of interaction rules over the simulation context.
///
/// # Example
///
/// ```
/// use skirmish_core::context::SimContext;
/// use skirmish_core::resolver::Resolver;
///
/// struct Nothing;
///
/// impl Resolver for Nothing {
///     fn name(&self) -> &'static str {
///         "nothing"
///     }
///
///     fn resolve(&self, _ctx: &mut SimContext) {}
/// }
/// ```
pub trait Resolver: Send + Sync {
    /// Short name used in trace spans.
    fn name(&self) -> &'static str;

    /// Applies the rules. Must be deterministic given the context.
    fn resolve(&self, ctx: &mut SimContext);
}

/// Runs the per-kind resolvers in order.
pub struct CombatResolver {
    stages: Vec<Box<dyn Resolver>>,
}

impl std::fmt::Debug for CombatResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.stages.iter().map(|stage| stage.name()))
            .finish()
    }
}

impl Default for CombatResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl CombatResolver {
    /// Ships, then asteroids, then drones.
    #[must_use]
    pub fn new() -> Self {
        Self::with_stages(vec![
            Box::new(ShipResolver),
            Box::new(AsteroidResolver),
            Box::new(DroneResolver),
        ])
    }

    /// A custom sequence.
    #[must_use]
    pub fn with_stages(stages: Vec<Box<dyn Resolver>>) -> Self {
        Self { stages }
    }

    /// Names of the stages, in run order.
    pub fn stage_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.stages.iter().map(|stage| stage.name())
    }
}

impl Resolver for CombatResolver {
    fn name(&self) -> &'static str {
        "combat"
    }

    fn resolve(&self, ctx: &mut SimContext) {
        for stage in &self.stages {
            let _span = trace_span!("resolve", stage = stage.name()).entered();
            stage.resolve(ctx);
        }
    }
}
