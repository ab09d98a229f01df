//! Drone collision rules.
//!
//! Drones pick up power-ups for their owner, sacrifice themselves on bombs
//! and cancel each other out.

use crate::actor::ActorTag;
use crate::context::SimContext;
use crate::resolver::{bomb, pickup, Resolver};

/// Resolves every active drone against power-ups, bombs and later drones.
#[derive(Debug, Clone, Copy, Default)]
pub struct DroneResolver;

impl Resolver for DroneResolver {
    fn name(&self) -> &'static str {
        "drones"
    }

    fn resolve(&self, ctx: &mut SimContext) {
        let drones = ctx.registry.ids(ActorTag::Drone);
        for (index, &drone) in drones.iter().enumerate() {
            if !ctx.is_active(drone) {
                continue;
            }
            let Some(ship) = ctx.registry.live(drone).and_then(|a| a.as_drone()).map(|d| d.ship)
            else {
                continue;
            };

            for power_up in ctx.registry.ids(ActorTag::PowerUp) {
                if ctx.touching(drone, power_up) {
                    pickup::collect(ctx, power_up, ship);
                }
            }

            for id in ctx.registry.ids(ActorTag::Bomb) {
                if ctx.touching(drone, id) {
                    bomb::detonate(ctx, id);
                    ctx.destroy_drone(drone);
                    break;
                }
            }
            if !ctx.is_active(drone) {
                continue;
            }

            for &other in &drones[index + 1..] {
                if ctx.touching(other, drone) {
                    ctx.destroy_drone(other);
                    ctx.destroy_drone(drone);
                    break;
                }
            }
        }
    }
}
