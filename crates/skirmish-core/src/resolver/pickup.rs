//! Power-up effects.

use tracing::debug;

use crate::actor::{ActorId, PowerUpKind};
use crate::context::SimContext;

/// Shield ring points granted by a shield pickup.
pub const SHIELD_HP: f32 = 50.0;
/// Armor plating points granted by an armor pickup.
pub const ARMOR_HP: f32 = 16.0;
/// Missiles added per pickup.
pub const MISSILES_PER_PICKUP: u32 = 5;
/// Missile stock cap.
pub const MAX_MISSILES: u32 = 10;
/// Hull points restored by a life pickup.
pub const LIFE_HEAL: f32 = 15.0;
/// Opacity a ship starts fading from when camouflage kicks in.
pub const CAMU_FULL_FADE: f32 = 100.0;

/// Applies a power-up to `ship` and consumes it.
///
/// Drones collect on behalf of their owner, so `ship` is always the
/// beneficiary. Returns `false` if either side is already gone.
pub fn collect(ctx: &mut SimContext, power_up: ActorId, ship: ActorId) -> bool {
    let Some(kind) = ctx
        .registry
        .live(power_up)
        .and_then(|actor| actor.as_power_up())
        .map(|p| p.kind)
    else {
        return false;
    };
    if !ctx.registry.is_alive(ship) {
        return false;
    }

    apply(ctx, kind, ship);
    ctx.registry.destroy(power_up);
    let player_count = ctx.roster.len();
    ctx.power_ups
        .collected(kind, ctx.now, player_count, &mut ctx.rng);
    debug!(%ship, ?kind, "power-up collected");
    true
}

fn apply(ctx: &mut SimContext, kind: PowerUpKind, ship: ActorId) {
    let now = ctx.now;
    let max_hp = ctx.config.ship.max_hp;
    if kind == PowerUpKind::Defense {
        defend(ctx, ship);
        return;
    }
    let Some(state) = ctx.registry.ship_mut(ship) else {
        return;
    };
    match kind {
        PowerUpKind::Shield => {
            state.shield.on = true;
            state.shield.hp = SHIELD_HP;
            state.shield.since = now;
        }
        PowerUpKind::Armor => state.enable_armor(ARMOR_HP),
        PowerUpKind::Missile => {
            state.missiles = (state.missiles + MISSILES_PER_PICKUP).min(MAX_MISSILES);
        }
        PowerUpKind::Life => state.hp = (state.hp + LIFE_HEAL).min(max_hp),
        PowerUpKind::Boost => {
            state.boost.on = true;
            state.boost.since = now;
        }
        PowerUpKind::Bomb => state.bomb_held = true,
        PowerUpKind::Camu => {
            if state.camu.level == 0 {
                state.camu.level = 1;
                state.camu.fade = CAMU_FULL_FADE;
                state.camu.since = now;
            }
        }
        PowerUpKind::Defense => {}
    }
}

/// Launches a drone, or upgrades and refreshes the one already flying.
fn defend(ctx: &mut SimContext, ship: ActorId) {
    let current = ctx
        .registry
        .ship(ship)
        .and_then(|state| state.drone)
        .filter(|&drone| ctx.registry.is_alive(drone));
    let Some(drone) = current else {
        ctx.spawn_drone(ship);
        return;
    };
    let max_level = ctx.config.combat.drone_max_level;
    if let Some(state) = ctx.registry.live_mut(drone).and_then(|a| a.as_drone_mut()) {
        state.level = (state.level + 1).min(max_level);
    }
    ctx.arm_drone_expiry(drone);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::components::PowerUpState;
    use crate::actor::{ActorInner, Motion};
    use crate::hooks::NoopHooks;
    use crate::tests::helpers::{context, place_ship};
    use glam::Vec2;

    fn place_power_up(ctx: &mut SimContext, kind: PowerUpKind) -> ActorId {
        ctx.registry.spawn(
            Motion::at(Vec2::new(300.0, 300.0)),
            ctx.now,
            ActorInner::PowerUp(PowerUpState { kind }),
        )
    }

    fn setup() -> (SimContext, ActorId) {
        let mut ctx = context(Box::new(NoopHooks));
        let p = ctx.roster.join("p", 5).unwrap();
        let ship = place_ship(&mut ctx, p, Vec2::new(100.0, 100.0));
        (ctx, ship)
    }

    #[test]
    fn shield_raises_ring() {
        let (mut ctx, ship) = setup();
        ctx.now = 700;
        let pu = place_power_up(&mut ctx, PowerUpKind::Shield);
        assert!(collect(&mut ctx, pu, ship));
        let state = ctx.registry.ship(ship).unwrap();
        assert!(state.shield.on);
        assert_eq!(state.shield.hp, SHIELD_HP);
        assert_eq!(state.shield.since, 700);
        assert!(!ctx.registry.is_alive(pu));
        assert_eq!(ctx.power_ups.active(PowerUpKind::Shield), 0);
    }

    #[test]
    fn missiles_are_capped() {
        let (mut ctx, ship) = setup();
        ctx.registry.ship_mut(ship).unwrap().missiles = 8;
        let pu = place_power_up(&mut ctx, PowerUpKind::Missile);
        collect(&mut ctx, pu, ship);
        assert_eq!(ctx.registry.ship(ship).unwrap().missiles, MAX_MISSILES);
    }

    #[test]
    fn life_heals_up_to_max() {
        let (mut ctx, ship) = setup();
        ctx.registry.ship_mut(ship).unwrap().hp = 10.0;
        let pu = place_power_up(&mut ctx, PowerUpKind::Life);
        collect(&mut ctx, pu, ship);
        assert_eq!(ctx.registry.ship(ship).unwrap().hp, 25.0);

        let pu = place_power_up(&mut ctx, PowerUpKind::Life);
        collect(&mut ctx, pu, ship);
        assert_eq!(ctx.registry.ship(ship).unwrap().hp, 30.0);
    }

    #[test]
    fn camouflage_only_from_visible() {
        let (mut ctx, ship) = setup();
        ctx.registry.ship_mut(ship).unwrap().camu.level = 2;
        let pu = place_power_up(&mut ctx, PowerUpKind::Camu);
        assert!(collect(&mut ctx, pu, ship));
        assert_eq!(ctx.registry.ship(ship).unwrap().camu.level, 2);
    }

    #[test]
    fn armor_and_bomb() {
        let (mut ctx, ship) = setup();
        let armor = place_power_up(&mut ctx, PowerUpKind::Armor);
        let bomb = place_power_up(&mut ctx, PowerUpKind::Bomb);
        collect(&mut ctx, armor, ship);
        collect(&mut ctx, bomb, ship);
        let state = ctx.registry.ship(ship).unwrap();
        assert!(state.armor.on);
        assert_eq!(state.armor.hp, ARMOR_HP);
        assert!(state.bomb_held);
    }

    #[test]
    fn defense_spawns_then_upgrades() {
        let (mut ctx, ship) = setup();
        let pu = place_power_up(&mut ctx, PowerUpKind::Defense);
        collect(&mut ctx, pu, ship);
        let drone = ctx.registry.ship(ship).unwrap().drone.unwrap();
        assert_eq!(ctx.registry.get(drone).unwrap().as_drone().unwrap().level, 1);

        for _ in 0..4 {
            ctx.now += 1_000;
            let pu = place_power_up(&mut ctx, PowerUpKind::Defense);
            collect(&mut ctx, pu, ship);
        }
        let state = *ctx.registry.get(drone).unwrap().as_drone().unwrap();
        assert_eq!(state.level, 3);
        assert_eq!(state.init_time, ctx.now);
        assert_eq!(ctx.registry.ship(ship).unwrap().drone, Some(drone));
    }

    #[test]
    fn missing_power_up_is_ignored() {
        let (mut ctx, ship) = setup();
        let pu = place_power_up(&mut ctx, PowerUpKind::Boost);
        assert!(collect(&mut ctx, pu, ship));
        assert!(!collect(&mut ctx, pu, ship));
    }
}
