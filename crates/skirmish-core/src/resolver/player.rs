//! Ship collision rules.
//!
//! Ships are visited oldest first. A ship under spawn protection is skipped
//! entirely, both as the visiting ship and as a target of later ships.
//! Power-ups are always collected; the remaining checks stop at the first
//! one that destroys the ship or sets off a bomb.

use crate::actor::{ActorId, ActorTag};
use crate::context::SimContext;
use crate::hooks::Weapon;
use crate::resolver::{bomb, pickup, Resolver};
use crate::roster::{KillCause, PlayerId};

/// Damage a foreign drone deals to an unarmored ship.
pub const DRONE_RAM_DAMAGE: f32 = 15.0;
/// Damage a foreign drone deals to an armored ship.
pub const DRONE_RAM_ARMORED_DAMAGE: f32 = 10.0;
/// Bullet damage, to hull or shield.
pub const BULLET_DAMAGE: f32 = 5.0;
/// Missile damage to an unarmored hull or a shield.
pub const MISSILE_DAMAGE: f32 = 4.0;
/// Missile damage that gets through armor to the hull.
pub const MISSILE_ARMORED_HULL_DAMAGE: f32 = 1.0;

/// Resolves every ship against power-ups, drones, bombs, other ships and
/// projectiles.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShipResolver;

impl Resolver for ShipResolver {
    fn name(&self) -> &'static str {
        "ships"
    }

    fn resolve(&self, ctx: &mut SimContext) {
        let ships = ctx.registry.ids(ActorTag::Ship);
        for (index, &ship) in ships.iter().enumerate() {
            if !eligible(ctx, ship) {
                continue;
            }
            collect_power_ups(ctx, ship);
            let _ = ram_drones(ctx, ship)
                || hit_bombs(ctx, ship)
                || ram_ships(ctx, ship, &ships[index + 1..])
                || hit_by_shots(ctx, ship, ActorTag::Bullet)
                || hit_by_shots(ctx, ship, ActorTag::Missile);
        }
    }
}

fn eligible(ctx: &SimContext, ship: ActorId) -> bool {
    ctx.registry
        .ship(ship)
        .is_some_and(|state| state.hp > 0.0 && !state.is_guarded())
}

fn player_of(ctx: &SimContext, ship: ActorId) -> Option<PlayerId> {
    ctx.registry.ship(ship).map(|state| state.player)
}

fn collect_power_ups(ctx: &mut SimContext, ship: ActorId) {
    for power_up in ctx.registry.ids(ActorTag::PowerUp) {
        if ctx.touching(ship, power_up) {
            pickup::collect(ctx, power_up, ship);
        }
    }
}

/// Foreign drones ram the ship and are destroyed doing so.
fn ram_drones(ctx: &mut SimContext, ship: ActorId) -> bool {
    let Some(player) = player_of(ctx, ship) else {
        return true;
    };
    for drone in ctx.registry.ids(ActorTag::Drone) {
        let Some(owner) = ctx.registry.live(drone).and_then(|a| a.as_drone()).map(|d| d.owner)
        else {
            continue;
        };
        if owner == player || !ctx.touching(ship, drone) {
            continue;
        }
        ctx.destroy_drone(drone);
        let Some(state) = ctx.registry.ship_mut(ship) else {
            return true;
        };
        if state.armor.on {
            state.hp -= DRONE_RAM_ARMORED_DAMAGE;
            state.disable_armor();
        } else {
            state.hp -= DRONE_RAM_DAMAGE;
        }
        if state.hp <= 0.0 {
            let cause = KillCause::Projectile {
                shooter: owner,
                weapon: Weapon::Drone,
            };
            ctx.kill_ship(ship, cause);
            return true;
        }
    }
    false
}

/// Touching a foreign bomb sets it off.
fn hit_bombs(ctx: &mut SimContext, ship: ActorId) -> bool {
    let Some(player) = player_of(ctx, ship) else {
        return true;
    };
    for id in ctx.registry.ids(ActorTag::Bomb) {
        let foreign = ctx
            .registry
            .live(id)
            .and_then(|a| a.as_bomb())
            .is_some_and(|b| b.owner != player);
        if foreign && ctx.touching(ship, id) {
            bomb::detonate(ctx, id);
            return true;
        }
    }
    false
}

/// Ship against ship: armor wins against no armor and is lost doing so,
/// otherwise both go down.
fn ram_ships(ctx: &mut SimContext, ship: ActorId, later: &[ActorId]) -> bool {
    for &other in later {
        if !eligible(ctx, other) || !ctx.touching(ship, other) {
            continue;
        }
        let (Some(a), Some(b)) = (ctx.registry.ship(ship), ctx.registry.ship(other)) else {
            continue;
        };
        let (a_player, a_armor) = (a.player, a.armor.on);
        let (b_player, b_armor) = (b.player, b.armor.on);
        match (a_armor, b_armor) {
            (true, false) => {
                ctx.kill_ship(other, KillCause::Player(a_player));
                if let Some(state) = ctx.registry.ship_mut(ship) {
                    state.disable_armor();
                }
            }
            (false, true) => {
                ctx.kill_ship(ship, KillCause::Player(b_player));
                if let Some(state) = ctx.registry.ship_mut(other) {
                    state.disable_armor();
                }
                return true;
            }
            _ => {
                ctx.kill_ship(other, KillCause::Player(a_player));
                ctx.kill_ship(ship, KillCause::Player(b_player));
                return true;
            }
        }
    }
    false
}

/// Bullets or missiles against the hull, or against the shield ring while it
/// is up.
fn hit_by_shots(ctx: &mut SimContext, ship: ActorId, tag: ActorTag) -> bool {
    let Some(player) = player_of(ctx, ship) else {
        return true;
    };
    let combat = &ctx.config.combat;
    let (hull_grace, shield_grace) = (combat.self_hit_grace_ms, combat.shield_self_hit_grace_ms);
    let weapon = if tag == ActorTag::Missile {
        Weapon::Missile
    } else {
        Weapon::Bullet
    };

    for shot in ctx.registry.ids(tag) {
        let Some((owner, age)) = ctx.registry.live(shot).and_then(|actor| {
            actor
                .as_projectile()
                .map(|p| (p.owner, actor.age(ctx.now)))
        }) else {
            continue;
        };
        let own = owner == player;
        let shielded = ctx.registry.ship(ship).is_some_and(|s| s.shield.on);

        if shielded {
            if (own && age <= shield_grace) || !ctx.touching_shield(ship, shot) {
                continue;
            }
            ctx.roster.record_hit(owner);
            ctx.registry.destroy(shot);
            if let Some(state) = ctx.registry.ship_mut(ship) {
                state.shield.hp -= if weapon == Weapon::Missile {
                    MISSILE_DAMAGE
                } else {
                    BULLET_DAMAGE
                };
                if state.shield.hp <= 0.0 {
                    state.drop_shield();
                }
            }
            continue;
        }

        if (own && age <= hull_grace) || !ctx.touching(ship, shot) {
            continue;
        }
        ctx.roster.record_hit(owner);
        ctx.registry.destroy(shot);
        let Some(state) = ctx.registry.ship_mut(ship) else {
            return true;
        };
        match weapon {
            Weapon::Missile if state.armor.on => {
                state.armor.hp -= MISSILE_DAMAGE;
                if state.armor.hp <= 0.0 {
                    state.disable_armor();
                }
                state.hp -= MISSILE_ARMORED_HULL_DAMAGE;
            }
            Weapon::Missile => state.hp -= MISSILE_DAMAGE,
            _ => state.hp -= BULLET_DAMAGE,
        }
        if state.hp <= 0.0 {
            ctx.kill_ship(
                ship,
                KillCause::Projectile {
                    shooter: owner,
                    weapon,
                },
            );
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::components::{BombState, DroneState, ProjectileState};
    use crate::actor::{ActorInner, Motion};
    use crate::hooks::NoopHooks;
    use crate::tests::helpers::{context, place_ship, HookCall, RecordingHooks};
    use glam::Vec2;

    fn shoot(ctx: &mut SimContext, owner: PlayerId, tag: ActorTag, at: Vec2) -> ActorId {
        let state = ProjectileState { owner };
        let inner = if tag == ActorTag::Missile {
            ActorInner::Missile(state)
        } else {
            ActorInner::Bullet(state)
        };
        ctx.registry.spawn(Motion::at(at), ctx.now, inner)
    }

    fn two_players(ctx: &mut SimContext) -> (PlayerId, PlayerId) {
        (
            ctx.roster.join("a", 5).unwrap(),
            ctx.roster.join("b", 5).unwrap(),
        )
    }

    mod projectile_tests {
        use super::*;

        #[test]
        fn bullet_damages_and_counts_hit() {
            let mut ctx = context(Box::new(NoopHooks));
            let (a, b) = two_players(&mut ctx);
            let ship = place_ship(&mut ctx, b, Vec2::new(200.0, 200.0));
            let bullet = shoot(&mut ctx, a, ActorTag::Bullet, Vec2::new(200.0, 200.0));
            ShipResolver.resolve(&mut ctx);
            assert!(!ctx.registry.is_alive(bullet));
            assert_eq!(ctx.registry.ship(ship).unwrap().hp, 25.0);
            assert_eq!(ctx.roster.get(a).unwrap().stats.hits, 1);
        }

        #[test]
        fn own_bullet_is_ignored_right_after_launch() {
            let mut ctx = context(Box::new(NoopHooks));
            let (a, _) = two_players(&mut ctx);
            let ship = place_ship(&mut ctx, a, Vec2::new(200.0, 200.0));
            ctx.now = 1_000;
            let bullet = shoot(&mut ctx, a, ActorTag::Bullet, Vec2::new(200.0, 200.0));
            ctx.now = 1_050;
            ShipResolver.resolve(&mut ctx);
            assert!(ctx.registry.is_alive(bullet));

            ctx.now = 1_051;
            ShipResolver.resolve(&mut ctx);
            assert!(!ctx.registry.is_alive(bullet));
            assert_eq!(ctx.registry.ship(ship).unwrap().hp, 25.0);
        }

        #[test]
        fn missile_against_armor() {
            let mut ctx = context(Box::new(NoopHooks));
            let (a, b) = two_players(&mut ctx);
            let ship = place_ship(&mut ctx, b, Vec2::new(200.0, 200.0));
            ctx.registry.ship_mut(ship).unwrap().enable_armor(6.0);
            for _ in 0..2 {
                shoot(&mut ctx, a, ActorTag::Missile, Vec2::new(200.0, 200.0));
                ShipResolver.resolve(&mut ctx);
            }
            let state = ctx.registry.ship(ship).unwrap();
            assert!(!state.armor.on);
            assert_eq!(state.hp, 28.0);
        }

        #[test]
        fn shield_absorbs_at_ring_radius() {
            let mut ctx = context(Box::new(NoopHooks));
            let (a, b) = two_players(&mut ctx);
            let ship = place_ship(&mut ctx, b, Vec2::new(200.0, 200.0));
            {
                let state = ctx.registry.ship_mut(ship).unwrap();
                state.shield.on = true;
                state.shield.hp = 5.0;
            }
            // Outside the hull, inside the ring.
            let bullet = shoot(&mut ctx, a, ActorTag::Bullet, Vec2::new(222.0, 200.0));
            ShipResolver.resolve(&mut ctx);
            assert!(!ctx.registry.is_alive(bullet));
            let state = ctx.registry.ship(ship).unwrap();
            assert!(!state.shield.on);
            assert_eq!(state.hp, 30.0);
        }

        #[test]
        fn own_bullet_passes_shield_during_grace() {
            let mut ctx = context(Box::new(NoopHooks));
            let (a, _) = two_players(&mut ctx);
            let ship = place_ship(&mut ctx, a, Vec2::new(200.0, 200.0));
            {
                let state = ctx.registry.ship_mut(ship).unwrap();
                state.shield.on = true;
                state.shield.hp = 10.0;
            }
            ctx.now = 1_000;
            let bullet = shoot(&mut ctx, a, ActorTag::Bullet, Vec2::new(210.0, 200.0));
            ctx.now = 1_225;
            ShipResolver.resolve(&mut ctx);
            assert!(ctx.registry.is_alive(bullet));
            assert_eq!(ctx.registry.ship(ship).unwrap().shield.hp, 10.0);

            ctx.now = 1_226;
            ShipResolver.resolve(&mut ctx);
            assert!(!ctx.registry.is_alive(bullet));
            let state = ctx.registry.ship(ship).unwrap();
            assert_eq!(state.shield.hp, 5.0);
            assert_eq!(state.hp, 30.0);
        }

        #[test]
        fn missile_drains_shield_only() {
            let mut ctx = context(Box::new(NoopHooks));
            let (a, b) = two_players(&mut ctx);
            let ship = place_ship(&mut ctx, b, Vec2::new(200.0, 200.0));
            {
                let state = ctx.registry.ship_mut(ship).unwrap();
                state.enable_armor(6.0);
                state.shield.on = true;
                state.shield.hp = 10.0;
            }
            let missile = shoot(&mut ctx, a, ActorTag::Missile, Vec2::new(200.0, 200.0));
            ShipResolver.resolve(&mut ctx);
            assert!(!ctx.registry.is_alive(missile));
            let state = ctx.registry.ship(ship).unwrap();
            assert!(state.shield.on);
            assert_eq!(state.shield.hp, 6.0);
            assert_eq!(state.hp, 30.0);
            assert!(state.armor.on);
            assert_eq!(state.armor.hp, 6.0);
        }

        #[test]
        fn lethal_bullet_credits_shooter_once() {
            let (hooks, calls) = RecordingHooks::new();
            let mut ctx = context(Box::new(hooks));
            let (a, b) = two_players(&mut ctx);
            let ship = place_ship(&mut ctx, b, Vec2::new(200.0, 200.0));
            ctx.registry.ship_mut(ship).unwrap().hp = 5.0;
            shoot(&mut ctx, a, ActorTag::Bullet, Vec2::new(200.0, 200.0));
            shoot(&mut ctx, a, ActorTag::Bullet, Vec2::new(200.0, 200.0));
            ShipResolver.resolve(&mut ctx);
            let kills = calls
                .borrow()
                .iter()
                .filter(|c| matches!(c, HookCall::KillByProjectile { .. }))
                .count();
            assert_eq!(kills, 1);
            assert_eq!(ctx.roster.get(a).unwrap().stats.kills, 1);
        }
    }

    mod contact_tests {
        use super::*;

        #[test]
        fn armored_ship_wins_a_ram() {
            let mut ctx = context(Box::new(NoopHooks));
            let (a, b) = two_players(&mut ctx);
            let sa = place_ship(&mut ctx, a, Vec2::new(200.0, 200.0));
            let sb = place_ship(&mut ctx, b, Vec2::new(200.0, 210.0));
            ctx.registry.ship_mut(sa).unwrap().enable_armor(16.0);
            ShipResolver.resolve(&mut ctx);
            assert!(ctx.registry.is_alive(sa));
            assert!(!ctx.registry.ship(sa).unwrap().armor.on);
            assert!(!ctx.registry.is_alive(sb));
            assert_eq!(ctx.roster.get(a).unwrap().stats.kills, 1);
        }

        #[test]
        fn equal_ships_both_die() {
            let mut ctx = context(Box::new(NoopHooks));
            let (a, b) = two_players(&mut ctx);
            let sa = place_ship(&mut ctx, a, Vec2::new(200.0, 200.0));
            let sb = place_ship(&mut ctx, b, Vec2::new(200.0, 210.0));
            ShipResolver.resolve(&mut ctx);
            assert!(!ctx.registry.is_alive(sa));
            assert!(!ctx.registry.is_alive(sb));
        }

        #[test]
        fn guarded_ships_pass_through() {
            let mut ctx = context(Box::new(NoopHooks));
            let (a, b) = two_players(&mut ctx);
            let sa = place_ship(&mut ctx, a, Vec2::new(200.0, 200.0));
            let sb = place_ship(&mut ctx, b, Vec2::new(200.0, 210.0));
            ctx.registry.ship_mut(sb).unwrap().guard = 3;
            ShipResolver.resolve(&mut ctx);
            assert!(ctx.registry.is_alive(sa));
            assert!(ctx.registry.is_alive(sb));
        }

        #[test]
        fn foreign_drone_rams() {
            let mut ctx = context(Box::new(NoopHooks));
            let (a, b) = two_players(&mut ctx);
            let sa = place_ship(&mut ctx, a, Vec2::new(100.0, 100.0));
            let sb = place_ship(&mut ctx, b, Vec2::new(300.0, 300.0));
            let drone = ctx.registry.spawn(
                Motion::at(Vec2::new(300.0, 300.0)),
                0,
                ActorInner::Drone(DroneState {
                    owner: a,
                    ship: sa,
                    level: 1,
                    init_time: 0,
                    orbit: 0.0,
                    expiry: None,
                }),
            );
            ShipResolver.resolve(&mut ctx);
            assert!(!ctx.registry.is_alive(drone));
            assert_eq!(ctx.registry.ship(sb).unwrap().hp, 15.0);
        }

        #[test]
        fn own_bomb_does_not_trigger() {
            let mut ctx = context(Box::new(NoopHooks));
            let (a, b) = two_players(&mut ctx);
            let sa = place_ship(&mut ctx, a, Vec2::new(100.0, 100.0));
            let bomb = ctx.registry.spawn(
                Motion::at(Vec2::new(100.0, 100.0)),
                0,
                ActorInner::Bomb(BombState { owner: a, range: 70.0 }),
            );
            ShipResolver.resolve(&mut ctx);
            assert!(ctx.registry.is_alive(bomb));

            let sb = place_ship(&mut ctx, b, Vec2::new(100.0, 100.0));
            ctx.registry.ship_mut(sa).unwrap().guard = 5;
            ShipResolver.resolve(&mut ctx);
            assert!(!ctx.registry.is_alive(bomb));
            assert!(!ctx.registry.is_alive(sb));
        }
    }
}
