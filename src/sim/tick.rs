//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. One call runs
//! the whole frame in a fixed order: walls, pickups, player, enemies,
//! projectiles, weapon timers, termination.

use super::collision::{Rect, resolve_move_within};
use super::projectile::{self, Faction, Outcome};
use super::pursuit::{Facing, pursue};
use super::state::{
    ActionState, Decal, DecalKind, GameEvent, GamePhase, GameState, PickupKind, WallKind,
};
use super::vision::can_see;
use super::weapon::{FireOutcome, ReloadOutcome, WeaponKind};

/// Held movement keys
///
/// Movement is cardinal. When several keys are held the first of up, down,
/// left, right wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveIntent {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveIntent {
    pub fn toward(facing: Facing) -> Self {
        let mut intent = Self::default();
        match facing {
            Facing::Up => intent.up = true,
            Facing::Down => intent.down = true,
            Facing::Left => intent.left = true,
            Facing::Right => intent.right = true,
        }
        intent
    }

    /// Resolved direction, `None` when no key is held
    pub fn direction(&self) -> Option<Facing> {
        if self.up {
            Some(Facing::Up)
        } else if self.down {
            Some(Facing::Down)
        } else if self.left {
            Some(Facing::Left)
        } else if self.right {
            Some(Facing::Right)
        } else {
            None
        }
    }
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub movement: MoveIntent,
    /// Fire the equipped weapon
    pub fire: bool,
    /// Reload the equipped weapon
    pub reload: bool,
    /// Equip a weapon (ignored unless owned)
    pub switch_weapon: Option<WeaponKind>,
}

/// Advance the game state by one fixed timestep
///
/// Returns the cues produced during the tick. Outside `Playing` nothing
/// changes and no time passes.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.phase != GamePhase::Playing {
        return events;
    }

    state.time_ticks += 1;
    state.time_ms += f64::from(dt) * 1000.0;
    let now = state.time_ms;

    // Obstacle snapshot for movement and vision this tick
    let obstacles = state.wall_rects();
    let bounds = state.map.world_bounds();

    collect_pickups(state, &mut events);
    update_player(state, input, dt, now, &obstacles, &bounds, &mut events);
    update_enemies(state, dt, now, &obstacles, &bounds, &mut events);
    update_projectiles(state, dt, &bounds, &mut events);

    for (weapon, rounds) in state.player.arsenal.update(now) {
        log::debug!("{} reloaded {rounds} rounds", weapon.as_str());
        events.push(GameEvent::ReloadFinished { weapon, rounds });
    }

    let player = &mut state.player;
    if !player.can_shoot(now) {
        player.action = ActionState::Shooting;
    } else if player.arsenal.current().is_reloading() {
        player.action = ActionState::Reloading;
    }

    check_termination(state, &mut events);
    events
}

fn collect_pickups(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let player_rect = state.player.rect();
    let (taken, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut state.pickups)
        .into_iter()
        .partition(|p| p.rect.overlaps(&player_rect));
    state.pickups = kept;

    let settings = &state.settings;
    let player = &mut state.player;
    for pickup in taken {
        match pickup.kind {
            PickupKind::Ammo(weapon) => {
                player.arsenal.add_ammo(weapon, settings.ammo_pickup_amount);
                events.push(GameEvent::AmmoCollected {
                    weapon,
                    rounds: settings.ammo_pickup_amount,
                });
            }
            PickupKind::Health => {
                player.health = (player.health + settings.health_pickup_amount)
                    .min(settings.player_max_health);
                events.push(GameEvent::HealthCollected {
                    health: player.health,
                });
            }
            PickupKind::Weapon(weapon) => {
                if player.arsenal.acquire(weapon) {
                    log::info!("Acquired {}", weapon.as_str());
                }
                events.push(GameEvent::WeaponAcquired { weapon });
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn update_player(
    state: &mut GameState,
    input: &TickInput,
    dt: f32,
    now: f64,
    obstacles: &[Rect],
    bounds: &Rect,
    events: &mut Vec<GameEvent>,
) {
    let settings = &state.settings;
    let player = &mut state.player;

    if let Some(weapon) = input.switch_weapon {
        if weapon != player.arsenal.equipped() {
            match player.arsenal.equip(weapon) {
                Ok(()) => events.push(GameEvent::WeaponSwitched { weapon }),
                Err(err) => log::debug!("Ignoring switch: {err}"),
            }
        }
    }

    if input.reload {
        if let ReloadOutcome::Started { .. } = player.arsenal.current_mut().start_reload(now) {
            events.push(GameEvent::ReloadStarted {
                weapon: player.arsenal.equipped(),
            });
        }
    }

    if input.fire && player.can_shoot(now) {
        let weapon = player.arsenal.equipped();
        match player.arsenal.current_mut().try_fire(now) {
            FireOutcome::Fired => {
                let stats = player.arsenal.current().stats;
                let volley = projectile::spawn_volley(
                    player.center(),
                    player.facing.degrees(),
                    settings.projectile_speed,
                    &stats,
                    Faction::Player,
                    &mut state.rng,
                );
                player.projectiles.extend(volley);
                player.shot_until_ms = now + settings.shot_animation_ms;
                events.push(GameEvent::Fired {
                    weapon,
                    projectiles: stats.bullets_per_shot,
                });
            }
            FireOutcome::Empty => events.push(GameEvent::EmptyClick { weapon }),
            FireOutcome::CoolingDown | FireOutcome::Reloading => {}
        }
    }

    player.action = ActionState::Idle;
    if let Some(facing) = input.movement.direction() {
        // Facing follows the key even when the way is blocked
        player.facing = facing;
        player.action = ActionState::Moving;
        let delta = facing.vector() * settings.player_speed * dt;
        player.pos = resolve_move_within(player.pos, delta, player.size, obstacles, bounds);
    }
}

fn update_enemies(
    state: &mut GameState,
    dt: f32,
    now: f64,
    obstacles: &[Rect],
    bounds: &Rect,
    events: &mut Vec<GameEvent>,
) {
    let settings = &state.settings;
    let player = &mut state.player;
    let target = player.pos;

    for enemy in state.enemies.iter_mut() {
        // Vision runs every tick, in or out of range, so the latch can flip early
        let reference = settings.vision.reference_degrees(enemy.facing);
        let visible = can_see(
            enemy.pos,
            target,
            obstacles,
            settings.vision_angle_degrees,
            reference,
        );
        if visible && enemy.seen.set() {
            log::debug!("Enemy {} spotted the player", enemy.id);
            events.push(GameEvent::PlayerSpotted { enemy: enemy.id });
        }

        let distance = enemy.pos.distance(target);
        enemy.action = ActionState::Idle;
        if distance < settings.detection_radius && (visible || enemy.seen.is_set()) {
            let step = pursue(
                enemy.pos,
                enemy.facing,
                target,
                enemy.size,
                settings.enemy_speed * dt,
                settings.enemy_stop_distance,
                obstacles,
                Some(bounds),
            );
            enemy.pos = step.pos;
            enemy.facing = step.facing;
            if step.moved {
                enemy.action = ActionState::Moving;
            }
        }

        if enemy.rect().overlaps(&player.rect()) {
            enemy.action = ActionState::Attacking;
            let ready = now - enemy.last_hit_ms >= settings.enemy_attack_interval_ms;
            if ready && player.is_alive() {
                player.health -= settings.enemy_contact_damage;
                enemy.last_hit_ms = now;
                events.push(GameEvent::PlayerHit {
                    damage: settings.enemy_contact_damage,
                    health: player.health,
                });
            }
        }
    }
}

fn update_projectiles(state: &mut GameState, dt: f32, bounds: &Rect, events: &mut Vec<GameEvent>) {
    let limits = state.settings.flight_limits();
    let mut projectiles = std::mem::take(&mut state.player.projectiles);
    let mut walls = state.wall_rects();
    let mut enemies = state.enemy_rects();

    projectiles.retain_mut(|p| match projectile::advance(p, dt, &walls, &enemies, bounds, &limits) {
        Outcome::Continue => true,
        Outcome::HitWall(i) => {
            let wall = &mut state.walls[i];
            let cell = wall.cell;
            if matches!(wall.kind, WallKind::Breakable { .. }) {
                if wall.take_damage(p.damage) {
                    log::debug!("Wall at ({}, {}) destroyed", cell.col, cell.row);
                    state.walls.remove(i);
                    walls.remove(i);
                    events.push(GameEvent::WallDestroyed { cell });
                } else {
                    events.push(GameEvent::WallHit { cell });
                }
            }
            false
        }
        Outcome::HitEnemy(i) => {
            let enemy = &mut state.enemies[i];
            enemy.health -= p.damage;
            let id = enemy.id;
            if enemy.is_alive() {
                events.push(GameEvent::EnemyHit {
                    enemy: id,
                    health: enemy.health,
                });
            } else {
                let pos = enemy.pos;
                state.enemies.remove(i);
                enemies.remove(i);
                state.decals.push(Decal {
                    pos,
                    kind: DecalKind::Corpse,
                });
                log::debug!("Enemy {id} killed");
                events.push(GameEvent::EnemyKilled { enemy: id });
            }
            false
        }
        Outcome::OutOfBounds | Outcome::Expired => false,
    });

    state.player.projectiles = projectiles;
}

fn check_termination(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if !state.player.is_alive() {
        state.phase = GamePhase::Lost;
        log::info!("Player died on level {}", state.level_id);
        events.push(GameEvent::PlayerDied);
    } else if state.live_enemy_count() == 0 {
        state.phase = GamePhase::Won;
        log::info!("Level {} cleared", state.level_id);
        events.push(GameEvent::LevelWon {
            level: state.level_id,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::levels::{Campaign, LevelGrid};
    use crate::settings::{Settings, VisionMode};
    use crate::sim::state::Enemy;
    use glam::Vec2;
    use proptest::prelude::*;
    use std::collections::{BTreeMap, BTreeSet};

    fn state_from(rows: &[&[i32]]) -> GameState {
        let campaign = Campaign::new(vec![LevelGrid::from_rows(rows)]).unwrap();
        GameState::new(Settings::default(), campaign, 1).unwrap()
    }

    fn state_with(settings: Settings, rows: &[&[i32]]) -> GameState {
        let campaign = Campaign::new(vec![LevelGrid::from_rows(rows)]).unwrap();
        GameState::new(settings, campaign, 1).unwrap()
    }

    fn idle() -> TickInput {
        TickInput::default()
    }

    #[test]
    fn test_tick_advances_clock() {
        let mut state = state_from(&[&[1, 1, 1, 1], &[1, 5, 0, 1], &[1, 0, 4, 1], &[1, 1, 1, 1]]);
        tick(&mut state, &idle(), SIM_DT);
        assert_eq!(state.time_ticks, 1);
        assert!((state.time_ms - 1000.0 / 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_no_enemies_wins_immediately() {
        let mut state = state_from(&[&[1, 1, 1], &[1, 5, 1], &[1, 1, 1]]);
        let events = tick(&mut state, &idle(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Won);
        assert!(events.contains(&GameEvent::LevelWon { level: 1 }));

        // Terminal phases freeze the simulation
        let before = state.time_ms;
        assert!(tick(&mut state, &idle(), SIM_DT).is_empty());
        assert_eq!(state.time_ms, before);
    }

    #[test]
    fn test_lost_checked_before_won() {
        let mut state = state_from(&[&[1, 1, 1], &[1, 5, 1], &[1, 1, 1]]);
        state.player.health = 0;
        tick(&mut state, &idle(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Lost);
    }

    #[test]
    fn test_player_moves_and_faces_key() {
        let mut state = state_from(&[
            &[1, 1, 1, 1, 1, 1],
            &[1, 5, 0, 0, 0, 1],
            &[1, 0, 0, 0, 4, 1],
            &[1, 1, 1, 1, 1, 1],
        ]);
        let start = state.player.pos;

        // Up is blocked by the border wall: position holds, facing still turns
        let input = TickInput {
            movement: MoveIntent::toward(Facing::Up),
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.player.pos, start);
        assert_eq!(state.player.facing, Facing::Up);

        let input = TickInput {
            movement: MoveIntent::toward(Facing::Down),
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert!(state.player.pos.y > start.y);
        assert_eq!(state.player.pos.x, start.x);
        assert_eq!(state.player.facing, Facing::Down);
        assert_eq!(state.player.action, ActionState::Moving);

        // Several keys held: up wins over right
        let input = TickInput {
            movement: MoveIntent {
                up: true,
                right: true,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(input.movement.direction(), Some(Facing::Up));
    }

    #[test]
    fn test_pickups_apply_and_disappear() {
        let mut state = state_from(&[
            &[1, 1, 1, 1, 1, 1, 1, 1],
            &[1, 5, 3, 2, 7, 0, 0, 1],
            &[1, 0, 0, 0, 0, 0, 4, 1],
            &[1, 1, 1, 1, 1, 1, 1, 1],
        ]);
        state.player.health = 90;
        let right = TickInput {
            movement: MoveIntent::toward(Facing::Right),
            ..Default::default()
        };

        let mut events = Vec::new();
        for _ in 0..90 {
            events.extend(tick(&mut state, &right, SIM_DT));
        }

        assert!(state.pickups.is_empty());
        assert_eq!(state.player.health, 100);
        assert!(events.contains(&GameEvent::HealthCollected { health: 100 }));
        assert_eq!(state.player.arsenal.weapon(WeaponKind::Handgun).reserve_ammo(), 25);
        assert!(state.player.arsenal.owns(WeaponKind::Rifle));
        assert!(events.contains(&GameEvent::WeaponAcquired {
            weapon: WeaponKind::Rifle
        }));
    }

    #[test]
    fn test_switch_requires_ownership() {
        let mut state = state_from(&[&[1, 1, 1, 1], &[1, 5, 0, 1], &[1, 0, 4, 1], &[1, 1, 1, 1]]);
        let input = TickInput {
            switch_weapon: Some(WeaponKind::Shotgun),
            ..Default::default()
        };
        let events = tick(&mut state, &input, SIM_DT);
        assert_eq!(state.player.arsenal.equipped(), WeaponKind::Handgun);
        assert!(events.is_empty());

        state.player.arsenal.acquire(WeaponKind::Shotgun);
        let events = tick(&mut state, &input, SIM_DT);
        assert_eq!(state.player.arsenal.equipped(), WeaponKind::Shotgun);
        assert!(events.contains(&GameEvent::WeaponSwitched {
            weapon: WeaponKind::Shotgun
        }));
    }

    #[test]
    fn test_fire_gated_by_shot_animation() {
        let mut state = state_from(&[
            &[1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            &[1, 5, 0, 0, 0, 0, 0, 0, 0, 1],
            &[1, 0, 0, 0, 0, 0, 0, 0, 4, 1],
            &[1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
        ]);
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        let events = tick(&mut state, &fire, SIM_DT);
        assert!(events.contains(&GameEvent::Fired {
            weapon: WeaponKind::Handgun,
            projectiles: 1
        }));
        assert_eq!(state.player.action, ActionState::Shooting);
        assert_eq!(state.player.arsenal.current().loaded_ammo(), 5);

        // Handgun has no cooldown, but the animation still blocks the next shot
        tick(&mut state, &fire, SIM_DT);
        assert_eq!(state.player.arsenal.current().loaded_ammo(), 5);

        for _ in 0..10 {
            tick(&mut state, &fire, SIM_DT);
        }
        assert!(state.player.arsenal.current().loaded_ammo() < 5);
    }

    #[test]
    fn test_empty_click_and_reload_through_tick() {
        let mut state = state_from(&[&[1, 1, 1, 1], &[1, 5, 0, 1], &[1, 0, 4, 1], &[1, 1, 1, 1]]);
        let stats = state.settings.weapons.handgun;
        *state.player.arsenal.current_mut() = crate::sim::Weapon::with_ammo(stats, 0, 15);

        let events = tick(
            &mut state,
            &TickInput {
                fire: true,
                ..Default::default()
            },
            SIM_DT,
        );
        assert!(events.contains(&GameEvent::EmptyClick {
            weapon: WeaponKind::Handgun
        }));
        assert!(state.player.projectiles.is_empty());

        let events = tick(
            &mut state,
            &TickInput {
                reload: true,
                ..Default::default()
            },
            SIM_DT,
        );
        assert!(events.contains(&GameEvent::ReloadStarted {
            weapon: WeaponKind::Handgun
        }));
        assert_eq!(state.player.action, ActionState::Reloading);

        let mut finished = false;
        for _ in 0..120 {
            finished |= tick(&mut state, &idle(), SIM_DT).contains(&GameEvent::ReloadFinished {
                weapon: WeaponKind::Handgun,
                rounds: 6,
            });
        }
        assert!(finished);
        assert_eq!(state.player.arsenal.current().loaded_ammo(), 6);
        assert_eq!(state.player.arsenal.current().reserve_ammo(), 9);
    }

    #[test]
    fn test_bullet_kills_enemy_and_leaves_corpse() {
        // Enemy two cells right of the player, player facing right
        let mut state = state_from(&[
            &[1, 1, 1, 1, 1, 1, 1],
            &[1, 5, 0, 4, 0, 0, 1],
            &[1, 1, 1, 1, 1, 1, 1],
        ]);
        state.enemies[0].health = 20;
        let mut events = tick(
            &mut state,
            &TickInput {
                fire: true,
                ..Default::default()
            },
            SIM_DT,
        );
        for _ in 0..30 {
            events.extend(tick(&mut state, &idle(), SIM_DT));
        }
        assert!(events.contains(&GameEvent::EnemyKilled { enemy: 1 }));
        assert!(state.enemies.is_empty());
        assert!(state.decals.iter().any(|d| d.kind == DecalKind::Corpse));
        assert_eq!(state.phase, GamePhase::Won);
    }

    #[test]
    fn test_wall_shields_enemy() {
        let mut state = state_from(&[
            &[1, 1, 1, 1, 1, 1, 1, 1],
            &[1, 5, 0, 6, 0, 4, 0, 1],
            &[1, 1, 1, 1, 1, 1, 1, 1],
        ]);
        let mut events = tick(
            &mut state,
            &TickInput {
                fire: true,
                ..Default::default()
            },
            SIM_DT,
        );
        for _ in 0..30 {
            events.extend(tick(&mut state, &idle(), SIM_DT));
        }
        assert!(events.iter().any(|e| matches!(e, GameEvent::WallHit { .. })));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::EnemyHit { .. })));
        assert_eq!(state.enemies[0].health, 100);
        assert!(matches!(
            state.walls.iter().find(|w| w.cell.col == 3 && w.cell.row == 1).map(|w| w.kind),
            Some(WallKind::Breakable { health: 80 })
        ));
    }

    #[test]
    fn test_enemy_chases_only_when_seen_and_near() {
        // Player below the enemy, inside the downward cone and 90 units away
        let mut state = state_from(&[
            &[1, 1, 1, 1, 1],
            &[1, 0, 4, 0, 1],
            &[1, 0, 0, 0, 1],
            &[1, 0, 5, 0, 1],
            &[1, 1, 1, 1, 1],
        ]);
        let start = state.enemies[0].pos;
        let events = tick(&mut state, &idle(), SIM_DT);
        assert!(events.contains(&GameEvent::PlayerSpotted { enemy: 1 }));
        assert!(state.enemies[0].seen.is_set());
        assert!(state.enemies[0].pos.y > start.y);
        assert_eq!(state.enemies[0].facing, Facing::Down);
        assert_eq!(state.enemies[0].action, ActionState::Moving);

        // The spotted cue fires once
        let events = tick(&mut state, &idle(), SIM_DT);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::PlayerSpotted { .. })));
    }

    #[test]
    fn test_enemy_ignores_player_behind_it() {
        // Player above the enemy: outside the downward cone, never latched
        let mut state = state_from(&[
            &[1, 1, 1, 1, 1],
            &[1, 0, 5, 0, 1],
            &[1, 0, 0, 0, 1],
            &[1, 0, 4, 0, 1],
            &[1, 1, 1, 1, 1],
        ]);
        let start = state.enemies[0].pos;
        for _ in 0..30 {
            tick(&mut state, &idle(), SIM_DT);
        }
        assert_eq!(state.enemies[0].pos, start);
        assert!(!state.enemies[0].seen.is_set());
        assert_eq!(state.enemies[0].action, ActionState::Idle);
    }

    #[test]
    fn test_seen_but_out_of_range_holds_position() {
        // Enemy at the origin looking along +x, player 300 units away
        let settings = Settings {
            vision: VisionMode::Fixed { degrees: 0.0 },
            ..Settings::default()
        };
        let mut state = state_with(settings, &[&[4, 0, 0, 0, 0, 0, 0, 5]]);
        state.enemies[0].pos = Vec2::ZERO;
        state.player.pos = Vec2::new(300.0, 0.0);

        let events = tick(&mut state, &idle(), SIM_DT);
        assert!(events.contains(&GameEvent::PlayerSpotted { enemy: 1 }));
        assert!(state.enemies[0].seen.is_set());
        assert_eq!(state.enemies[0].pos, Vec2::ZERO);
        assert_eq!(state.enemies[0].action, ActionState::Idle);
    }

    #[test]
    fn test_enemy_under_wall_row_spots_player() {
        // First level: the enemy in the top-right room starts flush with the
        // outer wall; open floor runs down to the player
        let mut state = GameState::new(Settings::default(), Campaign::default(), 1).unwrap();
        let enemy = state
            .enemies
            .iter()
            .position(|e| e.pos == Vec2::new(540.0, 45.0))
            .unwrap();
        let id = state.enemies[enemy].id;
        state.player.pos = Vec2::new(540.0, 145.0);

        let events = tick(&mut state, &idle(), SIM_DT);
        assert!(events.contains(&GameEvent::PlayerSpotted { enemy: id }));
        assert!(state.enemies[enemy].pos.y > 45.0);
    }

    #[test]
    fn test_tracking_cone_follows_facing() {
        let settings = Settings {
            vision: VisionMode::TrackFacing,
            ..Settings::default()
        };
        let rows: &[&[i32]] = &[&[1, 1, 1, 1, 1, 1], &[1, 4, 0, 5, 0, 1], &[1, 1, 1, 1, 1, 1]];
        let mut state = state_with(settings, rows);
        let start = state.enemies[0].pos;

        // Facing down, the player straight to the right is outside the cone
        for _ in 0..10 {
            tick(&mut state, &idle(), SIM_DT);
        }
        assert!(!state.enemies[0].seen.is_set());
        assert_eq!(state.enemies[0].pos, start);

        // Turned toward the player it spots and chases
        state.enemies[0].facing = Facing::Right;
        let events = tick(&mut state, &idle(), SIM_DT);
        assert!(events.contains(&GameEvent::PlayerSpotted { enemy: 1 }));
        assert!(state.enemies[0].pos.x > start.x);
        assert_eq!(state.enemies[0].pos.y, start.y);
        assert_eq!(state.enemies[0].facing, Facing::Right);
    }

    #[test]
    fn test_tracking_cone_sees_player_above() {
        // The fixed downward cone never sees upward; a tracking cone facing up does
        let rows: &[&[i32]] = &[
            &[1, 1, 1, 1, 1],
            &[1, 0, 5, 0, 1],
            &[1, 0, 0, 0, 1],
            &[1, 0, 4, 0, 1],
            &[1, 1, 1, 1, 1],
        ];
        let settings = Settings {
            vision: VisionMode::TrackFacing,
            ..Settings::default()
        };
        let mut state = state_with(settings, rows);
        state.enemies[0].facing = Facing::Up;
        let start = state.enemies[0].pos;

        let events = tick(&mut state, &idle(), SIM_DT);
        assert!(events.contains(&GameEvent::PlayerSpotted { enemy: 1 }));
        assert!(state.enemies[0].pos.y < start.y);
        assert_eq!(state.enemies[0].facing, Facing::Up);
    }

    #[test]
    fn test_contact_damage_is_rate_limited_per_enemy() {
        let mut state = state_from(&[&[1, 1, 1, 1], &[1, 5, 0, 1], &[1, 0, 4, 1], &[1, 1, 1, 1]]);
        // Stack a second enemy on the player; each keeps its own timer
        let id = state.next_entity_id();
        let pos = state.player.pos;
        let settings = state.settings.clone();
        state.enemies.push(Enemy::new(id, pos, 0.0, &settings));
        state.enemies[0].pos = pos;

        // No hit until an interval has passed since spawning
        let mut hits = 0;
        for _ in 0..58 {
            let events = tick(&mut state, &idle(), SIM_DT);
            hits += events.iter().filter(|e| matches!(e, GameEvent::PlayerHit { .. })).count();
        }
        assert_eq!(hits, 0);
        assert_eq!(state.player.health, 100);
        assert!(state.enemies.iter().all(|e| e.action == ActionState::Attacking));

        // Then one hit from each enemy
        for _ in 0..4 {
            let events = tick(&mut state, &idle(), SIM_DT);
            hits += events.iter().filter(|e| matches!(e, GameEvent::PlayerHit { .. })).count();
        }
        assert_eq!(hits, 2);
        assert_eq!(state.player.health, 60);

        // Just under a second later: still 60
        for _ in 0..56 {
            tick(&mut state, &idle(), SIM_DT);
        }
        assert_eq!(state.player.health, 60);
        for _ in 0..4 {
            tick(&mut state, &idle(), SIM_DT);
        }
        assert_eq!(state.player.health, 20);
    }

    #[test]
    fn test_restart_after_loss_rebuilds_level() {
        let mut state = state_from(&[&[1, 1, 1, 1], &[1, 5, 0, 1], &[1, 0, 4, 1], &[1, 1, 1, 1]]);
        state.player.health = 0;
        tick(&mut state, &idle(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Lost);

        state.restart().unwrap();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.health, 100);
        assert_eq!(state.enemies.len(), 1);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let rows: &[&[i32]] = &[
            &[1, 1, 1, 1, 1, 1, 1, 1],
            &[1, 5, 8, 0, 0, 0, 4, 1],
            &[1, 0, 0, 0, 6, 0, 0, 1],
            &[1, 0, 4, 0, 0, 0, 4, 1],
            &[1, 1, 1, 1, 1, 1, 1, 1],
        ];
        let mut state1 = state_from(rows);
        let mut state2 = state_from(rows);

        let inputs = [
            TickInput {
                movement: MoveIntent::toward(Facing::Right),
                ..Default::default()
            },
            TickInput {
                switch_weapon: Some(WeaponKind::Shotgun),
                fire: true,
                ..Default::default()
            },
            TickInput {
                movement: MoveIntent::toward(Facing::Down),
                fire: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for _ in 0..50 {
            for input in &inputs {
                let a = tick(&mut state1, input, SIM_DT);
                let b = tick(&mut state2, input, SIM_DT);
                assert_eq!(a, b);
            }
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.player.pos, state2.player.pos);
        assert_eq!(state1.player.projectiles, state2.player.projectiles);
        let e1: Vec<_> = state1.enemies.iter().map(|e| (e.id, e.pos, e.health)).collect();
        let e2: Vec<_> = state2.enemies.iter().map(|e| (e.id, e.pos, e.health)).collect();
        assert_eq!(e1, e2);
    }

    fn input_from(fire: bool, reload: bool, dir: u8) -> TickInput {
        let facing = match dir {
            0 => Some(Facing::Up),
            1 => Some(Facing::Down),
            2 => Some(Facing::Left),
            3 => Some(Facing::Right),
            _ => None,
        };
        TickInput {
            movement: facing.map(MoveIntent::toward).unwrap_or_default(),
            fire,
            reload,
            switch_weapon: None,
        }
    }

    proptest! {
        #[test]
        fn prop_enemy_health_never_rises_and_dead_stay_gone(
            inputs in proptest::collection::vec((any::<bool>(), any::<bool>(), 0u8..6), 1..240),
        ) {
            let mut state = state_from(&[
                &[1, 1, 1, 1, 1, 1, 1, 1],
                &[1, 5, 0, 0, 4, 0, 4, 1],
                &[1, 0, 0, 0, 0, 0, 0, 1],
                &[1, 0, 4, 0, 6, 0, 0, 1],
                &[1, 1, 1, 1, 1, 1, 1, 1],
            ]);
            let mut health: BTreeMap<u32, i32> =
                state.enemies.iter().map(|e| (e.id, e.health)).collect();
            let mut dead = BTreeSet::new();

            for (fire, reload, dir) in inputs {
                let events = tick(&mut state, &input_from(fire, reload, dir), SIM_DT);

                for enemy in &state.enemies {
                    prop_assert!(enemy.health > 0);
                    prop_assert!(!dead.contains(&enemy.id));
                    let last = health.insert(enemy.id, enemy.health);
                    prop_assert!(last.is_some_and(|h| enemy.health <= h));
                }
                for event in &events {
                    if let GameEvent::EnemyKilled { enemy } = event {
                        prop_assert!(state.enemies.iter().all(|e| e.id != *enemy));
                        dead.insert(*enemy);
                    }
                }
                // Everyone missing from the live set was killed
                for id in health.keys() {
                    let live = state.enemies.iter().any(|e| e.id == *id);
                    prop_assert_eq!(live, !dead.contains(id));
                }
            }
        }
    }
}
