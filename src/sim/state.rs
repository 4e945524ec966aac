//! Game state and core simulation types
//!
//! Everything a tick reads or writes lives here. Rebuilding from a level
//! definition (`reset`) always starts from scratch; only `advance_level`
//! carries the player over.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::grid::{Cell, CellCode, TileMap};
use super::projectile::Projectile;
use super::pursuit::Facing;
use super::vision::SeenLatch;
use super::weapon::{Arsenal, WeaponKind};
use crate::error::LevelError;
use crate::levels::Campaign;
use crate::settings::Settings;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Every enemy on the level is dead
    Won,
    /// Player health reached zero
    Lost,
    /// Final level won
    Completed,
}

/// What an entity is doing, for animation selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActionState {
    #[default]
    Idle,
    Moving,
    /// Enemy in contact with the player
    Attacking,
    /// Player shot animation running
    Shooting,
    Reloading,
}

/// The player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub health: i32,
    pub facing: Facing,
    pub action: ActionState,
    pub arsenal: Arsenal,
    /// Live projectiles, in spawn order
    pub projectiles: Vec<Projectile>,
    /// Shot animation end; no new shot before this
    pub shot_until_ms: f64,
}

impl Player {
    pub fn new(pos: Vec2, settings: &Settings) -> Self {
        Self {
            pos,
            size: settings.player_box(),
            health: settings.player_max_health,
            facing: Facing::Right,
            action: ActionState::Idle,
            arsenal: Arsenal::new(&settings.weapons),
            projectiles: Vec::new(),
            shot_until_ms: 0.0,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Whether the shot animation has finished
    #[inline]
    pub fn can_shoot(&self, now_ms: f64) -> bool {
        now_ms >= self.shot_until_ms
    }
}

/// A pursuing enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub health: i32,
    pub facing: Facing,
    pub action: ActionState,
    pub seen: SeenLatch,
    /// Last contact hit on the player; starts at the spawn time
    pub last_hit_ms: f64,
}

impl Enemy {
    pub fn new(id: u32, pos: Vec2, spawned_ms: f64, settings: &Settings) -> Self {
        Self {
            id,
            pos,
            size: settings.enemy_box(),
            health: settings.enemy_health,
            facing: Facing::Down,
            action: ActionState::Idle,
            seen: SeenLatch::default(),
            last_hit_ms: spawned_ms,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

/// Wall variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WallKind {
    Unbreakable,
    Breakable { health: i32 },
}

/// One wall cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub cell: Cell,
    pub rect: Rect,
    pub kind: WallKind,
}

impl Wall {
    /// Apply projectile damage; returns true if the wall is destroyed
    pub fn take_damage(&mut self, damage: i32) -> bool {
        match &mut self.kind {
            WallKind::Unbreakable => false,
            WallKind::Breakable { health } => {
                *health -= damage;
                *health <= 0
            }
        }
    }
}

/// Pickup variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    Ammo(WeaponKind),
    Health,
    Weapon(WeaponKind),
}

/// A collectible item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub cell: Cell,
    pub rect: Rect,
    pub kind: PickupKind,
}

/// Presentation-only overlays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecalKind {
    Corpse,
    Blood,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decal {
    pub pos: Vec2,
    pub kind: DecalKind,
}

/// Cues emitted by a tick for presentation layers (audio, effects, HUD)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Fired { weapon: WeaponKind, projectiles: u32 },
    EmptyClick { weapon: WeaponKind },
    ReloadStarted { weapon: WeaponKind },
    ReloadFinished { weapon: WeaponKind, rounds: u32 },
    WeaponSwitched { weapon: WeaponKind },
    WeaponAcquired { weapon: WeaponKind },
    AmmoCollected { weapon: WeaponKind, rounds: u32 },
    HealthCollected { health: i32 },
    PlayerSpotted { enemy: u32 },
    PlayerHit { damage: i32, health: i32 },
    EnemyHit { enemy: u32, health: i32 },
    EnemyKilled { enemy: u32 },
    WallHit { cell: Cell },
    WallDestroyed { cell: Cell },
    LevelWon { level: usize },
    PlayerDied,
}

/// Render-facing view of the player
#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub size: Vec2,
    pub health: i32,
    pub facing: Facing,
    pub action: ActionState,
    pub weapon: WeaponKind,
    pub loaded_ammo: u32,
    pub reserve_ammo: u32,
    pub reloading: bool,
    pub owned: Vec<WeaponKind>,
}

impl From<&Player> for PlayerView {
    fn from(player: &Player) -> Self {
        let weapon = player.arsenal.current();
        Self {
            pos: player.pos,
            size: player.size,
            health: player.health,
            facing: player.facing,
            action: player.action,
            weapon: player.arsenal.equipped(),
            loaded_ammo: weapon.loaded_ammo(),
            reserve_ammo: weapon.reserve_ammo(),
            reloading: weapon.is_reloading(),
            owned: WeaponKind::ALL
                .into_iter()
                .filter(|&k| player.arsenal.owns(k))
                .collect(),
        }
    }
}

/// Render-facing view of an enemy
#[derive(Debug, Clone, Serialize)]
pub struct EnemyView {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    pub health: i32,
    pub facing: Facing,
    pub action: ActionState,
    pub alerted: bool,
}

impl From<&Enemy> for EnemyView {
    fn from(enemy: &Enemy) -> Self {
        Self {
            id: enemy.id,
            pos: enemy.pos,
            size: enemy.size,
            health: enemy.health,
            facing: enemy.facing,
            action: enemy.action,
            alerted: enemy.seen.is_set(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectileView {
    pub pos: Vec2,
    pub vel: Vec2,
}

impl From<&Projectile> for ProjectileView {
    fn from(p: &Projectile) -> Self {
        Self {
            pos: p.pos,
            vel: p.vel,
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub level_id: usize,
    pub phase: GamePhase,
    pub time_ms: f64,
    pub world: Rect,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    pub walls: Vec<Wall>,
    pub pickups: Vec<Pickup>,
    pub decals: Vec<Decal>,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    /// Simulation clock, advanced only by ticks
    pub time_ms: f64,
    pub time_ticks: u64,
    /// 1-based id of the current level
    pub level_id: usize,
    pub phase: GamePhase,
    pub settings: Settings,
    campaign: Campaign,
    pub map: TileMap,
    pub walls: Vec<Wall>,
    pub pickups: Vec<Pickup>,
    /// Live enemies (sorted by id)
    pub enemies: Vec<Enemy>,
    pub player: Player,
    pub decals: Vec<Decal>,
    next_id: u32,
}

impl GameState {
    /// Start a run on `level_id`
    pub fn new(settings: Settings, campaign: Campaign, level_id: usize) -> Result<Self, LevelError> {
        let map = TileMap::from_grid(campaign.level(level_id)?, settings.cell_size)?;
        let spawn = map.cell_origin(map.player_spawn());
        let mut state = Self {
            seed: settings.seed,
            rng: Pcg32::seed_from_u64(settings.seed),
            time_ms: 0.0,
            time_ticks: 0,
            level_id,
            phase: GamePhase::Playing,
            player: Player::new(spawn, &settings),
            settings,
            campaign,
            map,
            walls: Vec::new(),
            pickups: Vec::new(),
            enemies: Vec::new(),
            decals: Vec::new(),
            next_id: 1,
        };
        state.populate();
        log::info!(
            "Level {} loaded: {} enemies, {} walls",
            level_id,
            state.enemies.len(),
            state.walls.len()
        );
        Ok(state)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn campaign(&self) -> &Campaign {
        &self.campaign
    }

    /// Rebuild the world for `level_id` from its static definition
    ///
    /// Nothing survives: player, arsenal, RNG and clock all start fresh.
    pub fn reset(&mut self, level_id: usize) -> Result<(), LevelError> {
        let map = TileMap::from_grid(self.campaign.level(level_id)?, self.settings.cell_size)?;
        let spawn = map.cell_origin(map.player_spawn());
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.time_ms = 0.0;
        self.time_ticks = 0;
        self.level_id = level_id;
        self.phase = GamePhase::Playing;
        self.player = Player::new(spawn, &self.settings);
        self.map = map;
        self.next_id = 1;
        self.populate();
        log::info!("Level {level_id} reset");
        Ok(())
    }

    /// Restart the current level
    pub fn restart(&mut self) -> Result<(), LevelError> {
        self.reset(self.level_id)
    }

    /// Move on from a won level
    ///
    /// Loads the next level keeping the player's health and weapons, or
    /// enters `Completed` after the last one. Does nothing outside `Won`.
    pub fn advance_level(&mut self) -> Result<GamePhase, LevelError> {
        if self.phase != GamePhase::Won {
            return Ok(self.phase);
        }
        if self.campaign.is_last(self.level_id) {
            self.phase = GamePhase::Completed;
            log::info!("Campaign completed");
            return Ok(self.phase);
        }

        let next = self.level_id + 1;
        let map = TileMap::from_grid(self.campaign.level(next)?, self.settings.cell_size)?;
        self.player.pos = map.cell_origin(map.player_spawn());
        self.player.projectiles.clear();
        self.player.action = ActionState::Idle;
        self.map = map;
        self.level_id = next;
        self.phase = GamePhase::Playing;
        self.populate();
        log::info!("Advanced to level {next}");
        Ok(self.phase)
    }

    /// Instantiate walls, pickups, enemies and decals from the tile map
    fn populate(&mut self) {
        self.walls.clear();
        self.pickups.clear();
        self.enemies.clear();
        self.decals.clear();

        let pickup_size = Vec2::splat(self.settings.pickup_size);
        let tiles: Vec<_> = self.map.tiles().collect();
        for tile in tiles {
            let origin = self.map.cell_origin(tile.cell);
            let pickup = |kind| Pickup {
                cell: tile.cell,
                rect: Rect::from_pos_size(origin, pickup_size),
                kind,
            };
            match tile.code {
                CellCode::Empty | CellCode::PlayerSpawn => {}
                CellCode::Wall => self.walls.push(Wall {
                    cell: tile.cell,
                    rect: self.map.cell_rect(tile.cell),
                    kind: WallKind::Unbreakable,
                }),
                CellCode::BreakableWall => self.walls.push(Wall {
                    cell: tile.cell,
                    rect: self.map.cell_rect(tile.cell),
                    kind: WallKind::Breakable {
                        health: self.settings.breakable_wall_health,
                    },
                }),
                CellCode::AmmoPickup(weapon) => self.pickups.push(pickup(PickupKind::Ammo(weapon))),
                CellCode::HealthPickup => self.pickups.push(pickup(PickupKind::Health)),
                CellCode::WeaponPickup(weapon) => {
                    self.pickups.push(pickup(PickupKind::Weapon(weapon)))
                }
                CellCode::EnemySpawn => {
                    let id = self.next_entity_id();
                    self.enemies.push(Enemy::new(id, origin, self.time_ms, &self.settings));
                }
                CellCode::Corpse => self.decals.push(Decal {
                    pos: origin,
                    kind: DecalKind::Corpse,
                }),
                CellCode::Blood => self.decals.push(Decal {
                    pos: origin,
                    kind: DecalKind::Blood,
                }),
            }
        }
    }

    /// Obstacle rectangles for movement, vision and projectiles
    pub fn wall_rects(&self) -> Vec<Rect> {
        self.walls.iter().map(|w| w.rect).collect()
    }

    pub fn enemy_rects(&self) -> Vec<Rect> {
        self.enemies.iter().map(Enemy::rect).collect()
    }

    pub fn live_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_alive()).count()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            level_id: self.level_id,
            phase: self.phase,
            time_ms: self.time_ms,
            world: self.map.world_bounds(),
            player: PlayerView::from(&self.player),
            enemies: self.enemies.iter().map(EnemyView::from).collect(),
            projectiles: self.player.projectiles.iter().map(ProjectileView::from).collect(),
            walls: self.walls.clone(),
            pickups: self.pickups.clone(),
            decals: self.decals.clone(),
        }
    }
}
