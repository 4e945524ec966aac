//! Weapon and ammo state machine
//!
//! Each weapon is Idle, Firing (cooldown running) or Reloading. Stats are an
//! immutable template; runtime state (loaded rounds, reserve, timers) is owned
//! by the player's `Arsenal` and rebuilt from the templates on reset.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Weapon identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    Handgun,
    Rifle,
    Shotgun,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 3] = [WeaponKind::Handgun, WeaponKind::Rifle, WeaponKind::Shotgun];

    #[inline]
    fn slot(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeaponKind::Handgun => "handgun",
            WeaponKind::Rifle => "rifle",
            WeaponKind::Shotgun => "shotgun",
        }
    }
}

/// Immutable base stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponStats {
    /// Damage carried by each projectile
    pub damage: i32,
    pub magazine_capacity: u32,
    /// Minimum time between shots
    pub cooldown_ms: f64,
    pub bullets_per_shot: u32,
    /// Full width of the fan; each pellet deviates by at most half of it
    pub spread_degrees: f32,
    pub reload_ms: f64,
    /// Reserve rounds a fresh weapon starts with
    pub starting_reserve: u32,
}

/// Stat templates for every weapon kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponTemplates {
    pub handgun: WeaponStats,
    pub rifle: WeaponStats,
    pub shotgun: WeaponStats,
}

impl Default for WeaponTemplates {
    fn default() -> Self {
        Self {
            handgun: WeaponStats {
                damage: 20,
                magazine_capacity: 6,
                cooldown_ms: 0.0,
                bullets_per_shot: 1,
                spread_degrees: 0.0,
                reload_ms: 1000.0,
                starting_reserve: 15,
            },
            rifle: WeaponStats {
                damage: 50,
                magazine_capacity: 20,
                cooldown_ms: 100.0,
                bullets_per_shot: 1,
                spread_degrees: 0.0,
                reload_ms: 1500.0,
                starting_reserve: 40,
            },
            shotgun: WeaponStats {
                damage: 40,
                magazine_capacity: 2,
                cooldown_ms: 1000.0,
                bullets_per_shot: 5,
                spread_degrees: 24.0,
                reload_ms: 1200.0,
                starting_reserve: 10,
            },
        }
    }
}

impl WeaponTemplates {
    pub fn get(&self, kind: WeaponKind) -> &WeaponStats {
        match kind {
            WeaponKind::Handgun => &self.handgun,
            WeaponKind::Rifle => &self.rifle,
            WeaponKind::Shotgun => &self.shotgun,
        }
    }
}

/// Runtime phase of a weapon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WeaponState {
    Idle,
    /// A shot went out and the cooldown is still running
    Firing,
    /// Rounds move from reserve to magazine at `ready_at_ms`
    Reloading { ready_at_ms: f64 },
}

/// Result of a fire request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// One round consumed; spawn the volley
    Fired,
    /// Magazine empty; emit the click cue
    Empty,
    /// Rate limited (cooldown or click interval)
    CoolingDown,
    /// Reload in progress
    Reloading,
}

/// Result of a reload request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReloadOutcome {
    Started { ready_at_ms: f64 },
    /// Magazine full, no reserve, or already reloading
    Ignored,
}

/// One weapon: stats plus runtime state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub stats: WeaponStats,
    reserve_ammo: u32,
    loaded_ammo: u32,
    last_fire_ms: Option<f64>,
    last_click_ms: Option<f64>,
    state: WeaponState,
}

impl Weapon {
    /// Fresh weapon with a full magazine and the template's reserve
    pub fn new(stats: WeaponStats) -> Self {
        Self {
            stats,
            reserve_ammo: stats.starting_reserve,
            loaded_ammo: stats.magazine_capacity,
            last_fire_ms: None,
            last_click_ms: None,
            state: WeaponState::Idle,
        }
    }

    /// Weapon with explicit ammo counts (loaded is clamped to the magazine)
    pub fn with_ammo(stats: WeaponStats, loaded: u32, reserve: u32) -> Self {
        Self {
            loaded_ammo: loaded.min(stats.magazine_capacity),
            reserve_ammo: reserve,
            ..Self::new(stats)
        }
    }

    pub fn loaded_ammo(&self) -> u32 {
        self.loaded_ammo
    }

    pub fn reserve_ammo(&self) -> u32 {
        self.reserve_ammo
    }

    pub fn state(&self) -> WeaponState {
        self.state
    }

    pub fn is_reloading(&self) -> bool {
        matches!(self.state, WeaponState::Reloading { .. })
    }

    fn cooled_down(last: Option<f64>, now_ms: f64, cooldown_ms: f64) -> bool {
        last.is_none_or(|t| now_ms - t >= cooldown_ms)
    }

    /// Try to fire at `now_ms`
    pub fn try_fire(&mut self, now_ms: f64) -> FireOutcome {
        if self.is_reloading() {
            return FireOutcome::Reloading;
        }

        if self.loaded_ammo == 0 {
            let cooldown = self.stats.cooldown_ms;
            if !Self::cooled_down(self.last_fire_ms, now_ms, cooldown)
                || !Self::cooled_down(self.last_click_ms, now_ms, cooldown)
            {
                return FireOutcome::CoolingDown;
            }
            self.last_click_ms = Some(now_ms);
            return FireOutcome::Empty;
        }

        if !Self::cooled_down(self.last_fire_ms, now_ms, self.stats.cooldown_ms) {
            return FireOutcome::CoolingDown;
        }

        self.loaded_ammo -= 1;
        self.last_fire_ms = Some(now_ms);
        self.state = WeaponState::Firing;
        FireOutcome::Fired
    }

    /// Begin a reload if there is room in the magazine and rounds in reserve
    pub fn start_reload(&mut self, now_ms: f64) -> ReloadOutcome {
        if self.is_reloading()
            || self.loaded_ammo >= self.stats.magazine_capacity
            || self.reserve_ammo == 0
        {
            return ReloadOutcome::Ignored;
        }
        let ready_at_ms = now_ms + self.stats.reload_ms;
        self.state = WeaponState::Reloading { ready_at_ms };
        ReloadOutcome::Started { ready_at_ms }
    }

    /// Advance timers; returns the rounds moved if a reload just completed
    pub fn update(&mut self, now_ms: f64) -> Option<u32> {
        match self.state {
            WeaponState::Reloading { ready_at_ms } if now_ms >= ready_at_ms => {
                let room = self.stats.magazine_capacity - self.loaded_ammo;
                let moved = room.min(self.reserve_ammo);
                self.reserve_ammo -= moved;
                self.loaded_ammo += moved;
                self.state = WeaponState::Idle;
                debug_assert!(self.loaded_ammo <= self.stats.magazine_capacity);
                Some(moved)
            }
            WeaponState::Firing
                if Self::cooled_down(self.last_fire_ms, now_ms, self.stats.cooldown_ms) =>
            {
                self.state = WeaponState::Idle;
                None
            }
            _ => None,
        }
    }

    /// Ammo pickups are uncapped
    pub fn add_reserve(&mut self, rounds: u32) {
        self.reserve_ammo = self.reserve_ammo.saturating_add(rounds);
    }
}

/// The player's weapons and the equipped selector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arsenal {
    /// Indexed by `WeaponKind` discriminant
    weapons: [Weapon; 3],
    owned: BTreeSet<WeaponKind>,
    equipped: WeaponKind,
}

impl Arsenal {
    /// Fresh arsenal: every weapon built from its template, only the handgun owned
    pub fn new(templates: &WeaponTemplates) -> Self {
        let weapons = WeaponKind::ALL.map(|kind| Weapon::new(*templates.get(kind)));
        Self {
            weapons,
            owned: BTreeSet::from([WeaponKind::Handgun]),
            equipped: WeaponKind::Handgun,
        }
    }

    pub fn equipped(&self) -> WeaponKind {
        self.equipped
    }

    pub fn owns(&self, kind: WeaponKind) -> bool {
        self.owned.contains(&kind)
    }

    pub fn weapon(&self, kind: WeaponKind) -> &Weapon {
        &self.weapons[kind.slot()]
    }

    pub fn weapon_mut(&mut self, kind: WeaponKind) -> &mut Weapon {
        &mut self.weapons[kind.slot()]
    }

    pub fn current(&self) -> &Weapon {
        self.weapon(self.equipped)
    }

    pub fn current_mut(&mut self) -> &mut Weapon {
        self.weapon_mut(self.equipped)
    }

    /// Switch the selector; runtime state of every weapon is untouched
    pub fn equip(&mut self, kind: WeaponKind) -> Result<(), SimError> {
        if !self.owns(kind) {
            return Err(SimError::WeaponNotOwned(kind));
        }
        self.equipped = kind;
        Ok(())
    }

    /// Take ownership of a weapon; returns false if it was already owned
    pub fn acquire(&mut self, kind: WeaponKind) -> bool {
        self.owned.insert(kind)
    }

    /// Add reserve rounds, owned or not
    pub fn add_ammo(&mut self, kind: WeaponKind, rounds: u32) {
        self.weapon_mut(kind).add_reserve(rounds);
    }

    /// Advance every weapon's timers, including reloads of unequipped weapons
    pub fn update(&mut self, now_ms: f64) -> Vec<(WeaponKind, u32)> {
        WeaponKind::ALL
            .into_iter()
            .zip(self.weapons.iter_mut())
            .filter_map(|(kind, weapon)| weapon.update(now_ms).map(|moved| (kind, moved)))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (WeaponKind, &Weapon)> {
        WeaponKind::ALL.into_iter().zip(self.weapons.iter())
    }
}
