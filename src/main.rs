//! Maze Escape entry point
//!
//! Headless driver: loads settings and the campaign, then plays it with a
//! simple autopilot through the fixed-step loop, logging game events.

use std::env;
use std::error::Error;
use std::process::ExitCode;

use glam::Vec2;

use maze_escape::consts::*;
use maze_escape::sim::{
    Facing, FixedStepper, GameEvent, GamePhase, GameState, MoveIntent, TickInput, WeaponKind, tick,
};
use maze_escape::{Campaign, Settings};

/// Optional overrides, read the same way as the settings path
const SEED_ENV: &str = "MAZE_ESCAPE_SEED";
const LEVELS_ENV: &str = "MAZE_ESCAPE_LEVELS";

/// Simulated play time before the driver gives up on a level
const LEVEL_TIME_LIMIT_MS: f64 = 180_000.0;
/// Restarts allowed after losing
const MAX_RESTARTS: u32 = 3;

fn seed_override() -> Option<u64> {
    env::var(SEED_ENV).ok().and_then(|v| v.parse().ok())
}

fn load_campaign() -> Result<Campaign, Box<dyn Error>> {
    match env::var(LEVELS_ENV) {
        Ok(dir) if !dir.is_empty() => Ok(Campaign::load_dir(dir, MAX_LEVEL)?),
        _ => Ok(Campaign::default()),
    }
}

/// Scripted player, in the spirit of an attract-mode demo
///
/// Lines up with the nearest enemy on one axis, turns toward it and fires.
#[derive(Default)]
struct Autopilot;

impl Autopilot {
    fn input(&self, state: &GameState) -> TickInput {
        let player = &state.player;
        let mut input = TickInput::default();

        // Prefer the heaviest owned weapon that still has rounds
        let best = [WeaponKind::Shotgun, WeaponKind::Rifle, WeaponKind::Handgun]
            .into_iter()
            .find(|&k| {
                let w = player.arsenal.weapon(k);
                player.arsenal.owns(k) && w.loaded_ammo() + w.reserve_ammo() > 0
            });
        if let Some(kind) = best.filter(|&k| k != player.arsenal.equipped()) {
            input.switch_weapon = Some(kind);
            return input;
        }

        let weapon = player.arsenal.current();
        if weapon.loaded_ammo() == 0 && weapon.reserve_ammo() > 0 {
            input.reload = true;
            return input;
        }

        let me = player.center();
        let Some(target) = state
            .enemies
            .iter()
            .map(|e| e.rect().center())
            .min_by(|a, b| a.distance(me).total_cmp(&b.distance(me)))
        else {
            return input;
        };

        let d = target - me;
        let tolerance = state.settings.enemy_size * 0.4;
        let facing = if d.y.abs() < tolerance {
            Some(if d.x > 0.0 { Facing::Right } else { Facing::Left })
        } else if d.x.abs() < tolerance {
            Some(if d.y > 0.0 { Facing::Down } else { Facing::Up })
        } else {
            None
        };

        match facing {
            Some(facing) if facing != player.facing => input.movement = MoveIntent::toward(facing),
            Some(_) => input.fire = true,
            // Close the smaller gap first so a firing line opens up
            None => input.movement = MoveIntent::toward(step_toward(d)),
        }
        input
    }
}

fn step_toward(d: Vec2) -> Facing {
    if d.x.abs() < d.y.abs() {
        if d.x > 0.0 { Facing::Right } else { Facing::Left }
    } else if d.y > 0.0 {
        Facing::Down
    } else {
        Facing::Up
    }
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::WeaponAcquired { weapon } => log::info!("Picked up {}", weapon.as_str()),
        GameEvent::EnemyKilled { enemy } => log::info!("Enemy {enemy} down"),
        GameEvent::PlayerHit { health, .. } => log::info!("Player hit, health {health}"),
        GameEvent::PlayerDied => log::warn!("Player died"),
        GameEvent::LevelWon { level } => log::info!("Level {level} won"),
        other => log::debug!("{other:?}"),
    }
}

fn run() -> Result<GamePhase, Box<dyn Error>> {
    let mut settings = Settings::load_from_env()?;
    if let Some(seed) = seed_override() {
        settings.seed = seed;
    }
    let dt = settings.sim_dt();
    let campaign = load_campaign()?;
    log::info!(
        "Starting campaign of {} levels (seed {})",
        campaign.len(),
        settings.seed
    );

    let mut state = GameState::new(settings, campaign, 1)?;
    let mut stepper = FixedStepper::new(dt, MAX_SUBSTEPS);
    let autopilot = Autopilot;
    let mut restarts = 0;
    let mut level_started_ms = 0.0;
    let mut frame = 0u64;

    loop {
        match state.phase {
            GamePhase::Playing => {}
            GamePhase::Won => {
                state.advance_level()?;
                level_started_ms = state.time_ms;
                continue;
            }
            GamePhase::Lost if restarts < MAX_RESTARTS => {
                restarts += 1;
                log::info!("Restarting level {} ({restarts}/{MAX_RESTARTS})", state.level_id);
                state.restart()?;
                stepper.reset();
                level_started_ms = state.time_ms;
                continue;
            }
            GamePhase::Lost | GamePhase::Completed => break,
        }

        if state.time_ms - level_started_ms > LEVEL_TIME_LIMIT_MS {
            log::warn!("Autopilot stuck on level {}, giving up", state.level_id);
            break;
        }

        // Uneven frame pacing to exercise the accumulator
        let frame_time = if frame % 3 == 0 { SIM_DT * 1.5 } else { SIM_DT };
        frame += 1;

        for _ in 0..stepper.advance(frame_time) {
            let input = autopilot.input(&state);
            for event in tick(&mut state, &input, stepper.dt()) {
                log_event(&event);
            }
            if state.phase != GamePhase::Playing {
                break;
            }
        }
    }

    let snapshot = state.snapshot();
    log::info!(
        "Finished on level {} in phase {:?} after {:.1}s simulated, health {}",
        snapshot.level_id,
        snapshot.phase,
        snapshot.time_ms / 1000.0,
        snapshot.player.health
    );
    Ok(state.phase)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Maze Escape (headless) starting...");

    match run() {
        Ok(GamePhase::Completed) => ExitCode::SUCCESS,
        Ok(phase) => {
            log::warn!("Campaign not completed ({phase:?})");
            ExitCode::from(2)
        }
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
