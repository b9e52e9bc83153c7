//! Fixed timestep simulation tick
//!
//! One call advances the game by a single frame. Order inside the playing
//! branch matters: collision checks run in sequence and earlier removals
//! stand, so a frame's tie-breaks are deterministic.

use super::formation;
use super::state::{Bullet, COLOR_EXPLOSION, GameOutcome, GamePhase, GameState};
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held: move left
    pub left: bool,
    /// Held: move right
    pub right: bool,
    /// Edge: fire one player bullet (one per physical key press)
    pub fire: bool,
    /// Edge: start a run from the title screen
    pub start: bool,
    /// Edge: leave the game-over screen for the title screen
    pub restart: bool,
    /// Edge: toggle pause
    pub pause: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    match state.phase {
        GamePhase::Start => {
            if input.start {
                log::info!("run started (seed {})", state.seed);
                state.start_run();
            }
            return;
        }
        GamePhase::GameOver => {
            if input.restart {
                state.phase = GamePhase::Start;
            }
            return;
        }
        GamePhase::Paused => {
            if input.pause {
                state.phase = GamePhase::Playing;
            }
            return;
        }
        GamePhase::Playing => {
            if input.pause {
                state.phase = GamePhase::Paused;
                return;
            }
        }
    }

    state.tick_count += 1;

    // Deferred wave spawn, driven by the sim clock rather than wall time.
    // Fires before the frame body so a wave armed on tick N appears on
    // tick N + WAVE_DELAY_TICKS exactly.
    if state.wave_delay_ticks > 0 {
        state.wave_delay_ticks -= 1;
        if state.wave_delay_ticks == 0 {
            formation::spawn_wave(state);
        }
    }

    // 1. Player movement + invulnerability countdown
    state.player.advance(input.left, input.right);

    // 2. Fire edge
    if input.fire {
        state.bullets.push(Bullet::player_shot(&state.player));
    }

    // 3. Player bullets: move, cull off the top
    for bullet in &mut state.bullets {
        bullet.advance();
    }
    state.bullets.retain(|b| !b.off_top());

    // 4. Enemy bullets: move, cull off the bottom, test against the player
    if advance_enemy_bullets(state) {
        return; // out of lives mid-pass; the rest of the frame is dropped
    }

    // 5. Enemies: move, defense line, ramming
    if advance_enemies(state) {
        return;
    }

    // 6. Player fire vs the wave, including level advance
    if resolve_bullet_hits(state) {
        return;
    }

    // 7. Explosions
    for explosion in &mut state.explosions {
        explosion.advance();
    }
    state.explosions.retain(|e| !e.is_dead());
}

/// Enemy fire for one frame. Returns true when the run ended.
///
/// A bullet that hits the player is consumed even while the invulnerability
/// window absorbs the damage.
fn advance_enemy_bullets(state: &mut GameState) -> bool {
    let mut i = 0;
    while i < state.enemy_bullets.len() {
        state.enemy_bullets[i].advance();

        if state.enemy_bullets[i].off_bottom() {
            state.enemy_bullets.remove(i);
            continue;
        }

        if state.enemy_bullets[i].bounds().overlaps(&state.player.bounds()) {
            state.enemy_bullets.remove(i);
            if state.damage_player() && state.lives == 0 {
                state.end_run(GameOutcome::Defeat);
                return true;
            }
            continue;
        }

        i += 1;
    }
    false
}

/// Enemy movement, the defense line, and ramming for one frame.
/// Returns true when the run ended.
fn advance_enemies(state: &mut GameState) -> bool {
    let mut i = 0;
    while i < state.enemies.len() {
        let wants_shot = {
            let GameState { enemies, rng, .. } = state;
            enemies[i].advance(rng)
        };

        // The cap silently drops the shot; the shooter's cooldown stays armed
        if wants_shot && state.enemy_bullets.len() < MAX_ENEMY_BULLETS {
            let muzzle = state.enemies[i].muzzle();
            state.enemy_bullets.push(Bullet::enemy_shot(muzzle));
        }

        // Crossing the defense line loses the run outright, whatever the
        // life count
        if state.enemies[i].reached_bottom() {
            state.end_run(GameOutcome::Defeat);
            return true;
        }

        // Ramming removes the enemy only when damage actually lands
        if state.enemies[i].bounds().overlaps(&state.player.bounds()) && state.damage_player() {
            let center = state.enemies[i].center();
            state.enemies.remove(i);
            state.spawn_explosion(center, COLOR_EXPLOSION);
            if state.lives == 0 {
                state.end_run(GameOutcome::Defeat);
                return true;
            }
            // A ram can clear the wave too
            if state.enemies.is_empty() && state.advance_level() {
                return true;
            }
            continue;
        }

        i += 1;
    }
    false
}

/// Player fire vs the wave, pairwise in collection order with deferred
/// removal: a bullet is consumed by the first enemy it overlaps, and both
/// leave their collections before later pairs are tested.
/// Returns true when the run ended (victory).
fn resolve_bullet_hits(state: &mut GameState) -> bool {
    let mut b = 0;
    while b < state.bullets.len() {
        let mut hit = false;

        let mut e = 0;
        while e < state.enemies.len() {
            if state.bullets[b].bounds().overlaps(&state.enemies[e].bounds()) {
                let center = state.enemies[e].center();
                state.bullets.remove(b);
                state.enemies.remove(e);
                state.score += SCORE_PER_KILL * state.level as u64;
                state.spawn_explosion(center, COLOR_EXPLOSION);
                hit = true;

                if state.enemies.is_empty() && state.advance_level() {
                    return true;
                }
                break;
            }
            e += 1;
        }

        if !hit {
            b += 1;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Enemy, EnemyKind, GameOutcome, LevelSpec, LEVELS};
    use glam::Vec2;

    fn started() -> GameState {
        let mut state = GameState::new(12345);
        tick(&mut state, &TickInput { start: true, ..Default::default() });
        state
    }

    fn playing_input() -> TickInput {
        TickInput::default()
    }

    /// An enemy parked somewhere harmless, away from edges and the player
    fn parked_enemy(x: f32, y: f32, level: u32) -> Enemy {
        let spec = LevelSpec::for_level(level).unwrap();
        let mut enemy = Enemy::new(Vec2::new(x, y), spec.enemy_kind, spec);
        enemy.speed = 0.0;
        enemy
    }

    #[test]
    fn test_start_command_begins_a_run() {
        let mut state = GameState::new(1);
        assert_eq!(state.phase, GamePhase::Start);

        // No command, no transition
        tick(&mut state, &playing_input());
        assert_eq!(state.phase, GamePhase::Start);

        tick(&mut state, &TickInput { start: true, ..Default::default() });
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.lives, 3);
        assert_eq!(state.level, 1);
        assert_eq!(state.score, 0);
        // Wave one: grid of 12 basics
        assert_eq!(state.enemies.len(), 12);
        assert!(state.enemies.iter().all(|e| e.kind == EnemyKind::Basic));
    }

    #[test]
    fn test_restart_returns_to_title() {
        let mut state = started();
        state.end_run(GameOutcome::Defeat);

        tick(&mut state, &TickInput { restart: true, ..Default::default() });
        assert_eq!(state.phase, GamePhase::Start);

        // A new start command resets the run
        tick(&mut state, &TickInput { start: true, ..Default::default() });
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.outcome.is_none());
    }

    #[test]
    fn test_pause_freezes_the_simulation() {
        let mut state = started();
        let ticks_before = state.tick_count;

        tick(&mut state, &TickInput { pause: true, ..Default::default() });
        assert_eq!(state.phase, GamePhase::Paused);

        // Movement and fire are ignored while frozen
        let x_before = state.player.pos.x;
        tick(&mut state, &TickInput { right: true, fire: true, ..Default::default() });
        assert_eq!(state.player.pos.x, x_before);
        assert!(state.bullets.is_empty());
        assert_eq!(state.tick_count, ticks_before);

        tick(&mut state, &TickInput { pause: true, ..Default::default() });
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_fire_edge_spawns_one_bullet() {
        let mut state = started();
        state.enemies.clear();
        state.wave_delay_ticks = 0;

        tick(&mut state, &TickInput { fire: true, ..Default::default() });
        assert_eq!(state.bullets.len(), 1);

        // Held key without a new edge adds nothing
        tick(&mut state, &playing_input());
        assert_eq!(state.bullets.len(), 1);
    }

    #[test]
    fn test_player_bullet_culled_off_top() {
        let mut state = started();
        state.enemies.clear();
        state.wave_delay_ticks = 0;
        state.bullets.push(Bullet::player_shot(&state.player));
        state.bullets[0].pos.y = 0.0;

        // 8 px/tick upward; gone once fully above the field
        for _ in 0..3 {
            tick(&mut state, &playing_input());
        }
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn test_enemy_bullet_hit_decrements_lives_and_arms_window() {
        let mut state = started();
        state.enemies.clear();
        state.wave_delay_ticks = 0;

        // Place a shot right above the craft so the next advance lands it
        let mut shot = Bullet::enemy_shot(state.player.center());
        shot.pos = state.player.pos + Vec2::new(5.0, -2.0);
        state.enemy_bullets.push(shot);

        tick(&mut state, &playing_input());

        assert!(state.enemy_bullets.is_empty());
        assert_eq!(state.lives, 2);
        // The countdown starts next tick; this one armed the full window
        assert_eq!(state.player.invulnerable, INVULN_TICKS);
        assert_eq!(state.explosions.len(), 1);
    }

    #[test]
    fn test_invulnerable_player_absorbs_hit_but_bullet_is_spent() {
        let mut state = started();
        state.enemies.clear();
        state.wave_delay_ticks = 0;
        state.player.invulnerable = 60;

        let mut shot = Bullet::enemy_shot(state.player.center());
        shot.pos = state.player.pos + Vec2::new(5.0, -2.0);
        state.enemy_bullets.push(shot);

        tick(&mut state, &playing_input());

        assert!(state.enemy_bullets.is_empty());
        assert_eq!(state.lives, 3);
        assert!(state.explosions.is_empty());
    }

    #[test]
    fn test_last_life_lost_ends_the_run() {
        let mut state = started();
        state.enemies.clear();
        state.wave_delay_ticks = 0;
        state.lives = 1;

        let mut shot = Bullet::enemy_shot(state.player.center());
        shot.pos = state.player.pos + Vec2::new(5.0, -2.0);
        state.enemy_bullets.push(shot);

        tick(&mut state, &playing_input());

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.outcome, Some(GameOutcome::Defeat));
        assert_eq!(state.lives, 0);
    }

    #[test]
    fn test_enemy_past_defense_line_is_instant_defeat() {
        let mut state = started();
        state.enemies.clear();
        state.wave_delay_ticks = 0;

        let mut enemy = parked_enemy(400.0, 0.0, 1);
        enemy.pos.y = FIELD_HEIGHT - BOTTOM_DEFEAT_MARGIN - ENEMY_HEIGHT + 1.0;
        state.enemies.push(enemy);

        tick(&mut state, &playing_input());

        // Full life count, lost anyway
        assert_eq!(state.lives, 3);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.outcome, Some(GameOutcome::Defeat));
    }

    #[test]
    fn test_ramming_enemy_removed_only_when_damage_lands() {
        let mut state = started();
        state.enemies.clear();
        state.wave_delay_ticks = 0;

        // Overlap the craft's top band without crossing the defense line
        let mut enemy = parked_enemy(0.0, 0.0, 1);
        enemy.pos = state.player.pos + Vec2::new(2.0, -20.0);
        state.enemies.push(enemy.clone());

        tick(&mut state, &playing_input());
        assert!(state.enemies.is_empty());
        assert_eq!(state.lives, 2);
        // Two bursts: one at the craft, one at the rammer
        assert_eq!(state.explosions.len(), 2);

        // While invulnerable the rammer survives contact
        state.enemies.push(enemy);
        let count_before = state.enemies.len();
        tick(&mut state, &playing_input());
        assert_eq!(state.enemies.len(), count_before);
        assert_eq!(state.lives, 2);
    }

    #[test]
    fn test_bullet_kill_scores_by_level() {
        let mut state = started();
        state.enemies.clear();
        state.wave_delay_ticks = 0;
        state.enemies.push(parked_enemy(400.0, 300.0, 1));
        state.enemies.push(parked_enemy(100.0, 300.0, 1));

        let mut bullet = Bullet::player_shot(&state.player);
        bullet.pos = Vec2::new(405.0, 310.0);
        state.bullets.push(bullet);

        tick(&mut state, &playing_input());

        assert_eq!(state.enemies.len(), 1);
        assert!(state.bullets.is_empty());
        assert_eq!(state.score, SCORE_PER_KILL); // 10 * level 1
        assert_eq!(state.explosions.len(), 1);
    }

    #[test]
    fn test_one_bullet_consumes_at_most_one_enemy() {
        let mut state = started();
        state.enemies.clear();
        state.wave_delay_ticks = 0;

        // Two enemies stacked on the same spot
        state.enemies.push(parked_enemy(400.0, 300.0, 1));
        state.enemies.push(parked_enemy(400.0, 300.0, 1));

        let mut bullet = Bullet::player_shot(&state.player);
        bullet.pos = Vec2::new(405.0, 310.0);
        state.bullets.push(bullet);

        tick(&mut state, &playing_input());

        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.score, SCORE_PER_KILL);
    }

    #[test]
    fn test_wave_clear_advances_level_after_delay() {
        let mut state = started();
        state.enemies.clear();
        state.wave_delay_ticks = 0;
        state.enemies.push(parked_enemy(400.0, 300.0, 1));

        let mut bullet = Bullet::player_shot(&state.player);
        bullet.pos = Vec2::new(405.0, 310.0);
        state.bullets.push(bullet);

        tick(&mut state, &playing_input());
        assert_eq!(state.level, 2);
        assert!(state.enemies.is_empty());
        assert_eq!(state.wave_delay_ticks, WAVE_DELAY_TICKS);

        // The field stays empty until the delay runs out...
        for _ in 0..WAVE_DELAY_TICKS - 1 {
            tick(&mut state, &playing_input());
            assert!(state.enemies.is_empty());
        }

        // ...then the level-2 wave appears: 18 fast enemies in a V
        tick(&mut state, &playing_input());
        assert_eq!(state.enemies.len(), 18);
        assert!(state.enemies.iter().all(|e| e.kind == EnemyKind::Fast));
        assert!(state.enemies.iter().all(|e| e.speed == 1.5));
    }

    #[test]
    fn test_clearing_final_level_is_victory() {
        let mut state = started();
        state.enemies.clear();
        state.wave_delay_ticks = 0;
        state.level = LEVELS.len() as u32;
        state.enemies.push(parked_enemy(400.0, 300.0, 3));

        let mut bullet = Bullet::player_shot(&state.player);
        bullet.pos = Vec2::new(405.0, 310.0);
        state.bullets.push(bullet);

        tick(&mut state, &playing_input());

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.outcome, Some(GameOutcome::Victory));
        assert_eq!(state.score, SCORE_PER_KILL * 3);
    }

    #[test]
    fn test_enemy_bullets_never_exceed_cap() {
        let mut state = started();
        state.enemies.clear();
        state.wave_delay_ticks = 0;
        state.level = 3;

        // A rank of shooters parked mid-field
        for i in 0..8 {
            state.enemies.push(parked_enemy(100.0 + i as f32 * 60.0, 200.0, 3));
        }

        for _ in 0..2000 {
            tick(&mut state, &playing_input());
            assert!(state.enemy_bullets.len() <= MAX_ENEMY_BULLETS);
            if state.phase != GamePhase::Playing {
                break;
            }
        }
    }

    #[test]
    fn test_lives_never_increase_during_play() {
        let mut state = started();
        let mut last_lives = state.lives;

        for _ in 0..1500 {
            tick(&mut state, &playing_input());
            assert!(state.lives <= last_lives);
            last_lives = state.lives;
            if state.phase != GamePhase::Playing {
                break;
            }
        }
    }

    #[test]
    fn test_enemies_stay_inside_the_field() {
        let mut state = started();

        for _ in 0..1200 {
            tick(&mut state, &playing_input());
            for enemy in &state.enemies {
                assert!(enemy.pos.x >= 0.0);
                assert!(enemy.pos.x <= FIELD_WIDTH - ENEMY_WIDTH);
            }
            if state.phase != GamePhase::Playing {
                break;
            }
        }
    }

    #[test]
    fn test_explosions_culled_after_lifetime() {
        let mut state = started();
        state.enemies.clear();
        state.wave_delay_ticks = 0;
        state.spawn_explosion(Vec2::new(100.0, 100.0), COLOR_EXPLOSION);

        for _ in 0..EXPLOSION_LIFETIME - 1 {
            tick(&mut state, &playing_input());
            assert_eq!(state.explosions.len(), 1);
        }
        tick(&mut state, &playing_input());
        assert!(state.explosions.is_empty());
    }

    #[test]
    fn test_determinism_same_seed_same_run() {
        let script = |state: &mut GameState| {
            tick(state, &TickInput { start: true, ..Default::default() });
            for i in 0..600u32 {
                let input = TickInput {
                    left: i % 40 < 20,
                    right: i % 40 >= 20,
                    fire: i % 15 == 0,
                    ..Default::default()
                };
                tick(state, &input);
            }
        };

        let mut a = GameState::new(99999);
        let mut b = GameState::new(99999);
        script(&mut a);
        script(&mut b);

        assert_eq!(a.tick_count, b.tick_count);
        assert_eq!(a.score, b.score);
        assert_eq!(a.lives, b.lives);
        assert_eq!(a.enemies.len(), b.enemies.len());
        assert_eq!(a.player.pos, b.player.pos);
        for (ea, eb) in a.enemies.iter().zip(&b.enemies) {
            assert_eq!(ea.pos, eb.pos);
            assert_eq!(ea.dir, eb.dir);
        }
    }
}
