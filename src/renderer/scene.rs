//! Frame assembly: turn the simulation state into a vertex list
//!
//! Strictly read-only over [`GameState`]. Draw-time flourishes that mirror
//! gameplay state (invulnerability flashing, shooter charge glow) live here.

use glam::Vec2;

use super::shapes::{self, with_alpha};
use super::vertex::{Vertex, colors};
use crate::consts::*;
use crate::settings::Settings;
use crate::sim::state::{Bullet, Enemy, EnemyKind, Explosion, Player};
use crate::sim::{GamePhase, GameState};

/// Build the full frame. `time_secs` only drives scenery scroll.
pub fn build_scene(state: &GameState, settings: &Settings, time_secs: f64) -> Vec<Vertex> {
    let mut out = Vec::with_capacity(1024);

    // Night-sky gradient backdrop
    out.extend(shapes::rect_gradient(
        Vec2::ZERO,
        Vec2::new(FIELD_WIDTH, FIELD_HEIGHT),
        colors::SKY_TOP,
        colors::SKY_BOTTOM,
    ));

    if settings.starfield {
        starfield(&mut out, settings.quality.star_count(), time_secs);
    }

    // Entities only exist on screen mid-run
    if matches!(state.phase, GamePhase::Playing | GamePhase::Paused) {
        player(&mut out, &state.player);

        for bullet in state.bullets.iter().chain(&state.enemy_bullets) {
            bullet_with_trail(&mut out, bullet, settings);
        }

        for e in &state.enemies {
            enemy(&mut out, e);
        }

        if settings.particles {
            for e in &state.explosions {
                explosion(&mut out, e);
            }
        }
    }

    out
}

/// Slow-scrolling pseudo-random star pattern
fn starfield(out: &mut Vec<Vertex>, count: usize, time_secs: f64) {
    for i in 0..count {
        let i = i as f64;
        let x = (i * 137.5) % FIELD_WIDTH as f64;
        let y = (i * 234.7 + time_secs * 10.0) % FIELD_HEIGHT as f64;
        let size = (i as usize % 3 + 1) as f32;
        out.extend(shapes::rect(
            Vec2::new(x as f32, y as f32),
            Vec2::splat(size),
            colors::STAR,
        ));
    }
}

fn player(out: &mut Vec<Vertex>, player: &Player) {
    // Invulnerability flash: 5-tick on/off cadence at half alpha
    let alpha = if player.invulnerable > 0 && (player.invulnerable / 5) % 2 == 1 {
        0.5
    } else {
        1.0
    };
    let hull = with_alpha(crate::sim::state::COLOR_PLAYER, alpha);

    let p = player.pos;
    let (w, h) = (PLAYER_WIDTH, PLAYER_HEIGHT);

    // Nose cone down to the wing line
    out.extend(shapes::triangle(
        Vec2::new(p.x + w / 2.0, p.y),
        Vec2::new(p.x + w * 0.8, p.y + h * 0.7),
        Vec2::new(p.x + w * 0.2, p.y + h * 0.7),
        hull,
    ));
    // Tail section
    out.extend(shapes::rect(
        Vec2::new(p.x + w * 0.4, p.y + h * 0.7),
        Vec2::new(w * 0.2, h * 0.3),
        hull,
    ));
    // Canopy stripe
    out.extend(shapes::rect(
        Vec2::new(p.x + w * 0.45, p.y + h * 0.2),
        Vec2::new(w * 0.1, h * 0.3),
        with_alpha(colors::HULL_DETAIL, alpha),
    ));

    // Thruster flame while a movement key is held
    if player.thrusting {
        let flicker = player.thruster_anim.sin() * 3.0;
        let flame = [1.0, 0.5 + player.thruster_anim.sin() * 0.15, 0.1, alpha];
        out.extend(shapes::triangle(
            Vec2::new(p.x + w * 0.4, p.y + h),
            Vec2::new(p.x + w * 0.6, p.y + h),
            Vec2::new(p.x + w * 0.5, p.y + h + 10.0 + flicker),
            flame,
        ));
    }
}

fn bullet_with_trail(out: &mut Vec<Vertex>, bullet: &Bullet, settings: &Settings) {
    if settings.trails {
        out.extend(shapes::bullet_trail(
            &bullet.trail,
            bullet.color,
            settings.quality.trail_points(),
        ));
    }
    out.extend(shapes::rect(
        bullet.pos,
        Vec2::new(BULLET_WIDTH, BULLET_HEIGHT),
        bullet.color,
    ));
}

fn enemy(out: &mut Vec<Vertex>, enemy: &Enemy) {
    let p = enemy.pos;
    let size = Vec2::new(ENEMY_WIDTH, ENEMY_HEIGHT);

    match enemy.kind {
        EnemyKind::Basic => {
            out.extend(shapes::rect(p, size, enemy.color));
            // Pulsing shell
            let pulse = 0.3 + (enemy.anim * 2.0).sin() * 0.2;
            out.extend(shapes::rect(p, size, with_alpha(enemy.color, pulse)));
        }
        EnemyKind::Fast => {
            out.extend(shapes::triangle(
                Vec2::new(p.x + ENEMY_WIDTH / 2.0, p.y),
                Vec2::new(p.x + ENEMY_WIDTH, p.y + ENEMY_HEIGHT),
                Vec2::new(p.x, p.y + ENEMY_HEIGHT),
                enemy.color,
            ));
            // Exhaust smear under the hull
            out.extend(shapes::rect(
                Vec2::new(p.x + 5.0, p.y + ENEMY_HEIGHT),
                Vec2::new(ENEMY_WIDTH - 10.0, 5.0),
                with_alpha(enemy.color, 0.5),
            ));
        }
        EnemyKind::Shooter => {
            out.extend(shapes::rect(p, size, enemy.color));
            // Gun barrel
            out.extend(shapes::rect(
                Vec2::new(p.x + ENEMY_WIDTH / 2.0 - 2.0, p.y + ENEMY_HEIGHT),
                Vec2::new(4.0, 8.0),
                colors::HULL_DETAIL,
            ));
            // Charge glow in the last moments of the cooldown
            if enemy.shoot_cooldown > 0 && enemy.shoot_cooldown < 10 {
                out.extend(shapes::rect(
                    p - Vec2::splat(2.0),
                    size + Vec2::splat(4.0),
                    colors::SHOOTER_CHARGE,
                ));
            }
        }
    }
}

fn explosion(out: &mut Vec<Vertex>, explosion: &Explosion) {
    for particle in &explosion.particles {
        // Spent fragments linger invisibly until the burst itself dies
        if particle.life <= 0 {
            continue;
        }
        let alpha = particle.life as f32 / EXPLOSION_LIFETIME as f32;
        out.extend(shapes::rect_centered(
            particle.pos,
            Vec2::splat(4.0),
            with_alpha(particle.color, alpha),
        ));
    }
}
