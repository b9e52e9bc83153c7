//! Game state and core simulation types
//!
//! Everything the simulation mutates lives on [`GameState`]; the render path
//! only ever reads it.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::Aabb;
use super::formation::{self, Formation};
use crate::consts::*;

/// Coarse phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Title screen, waiting for the start command
    Start,
    /// Active gameplay; the only phase that runs the simulation step
    Playing,
    /// Frozen mid-run; movement and fire are ignored
    Paused,
    /// Run ended; `outcome` says how
    GameOver,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    /// All waves in the level table cleared
    Victory,
    /// Out of lives, or an enemy crossed the defense line
    Defeat,
}

/// Entity palette (copied onto entities at spawn, not looked up at draw time)
pub const COLOR_PLAYER: [f32; 4] = [0.0, 1.0, 1.0, 1.0];
pub const COLOR_PLAYER_BULLET: [f32; 4] = [1.0, 1.0, 0.0, 1.0];
pub const COLOR_ENEMY_BULLET: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
pub const COLOR_EXPLOSION: [f32; 4] = [1.0, 0.27, 0.0, 1.0];

/// The player's craft
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    pub speed: f32,
    /// Ticks of damage immunity remaining; also drives the draw-time flash
    pub invulnerable: u32,
    /// Thruster flame animation phase
    pub thruster_anim: f32,
    /// Whether a movement key was held last tick (thruster visible)
    pub thrusting: bool,
}

impl Player {
    pub fn new() -> Self {
        Self {
            pos: Vec2::new(
                FIELD_WIDTH / 2.0 - PLAYER_WIDTH / 2.0,
                FIELD_HEIGHT - PLAYER_HEIGHT - PLAYER_BOTTOM_MARGIN,
            ),
            speed: PLAYER_SPEED,
            invulnerable: 0,
            thruster_anim: 0.0,
            thrusting: false,
        }
    }

    /// Apply held movement keys, keep the craft on screen, run countdowns
    pub fn advance(&mut self, left: bool, right: bool) {
        if left {
            self.pos.x -= self.speed;
        }
        if right {
            self.pos.x += self.speed;
        }
        self.pos.x = self.pos.x.clamp(0.0, FIELD_WIDTH - PLAYER_WIDTH);

        self.thrusting = left || right;
        self.thruster_anim += 0.3;

        if self.invulnerable > 0 {
            self.invulnerable -= 1;
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT))
    }

    pub fn center(&self) -> Vec2 {
        self.bounds().center()
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

/// A projectile. The same type serves player fire (`dir` -1, upward) and
/// enemy fire (`dir` +1, downward, slower, red).
#[derive(Debug, Clone)]
pub struct Bullet {
    pub pos: Vec2,
    pub dir: f32,
    pub speed: f32,
    pub color: [f32; 4],
    /// Recent center positions for the fading trail, oldest first
    pub trail: Vec<Vec2>,
}

impl Bullet {
    fn new(pos: Vec2, dir: f32, speed: f32, color: [f32; 4]) -> Self {
        Self {
            pos,
            dir,
            speed,
            color,
            trail: Vec::with_capacity(TRAIL_LENGTH),
        }
    }

    /// A shot leaving the player's nose, travelling up
    pub fn player_shot(player: &Player) -> Self {
        Self::new(
            Vec2::new(
                player.pos.x + PLAYER_WIDTH / 2.0 - BULLET_WIDTH / 2.0,
                player.pos.y,
            ),
            -1.0,
            PLAYER_BULLET_SPEED,
            COLOR_PLAYER_BULLET,
        )
    }

    /// Return fire dropping from an enemy's muzzle
    pub fn enemy_shot(muzzle: Vec2) -> Self {
        Self::new(muzzle, 1.0, ENEMY_BULLET_SPEED, COLOR_ENEMY_BULLET)
    }

    /// Move along Y, then record the new center in the trail (FIFO, cap 5)
    pub fn advance(&mut self) {
        self.pos.y += self.speed * self.dir;

        self.trail.push(self.center());
        if self.trail.len() > TRAIL_LENGTH {
            self.trail.remove(0);
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::new(BULLET_WIDTH, BULLET_HEIGHT))
    }

    pub fn center(&self) -> Vec2 {
        self.bounds().center()
    }

    /// Fully above the playfield (player fire cull)
    pub fn off_top(&self) -> bool {
        self.pos.y < -BULLET_HEIGHT
    }

    /// Below the playfield (enemy fire cull)
    pub fn off_bottom(&self) -> bool {
        self.pos.y > FIELD_HEIGHT
    }
}

/// Behavior archetype, fixed for the enemy's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyKind {
    /// Slow sideways march with a periodic full-row drop
    Basic,
    /// Full-speed drift with a vertical sine wobble
    Fast,
    /// Moves in bursts and returns fire
    Shooter,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub pos: Vec2,
    pub kind: EnemyKind,
    /// Movement speed, copied from the level spec at spawn
    pub speed: f32,
    /// Tint, copied from the level spec at spawn
    pub color: [f32; 4],
    /// Horizontal heading, +1 right / -1 left
    pub dir: f32,
    pub move_counter: u32,
    /// Ticks until the next fire trial; only shooters arm it
    pub shoot_cooldown: u32,
    /// Visual oscillation phase; never read by gameplay rules
    pub anim: f32,
}

impl Enemy {
    pub fn new(pos: Vec2, kind: EnemyKind, spec: &LevelSpec) -> Self {
        Self {
            pos,
            kind,
            speed: spec.move_speed,
            color: spec.color,
            dir: 1.0,
            move_counter: 0,
            shoot_cooldown: 0,
            anim: 0.0,
        }
    }

    /// Advance one tick. Returns true when a shooter's fire trial succeeds;
    /// the caller owns the bullet cap and the actual spawn, and a capped
    /// shot still arms the cooldown.
    pub fn advance(&mut self, rng: &mut Pcg32) -> bool {
        self.anim += 0.1;
        self.move_counter += 1;

        let mut fired = false;
        match self.kind {
            EnemyKind::Basic => {
                if self.move_counter % 60 == 0 {
                    self.pos.y += 20.0;
                }
                self.pos.x += self.dir * self.speed * 0.5;
            }
            EnemyKind::Fast => {
                self.pos.x += self.dir * self.speed;
                self.pos.y += self.anim.sin() * 0.5;
            }
            EnemyKind::Shooter => {
                if self.move_counter % 30 == 0 {
                    self.pos.x += self.dir * 20.0;
                }
                if self.shoot_cooldown == 0 && rng.random::<f32>() < ENEMY_SHOOT_CHANCE * 2.0 {
                    fired = true;
                    self.shoot_cooldown = SHOOTER_COOLDOWN_TICKS;
                }
            }
        }

        // Edge turn: flip once per crossing (only while heading into the
        // bound), clamp back onto it, and step down
        let max_x = FIELD_WIDTH - ENEMY_WIDTH;
        if (self.pos.x <= 0.0 && self.dir < 0.0) || (self.pos.x >= max_x && self.dir > 0.0) {
            self.pos.x = self.pos.x.clamp(0.0, max_x);
            self.dir = -self.dir;
            self.pos.y += EDGE_DESCENT;
        }

        if self.shoot_cooldown > 0 {
            self.shoot_cooldown -= 1;
        }

        fired
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::new(ENEMY_WIDTH, ENEMY_HEIGHT))
    }

    pub fn center(&self) -> Vec2 {
        self.bounds().center()
    }

    /// Where return fire leaves the hull (bottom-center)
    pub fn muzzle(&self) -> Vec2 {
        Vec2::new(
            self.pos.x + ENEMY_WIDTH / 2.0 - BULLET_WIDTH / 2.0,
            self.pos.y + ENEMY_HEIGHT,
        )
    }

    /// Past the defense line above the bottom of the field
    pub fn reached_bottom(&self) -> bool {
        self.pos.y + ENEMY_HEIGHT > FIELD_HEIGHT - BOTTOM_DEFEAT_MARGIN
    }
}

/// One fragment of an explosion burst
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: [f32; 4],
    pub life: i32,
}

/// A short cosmetic burst of fragments. Never affects collisions or score.
#[derive(Debug, Clone)]
pub struct Explosion {
    pub origin: Vec2,
    /// Countdown that decides death. Particle `life` fields start equal and
    /// shrink in lockstep, but on their own decrement path.
    pub lifetime: i32,
    pub particles: Vec<Particle>,
}

impl Explosion {
    pub fn new(origin: Vec2, color: [f32; 4], rng: &mut Pcg32) -> Self {
        let particles = (0..EXPLOSION_PARTICLES)
            .map(|_| Particle {
                pos: origin,
                vel: Vec2::new(rng.random_range(-4.0..4.0), rng.random_range(-4.0..4.0)),
                color,
                life: EXPLOSION_LIFETIME,
            })
            .collect();

        Self {
            origin,
            lifetime: EXPLOSION_LIFETIME,
            particles,
        }
    }

    pub fn advance(&mut self) {
        self.lifetime -= 1;
        for p in &mut self.particles {
            p.pos += p.vel;
            p.vel *= PARTICLE_DRAG;
            p.life -= 1;
        }
    }

    /// Keyed on the burst's own countdown, not the particles'
    pub fn is_dead(&self) -> bool {
        self.lifetime <= 0
    }
}

/// Per-level wave definition
#[derive(Debug, Clone, Copy)]
pub struct LevelSpec {
    pub enemy_count: usize,
    pub formation: Formation,
    pub enemy_kind: EnemyKind,
    pub color: [f32; 4],
    pub move_speed: f32,
}

/// The campaign. Clearing the last entry wins the run.
pub const LEVELS: [LevelSpec; 3] = [
    LevelSpec {
        enemy_count: 12,
        formation: Formation::Grid,
        enemy_kind: EnemyKind::Basic,
        color: [0.22, 1.0, 0.08, 1.0],
        move_speed: 1.0,
    },
    LevelSpec {
        enemy_count: 18,
        formation: Formation::VShape,
        enemy_kind: EnemyKind::Fast,
        color: [1.0, 0.0, 1.0, 1.0],
        move_speed: 1.5,
    },
    LevelSpec {
        enemy_count: 24,
        formation: Formation::Wave,
        enemy_kind: EnemyKind::Shooter,
        color: [1.0, 0.27, 0.0, 1.0],
        move_speed: 2.0,
    },
];

impl LevelSpec {
    /// Look up a 1-based level number
    pub fn for_level(level: u32) -> Option<&'static LevelSpec> {
        (level as usize)
            .checked_sub(1)
            .and_then(|idx| LEVELS.get(idx))
    }
}

/// Complete simulation state for one session
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed, for reproducibility
    pub seed: u64,
    pub phase: GamePhase,
    /// Set when entering `GameOver`
    pub outcome: Option<GameOutcome>,
    pub score: u64,
    /// 1-based index into the level table
    pub level: u32,
    pub lives: u32,
    /// Simulation tick counter
    pub tick_count: u64,
    /// One-shot countdown to the next wave spawn; 0 = nothing scheduled
    pub wave_delay_ticks: u32,
    pub player: Player,
    /// Player fire, travelling up
    pub bullets: Vec<Bullet>,
    /// Enemy fire, travelling down; capped at `MAX_ENEMY_BULLETS`
    pub enemy_bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub explosions: Vec<Explosion>,
    pub rng: Pcg32,
}

impl GameState {
    /// Create a fresh session on the title screen
    pub fn new(seed: u64) -> Self {
        // A campaign with no waves is a build defect, not a victory
        assert!(!LEVELS.is_empty(), "level table must define at least one wave");

        Self {
            seed,
            phase: GamePhase::Start,
            outcome: None,
            score: 0,
            level: 1,
            lives: START_LIVES,
            tick_count: 0,
            wave_delay_ticks: 0,
            player: Player::new(),
            bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            enemies: Vec::new(),
            explosions: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Reset everything a run touches and enter `Playing` with wave one
    pub fn start_run(&mut self) {
        self.score = 0;
        self.level = 1;
        self.lives = START_LIVES;
        self.outcome = None;
        self.wave_delay_ticks = 0;
        self.player = Player::new();
        self.bullets.clear();
        self.enemy_bullets.clear();
        self.enemies.clear();
        self.explosions.clear();

        formation::spawn_wave(self);
        self.phase = GamePhase::Playing;
    }

    /// Spawn a cosmetic burst at a point
    pub fn spawn_explosion(&mut self, at: Vec2, color: [f32; 4]) {
        let burst = Explosion::new(at, color, &mut self.rng);
        self.explosions.push(burst);
    }

    /// Apply a hit to the player. Returns false while the invulnerability
    /// window absorbs it; otherwise one life is gone, the 120-tick window
    /// opens, and a burst marks the craft's center.
    pub fn damage_player(&mut self) -> bool {
        if self.player.invulnerable > 0 {
            return false;
        }

        self.lives = self.lives.saturating_sub(1);
        self.player.invulnerable = INVULN_TICKS;
        let center = self.player.center();
        self.spawn_explosion(center, COLOR_PLAYER);
        true
    }

    /// Move past a cleared wave: next level, or victory past the table.
    /// Returns true when the run ended.
    pub fn advance_level(&mut self) -> bool {
        self.level += 1;
        if self.level as usize > LEVELS.len() {
            self.end_run(GameOutcome::Victory);
            return true;
        }

        log::info!(
            "level {} cleared, next wave in {} ticks",
            self.level - 1,
            WAVE_DELAY_TICKS
        );
        self.wave_delay_ticks = WAVE_DELAY_TICKS;
        false
    }

    /// End the run and record how it went
    pub fn end_run(&mut self, outcome: GameOutcome) {
        log::info!("run over: {:?} (score {}, level {})", outcome, self.score, self.level);
        self.outcome = Some(outcome);
        self.phase = GamePhase::GameOver;
    }
}
