//! Initial wave layouts
//!
//! Pure position math: given an enemy count and the field width, each
//! formation yields the spawn points for one wave. The spawner replaces the
//! enemy collection wholesale.

use glam::Vec2;

use super::state::{Enemy, GameState, LevelSpec};
use crate::consts::FIELD_WIDTH;

/// Spatial arrangement of a freshly spawned wave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formation {
    /// Centered columns and 50px rows
    Grid,
    /// Two arms opening down and away from the center line
    VShape,
    /// A single rank with a sinusoidal baseline
    Wave,
}

impl Formation {
    /// Spawn positions for `count` enemies across `width` pixels
    pub fn positions(self, count: usize, width: f32) -> Vec<Vec2> {
        if count == 0 {
            return Vec::new();
        }
        match self {
            Formation::Grid => grid(count, width),
            Formation::VShape => v_shape(count, width),
            Formation::Wave => wave(count, width),
        }
    }
}

fn grid(count: usize, width: f32) -> Vec<Vec2> {
    let cols = (count as f32).sqrt().ceil() as usize;
    let spacing = 60.0;
    let start_x = (width - (cols - 1) as f32 * spacing) / 2.0;

    (0..count)
        .map(|i| {
            let col = i % cols;
            let row = i / cols;
            Vec2::new(
                start_x + col as f32 * spacing,
                50.0 + row as f32 * 50.0,
            )
        })
        .collect()
}

fn v_shape(count: usize, width: f32) -> Vec<Vec2> {
    let center_x = width / 2.0;
    let spacing = 40.0;

    (0..count)
        .map(|i| {
            // Alternate arms; the offset widens every two enemies and the
            // descent tracks the offset, carving the V silhouette
            let side = if i % 2 == 0 { 1.0 } else { -1.0 };
            let offset = (i / 2) as f32 * spacing;
            Vec2::new(center_x + side * offset, 50.0 + offset * 0.5)
        })
        .collect()
}

fn wave(count: usize, width: f32) -> Vec<Vec2> {
    let spacing = width / (count + 1) as f32;

    (0..count)
        .map(|i| {
            Vec2::new(
                spacing * (i + 1) as f32,
                50.0 + (i as f32 * 0.5).sin() * 30.0,
            )
        })
        .collect()
}

/// Replace the enemy collection with the current level's wave
pub fn spawn_wave(state: &mut GameState) {
    let spec = LevelSpec::for_level(state.level)
        .expect("level advance checks the table before scheduling a spawn");

    log::info!(
        "level {}: spawning {} {:?} enemies in {:?} formation",
        state.level,
        spec.enemy_count,
        spec.enemy_kind,
        spec.formation
    );

    state.enemies = spec
        .formation
        .positions(spec.enemy_count, FIELD_WIDTH)
        .into_iter()
        .map(|pos| Enemy::new(pos, spec.enemy_kind, spec))
        .collect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_grid_of_12_is_4_by_3_centered() {
        let positions = Formation::Grid.positions(12, FIELD_WIDTH);
        assert_eq!(positions.len(), 12);

        // cols = ceil(sqrt(12)) = 4, spacing 60, centered: first column at
        // (800 - 3*60) / 2 = 310
        let xs: Vec<f32> = positions.iter().take(4).map(|p| p.x).collect();
        assert_eq!(xs, vec![310.0, 370.0, 430.0, 490.0]);

        // 3 rows, 50px apart from y=50
        assert_eq!(positions[0].y, 50.0);
        assert_eq!(positions[4].y, 100.0);
        assert_eq!(positions[8].y, 150.0);
        assert_eq!(positions[11], Vec2::new(490.0, 150.0));
    }

    #[test]
    fn test_v_shape_alternates_and_widens() {
        let positions = Formation::VShape.positions(6, FIELD_WIDTH);
        let center = FIELD_WIDTH / 2.0;

        assert_eq!(positions[0], Vec2::new(center, 50.0));
        assert_eq!(positions[1], Vec2::new(center, 50.0));
        assert_eq!(positions[2], Vec2::new(center + 40.0, 70.0));
        assert_eq!(positions[3], Vec2::new(center - 40.0, 70.0));
        assert_eq!(positions[4], Vec2::new(center + 80.0, 90.0));
        assert_eq!(positions[5], Vec2::new(center - 80.0, 90.0));
    }

    #[test]
    fn test_wave_spacing_and_baseline() {
        let count = 24;
        let positions = Formation::Wave.positions(count, FIELD_WIDTH);
        let spacing = FIELD_WIDTH / (count + 1) as f32;

        for (i, p) in positions.iter().enumerate() {
            assert_eq!(p.x, spacing * (i + 1) as f32);
            let expected_y = 50.0 + (i as f32 * 0.5).sin() * 30.0;
            assert!((p.y - expected_y).abs() < 1e-5);
        }
    }

    #[test]
    fn test_zero_count_yields_no_positions() {
        for formation in [Formation::Grid, Formation::VShape, Formation::Wave] {
            assert!(formation.positions(0, FIELD_WIDTH).is_empty());
        }
    }

    proptest! {
        #[test]
        fn prop_every_formation_yields_count_positions(
            count in 1usize..=40,
        ) {
            for formation in [Formation::Grid, Formation::VShape, Formation::Wave] {
                prop_assert_eq!(formation.positions(count, FIELD_WIDTH).len(), count);
            }
        }

        #[test]
        fn prop_grid_stays_centered_and_inside(count in 1usize..=100) {
            let positions = Formation::Grid.positions(count, FIELD_WIDTH);
            let min_x = positions.iter().map(|p| p.x).fold(f32::MAX, f32::min);
            let max_x = positions.iter().map(|p| p.x).fold(f32::MIN, f32::max);

            prop_assert!(min_x >= 0.0);
            prop_assert!(max_x <= FIELD_WIDTH);
            // Columns are symmetric about the center line
            prop_assert!((min_x - (FIELD_WIDTH - max_x)).abs() < 1e-3);
        }

        #[test]
        fn prop_wave_strictly_inside_field(count in 1usize..=100) {
            let positions = Formation::Wave.positions(count, FIELD_WIDTH);
            for p in positions {
                prop_assert!(p.x > 0.0 && p.x < FIELD_WIDTH);
                prop_assert!(p.y >= 20.0 && p.y <= 80.0);
            }
        }

        #[test]
        fn prop_v_shape_is_symmetric(count in 1usize..=40) {
            let positions = Formation::VShape.positions(count, FIELD_WIDTH);
            let center = FIELD_WIDTH / 2.0;
            for pair in positions.chunks(2) {
                if let [right, left] = pair {
                    prop_assert!((right.x - center + (left.x - center)).abs() < 1e-3);
                    prop_assert!((right.y - left.y).abs() < 1e-3);
                }
            }
        }
    }
}
