//! Shape tessellation for the 2D triangle-list pipeline

use glam::Vec2;

use super::vertex::Vertex;

/// Two triangles covering an axis-aligned rectangle
pub fn rect(pos: Vec2, size: Vec2, color: [f32; 4]) -> [Vertex; 6] {
    rect_gradient(pos, size, color, color)
}

/// A rectangle with distinct top and bottom colors (vertical gradient)
pub fn rect_gradient(pos: Vec2, size: Vec2, top: [f32; 4], bottom: [f32; 4]) -> [Vertex; 6] {
    let (x0, y0) = (pos.x, pos.y);
    let (x1, y1) = (pos.x + size.x, pos.y + size.y);

    [
        Vertex::new(x0, y0, top),
        Vertex::new(x1, y0, top),
        Vertex::new(x0, y1, bottom),
        Vertex::new(x1, y0, top),
        Vertex::new(x1, y1, bottom),
        Vertex::new(x0, y1, bottom),
    ]
}

/// A rectangle centered on a point
pub fn rect_centered(center: Vec2, size: Vec2, color: [f32; 4]) -> [Vertex; 6] {
    rect(center - size * 0.5, size, color)
}

/// A single filled triangle
pub fn triangle(a: Vec2, b: Vec2, c: Vec2, color: [f32; 4]) -> [Vertex; 3] {
    [
        Vertex::new(a.x, a.y, color),
        Vertex::new(b.x, b.y, color),
        Vertex::new(c.x, c.y, color),
    ]
}

/// Fading 2x2 markers along a bullet's recent path, oldest dimmest
pub fn bullet_trail(trail: &[Vec2], color: [f32; 4], max_points: usize) -> Vec<Vertex> {
    let points = &trail[trail.len().saturating_sub(max_points)..];
    let len = points.len() as f32;

    let mut vertices = Vec::with_capacity(points.len() * 6);
    for (i, p) in points.iter().enumerate() {
        let alpha = (i + 1) as f32 / len * 0.5;
        let faded = [color[0], color[1], color[2], alpha];
        vertices.extend(rect_centered(*p, Vec2::splat(2.0), faded));
    }
    vertices
}

/// Multiply a color's alpha channel
pub fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], color[3] * alpha]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_covers_corners() {
        let verts = rect(Vec2::new(10.0, 20.0), Vec2::new(4.0, 12.0), [1.0; 4]);
        let xs: Vec<f32> = verts.iter().map(|v| v.position[0]).collect();
        let ys: Vec<f32> = verts.iter().map(|v| v.position[1]).collect();
        assert_eq!(xs.iter().cloned().fold(f32::MAX, f32::min), 10.0);
        assert_eq!(xs.iter().cloned().fold(f32::MIN, f32::max), 14.0);
        assert_eq!(ys.iter().cloned().fold(f32::MAX, f32::min), 20.0);
        assert_eq!(ys.iter().cloned().fold(f32::MIN, f32::max), 32.0);
    }

    #[test]
    fn test_trail_fades_toward_the_tail() {
        let trail = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 8.0),
            Vec2::new(0.0, 16.0),
        ];
        let verts = bullet_trail(&trail, [1.0, 1.0, 0.0, 1.0], 5);
        assert_eq!(verts.len(), 3 * 6);

        // Oldest marker is dimmest, newest brightest at half alpha
        let first_alpha = verts[0].color[3];
        let last_alpha = verts[verts.len() - 1].color[3];
        assert!(first_alpha < last_alpha);
        assert!((last_alpha - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_trail_respects_point_cap() {
        let trail: Vec<Vec2> = (0..5).map(|i| Vec2::new(0.0, i as f32)).collect();
        let verts = bullet_trail(&trail, [1.0; 4], 2);
        assert_eq!(verts.len(), 2 * 6);
    }
}
