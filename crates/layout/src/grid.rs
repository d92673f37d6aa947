use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Number of cubes and the distance between neighbouring cube centers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub count: usize,
    pub spacing: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            count: 9,
            spacing: 3.0,
        }
    }
}

impl GridConfig {
    /// Cell positions for this configuration.
    pub fn positions(&self) -> Vec<Vec2> {
        layout(self.count, self.spacing)
    }
}

/// Side length of the smallest square that holds `count` cells.
pub fn side_for(count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    let side = (count as f64).sqrt().ceil() as usize;
    // Guard against sqrt rounding on large perfect squares.
    if side * side < count { side + 1 } else { side }
}

/// Lay out `count` cells row by row on a square grid centered on the origin.
///
/// The trailing row may be partially filled; the centering still uses the
/// full square, so an incomplete grid sits slightly below its top neighbours.
pub fn layout(count: usize, spacing: f32) -> Vec<Vec2> {
    let side = side_for(count);
    let half = (side as f32 - 1.0) / 2.0;
    (0..count)
        .map(|i| {
            let row = (i / side) as f32;
            let col = (i % side) as f32;
            Vec2::new((col - half) * spacing, (row - half) * spacing)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_matches_count() {
        for count in [1, 4, 9, 16, 17] {
            assert_eq!(layout(count, 3.0).len(), count);
        }
    }

    #[test]
    fn full_squares_are_centered() {
        for count in [1, 4, 9, 16] {
            let positions = layout(count, 3.0);
            let centroid = positions.iter().copied().sum::<Vec2>() / count as f32;
            assert!(centroid.length() < 1e-4, "count {count}: {centroid:?}");
        }
    }

    #[test]
    fn sparse_trailing_row_keeps_square_center() {
        // 17 cells on a 5x5 square: columns are centered, rows fill from -6.
        let positions = layout(17, 3.0);
        let min = positions.iter().fold(Vec2::splat(f32::MAX), |a, p| a.min(*p));
        let max = positions.iter().fold(Vec2::splat(f32::MIN), |a, p| a.max(*p));
        assert_eq!(min, Vec2::new(-6.0, -6.0));
        assert_eq!(max, Vec2::new(6.0, 3.0));
        let centroid = positions.iter().copied().sum::<Vec2>() / 17.0;
        assert!(centroid.x.abs() < 1.0 && centroid.y.abs() < 3.0);
    }

    #[test]
    fn positions_never_coincide() {
        for count in [1, 4, 9, 16, 17] {
            let positions = layout(count, 3.0);
            for (i, a) in positions.iter().enumerate() {
                for b in &positions[i + 1..] {
                    assert!(a.distance(*b) > 1e-3);
                }
            }
        }
    }

    #[test]
    fn three_by_three_scenario() {
        let positions = GridConfig::default().positions();
        let expected: Vec<Vec2> = [-3.0, 0.0, 3.0]
            .iter()
            .flat_map(|&y| [-3.0, 0.0, 3.0].map(|x| Vec2::new(x, y)))
            .collect();
        assert_eq!(positions, expected);
    }

    #[test]
    fn zero_count_is_empty() {
        assert!(layout(0, 3.0).is_empty());
        assert_eq!(side_for(0), 0);
    }

    #[test]
    fn side_is_ceil_sqrt() {
        assert_eq!(side_for(1), 1);
        assert_eq!(side_for(4), 2);
        assert_eq!(side_for(5), 3);
        assert_eq!(side_for(10_000), 100);
        assert_eq!(side_for(10_001), 101);
    }
}
