//! Per-frame update rules.
//!
//! Both easing rules move a fixed fraction of the remaining distance per
//! tick. Convergence speed therefore follows the display refresh rate; the
//! rules are not scaled by elapsed time.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use glowgrid_common::CubeTransform;

use crate::config::MotionConfig;
use crate::state::InteractionState;
use crate::store::EntityStore;

/// Add `speed` to the rotation about both axes, wrapped into `[0, TAU)`.
pub fn spin(transform: &mut CubeTransform, speed: f32) {
    transform.rotation.x = (transform.rotation.x + speed).rem_euclid(TAU);
    transform.rotation.y = (transform.rotation.y + speed).rem_euclid(TAU);
}

/// Move `rate` of the way from the current XY position to `target`.
pub fn ease_toward_target(position: &mut Vec3, target: Vec2, rate: f32) {
    position.x += (target.x - position.x) * rate;
    position.y += (target.y - position.y) * rate;
}

/// Move `rate` of the way toward the pointer-offset rest position.
///
/// The attractor is `pointer * scale + rest`: the whole grid shifts with the
/// pointer while each cube keeps its place in the layout.
pub fn follow_pointer(position: &mut Vec3, pointer: Vec2, rest: Vec2, scale: f32, rate: f32) {
    let attractor = pointer * scale + rest;
    position.x += (attractor.x - position.x) * rate;
    position.y += (attractor.y - position.y) * rate;
}

/// Advance every cube by one tick.
///
/// Order per cube: spin, ease toward target, then (idle only) follow the
/// pointer. While idle the target equals the rest position, so both pulls
/// agree; while pressed only the expansion target applies.
pub fn advance(store: &mut EntityStore, state: &InteractionState, motion: &MotionConfig) {
    let speed = state.rotation_speed();
    let follow = !state.is_pressed();
    let pointer = state.pointer();
    for cube in store.cubes_mut() {
        let rest = cube.rest();
        let target = cube.target;
        let transform = &mut cube.transform;
        spin(transform, speed);
        ease_toward_target(&mut transform.position, target, motion.target_ease);
        if follow {
            follow_pointer(
                &mut transform.position,
                pointer,
                rest,
                motion.follow_scale,
                motion.follow_ease,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spin_wraps_within_one_turn() {
        let mut t = CubeTransform::default();
        for _ in 0..1000 {
            spin(&mut t, 0.05);
            assert!((0.0..TAU).contains(&t.rotation.x));
        }
        assert!((t.rotation.x - 50.0_f32.rem_euclid(TAU)).abs() < 1e-2);
        assert_eq!(t.rotation.x, t.rotation.y);
    }

    #[test]
    fn spin_keeps_advancing_from_large_angle() {
        let mut t = CubeTransform {
            rotation: Vec2::splat(262_144.0),
            ..CubeTransform::default()
        };
        spin(&mut t, 0.01);
        let start = t.rotation.x;
        for _ in 0..100 {
            spin(&mut t, 0.01);
        }
        let expected = (start + 1.0).rem_euclid(TAU);
        assert!((t.rotation.x - expected).abs() < 1e-3, "{} vs {expected}", t.rotation.x);
    }

    #[test]
    fn negative_speed_stays_in_range() {
        let mut t = CubeTransform::default();
        spin(&mut t, -0.01);
        assert!((t.rotation.x - (TAU - 0.01)).abs() < 1e-5);
    }

    #[test]
    fn easing_strictly_converges() {
        let target = Vec2::new(15.0, -15.0);
        let mut p = Vec3::new(3.0, -3.0, -10.0);
        let mut last = p.truncate().distance(target);
        // Stay well above f32 resolution so every step is observable.
        for _ in 0..60 {
            ease_toward_target(&mut p, target, 0.1);
            let d = p.truncate().distance(target);
            assert!(d < last);
            assert!((d - last * 0.9).abs() < 1e-3);
            last = d;
        }
        assert!(last < 0.05);
        assert_eq!(p.z, -10.0);
    }

    #[test]
    fn follow_pulls_toward_pointer_offset() {
        let rest = Vec2::new(3.0, 0.0);
        let mut p = rest.extend(-10.0);
        for _ in 0..500 {
            follow_pointer(&mut p, Vec2::new(0.5, -0.5), rest, 10.0, 0.05);
        }
        assert!((p.x - 8.0).abs() < 1e-3);
        assert!((p.y + 5.0).abs() < 1e-3);
    }
}
