//! Interpolatable value types.
//!
//! Anything a tween animates implements [`Lerp`]. Scalars and glam vectors
//! interpolate component-wise, [`Quat`] uses spherical interpolation so
//! rotations keep unit length.

use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::easing::EasingCurve;

/// Linear interpolation between two values of the same type.
///
/// `t` is the eased progress and may leave [0, 1] for overshooting curves,
/// so implementations must extrapolate rather than clamp.
pub trait Lerp: Clone + 'static {
    fn lerp(&self, to: &Self, t: f32) -> Self;
}

impl Lerp for f32 {
    #[inline]
    fn lerp(&self, to: &Self, t: f32) -> Self {
        lerp(*self, *to, t)
    }
}

impl Lerp for f64 {
    #[inline]
    fn lerp(&self, to: &Self, t: f32) -> Self {
        self + (to - self) * t as f64
    }
}

impl Lerp for Vec2 {
    #[inline]
    fn lerp(&self, to: &Self, t: f32) -> Self {
        *self + (*to - *self) * t
    }
}

impl Lerp for Vec3 {
    #[inline]
    fn lerp(&self, to: &Self, t: f32) -> Self {
        *self + (*to - *self) * t
    }
}

impl Lerp for Vec4 {
    #[inline]
    fn lerp(&self, to: &Self, t: f32) -> Self {
        *self + (*to - *self) * t
    }
}

impl Lerp for Quat {
    #[inline]
    fn lerp(&self, to: &Self, t: f32) -> Self {
        self.slerp(*to, t)
    }
}

/// Straight-alpha RGBA color, components nominally in [0, 1].
/// Laid out as `[f32; 4]` so animated colors can be uploaded as-is.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Same color with a different alpha.
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

impl Lerp for Color {
    #[inline]
    fn lerp(&self, to: &Self, t: f32) -> Self {
        Color {
            r: lerp(self.r, to.r, t),
            g: lerp(self.g, to.g, t),
            b: lerp(self.b, to.b, t),
            a: lerp(self.a, to.a, t),
        }
    }
}

// ── Interpolation helpers ────────────────────────────────────────────────

/// Linearly interpolate between two values.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Interpolate any [`Lerp`] value along an easing curve.
#[inline]
pub fn ease<V: Lerp>(from: &V, to: &V, t: f32, curve: &EasingCurve) -> V {
    from.lerp(to, curve.sample(t))
}
