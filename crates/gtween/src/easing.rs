// easing.rs
//
// Easing curves mapping linear progress to shaped progress.
// Pure math, with no knowledge of tweens or the scheduler.

use std::f32::consts::PI;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Built-in easing curves.
///
/// Every curve maps 0 to exactly 0 and 1 to exactly 1. In between, the Back
/// and Elastic families overshoot the [0, 1] range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Easing {
    /// Constant velocity (no easing).
    #[default]
    Linear,
    InSine,
    OutSine,
    InOutSine,
    /// Slow start.
    InQuad,
    /// Slow end.
    OutQuad,
    /// Slow start and end.
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    InQuart,
    OutQuart,
    InOutQuart,
    InQuint,
    OutQuint,
    InOutQuint,
    /// Exponential easing (dramatic).
    InExpo,
    OutExpo,
    InOutExpo,
    /// Circular arc.
    InCirc,
    OutCirc,
    InOutCirc,
    /// Pull back before moving / overshoot then settle.
    InBack,
    OutBack,
    InOutBack,
    /// Elastic spring.
    InElastic,
    OutElastic,
    InOutElastic,
    /// Bouncy finish.
    InBounce,
    OutBounce,
    InOutBounce,
}

impl Easing {
    /// The whole catalog, in declaration order.
    pub const ALL: [Easing; 31] = [
        Easing::Linear,
        Easing::InSine,
        Easing::OutSine,
        Easing::InOutSine,
        Easing::InQuad,
        Easing::OutQuad,
        Easing::InOutQuad,
        Easing::InCubic,
        Easing::OutCubic,
        Easing::InOutCubic,
        Easing::InQuart,
        Easing::OutQuart,
        Easing::InOutQuart,
        Easing::InQuint,
        Easing::OutQuint,
        Easing::InOutQuint,
        Easing::InExpo,
        Easing::OutExpo,
        Easing::InOutExpo,
        Easing::InCirc,
        Easing::OutCirc,
        Easing::InOutCirc,
        Easing::InBack,
        Easing::OutBack,
        Easing::InOutBack,
        Easing::InElastic,
        Easing::OutElastic,
        Easing::InOutElastic,
        Easing::InBounce,
        Easing::OutBounce,
        Easing::InOutBounce,
    ];

    /// Apply the easing function to a normalized time value `t` in [0, 1].
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        // Endpoints are always exact, whatever rounding the formulas do.
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match self {
            Easing::Linear => t,

            // Sine
            Easing::InSine => 1.0 - (t * PI / 2.0).cos(),
            Easing::OutSine => (t * PI / 2.0).sin(),
            Easing::InOutSine => -((PI * t).cos() - 1.0) / 2.0,

            // Quadratic
            Easing::InQuad => t * t,
            Easing::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::InOutQuad => in_out(t, |t| 2.0 * t * t, 2),

            // Cubic
            Easing::InCubic => t * t * t,
            Easing::OutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::InOutCubic => in_out(t, |t| 4.0 * t * t * t, 3),

            // Quartic
            Easing::InQuart => t.powi(4),
            Easing::OutQuart => 1.0 - (1.0 - t).powi(4),
            Easing::InOutQuart => in_out(t, |t| 8.0 * t.powi(4), 4),

            // Quintic
            Easing::InQuint => t.powi(5),
            Easing::OutQuint => 1.0 - (1.0 - t).powi(5),
            Easing::InOutQuint => in_out(t, |t| 16.0 * t.powi(5), 5),

            // Exponential
            Easing::InExpo => 2.0_f32.powf(10.0 * t - 10.0),
            Easing::OutExpo => 1.0 - 2.0_f32.powf(-10.0 * t),
            Easing::InOutExpo => {
                if t < 0.5 {
                    2.0_f32.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2.0_f32.powf(-20.0 * t + 10.0)) / 2.0
                }
            }

            // Circular
            Easing::InCirc => 1.0 - (1.0 - t * t).sqrt(),
            Easing::OutCirc => (1.0 - (t - 1.0).powi(2)).sqrt(),
            Easing::InOutCirc => {
                if t < 0.5 {
                    (1.0 - (1.0 - (2.0 * t).powi(2)).sqrt()) / 2.0
                } else {
                    ((1.0 - (-2.0 * t + 2.0).powi(2)).sqrt() + 1.0) / 2.0
                }
            }

            // Back (overshoot)
            Easing::InBack => BACK_C3 * t * t * t - BACK_C1 * t * t,
            Easing::OutBack => {
                1.0 + BACK_C3 * (t - 1.0).powi(3) + BACK_C1 * (t - 1.0).powi(2)
            }
            Easing::InOutBack => {
                const C2: f32 = BACK_C1 * 1.525;
                if t < 0.5 {
                    (2.0 * t).powi(2) * ((C2 + 1.0) * 2.0 * t - C2) / 2.0
                } else {
                    ((2.0 * t - 2.0).powi(2) * ((C2 + 1.0) * (t * 2.0 - 2.0) + C2) + 2.0) / 2.0
                }
            }

            // Elastic
            Easing::InElastic => {
                const C4: f32 = (2.0 * PI) / 3.0;
                -(2.0_f32.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * C4).sin()
            }
            Easing::OutElastic => {
                const C4: f32 = (2.0 * PI) / 3.0;
                2.0_f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * C4).sin() + 1.0
            }
            Easing::InOutElastic => {
                const C5: f32 = (2.0 * PI) / 4.5;
                if t < 0.5 {
                    -(2.0_f32.powf(20.0 * t - 10.0) * ((20.0 * t - 11.125) * C5).sin()) / 2.0
                } else {
                    (2.0_f32.powf(-20.0 * t + 10.0) * ((20.0 * t - 11.125) * C5).sin()) / 2.0 + 1.0
                }
            }

            // Bounce
            Easing::InBounce => 1.0 - bounce_out(1.0 - t),
            Easing::OutBounce => bounce_out(t),
            Easing::InOutBounce => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * t)) / 2.0
                } else {
                    (1.0 + bounce_out(2.0 * t - 1.0)) / 2.0
                }
            }
        }
    }
}

const BACK_C1: f32 = 1.70158;
const BACK_C3: f32 = BACK_C1 + 1.0;

/// Shared shape of the polynomial InOut curves: `lower` on the first half,
/// the mirrored power curve on the second.
#[inline]
fn in_out(t: f32, lower: impl Fn(f32) -> f32, power: i32) -> f32 {
    if t < 0.5 {
        lower(t)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(power) / 2.0
    }
}

#[inline]
fn bounce_out(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;

    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

/// User-supplied sampling function.
pub type EasingFn = Arc<dyn Fn(f32) -> f32 + Send + Sync>;

/// The curve a tween samples: a catalog entry, a CSS-style cubic bezier, or
/// a custom function.
///
/// Cloning is cheap; custom functions are shared, not copied.
#[derive(Clone)]
pub enum EasingCurve {
    Builtin(Easing),
    /// Control points `(x1, y1, x2, y2)` as in CSS `cubic-bezier()`.
    CubicBezier(f32, f32, f32, f32),
    Custom(EasingFn),
}

impl EasingCurve {
    /// Wrap a closure as a curve.
    pub fn custom(f: impl Fn(f32) -> f32 + Send + Sync + 'static) -> Self {
        EasingCurve::Custom(Arc::new(f))
    }

    /// Sample the curve. `t` is clamped to [0, 1]; the output is not.
    #[inline]
    pub fn sample(&self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            EasingCurve::Builtin(easing) => easing.apply(t),
            EasingCurve::CubicBezier(x1, y1, x2, y2) => cubic_bezier_ease(t, *x1, *y1, *x2, *y2),
            EasingCurve::Custom(f) => f(t),
        }
    }
}

impl Default for EasingCurve {
    fn default() -> Self {
        EasingCurve::Builtin(Easing::Linear)
    }
}

impl From<Easing> for EasingCurve {
    fn from(easing: Easing) -> Self {
        EasingCurve::Builtin(easing)
    }
}

impl fmt::Debug for EasingCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EasingCurve::Builtin(easing) => f.debug_tuple("Builtin").field(easing).finish(),
            EasingCurve::CubicBezier(x1, y1, x2, y2) => f
                .debug_tuple("CubicBezier")
                .field(x1)
                .field(y1)
                .field(x2)
                .field(y2)
                .finish(),
            EasingCurve::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// One axis of a cubic bezier from (0, 0) to (1, 1), kept as polynomial
/// coefficients: B(u) = ((a·u + b)·u + c)·u.
#[derive(Clone, Copy)]
struct BezierAxis {
    a: f64,
    b: f64,
    c: f64,
}

impl BezierAxis {
    fn new(p1: f32, p2: f32) -> Self {
        let (p1, p2) = (p1 as f64, p2 as f64);
        let c = 3.0 * p1;
        let b = 3.0 * (p2 - p1) - c;
        Self { a: 1.0 - c - b, b, c }
    }

    #[inline]
    fn at(self, u: f64) -> f64 {
        ((self.a * u + self.b) * u + self.c) * u
    }

    #[inline]
    fn slope(self, u: f64) -> f64 {
        (3.0 * self.a * u + 2.0 * self.b) * u + self.c
    }

    /// Parameter `u` in [0, 1] where this axis reaches `x`. The x axis of a
    /// valid easing bezier is monotonic, so the root is unique.
    fn solve(self, x: f64) -> f64 {
        const EPS: f64 = 1e-7;
        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        let mut u = x;
        // Newton steps, shrinking the bracket as we go.
        for _ in 0..8 {
            let err = self.at(u) - x;
            if err.abs() < EPS {
                return u;
            }
            if err < 0.0 {
                lo = u;
            } else {
                hi = u;
            }
            let slope = self.slope(u);
            if slope.abs() < EPS {
                break;
            }
            u -= err / slope;
            if u <= lo || u >= hi {
                break;
            }
        }
        // Flat slope or a step out of the bracket: bisect what is left.
        u = (lo + hi) * 0.5;
        for _ in 0..32 {
            let err = self.at(u) - x;
            if err.abs() < EPS {
                break;
            }
            if err < 0.0 {
                lo = u;
            } else {
                hi = u;
            }
            u = (lo + hi) * 0.5;
        }
        u
    }
}

/// CSS-style `cubic-bezier(x1, y1, x2, y2)` easing.
fn cubic_bezier_ease(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let u = BezierAxis::new(x1, x2).solve(t as f64);
    BezierAxis::new(y1, y2).at(u) as f32
}
