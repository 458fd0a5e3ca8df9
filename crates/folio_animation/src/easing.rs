//! Easing functions
//!
//! Easings map a linear progress value in `[0, 1]` to an eased value. They are
//! named the way page authors write them (`"none"`, `"power2.in"`,
//! `"sine.inOut"`, `"cubic-bezier(0.4, 0, 0.2, 1)"`) so they can be read
//! straight out of configuration files.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnimationError;

/// An easing curve
///
/// Power easings follow the usual naming: `power1` is quadratic, `power2`
/// cubic, `power3` quartic and `power4` quintic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Easing {
    /// No easing
    #[default]
    Linear,
    /// Accelerating power curve
    PowerIn(u8),
    /// Decelerating power curve
    PowerOut(u8),
    /// Accelerate then decelerate
    PowerInOut(u8),
    SineIn,
    SineOut,
    SineInOut,
    /// CSS-style cubic bezier with control points (x1, y1, x2, y2)
    CubicBezier(f32, f32, f32, f32),
}

impl Easing {
    /// Apply the easing to a progress value (clamped to `[0, 1]`)
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Easing::Linear => t,
            Easing::PowerIn(power) => t.powi(power as i32 + 1),
            Easing::PowerOut(power) => 1.0 - (1.0 - t).powi(power as i32 + 1),
            Easing::PowerInOut(power) => {
                let exp = power as i32 + 1;
                if t < 0.5 {
                    (2.0 * t).powi(exp) / 2.0
                } else {
                    1.0 - (2.0 * (1.0 - t)).powi(exp) / 2.0
                }
            }
            Easing::SineIn => 1.0 - (t * std::f32::consts::FRAC_PI_2).cos(),
            Easing::SineOut => (t * std::f32::consts::FRAC_PI_2).sin(),
            Easing::SineInOut => -((std::f32::consts::PI * t).cos() - 1.0) / 2.0,
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier(x1, y1, x2, y2, t),
        }
    }

    /// Whether this is the identity curve
    pub fn is_linear(&self) -> bool {
        matches!(self, Easing::Linear | Easing::PowerIn(0) | Easing::PowerOut(0))
    }
}

/// Solve a cubic bezier timing curve for `t`
///
/// Newton-Raphson on the x polynomial, falling back to bisection when the
/// slope gets too flat.
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, t: f32) -> f32 {
    let cx = 3.0 * x1;
    let bx = 3.0 * (x2 - x1) - cx;
    let ax = 1.0 - cx - bx;
    let cy = 3.0 * y1;
    let by = 3.0 * (y2 - y1) - cy;
    let ay = 1.0 - cy - by;

    let sample_x = |s: f32| ((ax * s + bx) * s + cx) * s;
    let sample_y = |s: f32| ((ay * s + by) * s + cy) * s;
    let slope_x = |s: f32| (3.0 * ax * s + 2.0 * bx) * s + cx;

    let mut s = t;
    for _ in 0..8 {
        let x = sample_x(s) - t;
        if x.abs() < 1e-6 {
            return sample_y(s);
        }
        let d = slope_x(s);
        if d.abs() < 1e-6 {
            break;
        }
        s -= x / d;
    }

    let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
    s = t;
    for _ in 0..32 {
        let x = sample_x(s);
        if (x - t).abs() < 1e-6 {
            break;
        }
        if x < t {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    sample_y(s)
}

impl FromStr for Easing {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.is_empty() || name == "none" || name == "linear" {
            return Ok(Easing::Linear);
        }

        if let Some(args) = name
            .strip_prefix("cubic-bezier(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let points: Vec<f32> = args
                .split(',')
                .map(|p| p.trim().parse::<f32>())
                .collect::<Result<_, _>>()
                .map_err(|_| AnimationError::UnknownEasing(s.to_string()))?;
            return match points.as_slice() {
                [x1, y1, x2, y2] if (0.0..=1.0).contains(x1) && (0.0..=1.0).contains(x2) => {
                    Ok(Easing::CubicBezier(*x1, *y1, *x2, *y2))
                }
                _ => Err(AnimationError::UnknownEasing(s.to_string())),
            };
        }

        let (family, direction) = name.split_once('.').unwrap_or((name, "out"));
        let power = match family {
            "power0" => Some(0),
            "power1" | "quad" => Some(1),
            "power2" | "cubic" => Some(2),
            "power3" | "quart" => Some(3),
            "power4" | "quint" | "strong" => Some(4),
            "sine" => None,
            _ => return Err(AnimationError::UnknownEasing(s.to_string())),
        };

        match (power, direction) {
            (Some(0), _) => Ok(Easing::Linear),
            (Some(p), "in") => Ok(Easing::PowerIn(p)),
            (Some(p), "out") => Ok(Easing::PowerOut(p)),
            (Some(p), "inOut") => Ok(Easing::PowerInOut(p)),
            (None, "in") => Ok(Easing::SineIn),
            (None, "out") => Ok(Easing::SineOut),
            (None, "inOut") => Ok(Easing::SineInOut),
            _ => Err(AnimationError::UnknownEasing(s.to_string())),
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Linear => write!(f, "none"),
            Easing::PowerIn(p) => write!(f, "power{p}.in"),
            Easing::PowerOut(p) => write!(f, "power{p}.out"),
            Easing::PowerInOut(p) => write!(f, "power{p}.inOut"),
            Easing::SineIn => write!(f, "sine.in"),
            Easing::SineOut => write!(f, "sine.out"),
            Easing::SineInOut => write!(f, "sine.inOut"),
            Easing::CubicBezier(x1, y1, x2, y2) => {
                write!(f, "cubic-bezier({x1}, {y1}, {x2}, {y2})")
            }
        }
    }
}

impl TryFrom<String> for Easing {
    type Error = AnimationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Easing> for String {
    fn from(easing: Easing) -> Self {
        easing.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        let all = [
            Easing::Linear,
            Easing::PowerIn(2),
            Easing::PowerOut(2),
            Easing::PowerInOut(3),
            Easing::SineIn,
            Easing::SineOut,
            Easing::SineInOut,
            Easing::CubicBezier(0.4, 0.0, 0.2, 1.0),
        ];
        for easing in all {
            assert!(easing.apply(0.0).abs() < 1e-4, "{easing} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-4, "{easing} at 1");
        }
    }

    #[test]
    fn test_power_curves() {
        // power2 is cubic
        assert!((Easing::PowerIn(2).apply(0.5) - 0.125).abs() < 1e-6);
        assert!((Easing::PowerOut(2).apply(0.5) - 0.875).abs() < 1e-6);
        assert!((Easing::PowerInOut(2).apply(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_clamps_input() {
        assert_eq!(Easing::Linear.apply(-1.0), 0.0);
        assert_eq!(Easing::Linear.apply(2.0), 1.0);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("none".parse::<Easing>().unwrap(), Easing::Linear);
        assert_eq!("power2.in".parse::<Easing>().unwrap(), Easing::PowerIn(2));
        assert_eq!("power2.out".parse::<Easing>().unwrap(), Easing::PowerOut(2));
        assert_eq!("power2".parse::<Easing>().unwrap(), Easing::PowerOut(2));
        assert_eq!("quad.inOut".parse::<Easing>().unwrap(), Easing::PowerInOut(1));
        assert_eq!("sine.inOut".parse::<Easing>().unwrap(), Easing::SineInOut);
        assert!("bounce.out".parse::<Easing>().is_err());
        assert!("power2.sideways".parse::<Easing>().is_err());
    }

    #[test]
    fn test_parse_bezier() {
        let easing: Easing = "cubic-bezier(0.25, 0.1, 0.25, 1)".parse().unwrap();
        assert_eq!(easing, Easing::CubicBezier(0.25, 0.1, 0.25, 1.0));
        assert!("cubic-bezier(2, 0, 0, 1)".parse::<Easing>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        let easing = Easing::PowerInOut(3);
        assert_eq!(easing.to_string().parse::<Easing>().unwrap(), easing);
    }

    #[test]
    fn test_bezier_is_monotonic_for_ease() {
        let ease = Easing::CubicBezier(0.25, 0.1, 0.25, 1.0);
        let mut last = 0.0;
        for i in 1..=20 {
            let v = ease.apply(i as f32 / 20.0);
            assert!(v >= last - 1e-4);
            last = v;
        }
    }
}
