//! Fixed-size 2D and 3D vectors
//!
//! Both store their components inline and are never partitioned across a
//! pool: every `par_*` entry point runs on the calling thread.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use super::Vector;

/// Two-component vector
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector2d([f64; 2]);

/// Three-component vector
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector3d([f64; 3]);

impl Vector2d {
    pub fn new(x: f64, y: f64) -> Self {
        Self([x, y])
    }

    pub fn x(&self) -> f64 {
        self.0[0]
    }

    pub fn y(&self) -> f64 {
        self.0[1]
    }

    /// Counter-clockwise rotation by `radians`
    pub fn rotate(&self, radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self([
            self.x() * cos - self.y() * sin,
            self.x() * sin + self.y() * cos,
        ])
    }

    pub fn self_rotate(&mut self, radians: f64) {
        *self = self.rotate(radians);
    }

    /// Polar angle measured counter-clockwise from the positive x axis
    pub fn angle_from_x_axis(&self) -> f64 {
        self.y().atan2(self.x())
    }
}

impl Vector3d {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self([x, y, z])
    }

    pub fn x(&self) -> f64 {
        self.0[0]
    }

    pub fn y(&self) -> f64 {
        self.0[1]
    }

    pub fn z(&self) -> f64 {
        self.0[2]
    }

    /// Right-handed cross product
    pub fn cross(&self, other: &Self) -> Self {
        let [a1, a2, a3] = self.0;
        let [b1, b2, b3] = other.0;
        Self([a2 * b3 - a3 * b2, a3 * b1 - a1 * b3, a1 * b2 - a2 * b1])
    }
}

macro_rules! impl_fixed_vector {
    ($ty:ident, $n:literal) => {
        impl Vector for $ty {
            const PARTITIONED: bool = false;

            fn size(&self) -> usize {
                $n
            }

            fn as_slice(&self) -> &[f64] {
                &self.0
            }

            fn as_mut_slice(&mut self) -> &mut [f64] {
                &mut self.0
            }

            fn zeros_like(&self) -> Self {
                Self::default()
            }
        }

        impl From<[f64; $n]> for $ty {
            fn from(components: [f64; $n]) -> Self {
                Self(components)
            }
        }

        impl Add for $ty {
            type Output = Self;

            fn add(self, rhs: Self) -> Self {
                Self(std::array::from_fn(|i| self.0[i] + rhs.0[i]))
            }
        }

        impl Sub for $ty {
            type Output = Self;

            fn sub(self, rhs: Self) -> Self {
                Self(std::array::from_fn(|i| self.0[i] - rhs.0[i]))
            }
        }

        impl Neg for $ty {
            type Output = Self;

            fn neg(self) -> Self {
                Self(self.0.map(|x| -x))
            }
        }

        impl Mul<f64> for $ty {
            type Output = Self;

            fn mul(self, factor: f64) -> Self {
                Self(self.0.map(|x| x * factor))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let parts: Vec<String> = self.0.iter().map(|x| format!("{x:.3}")).collect();
                write!(f, "({})", parts.join(", "))
            }
        }
    };
}

impl_fixed_vector!(Vector2d, 2);
impl_fixed_vector!(Vector3d, 3);

#[cfg(test)]
mod tests {
    use super::*;
    use parla_exec::ThreadPool;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_rotate_quarter_turn() {
        let v = Vector2d::new(1.0, 0.0).rotate(FRAC_PI_2);
        assert!(v.approx_eq(&Vector2d::new(0.0, 1.0), 1e-12));

        let mut w = Vector2d::new(0.0, 2.0);
        w.self_rotate(FRAC_PI_2);
        assert!(w.approx_eq(&Vector2d::new(-2.0, 0.0), 1e-12));
    }

    #[test]
    fn test_angle_from_x_axis() {
        assert_eq!(Vector2d::new(1.0, 0.0).angle_from_x_axis(), 0.0);
        assert!((Vector2d::new(0.0, 3.0).angle_from_x_axis() - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_cross_product() {
        let x = Vector3d::new(1.0, 0.0, 0.0);
        let y = Vector3d::new(0.0, 1.0, 0.0);
        assert_eq!(x.cross(&y), Vector3d::new(0.0, 0.0, 1.0));
        assert_eq!(y.cross(&x), Vector3d::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_operators() {
        let a = Vector3d::new(1.0, 2.0, 3.0);
        let b = Vector3d::new(0.5, 0.5, 0.5);
        assert_eq!(a + b, Vector3d::new(1.5, 2.5, 3.5));
        assert_eq!(a - b, Vector3d::new(0.5, 1.5, 2.5));
        assert_eq!(-a, Vector3d::new(-1.0, -2.0, -3.0));
        assert_eq!(a * 2.0, Vector3d::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn test_parallel_entry_points_degrade() {
        let pool = ThreadPool::new(2).unwrap();
        let a = Vector2d::new(1.0, 2.0);
        let b = Vector2d::new(3.0, 4.0);
        assert_eq!(a.par_add(&b, &pool).unwrap(), Vector2d::new(4.0, 6.0));
        assert_eq!(a.par_dot(&b, &pool).unwrap(), 11.0);
        assert_eq!(a.par_hadamard(&b, &pool).unwrap(), Vector2d::new(3.0, 8.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(Vector2d::new(1.0, 0.5).to_string(), "(1.000, 0.500)");
    }
}
