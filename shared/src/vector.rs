use serde::{Deserialize, Serialize};

///Represents a vector in 2D space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vector2 {
    ///Value along the x-axis.
    /// Positive direction is to the right.
    pub x: f32,
    ///Value along the y-axis.
    /// Positive direction is down (screen coordinates).
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    ///Returns the sum of two vectors.
    pub fn add(&self, other: &Vector2) -> Vector2 {
        Vector2 {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    ///Returns the difference of two vectors.
    pub fn sub(&self, other: &Vector2) -> Vector2 {
        Vector2 {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    ///Returns the scaled vector.
    pub fn scale(&self, scalar: f32) -> Vector2 {
        Vector2 {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }

    pub fn dot(&self, other: &Vector2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn length_squared(&self) -> f32 {
        self.dot(self)
    }

    ///Returns the magnitude of the vector.
    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn distance_squared(&self, other: &Vector2) -> f32 {
        self.sub(other).length_squared()
    }

    pub fn distance(&self, other: &Vector2) -> f32 {
        self.distance_squared(other).sqrt()
    }

    ///Returns the normalized vector. The zero vector stays zero.
    pub fn unit(&self) -> Vector2 {
        let length = self.length();
        if length == 0.0 {
            Vector2::ZERO
        } else {
            Vector2 {
                x: self.x / length,
                y: self.y / length,
            }
        }
    }
}

impl From<[f32; 2]> for Vector2 {
    fn from([x, y]: [f32; 2]) -> Self {
        Vector2 { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_vector_arithmetic() {
        let a = Vector2::new(3.0, 4.0);
        let b = Vector2::new(1.0, -2.0);

        assert_eq!(a.add(&b), Vector2::new(4.0, 2.0));
        assert_eq!(a.sub(&b), Vector2::new(2.0, 6.0));
        assert_eq!(a.scale(2.0), Vector2::new(6.0, 8.0));
        assert_eq!(a.dot(&b), -5.0);
        assert_eq!(a.length(), 5.0);
        assert_eq!(a.distance_squared(&b), 40.0);
    }

    #[test]
    fn test_unit_vector() {
        let unit = Vector2::new(3.0, 4.0).unit();
        assert_approx_eq!(unit.x, 0.6, 1e-6);
        assert_approx_eq!(unit.y, 0.8, 1e-6);
        assert_approx_eq!(unit.length(), 1.0, 1e-6);
    }

    #[test]
    fn test_unit_of_zero_vector_is_zero() {
        assert_eq!(Vector2::ZERO.unit(), Vector2::ZERO);
    }
}
