//! Axis-aligned sampling domains.

use std::fmt;

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SampleResult};

/// A coordinate axis of the sampling domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    /// The x axis.
    X,
    /// The y axis.
    Y,
    /// The z axis.
    Z,
}

impl Axis {
    /// All three axes in x, y, z order.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Unit vector along this axis.
    #[must_use]
    pub fn unit(self) -> Vector3<f64> {
        match self {
            Self::X => Vector3::x(),
            Self::Y => Vector3::y(),
            Self::Z => Vector3::z(),
        }
    }

    /// Component of a vector along this axis.
    #[must_use]
    pub fn component_of(self, v: &Vector3<f64>) -> f64 {
        match self {
            Self::X => v.x,
            Self::Y => v.y,
            Self::Z => v.z,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "x"),
            Self::Y => write!(f, "y"),
            Self::Z => write!(f, "z"),
        }
    }
}

/// An axis-aligned box in world space over which a field is sampled.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Domain {
    /// Minimum corner.
    pub min: Point3<f64>,
    /// Maximum corner.
    pub max: Point3<f64>,
}

impl Domain {
    /// Create a domain spanning `[0, size]` along each axis.
    ///
    /// # Example
    ///
    /// ```
    /// use field_sample::Domain;
    ///
    /// let domain = Domain::from_size(50.0, 50.0, 25.0);
    /// assert_eq!(domain.size().z, 25.0);
    /// ```
    #[must_use]
    pub fn from_size(size_x: f64, size_y: f64, size_z: f64) -> Self {
        Self {
            min: Point3::origin(),
            max: Point3::new(size_x, size_y, size_z),
        }
    }

    /// Create a domain from explicit corners.
    #[must_use]
    pub const fn from_bounds(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Extent along each axis.
    #[must_use]
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Extent along one axis.
    #[must_use]
    pub fn extent(&self, axis: Axis) -> f64 {
        axis.component_of(&self.size())
    }

    /// Box volume.
    #[must_use]
    pub fn volume(&self) -> f64 {
        let size = self.size();
        size.x * size.y * size.z
    }

    /// Center point of the box.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Whether a point lies inside the box, faces inclusive.
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Check that the corners are finite and the box has positive extent
    /// along every axis.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDomain`] for non-finite corners or a
    /// flat or inverted box.
    pub fn validate(&self) -> SampleResult<()> {
        let corners = [
            self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z,
        ];
        if corners.iter().any(|c| !c.is_finite()) {
            return Err(ConfigError::InvalidDomain {
                reason: "corner coordinates must be finite".to_string(),
            });
        }

        let size = self.size();
        if size.x <= 0.0 || size.y <= 0.0 || size.z <= 0.0 {
            return Err(ConfigError::InvalidDomain {
                reason: format!(
                    "extents must be positive, got {} x {} x {}",
                    size.x, size.y, size.z
                ),
            });
        }

        Ok(())
    }
}
