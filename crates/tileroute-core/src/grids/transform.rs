//! The affine layer-to-map transform shared by every cell grid.

use kurbo::{Affine, Point};

use crate::error::GridError;
use crate::geom::ExactModelCoordinate;

/// Rotation, scale and shift of a grid, plus the cached forward and inverse
/// matrices derived from them.
///
/// Map coordinates are obtained by scaling, then rotating, then shifting
/// layer coordinates. Elevation is only shifted. The transform is validated
/// whenever a parameter changes, so a `GridTransform` value always has an
/// invertible matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct GridTransform {
    rotation: f64,
    x_scale: f64,
    y_scale: f64,
    x_shift: f64,
    y_shift: f64,
    z_shift: f64,
    matrix: Affine,
    inverse: Affine,
}

impl Default for GridTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl GridTransform {
    /// The identity transform.
    pub fn new() -> Self {
        Self {
            rotation: 0.0,
            x_scale: 1.0,
            y_scale: 1.0,
            x_shift: 0.0,
            y_shift: 0.0,
            z_shift: 0.0,
            matrix: Affine::IDENTITY,
            inverse: Affine::IDENTITY,
        }
    }

    /// Build a transform from all parameters at once.
    pub fn from_parts(
        rotation: f64,
        x_scale: f64,
        y_scale: f64,
        x_shift: f64,
        y_shift: f64,
        z_shift: f64,
    ) -> Result<Self, GridError> {
        let mut t = Self {
            rotation,
            x_scale,
            y_scale,
            x_shift,
            y_shift,
            z_shift,
            ..Self::new()
        };
        t.rebuild()?;
        Ok(t)
    }

    /// Rotation in degrees.
    #[inline]
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    #[inline]
    pub fn x_scale(&self) -> f64 {
        self.x_scale
    }

    #[inline]
    pub fn y_scale(&self) -> f64 {
        self.y_scale
    }

    #[inline]
    pub fn x_shift(&self) -> f64 {
        self.x_shift
    }

    #[inline]
    pub fn y_shift(&self) -> f64 {
        self.y_shift
    }

    #[inline]
    pub fn z_shift(&self) -> f64 {
        self.z_shift
    }

    /// Determinant of the forward matrix. Never zero.
    #[inline]
    pub fn determinant(&self) -> f64 {
        self.matrix.determinant()
    }

    /// Set the rotation in degrees.
    pub fn set_rotation(&mut self, rotation: f64) -> Result<(), GridError> {
        self.update(|t| t.rotation = rotation)
    }

    /// Set the same scale on both axes.
    pub fn set_scale(&mut self, scale: f64) -> Result<(), GridError> {
        self.update(|t| {
            t.x_scale = scale;
            t.y_scale = scale;
        })
    }

    pub fn set_x_scale(&mut self, scale: f64) -> Result<(), GridError> {
        self.update(|t| t.x_scale = scale)
    }

    pub fn set_y_scale(&mut self, scale: f64) -> Result<(), GridError> {
        self.update(|t| t.y_scale = scale)
    }

    pub fn set_x_shift(&mut self, shift: f64) -> Result<(), GridError> {
        self.update(|t| t.x_shift = shift)
    }

    pub fn set_y_shift(&mut self, shift: f64) -> Result<(), GridError> {
        self.update(|t| t.y_shift = shift)
    }

    pub fn set_z_shift(&mut self, shift: f64) -> Result<(), GridError> {
        self.update(|t| t.z_shift = shift)
    }

    /// Apply the forward transform (layer space to map space).
    #[inline]
    pub fn apply(&self, p: ExactModelCoordinate) -> ExactModelCoordinate {
        let q = self.matrix * Point::new(p.x, p.y);
        ExactModelCoordinate::new_3d(q.x, q.y, p.z + self.z_shift)
    }

    /// Apply the inverse transform (map space to layer space).
    #[inline]
    pub fn apply_inverse(&self, p: ExactModelCoordinate) -> ExactModelCoordinate {
        let q = self.inverse * Point::new(p.x, p.y);
        ExactModelCoordinate::new_3d(q.x, q.y, p.z - self.z_shift)
    }

    /// Apply `change` to a copy, validate it, and only then commit it.
    fn update(&mut self, change: impl FnOnce(&mut Self)) -> Result<(), GridError> {
        let mut next = self.clone();
        change(&mut next);
        next.rebuild()?;
        *self = next;
        Ok(())
    }

    fn rebuild(&mut self) -> Result<(), GridError> {
        for (name, value) in [
            ("rotation", self.rotation),
            ("x_scale", self.x_scale),
            ("y_scale", self.y_scale),
            ("x_shift", self.x_shift),
            ("y_shift", self.y_shift),
            ("z_shift", self.z_shift),
        ] {
            if !value.is_finite() {
                return Err(GridError::NonFiniteParameter { name, value });
            }
        }
        let matrix = Affine::translate((self.x_shift, self.y_shift))
            * Affine::rotate(self.rotation.to_radians())
            * Affine::scale_non_uniform(self.x_scale, self.y_scale);
        let determinant = matrix.determinant();
        if determinant == 0.0 || !determinant.is_finite() {
            return Err(GridError::SingularTransform { determinant });
        }
        self.matrix = matrix;
        self.inverse = matrix.inverse();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_round_trip() {
        let t = GridTransform::new();
        let p = ExactModelCoordinate::new_3d(2.5, -1.0, 3.0);
        assert!(t.apply(p).approx_eq(p, 1e-12));
        assert!(t.apply_inverse(p).approx_eq(p, 1e-12));
    }

    #[test]
    fn scale_rotate_shift_order() {
        let t = GridTransform::from_parts(90.0, 2.0, 3.0, 10.0, 20.0, 1.0).unwrap();
        // (1, 0) scaled to (2, 0), rotated to (0, 2), shifted to (10, 22).
        let q = t.apply(ExactModelCoordinate::new(1.0, 0.0));
        assert!(q.approx_eq(ExactModelCoordinate::new_3d(10.0, 22.0, 1.0), 1e-9));
        let back = t.apply_inverse(q);
        assert!(back.approx_eq(ExactModelCoordinate::new(1.0, 0.0), 1e-9));
    }

    #[test]
    fn zero_scale_is_rejected() {
        let err = GridTransform::from_parts(0.0, 0.0, 1.0, 0.0, 0.0, 0.0).unwrap_err();
        assert!(matches!(err, GridError::SingularTransform { .. }));
    }

    #[test]
    fn failed_setter_keeps_previous_state() {
        let mut t = GridTransform::new();
        t.set_scale(2.0).unwrap();
        assert!(t.set_y_scale(0.0).is_err());
        assert_eq!(t.y_scale(), 2.0);
        assert!((t.determinant() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn non_finite_parameter_is_rejected() {
        let mut t = GridTransform::new();
        let err = t.set_x_shift(f64::NAN).unwrap_err();
        assert!(matches!(err, GridError::NonFiniteParameter { name: "x_shift", .. }));
    }
}
