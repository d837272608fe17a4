//! Errors raised while configuring grids and layers.

use thiserror::Error;

/// Errors that can occur when building or reconfiguring a cell grid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// The layer-to-map transform cannot be inverted.
    #[error("grid transform is singular (determinant {determinant})")]
    SingularTransform { determinant: f64 },
    /// A transform parameter is NaN or infinite.
    #[error("grid parameter `{name}` must be finite, got {value}")]
    NonFiniteParameter { name: &'static str, value: f64 },
    /// No grid implementation is registered under this type name.
    #[error("unknown cell grid type \u{201c}{0}\u{201d}")]
    UnknownGridType(String),
}
