//! Accessors generated from `params.toml` at build time.

/// Upper bound referenced symbolically by the descriptors.
pub const INT_MAX: i32 = i32::MAX;

///
/// Placement
///

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Placement {
    pub position: [f64; 3],
    pub scale: f64,
}

impl Placement {
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            position: [0.0; 3],
            scale: 1.0,
        }
    }
}

paramkit::include_params!();
