use serde::Deserialize;

/// Side of a rectangular domain a boundary edge lies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPosition {
    Lower,
    Right,
    Upper,
    Left,
}
impl BoundaryPosition {
    pub const ALL: [BoundaryPosition; 4] = [
        BoundaryPosition::Lower,
        BoundaryPosition::Right,
        BoundaryPosition::Upper,
        BoundaryPosition::Left,
    ];
}

/// Key a boundary condition is registered under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryTag {
    /// Every boundary face of the mesh.
    All,
    Position(BoundaryPosition),
}
