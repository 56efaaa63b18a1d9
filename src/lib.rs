pub mod d3d;
pub mod math;
pub mod ply;
