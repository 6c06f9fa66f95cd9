pub mod angles;
pub mod geodesy;
pub mod search;

pub use angles::{interpolate_heading, normalize_heading, shortest_arc};
pub use geodesy::{destination_point, EARTH_RADIUS_METERS};
pub use search::{bracket, Bracket};
