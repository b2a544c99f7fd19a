//! Light placement from sky positions.
//!
//! Everything that turns an altitude/azimuth pair into a world-space vector
//! goes through [`convention::horizontal_to_direction`]. Light placement and
//! camera placement share it, so the lit side of the moon and the side the
//! camera sees can never disagree about which way is west.

pub mod convention;
pub mod resolver;

pub use convention::{direction_to_horizontal, horizontal_to_direction, UP};
pub use resolver::{observer_placement, resolve, IlluminationError, LightPlacement};
