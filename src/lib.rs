//! Lunalight - a moon scene lit the way the real moon is lit
//!
//! Given a date and an observer location, the [`astro`] module finds where the
//! sun and moon stand in the observer's sky, [`illumination`] turns that into a
//! light placement around the rendered moon, and [`scene`] applies it.

pub mod core;
pub mod astro;
pub mod illumination;
pub mod scene;
pub mod asset;
