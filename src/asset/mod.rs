//! Moon model loading.
//!
//! [`AssetLoader::load`] reads a binary glTF file in the background and
//! publishes its progress through an [`AssetHandle`]. The scene attaches the
//! model once the handle reports [`LoadState::Ready`]; until then there is no
//! body to light.

pub mod glb;
pub mod loader;

pub use glb::GlbInfo;
pub use loader::{AssetHandle, AssetLoader, LoadState, MoonAsset};
