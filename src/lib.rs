//! Channel-packing for real-time material textures.
//!
//! Individual PBR maps (base colour, roughness, metallic, emission,
//! occlusion, smoothness, alpha) are combined into the packed PNGs a
//! material type expects, named `<Material><Suffix>.png`.

#[macro_use]
pub mod i18n;
pub mod logger;

pub mod generate;
pub mod io;
pub mod material;
pub mod pack;
pub mod settings;
pub mod theme;
