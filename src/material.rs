// ============================================================================
// MATERIAL TABLE — input maps, packed outputs and per-type recipes
// ============================================================================

/// One input texture map a material can require.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapSlot {
    BaseColor,
    Roughness,
    Metallic,
    Emission,
    Occlusion,
    Smoothness,
    Alpha,
}

impl MapSlot {
    pub fn all() -> &'static [MapSlot] {
        &[
            MapSlot::BaseColor,
            MapSlot::Roughness,
            MapSlot::Metallic,
            MapSlot::Emission,
            MapSlot::Occlusion,
            MapSlot::Smoothness,
            MapSlot::Alpha,
        ]
    }

    /// Display label; the bracketed part names the channel the map lands in.
    pub fn label(&self) -> &'static str {
        match self {
            MapSlot::BaseColor => "Base Color (RGB)",
            MapSlot::Roughness => "Roughness (A)",
            MapSlot::Metallic => "Metallic (R)",
            MapSlot::Emission => "Emission (G)",
            MapSlot::Occlusion => "Occlusion (B)",
            MapSlot::Smoothness => "Smoothness (B)",
            MapSlot::Alpha => "Alpha (A)",
        }
    }

    /// Stable identifier (CLI flags, translation keys).
    pub fn key(&self) -> &'static str {
        match self {
            MapSlot::BaseColor => "base_color",
            MapSlot::Roughness => "roughness",
            MapSlot::Metallic => "metallic",
            MapSlot::Emission => "emission",
            MapSlot::Occlusion => "occlusion",
            MapSlot::Smoothness => "smoothness",
            MapSlot::Alpha => "alpha",
        }
    }

    /// Lowercase token prefixes that identify this map in a file stem
    /// (e.g. `Brick_Roughness`, `brick-ao`, `Wall_BaseColor`).
    pub fn filename_keywords(&self) -> &'static [&'static str] {
        match self {
            MapSlot::BaseColor => &["basecolor", "base", "albedo", "diffuse", "color", "colour"],
            MapSlot::Roughness => &["rough"],
            MapSlot::Metallic => &["metal"],
            MapSlot::Emission => &["emiss", "emit"],
            MapSlot::Occlusion => &["occlusion", "ambientocclusion", "ao"],
            MapSlot::Smoothness => &["smooth", "gloss"],
            MapSlot::Alpha => &["alpha", "opacity", "mask", "transparency"],
        }
    }

    /// Guess which map a file stem holds.
    ///
    /// Tokens are scanned from the end so the trailing map tag wins over the
    /// material name (`MetalPanel_Roughness` is roughness, not metallic).
    pub fn from_file_stem(stem: &str) -> Option<MapSlot> {
        let lower = stem.to_lowercase();
        let tokens: Vec<&str> = lower
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();
        tokens.iter().rev().find_map(|token| {
            Self::all()
                .iter()
                .copied()
                .find(|slot| slot.filename_keywords().iter().any(|kw| token.starts_with(kw)))
        })
    }

    /// True for maps that are read as a single grayscale channel.
    pub fn is_grayscale(&self) -> bool {
        !matches!(self, MapSlot::BaseColor)
    }
}

impl std::fmt::Display for MapSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// PACKED OUTPUTS
// ============================================================================

/// One generated PNG. Declaration order is generation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PackedOutput {
    /// RGB = base color, A = roughness
    Br,
    /// R = metallic, G = emission, B = occlusion
    Meo,
    /// Base color as-is
    B,
    /// RGB = base color, A = alpha
    Ba,
    /// R = metallic, G = emission, B = smoothness, A = alpha
    Mesa,
}

impl PackedOutput {
    pub fn all() -> &'static [PackedOutput] {
        &[
            PackedOutput::Br,
            PackedOutput::Meo,
            PackedOutput::B,
            PackedOutput::Ba,
            PackedOutput::Mesa,
        ]
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            PackedOutput::Br => "_BR",
            PackedOutput::Meo => "_MEO",
            PackedOutput::B => "_B",
            PackedOutput::Ba => "_BA",
            PackedOutput::Mesa => "_MESA",
        }
    }

    /// Maps read by this output, in channel order.
    pub fn sources(&self) -> &'static [MapSlot] {
        match self {
            PackedOutput::Br => &[MapSlot::BaseColor, MapSlot::Roughness],
            PackedOutput::Meo => &[MapSlot::Metallic, MapSlot::Emission, MapSlot::Occlusion],
            PackedOutput::B => &[MapSlot::BaseColor],
            PackedOutput::Ba => &[MapSlot::BaseColor, MapSlot::Alpha],
            PackedOutput::Mesa => &[
                MapSlot::Metallic,
                MapSlot::Emission,
                MapSlot::Smoothness,
                MapSlot::Alpha,
            ],
        }
    }

    /// `"{material_name}{suffix}.png"`
    pub fn file_name(&self, material_name: &str) -> String {
        format!("{}{}.png", material_name, self.suffix())
    }
}

// ============================================================================
// MATERIAL TYPES
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum MaterialType {
    #[default]
    Standard,
    Metal,
    Unlit,
    UnlitBlend,
    Transparent,
    Masked,
    Uio,
}

impl MaterialType {
    pub fn all() -> &'static [MaterialType] {
        &[
            MaterialType::Standard,
            MaterialType::Metal,
            MaterialType::Unlit,
            MaterialType::UnlitBlend,
            MaterialType::Transparent,
            MaterialType::Masked,
            MaterialType::Uio,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            MaterialType::Standard => "Standard Image",
            MaterialType::Metal => "Metal Image",
            MaterialType::Unlit => "Unlit Image",
            MaterialType::UnlitBlend => "Unlit Blend Image",
            MaterialType::Transparent => "Transparent Image",
            MaterialType::Masked => "Masked Image",
            MaterialType::Uio => "UIO Image (Animated)",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            MaterialType::Standard => "standard",
            MaterialType::Metal => "metal",
            MaterialType::Unlit => "unlit",
            MaterialType::UnlitBlend => "unlit-blend",
            MaterialType::Transparent => "transparent",
            MaterialType::Masked => "masked",
            MaterialType::Uio => "uio",
        }
    }

    /// Parse a key (`unlit-blend`) or a display label (`Unlit Blend Image`),
    /// ignoring case. Underscores are accepted in place of dashes.
    pub fn from_key(s: &str) -> Option<MaterialType> {
        let needle = s.trim().to_lowercase().replace('_', "-");
        Self::all()
            .iter()
            .copied()
            .find(|t| t.key() == needle || t.label().to_lowercase() == needle)
    }

    pub fn inputs(&self) -> &'static [MapSlot] {
        match self {
            MaterialType::Standard => &[MapSlot::BaseColor, MapSlot::Roughness],
            MaterialType::Metal => &[
                MapSlot::BaseColor,
                MapSlot::Roughness,
                MapSlot::Metallic,
                MapSlot::Emission,
                MapSlot::Occlusion,
            ],
            MaterialType::Unlit => &[MapSlot::BaseColor],
            MaterialType::UnlitBlend => &[MapSlot::BaseColor, MapSlot::Alpha],
            MaterialType::Transparent => &[
                MapSlot::BaseColor,
                MapSlot::Roughness,
                MapSlot::Metallic,
                MapSlot::Emission,
                MapSlot::Smoothness,
                MapSlot::Alpha,
            ],
            MaterialType::Masked => &[MapSlot::BaseColor, MapSlot::Alpha],
            MaterialType::Uio => &[MapSlot::BaseColor, MapSlot::Alpha],
        }
    }

    pub fn outputs(&self) -> &'static [PackedOutput] {
        match self {
            MaterialType::Standard => &[PackedOutput::Br],
            MaterialType::Metal => &[PackedOutput::Br, PackedOutput::Meo],
            MaterialType::Unlit => &[PackedOutput::B],
            MaterialType::UnlitBlend => &[PackedOutput::Ba],
            MaterialType::Transparent => &[PackedOutput::Br, PackedOutput::Mesa],
            MaterialType::Masked => &[PackedOutput::Ba],
            MaterialType::Uio => &[PackedOutput::Ba],
        }
    }

    /// Suffix the Blender material must carry for the importer to pick the
    /// right shading model.
    pub fn blender_suffix(&self) -> &'static str {
        match self {
            MaterialType::Standard | MaterialType::Metal => "",
            MaterialType::Unlit => "_Unlit",
            MaterialType::UnlitBlend => "_Blend",
            MaterialType::Transparent => "_Transparent",
            MaterialType::Masked => "_Masked",
            MaterialType::Uio => "_UIO",
        }
    }

    /// Required Blender material name, or `None` while the name is blank.
    pub fn blender_name(&self, base_name: &str) -> Option<String> {
        let base = base_name.trim();
        if base.is_empty() {
            return None;
        }
        Some(format!("{}{}", base, self.blender_suffix()))
    }
}

impl std::fmt::Display for MaterialType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_output_source_is_a_required_input() {
        for ty in MaterialType::all() {
            for out in ty.outputs() {
                for slot in out.sources() {
                    assert!(
                        ty.inputs().contains(slot),
                        "{} output {} reads {} which is not required",
                        ty,
                        out.suffix(),
                        slot
                    );
                }
            }
        }
    }

    #[test]
    fn outputs_are_listed_in_generation_order() {
        for ty in MaterialType::all() {
            let outs = ty.outputs();
            assert!(outs.windows(2).all(|w| w[0] < w[1]), "{}", ty);
        }
    }

    #[test]
    fn metal_recipe_matches_table() {
        let ty = MaterialType::Metal;
        assert_eq!(ty.outputs(), &[PackedOutput::Br, PackedOutput::Meo]);
        assert_eq!(ty.inputs().len(), 5);
        assert_eq!(ty.blender_suffix(), "");
    }

    #[test]
    fn blender_name_trims_and_appends_suffix() {
        assert_eq!(
            MaterialType::Transparent.blender_name("  Glass "),
            Some("Glass_Transparent".to_string())
        );
        assert_eq!(MaterialType::Standard.blender_name("Brick"), Some("Brick".to_string()));
        assert_eq!(MaterialType::Uio.blender_name("   "), None);
    }

    #[test]
    fn from_key_accepts_keys_and_labels() {
        assert_eq!(MaterialType::from_key("unlit-blend"), Some(MaterialType::UnlitBlend));
        assert_eq!(MaterialType::from_key("UNLIT_BLEND"), Some(MaterialType::UnlitBlend));
        assert_eq!(MaterialType::from_key("Metal Image"), Some(MaterialType::Metal));
        assert_eq!(MaterialType::from_key("uio image (animated)"), Some(MaterialType::Uio));
        assert_eq!(MaterialType::from_key("glossy"), None);
    }

    #[test]
    fn file_stems_are_classified_by_trailing_tag() {
        assert_eq!(MapSlot::from_file_stem("Brick_Roughness"), Some(MapSlot::Roughness));
        assert_eq!(MapSlot::from_file_stem("MetalPanel_BaseColor"), Some(MapSlot::BaseColor));
        assert_eq!(MapSlot::from_file_stem("metal_panel_AO"), Some(MapSlot::Occlusion));
        assert_eq!(MapSlot::from_file_stem("wall-albedo"), Some(MapSlot::BaseColor));
        assert_eq!(MapSlot::from_file_stem("leaf opacity 2k"), Some(MapSlot::Alpha));
        assert_eq!(MapSlot::from_file_stem("notes"), None);
    }

    #[test]
    fn output_file_names_use_suffix() {
        assert_eq!(PackedOutput::Mesa.file_name("Window"), "Window_MESA.png");
        assert_eq!(PackedOutput::B.file_name("Sky"), "Sky_B.png");
    }
}
