// ============================================================================
// GENERATION PIPELINE — validate a request, then write every packed output
// ============================================================================

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::io::{load_gray, load_rgb, save_png_rgb, save_png_rgba, write_base_copy};
use crate::material::{MapSlot, MaterialType, PackedOutput};
use crate::pack::{self, PackError};
use crate::{log_err, log_info};

/// Characters that cannot appear in an output file name on any desktop OS.
const FORBIDDEN_NAME_CHARS: &[char] = &['/', '\\', '<', '>', ':', '"', '|', '?', '*'];

/// Everything needed to produce one material's packed files.
#[derive(Clone, Debug, Default)]
pub struct GenerationRequest {
    pub material_name: String,
    pub material_type: MaterialType,
    pub inputs: BTreeMap<MapSlot, PathBuf>,
    pub output_dir: PathBuf,
}

/// Files written by a successful run, in generation order.
#[derive(Clone, Debug, Default)]
pub struct GenerationReport {
    pub saved: Vec<PathBuf>,
}

impl GenerationReport {
    /// One `"Saved: <file name>"` line per written file.
    pub fn summary_lines(&self) -> Vec<String> {
        saved_lines(&self.saved)
    }
}

fn saved_lines(saved: &[PathBuf]) -> Vec<String> {
    saved
        .iter()
        .map(|p| {
            let name = p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            format!("Saved: {}", name)
        })
        .collect()
}

#[derive(Debug)]
pub enum GenerateError {
    EmptyName,
    InvalidName(char),
    MissingInputs(Vec<MapSlot>),
    MissingOutputDir(PathBuf),
    /// An output failed; files listed in `saved` were already written.
    Failed {
        output: PackedOutput,
        saved: Vec<PathBuf>,
        source: PackError,
    },
}

impl std::fmt::Display for GenerateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerateError::EmptyName => write!(f, "Please enter a material name."),
            GenerateError::InvalidName(c) => {
                write!(f, "The material name cannot contain {:?}.", c)
            }
            GenerateError::MissingInputs(slots) => {
                let names: Vec<&str> = slots.iter().map(|s| s.label()).collect();
                write!(
                    f,
                    "Please provide all required images for this material type (missing: {}).",
                    names.join(", ")
                )
            }
            GenerateError::MissingOutputDir(dir) => {
                write!(f, "Output folder does not exist: {}", dir.display())
            }
            GenerateError::Failed { output, source, .. } => {
                write!(f, "Generating {} failed: {}", output.suffix(), source)
            }
        }
    }
}

impl std::error::Error for GenerateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenerateError::Failed { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl GenerateError {
    /// Files written before the failure (empty for validation errors).
    pub fn saved(&self) -> &[PathBuf] {
        match self {
            GenerateError::Failed { saved, .. } => saved,
            _ => &[],
        }
    }

    pub fn is_validation(&self) -> bool {
        !matches!(self, GenerateError::Failed { .. })
    }
}

impl GenerationRequest {
    pub fn new(material_name: &str, material_type: MaterialType, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            material_name: material_name.to_string(),
            material_type,
            inputs: BTreeMap::new(),
            output_dir: output_dir.into(),
        }
    }

    pub fn with_input(mut self, slot: MapSlot, path: impl Into<PathBuf>) -> Self {
        self.inputs.insert(slot, path.into());
        self
    }

    /// The trimmed material name used in output file names.
    pub fn name(&self) -> &str {
        self.material_name.trim()
    }

    /// Required slots that have no file assigned, in table order.
    pub fn missing_inputs(&self) -> Vec<MapSlot> {
        self.material_type
            .inputs()
            .iter()
            .copied()
            .filter(|s| !self.inputs.contains_key(s))
            .collect()
    }

    /// Check the name and inputs only; the output folder is chosen later
    /// in the GUI flow.
    pub fn validate_inputs(&self) -> Result<(), GenerateError> {
        let name = self.name();
        if name.is_empty() {
            return Err(GenerateError::EmptyName);
        }
        if let Some(c) = name
            .chars()
            .find(|c| FORBIDDEN_NAME_CHARS.contains(c) || c.is_control())
        {
            return Err(GenerateError::InvalidName(c));
        }
        let missing = self.missing_inputs();
        if !missing.is_empty() {
            return Err(GenerateError::MissingInputs(missing));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), GenerateError> {
        self.validate_inputs()?;
        if !self.output_dir.is_dir() {
            return Err(GenerateError::MissingOutputDir(self.output_dir.clone()));
        }
        Ok(())
    }

    /// Output paths in generation order.
    pub fn planned_outputs(&self) -> Vec<(PackedOutput, PathBuf)> {
        self.material_type
            .outputs()
            .iter()
            .map(|o| (*o, self.output_dir.join(o.file_name(self.name()))))
            .collect()
    }

    /// Planned outputs that already exist and would be overwritten.
    pub fn existing_outputs(&self) -> Vec<PathBuf> {
        self.planned_outputs()
            .into_iter()
            .map(|(_, p)| p)
            .filter(|p| p.exists())
            .collect()
    }

    /// Validate, then write every output of the material type.
    /// Stops at the first failure.
    pub fn run(&self) -> Result<GenerationReport, GenerateError> {
        self.validate()?;
        log_info!(
            "Generating '{}' ({}) into {}",
            self.name(),
            self.material_type.label(),
            self.output_dir.display()
        );

        let mut saved = Vec::new();
        for (output, path) in self.planned_outputs() {
            match self.write_output(output, &path) {
                Ok(()) => {
                    log_info!("Saved {}", path.display());
                    saved.push(path);
                }
                Err(source) => {
                    log_err!("{} failed: {}", output.suffix(), source);
                    return Err(GenerateError::Failed {
                        output,
                        saved,
                        source,
                    });
                }
            }
        }
        Ok(GenerationReport { saved })
    }

    fn input(&self, slot: MapSlot) -> &Path {
        // validate() guarantees every required slot is present
        self.inputs
            .get(&slot)
            .map(PathBuf::as_path)
            .unwrap_or_else(|| Path::new(""))
    }

    fn write_output(&self, output: PackedOutput, path: &Path) -> Result<(), PackError> {
        use MapSlot::*;
        match output {
            PackedOutput::Br => {
                let base = load_rgb(self.input(BaseColor))?;
                let rough = load_gray(self.input(Roughness))?;
                save_png_rgba(&pack::pack_br(&base, &rough)?, path)
            }
            PackedOutput::Meo => {
                let m = load_gray(self.input(Metallic))?;
                let e = load_gray(self.input(Emission))?;
                let o = load_gray(self.input(Occlusion))?;
                save_png_rgb(&pack::pack_meo(&m, &e, &o)?, path)
            }
            PackedOutput::B => write_base_copy(self.input(BaseColor), path),
            PackedOutput::Ba => {
                let base = load_rgb(self.input(BaseColor))?;
                let alpha = load_gray(self.input(Alpha))?;
                save_png_rgba(&pack::pack_ba(&base, &alpha)?, path)
            }
            PackedOutput::Mesa => {
                let m = load_gray(self.input(Metallic))?;
                let e = load_gray(self.input(Emission))?;
                let s = load_gray(self.input(Smoothness))?;
                let a = load_gray(self.input(Alpha))?;
                save_png_rgba(&pack::pack_mesa(&m, &e, &s, &a)?, path)
            }
        }
    }
}

/// Sizes of the assigned maps that one output would combine, when they
/// disagree. Used for advisory warnings before generation.
pub fn size_conflicts(
    material_type: MaterialType,
    sizes: &BTreeMap<MapSlot, (u32, u32)>,
) -> Vec<(PackedOutput, Vec<(MapSlot, (u32, u32))>)> {
    material_type
        .outputs()
        .iter()
        .filter_map(|out| {
            let known: Vec<(MapSlot, (u32, u32))> = out
                .sources()
                .iter()
                .filter_map(|s| sizes.get(s).map(|d| (*s, *d)))
                .collect();
            let first = known.first()?.1;
            if known.iter().any(|(_, d)| *d != first) {
                Some((*out, known))
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    fn write_gray(dir: &Path, name: &str, w: u32, h: u32, v: u8) -> PathBuf {
        let p = dir.join(name);
        GrayImage::from_pixel(w, h, Luma([v])).save(&p).unwrap();
        p
    }

    fn write_rgb(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
        let p = dir.join(name);
        RgbImage::from_pixel(w, h, Rgb([200, 100, 50])).save(&p).unwrap();
        p
    }

    #[test]
    fn empty_name_is_rejected_first() {
        let req = GenerationRequest::new("   ", MaterialType::Standard, "/nonexistent");
        assert!(matches!(req.validate(), Err(GenerateError::EmptyName)));
    }

    #[test]
    fn path_characters_in_name_are_rejected() {
        for (name, bad) in [
            ("bad/name", '/'),
            ("bad\\name", '\\'),
            ("C:name", ':'),
            ("wild*", '*'),
            ("tab\tname", '\t'),
        ] {
            let req = GenerationRequest::new(name, MaterialType::Unlit, ".");
            match req.validate_inputs() {
                Err(GenerateError::InvalidName(c)) => assert_eq!(c, bad, "{name:?}"),
                other => panic!("{name:?}: unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn bad_name_is_reported_before_missing_maps() {
        let req = GenerationRequest::new("Brick?", MaterialType::Metal, ".");
        assert_eq!(req.missing_inputs().len(), MaterialType::Metal.inputs().len());
        assert!(matches!(req.validate_inputs(), Err(GenerateError::InvalidName('?'))));
    }

    #[test]
    fn unlit_output_over_its_own_source_fails_without_damage() {
        let dir = tempfile::tempdir().unwrap();
        let d = dir.path();
        let base = write_rgb(d, "Sky_B.png", 3, 3);
        let before = std::fs::read(&base).unwrap();

        let err = GenerationRequest::new("Sky", MaterialType::Unlit, d)
            .with_input(MapSlot::BaseColor, &base)
            .run()
            .unwrap_err();

        assert!(matches!(
            err,
            GenerateError::Failed {
                output: PackedOutput::B,
                source: PackError::SameFile(_),
                ..
            }
        ));
        assert!(err.saved().is_empty());
        assert_eq!(std::fs::read(&base).unwrap(), before);
    }

    #[test]
    fn missing_inputs_are_listed_in_table_order() {
        let req = GenerationRequest::new("Brick", MaterialType::Metal, ".")
            .with_input(MapSlot::BaseColor, "b.png")
            .with_input(MapSlot::Emission, "e.png");
        match req.validate_inputs() {
            Err(GenerateError::MissingInputs(m)) => assert_eq!(
                m,
                vec![MapSlot::Roughness, MapSlot::Metallic, MapSlot::Occlusion]
            ),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn planned_outputs_use_trimmed_name() {
        let req = GenerationRequest::new(" Glass ", MaterialType::Transparent, "out");
        let planned: Vec<PathBuf> = req.planned_outputs().into_iter().map(|(_, p)| p).collect();
        assert_eq!(
            planned,
            vec![PathBuf::from("out/Glass_BR.png"), PathBuf::from("out/Glass_MESA.png")]
        );
    }

    #[test]
    fn standard_material_writes_br() {
        let dir = tempfile::tempdir().unwrap();
        let d = dir.path();
        let req = GenerationRequest::new("Brick", MaterialType::Standard, d)
            .with_input(MapSlot::BaseColor, write_rgb(d, "base.png", 4, 4))
            .with_input(MapSlot::Roughness, write_gray(d, "rough.png", 4, 4, 77));
        let report = req.run().unwrap();
        assert_eq!(report.saved, vec![d.join("Brick_BR.png")]);
        assert_eq!(report.summary_lines(), vec!["Saved: Brick_BR.png".to_string()]);

        let out = image::open(d.join("Brick_BR.png")).unwrap().to_rgba8();
        assert_eq!(out.get_pixel(3, 3).0, [200, 100, 50, 77]);
    }

    #[test]
    fn extra_inputs_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let d = dir.path();
        let req = GenerationRequest::new("Sky", MaterialType::Unlit, d)
            .with_input(MapSlot::BaseColor, write_rgb(d, "base.png", 2, 2))
            .with_input(MapSlot::Roughness, d.join("does_not_exist.png"));
        let report = req.run().unwrap();
        assert_eq!(report.saved, vec![d.join("Sky_B.png")]);
    }

    #[test]
    fn failure_keeps_earlier_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let d = dir.path();
        let req = GenerationRequest::new("Panel", MaterialType::Metal, d)
            .with_input(MapSlot::BaseColor, write_rgb(d, "base.png", 4, 4))
            .with_input(MapSlot::Roughness, write_gray(d, "r.png", 4, 4, 1))
            .with_input(MapSlot::Metallic, write_gray(d, "m.png", 4, 4, 2))
            .with_input(MapSlot::Emission, write_gray(d, "e.png", 4, 4, 3))
            .with_input(MapSlot::Occlusion, write_gray(d, "o.png", 8, 8, 4));
        let err = req.run().unwrap_err();
        assert!(!err.is_validation());
        assert_eq!(err.saved(), &[d.join("Panel_BR.png")]);
        assert!(matches!(
            err,
            GenerateError::Failed {
                output: PackedOutput::Meo,
                source: PackError::DimensionMismatch { .. },
                ..
            }
        ));
        assert!(!d.join("Panel_MEO.png").exists());
    }

    #[test]
    fn missing_output_dir_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let req = GenerationRequest::new("Sky", MaterialType::Unlit, dir.path().join("nope"))
            .with_input(MapSlot::BaseColor, "b.png");
        assert!(matches!(req.validate(), Err(GenerateError::MissingOutputDir(_))));
    }

    #[test]
    fn existing_outputs_are_detected() {
        let dir = tempfile::tempdir().unwrap();
        let d = dir.path();
        std::fs::write(d.join("Leaf_BA.png"), b"old").unwrap();
        let req = GenerationRequest::new("Leaf", MaterialType::Masked, d);
        assert_eq!(req.existing_outputs(), vec![d.join("Leaf_BA.png")]);
    }

    #[test]
    fn size_conflicts_only_flag_disagreeing_recipes() {
        let mut sizes = BTreeMap::new();
        sizes.insert(MapSlot::BaseColor, (512, 512));
        sizes.insert(MapSlot::Roughness, (512, 512));
        sizes.insert(MapSlot::Metallic, (256, 256));
        sizes.insert(MapSlot::Emission, (512, 512));
        let conflicts = size_conflicts(MaterialType::Metal, &sizes);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].0, PackedOutput::Meo);
        assert_eq!(conflicts[0].1.len(), 2);
    }
}
