// ============================================================================
// MatPack CLI — headless material generation via command-line arguments
// ============================================================================
//
// Usage examples:
//   matpack -m standard -n Brick --base-color brick_col.png --roughness brick_rough.png -o out/
//   matpack -m metal -n Panel --maps-dir textures/panel/ -o out/
//   matpack -m transparent -n Glass --maps-dir src/ --alpha "src/*_mask.png" --force
//   matpack --list-types
//
// No GUI is opened in CLI mode. Everything runs synchronously on the
// current thread, same as the GUI's generate button.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use matpack::generate::{GenerateError, GenerationRequest};
use matpack::io::{has_supported_extension, is_supported_image};
use matpack::material::{MapSlot, MaterialType};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// MatPack headless texture packer.
///
/// Packs texture maps into the PNG layouts each material type expects — no GUI required.
#[derive(Parser, Debug)]
#[command(
    name = "matpack",
    version,
    about = "MatPack headless material texture packer",
    long_about = "Pack base color, roughness, metallic, emission, occlusion, smoothness\n\
                  and alpha maps into the PNG files each material type expects,\n\
                  without opening the GUI.\n\n\
                  Example:\n  \
                  matpack -m metal -n Panel --maps-dir textures/panel -o out/\n  \
                  matpack --list-types"
)]
pub struct CliArgs {
    /// Material type: standard, metal, unlit, unlit-blend, transparent, masked, uio.
    #[arg(short, long, value_name = "TYPE", required_unless_present = "list_types")]
    pub material: Option<String>,

    /// Material name; output files are written as <NAME>_<SUFFIX>.png.
    #[arg(short, long, required_unless_present = "list_types")]
    pub name: Option<String>,

    /// Base color map (RGB). Paths and glob patterns matching exactly one file are accepted.
    #[arg(long, value_name = "PATH")]
    pub base_color: Option<String>,

    /// Roughness map (packed into alpha of _BR).
    #[arg(long, value_name = "PATH")]
    pub roughness: Option<String>,

    /// Metallic map (red channel of _MEO / _MESA).
    #[arg(long, value_name = "PATH")]
    pub metallic: Option<String>,

    /// Emission map (green channel of _MEO / _MESA).
    #[arg(long, value_name = "PATH")]
    pub emission: Option<String>,

    /// Occlusion map (blue channel of _MEO).
    #[arg(long, value_name = "PATH")]
    pub occlusion: Option<String>,

    /// Smoothness map (blue channel of _MESA).
    #[arg(long, value_name = "PATH")]
    pub smoothness: Option<String>,

    /// Alpha map (alpha of _BA / _MESA).
    #[arg(long, value_name = "PATH")]
    pub alpha: Option<String>,

    /// Fill maps not given explicitly by scanning this folder for file names
    /// tagged with the map kind (e.g. Brick_Roughness.png, brick_ao.tga).
    #[arg(long, value_name = "DIR")]
    pub maps_dir: Option<PathBuf>,

    /// Output directory (created if missing).
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Overwrite output files that already exist.
    #[arg(short, long)]
    pub force: bool,

    /// Print the material types with their inputs and outputs, then exit.
    #[arg(long)]
    pub list_types: bool,

    /// Print which file went into each slot and timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Returns `true` when any CLI-mode flag is present in the real process arguments.
    /// Used by `main()` to route before creating an eframe window.
    pub fn is_cli_mode() -> bool {
        std::env::args().skip(1).any(|a| is_cli_flag(&a))
    }

    fn explicit_maps(&self) -> Vec<(MapSlot, &str)> {
        [
            (MapSlot::BaseColor, &self.base_color),
            (MapSlot::Roughness, &self.roughness),
            (MapSlot::Metallic, &self.metallic),
            (MapSlot::Emission, &self.emission),
            (MapSlot::Occlusion, &self.occlusion),
            (MapSlot::Smoothness, &self.smoothness),
            (MapSlot::Alpha, &self.alpha),
        ]
        .into_iter()
        .filter_map(|(slot, arg)| arg.as_deref().map(|a| (slot, a)))
        .collect()
    }
}

/// Flags that only make sense headless. Any of them routes to the CLI so
/// clap can report what else is missing.
const CLI_FLAGS: &[&str] = &[
    "--material",
    "--name",
    "--base-color",
    "--roughness",
    "--metallic",
    "--emission",
    "--occlusion",
    "--smoothness",
    "--alpha",
    "--maps-dir",
    "--output-dir",
    "--force",
    "--list-types",
    "--verbose",
    "--help",
    "--version",
];
const CLI_SHORT_FLAGS: &[&str] = &["-m", "-n", "-o", "-f", "-v", "-h", "-V"];

fn is_cli_flag(arg: &str) -> bool {
    if arg.starts_with("--") {
        let name = arg.split_once('=').map_or(arg, |(name, _)| name);
        return CLI_FLAGS.contains(&name);
    }
    // `-nBrick`, `-oout` and bundled shorts like `-fv`
    CLI_SHORT_FLAGS.iter().any(|f| arg.starts_with(f))
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run CLI processing and return an OS exit code.
/// `0` = all outputs written, `1` = anything failed.
pub fn run(args: CliArgs) -> ExitCode {
    matpack::logger::set_echo(args.verbose);

    if args.list_types {
        print_material_table();
        return ExitCode::SUCCESS;
    }

    match run_generation(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_generation(args: &CliArgs) -> Result<(), String> {
    let type_arg = args.material.as_deref().unwrap_or_default();
    let material_type = MaterialType::from_key(type_arg).ok_or_else(|| {
        let keys: Vec<&str> = MaterialType::all().iter().map(|t| t.key()).collect();
        format!(
            "unknown material type '{}'. Expected one of: {}",
            type_arg,
            keys.join(", ")
        )
    })?;
    let name = args.name.clone().unwrap_or_default();

    // -- Step 1: Collect maps --------------------------------------------
    let mut inputs: BTreeMap<MapSlot, PathBuf> = BTreeMap::new();
    for (slot, pattern) in args.explicit_maps() {
        let path = resolve_single(pattern).map_err(|e| format!("{}: {}", slot.key(), e))?;
        if !is_supported_image(&path) {
            return Err(format!(
                "{}: '{}' is not a PNG, JPEG or TGA image",
                slot.key(),
                path.display()
            ));
        }
        if !material_type.inputs().contains(&slot) {
            eprintln!(
                "warning: {} is not used by {} and will be ignored.",
                slot.label(),
                material_type.label()
            );
        }
        inputs.insert(slot, path);
    }

    if let Some(dir) = &args.maps_dir {
        let wanted: Vec<MapSlot> = material_type
            .inputs()
            .iter()
            .copied()
            .filter(|s| !inputs.contains_key(s))
            .collect();
        let found = detect_maps(dir, &wanted)?;
        inputs.extend(found);
    }

    if args.verbose {
        for (slot, path) in &inputs {
            println!("  {:<18} {}", slot.label(), path.display());
        }
    }

    // -- Step 2: Prepare output ------------------------------------------
    std::fs::create_dir_all(&args.output_dir).map_err(|e| {
        format!(
            "could not create output directory '{}': {}",
            args.output_dir.display(),
            e
        )
    })?;

    let request = GenerationRequest {
        material_name: name,
        material_type,
        inputs,
        output_dir: args.output_dir.clone(),
    };
    request.validate().map_err(|e| e.to_string())?;

    let existing = request.existing_outputs();
    if !existing.is_empty() && !args.force {
        let names: Vec<String> = existing.iter().map(|p| p.display().to_string()).collect();
        return Err(format!(
            "refusing to overwrite existing file(s): {}\nUse --force to replace them.",
            names.join(", ")
        ));
    }

    // -- Step 3: Generate ------------------------------------------------
    let start = Instant::now();
    match request.run() {
        Ok(report) => {
            for line in report.summary_lines() {
                println!("{}", line);
            }
            if let Some(blender) = material_type.blender_name(&request.material_name) {
                println!("Blender material name: \"{}\"", blender);
            }
            if args.verbose {
                println!("  ({:.0}ms)", start.elapsed().as_secs_f64() * 1000.0);
            }
            Ok(())
        }
        Err(e @ GenerateError::Failed { .. }) => {
            for p in e.saved() {
                println!("Saved: {}", p.display());
            }
            Err(e.to_string())
        }
        Err(e) => Err(e.to_string()),
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn print_material_table() {
    for ty in MaterialType::all() {
        let inputs: Vec<&str> = ty.inputs().iter().map(|s| s.key()).collect();
        let outputs: Vec<&str> = ty.outputs().iter().map(|o| o.suffix()).collect();
        let suffix = if ty.blender_suffix().is_empty() {
            "(none)"
        } else {
            ty.blender_suffix()
        };
        println!("{} ({})", ty.key(), ty.label());
        println!("    inputs:         {}", inputs.join(", "));
        println!("    outputs:        {}", outputs.join(", "));
        println!("    blender suffix: {}", suffix);
    }
}

/// Resolve a literal path or a glob pattern to exactly one file.
fn resolve_single(pattern: &str) -> Result<PathBuf, String> {
    let as_path = Path::new(pattern);
    if as_path.exists() {
        return Ok(as_path.to_path_buf());
    }

    let entries = glob::glob(pattern).map_err(|e| format!("invalid glob '{}': {}", pattern, e))?;
    let mut matches: Vec<PathBuf> = entries.flatten().filter(|p| p.is_file()).collect();
    match matches.len() {
        0 => Err(format!("'{}' matched no files", pattern)),
        1 => Ok(matches.remove(0)),
        n => Err(format!("'{}' matched {} files; narrow the pattern", pattern, n)),
    }
}

/// Scan `dir` for supported images and assign them to `wanted` slots by
/// file-name tag. Slots with no candidate are left out (validation reports
/// them); slots with several candidates are an error.
fn detect_maps(dir: &Path, wanted: &[MapSlot]) -> Result<BTreeMap<MapSlot, PathBuf>, String> {
    if !dir.is_dir() {
        return Err(format!("maps directory '{}' does not exist", dir.display()));
    }
    let pattern = format!("{}/*", glob::Pattern::escape(&dir.to_string_lossy()));

    let mut candidates: BTreeMap<MapSlot, Vec<PathBuf>> = BTreeMap::new();
    let entries = glob::glob(&pattern).map_err(|e| format!("cannot scan '{}': {}", dir.display(), e))?;
    for path in entries.flatten() {
        if !path.is_file() || !has_supported_extension(&path) {
            continue;
        }
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        if let Some(slot) = MapSlot::from_file_stem(&stem)
            && wanted.contains(&slot)
        {
            candidates.entry(slot).or_default().push(path);
        }
    }

    let mut found = BTreeMap::new();
    for (slot, mut paths) in candidates {
        if paths.len() > 1 {
            paths.sort();
            let names: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
            return Err(format!(
                "several files in '{}' look like {}: {}. Pass --{} explicitly.",
                dir.display(),
                slot.label(),
                names.join(", "),
                slot.key().replace('_', "-")
            ));
        }
        found.insert(slot, paths.remove(0));
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn touch_image(dir: &Path, name: &str) -> PathBuf {
        let p = dir.join(name);
        GrayImage::from_pixel(2, 2, Luma([128])).save(&p).unwrap();
        p
    }

    #[test]
    fn parses_full_command_line() {
        let args = CliArgs::try_parse_from([
            "matpack", "-m", "metal", "-n", "Panel", "--roughness", "r.png", "-o", "out", "--force",
        ])
        .unwrap();
        assert_eq!(args.material.as_deref(), Some("metal"));
        assert_eq!(args.output_dir, PathBuf::from("out"));
        assert!(args.force);
        assert_eq!(args.explicit_maps(), vec![(MapSlot::Roughness, "r.png")]);
    }

    #[test]
    fn any_headless_flag_routes_to_cli() {
        for arg in [
            "-m",
            "--material=metal",
            "-n",
            "-nBrick",
            "--name",
            "--base-color",
            "--alpha=mask.png",
            "--maps-dir",
            "-o",
            "--output-dir=out",
            "-f",
            "--list-types",
            "-V",
        ] {
            assert!(is_cli_flag(arg), "{arg}");
        }
        for arg in ["Brick.png", "--materials", "-x", "--", "-"] {
            assert!(!is_cli_flag(arg), "{arg}");
        }
    }

    #[test]
    fn list_types_needs_no_material() {
        assert!(CliArgs::try_parse_from(["matpack", "--list-types"]).is_ok());
        assert!(CliArgs::try_parse_from(["matpack", "-n", "Brick"]).is_err());
    }

    #[test]
    fn resolve_single_accepts_unique_glob() {
        let dir = tempfile::tempdir().unwrap();
        let p = touch_image(dir.path(), "brick_rough.png");
        touch_image(dir.path(), "brick_metal.png");
        let pattern = format!("{}/*_rough.png", dir.path().display());
        assert_eq!(resolve_single(&pattern).unwrap(), p);

        let all = format!("{}/*.png", dir.path().display());
        assert!(resolve_single(&all).unwrap_err().contains("matched 2 files"));
    }

    #[test]
    fn detect_maps_assigns_by_tag() {
        let dir = tempfile::tempdir().unwrap();
        let d = dir.path();
        let base = touch_image(d, "Panel_BaseColor.png");
        let rough = touch_image(d, "Panel_Roughness.png");
        touch_image(d, "Panel_Normal.png");
        std::fs::write(d.join("Panel_Metallic.txt"), "not an image").unwrap();

        let found = detect_maps(d, MaterialType::Metal.inputs()).unwrap();
        assert_eq!(found.get(&MapSlot::BaseColor), Some(&base));
        assert_eq!(found.get(&MapSlot::Roughness), Some(&rough));
        assert!(!found.contains_key(&MapSlot::Metallic));
    }

    #[test]
    fn detect_maps_rejects_ambiguous_tags() {
        let dir = tempfile::tempdir().unwrap();
        touch_image(dir.path(), "a_alpha.png");
        touch_image(dir.path(), "b_opacity.png");
        let err = detect_maps(dir.path(), &[MapSlot::Alpha]).unwrap_err();
        assert!(err.contains("--alpha"));
    }

    #[test]
    fn end_to_end_generation_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let d = dir.path();
        touch_image(d, "leaf_color.png");
        touch_image(d, "leaf_mask.png");
        let out = d.join("out");

        let args = |force: bool| {
            let mut v = vec![
                "matpack".to_string(),
                "-m".into(),
                "masked".into(),
                "-n".into(),
                "Leaf".into(),
                "--maps-dir".into(),
                d.display().to_string(),
                "-o".into(),
                out.display().to_string(),
            ];
            if force {
                v.push("--force".into());
            }
            CliArgs::try_parse_from(v).unwrap()
        };

        run_generation(&args(false)).unwrap();
        assert!(out.join("Leaf_BA.png").is_file());
        assert!(run_generation(&args(false)).unwrap_err().contains("--force"));
        run_generation(&args(true)).unwrap();
    }
}
