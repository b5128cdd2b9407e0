use eframe::egui;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::components::dialogs::{ConfirmOverwriteDialog, MessageAction, MessageDialog};
use crate::components::drop_zone::DropZone;
use matpack::generate::{GenerateError, GenerationRequest, size_conflicts};
use matpack::io::{pick_map_file, pick_output_dir};
use matpack::material::{MapSlot, MaterialType};
use matpack::settings::AppSettings;
use matpack::theme::{Theme, ThemeMode};
use matpack::{log_err, log_info, t};

/// Height of one drop zone; width follows the window.
const ZONE_HEIGHT: f32 = 110.0;
/// Zones per row.
const ZONE_COLUMNS: usize = 2;

/// Modal currently blocking the main window.
enum ActiveDialog {
    None,
    Message(MessageDialog),
    ConfirmOverwrite {
        dialog: ConfirmOverwriteDialog,
        request: GenerationRequest,
    },
}

pub struct MatPackApp {
    settings: AppSettings,
    theme: Theme,

    material_name: String,
    material_type: MaterialType,
    zones: Vec<DropZone>,

    active_dialog: ActiveDialog,
}

impl MatPackApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = AppSettings::load();

        // Apply saved language preference (or auto-detect on first boot)
        if settings.language.is_empty() {
            let detected = matpack::i18n::detect_system_language();
            matpack::i18n::set_language(&detected);
        } else {
            matpack::i18n::set_language(&settings.language);
        }

        let theme = Theme::for_mode(settings.theme_mode);
        theme.apply(&cc.egui_ctx);

        let material_type = settings.last_material_type;
        log_info!("Starting with material type {}", material_type.label());

        Self {
            settings,
            theme,
            material_name: String::new(),
            material_type,
            zones: build_zones(material_type),
            active_dialog: ActiveDialog::None,
        }
    }

    // ========================================================================
    // STATE CHANGES
    // ========================================================================

    fn set_material_type(&mut self, material_type: MaterialType) {
        if material_type == self.material_type {
            return;
        }
        self.material_type = material_type;
        self.zones = build_zones(material_type);
        self.settings.last_material_type = material_type;
        self.settings.save();
    }

    fn clear_maps(&mut self) {
        for zone in &mut self.zones {
            zone.clear();
        }
    }

    fn set_theme_mode(&mut self, ctx: &egui::Context, mode: ThemeMode) {
        self.theme = Theme::for_mode(mode);
        self.theme.apply(ctx);
        self.settings.theme_mode = mode;
        self.settings.save();
    }

    fn assigned_inputs(&self) -> BTreeMap<MapSlot, PathBuf> {
        self.zones
            .iter()
            .filter_map(|z| z.path().map(|p| (z.slot, p.to_path_buf())))
            .collect()
    }

    // ========================================================================
    // FILE DROPS
    // ========================================================================

    /// Route dropped files to zones.
    ///
    /// A single file goes to the zone under the pointer, or the first empty
    /// zone when the drop position is unknown. Several files at once are
    /// matched by file-name tag first, then fill the remaining empty zones.
    fn handle_dropped_files(&mut self, ctx: &egui::Context, files: Vec<PathBuf>, pos: Option<egui::Pos2>) {
        if files.len() == 1 {
            let target = pos
                .and_then(|p| self.zones.iter().position(|z| z.last_rect.is_some_and(|r| r.contains(p))))
                .or_else(|| self.zones.iter().position(|z| z.is_empty()));
            if let (Some(idx), Some(path)) = (target, files.into_iter().next()) {
                self.zones[idx].assign(ctx, path);
            }
            return;
        }

        let mut unmatched = Vec::new();
        for path in files {
            let tagged = path
                .file_stem()
                .and_then(|s| MapSlot::from_file_stem(&s.to_string_lossy()))
                .and_then(|slot| self.zones.iter().position(|z| z.slot == slot && z.is_empty()));
            match tagged {
                Some(idx) => {
                    self.zones[idx].assign(ctx, path);
                }
                None => unmatched.push(path),
            }
        }
        for path in unmatched {
            match self.zones.iter().position(|z| z.is_empty()) {
                Some(idx) => {
                    self.zones[idx].assign(ctx, path);
                }
                None => {
                    log_info!("No free slot for {}", path.display());
                }
            }
        }
    }

    fn browse_for_zone(&mut self, ctx: &egui::Context, idx: usize) {
        let label = self.zones[idx].slot.label();
        let start_dir = self
            .zones
            .iter()
            .find_map(|z| z.path().and_then(|p| p.parent()).map(|p| p.to_path_buf()));
        if let Some(path) = pick_map_file(&t!("dialog.pick_map", label = label), start_dir.as_deref()) {
            self.zones[idx].assign(ctx, path);
        }
    }

    // ========================================================================
    // GENERATION
    // ========================================================================

    fn on_generate_clicked(&mut self) {
        let mut request = GenerationRequest {
            material_name: self.material_name.clone(),
            material_type: self.material_type,
            inputs: self.assigned_inputs(),
            output_dir: PathBuf::new(),
        };
        if let Err(e) = request.validate_inputs() {
            self.active_dialog = ActiveDialog::Message(MessageDialog::error(
                t!("dialog.error_title"),
                localized_error(&e),
            ));
            return;
        }

        let start_dir = self.settings.last_output_dir.clone();
        let Some(dir) = pick_output_dir(&t!("dialog.pick_output"), start_dir.as_deref()) else {
            return;
        };
        request.output_dir = dir.clone();
        if self.settings.remember_output_dir {
            self.settings.last_output_dir = Some(dir);
            self.settings.save();
        }

        let existing = request.existing_outputs();
        if self.settings.confirm_overwrite && !existing.is_empty() {
            self.active_dialog = ActiveDialog::ConfirmOverwrite {
                dialog: ConfirmOverwriteDialog { existing },
                request,
            };
            return;
        }
        self.execute(request);
    }

    fn execute(&mut self, request: GenerationRequest) {
        let dialog = match request.run() {
            Ok(report) => {
                let mut lines = vec![t!("dialog.success_body"), String::new()];
                lines.extend(report.summary_lines());
                MessageDialog::success(lines, request.output_dir.clone())
            }
            Err(e) if e.is_validation() => MessageDialog::error(t!("dialog.error_title"), localized_error(&e)),
            Err(e) => {
                log_err!("Generation failed: {}", e);
                let saved = e.saved().to_vec();
                MessageDialog::error(t!("dialog.failed_title"), vec![t!("dialog.failed_body"), e.to_string()])
                    .with_files(t!("dialog.saved_before_failure"), saved)
            }
        };
        self.active_dialog = ActiveDialog::Message(dialog);
    }

    fn show_active_dialog(&mut self, ctx: &egui::Context) {
        let dialog = std::mem::replace(&mut self.active_dialog, ActiveDialog::None);
        self.active_dialog = match dialog {
            ActiveDialog::None => ActiveDialog::None,
            ActiveDialog::Message(mut msg) => match msg.show(ctx, self.theme.ok, self.theme.error) {
                None => ActiveDialog::Message(msg),
                Some(MessageAction::Close) => ActiveDialog::None,
                Some(MessageAction::OpenFolder(dir)) => {
                    if let Err(e) = crate::shell::open_folder(&dir) {
                        log_err!("{}", e);
                    }
                    ActiveDialog::None
                }
            },
            ActiveDialog::ConfirmOverwrite { mut dialog, request } => match dialog.show(ctx, self.theme.caution) {
                None => ActiveDialog::ConfirmOverwrite { dialog, request },
                Some(true) => {
                    self.execute(request);
                    std::mem::replace(&mut self.active_dialog, ActiveDialog::None)
                }
                Some(false) => ActiveDialog::None,
            },
        };
    }

    // ========================================================================
    // PANELS
    // ========================================================================

    fn show_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button(t!("menu.settings"), |ui| {
                    let mut dark = self.theme.mode == ThemeMode::Dark;
                    if ui.checkbox(&mut dark, t!("menu.dark_theme")).changed() {
                        let mode = if dark { ThemeMode::Dark } else { ThemeMode::Light };
                        self.set_theme_mode(ctx, mode);
                    }
                    let confirm = ui.checkbox(&mut self.settings.confirm_overwrite, t!("menu.confirm_overwrite"));
                    let remember = ui.checkbox(&mut self.settings.remember_output_dir, t!("menu.remember_dir"));
                    if confirm.changed() || remember.changed() {
                        self.settings.save();
                    }

                    ui.menu_button(t!("menu.language"), |ui| {
                        let current = matpack::i18n::current_language();
                        for (code, name) in matpack::i18n::LANGUAGES {
                            if ui.selectable_label(current == *code, *name).clicked() {
                                matpack::i18n::set_language(code);
                                self.settings.language = code.to_string();
                                self.settings.save();
                                ui.close_menu();
                            }
                        }
                    });

                    ui.separator();
                    if ui.button(t!("menu.clear")).clicked() {
                        self.clear_maps();
                        ui.close_menu();
                    }
                    if ui.button(t!("menu.open_log")).clicked() {
                        if let Some(dir) = matpack::logger::log_dir()
                            && let Err(e) = crate::shell::open_folder(&dir)
                        {
                            log_err!("{}", e);
                        }
                        ui.close_menu();
                    }
                });
            });
        });
    }

    fn show_header(&mut self, ui: &mut egui::Ui) {
        let mut selected = self.material_type;
        egui::Grid::new("material_header_grid")
            .num_columns(2)
            .spacing([10.0, 10.0])
            .show(ui, |ui| {
                ui.label(t!("label.material_name"));
                ui.add(egui::TextEdit::singleline(&mut self.material_name).desired_width(f32::INFINITY));
                ui.end_row();

                ui.label(t!("label.material_type"));
                egui::ComboBox::from_id_source("material_type_combo")
                    .width(ui.available_width())
                    .selected_text(selected.label())
                    .show_ui(ui, |ui| {
                        for ty in MaterialType::all() {
                            ui.selectable_value(&mut selected, *ty, ty.label());
                        }
                    });
                ui.end_row();
            });
        self.set_material_type(selected);

        ui.add_space(6.0);
        let hint = match self.material_type.blender_name(&self.material_name) {
            Some(name) => t!("hint.blender_name", name = name),
            None => t!("hint.enter_name"),
        };
        ui.vertical_centered(|ui| {
            ui.label(egui::RichText::new(hint).strong().color(self.theme.caution));
        });
    }

    fn show_zones(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let drag_active = ctx.input(|i| !i.raw.hovered_files.is_empty());
        let spacing = ui.spacing().item_spacing.x;
        let zone_width = ((ui.available_width() - spacing * (ZONE_COLUMNS as f32 - 1.0))
            / ZONE_COLUMNS as f32)
            .max(120.0);

        let mut clicked = None;
        for (row_idx, row) in self.zones.chunks_mut(ZONE_COLUMNS).enumerate() {
            ui.horizontal(|ui| {
                for (col_idx, zone) in row.iter_mut().enumerate() {
                    let resp = zone.show(ui, &self.theme, egui::vec2(zone_width, ZONE_HEIGHT), drag_active);
                    if resp.clicked {
                        clicked = Some(row_idx * ZONE_COLUMNS + col_idx);
                    }
                }
            });
        }
        if let Some(idx) = clicked {
            self.browse_for_zone(ctx, idx);
        }

        // Advisory size warnings
        let sizes: BTreeMap<MapSlot, (u32, u32)> = self
            .zones
            .iter()
            .filter(|z| z.path().is_some())
            .filter_map(|z| z.dimensions.map(|d| (z.slot, d)))
            .collect();
        for (output, maps) in size_conflicts(self.material_type, &sizes) {
            let list: Vec<String> = maps
                .iter()
                .map(|(slot, (w, h))| format!("{} {}×{}", slot.label(), w, h))
                .collect();
            ui.colored_label(
                self.theme.caution,
                t!("warn.size_mismatch", output = output.suffix(), sizes = list.join(", ")),
            );
        }
    }
}

impl eframe::App for MatPackApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let modal_open = !matches!(self.active_dialog, ActiveDialog::None);

        // --- Drag-and-Drop: route dropped files to their zones ---
        {
            let dropped: Vec<egui::DroppedFile> = ctx.input(|i| i.raw.dropped_files.clone());
            let files: Vec<PathBuf> = dropped.into_iter().filter_map(|f| f.path).collect();
            let files = accept_drops(files, modal_open);
            if !files.is_empty() {
                let pos = ctx.input(|i| i.pointer.latest_pos());
                self.handle_dropped_files(ctx, files, pos);
            }
        }

        self.show_menu_bar(ctx);

        egui::TopBottomPanel::bottom("action_panel")
            .min_height(56.0)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                let assigned = self.zones.iter().filter(|z| !z.is_empty()).count();
                ui.label(
                    egui::RichText::new(t!("status.maps", count = assigned, total = self.zones.len()))
                        .color(self.theme.text_weak),
                );
                let button = egui::Button::new(egui::RichText::new(t!("button.generate")).strong());
                if ui
                    .add_enabled(!modal_open, button.min_size(egui::vec2(ui.available_width(), 32.0)))
                    .clicked()
                {
                    self.on_generate_clicked();
                }
                ui.add_space(8.0);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!modal_open, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.add_space(8.0);
                    self.show_header(ui);
                    ui.add_space(12.0);
                    self.show_zones(ui, ctx);
                });
            });
        });

        self.show_active_dialog(ctx);
    }
}

/// Files to route this frame. Drops landing while a dialog is open are
/// logged and discarded.
fn accept_drops(files: Vec<PathBuf>, modal_open: bool) -> Vec<PathBuf> {
    if !modal_open {
        return files;
    }
    for path in &files {
        log_info!("Ignored drop while a dialog is open: {}", path.display());
    }
    Vec::new()
}

fn build_zones(material_type: MaterialType) -> Vec<DropZone> {
    material_type.inputs().iter().map(|s| DropZone::new(*s)).collect()
}

/// Translate validation errors; processing failures keep their English detail.
fn localized_error(e: &GenerateError) -> Vec<String> {
    match e {
        GenerateError::EmptyName => vec![t!("error.empty_name")],
        GenerateError::InvalidName(c) => vec![t!("error.invalid_name", char = c)],
        GenerateError::MissingInputs(slots) => {
            let names: Vec<&str> = slots.iter().map(|s| s.label()).collect();
            vec![t!("error.missing_inputs"), names.join(", ")]
        }
        GenerateError::MissingOutputDir(dir) => {
            vec![t!("error.missing_output_dir", dir = dir.display())]
        }
        GenerateError::Failed { .. } => vec![e.to_string()],
    }
}
