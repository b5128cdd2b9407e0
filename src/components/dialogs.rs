use eframe::egui;
use egui::{Color32, Pos2, Rect, Rounding, Sense, Vec2};
use std::path::PathBuf;

use matpack::t;

// ============================================================================
// SHARED STYLING
// ============================================================================

/// Colours derived from the current egui visuals.
pub struct DialogColors {
    pub accent: Color32,
    pub accent_faint: Color32,
    pub text_muted: Color32,
}

impl DialogColors {
    pub fn from_ctx(ctx: &egui::Context, accent: Color32) -> Self {
        let v = ctx.style().visuals.clone();
        let alpha = if v.dark_mode { 35 } else { 25 };
        Self {
            accent,
            accent_faint: Color32::from_rgba_unmultiplied(accent.r(), accent.g(), accent.b(), alpha),
            text_muted: if v.dark_mode {
                Color32::from_gray(160)
            } else {
                v.weak_text_color()
            },
        }
    }
}

/// Paint the accent header bar with icon + title.
fn paint_dialog_header(ui: &mut egui::Ui, colors: &DialogColors, icon: &str, title: &str) {
    let available_width = ui.available_width();
    let header_height = 32.0;
    let (rect, _) = ui.allocate_exact_size(Vec2::new(available_width, header_height), Sense::hover());

    let painter = ui.painter();
    painter.rect_filled(rect, Rounding::ZERO, colors.accent_faint);
    painter.rect_filled(
        Rect::from_min_size(rect.min, Vec2::new(3.0, header_height)),
        Rounding::ZERO,
        colors.accent,
    );
    painter.text(
        Pos2::new(rect.min.x + 12.0, rect.center().y),
        egui::Align2::LEFT_CENTER,
        format!("{} {}", icon, title),
        egui::FontId::proportional(14.0),
        colors.accent,
    );
}

fn file_list(ui: &mut egui::Ui, colors: &DialogColors, files: &[PathBuf]) {
    egui::ScrollArea::vertical().max_height(160.0).show(ui, |ui| {
        for f in files {
            ui.label(egui::RichText::new(f.display().to_string()).monospace().color(colors.text_muted));
        }
    });
}

// ============================================================================
// MESSAGE DIALOG — error / success / failure reports
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MessageKind {
    Error,
    Success,
}

pub struct MessageDialog {
    pub kind: MessageKind,
    pub title: String,
    pub lines: Vec<String>,
    /// Files to list under the message (saved outputs).
    pub files: Vec<PathBuf>,
    pub files_caption: Option<String>,
    /// Folder offered by the "open folder" button.
    pub folder: Option<PathBuf>,
}

pub enum MessageAction {
    Close,
    OpenFolder(PathBuf),
}

impl MessageDialog {
    pub fn error(title: String, lines: Vec<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            title,
            lines,
            files: Vec::new(),
            files_caption: None,
            folder: None,
        }
    }

    pub fn success(lines: Vec<String>, folder: PathBuf) -> Self {
        Self {
            kind: MessageKind::Success,
            title: t!("dialog.success_title"),
            lines,
            files: Vec::new(),
            files_caption: None,
            folder: Some(folder),
        }
    }

    pub fn with_files(mut self, caption: String, files: Vec<PathBuf>) -> Self {
        if !files.is_empty() {
            self.files_caption = Some(caption);
            self.files = files;
        }
        self
    }

    /// Returns an action once the user dismisses the dialog.
    pub fn show(&mut self, ctx: &egui::Context, ok: Color32, error: Color32) -> Option<MessageAction> {
        let mut action = None;
        if ctx.input_mut(|i| {
            i.consume_key(egui::Modifiers::NONE, egui::Key::Enter)
                || i.consume_key(egui::Modifiers::NONE, egui::Key::Escape)
        }) {
            action = Some(MessageAction::Close);
        }

        let (accent, icon) = match self.kind {
            MessageKind::Error => (error, "\u{26A0}"),
            MessageKind::Success => (ok, "\u{2714}"),
        };

        egui::Window::new("message_dialog_internal")
            .title_bar(false)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.set_min_width(380.0);
                let colors = DialogColors::from_ctx(ctx, accent);
                paint_dialog_header(ui, &colors, icon, &self.title);
                ui.add_space(8.0);

                for line in &self.lines {
                    ui.label(line);
                }
                if let Some(caption) = &self.files_caption {
                    ui.add_space(6.0);
                    ui.label(egui::RichText::new(caption).strong());
                    file_list(ui, &colors, &self.files);
                }

                ui.add_space(10.0);
                ui.horizontal(|ui| {
                    if ui.button(t!("dialog.ok")).clicked() {
                        action = Some(MessageAction::Close);
                    }
                    if let Some(folder) = &self.folder
                        && ui.button(t!("menu.open_folder")).clicked()
                    {
                        action = Some(MessageAction::OpenFolder(folder.clone()));
                    }
                });
            });

        action
    }
}

// ============================================================================
// OVERWRITE CONFIRMATION
// ============================================================================

pub struct ConfirmOverwriteDialog {
    pub existing: Vec<PathBuf>,
}

impl ConfirmOverwriteDialog {
    /// `Some(true)` = overwrite, `Some(false)` = cancel, `None` = still open.
    pub fn show(&mut self, ctx: &egui::Context, caution: Color32) -> Option<bool> {
        let mut result = None;
        if ctx.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::Escape)) {
            result = Some(false);
        }

        egui::Window::new("overwrite_dialog_internal")
            .title_bar(false)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.set_min_width(380.0);
                let colors = DialogColors::from_ctx(ctx, caution);
                paint_dialog_header(ui, &colors, "\u{26A0}", &t!("dialog.overwrite_title"));
                ui.add_space(8.0);
                ui.label(t!("dialog.overwrite_body"));
                file_list(ui, &colors, &self.existing);
                ui.add_space(10.0);
                ui.horizontal(|ui| {
                    if ui.button(t!("dialog.overwrite_confirm")).clicked() {
                        result = Some(true);
                    }
                    if ui.button(t!("dialog.cancel")).clicked() {
                        result = Some(false);
                    }
                });
            });

        result
    }
}
