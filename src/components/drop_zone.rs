// ============================================================================
// DROP ZONE — one labeled target per required input map
// ============================================================================

use eframe::egui;
use egui::{Color32, ColorImage, Rect, Sense, TextureHandle, TextureOptions};
use image::RgbaImage;
use std::path::{Path, PathBuf};

use matpack::io::{is_supported_image, load_thumbnail, probe_dimensions};
use matpack::material::MapSlot;
use matpack::theme::Theme;
use matpack::{log_info, log_warn, t};

/// Longest side of the preview thumbnail, in pixels.
const THUMB_MAX: u32 = 96;

#[derive(Clone, Debug, PartialEq)]
pub enum ZoneState {
    Empty,
    Loaded(PathBuf),
    /// Last drop was rejected; the slot holds no file.
    Invalid,
}

pub struct DropZone {
    pub slot: MapSlot,
    pub state: ZoneState,
    /// Header size; `None` when the header could not be read.
    pub dimensions: Option<(u32, u32)>,
    thumbnail: Option<TextureHandle>,
    /// Screen rect from the last frame, used to route file drops.
    pub last_rect: Option<Rect>,
}

/// What happened to a zone this frame.
#[derive(Default)]
pub struct ZoneResponse {
    pub clicked: bool,
}

impl DropZone {
    pub fn new(slot: MapSlot) -> Self {
        Self {
            slot,
            state: ZoneState::Empty,
            dimensions: None,
            thumbnail: None,
            last_rect: None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.state {
            ZoneState::Loaded(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        !matches!(self.state, ZoneState::Loaded(_))
    }

    pub fn clear(&mut self) {
        self.state = ZoneState::Empty;
        self.dimensions = None;
        self.thumbnail = None;
    }

    /// Assign a file to this zone. Returns `false` (and marks the zone
    /// invalid) when the file is missing or not a supported image.
    pub fn assign(&mut self, ctx: &egui::Context, path: PathBuf) -> bool {
        self.clear();
        if !is_supported_image(&path) {
            log_warn!("Rejected {} for {}", path.display(), self.slot.label());
            self.state = ZoneState::Invalid;
            return false;
        }

        self.dimensions = probe_dimensions(&path).ok();
        match load_thumbnail(&path, THUMB_MAX) {
            Ok(thumb) => {
                self.thumbnail = Some(ctx.load_texture(
                    format!("thumb_{}", self.slot.key()),
                    rgba_to_color_image(&thumb),
                    TextureOptions::LINEAR,
                ));
            }
            Err(e) => log_warn!("No preview for {}: {}", path.display(), e),
        }
        log_info!("{} ← {}", self.slot.label(), path.display());
        self.state = ZoneState::Loaded(path);
        true
    }

    /// Paint the zone filling `size`. `drag_active` is true while files are
    /// being dragged over the window.
    pub fn show(&mut self, ui: &mut egui::Ui, theme: &Theme, size: egui::Vec2, drag_active: bool) -> ZoneResponse {
        let (rect, response) = ui.allocate_exact_size(size, Sense::click());
        self.last_rect = Some(rect);

        let pointer_inside = ui.ctx().input(|i| i.pointer.latest_pos()).is_some_and(|p| rect.contains(p));
        let highlighted = response.hovered() || (drag_active && pointer_inside);

        let painter = ui.painter_at(rect);
        let bg = if highlighted { theme.zone_hover_bg } else { theme.zone_bg };
        let border = match self.state {
            ZoneState::Loaded(_) => theme.ok,
            ZoneState::Invalid => theme.error,
            ZoneState::Empty if drag_active => theme.caution,
            ZoneState::Empty => theme.zone_border,
        };
        painter.rect(rect.shrink(1.0), 4.0, bg, egui::Stroke::new(2.0, border));

        let label = self.slot.label();
        let text_font = egui::FontId::proportional(14.0);
        let small_font = egui::FontId::proportional(11.0);

        match &self.state {
            ZoneState::Empty => {
                painter.text(
                    rect.center() - egui::vec2(0.0, 8.0),
                    egui::Align2::CENTER_CENTER,
                    t!("zone.drop", label = label),
                    text_font,
                    theme.text,
                );
                painter.text(
                    rect.center_bottom() - egui::vec2(0.0, 14.0),
                    egui::Align2::CENTER_CENTER,
                    t!("zone.browse"),
                    small_font,
                    theme.text_weak,
                );
            }
            ZoneState::Invalid => {
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    t!("zone.invalid", label = label),
                    text_font,
                    theme.error,
                );
            }
            ZoneState::Loaded(path) => {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();

                // Thumbnail on the left, text on the right
                let mut text_left = rect.left() + 12.0;
                if let Some(tex) = &self.thumbnail {
                    let box_side = (rect.height() - 16.0).clamp(16.0, THUMB_MAX as f32);
                    let tex_size = tex.size_vec2();
                    let scale = (box_side / tex_size.x).min(box_side / tex_size.y).min(1.0);
                    let scaled = tex_size * scale;
                    let thumb_rect = Rect::from_center_size(
                        egui::pos2(rect.left() + 8.0 + box_side / 2.0, rect.center().y),
                        scaled,
                    );
                    painter.image(
                        tex.id(),
                        thumb_rect,
                        Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        Color32::WHITE,
                    );
                    text_left = rect.left() + box_side + 18.0;
                }

                let x = text_left;
                painter.text(
                    egui::pos2(x, rect.center().y - 16.0),
                    egui::Align2::LEFT_CENTER,
                    format!("{}:", label),
                    text_font.clone(),
                    theme.ok,
                );
                painter.text(
                    egui::pos2(x, rect.center().y + 2.0),
                    egui::Align2::LEFT_CENTER,
                    file_name,
                    text_font,
                    theme.ok,
                );
                let size_line = match self.dimensions {
                    Some((w, h)) => format!("{} × {}", w, h),
                    None => t!("zone.unreadable"),
                };
                painter.text(
                    egui::pos2(x, rect.center().y + 20.0),
                    egui::Align2::LEFT_CENTER,
                    size_line,
                    small_font,
                    theme.text_weak,
                );
            }
        }

        ZoneResponse {
            clicked: response.clicked(),
        }
    }
}

fn rgba_to_color_image(img: &RgbaImage) -> ColorImage {
    ColorImage::from_rgba_unmultiplied([img.width() as usize, img.height() as usize], img.as_raw())
}
