use egui::Color32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
}

/// Colours used by the drop zones, hints and dialogs.
#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub mode: ThemeMode,
    pub window_bg: Color32,
    pub zone_bg: Color32,
    pub zone_hover_bg: Color32,
    pub zone_border: Color32,
    pub text: Color32,
    pub text_weak: Color32,
    /// Accepted file
    pub ok: Color32,
    /// Rejected file / failures
    pub error: Color32,
    /// Blender naming hint, size warnings
    pub caution: Color32,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            mode: ThemeMode::Dark,
            window_bg: Color32::from_rgb(0x2e, 0x2e, 0x2e),
            zone_bg: Color32::from_rgb(0x3c, 0x3c, 0x3c),
            zone_hover_bg: Color32::from_rgb(0x4a, 0x4a, 0x4a),
            zone_border: Color32::from_rgb(0x5a, 0x5a, 0x5a),
            text: Color32::from_rgb(0xcc, 0xcc, 0xcc),
            text_weak: Color32::from_rgb(0x8c, 0x8c, 0x8c),
            ok: Color32::from_rgb(0xa6, 0xe2, 0x2e),
            error: Color32::from_rgb(0xf9, 0x26, 0x72),
            caution: Color32::from_rgb(0xff, 0xcc, 0x00),
        }
    }

    pub fn light() -> Self {
        Self {
            mode: ThemeMode::Light,
            window_bg: Color32::from_rgb(0xf2, 0xf2, 0xf2),
            zone_bg: Color32::from_rgb(0xe2, 0xe2, 0xe2),
            zone_hover_bg: Color32::from_rgb(0xd4, 0xd4, 0xd4),
            zone_border: Color32::from_rgb(0xb0, 0xb0, 0xb0),
            text: Color32::from_rgb(0x30, 0x30, 0x30),
            text_weak: Color32::from_rgb(0x70, 0x70, 0x70),
            ok: Color32::from_rgb(0x3b, 0x8c, 0x10),
            error: Color32::from_rgb(0xc8, 0x10, 0x4e),
            caution: Color32::from_rgb(0xa8, 0x6a, 0x00),
        }
    }

    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Dark => Self::dark(),
            ThemeMode::Light => Self::light(),
        }
    }

    /// Push the palette into egui's visuals.
    pub fn apply(&self, ctx: &egui::Context) {
        let mut visuals = match self.mode {
            ThemeMode::Dark => egui::Visuals::dark(),
            ThemeMode::Light => egui::Visuals::light(),
        };
        visuals.panel_fill = self.window_bg;
        visuals.window_fill = self.window_bg;
        visuals.override_text_color = Some(self.text);
        ctx.set_visuals(visuals);
    }
}
