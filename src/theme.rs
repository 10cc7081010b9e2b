use egui::{Color32, CornerRadius, Stroke, Visuals};

/// Colors for one window mode. Anything not listed here comes from egui's own
/// dark or light visuals.
pub struct Palette {
    pub is_dark: bool,
    pub background: Color32,
    pub surface: Color32,
    pub header: Color32,
    pub text: Color32,
    pub muted: Color32,
    pub accent: Color32,
    pub link: Color32,
    pub row_stripe: Color32,
    pub error: Color32,
    pub control: Color32,
    pub control_text: Color32,
    pub points_hot: Color32,
    pub points_warm: Color32,
    pub points_cold: Color32,
}

impl Palette {
    pub fn dark() -> Self {
        Self {
            is_dark: true,
            background: Color32::from_rgb(22, 20, 18),
            surface: Color32::from_rgb(34, 31, 28),
            header: Color32::from_rgb(48, 36, 26),
            text: Color32::from_rgb(236, 232, 226),
            muted: Color32::from_rgb(160, 152, 142),
            accent: Color32::from_rgb(255, 102, 0),
            link: Color32::from_rgb(250, 200, 150),
            row_stripe: Color32::from_rgb(29, 27, 24),
            error: Color32::from_rgb(244, 96, 84),
            control: Color32::from_rgb(70, 52, 38),
            control_text: Color32::from_rgb(250, 236, 220),
            points_hot: Color32::from_rgb(255, 128, 40),
            points_warm: Color32::from_rgb(230, 190, 90),
            points_cold: Color32::from_rgb(140, 134, 126),
        }
    }

    // Cream background, close to the site itself
    pub fn light() -> Self {
        Self {
            is_dark: false,
            background: Color32::from_rgb(246, 246, 239),
            surface: Color32::from_rgb(255, 255, 250),
            header: Color32::from_rgb(255, 222, 196),
            text: Color32::from_rgb(24, 24, 24),
            muted: Color32::from_rgb(130, 130, 130),
            accent: Color32::from_rgb(204, 82, 0),
            link: Color32::from_rgb(20, 60, 120),
            row_stripe: Color32::from_rgb(238, 238, 230),
            error: Color32::from_rgb(176, 32, 32),
            control: Color32::from_rgb(255, 236, 220),
            control_text: Color32::from_rgb(24, 24, 24),
            points_hot: Color32::from_rgb(204, 82, 0),
            points_warm: Color32::from_rgb(150, 110, 20),
            points_cold: Color32::from_rgb(120, 120, 120),
        }
    }

    pub fn for_mode(is_dark_mode: bool) -> Self {
        if is_dark_mode {
            Self::dark()
        } else {
            Self::light()
        }
    }

    pub fn apply_to_ctx(&self, ctx: &egui::Context) {
        let mut visuals = if self.is_dark { Visuals::dark() } else { Visuals::light() };

        visuals.panel_fill = self.background;
        visuals.window_fill = self.surface;
        visuals.extreme_bg_color = self.surface;
        // Grid::striped paints every other row with this
        visuals.faint_bg_color = self.row_stripe;
        visuals.hyperlink_color = self.link;
        visuals.error_fg_color = self.error;

        visuals.selection.bg_fill = self.accent.gamma_multiply(0.5);
        visuals.selection.stroke = Stroke::new(1.0, self.accent);

        visuals.widgets.inactive.weak_bg_fill = self.control;
        visuals.widgets.inactive.bg_fill = self.control;

        visuals.window_corner_radius = CornerRadius::same(6);
        visuals.menu_corner_radius = CornerRadius::same(4);

        ctx.set_visuals(visuals);
    }

    /// Title color: stories without a link (Ask HN and friends) can't be opened.
    pub fn title_color(&self, has_link: bool) -> Color32 {
        if has_link {
            self.link
        } else {
            self.text
        }
    }

    pub fn points_color(&self, points: i64) -> Color32 {
        match points {
            p if p >= 250 => self.points_hot,
            p if p >= 50 => self.points_warm,
            _ => self.points_cold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_fall_into_three_bands() {
        let palette = Palette::dark();
        assert_eq!(palette.points_color(1200), palette.points_hot);
        assert_eq!(palette.points_color(250), palette.points_hot);
        assert_eq!(palette.points_color(249), palette.points_warm);
        assert_eq!(palette.points_color(50), palette.points_warm);
        assert_eq!(palette.points_color(3), palette.points_cold);
        assert_eq!(palette.points_color(-1), palette.points_cold);
    }

    #[test]
    fn mode_picks_matching_palette() {
        assert!(Palette::for_mode(true).is_dark);
        assert!(!Palette::for_mode(false).is_dark);
    }

    #[test]
    fn linkless_titles_use_plain_text() {
        let palette = Palette::light();
        assert_eq!(palette.title_color(false), palette.text);
        assert_eq!(palette.title_color(true), palette.link);
    }
}
