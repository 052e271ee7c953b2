use crate::domain::models::MessageSeverity;
use eframe::egui::{self, Color32, Rounding, Stroke};

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg: Color32,
    pub fg: Color32,
    pub stroke: Color32,
    pub field: Color32,
    pub hover: Color32,
    pub active: Color32,
    pub selection: Color32,
    pub danger: Color32,
    pub idle: Color32,
}

impl Palette {
    pub fn new(is_dark: bool) -> Self {
        if is_dark {
            Self {
                bg: Color32::from_rgb(25, 25, 25),
                fg: Color32::WHITE,
                stroke: Color32::WHITE,
                field: Color32::from_gray(30),
                hover: Color32::from_rgb(255, 200, 0),
                active: Color32::from_rgb(0, 255, 127),
                selection: Color32::from_rgb(0, 255, 255),
                danger: Color32::from_rgb(255, 80, 80),
                idle: Color32::from_gray(90),
            }
        } else {
            Self {
                bg: Color32::from_rgb(245, 245, 245),
                fg: Color32::BLACK,
                stroke: Color32::BLACK,
                field: Color32::WHITE,
                hover: Color32::from_rgb(255, 220, 0),
                active: Color32::from_rgb(0, 255, 100),
                selection: Color32::from_rgb(0, 200, 255),
                danger: Color32::from_rgb(255, 50, 50),
                idle: Color32::from_gray(110),
            }
        }
    }

    /// Text color for a toast of the given severity.
    pub fn severity(&self, severity: MessageSeverity) -> Color32 {
        match severity {
            MessageSeverity::Info => self.fg,
            MessageSeverity::Success => Color32::from_rgb(0, 150, 0),
            MessageSeverity::Warning => Color32::from_rgb(200, 150, 0),
            MessageSeverity::Error => self.danger,
        }
    }
}

fn square(visuals: &mut egui::style::WidgetVisuals, stroke: Stroke, fill: Color32, fg: Color32) {
    visuals.bg_stroke = stroke;
    visuals.rounding = Rounding::ZERO;
    visuals.bg_fill = fill;
    visuals.weak_bg_fill = fill;
    visuals.fg_stroke = Stroke::new(1.0, fg);
}

/// Flat, square, thick-bordered look used by every screen.
pub fn apply(ctx: &egui::Context, is_dark: bool) {
    let mut style = (*ctx.style()).clone();
    let palette = Palette::new(is_dark);

    for (text_style, font_id) in style.text_styles.iter_mut() {
        font_id.size = match text_style {
            egui::TextStyle::Heading => 26.0,
            egui::TextStyle::Body | egui::TextStyle::Button => 15.0,
            egui::TextStyle::Monospace => 14.0,
            _ => font_id.size,
        };
    }

    style.spacing.item_spacing = egui::vec2(12.0, 10.0);
    style.spacing.button_padding = egui::vec2(16.0, 10.0);

    let widgets = &mut style.visuals.widgets;
    square(
        &mut widgets.noninteractive,
        Stroke::new(2.0, palette.stroke),
        palette.bg,
        palette.fg,
    );
    square(
        &mut widgets.inactive,
        Stroke::new(2.0, palette.stroke),
        palette.field,
        palette.fg,
    );
    square(
        &mut widgets.hovered,
        Stroke::new(2.5, palette.stroke),
        palette.hover,
        Color32::BLACK,
    );
    widgets.hovered.expansion = 2.0;
    square(
        &mut widgets.active,
        Stroke::new(3.0, palette.stroke),
        palette.active,
        Color32::BLACK,
    );

    style.visuals.selection.stroke = Stroke::new(1.0, palette.stroke);
    style.visuals.selection.bg_fill = palette.selection;

    style.visuals.window_rounding = Rounding::ZERO;
    style.visuals.window_stroke = Stroke::new(2.0, palette.stroke);
    style.visuals.window_shadow = egui::Shadow {
        offset: egui::vec2(8.0, 8.0),
        blur: 0.0,
        spread: 0.0,
        color: palette.stroke,
    };
    style.visuals.window_fill = palette.bg;
    style.visuals.panel_fill = palette.bg;
    style.visuals.override_text_color = Some(palette.fg);

    ctx.set_style(style);
}
