//! Drawing of rendered figures: raster texture plus vector overlays.

use crate::colors;
use crate::constants::{
    ANNOTATED_CONTOUR_WIDTH, AXIS_MARGIN, COLORBAR_HEIGHT, CONTOUR_WIDTH, TITLE_HEIGHT,
};
use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};
use relief_dashboard::figure::{Axes, ColorBar};
use relief_dashboard::render::ANNOTATION_INTERVAL;
use relief_dashboard::{Figure, RendererId, contour};
use std::collections::HashMap;

/// One texture per renderer, rebuilt when the figure revision changes.
#[derive(Default)]
pub struct TextureCache {
    textures: HashMap<RendererId, (u64, TextureHandle)>,
}

impl TextureCache {
    pub fn get(
        &mut self,
        ctx: &egui::Context,
        renderer: RendererId,
        revision: u64,
        figure: &Figure,
    ) -> &TextureHandle {
        let stale = self
            .textures
            .get(&renderer)
            .is_none_or(|(cached, _)| *cached != revision);
        if stale {
            let [w, h] = figure.size();
            let image = ColorImage::from_rgba_unmultiplied(
                [w as usize, h as usize],
                figure.raster.as_raw(),
            );
            let texture = ctx.load_texture(renderer.as_str(), image, TextureOptions::LINEAR);
            self.textures.insert(renderer, (revision, texture));
        }
        &self.textures[&renderer].1
    }
}

/// Maps figure pixel coordinates onto the screen.
#[derive(Clone, Copy)]
struct Placement {
    rect: egui::Rect,
    scale: f32,
}

impl Placement {
    fn to_screen(self, [x, y]: [f32; 2]) -> egui::Pos2 {
        self.rect.min + egui::vec2(x, y) * self.scale
    }
}

/// Draws `figure` fitted into `rect`: title, raster, isolines, annotations,
/// labels, axes and colour bar.
pub fn draw_figure(ui: &egui::Ui, rect: egui::Rect, figure: &Figure, texture: &TextureHandle) {
    let painter = ui.painter_at(rect);
    painter.text(
        rect.center_top() + egui::vec2(0.0, 4.0),
        egui::Align2::CENTER_TOP,
        &figure.title,
        egui::FontId::proportional(14.0),
        ui.visuals().strong_text_color(),
    );

    let mut area = rect;
    area.min.y += TITLE_HEIGHT;
    if figure.colorbar.is_some() {
        area.max.y -= COLORBAR_HEIGHT;
    }
    if figure.axes.is_some() {
        area = area.shrink(AXIS_MARGIN);
    }

    let [w, h] = figure.size();
    let logical = egui::vec2(w as f32, h as f32);
    let scale = (area.width() / logical.x).min(area.height() / logical.y).max(0.0);
    let image_rect = egui::Rect::from_center_size(area.center(), logical * scale);
    let placement = Placement {
        rect: image_rect,
        scale,
    };

    painter.image(
        texture.id(),
        image_rect,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        egui::Color32::WHITE,
    );

    draw_contours(&painter, placement, figure);
    draw_annotations(&painter, placement, figure);
    draw_labels(&painter, placement, figure);
    if let Some(axes) = &figure.axes {
        draw_axes(&painter, placement, axes, ui.visuals().text_color());
    }
    if let Some(bar) = &figure.colorbar {
        let bar_rect = egui::Rect::from_min_size(
            egui::pos2(rect.left() + rect.width() * 0.15, rect.bottom() - COLORBAR_HEIGHT + 6.0),
            egui::vec2(rect.width() * 0.7, 12.0),
        );
        draw_colorbar(&painter, bar_rect, bar, ui.visuals().text_color());
    }
}

fn draw_contours(painter: &egui::Painter, placement: Placement, figure: &Figure) {
    for line in &figure.contours {
        let mut points: Vec<egui::Pos2> =
            line.points.iter().map(|&p| placement.to_screen(p)).collect();
        if line.closed
            && let Some(&first) = points.first()
        {
            points.push(first);
        }
        let stroke = if contour::is_annotated(line.level, ANNOTATION_INTERVAL) {
            egui::Stroke::new(ANNOTATED_CONTOUR_WIDTH, colors::ANNOTATED_CONTOUR_LINE)
        } else {
            egui::Stroke::new(CONTOUR_WIDTH, colors::CONTOUR_LINE)
        };
        painter.line(points, stroke);
    }
}

fn draw_annotations(painter: &egui::Painter, placement: Placement, figure: &Figure) {
    let font_id = egui::FontId::proportional(11.0);
    for annotation in &figure.annotations {
        let center = placement.to_screen(annotation.position);
        let galley = painter.layout_no_wrap(
            annotation.text.clone(),
            font_id.clone(),
            colors::ANNOTATION_TEXT,
        );
        let rot = egui::emath::Rot2::from_angle(annotation.angle);
        let half = galley.size() / 2.0;
        let origin = center - rot * half;

        let halo = egui::Rect::from_center_size(center, galley.size() + egui::vec2(4.0, 0.0));
        if annotation.angle.abs() < 0.2 {
            painter.rect_filled(halo, 2.0, colors::ANNOTATION_HALO);
        }
        painter.add(
            egui::epaint::TextShape::new(origin, galley, colors::ANNOTATION_TEXT)
                .with_angle(annotation.angle),
        );
    }
}

fn draw_labels(painter: &egui::Painter, placement: Placement, figure: &Figure) {
    let font_id = egui::FontId::proportional(13.0);
    for label in &figure.labels {
        let pos = placement.to_screen(label.position);

        // Shadow
        painter.text(
            pos + egui::vec2(1.0, 1.0),
            egui::Align2::CENTER_CENTER,
            &label.text,
            font_id.clone(),
            colors::LABEL_SHADOW,
        );

        painter.text(
            pos,
            egui::Align2::CENTER_CENTER,
            &label.text,
            font_id.clone(),
            colors::LABEL_TEXT,
        );
    }
}

fn draw_axes(painter: &egui::Painter, placement: Placement, axes: &Axes, text: egui::Color32) {
    let frame = placement.rect;
    painter.rect_stroke(
        frame,
        0.0,
        egui::Stroke::new(1.0, colors::FRAME),
        egui::StrokeKind::Outside,
    );
    let font_id = egui::FontId::proportional(10.0);

    for lon in axes.lon_ticks() {
        let x = placement.to_screen([axes.x_of(lon), 0.0]).x;
        painter.line_segment(
            [egui::pos2(x, frame.bottom()), egui::pos2(x, frame.bottom() + 4.0)],
            egui::Stroke::new(1.0, colors::FRAME),
        );
        painter.text(
            egui::pos2(x, frame.bottom() + 5.0),
            egui::Align2::CENTER_TOP,
            format_degrees(lon, 'E', 'W'),
            font_id.clone(),
            text,
        );
    }
    for lat in axes.lat_ticks() {
        let y = placement.to_screen([0.0, axes.y_of(lat)]).y;
        painter.line_segment(
            [egui::pos2(frame.left() - 4.0, y), egui::pos2(frame.left(), y)],
            egui::Stroke::new(1.0, colors::FRAME),
        );
        painter.text(
            egui::pos2(frame.left() - 5.0, y),
            egui::Align2::RIGHT_CENTER,
            format_degrees(lat, 'N', 'S'),
            font_id.clone(),
            text,
        );
    }
}

fn draw_colorbar(painter: &egui::Painter, rect: egui::Rect, bar: &ColorBar, text: egui::Color32) {
    if bar.colors.is_empty() || bar.max <= bar.min {
        return;
    }
    let step = rect.width() / bar.colors.len() as f32;
    for (i, &[r, g, b]) in bar.colors.iter().enumerate() {
        let cell = egui::Rect::from_min_size(
            rect.min + egui::vec2(i as f32 * step, 0.0),
            egui::vec2(step.ceil(), rect.height()),
        );
        painter.rect_filled(cell, 0.0, egui::Color32::from_rgb(r, g, b));
    }
    painter.rect_stroke(
        rect,
        0.0,
        egui::Stroke::new(1.0, colors::FRAME),
        egui::StrokeKind::Outside,
    );

    let font_id = egui::FontId::proportional(10.0);
    for tick in bar.ticks() {
        let x = rect.left() + (tick - bar.min) / (bar.max - bar.min) * rect.width();
        painter.line_segment(
            [egui::pos2(x, rect.bottom()), egui::pos2(x, rect.bottom() + 3.0)],
            egui::Stroke::new(1.0, colors::FRAME),
        );
        painter.text(
            egui::pos2(x, rect.bottom() + 4.0),
            egui::Align2::CENTER_TOP,
            contour::format_level(tick),
            font_id.clone(),
            text,
        );
    }
    painter.text(
        rect.right_center() + egui::vec2(6.0, 0.0),
        egui::Align2::LEFT_CENTER,
        format!("{} [{}]", bar.label, bar.unit),
        font_id,
        text,
    );
}

fn format_degrees(value: f64, positive: char, negative: char) -> String {
    let hemisphere = if value > 0.0 {
        positive.to_string()
    } else if value < 0.0 {
        negative.to_string()
    } else {
        String::new()
    };
    format!("{}°{hemisphere}", contour::format_level(value.abs() as f32))
}
