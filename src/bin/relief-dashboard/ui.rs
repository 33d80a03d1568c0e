//! UI rendering methods for the dashboard application.

use crate::DashboardApp;
use crate::constants::{SIDEBAR_WIDTH, TEXT_PANEL_SHARE};
use crate::figure_view::draw_figure;
use eframe::egui;
use egui_extras::{Size, StripBuilder};
use relief_dashboard::params::{IntegerSpec, NumberSpec};
use relief_dashboard::text::TextBlock;
use relief_dashboard::{ParamChange, RenderState, RendererId};

impl DashboardApp {
    /// Keyboard shortcuts: `0` re-selects the current region, which resets
    /// zoom and pan.
    pub fn handle_keyboard_input(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Num0)) {
            let region = self.session.params().selected_region.clone();
            self.apply(ParamChange::SelectedRegion(region));
        }
    }

    /// Renders the bottom status bar with the current region and render
    /// states.
    pub fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("0: Reset zoom and pan");
                ui.separator();
                ui.label(format!("Region: {}", self.session.params().selected_region));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    for &renderer in self.session.renderers().iter().rev() {
                        let state = match self.session.state(renderer) {
                            RenderState::Idle => "idle",
                            RenderState::Rendering => "rendering",
                        };
                        ui.label(format!("{renderer}: {state}"));
                    }
                });
            });
        });
    }

    /// Renders the left sidebar panel.
    pub fn show_sidebar(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("sidebar")
            .exact_width(SIDEBAR_WIDTH)
            .resizable(false)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.show_sidebar_content(ui);
                });
            });
    }

    /// One widget per parameter the dashboard offers. Widgets show the
    /// stored value each frame, so a rejected change snaps back.
    fn show_sidebar_content(&mut self, ui: &mut egui::Ui) {
        ui.add_space(4.0);
        ui.heading(self.session.dashboard().title());
        ui.separator();

        let schema = self.session.schema().clone();
        let params = self.session.params().clone();
        let mut changes = Vec::new();

        let mut region = params.selected_region.clone();
        ui.label(schema.region.label);
        egui::ComboBox::from_id_salt("region")
            .selected_text(&region)
            .width(SIDEBAR_WIDTH - 20.0)
            .show_ui(ui, |ui| {
                for option in &schema.region.options {
                    ui.selectable_value(&mut region, option.clone(), option);
                }
            });
        if region != params.selected_region {
            changes.push(ParamChange::SelectedRegion(region));
        }

        ui.add_space(8.0);
        if let Some(spec) = schema.zoom_width
            && let Some(value) = number_slider(ui, spec, params.zoom_width_pct)
        {
            changes.push(ParamChange::ZoomWidthPct(value));
        }
        if let Some(spec) = schema.zoom_length
            && let Some(value) = number_slider(ui, spec, params.zoom_length_pct)
        {
            changes.push(ParamChange::ZoomLengthPct(value));
        }
        if let Some(value) = number_slider(ui, schema.pan_longitude, params.pan_longitude) {
            changes.push(ParamChange::PanLongitude(value));
        }
        if let Some(value) = number_slider(ui, schema.pan_latitude, params.pan_latitude) {
            changes.push(ParamChange::PanLatitude(value));
        }
        if let Some(value) = integer_slider(ui, schema.isolines, params.isoline_interval) {
            changes.push(ParamChange::IsolineInterval(value));
        }

        ui.add_space(8.0);
        let mut color_map = params.color_map;
        ui.label(schema.color_map.label);
        egui::ComboBox::from_id_salt("color_map")
            .selected_text(color_map.as_str())
            .show_ui(ui, |ui| {
                for &option in &schema.color_map.options {
                    ui.selectable_value(&mut color_map, option, option.as_str());
                }
            });
        if color_map != params.color_map {
            changes.push(ParamChange::ColorMap(color_map));
        }

        if let Some(spec) = &schema.resolution {
            let mut resolution = params.resolution;
            ui.label(spec.label);
            egui::ComboBox::from_id_salt("resolution")
                .selected_text(resolution.as_str())
                .show_ui(ui, |ui| {
                    for &option in &spec.options {
                        ui.selectable_value(&mut resolution, option, option.as_str());
                    }
                });
            if resolution != params.resolution {
                changes.push(ParamChange::Resolution(resolution));
            }
        }

        for change in changes {
            self.apply(change);
        }
    }

    /// Renders the figures side by side, each above its text panel.
    pub fn show_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let renderers = self.session.renderers();
            StripBuilder::new(ui)
                .sizes(Size::remainder(), renderers.len())
                .horizontal(|mut strip| {
                    for &renderer in renderers {
                        strip.cell(|ui| self.show_column(ui, ctx, renderer));
                    }
                });
        });
    }

    fn show_column(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, renderer: RendererId) {
        match self.session.text_panel(renderer) {
            Some(text) => {
                StripBuilder::new(ui)
                    .size(Size::remainder())
                    .size(Size::relative(TEXT_PANEL_SHARE))
                    .vertical(|mut strip| {
                        strip.cell(|ui| self.show_figure(ui, ctx, renderer));
                        strip.cell(|ui| {
                            egui::ScrollArea::vertical()
                                .id_salt(renderer.as_str())
                                .show(ui, |ui| show_text_block(ui, text));
                        });
                    });
            }
            None => self.show_figure(ui, ctx, renderer),
        }
    }

    fn show_figure(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, renderer: RendererId) {
        let rect = ui.available_rect_before_wrap();
        ui.allocate_rect(rect, egui::Sense::hover());

        let Some(figure) = self.session.artifact(renderer).cloned() else {
            ui.put(rect, egui::Spinner::new());
            return;
        };
        let texture = self
            .textures
            .get(ctx, renderer, self.session.revision(renderer), &figure);
        draw_figure(ui, rect, &figure, texture);

        if self.session.state(renderer) == RenderState::Rendering {
            let corner = egui::Rect::from_min_size(rect.right_top() + egui::vec2(-24.0, 4.0), egui::vec2(20.0, 20.0));
            ui.put(corner, egui::Spinner::new());
        }
        if let Some(err) = self.session.last_error(renderer) {
            ui.painter().text(
                rect.left_bottom() + egui::vec2(4.0, -4.0),
                egui::Align2::LEFT_BOTTOM,
                format!("Showing previous figure: {err}"),
                egui::FontId::proportional(11.0),
                ui.visuals().warn_fg_color,
            );
        }
    }
}

/// Slider for a real-valued parameter. Returns the new value when moved.
fn number_slider(ui: &mut egui::Ui, spec: NumberSpec, current: f64) -> Option<f64> {
    let mut value = current;
    ui.label(spec.label);
    let response = ui.add(egui::Slider::new(&mut value, spec.min..=spec.max).step_by(spec.step));
    (response.changed() && value != current).then_some(value)
}

fn integer_slider(ui: &mut egui::Ui, spec: IntegerSpec, current: u32) -> Option<u32> {
    let mut value = current;
    ui.label(spec.label);
    let response = ui.add(
        egui::Slider::new(&mut value, spec.min..=spec.max).step_by(f64::from(spec.step)),
    );
    (response.changed() && value != current).then_some(value)
}

fn show_text_block(ui: &mut egui::Ui, block: &TextBlock) {
    ui.heading(block.title);
    for section in block.sections {
        if !section.heading.is_empty() {
            ui.add_space(6.0);
            ui.strong(section.heading);
        }
        ui.label(section.body);
    }
    if !block.references.is_empty() {
        ui.add_space(6.0);
        ui.strong("References");
        for reference in block.references {
            ui.horizontal_wrapped(|ui| {
                ui.label(reference.citation);
                ui.hyperlink_to(reference.title, reference.url);
            });
        }
    }
}
