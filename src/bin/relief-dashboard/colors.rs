//! Color constants for figure overlays and UI elements.

use eframe::egui::Color32;

// Isolines
pub const CONTOUR_LINE: Color32 = Color32::from_rgba_premultiplied(20, 20, 20, 200);
pub const ANNOTATED_CONTOUR_LINE: Color32 = Color32::from_rgb(0, 0, 0);

// Text colors
pub const ANNOTATION_TEXT: Color32 = Color32::from_rgb(20, 20, 20);
pub const ANNOTATION_HALO: Color32 = Color32::from_rgba_premultiplied(230, 230, 230, 200);
pub const LABEL_TEXT: Color32 = Color32::from_rgba_premultiplied(255, 255, 255, 230);
pub const LABEL_SHADOW: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 180);

// Frame, ticks and colour bar outline
pub const FRAME: Color32 = Color32::from_gray(90);
