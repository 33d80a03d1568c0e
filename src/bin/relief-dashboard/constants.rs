/// Width of the sidebar panel in pixels.
pub const SIDEBAR_WIDTH: f32 = 240.0;

/// Height reserved above each figure for its title.
pub const TITLE_HEIGHT: f32 = 22.0;

/// Height reserved below a figure for its colour bar and tick labels.
pub const COLORBAR_HEIGHT: f32 = 46.0;

/// Margin left around a figure for axis tick labels.
pub const AXIS_MARGIN: f32 = 34.0;

/// Share of a column's height given to the descriptive text panel.
pub const TEXT_PANEL_SHARE: f32 = 0.38;

/// Isoline stroke widths, in points.
pub const CONTOUR_WIDTH: f32 = 0.8;
pub const ANNOTATED_CONTOUR_WIDTH: f32 = 1.4;
