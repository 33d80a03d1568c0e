//! Interactive relief and isoline dashboards over global elevation grids.
//!
//! The library holds everything that is not presentation: the bounding-box
//! reference table, the parameter store, region math, change propagation,
//! grid sources and the renderers that turn a grid into a [`figure::Figure`].

pub mod assets;
pub mod bbox;
pub mod colormap;
pub mod config;
pub mod contour;
pub mod dashboard;
pub mod error;
pub mod figure;
pub mod grid;
pub mod params;
pub mod propagation;
pub mod region;
pub mod render;
pub mod session;
pub mod sources;
pub mod text;

pub use bbox::{BoundingBox, BoundingBoxTable};
pub use colormap::{ColorMap, Palettes};
pub use dashboard::Dashboard;
pub use error::{DataUnavailable, RenderError, StartupError, ValidationError};
pub use figure::Figure;
pub use grid::{Dataset, Grid, GridRequest, GridSource, Resolution};
pub use params::{ParamChange, ParamName, ParameterStore, ViewParameters};
pub use propagation::{RenderState, RendererId, TriggerTable};
pub use region::{Region, compute_region};
pub use session::{RenderJob, Session};
