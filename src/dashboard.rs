//! The two dashboard variants: which parameters they offer, which
//! renderers they bind, and what each renderer is asked to draw.

use crate::bbox::{BoundingBox, BoundingBoxTable};
use crate::colormap::ColorMap;
use crate::error::{RenderError, StartupError};
use crate::grid::Resolution;
use crate::params::{ChoiceSpec, IntegerSpec, NumberSpec, ParamName, ParamSchema, ViewParameters};
use crate::propagation::{RendererId, TriggerTable};
use crate::region::{Region, compute_region};
use crate::render::{PlaceLabel, RenderSpec};
use crate::text::{self, TextBlock};

/// Continents offered by the public dashboard and labelled on its globe.
pub const CONTINENTS: [&str; 6] = [
    "Europe",
    "Asia",
    "Africa",
    "North America",
    "South America",
    "Oceania",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Dashboard {
    /// 3-D relief and 2-D isolines with zoom, pan and resolution controls.
    #[default]
    Scientific,
    /// Rotatable globe plus a per-continent isoline map with explanatory text.
    Public,
}

impl Dashboard {
    pub fn title(self) -> &'static str {
        match self {
            Dashboard::Scientific => "Scientific Visualisation",
            Dashboard::Public => "Public Interactive Visualisation",
        }
    }

    /// Renderers in layout order.
    pub fn renderers(self) -> &'static [RendererId] {
        match self {
            Dashboard::Scientific => &[RendererId::Relief, RendererId::Isolines],
            Dashboard::Public => &[RendererId::Globe, RendererId::Isolines],
        }
    }

    pub fn schema(self, boxes: &BoundingBoxTable) -> Result<ParamSchema, StartupError> {
        let require = |name: &str| {
            if boxes.contains(name) {
                Ok(name.to_string())
            } else {
                Err(StartupError::MissingRegion(name.to_string()))
            }
        };

        let schema = match self {
            Dashboard::Scientific => ParamSchema {
                region: ChoiceSpec {
                    label: "Select Continent / Region",
                    options: boxes.names().map(str::to_string).collect(),
                    default: require("World")?,
                },
                zoom_width: Some(NumberSpec {
                    label: "Zoom x / Region Width (%)",
                    default: 100.0,
                    min: 0.0,
                    max: 100.0,
                    step: 1.0,
                }),
                zoom_length: Some(NumberSpec {
                    label: "Zoom y / Region Length (%)",
                    default: 100.0,
                    min: 0.0,
                    max: 100.0,
                    step: 1.0,
                }),
                pan_longitude: NumberSpec {
                    label: "Pan Longitude",
                    default: 0.0,
                    min: -45.0,
                    max: 45.0,
                    step: 1.0,
                },
                pan_latitude: NumberSpec {
                    label: "Pan Latitude",
                    default: 0.0,
                    min: -45.0,
                    max: 45.0,
                    step: 1.0,
                },
                isolines: IntegerSpec {
                    label: "Isoline Density",
                    default: 2000,
                    min: 100,
                    max: 5000,
                    step: 100,
                },
                color_map: ChoiceSpec {
                    label: "Colour Map",
                    options: ColorMap::ALL.to_vec(),
                    default: ColorMap::Geo,
                },
                resolution: Some(ChoiceSpec {
                    label: "Resolution",
                    options: Resolution::ALL.to_vec(),
                    default: Resolution::OneDegree,
                }),
            },
            Dashboard::Public => ParamSchema {
                region: ChoiceSpec {
                    label: "Select Continent",
                    options: CONTINENTS
                        .into_iter()
                        .map(require)
                        .collect::<Result<_, _>>()?,
                    default: require("Europe")?,
                },
                zoom_width: None,
                zoom_length: None,
                pan_longitude: NumberSpec {
                    label: "Pan Longitude",
                    default: 0.0,
                    min: -180.0,
                    max: 180.0,
                    step: 45.0,
                },
                pan_latitude: NumberSpec {
                    label: "Pan Latitude",
                    default: 0.0,
                    min: -90.0,
                    max: 90.0,
                    step: 45.0,
                },
                isolines: IntegerSpec {
                    label: "Isoline Density",
                    default: 2400,
                    min: 100,
                    max: 5000,
                    step: 200,
                },
                color_map: ChoiceSpec {
                    label: "Colour Map",
                    options: vec![ColorMap::Geo, ColorMap::Viridis, ColorMap::Ocean],
                    default: ColorMap::Geo,
                },
                resolution: None,
            },
        };
        Ok(schema)
    }

    /// Which parameter changes re-run which renderer.
    pub fn triggers(self) -> TriggerTable {
        match self {
            Dashboard::Scientific => TriggerTable::new()
                .watch(RendererId::Relief, &ParamName::ALL)
                .watch(RendererId::Isolines, &ParamName::ALL),
            Dashboard::Public => TriggerTable::new()
                .watch(
                    RendererId::Globe,
                    &[
                        ParamName::PanLongitude,
                        ParamName::PanLatitude,
                        ParamName::IsolineInterval,
                        ParamName::ColorMap,
                    ],
                )
                .watch(
                    RendererId::Isolines,
                    &[
                        ParamName::SelectedRegion,
                        ParamName::IsolineInterval,
                        ParamName::ColorMap,
                    ],
                ),
        }
    }

    /// Describes what `renderer` should draw for the current parameters.
    pub fn render_spec(
        self,
        renderer: RendererId,
        boxes: &BoundingBoxTable,
        params: &ViewParameters,
    ) -> Result<RenderSpec, RenderError> {
        let selected = || {
            boxes
                .get(&params.selected_region)
                .ok_or_else(|| RenderError::UnknownRegion(params.selected_region.clone()))
        };

        let spec = match (self, renderer) {
            (Dashboard::Scientific, RendererId::Relief) => RenderSpec::Relief {
                region: scientific_region(selected()?, params),
                resolution: params.resolution,
                color_map: params.color_map,
            },
            (Dashboard::Scientific, _) => RenderSpec::Isolines {
                region: scientific_region(selected()?, params),
                resolution: params.resolution,
                color_map: params.color_map,
                interval: params.isoline_interval,
                colorbar: true,
            },
            (Dashboard::Public, RendererId::Globe) => RenderSpec::Globe {
                center_lon: params.pan_longitude,
                center_lat: params.pan_latitude,
                color_map: params.color_map,
                interval: params.isoline_interval,
                labels: CONTINENTS
                    .into_iter()
                    .filter_map(|name| {
                        let (lon, lat) = boxes.get(name)?.centroid();
                        Some(PlaceLabel {
                            text: name.to_string(),
                            lon,
                            lat,
                        })
                    })
                    .collect(),
            },
            (Dashboard::Public, _) => RenderSpec::Isolines {
                region: selected()?.region(),
                resolution: Resolution::OneDegree,
                color_map: params.color_map,
                interval: params.isoline_interval,
                colorbar: false,
            },
        };
        Ok(spec)
    }

    /// Explanatory text shown under a renderer's figure, if any.
    pub fn text_panel(
        self,
        renderer: RendererId,
        params: &ViewParameters,
    ) -> Option<&'static TextBlock> {
        match (self, renderer) {
            (Dashboard::Public, RendererId::Globe) => text::color_map_text(params.color_map),
            (Dashboard::Public, RendererId::Isolines) => {
                text::continent_text(&params.selected_region)
            }
            _ => None,
        }
    }
}

fn scientific_region(bbox: &BoundingBox, params: &ViewParameters) -> Region {
    compute_region(
        bbox,
        params.zoom_width_pct,
        params.zoom_length_pct,
        params.pan_longitude,
        params.pan_latitude,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ParamChange, ParameterStore};

    fn boxes() -> BoundingBoxTable {
        BoundingBoxTable::embedded().unwrap()
    }

    #[test]
    fn scientific_offers_every_region_and_parameter() {
        let boxes = boxes();
        let schema = Dashboard::Scientific.schema(&boxes).unwrap();
        assert_eq!(schema.region.options.len(), boxes.len());
        assert_eq!(schema.region.default, "World");
        assert!(ParamName::ALL.iter().all(|&p| schema.offers(p)));
    }

    #[test]
    fn public_offers_continents_without_zoom_or_resolution() {
        let schema = Dashboard::Public.schema(&boxes()).unwrap();
        assert_eq!(schema.region.options, CONTINENTS.map(str::to_string));
        assert_eq!(schema.region.default, "Europe");
        assert!(!schema.offers(ParamName::ZoomWidthPct));
        assert!(!schema.offers(ParamName::Resolution));
        assert_eq!(schema.pan_longitude.max, 180.0);
        assert_eq!(schema.pan_latitude.min, -90.0);
    }

    #[test]
    fn public_schema_requires_continents() {
        let csv = b"country,longmin,longmax,latmin,latmax\nEurope,-28,53,34,71\n";
        let boxes = BoundingBoxTable::from_latin1(csv).unwrap();
        assert!(matches!(
            Dashboard::Public.schema(&boxes),
            Err(StartupError::MissingRegion(name)) if name == "Asia"
        ));
    }

    #[test]
    fn public_isolines_ignore_pan() {
        let boxes = boxes();
        let mut store = ParameterStore::new(Dashboard::Public.schema(&boxes).unwrap());
        store
            .apply(ParamChange::PanLongitude(90.0))
            .unwrap();
        let spec = Dashboard::Public
            .render_spec(RendererId::Isolines, &boxes, store.values())
            .unwrap();
        match spec {
            RenderSpec::Isolines {
                region, colorbar, ..
            } => {
                assert_eq!(region, Region::new(-28.0, 53.0, 34.0, 71.0));
                assert!(!colorbar);
            }
            other => panic!("unexpected spec {other:?}"),
        }
    }

    #[test]
    fn globe_is_centred_on_pan_and_labels_continents() {
        let boxes = boxes();
        let mut store = ParameterStore::new(Dashboard::Public.schema(&boxes).unwrap());
        store
            .apply(ParamChange::PanLatitude(45.0))
            .unwrap();
        let spec = Dashboard::Public
            .render_spec(RendererId::Globe, &boxes, store.values())
            .unwrap();
        let RenderSpec::Globe {
            center_lat, labels, ..
        } = spec
        else {
            panic!("expected globe spec");
        };
        assert_eq!(center_lat, 45.0);
        assert_eq!(labels.len(), CONTINENTS.len());
        let europe = labels.iter().find(|l| l.text == "Europe").unwrap();
        assert_eq!((europe.lon, europe.lat), (12.5, 52.5));
    }

    #[test]
    fn text_panels_follow_dashboard() {
        let boxes = boxes();
        let store = ParameterStore::new(Dashboard::Public.schema(&boxes).unwrap());
        assert_eq!(
            Dashboard::Public.text_panel(RendererId::Isolines, store.values()),
            Some(&text::EUROPE)
        );
        assert_eq!(
            Dashboard::Public.text_panel(RendererId::Globe, store.values()),
            Some(&text::GEO)
        );
        assert!(
            Dashboard::Scientific
                .text_panel(RendererId::Relief, store.values())
                .is_none()
        );
    }
}
