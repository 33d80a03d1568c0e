//! The parameter store: named, typed, bounded view parameters.

use crate::colormap::ColorMap;
use crate::error::ValidationError;
use crate::grid::Resolution;
use std::fmt;

/// Every parameter a dashboard can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamName {
    SelectedRegion,
    ZoomWidthPct,
    ZoomLengthPct,
    PanLongitude,
    PanLatitude,
    IsolineInterval,
    ColorMap,
    Resolution,
}

impl ParamName {
    pub const ALL: [ParamName; 8] = [
        ParamName::SelectedRegion,
        ParamName::ZoomWidthPct,
        ParamName::ZoomLengthPct,
        ParamName::PanLongitude,
        ParamName::PanLatitude,
        ParamName::IsolineInterval,
        ParamName::ColorMap,
        ParamName::Resolution,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ParamName::SelectedRegion => "selected_region",
            ParamName::ZoomWidthPct => "zoom_width_pct",
            ParamName::ZoomLengthPct => "zoom_length_pct",
            ParamName::PanLongitude => "pan_longitude",
            ParamName::PanLatitude => "pan_latitude",
            ParamName::IsolineInterval => "isoline_interval",
            ParamName::ColorMap => "color_map",
            ParamName::Resolution => "resolution",
        }
    }
}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bounded floating-point slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberSpec {
    pub label: &'static str,
    pub default: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl NumberSpec {
    fn check(&self, field: ParamName, value: f64) -> Result<f64, ValidationError> {
        if value.is_finite() && (self.min..=self.max).contains(&value) {
            Ok(value)
        } else {
            Err(ValidationError::OutOfBounds {
                field,
                min: self.min,
                max: self.max,
                value,
            })
        }
    }
}

/// A bounded integer slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegerSpec {
    pub label: &'static str,
    pub default: u32,
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

/// A dropdown over a fixed list of options.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceSpec<T> {
    pub label: &'static str,
    pub options: Vec<T>,
    pub default: T,
}

/// Declares which parameters a dashboard offers and their bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSchema {
    pub region: ChoiceSpec<String>,
    pub zoom_width: Option<NumberSpec>,
    pub zoom_length: Option<NumberSpec>,
    pub pan_longitude: NumberSpec,
    pub pan_latitude: NumberSpec,
    pub isolines: IntegerSpec,
    pub color_map: ChoiceSpec<ColorMap>,
    pub resolution: Option<ChoiceSpec<Resolution>>,
}

impl ParamSchema {
    pub fn offers(&self, name: ParamName) -> bool {
        match name {
            ParamName::ZoomWidthPct => self.zoom_width.is_some(),
            ParamName::ZoomLengthPct => self.zoom_length.is_some(),
            ParamName::Resolution => self.resolution.is_some(),
            _ => true,
        }
    }

    /// Initial values. Parameters that are not offered stay at their
    /// neutral value: full zoom and the coarsest resolution.
    pub fn defaults(&self) -> ViewParameters {
        ViewParameters {
            selected_region: self.region.default.clone(),
            zoom_width_pct: self.zoom_width.map_or(100.0, |spec| spec.default),
            zoom_length_pct: self.zoom_length.map_or(100.0, |spec| spec.default),
            pan_longitude: self.pan_longitude.default,
            pan_latitude: self.pan_latitude.default,
            isoline_interval: self.isolines.default,
            color_map: self.color_map.default,
            resolution: self
                .resolution
                .as_ref()
                .map_or(Resolution::OneDegree, |spec| spec.default),
        }
    }
}

/// Current values of all view parameters for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewParameters {
    pub selected_region: String,
    pub zoom_width_pct: f64,
    pub zoom_length_pct: f64,
    pub pan_longitude: f64,
    pub pan_latitude: f64,
    pub isoline_interval: u32,
    pub color_map: ColorMap,
    pub resolution: Resolution,
}

/// A single user edit.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamChange {
    SelectedRegion(String),
    ZoomWidthPct(f64),
    ZoomLengthPct(f64),
    PanLongitude(f64),
    PanLatitude(f64),
    IsolineInterval(u32),
    ColorMap(ColorMap),
    Resolution(Resolution),
}

impl ParamChange {
    pub fn name(&self) -> ParamName {
        match self {
            ParamChange::SelectedRegion(_) => ParamName::SelectedRegion,
            ParamChange::ZoomWidthPct(_) => ParamName::ZoomWidthPct,
            ParamChange::ZoomLengthPct(_) => ParamName::ZoomLengthPct,
            ParamChange::PanLongitude(_) => ParamName::PanLongitude,
            ParamChange::PanLatitude(_) => ParamName::PanLatitude,
            ParamChange::IsolineInterval(_) => ParamName::IsolineInterval,
            ParamChange::ColorMap(_) => ParamName::ColorMap,
            ParamChange::Resolution(_) => ParamName::Resolution,
        }
    }
}

/// Holds the schema and the current values; validates every change.
#[derive(Debug, Clone)]
pub struct ParameterStore {
    schema: ParamSchema,
    values: ViewParameters,
}

impl ParameterStore {
    pub fn new(schema: ParamSchema) -> Self {
        let values = schema.defaults();
        Self { schema, values }
    }

    pub fn schema(&self) -> &ParamSchema {
        &self.schema
    }

    pub fn values(&self) -> &ViewParameters {
        &self.values
    }

    /// Validates and applies a change, returning the parameters whose value
    /// actually changed.
    ///
    /// Any accepted region selection resets zoom to 100% and pan to zero,
    /// whether or not the region itself changed. A rejected change leaves
    /// every value untouched.
    pub fn apply(&mut self, change: ParamChange) -> Result<Vec<ParamName>, ValidationError> {
        let field = change.name();
        if !self.schema.offers(field) {
            return Err(ValidationError::NotOffered(field));
        }

        let mut changed = Vec::new();
        match change {
            ParamChange::SelectedRegion(name) => {
                if !self.schema.region.options.contains(&name) {
                    return Err(ValidationError::UnknownChoice { field, value: name });
                }
                if self.values.selected_region != name {
                    self.values.selected_region = name;
                    changed.push(field);
                }
                self.reset_view(&mut changed);
            }
            ParamChange::ZoomWidthPct(value) => {
                let spec = self.schema.zoom_width.ok_or(ValidationError::NotOffered(field))?;
                let value = spec.check(field, value)?;
                assign(&mut self.values.zoom_width_pct, value, field, &mut changed);
            }
            ParamChange::ZoomLengthPct(value) => {
                let spec = self.schema.zoom_length.ok_or(ValidationError::NotOffered(field))?;
                let value = spec.check(field, value)?;
                assign(&mut self.values.zoom_length_pct, value, field, &mut changed);
            }
            ParamChange::PanLongitude(value) => {
                let value = self.schema.pan_longitude.check(field, value)?;
                assign(&mut self.values.pan_longitude, value, field, &mut changed);
            }
            ParamChange::PanLatitude(value) => {
                let value = self.schema.pan_latitude.check(field, value)?;
                assign(&mut self.values.pan_latitude, value, field, &mut changed);
            }
            ParamChange::IsolineInterval(value) => {
                let spec = self.schema.isolines;
                if !(spec.min..=spec.max).contains(&value) {
                    return Err(ValidationError::OutOfBounds {
                        field,
                        min: f64::from(spec.min),
                        max: f64::from(spec.max),
                        value: f64::from(value),
                    });
                }
                assign(&mut self.values.isoline_interval, value, field, &mut changed);
            }
            ParamChange::ColorMap(map) => {
                if !self.schema.color_map.options.contains(&map) {
                    return Err(ValidationError::UnknownChoice {
                        field,
                        value: map.to_string(),
                    });
                }
                assign(&mut self.values.color_map, map, field, &mut changed);
            }
            ParamChange::Resolution(resolution) => {
                let offered = self
                    .schema
                    .resolution
                    .as_ref()
                    .is_some_and(|spec| spec.options.contains(&resolution));
                if !offered {
                    return Err(ValidationError::UnknownChoice {
                        field,
                        value: resolution.to_string(),
                    });
                }
                assign(&mut self.values.resolution, resolution, field, &mut changed);
            }
        }
        Ok(changed)
    }

    fn reset_view(&mut self, changed: &mut Vec<ParamName>) {
        assign(&mut self.values.zoom_width_pct, 100.0, ParamName::ZoomWidthPct, changed);
        assign(&mut self.values.zoom_length_pct, 100.0, ParamName::ZoomLengthPct, changed);
        assign(&mut self.values.pan_longitude, 0.0, ParamName::PanLongitude, changed);
        assign(&mut self.values.pan_latitude, 0.0, ParamName::PanLatitude, changed);
    }
}

fn assign<T: PartialEq>(slot: &mut T, value: T, name: ParamName, changed: &mut Vec<ParamName>) {
    if *slot != value {
        *slot = value;
        changed.push(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ParamSchema {
        ParamSchema {
            region: ChoiceSpec {
                label: "Region",
                options: vec!["World".to_string(), "Europe".to_string()],
                default: "World".to_string(),
            },
            zoom_width: Some(NumberSpec {
                label: "Zoom x",
                default: 100.0,
                min: 0.0,
                max: 100.0,
                step: 1.0,
            }),
            zoom_length: Some(NumberSpec {
                label: "Zoom y",
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
                label: "Isolines",
                default: 2000,
                min: 100,
                max: 5000,
                step: 100,
            },
            color_map: ChoiceSpec {
                label: "Colour Map",
                options: vec![ColorMap::Geo, ColorMap::Ocean],
                default: ColorMap::Geo,
            },
            resolution: None,
        }
    }

    #[test]
    fn region_change_resets_zoom_and_pan() {
        let mut store = ParameterStore::new(schema());
        store.apply(ParamChange::ZoomWidthPct(40.0)).unwrap();
        store.apply(ParamChange::ZoomLengthPct(10.0)).unwrap();
        store.apply(ParamChange::PanLongitude(20.0)).unwrap();
        store.apply(ParamChange::PanLatitude(-5.0)).unwrap();

        let changed = store
            .apply(ParamChange::SelectedRegion("Europe".to_string()))
            .unwrap();

        let values = store.values();
        assert_eq!(values.selected_region, "Europe");
        assert_eq!(values.zoom_width_pct, 100.0);
        assert_eq!(values.zoom_length_pct, 100.0);
        assert_eq!(values.pan_longitude, 0.0);
        assert_eq!(values.pan_latitude, 0.0);
        assert_eq!(
            changed,
            [
                ParamName::SelectedRegion,
                ParamName::ZoomWidthPct,
                ParamName::ZoomLengthPct,
                ParamName::PanLongitude,
                ParamName::PanLatitude,
            ]
        );
    }

    #[test]
    fn reselecting_same_region_still_resets() {
        let mut store = ParameterStore::new(schema());
        store.apply(ParamChange::PanLongitude(20.0)).unwrap();
        let changed = store
            .apply(ParamChange::SelectedRegion("World".to_string()))
            .unwrap();
        assert_eq!(changed, [ParamName::PanLongitude]);
        assert_eq!(store.values().pan_longitude, 0.0);
    }

    #[test]
    fn out_of_bounds_is_rejected_without_mutation() {
        let mut store = ParameterStore::new(schema());
        store.apply(ParamChange::PanLatitude(12.0)).unwrap();
        let before = store.values().clone();

        let cases = [
            ParamChange::ZoomWidthPct(100.5),
            ParamChange::ZoomLengthPct(-1.0),
            ParamChange::PanLongitude(45.01),
            ParamChange::PanLatitude(f64::NAN),
            ParamChange::IsolineInterval(99),
            ParamChange::IsolineInterval(5001),
        ];
        for change in cases {
            let err = store.apply(change).unwrap_err();
            assert!(matches!(err, ValidationError::OutOfBounds { .. }), "{err}");
            assert_eq!(store.values(), &before);
        }
    }

    #[test]
    fn error_names_field_bounds_and_value() {
        let mut store = ParameterStore::new(schema());
        let err = store.apply(ParamChange::PanLongitude(90.0)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::OutOfBounds {
                field: ParamName::PanLongitude,
                min: -45.0,
                max: 45.0,
                value: 90.0,
            }
        );
        assert_eq!(
            err.to_string(),
            "pan_longitude must be within [-45, 45], got 90"
        );
    }

    #[test]
    fn choices_and_offers_are_enforced() {
        let mut store = ParameterStore::new(schema());
        assert!(matches!(
            store.apply(ParamChange::SelectedRegion("Atlantis".to_string())),
            Err(ValidationError::UnknownChoice { .. })
        ));
        assert!(matches!(
            store.apply(ParamChange::ColorMap(ColorMap::Jet)),
            Err(ValidationError::UnknownChoice { .. })
        ));
        assert_eq!(
            store.apply(ParamChange::Resolution(Resolution::TwoMinutes)),
            Err(ValidationError::NotOffered(ParamName::Resolution))
        );
        assert_eq!(store.values().resolution, Resolution::OneDegree);
    }

    #[test]
    fn bounds_are_inclusive_and_noop_changes_report_nothing() {
        let mut store = ParameterStore::new(schema());
        assert_eq!(
            store.apply(ParamChange::PanLongitude(-45.0)).unwrap(),
            [ParamName::PanLongitude]
        );
        assert!(store.apply(ParamChange::PanLongitude(-45.0)).unwrap().is_empty());
        assert!(store.apply(ParamChange::ZoomWidthPct(0.0)).is_ok());
        assert!(store.apply(ParamChange::IsolineInterval(5000)).is_ok());
    }
}
