//! Per-dashboard session state.
//!
//! A [`Session`] owns the parameter store and one display slot per renderer.
//! It never renders by itself: changes come in, [`RenderJob`]s go out, and
//! the caller reports each job's outcome back through [`Session::complete`].
//! This keeps the state single-threaded while grid fetches run elsewhere.

use crate::bbox::BoundingBoxTable;
use crate::dashboard::Dashboard;
use crate::error::{RenderError, StartupError, ValidationError};
use crate::figure::Figure;
use crate::params::{ParamChange, ParamSchema, ParameterStore, ViewParameters};
use crate::propagation::{RenderSlot, RenderState, RendererId, TriggerTable};
use crate::render::RenderSpec;
use crate::text::TextBlock;
use std::sync::Arc;

/// A render to run for one renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderJob {
    pub renderer: RendererId,
    pub spec: RenderSpec,
}

pub struct Session {
    dashboard: Dashboard,
    boxes: BoundingBoxTable,
    store: ParameterStore,
    triggers: TriggerTable,
    slots: Vec<RenderSlot>,
    errors: Vec<String>,
}

impl Session {
    pub fn new(dashboard: Dashboard, boxes: BoundingBoxTable) -> Result<Self, StartupError> {
        let store = ParameterStore::new(dashboard.schema(&boxes)?);
        let triggers = dashboard.triggers();
        let slots = dashboard
            .renderers()
            .iter()
            .map(|&renderer| RenderSlot::new(renderer))
            .collect();
        log::info!(
            "Started {} dashboard with {} regions",
            dashboard.title(),
            store.schema().region.options.len()
        );

        Ok(Self {
            dashboard,
            boxes,
            store,
            triggers,
            slots,
            errors: Vec::new(),
        })
    }

    /// Initial render of every view.
    pub fn start(&mut self) -> Vec<RenderJob> {
        self.dashboard
            .renderers()
            .iter()
            .filter_map(|&renderer| self.request(renderer))
            .collect()
    }

    /// Applies a user change and returns the renders it starts.
    ///
    /// Renderers already busy are flagged and re-run once their current job
    /// completes, so no job is returned for them now.
    pub fn apply(&mut self, change: ParamChange) -> Result<Vec<RenderJob>, ValidationError> {
        let changed = self.store.apply(change)?;
        if changed.is_empty() {
            return Ok(Vec::new());
        }
        log::debug!("Changed {changed:?}");

        Ok(self
            .triggers
            .dependents(&changed)
            .into_iter()
            .filter_map(|renderer| self.request(renderer))
            .collect())
    }

    /// Records the outcome of a job. Returns the follow-up job when the
    /// parameters changed while it ran.
    pub fn complete(
        &mut self,
        renderer: RendererId,
        result: Result<Figure, RenderError>,
    ) -> Option<RenderJob> {
        let slot = self.slot_mut(renderer)?;
        let (error, rerun) = slot.finish(result);
        if let Some(err) = error {
            log::warn!("{renderer} render failed: {err}");
            self.errors.push(format!("{renderer}: {err}"));
        }
        if rerun { self.request(renderer) } else { None }
    }

    /// Render failures since the last call, oldest first.
    pub fn take_errors(&mut self) -> Vec<String> {
        std::mem::take(&mut self.errors)
    }

    pub fn dashboard(&self) -> Dashboard {
        self.dashboard
    }

    pub fn schema(&self) -> &ParamSchema {
        self.store.schema()
    }

    pub fn params(&self) -> &ViewParameters {
        self.store.values()
    }

    pub fn boxes(&self) -> &BoundingBoxTable {
        &self.boxes
    }

    pub fn triggers(&self) -> &TriggerTable {
        &self.triggers
    }

    pub fn renderers(&self) -> &'static [RendererId] {
        self.dashboard.renderers()
    }

    pub fn artifact(&self, renderer: RendererId) -> Option<&Arc<Figure>> {
        self.slot(renderer)?.artifact()
    }

    pub fn revision(&self, renderer: RendererId) -> u64 {
        self.slot(renderer).map_or(0, RenderSlot::revision)
    }

    pub fn state(&self, renderer: RendererId) -> RenderState {
        self.slot(renderer)
            .map_or(RenderState::Idle, RenderSlot::state)
    }

    pub fn last_error(&self, renderer: RendererId) -> Option<&str> {
        self.slot(renderer)?.last_error()
    }

    pub fn text_panel(&self, renderer: RendererId) -> Option<&'static TextBlock> {
        self.dashboard.text_panel(renderer, self.store.values())
    }

    fn slot(&self, renderer: RendererId) -> Option<&RenderSlot> {
        self.slots.iter().find(|slot| slot.renderer() == renderer)
    }

    fn slot_mut(&mut self, renderer: RendererId) -> Option<&mut RenderSlot> {
        self.slots.iter_mut().find(|slot| slot.renderer() == renderer)
    }

    fn request(&mut self, renderer: RendererId) -> Option<RenderJob> {
        if !self.slot_mut(renderer)?.request() {
            return None;
        }
        match self
            .dashboard
            .render_spec(renderer, &self.boxes, self.store.values())
        {
            Ok(spec) => Some(RenderJob { renderer, spec }),
            Err(err) => {
                // The slot went to Rendering above; close it out as failed.
                self.complete(renderer, Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormap::ColorMap;
    use crate::error::DataUnavailable;
    use crate::region::Region;

    fn public() -> Session {
        Session::new(Dashboard::Public, BoundingBoxTable::embedded().unwrap()).unwrap()
    }

    fn scientific() -> Session {
        Session::new(Dashboard::Scientific, BoundingBoxTable::embedded().unwrap()).unwrap()
    }

    #[test]
    fn start_requests_every_renderer_once() {
        let mut session = public();
        let jobs = session.start();
        let renderers: Vec<_> = jobs.iter().map(|job| job.renderer).collect();
        assert_eq!(renderers, [RendererId::Globe, RendererId::Isolines]);
        assert_eq!(session.state(RendererId::Globe), RenderState::Rendering);
        assert!(session.start().is_empty());
    }

    #[test]
    fn changes_only_start_dependent_renderers() {
        let mut session = public();
        for job in session.start() {
            session.complete(job.renderer, Ok(Figure::empty("x")));
        }

        let jobs = session.apply(ParamChange::PanLongitude(45.0)).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].renderer, RendererId::Globe);

        let jobs = session
            .apply(ParamChange::SelectedRegion("Asia".to_string()))
            .unwrap();
        let renderers: Vec<_> = jobs.iter().map(|job| job.renderer).collect();
        // The pan reset is a change too, but the globe is still busy.
        assert_eq!(renderers, [RendererId::Isolines]);
    }

    #[test]
    fn unchanged_values_start_nothing() {
        let mut session = scientific();
        for job in session.start() {
            session.complete(job.renderer, Ok(Figure::empty("x")));
        }
        assert!(
            session
                .apply(ParamChange::ColorMap(ColorMap::Geo))
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn busy_renderer_runs_again_with_latest_values() {
        let mut session = scientific();
        let first = session.start();
        assert_eq!(first.len(), 2);

        assert!(session.apply(ParamChange::ZoomWidthPct(50.0)).unwrap().is_empty());
        assert!(session.apply(ParamChange::ZoomWidthPct(40.0)).unwrap().is_empty());

        let follow_up = session
            .complete(RendererId::Relief, Ok(Figure::empty("relief")))
            .unwrap();
        let RenderSpec::Relief { region, .. } = follow_up.spec else {
            panic!("expected relief spec");
        };
        assert_eq!(region.width(), 144.0);
        assert!(
            session
                .complete(RendererId::Relief, Ok(Figure::empty("relief")))
                .is_none()
        );
        assert_eq!(session.revision(RendererId::Relief), 2);
    }

    #[test]
    fn failures_keep_the_previous_figure() {
        let mut session = scientific();
        session.start();
        session.complete(RendererId::Isolines, Ok(Figure::empty("first")));

        session.apply(ParamChange::PanLatitude(45.0)).unwrap();
        let region = Region::new(-180.0, 180.0, -45.0, 135.0);
        session.complete(
            RendererId::Isolines,
            Err(DataUnavailable::InvalidRegion {
                region,
                reason: "latitude outside [-90, 90]",
            }
            .into()),
        );

        assert_eq!(session.artifact(RendererId::Isolines).unwrap().title, "first");
        assert!(session.last_error(RendererId::Isolines).is_some());
        let errors = session.take_errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("isolines:"));
        assert!(session.take_errors().is_empty());
    }

    #[test]
    fn rejected_change_leaves_everything_untouched() {
        let mut session = scientific();
        session.start();
        let before = session.params().clone();
        assert!(session.apply(ParamChange::PanLongitude(90.0)).is_err());
        assert_eq!(session.params(), &before);
    }
}
