//! Change propagation: which renderer watches which parameters, and the
//! per-renderer Idle/Rendering state machine.

use crate::error::RenderError;
use crate::figure::Figure;
use crate::params::ParamName;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The renderers a dashboard can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RendererId {
    /// 3-D shaded perspective of the current region.
    Relief,
    /// 2-D raster with isolines.
    Isolines,
    /// Orthographic globe.
    Globe,
}

impl RendererId {
    pub fn as_str(self) -> &'static str {
        match self {
            RendererId::Relief => "relief",
            RendererId::Isolines => "isolines",
            RendererId::Globe => "globe",
        }
    }
}

impl fmt::Display for RendererId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subscription table: parameter name -> renderers to re-run.
#[derive(Debug, Clone, Default)]
pub struct TriggerTable {
    order: Vec<RendererId>,
    subscribers: HashMap<ParamName, Vec<RendererId>>,
}

impl TriggerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `renderer` to re-run whenever any of `params` changes.
    pub fn watch(mut self, renderer: RendererId, params: &[ParamName]) -> Self {
        if !self.order.contains(&renderer) {
            self.order.push(renderer);
        }
        for &param in params {
            let subscribers = self.subscribers.entry(param).or_default();
            if !subscribers.contains(&renderer) {
                subscribers.push(renderer);
            }
        }
        self
    }

    /// Renderers in registration order.
    pub fn renderers(&self) -> &[RendererId] {
        &self.order
    }

    /// Renderers affected by a set of changed parameters, each listed once,
    /// in registration order.
    pub fn dependents(&self, changed: &[ParamName]) -> Vec<RendererId> {
        self.order
            .iter()
            .copied()
            .filter(|renderer| {
                changed.iter().any(|param| {
                    self.subscribers
                        .get(param)
                        .is_some_and(|subs| subs.contains(renderer))
                })
            })
            .collect()
    }

    /// Parameters watched by a renderer, in [`ParamName::ALL`] order.
    pub fn triggers_of(&self, renderer: RendererId) -> Vec<ParamName> {
        ParamName::ALL
            .into_iter()
            .filter(|param| {
                self.subscribers
                    .get(param)
                    .is_some_and(|subs| subs.contains(&renderer))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    /// Showing the last artifact (if any).
    Idle,
    /// An external call is in flight.
    Rendering,
}

/// Display slot of one renderer.
///
/// A render in flight is never interrupted. Requests that arrive meanwhile
/// are remembered and served by one more render once the current one ends.
#[derive(Debug)]
pub struct RenderSlot {
    renderer: RendererId,
    state: RenderState,
    rerun: bool,
    artifact: Option<Arc<Figure>>,
    revision: u64,
    last_error: Option<String>,
}

impl RenderSlot {
    pub fn new(renderer: RendererId) -> Self {
        Self {
            renderer,
            state: RenderState::Idle,
            rerun: false,
            artifact: None,
            revision: 0,
            last_error: None,
        }
    }

    pub fn renderer(&self) -> RendererId {
        self.renderer
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn artifact(&self) -> Option<&Arc<Figure>> {
        self.artifact.as_ref()
    }

    /// Bumped each time the artifact is replaced.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Message of the most recent failed render, cleared on success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Asks for a render. Returns `true` when the caller should start one
    /// now, `false` when one is already in flight.
    pub fn request(&mut self) -> bool {
        match self.state {
            RenderState::Idle => {
                self.state = RenderState::Rendering;
                true
            }
            RenderState::Rendering => {
                self.rerun = true;
                false
            }
        }
    }

    /// Ends the render in flight. A successful figure replaces the artifact;
    /// a failure keeps the previous one. Returns the error (if any) and
    /// whether another render was requested meanwhile.
    pub fn finish(&mut self, result: Result<Figure, RenderError>) -> (Option<RenderError>, bool) {
        self.state = RenderState::Idle;
        let error = match result {
            Ok(figure) => {
                self.artifact = Some(Arc::new(figure));
                self.revision += 1;
                self.last_error = None;
                None
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
                Some(err)
            }
        };
        (error, std::mem::take(&mut self.rerun))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataUnavailable;
    use crate::region::Region;

    fn table() -> TriggerTable {
        TriggerTable::new()
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
            )
    }

    #[test]
    fn dependents_are_deduplicated_and_ordered() {
        let table = table();
        assert_eq!(
            table.dependents(&[ParamName::ColorMap, ParamName::IsolineInterval]),
            [RendererId::Globe, RendererId::Isolines]
        );
        assert_eq!(
            table.dependents(&[ParamName::SelectedRegion]),
            [RendererId::Isolines]
        );
        assert_eq!(
            table.dependents(&[ParamName::PanLatitude]),
            [RendererId::Globe]
        );
        assert!(table.dependents(&[ParamName::Resolution]).is_empty());
        assert!(table.dependents(&[]).is_empty());
    }

    #[test]
    fn triggers_of_lists_watched_params() {
        assert_eq!(
            table().triggers_of(RendererId::Isolines),
            [
                ParamName::SelectedRegion,
                ParamName::IsolineInterval,
                ParamName::ColorMap
            ]
        );
    }

    #[test]
    fn slot_coalesces_requests_while_rendering() {
        let mut slot = RenderSlot::new(RendererId::Globe);
        assert!(slot.request());
        assert_eq!(slot.state(), RenderState::Rendering);
        assert!(!slot.request());
        assert!(!slot.request());

        let (error, rerun) = slot.finish(Ok(Figure::empty("globe")));
        assert!(error.is_none());
        assert!(rerun);
        assert_eq!(slot.state(), RenderState::Idle);
        assert_eq!(slot.revision(), 1);

        assert!(slot.request());
        let (_, rerun) = slot.finish(Ok(Figure::empty("globe")));
        assert!(!rerun);
        assert_eq!(slot.revision(), 2);
    }

    #[test]
    fn failure_keeps_previous_artifact() {
        let mut slot = RenderSlot::new(RendererId::Relief);
        slot.request();
        slot.finish(Ok(Figure::empty("first")));
        let before = slot.artifact().cloned().unwrap();

        slot.request();
        let (error, _) = slot.finish(Err(RenderError::DataUnavailable(
            DataUnavailable::Empty {
                region: Region::GLOBE,
            },
        )));
        assert!(error.is_some());
        assert!(slot.last_error().is_some());
        assert!(Arc::ptr_eq(slot.artifact().unwrap(), &before));
        assert_eq!(slot.revision(), 1);
    }
}
