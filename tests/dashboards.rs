//! End-to-end behaviour of both dashboards with an in-memory grid source.

use relief_dashboard::colormap::Palettes;
use relief_dashboard::render::{self, RenderSpec};
use relief_dashboard::text;
use relief_dashboard::{
    BoundingBoxTable, ColorMap, Dashboard, DataUnavailable, Dataset, Grid, GridRequest,
    GridSource, ParamChange, ParamName, Region, RenderError, RenderJob, RenderState,
    RendererId, Session,
};
use std::sync::Mutex;

/// Serves a smooth synthetic relief for any region and logs every request.
#[derive(Default)]
struct Synthetic {
    requests: Mutex<Vec<GridRequest>>,
}

impl Synthetic {
    fn requests(&self) -> Vec<GridRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl GridSource for Synthetic {
    fn load(&self, request: &GridRequest) -> Result<Grid, DataUnavailable> {
        self.requests.lock().unwrap().push(*request);
        let (w, h) = (37, 19);
        let region = request.region;
        let values = (0..w * h)
            .map(|i| {
                let lon = region.west + (i % w) as f64 / (w - 1) as f64 * region.width();
                let lat = region.north - (i / w) as f64 / (h - 1) as f64 * region.length();
                (4000.0 * lat.to_radians().cos() * lon.to_radians().sin() - 1500.0) as f32
            })
            .collect();
        Grid::new(region, w, h, values)
    }
}

/// Runs jobs to completion the way the GUI worker does, including follow-ups.
fn drain(session: &mut Session, source: &dyn GridSource, jobs: Vec<RenderJob>) {
    let palettes = Palettes::embedded().unwrap();
    let mut queue = jobs;
    while let Some(job) = queue.pop() {
        let result = render::execute(&job.spec, source, &palettes);
        queue.extend(session.complete(job.renderer, result));
    }
}

fn session(dashboard: Dashboard) -> Session {
    Session::new(dashboard, BoundingBoxTable::embedded().unwrap()).unwrap()
}

fn spec_region(job: &RenderJob) -> Region {
    match job.spec {
        RenderSpec::Relief { region, .. } | RenderSpec::Isolines { region, .. } => region,
        RenderSpec::Globe { .. } => Region::GLOBE,
    }
}

#[test]
fn half_zoom_on_europe_halves_the_requested_region() {
    let source = Synthetic::default();
    let mut session = session(Dashboard::Scientific);
    let jobs = session.start();
    drain(&mut session, &source, jobs);

    let jobs = session
        .apply(ParamChange::SelectedRegion("Europe".to_string()))
        .unwrap();
    drain(&mut session, &source, jobs);
    // The width-change jobs stay in flight while the other changes arrive.
    let in_flight = session.apply(ParamChange::ZoomWidthPct(50.0)).unwrap();
    assert_eq!(in_flight.len(), 2);
    let jobs = session.apply(ParamChange::ZoomLengthPct(50.0)).unwrap();
    assert!(jobs.is_empty(), "both views are still rendering the width change");

    let jobs = session.apply(ParamChange::ColorMap(ColorMap::Relief)).unwrap();
    assert!(jobs.is_empty());
    let mut followed = Vec::new();
    for renderer in [RendererId::Relief, RendererId::Isolines] {
        followed.extend(session.complete(renderer, Ok(relief_dashboard::Figure::empty("x"))));
    }
    assert_eq!(followed.len(), 2);
    for job in &followed {
        assert_eq!(spec_region(job), Region::new(-7.75, 32.75, 43.25, 61.75));
    }
    drain(&mut session, &source, followed);

    let last = source.requests().pop().unwrap();
    assert_eq!(last.region, Region::new(-7.75, 32.75, 43.25, 61.75));
    assert_eq!(session.state(RendererId::Relief), RenderState::Idle);
}

#[test]
fn selecting_a_region_resets_pan_before_rendering() {
    let source = Synthetic::default();
    let mut session = session(Dashboard::Scientific);
    let jobs = session.start();
    drain(&mut session, &source, jobs);

    let jobs = session
        .apply(ParamChange::SelectedRegion("Africa".to_string()))
        .unwrap();
    drain(&mut session, &source, jobs);
    let jobs = session.apply(ParamChange::PanLongitude(20.0)).unwrap();
    drain(&mut session, &source, jobs);
    assert_eq!(session.params().pan_longitude, 20.0);

    let jobs = session
        .apply(ParamChange::SelectedRegion("World".to_string()))
        .unwrap();
    assert_eq!(session.params().pan_longitude, 0.0);
    assert_eq!(session.params().zoom_width_pct, 100.0);
    assert_eq!(jobs.len(), 2);
    let world = session.boxes().get("World").unwrap().region();
    assert_eq!(world, Region::new(-180.0, 180.0, -80.0, 85.0));
    for job in &jobs {
        assert_eq!(spec_region(job), world);
    }
}

#[test]
fn panning_the_world_either_way_renders() {
    let source = Synthetic::default();
    let mut session = session(Dashboard::Scientific);
    let jobs = session.start();
    drain(&mut session, &source, jobs);

    for pan in [-20.0, -1.0, 20.0] {
        let jobs = session.apply(ParamChange::PanLongitude(pan)).unwrap();
        assert_eq!(jobs.len(), 2);
        drain(&mut session, &source, jobs);

        let last = source.requests().pop().unwrap();
        assert_eq!(last.region, Region::new(-180.0 + pan, 180.0 + pan, -80.0, 85.0));
        assert!(session.last_error(RendererId::Relief).is_none(), "pan {pan}");
        assert!(session.last_error(RendererId::Isolines).is_none(), "pan {pan}");
    }
    assert!(session.take_errors().is_empty());
}

#[test]
fn failed_fetch_keeps_the_previous_figure() {
    let source = Synthetic::default();
    let mut session = session(Dashboard::Scientific);
    let jobs = session.start();
    drain(&mut session, &source, jobs);
    let before = session.artifact(RendererId::Isolines).unwrap().clone();
    let revision = session.revision(RendererId::Isolines);
    let fetched = source.requests().len();

    // World panned north runs past the pole.
    let jobs = session.apply(ParamChange::PanLatitude(30.0)).unwrap();
    drain(&mut session, &source, jobs);

    assert_eq!(source.requests().len(), fetched, "invalid regions are never fetched");
    assert!(std::sync::Arc::ptr_eq(
        session.artifact(RendererId::Isolines).unwrap(),
        &before
    ));
    assert_eq!(session.revision(RendererId::Isolines), revision);
    assert!(session.last_error(RendererId::Isolines).is_some());

    let errors = session.take_errors();
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|e| e.contains("latitude")));
    assert_eq!(session.state(RendererId::Isolines), RenderState::Idle);
}

#[test]
fn source_failures_surface_as_data_unavailable() {
    struct Offline;
    impl GridSource for Offline {
        fn load(&self, request: &GridRequest) -> Result<Grid, DataUnavailable> {
            Err(DataUnavailable::Status {
                url: format!("https://example.org/{}", request.dataset),
                status: 503,
            })
        }
    }

    let palettes = Palettes::embedded().unwrap();
    let spec = RenderSpec::Relief {
        region: Region::new(-28.0, 53.0, 34.0, 71.0),
        resolution: relief_dashboard::Resolution::OneDegree,
        color_map: ColorMap::Geo,
    };
    assert!(matches!(
        render::execute(&spec, &Offline, &palettes),
        Err(RenderError::DataUnavailable(DataUnavailable::Status { status: 503, .. }))
    ));
}

#[test]
fn ocean_globe_switches_to_geoid_and_ocean_text() {
    let source = Synthetic::default();
    let mut session = session(Dashboard::Public);
    let jobs = session.start();
    drain(&mut session, &source, jobs);
    assert_eq!(session.text_panel(RendererId::Globe), Some(&text::GEO));
    assert_eq!(session.text_panel(RendererId::Isolines), Some(&text::EUROPE));

    let jobs = session.apply(ParamChange::ColorMap(ColorMap::Ocean)).unwrap();
    let renderers: Vec<_> = jobs.iter().map(|job| job.renderer).collect();
    assert_eq!(renderers, [RendererId::Globe, RendererId::Isolines]);
    assert_eq!(jobs[0].spec.dataset(), Dataset::Geoid);
    assert_eq!(jobs[1].spec.dataset(), Dataset::Relief);
    drain(&mut session, &source, jobs);

    let datasets: Vec<_> = source.requests().iter().map(|r| r.dataset).collect();
    assert!(datasets.contains(&Dataset::Geoid));
    assert_eq!(session.text_panel(RendererId::Globe), Some(&text::OCEAN));
    let globe = session.artifact(RendererId::Globe).unwrap();
    assert!(globe.title.contains("geoid"));
}

#[test]
fn public_dashboard_rejects_scientific_controls() {
    let mut session = session(Dashboard::Public);
    session.start();
    assert_eq!(
        session.apply(ParamChange::ZoomWidthPct(50.0)).unwrap_err(),
        relief_dashboard::ValidationError::NotOffered(ParamName::ZoomWidthPct)
    );
    assert!(
        session
            .apply(ParamChange::SelectedRegion("France".to_string()))
            .is_err()
    );
    assert!(session.apply(ParamChange::ColorMap(ColorMap::Jet)).is_err());
}
