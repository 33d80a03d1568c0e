#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod colors;
mod constants;
mod figure_view;
mod ui;
mod worker;

use clap::Parser;
use eframe::egui;
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use figure_view::TextureCache;
use relief_dashboard::colormap::Palettes;
use relief_dashboard::config::Config;
use relief_dashboard::sources::DatasetSources;
use relief_dashboard::{
    BoundingBoxTable, Dashboard, GridSource, ParamChange, Session, StartupError,
};
use std::path::PathBuf;
use std::sync::Arc;
use worker::RenderWorker;

#[derive(Parser, Debug)]
#[command(version, about = "Interactive relief and isoline map dashboards")]
struct Args {
    /// Which dashboard to open.
    #[arg(long, value_enum, default_value_t = Dashboard::Scientific)]
    dashboard: Dashboard,

    /// RON configuration file (defaults to the user config directory).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bounding-box CSV replacing the built-in table.
    #[arg(long)]
    boxes: Option<PathBuf>,

    /// Read all grids from ESRI ASCII files in this directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

/// Everything loaded before the window opens.
struct Startup {
    session: Session,
    source: Arc<dyn GridSource>,
    palettes: Arc<Palettes>,
}

impl Startup {
    fn load(args: &Args) -> Result<Self, StartupError> {
        let mut config = Config::load(args.config.as_deref())?;
        if let Some(dir) = &args.data_dir {
            config = config.with_data_dir(dir);
        }

        let boxes = match args.boxes.as_ref().or(config.boxes.as_ref()) {
            Some(path) => BoundingBoxTable::load(path)?,
            None => BoundingBoxTable::embedded()?,
        };
        let palettes = Palettes::embedded()?;
        let source = DatasetSources::from_config(&config)?;

        Ok(Self {
            session: Session::new(args.dashboard, boxes)?,
            source: Arc::new(source),
            palettes: Arc::new(palettes),
        })
    }
}

/// Main application state for the dashboard window.
pub struct DashboardApp {
    session: Session,
    worker: RenderWorker,
    textures: TextureCache,
    toasts: Toasts,
}

impl DashboardApp {
    fn new(cc: &eframe::CreationContext<'_>, startup: Startup) -> Self {
        let toasts = Toasts::new()
            .anchor(egui::Align2::RIGHT_TOP, (-10.0, 10.0))
            .direction(egui::Direction::TopDown);

        let worker = RenderWorker::spawn(cc.egui_ctx.clone(), startup.source, startup.palettes);
        let mut session = startup.session;
        for job in session.start() {
            worker.submit(job);
        }

        Self {
            session,
            worker,
            textures: TextureCache::default(),
            toasts,
        }
    }

    /// Feeds a widget change into the session and starts the renders it
    /// triggers. Rejected values are reported and the widget snaps back.
    fn apply(&mut self, change: ParamChange) {
        match self.session.apply(change) {
            Ok(jobs) => {
                for job in jobs {
                    self.worker.submit(job);
                }
            }
            Err(err) => {
                log::warn!("Rejected change: {err}");
                self.toast(ToastKind::Warning, err.to_string(), 5.0);
            }
        }
    }

    /// Applies finished renders and surfaces their errors.
    fn poll_renders(&mut self) {
        for (renderer, result) in self.worker.poll() {
            if let Some(job) = self.session.complete(renderer, result) {
                self.worker.submit(job);
            }
        }
        for err in self.session.take_errors() {
            self.toast(ToastKind::Error, err, 8.0);
        }
    }

    fn toast(&mut self, kind: ToastKind, text: String, seconds: f64) {
        self.toasts.add(Toast {
            kind,
            text: text.into(),
            options: ToastOptions::default()
                .duration_in_seconds(seconds)
                .show_icon(true),
            ..Default::default()
        });
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_renders();
        self.handle_keyboard_input(ctx);

        self.show_status_bar(ctx);
        self.show_sidebar(ctx);
        self.show_central_panel(ctx);

        self.toasts.show(ctx);
    }
}

fn main() -> eframe::Result {
    env_logger::init();
    let args = Args::parse();

    let startup = match Startup::load(&args) {
        Ok(startup) => startup,
        Err(err) => {
            log::error!("Startup failed: {err}");
            eprintln!("relief-dashboard: {err}");
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1440.0, 860.0]),
        ..Default::default()
    };

    eframe::run_native(
        args.dashboard.title(),
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, startup)))),
    )
}
