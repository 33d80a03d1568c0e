//! Background render thread.
//!
//! Jobs run one at a time in submission order; each result is sent back
//! and the UI is woken to pick it up.

use eframe::egui;
use relief_dashboard::colormap::Palettes;
use relief_dashboard::render;
use relief_dashboard::{Figure, GridSource, RenderError, RenderJob, RendererId};
use std::sync::{Arc, mpsc};
use std::thread;

pub type RenderResult = (RendererId, Result<Figure, RenderError>);

pub struct RenderWorker {
    jobs: mpsc::Sender<RenderJob>,
    results: mpsc::Receiver<RenderResult>,
}

impl RenderWorker {
    pub fn spawn(ctx: egui::Context, source: Arc<dyn GridSource>, palettes: Arc<Palettes>) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<RenderJob>();
        let (result_tx, result_rx) = mpsc::channel();

        thread::spawn(move || {
            for job in job_rx {
                log::info!("Rendering {}", job.renderer);
                let started = std::time::Instant::now();
                let result = render::execute(&job.spec, source.as_ref(), &palettes);
                log::info!(
                    "Finished {} in {:.2?} ({})",
                    job.renderer,
                    started.elapsed(),
                    if result.is_ok() { "ok" } else { "failed" }
                );
                if result_tx.send((job.renderer, result)).is_err() {
                    break;
                }
                ctx.request_repaint();
            }
        });

        Self {
            jobs: job_tx,
            results: result_rx,
        }
    }

    pub fn submit(&self, job: RenderJob) {
        if self.jobs.send(job).is_err() {
            log::error!("Render thread is gone, job dropped");
        }
    }

    /// Results that arrived since the last poll.
    pub fn poll(&self) -> Vec<RenderResult> {
        self.results.try_iter().collect()
    }
}
