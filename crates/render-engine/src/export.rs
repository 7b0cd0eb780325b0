//! Export pipeline: plays every page through the compositor into a sink.
//!
//! ```text
//! Idle ──start──► Recording ──last frame──► Finalizing ──artifact──► Idle
//!   ▲                 │ cancel / error
//!   └─────────────────┘ (sink aborted, no artifact)
//! ```
//!
//! Each page gets `max(1, round(duration * fps))` frames; frame `f` of `n`
//! is rendered at progress `min(1, f / n)`. When pacing is on, the pipeline
//! waits one frame interval after every frame so the sink sees frames at
//! the nominal rate. At most one export runs per pipeline; a start request
//! while one is in flight is ignored.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use slidecast_common::{AppConfig, FontConfig, FrameClock, SlidecastError, SlidecastResult};
use slidecast_project_model::Page;
use tiny_skia::Pixmap;

use crate::compositor::{Compositor, SharedCompositor};
use crate::sink::{create_sink, EncoderSink, ExportArtifact, ExportFormat, Frame, StreamSpec};

/// Progress callback for export runs.
pub type ProgressCallback = Box<dyn Fn(ExportProgress) + Send + Sync>;

/// Export progress report.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportProgress {
    /// Overall progress [0.0, 1.0].
    pub progress: f64,

    /// Frames handed to the sink so far.
    pub frames_rendered: u64,

    /// Frames in the whole export.
    pub total_frames: u64,

    /// Page being recorded.
    pub current_page: usize,

    pub page_count: usize,

    pub stage: ExportStage,
}

/// Stages reported to the progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Preparing,
    Recording,
    Finalizing,
    Complete,
    Cancelled,
    Failed,
}

/// Pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportState {
    #[default]
    Idle,
    Recording,
    Finalizing,
}

/// How a start request ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    Completed(ExportArtifact),
    /// Cancelled mid-way; the sink was aborted.
    Cancelled,
    /// Another export was already in flight; nothing happened.
    AlreadyRunning,
}

/// Surface size, frame rate, and pacing for one export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Wait one frame interval after each frame.
    pub pace_frames: bool,
}

impl ExportSettings {
    /// Settings for a canvas of the given size. Each side is floored at
    /// the configured minimum export dimension.
    pub fn for_canvas(canvas_width: u32, canvas_height: u32, config: &AppConfig) -> Self {
        let floor = config.canvas.min_export_dimension;
        Self {
            width: canvas_width.max(floor),
            height: canvas_height.max(floor),
            fps: config.export.fps.max(1),
            pace_frames: config.export.pace_frames,
        }
    }

    pub fn spec(&self) -> StreamSpec {
        StreamSpec {
            width: self.width,
            height: self.height,
            fps: self.fps.max(1),
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        let config = AppConfig::default();
        Self::for_canvas(config.canvas.width, config.canvas.height, &config)
    }
}

/// Frame counts per page.
pub fn frame_plan(pages: &[Page], clock: &FrameClock) -> Vec<u64> {
    pages.iter().map(|p| clock.frames_for(p.duration)).collect()
}

/// Cancels the export running on the pipeline it was taken from.
#[derive(Debug, Clone)]
pub struct ExportHandle {
    cancel: Arc<AtomicBool>,
}

impl ExportHandle {
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }
}

/// Resets the shared state to `Idle` however the run ends.
struct StateGuard {
    state: Arc<Mutex<ExportState>>,
}

impl StateGuard {
    fn set(&self, next: ExportState) {
        *self.state.lock().unwrap_or_else(|p| p.into_inner()) = next;
    }
}

impl Drop for StateGuard {
    fn drop(&mut self) {
        self.set(ExportState::Idle);
    }
}

/// Drives the compositor across all pages and feeds a sink.
#[derive(Debug, Clone)]
pub struct ExportPipeline {
    compositor: SharedCompositor,
    state: Arc<Mutex<ExportState>>,
    cancel: Arc<AtomicBool>,
}

impl ExportPipeline {
    pub fn new(compositor: SharedCompositor) -> Self {
        Self {
            compositor,
            state: Arc::new(Mutex::new(ExportState::Idle)),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn state(&self) -> ExportState {
        *self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn handle(&self) -> ExportHandle {
        ExportHandle {
            cancel: self.cancel.clone(),
        }
    }

    /// Request cancellation of the running export.
    pub fn cancel(&self) {
        self.handle().cancel();
    }

    fn claim(&self) -> Option<StateGuard> {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        if *state != ExportState::Idle {
            return None;
        }
        *state = ExportState::Recording;
        self.cancel.store(false, Ordering::SeqCst);
        Some(StateGuard {
            state: self.state.clone(),
        })
    }

    /// Export `pages` into `sink`. The pages are a frozen snapshot; edits
    /// made to the live project meanwhile do not reach this run.
    pub async fn run<S: EncoderSink + ?Sized>(
        &self,
        pages: Vec<Page>,
        settings: &ExportSettings,
        sink: &mut S,
        progress: Option<ProgressCallback>,
    ) -> SlidecastResult<ExportOutcome> {
        let Some(guard) = self.claim() else {
            tracing::warn!("Export already in progress; ignoring start request");
            return Ok(ExportOutcome::AlreadyRunning);
        };

        if pages.is_empty() {
            return Err(SlidecastError::project("Nothing to export: the project has no pages"));
        }
        if !sink.is_available() {
            return Err(SlidecastError::resource_unavailable(format!(
                "{} encoder is not available on this system",
                sink.name()
            )));
        }

        let clock = FrameClock::new(settings.fps);
        let plan = frame_plan(&pages, &clock);
        let mut reporter = Reporter {
            callback: progress,
            total_frames: plan.iter().sum(),
            page_count: pages.len(),
            frames_rendered: 0,
            current_page: 0,
        };

        tracing::info!(
            sink = sink.name(),
            pages = pages.len(),
            total_frames = reporter.total_frames,
            width = settings.width,
            height = settings.height,
            fps = clock.fps(),
            "Starting export"
        );
        reporter.emit(ExportStage::Preparing);

        let spec = settings.spec();
        sink.open(&spec)?;

        let recorded = self
            .record(&pages, &plan, settings, &clock, sink, &mut reporter)
            .await;
        match recorded {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(frames = reporter.frames_rendered, "Export cancelled");
                sink.abort();
                reporter.emit(ExportStage::Cancelled);
                return Ok(ExportOutcome::Cancelled);
            }
            Err(err) => {
                tracing::error!(error = %err, "Export failed");
                sink.abort();
                reporter.emit(ExportStage::Failed);
                return Err(err);
            }
        }

        guard.set(ExportState::Finalizing);
        reporter.emit(ExportStage::Finalizing);
        let artifact = match sink.finish() {
            Ok(artifact) => artifact,
            Err(err) => {
                sink.abort();
                reporter.emit(ExportStage::Failed);
                return Err(err);
            }
        };

        reporter.emit(ExportStage::Complete);
        tracing::info!(
            path = %artifact.path.display(),
            frames = artifact.frames,
            "Export finished"
        );
        drop(guard);
        Ok(ExportOutcome::Completed(artifact))
    }

    /// Returns `Ok(false)` when cancelled.
    async fn record<S: EncoderSink + ?Sized>(
        &self,
        pages: &[Page],
        plan: &[u64],
        settings: &ExportSettings,
        clock: &FrameClock,
        sink: &mut S,
        reporter: &mut Reporter,
    ) -> SlidecastResult<bool> {
        let mut surface = Pixmap::new(settings.width, settings.height).ok_or_else(|| {
            SlidecastError::render(format!(
                "cannot allocate a {}x{} export surface",
                settings.width, settings.height
            ))
        })?;
        let mut global_index = 0u64;

        for (page_index, (page, &total)) in pages.iter().zip(plan).enumerate() {
            reporter.current_page = page_index;
            tracing::debug!(page = page_index, frames = total, "Recording page");

            for frame_in_page in 0..total {
                if self.cancel.load(Ordering::SeqCst) {
                    return Ok(false);
                }

                let progress = FrameClock::progress_at(frame_in_page, total);
                self.compositor.render_into(&mut surface, page, progress);
                sink.submit_frame(&Frame {
                    page_index,
                    frame_in_page,
                    global_index,
                    progress,
                    pixmap: &surface,
                })?;
                global_index += 1;
                reporter.frames_rendered = global_index;
                reporter.emit(ExportStage::Recording);

                if settings.pace_frames {
                    tokio::time::sleep(clock.frame_interval()).await;
                }
            }
        }
        Ok(true)
    }
}

struct Reporter {
    callback: Option<ProgressCallback>,
    total_frames: u64,
    page_count: usize,
    frames_rendered: u64,
    current_page: usize,
}

impl Reporter {
    fn emit(&self, stage: ExportStage) {
        let Some(cb) = &self.callback else {
            return;
        };
        let progress = match stage {
            ExportStage::Finalizing | ExportStage::Complete => 1.0,
            _ if self.total_frames == 0 => 0.0,
            _ => self.frames_rendered as f64 / self.total_frames as f64,
        };
        cb(ExportProgress {
            progress,
            frames_rendered: self.frames_rendered,
            total_frames: self.total_frames,
            current_page: self.current_page,
            page_count: self.page_count,
            stage,
        });
    }
}

/// A self-contained export request.
#[derive(Debug, Clone)]
pub struct ExportJob {
    /// Frozen pages to record.
    pub pages: Vec<Page>,

    /// Output file, or directory for image sequences.
    pub output_path: PathBuf,

    pub format: ExportFormat,

    pub settings: ExportSettings,

    pub fonts: FontConfig,
}

/// Export a job to disk with the sink matching its format.
pub async fn export_project(
    job: ExportJob,
    progress: Option<ProgressCallback>,
) -> SlidecastResult<ExportOutcome> {
    tracing::info!(
        output = %job.output_path.display(),
        format = %job.format,
        "Exporting project"
    );

    let compositor = Arc::new(Compositor::from_config(&job.fonts));
    let pipeline = ExportPipeline::new(compositor);
    let mut sink = create_sink(job.format, &job.output_path);
    pipeline
        .run(job.pages, &job.settings, sink.as_mut(), progress)
        .await
}
