//! Export a project to video.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use slidecast_common::AppConfig;
use slidecast_editor_core::EditorSession;
use slidecast_project_model::LoadedProject;
use slidecast_render_engine::{
    create_sink, Compositor, ExportFormat, ExportOutcome, ExportPipeline, ExportProgress,
    ExportSettings, ExportStage, ProgressCallback,
};

pub async fn run(
    config: &AppConfig,
    path: PathBuf,
    output: Option<PathBuf>,
    format: Option<String>,
    fps: Option<u32>,
    no_pace: bool,
) -> anyhow::Result<()> {
    println!("Exporting project at: {}", path.display());

    let project =
        LoadedProject::load(&path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;
    let session = EditorSession::from_project_file(&project.file, config.editor.clone())?;

    let format: ExportFormat = format.as_deref().unwrap_or(&config.export.format).parse()?;
    let output_path = output.unwrap_or_else(|| default_output(&path, config, format));

    let canvas = project.file.canvas;
    let mut settings = ExportSettings::for_canvas(canvas.width, canvas.height, config);
    if let Some(fps) = fps {
        settings.fps = fps.max(1);
    }
    if no_pace {
        settings.pace_frames = false;
    }

    println!("  Output: {}", output_path.display());
    println!("  Format: {format}");
    println!(
        "  Resolution: {}x{} @ {}fps",
        settings.width, settings.height, settings.fps
    );

    let pipeline = ExportPipeline::new(Arc::new(Compositor::from_config(&config.fonts)));
    let handle = pipeline.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling export");
            handle.cancel();
        }
    });

    let progress_cb: ProgressCallback = Box::new(|p: ExportProgress| {
        if p.stage == ExportStage::Recording {
            let _ = write_progress(&mut std::io::stdout(), &p);
        }
    });

    let mut sink = create_sink(format, &output_path);
    match pipeline
        .run(
            session.export_snapshot(),
            &settings,
            sink.as_mut(),
            Some(progress_cb),
        )
        .await
    {
        Ok(ExportOutcome::Completed(artifact)) => {
            println!(
                "\nExport complete: {} ({} frames, {:.1}s)",
                artifact.path.display(),
                artifact.frames,
                artifact.duration_secs()
            );
        }
        Ok(ExportOutcome::Cancelled) => println!("\nExport cancelled."),
        Ok(ExportOutcome::AlreadyRunning) => println!("\nAn export is already running."),
        Err(e) => {
            println!();
            return Err(anyhow::anyhow!("Export failed: {e}"));
        }
    }

    Ok(())
}

/// Overwrite the current terminal line with a progress report.
fn write_progress(out: &mut impl Write, p: &ExportProgress) -> std::io::Result<()> {
    write!(
        out,
        "\r  Progress: {:.1}% (page {}/{}, {}/{} frames)  ",
        p.progress * 100.0,
        p.current_page + 1,
        p.page_count,
        p.frames_rendered,
        p.total_frames,
    )?;
    out.flush()
}

fn default_output(project_path: &Path, config: &AppConfig, format: ExportFormat) -> PathBuf {
    let dir = project_path.parent().unwrap_or_else(|| Path::new("."));
    let configured = Path::new(&config.export.file_name);
    let name = match format {
        ExportFormat::PngSequence => configured.with_extension(""),
        _ => configured.with_extension(format.extension()),
    };
    dir.join(name)
}
