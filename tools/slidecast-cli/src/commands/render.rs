//! Render one frame of a page to PNG.

use std::path::PathBuf;

use slidecast_common::AppConfig;
use slidecast_editor_core::EditorSession;
use slidecast_project_model::LoadedProject;
use slidecast_render_engine::{to_straight_rgba, Compositor, ExportSettings};

pub fn run(
    config: &AppConfig,
    path: PathBuf,
    page: usize,
    progress: f64,
    output: PathBuf,
) -> anyhow::Result<()> {
    let project =
        LoadedProject::load(&path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;
    let session = EditorSession::from_project_file(&project.file, config.editor.clone())?;

    let index = page
        .checked_sub(1)
        .filter(|&i| i < session.project().page_count())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Page {page} does not exist (project has {} page(s))",
                session.project().page_count()
            )
        })?;
    let Some(target) = session.project().page(index) else {
        anyhow::bail!("Page {page} does not exist");
    };

    let canvas = project.file.canvas;
    let settings = ExportSettings::for_canvas(canvas.width, canvas.height, config);
    let compositor = Compositor::from_config(&config.fonts);
    let frame = compositor.render_frame(target, progress, settings.width, settings.height)?;

    let rgba = image::RgbaImage::from_raw(frame.width(), frame.height(), to_straight_rgba(&frame))
        .ok_or_else(|| anyhow::anyhow!("Rendered frame has an unexpected size"))?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    rgba.save_with_format(&output, image::ImageFormat::Png)?;

    println!(
        "Rendered page {page} at progress {:.2} ({}x{}) to {}",
        progress.clamp(0.0, 1.0),
        settings.width,
        settings.height,
        output.display()
    );

    Ok(())
}
