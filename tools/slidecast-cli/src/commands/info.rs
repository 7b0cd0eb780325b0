//! Show project information.

use std::path::PathBuf;

use slidecast_common::{AppConfig, FrameClock};
use slidecast_project_model::{Background, ElementKind, LoadedProject};
use slidecast_render_engine::{frame_plan, ExportSettings};

pub fn run(config: &AppConfig, path: PathBuf) -> anyhow::Result<()> {
    let project =
        LoadedProject::load(&path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;
    let file = &project.file;

    println!("Project: {}", file.name);
    println!("  Version: {}", file.version);
    println!("  Created: {}", file.created_at);
    println!("  Modified: {}", file.modified_at);
    println!("  Canvas: {}x{}", file.canvas.width, file.canvas.height);
    println!();

    println!("Pages:");
    for (i, page) in file.pages.iter().enumerate() {
        let texts = page
            .elements
            .iter()
            .filter(|e| matches!(e.kind, ElementKind::Text(_)))
            .count();
        let images = page.elements.len() - texts;
        let background = match &page.background {
            Background::Color(c) => c.clone(),
            Background::Image(_) => "image".to_string(),
        };
        println!(
            "  {:>2}. {:.1}s  {} text, {} image  background: {}",
            i + 1,
            page.duration,
            texts,
            images,
            background
        );
    }
    println!();

    let settings = ExportSettings::for_canvas(file.canvas.width, file.canvas.height, config);
    let clock = FrameClock::new(settings.fps);
    let frames: u64 = frame_plan(&file.pages, &clock).iter().sum();
    println!("Export:");
    println!(
        "  Output: {}x{} @ {}fps",
        settings.width, settings.height, settings.fps
    );
    println!(
        "  Frames: {} ({:.1}s)",
        frames,
        clock.frames_to_secs(frames)
    );

    Ok(())
}
