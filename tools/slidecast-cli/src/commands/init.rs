//! Create a new Slidecast project.

use std::path::PathBuf;

use slidecast_common::AppConfig;
use slidecast_project_model::{find_template, CanvasSize, LoadedProject};

pub fn run(
    config: &AppConfig,
    name: String,
    output: PathBuf,
    template: String,
    width: Option<u32>,
    height: Option<u32>,
) -> anyhow::Result<()> {
    let seed = find_template(&template).ok_or_else(|| {
        anyhow::anyhow!("Unknown template: {template}. Run `slidecast templates` for the list")
    })?;
    let canvas = CanvasSize {
        width: width.unwrap_or(config.canvas.width),
        height: height.unwrap_or(config.canvas.height),
    };
    if canvas.width == 0 || canvas.height == 0 {
        anyhow::bail!("Canvas size must be positive");
    }

    let path = output.join(&name).join("project.json");
    println!("Creating project '{}' at {}", name, path.display());

    let project = LoadedProject::create(&path, &name, canvas, &seed)
        .map_err(|e| anyhow::anyhow!("Failed to create project: {e}"))?;

    println!("Project created successfully:");
    println!("  File: {}", project.path.display());
    println!("  Canvas: {}x{}", canvas.width, canvas.height);
    println!("  First page: {} ({})", seed.name, seed.id);

    Ok(())
}
