//! Validate a Slidecast project file.

use std::path::PathBuf;

use slidecast_project_model::LoadedProject;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating project at: {}", path.display());

    let project =
        LoadedProject::load(&path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;

    println!("  Name: {}", project.file.name);
    println!("  Version: {}", project.file.version);
    println!(
        "  Canvas: {}x{}",
        project.file.canvas.width, project.file.canvas.height
    );
    println!("  Pages: {}", project.file.pages.len());

    let mut errors = project.file.validate();
    if let Err(e) = project.file.to_project() {
        errors.push(e.to_string());
    }

    if errors.is_empty() {
        println!("\nProject is valid.");
    } else {
        println!("\nValidation issues:");
        for error in &errors {
            println!("  - {error}");
        }
        println!(
            "\n{} issue(s) found. Project may not render as intended.",
            errors.len()
        );
    }

    Ok(())
}
