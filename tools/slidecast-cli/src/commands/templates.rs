//! List built-in page templates.

use slidecast_project_model::builtin_templates;

pub fn run(json: bool) -> anyhow::Result<()> {
    let templates = builtin_templates();

    if json {
        println!("{}", serde_json::to_string_pretty(&templates)?);
        return Ok(());
    }

    println!("Built-in templates:");
    for t in &templates {
        let duration = t
            .duration
            .map(|d| format!("{d:.1}s"))
            .unwrap_or_else(|| "default".to_string());
        println!(
            "  {:<14} {:<20} {} element(s), duration {}",
            t.id,
            t.name,
            t.elements.len(),
            duration
        );
    }

    Ok(())
}
