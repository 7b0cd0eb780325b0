//! Check system capabilities.

use slidecast_common::AppConfig;
use slidecast_render_engine::ffmpeg_available;
use slidecast_render_engine::fonts::FontBook;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("Slidecast System Check");
    println!("{}", "=".repeat(50));

    let ffmpeg = ffmpeg_available();
    if ffmpeg {
        println!("[OK] ffmpeg found: webm and mp4 export available");
    } else {
        println!("[WARN] ffmpeg not found: only png-sequence export is available");
        println!("       Install ffmpeg and make sure it is on PATH");
    }

    let fonts = FontBook::from_config(&config.fonts);
    let faces = fonts.face_count();
    if faces > 0 {
        println!("[OK] Font faces loaded: {faces}");
    } else {
        println!("[WARN] No fonts found: text elements will not be drawn");
    }
    if fonts.resolve("sans-serif").is_some() {
        println!("[OK] Fallback sans-serif font resolves");
    } else if faces > 0 {
        println!("[WARN] No sans-serif fallback: unmatched font families will not be drawn");
    }
    for dir in &config.fonts.extra_font_dirs {
        if !dir.is_dir() {
            println!("[WARN] Font directory missing: {}", dir.display());
        }
    }

    println!();
    if ffmpeg && faces > 0 {
        println!("All capabilities are available. Slidecast is ready.");
    } else {
        println!("Some capabilities are missing. See above for fixes.");
    }

    Ok(())
}
