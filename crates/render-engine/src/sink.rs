//! Encoder sinks: where exported frames go.
//!
//! The pipeline never encodes video itself. It hands finished frames to an
//! [`EncoderSink`] and asks it to finalize once every page has been played.

use std::fmt;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::str::FromStr;
use std::thread::JoinHandle;

use serde::{Deserialize, Serialize};
use slidecast_common::{SlidecastError, SlidecastResult};
use tiny_skia::Pixmap;

use crate::compositor::to_straight_rgba;

/// Output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    /// VP9 in WebM.
    #[default]
    Webm,
    /// H.264 in MP4.
    Mp4,
    /// Numbered PNG files in a directory.
    PngSequence,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Webm => "webm",
            Self::Mp4 => "mp4",
            Self::PngSequence => "",
        }
    }

    fn ffmpeg_codec_args(&self) -> Vec<&'static str> {
        match self {
            Self::Webm => vec![
                "-c:v",
                "libvpx-vp9",
                "-pix_fmt",
                "yuva420p",
                "-b:v",
                "2M",
            ],
            Self::Mp4 => vec![
                "-c:v",
                "libx264",
                "-preset",
                "medium",
                "-profile:v",
                "high",
                "-pix_fmt",
                "yuv420p",
                "-movflags",
                "+faststart",
            ],
            Self::PngSequence => vec![],
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Webm => "webm",
            Self::Mp4 => "mp4",
            Self::PngSequence => "png-sequence",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = SlidecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "webm" => Ok(Self::Webm),
            "mp4" => Ok(Self::Mp4),
            "png-sequence" | "png" => Ok(Self::PngSequence),
            other => Err(SlidecastError::config(format!(
                "unknown export format '{other}' (expected webm, mp4, or png-sequence)"
            ))),
        }
    }
}

/// Fixed stream parameters announced when a sink is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSpec {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

/// One composited frame on its way to the sink.
#[derive(Debug)]
pub struct Frame<'a> {
    pub page_index: usize,
    pub frame_in_page: u64,
    /// Position in the whole export.
    pub global_index: u64,
    /// Animation progress the frame was rendered at.
    pub progress: f64,
    pub pixmap: &'a Pixmap,
}

/// The finished export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportArtifact {
    /// Output file, or directory for image sequences.
    pub path: PathBuf,
    pub format: ExportFormat,
    pub frames: u64,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl ExportArtifact {
    pub fn duration_secs(&self) -> f64 {
        self.frames as f64 / self.fps.max(1) as f64
    }
}

/// Receives frames in order and produces the artifact.
pub trait EncoderSink {
    /// Sink name for logs.
    fn name(&self) -> &str;

    /// Whether the capability behind this sink is present on the host.
    fn is_available(&self) -> bool;

    /// Prepare to receive frames.
    fn open(&mut self, spec: &StreamSpec) -> SlidecastResult<()>;

    fn submit_frame(&mut self, frame: &Frame<'_>) -> SlidecastResult<()>;

    /// Flush and close, returning the artifact.
    fn finish(&mut self) -> SlidecastResult<ExportArtifact>;

    /// Stop without producing an artifact and remove partial output.
    fn abort(&mut self);
}

/// Build the sink for a format.
pub fn create_sink(
    format: ExportFormat,
    output: impl Into<PathBuf>,
) -> Box<dyn EncoderSink + Send> {
    match format {
        ExportFormat::PngSequence => Box::new(PngSequenceSink::new(output)),
        video => Box::new(FfmpegSink::new(video, output)),
    }
}

pub(crate) fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Whether `ffmpeg` is on the PATH.
pub fn ffmpeg_available() -> bool {
    command_exists("ffmpeg")
}

struct FfmpegProcess {
    child: Child,
    stdin: Option<ChildStdin>,
    stderr_task: Option<JoinHandle<String>>,
    spec: StreamSpec,
    frames: u64,
}

/// Pipes raw RGBA frames into an external `ffmpeg` process.
pub struct FfmpegSink {
    format: ExportFormat,
    output: PathBuf,
    process: Option<FfmpegProcess>,
}

impl FfmpegSink {
    pub fn new(format: ExportFormat, output: impl Into<PathBuf>) -> Self {
        Self {
            format,
            output: output.into(),
            process: None,
        }
    }

    fn args(&self, spec: &StreamSpec) -> Vec<String> {
        let mut args: Vec<String> = [
            "-hide_banner",
            "-loglevel",
            "error",
            "-y",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.push("-s".into());
        args.push(format!("{}x{}", spec.width, spec.height));
        args.push("-r".into());
        args.push(spec.fps.to_string());
        args.push("-i".into());
        args.push("-".into());
        args.extend(self.format.ffmpeg_codec_args().iter().map(|s| s.to_string()));
        args.push(self.output.display().to_string());
        args
    }
}

impl EncoderSink for FfmpegSink {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn is_available(&self) -> bool {
        ffmpeg_available()
    }

    fn open(&mut self, spec: &StreamSpec) -> SlidecastResult<()> {
        if let Some(parent) = self.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let args = self.args(spec);
        tracing::debug!(args = ?args, "Running ffmpeg");
        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SlidecastError::resource_unavailable(format!("Failed to start ffmpeg: {e}")))?;

        let stdin = child.stdin.take();
        let stderr_task = child.stderr.take().map(|stderr| {
            // Drain stderr so ffmpeg never blocks on a full pipe.
            std::thread::spawn(move || {
                let mut output = String::new();
                match BufReader::new(stderr).read_to_string(&mut output) {
                    Ok(_) => output,
                    Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
                }
            })
        });

        tracing::info!(pid = child.id(), output = %self.output.display(), "ffmpeg process started");
        self.process = Some(FfmpegProcess {
            child,
            stdin,
            stderr_task,
            spec: *spec,
            frames: 0,
        });
        Ok(())
    }

    fn submit_frame(&mut self, frame: &Frame<'_>) -> SlidecastResult<()> {
        let process = self
            .process
            .as_mut()
            .ok_or_else(|| SlidecastError::render("ffmpeg sink is not open"))?;
        let stdin = process
            .stdin
            .as_mut()
            .ok_or_else(|| SlidecastError::render("ffmpeg stdin is closed"))?;

        stdin
            .write_all(&to_straight_rgba(frame.pixmap))
            .map_err(|e| SlidecastError::render(format!("Failed writing frame to ffmpeg: {e}")))?;
        process.frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> SlidecastResult<ExportArtifact> {
        let mut process = self
            .process
            .take()
            .ok_or_else(|| SlidecastError::render("ffmpeg sink is not open"))?;

        // closing stdin signals end of stream
        drop(process.stdin.take());
        let status = process
            .child
            .wait()
            .map_err(|e| SlidecastError::render(format!("Failed to wait on ffmpeg: {e}")))?;
        let stderr_output = process
            .stderr_task
            .take()
            .and_then(|task| task.join().ok())
            .unwrap_or_default();

        if !status.success() {
            return Err(SlidecastError::render(format!(
                "ffmpeg export failed (status {}): {}",
                status,
                stderr_output.trim()
            )));
        }

        Ok(ExportArtifact {
            path: self.output.clone(),
            format: self.format,
            frames: process.frames,
            width: process.spec.width,
            height: process.spec.height,
            fps: process.spec.fps,
        })
    }

    fn abort(&mut self) {
        if let Some(mut process) = self.process.take() {
            drop(process.stdin.take());
            if let Err(err) = process.child.kill() {
                tracing::debug!(error = %err, "ffmpeg already exited");
            }
            let _ = process.child.wait();
            if let Some(task) = process.stderr_task.take() {
                let _ = task.join();
            }
        }
        remove_partial(&self.output);
    }
}

/// Writes each frame as `frame_000000.png` into a directory.
pub struct PngSequenceSink {
    dir: PathBuf,
    spec: Option<StreamSpec>,
    written: Vec<PathBuf>,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            spec: None,
            written: vec![],
        }
    }

    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("frame_{index:06}.png"))
    }
}

impl EncoderSink for PngSequenceSink {
    fn name(&self) -> &str {
        "png-sequence"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn open(&mut self, spec: &StreamSpec) -> SlidecastResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        self.spec = Some(*spec);
        self.written.clear();
        Ok(())
    }

    fn submit_frame(&mut self, frame: &Frame<'_>) -> SlidecastResult<()> {
        let spec = self
            .spec
            .ok_or_else(|| SlidecastError::render("png sink is not open"))?;
        let path = self.frame_path(frame.global_index);
        let rgba = image::RgbaImage::from_raw(spec.width, spec.height, to_straight_rgba(frame.pixmap))
            .ok_or_else(|| SlidecastError::render("frame size does not match the stream"))?;
        rgba.save_with_format(&path, image::ImageFormat::Png)
            .map_err(|e| SlidecastError::render(format!("Failed to write {}: {e}", path.display())))?;
        self.written.push(path);
        Ok(())
    }

    fn finish(&mut self) -> SlidecastResult<ExportArtifact> {
        let spec = self
            .spec
            .take()
            .ok_or_else(|| SlidecastError::render("png sink is not open"))?;
        Ok(ExportArtifact {
            path: self.dir.clone(),
            format: ExportFormat::PngSequence,
            frames: self.written.len() as u64,
            width: spec.width,
            height: spec.height,
            fps: spec.fps,
        })
    }

    fn abort(&mut self) {
        for path in self.written.drain(..) {
            remove_partial(&path);
        }
        self.spec = None;
    }
}

fn remove_partial(path: &Path) {
    if path.is_file() {
        if let Err(err) = std::fs::remove_file(path) {
            tracing::warn!(error = %err, path = %path.display(), "Failed to remove partial output");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_of(pixmap: &Pixmap, index: u64) -> Frame<'_> {
        Frame {
            page_index: 0,
            frame_in_page: index,
            global_index: index,
            progress: 0.0,
            pixmap,
        }
    }

    #[test]
    fn test_format_names() {
        assert_eq!("webm".parse::<ExportFormat>().unwrap(), ExportFormat::Webm);
        assert_eq!("MP4".parse::<ExportFormat>().unwrap(), ExportFormat::Mp4);
        assert_eq!(
            "png-sequence".parse::<ExportFormat>().unwrap(),
            ExportFormat::PngSequence
        );
        assert!("avi".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::PngSequence.to_string(), "png-sequence");
    }

    #[test]
    fn test_ffmpeg_args_describe_raw_input() {
        let sink = FfmpegSink::new(ExportFormat::Webm, "/tmp/out/project.webm");
        let args = sink.args(&StreamSpec {
            width: 450,
            height: 800,
            fps: 30,
        });
        let joined = args.join(" ");
        assert!(joined.contains("-f rawvideo -pix_fmt rgba -s 450x800 -r 30 -i -"));
        assert!(joined.contains("libvpx-vp9"));
        assert!(joined.ends_with("/tmp/out/project.webm"));
    }

    #[test]
    fn test_png_sequence_writes_and_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = PngSequenceSink::new(dir.path().join("frames"));
        let spec = StreamSpec {
            width: 4,
            height: 3,
            fps: 30,
        };
        let mut pixmap = Pixmap::new(4, 3).unwrap();
        pixmap.fill(tiny_skia::Color::from_rgba8(10, 20, 30, 255));

        sink.open(&spec).unwrap();
        sink.submit_frame(&frame_of(&pixmap, 0)).unwrap();
        sink.submit_frame(&frame_of(&pixmap, 1)).unwrap();
        assert!(sink.frame_path(1).exists());

        let decoded = image::open(sink.frame_path(0)).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(2, 1).0, [10, 20, 30, 255]);

        sink.abort();
        assert!(!sink.frame_path(0).exists());
        assert!(sink.finish().is_err());
    }

    #[test]
    fn test_png_sequence_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = PngSequenceSink::new(dir.path());
        let pixmap = Pixmap::new(2, 2).unwrap();
        sink.open(&StreamSpec {
            width: 2,
            height: 2,
            fps: 10,
        })
        .unwrap();
        for i in 0..5 {
            sink.submit_frame(&frame_of(&pixmap, i)).unwrap();
        }
        let artifact = sink.finish().unwrap();
        assert_eq!(artifact.frames, 5);
        assert_eq!(artifact.duration_secs(), 0.5);
        assert_eq!(artifact.format, ExportFormat::PngSequence);
    }

    #[test]
    fn test_submit_before_open_fails() {
        let mut sink = FfmpegSink::new(ExportFormat::Mp4, "out.mp4");
        let pixmap = Pixmap::new(1, 1).unwrap();
        assert!(sink.submit_frame(&frame_of(&pixmap, 0)).is_err());
    }
}
