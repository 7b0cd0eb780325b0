//! Frame compositor: paints one page at one animation progress.
//!
//! Rendering never mutates the page. The same call serves the static editor
//! view (`progress = 1`) and export, where progress sweeps `[0, 1]` across
//! the page's frames.

use std::sync::Arc;

use slidecast_common::{FontConfig, SlidecastError, SlidecastResult};
use slidecast_project_model::{Background, Element, ElementKind, Page, TextProps};
use tiny_skia::{Color, FilterQuality, Pixmap, PixmapPaint, Transform};

use crate::animation::{animation_state, element_transform};
use crate::color::color_or;
use crate::fonts::FontBook;
use crate::images::ImageCache;
use crate::text::{layout_lines, measure_line, rasterize_line};

/// Renders pages onto raster surfaces.
#[derive(Debug, Default)]
pub struct Compositor {
    fonts: FontBook,
    images: ImageCache,
}

impl Compositor {
    pub fn new(fonts: FontBook) -> Self {
        Self {
            fonts,
            images: ImageCache::new(),
        }
    }

    /// Compositor with fonts discovered per configuration.
    pub fn from_config(config: &FontConfig) -> Self {
        Self::new(FontBook::from_config(config))
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    pub fn images(&self) -> &ImageCache {
        &self.images
    }

    /// Render `page` at `progress` onto a new `width` x `height` surface.
    pub fn render_frame(
        &self,
        page: &Page,
        progress: f64,
        width: u32,
        height: u32,
    ) -> SlidecastResult<Pixmap> {
        let mut surface = Pixmap::new(width, height).ok_or_else(|| {
            SlidecastError::render(format!("cannot allocate a {width}x{height} surface"))
        })?;
        self.render_into(&mut surface, page, progress);
        Ok(surface)
    }

    /// Render `page` onto an existing surface, replacing its contents.
    pub fn render_into(&self, surface: &mut Pixmap, page: &Page, progress: f64) {
        self.paint_background(surface, &page.background);
        for element in &page.elements {
            self.paint_element(surface, element, progress);
        }
    }

    fn paint_background(&self, surface: &mut Pixmap, background: &Background) {
        match background {
            Background::Color(css) => surface.fill(color_or(css, Color::WHITE)),
            Background::Image(src) => {
                surface.fill(Color::WHITE);
                let Some(image) = self.images.get(src) else {
                    return;
                };
                let transform = cover_transform(
                    image.width(),
                    image.height(),
                    surface.width(),
                    surface.height(),
                );
                surface.draw_pixmap(
                    0,
                    0,
                    Pixmap::as_ref(&image),
                    &smooth_paint(1.0),
                    transform,
                    None,
                );
            }
        }
    }

    fn paint_element(&self, surface: &mut Pixmap, element: &Element, progress: f64) {
        let state = animation_state(
            element.animation,
            progress,
            surface.width() as f64,
            surface.height() as f64,
        );
        if state.alpha <= 0.0 {
            return;
        }
        let transform = element_transform(&element.frame, &state);
        let paint = smooth_paint(state.alpha as f32);

        match &element.kind {
            ElementKind::Image(image) => {
                let Some(bitmap) = self.images.get(&image.src) else {
                    return;
                };
                let frame = &element.frame;
                let stretch = transform
                    .pre_translate(frame.x as f32, frame.y as f32)
                    .pre_scale(
                        (frame.width / bitmap.width() as f64) as f32,
                        (frame.height / bitmap.height() as f64) as f32,
                    );
                surface.draw_pixmap(0, 0, Pixmap::as_ref(&bitmap), &paint, stretch, None);
            }
            ElementKind::Text(text) => self.paint_text(surface, element, text, transform, &paint),
        }
    }

    fn paint_text(
        &self,
        surface: &mut Pixmap,
        element: &Element,
        text: &TextProps,
        transform: Transform,
        paint: &PixmapPaint,
    ) {
        let Some(font) = self.fonts.resolve(&text.font_family) else {
            return;
        };
        let px = text.font_size as f32;
        let color = color_or(&text.color, Color::BLACK);

        let lines = layout_lines(text, &element.frame, |line| {
            measure_line(&font, line, px)
        });
        for line in lines {
            let Some(raster) = rasterize_line(&font, &line.text, px, color) else {
                continue;
            };
            let placed = transform
                .pre_translate(line.x as f32, line.y as f32)
                .pre_scale(line.condense as f32, 1.0);
            surface.draw_pixmap(0, 0, raster.as_ref(), paint, placed, None);
        }
    }
}

/// Scale-to-cover, centered.
fn cover_transform(image_w: u32, image_h: u32, surface_w: u32, surface_h: u32) -> Transform {
    let (iw, ih) = (image_w as f32, image_h as f32);
    let (sw, sh) = (surface_w as f32, surface_h as f32);
    let scale = (sw / iw).max(sh / ih);
    let x = (sw - iw * scale) / 2.0;
    let y = (sh - ih * scale) / 2.0;
    Transform::from_translate(x, y).pre_scale(scale, scale)
}

fn smooth_paint(opacity: f32) -> PixmapPaint {
    PixmapPaint {
        opacity: opacity.clamp(0.0, 1.0),
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    }
}

/// Straight (non-premultiplied) RGBA of one surface pixel.
pub fn pixel_rgba(surface: &Pixmap, x: u32, y: u32) -> Option<[u8; 4]> {
    let c = surface.pixel(x, y)?.demultiply();
    Some([c.red(), c.green(), c.blue(), c.alpha()])
}

/// Copy a surface out as straight RGBA bytes, row-major.
pub fn to_straight_rgba(surface: &Pixmap) -> Vec<u8> {
    surface
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect()
}

/// Shared handle used by export tasks.
pub type SharedCompositor = Arc<Compositor>;
