use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::color::Color;
use crate::assets::fonts::FontBook;
use crate::assets::raster::Raster;
use crate::foundation::core::{Affine, Canvas, Point, Size};
use crate::foundation::error::{PosterError, PosterResult};
use crate::imaging::resample::cover_transform;
use crate::interact::overlay::SelectionOverlay;
use crate::render::backend::{FrameRGBA, RenderBackend};
use crate::render::blur::ShadowBlur;
use crate::render::composite::{fill, over_in_place};
use crate::render::plan::{BackgroundOp, RenderPlan};
use crate::render::text::{TextEngine, layout_box};
use crate::scene::geometry::{self, Handle};
use crate::scene::layer::{TextDecoration, TextLayer};
use crate::scene::measure::{EstimateMeasure, TextMeasure};

const OVERLAY_RGBA: [u8; 4] = [0, 153, 255, 255];
const OVERLAY_LINE_PX: f64 = 1.5;

/// CPU raster backend powered by `vello_cpu`, with Parley text shaping.
pub struct CpuRenderer {
    text: RefCell<TextEngine>,
    font_cache: HashMap<(u64, u32), vello_cpu::peniko::FontData>,
}

impl CpuRenderer {
    /// Renderer drawing text with the faces of `fonts`.
    pub fn new(fonts: FontBook) -> Self {
        Self {
            text: RefCell::new(TextEngine::new(fonts)),
            font_cache: HashMap::new(),
        }
    }

    /// Number of font faces available to the renderer.
    pub fn font_count(&self) -> usize {
        self.text.borrow().book().len()
    }

    fn draw_background(&self, bg: &BackgroundOp, canvas: Canvas) -> PosterResult<Vec<u8>> {
        let mut out = vec![0u8; canvas.rgba_len()];
        match bg {
            BackgroundOp::Exact(r) => {
                if r.dimensions() != (canvas.width, canvas.height) {
                    return Err(PosterError::render(format!(
                        "background is {}x{}, canvas is {}x{}",
                        r.width(),
                        r.height(),
                        canvas.width,
                        canvas.height
                    )));
                }
                out.copy_from_slice(&r.to_premul_bytes());
            }
            BackgroundOp::Solid(c) => fill(&mut out, c.to_premul().to_array()),
            BackgroundOp::Cover(r) => {
                let (w, h) = pixmap_dims(canvas)?;
                let mut pixmap = vello_cpu::Pixmap::new(w, h);
                let mut ctx = vello_cpu::RenderContext::new(w, h);
                let paint = image_paint(r)?;
                ctx.set_transform(affine_to_cpu(cover_transform(r.dimensions(), canvas)));
                ctx.set_paint(paint);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    f64::from(r.width()),
                    f64::from(r.height()),
                ));
                ctx.flush();
                ctx.render_to_pixmap(&mut pixmap);
                out.copy_from_slice(pixmap.data_as_u8_slice());
            }
        }
        Ok(out)
    }

    fn draw_layer(
        &mut self,
        layer: &TextLayer,
        canvas: Canvas,
        dst: &mut [u8],
    ) -> PosterResult<()> {
        let Some(layout) = self.text.get_mut().layout(layer) else {
            return Err(PosterError::render(format!(
                "no font available for layer {} ('{}')",
                layer.id, layer.font_family
            )));
        };
        let size = layout_box(&layout, layer);
        let transform = geometry::layer_transform(&layer.geometry(), size);
        let opacity = layer.opacity as f32;

        if layer.shadow.is_visible() {
            let shadow = layer.shadow;
            let offset = Affine::translate((shadow.offset_x, shadow.offset_y));
            let mut surface = self.draw_glyphs(&layout, layer, canvas, offset * transform, true)?;
            if let Some(blur) = ShadowBlur::for_length(shadow.blur) {
                surface = blur.apply(&surface, canvas)?;
            }
            over_in_place(dst, &surface, opacity)?;
        }

        let surface = self.draw_glyphs(&layout, layer, canvas, transform, false)?;
        over_in_place(dst, &surface, opacity)
    }

    /// Fill, decorations and stroke of one layer; with `silhouette` everything is painted in the
    /// shadow color.
    fn draw_glyphs(
        &mut self,
        layout: &parley::Layout<()>,
        layer: &TextLayer,
        canvas: Canvas,
        transform: Affine,
        silhouette: bool,
    ) -> PosterResult<Vec<u8>> {
        let (w, h) = pixmap_dims(canvas)?;
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_transform(affine_to_cpu(transform));

        let fill_color = if silhouette { layer.shadow.color } else { layer.fill };
        let stroke_color = if silhouette {
            layer.shadow.color
        } else {
            layer.stroke_color
        };
        let stroke = layer.stroke_width > 0.0 && !stroke_color.is_transparent();

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let font = self.font_for(run.run().font());
                let font_size = run.run().font_size();

                if !fill_color.is_transparent() {
                    ctx.set_paint(cpu_color(fill_color));
                    let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(&font).font_size(font_size).fill_glyphs(glyphs);
                    draw_decoration(&mut ctx, &run, layer.decoration, layer.font_size);
                }

                if stroke {
                    ctx.set_paint(cpu_color(stroke_color));
                    ctx.set_stroke(vello_cpu::kurbo::Stroke::new(layer.stroke_width));
                    let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(&font)
                        .font_size(font_size)
                        .stroke_glyphs(glyphs);
                }
            }
        }

        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        Ok(pixmap.data_as_u8_slice().to_vec())
    }

    fn font_for(&mut self, font: &parley::FontData) -> vello_cpu::peniko::FontData {
        let key = (font.data.id(), font.index);
        self.font_cache
            .entry(key)
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(font.data.data().to_vec()),
                    font.index,
                )
            })
            .clone()
    }
}

impl TextMeasure for CpuRenderer {
    fn measure(&self, layer: &TextLayer) -> Size {
        let mut engine = self.text.borrow_mut();
        match engine.layout(layer) {
            Some(layout) => layout_box(&layout, layer),
            None => EstimateMeasure.measure(layer),
        }
    }
}

impl RenderBackend for CpuRenderer {
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(w = plan.canvas.width, h = plan.canvas.height, layers = plan.layers.len())
    )]
    fn render_plan(&mut self, plan: &RenderPlan) -> PosterResult<FrameRGBA> {
        let canvas = plan.canvas;
        if canvas.width == 0 || canvas.height == 0 {
            return Err(PosterError::render("canvas width/height must be > 0"));
        }

        let drawable: Vec<&TextLayer> = plan
            .layers
            .iter()
            .filter(|l| l.visible && l.opacity > 0.0 && !l.text.trim().is_empty())
            .collect();
        if !drawable.is_empty() && self.font_count() == 0 {
            return Err(PosterError::render(
                "text layers present but no fonts are registered",
            ));
        }

        let mut frame = self.draw_background(&plan.background, canvas)?;

        let mut text_surface = vec![0u8; canvas.rgba_len()];
        for layer in drawable {
            self.draw_layer(layer, canvas, &mut text_surface)?;
        }
        over_in_place(&mut frame, &text_surface, 1.0)?;

        if let Some(overlay) = &plan.overlay {
            let surface = draw_overlay(overlay, canvas)?;
            over_in_place(&mut frame, &surface, 1.0)?;
        }

        Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: frame,
            premultiplied: true,
        })
    }
}

fn draw_decoration(
    ctx: &mut vello_cpu::RenderContext,
    run: &parley::layout::GlyphRun<'_, ()>,
    decoration: TextDecoration,
    font_size: f64,
) {
    let metrics = run.run().metrics();
    let (offset, thickness) = match decoration {
        TextDecoration::None => return,
        TextDecoration::Underline => (metrics.underline_offset, metrics.underline_size),
        TextDecoration::LineThrough => (metrics.strikethrough_offset, metrics.strikethrough_size),
    };
    let thickness = f64::from(thickness).max(font_size / 20.0);
    let x0 = f64::from(run.offset());
    let x1 = x0 + f64::from(run.advance());
    let y = f64::from(run.baseline() - offset);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        x0,
        y - thickness / 2.0,
        x1,
        y + thickness / 2.0,
    ));
}

fn draw_overlay(overlay: &SelectionOverlay, canvas: Canvas) -> PosterResult<Vec<u8>> {
    use vello_cpu::kurbo::Shape as _;

    let (w, h) = pixmap_dims(canvas)?;
    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    let mut ctx = vello_cpu::RenderContext::new(w, h);
    let [r, g, b, a] = OVERLAY_RGBA;
    let accent = vello_cpu::peniko::Color::from_rgba8(r, g, b, a);

    let mut outline = vello_cpu::kurbo::BezPath::new();
    outline.move_to(point_to_cpu(overlay.corners[0]));
    for p in &overlay.corners[1..] {
        outline.line_to(point_to_cpu(*p));
    }
    outline.close_path();

    ctx.set_stroke(vello_cpu::kurbo::Stroke::new(OVERLAY_LINE_PX));
    ctx.set_paint(accent);
    ctx.stroke_path(&outline);

    let top_mid = overlay.corners[0].midpoint(overlay.corners[1]);
    let radius = overlay.handle_radius.max(2.0) * 0.6;
    for &(handle, p) in &overlay.handles {
        let shape = match handle {
            Handle::Resize(_) => vello_cpu::kurbo::Rect::new(
                p.x - radius,
                p.y - radius,
                p.x + radius,
                p.y + radius,
            )
            .to_path(0.1),
            Handle::Rotate => {
                let mut stem = vello_cpu::kurbo::BezPath::new();
                stem.move_to(point_to_cpu(top_mid));
                stem.line_to(point_to_cpu(p));
                ctx.set_paint(accent);
                ctx.stroke_path(&stem);
                vello_cpu::kurbo::Circle::new(point_to_cpu(p), radius).to_path(0.1)
            }
        };
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
        ctx.fill_path(&shape);
        ctx.set_paint(accent);
        ctx.stroke_path(&shape);
    }

    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);
    Ok(pixmap.data_as_u8_slice().to_vec())
}

fn pixmap_dims(canvas: Canvas) -> PosterResult<(u16, u16)> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| PosterError::render("canvas width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| PosterError::render("canvas height exceeds u16"))?;
    Ok((w, h))
}

fn image_paint(r: &Raster) -> PosterResult<vello_cpu::Image> {
    let (w, h) = pixmap_dims(r.canvas())?;
    let premul = r.to_premul_bytes();
    let mut may_have_opacities = false;
    let pixels = premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn cpu_color(c: Color) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
