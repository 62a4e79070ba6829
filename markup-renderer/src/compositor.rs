//! Frame and snapshot compositing.
//!
//! A frame is what the user sees: background color, background raster, grid,
//! objects under `view · local`, the selection outline and any draft. A
//! flattened snapshot is the document alone: no view transform, grid,
//! selection or draft.

use image::RgbaImage;
use markup_core::{
    Affine, Canvas, Color, Draft, DrawingObject, ObjectKind, PaintMode, Point, Raster, Rect,
    ShapeKind, Style,
};
use tiny_skia::{
    FillRule, FilterQuality, PathBuilder, Pixmap, PixmapPaint, Stroke, StrokeDash, Transform,
};

use crate::cache::{CacheStats, PixmapCache};
use crate::convert::{
    pixmap_to_image, round_stroke, solid_paint, style_paint, to_skia_color, to_transform,
};
use crate::error::{RenderError, RenderResult};
use crate::text::GlyphMetrics;
use crate::RenderConfig;

/// Grid is skipped beyond this many lines per axis.
const MAX_GRID_LINES: f32 = 2000.0;

/// Composites canvases onto tiny-skia pixmaps.
#[derive(Debug)]
pub struct Compositor {
    config: RenderConfig,
    glyphs: Option<GlyphMetrics>,
    cache: PixmapCache,
}

impl Compositor {
    /// Create a compositor with no font loaded.
    #[must_use]
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            glyphs: None,
            cache: PixmapCache::new(),
        }
    }

    /// Use a font for text items.
    #[must_use]
    pub fn with_glyphs(mut self, glyphs: GlyphMetrics) -> Self {
        self.glyphs = Some(glyphs);
        self
    }

    /// The loaded font, if any.
    #[must_use]
    pub fn glyphs(&self) -> Option<&GlyphMetrics> {
        self.glyphs.as_ref()
    }

    /// Render configuration.
    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Pixmap cache statistics.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn background_color(&self, canvas: &Canvas) -> Color {
        self.config
            .background
            .unwrap_or_else(|| canvas.config().background.color())
    }

    /// Render the live view of a canvas.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Surface`] if the pixmap cannot be allocated.
    pub fn render_frame(&mut self, canvas: &Canvas) -> RenderResult<Pixmap> {
        let (width, height) = canvas.viewport();
        let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::Surface { width, height })?;
        pixmap.fill(to_skia_color(self.background_color(canvas)));

        let view = *canvas.view_transform();
        self.draw_background(&mut pixmap, canvas, &view);
        if canvas.grid_visible() {
            self.draw_grid(&mut pixmap, canvas, &view);
        }

        let selected = canvas.selection();
        for object in canvas.objects().iter() {
            let transform = Affine::concat(&view, object.transform());
            self.draw_object(&mut pixmap, object, &transform);
            if selected == Some(object.id()) {
                self.draw_selection(&mut pixmap, object, &transform, view.scale_x());
            }
        }

        if let Some(draft) = canvas.draft() {
            let style = canvas.draft_style();
            let transform = to_transform(&view);
            match draft {
                Draft::Stroke(points) => draw_polyline(
                    &mut pixmap,
                    points,
                    &style,
                    transform,
                    self.config.anti_aliasing,
                ),
                Draft::Shape { start, current } => draw_shape(
                    &mut pixmap,
                    &self.config,
                    canvas.shape_kind(),
                    *start,
                    *current,
                    &style,
                    transform,
                ),
            }
        }

        self.cache.sweep();
        Ok(pixmap)
    }

    /// Flatten a canvas into a new raster of the viewport size.
    ///
    /// Always succeeds. If the surface cannot be allocated the result is plain
    /// background.
    pub fn flatten(&mut self, canvas: &Canvas) -> RgbaImage {
        let (width, height) = canvas.viewport();
        let bg = self.background_color(canvas);
        let Some(mut pixmap) = Pixmap::new(width, height) else {
            tracing::warn!("Snapshot surface {width}x{height} unavailable, returning background");
            return RgbaImage::from_pixel(width, height, image::Rgba([bg.r, bg.g, bg.b, bg.a]));
        };
        pixmap.fill(to_skia_color(bg));

        self.draw_background(&mut pixmap, canvas, &Affine::identity());
        for object in canvas.objects().iter() {
            self.draw_object(&mut pixmap, object, object.transform());
        }

        self.cache.sweep();
        pixmap_to_image(&pixmap)
    }

    #[allow(clippy::cast_precision_loss)]
    fn draw_background(&mut self, pixmap: &mut Pixmap, canvas: &Canvas, view: &Affine) {
        let Some(raster) = canvas.background() else {
            return;
        };
        let (width, height) = canvas.viewport();
        let offset = Affine::translation(
            (width as f32 - raster.width() as f32) / 2.0,
            (height as f32 - raster.height() as f32) / 2.0,
        );
        self.draw_raster(pixmap, raster, to_transform(&Affine::concat(view, &offset)));
    }

    fn draw_raster(&mut self, pixmap: &mut Pixmap, raster: &Raster, transform: Transform) {
        let Some(src) = self.cache.get_or_convert(raster) else {
            return;
        };
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        pixmap.draw_pixmap(0, 0, src.as_ref(), &paint, transform, None);
    }

    fn draw_grid(&self, pixmap: &mut Pixmap, canvas: &Canvas, view: &Affine) {
        let spacing = self.config.grid_spacing;
        if spacing.is_nan() || spacing <= 0.0 {
            return;
        }
        let Some(visible) = visible_canvas_rect(canvas, view) else {
            return;
        };
        if visible.width() / spacing > MAX_GRID_LINES
            || visible.height() / spacing > MAX_GRID_LINES
        {
            tracing::debug!("Grid too dense at this zoom, skipped");
            return;
        }

        let mut pb = PathBuilder::new();
        let mut x = (visible.left / spacing).floor() * spacing;
        while x <= visible.right {
            pb.move_to(x, visible.top);
            pb.line_to(x, visible.bottom);
            x += spacing;
        }
        let mut y = (visible.top / spacing).floor() * spacing;
        while y <= visible.bottom {
            pb.move_to(visible.left, y);
            pb.line_to(visible.right, y);
            y += spacing;
        }
        let Some(path) = pb.finish() else {
            return;
        };
        let paint = solid_paint(self.config.grid_color, self.config.anti_aliasing);
        let stroke = Stroke {
            width: self.config.grid_width,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &paint, &stroke, to_transform(view), None);
    }

    fn draw_object(&mut self, pixmap: &mut Pixmap, object: &DrawingObject, transform: &Affine) {
        let style = object.style();
        let aa = self.config.anti_aliasing;
        let transform = to_transform(transform);
        match object.kind() {
            ObjectKind::Stroke { path, .. } => draw_polyline(pixmap, path, style, transform, aa),
            ObjectKind::Text { text, anchor } => {
                let Some(glyphs) = self.glyphs.as_ref() else {
                    tracing::trace!("No font loaded, text item not drawn");
                    return;
                };
                if let Some(path) = glyphs.outline(text, *anchor, style.font_size) {
                    let paint = style_paint(style, aa);
                    pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
                }
            }
            ObjectKind::Image { raster } => self.draw_raster(pixmap, raster, transform),
            ObjectKind::Shape { kind, start, end } => {
                draw_shape(pixmap, &self.config, *kind, *start, *end, style, transform);
            }
        }
    }

    fn draw_selection(
        &self,
        pixmap: &mut Pixmap,
        object: &DrawingObject,
        transform: &Affine,
        view_scale: f32,
    ) {
        let Some(rect) = to_skia_rect(object.raw_bounds()) else {
            return;
        };
        let path = PathBuilder::from_rect(rect);
        let scale = view_scale.abs();
        let width = if scale > f32::EPSILON {
            self.config.selection_width / scale
        } else {
            self.config.selection_width
        };
        let stroke = Stroke {
            width,
            dash: StrokeDash::new(self.config.selection_dash.to_vec(), 0.0),
            ..Stroke::default()
        };
        let paint = solid_paint(self.config.selection_color, self.config.anti_aliasing);
        pixmap.stroke_path(&path, &paint, &stroke, to_transform(transform), None);
    }
}

/// Canvas-space region covered by the viewport.
#[allow(clippy::cast_precision_loss)]
fn visible_canvas_rect(canvas: &Canvas, view: &Affine) -> Option<Rect> {
    let inv = view.invert()?;
    let (w, h) = canvas.viewport();
    let (w, h) = (w as f32, h as f32);
    let corners = [
        inv.map_point(Point::new(0.0, 0.0)),
        inv.map_point(Point::new(w, 0.0)),
        inv.map_point(Point::new(0.0, h)),
        inv.map_point(Point::new(w, h)),
    ];
    Rect::enclosing(&corners)
}

fn to_skia_rect(rect: Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_ltrb(rect.left, rect.top, rect.right, rect.bottom)
}

/// Draw a freehand path. A single point is drawn as a dot.
fn draw_polyline(
    pixmap: &mut Pixmap,
    points: &[Point],
    style: &Style,
    transform: Transform,
    aa: bool,
) {
    let paint = style_paint(style, aa);
    if let [p] = points {
        if let Some(dot) = PathBuilder::from_circle(p.x, p.y, (style.width / 2.0).max(0.5)) {
            pixmap.fill_path(&dot, &paint, FillRule::Winding, transform, None);
        }
        return;
    }
    let mut pb = PathBuilder::new();
    for (i, p) in points.iter().enumerate() {
        if i == 0 {
            pb.move_to(p.x, p.y);
        } else {
            pb.line_to(p.x, p.y);
        }
    }
    let Some(path) = pb.finish() else {
        return;
    };
    match style.mode {
        PaintMode::Fill => pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None),
        PaintMode::Stroke => {
            pixmap.stroke_path(&path, &paint, &round_stroke(style.width), transform, None);
        }
    }
}

/// Path for a shape spanning `start` and `end`.
pub(crate) fn shape_path(
    config: &RenderConfig,
    kind: ShapeKind,
    start: Point,
    end: Point,
) -> Option<tiny_skia::Path> {
    match kind {
        ShapeKind::Rectangle => {
            to_skia_rect(Rect::from_corners(start, end)).map(PathBuilder::from_rect)
        }
        ShapeKind::Oval => {
            to_skia_rect(Rect::from_corners(start, end)).and_then(PathBuilder::from_oval)
        }
        ShapeKind::Line => {
            let mut pb = PathBuilder::new();
            pb.move_to(start.x, start.y);
            pb.line_to(end.x, end.y);
            pb.finish()
        }
        ShapeKind::Arrow => {
            let (h1, h2) =
                arrow_head(start, end, config.arrow_head_length, config.arrow_head_angle);
            let mut pb = PathBuilder::new();
            pb.move_to(start.x, start.y);
            pb.line_to(end.x, end.y);
            pb.move_to(end.x, end.y);
            pb.line_to(h1.x, h1.y);
            pb.move_to(end.x, end.y);
            pb.line_to(h2.x, h2.y);
            pb.finish()
        }
    }
}

/// End points of the two arrow head barbs.
pub(crate) fn arrow_head(
    start: Point,
    end: Point,
    length: f32,
    half_angle_deg: f32,
) -> (Point, Point) {
    let angle = (end.y - start.y).atan2(end.x - start.x);
    let half = half_angle_deg.to_radians();
    let barb = |a: f32| Point::new(end.x - length * a.cos(), end.y - length * a.sin());
    (barb(angle - half), barb(angle + half))
}

fn draw_shape(
    pixmap: &mut Pixmap,
    config: &RenderConfig,
    kind: ShapeKind,
    start: Point,
    end: Point,
    style: &Style,
    transform: Transform,
) {
    let Some(path) = shape_path(config, kind, start, end) else {
        return;
    };
    let paint = style_paint(style, config.anti_aliasing);
    let fillable = matches!(kind, ShapeKind::Rectangle | ShapeKind::Oval);
    if fillable && style.mode == PaintMode::Fill {
        pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
    } else {
        pixmap.stroke_path(&path, &paint, &round_stroke(style.width), transform, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_head_points_back_along_shaft() {
        let (a, b) = arrow_head(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 40.0, 30.0);
        let dx = 40.0 * 30f32.to_radians().cos();
        let dy = 40.0 * 30f32.to_radians().sin();
        assert!((a.x - (100.0 - dx)).abs() < 1e-3);
        assert!((a.y - dy).abs() < 1e-3);
        assert!((b.x - (100.0 - dx)).abs() < 1e-3);
        assert!((b.y + dy).abs() < 1e-3);
    }

    #[test]
    fn test_shape_paths_exist() {
        let config = RenderConfig::default();
        let (s, e) = (Point::new(10.0, 10.0), Point::new(50.0, 40.0));
        for kind in [ShapeKind::Rectangle, ShapeKind::Oval, ShapeKind::Line, ShapeKind::Arrow] {
            assert!(shape_path(&config, kind, s, e).is_some(), "{kind:?}");
        }
    }

    #[test]
    fn test_visible_rect_follows_zoom() {
        let mut canvas = Canvas::default();
        canvas.set_viewport(200, 100);
        let mut view = Affine::identity();
        view.post_scale(2.0, 2.0, 0.0, 0.0).expect("scale");
        let rect = visible_canvas_rect(&canvas, &view).expect("rect");
        assert!((rect.right - 100.0).abs() < 1e-4);
        assert!((rect.bottom - 50.0).abs() < 1e-4);
    }
}
