//! Conversions between canvas types and tiny-skia.

use image::RgbaImage;
use markup_core::{Affine, Blend, Color, Style};
use tiny_skia::{BlendMode, ColorU8, LineCap, LineJoin, Paint, Pixmap, Stroke, Transform};

/// Convert an affine into a tiny-skia transform.
pub(crate) fn to_transform(affine: &Affine) -> Transform {
    let [sx, ky, kx, sy, tx, ty] = affine.to_row();
    Transform::from_row(sx, ky, kx, sy, tx, ty)
}

pub(crate) fn to_skia_color(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

/// Solid paint for a color.
pub(crate) fn solid_paint(color: Color, anti_alias: bool) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = anti_alias;
    paint
}

/// Paint for an object style, including its blend mode.
pub(crate) fn style_paint(style: &Style, anti_alias: bool) -> Paint<'static> {
    let mut paint = solid_paint(style.color, anti_alias);
    paint.blend_mode = match style.blend {
        Blend::Normal => BlendMode::SourceOver,
        Blend::Darken => BlendMode::Darken,
    };
    paint
}

/// Round-capped, round-joined stroke.
pub(crate) fn round_stroke(width: f32) -> Stroke {
    Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    }
}

/// Copy a straight-alpha image into a premultiplied pixmap.
pub(crate) fn image_to_pixmap(img: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(img.width(), img.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(img.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

/// Copy a premultiplied pixmap into a new straight-alpha image.
pub(crate) fn pixmap_to_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        dst.0 = [c.red(), c.green(), c.blue(), c.alpha()];
    }
    img
}
