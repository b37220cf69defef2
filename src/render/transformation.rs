use crate::error::{DiagramError, Result};
use crate::schema::{Point, ShapeType, TransformationProperties, Vertex};

use super::canvas::{Anchor, Bounds, Frame, Stroke, SvgWriter, TextStyle, format_number};
use super::grid::{GridSpec, draw_grid};
use super::polygon::vertex_label;
use super::{RenderContext, require};

const TRANSLATION_MARKER: &str = "translation-arrow";

struct FigureStyle<'a> {
    stroke: Stroke<'a>,
    fill: &'a str,
    color: &'a str,
    class: &'a str,
}

pub(super) fn render(ctx: &RenderContext<'_>, shape_type: ShapeType) -> Result<String> {
    let props = require(ctx.diagram.transformation.as_ref(), "transformation")?;
    let original = &props.original_vertices;
    let transformed = &props.transformed_vertices;
    if original.is_empty() && transformed.is_empty() {
        return Err(DiagramError::generation("transformation has no vertices")
            .with_detail("field", "transformation.originalVertices"));
    }
    if original.iter().chain(transformed).any(|v| !v.is_finite()) {
        return Err(DiagramError::generation("transformation vertices must be finite"));
    }

    let bounds = match &ctx.diagram.axes {
        Some(axes) => Bounds::from_axes(axes),
        None => Bounds::around(figure_points(props))
            .ok_or_else(|| DiagramError::generation("transformation has no vertices"))?
            .expand(ctx.config.inferred_margin),
    };
    let frame = Frame::uniform(bounds, ctx.config)?;
    let theme = ctx.theme;
    let config = ctx.config;
    let mut svg = ctx.writer();
    if let Some(axes) = &ctx.diagram.axes {
        draw_grid(&mut svg, &frame, &GridSpec::from_axes(axes), theme, config)?;
    }

    if shape_type == ShapeType::Reflection {
        if let Some(line) = props.reflection_line.as_deref() {
            draw_reflection_line(&mut svg, &frame, line, ctx);
        }
    }
    if shape_type == ShapeType::Dilation {
        if let Some(center) = props.dilation_center.as_ref() {
            draw_dilation_rays(&mut svg, &frame, center, props, ctx);
        }
    }

    draw_figure(
        &mut svg,
        &frame,
        original,
        FigureStyle {
            stroke: Stroke::solid(&theme.stroke_color, config.stroke_width),
            fill: &theme.fill_color,
            color: &theme.vertex_color,
            class: "original",
        },
        ctx,
    );
    draw_figure(
        &mut svg,
        &frame,
        transformed,
        FigureStyle {
            stroke: Stroke::dashed(&theme.transformed_color, config.stroke_width, &config.dash_pattern),
            fill: "none",
            color: &theme.transformed_color,
            class: "transformed",
        },
        ctx,
    );

    match shape_type {
        ShapeType::Rotation => {
            if let Some(center) = props.rotation_center.as_ref() {
                let caption = props
                    .rotation_angle
                    .map(|angle| format!("{}°", format_number(angle)));
                draw_center(&mut svg, &frame, center, caption.as_deref(), "rotation-center", ctx);
            }
        }
        ShapeType::Dilation => {
            if let Some(center) = props.dilation_center.as_ref() {
                let caption = props
                    .scale_factor
                    .map(|k| format!("k = {}", format_number(k)));
                draw_center(&mut svg, &frame, center, caption.as_deref(), "dilation-center", ctx);
            }
        }
        ShapeType::Translation => draw_translation(&mut svg, &frame, props, ctx),
        _ => {}
    }
    svg.finish()
}

/// Every model point the window must show.
fn figure_points(props: &TransformationProperties) -> Vec<(f64, f64)> {
    let mut points: Vec<(f64, f64)> = props
        .original_vertices
        .iter()
        .chain(&props.transformed_vertices)
        .map(|v| (v.x, v.y))
        .collect();
    let extra = props
        .rotation_center
        .iter()
        .chain(&props.dilation_center)
        .chain(props.reflection_line.iter().flatten())
        .filter(|p| p.is_finite());
    points.extend(extra.map(|p| (p.x, p.y)));
    points
}

fn draw_figure(
    svg: &mut SvgWriter,
    frame: &Frame,
    vertices: &[Vertex],
    style: FigureStyle<'_>,
    ctx: &RenderContext<'_>,
) {
    if vertices.is_empty() {
        return;
    }
    let points: Vec<(f64, f64)> = vertices.iter().map(|v| frame.point(v.x, v.y)).collect();
    svg.open_group(style.class);
    svg.polygon(&points, style.stroke, style.fill, style.class);
    for (vertex, at) in vertices.iter().zip(&points) {
        svg.circle(*at, ctx.config.marker_radius, style.color, None, "vertex");
        svg.text(
            (at.0 + ctx.config.label_offset, at.1),
            &vertex_label(vertex),
            TextStyle::new("vertex-label")
                .anchor(Anchor::Start)
                .dy(-ctx.config.label_offset)
                .color(style.color),
        );
    }
    svg.close_group();
}

fn draw_center(
    svg: &mut SvgWriter,
    frame: &Frame,
    center: &Point,
    caption: Option<&str>,
    class: &str,
    ctx: &RenderContext<'_>,
) {
    if !center.is_finite() {
        return;
    }
    let at = frame.point(center.x, center.y);
    svg.circle(
        at,
        ctx.config.marker_radius,
        &ctx.theme.background,
        Some(Stroke::solid(&ctx.theme.highlight_color, ctx.config.stroke_width)),
        class,
    );
    let name = center.label.as_deref().unwrap_or("P");
    let text = match caption {
        Some(caption) => format!("{name} ({caption})"),
        None => name.to_string(),
    };
    svg.text(
        (at.0 - ctx.config.label_offset, at.1),
        &text,
        TextStyle::new("center-label")
            .anchor(Anchor::End)
            .dy(ctx.config.label_offset * 2.0)
            .color(&ctx.theme.highlight_color),
    );
}

/// Mirror line through the first two points, clipped to the visible window.
fn draw_reflection_line(svg: &mut SvgWriter, frame: &Frame, line: &[Point], ctx: &RenderContext<'_>) {
    let [a, b, ..] = line else {
        log::debug!(points = line.len(); "Reflection line needs two points");
        return;
    };
    let Some((from, to)) = clip_line(&frame.bounds, (a.x, a.y), (b.x - a.x, b.y - a.y)) else {
        return;
    };
    svg.line(
        frame.point(from.0, from.1),
        frame.point(to.0, to.1),
        Stroke::dashed(&ctx.theme.highlight_color, ctx.config.stroke_width, &ctx.config.dash_pattern),
        "reflection-line",
    );
}

/// Liang-Barsky clip of the infinite line `origin + t * dir` to `bounds`.
fn clip_line(bounds: &Bounds, origin: (f64, f64), dir: (f64, f64)) -> Option<((f64, f64), (f64, f64))> {
    if dir.0 == 0.0 && dir.1 == 0.0 {
        return None;
    }
    let mut t0 = f64::NEG_INFINITY;
    let mut t1 = f64::INFINITY;
    for (p, d, min, max) in [
        (origin.0, dir.0, bounds.min_x, bounds.max_x),
        (origin.1, dir.1, bounds.min_y, bounds.max_y),
    ] {
        if d == 0.0 {
            if p < min || p > max {
                return None;
            }
            continue;
        }
        let (ta, tb) = ((min - p) / d, (max - p) / d);
        t0 = t0.max(ta.min(tb));
        t1 = t1.min(ta.max(tb));
    }
    if !(t0.is_finite() && t1.is_finite()) || t0 > t1 {
        return None;
    }
    Some((
        (origin.0 + t0 * dir.0, origin.1 + t0 * dir.1),
        (origin.0 + t1 * dir.0, origin.1 + t1 * dir.1),
    ))
}

/// Rays from the centre through each image vertex, reaching whichever of the
/// pre-image or image vertex is farther out.
fn draw_dilation_rays(
    svg: &mut SvgWriter,
    frame: &Frame,
    center: &Point,
    props: &TransformationProperties,
    ctx: &RenderContext<'_>,
) {
    if !center.is_finite() {
        return;
    }
    let stroke = Stroke::dashed(&ctx.theme.axis_color, ctx.config.stroke_width / 2.0, &ctx.config.dash_pattern);
    let origin = frame.point(center.x, center.y);
    for (index, image) in props.transformed_vertices.iter().enumerate() {
        let reach = |v: &Vertex| (v.x - center.x).hypot(v.y - center.y);
        let far = match props.original_vertices.get(index) {
            Some(pre) if reach(pre) > reach(image) => pre,
            _ => image,
        };
        svg.line(origin, frame.point(far.x, far.y), stroke, "dilation-ray");
    }
}

/// Arrow from the pre-image centroid along the translation vector, or to the
/// image centroid when no vector is given.
fn draw_translation(svg: &mut SvgWriter, frame: &Frame, props: &TransformationProperties, ctx: &RenderContext<'_>) {
    let Some(start) = centroid(&props.original_vertices) else {
        return;
    };
    let end = match props.translation_vector {
        Some(v) if v.dx.is_finite() && v.dy.is_finite() => (start.0 + v.dx, start.1 + v.dy),
        _ => match centroid(&props.transformed_vertices) {
            Some(end) => end,
            None => return,
        },
    };
    if start == end {
        return;
    }
    svg.arrow_marker(TRANSLATION_MARKER, &ctx.theme.highlight_color);
    svg.arrow(
        frame.point(start.0, start.1),
        frame.point(end.0, end.1),
        Stroke::solid(&ctx.theme.highlight_color, ctx.config.stroke_width),
        TRANSLATION_MARKER,
    );
    if let Some(v) = props.translation_vector {
        let mid = frame.point((start.0 + end.0) / 2.0, (start.1 + end.1) / 2.0);
        svg.text(
            mid,
            &format!("⟨{}, {}⟩", format_number(v.dx), format_number(v.dy)),
            TextStyle::new("vector-label")
                .dy(-ctx.config.label_offset)
                .color(&ctx.theme.highlight_color),
        );
    }
}

fn centroid(vertices: &[Vertex]) -> Option<(f64, f64)> {
    if vertices.is_empty() {
        return None;
    }
    let n = vertices.len() as f64;
    Some((
        vertices.iter().map(|v| v.x).sum::<f64>() / n,
        vertices.iter().map(|v| v.y).sum::<f64>() / n,
    ))
}
