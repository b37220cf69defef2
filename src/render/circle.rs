use crate::error::{DiagramError, Result};
use crate::schema::{ArcRange, CircleProperties, ShapeType, Vertex};

use super::canvas::{Anchor, Bounds, Frame, Stroke, SvgWriter, TextStyle, format_number};
use super::grid::{GridSpec, draw_grid};
use super::{RenderContext, require};

/// Used when an arc or sector diagram names no range.
const DEFAULT_ARC: ArcRange = ArcRange {
    start_angle: 0.0,
    end_angle: 90.0,
};

/// Secant lines run this fraction of the radius past each chord point.
const SECANT_OVERHANG: f64 = 0.5;

struct Circle {
    cx: f64,
    cy: f64,
    r: f64,
}

impl Circle {
    fn point_at(&self, degrees: f64) -> (f64, f64) {
        let rad = degrees.to_radians();
        (self.cx + self.r * rad.cos(), self.cy + self.r * rad.sin())
    }
}

pub(super) fn render(ctx: &RenderContext<'_>, shape_type: ShapeType) -> Result<String> {
    let props = require(ctx.diagram.circle.as_ref(), "circle")?;
    let center = require(props.center.as_ref(), "circle.center")?;
    let radius = *require(props.radius.as_ref(), "circle.radius")?;
    if !(radius.is_finite() && radius > 0.0) || !center.is_finite() {
        return Err(DiagramError::generation(format!(
            "circle needs a finite centre and a positive radius, got radius {radius}"
        ))
        .with_detail("radius", radius));
    }
    let circle = Circle {
        cx: center.x,
        cy: center.y,
        r: radius,
    };

    let bounds = match &ctx.diagram.axes {
        Some(axes) => Bounds::from_axes(axes),
        None => Bounds {
            min_x: circle.cx - radius,
            max_x: circle.cx + radius,
            min_y: circle.cy - radius,
            max_y: circle.cy + radius,
        }
        .expand(ctx.config.inferred_margin),
    };
    let frame = Frame::uniform(bounds, ctx.config)?;
    let mut svg = ctx.writer();
    if let Some(axes) = &ctx.diagram.axes {
        draw_grid(&mut svg, &frame, &GridSpec::from_axes(axes), ctx.theme, ctx.config)?;
    }

    let outline = Stroke::solid(&ctx.theme.stroke_color, ctx.config.stroke_width);
    let canvas_center = frame.point(circle.cx, circle.cy);
    svg.circle(
        canvas_center,
        radius * frame.scale_x,
        "none",
        Some(outline),
        "circle-outline",
    );

    match shape_type {
        ShapeType::Chord => draw_chord(&mut svg, &frame, props, ctx)?,
        ShapeType::Secant => draw_secant(&mut svg, &frame, props, &circle, ctx)?,
        ShapeType::Tangent => draw_tangent(&mut svg, &frame, props, &circle, ctx),
        ShapeType::Arc | ShapeType::Sector => {
            let range = props.arc.unwrap_or(DEFAULT_ARC);
            draw_arc(&mut svg, &frame, &circle, range, shape_type == ShapeType::Sector, ctx)?;
        }
        _ => {}
    }

    svg.circle(
        canvas_center,
        ctx.config.marker_radius,
        &ctx.theme.vertex_color,
        None,
        "center",
    );
    svg.text(
        (canvas_center.0 + ctx.config.label_offset, canvas_center.1),
        center.label.as_deref().unwrap_or("O"),
        TextStyle::new("center-label")
            .anchor(Anchor::Start)
            .dy(ctx.config.label_offset * 2.0),
    );
    svg.finish()
}

fn chord_points<'a>(props: &'a CircleProperties) -> Result<(&'a Vertex, &'a Vertex)> {
    let points = require(props.chord_points.as_ref(), "circle.chordPoints")?;
    match points.as_slice() {
        [a, b] if a.is_finite() && b.is_finite() => Ok((a, b)),
        _ => Err(DiagramError::generation(format!(
            "a chord needs exactly two finite points, got {}",
            points.len()
        ))
        .with_detail("field", "circle.chordPoints")),
    }
}

fn draw_point(svg: &mut SvgWriter, frame: &Frame, vertex: &Vertex, ctx: &RenderContext<'_>) {
    let at = frame.point(vertex.x, vertex.y);
    svg.circle(at, ctx.config.marker_radius, &ctx.theme.vertex_color, None, "vertex");
    if !vertex.label.is_empty() {
        svg.text(
            (at.0 + ctx.config.label_offset, at.1),
            &vertex.label,
            TextStyle::new("vertex-label")
                .anchor(Anchor::Start)
                .dy(-ctx.config.label_offset),
        );
    }
}

fn draw_chord(
    svg: &mut SvgWriter,
    frame: &Frame,
    props: &CircleProperties,
    ctx: &RenderContext<'_>,
) -> Result<()> {
    let (a, b) = chord_points(props)?;
    svg.line(
        frame.point(a.x, a.y),
        frame.point(b.x, b.y),
        Stroke::solid(&ctx.theme.highlight_color, ctx.config.stroke_width),
        "chord",
    );
    draw_point(svg, frame, a, ctx);
    draw_point(svg, frame, b, ctx);
    Ok(())
}

fn draw_secant(
    svg: &mut SvgWriter,
    frame: &Frame,
    props: &CircleProperties,
    circle: &Circle,
    ctx: &RenderContext<'_>,
) -> Result<()> {
    let (a, b) = chord_points(props)?;
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len = dx.hypot(dy);
    if len == 0.0 {
        return Err(DiagramError::generation("secant points coincide"));
    }
    let reach = circle.r * SECANT_OVERHANG;
    let (ux, uy) = (dx / len * reach, dy / len * reach);
    svg.line(
        frame.point(a.x - ux, a.y - uy),
        frame.point(b.x + ux, b.y + uy),
        Stroke::solid(&ctx.theme.highlight_color, ctx.config.stroke_width),
        "secant",
    );
    draw_point(svg, frame, a, ctx);
    draw_point(svg, frame, b, ctx);
    Ok(())
}

/// Radius to the point of tangency plus the perpendicular tangent line.
fn draw_tangent(
    svg: &mut SvgWriter,
    frame: &Frame,
    props: &CircleProperties,
    circle: &Circle,
    ctx: &RenderContext<'_>,
) {
    let Some(point) = props.tangent_point.as_ref().filter(|p| p.is_finite()) else {
        log::debug!("Tangent diagram without a tangent point; drawing the circle only");
        return;
    };
    let (rx, ry) = (point.x - circle.cx, point.y - circle.cy);
    let len = rx.hypot(ry);
    if len == 0.0 {
        return;
    }
    // Unit direction along the tangent, scaled to one radius each way.
    let (tx, ty) = (-ry / len * circle.r, rx / len * circle.r);
    svg.line(
        frame.point(circle.cx, circle.cy),
        frame.point(point.x, point.y),
        Stroke::dashed(&ctx.theme.stroke_color, ctx.config.stroke_width / 2.0, &ctx.config.dash_pattern),
        "radius",
    );
    svg.line(
        frame.point(point.x - tx, point.y - ty),
        frame.point(point.x + tx, point.y + ty),
        Stroke::solid(&ctx.theme.highlight_color, ctx.config.stroke_width),
        "tangent",
    );
    draw_point(svg, frame, point, ctx);
}

fn draw_arc(
    svg: &mut SvgWriter,
    frame: &Frame,
    circle: &Circle,
    range: ArcRange,
    sector: bool,
    ctx: &RenderContext<'_>,
) -> Result<()> {
    if !(range.start_angle.is_finite() && range.end_angle.is_finite()) {
        return Err(DiagramError::generation("arc range must be finite")
            .with_detail("arc", [range.start_angle, range.end_angle]));
    }
    let span = (range.end_angle - range.start_angle).rem_euclid(360.0);
    if span == 0.0 {
        return Ok(());
    }
    let start = circle.point_at(range.start_angle);
    let end = circle.point_at(range.start_angle + span);
    let stroke = Stroke::solid(&ctx.theme.arc_color, ctx.config.stroke_width * 1.5);
    if sector {
        let center = frame.point(circle.cx, circle.cy);
        svg.line(center, frame.point(start.0, start.1), stroke, "sector-radius");
        svg.line(center, frame.point(end.0, end.1), stroke, "sector-radius");
    }
    svg.arc(
        frame.point(start.0, start.1),
        frame.point(end.0, end.1),
        circle.r * frame.scale_x,
        span > 180.0,
        stroke,
        "arc",
    );

    let mid = range.start_angle + span / 2.0;
    let label_at = Circle {
        cx: circle.cx,
        cy: circle.cy,
        r: circle.r + ctx.config.label_offset * 2.0 / frame.scale_x,
    }
    .point_at(mid);
    svg.text(
        frame.point(label_at.0, label_at.1),
        &format!("{}°", format_number(span)),
        TextStyle::new("arc-label").color(&ctx.theme.arc_color),
    );
    Ok(())
}
