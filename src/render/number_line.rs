use crate::error::{DiagramError, Result};
use crate::schema::{NumberLinePoint, NumberLineProperties, PointMarker, ShapeType};

use super::canvas::{SvgWriter, Stroke, TextStyle, fitted_step, format_number, tick_values};
use super::{RenderContext, require};

const AXIS_MARKER: &str = "number-line-arrow";
const RAY_MARKER: &str = "number-line-ray";

/// One-dimensional map from `[min, max]` onto the drawable width.
struct Scale {
    min: f64,
    max: f64,
    left: f64,
    right: f64,
}

impl Scale {
    fn x(&self, value: f64) -> f64 {
        self.left + (value - self.min) / (self.max - self.min) * (self.right - self.left)
    }

    fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

pub(super) fn render(ctx: &RenderContext<'_>, shape_type: ShapeType) -> Result<String> {
    let props = require(ctx.diagram.number_line.as_ref(), "numberLine")?;
    if !(props.min.is_finite() && props.max.is_finite()) || props.min >= props.max {
        return Err(DiagramError::generation(format!(
            "number line range [{}, {}] is empty",
            props.min, props.max
        ))
        .with_detail("range", [props.min, props.max]));
    }
    let config = ctx.config;
    let theme = ctx.theme;
    let scale = Scale {
        min: props.min,
        max: props.max,
        left: config.padding,
        right: config.canvas_width - config.padding,
    };
    let baseline = config.canvas_height / 2.0;
    let step = fitted_step(props.min, props.max, props.tick_interval, config.max_ticks);
    if step != props.tick_interval {
        log::debug!(
            tick_interval = props.tick_interval,
            step = step,
            max_ticks = config.max_ticks;
            "Thinning number line ticks to stay under the tick limit"
        );
    }
    let ticks = tick_values(props.min, props.max, step, config.max_ticks)?;

    let mut svg = ctx.writer();
    svg.arrow_marker(AXIS_MARKER, &theme.axis_color);
    svg.arrow_marker(RAY_MARKER, &theme.region_color);

    let axis = Stroke::solid(&theme.axis_color, config.axis_stroke_width);
    let mid = ((scale.left + scale.right) / 2.0, baseline);
    let overhang = config.padding / 2.0;
    svg.arrow(mid, (scale.left - overhang, baseline), axis, AXIS_MARKER);
    svg.arrow(mid, (scale.right + overhang, baseline), axis, AXIS_MARKER);

    let half = config.number_line_tick_height / 2.0;
    svg.open_group("ticks");
    for value in &ticks {
        let x = scale.x(*value);
        svg.line((x, baseline - half), (x, baseline + half), axis, "tick-mark");
        svg.text(
            (x, baseline + half),
            &format_number(*value),
            TextStyle::new("tick-label").dy(theme.font_size + 4.0),
        );
    }
    svg.close_group();

    svg.open_group("regions");
    for region in &props.regions {
        draw_span(
            &mut svg,
            &scale,
            baseline,
            (region.start, region.end),
            region.inclusive,
            "region",
            ctx,
        );
    }
    if props.regions.is_empty() {
        draw_figure(&mut svg, &scale, baseline, props, shape_type, ctx);
    }
    svg.close_group();

    svg.open_group("points");
    for point in &props.points {
        draw_point(&mut svg, &scale, baseline, point, ctx);
    }
    svg.close_group();
    svg.finish()
}

/// Thick coloured segment. Ends past the visible range run to the edge with
/// an arrowhead; ends inside get a marker, filled when inclusive.
fn draw_span(
    svg: &mut SvgWriter,
    scale: &Scale,
    baseline: f64,
    (start, end): (f64, f64),
    inclusive: bool,
    class: &str,
    ctx: &RenderContext<'_>,
) {
    let (start, end) = if start <= end { (start, end) } else { (end, start) };
    if end < scale.min || start > scale.max || start.is_nan() || end.is_nan() {
        log::debug!(start = start, end = end; "Number line span outside the visible range");
        return;
    }
    let stroke = Stroke::solid(&ctx.theme.region_color, ctx.config.region_stroke_width);
    let from = (scale.x(start.max(scale.min)), baseline);
    let to = (scale.x(end.min(scale.max)), baseline);
    match (start < scale.min, end > scale.max) {
        (false, false) => svg.line(from, to, stroke, class),
        (true, false) => svg.arrow(to, from, stroke, RAY_MARKER),
        (false, true) => svg.arrow(from, to, stroke, RAY_MARKER),
        (true, true) => {
            let mid = ((from.0 + to.0) / 2.0, baseline);
            svg.arrow(mid, from, stroke, RAY_MARKER);
            svg.arrow(mid, to, stroke, RAY_MARKER);
        }
    }
    for value in [start, end] {
        if scale.contains(value) {
            endpoint(svg, (scale.x(value), baseline), inclusive, ctx);
        }
    }
}

fn endpoint(svg: &mut SvgWriter, at: (f64, f64), filled: bool, ctx: &RenderContext<'_>) {
    let color = ctx.theme.region_color.as_str();
    let fill = if filled { color } else { ctx.theme.background.as_str() };
    svg.circle(
        at,
        ctx.config.number_line_point_radius,
        fill,
        Some(Stroke::solid(color, ctx.config.stroke_width)),
        "region-end",
    );
}

/// Segment and ray diagrams without explicit regions are drawn from their
/// points: a segment spans the first and last point, a ray starts at the first
/// point and heads toward the second (or toward `max`).
fn draw_figure(
    svg: &mut SvgWriter,
    scale: &Scale,
    baseline: f64,
    props: &NumberLineProperties,
    shape_type: ShapeType,
    ctx: &RenderContext<'_>,
) {
    let values: Vec<f64> = props.points.iter().map(|p| p.value).collect();
    match (shape_type, values.as_slice()) {
        (ShapeType::LineSegment, [first, .., last]) => {
            draw_span(svg, scale, baseline, (*first, *last), true, "segment", ctx);
        }
        (ShapeType::Ray, [origin, rest @ ..]) => {
            let toward_min = rest.first().is_some_and(|next| next < origin);
            let far = if toward_min {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            };
            draw_span(svg, scale, baseline, (*origin, far), true, "ray", ctx);
        }
        _ => {}
    }
}

fn draw_point(
    svg: &mut SvgWriter,
    scale: &Scale,
    baseline: f64,
    point: &NumberLinePoint,
    ctx: &RenderContext<'_>,
) {
    if !scale.contains(point.value) {
        log::debug!(value = point.value; "Number line point outside the visible range");
        return;
    }
    let at = (scale.x(point.value), baseline);
    let color = ctx.theme.stroke_color.as_str();
    let (fill, class) = match point.marker {
        PointMarker::Closed => (color, "point-closed"),
        PointMarker::Open => (ctx.theme.background.as_str(), "point-open"),
    };
    svg.circle(
        at,
        ctx.config.number_line_point_radius,
        fill,
        Some(Stroke::solid(color, ctx.config.stroke_width)),
        class,
    );
    let label = point
        .label
        .clone()
        .unwrap_or_else(|| format_number(point.value));
    svg.text(
        at,
        &label,
        TextStyle::new("point-label").dy(-(ctx.config.number_line_point_radius + ctx.config.label_offset)),
    );
}
