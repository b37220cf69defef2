use crate::error::{DiagramError, Result};
use crate::schema::{AngleProperties, Point, ShapeType};

use super::canvas::{Anchor, Stroke, SvgWriter, TextStyle, format_number};
use super::{RenderContext, require};

/// Rays drawn from a fixed vertex in the middle of the canvas. Angles are in
/// degrees, counter-clockwise from the reference ray pointing right.
struct Pivot {
    cx: f64,
    cy: f64,
    ray_length: f64,
}

impl Pivot {
    fn at(&self, degrees: f64, distance: f64) -> (f64, f64) {
        let rad = degrees.to_radians();
        (self.cx + distance * rad.cos(), self.cy - distance * rad.sin())
    }

    fn ray_end(&self, degrees: f64) -> (f64, f64) {
        self.at(degrees, self.ray_length)
    }
}

/// The angle between the two rays, from `measure` or else from the rays'
/// end points around `vertex`, normalised into `[0, 360)`.
pub(crate) fn resolve_measure(props: &AngleProperties) -> Option<f64> {
    if let Some(measure) = props.measure {
        return Some(measure);
    }
    let (vertex, r1, r2) = (props.vertex.as_ref()?, props.ray1_end.as_ref()?, props.ray2_end.as_ref()?);
    let first = (r1.y - vertex.y).atan2(r1.x - vertex.x);
    let second = (r2.y - vertex.y).atan2(r2.x - vertex.x);
    Some((second - first).to_degrees().rem_euclid(360.0))
}

pub(super) fn render(ctx: &RenderContext<'_>, shape_type: ShapeType) -> Result<String> {
    let props = require(ctx.diagram.angle.as_ref(), "angle")?;
    let measure = resolve_measure(props).ok_or_else(|| {
        DiagramError::generation("angle needs a measure or a vertex with two ray end points")
            .with_detail("field", "angle.measure")
    })?;
    if !measure.is_finite() {
        return Err(DiagramError::generation(format!("angle measure {measure} is not finite")));
    }
    let config = ctx.config;
    let theme = ctx.theme;
    let pivot = Pivot {
        cx: config.canvas_width / 2.0,
        cy: config.canvas_height / 2.0,
        ray_length: config.canvas_width.min(config.canvas_height) / 2.0 - config.padding,
    };
    if pivot.ray_length <= 0.0 {
        return Err(DiagramError::generation("canvas too small for angle rays"));
    }
    let center = (pivot.cx, pivot.cy);
    let ray = Stroke::solid(&theme.stroke_color, config.stroke_width);
    let mut svg = ctx.writer();

    if shape_type == ShapeType::VerticalAngles {
        // Both lines run through the vertex.
        svg.line(pivot.ray_end(180.0), pivot.ray_end(0.0), ray, "ray");
        svg.line(pivot.ray_end(measure + 180.0), pivot.ray_end(measure), ray, "ray");
    } else {
        svg.line(center, pivot.ray_end(0.0), ray, "ray");
        svg.line(center, pivot.ray_end(measure), ray, "ray");
    }

    let own_label = props
        .label
        .clone()
        .unwrap_or_else(|| format!("{}°", format_number(measure)));
    mark_angle(&mut svg, &pivot, 0.0, measure, &own_label, &theme.arc_color, ctx);

    match shape_type {
        ShapeType::ComplementaryAngles => draw_partner(&mut svg, &pivot, measure, 90.0, ctx),
        ShapeType::SupplementaryAngles => draw_partner(&mut svg, &pivot, measure, 180.0, ctx),
        ShapeType::VerticalAngles => {
            mark_angle(&mut svg, &pivot, 180.0, measure, &own_label, &theme.arc_color, ctx);
        }
        _ => {}
    }

    draw_point_labels(&mut svg, &pivot, props, measure, ctx);
    svg.circle(center, config.marker_radius, &theme.vertex_color, None, "vertex");
    svg.finish()
}

/// Arc glyph from `start` sweeping `span` degrees, with its label on the
/// bisector just outside the arc.
fn mark_angle(
    svg: &mut SvgWriter,
    pivot: &Pivot,
    start: f64,
    span: f64,
    label: &str,
    color: &str,
    ctx: &RenderContext<'_>,
) {
    let radius = ctx.config.angle_arc_radius;
    let span = span.rem_euclid(360.0);
    if span > 0.0 {
        svg.arc(
            pivot.at(start, radius),
            pivot.at(start + span, radius),
            radius,
            span > 180.0,
            Stroke::solid(color, ctx.config.stroke_width),
            "angle-arc",
        );
    }
    let at = pivot.at(start + span / 2.0, radius + ctx.config.label_offset * 2.0);
    svg.text(
        at,
        label,
        TextStyle::new("angle-label").dy(ctx.theme.font_size / 3.0).color(color),
    );
}

/// The ray completing the pair to `total` degrees and the remainder's label.
fn draw_partner(svg: &mut SvgWriter, pivot: &Pivot, measure: f64, total: f64, ctx: &RenderContext<'_>) {
    let remainder = total - measure;
    if remainder <= 0.0 {
        log::debug!(measure = measure, total = total; "Angle leaves no remainder to draw");
        return;
    }
    let color = ctx.theme.transformed_color.as_str();
    svg.line(
        (pivot.cx, pivot.cy),
        pivot.ray_end(total),
        Stroke::solid(&ctx.theme.stroke_color, ctx.config.stroke_width),
        "partner-ray",
    );
    mark_angle(
        svg,
        pivot,
        measure,
        remainder,
        &format!("{}°", format_number(remainder)),
        color,
        ctx,
    );
}

fn draw_point_labels(
    svg: &mut SvgWriter,
    pivot: &Pivot,
    props: &AngleProperties,
    measure: f64,
    ctx: &RenderContext<'_>,
) {
    let named = |point: Option<&Point>| point.and_then(|p| p.label.clone());
    let offset = ctx.config.label_offset;
    if let Some(name) = named(props.vertex.as_ref()) {
        svg.text(
            (pivot.cx - offset, pivot.cy),
            &name,
            TextStyle::new("point-label").anchor(Anchor::End).dy(offset * 2.0),
        );
    }
    for (point, direction) in [(props.ray1_end.as_ref(), 0.0), (props.ray2_end.as_ref(), measure)] {
        if let Some(name) = named(point) {
            svg.text(
                pivot.at(direction, pivot.ray_length + offset * 2.0),
                &name,
                TextStyle::new("point-label").dy(ctx.theme.font_size / 3.0),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RenderOptions, render_svg};
    use crate::schema::Diagram;

    fn angle(shape_type: ShapeType, props: AngleProperties) -> Diagram {
        let mut diagram = Diagram::new(shape_type);
        diagram.angle = Some(props);
        diagram
    }

    fn measured(value: f64) -> AngleProperties {
        AngleProperties {
            measure: Some(value),
            ..Default::default()
        }
    }

    #[test]
    fn second_ray_follows_the_measure() {
        let svg = render_svg(&angle(ShapeType::Angle, measured(60.0)), &RenderOptions::default()).unwrap();
        assert!(svg.contains(r#"<line class="ray" x1="200.00" y1="200.00" x2="280.00" y2="61.44""#), "{svg}");
        assert!(svg.contains(">60°</text>"));
        assert_eq!(svg.matches("class=\"angle-arc\"").count(), 1);
    }

    #[test]
    fn measure_is_derived_from_rays() {
        let props = AngleProperties {
            vertex: Some(Point::new(1.0, 1.0)),
            ray1_end: Some(Point::new(3.0, 1.0)),
            ray2_end: Some(Point::new(1.0, 4.0)),
            ..Default::default()
        };
        let measure = resolve_measure(&props).unwrap();
        assert!((measure - 90.0).abs() < 1e-9);

        let reflex = AngleProperties {
            vertex: Some(Point::new(0.0, 0.0)),
            ray1_end: Some(Point::new(1.0, 0.0)),
            ray2_end: Some(Point::new(0.0, -1.0)),
            ..Default::default()
        };
        assert!((resolve_measure(&reflex).unwrap() - 270.0).abs() < 1e-9);
    }

    #[test]
    fn reflex_angles_use_the_large_arc() {
        let svg = render_svg(&angle(ShapeType::Angle, measured(270.0)), &RenderOptions::default()).unwrap();
        assert!(svg.contains(" A 30.00 30.00 0 1 0 "));
    }

    #[test]
    fn complementary_pair_labels_the_remainder() {
        let svg = render_svg(
            &angle(ShapeType::ComplementaryAngles, measured(35.0)),
            &RenderOptions::default(),
        )
        .unwrap();
        assert!(svg.contains("class=\"partner-ray\""));
        assert!(svg.contains(">35°</text>"));
        assert!(svg.contains(">55°</text>"));
    }

    #[test]
    fn supplementary_pair_labels_the_remainder() {
        let svg = render_svg(
            &angle(ShapeType::SupplementaryAngles, measured(120.0)),
            &RenderOptions::default(),
        )
        .unwrap();
        assert!(svg.contains(">60°</text>"));
    }

    #[test]
    fn vertical_angles_mark_the_opposite_pair() {
        let svg = render_svg(&angle(ShapeType::VerticalAngles, measured(50.0)), &RenderOptions::default()).unwrap();
        assert_eq!(svg.matches("class=\"angle-arc\"").count(), 2);
        assert_eq!(svg.matches(">50°</text>").count(), 2);
    }

    #[test]
    fn custom_label_and_point_names() {
        let props = AngleProperties {
            vertex: Some(Point {
                x: 0.0,
                y: 0.0,
                label: Some("B".to_string()),
            }),
            measure: Some(40.0),
            label: Some("x".to_string()),
            ..Default::default()
        };
        let svg = render_svg(&angle(ShapeType::Angle, props), &RenderOptions::default()).unwrap();
        assert!(svg.contains(">x</text>"));
        assert!(svg.contains(">B</text>"));
        assert!(!svg.contains(">40°</text>"));
    }

    #[test]
    fn angle_without_measure_or_rays_fails() {
        let err = render_svg(&angle(ShapeType::Angle, AngleProperties::default()), &RenderOptions::default())
            .unwrap_err();
        assert_eq!(err.details["field"], serde_json::json!("angle.measure"));
    }
}
