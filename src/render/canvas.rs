//! Model-to-canvas mapping and the SVG string builder shared by every family.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::RenderConfig;
use crate::error::{DiagramError, Result};
use crate::schema::Axes;
use crate::theme::Theme;

static COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(#[0-9A-Fa-f]{3,8}|[A-Za-z]{1,32}|rgba?\(\s*[0-9.,%\s]+\))$").unwrap()
});

/// Pick an author-supplied colour when it is a plain colour value, otherwise
/// the theme default.
pub(crate) fn resolve_color<'a>(candidate: Option<&'a str>, fallback: &'a str) -> &'a str {
    match candidate {
        Some(color) if COLOR_RE.is_match(color.trim()) => color.trim(),
        _ => fallback,
    }
}

/// Axis-aligned window in model space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_axes(axes: &Axes) -> Self {
        Self {
            min_x: axes.min_x,
            max_x: axes.max_x,
            min_y: axes.min_y,
            max_y: axes.max_y,
        }
    }

    /// Tight box around the points; `None` when there are none.
    pub fn around(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut bounds: Option<Bounds> = None;
        for (x, y) in points {
            bounds = Some(match bounds {
                None => Bounds {
                    min_x: x,
                    max_x: x,
                    min_y: y,
                    max_y: y,
                },
                Some(b) => Bounds {
                    min_x: b.min_x.min(x),
                    max_x: b.max_x.max(x),
                    min_y: b.min_y.min(y),
                    max_y: b.max_y.max(y),
                },
            });
        }
        bounds
    }

    pub fn expand(self, margin: f64) -> Self {
        Self {
            min_x: self.min_x - margin,
            max_x: self.max_x + margin,
            min_y: self.min_y - margin,
            max_y: self.max_y + margin,
        }
    }

    pub fn span_x(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn span_y(&self) -> f64 {
        self.max_y - self.min_y
    }

    fn check(&self) -> Result<()> {
        let finite = [self.min_x, self.max_x, self.min_y, self.max_y]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.span_x() <= 0.0 || self.span_y() <= 0.0 {
            return Err(DiagramError::generation(format!(
                "unusable drawing window x=[{}, {}] y=[{}, {}]",
                self.min_x, self.max_x, self.min_y, self.max_y
            ))
            .with_detail("bounds", [self.min_x, self.max_x, self.min_y, self.max_y]));
        }
        Ok(())
    }
}

/// Linear map from model space to canvas space. Canvas Y grows downward, so
/// model Y is inverted; every family maps through this type.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Frame {
    pub bounds: Bounds,
    pub height: f64,
    pub padding: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Frame {
    /// Independent X and Y scale factors; the window fills the drawable area.
    pub fn stretched(bounds: Bounds, config: &RenderConfig) -> Result<Self> {
        bounds.check()?;
        let (avail_w, avail_h) = drawable(config)?;
        Ok(Self {
            bounds,
            height: config.canvas_height,
            padding: config.padding,
            scale_x: avail_w / bounds.span_x(),
            scale_y: avail_h / bounds.span_y(),
            offset_x: 0.0,
            offset_y: 0.0,
        })
    }

    /// One scale factor for both axes, the window centred in the drawable
    /// area. Circles stay circles.
    pub fn uniform(bounds: Bounds, config: &RenderConfig) -> Result<Self> {
        bounds.check()?;
        let (avail_w, avail_h) = drawable(config)?;
        let scale = (avail_w / bounds.span_x()).min(avail_h / bounds.span_y());
        Ok(Self {
            bounds,
            height: config.canvas_height,
            padding: config.padding,
            scale_x: scale,
            scale_y: scale,
            offset_x: (avail_w - bounds.span_x() * scale) / 2.0,
            offset_y: (avail_h - bounds.span_y() * scale) / 2.0,
        })
    }

    pub fn x(&self, x: f64) -> f64 {
        self.padding + self.offset_x + (x - self.bounds.min_x) * self.scale_x
    }

    pub fn y(&self, y: f64) -> f64 {
        self.height - self.padding - self.offset_y - (y - self.bounds.min_y) * self.scale_y
    }

    pub fn point(&self, x: f64, y: f64) -> (f64, f64) {
        (self.x(x), self.y(y))
    }
}

fn drawable(config: &RenderConfig) -> Result<(f64, f64)> {
    let avail_w = config.canvas_width - 2.0 * config.padding;
    let avail_h = config.canvas_height - 2.0 * config.padding;
    if !(avail_w.is_finite() && avail_h.is_finite()) || avail_w <= 0.0 || avail_h <= 0.0 {
        return Err(DiagramError::generation(format!(
            "canvas {}x{} leaves no room inside padding {}",
            config.canvas_width, config.canvas_height, config.padding
        )));
    }
    Ok((avail_w, avail_h))
}

/// Every multiple of `step` inside `[min, max]`, computed from integer
/// indices so accumulated rounding cannot add or drop a tick.
pub(crate) fn tick_values(min: f64, max: f64, step: f64, max_ticks: usize) -> Result<Vec<f64>> {
    if !(min.is_finite() && max.is_finite() && step.is_finite()) || step <= 0.0 || min > max {
        return Err(DiagramError::generation(format!(
            "cannot place ticks over [{min}, {max}] with step {step}"
        )));
    }
    let first = (min / step - 1e-9).ceil();
    let last = (max / step + 1e-9).floor();
    let count = last - first + 1.0;
    if count > max_ticks as f64 {
        return Err(DiagramError::generation(format!(
            "{count} ticks over [{min}, {max}] exceeds the limit of {max_ticks}"
        ))
        .with_detail("step", step));
    }
    if count < 1.0 {
        return Ok(Vec::new());
    }
    let first = first as i64;
    Ok((0..count as i64)
        .map(|i| {
            let value = (first + i) as f64 * step;
            if value == 0.0 { 0.0 } else { value }
        })
        .collect())
}

/// Smallest whole multiple of `step` that keeps `[min, max]` within
/// `max_ticks` ticks. Returns `step` unchanged when it already fits.
pub(crate) fn fitted_step(min: f64, max: f64, step: f64, max_ticks: usize) -> f64 {
    if !(min.is_finite() && max.is_finite() && step.is_finite()) || step <= 0.0 || max_ticks == 0 {
        return step;
    }
    let count = ((max - min) / step).floor() + 1.0;
    if count <= max_ticks as f64 {
        return step;
    }
    step * (count / max_ticks as f64).ceil()
}

/// Human-facing number: integers without decimals, otherwise at most two.
pub(crate) fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    if (rounded - rounded.round()).abs() < 1e-9 {
        format!("{:.0}", rounded)
    } else {
        let text = format!("{:.2}", rounded);
        text.trim_end_matches('0').to_string()
    }
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_str(self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

/// Stroke settings for lines, outlines and paths.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Stroke<'a> {
    pub color: &'a str,
    pub width: f64,
    pub dash: Option<&'a str>,
}

impl<'a> Stroke<'a> {
    pub fn solid(color: &'a str, width: f64) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }

    pub fn dashed(color: &'a str, width: f64, dash: &'a str) -> Self {
        Self {
            color,
            width,
            dash: Some(dash),
        }
    }
}

/// Incremental SVG builder. Numbers are written with two decimals; a
/// non-finite number anywhere turns [`SvgWriter::finish`] into an error
/// instead of emitting `NaN` into the markup.
pub(crate) struct SvgWriter {
    svg: String,
    font_family: String,
    font_size: f64,
    text_color: String,
    fault: Option<String>,
}

impl SvgWriter {
    pub fn new(config: &RenderConfig, theme: &Theme, title: Option<&str>) -> Self {
        let mut writer = Self {
            svg: String::new(),
            font_family: escape_xml(&theme.font_family),
            font_size: theme.font_size,
            text_color: escape_xml(&theme.text_color),
            fault: None,
        };
        let width = writer.num(config.canvas_width);
        let height = writer.num(config.canvas_height);
        writer.svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
        ));
        if let Some(title) = title {
            writer
                .svg
                .push_str(&format!("<title>{}</title>", escape_xml(title)));
        }
        writer.svg.push_str(&format!(
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            escape_xml(&theme.background)
        ));
        writer
    }

    fn num(&mut self, value: f64) -> String {
        if !value.is_finite() {
            self.fault
                .get_or_insert_with(|| format!("non-finite canvas value {value}"));
            return "0".to_string();
        }
        let value = if value == 0.0 { 0.0 } else { value };
        format!("{value:.2}")
    }

    fn stroke_attrs(&mut self, stroke: &Stroke<'_>) -> String {
        let width = self.num(stroke.width);
        let mut attrs = format!(
            "stroke=\"{}\" stroke-width=\"{width}\"",
            escape_xml(stroke.color)
        );
        if let Some(dash) = stroke.dash {
            attrs.push_str(&format!(" stroke-dasharray=\"{}\"", escape_xml(dash)));
        }
        attrs
    }

    /// Arrowhead marker referenced as `url(#{id})`.
    pub fn arrow_marker(&mut self, id: &str, color: &str) {
        self.svg.push_str(&format!(
            "<defs><marker id=\"{}\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker></defs>",
            escape_xml(id),
            escape_xml(color)
        ));
    }

    pub fn open_group(&mut self, class: &str) {
        self.svg
            .push_str(&format!("<g class=\"{}\">", escape_xml(class)));
    }

    pub fn close_group(&mut self) {
        self.svg.push_str("</g>");
    }

    pub fn line(&mut self, from: (f64, f64), to: (f64, f64), stroke: Stroke<'_>, class: &str) {
        let (x1, y1) = (self.num(from.0), self.num(from.1));
        let (x2, y2) = (self.num(to.0), self.num(to.1));
        let attrs = self.stroke_attrs(&stroke);
        self.svg.push_str(&format!(
            "<line class=\"{class}\" x1=\"{x1}\" y1=\"{y1}\" x2=\"{x2}\" y2=\"{y2}\" {attrs}/>",
        ));
    }

    /// Line with an arrowhead at its end, using a marker added earlier.
    pub fn arrow(&mut self, from: (f64, f64), to: (f64, f64), stroke: Stroke<'_>, marker: &str) {
        let (x1, y1) = (self.num(from.0), self.num(from.1));
        let (x2, y2) = (self.num(to.0), self.num(to.1));
        let attrs = self.stroke_attrs(&stroke);
        self.svg.push_str(&format!(
            "<line class=\"arrow\" x1=\"{x1}\" y1=\"{y1}\" x2=\"{x2}\" y2=\"{y2}\" {attrs} marker-end=\"url(#{})\"/>",
            escape_xml(marker)
        ));
    }

    pub fn polygon(&mut self, points: &[(f64, f64)], stroke: Stroke<'_>, fill: &str, class: &str) {
        let mut coords = Vec::with_capacity(points.len());
        for (x, y) in points {
            let (x, y) = (self.num(*x), self.num(*y));
            coords.push(format!("{x},{y}"));
        }
        let attrs = self.stroke_attrs(&stroke);
        self.svg.push_str(&format!(
            "<polygon class=\"{class}\" points=\"{}\" fill=\"{}\" fill-opacity=\"0.35\" {attrs} stroke-linejoin=\"round\"/>",
            coords.join(" "),
            escape_xml(fill)
        ));
    }

    pub fn circle(
        &mut self,
        center: (f64, f64),
        radius: f64,
        fill: &str,
        stroke: Option<Stroke<'_>>,
        class: &str,
    ) {
        let (cx, cy, r) = (self.num(center.0), self.num(center.1), self.num(radius));
        let attrs = match stroke {
            Some(stroke) => format!(" {}", self.stroke_attrs(&stroke)),
            None => String::new(),
        };
        self.svg.push_str(&format!(
            "<circle class=\"{class}\" cx=\"{cx}\" cy=\"{cy}\" r=\"{r}\" fill=\"{}\"{attrs}/>",
            escape_xml(fill)
        ));
    }

    /// Circular arc from `start` to `end` around `center`, drawn
    /// counter-clockwise as seen on the canvas.
    pub fn arc(
        &mut self,
        start: (f64, f64),
        end: (f64, f64),
        radius: f64,
        large_arc: bool,
        stroke: Stroke<'_>,
        class: &str,
    ) {
        let (sx, sy) = (self.num(start.0), self.num(start.1));
        let (ex, ey) = (self.num(end.0), self.num(end.1));
        let r = self.num(radius);
        let large = if large_arc { 1 } else { 0 };
        let attrs = self.stroke_attrs(&stroke);
        self.svg.push_str(&format!(
            "<path class=\"{class}\" d=\"M {sx} {sy} A {r} {r} 0 {large} 0 {ex} {ey}\" fill=\"none\" {attrs}/>",
        ));
    }

    pub fn text(&mut self, at: (f64, f64), content: &str, style: TextStyle<'_>) {
        let (x, y) = (self.num(at.0), self.num(at.1));
        let dy = self.num(style.dy);
        let size = self.num(style.size.unwrap_or(self.font_size));
        let fill = style
            .color
            .map(escape_xml)
            .unwrap_or_else(|| self.text_color.clone());
        self.svg.push_str(&format!(
            "<text class=\"{}\" x=\"{x}\" y=\"{y}\" dy=\"{dy}\" text-anchor=\"{}\" font-family=\"{}\" font-size=\"{size}\" fill=\"{fill}\">{}</text>",
            style.class,
            style.anchor.as_str(),
            self.font_family,
            escape_xml(content)
        ));
    }

    pub fn finish(mut self) -> Result<String> {
        if let Some(fault) = self.fault.take() {
            return Err(DiagramError::generation(fault));
        }
        self.svg.push_str("</svg>");
        Ok(self.svg)
    }
}

/// Placement and look of one text element. `dy` shifts the glyphs without
/// moving the anchor point.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TextStyle<'a> {
    pub class: &'a str,
    pub anchor: Anchor,
    pub dy: f64,
    pub size: Option<f64>,
    pub color: Option<&'a str>,
}

impl<'a> TextStyle<'a> {
    pub fn new(class: &'a str) -> Self {
        Self {
            class,
            anchor: Anchor::Middle,
            dy: 0.0,
            size: None,
            color: None,
        }
    }

    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn dy(mut self, dy: f64) -> Self {
        self.dy = dy;
        self
    }

    pub fn size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn color(mut self, color: &'a str) -> Self {
        self.color = Some(color);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RenderConfig {
        RenderConfig::default()
    }

    fn assert_near(actual: (f64, f64), expected: (f64, f64)) {
        assert!(
            (actual.0 - expected.0).abs() < 1e-9 && (actual.1 - expected.1).abs() < 1e-9,
            "{actual:?} != {expected:?}"
        );
    }

    #[test]
    fn stretched_frame_inverts_y() {
        let bounds = Bounds {
            min_x: -1.0,
            max_x: 5.0,
            min_y: -1.0,
            max_y: 4.0,
        };
        let frame = Frame::stretched(bounds, &config()).unwrap();
        assert_near(frame.point(-1.0, -1.0), (40.0, 360.0));
        assert_near(frame.point(5.0, 4.0), (360.0, 40.0));
        assert_near(frame.point(2.0, 0.0), (200.0, 296.0));
    }

    #[test]
    fn uniform_frame_centres_the_narrow_axis() {
        let bounds = Bounds {
            min_x: 0.0,
            max_x: 8.0,
            min_y: 0.0,
            max_y: 4.0,
        };
        let frame = Frame::uniform(bounds, &config()).unwrap();
        assert_eq!(frame.scale_x, frame.scale_y);
        assert_eq!(frame.scale_x, 40.0);
        assert_near(frame.point(4.0, 2.0), (200.0, 200.0));
    }

    #[test]
    fn degenerate_window_is_rejected() {
        let bounds = Bounds {
            min_x: 1.0,
            max_x: 1.0,
            min_y: 0.0,
            max_y: 2.0,
        };
        assert!(Frame::stretched(bounds, &config()).is_err());
    }

    #[test]
    fn ticks_cover_both_ends() {
        let ticks = tick_values(-5.0, 5.0, 1.0, 100).unwrap();
        assert_eq!(ticks.len(), 11);
        assert_eq!(ticks[0], -5.0);
        assert_eq!(ticks[10], 5.0);

        let ticks = tick_values(0.0, 1.0, 0.1, 100).unwrap();
        assert_eq!(ticks.len(), 11);

        let ticks = tick_values(-0.5, 2.5, 1.0, 100).unwrap();
        assert_eq!(ticks, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn ticks_refuse_absurd_counts() {
        assert!(tick_values(-1e9, 1e9, 1.0, 500).is_err());
        assert!(tick_values(-1e9, 1e9, fitted_step(-1e9, 1e9, 1.0, 500), 500).is_ok());
        assert!(tick_values(0.0, 1.0, 0.0, 500).is_err());
    }

    #[test]
    fn fitted_step_coarsens_by_whole_multiples() {
        assert_eq!(fitted_step(-5.0, 5.0, 1.0, 500), 1.0);
        assert_eq!(fitted_step(-300.0, 300.0, 1.0, 500), 2.0);
        assert_eq!(fitted_step(0.0, 600.0, 1.0, 500), 2.0);
        let ticks = tick_values(-300.0, 300.0, 2.0, 500).unwrap();
        assert_eq!(ticks.len(), 301);
    }

    #[test]
    fn formats_numbers_compactly() {
        assert_eq!(format_number(4.0), "4");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(1.0 / 3.0), "0.33");
        assert_eq!(format_number(-3.456), "-3.46");
    }

    #[test]
    fn colors_fall_back_when_suspicious() {
        assert_eq!(resolve_color(Some("#ff0000"), "#000"), "#ff0000");
        assert_eq!(resolve_color(Some("teal"), "#000"), "teal");
        assert_eq!(resolve_color(Some("red\" onload=\"x"), "#000"), "#000");
        assert_eq!(resolve_color(None, "#000"), "#000");
    }

    #[test]
    fn writer_rejects_non_finite_output() {
        let theme = Theme::default();
        let mut svg = SvgWriter::new(&config(), &theme, None);
        svg.circle((f64::NAN, 1.0), 2.0, "red", None, "marker");
        assert!(svg.finish().is_err());
    }

    #[test]
    fn writer_escapes_text_and_title() {
        let theme = Theme::default();
        let mut svg = SvgWriter::new(&config(), &theme, Some("A<B"));
        svg.text((1.0, 2.0), "x & y", TextStyle::new("label"));
        let out = svg.finish().unwrap();
        assert!(out.contains("<title>A&lt;B</title>"));
        assert!(out.contains(">x &amp; y</text>"));
        assert!(out.ends_with("</svg>"));
    }
}
