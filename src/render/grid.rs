use crate::config::RenderConfig;
use crate::error::Result;
use crate::schema::Axes;
use crate::theme::Theme;

use super::canvas::{Anchor, Frame, Stroke, SvgWriter, TextStyle, fitted_step, format_number, tick_values};

/// What the background grid shows. Built from a diagram's `axes`.
#[derive(Debug, Clone)]
pub(super) struct GridSpec<'a> {
    pub step: f64,
    pub show_grid: bool,
    pub show_numbers: bool,
    pub x_label: Option<&'a str>,
    pub y_label: Option<&'a str>,
}

impl<'a> GridSpec<'a> {
    pub fn from_axes(axes: &'a Axes) -> Self {
        let step = if axes.tick_step.is_finite() && axes.tick_step > 0.0 {
            axes.tick_step
        } else {
            1.0
        };
        Self {
            step,
            show_grid: axes.show_grid,
            show_numbers: axes.show_numbers,
            x_label: axes.x_label.as_deref(),
            y_label: axes.y_label.as_deref(),
        }
    }
}

/// Grid lines at every multiple of the step (coarsened when the window holds
/// more than `max_ticks` of them), heavier axis lines where zero is
/// inside the window, and tick numbers that skip the origin.
pub(super) fn draw_grid(
    svg: &mut SvgWriter,
    frame: &Frame,
    spec: &GridSpec<'_>,
    theme: &Theme,
    config: &RenderConfig,
) -> Result<()> {
    let bounds = frame.bounds;
    let x_step = fitted_step(bounds.min_x, bounds.max_x, spec.step, config.max_ticks);
    let y_step = fitted_step(bounds.min_y, bounds.max_y, spec.step, config.max_ticks);
    if x_step != spec.step || y_step != spec.step {
        log::debug!(
            step = spec.step,
            x_step = x_step,
            y_step = y_step,
            max_ticks = config.max_ticks;
            "Coarsening grid step to stay under the tick limit"
        );
    }
    let xs = tick_values(bounds.min_x, bounds.max_x, x_step, config.max_ticks)?;
    let ys = tick_values(bounds.min_y, bounds.max_y, y_step, config.max_ticks)?;
    let top = frame.y(bounds.max_y);
    let bottom = frame.y(bounds.min_y);
    let left = frame.x(bounds.min_x);
    let right = frame.x(bounds.max_x);

    svg.open_group("grid");
    if spec.show_grid {
        let stroke = Stroke::solid(&theme.grid_color, config.grid_stroke_width);
        for x in &xs {
            let cx = frame.x(*x);
            svg.line((cx, top), (cx, bottom), stroke, "grid-line");
        }
        for y in &ys {
            let cy = frame.y(*y);
            svg.line((left, cy), (right, cy), stroke, "grid-line");
        }
    }

    let x_axis_in_range = bounds.min_y <= 0.0 && 0.0 <= bounds.max_y;
    let y_axis_in_range = bounds.min_x <= 0.0 && 0.0 <= bounds.max_x;
    let axis = Stroke::solid(&theme.axis_color, config.axis_stroke_width);
    if x_axis_in_range {
        let cy = frame.y(0.0);
        svg.line((left, cy), (right, cy), axis, "axis");
    }
    if y_axis_in_range {
        let cx = frame.x(0.0);
        svg.line((cx, top), (cx, bottom), axis, "axis");
    }

    if spec.show_numbers {
        let size = theme.font_size * 0.85;
        // Numbers run along the axis when it is visible, else along the edge.
        let number_row = if x_axis_in_range { frame.y(0.0) } else { bottom };
        let number_col = if y_axis_in_range { frame.x(0.0) } else { left };
        for x in xs.iter().filter(|x| **x != 0.0) {
            svg.text(
                (frame.x(*x), number_row),
                &format_number(*x),
                TextStyle::new("tick-number").dy(size + 2.0).size(size),
            );
        }
        for y in ys.iter().filter(|y| **y != 0.0) {
            svg.text(
                (number_col, frame.y(*y)),
                &format_number(*y),
                TextStyle::new("tick-number")
                    .anchor(Anchor::End)
                    .dy(size / 3.0)
                    .size(size),
            );
        }
    }

    if let Some(label) = spec.x_label {
        let row = if x_axis_in_range { frame.y(0.0) } else { bottom };
        svg.text(
            (right, row),
            label,
            TextStyle::new("axis-label").anchor(Anchor::End).dy(-6.0),
        );
    }
    if let Some(label) = spec.y_label {
        let col = if y_axis_in_range { frame.x(0.0) } else { left };
        svg.text(
            (col, top),
            label,
            TextStyle::new("axis-label").anchor(Anchor::Start).dy(-6.0),
        );
    }
    svg.close_group();
    Ok(())
}
