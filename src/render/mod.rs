//! Diagram to SVG. One sub-renderer per shape family, all mapping through the
//! shared [`canvas::Frame`].

mod angle;
mod canvas;
mod circle;
mod grid;
mod number_line;
mod polygon;
mod transformation;

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::config::{Config, RenderConfig};
use crate::error::{DiagramError, ErrorCode, Result};
use crate::schema::{Diagram, ShapeFamily, ShapeTag};
use crate::theme::Theme;

const DATA_URI_PREFIX: &str = "data:image/svg+xml;base64,";

/// Everything a render call needs besides the diagram.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub theme: Theme,
    pub config: RenderConfig,
}

impl RenderOptions {
    pub fn classroom() -> Self {
        Self::default()
    }

    pub fn monochrome() -> Self {
        Self {
            theme: Theme::monochrome(),
            config: RenderConfig::default(),
        }
    }
}

impl From<&Config> for RenderOptions {
    fn from(config: &Config) -> Self {
        Self {
            theme: config.theme.clone(),
            config: config.render.clone(),
        }
    }
}

/// Render with the default classroom theme. See [`render_with_options`].
pub fn render(diagram: &Diagram) -> Option<String> {
    render_with_options(diagram, &RenderOptions::default())
}

/// Render to a base64 `data:image/svg+xml` URI.
///
/// Never fails loudly: a diagram that cannot be drawn is logged and yields
/// `None`, and the caller substitutes its fallback image.
pub fn render_with_options(diagram: &Diagram, options: &RenderOptions) -> Option<String> {
    let shape_type = diagram
        .shape_type
        .as_ref()
        .map(ShapeTag::as_str)
        .unwrap_or("<missing>");
    match render_svg(diagram, options) {
        Ok(svg) => {
            log::debug!(shape_type = shape_type, bytes = svg.len(); "Rendered diagram");
            Some(to_data_uri(&svg))
        }
        Err(err) if err.code == ErrorCode::NoRenderer => {
            log::info!(shape_type = shape_type, code = err.code.as_str(); "{}", err.message);
            None
        }
        Err(err) => {
            log::warn!(
                shape_type = shape_type,
                code = err.code.as_str(),
                details:? = err.details;
                "Diagram render failed: {}",
                err.message
            );
            None
        }
    }
}

/// Render to raw SVG markup, reporting why a diagram could not be drawn.
pub fn render_svg(diagram: &Diagram, options: &RenderOptions) -> Result<String> {
    let shape_type = match &diagram.shape_type {
        Some(ShapeTag::Known(shape_type)) => *shape_type,
        Some(ShapeTag::Unknown(name)) => return Err(DiagramError::no_renderer(name)),
        None => return Err(DiagramError::no_renderer("<missing>")),
    };
    let ctx = RenderContext {
        diagram,
        theme: &options.theme,
        config: &options.config,
    };
    let svg = match shape_type.family() {
        ShapeFamily::Polygon => polygon::render(&ctx, shape_type)?,
        ShapeFamily::Circle => circle::render(&ctx, shape_type)?,
        ShapeFamily::NumberLine => number_line::render(&ctx, shape_type)?,
        ShapeFamily::Transformation => transformation::render(&ctx, shape_type)?,
        ShapeFamily::Angle => angle::render(&ctx, shape_type)?,
        ShapeFamily::Solid => return Err(DiagramError::no_renderer(shape_type.as_str())),
    };
    check_output(&svg)?;
    Ok(svg)
}

pub fn to_data_uri(svg: &str) -> String {
    format!("{DATA_URI_PREFIX}{}", STANDARD.encode(svg.as_bytes()))
}

/// Inverse of [`to_data_uri`]; `None` for anything that is not one of ours.
pub fn decode_data_uri(uri: &str) -> Option<String> {
    let payload = uri.strip_prefix(DATA_URI_PREFIX)?;
    let bytes = STANDARD.decode(payload).ok()?;
    String::from_utf8(bytes).ok()
}

fn check_output(svg: &str) -> Result<()> {
    if svg.starts_with("<svg") && svg.ends_with("</svg>") {
        return Ok(());
    }
    Err(
        DiagramError::new(ErrorCode::InvalidOutput, "renderer produced malformed markup")
            .with_detail("length", svg.len()),
    )
}

/// Borrowed inputs handed to each family renderer.
pub(crate) struct RenderContext<'a> {
    pub diagram: &'a Diagram,
    pub theme: &'a Theme,
    pub config: &'a RenderConfig,
}

impl<'a> RenderContext<'a> {
    pub fn writer(&self) -> canvas::SvgWriter {
        canvas::SvgWriter::new(self.config, self.theme, self.diagram.title.as_deref())
    }
}

/// A sub-structure the family renderer cannot draw without.
pub(crate) fn require<'a, T>(value: Option<&'a T>, field: &str) -> Result<&'a T> {
    value.ok_or_else(|| {
        DiagramError::generation(format!("diagram has no '{field}' to draw"))
            .with_detail("field", field)
    })
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(
    svg: &str,
    output: &Path,
    render_cfg: &RenderConfig,
    theme: &Theme,
) -> anyhow::Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .map(|family| family.trim().trim_matches('"').to_string())
        .unwrap_or_else(|| "Arial".to_string());
    opt.default_size = usvg::Size::from_wh(render_cfg.canvas_width as f32, render_cfg.canvas_height as f32)
        .ok_or_else(|| anyhow::anyhow!("Invalid canvas size"))?;
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ShapeType, Vertex};

    fn triangle() -> Diagram {
        Diagram::new(ShapeType::Triangle).with_vertices(vec![
            Vertex::new("A", 0.0, 0.0),
            Vertex::new("B", 4.0, 0.0),
            Vertex::new("C", 0.0, 3.0),
        ])
    }

    #[test]
    fn data_uri_round_trips() {
        let uri = render(&triangle()).unwrap();
        assert!(uri.starts_with(DATA_URI_PREFIX));
        let svg = decode_data_uri(&uri).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn solids_have_no_renderer() {
        let err = render_svg(&Diagram::new(ShapeType::Cone), &RenderOptions::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::NoRenderer);
        assert_eq!(err.details["shapeType"], serde_json::json!("cone"));
        assert!(render(&Diagram::new(ShapeType::Cone)).is_none());
    }

    #[test]
    fn unknown_and_missing_tags_render_nothing() {
        let mut diagram = triangle();
        diagram.shape_type = Some(ShapeTag::Unknown("hexagon".to_string()));
        assert!(render(&diagram).is_none());
        diagram.shape_type = None;
        assert!(render(&diagram).is_none());
    }

    #[test]
    fn missing_substructure_is_a_generation_failure() {
        let err = render_svg(&Diagram::new(ShapeType::Circle), &RenderOptions::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::GenerationFailed);
        assert_eq!(err.details["field"], serde_json::json!("circle"));
    }

    #[test]
    fn output_check_rejects_truncated_markup() {
        assert!(check_output("<svg></svg>").is_ok());
        let err = check_output("<svg>").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidOutput);
    }

    #[test]
    fn foreign_data_uris_do_not_decode() {
        assert!(decode_data_uri("data:image/png;base64,AAAA").is_none());
        assert!(decode_data_uri("data:image/svg+xml;base64,@@@").is_none());
    }

    #[test]
    fn themes_change_output() {
        let classroom = render_svg(&triangle(), &RenderOptions::classroom()).unwrap();
        let print = render_svg(&triangle(), &RenderOptions::monochrome()).unwrap();
        assert_ne!(classroom, print);
    }
}
