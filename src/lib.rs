//! Structured geometry diagrams for generated math questions.
//!
//! A [`Diagram`] is validated with [`validate`] and drawn with [`render`],
//! which returns an embeddable `data:image/svg+xml` URI or `None` when the
//! diagram cannot be drawn.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod parser;
pub mod render;
pub mod schema;
pub mod theme;
pub mod validate;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, RenderConfig, ValidationConfig, load_config};
pub use error::{DiagramError, ErrorCode};
pub use parser::parse_diagram;
pub use render::{RenderOptions, render, render_svg, render_with_options, to_data_uri};
pub use schema::{Diagram, ShapeFamily, ShapeTag, ShapeType};
pub use theme::Theme;
pub use validate::{
    ValidationOptions, ValidationResult, is_valid, validate, validate_or_raise,
    validate_with_config,
};
