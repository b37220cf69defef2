//! Error codes and the error value shared by the parser, validator and renderer.
//!
//! Every failure path carries one of a fixed set of short codes. The codes are
//! stable identifiers consumed by logging and telemetry, so a code never
//! changes meaning once published.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable failure codes.
///
/// `GEO_P*` codes describe structural problems found while decoding or
/// validating a diagram, `GEO_R*` codes describe render failures and
/// `GEO_G01` covers everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidShapeType,
    MissingRequiredField,
    InvalidCoordinates,
    DuplicateVertexLabels,
    AlgebraicCoordinates,
    CoordinatesOutOfBounds,
    InsufficientVertices,
    OverlappingVertices,
    InvalidMeasurement,
    NoRenderer,
    GenerationFailed,
    InvalidOutput,
    Timeout,
    Generic,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 14] = [
        ErrorCode::InvalidShapeType,
        ErrorCode::MissingRequiredField,
        ErrorCode::InvalidCoordinates,
        ErrorCode::DuplicateVertexLabels,
        ErrorCode::AlgebraicCoordinates,
        ErrorCode::CoordinatesOutOfBounds,
        ErrorCode::InsufficientVertices,
        ErrorCode::OverlappingVertices,
        ErrorCode::InvalidMeasurement,
        ErrorCode::NoRenderer,
        ErrorCode::GenerationFailed,
        ErrorCode::InvalidOutput,
        ErrorCode::Timeout,
        ErrorCode::Generic,
    ];

    /// Short telemetry code, e.g. `GEO_P02`.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidShapeType => "GEO_P01",
            ErrorCode::MissingRequiredField => "GEO_P02",
            ErrorCode::InvalidCoordinates => "GEO_P03",
            ErrorCode::DuplicateVertexLabels => "GEO_P04",
            ErrorCode::AlgebraicCoordinates => "GEO_P05",
            ErrorCode::CoordinatesOutOfBounds => "GEO_P06",
            ErrorCode::InsufficientVertices => "GEO_P07",
            ErrorCode::OverlappingVertices => "GEO_P08",
            ErrorCode::InvalidMeasurement => "GEO_P09",
            ErrorCode::NoRenderer => "GEO_R01",
            ErrorCode::GenerationFailed => "GEO_R02",
            ErrorCode::InvalidOutput => "GEO_R03",
            ErrorCode::Timeout => "GEO_R04",
            ErrorCode::Generic => "GEO_G01",
        }
    }

    /// Descriptive name, e.g. `MISSING_REQUIRED_FIELD`.
    pub fn name(self) -> &'static str {
        match self {
            ErrorCode::InvalidShapeType => "INVALID_SHAPE_TYPE",
            ErrorCode::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            ErrorCode::InvalidCoordinates => "INVALID_COORDINATES",
            ErrorCode::DuplicateVertexLabels => "DUPLICATE_VERTEX_LABELS",
            ErrorCode::AlgebraicCoordinates => "ALGEBRAIC_COORDINATES",
            ErrorCode::CoordinatesOutOfBounds => "COORDINATES_OUT_OF_BOUNDS",
            ErrorCode::InsufficientVertices => "INSUFFICIENT_VERTICES",
            ErrorCode::OverlappingVertices => "OVERLAPPING_VERTICES",
            ErrorCode::InvalidMeasurement => "INVALID_MEASUREMENT",
            ErrorCode::NoRenderer => "NO_RENDERER",
            ErrorCode::GenerationFailed => "GENERATION_FAILED",
            ErrorCode::InvalidOutput => "INVALID_OUTPUT",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::Generic => "GENERIC",
        }
    }

    pub fn is_render(self) -> bool {
        matches!(
            self,
            ErrorCode::NoRenderer
                | ErrorCode::GenerationFailed
                | ErrorCode::InvalidOutput
                | ErrorCode::Timeout
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error value used throughout the crate.
///
/// `details` is a free-form bag of context. It is ordered so that serialized
/// errors are stable across runs.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("[{code}] {message}")]
pub struct DiagramError {
    pub code: ErrorCode,
    pub message: String,
    pub details: BTreeMap<String, serde_json::Value>,
}

impl DiagramError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: BTreeMap::new(),
        }
    }

    /// Attach one piece of context. Values that fail to serialize are dropped.
    pub fn with_detail(mut self, key: &str, value: impl Serialize) -> Self {
        if let Ok(value) = serde_json::to_value(value) {
            self.details.insert(key.to_string(), value);
        }
        self
    }

    pub fn no_renderer(shape_type: &str) -> Self {
        Self::new(
            ErrorCode::NoRenderer,
            format!("no renderer available for shape type '{shape_type}'"),
        )
        .with_detail("shapeType", shape_type)
    }

    pub fn generation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::GenerationFailed, message)
    }
}

pub type Result<T, E = DiagramError> = std::result::Result<T, E>;
