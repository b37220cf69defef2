use crate::error::{DiagramError, ErrorCode, Result};
use crate::schema::Diagram;

/// Decode diagram metadata.
///
/// Strict JSON is tried first. On failure the input is retried as JSON5, which
/// also admits comments, trailing commas and `NaN`/`Infinity` literals. The
/// reported error is the strict decoder's, since authoring tools emit JSON.
pub fn parse_diagram(input: &str) -> Result<Diagram> {
    match serde_json::from_str::<Diagram>(input) {
        Ok(diagram) => Ok(diagram),
        Err(strict_err) => match json5::from_str::<Diagram>(input) {
            Ok(diagram) => {
                log::debug!("Diagram decoded with JSON5 fallback");
                Ok(diagram)
            }
            Err(_) => Err(DiagramError::new(
                ErrorCode::Generic,
                format!("diagram metadata could not be decoded: {strict_err}"),
            )
            .with_detail("line", strict_err.line())
            .with_detail("column", strict_err.column())),
        },
    }
}

/// Decode either one diagram object or an array of them.
pub fn parse_diagrams(input: &str) -> Result<Vec<Diagram>> {
    if !input.trim_start().starts_with('[') {
        return parse_diagram(input).map(|diagram| vec![diagram]);
    }
    match serde_json::from_str::<Vec<Diagram>>(input) {
        Ok(diagrams) => Ok(diagrams),
        Err(strict_err) => match json5::from_str::<Vec<Diagram>>(input) {
            Ok(diagrams) => {
                log::debug!(count = diagrams.len(); "Diagram batch decoded with JSON5 fallback");
                Ok(diagrams)
            }
            Err(_) => Err(DiagramError::new(
                ErrorCode::Generic,
                format!("diagram batch could not be decoded: {strict_err}"),
            )
            .with_detail("line", strict_err.line())
            .with_detail("column", strict_err.column())),
        },
    }
}
