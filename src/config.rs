use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Canvas geometry and stroke metrics shared by every sub-renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub padding: f64,
    /// Model-space margin added around inferred bounds.
    pub inferred_margin: f64,
    pub stroke_width: f64,
    pub grid_stroke_width: f64,
    pub axis_stroke_width: f64,
    pub marker_radius: f64,
    pub highlight_radius: f64,
    pub label_offset: f64,
    pub number_line_point_radius: f64,
    pub number_line_tick_height: f64,
    pub region_stroke_width: f64,
    pub angle_arc_radius: f64,
    pub dash_pattern: String,
    /// Upper bound on grid lines or ticks per axis; denser steps are coarsened.
    pub max_ticks: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            canvas_width: 400.0,
            canvas_height: 400.0,
            padding: 40.0,
            inferred_margin: 1.0,
            stroke_width: 2.0,
            grid_stroke_width: 0.5,
            axis_stroke_width: 1.5,
            marker_radius: 4.0,
            highlight_radius: 6.0,
            label_offset: 8.0,
            number_line_point_radius: 6.0,
            number_line_tick_height: 8.0,
            region_stroke_width: 6.0,
            angle_arc_radius: 30.0,
            dash_pattern: "6 4".to_string(),
            max_ticks: 500,
        }
    }
}

/// Numeric thresholds the validator checks against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationConfig {
    pub default_bound: f64,
    pub extended_bound: f64,
    pub min_vertex_distance: f64,
    pub max_number_line_ticks: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            default_bound: 10.0,
            extended_bound: 50.0,
            min_vertex_distance: 0.1,
            max_number_line_ticks: 500,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub render: RenderConfig,
    pub validation: ValidationConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f64>,
    background: Option<String>,
    text_color: Option<String>,
    stroke_color: Option<String>,
    fill_color: Option<String>,
    highlight_color: Option<String>,
    transformed_color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    render: Option<RenderConfig>,
    validation: Option<ValidationConfig>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str::<ConfigFile>(&contents)
        .or_else(|_| json5::from_str(&contents))
        .map_err(|err| anyhow::anyhow!("invalid config file {}: {err}", path.display()))?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "monochrome" | "print" => config.theme = Theme::monochrome(),
            "classroom" | "default" => config.theme = Theme::classroom(),
            other => log::warn!(theme = other; "Unknown theme name, keeping default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.stroke_color {
            config.theme.stroke_color = v;
        }
        if let Some(v) = vars.fill_color {
            config.theme.fill_color = v;
        }
        if let Some(v) = vars.highlight_color {
            config.theme.highlight_color = v;
        }
        if let Some(v) = vars.transformed_color {
            config.theme.transformed_color = v;
        }
    }

    if let Some(render) = parsed.render {
        config.render = render;
    }
    if let Some(validation) = parsed.validation {
        config.validation = validation;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "geodiagram-config-{}-{name}.json",
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn missing_path_gives_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.render.canvas_width, 400.0);
        assert_eq!(config.validation.min_vertex_distance, 0.1);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let path = write_temp(
            "partial",
            r##"{"theme":"monochrome","themeVariables":{"strokeColor":"#123456"},"render":{"canvasWidth":600},"validation":{"defaultBound":20}}"##,
        );
        let config = load_config(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(config.theme.stroke_color, "#123456");
        assert_eq!(config.theme.text_color, "#000000");
        assert_eq!(config.render.canvas_width, 600.0);
        assert_eq!(config.render.canvas_height, 400.0);
        assert_eq!(config.validation.default_bound, 20.0);
        assert_eq!(config.validation.extended_bound, 50.0);
    }

    #[test]
    fn accepts_json5() {
        let path = write_temp("json5", "{ render: { padding: 10, }, }");
        let config = load_config(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(config.render.padding, 10.0);
    }
}
