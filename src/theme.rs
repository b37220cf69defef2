use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f64,
    pub background: String,
    pub text_color: String,
    pub stroke_color: String,
    pub fill_color: String,
    pub vertex_color: String,
    pub highlight_color: String,
    pub measurement_color: String,
    pub grid_color: String,
    pub axis_color: String,
    pub transformed_color: String,
    pub region_color: String,
    pub arc_color: String,
}

impl Theme {
    pub fn classroom() -> Self {
        Self {
            font_family: "Arial, Helvetica, sans-serif".to_string(),
            font_size: 12.0,
            background: "#FFFFFF".to_string(),
            text_color: "#1F2937".to_string(),
            stroke_color: "#2563EB".to_string(),
            fill_color: "#DBEAFE".to_string(),
            vertex_color: "#1D4ED8".to_string(),
            highlight_color: "#DC2626".to_string(),
            measurement_color: "#047857".to_string(),
            grid_color: "#E5E7EB".to_string(),
            axis_color: "#6B7280".to_string(),
            transformed_color: "#EA580C".to_string(),
            region_color: "#7C3AED".to_string(),
            arc_color: "#DB2777".to_string(),
        }
    }

    /// Black on white, for print worksheets.
    pub fn monochrome() -> Self {
        Self {
            font_family: "\"Times New Roman\", serif".to_string(),
            font_size: 12.0,
            background: "#FFFFFF".to_string(),
            text_color: "#000000".to_string(),
            stroke_color: "#000000".to_string(),
            fill_color: "none".to_string(),
            vertex_color: "#000000".to_string(),
            highlight_color: "#000000".to_string(),
            measurement_color: "#000000".to_string(),
            grid_color: "#D4D4D4".to_string(),
            axis_color: "#404040".to_string(),
            transformed_color: "#525252".to_string(),
            region_color: "#262626".to_string(),
            arc_color: "#000000".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classroom()
    }
}
