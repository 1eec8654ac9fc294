/// One labeled value of a series handed to the chart renderer
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

impl From<(String, f64)> for SeriesPoint {
    fn from(v: (String, f64)) -> Self {
        SeriesPoint {
            label: v.0,
            value: v.1,
        }
    }
}

impl From<SeriesPoint> for (String, f64) {
    fn from(p: SeriesPoint) -> Self {
        (p.label, p.value)
    }
}

/// Chart coordinates: x is the point's position, y its value
pub fn to_coords(points: &[SeriesPoint]) -> Vec<(f64, f64)> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.value))
        .collect()
}
