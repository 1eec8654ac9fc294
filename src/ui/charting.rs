use crate::time_series::SeriesPoint;

/// X (last point position) and Y (highest value) bounds for a series chart
pub fn compute_chart_params(coords: &[(f64, f64)]) -> (f64, f64) {
    let highest = coords.iter().map(|&(_, y)| y).fold(0.0_f64, f64::max);

    let mut last_x = coords.last().map(|&(x, _)| x).unwrap_or(1.0);
    if last_x < 1.0 {
        last_x = 1.0;
    }

    (last_x, highest.ceil().max(1.0))
}

/// First and last point labels, used as the two x-axis ticks
pub fn edge_labels(points: &[SeriesPoint]) -> (String, String) {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) => (first.label.clone(), last.label.clone()),
        _ => (String::new(), String::new()),
    }
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
