//! 2×2 time-series chart of inserts, queries, updates and deletes.

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::fmt::group_thousands;
use crate::report::ReportError;
use crate::report::parser::{DecimatedSeries, SeriesPoint};

/// Output image size in pixels.
pub const CHART_SIZE: (u32, u32) = (2400, 1600);

/// One subplot: title and the counter it draws.
struct Panel {
    title: &'static str,
    value: fn(&SeriesPoint) -> u64,
}

const PANELS: [Panel; 4] = [
    Panel {
        title: "Inserts",
        value: |p| p.inserts,
    },
    Panel {
        title: "Queries",
        value: |p| p.queries,
    },
    Panel {
        title: "Updates",
        value: |p| p.updates,
    },
    Panel {
        title: "Deletes",
        value: |p| p.deletes,
    },
];

/// Renders `series` as a PNG at `path`.
pub fn render_chart(series: &DecimatedSeries, path: &Path) -> Result<(), ReportError> {
    if series.is_empty() {
        return Err(ReportError::NoData);
    }

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let labels = series.labels();
    for (area, panel) in root.split_evenly((2, 2)).iter().zip(PANELS.iter()) {
        let values: Vec<u64> = series.points().iter().map(panel.value).collect();
        draw_panel(area, panel.title, &labels, &values)?;
    }

    root.present().map_err(chart_error)?;
    Ok(())
}

fn draw_panel(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    title: &str,
    labels: &[String],
    values: &[u64],
) -> Result<(), ReportError> {
    let (y_min, y_max) = y_range(values);
    let x_max = labels.len().saturating_sub(1).max(1);

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 36).into_font())
        .margin(24)
        .x_label_area_size(60)
        .y_label_area_size(160)
        .build_cartesian_2d(0..x_max, y_min..y_max)
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .x_desc("Timestamp")
        .y_desc("Count")
        .x_labels(labels.len())
        .x_label_formatter(&|x| labels.get(*x).cloned().unwrap_or_default())
        .y_label_formatter(&|y| group_thousands(*y))
        .draw()
        .map_err(chart_error)?;

    let points = values.iter().enumerate().map(|(i, v)| (i, *v));
    chart
        .draw_series(LineSeries::new(points, BLUE.stroke_width(2)).point_size(5))
        .map_err(chart_error)?;

    Ok(())
}

/// Y-axis bounds with a little headroom; never an empty range.
fn y_range(values: &[u64]) -> (u64, u64) {
    let min = values.iter().copied().min().unwrap_or(0);
    let max = values.iter().copied().max().unwrap_or(0);
    let pad = ((max - min) / 20).max(1);
    (min.saturating_sub(pad), max.saturating_add(pad))
}

fn chart_error(e: impl std::fmt::Display) -> ReportError {
    ReportError::Chart(e.to_string())
}
