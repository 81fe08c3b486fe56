//! Diagnostic altitude/azimuth plots of a crossing search

use crate::grid::{duration_seconds, offset_time};
use crate::header::Observation;
use crate::solver::Crossing;
use chrono::Duration;
use ephemeris::AltitudeProvider;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

const ORANGE: RGBColor = RGBColor(255, 165, 0);
const ANCHOR_GREY: RGBColor = RGBColor(160, 160, 160);
const CURVE_POINTS: usize = 801;

/// Plot file for an observation: `<plot_dir>/<name up to first dot>_altaz.png`
pub fn plot_path(plot_dir: &Path, observation_path: &Path) -> PathBuf {
    let stem = observation_path
        .file_name()
        .and_then(|s| s.to_str())
        .and_then(|name| name.split('.').next())
        .filter(|s| !s.is_empty())
        .unwrap_or("observation");
    plot_dir.join(format!("{stem}_altaz.png"))
}

/// Smallest range containing `values`, padded by 5% (at least 0.5 degree)
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let pad = ((hi - lo) * 0.05).max(0.5);
    (lo - pad, hi + pad)
}

/// Render the altitude and azimuth curves over `reference ± 2 delta_time`.
///
/// The upper panel marks the target altitude, the header time, the three
/// search anchors and the chosen crossing; the lower panel shows azimuth.
pub fn render_crossing_plot<P: AltitudeProvider>(
    provider: &P,
    observation: &Observation,
    crossing: &Crossing,
    delta_time: Duration,
    save_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let half_span = 2.0 * duration_seconds(delta_time);
    let xs: Vec<f64> = (0..CURVE_POINTS)
        .map(|i| -half_span + 2.0 * half_span * i as f64 / (CURVE_POINTS - 1) as f64)
        .collect();
    let times: Vec<_> = xs
        .iter()
        .map(|&x| offset_time(crossing.reference, x))
        .collect();
    let samples = provider.sample(&times, &observation.target);

    let altitudes: Vec<f64> = samples.iter().map(|s| s.altitude_deg).collect();
    let azimuths: Vec<f64> = samples.iter().map(|s| s.azimuth_deg).collect();
    let target_alt = crossing.target_altitude_deg;
    let chosen_x = crossing.diff_seconds();
    let delta_s = duration_seconds(delta_time);

    let (alt_lo, alt_hi) = padded_range(altitudes.iter().copied().chain([target_alt]));
    let (az_lo, az_hi) = padded_range(azimuths.iter().copied());

    let root = BitMapBackend::new(save_path, (1200, 900)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.margin(20, 20, 20, 20);
    let (upper, lower) = root.split_vertically(560);

    let mut alt_chart = ChartBuilder::on(&upper)
        .caption(
            format!(
                "CROSS TIME: {} (diff: {:.1} s)",
                crossing.chosen_time().format("%Y-%m-%d %H:%M:%S%.3f"),
                chosen_x
            ),
            ("sans-serif", 28).into_font().color(&BLUE),
        )
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(-half_span..half_span, alt_lo..alt_hi)?;

    alt_chart
        .configure_mesh()
        .x_desc("Seconds from header time")
        .y_desc("ALT (deg)")
        .axis_desc_style(("sans-serif", 18))
        .label_style(("sans-serif", 14))
        .draw()?;

    for anchor_x in [-delta_s, 0.0, delta_s] {
        alt_chart.draw_series(LineSeries::new(
            vec![(anchor_x, alt_lo), (anchor_x, alt_hi)],
            &ANCHOR_GREY,
        ))?;
    }

    alt_chart
        .draw_series(LineSeries::new(
            xs.iter().copied().zip(altitudes.iter().copied()),
            &BLACK,
        ))?
        .label(observation.object_name.as_deref().unwrap_or("target"))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK.stroke_width(2)));

    alt_chart
        .draw_series(LineSeries::new(
            vec![(-half_span, target_alt), (half_span, target_alt)],
            ORANGE.stroke_width(2),
        ))?
        .label(format!("ALT {target_alt:.4}"))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], ORANGE.stroke_width(2)));

    alt_chart
        .draw_series(LineSeries::new(
            vec![(0.0, alt_lo), (0.0, alt_hi)],
            GREEN.stroke_width(1),
        ))?
        .label(format!("header: {}", crossing.reference.format("%H:%M:%S%.3f")))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREEN.stroke_width(2)));

    alt_chart
        .draw_series(LineSeries::new(
            vec![(chosen_x, alt_lo), (chosen_x, alt_hi)],
            BLUE.stroke_width(2),
        ))?
        .label(format!("{} crossing", crossing.chosen.direction))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));

    alt_chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    let mut az_chart = ChartBuilder::on(&lower)
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(-half_span..half_span, az_lo..az_hi)?;

    az_chart
        .configure_mesh()
        .x_desc("Seconds from header time")
        .y_desc("AZ (deg)")
        .axis_desc_style(("sans-serif", 18))
        .label_style(("sans-serif", 14))
        .draw()?;

    az_chart.draw_series(LineSeries::new(
        xs.iter().copied().zip(azimuths.iter().copied()),
        &RED,
    ))?;
    az_chart.draw_series(LineSeries::new(
        vec![(chosen_x, az_lo), (chosen_x, az_hi)],
        BLUE.stroke_width(2),
    ))?;

    root.present()?;
    Ok(())
}
