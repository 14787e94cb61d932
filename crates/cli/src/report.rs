//! Plain-text rendering of a run for the terminal.

use heatmpc_control::ActionSource;
use heatmpc_core::Scalar;
use heatmpc_io::RunReport;
use std::fmt::Write;

const CHART_WIDTH: usize = 41;
const POWER_WIDTH: usize = 12;

pub fn render(report: &RunReport) -> String {
    let mut out = String::new();
    render_summary(&mut out, report);
    out.push('\n');
    render_chart(&mut out, report);
    out
}

fn render_summary(out: &mut String, report: &RunReport) {
    let config = &report.config;
    let summary = &report.summary;
    // Writing into a String cannot fail.
    let _ = writeln!(out, "steps: {} (horizon {})", summary.steps, config.horizon);
    let _ = writeln!(
        out,
        "temperature: {:.2} -> {:.2} (min {:.2}, max {:.2}, band [{}, {}])",
        summary.initial_temp,
        summary.final_temp,
        summary.min_temp,
        summary.max_temp,
        config.min_temp,
        config.max_temp
    );
    let _ = writeln!(
        out,
        "mean |T - {}|: {:.3}",
        config.desired_temp, summary.mean_abs_deviation
    );
    let _ = writeln!(out, "total heater power: {:.3}", summary.total_action);
    let _ = writeln!(
        out,
        "fallback steps: {}, comfort violations: {}",
        summary.fallback_steps, summary.comfort_violations
    );
}

/// Chart bounds covering both the comfort band and every realized temperature.
fn chart_range(report: &RunReport) -> (Scalar, Scalar) {
    let lo = report.summary.min_temp.min(report.config.min_temp).floor() - 1.0;
    let hi = report.summary.max_temp.max(report.config.max_temp).ceil() + 1.0;
    (lo, hi)
}

fn column(value: Scalar, lo: Scalar, hi: Scalar) -> usize {
    let scaled = (value - lo) / (hi - lo) * (CHART_WIDTH - 1) as Scalar;
    (scaled.round().max(0.0) as usize).min(CHART_WIDTH - 1)
}

fn render_chart(out: &mut String, report: &RunReport) {
    let config = &report.config;
    let (lo, hi) = chart_range(report);
    let band = (column(config.min_temp, lo, hi), column(config.max_temp, lo, hi));
    let _ = writeln!(
        out,
        "step  temp   {:<width$}  power",
        format!("{lo:.0} .. {hi:.0}"),
        width = CHART_WIDTH
    );

    let trajectory = &report.trajectory;
    for (k, &temp) in trajectory.temperatures.iter().enumerate() {
        let mut row: Vec<char> = (0..CHART_WIDTH)
            .map(|c| if c == band.0 || c == band.1 { '|' } else { ' ' })
            .collect();
        row[column(temp, lo, hi)] = '*';
        let row: String = row.into_iter().collect();
        let _ = write!(out, "{k:>4} {temp:>6.2}  {row}");

        if let Some(record) = trajectory.records.get(k) {
            let filled = if config.max_action > 0.0 {
                ((record.action / config.max_action) * POWER_WIDTH as Scalar)
                    .round()
                    .clamp(0.0, POWER_WIDTH as Scalar) as usize
            } else {
                0
            };
            let _ = write!(
                out,
                "  {:>5.2} {:<width$}",
                record.action,
                "#".repeat(filled),
                width = POWER_WIDTH
            );
            if record.source == ActionSource::Fallback {
                let _ = write!(out, " fallback ({})", record.status);
            }
        }
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heatmpc_control::{StepRecord, Trajectory};
    use heatmpc_core::{HeatingConfig, Status};

    fn report() -> RunReport {
        let config = HeatingConfig {
            steps: Some(2),
            max_action: 3.0,
            ..HeatingConfig::default()
        };
        let mut trajectory = Trajectory::new(16.0);
        trajectory.push(StepRecord {
            step: 0,
            temperature: 16.0,
            action: 3.0,
            next_temperature: 16.53,
            source: ActionSource::Optimal,
            status: Status::Optimal,
            predicted_next: Some(16.53),
            objective: Some(30.0),
        });
        trajectory.push(StepRecord {
            step: 1,
            temperature: 16.53,
            action: 0.0,
            next_temperature: 15.7229,
            source: ActionSource::Fallback,
            status: Status::PrimalInfeasible,
            predicted_next: None,
            objective: None,
        });
        RunReport::new(config, trajectory)
    }

    #[test]
    fn column_maps_range_onto_chart() {
        assert_eq!(column(10.0, 10.0, 30.0), 0);
        assert_eq!(column(30.0, 10.0, 30.0), CHART_WIDTH - 1);
        assert_eq!(column(20.0, 10.0, 30.0), CHART_WIDTH / 2);
        assert_eq!(column(-5.0, 10.0, 30.0), 0);
        assert_eq!(column(99.0, 10.0, 30.0), CHART_WIDTH - 1);
    }

    #[test]
    fn range_covers_band_and_excursions() {
        let (lo, hi) = chart_range(&report());
        assert_eq!(lo, 14.0);
        assert_eq!(hi, 25.0);
    }

    #[test]
    fn chart_has_one_row_per_temperature() {
        let text = render(&report());
        assert!(text.contains("steps: 2 (horizon 48)"));
        assert!(text.contains("fallback steps: 1"));

        let rows: Vec<&str> = text
            .lines()
            .skip_while(|line| !line.starts_with("step  temp"))
            .skip(1)
            .collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].contains(&"#".repeat(POWER_WIDTH)));
        assert!(rows[1].contains("fallback (infeasible)"));
        assert!(!rows[2].contains('#'));
    }
}
