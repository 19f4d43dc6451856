use std::error::Error;
use std::path::Path;

use log::info;
use plotters::prelude::*;

use crate::fitness::Gantt;
use crate::policy::{Policy, POLICIES};
use crate::report::FinalSolution;

pub fn visualize_schedule(gantt: &Gantt, title: &str, output_path: &Path) -> Result<(), Box<dyn Error>> {
    // Create a drawing area for the chart.
    let root = BitMapBackend::new(output_path, (1600, 900)).into_drawing_area();
    root.fill(&WHITE)?;

    let machines = gantt.len().max(1);
    let max_time = gantt
        .iter()
        .flatten()
        .map(|e| e.end_time)
        .fold(1.0, f64::max);

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..max_time, 0.0..machines as f64)?;

    chart
        .configure_mesh()
        .x_desc("Time")
        .y_desc("Machine")
        .y_labels(machines + 1)
        .y_label_formatter(&|y| format!("M{}", *y as usize + 1))
        .x_labels(10)
        .draw()?;

    let mut labelled = Vec::new();
    for (machine, entries) in gantt.iter().enumerate() {
        for entry in entries {
            let color = Palette99::pick(entry.job).to_rgba();
            let top = machine as f64 + 0.1;
            let bottom = machine as f64 + 0.9;

            let series = chart.draw_series(vec![Rectangle::new(
                [(entry.start_time, top), (entry.end_time, bottom)],
                color.filled(),
            )])?;

            // one legend entry per job
            if !labelled.contains(&entry.job) {
                labelled.push(entry.job);
                series
                    .label(format!("Job {}", entry.job + 1))
                    .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
            }

            chart.draw_series(vec![Text::new(
                format!("J{},O{}", entry.job + 1, entry.operation + 1),
                (entry.start_time, machine as f64 + 0.5),
                ("sans-serif", 12).into_font(),
            )])?;
        }
    }

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .draw()?;

    root.present()?;
    info!("Chart saved to {}", output_path.display());
    Ok(())
}

/// Scatter of every policy's final first front of one seed.
pub fn visualize_fronts(solutions: &[FinalSolution], title: &str, output_path: &Path) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(output_path, (1200, 900)).into_drawing_area();
    root.fill(&WHITE)?;

    let (mut min_t, mut max_t, mut min_e, mut max_e) = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
    for s in solutions {
        min_t = min_t.min(s.time_fitness);
        max_t = max_t.max(s.time_fitness);
        min_e = min_e.min(s.energy_fitness);
        max_e = max_e.max(s.energy_fitness);
    }
    if solutions.is_empty() {
        (min_t, max_t, min_e, max_e) = (0.0, 1.0, 0.0, 1.0);
    }
    let pad_t = ((max_t - min_t) * 0.05).max(1.0);
    let pad_e = ((max_e - min_e) * 0.05).max(1.0);

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((min_t - pad_t)..(max_t + pad_t), (min_e - pad_e)..(max_e + pad_e))?;

    chart
        .configure_mesh()
        .x_desc("Makespan")
        .y_desc("Energy")
        .draw()?;

    for policy in POLICIES {
        let color = policy_color(policy);
        let points: Vec<(f64, f64)> = solutions
            .iter()
            .filter(|s| s.policy == policy)
            .map(|s| (s.time_fitness, s.energy_fitness))
            .collect();
        if points.is_empty() {
            continue;
        }

        chart
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(1)))?;
        chart
            .draw_series(points.into_iter().map(|p| Circle::new(p, 5, color.filled())))?
            .label(policy.name())
            .legend(move |(x, y)| Circle::new((x + 5, y), 5, color.filled()));
    }

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .draw()?;

    root.present()?;
    info!("Chart saved to {}", output_path.display());
    Ok(())
}

fn policy_color(policy: Policy) -> RGBAColor {
    Palette99::pick(policy.index()).to_rgba()
}
