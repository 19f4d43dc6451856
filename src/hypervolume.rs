use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::policy::Policy;
use crate::report::{CheckpointRow, ReportError};

/// Area dominated by `points` and bounded by `reference`, both objectives
/// minimised. Points not strictly better than the reference in both
/// objectives add nothing.
pub fn hypervolume_2d(points: &[(f64, f64)], reference: [f64; 2]) -> f64 {
    let mut inside: Vec<(f64, f64)> = points
        .iter()
        .copied()
        .filter(|&(x, y)| x < reference[0] && y < reference[1])
        .collect();
    inside.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let mut volume = 0.0;
    let mut ceiling = reference[1];
    for (x, y) in inside {
        if y < ceiling {
            volume += (reference[0] - x) * (ceiling - y);
            ceiling = y;
        }
    }

    volume
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HypervolumeSummary {
    #[serde(rename = "Generation")]
    pub generation: usize,
    #[serde(rename = "Policy")]
    pub policy: Policy,
    #[serde(rename = "Seeds")]
    pub seeds: usize,
    #[serde(rename = "Min")]
    pub min: f64,
    #[serde(rename = "Max")]
    pub max: f64,
    #[serde(rename = "Mean")]
    pub mean: f64,
    /// Sample standard deviation, 0 for a single seed.
    #[serde(rename = "Std")]
    pub std_dev: f64,
}

/// Hypervolume of every checkpointed front, summarised across seeds per
/// (generation, policy).
pub fn summarize(rows: &[CheckpointRow], reference: [f64; 2]) -> Vec<HypervolumeSummary> {
    let mut fronts: BTreeMap<(usize, Policy, u64), Vec<(f64, f64)>> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.rank == 1) {
        fronts
            .entry((row.generation, row.policy, row.seed))
            .or_default()
            .push((row.time_fitness, row.energy_fitness));
    }

    let mut per_seed: BTreeMap<(usize, Policy), Vec<f64>> = BTreeMap::new();
    for ((generation, policy, _), points) in fronts {
        per_seed
            .entry((generation, policy))
            .or_default()
            .push(hypervolume_2d(&points, reference));
    }

    per_seed
        .into_iter()
        .map(|((generation, policy), volumes)| {
            let n = volumes.len() as f64;
            let mean = volumes.iter().sum::<f64>() / n;
            let std_dev = if volumes.len() > 1 {
                (volumes.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
            } else {
                0.0
            };

            HypervolumeSummary {
                generation,
                policy,
                seeds: volumes.len(),
                min: volumes.iter().copied().fold(f64::INFINITY, f64::min),
                max: volumes.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                mean,
                std_dev,
            }
        })
        .collect()
}

pub fn write_summary(path: impl AsRef<Path>, summary: &[HypervolumeSummary]) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in summary {
        writer.serialize(row)?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
