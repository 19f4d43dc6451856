use std::fs::{self, File};
use std::path::{Path, PathBuf};

use csv::{Writer, WriterBuilder};
use log::{debug, warn};
use serde::Serialize;
use thiserror::Error;

use crate::dominance_ord::SolutionObjectives;
use crate::fitness::Gantt;
use crate::non_dominated_sort::non_dominated_sort;
use crate::policy::{Policy, POLICIES};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

const CHECKPOINT_HEADER: [&str; 8] = [
    "Seed",
    "Generation",
    "Policy",
    "Rank",
    "Time_Fitness",
    "Energy_Fitness",
    "Crossover_P",
    "Mutation_P",
];

const GANTT_HEADER: [&str; 5] = ["Machine_ID", "Job_ID", "Operation_ID", "Start_Time", "End_Time"];

/// A first-front member recorded at a checkpoint generation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CheckpointRow {
    pub seed: u64,
    /// 1-based generation number.
    pub generation: usize,
    pub policy: Policy,
    pub rank: usize,
    pub time_fitness: f64,
    pub energy_fitness: f64,
    pub crossover_probability: u32,
    pub mutation_probability: u32,
}

/// One line of a gantt file; ids are 1-based.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GanttRow {
    pub machine_id: usize,
    pub job_id: usize,
    pub operation_id: usize,
    pub start_time: f64,
    pub end_time: f64,
}

pub fn gantt_rows(gantt: &Gantt) -> Vec<GanttRow> {
    gantt
        .iter()
        .enumerate()
        .flat_map(|(machine, entries)| {
            entries.iter().map(move |e| GanttRow {
                machine_id: machine + 1,
                job_id: e.job + 1,
                operation_id: e.operation + 1,
                start_time: e.start_time,
                end_time: e.end_time,
            })
        })
        .collect()
}

/// A solution of the final first front of one policy.
#[derive(Clone, Debug, PartialEq)]
pub struct FinalSolution {
    pub policy: Policy,
    pub seed: u64,
    /// 1-based position after sorting the front by time.
    pub index: usize,
    pub time_fitness: f64,
    pub energy_fitness: f64,
    pub gantt: Gantt,
}

/// Everything one seeded run reports.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SeedOutcome {
    pub seed: u64,
    pub checkpoints: Vec<CheckpointRow>,
    pub solutions: Vec<FinalSolution>,
}

/// Per policy, the solutions of every seed's final front that no other
/// seed's solution of that policy dominates, sorted by time.
pub fn global_fronts(outcomes: &[SeedOutcome]) -> Vec<FinalSolution> {
    let mut fronts = Vec::new();
    for policy in POLICIES {
        let merged: Vec<FinalSolution> = outcomes
            .iter()
            .flat_map(|o| o.solutions.iter())
            .filter(|s| s.policy == policy)
            .cloned()
            .collect();

        let first = non_dominated_sort(&merged, &SolutionObjectives);
        let mut front: Vec<FinalSolution> = first.members().iter().map(|&i| merged[i].clone()).collect();
        front.sort_by(|a, b| a.time_fitness.total_cmp(&b.time_fitness));
        fronts.extend(front);
    }
    fronts
}

pub trait ReportSink {
    fn record_checkpoint(&mut self, row: &CheckpointRow) -> Result<(), ReportError>;

    fn record_solution(&mut self, solution: &FinalSolution) -> Result<(), ReportError>;

    fn finish(&mut self) -> Result<(), ReportError> {
        Ok(())
    }

    /// Records a whole seed. A failing write is logged and the rest of the
    /// seed's output is skipped.
    fn record_outcome(&mut self, outcome: &SeedOutcome) {
        let result = outcome
            .checkpoints
            .iter()
            .try_for_each(|row| self.record_checkpoint(row))
            .and_then(|_| {
                outcome
                    .solutions
                    .iter()
                    .try_for_each(|solution| self.record_solution(solution))
            });

        if let Err(e) = result {
            warn!("Skipping remaining report output of seed {}: {}", outcome.seed, e);
        }
    }
}

/// Collects everything in memory.
#[derive(Debug, Default)]
pub struct MemoryReportSink {
    pub checkpoints: Vec<CheckpointRow>,
    pub solutions: Vec<FinalSolution>,
}

impl ReportSink for MemoryReportSink {
    fn record_checkpoint(&mut self, row: &CheckpointRow) -> Result<(), ReportError> {
        self.checkpoints.push(row.clone());
        Ok(())
    }

    fn record_solution(&mut self, solution: &FinalSolution) -> Result<(), ReportError> {
        self.solutions.push(solution.clone());
        Ok(())
    }
}

fn create_dir(path: &Path) -> Result<(), ReportError> {
    fs::create_dir_all(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn headerless_writer(path: &Path, header: &[&str]) -> Result<Writer<File>, ReportError> {
    let file = File::create(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
    writer.write_record(header)?;
    Ok(writer)
}

/// Writes `all_checkpoint_fronts.csv` and one gantt file per final solution
/// under `<output_dir>/<instance>/`.
pub struct CsvReportSink {
    base_path: PathBuf,
    checkpoints: Writer<File>,
}

impl CsvReportSink {
    pub fn create(output_dir: impl AsRef<Path>, instance_name: &str) -> Result<Self, ReportError> {
        let base_path = output_dir.as_ref().join(instance_name);
        create_dir(&base_path)?;
        for policy in POLICIES {
            create_dir(&base_path.join(policy.name()))?;
        }

        let checkpoints = headerless_writer(&base_path.join("all_checkpoint_fronts.csv"), &CHECKPOINT_HEADER)?;

        Ok(Self {
            base_path,
            checkpoints,
        })
    }

    pub fn solution_path(&self, policy: Policy, seed: u64, index: usize) -> PathBuf {
        self.base_path
            .join(policy.name())
            .join(format!("seed_{}_solution_{}.txt", seed, index))
    }
}

impl ReportSink for CsvReportSink {
    fn record_checkpoint(&mut self, row: &CheckpointRow) -> Result<(), ReportError> {
        self.checkpoints.serialize(row)?;
        Ok(())
    }

    fn record_solution(&mut self, solution: &FinalSolution) -> Result<(), ReportError> {
        let path = self.solution_path(solution.policy, solution.seed, solution.index);
        if let Some(parent) = path.parent() {
            create_dir(parent)?;
        }

        let mut writer = headerless_writer(&path, &GANTT_HEADER)?;
        for row in gantt_rows(&solution.gantt) {
            writer.serialize(row)?;
        }
        writer.flush().map_err(|source| ReportError::Io { path: path.clone(), source })?;
        debug!("Gantt saved to {}", path.display());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ReportError> {
        self.checkpoints.flush().map_err(|source| ReportError::Io {
            path: self.base_path.join("all_checkpoint_fronts.csv"),
            source,
        })
    }
}
