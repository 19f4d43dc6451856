//! Static priority orderings: for each policy, the fixed sequence in which
//! operations are offered to the scheduler.

use itertools::{Itertools, MinMaxResult};

use crate::instance::Instance;
use crate::policy::{PerPolicy, Policy};

/// A `(job, operation)` pair, both 0-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OperationRef {
    pub job: usize,
    pub operation: usize,
}

pub type Ordering = Vec<OperationRef>;
pub type Orderings = PerPolicy<Ordering>;

/// Per-job sums of the per-operation min, max and average cost.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct JobStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

pub fn job_stats(jobs: &[Vec<usize>], costs: &[Vec<f64>]) -> Vec<JobStats> {
    let per_operation: Vec<JobStats> = costs
        .iter()
        .map(|row| {
            let (min, max) = match row.iter().copied().minmax_by(f64::total_cmp) {
                MinMaxResult::NoElements => (0.0, 0.0),
                MinMaxResult::OneElement(v) => (v, v),
                MinMaxResult::MinMax(min, max) => (min, max),
            };
            let avg = if row.is_empty() {
                0.0
            } else {
                row.iter().sum::<f64>() / row.len() as f64
            };
            JobStats { min, max, avg }
        })
        .collect();

    jobs.iter()
        .map(|ops| {
            ops.iter().fold(JobStats::default(), |acc, &op| JobStats {
                min: acc.min + per_operation[op].min,
                max: acc.max + per_operation[op].max,
                avg: acc.avg + per_operation[op].avg,
            })
        })
        .collect()
}

/// Jobs taken one after another, each job's operations contiguous.
fn sequential(jobs: &[Vec<usize>], job_order: &[usize]) -> Ordering {
    job_order
        .iter()
        .flat_map(|&job| {
            jobs[job]
                .iter()
                .map(move |&operation| OperationRef { job, operation })
        })
        .collect()
}

/// One operation per job per round, skipping jobs that ran out.
fn round_robin(jobs: &[Vec<usize>], job_order: &[usize]) -> Ordering {
    let rounds = jobs.iter().map(Vec::len).max().unwrap_or(0);
    (0..rounds)
        .flat_map(|column| {
            job_order.iter().filter_map(move |&job| {
                jobs[job]
                    .get(column)
                    .map(|&operation| OperationRef { job, operation })
            })
        })
        .collect()
}

fn sorted_jobs(stats: &[JobStats], cmp: impl Fn(&JobStats, &JobStats) -> std::cmp::Ordering) -> Vec<usize> {
    (0..stats.len())
        .sorted_by(|&a, &b| cmp(&stats[a], &stats[b]))
        .collect()
}

pub fn fifo(instance: &Instance) -> Ordering {
    let order: Vec<usize> = (0..instance.num_jobs()).collect();
    sequential(instance.jobs(), &order)
}

/// Longest total processing time first (by summed max time).
pub fn ltp(instance: &Instance) -> Ordering {
    sequential(instance.jobs(), &longest_first(instance))
}

/// Shortest total processing time first (by summed min time).
pub fn stp(instance: &Instance) -> Ordering {
    let stats = job_stats(instance.jobs(), instance.time_matrix());
    let order = sorted_jobs(&stats, |a, b| a.min.total_cmp(&b.min));
    sequential(instance.jobs(), &order)
}

pub fn rr_fifo(instance: &Instance) -> Ordering {
    let order: Vec<usize> = (0..instance.num_jobs()).collect();
    round_robin(instance.jobs(), &order)
}

pub fn rr_ltp(instance: &Instance) -> Ordering {
    round_robin(instance.jobs(), &longest_first(instance))
}

/// Round robin over jobs in ascending summed average energy.
pub fn rr_eca(instance: &Instance) -> Ordering {
    let stats = job_stats(instance.jobs(), instance.energy_matrix());
    let order = sorted_jobs(&stats, |a, b| a.avg.total_cmp(&b.avg));
    round_robin(instance.jobs(), &order)
}

fn longest_first(instance: &Instance) -> Vec<usize> {
    let stats = job_stats(instance.jobs(), instance.time_matrix());
    sorted_jobs(&stats, |a, b| b.max.total_cmp(&a.max))
}

pub fn ordering_for(policy: Policy, instance: &Instance) -> Ordering {
    match policy {
        Policy::Fifo => fifo(instance),
        Policy::Ltp => ltp(instance),
        Policy::Stp => stp(instance),
        Policy::RrFifo => rr_fifo(instance),
        Policy::RrLtp => rr_ltp(instance),
        Policy::RrEca => rr_eca(instance),
    }
}

pub fn all_orderings(instance: &Instance) -> Orderings {
    PerPolicy::from_fn(|policy| ordering_for(policy, instance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::POLICIES;

    fn op(job: usize, operation: usize) -> OperationRef {
        OperationRef { job, operation }
    }

    // job 0: ops 1,2 ; job 1: op 3 ; job 2: ops 4,5,6
    fn instance() -> Instance {
        let time = vec![
            vec![1.0, 3.0],
            vec![2.0, 2.0],
            vec![9.0, 1.0],
            vec![1.0, 1.0],
            vec![1.0, 2.0],
            vec![1.0, 1.0],
        ];
        let energy = vec![
            vec![5.0, 5.0],
            vec![5.0, 5.0],
            vec![1.0, 1.0],
            vec![2.0, 2.0],
            vec![2.0, 2.0],
            vec![2.0, 2.0],
        ];
        Instance::new(time, energy, vec![vec![1, 2], vec![3], vec![4, 5, 6]]).unwrap()
    }

    #[test]
    fn job_stats_sum_operation_extremes() {
        let inst = instance();
        let stats = job_stats(inst.jobs(), inst.time_matrix());
        assert_eq!(stats[0], JobStats { min: 3.0, max: 5.0, avg: 4.0 });
        assert_eq!(stats[1], JobStats { min: 1.0, max: 9.0, avg: 5.0 });
        assert_eq!(stats[2], JobStats { min: 3.0, max: 4.0, avg: 3.5 });
    }

    #[test]
    fn sequential_orderings() {
        let inst = instance();
        assert_eq!(
            fifo(&inst),
            vec![op(0, 0), op(0, 1), op(1, 2), op(2, 3), op(2, 4), op(2, 5)]
        );
        assert_eq!(
            ltp(&inst),
            vec![op(1, 2), op(0, 0), op(0, 1), op(2, 3), op(2, 4), op(2, 5)]
        );
        // jobs 0 and 2 tie on min time; the sort is stable
        assert_eq!(
            stp(&inst),
            vec![op(1, 2), op(0, 0), op(0, 1), op(2, 3), op(2, 4), op(2, 5)]
        );
    }

    #[test]
    fn round_robin_orderings() {
        let inst = instance();
        assert_eq!(
            rr_fifo(&inst),
            vec![op(0, 0), op(1, 2), op(2, 3), op(0, 1), op(2, 4), op(2, 5)]
        );
        assert_eq!(
            rr_ltp(&inst),
            vec![op(1, 2), op(0, 0), op(2, 3), op(0, 1), op(2, 4), op(2, 5)]
        );
        // energy averages: job0 = 10, job1 = 1, job2 = 6
        assert_eq!(
            rr_eca(&inst),
            vec![op(1, 2), op(2, 3), op(0, 0), op(2, 4), op(0, 1), op(2, 5)]
        );
    }

    #[test]
    fn every_ordering_keeps_job_order_and_covers_all_operations() {
        let inst = instance();
        let orderings = all_orderings(&inst);
        for policy in POLICIES {
            let ordering = &orderings[policy];
            assert_eq!(ordering.len(), inst.num_operations());
            for (job, ops) in inst.jobs().iter().enumerate() {
                let seen: Vec<usize> = ordering
                    .iter()
                    .filter(|r| r.job == job)
                    .map(|r| r.operation)
                    .collect();
                assert_eq!(&seen, ops, "{} breaks job {}", policy, job);
            }
        }
    }
}
