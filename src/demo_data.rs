use rand::prelude::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::instance::{Instance, InstanceError};

/// Shape of a randomly generated instance.
#[derive(Clone, Copy, Debug)]
pub struct DemoShape {
    pub jobs: usize,
    pub machines: usize,
    pub max_operations_per_job: usize,
}

/// Number of operations of every job, each in `1..=max_operations_per_job`.
pub fn job_lengths<R: Rng>(shape: &DemoShape, rng: &mut R) -> Vec<usize> {
    (0..shape.jobs)
        .map(|_| rng.gen_range(1..=shape.max_operations_per_job.max(1)))
        .collect()
}

pub fn execution_times<R: Rng>(operations: usize, machines: usize, rng: &mut R) -> Vec<Vec<f64>> {
    (0..operations)
        .map(|_| {
            (0..machines)
                .map(|_| rng.gen_range(5..=20) as f64)
                .collect::<Vec<f64>>()
        })
        .collect()
}

/// Each machine draws its energy around its own mean, so some machines are
/// consistently cheaper than others.
pub fn energies<R: Rng>(operations: usize, machines: usize, rng: &mut R) -> Vec<Vec<f64>> {
    let mut distribution: Vec<Normal<f64>> = Vec::with_capacity(machines);

    for _ in 0..machines {
        let mean = rng.gen_range(5.0..=15.0);
        let std_dev = 2.0;

        // mean and std_dev are finite, construction cannot fail
        if let Ok(normal) = Normal::new(mean, std_dev) {
            distribution.push(normal);
        }
    }

    (0..operations)
        .map(|_| {
            distribution
                .iter()
                .map(|d| (d.sample(rng) * 10.0).round().max(10.0) / 10.0)
                .collect()
        })
        .collect()
}

/// Operation ids 1..=n shuffled and dealt out to the jobs.
pub fn jobs<R: Rng>(lengths: &[usize], rng: &mut R) -> Vec<Vec<usize>> {
    let total: usize = lengths.iter().sum();
    let mut ids: Vec<usize> = (1..=total).collect();
    ids.shuffle(rng);

    let mut remaining = ids.as_slice();
    lengths
        .iter()
        .map(|&len| {
            let (job, rest) = remaining.split_at(len);
            remaining = rest;
            job.to_vec()
        })
        .collect()
}

pub fn generate<R: Rng>(shape: &DemoShape, rng: &mut R) -> Result<Instance, InstanceError> {
    let lengths = job_lengths(shape, rng);
    let operations: usize = lengths.iter().sum();

    let time = execution_times(operations, shape.machines, rng);
    let energy = energies(operations, shape.machines, rng);
    let jobs = jobs(&lengths, rng);

    Instance::new(time, energy, jobs)
}
