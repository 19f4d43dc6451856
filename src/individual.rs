use rand::distributions::Uniform;
use rand::Rng;

use crate::instance::Instance;
use crate::policy::{PerPolicy, Policy, POLICIES};

/// Machine index per prioritised operation slot, one sequence per policy.
/// Gene `p` of a policy assigns the operation at position `p` of that
/// policy's ordering.
pub type Chromosome = PerPolicy<Vec<usize>>;

/// Fitness, rank and crowding distance under a single policy.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PolicyFitness {
    pub time: f64,
    pub energy: f64,
    /// Dominance front, 1 being the best.
    pub rank: usize,
    pub crowding_distance: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Individual {
    pub chromosome: Chromosome,
    pub fitness: PerPolicy<PolicyFitness>,
}

impl Individual {
    /// Every gene drawn uniformly from the machines, policy by policy.
    pub fn random<R: Rng + ?Sized>(instance: &Instance, rng: &mut R) -> Self {
        let machines = Uniform::new(0, instance.num_machines());
        let mut chromosome = Chromosome::default();
        for policy in POLICIES {
            chromosome[policy] = (0..instance.num_operations())
                .map(|_| rng.sample(machines))
                .collect();
        }

        Self {
            chromosome,
            fitness: PerPolicy::default(),
        }
    }

    /// An individual carrying only a chromosome; fitness is filled in by evaluation.
    pub fn from_chromosome(chromosome: Chromosome) -> Self {
        Self {
            chromosome,
            fitness: PerPolicy::default(),
        }
    }

    pub fn genes(&self, policy: Policy) -> &[usize] {
        &self.chromosome[policy]
    }

    /// Copies the genes and every fitness field of `policy` from `other`.
    pub fn inherit(&mut self, policy: Policy, other: &Individual) {
        self.chromosome[policy] = other.chromosome[policy].clone();
        self.fitness[policy] = other.fitness[policy];
    }
}
