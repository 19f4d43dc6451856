use colored::Colorize;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::config::{ConfigError, RunConfig};
use crate::fitness::{objectives, schedule};
use crate::individual::Individual;
use crate::instance::Instance;
use crate::non_dominated_sort::{assign_crowding_distance, rank_and_crowd, rank_population};
use crate::policy::{Policy, POLICIES};
use crate::priority_orders::Orderings;
use crate::report::{CheckpointRow, FinalSolution, ReportSink, SeedOutcome};
use crate::variation::{crossover, maybe_mutate};

/// Generations without a better makespan after which the search widens.
pub const STAGNATION_LIMIT: usize = 5;

/// Crossover and mutation probabilities, in percent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdaptiveParams {
    pub crossover_probability: u32,
    pub mutation_probability: u32,
}

impl AdaptiveParams {
    pub const BALANCED: Self = Self {
        crossover_probability: 80,
        mutation_probability: 10,
    };
    pub const EXPLORATION: Self = Self {
        crossover_probability: 60,
        mutation_probability: 20,
    };
    pub const EXPLOITATION: Self = Self {
        crossover_probability: 90,
        mutation_probability: 1,
    };

    pub fn for_stagnation(generations_without_improvement: usize) -> Self {
        if generations_without_improvement > STAGNATION_LIMIT {
            Self::EXPLORATION
        } else if generations_without_improvement == 0 {
            Self::EXPLOITATION
        } else {
            Self::BALANCED
        }
    }
}

/// Whether `a` beats `b` under `policy`: lower rank, then larger crowding distance.
pub fn crowded_comparison(a: &Individual, b: &Individual, policy: Policy) -> bool {
    let (a, b) = (&a.fitness[policy], &b.fitness[policy]);
    if a.rank != b.rank {
        return a.rank < b.rank;
    }
    a.crowding_distance > b.crowding_distance
}

/// Draws two distinct individuals and builds a hybrid that takes, for every
/// policy, the genes and fitness of whichever of the two wins under that
/// policy. Ties go to the second draw.
pub fn tournament_selection<R: Rng + ?Sized>(population: &[Individual], rng: &mut R) -> Individual {
    assert!(population.len() >= 2, "tournament needs at least two individuals");

    let idx1 = rng.gen_range(0..population.len());
    let mut idx2 = rng.gen_range(0..population.len());
    while idx1 == idx2 {
        idx2 = rng.gen_range(0..population.len());
    }

    let (parent_1, parent_2) = (&population[idx1], &population[idx2]);
    let mut survivor = Individual::default();
    for policy in POLICIES {
        let winner = if crowded_comparison(parent_1, parent_2, policy) {
            parent_1
        } else {
            parent_2
        };
        survivor.inherit(policy, winner);
    }

    survivor
}

pub struct NSGA2Optimizer<'a> {
    instance: &'a Instance,
    orderings: Orderings,
    config: RunConfig,
}

impl<'a> NSGA2Optimizer<'a> {
    pub fn new(instance: &'a Instance, orderings: Orderings, config: RunConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        for (policy, ordering) in orderings.iter() {
            assert_eq!(
                ordering.len(),
                instance.num_operations(),
                "{} ordering does not cover every operation",
                policy
            );
        }

        Ok(Self {
            instance,
            orderings,
            config,
        })
    }

    /// Writes time and energy fitness for every policy and returns the best
    /// makespan seen in the population.
    pub fn evaluate_population(&self, population: &mut [Individual]) -> f64 {
        population.par_iter_mut().for_each(|individual| {
            for policy in POLICIES {
                let (time, energy) = objectives(self.instance, &individual.chromosome[policy], &self.orderings[policy]);
                let fitness = &mut individual.fitness[policy];
                fitness.time = time;
                fitness.energy = energy;
            }
        });

        population
            .iter()
            .flat_map(|individual| POLICIES.map(|policy| individual.fitness[policy].time))
            .fold(f64::INFINITY, f64::min)
    }

    fn offspring(&self, population: &[Individual], params: AdaptiveParams, rng: &mut StdRng) -> Vec<Individual> {
        let target = self.config.population_size;
        let mut offspring = Vec::with_capacity(target);

        while offspring.len() < target {
            let idx1 = rng.gen_range(0..population.len());
            let idx2 = rng.gen_range(0..population.len());

            let (mut child_1, mut child_2) =
                crossover(&population[idx1], &population[idx2], params.crossover_probability, rng);
            maybe_mutate(&mut child_1, params.mutation_probability, rng);
            maybe_mutate(&mut child_2, params.mutation_probability, rng);

            offspring.push(child_1);
            if offspring.len() < target {
                offspring.push(child_2);
            }
        }

        offspring
    }

    fn checkpoint(
        &self,
        population: &mut [Individual],
        seed: u64,
        generation: usize,
        params: AdaptiveParams,
    ) -> Vec<CheckpointRow> {
        let mut rows = Vec::new();
        for policy in POLICIES {
            let fronts = rank_population(population, policy);
            let Some(first) = fronts.first() else {
                continue;
            };

            rows.extend(first.iter().map(|&idx| CheckpointRow {
                seed,
                generation: generation + 1,
                policy,
                rank: 1,
                time_fitness: population[idx].fitness[policy].time,
                energy_fitness: population[idx].fitness[policy].energy,
                crossover_probability: params.crossover_probability,
                mutation_probability: params.mutation_probability,
            }));
        }
        rows
    }

    /// First front of every policy, sorted by time, with its gantt chart.
    fn final_solutions(&self, population: &mut [Individual], seed: u64) -> Vec<FinalSolution> {
        let mut solutions = Vec::new();
        for policy in POLICIES {
            let fronts = rank_population(population, policy);
            let Some(first) = fronts.first() else {
                continue;
            };

            let mut front: Vec<Individual> = first.iter().map(|&idx| population[idx].clone()).collect();
            let members: Vec<usize> = (0..front.len()).collect();
            assign_crowding_distance(&mut front, &members, policy);
            front.sort_by(|a, b| a.fitness[policy].time.total_cmp(&b.fitness[policy].time));

            for (i, individual) in front.iter().enumerate() {
                let (_, gantt) = schedule(self.instance, &individual.chromosome[policy], &self.orderings[policy]);
                solutions.push(FinalSolution {
                    policy,
                    seed,
                    index: i + 1,
                    time_fitness: individual.fitness[policy].time,
                    energy_fitness: individual.fitness[policy].energy,
                    gantt,
                });
            }
        }
        solutions
    }

    /// One complete, independent run. Identical seeds give identical outcomes.
    pub fn run_seed(&self, seed: u64) -> SeedOutcome {
        let mut rng = StdRng::seed_from_u64(seed);
        let size = self.config.population_size;

        let mut population: Vec<Individual> = (0..size)
            .map(|_| Individual::random(self.instance, &mut rng))
            .collect();

        let mut best_makespan = self.evaluate_population(&mut population);
        let mut generations_without_improvement = 0;
        let mut checkpoints = Vec::new();

        for generation in 0..self.config.generations {
            let params = AdaptiveParams::for_stagnation(generations_without_improvement);

            for policy in POLICIES {
                rank_and_crowd(&mut population, policy);
            }

            let mut offspring = self.offspring(&population, params, &mut rng);
            let generation_best = self.evaluate_population(&mut offspring);
            if generation_best < best_makespan {
                best_makespan = generation_best;
                generations_without_improvement = 0;
            } else {
                generations_without_improvement += 1;
            }

            let mut combined = population;
            combined.extend(offspring);
            for policy in POLICIES {
                rank_and_crowd(&mut combined, policy);
            }

            population = (0..size)
                .map(|_| tournament_selection(&combined, &mut rng))
                .collect();

            debug!(
                "{} - seed {}, best makespan: {}, stagnant for: {}, crossover: {}%, mutation: {}%",
                format!("Generation {:3}", generation + 1).bold().red(),
                seed,
                best_makespan,
                generations_without_improvement,
                params.crossover_probability,
                params.mutation_probability,
            );

            if self.config.is_checkpoint(generation) {
                checkpoints.extend(self.checkpoint(&mut population, seed, generation, params));
            }
        }

        let solutions = self.final_solutions(&mut population, seed);

        SeedOutcome {
            seed,
            checkpoints,
            solutions,
        }
    }

    /// Runs every configured seed and hands each outcome to `sink` in seed
    /// order. Parallel runs finish before anything is written.
    pub fn run(&self, sink: &mut dyn ReportSink) -> Vec<SeedOutcome> {
        if self.config.parallel_seeds {
            info!("Running {} seeds in parallel...", self.config.seeds.len());
            let outcomes: Vec<SeedOutcome> = self
                .config
                .seeds
                .par_iter()
                .map(|&seed| self.run_seed(seed))
                .collect();
            outcomes.iter().for_each(|outcome| sink.record_outcome(outcome));
            return outcomes;
        }

        self.config
            .seeds
            .iter()
            .map(|&seed| {
                info!("Seed: {}...", seed);
                let outcome = self.run_seed(seed);
                sink.record_outcome(&outcome);
                outcome
            })
            .collect()
    }
}
