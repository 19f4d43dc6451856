use std::cmp::Ordering;

use crate::dominance_ord::{DominanceOrd, PolicyObjectives};
use crate::individual::Individual;
use crate::policy::Policy;

type SolutionIdx = usize;

/// Distance given to the boundary solutions of a front. Larger than any
/// accumulated finite distance.
pub const CROWDING_SENTINEL: f64 = 1e9;

#[derive(Debug, Clone)]
pub struct Front {
    dominated_solutions: Vec<Vec<SolutionIdx>>,
    domination_count: Vec<usize>,
    current_front: Vec<SolutionIdx>,
    rank: usize,
}

impl Front {
    pub fn next_front(self) -> Self {
        let Front {
            dominated_solutions,
            mut domination_count,
            current_front,
            rank,
        } = self;

        let mut next_front = Vec::new();

        for &p_i in current_front.iter() {
            for &q_i in dominated_solutions[p_i].iter() {
                debug_assert!(domination_count[q_i] > 0);
                domination_count[q_i] -= 1;
                if domination_count[q_i] == 0 {
                    // only members of earlier fronts dominated q_i
                    next_front.push(q_i);
                }
            }
        }

        Self {
            dominated_solutions,
            domination_count,
            current_front: next_front,
            rank: rank + 1,
        }
    }

    /// 1-based rank of the current front.
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn members(&self) -> &[SolutionIdx] {
        &self.current_front
    }

    pub fn is_empty(&self) -> bool {
        self.current_front.is_empty()
    }
}

/// Perform a non-dominated sort of `solutions`. Returns the first
/// Pareto front.
pub fn non_dominated_sort<S, D>(solutions: &[S], domination: &D) -> Front
where
    D: DominanceOrd<T = S>,
{
    let mut dominated_solutions: Vec<Vec<SolutionIdx>> =
        solutions.iter().map(|_| Vec::new()).collect();

    let mut domination_count: Vec<usize> = vec![0; solutions.len()];
    let mut current_front: Vec<SolutionIdx> = Vec::new();

    let mut iter = solutions.iter().enumerate();
    while let Some((p_i, p)) = iter.next() {
        let mut pair_iter = iter.clone();
        while let Some((q_i, q)) = pair_iter.next() {
            match domination.dominance_ord(p, q) {
                Ordering::Less => {
                    // p dominates q
                    dominated_solutions[p_i].push(q_i);
                    domination_count[q_i] += 1;
                }
                Ordering::Greater => {
                    // q dominates p
                    dominated_solutions[q_i].push(p_i);
                    domination_count[p_i] += 1;
                }
                Ordering::Equal => {}
            }
        }
        // every pair involving p_i has been compared by now
        if domination_count[p_i] == 0 {
            current_front.push(p_i);
        }
    }

    Front {
        dominated_solutions,
        domination_count,
        current_front,
        rank: 1,
    }
}

/// Sorts `population` into dominance fronts under `policy` and writes each
/// individual's rank for that policy. Fronts are returned best first and are
/// never empty.
pub fn rank_population(population: &mut [Individual], policy: Policy) -> Vec<Vec<SolutionIdx>> {
    let mut fronts = Vec::new();
    let mut front = non_dominated_sort(population, &PolicyObjectives(policy));

    while !front.is_empty() {
        for &idx in front.members() {
            population[idx].fitness[policy].rank = front.rank();
        }
        fronts.push(front.members().to_vec());
        front = front.next_front();
    }

    fronts
}

struct Crowding {
    idx: SolutionIdx,
    time: f64,
    energy: f64,
    distance: f64,
}

/// Crowding distance of one front under `policy`, written back onto the
/// population. Must be called per front.
pub fn assign_crowding_distance(population: &mut [Individual], front: &[SolutionIdx], policy: Policy) {
    if front.is_empty() {
        return;
    }

    let mut a: Vec<Crowding> = front
        .iter()
        .map(|&idx| {
            let fitness = &population[idx].fitness[policy];
            Crowding {
                idx,
                time: fitness.time,
                energy: fitness.energy,
                distance: 0.0,
            }
        })
        .collect();

    let objectives: [fn(&Crowding) -> f64; 2] = [|c| c.time, |c| c.energy];

    for objective in objectives {
        // ascending by this objective
        a.sort_by(|x, y| objective(x).total_cmp(&objective(y)));

        // boundary members get the sentinel
        let last = a.len() - 1;
        a[0].distance = CROWDING_SENTINEL;
        a[last].distance = CROWDING_SENTINEL;

        let spread = objective(&a[last]) - objective(&a[0]);
        if spread > 0.0 {
            for i in 1..last {
                a[i].distance += (objective(&a[i + 1]) - objective(&a[i - 1])) / spread;
            }
        }
    }

    for c in a {
        population[c.idx].fitness[policy].crowding_distance = c.distance;
    }
}

/// Ranks the population under `policy` and assigns the
/// crowding distance front by front.
pub fn rank_and_crowd(population: &mut [Individual], policy: Policy) -> Vec<Vec<SolutionIdx>> {
    let fronts = rank_population(population, policy);
    for front in fronts.iter() {
        assign_crowding_distance(population, front, policy);
    }
    fronts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::individual::PolicyFitness;
    use crate::policy::POLICIES;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn population(points: &[(f64, f64)], policy: Policy) -> Vec<Individual> {
        points
            .iter()
            .map(|&(time, energy)| {
                let mut individual = Individual::default();
                individual.fitness[policy] = PolicyFitness {
                    time,
                    energy,
                    ..Default::default()
                };
                individual
            })
            .collect()
    }

    #[test]
    fn peels_fronts_in_order() {
        let policy = Policy::Fifo;
        let mut pop = population(&[(1.0, 5.0), (2.0, 2.0), (3.0, 4.0), (5.0, 1.0), (4.0, 5.0)], policy);

        let fronts = rank_population(&mut pop, policy);

        assert_eq!(fronts, vec![vec![0, 1, 3], vec![2], vec![4]]);
        let ranks: Vec<usize> = pop.iter().map(|i| i.fitness[policy].rank).collect();
        assert_eq!(ranks, vec![1, 1, 2, 1, 3]);
    }

    #[test]
    fn equal_points_share_a_front() {
        let policy = Policy::RrLtp;
        let mut pop = population(&[(2.0, 2.0), (2.0, 2.0)], policy);
        assert_eq!(rank_population(&mut pop, policy), vec![vec![0, 1]]);
    }

    #[test]
    fn empty_population_has_no_fronts() {
        let mut pop: Vec<Individual> = Vec::new();
        assert!(rank_population(&mut pop, Policy::Stp).is_empty());
    }

    #[test]
    fn fronts_partition_and_respect_dominance() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut pop: Vec<Individual> = (0..60).map(|_| Individual::default()).collect();
        for individual in pop.iter_mut() {
            for policy in POLICIES {
                individual.fitness[policy].time = rng.gen_range(0..20) as f64;
                individual.fitness[policy].energy = rng.gen_range(0..20) as f64;
            }
        }

        for policy in POLICIES {
            let fronts = rank_population(&mut pop, policy);

            let mut seen: Vec<usize> = fronts.iter().flatten().copied().collect();
            seen.sort_unstable();
            assert_eq!(seen, (0..pop.len()).collect::<Vec<_>>());

            let objectives = PolicyObjectives(policy);
            for a in pop.iter() {
                for b in pop.iter() {
                    if objectives.dominates(a, b) {
                        assert!(a.fitness[policy].rank < b.fitness[policy].rank);
                    }
                }
            }
        }
    }

    #[test]
    fn crowding_boundaries_get_the_sentinel() {
        let policy = Policy::Ltp;
        let mut pop = population(&[(1.0, 9.0), (4.0, 3.0), (2.0, 6.0), (9.0, 1.0)], policy);

        assign_crowding_distance(&mut pop, &[0, 1, 2, 3], policy);

        assert_eq!(pop[0].fitness[policy].crowding_distance, CROWDING_SENTINEL);
        assert_eq!(pop[3].fitness[policy].crowding_distance, CROWDING_SENTINEL);
        // (2,6): time neighbours 1 and 4 over 8, energy neighbours 3 and 9 over 8
        assert_eq!(pop[2].fitness[policy].crowding_distance, 3.0 / 8.0 + 6.0 / 8.0);
        // (4,3): time neighbours 2 and 9 over 8, energy neighbours 1 and 6 over 8
        assert_eq!(pop[1].fitness[policy].crowding_distance, 7.0 / 8.0 + 5.0 / 8.0);
    }

    #[test]
    fn zero_range_contributes_nothing() {
        let policy = Policy::RrFifo;
        let mut pop = population(&[(5.0, 1.0), (5.0, 2.0), (5.0, 3.0)], policy);

        assign_crowding_distance(&mut pop, &[0, 1, 2], policy);

        let middle = pop[1].fitness[policy].crowding_distance;
        assert!(middle.is_finite());
        assert_eq!(middle, 1.0);
    }

    #[test]
    fn small_fronts_do_not_panic() {
        let policy = Policy::RrEca;
        let mut pop = population(&[(3.0, 3.0)], policy);
        assign_crowding_distance(&mut pop, &[], policy);
        assert_eq!(pop[0].fitness[policy].crowding_distance, 0.0);

        assign_crowding_distance(&mut pop, &[0], policy);
        assert_eq!(pop[0].fitness[policy].crowding_distance, CROWDING_SENTINEL);
    }

    #[test]
    fn crowding_stays_within_each_front() {
        let policy = Policy::Fifo;
        let mut pop = population(&[(1.0, 4.0), (4.0, 1.0), (2.0, 5.0), (3.0, 3.0), (5.0, 2.0)], policy);

        let fronts = rank_and_crowd(&mut pop, policy);

        assert_eq!(fronts, vec![vec![0, 1, 3], vec![2, 4]]);
        assert_eq!(pop[2].fitness[policy].crowding_distance, CROWDING_SENTINEL);
        assert_eq!(pop[4].fitness[policy].crowding_distance, CROWDING_SENTINEL);
        assert_eq!(pop[3].fitness[policy].crowding_distance, 3.0 / 3.0 + 3.0 / 3.0);
    }
}
