use std::cmp::Ordering;

use crate::individual::Individual;
use crate::policy::Policy;
use crate::report::FinalSolution;

pub trait DominanceOrd {
    /// The type on which the dominance relation is defined.
    type T;

    /// Returns the dominance order.
    fn dominance_ord(&self, a: &Self::T, b: &Self::T) -> Ordering {
        if self.dominates(a, b) {
            Ordering::Less
        } else if self.dominates(b, a) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }

    /// Returns true if `a` dominates `b` ("a < b").
    fn dominates(&self, a: &Self::T, b: &Self::T) -> bool {
        matches!(self.dominance_ord(a, b), Ordering::Less)
    }
}

/// Pareto dominance on the (time, energy) fitness of one policy, both minimised.
#[derive(Clone, Copy, Debug)]
pub struct PolicyObjectives(pub Policy);

fn pareto_dominates(a: (f64, f64), b: (f64, f64)) -> bool {
    (a.0 <= b.0 && a.1 <= b.1) && (a.0 < b.0 || a.1 < b.1)
}

impl DominanceOrd for PolicyObjectives {
    type T = Individual;

    fn dominates(&self, a: &Individual, b: &Individual) -> bool {
        let a = &a.fitness[self.0];
        let b = &b.fitness[self.0];

        pareto_dominates((a.time, a.energy), (b.time, b.energy))
    }
}

/// Pareto dominance between reported solutions, regardless of policy.
#[derive(Clone, Copy, Debug)]
pub struct SolutionObjectives;

impl DominanceOrd for SolutionObjectives {
    type T = FinalSolution;

    fn dominates(&self, a: &FinalSolution, b: &FinalSolution) -> bool {
        pareto_dominates((a.time_fitness, a.energy_fitness), (b.time_fitness, b.energy_fitness))
    }
}
