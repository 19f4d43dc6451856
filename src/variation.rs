use rand::Rng;

use crate::individual::{Chromosome, Individual};
use crate::policy::{POLICIES, POLICY_COUNT};

/// Pair generation in the equitable exchange gives up after this many draws.
pub const MAX_EXCHANGE_ATTEMPTS: usize = 100;

/// Per-gene swap decisions, shared by every policy chromosome.
pub fn crossover_mask<R: Rng + ?Sized>(len: usize, crossover_probability: u32, rng: &mut R) -> Vec<bool> {
    (0..len)
        .map(|_| rng.gen_range(0..100) < crossover_probability)
        .collect()
}

/// Swaps every masked gene between the two chromosomes, in all policies.
pub fn apply_mask(chromosome_1: &mut Chromosome, chromosome_2: &mut Chromosome, mask: &[bool]) {
    for policy in POLICIES {
        let genes_1 = &mut chromosome_1[policy];
        let genes_2 = &mut chromosome_2[policy];
        for (i, &swap) in mask.iter().enumerate() {
            if swap {
                std::mem::swap(&mut genes_1[i], &mut genes_2[i]);
            }
        }
    }
}

/// Uniform crossover with one mask for all six chromosomes. The children
/// start as copies of the parents' chromosomes and carry no fitness.
pub fn crossover<R: Rng + ?Sized>(
    parent_1: &Individual,
    parent_2: &Individual,
    crossover_probability: u32,
    rng: &mut R,
) -> (Individual, Individual) {
    let mut chromosome_1 = parent_1.chromosome.clone();
    let mut chromosome_2 = parent_2.chromosome.clone();

    let len = chromosome_1[POLICIES[0]].len();
    let mask = crossover_mask(len, crossover_probability, rng);
    apply_mask(&mut chromosome_1, &mut chromosome_2, &mask);

    (
        Individual::from_chromosome(chromosome_1),
        Individual::from_chromosome(chromosome_2),
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutation {
    EquitableExchange,
    InterChromosome,
    CircularRelocation,
}

impl Mutation {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        match rng.gen_range(0..3) {
            0 => Mutation::EquitableExchange,
            1 => Mutation::InterChromosome,
            _ => Mutation::CircularRelocation,
        }
    }

    pub fn apply<R: Rng + ?Sized>(self, chromosome: &mut Chromosome, rng: &mut R) {
        match self {
            Mutation::EquitableExchange => equitable_exchange(chromosome, rng),
            Mutation::InterChromosome => inter_chromosome(chromosome, rng),
            Mutation::CircularRelocation => circular_relocation(chromosome, rng),
        }
    }
}

/// With `mutation_probability` percent chance, applies a uniformly chosen mutation.
pub fn maybe_mutate<R: Rng + ?Sized>(individual: &mut Individual, mutation_probability: u32, rng: &mut R) {
    if rng.gen_range(0..=100) < mutation_probability {
        Mutation::random(rng).apply(&mut individual.chromosome, rng);
    }
}

/// Exchanges the whole gene sequences of two distinct policies.
pub fn inter_chromosome<R: Rng + ?Sized>(chromosome: &mut Chromosome, rng: &mut R) {
    let l = rng.gen_range(0..POLICY_COUNT);
    let mut r = rng.gen_range(0..POLICY_COUNT);
    while l == r {
        r = rng.gen_range(0..POLICY_COUNT);
    }

    chromosome.swap(POLICIES[l], POLICIES[r]);
}

/// Distinct position pairs for one equitable exchange over `len >= 2` genes.
/// Draws a target count in `0..=(len - 1) / 2` and stops after
/// `MAX_EXCHANGE_ATTEMPTS` pairs even if the target is larger.
pub fn exchange_pairs<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<(usize, usize)> {
    let last = len - 1;
    let total_pairs = rng.gen_range(0..=last / 2);

    let mut pairs = Vec::with_capacity(total_pairs.min(MAX_EXCHANGE_ATTEMPTS));
    let mut attempts = 0;
    while pairs.len() != total_pairs && attempts < MAX_EXCHANGE_ATTEMPTS {
        let l = rng.gen_range(0..=last);
        let mut r = rng.gen_range(0..=last);
        while l == r {
            r = rng.gen_range(0..=last);
        }
        pairs.push((l, r));
        attempts += 1;
    }

    pairs
}

/// For each policy, swaps genes at a random number of random position pairs.
pub fn equitable_exchange<R: Rng + ?Sized>(chromosome: &mut Chromosome, rng: &mut R) {
    let len = chromosome[POLICIES[0]].len();
    if len < 2 {
        return;
    }

    for policy in POLICIES {
        let pairs = exchange_pairs(len, rng);
        let genes = &mut chromosome[policy];
        for (l, r) in pairs {
            genes.swap(l, r);
        }
    }
}

/// Moves a contiguous segment of a gene sequence to another position.
pub fn relocate_segment<T>(genes: &mut Vec<T>, start: usize, end: usize, insert_at: usize) {
    let segment: Vec<T> = genes.drain(start..=end).collect();
    let tail = genes.split_off(insert_at);
    genes.extend(segment);
    genes.extend(tail);
}

/// For each policy, cuts a random segment and pastes it at a random position
/// of the remaining sequence.
pub fn circular_relocation<R: Rng + ?Sized>(chromosome: &mut Chromosome, rng: &mut R) {
    let len = chromosome[POLICIES[0]].len();
    if len < 2 {
        return;
    }

    for policy in POLICIES {
        let genes = &mut chromosome[policy];

        let l = rng.gen_range(0..len);
        let r = rng.gen_range(0..len);
        let (start, end) = (l.min(r), l.max(r));

        let remaining = len - (end - start + 1);
        let insert_at = rng.gen_range(0..=remaining);

        relocate_segment(genes, start, end, insert_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{PerPolicy, Policy};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn chromosome(len: usize, offset: usize) -> Chromosome {
        PerPolicy::from_fn(|p| (0..len).map(|g| offset + p.index() * 100 + g).collect())
    }

    fn sorted(mut genes: Vec<usize>) -> Vec<usize> {
        genes.sort_unstable();
        genes
    }

    #[test]
    fn mask_swaps_the_same_positions_in_every_policy() {
        let mut a = chromosome(5, 0);
        let mut b = chromosome(5, 1000);
        let mask = [true, false, false, true, false];

        apply_mask(&mut a, &mut b, &mask);

        for policy in POLICIES {
            let base = policy.index() * 100;
            assert_eq!(a[policy], vec![1000 + base, base + 1, base + 2, 1003 + base, base + 4]);
            assert_eq!(b[policy], vec![base, 1001 + base, 1002 + base, base + 3, 1004 + base]);
        }
    }

    #[test]
    fn crossover_extremes() {
        let p1 = Individual::from_chromosome(chromosome(8, 0));
        let p2 = Individual::from_chromosome(chromosome(8, 1000));
        let mut rng = StdRng::seed_from_u64(1);

        let (c1, c2) = crossover(&p1, &p2, 0, &mut rng);
        assert_eq!(c1.chromosome, p1.chromosome);
        assert_eq!(c2.chromosome, p2.chromosome);

        let (c1, c2) = crossover(&p1, &p2, 100, &mut rng);
        assert_eq!(c1.chromosome, p2.chromosome);
        assert_eq!(c2.chromosome, p1.chromosome);
    }

    #[test]
    fn inter_chromosome_swaps_two_whole_sequences() {
        let original = chromosome(4, 0);
        let mut rng = StdRng::seed_from_u64(9);

        for _ in 0..20 {
            let mut mutated = original.clone();
            inter_chromosome(&mut mutated, &mut rng);

            let changed: Vec<Policy> = POLICIES
                .into_iter()
                .filter(|&p| mutated[p] != original[p])
                .collect();
            assert_eq!(changed.len(), 2);
            assert_eq!(mutated[changed[0]], original[changed[1]]);
            assert_eq!(mutated[changed[1]], original[changed[0]]);
        }
    }

    #[test]
    fn equitable_exchange_only_permutes_genes() {
        let original = chromosome(30, 0);
        let mut rng = StdRng::seed_from_u64(5);
        let mut mutated = original.clone();

        for _ in 0..10 {
            equitable_exchange(&mut mutated, &mut rng);
        }

        for policy in POLICIES {
            assert_eq!(sorted(mutated[policy].clone()), original[policy]);
        }
    }

    #[test]
    fn exchange_pairs_stop_at_the_attempt_cap() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut capped = 0;

        for _ in 0..200 {
            let pairs = exchange_pairs(400, &mut rng);
            assert!(pairs.len() <= MAX_EXCHANGE_ATTEMPTS);
            assert!(pairs.iter().all(|&(l, r)| l != r && l < 400 && r < 400));
            if pairs.len() == MAX_EXCHANGE_ATTEMPTS {
                capped += 1;
            }
        }

        // targets go up to 199, so about half of the draws hit the cap
        assert!(capped > 0);
    }

    #[test]
    fn exchange_pairs_of_two_genes() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..20 {
            assert!(exchange_pairs(2, &mut rng).is_empty());
        }
        for _ in 0..20 {
            let pairs = exchange_pairs(3, &mut rng);
            assert!(pairs.len() <= 1);
            assert!(pairs.iter().all(|&(l, r)| l != r));
        }
    }

    #[test]
    fn equitable_exchange_leaves_single_gene_alone() {
        let mut single = chromosome(1, 0);
        equitable_exchange(&mut single, &mut StdRng::seed_from_u64(0));
        assert_eq!(single, chromosome(1, 0));
    }

    #[test]
    fn relocation_moves_a_block() {
        let mut genes = vec![0, 1, 2, 3, 4, 5];
        relocate_segment(&mut genes, 1, 2, 3);
        assert_eq!(genes, vec![0, 3, 4, 1, 2, 5]);

        let mut genes = vec![0, 1, 2, 3, 4, 5];
        relocate_segment(&mut genes, 4, 5, 0);
        assert_eq!(genes, vec![4, 5, 0, 1, 2, 3]);

        let mut genes = vec![0, 1, 2];
        relocate_segment(&mut genes, 0, 2, 0);
        assert_eq!(genes, vec![0, 1, 2]);
    }

    #[test]
    fn circular_relocation_preserves_length_and_genes() {
        let mut rng = StdRng::seed_from_u64(13);
        for len in [2, 3, 7, 40] {
            let original = chromosome(len, 0);
            let mut mutated = original.clone();
            for _ in 0..25 {
                circular_relocation(&mut mutated, &mut rng);
                for policy in POLICIES {
                    assert_eq!(mutated[policy].len(), len);
                }
            }
            for policy in POLICIES {
                assert_eq!(sorted(mutated[policy].clone()), original[policy]);
            }
        }
    }

    #[test]
    fn mutation_probability_zero_never_mutates() {
        let mut individual = Individual::from_chromosome(chromosome(10, 0));
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..50 {
            maybe_mutate(&mut individual, 0, &mut rng);
        }
        assert_eq!(individual.chromosome, chromosome(10, 0));
    }
}
