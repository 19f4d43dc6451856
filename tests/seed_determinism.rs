use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;

use genetic_jobshop::config::RunConfig;
use genetic_jobshop::demo_data::{generate, DemoShape};
use genetic_jobshop::instance::Instance;
use genetic_jobshop::nsga2_optimizer::NSGA2Optimizer;
use genetic_jobshop::policy::POLICIES;
use genetic_jobshop::priority_orders::all_orderings;
use genetic_jobshop::reader::{read_instance, write_instance};
use genetic_jobshop::report::{CsvReportSink, MemoryReportSink, ReportSink, SeedOutcome};

fn demo_instance() -> Instance {
    let shape = DemoShape {
        jobs: 5,
        machines: 3,
        max_operations_per_job: 4,
    };
    generate(&shape, &mut StdRng::seed_from_u64(11)).unwrap()
}

fn config() -> RunConfig {
    RunConfig {
        population_size: 6,
        generations: 40,
        seeds: vec![0, 7],
        ..Default::default()
    }
}

fn run_to_dir(instance: &Instance, dir: &Path) -> Vec<SeedOutcome> {
    let optimizer = NSGA2Optimizer::new(instance, all_orderings(instance), config()).unwrap();
    let mut sink = CsvReportSink::create(dir, "demo").unwrap();
    let outcomes = optimizer.run(&mut sink);
    sink.finish().unwrap();
    outcomes
}

#[test]
fn identical_seeds_write_identical_reports() {
    let instance = demo_instance();
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();

    let a = run_to_dir(&instance, first.path());
    let b = run_to_dir(&instance, second.path());
    assert_eq!(a, b);

    let fronts_a = fs::read(first.path().join("demo/all_checkpoint_fronts.csv")).unwrap();
    let fronts_b = fs::read(second.path().join("demo/all_checkpoint_fronts.csv")).unwrap();
    assert_eq!(fronts_a, fronts_b);

    let header = String::from_utf8(fronts_a).unwrap();
    assert!(header.starts_with(
        "Seed,Generation,Policy,Rank,Time_Fitness,Energy_Fitness,Crossover_P,Mutation_P"
    ));

    for outcome in &a {
        for solution in &outcome.solutions {
            let relative = Path::new("demo")
                .join(solution.policy.name())
                .join(format!("seed_{}_solution_{}.txt", solution.seed, solution.index));
            let gantt_a = fs::read(first.path().join(&relative)).unwrap();
            let gantt_b = fs::read(second.path().join(&relative)).unwrap();
            assert_eq!(gantt_a, gantt_b);
        }
    }
}

#[test]
fn checkpoints_follow_the_generation_schedule() {
    let instance = demo_instance();
    let optimizer = NSGA2Optimizer::new(&instance, all_orderings(&instance), config()).unwrap();
    let mut sink = MemoryReportSink::default();

    let outcomes = optimizer.run(&mut sink);

    assert_eq!(outcomes.iter().map(|o| o.seed).collect::<Vec<_>>(), vec![0, 7]);
    for outcome in &outcomes {
        let mut generations: Vec<usize> = outcome.checkpoints.iter().map(|r| r.generation).collect();
        generations.dedup();
        assert_eq!(generations, vec![1, 20, 40]);

        for policy in POLICIES {
            assert!(outcome.checkpoints.iter().any(|r| r.policy == policy));
            assert!(outcome.solutions.iter().any(|s| s.policy == policy));
        }
    }

    let recorded_seeds: Vec<u64> = sink.checkpoints.iter().map(|r| r.seed).collect();
    let first_seven = recorded_seeds.iter().position(|&s| s == 7).unwrap();
    assert!(recorded_seeds[..first_seven].iter().all(|&s| s == 0));
    assert!(recorded_seeds[first_seven..].iter().all(|&s| s == 7));
}

#[test]
fn saved_instance_optimizes_like_the_original() {
    let instance = demo_instance();
    let mut buffer = Vec::new();
    write_instance(&instance, &mut buffer).unwrap();
    let reloaded = read_instance(buffer.as_slice()).unwrap();

    let original = NSGA2Optimizer::new(&instance, all_orderings(&instance), config()).unwrap();
    let copy = NSGA2Optimizer::new(&reloaded, all_orderings(&reloaded), config()).unwrap();

    assert_eq!(original.run_seed(7), copy.run_seed(7));
}
