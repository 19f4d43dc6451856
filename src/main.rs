use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use genetic_jobshop::config::RunConfig;
use genetic_jobshop::demo_data::{generate, DemoShape};
use genetic_jobshop::hypervolume::{summarize, write_summary};
use genetic_jobshop::instance::Instance;
use genetic_jobshop::logging::init_logging;
use genetic_jobshop::nsga2_optimizer::NSGA2Optimizer;
use genetic_jobshop::policy::POLICIES;
use genetic_jobshop::priority_orders::all_orderings;
use genetic_jobshop::reader::{load_instance, write_instance};
use genetic_jobshop::report::{global_fronts, CsvReportSink, MemoryReportSink, ReportSink, SeedOutcome};
use genetic_jobshop::visualization::{visualize_fronts, visualize_schedule};

#[derive(Parser, Debug)]
#[command(name = "genetic_jobshop")]
#[command(version)]
#[command(about = "Multi-objective job-shop scheduling with NSGA-II over six priority policies")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log every generation
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Optimize one or more instance files
    Run {
        #[arg(required = true)]
        instances: Vec<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },
    /// Generate a random instance, save it and optimize it
    Demo {
        #[arg(long, default_value = "10")]
        jobs: usize,
        #[arg(long, default_value = "5")]
        machines: usize,
        #[arg(long, default_value = "4")]
        max_ops: usize,
        /// Seed of the instance generator
        #[arg(long, default_value = "0")]
        seed: u64,

        #[command(flatten)]
        overrides: Overrides,
    },
}

/// Command line values that take precedence over the config file.
#[derive(Args, Debug)]
struct Overrides {
    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[arg(long)]
    population: Option<usize>,
    #[arg(long)]
    generations: Option<usize>,
    /// Comma separated list of seeds
    #[arg(long, value_delimiter = ',')]
    seeds: Option<Vec<u64>>,
    /// Run the seeds of an instance in parallel
    #[arg(long)]
    parallel: bool,
    /// Render PNG charts of the final fronts and schedules
    #[arg(long)]
    charts: bool,
}

impl Overrides {
    fn apply(self, config: &mut RunConfig) {
        if let Some(output) = self.output {
            config.output_dir = output;
        }
        if let Some(population) = self.population {
            config.population_size = population;
        }
        if let Some(generations) = self.generations {
            config.generations = generations;
        }
        if let Some(seeds) = self.seeds {
            config.seeds = seeds;
        }
        config.parallel_seeds |= self.parallel;
        config.render_charts |= self.charts;
    }
}

fn load_config(path: Option<&Path>, overrides: Overrides) -> Result<RunConfig> {
    let mut config = match path {
        Some(path) => RunConfig::load(path).with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RunConfig::default(),
    };
    overrides.apply(&mut config);
    config.validate().context("Invalid run configuration")?;
    Ok(config)
}

fn render_charts(outcomes: &[SeedOutcome], base_path: &Path, name: &str) {
    let global_path = base_path.join("global_fronts.png");
    let title = format!("{} - non-dominated over {} seeds", name, outcomes.len());
    if let Err(e) = visualize_fronts(&global_fronts(outcomes), &title, &global_path) {
        warn!("Failed to render {}: {}", global_path.display(), e);
    }

    for outcome in outcomes {
        let fronts_path = base_path.join(format!("seed_{}_fronts.png", outcome.seed));
        let title = format!("{} - seed {}", name, outcome.seed);
        if let Err(e) = visualize_fronts(&outcome.solutions, &title, &fronts_path) {
            warn!("Failed to render {}: {}", fronts_path.display(), e);
        }

        for solution in &outcome.solutions {
            let path = base_path
                .join(solution.policy.name())
                .join(format!("seed_{}_solution_{}.png", solution.seed, solution.index));
            let title = format!(
                "{} {} - makespan {}, energy {}",
                name, solution.policy, solution.time_fitness, solution.energy_fitness
            );
            if let Err(e) = visualize_schedule(&solution.gantt, &title, &path) {
                warn!("Failed to render {}: {}", path.display(), e);
            }
        }
    }
}

fn print_summary(outcomes: &[SeedOutcome]) {
    for policy in POLICIES {
        let best = outcomes
            .iter()
            .flat_map(|o| o.solutions.iter())
            .filter(|s| s.policy == policy)
            .min_by(|a, b| a.time_fitness.total_cmp(&b.time_fitness));

        if let Some(best) = best {
            println!(
                "  {:8} best makespan: {:>10.2} (energy {:>10.2}, seed {})",
                policy.name().bold(),
                best.time_fitness,
                best.energy_fitness,
                best.seed
            );
        }
    }
}

fn optimize_instance(name: &str, instance: &Instance, config: &RunConfig) -> Result<()> {
    println!(
        "{}",
        format!(
            "Instance {}: {} jobs, {} operations, {} machines",
            name,
            instance.num_jobs(),
            instance.num_operations(),
            instance.num_machines()
        )
        .bold()
        .green()
    );

    let optimizer = NSGA2Optimizer::new(instance, all_orderings(instance), config.clone())?;
    let base_path = config.output_dir.join(name);

    let mut sink: Box<dyn ReportSink> = match CsvReportSink::create(&config.output_dir, name) {
        Ok(sink) => Box::new(sink),
        Err(e) => {
            warn!("Reports for {} will not be written: {}", name, e);
            Box::new(MemoryReportSink::default())
        }
    };

    let start = Instant::now();
    let outcomes = optimizer.run(sink.as_mut());
    let runtime = start.elapsed().as_secs_f64();

    if let Err(e) = sink.finish() {
        warn!("Failed to flush reports for {}: {}", name, e);
    }

    let rows: Vec<_> = outcomes.iter().flat_map(|o| o.checkpoints.iter().cloned()).collect();
    let summary = summarize(&rows, config.hypervolume_reference);
    let summary_path = base_path.join("hypervolume_report.csv");
    match write_summary(&summary_path, &summary) {
        Ok(()) => info!("Hypervolume summary saved to {}", summary_path.display()),
        Err(e) => warn!("Failed to write {}: {}", summary_path.display(), e),
    }

    if config.render_charts {
        render_charts(&outcomes, &base_path, name);
    }

    println!(
        "{}",
        format!("Finished {} seeds of {} in {:.2}s", outcomes.len(), name, runtime)
            .bold()
            .green()
    );
    print_summary(&outcomes);

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run { instances, overrides } => {
            let config = load_config(cli.config.as_deref(), overrides)?;

            for path in &instances {
                let name = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "instance".to_string());

                let instance = match load_instance(path) {
                    Ok(instance) => instance,
                    Err(e) => {
                        error!("Skipping {}: {}", path.display(), e);
                        continue;
                    }
                };

                optimize_instance(&name, &instance, &config)?;
            }
        }
        Commands::Demo {
            jobs,
            machines,
            max_ops,
            seed,
            overrides,
        } => {
            let config = load_config(cli.config.as_deref(), overrides)?;
            let shape = DemoShape {
                jobs,
                machines,
                max_operations_per_job: max_ops,
            };
            let instance = generate(&shape, &mut StdRng::seed_from_u64(seed)).context("Failed to generate instance")?;

            let name = format!("demo_{}x{}_{}", jobs, machines, seed);
            std::fs::create_dir_all(&config.output_dir)
                .with_context(|| format!("Failed to create {}", config.output_dir.display()))?;
            let path = config.output_dir.join(format!("{}.txt", name));
            let file = File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
            write_instance(&instance, file)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Instance saved to {}", path.display());

            optimize_instance(&name, &instance, &config)?;
        }
    }

    Ok(())
}
