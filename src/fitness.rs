use crate::instance::Instance;
use crate::priority_orders::OperationRef;

/// One operation placed on a machine's timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GanttEntry {
    pub job: usize,
    pub operation: usize,
    pub start_time: f64,
    pub end_time: f64,
}

/// Operation intervals grouped by machine index.
pub type Gantt = Vec<Vec<GanttEntry>>;

#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub makespan: f64,
    pub energy: f64,
    pub gantt: Gantt,
}

fn check_contract(instance: &Instance, genes: &[usize], ordering: &[OperationRef]) {
    assert_eq!(
        genes.len(),
        ordering.len(),
        "chromosome has {} genes but the ordering lists {} operations",
        genes.len(),
        ordering.len()
    );
    if let Some(&machine) = genes.iter().find(|&&m| m >= instance.num_machines()) {
        panic!(
            "gene assigns machine {} but the instance has {} machines",
            machine,
            instance.num_machines()
        );
    }
}

/// Runs the operations in priority order. Each operation starts as soon as
/// both its job and its machine are free; `place` sees every interval as it
/// is scheduled. Returns the makespan.
fn simulate(
    instance: &Instance,
    genes: &[usize],
    ordering: &[OperationRef],
    mut place: impl FnMut(usize, GanttEntry),
) -> f64 {
    check_contract(instance, genes, ordering);

    let mut job_end_times = vec![0.0_f64; instance.num_jobs()];
    let mut machine_end_times = vec![0.0_f64; instance.num_machines()];

    for (&machine, &OperationRef { job, operation }) in genes.iter().zip(ordering.iter()) {
        let start_time = job_end_times[job].max(machine_end_times[machine]);
        let end_time = start_time + instance.time(operation, machine);

        job_end_times[job] = end_time;
        machine_end_times[machine] = end_time;

        place(
            machine,
            GanttEntry {
                job,
                operation,
                start_time,
                end_time,
            },
        );
    }

    machine_end_times.iter().copied().fold(0.0, f64::max)
}

/// Makespan together with the per-machine intervals.
pub fn schedule(instance: &Instance, genes: &[usize], ordering: &[OperationRef]) -> (f64, Gantt) {
    let mut gantt: Gantt = vec![Vec::new(); instance.num_machines()];
    let makespan = simulate(instance, genes, ordering, |machine, entry| gantt[machine].push(entry));
    (makespan, gantt)
}

pub fn makespan(instance: &Instance, genes: &[usize], ordering: &[OperationRef]) -> f64 {
    simulate(instance, genes, ordering, |_, _| {})
}

/// Sum of the energy of every (operation, machine) assignment. Summed in
/// priority order.
pub fn total_energy(instance: &Instance, genes: &[usize], ordering: &[OperationRef]) -> f64 {
    check_contract(instance, genes, ordering);

    genes
        .iter()
        .zip(ordering.iter())
        .map(|(&machine, r)| instance.energy(r.operation, machine))
        .sum()
}

pub fn evaluate(instance: &Instance, genes: &[usize], ordering: &[OperationRef]) -> Evaluation {
    let (makespan, gantt) = schedule(instance, genes, ordering);
    let energy = total_energy(instance, genes, ordering);

    Evaluation {
        makespan,
        energy,
        gantt,
    }
}

/// (makespan, energy) without building the gantt chart.
pub fn objectives(instance: &Instance, genes: &[usize], ordering: &[OperationRef]) -> (f64, f64) {
    (makespan(instance, genes, ordering), total_energy(instance, genes, ordering))
}
