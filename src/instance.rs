use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("{0} matrix is empty")]
    EmptyMatrix(&'static str),
    #[error("time matrix is {time_rows}x{time_cols} but energy matrix is {energy_rows}x{energy_cols}")]
    ShapeMismatch {
        time_rows: usize,
        time_cols: usize,
        energy_rows: usize,
        energy_cols: usize,
    },
    #[error("row {row} of the {matrix} matrix has {found} columns, expected {expected}")]
    RaggedRow {
        matrix: &'static str,
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("there are no jobs to schedule")]
    NoJobs,
    #[error("job {job} references operation {operation}, valid ids are 1..={max}")]
    OperationOutOfRange {
        job: usize,
        operation: usize,
        max: usize,
    },
    #[error("job {job} has no operations")]
    EmptyJob { job: usize },
    #[error("operation {operation} is listed more than once (again in job {job})")]
    DuplicateOperation { job: usize, operation: usize },
    #[error("jobs list {listed} operations but the matrices have {rows} rows")]
    OperationCountMismatch { listed: usize, rows: usize },
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Machines, jobs and the per-(operation, machine) costs. Read-only once built.
#[derive(Clone, Debug)]
pub struct Instance {
    num_machines: usize,
    num_operations: usize,
    time: Vec<Vec<f64>>,
    energy: Vec<Vec<f64>>,
    /// 0-based operation ids of each job, in job order.
    jobs: Vec<Vec<usize>>,
}

impl Instance {
    /// Builds an instance from the loaded matrices. `jobs` lists 1-based
    /// operation ids, as they appear in instance files.
    pub fn new(
        time: Vec<Vec<f64>>,
        energy: Vec<Vec<f64>>,
        jobs: Vec<Vec<usize>>,
    ) -> Result<Self, InstanceError> {
        if time.is_empty() || time[0].is_empty() {
            return Err(InstanceError::EmptyMatrix("time"));
        }
        if energy.is_empty() || energy[0].is_empty() {
            return Err(InstanceError::EmptyMatrix("energy"));
        }
        if time.len() != energy.len() || time[0].len() != energy[0].len() {
            return Err(InstanceError::ShapeMismatch {
                time_rows: time.len(),
                time_cols: time[0].len(),
                energy_rows: energy.len(),
                energy_cols: energy[0].len(),
            });
        }

        let num_machines = time[0].len();
        for (matrix, rows) in [("time", &time), ("energy", &energy)] {
            if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != num_machines) {
                return Err(InstanceError::RaggedRow {
                    matrix,
                    row,
                    found: r.len(),
                    expected: num_machines,
                });
            }
        }

        if jobs.is_empty() {
            return Err(InstanceError::NoJobs);
        }

        // job ids must be a permutation of 1..=rows
        let max = time.len();
        let mut seen = vec![false; max];
        let mut zero_based = Vec::with_capacity(jobs.len());
        for (job, ops) in jobs.into_iter().enumerate() {
            if ops.is_empty() {
                return Err(InstanceError::EmptyJob { job });
            }
            let mut converted = Vec::with_capacity(ops.len());
            for operation in ops {
                if operation == 0 || operation > max {
                    return Err(InstanceError::OperationOutOfRange { job, operation, max });
                }
                if std::mem::replace(&mut seen[operation - 1], true) {
                    return Err(InstanceError::DuplicateOperation { job, operation });
                }
                converted.push(operation - 1);
            }
            zero_based.push(converted);
        }

        let num_operations: usize = zero_based.iter().map(Vec::len).sum();
        if num_operations != max {
            return Err(InstanceError::OperationCountMismatch {
                listed: num_operations,
                rows: max,
            });
        }

        Ok(Self {
            num_machines,
            num_operations,
            time,
            energy,
            jobs: zero_based,
        })
    }

    pub fn num_machines(&self) -> usize {
        self.num_machines
    }

    pub fn num_jobs(&self) -> usize {
        self.jobs.len()
    }

    /// Total number of operations across all jobs (the chromosome length).
    pub fn num_operations(&self) -> usize {
        self.num_operations
    }

    pub fn time(&self, operation: usize, machine: usize) -> f64 {
        self.time[operation][machine]
    }

    pub fn energy(&self, operation: usize, machine: usize) -> f64 {
        self.energy[operation][machine]
    }

    pub fn time_matrix(&self) -> &[Vec<f64>] {
        &self.time
    }

    pub fn energy_matrix(&self) -> &[Vec<f64>] {
        &self.energy
    }

    pub fn jobs(&self) -> &[Vec<usize>] {
        &self.jobs
    }
}
