//! Reading and writing the line-oriented instance format:
//!
//! ```text
//! <operations> <machines>
//! <time row>        x operations
//! <operations> <machines>
//! <energy row>      x operations
//! <jobs>
//! <1-based operation ids of job>   x jobs
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use crate::instance::{Instance, InstanceError};

struct Lines<R: BufRead> {
    inner: std::io::Lines<R>,
    line: usize,
}

impl<R: BufRead> Lines<R> {
    fn new(reader: R) -> Self {
        Self {
            inner: reader.lines(),
            line: 0,
        }
    }

    /// Next non-blank line.
    fn next_line(&mut self, what: &str) -> Result<String, InstanceError> {
        loop {
            self.line += 1;
            match self.inner.next() {
                Some(line) => {
                    let line = line?;
                    if !line.trim().is_empty() {
                        return Ok(line);
                    }
                }
                None => return Err(self.error(format!("unexpected end of file, expected {}", what))),
            }
        }
    }

    fn error(&self, message: String) -> InstanceError {
        InstanceError::Parse {
            line: self.line,
            message,
        }
    }

    fn values<T: FromStr>(&mut self, what: &str) -> Result<Vec<T>, InstanceError> {
        let line = self.next_line(what)?;
        line.split_whitespace()
            .map(|token| {
                token
                    .parse::<T>()
                    .map_err(|_| self.error(format!("invalid {} value '{}'", what, token)))
            })
            .collect()
    }

    fn matrix(&mut self, what: &str) -> Result<Vec<Vec<f64>>, InstanceError> {
        let dims: Vec<usize> = self.values(&format!("{} dimensions", what))?;
        let (rows, cols) = match dims.as_slice() {
            [rows, cols] => (*rows, *cols),
            _ => {
                return Err(self.error(format!(
                    "expected '<operations> <machines>' for the {} matrix",
                    what
                )))
            }
        };

        let mut matrix = Vec::with_capacity(rows);
        for _ in 0..rows {
            let row: Vec<f64> = self.values(what)?;
            if row.len() != cols {
                return Err(self.error(format!(
                    "{} row has {} values, expected {}",
                    what,
                    row.len(),
                    cols
                )));
            }
            matrix.push(row);
        }

        Ok(matrix)
    }

    fn jobs(&mut self) -> Result<Vec<Vec<usize>>, InstanceError> {
        let count: Vec<usize> = self.values("job count")?;
        let count = match count.as_slice() {
            [count] => *count,
            _ => return Err(self.error("expected a single job count".to_string())),
        };

        (0..count).map(|_| self.values("operation id")).collect()
    }
}

/// Parses an instance from any buffered reader.
pub fn read_instance<R: BufRead>(reader: R) -> Result<Instance, InstanceError> {
    let mut lines = Lines::new(reader);
    let time = lines.matrix("time")?;
    let energy = lines.matrix("energy")?;
    let jobs = lines.jobs()?;

    Instance::new(time, energy, jobs)
}

pub fn load_instance(path: impl AsRef<Path>) -> Result<Instance, InstanceError> {
    let file = File::open(path)?;
    read_instance(BufReader::new(file))
}

pub fn write_instance<W: Write>(instance: &Instance, writer: W) -> std::io::Result<()> {
    let mut w = BufWriter::new(writer);

    for matrix in [instance.time_matrix(), instance.energy_matrix()] {
        writeln!(w, "{} {}", matrix.len(), instance.num_machines())?;
        for row in matrix {
            let row: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            writeln!(w, "{}", row.join(" "))?;
        }
    }

    writeln!(w, "{}", instance.num_jobs())?;
    for job in instance.jobs() {
        let ids: Vec<String> = job.iter().map(|op| (op + 1).to_string()).collect();
        writeln!(w, "{}", ids.join(" "))?;
    }

    w.flush()
}
