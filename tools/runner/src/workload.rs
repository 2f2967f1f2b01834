//! Workload sources
//!
//! - built-in demo set
//! - `ARRIVAL:BURST:NICE` from the command line
//! - a text file, one `arrival burst nice` triple per line, `#` comments
//! - a seeded random set (`--random N --seed S`)

use std::fmt;
use std::fs;
use std::path::Path;

use hcfs_scheduler::TaskSpec;

/// Demo workload: staggered arrivals, mixed priorities
pub const DEMO_WORKLOAD: [TaskSpec; 6] = [
    TaskSpec::new(0, 60, 0),
    TaskSpec::new(10, 20, -5),
    TaskSpec::new(15, 80, 5),
    TaskSpec::new(20, 30, 0),
    TaskSpec::new(30, 15, -10),
    TaskSpec::new(35, 50, 0),
];

/// Bounds of a random workload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomShape {
    /// Arrivals are drawn from `0..=max_arrival_ms`
    pub max_arrival_ms: u64,
    /// Bursts are drawn from `1..=max_burst_ms`
    pub max_burst_ms: u64,
    /// Nice values are drawn from `-nice_span..=nice_span`
    pub nice_span: i32,
}

impl Default for RandomShape {
    fn default() -> Self {
        Self {
            max_arrival_ms: 50,
            max_burst_ms: 30,
            nice_span: 10,
        }
    }
}

impl RandomShape {
    /// Shape used by the load analysis: arrivals spread over `2 * tasks` ms
    pub fn for_load(tasks: usize) -> Self {
        Self {
            max_arrival_ms: tasks as u64 * 2,
            max_burst_ms: 20,
            ..Self::default()
        }
    }
}

/// xorshift64* generator, reproducible from its seed
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        // Zero is the one state xorshift never leaves
        Self {
            state: (seed ^ 0x853c_49e6_748f_ea9b).max(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_f491_4f6c_dd1d)
    }

    /// Uniform in `low..=high`
    fn between(&mut self, low: i64, high: i64) -> i64 {
        let span = high.abs_diff(low) + 1;
        low + (self.next_u64() % span) as i64
    }
}

/// `count` tasks drawn from `shape`; the same seed gives the same workload
pub fn random_workload(count: usize, shape: &RandomShape, seed: u64) -> Vec<TaskSpec> {
    let mut rng = XorShift64::new(seed);
    let max_arrival = shape.max_arrival_ms.min(i64::MAX as u64) as i64;
    let max_burst = shape.max_burst_ms.clamp(1, i64::MAX as u64) as i64;
    let span = i64::from(shape.nice_span.abs());

    (0..count)
        .map(|_| {
            TaskSpec::new(
                rng.between(0, max_arrival) as u64,
                rng.between(1, max_burst) as u64,
                rng.between(-span, span) as i32,
            )
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkloadError {
    /// Wrong number of fields
    Shape { line: usize, found: usize },
    /// A field is not an integer
    Number { line: usize, field: &'static str, text: String },
    /// File could not be read
    Io { path: String, reason: String },
}

impl fmt::Display for WorkloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shape { line, found } => write!(
                f,
                "line {}: expected 3 fields (arrival burst nice), found {}",
                line, found
            ),
            Self::Number { line, field, text } => {
                write!(f, "line {}: {} '{}' is not a number", line, field, text)
            }
            Self::Io { path, reason } => write!(f, "cannot read {}: {}", path, reason),
        }
    }
}

impl std::error::Error for WorkloadError {}

fn field<T: std::str::FromStr>(
    line: usize,
    name: &'static str,
    text: &str,
) -> Result<T, WorkloadError> {
    text.trim().parse().map_err(|_| WorkloadError::Number {
        line,
        field: name,
        text: text.trim().to_string(),
    })
}

fn triple(line: usize, parts: &[&str]) -> Result<TaskSpec, WorkloadError> {
    let [arrival, burst, nice] = parts else {
        return Err(WorkloadError::Shape {
            line,
            found: parts.len(),
        });
    };
    Ok(TaskSpec::new(
        field(line, "arrival", arrival)?,
        field(line, "burst", burst)?,
        field(line, "nice", nice)?,
    ))
}

/// Parse `ARRIVAL:BURST:NICE`
pub fn parse_task(text: &str) -> Result<TaskSpec, WorkloadError> {
    let parts: Vec<&str> = text.split(':').collect();
    triple(1, &parts)
}

/// Parse a workload file body
pub fn parse_workload(text: &str) -> Result<Vec<TaskSpec>, WorkloadError> {
    let mut specs = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        specs.push(triple(index + 1, &parts)?);
    }
    Ok(specs)
}

pub fn load_workload(path: &Path) -> Result<Vec<TaskSpec>, WorkloadError> {
    let text = fs::read_to_string(path).map_err(|err| WorkloadError::Io {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;
    parse_workload(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task() {
        assert_eq!(parse_task("30:15:-10"), Ok(TaskSpec::new(30, 15, -10)));
        assert_eq!(
            parse_task("30:15"),
            Err(WorkloadError::Shape { line: 1, found: 2 })
        );
        assert!(matches!(
            parse_task("a:15:0"),
            Err(WorkloadError::Number { field: "arrival", .. })
        ));
        // Negative arrival is rejected by the unsigned parse
        assert!(parse_task("-1:15:0").is_err());
    }

    #[test]
    fn test_parse_workload() {
        let text = "\
# arrival burst nice
0   60  0
10  20 -5   # interactive

15  80  5
";
        assert_eq!(
            parse_workload(text),
            Ok(vec![
                TaskSpec::new(0, 60, 0),
                TaskSpec::new(10, 20, -5),
                TaskSpec::new(15, 80, 5),
            ])
        );
    }

    #[test]
    fn test_parse_workload_reports_line() {
        let text = "0 60 0\n\n10 20\n";
        assert_eq!(
            parse_workload(text),
            Err(WorkloadError::Shape { line: 3, found: 2 })
        );
    }

    #[test]
    fn test_demo_workload_fits_default_capacity() {
        assert!(DEMO_WORKLOAD.len() <= 10);
        assert!(DEMO_WORKLOAD.iter().all(|t| t.burst_ms > 0));
    }

    #[test]
    fn test_random_workload_is_reproducible() {
        let shape = RandomShape::default();
        let first = random_workload(8, &shape, 42);
        assert_eq!(first.len(), 8);
        assert_eq!(first, random_workload(8, &shape, 42));
        assert_ne!(first, random_workload(8, &shape, 43));
    }

    #[test]
    fn test_random_workload_respects_shape() {
        let shape = RandomShape::for_load(20);
        for spec in random_workload(200, &shape, 7) {
            assert!(spec.arrival_ms <= 40);
            assert!((1..=20).contains(&spec.burst_ms));
            assert!((-10..=10).contains(&spec.nice));
        }
    }

    #[test]
    fn test_random_workload_degenerate_shape() {
        let shape = RandomShape {
            max_arrival_ms: 0,
            max_burst_ms: 0,
            nice_span: 0,
        };
        assert_eq!(random_workload(3, &shape, 1), vec![TaskSpec::new(0, 1, 0); 3]);
    }
}
