use std::{
    io::{self, Write},
    time::{Duration, Instant},
};

struct Split {
    name: String,
    duration: Duration,
}

/// Wall-clock timing of the phases of a run, written to the diagnostics file.
pub struct Stopwatch {
    splits: Vec<Split>,
    name: String,
    start_total: Instant,
    start_split: Instant,
}

impl Stopwatch {
    pub fn new(name: &str) -> Stopwatch {
        let now = Instant::now();
        Stopwatch {
            splits: Vec::default(),
            name: name.to_owned(),
            start_total: now,
            start_split: now,
        }
    }

    pub fn total_elapsed(&self) -> Duration {
        self.start_total.elapsed()
    }

    /// Closes the current split under `name` and starts the next one.
    pub fn record_split(&mut self, name: &str) -> Duration {
        let duration = self.start_split.elapsed();
        self.start_split = Instant::now();
        tracing::debug!("{}: {} took {:?}", self.name, name, duration);
        self.splits.push(Split {
            name: name.to_owned(),
            duration,
        });
        duration
    }

    pub fn display<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(
            writer,
            "Stopwatch: {};  Total elapsed duration: {:?}",
            self.name,
            self.total_elapsed()
        )?;
        for split in self.splits.iter() {
            writeln!(writer, "  {}: {:?}", split.name, split.duration)?;
        }
        Ok(())
    }
}
