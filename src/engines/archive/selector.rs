use crate::engines::rendering;
use crate::error::{Result, SymstackError};
use crate::types::Program;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// One retained model with the fitness values the search engine assigned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    pub program: Program,
    pub train_fitness: f64,
    pub validation_fitness: f64,
}

impl ArchiveEntry {
    pub fn new(program: Program, train_fitness: f64, validation_fitness: f64) -> Self {
        Self {
            program,
            train_fitness,
            validation_fitness,
        }
    }
}

/// Best-known models of one evolutionary run, in engine output order
///
/// A pure reducer over externally supplied fitness values; nothing here
/// re-evaluates a program. Built once per run and read-only thereafter.
pub struct Archive {
    entries: Vec<ArchiveEntry>,
}

impl Archive {
    pub fn from_entries(entries: Vec<ArchiveEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Entry with the minimum validation fitness
    ///
    /// Ties go to the earliest entry; a NaN fitness never wins.
    pub fn best(&self) -> Result<&ArchiveEntry> {
        let mut best: Option<&ArchiveEntry> = None;
        for entry in &self.entries {
            let better = match best {
                None => true,
                Some(current) => {
                    entry.validation_fitness < current.validation_fitness
                        || (current.validation_fitness.is_nan()
                            && !entry.validation_fitness.is_nan())
                }
            };
            if better {
                best = Some(entry);
            }
        }
        best.ok_or(SymstackError::EmptyArchive)
    }

    /// Entries in reverse engine order, worst first, for reporting
    pub fn ranked(&self) -> impl Iterator<Item = &ArchiveEntry> {
        self.entries.iter().rev()
    }

    /// Tab-separated report: one rendered model per line
    pub fn report(&self) -> Result<String> {
        if self.entries.is_empty() {
            return Err(SymstackError::EmptyArchive);
        }
        let mut out = String::from("model\tcomplexity\ttrain\ttest\n");
        for (rank, entry) in self.ranked().enumerate() {
            let equation = rendering::render_for_report(&entry.program)?;
            writeln!(
                out,
                "{}\t{}\t{}\t{}",
                equation, rank, entry.train_fitness, entry.validation_fitness
            )
            .map_err(|e| SymstackError::Data(format!("report formatting failed: {}", e)))?;
        }
        Ok(out)
    }
}
