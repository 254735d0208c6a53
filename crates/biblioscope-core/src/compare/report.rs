use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::compare::classify::{Category, Thresholds};
use crate::compare::score::ComparisonResult;

/// How summary lines group the sorted results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryMode {
    /// One line per run of equal categories in sorted order. A category
    /// that reappears after a different one gets a second line.
    #[default]
    Contiguous,
    /// One line per category, in order of first appearance.
    ByCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedResult {
    #[serde(flatten)]
    pub result: ComparisonResult,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub results: Vec<ClassifiedResult>,
    pub summary: Vec<CategoryCount>,
    pub total: usize,
}

impl Report {
    /// Classifies already sorted results and summarizes them.
    pub fn build(results: Vec<ComparisonResult>, thresholds: &Thresholds, mode: SummaryMode) -> Self {
        let results: Vec<ClassifiedResult> = results
            .into_iter()
            .map(|result| ClassifiedResult {
                category: thresholds.classify(result.score),
                result,
            })
            .collect();
        let categories: Vec<Category> = results.iter().map(|r| r.category).collect();
        let summary = summarize(&categories, mode);
        let total = results.len();

        for line in &summary {
            info!(category = %line.category, count = line.count, total, "summary");
        }

        Self {
            results,
            summary,
            total,
        }
    }

    pub fn summary_lines(&self) -> Vec<String> {
        self.summary
            .iter()
            .map(|line| format!("{} : {} of {}", line.category, line.count, self.total))
            .collect()
    }

    /// Every result on its own line, then the summary lines.
    pub fn write_text<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for classified in &self.results {
            writeln!(out, "{}", classified.result)?;
        }
        for line in self.summary_lines() {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }

    pub fn count(&self, category: Category) -> usize {
        self.results.iter().filter(|r| r.category == category).count()
    }
}

pub fn summarize(categories: &[Category], mode: SummaryMode) -> Vec<CategoryCount> {
    let mut summary: Vec<CategoryCount> = Vec::new();
    for &category in categories {
        let existing = match mode {
            SummaryMode::Contiguous => summary
                .len()
                .checked_sub(1)
                .filter(|&last| summary[last].category == category),
            SummaryMode::ByCategory => summary.iter().position(|line| line.category == category),
        };
        match existing {
            Some(idx) => summary[idx].count += 1,
            None => summary.push(CategoryCount { category, count: 1 }),
        }
    }
    summary
}
