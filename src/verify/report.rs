use std::collections::BTreeMap;

use itertools::Itertools;

use super::discrepancy::{Category, Discrepancy};

#[derive(Debug, Clone)]
pub struct WorkReport {
    pub id: String,
    pub discrepancies: Vec<Discrepancy>,
}

#[derive(Debug, Clone, Default)]
pub struct Report {
    pub works: Vec<WorkReport>,
}

impl Report {
    pub fn perfect(&self) -> usize {
        self.works.iter().filter(|w| w.discrepancies.is_empty()).count()
    }

    pub fn with_errors(&self) -> usize {
        self.works.len() - self.perfect()
    }

    pub fn discrepancy_count(&self) -> usize {
        self.works.iter().map(|w| w.discrepancies.len()).sum()
    }

    /// Category → ids of affected works, each listed once, in corpus order.
    pub fn by_category(&self) -> BTreeMap<Category, Vec<&str>> {
        let mut buckets: BTreeMap<Category, Vec<&str>> = BTreeMap::new();
        for work in &self.works {
            for category in work.discrepancies.iter().map(Discrepancy::category).unique() {
                buckets.entry(category).or_default().push(&work.id);
            }
        }
        buckets
    }

    pub fn print(&self) {
        println!("Verifying {} works...", self.works.len());
        println!("{}", "=".repeat(80));
        for work in &self.works {
            if work.discrepancies.is_empty() {
                println!("[{}] ok", work.id);
                continue;
            }
            println!("[{}] {} issue(s)", work.id, work.discrepancies.len());
            for d in &work.discrepancies {
                println!("    {}", d);
            }
        }

        println!("{}", "=".repeat(80));
        println!("Total works:   {}", self.works.len());
        println!("Perfect match: {}", self.perfect());
        println!("With errors:   {}", self.with_errors());
        println!("Discrepancies: {}", self.discrepancy_count());

        let buckets = self.by_category();
        if !buckets.is_empty() {
            println!("\n--- Error categories ---");
            for (category, ids) in &buckets {
                println!("  {} ({}): {}", category.label(), ids.len(), ids.iter().take(5).join(", "));
            }
        }
        println!(
            "\nunique works with errors: {} / {}",
            self.with_errors(),
            self.works.len()
        );
    }
}
