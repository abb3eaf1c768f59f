//! Concurrent batch processing for the async strategy
//!
//! This module provides the `BatchProcessor` struct, which runs a batch of
//! commands against a shared `CommandProcessor` from many threads at once
//! while producing exactly the balances in-order processing would.
//!
//! # Design
//!
//! A batch is partitioned into groups of commands that touch overlapping
//! aliases. A transfer joins the groups of its source and target, so every
//! alias ends up in exactly one group. Each group runs sequentially in input
//! order (including its `create` commands) on tokio's blocking pool, and
//! different groups run in parallel with at most `max_concurrent` at once.
//!
//! Commands in different groups share no alias, so their relative order
//! cannot change any outcome.
//!
//! # Architecture
//!
//! ```text
//! BatchProcessor
//!     ├── Arc<CommandProcessor>  (shared alias table + engine)
//!     └── Arc<Semaphore>         (bounds concurrently running groups)
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::error;

use super::processor::{CommandOutcome, CommandProcessor};
use super::traits::BalanceStore;
use crate::types::{AccountError, Command};

/// Result of processing a single command
///
/// Contains the original command and the result of processing it.
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// The command that was processed
    pub command: Command,

    /// The result of processing (success or error)
    pub result: Result<CommandOutcome, AccountError>,
}

/// Batch processor with alias-based partitioning
///
/// Cloning is cheap; clones share the processor and the concurrency limit.
pub struct BatchProcessor<S: BalanceStore> {
    processor: Arc<CommandProcessor<S>>,
    permits: Arc<Semaphore>,
}

impl<S: BalanceStore> Clone for BatchProcessor<S> {
    fn clone(&self) -> Self {
        Self {
            processor: Arc::clone(&self.processor),
            permits: Arc::clone(&self.permits),
        }
    }
}

impl<S: BalanceStore + 'static> BatchProcessor<S> {
    /// Create a new BatchProcessor
    ///
    /// # Arguments
    ///
    /// * `processor` - Shared command processor
    /// * `max_concurrent` - Upper bound on groups running at the same time
    pub fn new(processor: Arc<CommandProcessor<S>>, max_concurrent: usize) -> Self {
        Self {
            processor,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Partition a batch into groups of commands with overlapping aliases
    ///
    /// # Guarantees
    ///
    /// - Each command appears in exactly one group
    /// - Relative order is preserved inside each group
    /// - No alias is referenced by two different groups
    /// - Groups are ordered by their first command's position in the batch
    pub fn partition_by_accounts(&self, batch: Vec<Command>) -> Vec<Vec<Command>> {
        let mut aliases = AliasSets::default();
        for command in &batch {
            let account = aliases.index_of(command.account());
            if let Some(target) = command.target() {
                let target = aliases.index_of(target);
                aliases.union(account, target);
            }
        }

        let mut group_of_root: HashMap<usize, usize> = HashMap::new();
        let mut groups: Vec<Vec<Command>> = Vec::new();

        for command in batch {
            let index = aliases.index_of(command.account());
            let root = aliases.find(index);
            let group = *group_of_root.entry(root).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[group].push(command);
        }

        groups
    }

    /// Process a batch of commands
    ///
    /// This method:
    /// 1. Partitions the batch by the aliases its commands touch
    /// 2. Spawns one blocking task per group, bounded by the semaphore
    /// 3. Runs each group's commands in input order
    /// 4. Waits for all groups to finish
    ///
    /// Results come back grouped, in group order. Commands whose task
    /// panicked are logged and dropped.
    pub async fn process_batch(&self, batch: Vec<Command>) -> Vec<ProcessingResult> {
        let total = batch.len();
        let groups = self.partition_by_accounts(batch);

        let mut tasks = Vec::with_capacity(groups.len());
        for group in groups {
            // The semaphore is never closed, so acquiring only fails if that changes
            let permit = Arc::clone(&self.permits).acquire_owned().await.ok();
            let processor = Arc::clone(&self.processor);

            tasks.push(tokio::task::spawn_blocking(move || {
                let _permit = permit;
                group
                    .into_iter()
                    .map(|command| {
                        let result = processor.process(&command);
                        ProcessingResult { command, result }
                    })
                    .collect::<Vec<_>>()
            }));
        }

        let mut results = Vec::with_capacity(total);
        for task in join_all(tasks).await {
            match task {
                Ok(group_results) => results.extend(group_results),
                Err(e) => error!("Command group task panicked: {}", e),
            }
        }

        results
    }
}

/// Disjoint sets over the aliases referenced by one batch
#[derive(Default)]
struct AliasSets {
    indices: HashMap<String, usize>,
    parents: Vec<usize>,
}

impl AliasSets {
    fn index_of(&mut self, alias: &str) -> usize {
        if let Some(&index) = self.indices.get(alias) {
            return index;
        }
        let index = self.parents.len();
        self.parents.push(index);
        self.indices.insert(alias.to_string(), index);
        index
    }

    fn find(&mut self, mut index: usize) -> usize {
        while self.parents[index] != index {
            // Path halving
            self.parents[index] = self.parents[self.parents[index]];
            index = self.parents[index];
        }
        index
    }

    fn union(&mut self, a: usize, b: usize) {
        let (root_a, root_b) = (self.find(a), self.find(b));
        if root_a != root_b {
            self.parents[root_b] = root_a;
        }
    }
}
