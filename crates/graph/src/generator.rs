//! Random graph synthesis from an original graph.
//!
//! The output keeps the original's node count and, within the capacity
//! allowed by the configured policies, its edge count. Nodes are renumbered
//! `"0".."N-1"`.

use std::collections::HashSet;
use std::ops::ControlFlow;

use netmotif_core::{Error, OptionExt, Result};
use rand::rngs::StdRng;
use rand::seq::{SliceRandom, index};
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::graph::DirectedGraph;
use crate::triad::{TRIAD_CLASS_COUNT, class_embeddings, pattern_arcs, pattern_of, triad_census};

/// Consecutive unusable triples after which the multiplet budget is ignored
const STALL_THRESHOLD: usize = 64;

/// How edges are synthesized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStrategy {
    /// Independent uniform endpoints per edge
    #[default]
    Uniform,
    /// Triad-guided synthesis spending the original census as a budget
    Multiplet,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfLoopPolicy {
    #[default]
    Forbid,
    Allow,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParallelEdgePolicy {
    #[default]
    Deduplicate,
    Allow,
}

/// Generator settings, the `[generator]` section of the server config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub strategy: GenerationStrategy,
    pub self_loops: SelfLoopPolicy,
    pub parallel_edges: ParallelEdgePolicy,
    /// Emit progress every k edges; the final edge always emits
    pub progress_every: usize,
    /// Rejection-sampling budget per edge
    pub max_attempts_per_edge: usize,
    /// Fixed seed for reproducible output
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            strategy: GenerationStrategy::default(),
            self_loops: SelfLoopPolicy::default(),
            parallel_edges: ParallelEdgePolicy::default(),
            progress_every: 1,
            max_attempts_per_edge: 10_000,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Check that the numeric settings are usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when `progress_every` or
    /// `max_attempts_per_edge` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.progress_every == 0 {
            return Err(Error::invalid_config("progress_every must be at least 1"));
        }
        if self.max_attempts_per_edge == 0 {
            return Err(Error::invalid_config(
                "max_attempts_per_edge must be at least 1",
            ));
        }
        Ok(())
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub const fn with_strategy(mut self, strategy: GenerationStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// Generation progress: `current` of `total` edges placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

impl Progress {
    /// Percentage in `0..=100`, rounded to two decimals; 100 when `total` is 0.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        let raw = self.current as f64 / self.total as f64 * 100.0;
        (raw * 100.0).round() / 100.0
    }
}

/// Receives progress while a graph is generated.
///
/// Returning [`ControlFlow::Break`] stops generation with [`Error::Cancelled`].
pub trait ProgressObserver {
    fn on_progress(&mut self, progress: Progress) -> ControlFlow<()>;
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl ProgressObserver for Silent {
    fn on_progress(&mut self, _progress: Progress) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

impl<F> ProgressObserver for F
where
    F: FnMut(Progress) -> ControlFlow<()>,
{
    fn on_progress(&mut self, progress: Progress) -> ControlFlow<()> {
        self(progress)
    }
}

/// Throttles observer calls to every `every` edges plus the first and last.
struct ProgressReporter<'a, O: ?Sized> {
    observer: &'a mut O,
    total: usize,
    every: usize,
}

impl<O: ProgressObserver + ?Sized> ProgressReporter<'_, O> {
    fn report(&mut self, current: usize) -> Result<()> {
        let due = current == 0
            || current == self.total
            || current.checked_rem(self.every) == Some(0);
        if due
            && self
                .observer
                .on_progress(Progress {
                    current,
                    total: self.total,
                })
                .is_break()
        {
            debug!(current, total = self.total, "Generation cancelled by observer");
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}

/// Builds random graphs shaped like an original graph.
#[derive(Debug, Clone, Default)]
pub struct GraphGenerator {
    config: GeneratorConfig,
}

impl GraphGenerator {
    #[must_use]
    pub const fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Edge count the generator will produce for an input of `nodes` nodes
    /// and `edges` edges: `edges` clamped to the policy capacity.
    #[must_use]
    pub fn target_edge_count(&self, nodes: usize, edges: usize) -> usize {
        let (self_loops, parallel_edges) = self.effective_policies();
        capacity(nodes, self_loops, parallel_edges).map_or(edges, |cap| edges.min(cap))
    }

    /// Generate a graph with the original's node count and edge count.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidConfig`] for an unusable configuration
    /// * [`Error::Cancelled`] when the observer breaks
    /// * [`Error::ComputationFailed`] when the sampling budget runs out
    ///
    /// # Examples
    ///
    /// ```
    /// use netmotif_graph::{DirectedGraph, GeneratorConfig, GraphGenerator, Silent};
    ///
    /// let original = DirectedGraph::from_parts(
    ///     ["a", "b", "c"].map(String::from),
    ///     [("a", "b"), ("b", "c")].map(|(s, t)| (s.to_string(), t.to_string())),
    /// ).unwrap();
    ///
    /// let generator = GraphGenerator::new(GeneratorConfig::default().with_seed(Some(7)));
    /// let generated = generator.generate(&original, &mut Silent).unwrap();
    /// assert_eq!(generated.node_count(), 3);
    /// assert_eq!(generated.edge_count(), 2);
    /// ```
    pub fn generate<O>(&self, original: &DirectedGraph, observer: &mut O) -> Result<DirectedGraph>
    where
        O: ProgressObserver + ?Sized,
    {
        self.config.validate()?;

        let n = original.node_count();
        let m = original.edge_count();
        let target = self.target_edge_count(n, m);
        if target < m {
            warn!(
                requested = m,
                produced = target,
                nodes = n,
                "Edge count exceeds policy capacity, clamping"
            );
        }

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut reporter = ProgressReporter {
            observer,
            total: target,
            every: self.config.progress_every,
        };

        debug!(
            strategy = ?self.config.strategy,
            nodes = n,
            edges = target,
            seed = ?self.config.seed,
            "Generating graph"
        );

        match self.config.strategy {
            GenerationStrategy::Uniform => {
                self.generate_uniform(n, target, &mut rng, &mut reporter)
            }
            GenerationStrategy::Multiplet => {
                self.generate_multiplet(original, target, &mut rng, &mut reporter)
            }
        }
    }

    /// Multiplet output is always simple.
    const fn effective_policies(&self) -> (SelfLoopPolicy, ParallelEdgePolicy) {
        match self.config.strategy {
            GenerationStrategy::Uniform => (self.config.self_loops, self.config.parallel_edges),
            GenerationStrategy::Multiplet => {
                (SelfLoopPolicy::Forbid, ParallelEdgePolicy::Deduplicate)
            }
        }
    }

    fn generate_uniform<O>(
        &self,
        n: usize,
        target: usize,
        rng: &mut StdRng,
        reporter: &mut ProgressReporter<'_, O>,
    ) -> Result<DirectedGraph>
    where
        O: ProgressObserver + ?Sized,
    {
        let (self_loops, parallel_edges) = self.effective_policies();
        let mut graph = DirectedGraph::with_numbered_nodes(n);
        reporter.report(0)?;

        match (parallel_edges, capacity(n, self_loops, parallel_edges)) {
            (ParallelEdgePolicy::Deduplicate, Some(cap)) => {
                // Distinct pairs drawn without replacement from the admissible pair space
                for (placed, slot) in (1..).zip(index::sample(rng, cap, target).into_iter()) {
                    let (source, target_node) = pair_at(slot, n, self_loops)
                        .ok_or_computation("pair slot outside the node range")?;
                    graph.add_edge_between(source, target_node)?;
                    reporter.report(placed)?;
                }
            }
            _ => {
                for placed in 1..=target {
                    let (source, target_node) = self.draw_pair(n, self_loops, rng)?;
                    graph.add_edge_between(source, target_node)?;
                    reporter.report(placed)?;
                }
            }
        }

        Ok(graph)
    }

    fn draw_pair(
        &self,
        n: usize,
        self_loops: SelfLoopPolicy,
        rng: &mut StdRng,
    ) -> Result<(usize, usize)> {
        for _ in 0..self.config.max_attempts_per_edge {
            let source = rng.gen_range(0..n);
            let target = rng.gen_range(0..n);
            if source == target && self_loops == SelfLoopPolicy::Forbid {
                continue;
            }
            return Ok((source, target));
        }
        Err(Error::computation(format!(
            "no admissible edge found after {} attempts",
            self.config.max_attempts_per_edge
        )))
    }

    fn generate_multiplet<O>(
        &self,
        original: &DirectedGraph,
        target: usize,
        rng: &mut StdRng,
        reporter: &mut ProgressReporter<'_, O>,
    ) -> Result<DirectedGraph>
    where
        O: ProgressObserver + ?Sized,
    {
        let n = original.node_count();
        let census = triad_census(original);
        let distribution = census.probabilities();
        let connected_mass: f64 = distribution.iter().skip(1).sum();

        if n < 3 || census.total() == 0 || connected_mass <= 0.0 {
            debug!(nodes = n, "No connected triads to follow, using uniform synthesis");
            return self.generate_uniform(n, target, rng, reporter);
        }

        let step = 1.0 / census.total() as f64;
        let mut budget = distribution;
        let mut graph = DirectedGraph::with_numbered_nodes(n);
        let mut arcs: HashSet<(usize, usize)> = HashSet::with_capacity(target);
        let mut placed = 0_usize;
        let mut stalled = 0_usize;
        reporter.report(0)?;

        while placed < target {
            if stalled >= self.config.max_attempts_per_edge {
                return Err(Error::computation(format!(
                    "no triad could be extended after {stalled} attempts ({placed} of {target} edges placed)"
                )));
            }

            let triple = match index::sample(rng, n, 3).into_vec().as_slice() {
                &[a, b, c] => [a, b, c],
                _ => return Err(Error::computation("could not sample three distinct nodes")),
            };
            let pattern = pattern_of(triple, |source, target| arcs.contains(&(source, target)));

            let mut candidates = extensions(pattern, Some(&budget));
            if candidates.is_empty() && stalled >= STALL_THRESHOLD {
                // Classes with budget are unreachable from here; take any extension
                candidates = extensions(pattern, None);
            }
            if candidates.is_empty() {
                stalled = stalled.saturating_add(1);
                if budget_exhausted(&budget) {
                    debug!(placed, "Refilling triad budget");
                    budget = distribution;
                }
                continue;
            }
            stalled = 0;

            let &(class_id, template) = candidates
                .choose(rng)
                .ok_or_computation("no triad extension to choose from")?;
            for (s, t) in pattern_arcs(template & !pattern) {
                if placed == target {
                    break;
                }
                let (Some(&source), Some(&target_node)) = (triple.get(s), triple.get(t)) else {
                    continue;
                };
                arcs.insert((source, target_node));
                graph.add_edge_between(source, target_node)?;
                placed = placed.saturating_add(1);
                reporter.report(placed)?;
            }
            if let Some(remaining) = budget.get_mut(class_id) {
                *remaining -= step;
            }
        }

        Ok(graph)
    }
}

/// Classes whose template strictly extends `pattern`, paired with the
/// first embedding that does. With a budget, only classes it still funds.
fn extensions(pattern: u8, budget: Option<&[f64; TRIAD_CLASS_COUNT]>) -> Vec<(usize, u8)> {
    (1..TRIAD_CLASS_COUNT)
        .filter(|&class_id| {
            budget.is_none_or(|budget| budget.get(class_id).is_some_and(|&left| left > 0.0))
        })
        .filter_map(|class_id| {
            class_embeddings(class_id)?
                .iter()
                .find(|&&template| template & pattern == pattern && template != pattern)
                .map(|&template| (class_id, template))
        })
        .collect()
}

fn budget_exhausted(budget: &[f64; TRIAD_CLASS_COUNT]) -> bool {
    budget.iter().skip(1).all(|&remaining| remaining <= 0.0)
}

/// Maximum edge count under the policies; `None` when unbounded.
fn capacity(n: usize, self_loops: SelfLoopPolicy, parallel_edges: ParallelEdgePolicy) -> Option<usize> {
    match (parallel_edges, self_loops) {
        (ParallelEdgePolicy::Deduplicate, SelfLoopPolicy::Forbid) => {
            Some(n.saturating_mul(n.saturating_sub(1)))
        }
        (ParallelEdgePolicy::Deduplicate, SelfLoopPolicy::Allow) => Some(n.saturating_mul(n)),
        (ParallelEdgePolicy::Allow, SelfLoopPolicy::Forbid) if n < 2 => Some(0),
        (ParallelEdgePolicy::Allow, SelfLoopPolicy::Allow) if n == 0 => Some(0),
        (ParallelEdgePolicy::Allow, _) => None,
    }
}

/// Decode a slot of the admissible pair space into `(source, target)`.
///
/// `None` when the pair space is empty.
fn pair_at(slot: usize, n: usize, self_loops: SelfLoopPolicy) -> Option<(usize, usize)> {
    match self_loops {
        SelfLoopPolicy::Allow => Some((slot.checked_div(n)?, slot.checked_rem(n)?)),
        SelfLoopPolicy::Forbid => {
            let width = n.checked_sub(1)?;
            let source = slot.checked_div(width)?;
            let offset = slot.checked_rem(width)?;
            let target = if offset >= source {
                offset.checked_add(1)?
            } else {
                offset
            };
            Some((source, target))
        }
    }
}
