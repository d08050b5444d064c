//! Branch-and-bound configuration.

/// Order in which open nodes are expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeSelection {
    /// Smallest lower bound first. Tightens the upper bound as early as
    /// possible and expands the fewest nodes.
    #[default]
    BestBound,

    /// Deepest node first, ties by smallest lower bound.
    ///
    /// Reaches complete tours quickly and keeps the frontier small; still
    /// exact, but usually expands more nodes than `BestBound`.
    DepthFirst,
}

/// Configuration for the branch-and-bound search.
///
/// # Examples
///
/// ```
/// use u_tsp_bnb::bnb::{BnbConfig, NodeSelection};
///
/// let config = BnbConfig::default()
///     .with_node_selection(NodeSelection::DepthFirst)
///     .with_time_limit_ms(5_000)
///     .with_max_nodes(100_000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BnbConfig {
    /// Node selection strategy.
    pub node_selection: NodeSelection,

    /// Wall-clock budget in milliseconds. 0 = no limit.
    pub time_limit_ms: u64,

    /// Maximum number of node expansions. 0 = no limit.
    pub max_nodes: usize,

    /// A node is pruned when `bound >= best_cost - prune_tolerance`.
    pub prune_tolerance: f64,

    /// Reduce the two children of a node concurrently.
    ///
    /// Only effective with the `parallel` feature; results are identical
    /// to the sequential search.
    pub parallel: bool,

    /// Keep every improving tour in [`BnbResult::candidates`](super::BnbResult::candidates).
    pub record_candidates: bool,
}

impl Default for BnbConfig {
    fn default() -> Self {
        Self {
            node_selection: NodeSelection::default(),
            time_limit_ms: 0,
            max_nodes: 0,
            prune_tolerance: 1e-9,
            parallel: false,
            record_candidates: true,
        }
    }
}

impl BnbConfig {
    pub fn with_node_selection(mut self, selection: NodeSelection) -> Self {
        self.node_selection = selection;
        self
    }

    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    pub fn with_max_nodes(mut self, n: usize) -> Self {
        self.max_nodes = n;
        self
    }

    pub fn with_prune_tolerance(mut self, tolerance: f64) -> Self {
        self.prune_tolerance = tolerance;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_record_candidates(mut self, record: bool) -> Self {
        self.record_candidates = record;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.prune_tolerance.is_finite() || self.prune_tolerance < 0.0 {
            return Err(format!(
                "prune_tolerance must be finite and non-negative, got {}",
                self.prune_tolerance
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BnbConfig::default();
        assert_eq!(config.node_selection, NodeSelection::BestBound);
        assert_eq!(config.time_limit_ms, 0);
        assert_eq!(config.max_nodes, 0);
        assert!((config.prune_tolerance - 1e-9).abs() < 1e-15);
        assert!(!config.parallel);
        assert!(config.record_candidates);
    }

    #[test]
    fn test_config_builder() {
        let config = BnbConfig::default()
            .with_node_selection(NodeSelection::DepthFirst)
            .with_time_limit_ms(250)
            .with_max_nodes(10)
            .with_prune_tolerance(0.0)
            .with_parallel(true)
            .with_record_candidates(false);

        assert_eq!(config.node_selection, NodeSelection::DepthFirst);
        assert_eq!(config.time_limit_ms, 250);
        assert_eq!(config.max_nodes, 10);
        assert_eq!(config.prune_tolerance, 0.0);
        assert!(config.parallel);
        assert!(!config.record_candidates);
    }

    #[test]
    fn test_validate_ok() {
        assert!(BnbConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_bad_tolerance() {
        assert!(BnbConfig::default()
            .with_prune_tolerance(-1.0)
            .validate()
            .is_err());
        assert!(BnbConfig::default()
            .with_prune_tolerance(f64::NAN)
            .validate()
            .is_err());
    }
}
