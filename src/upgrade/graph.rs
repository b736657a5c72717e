//! The version graph: registered upgrade edges and path resolution.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::AppError;
use crate::upgrade::step::UpgradeStep;
use crate::version::Version;

/// Registration precedence for an edge.
///
/// The product historically shipped premium-edition variants of some
/// upgrade steps that replace the standard step for the same version
/// transition. Both may be registered; an `Override` edge wins at
/// resolution, and registering two edges for the same transition at the
/// same precedence is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precedence {
    Standard,
    Override,
}

/// One hop in the version graph: a step together with its endpoints.
#[derive(Clone)]
pub struct UpgradeEdge {
    from: Version,
    to: Version,
    precedence: Precedence,
    step: Arc<dyn UpgradeStep>,
}

impl UpgradeEdge {
    pub fn from(&self) -> Version {
        self.from
    }

    pub fn to(&self) -> Version {
        self.to
    }

    pub fn precedence(&self) -> Precedence {
        self.precedence
    }

    pub fn step(&self) -> &dyn UpgradeStep {
        self.step.as_ref()
    }

    pub fn step_id(&self) -> &str {
        self.step.id()
    }
}

impl fmt::Debug for UpgradeEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpgradeEdge")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("precedence", &self.precedence)
            .field("step", &self.step.id())
            .finish()
    }
}

/// All registered upgrade edges, indexed by their `from` version.
#[derive(Debug, Default)]
pub struct VersionGraph {
    edges: BTreeMap<Version, Vec<UpgradeEdge>>,
}

impl VersionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a step as an edge.
    ///
    /// Fails when the step's range does not advance the version, or when
    /// an edge for the same transition already exists at the same
    /// precedence.
    pub fn register(
        &mut self,
        step: Arc<dyn UpgradeStep>,
        precedence: Precedence,
    ) -> Result<(), AppError> {
        let (from, to) = step.applicable_range();
        if from >= to {
            return Err(AppError::InvalidEdge { from, to });
        }

        let bucket = self.edges.entry(from).or_default();
        if bucket
            .iter()
            .any(|e| e.to == to && e.precedence == precedence)
        {
            return Err(AppError::DuplicateEdge {
                from,
                to,
                precedence,
            });
        }

        tracing::debug!(
            step = step.id(),
            %from,
            %to,
            ?precedence,
            "registered upgrade edge"
        );
        bucket.push(UpgradeEdge {
            from,
            to,
            precedence,
            step,
        });
        Ok(())
    }

    /// Resolves the ordered edge chain from `installed` to exactly `target`.
    ///
    /// Greedy longest-hop chaining: at each hop, among edges starting at
    /// the current version whose `to` does not exceed `target`, the edge
    /// with the largest `to` is chosen; between a standard edge and an
    /// override for the same `to`, the override wins. The rule is
    /// deterministic because duplicate registrations are rejected.
    ///
    /// Wide-spanning steps are preferred over chains of smaller hops
    /// because the wide step is the one the product validated for that
    /// transition; taking smaller hops instead would run data-migration
    /// side effects the wide step deliberately subsumes.
    pub fn resolve_path(
        &self,
        installed: Version,
        target: Version,
    ) -> Result<Vec<UpgradeEdge>, AppError> {
        if installed == target {
            return Ok(Vec::new());
        }
        if target < installed {
            return Err(AppError::NoPath {
                installed,
                target,
                stalled_at: installed,
            });
        }

        let mut current = installed;
        let mut path = Vec::new();
        while current < target {
            let next = self.edges.get(&current).and_then(|bucket| {
                bucket
                    .iter()
                    .filter(|e| e.to <= target)
                    .max_by_key(|e| (e.to, e.precedence == Precedence::Override))
            });

            let Some(edge) = next else {
                return Err(AppError::NoPath {
                    installed,
                    target,
                    stalled_at: current,
                });
            };
            path.push(edge.clone());
            current = edge.to;
        }

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;

    use crate::db::SqlExecutor;

    struct NullStep {
        id: String,
        from: Version,
        to: Version,
    }

    impl NullStep {
        fn arc(id: &str, from: &str, to: &str) -> Arc<dyn UpgradeStep> {
            Arc::new(Self {
                id: id.to_string(),
                from: from.parse().unwrap(),
                to: to.parse().unwrap(),
            })
        }
    }

    impl UpgradeStep for NullStep {
        fn id(&self) -> &str {
            &self.id
        }

        fn applicable_range(&self) -> (Version, Version) {
            (self.from, self.to)
        }

        fn migrate_data<'a>(
            &'a self,
            _executor: &'a dyn SqlExecutor,
        ) -> BoxFuture<'a, Result<(), AppError>> {
            Box::pin(std::future::ready(Ok(())))
        }
    }

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn test_resolve_chained_path() {
        let mut graph = VersionGraph::new();
        graph
            .register(NullStep::arc("a", "2.1.8", "2.2.1"), Precedence::Standard)
            .unwrap();
        graph
            .register(NullStep::arc("b", "2.2.1", "2.2.4"), Precedence::Standard)
            .unwrap();

        let path = graph.resolve_path(v("2.1.8"), v("2.2.4")).unwrap();
        let ids: Vec<_> = path.iter().map(|e| e.step_id().to_string()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let mut graph = VersionGraph::new();
        graph
            .register(NullStep::arc("a", "2.1.8", "2.2.1"), Precedence::Standard)
            .unwrap();
        graph
            .register(NullStep::arc("b", "2.2.1", "2.2.4"), Precedence::Standard)
            .unwrap();

        let first = graph.resolve_path(v("2.1.8"), v("2.2.4")).unwrap();
        let second = graph.resolve_path(v("2.1.8"), v("2.2.4")).unwrap();
        let ids = |p: &[UpgradeEdge]| {
            p.iter()
                .map(|e| e.step_id().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn test_longest_hop_wins() {
        let mut graph = VersionGraph::new();
        graph
            .register(NullStep::arc("small", "2.2.1", "2.2.4"), Precedence::Standard)
            .unwrap();
        graph
            .register(NullStep::arc("wide", "2.2.1", "3.0.0"), Precedence::Standard)
            .unwrap();

        let path = graph.resolve_path(v("2.2.1"), v("3.0.0")).unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].step_id(), "wide");

        // With a lower target the wide edge overshoots and the small one applies
        let path = graph.resolve_path(v("2.2.1"), v("2.2.4")).unwrap();
        assert_eq!(path[0].step_id(), "small");
    }

    #[test]
    fn test_gap_in_graph_is_no_path() {
        let mut graph = VersionGraph::new();
        graph
            .register(NullStep::arc("a", "2.1.8", "2.2.1"), Precedence::Standard)
            .unwrap();
        graph
            .register(NullStep::arc("b", "2.2.1", "2.2.4"), Precedence::Standard)
            .unwrap();
        graph
            .register(NullStep::arc("c", "2.2.14", "3.0.0"), Precedence::Standard)
            .unwrap();

        let err = graph.resolve_path(v("2.1.8"), v("3.0.0")).unwrap_err();
        match err {
            AppError::NoPath {
                installed,
                target,
                stalled_at,
            } => {
                assert_eq!(installed, v("2.1.8"));
                assert_eq!(target, v("3.0.0"));
                assert_eq!(stalled_at, v("2.2.4"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_override_edge_wins() {
        let mut graph = VersionGraph::new();
        graph
            .register(
                NullStep::arc("community", "2.1.8", "2.2.1"),
                Precedence::Standard,
            )
            .unwrap();
        graph
            .register(
                NullStep::arc("premium", "2.1.8", "2.2.1"),
                Precedence::Override,
            )
            .unwrap();

        let path = graph.resolve_path(v("2.1.8"), v("2.2.1")).unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].step_id(), "premium");
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut graph = VersionGraph::new();
        graph
            .register(NullStep::arc("a", "2.1.8", "2.2.1"), Precedence::Standard)
            .unwrap();

        let err = graph
            .register(NullStep::arc("a2", "2.1.8", "2.2.1"), Precedence::Standard)
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateEdge { .. }));

        // A second override for an already-overridden transition is also rejected
        graph
            .register(NullStep::arc("p", "2.1.8", "2.2.1"), Precedence::Override)
            .unwrap();
        let err = graph
            .register(NullStep::arc("p2", "2.1.8", "2.2.1"), Precedence::Override)
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateEdge { .. }));
    }

    #[test]
    fn test_non_advancing_edge_rejected() {
        let mut graph = VersionGraph::new();
        let err = graph
            .register(NullStep::arc("noop", "2.1.8", "2.1.8"), Precedence::Standard)
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidEdge { .. }));
    }

    #[test]
    fn test_same_version_resolves_empty() {
        let graph = VersionGraph::new();
        assert!(graph.resolve_path(v("2.1.8"), v("2.1.8")).unwrap().is_empty());
    }

    #[test]
    fn test_downgrade_is_no_path() {
        let graph = VersionGraph::new();
        let err = graph.resolve_path(v("3.0.0"), v("2.1.8")).unwrap_err();
        assert!(matches!(err, AppError::NoPath { .. }));
    }
}
