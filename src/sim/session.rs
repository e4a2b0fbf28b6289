//! Scripted navigation through a spine, reporting what the cache did.

use crate::manager::{CacheDiagnostics, ViewManager};
use crate::model::{ViewLoadError, ViewManagerError, ViewerSettings};
use crate::view::{View, ViewCreationParams, ViewKind, Viewport};
use serde::Serialize;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info};

/// Errors that stop a navigation session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Navigation path names an index past the end of the spine.
    #[error("Spine index {index} is out of range (spine has {len} items)")]
    UnknownIndex {
        /// Requested index.
        index: usize,
        /// Spine length.
        len: usize,
    },

    /// The manager rejected a request.
    #[error(transparent)]
    Request(#[from] ViewManagerError),

    /// A new view failed to load.
    #[error(transparent)]
    Load(#[from] ViewLoadError),
}

/// One navigation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    /// Spine index visited.
    pub spine_index: usize,
    /// Served from the cache.
    pub cache_hit: bool,
    /// Variant of the view that ended up on screen.
    pub kind: ViewKind,
    /// Time from request to resolution, in milliseconds of runtime clock.
    pub wait_ms: u64,
    /// Spine indices cached once the step's dwell time elapsed.
    pub cached_after: Vec<usize>,
}

/// Outcome of [`run_navigation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    /// Steps in navigation order.
    pub steps: Vec<StepReport>,
    /// Cache state after the last step.
    #[serde(rename = "final")]
    pub final_state: CacheDiagnostics,
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = if self.cache_hit { "cached" } else { "new" };
        write!(
            f,
            "{:>4}  {:<6} {:<19} {:>5}ms  cached {:?}",
            self.spine_index,
            source,
            self.kind.to_string(),
            self.wait_ms,
            self.cached_after
        )
    }
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            writeln!(f, "{step}")?;
        }
        writeln!(f)?;
        write!(f, "{}", self.final_state)
    }
}

/// Visit each spine index in `path` in turn, staying `dwell` on each.
///
/// The view shown at one step is passed as the current view of the next. Must
/// run inside a [`tokio::task::LocalSet`].
///
/// # Errors
///
/// Stops at the first step whose index is unknown, whose view cannot be built,
/// or whose view fails to load.
pub async fn run_navigation(
    manager: &ViewManager,
    viewport: Rc<dyn Viewport>,
    settings: &ViewerSettings,
    path: &[usize],
    dwell: Duration,
) -> Result<SessionReport, SessionError> {
    let params = ViewCreationParams::new(viewport);
    let mut current: Option<Rc<dyn View>> = None;
    let mut steps = Vec::with_capacity(path.len());

    for &index in path {
        let spine_item = manager
            .spine()
            .get(index)
            .cloned()
            .ok_or(SessionError::UnknownIndex {
                index,
                len: manager.spine().len(),
            })?;

        let started = Instant::now();
        let request =
            manager.get_view_for_spine_item(&spine_item, current.as_ref(), settings, &params)?;
        let outcome = request.resolve().await?;
        let wait_ms = started.elapsed().as_millis() as u64;
        debug!(index, is_new = outcome.is_new, wait_ms, "Step resolved");

        tokio::time::sleep(dwell).await;

        steps.push(StepReport {
            spine_index: index,
            cache_hit: !outcome.is_new,
            kind: outcome.view.kind(),
            wait_ms,
            cached_after: manager.diagnostics().cached_indices(),
        });
        current = Some(outcome.view);
    }

    let final_state = manager.diagnostics();
    info!(
        steps = steps.len(),
        cached = final_state.views.len(),
        "Navigation finished"
    );

    Ok(SessionReport { steps, final_state })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewCacheConfig;
    use crate::model::Spine;
    use crate::sim::{SimFactory, SimViewport};
    use tokio::task::LocalSet;

    fn manager(len: usize, latency_ms: u64) -> ViewManager {
        ViewManager::new(
            Rc::new(Spine::reflowable(len)),
            Rc::new(SimFactory::with_latency(Duration::from_millis(latency_ms))),
            ViewCacheConfig::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn walking_forward_hits_prefetched_neighbours() {
        LocalSet::new()
            .run_until(async {
                let manager = manager(10, 5);
                let report = run_navigation(
                    &manager,
                    Rc::new(SimViewport::new()),
                    &ViewerSettings::default(),
                    &[2, 3, 4],
                    Duration::from_millis(50),
                )
                .await
                .expect("session runs");

                let hits: Vec<bool> = report.steps.iter().map(|s| s.cache_hit).collect();
                assert_eq!(hits, vec![false, true, true]);
                assert_eq!(report.steps[1].wait_ms, 0, "cache hits resolve at once");
                assert_eq!(report.final_state.counters.misses, 1);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn new_view_waits_for_load_and_settle_delay() {
        LocalSet::new()
            .run_until(async {
                let manager = manager(4, 20);
                let report = run_navigation(
                    &manager,
                    Rc::new(SimViewport::new()),
                    &ViewerSettings::default(),
                    &[0],
                    Duration::ZERO,
                )
                .await
                .expect("session runs");

                // 20ms load plus the 150ms settle delay.
                let wait = report.steps[0].wait_ms;
                assert!((170..175).contains(&wait), "waited {wait}ms");
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_index_stops_the_session() {
        LocalSet::new()
            .run_until(async {
                let manager = manager(3, 1);
                let err = run_navigation(
                    &manager,
                    Rc::new(SimViewport::new()),
                    &ViewerSettings::default(),
                    &[1, 7],
                    Duration::from_millis(10),
                )
                .await
                .expect_err("index 7 is past the end");

                assert!(matches!(err, SessionError::UnknownIndex { index: 7, len: 3 }));
            })
            .await;
    }

    #[test]
    fn step_report_display_is_one_line() {
        let step = StepReport {
            spine_index: 5,
            cache_hit: true,
            kind: ViewKind::Reflowable,
            wait_ms: 0,
            cached_after: vec![4, 5, 6],
        };

        let line = step.to_string();
        assert!(!line.contains('\n'));
        assert!(line.contains("cached"));
        assert!(line.ends_with("cached [4, 5, 6]"));
    }
}
