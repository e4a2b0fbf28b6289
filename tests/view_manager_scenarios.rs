//! Acceptance tests for the view cache: reading forwards, jumping, spreads.
//!
//! Each test drives the public API against the in-memory host on a paused
//! clock and checks what the reader would observe.

use spineview::config::ViewCacheConfig;
use spineview::manager::{ViewManager, ViewRequest};
use spineview::model::{Spine, SpineItem, ViewerSettings};
use spineview::sim::{SimFactory, SimView, SimViewport};
use spineview::view::{View, ViewCreationParams, ViewKind};
use std::rc::Rc;
use std::time::Duration;
use tokio::task::LocalSet;
use tokio::time::Instant;

// ===== Test Fixtures =====

struct Reader {
    manager: ViewManager,
    factory: Rc<SimFactory>,
    params: ViewCreationParams,
}

impl Reader {
    fn open(len: usize) -> Self {
        let factory = Rc::new(SimFactory::manual());
        let manager = ViewManager::new(
            Rc::new(Spine::reflowable(len)),
            factory.clone(),
            ViewCacheConfig::default(),
        );
        let params = ViewCreationParams::new(Rc::new(SimViewport::new()));
        Self {
            manager,
            factory,
            params,
        }
    }

    fn item(&self, index: usize) -> SpineItem {
        self.manager.spine().get(index).cloned().expect("in spine")
    }

    fn go_to(&self, index: usize, current: Option<&Rc<dyn View>>) -> ViewRequest {
        self.manager
            .get_view_for_spine_item(
                &self.item(index),
                current,
                &ViewerSettings::default(),
                &self.params,
            )
            .expect("request accepted")
    }

    async fn load_everything(&self) {
        self.factory.finish_all();
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    fn cached(&self) -> Vec<usize> {
        self.manager.diagnostics().cached_indices()
    }
}

// ===== Scenario 1: Opening a Book =====

#[tokio::test(start_paused = true)]
async fn opening_an_item_caches_it_with_both_neighbours() {
    LocalSet::new()
        .run_until(async {
            // GIVEN: a ten item spine and nothing on screen
            let reader = Reader::open(10);

            // WHEN: the reader opens item 5
            let request = reader.go_to(5, None);

            // THEN: items 4 and 6 are prefetched alongside the primary view
            let built: Vec<Option<usize>> = reader
                .factory
                .created()
                .iter()
                .map(|view| view.created_for())
                .collect();
            assert_eq!(built, vec![Some(6), Some(4), Some(5)]);

            // AND: once everything loads all three are cached
            reader.load_everything().await;
            assert_eq!(reader.cached(), vec![4, 5, 6]);

            let outcome = request.resolve().await.expect("primary view loads");
            assert!(outcome.is_new);
            assert_eq!(outcome.view.loaded_spine_items()[0].index, 5);
        })
        .await;
}

// ===== Scenario 2: Jumping Ahead =====

#[tokio::test(start_paused = true)]
async fn jumping_ahead_evicts_views_left_behind() {
    LocalSet::new()
        .run_until(async {
            // GIVEN: items 4, 5 and 6 cached around item 5
            let reader = Reader::open(10);
            let five = reader.go_to(5, None).view().clone();
            reader.load_everything().await;

            // WHEN: the reader jumps to item 9
            reader.go_to(9, Some(&five));

            // THEN: 4 and 5 are evicted, 6 is exactly at the window edge and stays
            assert_eq!(reader.cached(), vec![6]);

            // AND: after 8 and 9 load the cache follows the reader
            reader.load_everything().await;
            assert_eq!(reader.cached(), vec![6, 8, 9]);
        })
        .await;
}

// ===== Scenario 3: Hit versus Miss =====

#[tokio::test(start_paused = true)]
async fn cached_item_is_immediate_and_new_item_waits_for_load() {
    LocalSet::new()
        .run_until(async {
            let reader = Reader::open(10);
            let five = reader.go_to(5, None).view().clone();
            reader.load_everything().await;

            // Cache hit: ready before any time passes.
            let started = Instant::now();
            let hit = reader.go_to(6, Some(&five));
            assert!(hit.is_ready());
            let outcome = hit.resolve().await.expect("hit resolves");
            assert!(!outcome.is_new);
            assert_eq!(started.elapsed(), Duration::ZERO);

            // Cache miss: resolves after the load plus the settle delay.
            let six = outcome.view;
            let miss = reader.go_to(0, Some(&six));
            assert!(!miss.is_ready());
            let pending = tokio::task::spawn_local(miss.resolve());

            tokio::time::sleep(Duration::from_millis(30)).await;
            let started = Instant::now();
            reader.load_everything().await;

            let outcome = pending.await.expect("task").expect("view loads");
            assert!(outcome.is_new);
            assert!(started.elapsed() >= Duration::from_millis(150));
        })
        .await;
}

// ===== Scenario 4: Two-Page Spreads =====

#[tokio::test(start_paused = true)]
async fn spread_prefetches_the_neighbouring_spreads() {
    LocalSet::new()
        .run_until(async {
            // GIVEN: a spread showing items 4 and 5
            let reader = Reader::open(10);
            let spread: Rc<dyn View> = Rc::new(SimView::with_loaded(
                ViewKind::Reflowable,
                vec![reader.item(4), reader.item(5)],
            ));

            // WHEN: the reader asks for item 5
            reader.go_to(5, Some(&spread));

            // THEN: items 3 and 7 are prefetched, not 4 and 6
            assert_eq!(reader.factory.views_for(7).len(), 1);
            assert_eq!(reader.factory.views_for(3).len(), 1);
            assert!(reader.factory.views_for(4).is_empty());
            assert!(reader.factory.views_for(6).is_empty());
        })
        .await;
}
