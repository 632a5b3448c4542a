//! The session: application state plus the actions the view invokes.
//!
//! State lives in a `watch` channel and is replaced wholesale by every load.
//! Loads may overlap (a navigation racing a push refresh); each takes a
//! generation ticket when it starts. A completed load publishes unless a load
//! that started after it has already published. Failed loads publish nothing
//! and never hold back an older load.

use crate::{
    config::{RefreshMode, SessionConfig},
    loader::CollectionLoader,
    mutation::{Followup, MutationCoordinator},
    refresh,
};
use roster_core::{AppState, MutationError, PageView, ResolveError, Resource, Transport};
use serde_json::{Map, Value};
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio::sync::watch;
use tracing::{debug, warn};

/// One user's view of the collection.
pub struct Session<T> {
    loader: CollectionLoader<T>,
    mutations: MutationCoordinator<T>,
    state: watch::Sender<AppState>,
    generation: AtomicU64,
    /// Ticket of the load whose view is currently published.
    published: AtomicU64,
}

impl<T: Transport> Session<T> {
    /// A session with an empty state; nothing is loaded until [`Session::mount`].
    pub fn new(transport: Arc<T>, config: &SessionConfig) -> Self {
        let loader = CollectionLoader::new(transport.clone(), &config.root, &config.relation);
        let mutations = MutationCoordinator::new(transport, &config.root, &config.relation)
            .with_manager(config.manager.clone())
            .with_mode(config.refresh);
        let (state, _) = watch::channel(AppState::new(config.page_size, config.manager.clone()));
        Self {
            loader,
            mutations,
            state,
            generation: AtomicU64::new(0),
            published: AtomicU64::new(0),
        }
    }

    /// A receiver that observes every state replacement.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }

    /// Initial load at the configured page size.
    pub async fn mount(&self) -> Result<(), ResolveError> {
        let page_size = self.state.borrow().page_size;
        self.reload(page_size).await
    }

    /// Loads the page behind a pagination link.
    pub async fn navigate(&self, href: &str) -> Result<(), ResolveError> {
        let ticket = self.begin();
        let page_size = self.state.borrow().page_size;
        let view = self.loader.load_link(href, page_size).await?;
        self.publish(ticket, view);
        Ok(())
    }

    /// Reloads from the first page when the size actually changes.
    pub async fn set_page_size(&self, page_size: u32) -> Result<(), ResolveError> {
        if page_size == self.state.borrow().page_size {
            return Ok(());
        }
        self.reload(page_size).await
    }

    /// Creates an item, then follows up according to the refresh mode.
    pub async fn create(&self, fields: Map<String, Value>) -> Result<(), MutationError> {
        let page_size = self.state.borrow().page_size;
        let followup = self.mutations.create(fields, page_size).await?;
        self.follow_up(followup).await
    }

    /// Updates `item`, then follows up according to the refresh mode.
    pub async fn update(
        &self,
        item: &Resource,
        fields: Map<String, Value>,
    ) -> Result<(), MutationError> {
        let followup = self.mutations.update(item, fields).await?;
        self.follow_up(followup).await
    }

    /// Deletes `item`, then follows up according to the refresh mode.
    pub async fn delete(&self, item: &Resource) -> Result<(), MutationError> {
        let followup = self.mutations.delete(item).await?;
        self.follow_up(followup).await
    }

    /// Reaction to item-created.
    pub async fn refresh_and_go_to_last(&self) -> Result<(), ResolveError> {
        let ticket = self.begin();
        let page_size = self.state.borrow().page_size;
        let view = refresh::refresh_and_go_to_last(&self.loader, page_size).await?;
        self.publish(ticket, view);
        Ok(())
    }

    /// Reaction to item-updated and item-deleted.
    pub async fn refresh_current_page(&self) -> Result<(), ResolveError> {
        let ticket = self.begin();
        let (page_size, page_number) = {
            let state = self.state.borrow();
            (state.page_size, state.page_number())
        };
        let view = refresh::refresh_current_page(&self.loader, page_size, page_number).await?;
        self.publish(ticket, view);
        Ok(())
    }

    async fn reload(&self, page_size: u32) -> Result<(), ResolveError> {
        let ticket = self.begin();
        let view = self.loader.load_page(page_size, None).await?;
        self.publish(ticket, view);
        Ok(())
    }

    async fn follow_up(&self, followup: Followup) -> Result<(), MutationError> {
        match followup {
            Followup::AwaitPush => Ok(()),
            Followup::Navigate(href) => Ok(self.navigate(&href).await?),
            Followup::ReloadCurrent => Ok(self.refresh_current_page().await?),
        }
    }

    fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn publish(&self, ticket: u64, view: PageView) {
        // Checked under the state's write lock so two completions cannot
        // interleave between the comparison and the replacement.
        self.state.send_if_modified(|state| {
            let newer = self.published.load(Ordering::SeqCst);
            if ticket < newer {
                warn!(ticket, newer, "discarding superseded load");
                return false;
            }
            self.published.store(ticket, Ordering::SeqCst);
            debug!(items = view.items.len(), page = ?view.page, "state replaced");
            state.apply(view);
            true
        });
    }
}
