//! Layout storage.
//!
//! The store is an opaque document store keyed by layout id. Hosts implement
//! [`LayoutStore`] over their backend; [`MemoryLayoutStore`] is provided for
//! tests, demos and the CLI.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::{CalcError, CalcResult};
use crate::layout::document::{LayoutDocument, LayoutUpdate, NewLayout};

/// Layout persistence backend.
#[async_trait]
pub trait LayoutStore: Send + Sync {
    /// Fetch a layout; `Ok(None)` if it does not exist
    async fn get_layout(&self, id: &str) -> CalcResult<Option<LayoutDocument>>;

    /// Overwrite modules/connections of an existing layout
    async fn update_layout(&self, id: &str, update: LayoutUpdate, acting_user: &str)
        -> CalcResult<()>;

    /// Create a layout and return its id
    async fn create_layout(&self, layout: NewLayout) -> CalcResult<String>;

    async fn delete_layout(&self, id: &str, acting_user: &str) -> CalcResult<()>;
}

/// In-memory layout store.
///
/// Only the owner may update or delete a layout.
#[derive(Default)]
pub struct MemoryLayoutStore {
    layouts: RwLock<HashMap<String, LayoutDocument>>,
}

impl MemoryLayoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an existing document
    pub async fn insert(&self, document: LayoutDocument) {
        self.layouts
            .write()
            .await
            .insert(document.id.clone(), document);
    }

    pub async fn len(&self) -> usize {
        self.layouts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.layouts.read().await.is_empty()
    }
}

fn check_owner(document: &LayoutDocument, acting_user: &str, operation: &str) -> CalcResult<()> {
    if document.owner_id == acting_user {
        Ok(())
    } else {
        Err(CalcError::persistence(
            operation,
            format!("user {acting_user} does not own layout {}", document.id),
        ))
    }
}

#[async_trait]
impl LayoutStore for MemoryLayoutStore {
    async fn get_layout(&self, id: &str) -> CalcResult<Option<LayoutDocument>> {
        Ok(self.layouts.read().await.get(id).cloned())
    }

    async fn update_layout(
        &self,
        id: &str,
        update: LayoutUpdate,
        acting_user: &str,
    ) -> CalcResult<()> {
        let mut layouts = self.layouts.write().await;
        let document = layouts
            .get_mut(id)
            .ok_or_else(|| CalcError::not_found("layout", id))?;
        check_owner(document, acting_user, "update layout")?;
        document.apply_update(update);
        Ok(())
    }

    async fn create_layout(&self, layout: NewLayout) -> CalcResult<String> {
        let id = Uuid::new_v4().to_string();
        let document = LayoutDocument::create(id.clone(), layout);
        self.layouts.write().await.insert(id.clone(), document);
        tracing::debug!(layout_id = %id, "layout created");
        Ok(id)
    }

    async fn delete_layout(&self, id: &str, acting_user: &str) -> CalcResult<()> {
        let mut layouts = self.layouts.write().await;
        let document = layouts
            .get(id)
            .ok_or_else(|| CalcError::not_found("layout", id))?;
        check_owner(document, acting_user, "delete layout")?;
        layouts.remove(id);
        Ok(())
    }
}
