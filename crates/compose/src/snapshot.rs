//! Composed snapshots
//!
//! A [`Snapshot`] is the immutable result of one composition. It is shared
//! as `Arc<Snapshot>` with any number of readers. Re-composition never
//! mutates a published snapshot: it builds a new one and swaps it into the
//! [`SnapshotStore`] atomically, so readers see either the old or the new
//! snapshot in full.

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use formwright_core::{EngineError, EngineResult, Warning};
use formwright_ir::naming::{humanize, pluralize, title_case};
use formwright_ir::{ActionSet, DefaultsConfig, Node, OptionResolver, RenderContext, RenderMode, Resource};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

// ============================================================================
// Snapshot
// ============================================================================

/// A layout tree with the resource it places fields from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposedLayout {
    /// Resource whose fields the leaves name
    pub resource: Option<String>,

    /// Root node
    pub root: Node,
}

/// Immutable result of one composition
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Unique per composition
    pub id: Uuid,

    /// When composition finished
    pub composed_at: DateTime<Utc>,

    /// Resources in output order
    pub resources: IndexMap<String, Resource>,

    /// Layouts by name
    pub layouts: IndexMap<String, ComposedLayout>,

    /// Action lists per resource
    pub actions: IndexMap<String, ActionSet>,

    /// Recoverable problems found while composing
    pub warnings: Vec<Warning>,

    /// Option defaults in effect
    pub defaults: DefaultsConfig,
}

impl Snapshot {
    /// Stamp a new snapshot
    pub fn new(
        resources: IndexMap<String, Resource>,
        layouts: IndexMap<String, ComposedLayout>,
        actions: IndexMap<String, ActionSet>,
        warnings: Vec<Warning>,
        defaults: DefaultsConfig,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            composed_at: Utc::now(),
            resources,
            layouts,
            actions,
            warnings,
            defaults,
        }
    }

    /// A snapshot with nothing in it
    pub fn empty() -> Self {
        Self::new(
            IndexMap::new(),
            IndexMap::new(),
            IndexMap::new(),
            Vec::new(),
            DefaultsConfig::default(),
        )
    }

    // ====================================================================
    // Lookups
    // ====================================================================

    pub fn resource(&self, name: &str) -> EngineResult<&Resource> {
        self.resources
            .get(name)
            .ok_or_else(|| EngineError::ResourceNotFound(name.to_string()))
    }

    pub fn layout(&self, name: &str) -> EngineResult<&ComposedLayout> {
        self.layouts
            .get(name)
            .ok_or_else(|| EngineError::LayoutNotFound(name.to_string()))
    }

    pub fn actions_for(&self, resource: &str) -> Option<&ActionSet> {
        self.actions.get(resource)
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    // ====================================================================
    // Rendering support
    // ====================================================================

    /// Resolver over this snapshot's defaults
    pub fn resolver(&self) -> OptionResolver {
        OptionResolver::new(self.defaults.clone())
    }

    /// Render context for a layout
    ///
    /// The mode follows the root tag; non-page roots render as forms.
    pub fn render_context(&self, layout: &ComposedLayout) -> EngineResult<RenderContext<'_>> {
        let mode = RenderMode::for_tag(&layout.root.tag).unwrap_or(RenderMode::Form);
        match &layout.resource {
            Some(name) => Ok(RenderContext::for_resource(mode, self.resource(name)?)),
            None => {
                let name = &layout.root.name;
                Ok(RenderContext::new(
                    mode,
                    name.clone(),
                    humanize(name),
                    pluralize(&title_case(name)),
                ))
            }
        }
    }

    /// Resolve one option of a named node inside a named layout
    ///
    /// `Ok(None)` means no explicit value and no default exists.
    pub fn resolve_option(&self, layout: &str, node: &str, key: &str) -> EngineResult<Option<Value>> {
        let composed = self.layout(layout)?;
        let target = composed.root.find(node).ok_or_else(|| {
            EngineError::with_context(format!("layout '{}'", layout), format!("no node named '{}'", node))
        })?;
        let ctx = self.render_context(composed)?;
        Ok(self.resolver().resolve(&ctx, target, key))
    }
}

// ============================================================================
// SnapshotStore
// ============================================================================

/// Holds the current snapshot and swaps in new ones atomically
#[derive(Debug)]
pub struct SnapshotStore {
    current: ArcSwap<Snapshot>,
}

impl SnapshotStore {
    /// Start from a composed snapshot
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
        }
    }

    /// The current snapshot
    pub fn load(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Publish a new snapshot, returning the one it replaced
    pub fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        self.swap_in(Arc::new(snapshot))
    }

    /// Re-compose and publish; on error the current snapshot stays
    ///
    /// Returns the snapshot this call composed, even if another publisher
    /// has already replaced it.
    pub fn refresh<F>(&self, compose: F) -> EngineResult<Arc<Snapshot>>
    where
        F: FnOnce() -> EngineResult<Snapshot>,
    {
        let snapshot = Arc::new(compose()?);
        self.swap_in(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    fn swap_in(&self, snapshot: Arc<Snapshot>) -> Arc<Snapshot> {
        let id = snapshot.id;
        let previous = self.current.swap(snapshot);
        tracing::info!(snapshot = %id, replaced = %previous.id, "Published snapshot");
        previous
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(Snapshot::empty())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use formwright_ir::Tag;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn with_layout() -> Snapshot {
        let mut snapshot = Snapshot::empty();
        snapshot.layouts.insert(
            "dashboard".into(),
            ComposedLayout {
                resource: None,
                root: Node::container(Tag::Index, "report")
                    .with_child(Node::container(Tag::Group, "totals_by_month")),
            },
        );
        snapshot
    }

    #[test]
    fn test_snapshots_get_distinct_ids() {
        assert_ne!(Snapshot::empty().id, Snapshot::empty().id);
    }

    #[test]
    fn test_lookup_errors() {
        let snapshot = Snapshot::empty();
        assert!(snapshot.resource("product").unwrap_err().is_not_found());
        assert!(snapshot.layout("product_form").unwrap_err().is_not_found());
        assert!(snapshot.actions_for("product").is_none());
    }

    #[test]
    fn test_resolve_option_without_resource() {
        let snapshot = with_layout();
        assert_eq!(
            snapshot.resolve_option("dashboard", "report", "page_title").unwrap(),
            Some(json!("Listing Reports"))
        );
        assert_eq!(
            snapshot.resolve_option("dashboard", "totals_by_month", "title").unwrap(),
            Some(json!("Totals by month"))
        );
        assert_eq!(snapshot.resolve_option("dashboard", "report", "nope").unwrap(), None);
        assert!(snapshot.resolve_option("dashboard", "missing", "title").is_err());
    }

    #[test]
    fn test_store_publish_swaps_whole_snapshot() {
        let store = SnapshotStore::default();
        let before = store.load();

        let previous = store.publish(with_layout());
        assert_eq!(previous.id, before.id);

        let after = store.load();
        assert_ne!(after.id, before.id);
        assert!(after.layouts.contains_key("dashboard"));
        // readers holding the old Arc keep a complete view
        assert!(before.layouts.is_empty());
    }

    #[test]
    fn test_failed_refresh_keeps_current() {
        let store = SnapshotStore::new(with_layout());
        let current = store.load().id;

        let result = store.refresh(|| Err(EngineError::internal("boom")));
        assert!(result.is_err());
        assert_eq!(store.load().id, current);

        let refreshed = store.refresh(|| Ok(Snapshot::empty())).unwrap();
        assert_ne!(refreshed.id, current);
    }

    #[test]
    fn test_refresh_returns_the_snapshot_it_composed() {
        let store = SnapshotStore::default();
        let mut composed_id = None;

        let refreshed = store
            .refresh(|| {
                let snapshot = with_layout();
                composed_id = Some(snapshot.id);
                Ok(snapshot)
            })
            .unwrap();
        assert_eq!(Some(refreshed.id), composed_id);
        assert!(Arc::ptr_eq(&refreshed, &store.load()));

        store.publish(Snapshot::empty());
        assert_eq!(Some(refreshed.id), composed_id);
        assert!(refreshed.layouts.contains_key("dashboard"));
    }

    #[test]
    fn test_snapshot_serializes() {
        let value = serde_json::to_value(with_layout()).unwrap();
        assert_eq!(value["layouts"]["dashboard"]["root"]["tag"], json!("index"));
        assert!(value["id"].is_string());
    }
}
