//! # Composer
//!
//! The `Composer` is the top-level entry point. It takes a
//! [`DeclarationSet`], builds a [`CompositionContext`], and runs every
//! resource, layout and action group through the pipeline.
//!
//! ## Pipeline
//!
//! ```text
//! DeclarationSet + ComposeConfig
//!         │
//!         ▼
//!   CompositionContext::from_declarations()
//!         │
//!         ├──► build_catalogue → merge_schema_overrides → expand_associations (per resource)
//!         ├──► compose_actions                                          (per resource)
//!         ├──► LayoutBuilder::build                                     (per layout)
//!         │
//!         ▼
//!   Snapshot { resources, layouts, actions, warnings }
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use formwright_compose::{Composer, ComposeConfig, load_declarations};
//!
//! let set = load_declarations("declarations/")?;
//! let snapshot = Composer::new(ComposeConfig::default()).compose(set)?;
//!
//! println!("Composed {} resources", snapshot.resources.len());
//! ```

use crate::context::{CompositionContext, PlannedResource};
use crate::declaration::{DeclarationSet, LayoutDecl};
use crate::snapshot::{ComposedLayout, Snapshot};
use crate::ComposeConfig;
use formwright_core::{Diagnostics, EngineError, EngineResult, Validatable, Warning, WarningCode};
use formwright_ir::{
    ActionSet, ExprRegistry, LayoutBuilder, Resource, build_catalogue, compose_actions,
    default_actions, expand_associations, merge_schema_overrides,
};
use indexmap::IndexMap;

// ============================================================================
// Composer
// ============================================================================

/// Runs the composition pipeline
///
/// Stateless aside from its configuration and expression registry; every
/// call to [`compose`](Composer::compose) yields a fresh snapshot.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    config: ComposeConfig,
    registry: ExprRegistry,
}

impl Composer {
    // ====================================================================
    // Construction
    // ====================================================================

    /// Create a composer with the given configuration
    pub fn new(config: ComposeConfig) -> Self {
        Self {
            config,
            registry: ExprRegistry::new(),
        }
    }

    /// Create a composer with default configuration
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Use a registry of constants and functions for layout options
    pub fn with_registry(mut self, registry: ExprRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Get the current configuration
    pub fn config(&self) -> &ComposeConfig {
        &self.config
    }

    // ====================================================================
    // Composition
    // ====================================================================

    /// Compose a declaration set into a snapshot
    ///
    /// # Errors
    ///
    /// Structural problems (malformed layouts, unknown schemas, duplicate
    /// names) fail the whole composition; nothing partial is returned. In
    /// strict mode any warning fails it too.
    pub fn compose(&self, set: DeclarationSet) -> EngineResult<Snapshot> {
        let mut diagnostics = Diagnostics::new();
        let ctx = CompositionContext::from_declarations(
            set,
            self.config.clone(),
            self.registry.clone(),
            &mut diagnostics,
        )?;

        // ── 1. Resources ─────────────────────────────────────────────────
        let stubs = ctx.resource_stubs();
        let mut resources = IndexMap::new();
        let mut actions = IndexMap::new();
        for planned in ctx.planned() {
            let resource = self.compose_resource(&ctx, planned, &stubs, &mut diagnostics)?;
            let action_set = self.compose_resource_actions(planned, &mut diagnostics)?;
            actions.insert(planned.name.clone(), action_set);
            resources.insert(planned.name.clone(), resource);
        }

        // ── 2. Layouts ───────────────────────────────────────────────────
        let mut layouts = IndexMap::new();
        for decl in ctx.layouts() {
            let layout = self.compose_layout(&ctx, decl, &resources, &mut diagnostics)?;
            layouts.insert(decl.name.clone(), layout);
        }

        // ── 3. Strict mode ───────────────────────────────────────────────
        if self.config.strict {
            if let Some(first) = diagnostics.warnings().first() {
                return Err(EngineError::StrictWarnings {
                    count: diagnostics.warnings().len(),
                    first: first.to_string(),
                });
            }
        }

        let snapshot = Snapshot::new(
            resources,
            layouts,
            actions,
            diagnostics.into_warnings(),
            self.config.defaults.clone(),
        );
        tracing::info!(
            snapshot = %snapshot.id,
            resources = snapshot.resources.len(),
            layouts = snapshot.layouts.len(),
            warnings = snapshot.warnings.len(),
            "Composition complete"
        );
        Ok(snapshot)
    }

    fn compose_resource(
        &self,
        ctx: &CompositionContext,
        planned: &PlannedResource,
        stubs: &[Resource],
        diagnostics: &mut Diagnostics,
    ) -> EngineResult<Resource> {
        let schema = ctx.schema(&planned.schema)?;
        let overrides = planned.decl.as_ref().map(|d| d.overrides.as_slice()).unwrap_or(&[]);

        let catalogue = build_catalogue(schema, Some(&planned.name));
        let fields = merge_schema_overrides(&planned.name, schema, catalogue, overrides, diagnostics);

        let mut resource = Resource::new(planned.name.clone(), planned.schema.clone()).with_fields(fields);
        resource.context = planned.context.clone();

        let resource = expand_associations(resource, schema, stubs, diagnostics);
        resource.validate()?;
        Ok(resource)
    }

    fn compose_resource_actions(
        &self,
        planned: &PlannedResource,
        diagnostics: &mut Diagnostics,
    ) -> EngineResult<ActionSet> {
        let defaults = if self.config.default_actions {
            default_actions()
        } else {
            IndexMap::new()
        };
        let empty = IndexMap::new();
        let directives = planned.decl.as_ref().map(|d| &d.actions).unwrap_or(&empty);

        let mut local = Diagnostics::new();
        let set = compose_actions(&defaults, directives, &mut local);
        set.validate()?;
        diagnostics.merge_scoped(local, &format!("{}.actions", planned.name));
        Ok(set)
    }

    fn compose_layout(
        &self,
        ctx: &CompositionContext,
        decl: &LayoutDecl,
        resources: &IndexMap<String, Resource>,
        diagnostics: &mut Diagnostics,
    ) -> EngineResult<ComposedLayout> {
        let owner = match &decl.resource {
            Some(name) => Some(
                resources
                    .get(name)
                    .ok_or_else(|| EngineError::ResourceNotFound(format!("{} (used by layout '{}')", name, decl.name)))?,
            ),
            None => None,
        };

        let root = LayoutBuilder::new(&decl.name, ctx.registry()).build(&decl.declaration)?;

        if let Some(resource) = owner {
            for leaf in root.leaves() {
                if !resource.has_field(&leaf.name) {
                    diagnostics.warn(
                        Warning::new(
                            WarningCode::UnknownField,
                            format!("layout places '{}' which resource '{}' does not have", leaf.name, resource.name),
                        )
                        .with_path(format!("layouts.{}.{}", decl.name, leaf.name)),
                    );
                }
            }
        }

        Ok(ComposedLayout {
            resource: decl.resource.clone(),
            root,
        })
    }
}

/// Compose with the configuration carried by the declarations
pub fn compose(set: DeclarationSet) -> EngineResult<Snapshot> {
    let config = set.config.clone().unwrap_or_default();
    Composer::new(config).compose(set)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::ResourceDecl;
    use formwright_core::{HtmlType, SemanticType};
    use formwright_ir::{
        ActionDirective, ActionGroup, FieldOverride, FieldPatch, LayoutKind, Placement, SchemaDescriptor,
    };
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn shop() -> DeclarationSet {
        DeclarationSet::new()
            .with_schema(
                SchemaDescriptor::new("Shop.Order")
                    .attribute("id", "id")
                    .attribute("reference", "string")
                    .attribute("inserted_at", "naive_datetime")
                    .has_many("line_items", "Shop.LineItem")
                    .embeds_one("address", "Shop.Address"),
            )
            .with_schema(
                SchemaDescriptor::new("Shop.LineItem")
                    .attribute("id", "id")
                    .attribute("price", "decimal")
                    .belongs_to("order", "Shop.Order"),
            )
            .with_schema(SchemaDescriptor::new("Shop.Address").attribute("street", "string"))
            .with_resource(
                ResourceDecl::new("order", "Shop.Order")
                    .with_override(FieldOverride::new("reference", FieldPatch::new().label("Order #")))
                    .with_action(
                        ActionGroup(LayoutKind::Index, Placement::Row),
                        ActionDirective::remove("delete"),
                    ),
            )
            .with_resource(ResourceDecl::new("line_item", "Shop.LineItem"))
            .with_layout(
                LayoutDecl::new(
                    "order_form",
                    json!({"tag": "form", "name": "order", "children": [
                        {"tag": "group", "name": "basics", "children": ["reference", {"field": "line_items", "opts": {"label": "Items of {name}"}}]},
                        "address"
                    ]}),
                )
                .for_resource("order"),
            )
    }

    #[test]
    fn test_compose_shop() {
        let snapshot = Composer::with_defaults().compose(shop()).unwrap();

        let names: Vec<_> = snapshot.resources.keys().map(String::as_str).collect();
        assert_eq!(names, ["order", "order__address", "line_item"]);

        let order = snapshot.resource("order").unwrap();
        assert_eq!(
            order.fields_order(),
            ["line_items", "address", "reference", "id", "inserted_at"]
        );
        assert_eq!(order.field("reference").unwrap().label, "Order #");
        assert_eq!(order.field("line_items").unwrap().related_resource(), Some("line_item"));

        let line_item = snapshot.resource("line_item").unwrap();
        let price = line_item.field("price").unwrap();
        assert_eq!(price.field_type, SemanticType::Decimal);
        assert_eq!(price.html_type, HtmlType::Number);
        assert_eq!(line_item.field("order").unwrap().related_resource(), Some("order"));

        assert!(!snapshot.has_warnings());
    }

    #[test]
    fn test_actions_are_composed_per_resource() {
        let snapshot = Composer::with_defaults().compose(shop()).unwrap();
        let row = ActionGroup(LayoutKind::Index, Placement::Row);
        assert_eq!(snapshot.actions_for("order").unwrap().names(row), ["show", "edit"]);
        assert_eq!(
            snapshot.actions_for("line_item").unwrap().names(row),
            ["show", "edit", "delete"]
        );
    }

    #[test]
    fn test_layout_options_resolve_against_the_resource() {
        let snapshot = Composer::with_defaults().compose(shop()).unwrap();
        assert_eq!(
            snapshot.resolve_option("order_form", "line_items", "label").unwrap(),
            Some(json!("Items of Order"))
        );
        assert_eq!(
            snapshot.resolve_option("order_form", "reference", "label").unwrap(),
            Some(json!("Order #"))
        );
        assert_eq!(
            snapshot.resolve_option("order_form", "order", "page_subtitle").unwrap(),
            Some(json!("Use this form to manage Order records"))
        );
    }

    #[test]
    fn test_warnings_are_collected_with_scoped_paths() {
        let set = shop()
            .with_resource(
                ResourceDecl::new("customer", "Shop.Address")
                    .with_override(FieldOverride::new("nickname", FieldPatch::new()))
                    .with_action(
                        ActionGroup(LayoutKind::Form, Placement::Footer),
                        ActionDirective::remove("archive"),
                    ),
            )
            .with_layout(LayoutDecl::new("customer_show", json!({"tag": "show", "name": "customer", "children": ["ghost"]})).for_resource("customer"));

        let snapshot = Composer::with_defaults().compose(set).unwrap();
        let paths: Vec<_> = snapshot.warnings.iter().filter_map(|w| w.path.as_deref()).collect();
        assert_eq!(
            paths,
            [
                "customer.fields.nickname",
                "customer.actions.form_footer",
                "layouts.customer_show.ghost"
            ]
        );
    }

    #[test]
    fn test_strict_mode_turns_warnings_into_errors() {
        let set = shop().with_resource(
            ResourceDecl::new("broken", "Shop.Address")
                .with_override(FieldOverride::new("nope", FieldPatch::new())),
        );
        let err = Composer::new(ComposeConfig::new().strict()).compose(set).unwrap_err();
        match err {
            EngineError::StrictWarnings { count, first } => {
                assert_eq!(count, 1);
                assert!(first.contains("broken.fields.nope"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_strict_mode_accepts_association_overrides() {
        let set = shop().with_resource(
            ResourceDecl::new("archive", "Shop.Order")
                .with_override(FieldOverride::new("line_items", FieldPatch::new().label("Items")))
                .with_override(FieldOverride::new("address", FieldPatch::new().hidden(true))),
        );
        let snapshot = Composer::new(ComposeConfig::new().strict()).compose(set).unwrap();

        let archive = snapshot.resource("archive").unwrap();
        assert_eq!(&archive.fields_order()[..2], &["line_items", "address"]);
        let items = archive.field("line_items").unwrap();
        assert_eq!(items.label, "Items");
        assert_eq!(items.related_resource(), Some("line_item"));
        assert!(!snapshot.has_warnings());
    }

    #[test]
    fn test_embeds_link_to_nested_resources_only_when_built() {
        let snapshot = Composer::with_defaults().compose(shop()).unwrap();
        let address = snapshot.resource("order").unwrap().field("address").unwrap();
        assert_eq!(address.related_resource(), Some("order__address"));

        let snapshot = Composer::new(ComposeConfig::new().without_nested_resources())
            .compose(shop())
            .unwrap();
        assert!(snapshot.resource("order__address").is_err());
        let address = snapshot.resource("order").unwrap().field("address").unwrap();
        assert_eq!(address.related_resource(), None);
        assert_eq!(
            address.relation.as_ref().and_then(|r| r.nested_resource.as_deref()),
            Some("order__address")
        );
    }

    #[test]
    fn test_structural_errors_fail_composition() {
        let set = shop().with_layout(LayoutDecl::new("bad", json!({"tag": "form", "name": "x", "children": [42]})));
        assert!(Composer::with_defaults().compose(set).unwrap_err().is_structural());

        let set = shop().with_layout(LayoutDecl::new("orphan", json!("x")).for_resource("nobody"));
        assert!(Composer::with_defaults().compose(set).unwrap_err().is_not_found());

        let set = shop().with_layout(LayoutDecl::new("order_form", Value::Null));
        assert!(matches!(
            Composer::with_defaults().compose(set).unwrap_err(),
            EngineError::DuplicateLayout(_)
        ));
    }

    #[test]
    fn test_constants_and_functions_reach_layouts() {
        let set = shop()
            .with_constant("PAGE_SIZES", json!([10, 50]))
            .with_layout(LayoutDecl::new(
                "orders",
                json!({"tag": "index", "name": "orders", "opts": {
                    "page_sizes": {"$const": "PAGE_SIZES"},
                    "page_title": {"$fn": "badge"}
                }}),
            ).for_resource("order"));
        let registry = ExprRegistry::new().with_function("badge", |ctx| Value::from(format!("[{}]", ctx.title)));

        let snapshot = Composer::with_defaults().with_registry(registry).compose(set).unwrap();
        assert_eq!(snapshot.resolve_option("orders", "orders", "page_sizes").unwrap(), Some(json!([10, 50])));
        assert_eq!(snapshot.resolve_option("orders", "orders", "page_title").unwrap(), Some(json!("[Orders]")));
    }

    #[test]
    fn test_compose_uses_declared_config() {
        let set = shop().with_config(ComposeConfig::new().without_default_actions());
        let snapshot = compose(set).unwrap();
        assert!(snapshot.actions_for("order").unwrap().get(ActionGroup(LayoutKind::Form, Placement::Footer)).is_empty());
    }

    #[test]
    fn test_recomposition_yields_new_snapshot() {
        let composer = Composer::with_defaults();
        let first = composer.compose(shop()).unwrap();
        let second = composer.compose(shop()).unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(first.resources, second.resources);
    }
}
