//! # Composition Context
//!
//! The `CompositionContext` indexes a [`DeclarationSet`] before anything is
//! composed:
//!
//! - schema lookup by identity (duplicates rejected)
//! - the resource plan: declared resources in order, each followed by the
//!   nested `parent__embed` resources its schema's embeds produce
//! - resource stubs used to resolve relation targets
//! - the expression registry layouts are evaluated against
//!

use crate::declaration::{DeclarationSet, LayoutDecl, ResourceDecl};
use crate::ComposeConfig;
use formwright_core::{Diagnostics, EngineError, EngineResult, Warning, WarningCode};
use formwright_ir::naming::nested_resource_name;
use formwright_ir::{ExprRegistry, Resource, SchemaDescriptor};
use indexmap::{IndexMap, IndexSet};

// ============================================================================
// PlannedResource
// ============================================================================

/// A resource the composer will build
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedResource {
    /// Resource name
    pub name: String,

    /// Schema identity
    pub schema: String,

    /// Owning context/module
    pub context: Option<String>,

    /// Declaration supplying overrides and action directives, if any
    pub decl: Option<ResourceDecl>,

    /// Created for an embed rather than declared
    pub nested: bool,
}

// ============================================================================
// CompositionContext
// ============================================================================

/// Indexed declarations ready for composition
#[derive(Debug, Clone)]
pub struct CompositionContext {
    /// Effective configuration
    pub config: ComposeConfig,

    // ── schemas ──────────────────────────────────────────────────────────
    /// Schemas by identity, declaration order
    schemas: IndexMap<String, SchemaDescriptor>,

    // ── resources ────────────────────────────────────────────────────────
    /// Resources to build, in output order
    plan: IndexMap<String, PlannedResource>,

    // ── layouts ──────────────────────────────────────────────────────────
    /// Layout declarations by name
    layouts: IndexMap<String, LayoutDecl>,

    // ── expressions ──────────────────────────────────────────────────────
    /// Constants and functions for layout options
    registry: ExprRegistry,
}

impl CompositionContext {
    // ====================================================================
    // Construction
    // ====================================================================

    /// Index a declaration set
    ///
    /// Embed targets that are not declared are reported through
    /// `diagnostics` and get no nested resource.
    pub fn from_declarations(
        set: DeclarationSet,
        config: ComposeConfig,
        registry: ExprRegistry,
        diagnostics: &mut Diagnostics,
    ) -> EngineResult<Self> {
        let mut schemas = IndexMap::with_capacity(set.schemas.len());
        for mut schema in set.schemas {
            if schemas.contains_key(&schema.name) {
                return Err(EngineError::DuplicateSchema(schema.name));
            }
            schema.fill_default_keys();
            schemas.insert(schema.name.clone(), schema);
        }

        let mut declared: IndexMap<String, ResourceDecl> = IndexMap::with_capacity(set.resources.len());
        for decl in set.resources {
            if declared.contains_key(&decl.name) {
                return Err(EngineError::DuplicateResource(decl.name));
            }
            declared.insert(decl.name.clone(), decl);
        }

        let mut layouts = IndexMap::with_capacity(set.layouts.len());
        for layout in set.layouts {
            if layouts.contains_key(&layout.name) {
                return Err(EngineError::DuplicateLayout(layout.name));
            }
            layouts.insert(layout.name.clone(), layout);
        }

        let mut registry = registry;
        registry.extend_constants(set.constants);

        let mut ctx = Self {
            config,
            schemas,
            plan: IndexMap::new(),
            layouts,
            registry,
        };
        ctx.plan_resources(&declared, diagnostics)?;

        tracing::debug!(
            schemas = ctx.schemas.len(),
            resources = ctx.plan.len(),
            layouts = ctx.layouts.len(),
            "Built composition context"
        );
        Ok(ctx)
    }

    fn plan_resources(
        &mut self,
        declared: &IndexMap<String, ResourceDecl>,
        diagnostics: &mut Diagnostics,
    ) -> EngineResult<()> {
        for decl in declared.values() {
            if self.plan.contains_key(&decl.name) {
                continue;
            }
            if !self.schemas.contains_key(&decl.schema) {
                return Err(EngineError::SchemaNotFound(format!(
                    "{} (referenced by resource '{}')",
                    decl.schema, decl.name
                )));
            }
            self.plan.insert(
                decl.name.clone(),
                PlannedResource {
                    name: decl.name.clone(),
                    schema: decl.schema.clone(),
                    context: decl.context.clone(),
                    decl: Some(decl.clone()),
                    nested: false,
                },
            );
            if self.config.nested_resources {
                let mut chain = IndexSet::from([decl.schema.clone()]);
                self.plan_nested(&decl.name, &decl.schema, decl.context.as_deref(), declared, &mut chain, diagnostics)?;
            }
        }
        Ok(())
    }

    /// Register `parent__embed` resources, depth-first
    ///
    /// `chain` holds the schemas on the current embed path; an embed that
    /// points back into it is not expanded again.
    fn plan_nested(
        &mut self,
        parent: &str,
        schema_name: &str,
        context: Option<&str>,
        declared: &IndexMap<String, ResourceDecl>,
        chain: &mut IndexSet<String>,
        diagnostics: &mut Diagnostics,
    ) -> EngineResult<()> {
        let embeds = match self.schemas.get(schema_name) {
            Some(schema) => schema.embeds.clone(),
            None => return Ok(()),
        };

        for embed in embeds {
            let nested = nested_resource_name(parent, &embed.field);
            if !self.schemas.contains_key(&embed.related) {
                diagnostics.warn(
                    Warning::new(
                        WarningCode::UnknownEmbedSchema,
                        format!(
                            "embed '{}' uses undeclared schema '{}'; no nested resource is registered",
                            embed.field, embed.related
                        ),
                    )
                    .with_path(format!("{}.fields.{}", parent, embed.field)),
                );
                continue;
            }
            if chain.contains(&embed.related) || self.plan.contains_key(&nested) {
                continue;
            }

            let decl = declared.get(&nested).cloned();
            if let Some(d) = &decl {
                if d.schema != embed.related {
                    return Err(EngineError::resource_validation(
                        &nested,
                        format!(
                            "declared with schema '{}' but the embed uses '{}'",
                            d.schema, embed.related
                        ),
                    ));
                }
            }

            self.plan.insert(
                nested.clone(),
                PlannedResource {
                    name: nested.clone(),
                    schema: embed.related.clone(),
                    context: context.map(str::to_string),
                    decl,
                    nested: true,
                },
            );

            chain.insert(embed.related.clone());
            self.plan_nested(&nested, &embed.related, context, declared, chain, diagnostics)?;
            chain.pop();
        }
        Ok(())
    }

    // ====================================================================
    // Accessors
    // ====================================================================

    /// Look up a schema
    pub fn schema(&self, name: &str) -> EngineResult<&SchemaDescriptor> {
        self.schemas
            .get(name)
            .ok_or_else(|| EngineError::SchemaNotFound(name.to_string()))
    }

    /// All schemas, declaration order
    pub fn schemas(&self) -> impl Iterator<Item = &SchemaDescriptor> {
        self.schemas.values()
    }

    /// Resources to build, in output order
    pub fn planned(&self) -> impl Iterator<Item = &PlannedResource> {
        self.plan.values()
    }

    /// Check if a resource will be built
    pub fn has_resource(&self, name: &str) -> bool {
        self.plan.contains_key(name)
    }

    /// Field-less resources used to resolve relation targets
    ///
    /// Declared resources come before nested ones so a relation never
    /// resolves to an embed namespace when a top-level resource exists.
    pub fn resource_stubs(&self) -> Vec<Resource> {
        let (nested, top): (Vec<_>, Vec<_>) = self.plan.values().partition(|p| p.nested);
        top.into_iter()
            .chain(nested)
            .map(|p| Resource::new(p.name.clone(), p.schema.clone()))
            .collect()
    }

    /// Layout declarations, declaration order
    pub fn layouts(&self) -> impl Iterator<Item = &LayoutDecl> {
        self.layouts.values()
    }

    /// Expression registry for layout options
    pub fn registry(&self) -> &ExprRegistry {
        &self.registry
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn shop() -> DeclarationSet {
        DeclarationSet::new()
            .with_schema(
                SchemaDescriptor::new("Shop.Order")
                    .attribute("reference", "string")
                    .embeds_one("address", "Shop.Address")
                    .embeds_many("notes", "Shop.Note"),
            )
            .with_schema(
                SchemaDescriptor::new("Shop.Address")
                    .attribute("street", "string")
                    .embeds_one("geo", "Shop.Geo"),
            )
            .with_schema(SchemaDescriptor::new("Shop.Geo").attribute("lat", "float"))
            .with_resource(ResourceDecl::new("order", "Shop.Order"))
            .with_resource(ResourceDecl::new("address", "Shop.Address"))
    }

    fn build(set: DeclarationSet) -> EngineResult<(CompositionContext, Diagnostics)> {
        let mut diags = Diagnostics::new();
        let ctx = CompositionContext::from_declarations(set, ComposeConfig::default(), ExprRegistry::new(), &mut diags)?;
        Ok((ctx, diags))
    }

    #[test]
    fn test_nested_resources_follow_their_parent() {
        let (ctx, diags) = build(shop()).unwrap();
        let names: Vec<_> = ctx.planned().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            ["order", "order__address", "order__address__geo", "address", "address__geo"]
        );
        assert_eq!(diags.count(WarningCode::UnknownEmbedSchema), 1);
    }

    #[test]
    fn test_stubs_prefer_declared_resources() {
        let (ctx, _) = build(shop()).unwrap();
        let stubs = ctx.resource_stubs();
        let address = stubs.iter().find(|r| r.schema == "Shop.Address").unwrap();
        assert_eq!(address.name, "address");
    }

    #[test]
    fn test_declared_nested_resource_supplies_overrides() {
        let set = shop().with_resource(ResourceDecl::new("order__address", "Shop.Address").with_override(
            formwright_ir::FieldOverride::new("street", formwright_ir::FieldPatch::new().label("Street line")),
        ));
        let (ctx, _) = build(set).unwrap();
        let nested = ctx.planned().find(|p| p.name == "order__address").unwrap();
        assert!(nested.nested);
        assert_eq!(nested.decl.as_ref().map(|d| d.overrides.len()), Some(1));
        assert_eq!(ctx.planned().filter(|p| p.name == "order__address").count(), 1);
    }

    #[test]
    fn test_nested_declaration_with_wrong_schema() {
        let set = shop().with_resource(ResourceDecl::new("order__address", "Shop.Geo"));
        assert!(build(set).unwrap_err().is_validation());
    }

    #[test]
    fn test_self_embedding_schema_terminates() {
        let set = DeclarationSet::new()
            .with_schema(SchemaDescriptor::new("Tree.Node").embeds_many("children", "Tree.Node"))
            .with_resource(ResourceDecl::new("node", "Tree.Node"));
        let (ctx, _) = build(set).unwrap();
        assert_eq!(ctx.planned().count(), 1);
    }

    #[test]
    fn test_nested_resources_can_be_disabled() {
        let mut diags = Diagnostics::new();
        let ctx = CompositionContext::from_declarations(
            shop(),
            ComposeConfig::new().without_nested_resources(),
            ExprRegistry::new(),
            &mut diags,
        )
        .unwrap();
        assert_eq!(ctx.planned().count(), 2);
    }

    #[test]
    fn test_duplicates_and_unknown_schemas_are_fatal() {
        let err = build(shop().with_resource(ResourceDecl::new("order", "Shop.Order"))).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateResource(ref n) if n == "order"));

        let err = build(shop().with_schema(SchemaDescriptor::new("Shop.Geo"))).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateSchema(_)));

        let err = build(shop().with_resource(ResourceDecl::new("ghost", "Shop.Ghost"))).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_constants_join_the_registry() {
        let (ctx, _) = build(shop().with_constant("WIDE", "col-span-2")).unwrap();
        assert_eq!(ctx.registry().constant("WIDE"), Some(&serde_json::json!("col-span-2")));
    }
}
