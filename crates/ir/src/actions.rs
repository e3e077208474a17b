//! Action lists
//!
//! Every layout region (index header, form footer, association rows, ...)
//! carries an ordered list of named actions. Users adjust the built-in
//! defaults with remove/add/insert/replace directives, applied per group in
//! that fixed order.

use formwright_core::{Diagnostics, EngineError, EngineResult, Validatable, Warning, WarningCode};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// Groups
// ============================================================================

/// Layout an action group belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    Index,
    Show,
    Form,
    OneToMany,
    EmbedsMany,
}

impl LayoutKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutKind::Index => "index",
            LayoutKind::Show => "show",
            LayoutKind::Form => "form",
            LayoutKind::OneToMany => "one_to_many",
            LayoutKind::EmbedsMany => "embeds_many",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "index" => Some(LayoutKind::Index),
            "show" => Some(LayoutKind::Show),
            "form" => Some(LayoutKind::Form),
            "one_to_many" => Some(LayoutKind::OneToMany),
            "embeds_many" => Some(LayoutKind::EmbedsMany),
            _ => None,
        }
    }
}

/// Region within a layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    Header,
    Footer,
    Row,
    Selected,
    Filters,
}

impl Placement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Placement::Header => "header",
            Placement::Footer => "footer",
            Placement::Row => "row",
            Placement::Selected => "selected",
            Placement::Filters => "filters",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "header" => Some(Placement::Header),
            "footer" => Some(Placement::Footer),
            "row" => Some(Placement::Row),
            "selected" => Some(Placement::Selected),
            "filters" => Some(Placement::Filters),
            _ => None,
        }
    }
}

/// A `(layout, placement)` pair, written `layout_placement` (e.g. `one_to_many_row`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActionGroup(pub LayoutKind, pub Placement);

impl ActionGroup {
    pub fn new(layout: LayoutKind, placement: Placement) -> Self {
        Self(layout, placement)
    }

    pub fn layout(&self) -> LayoutKind {
        self.0
    }

    pub fn placement(&self) -> Placement {
        self.1
    }
}

impl std::str::FromStr for ActionGroup {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Placement names never contain '_', layout names may
        let (layout, placement) = s
            .rsplit_once('_')
            .ok_or_else(|| EngineError::InvalidActionGroup(s.to_string()))?;
        match (LayoutKind::parse(layout), Placement::parse(placement)) {
            (Some(l), Some(p)) => Ok(Self(l, p)),
            _ => Err(EngineError::InvalidActionGroup(s.to_string())),
        }
    }
}

impl TryFrom<String> for ActionGroup {
    type Error = EngineError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ActionGroup> for String {
    fn from(group: ActionGroup) -> Self {
        group.to_string()
    }
}

impl std::fmt::Display for ActionGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.0.as_str(), self.1.as_str())
    }
}

// ============================================================================
// Actions and directives
// ============================================================================

/// Reference to the function the renderer invokes for an action
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandlerRef(pub String);

impl HandlerRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for HandlerRef {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A named, handler-bound operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    pub handler: HandlerRef,
}

impl Action {
    pub fn new(name: impl Into<String>, handler: impl Into<HandlerRef>) -> Self {
        Self {
            name: name.into(),
            handler: handler.into(),
        }
    }
}

/// One mutation of a default action list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ActionDirective {
    Remove { name: String },
    Add { name: String, handler: HandlerRef },
    Insert { name: String, handler: HandlerRef },
    Replace { name: String, handler: HandlerRef },
}

impl ActionDirective {
    pub fn remove(name: impl Into<String>) -> Self {
        ActionDirective::Remove { name: name.into() }
    }

    pub fn add(name: impl Into<String>, handler: impl Into<HandlerRef>) -> Self {
        ActionDirective::Add {
            name: name.into(),
            handler: handler.into(),
        }
    }

    pub fn insert(name: impl Into<String>, handler: impl Into<HandlerRef>) -> Self {
        ActionDirective::Insert {
            name: name.into(),
            handler: handler.into(),
        }
    }

    pub fn replace(name: impl Into<String>, handler: impl Into<HandlerRef>) -> Self {
        ActionDirective::Replace {
            name: name.into(),
            handler: handler.into(),
        }
    }

    /// Target action name
    pub fn name(&self) -> &str {
        match self {
            ActionDirective::Remove { name }
            | ActionDirective::Add { name, .. }
            | ActionDirective::Insert { name, .. }
            | ActionDirective::Replace { name, .. } => name,
        }
    }
}

// ============================================================================
// ActionSet
// ============================================================================

/// Composed action lists keyed by group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionSet {
    groups: IndexMap<ActionGroup, Vec<Action>>,
}

impl ActionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Actions of a group (empty when the group is absent)
    pub fn get(&self, group: ActionGroup) -> &[Action] {
        self.groups.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Action names of a group, in order
    pub fn names(&self, group: ActionGroup) -> Vec<&str> {
        self.get(group).iter().map(|a| a.name.as_str()).collect()
    }

    /// Groups in composition order
    pub fn groups(&self) -> impl Iterator<Item = (&ActionGroup, &Vec<Action>)> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn insert(&mut self, group: ActionGroup, actions: Vec<Action>) {
        self.groups.insert(group, actions);
    }
}

impl Validatable for ActionSet {
    fn validate(&self) -> EngineResult<()> {
        for (group, actions) in &self.groups {
            let mut seen = HashSet::new();
            for action in actions {
                if !seen.insert(action.name.as_str()) {
                    return Err(EngineError::ActionValidation {
                        group: group.to_string(),
                        message: format!("action '{}' appears more than once", action.name),
                    });
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Composition
// ============================================================================

/// Apply directives to the defaults of every group
///
/// Default groups keep their order; groups that only have directives are
/// appended after them and start from an empty list.
pub fn compose_actions(
    defaults: &IndexMap<ActionGroup, Vec<Action>>,
    directives: &IndexMap<ActionGroup, Vec<ActionDirective>>,
    diagnostics: &mut Diagnostics,
) -> ActionSet {
    let mut set = ActionSet::new();

    for (group, base) in defaults {
        let ops = directives.get(group).map(Vec::as_slice).unwrap_or(&[]);
        set.insert(*group, compose_group(*group, base, ops, diagnostics));
    }
    for (group, ops) in directives {
        if !defaults.contains_key(group) {
            set.insert(*group, compose_group(*group, &[], ops, diagnostics));
        }
    }

    tracing::debug!(groups = set.len(), "Composed action lists");
    set
}

/// Apply one group's directives: removes, adds, inserts, then replaces
pub fn compose_group(
    group: ActionGroup,
    base: &[Action],
    directives: &[ActionDirective],
    diagnostics: &mut Diagnostics,
) -> Vec<Action> {
    let mut list = base.to_vec();

    for directive in directives {
        if let ActionDirective::Remove { name } = directive {
            match list.iter().position(|a| &a.name == name) {
                Some(pos) => {
                    list.remove(pos);
                }
                None => diagnostics.warn(
                    Warning::new(
                        WarningCode::MissingAction,
                        format!("cannot remove '{}': no such action", name),
                    )
                    .with_path(group.to_string()),
                ),
            }
        }
    }

    for directive in directives {
        if let ActionDirective::Add { name, handler } = directive {
            match list.iter_mut().find(|a| &a.name == name) {
                Some(existing) => existing.handler = handler.clone(),
                None => list.push(Action::new(name.clone(), handler.clone())),
            }
        }
    }

    let mut head: Vec<Action> = Vec::new();
    for directive in directives {
        if let ActionDirective::Insert { name, handler } = directive {
            match head.iter_mut().chain(list.iter_mut()).find(|a| &a.name == name) {
                Some(existing) => existing.handler = handler.clone(),
                None => head.push(Action::new(name.clone(), handler.clone())),
            }
        }
    }
    head.append(&mut list);
    let mut list = head;

    for directive in directives {
        if let ActionDirective::Replace { name, handler } = directive {
            match list.iter_mut().find(|a| &a.name == name) {
                Some(existing) => existing.handler = handler.clone(),
                None => list.push(Action::new(name.clone(), handler.clone())),
            }
        }
    }

    list
}

/// Built-in action lists per group
pub fn default_actions() -> IndexMap<ActionGroup, Vec<Action>> {
    use LayoutKind::*;
    use Placement::*;

    let list = |names: &[&str]| -> Vec<Action> {
        names
            .iter()
            .map(|n| Action::new(*n, HandlerRef::new(format!("default:{}", n))))
            .collect()
    };

    IndexMap::from([
        (ActionGroup(Index, Header), list(&["new"])),
        (ActionGroup(Index, Row), list(&["show", "edit", "delete"])),
        (ActionGroup(Index, Selected), list(&["delete_selected"])),
        (ActionGroup(Index, Filters), list(&["apply_filters", "clear_filters"])),
        (ActionGroup(Show, Header), list(&["edit", "back"])),
        (ActionGroup(Form, Footer), list(&["save", "cancel"])),
        (ActionGroup(OneToMany, Header), list(&["new"])),
        (ActionGroup(OneToMany, Row), list(&["show", "edit", "delete"])),
        (ActionGroup(EmbedsMany, Header), list(&["add"])),
        (ActionGroup(EmbedsMany, Row), list(&["remove"])),
    ])
}

// ============================================================================
// Tests
// ============================================================================
