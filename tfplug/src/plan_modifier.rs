//! Plan modifiers and the default planning pass
//!
//! [`plan_resource_change`] does what Terraform's framework does before a
//! resource gets to customise a plan: start from config, mark unset computed
//! attributes unknown, then run each attribute's plan modifiers against the
//! prior state.

use crate::schema::{Block, Schema};
use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

#[derive(Debug, Clone)]
pub struct PlanModifyRequest {
    pub path: AttributePath,
    pub state: Dynamic,
    pub plan: Dynamic,
    pub config: Dynamic,
    /// Compare values as sets rather than ordered lists
    pub set_semantics: bool,
}

#[derive(Debug, Clone)]
pub struct PlanModifyResponse {
    pub plan_value: Dynamic,
    pub requires_replace: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl PlanModifyResponse {
    fn unchanged(request: PlanModifyRequest) -> Self {
        Self {
            plan_value: request.plan,
            requires_replace: false,
            diagnostics: Vec::new(),
        }
    }
}

pub trait PlanModifier: Send + Sync {
    fn description(&self) -> String;

    fn modify_plan(&self, request: PlanModifyRequest) -> PlanModifyResponse;

    /// Whether this modifier can mark its attribute as force-new
    fn forces_replacement(&self) -> bool {
        false
    }
}

/// Marks an attribute as requiring replacement when it changes
pub struct RequiresReplaceIfChanged;

impl PlanModifier for RequiresReplaceIfChanged {
    fn description(&self) -> String {
        "requires replacement when changed".to_string()
    }

    fn modify_plan(&self, request: PlanModifyRequest) -> PlanModifyResponse {
        let requires_replace = !request.plan.is_unknown()
            && !values_equal(&request.state, &request.plan, request.set_semantics);

        PlanModifyResponse {
            requires_replace,
            ..PlanModifyResponse::unchanged(request)
        }
    }

    fn forces_replacement(&self) -> bool {
        true
    }
}

/// Keeps the prior state value for a computed attribute the config leaves
/// unset, instead of showing it as "known after apply".
pub struct UseStateForUnknown;

impl PlanModifier for UseStateForUnknown {
    fn description(&self) -> String {
        "uses prior state for unknown values".to_string()
    }

    fn modify_plan(&self, request: PlanModifyRequest) -> PlanModifyResponse {
        if request.plan.is_unknown() && !request.state.is_null() {
            let state = request.state.clone();
            return PlanModifyResponse {
                plan_value: state,
                ..PlanModifyResponse::unchanged(request)
            };
        }
        PlanModifyResponse::unchanged(request)
    }
}

pub fn values_equal(a: &Dynamic, b: &Dynamic, set_semantics: bool) -> bool {
    if set_semantics {
        a.set_equals(b)
    } else {
        a == b
    }
}

/// Result of the default planning pass
#[derive(Debug, Clone)]
pub struct PlannedChange {
    pub planned_state: DynamicValue,
    pub requires_replace: Vec<AttributePath>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Builds the planned state for `config` against `prior_state`.
///
/// A null config plans a destroy; a null prior state plans a create, in which
/// case plan modifiers are not run since there is nothing to compare with.
pub fn plan_resource_change(
    schema: &Schema,
    prior_state: &DynamicValue,
    config: &DynamicValue,
) -> PlannedChange {
    let mut change = PlannedChange {
        planned_state: DynamicValue::null(),
        requires_replace: Vec::new(),
        diagnostics: Vec::new(),
    };

    if config.is_null() {
        return change;
    }

    let mut planned = config.clone();
    mark_unset_computed(&schema.block, &AttributePath::root(), config, &mut planned, &mut change);

    if !prior_state.is_null() {
        for attr in &schema.block.attributes {
            let path = AttributePath::new(&attr.name);
            for modifier in &attr.plan_modifiers {
                let request = PlanModifyRequest {
                    state: value_at(prior_state, &path),
                    plan: value_at(&planned, &path),
                    config: value_at(config, &path),
                    path: path.clone(),
                    set_semantics: attr.r#type.is_set(),
                };
                let response = modifier.modify_plan(request);

                if let Err(e) = planned.set_value(&path, response.plan_value) {
                    change.diagnostics.push(
                        Diagnostic::error("Failed to apply plan modifier", e.to_string())
                            .with_attribute(path.clone()),
                    );
                }
                if response.requires_replace && !change.requires_replace.contains(&path) {
                    tracing::debug!("attribute {} requires replacement", path);
                    change.requires_replace.push(path.clone());
                }
                change.diagnostics.extend(response.diagnostics);
            }
        }
    }

    change.planned_state = planned;
    change
}

fn value_at(value: &DynamicValue, path: &AttributePath) -> Dynamic {
    value.get(path).cloned().unwrap_or(Dynamic::Null)
}

fn mark_unset_computed(
    block: &Block,
    base: &AttributePath,
    config: &DynamicValue,
    planned: &mut DynamicValue,
    change: &mut PlannedChange,
) {
    for attr in block.attributes.iter().filter(|a| a.computed) {
        let path = base_join(base, &attr.name);
        if value_at(config, &path).is_null() {
            if let Err(e) = planned.mark_unknown(&path) {
                change.diagnostics.push(
                    Diagnostic::error("Failed to plan computed attribute", e.to_string())
                        .with_attribute(path),
                );
            }
        }
    }

    for nested in &block.block_types {
        let path = base_join(base, &nested.type_name);
        let count = value_at(config, &path).as_list().map_or(0, <[Dynamic]>::len);
        for idx in 0..count {
            mark_unset_computed(
                &nested.block,
                &path.clone().index(idx as i64),
                config,
                planned,
                change,
            );
        }
    }
}

fn base_join(base: &AttributePath, name: &str) -> AttributePath {
    if base.steps.is_empty() {
        AttributePath::new(name)
    } else {
        base.clone().attribute(name)
    }
}
