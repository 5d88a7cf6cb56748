use std::collections::HashSet;

use serde::Serialize;

use crate::emit::format_value;
use crate::query::QueryField;

/// Outcome of the adornment analysis for one selection node.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DemandInfo {
    pub applied: bool,
    pub reason: String,
    pub adornment: String,
    pub demand_pred: String,
    pub magic_pred: String,
}

impl DemandInfo {
    pub fn log_message(&self) -> String {
        if !self.applied {
            return "No demand transformation applied".to_string();
        }
        format!(
            "Applied demand transformation '{}' ({}) because {}",
            self.demand_pred, self.adornment, self.reason
        )
    }
}

/// Seed facts, demand/magic/propagation rules, and the per-root-field
/// summary produced by one analysis pass.
#[derive(Debug, Default)]
pub struct DemandProgram {
    pub facts: Vec<String>,
    pub rules: Vec<String>,
    pub applied: Vec<(String, DemandInfo)>,
}

/// Run the demand (magic-set) analysis over the selection tree.
///
/// Emission order is the pre-order walk; textually identical rules are
/// emitted at most once so repeated sub-selections stay harmless.
pub fn transform(roots: &[QueryField]) -> DemandProgram {
    let mut program = DemandProgram::default();
    let mut seen = HashSet::new();
    for root in roots {
        let info = transform_field(root, 0, &mut program.facts, &mut program.rules, &mut seen);
        if info.applied && !program.applied.iter().any(|(name, _)| name == &root.name) {
            program.applied.push((root.name.clone(), info));
        }
    }
    program
}

fn transform_field(
    node: &QueryField,
    depth: usize,
    facts: &mut Vec<String>,
    rules: &mut Vec<String>,
    seen: &mut HashSet<String>,
) -> DemandInfo {
    let adornment = node.bound_mask();
    let demand_pred = format!("demand_{}_{}", node.name, adornment);
    let magic_pred = format!("m_{}_{}", node.name, adornment);

    // Top-level fields without arguments trigger nothing at their own level;
    // their subtree is still analysed below.
    let applied = !node.arguments.is_empty() || depth > 0;
    let reason = if !applied {
        String::new()
    } else if !node.arguments.is_empty() {
        format!("it has {} bound argument(s)", node.arguments.len())
    } else {
        format!("it's a nested field at depth {depth}")
    };

    if applied {
        if depth == 0 && !node.arguments.is_empty() {
            let seed = format!("{demand_pred}({}).", format_bound_vals(node));
            if seen.insert(seed.clone()) {
                facts.push(format!(
                    "% Seed demand with bound arguments for {}",
                    node.name
                ));
                facts.push(seed);
            }
        }

        let magic_rule = if !node.arguments.is_empty() {
            // Objects restrict their own binding; scalars the parent's.
            let head_var = if node.is_scalar() {
                &node.parent_var
            } else {
                &node.child_var
            };
            format!(
                "{magic_pred}({head_var}) :- {demand_pred}({}).",
                format_bound_vals(node)
            )
        } else {
            let demand_rule = format!(
                "{demand_pred}({parent}) :- m_{}_ext({parent}).",
                node.name,
                parent = node.parent_var
            );
            if seen.insert(demand_rule.clone()) {
                rules.push(format!("% Propagate demand to {} fields", node.name));
                rules.push(demand_rule);
            }
            format!(
                "{magic_pred}({parent}) :- {demand_pred}({parent}).",
                parent = node.parent_var
            )
        };
        if seen.insert(magic_rule.clone()) {
            rules.push(format!("% Magic predicate for {}", node.name));
            rules.push(magic_rule);
        }
    }

    for (i, child) in node.children.iter().enumerate() {
        let sub = transform_field(child, depth + 1, facts, rules, seen);
        if sub.applied {
            if i == 0 {
                rules.push(format!("% Propagate demand from {} to its fields", node.name));
            }
            if !child.is_scalar() {
                let propagate = format!(
                    "{}({}) :- {magic_pred}({parent}), {}_ext({parent}, {}).",
                    sub.demand_pred,
                    child.parent_var,
                    node.name,
                    child.parent_var,
                    parent = node.parent_var
                );
                if seen.insert(propagate.clone()) {
                    rules.push(propagate);
                }
            }
        }
    }

    DemandInfo {
        applied,
        reason,
        adornment,
        demand_pred,
        magic_pred,
    }
}

fn format_bound_vals(node: &QueryField) -> String {
    node.bound_vals()
        .map(format_value)
        .collect::<Vec<_>>()
        .join(", ")
}
