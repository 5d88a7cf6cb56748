use std::collections::HashSet;

use crate::query::{QueryField, ROOT_VAR};

/// Build the final `ans/k` rule: one head variable per scalar leaf in
/// pre-order, one or two body goals per node, root link goals for object
/// subtrees, and the record-iteration prologue for filtered collections.
pub(crate) fn assemble(roots: &[QueryField]) -> Vec<String> {
    let mut head_vars = Vec::new();
    let mut body = Vec::new();

    for root in roots {
        collect(root, "", "", &mut head_vars, &mut body);

        if !root.is_scalar() {
            for child in &root.children {
                if !child.is_scalar() {
                    body.push(format!(
                        "{}_{}_result({}, {})",
                        root.name, child.name, root.child_var, child.child_var
                    ));
                }
            }
        }
    }

    let mut dedup = HashSet::new();
    let mut goals: Vec<String> = body
        .into_iter()
        .filter(|goal| dedup.insert(goal.clone()))
        .collect();

    if head_vars.is_empty() {
        return vec![
            "% Final answer predicate combining all query results".to_string(),
            "ans :- true.".to_string(),
        ];
    }

    // A filtered collection at the root is answered record by record: walk
    // the container once, then iterate the matching records. Only the first
    // such root rewrites the body.
    for root in roots {
        if !root.is_filtered_collection() {
            continue;
        }
        let plural = &root.name;
        let singular = root.singular_name();
        let record_var = format!("{}_ID", singular.to_uppercase());

        let mut spliced = vec![
            format!("{plural}_ext({ROOT_VAR})"),
            format!("{plural}_result({ROOT_VAR})"),
            format!("{singular}_ext({ROOT_VAR}, {record_var})"),
            format!("{}_1 = {record_var}", singular.to_uppercase()),
        ];
        let ext_prefix = format!("{plural}_ext");
        let result_prefix = format!("{plural}_result");
        spliced.extend(
            goals
                .into_iter()
                .filter(|goal| !goal.starts_with(&ext_prefix) && !goal.starts_with(&result_prefix)),
        );
        goals = spliced;
        break;
    }

    vec![
        "% Final answer predicate combining all query results".to_string(),
        format!("ans({}) :- {}.", head_vars.join(", "), goals.join(", ")),
    ]
}

fn collect(
    node: &QueryField,
    path: &str,
    parent_path: &str,
    head_vars: &mut Vec<String>,
    body: &mut Vec<String>,
) {
    let current_path = format!("{path}{}", node.name);

    if node.is_scalar() {
        let head_var = current_path.to_uppercase();
        head_vars.push(head_var.clone());

        if parent_path.is_empty() {
            body.push(format!(
                "{}_ext({ROOT_VAR}, {})",
                node.name, node.child_var
            ));
            body.push(format!("{}_result({ROOT_VAR}, {head_var})", node.name));
        } else {
            body.push(format!(
                "{parent_path}{}_result({}, {head_var})",
                node.name, node.parent_var
            ));
        }
    } else {
        if parent_path.is_empty() {
            body.push(format!("{}_ext({})", node.name, node.child_var));
            body.push(format!("{}_result({ROOT_VAR})", node.name));
        } else {
            body.push(format!(
                "{parent_path}{}_result({})",
                node.name, node.parent_var
            ));
        }

        let child_path = format!("{current_path}_");
        for child in &node.children {
            collect(child, &child_path, &child_path, head_vars, body);
        }
    }
}
