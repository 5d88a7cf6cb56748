use std::collections::HashSet;

use crate::demand::DemandInfo;
use crate::query::QueryField;

/// Render a term per the output grammar: booleans and numeric literals are
/// bare words, everything else is double-quoted.
pub(crate) fn format_value(value: &str) -> String {
    if value == "true" || value == "false" || is_numeric(value) {
        value.to_string()
    } else {
        format!("\"{value}\"")
    }
}

/// Optional sign, digits, at most one decimal point; `inf` and `1e5` do not
/// count as numeric and stay quoted.
fn is_numeric(value: &str) -> bool {
    let digits = value.strip_prefix(['-', '+']).unwrap_or(value);
    let mut dots = 0;
    !digits.is_empty()
        && digits.chars().all(|c| {
            if c == '.' {
                dots += 1;
                dots == 1
            } else {
                c.is_ascii_digit()
            }
        })
}

/// Emit the `<path>_result` rule for `node` and, recursively, its children.
///
/// `demand` is only ever present for root fields. A filtered collection
/// rebinds the node's `parent_var` to the freshly minted record variable so
/// the argument filters (and any later reader of the tree) see the record
/// rather than the container.
pub(crate) fn field_rules(
    node: &mut QueryField,
    demand: Option<&DemandInfo>,
    path: &str,
    rules: &mut Vec<String>,
    seen: &mut HashSet<String>,
) {
    let head = if node.is_scalar() {
        format!(
            "{path}{}_result({}, {})",
            node.name, node.parent_var, node.child_var
        )
    } else {
        format!("{path}{}_result({})", node.name, node.parent_var)
    };

    let mut body = Vec::new();
    if let Some(info) = demand.filter(|info| info.applied) {
        let var = if node.is_scalar() {
            &node.parent_var
        } else {
            &node.child_var
        };
        body.push(format!("{}({var})", info.magic_pred));
    }

    if node.is_scalar() {
        body.push(format!(
            "{path}{}_ext({}, {})",
            node.name, node.parent_var, node.child_var
        ));
    } else {
        body.push(format!("{path}{}_ext({})", node.name, node.parent_var));
    }

    // Filters attach to the node's own binding; a filtered collection first
    // extracts individual records and filters those instead.
    let mut subject = if node.is_scalar() {
        node.parent_var.clone()
    } else {
        node.child_var.clone()
    };
    if node.is_filtered_collection() {
        let record_var = format!("{}_ID", node.singular_name().to_uppercase());
        body.push(format!(
            "{}_ext({}, {record_var})",
            node.singular_name(),
            node.parent_var
        ));
        node.parent_var = record_var.clone();
        subject = record_var;
    }

    for (arg_name, value) in &node.arguments {
        if let Some(rest) = arg_name.strip_prefix("min") {
            push_range_filter(&mut body, rest, &subject, value, "@>=");
        } else if let Some(rest) = arg_name.strip_prefix("max") {
            push_range_filter(&mut body, rest, &subject, value, "@=<");
        } else if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false") {
            body.push(format!("{arg_name}_ext({subject}, {})", value.to_lowercase()));
        } else {
            body.push(format!("{arg_name}_ext({subject}, {})", format_value(value)));
        }
    }

    let rule = format!("{head} :- {}.", body.join(", "));
    if seen.insert(rule.clone()) {
        rules.push(rule);
    }

    let child_path = format!("{path}{}_", node.name);
    for child in &mut node.children {
        field_rules(child, None, &child_path, rules, seen);
    }
}

/// `minAge`/`maxAge` compare a sibling fact against the literal:
/// `age_ext(S, AGE_S), AGE_S @>= 18`.
fn push_range_filter(body: &mut Vec<String>, rest: &str, subject: &str, value: &str, op: &str) {
    let field = rest.to_lowercase();
    let cmp_var = format!("{}_{subject}", field.to_uppercase());
    body.push(format!("{field}_ext({subject}, {cmp_var})"));
    body.push(format!("{cmp_var} {op} {value}"));
}
