use std::collections::HashMap;

use graphql_parser::Pos;
use graphql_parser::query::{
    Definition, Document, Field, FragmentDefinition, OperationDefinition, Selection, Value,
};

use crate::error::QueryParseError;

/// Variable bound to the top-level selections' parent.
pub const ROOT_VAR: &str = "ROOT";

/// Argument names that look up a single object rather than filter a
/// collection. Part of the emitter's decision table; do not extend without
/// fact-base evidence.
const LOOKUP_ARGS: &[&str] = &["id", "name", "key", "slug", "code"];

/// One node of the selection tree, after fragment inlining.
///
/// `parent_var` is the Datalog variable of the enclosing binding (`ROOT` at
/// top level) and `child_var` the variable minted for this node's dotted
/// selection path. Two nodes share a `child_var` iff they share a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryField {
    pub name: String,
    pub arguments: Vec<(String, String)>,
    pub children: Vec<QueryField>,
    pub parent_var: String,
    pub child_var: String,
}

impl QueryField {
    pub fn is_scalar(&self) -> bool {
        self.children.is_empty()
    }

    /// Adornment string: one `B` per bound argument, `_` when there are none.
    pub fn bound_mask(&self) -> String {
        if self.arguments.is_empty() {
            "_".to_string()
        } else {
            "B".repeat(self.arguments.len())
        }
    }

    pub fn bound_vals(&self) -> impl Iterator<Item = &str> {
        self.arguments.iter().map(|(_, value)| value.as_str())
    }

    /// A collection is filtered when some argument is a range or boolean
    /// filter and none is a single-object lookup.
    pub(crate) fn is_filtered_collection(&self) -> bool {
        if self.is_scalar() || self.arguments.is_empty() {
            return false;
        }
        let has_filter = self.arguments.iter().any(|(name, value)| {
            name.starts_with("min")
                || name.starts_with("max")
                || value.eq_ignore_ascii_case("true")
                || value.eq_ignore_ascii_case("false")
        });
        let has_lookup = self
            .arguments
            .iter()
            .any(|(name, _)| LOOKUP_ARGS.contains(&name.as_str()));
        has_filter && !has_lookup
    }

    /// `users` -> `user`; names without a trailing `s` are kept as-is.
    pub(crate) fn singular_name(&self) -> &str {
        self.name.strip_suffix('s').unwrap_or(&self.name)
    }
}

/// Mints `<LAST_SEGMENT_UPPER>_<n>` variables, one per dotted path.
#[derive(Debug, Default)]
struct VarAllocator {
    counter: usize,
    cache: HashMap<String, String>,
}

impl VarAllocator {
    fn var_for_path(&mut self, path: &str, base: &str) -> String {
        if let Some(var) = self.cache.get(path) {
            return var.clone();
        }
        self.counter += 1;
        let var = format!("{}_{}", base.to_uppercase(), self.counter);
        self.cache.insert(path.to_string(), var.clone());
        var
    }
}

/// Parse a GraphQL operation document into the root selection fields.
///
/// The first query operation (named or shorthand) is compiled; fragment
/// spreads and inline fragments are expanded in place, recursively.
pub fn parse_query(text: &str) -> Result<Vec<QueryField>, QueryParseError> {
    let doc: Document<String> = graphql_parser::parse_query(text)?;

    let mut fragments: HashMap<&str, &FragmentDefinition<String>> = HashMap::new();
    for def in &doc.definitions {
        if let Definition::Fragment(frag) = def {
            fragments.entry(frag.name.as_str()).or_insert(frag);
        }
    }

    let selection_set = doc
        .definitions
        .iter()
        .find_map(|def| match def {
            Definition::Operation(OperationDefinition::Query(q)) => Some(&q.selection_set),
            Definition::Operation(OperationDefinition::SelectionSet(ss)) => Some(ss),
            _ => None,
        })
        .ok_or(QueryParseError::NoOperation)?;

    let mut alloc = VarAllocator::default();
    let mut active = Vec::new();
    let mut roots = Vec::new();
    collect_fields(
        &selection_set.items,
        ROOT_VAR,
        "",
        &fragments,
        &mut alloc,
        &mut active,
        &mut roots,
    )?;
    Ok(roots)
}

/// Walk one selection set, inlining fragments into `out` in source order.
/// `active` tracks the fragment spreads currently being expanded so cycles
/// surface as errors instead of infinite recursion.
fn collect_fields<'a>(
    items: &'a [Selection<'a, String>],
    parent_var: &str,
    parent_path: &str,
    fragments: &HashMap<&str, &'a FragmentDefinition<'a, String>>,
    alloc: &mut VarAllocator,
    active: &mut Vec<String>,
    out: &mut Vec<QueryField>,
) -> Result<(), QueryParseError> {
    for selection in items {
        match selection {
            Selection::Field(field) => {
                out.push(build_field(
                    field,
                    parent_var,
                    parent_path,
                    fragments,
                    alloc,
                    active,
                )?);
            }
            Selection::FragmentSpread(spread) => {
                let name = spread.fragment_name.as_str();
                let Some(frag) = fragments.get(name) else {
                    return Err(QueryParseError::FragmentUndefined(name.to_string()));
                };
                if active.iter().any(|n| n == name) {
                    let mut cycle = active.clone();
                    cycle.push(name.to_string());
                    return Err(QueryParseError::FragmentCycle { cycle });
                }
                active.push(name.to_string());
                collect_fields(
                    &frag.selection_set.items,
                    parent_var,
                    parent_path,
                    fragments,
                    alloc,
                    active,
                    out,
                )?;
                active.pop();
            }
            Selection::InlineFragment(inline) => {
                collect_fields(
                    &inline.selection_set.items,
                    parent_var,
                    parent_path,
                    fragments,
                    alloc,
                    active,
                    out,
                )?;
            }
        }
    }
    Ok(())
}

fn build_field<'a>(
    field: &'a Field<'a, String>,
    parent_var: &str,
    parent_path: &str,
    fragments: &HashMap<&str, &'a FragmentDefinition<'a, String>>,
    alloc: &mut VarAllocator,
    active: &mut Vec<String>,
) -> Result<QueryField, QueryParseError> {
    let name = field.alias.clone().unwrap_or_else(|| field.name.clone());
    let path = if parent_path.is_empty() {
        name.clone()
    } else {
        format!("{parent_path}.{name}")
    };
    let child_var = alloc.var_for_path(&path, &name);

    let mut arguments = Vec::with_capacity(field.arguments.len());
    for (arg_name, value) in &field.arguments {
        arguments.push((
            arg_name.clone(),
            literal_text(arg_name, value, field.position)?,
        ));
    }

    let mut children = Vec::new();
    collect_fields(
        &field.selection_set.items,
        &child_var,
        &path,
        fragments,
        alloc,
        active,
        &mut children,
    )?;

    Ok(QueryField {
        name,
        arguments,
        children,
        parent_var: parent_var.to_string(),
        child_var,
    })
}

/// Stringify a literal argument value, preserving its source form: strings
/// lose their quotes, booleans lower-case, numbers keep their decimal text.
fn literal_text(
    name: &str,
    value: &Value<'_, String>,
    position: Pos,
) -> Result<String, QueryParseError> {
    let unsupported = |kind: &'static str| QueryParseError::UnsupportedArgument {
        name: name.to_string(),
        kind,
        position,
    };
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Int(n) => n
            .as_i64()
            .map(|v| v.to_string())
            .ok_or_else(|| unsupported("integer")),
        Value::Float(f) => Ok(f.to_string()),
        Value::Boolean(b) => Ok(b.to_string()),
        Value::Enum(e) => Ok(e.clone()),
        Value::Variable(_) => Err(unsupported("variable")),
        Value::Null => Err(unsupported("null")),
        Value::List(_) => Err(unsupported("list")),
        Value::Object(_) => Err(unsupported("object")),
    }
}
