//! QueryBridge: translate GraphQL queries into XSB Datalog programs.
//!
//! The pipeline parses the schema and query with `graphql-parser`, assigns a
//! path-unique variable to every selection, and emits one `*_result` rule per
//! field plus a final `ans/k` rule joining all leaf scalars. With
//! `apply_demand` the program additionally carries `demand_*`/`m_*`
//! predicates restricting derivations to tuples reachable from the query's
//! bound arguments.

use std::collections::HashSet;

mod answer;
pub mod cli;
pub mod demand;
mod emit;
pub mod error;
pub mod query;
pub mod schema;

pub use error::{CompileError, QueryParseError, SchemaParseError};
pub use query::{QueryField, parse_query};
pub use schema::{SchemaType, parse_schema};

/// Translate a GraphQL schema and query into an XSB Datalog program.
pub fn compile(
    schema_text: &str,
    query_text: &str,
    apply_demand: bool,
) -> Result<String, CompileError> {
    // The schema is parsed for validation only; generation never consults it.
    parse_schema(schema_text)?;
    let mut roots = parse_query(query_text)?;
    Ok(generate_datalog(&mut roots, apply_demand))
}

/// Render the Datalog program for an already-parsed selection tree.
///
/// Takes the tree mutably: emitting a filtered collection rebinds its
/// `parent_var` to the record variable, and the answer assembler reads the
/// rebound tree.
pub fn generate_datalog(roots: &mut [QueryField], apply_demand: bool) -> String {
    let mut sections = Vec::new();

    if !roots.is_empty() {
        let names = roots
            .iter()
            .map(|root| root.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let mode = if apply_demand { "With" } else { "Without" };
        sections.push(format!(
            "% XSB Datalog generated from GraphQL query with root fields: {names}\n\
             % {mode} demand transformation"
        ));
    }

    let mut summary = Vec::new();
    if apply_demand {
        let program = demand::transform(roots);
        if !program.facts.is_empty() || !program.rules.is_empty() {
            let mut facts = vec!["% Demand transformation facts and rules".to_string()];
            facts.extend(program.facts);
            sections.push(facts.join("\n"));
            sections.push(program.rules.join("\n"));
        }
        summary = program.applied;
    }

    let mut rule_lines = vec!["% Query field rules".to_string()];
    let mut seen = HashSet::new();
    for root in roots.iter_mut() {
        let info = summary
            .iter()
            .find(|(name, _)| name == &root.name)
            .map(|(_, info)| info);
        rule_lines.push(format!("\n% Rules for field: {}", root.name));
        emit::field_rules(root, info, "", &mut rule_lines, &mut seen);
    }
    sections.push(rule_lines.join("\n"));

    sections.push(answer::assemble(roots).join("\n"));

    if !summary.is_empty() {
        let mut notes = vec!["% Demand transformation summary".to_string()];
        notes.extend(
            summary
                .iter()
                .map(|(_, info)| format!("% NOTE: {}", info.log_message())),
        );
        sections.push(notes.join("\n"));
    }

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT_SCHEMA: &str = "type Project { tagline: String! } type Query { project: Project }";

    #[test]
    fn basic_program_without_demand() {
        let program = compile(PROJECT_SCHEMA, "{ project { tagline } }", false).unwrap();
        assert_eq!(
            program,
            "% XSB Datalog generated from GraphQL query with root fields: project\n\
             % Without demand transformation\n\
             \n\
             % Query field rules\n\
             \n\
             % Rules for field: project\n\
             project_result(ROOT) :- project_ext(ROOT).\n\
             project_tagline_result(PROJECT_1, TAGLINE_2) :- project_tagline_ext(PROJECT_1, TAGLINE_2).\n\
             \n\
             % Final answer predicate combining all query results\n\
             ans(PROJECT_TAGLINE) :- project_ext(PROJECT_1), project_result(ROOT), project_tagline_result(PROJECT_1, PROJECT_TAGLINE)."
        );
    }

    #[test]
    fn lookup_program_with_demand() {
        let program = compile(
            PROJECT_SCHEMA,
            r#"{ project(name: "GraphQL") { tagline } }"#,
            true,
        )
        .unwrap();
        assert_eq!(
            program,
            "% XSB Datalog generated from GraphQL query with root fields: project\n\
             % With demand transformation\n\
             \n\
             % Demand transformation facts and rules\n\
             % Seed demand with bound arguments for project\n\
             demand_project_B(\"GraphQL\").\n\
             \n\
             % Magic predicate for project\n\
             m_project_B(PROJECT_1) :- demand_project_B(\"GraphQL\").\n\
             % Propagate demand to tagline fields\n\
             demand_tagline__(PROJECT_1) :- m_tagline_ext(PROJECT_1).\n\
             % Magic predicate for tagline\n\
             m_tagline__(PROJECT_1) :- demand_tagline__(PROJECT_1).\n\
             % Propagate demand from project to its fields\n\
             \n\
             % Query field rules\n\
             \n\
             % Rules for field: project\n\
             project_result(ROOT) :- m_project_B(PROJECT_1), project_ext(ROOT), name_ext(PROJECT_1, \"GraphQL\").\n\
             project_tagline_result(PROJECT_1, TAGLINE_2) :- project_tagline_ext(PROJECT_1, TAGLINE_2).\n\
             \n\
             % Final answer predicate combining all query results\n\
             ans(PROJECT_TAGLINE) :- project_ext(PROJECT_1), project_result(ROOT), project_tagline_result(PROJECT_1, PROJECT_TAGLINE).\n\
             \n\
             % Demand transformation summary\n\
             % NOTE: Applied demand transformation 'demand_project_B' (B) because it has 1 bound argument(s)"
        );
    }

    #[test]
    fn schema_errors_abort_compilation() {
        let err = compile("type {", "{ project { tagline } }", false).unwrap_err();
        assert!(matches!(err, CompileError::Schema(_)));
    }

    #[test]
    fn query_errors_abort_compilation() {
        let err = compile(PROJECT_SCHEMA, "fragment f on Project { tagline }", false).unwrap_err();
        assert!(matches!(
            err,
            CompileError::Query(QueryParseError::NoOperation)
        ));
    }
}
