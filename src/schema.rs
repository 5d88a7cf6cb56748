use graphql_parser::schema::{Definition, Document, Type, TypeDefinition};

use crate::error::SchemaParseError;

/// A GraphQL schema type as seen by the translator.
///
/// Named types are recorded as `Scalar` regardless of what the schema says
/// about them; nothing downstream ever needs to resolve a name to its
/// definition, only to strip wrappers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaType {
    Scalar {
        name: String,
    },
    Object {
        name: String,
        fields: Vec<(String, SchemaType)>,
    },
    List {
        element: Box<SchemaType>,
    },
    NonNull {
        inner: Box<SchemaType>,
    },
}

impl SchemaType {
    /// Strip `List` and `NonNull` wrappers down to the named type.
    pub fn unwrapped(&self) -> &SchemaType {
        match self {
            SchemaType::List { element } => element.unwrapped(),
            SchemaType::NonNull { inner } => inner.unwrapped(),
            other => other,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            SchemaType::Scalar { name } | SchemaType::Object { name, .. } => Some(name),
            _ => None,
        }
    }
}

fn translate_type(ty: &Type<'_, String>) -> SchemaType {
    match ty {
        Type::NonNullType(inner) => SchemaType::NonNull {
            inner: Box::new(translate_type(inner)),
        },
        Type::ListType(element) => SchemaType::List {
            element: Box::new(translate_type(element)),
        },
        Type::NamedType(name) => SchemaType::Scalar { name: name.clone() },
    }
}

/// Parse GraphQL SDL into the ordered list of object types, skipping the
/// operation roots (`Query`, `Mutation`) and introspection types.
pub fn parse_schema(text: &str) -> Result<Vec<SchemaType>, SchemaParseError> {
    let doc: Document<String> = graphql_parser::parse_schema(text)?;

    let mut types = Vec::new();
    for def in &doc.definitions {
        let Definition::TypeDefinition(TypeDefinition::Object(obj)) = def else {
            continue;
        };
        if obj.name == "Query" || obj.name == "Mutation" || obj.name.starts_with("__") {
            continue;
        }

        let fields = obj
            .fields
            .iter()
            .map(|f| (f.name.clone(), translate_type(&f.field_type)))
            .collect();
        types.push(SchemaType::Object {
            name: obj.name.clone(),
            fields,
        });
    }

    Ok(types)
}
