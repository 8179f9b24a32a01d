//! Python-style type annotations
//!
//! Parses annotation strings such as `Optional[list[int]]`,
//! `dict[str, float]` or `int | str` into [`FieldType`]s. Bare names that
//! are not builtins resolve against a [`ModelRegistry`].

use crate::constraints::Constraint;
use crate::definition::DefinitionError;
use crate::formats::StringFormat;
use crate::registry::ModelRegistry;
use crate::types::FieldType;

/// Parse an annotation string into a field type
pub fn parse_annotation(annotation: &str, registry: &ModelRegistry) -> Result<FieldType, DefinitionError> {
    let text = annotation.trim();
    if text.is_empty() {
        return Err(malformed(annotation));
    }

    // `A | B | None`
    let alternatives = split_top_level(text, '|').ok_or_else(|| malformed(annotation))?;
    if alternatives.len() > 1 {
        return union_of(&alternatives, annotation, registry);
    }

    if let Some(open) = text.find('[') {
        if !text.ends_with(']') {
            return Err(malformed(annotation));
        }
        let head = text[..open].trim();
        let inner = &text[open + 1..text.len() - 1];
        let args = split_top_level(inner, ',').ok_or_else(|| malformed(annotation))?;
        if args.iter().any(|a| a.is_empty()) {
            return Err(malformed(annotation));
        }

        return match (head, args.as_slice()) {
            ("Optional", [inner]) => Ok(FieldType::optional(parse_annotation(inner, registry)?)),
            ("list" | "List", [items]) => Ok(FieldType::list(parse_annotation(items, registry)?)),
            ("dict" | "Dict", [keys, values]) => Ok(FieldType::map(
                parse_annotation(keys, registry)?,
                parse_annotation(values, registry)?,
            )),
            ("Union", alternatives) if !alternatives.is_empty() => {
                union_of(alternatives, annotation, registry)
            }
            _ => Err(malformed(annotation)),
        };
    }

    if text.contains(']') || text.contains(',') {
        return Err(malformed(annotation));
    }

    match text {
        "str" => Ok(FieldType::Str),
        "int" => Ok(FieldType::Int),
        "float" => Ok(FieldType::Float),
        "bool" => Ok(FieldType::Bool),
        "datetime" => Ok(FieldType::DateTime),
        "date" => Ok(FieldType::annotated(
            FieldType::Str,
            [Constraint::format(StringFormat::Date)],
        )),
        "Any" => Ok(FieldType::Any),
        name => registry
            .get(name)
            .map(|schema| FieldType::model(schema.clone()))
            .ok_or_else(|| DefinitionError::UnknownType(name.to_string())),
    }
}

/// Build a union; a `None` alternative makes the result optional
fn union_of(
    alternatives: &[&str],
    annotation: &str,
    registry: &ModelRegistry,
) -> Result<FieldType, DefinitionError> {
    let mut nullable = false;
    let mut variants = Vec::new();
    for alternative in alternatives {
        match *alternative {
            "" => return Err(malformed(annotation)),
            "None" => nullable = true,
            other => variants.push(parse_annotation(other, registry)?),
        }
    }

    let inner = match variants.len() {
        0 => return Err(malformed(annotation)),
        1 => variants.remove(0),
        _ => FieldType::union(variants),
    };
    Ok(if nullable { FieldType::optional(inner) } else { inner })
}

/// Split on `sep` outside brackets; `None` when brackets are unbalanced
fn split_top_level(text: &str, sep: char) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.checked_sub(1)?,
            c if c == sep && depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(text[start..].trim());
    Some(parts)
}

fn malformed(annotation: &str) -> DefinitionError {
    DefinitionError::MalformedAnnotation(annotation.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldDescriptor;
    use crate::schema::Schema;

    fn parse(text: &str) -> Result<FieldType, DefinitionError> {
        parse_annotation(text, &ModelRegistry::new())
    }

    #[test]
    fn test_builtin_names() {
        assert!(matches!(parse("str"), Ok(FieldType::Str)));
        assert!(matches!(parse(" int "), Ok(FieldType::Int)));
        assert!(matches!(parse("datetime"), Ok(FieldType::DateTime)));
        assert!(matches!(parse("Any"), Ok(FieldType::Any)));
    }

    #[test]
    fn test_nested_generics() {
        let ty = parse("dict[str, list[Optional[float]]]").unwrap();
        assert_eq!(ty.to_string(), "dict[str, list[Optional[float]]]");
        assert_eq!(parse("List[int]").unwrap().to_string(), "list[int]");
    }

    #[test]
    fn test_unions_and_none() {
        assert_eq!(parse("int | str").unwrap().to_string(), "Union[int, str]");
        assert_eq!(parse("Union[int, None]").unwrap().to_string(), "Optional[int]");
        assert_eq!(parse("str | int | None").unwrap().to_string(), "Optional[Union[str, int]]");
    }

    #[test]
    fn test_model_reference() {
        let mut registry = ModelRegistry::new();
        let address = Schema::builder("Address")
            .field(FieldDescriptor::new("city", FieldType::Str))
            .build()
            .unwrap();
        registry.insert(address).unwrap();

        let ty = parse_annotation("list[Address]", &registry).unwrap();
        assert_eq!(ty.to_string(), "list[Address]");
    }

    #[test]
    fn test_errors() {
        assert!(matches!(parse("Widget"), Err(DefinitionError::UnknownType(name)) if name == "Widget"));
        assert!(matches!(parse("list[int"), Err(DefinitionError::MalformedAnnotation(_))));
        assert!(matches!(parse("dict[str]"), Err(DefinitionError::MalformedAnnotation(_))));
        assert!(matches!(parse("int |"), Err(DefinitionError::MalformedAnnotation(_))));
        assert!(matches!(parse(""), Err(DefinitionError::MalformedAnnotation(_))));
    }
}
