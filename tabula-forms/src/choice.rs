//! Choices offered by enum select widgets.

use tabula_core::{FieldDescriptor, FieldKind, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub value: Value,
    pub label: String,
}

/// Choices for an enum field, or a list-of-enum field, in declaration order.
/// Empty for any other kind.
pub fn choices(descriptor: &FieldDescriptor) -> Vec<Choice> {
    let kind = match &descriptor.kind {
        FieldKind::List(inner) => inner.as_ref(),
        other => other,
    };
    kind.variants()
        .iter()
        .map(|v| Choice {
            value: Value::Enum(v.name.clone()),
            label: v.label(),
        })
        .collect()
}

/// Label for the currently selected value, if it is a known variant.
pub fn selected_label(descriptor: &FieldDescriptor, value: &Value) -> Option<String> {
    choices(descriptor)
        .into_iter()
        .find(|c| &c.value == value)
        .map(|c| c.label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::{EnumVariant, FieldSpec, ModelDescriptor, ModelSchema};

    fn status() -> FieldDescriptor {
        let kind = FieldKind::Enum {
            variants: vec![
                EnumVariant::new("NORMAL").with_description("shown"),
                EnumVariant::new("HIDDEN"),
            ],
        };
        let schema = ModelSchema::new("T").field(FieldSpec::new("status", kind));
        ModelDescriptor::from_schema(schema).fields[0].clone()
    }

    #[test]
    fn test_enum_choices_use_name_dash_description() {
        let labels: Vec<_> = choices(&status()).into_iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["NORMAL - shown", "HIDDEN"]);
    }

    #[test]
    fn test_selected_label() {
        let desc = status();
        assert_eq!(
            selected_label(&desc, &Value::Enum("NORMAL".into())),
            Some("NORMAL - shown".to_string())
        );
        assert_eq!(selected_label(&desc, &Value::Null), None);
    }

    #[test]
    fn test_non_enum_has_no_choices() {
        let schema = ModelSchema::new("T").field(FieldSpec::new("n", FieldKind::Int));
        let desc = ModelDescriptor::from_schema(schema).fields[0].clone();
        assert!(choices(&desc).is_empty());
    }
}
