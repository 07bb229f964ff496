//! Query-builder field definitions for the read-only columns of a source,
//! and for the config document paths it exposes.

use serde_json::{Map, Value, json};

use crate::config::{ColumnRegistry, ConfigField, EditorOption, FieldType, ReadOnlyColumn};

pub fn widget_type(field_type: FieldType) -> &'static str {
    match field_type {
        FieldType::String => "text",
        FieldType::Number => "number",
        FieldType::Datetime => "datetime",
    }
}

pub fn column_field(column: &ReadOnlyColumn) -> Value {
    json!({
        "label": column.label,
        "type": widget_type(column.field_type),
        "valueSources": ["value"],
    })
}

/// Widget for a config field, or `None` for editors the filter panel
/// cannot offer.
pub fn editor_widget_type(editor: EditorOption) -> Option<&'static str> {
    match editor {
        EditorOption::Checkbox => Some("boolean"),
        EditorOption::Dropdown => Some("select"),
        EditorOption::Numeric => Some("number"),
        EditorOption::Textarea | EditorOption::Textfield => Some("text"),
        EditorOption::ColorEditor
        | EditorOption::MappingEditor
        | EditorOption::PrimitiveListEditor => None,
    }
}

pub fn config_field(field: &ConfigField) -> Option<Value> {
    let widget = editor_widget_type(field.editor)?;
    let list_values = field.enum_options.clone().unwrap_or_default();
    Some(json!({
        "label": field.pointer,
        "type": widget,
        "valueSources": ["value"],
        "fieldSettings": { "listValues": list_values },
    }))
}

/// Field map keyed by pointer. Fields without a filter widget are skipped.
pub fn config_field_config(fields: &[ConfigField]) -> Value {
    let fields: Map<String, Value> = fields
        .iter()
        .filter_map(|field| Some((field.pointer.clone(), config_field(field)?)))
        .collect();
    Value::Object(fields)
}

/// Field map keyed by column key, in registry order.
pub fn field_config(registry: &ColumnRegistry) -> Value {
    let fields: Map<String, Value> = registry
        .iter()
        .map(|col| (col.key.clone(), column_field(col)))
        .collect();
    Value::Object(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    #[test]
    fn test_field_config() {
        let source = Settings::builtin().data_source("variable-annotations").unwrap();
        let config = field_config(&source.registry);

        let keys: Vec<&String> = config.as_object().unwrap().keys().collect();
        assert_eq!(
            keys,
            vec![
                "id",
                "name",
                "datasetname",
                "namespacename",
                "description",
                "createdAt",
                "updatedAt"
            ]
        );
        assert_eq!(
            config["createdAt"],
            json!({ "label": "Created at", "type": "datetime", "valueSources": ["value"] })
        );
        assert_eq!(config["name"]["type"], "text");
        assert_eq!(config["id"]["type"], "number");
    }

    #[test]
    fn test_config_field_config() {
        let source = Settings::builtin().data_source("charts").unwrap();
        let config = config_field_config(&source.config_fields);
        let fields = config.as_object().unwrap();

        assert_eq!(
            config["/type"],
            json!({
                "label": "/type",
                "type": "select",
                "valueSources": ["value"],
                "fieldSettings": { "listValues": [
                    "LineChart",
                    "ScatterPlot",
                    "StackedArea",
                    "DiscreteBar",
                    "StackedDiscreteBar",
                    "SlopeChart",
                    "StackedBar",
                    "Marimekko"
                ] },
            })
        );
        assert_eq!(config["/hasMapTab"]["type"], "boolean");
        assert_eq!(config["/subtitle"]["type"], "text");
        assert_eq!(config["/yAxis/min"]["type"], "number");
        assert_eq!(config["/title"]["fieldSettings"]["listValues"], json!([]));
        assert!(!fields.contains_key("/map/colorScale/customNumericColors"));
        assert!(!fields.contains_key("/selectedEntityNames"));
        assert_eq!(fields.len(), 9);
    }

    #[test]
    fn test_editor_widget_type() {
        assert_eq!(editor_widget_type(EditorOption::Textarea), Some("text"));
        assert_eq!(editor_widget_type(EditorOption::Textfield), Some("text"));
        assert_eq!(editor_widget_type(EditorOption::MappingEditor), None);
    }
}
