use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::sexpr::{ColumnType, OperationContext};
use crate::translate::{PATH_MARKER, is_config_path};

pub const DEFAULT_MAX_DEPTH: usize = 32;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    pub sources: HashMap<String, SourceConfig>,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .build()
            .with_context(|| format!("Config: Failed to read {:?}", path))?;
        Ok(settings.try_deserialize()?)
    }

    /// The two grid editor sources: variable annotations and chart bulk update.
    pub fn builtin() -> Self {
        let mut sources = HashMap::new();
        sources.insert("variable-annotations".to_string(), variable_annotations());
        sources.insert("charts".to_string(), charts());
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            sources,
        }
    }

    /// Load from `path` if given, otherwise fall back to the built-in sources.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn source_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sources.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build the immutable context and registry for a named source.
    pub fn data_source(&self, name: &str) -> Result<DataSource> {
        let Some(source) = self.sources.get(name) else {
            bail!(
                "Config: Unknown source '{}' (available: {})",
                name,
                self.source_names().join(", ")
            );
        };
        DataSource::compile(name, source)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SourceConfig {
    pub endpoint: String,
    pub document_field: String,
    pub whitelist: Vec<WhitelistEntry>,
    pub columns: Vec<ReadOnlyColumn>,
    /// Filterable paths inside the config document.
    #[serde(default)]
    pub config_fields: Vec<ConfigField>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WhitelistEntry {
    pub column: String,
    #[serde(rename = "type")]
    pub col_type: ColumnType,
}

/// UI field type of a read-only column.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Datetime,
}

/// A logical field exposed to the query builder, mapped to its backend column.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReadOnlyColumn {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub target: String,
}

/// Editor used for a config document field in the grid editor.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum EditorOption {
    Checkbox,
    ColorEditor,
    Dropdown,
    MappingEditor,
    Numeric,
    PrimitiveListEditor,
    Textarea,
    Textfield,
}

/// A path inside the config document the filter panel can offer.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ConfigField {
    pub pointer: String,
    pub editor: EditorOption,
    #[serde(default)]
    pub enum_options: Option<Vec<String>>,
}

/// Ordered lookup from UI field key to read-only column.
#[derive(Debug, Clone, Default)]
pub struct ColumnRegistry {
    columns: Vec<ReadOnlyColumn>,
    index: HashMap<String, usize>,
}

impl ColumnRegistry {
    pub fn new(columns: Vec<ReadOnlyColumn>) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, col)| (col.key.clone(), i))
            .collect();
        Self { columns, index }
    }

    pub fn get(&self, key: &str) -> Option<&ReadOnlyColumn> {
        self.index.get(key).map(|&i| &self.columns[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReadOnlyColumn> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// A compiled source variant: endpoint, operation context and column registry.
#[derive(Debug, Clone)]
pub struct DataSource {
    pub name: String,
    pub endpoint: String,
    pub context: OperationContext,
    pub registry: ColumnRegistry,
    pub config_fields: Vec<ConfigField>,
}

impl DataSource {
    pub fn compile(name: &str, config: &SourceConfig) -> Result<Self> {
        let whitelist: HashMap<String, ColumnType> = config
            .whitelist
            .iter()
            .map(|entry| (entry.column.clone(), entry.col_type))
            .collect();

        let document_type = whitelist.get(&config.document_field).copied();
        if document_type != Some(ColumnType::Json) {
            bail!(
                "Config: Document field '{}' of source '{}' must be whitelisted with type json",
                config.document_field,
                name
            );
        }

        for field in &config.config_fields {
            if !is_config_path(&field.pointer) {
                bail!(
                    "Config: Config field '{}' of source '{}' must start with '{}'",
                    field.pointer,
                    name,
                    PATH_MARKER
                );
            }
        }

        for col in &config.columns {
            if !whitelist.contains_key(&col.target) {
                bail!(
                    "Config: Column '{}' of source '{}' targets '{}', which is not whitelisted",
                    col.key,
                    name,
                    col.target
                );
            }
        }

        Ok(Self {
            name: name.to_string(),
            endpoint: config.endpoint.clone(),
            context: OperationContext::new(config.document_field.clone(), whitelist),
            registry: ColumnRegistry::new(config.columns.clone()),
            config_fields: config.config_fields.clone(),
        })
    }
}

fn whitelist(entries: &[(&str, ColumnType)]) -> Vec<WhitelistEntry> {
    entries
        .iter()
        .map(|(column, col_type)| WhitelistEntry {
            column: column.to_string(),
            col_type: *col_type,
        })
        .collect()
}

fn columns(entries: &[(&str, &str, FieldType, &str)]) -> Vec<ReadOnlyColumn> {
    entries
        .iter()
        .map(|(key, label, field_type, target)| ReadOnlyColumn {
            key: key.to_string(),
            label: label.to_string(),
            field_type: *field_type,
            target: target.to_string(),
        })
        .collect()
}

fn config_fields(entries: &[(&str, EditorOption, &[&str])]) -> Vec<ConfigField> {
    entries
        .iter()
        .map(|(pointer, editor, options)| ConfigField {
            pointer: pointer.to_string(),
            editor: *editor,
            enum_options: if options.is_empty() {
                None
            } else {
                Some(options.iter().map(|o| o.to_string()).collect())
            },
        })
        .collect()
}

const CHART_TYPES: &[&str] = &[
    "LineChart",
    "ScatterPlot",
    "StackedArea",
    "DiscreteBar",
    "StackedDiscreteBar",
    "SlopeChart",
    "StackedBar",
    "Marimekko",
];

fn common_config_fields() -> Vec<ConfigField> {
    config_fields(&[
        ("/type", EditorOption::Dropdown, CHART_TYPES),
        ("/hasMapTab", EditorOption::Checkbox, &[]),
        ("/title", EditorOption::Textfield, &[]),
        ("/subtitle", EditorOption::Textarea, &[]),
        ("/note", EditorOption::Textarea, &[]),
        ("/dimensions/0/display/unit", EditorOption::Textfield, &[]),
        ("/dimensions/0/display/shortUnit", EditorOption::Textfield, &[]),
        ("/yAxis/min", EditorOption::Numeric, &[]),
        ("/yAxis/max", EditorOption::Numeric, &[]),
        ("/map/colorScale/customNumericColors", EditorOption::ColorEditor, &[]),
        ("/selectedEntityNames", EditorOption::PrimitiveListEditor, &[]),
    ])
}

fn variable_annotations() -> SourceConfig {
    SourceConfig {
        endpoint: "/api/variable-annotations".to_string(),
        document_field: "grapherConfig".to_string(),
        whitelist: whitelist(&[
            ("id", ColumnType::Number),
            ("variables.name", ColumnType::String),
            ("datasets.name", ColumnType::String),
            ("namespaces.name", ColumnType::String),
            ("variables.description", ColumnType::String),
            ("variables.createdAt", ColumnType::Datetime),
            ("variables.updatedAt", ColumnType::Datetime),
            ("grapherConfig", ColumnType::Json),
        ]),
        columns: columns(&[
            ("id", "Id", FieldType::Number, "id"),
            ("name", "Variable name", FieldType::String, "variables.name"),
            ("datasetname", "Dataset name", FieldType::String, "datasets.name"),
            ("namespacename", "Namespace name", FieldType::String, "namespaces.name"),
            ("description", "Description", FieldType::String, "variables.description"),
            ("createdAt", "Created at", FieldType::Datetime, "variables.createdAt"),
            ("updatedAt", "Updated at", FieldType::Datetime, "variables.updatedAt"),
        ]),
        config_fields: common_config_fields(),
    }
}

fn charts() -> SourceConfig {
    SourceConfig {
        endpoint: "/api/chart-bulk-update".to_string(),
        document_field: "config".to_string(),
        whitelist: whitelist(&[
            ("id", ColumnType::Number),
            ("charts.createdAt", ColumnType::Datetime),
            ("charts.updatedAt", ColumnType::Datetime),
            ("charts.lastEditedAt", ColumnType::Datetime),
            ("charts.publishedAt", ColumnType::Datetime),
            ("lastEditedByUser.fullName", ColumnType::String),
            ("publishedByUser.fullName", ColumnType::String),
            ("config", ColumnType::Json),
        ]),
        columns: columns(&[
            ("id", "Id", FieldType::Number, "id"),
            ("createdAt", "Created at", FieldType::Datetime, "charts.createdAt"),
            ("updatedAt", "Updated at", FieldType::Datetime, "charts.updatedAt"),
            ("lastEditedAt", "Last edited at", FieldType::Datetime, "charts.lastEditedAt"),
            ("publishedAt", "Published at", FieldType::Datetime, "charts.publishedAt"),
            (
                "lastEditedByUser",
                "Last edited by user",
                FieldType::String,
                "lastEditedByUser.fullName",
            ),
            (
                "publishedByUser",
                "Published by user",
                FieldType::String,
                "publishedByUser.fullName",
            ),
        ]),
        config_fields: common_config_fields(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_sources_compile() {
        let settings = Settings::builtin();
        assert_eq!(settings.source_names(), vec!["charts", "variable-annotations"]);

        let source = settings.data_source("variable-annotations").unwrap();
        assert_eq!(source.endpoint, "/api/variable-annotations");
        assert_eq!(source.context.document_field, "grapherConfig");
        assert_eq!(source.registry.len(), 7);
        assert_eq!(source.registry.get("name").unwrap().target, "variables.name");

        let source = settings.data_source("charts").unwrap();
        assert_eq!(source.context.document_field, "config");
        assert_eq!(
            source.context.column_type("charts.publishedAt"),
            Some(ColumnType::Datetime)
        );
    }

    #[test]
    fn test_unknown_source_is_an_error() {
        let err = Settings::builtin().data_source("users").unwrap_err();
        assert!(err.to_string().contains("Unknown source 'users'"));
    }

    #[test]
    fn test_registry_preserves_order() {
        let source = Settings::builtin().data_source("charts").unwrap();
        let keys: Vec<&str> = source.registry.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys[0], "id");
        assert_eq!(keys[6], "publishedByUser");
    }

    #[test]
    fn test_unwhitelisted_target_fails_compilation() {
        let mut config = charts();
        config.columns.push(ReadOnlyColumn {
            key: "email".into(),
            label: "Email".into(),
            field_type: FieldType::String,
            target: "users.email".into(),
        });
        let err = DataSource::compile("charts", &config).unwrap_err();
        assert!(err.to_string().contains("users.email"));
    }

    #[test]
    fn test_loads_yaml_settings() {
        let mut file = tempfile::NamedTempFile::with_suffix(".yaml").unwrap();
        write!(
            file,
            r#"
max_depth: 8
sources:
  posts:
    endpoint: /api/posts
    document_field: content
    whitelist:
      - column: posts.title
        type: string
      - column: posts.createdAt
        type: datetime
      - column: content
        type: json
    columns:
      - key: title
        label: Title
        type: string
        target: posts.title
    config_fields:
      - pointer: /status
        editor: dropdown
        enum_options: [draft, published]
"#
        )
        .unwrap();

        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.max_depth, 8);
        let source = settings.data_source("posts").unwrap();
        assert_eq!(source.endpoint, "/api/posts");
        assert!(source.context.is_whitelisted("posts.createdAt"));
        assert_eq!(source.registry.get("title").unwrap().field_type, FieldType::String);
        assert_eq!(source.config_fields.len(), 1);
        assert_eq!(source.config_fields[0].editor, EditorOption::Dropdown);
        assert_eq!(
            source.config_fields[0].enum_options,
            Some(vec!["draft".to_string(), "published".to_string()])
        );
    }

    #[test]
    fn test_document_field_must_be_json() {
        let mut config = charts();
        config.whitelist.retain(|entry| entry.column != "config");
        let err = DataSource::compile("charts", &config).unwrap_err();
        assert!(err.to_string().contains("Document field 'config'"));

        let mut config = charts();
        config.document_field = "id".into();
        assert!(DataSource::compile("charts", &config).is_err());
    }

    #[test]
    fn test_config_fields_must_be_paths() {
        let mut config = charts();
        config.config_fields.push(ConfigField {
            pointer: "title".into(),
            editor: EditorOption::Textfield,
            enum_options: None,
        });
        let err = DataSource::compile("charts", &config).unwrap_err();
        assert!(err.to_string().contains("must start with '/'"));
    }
}
