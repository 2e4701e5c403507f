//! Field catalog consulted during parsing and validation.
//!
//! The catalog is purely declarative: it enumerates which keys are numeric,
//! boolean, date-valued and so on, plus parameter schemas for aggregate
//! functions. The parser treats a [`SearchConfig`] as read-only for the
//! duration of a parse, so one config can be shared across concurrent parses
//! without coordination.
//!
//! Two key families are *implicit* rather than enumerated: measurement keys
//! (`measurements.*`) and span operation breakdowns (`spans.*`). Both are
//! numeric; a measurement is additionally a duration when the catalog says
//! so. These families are exposed as methods here so the rest of the crate
//! never hard-codes the prefixes.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;

/// Value type of a key or aggregate parameter, as cataloged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Number,
    Integer,
    Duration,
    Date,
    Percentage,
    Boolean,
}

impl ValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Integer => "integer",
            ValueType::Duration => "duration",
            ValueType::Date => "date",
            ValueType::Percentage => "percentage",
            ValueType::Boolean => "boolean",
        }
    }

    /// Numbers and integers compare as one family in validation.
    pub fn is_numeric_like(self) -> bool {
        matches!(self, ValueType::Number | ValueType::Integer)
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a key names a plain field or an aggregate function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Field,
    Function,
}

/// Catalog entry for a single key.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub kind: FieldKind,
    pub value_type: ValueType,
    /// Text keys with ordered values (release versions and the like) may
    /// carry comparison operators.
    pub allow_text_operators: bool,
    pub deprecated: bool,
    pub desc: Option<String>,
}

impl FieldDefinition {
    pub fn field(value_type: ValueType) -> Self {
        Self {
            kind: FieldKind::Field,
            value_type,
            allow_text_operators: false,
            deprecated: false,
            desc: None,
        }
    }

    pub fn function(value_type: ValueType) -> Self {
        Self {
            kind: FieldKind::Function,
            value_type,
            allow_text_operators: false,
            deprecated: false,
            desc: None,
        }
    }

    pub fn with_text_operators(mut self) -> Self {
        self.allow_text_operators = true;
        self
    }
}

/// Parameter kinds an aggregate function can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    /// A field reference, constrained by [`ColumnTypes`].
    Column,
    /// One of a fixed set of options.
    Dropdown,
    /// A literal value of a declared type.
    Value,
}

/// Constraint on a `column` parameter.
#[derive(Debug, Clone)]
pub enum ColumnTypes {
    /// The referenced field must exist and its type must be in this list.
    Types(Vec<ValueType>),
    /// Arbitrary check over the referenced field's name and cataloged type.
    /// A plain `fn` keeps the config `Clone` and shareable.
    Checker(fn(name: &str, data_type: Option<ValueType>) -> bool),
}

/// One parameter of an aggregate function's schema.
#[derive(Debug, Clone)]
pub struct AggregateParameter {
    pub name: String,
    pub kind: ParameterKind,
    pub required: bool,
    /// Only meaningful for [`ParameterKind::Column`].
    pub column_types: Option<ColumnTypes>,
    /// Only meaningful for [`ParameterKind::Dropdown`].
    pub options: Vec<String>,
    /// Only meaningful for [`ParameterKind::Value`].
    pub data_type: Option<ValueType>,
}

impl AggregateParameter {
    pub fn column(name: &str, required: bool, column_types: Option<ColumnTypes>) -> Self {
        Self {
            name: name.to_owned(),
            kind: ParameterKind::Column,
            required,
            column_types,
            options: Vec::new(),
            data_type: None,
        }
    }

    pub fn dropdown(name: &str, required: bool, options: &[&str]) -> Self {
        Self {
            name: name.to_owned(),
            kind: ParameterKind::Dropdown,
            required,
            column_types: None,
            options: options.iter().map(|s| (*s).to_owned()).collect(),
            data_type: None,
        }
    }

    pub fn value(name: &str, required: bool, data_type: ValueType) -> Self {
        Self {
            name: name.to_owned(),
            kind: ParameterKind::Value,
            required,
            column_types: None,
            options: Vec::new(),
            data_type: Some(data_type),
        }
    }
}

/// Return type of an aggregate function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOutput {
    Fixed(ValueType),
    /// The function returns whatever its first column argument is typed as
    /// (percentiles, `avg`, `sum`, ...).
    ColumnArg,
}

/// Schema of one aggregate function.
#[derive(Debug, Clone)]
pub struct AggregateDefinition {
    pub parameters: Vec<AggregateParameter>,
    pub output: AggregateOutput,
}

impl AggregateDefinition {
    pub fn new(parameters: Vec<AggregateParameter>, output: AggregateOutput) -> Self {
        Self { parameters, output }
    }
}

/// The field catalog threaded through [`parse`](crate::parse).
///
/// `Default` yields a catalog with the common observability fields and
/// aggregate functions; [`SearchConfig::empty`] starts from nothing for
/// callers that supply their own.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub numeric_keys: HashSet<String>,
    pub boolean_keys: HashSet<String>,
    pub percentage_keys: HashSet<String>,
    pub date_keys: HashSet<String>,
    pub duration_keys: HashSet<String>,
    /// Text keys that admit comparison operators, not just equality.
    pub text_operator_keys: HashSet<String>,
    /// Whether `AND`/`OR` are recognized as logical operators. When false
    /// they parse as free text.
    pub allow_boolean: bool,
    pub fields: IndexMap<String, FieldDefinition>,
    pub aggregations: IndexMap<String, AggregateDefinition>,
    /// Known measurement keys and their value types. Measurement keys not
    /// listed here default to plain numbers.
    pub measurements: IndexMap<String, ValueType>,
}

impl SearchConfig {
    /// A catalog with nothing in it. Every key parses as text.
    pub fn empty() -> Self {
        Self {
            numeric_keys: HashSet::new(),
            boolean_keys: HashSet::new(),
            percentage_keys: HashSet::new(),
            date_keys: HashSet::new(),
            duration_keys: HashSet::new(),
            text_operator_keys: HashSet::new(),
            allow_boolean: true,
            fields: IndexMap::new(),
            aggregations: IndexMap::new(),
            measurements: IndexMap::new(),
        }
    }

    pub fn is_measurement_key(&self, key: &str) -> bool {
        key.starts_with("measurements.")
    }

    pub fn is_span_op_breakdown_key(&self, key: &str) -> bool {
        key.starts_with("spans.")
    }

    fn measurement_type(&self, key: &str) -> Option<ValueType> {
        if !self.is_measurement_key(key) {
            return None;
        }
        Some(self.measurements.get(key).copied().unwrap_or(ValueType::Number))
    }

    pub fn is_numeric(&self, key: &str) -> bool {
        self.numeric_keys.contains(key)
            || self.is_measurement_key(key)
            || self.is_span_op_breakdown_key(key)
    }

    pub fn is_duration(&self, key: &str) -> bool {
        self.duration_keys.contains(key)
            || self.is_span_op_breakdown_key(key)
            || self.measurement_type(key) == Some(ValueType::Duration)
    }

    pub fn is_boolean(&self, key: &str) -> bool {
        self.boolean_keys.contains(key)
    }

    pub fn is_date(&self, key: &str) -> bool {
        self.date_keys.contains(key)
    }

    pub fn is_percentage(&self, key: &str) -> bool {
        self.percentage_keys.contains(key)
            || self.measurement_type(key) == Some(ValueType::Percentage)
    }

    pub fn allows_text_operators(&self, key: &str) -> bool {
        self.text_operator_keys.contains(key)
            || self
                .fields
                .get(key)
                .is_some_and(|f| f.allow_text_operators)
    }

    /// Cataloged value type for a key, consulting explicit definitions first
    /// and the typed key sets and implicit families after.
    pub fn key_value_type(&self, key: &str) -> Option<ValueType> {
        if let Some(def) = self.fields.get(key) {
            return Some(def.value_type);
        }
        if let Some(ty) = self.measurement_type(key) {
            return Some(ty);
        }
        if self.duration_keys.contains(key) || self.is_span_op_breakdown_key(key) {
            Some(ValueType::Duration)
        } else if self.numeric_keys.contains(key) {
            Some(ValueType::Number)
        } else if self.date_keys.contains(key) {
            Some(ValueType::Date)
        } else if self.boolean_keys.contains(key) {
            Some(ValueType::Boolean)
        } else if self.percentage_keys.contains(key) {
            Some(ValueType::Percentage)
        } else {
            None
        }
    }

    /// Full definition lookup. Keys covered only by the typed sets or the
    /// implicit families get a synthesized plain-field definition, so the
    /// validator can treat every known key uniformly.
    pub fn field_definition(&self, key: &str) -> Option<FieldDefinition> {
        if let Some(def) = self.fields.get(key) {
            return Some(def.clone());
        }
        self.key_value_type(key).map(FieldDefinition::field)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        let mut config = Self::empty();

        for key in ["project.id", "project_id", "issue.id", "stack.colno", "stack.lineno"] {
            config.numeric_keys.insert(key.to_owned());
        }
        for key in ["error.handled", "error.unhandled", "stack.in_app"] {
            config.boolean_keys.insert(key.to_owned());
        }
        for key in ["timestamp", "event.timestamp", "first_seen", "last_seen"] {
            config.date_keys.insert(key.to_owned());
        }
        config.duration_keys.insert("transaction.duration".to_owned());
        for key in ["release.version", "release.build", "release.package", "release.stage"] {
            config.text_operator_keys.insert(key.to_owned());
        }

        for (key, ty) in [
            ("measurements.fcp", ValueType::Duration),
            ("measurements.lcp", ValueType::Duration),
            ("measurements.fid", ValueType::Duration),
            ("measurements.ttfb", ValueType::Duration),
            ("measurements.cls", ValueType::Number),
        ] {
            config.measurements.insert(key.to_owned(), ty);
        }

        builtin_fields(&mut config.fields);
        builtin_aggregations(&mut config.aggregations);

        config
    }
}

fn builtin_fields(fields: &mut IndexMap<String, FieldDefinition>) {
    let entries: [(&str, FieldDefinition); 16] = [
        ("message", FieldDefinition::field(ValueType::String)),
        ("browser.name", FieldDefinition::field(ValueType::String)),
        ("os.name", FieldDefinition::field(ValueType::String)),
        ("environment", FieldDefinition::field(ValueType::String)),
        ("release.version", FieldDefinition::field(ValueType::String).with_text_operators()),
        ("transaction", FieldDefinition::field(ValueType::String)),
        ("transaction.duration", FieldDefinition::field(ValueType::Duration)),
        ("timestamp", FieldDefinition::field(ValueType::Date)),
        ("event.timestamp", FieldDefinition::field(ValueType::Date)),
        ("error.handled", FieldDefinition::field(ValueType::Boolean)),
        ("project.id", FieldDefinition::field(ValueType::Integer)),
        ("issue.id", FieldDefinition::field(ValueType::Integer)),
        ("count", FieldDefinition::function(ValueType::Number)),
        ("count_unique", FieldDefinition::function(ValueType::Integer)),
        ("failure_rate", FieldDefinition::function(ValueType::Percentage)),
        ("p95", FieldDefinition::function(ValueType::Duration)),
    ];
    for (key, def) in entries {
        fields.insert(key.to_owned(), def);
    }
}

fn builtin_aggregations(aggregations: &mut IndexMap<String, AggregateDefinition>) {
    let numeric_columns = || {
        Some(ColumnTypes::Types(vec![
            ValueType::Duration,
            ValueType::Number,
            ValueType::Integer,
            ValueType::Percentage,
        ]))
    };

    let mut insert = |name: &str, def: AggregateDefinition| {
        aggregations.insert(name.to_owned(), def);
    };

    insert("count", AggregateDefinition::new(vec![], AggregateOutput::Fixed(ValueType::Number)));
    insert(
        "count_unique",
        AggregateDefinition::new(
            vec![AggregateParameter::column("column", true, None)],
            AggregateOutput::Fixed(ValueType::Integer),
        ),
    );
    insert(
        "count_if",
        AggregateDefinition::new(
            vec![
                AggregateParameter::column(
                    "column",
                    true,
                    Some(ColumnTypes::Types(vec![
                        ValueType::String,
                        ValueType::Number,
                        ValueType::Integer,
                        ValueType::Duration,
                    ])),
                ),
                AggregateParameter::dropdown(
                    "condition",
                    true,
                    &["equals", "notEquals", "less", "greater"],
                ),
                AggregateParameter::value("value", true, ValueType::Number),
            ],
            AggregateOutput::Fixed(ValueType::Number),
        ),
    );
    insert(
        "failure_rate",
        AggregateDefinition::new(vec![], AggregateOutput::Fixed(ValueType::Percentage)),
    );
    insert(
        "apdex",
        AggregateDefinition::new(
            vec![AggregateParameter::value("threshold", false, ValueType::Number)],
            AggregateOutput::Fixed(ValueType::Number),
        ),
    );
    for name in ["avg", "sum", "max", "min"] {
        insert(
            name,
            AggregateDefinition::new(
                vec![AggregateParameter::column("column", true, numeric_columns())],
                AggregateOutput::ColumnArg,
            ),
        );
    }
    for name in ["p50", "p75", "p95", "p99", "p100"] {
        insert(
            name,
            AggregateDefinition::new(
                vec![AggregateParameter::column("column", false, numeric_columns())],
                AggregateOutput::ColumnArg,
            ),
        );
    }
    insert(
        "percentile",
        AggregateDefinition::new(
            vec![
                AggregateParameter::column("column", true, numeric_columns()),
                AggregateParameter::value("percentile", true, ValueType::Number),
            ],
            AggregateOutput::ColumnArg,
        ),
    );
    insert("eps", AggregateDefinition::new(vec![], AggregateOutput::Fixed(ValueType::Number)));
    insert("epm", AggregateDefinition::new(vec![], AggregateOutput::Fixed(ValueType::Number)));
    insert(
        "last_seen",
        AggregateDefinition::new(vec![], AggregateOutput::Fixed(ValueType::Date)),
    );
}
