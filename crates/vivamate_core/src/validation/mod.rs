//! crates/vivamate_core/src/validation/mod.rs
//!
//! A small declarative schema engine for request payloads.
//!
//! A [`Schema`] is an immutable constraint tree. [`Schema::parse`] walks a
//! `serde_json::Value` against it and returns either the normalized value or
//! every violation it found, in the order the tree declares them. Nothing is
//! thrown and nothing short-circuits: all fields of an object and all checks
//! of a string are evaluated, so callers can report each problem at once.

pub mod schemas;

use regex::Regex;
use serde_json::{Map, Value};
use std::fmt;
use validator::{ValidateEmail, ValidateUrl};

//=========================================================================================
// Issues
//=========================================================================================

/// One step in the path from the root of a payload to an offending value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// The kind of constraint a value violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueCode {
    InvalidType,
    InvalidLiteral,
    InvalidEnumValue,
    TooSmall,
    TooBig,
    InvalidString,
    InvalidUnion,
}

impl IssueCode {
    /// Refinement failures leave the value's shape intact; every other code
    /// means the value did not match the node at all.
    fn is_refinement(self) -> bool {
        matches!(
            self,
            IssueCode::TooSmall | IssueCode::TooBig | IssueCode::InvalidString
        )
    }
}

/// A single violation reported by [`Schema::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub path: Vec<PathSegment>,
    pub code: IssueCode,
    pub message: String,
}

impl Issue {
    fn new(path: &[PathSegment], code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            path: path.to_vec(),
            code,
            message: message.into(),
        }
    }

    /// The dotted field path of this issue (`answers.1`), empty at the root.
    pub fn field(&self) -> String {
        self.path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// The ordered list of violations produced by a failed parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed with {} issue(s)", .issues.len())]
pub struct ValidationErrors {
    issues: Vec<Issue>,
}

impl ValidationErrors {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Dotted field paths in report order, one per issue.
    pub fn fields(&self) -> Vec<String> {
        self.issues.iter().map(Issue::field).collect()
    }
}

//=========================================================================================
// Schema Tree
//=========================================================================================

/// A declarative description of the accepted shape of a value.
#[derive(Debug, Clone)]
pub enum Schema {
    String(StringSchema),
    Literal(String),
    Enum(Vec<String>),
    Object(Vec<Field>),
    Array(Box<Schema>),
    Record(Box<Schema>),
    Union(Vec<Schema>),
    Optional(Box<Schema>),
    Nullable(Box<Schema>),
    Default(Box<Schema>, Value),
}

/// A named member of an object schema.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    schema: Schema,
}

/// A string node and its ordered checks and transforms.
#[derive(Debug, Clone, Default)]
pub struct StringSchema {
    rules: Vec<Rule>,
}

#[derive(Debug, Clone)]
struct Rule {
    check: StringCheck,
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub enum StringCheck {
    Trim,
    MinLength(usize),
    MaxLength(usize),
    Length(usize),
    Email,
    Url,
    Pattern(Regex),
}

impl StringSchema {
    fn with(mut self, check: StringCheck) -> Self {
        self.rules.push(Rule {
            check,
            message: None,
        });
        self
    }

    pub fn trim(self) -> Self {
        self.with(StringCheck::Trim)
    }

    pub fn min(self, len: usize) -> Self {
        self.with(StringCheck::MinLength(len))
    }

    pub fn max(self, len: usize) -> Self {
        self.with(StringCheck::MaxLength(len))
    }

    pub fn length(self, len: usize) -> Self {
        self.with(StringCheck::Length(len))
    }

    pub fn email(self) -> Self {
        self.with(StringCheck::Email)
    }

    pub fn url(self) -> Self {
        self.with(StringCheck::Url)
    }

    pub fn pattern(self, regex: Regex) -> Self {
        self.with(StringCheck::Pattern(regex))
    }

    /// Overrides the message of the most recently added check.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        if let Some(rule) = self.rules.last_mut() {
            rule.message = Some(message.into());
        }
        self
    }

    fn check(&self, text: &str, path: &[PathSegment], issues: &mut Vec<Issue>) -> Outcome {
        let mut current = text.to_string();
        let mut valid = true;

        for rule in &self.rules {
            let len = current.chars().count();
            let failure = match &rule.check {
                StringCheck::Trim => {
                    current = current.trim().to_string();
                    None
                }
                StringCheck::MinLength(min) => (len < *min).then(|| {
                    (
                        IssueCode::TooSmall,
                        format!("String must contain at least {} character(s)", min),
                    )
                }),
                StringCheck::MaxLength(max) => (len > *max).then(|| {
                    (
                        IssueCode::TooBig,
                        format!("String must contain at most {} character(s)", max),
                    )
                }),
                StringCheck::Length(exact) if len < *exact => Some((
                    IssueCode::TooSmall,
                    format!("String must contain exactly {} character(s)", exact),
                )),
                StringCheck::Length(exact) if len > *exact => Some((
                    IssueCode::TooBig,
                    format!("String must contain exactly {} character(s)", exact),
                )),
                StringCheck::Length(_) => None,
                StringCheck::Email => (!current.validate_email())
                    .then(|| (IssueCode::InvalidString, "Invalid email".to_string())),
                StringCheck::Url => (!current.validate_url())
                    .then(|| (IssueCode::InvalidString, "Invalid url".to_string())),
                StringCheck::Pattern(regex) => (!regex.is_match(&current))
                    .then(|| (IssueCode::InvalidString, "Invalid".to_string())),
            };

            if let Some((code, default_message)) = failure {
                valid = false;
                let message = rule.message.clone().unwrap_or(default_message);
                issues.push(Issue::new(path, code, message));
            }
        }

        if valid {
            Outcome::Present(Value::String(current))
        } else {
            Outcome::Invalid
        }
    }
}

//=========================================================================================
// Constructors
//=========================================================================================

pub fn string() -> StringSchema {
    StringSchema::default()
}

pub fn literal(value: impl Into<String>) -> Schema {
    Schema::Literal(value.into())
}

pub fn enumeration<I, S>(options: I) -> Schema
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Schema::Enum(options.into_iter().map(Into::into).collect())
}

pub fn field(name: impl Into<String>, schema: impl Into<Schema>) -> Field {
    Field {
        name: name.into(),
        schema: schema.into(),
    }
}

pub fn object(fields: impl IntoIterator<Item = Field>) -> Schema {
    Schema::Object(fields.into_iter().collect())
}

pub fn array(item: impl Into<Schema>) -> Schema {
    Schema::Array(Box::new(item.into()))
}

pub fn record(value: impl Into<Schema>) -> Schema {
    Schema::Record(Box::new(value.into()))
}

pub fn union(alternatives: impl IntoIterator<Item = Schema>) -> Schema {
    Schema::Union(alternatives.into_iter().collect())
}

impl From<StringSchema> for Schema {
    fn from(schema: StringSchema) -> Self {
        Schema::String(schema)
    }
}

/// Chainable wrappers available on every schema node.
pub trait SchemaExt: Into<Schema> + Sized {
    fn optional(self) -> Schema {
        Schema::Optional(Box::new(self.into()))
    }

    fn nullable(self) -> Schema {
        Schema::Nullable(Box::new(self.into()))
    }

    fn or(self, other: impl Into<Schema>) -> Schema {
        Schema::Union(vec![self.into(), other.into()])
    }

    fn default_to(self, fallback: Value) -> Schema {
        Schema::Default(Box::new(self.into()), fallback)
    }
}

impl<T: Into<Schema>> SchemaExt for T {}

//=========================================================================================
// Parsing
//=========================================================================================

enum Outcome {
    Present(Value),
    Absent,
    Invalid,
}

impl Schema {
    /// Parses `input` against this schema.
    ///
    /// On success the returned value has every transform applied, defaults
    /// substituted and unknown object keys removed.
    pub fn parse(&self, input: &Value) -> Result<Value, ValidationErrors> {
        let mut issues = Vec::new();
        let mut path = Vec::new();
        let outcome = self.walk(Some(input), &mut path, &mut issues);

        if !issues.is_empty() {
            return Err(ValidationErrors { issues });
        }
        match outcome {
            Outcome::Present(value) => Ok(value),
            Outcome::Absent | Outcome::Invalid => Ok(Value::Null),
        }
    }

    fn walk(
        &self,
        value: Option<&Value>,
        path: &mut Vec<PathSegment>,
        issues: &mut Vec<Issue>,
    ) -> Outcome {
        match self {
            Schema::Optional(inner) => match value {
                None => Outcome::Absent,
                Some(value) => inner.walk(Some(value), path, issues),
            },
            Schema::Default(inner, fallback) => match value {
                None => Outcome::Present(fallback.clone()),
                Some(value) => inner.walk(Some(value), path, issues),
            },
            Schema::Nullable(inner) => match value {
                Some(Value::Null) => Outcome::Present(Value::Null),
                other => inner.walk(other, path, issues),
            },
            _ => match value {
                Some(value) => self.walk_present(value, path, issues),
                None => {
                    issues.push(Issue::new(path, IssueCode::InvalidType, "Required"));
                    Outcome::Invalid
                }
            },
        }
    }

    fn walk_present(
        &self,
        value: &Value,
        path: &mut Vec<PathSegment>,
        issues: &mut Vec<Issue>,
    ) -> Outcome {
        match (self, value) {
            (Schema::String(rules), Value::String(text)) => rules.check(text, path, issues),

            (Schema::Literal(expected), Value::String(text)) if text == expected => {
                Outcome::Present(value.clone())
            }
            (Schema::Literal(expected), _) => {
                issues.push(Issue::new(
                    path,
                    IssueCode::InvalidLiteral,
                    format!("Invalid literal value, expected \"{}\"", expected),
                ));
                Outcome::Invalid
            }

            (Schema::Enum(options), Value::String(text)) => {
                if options.iter().any(|option| option == text) {
                    Outcome::Present(value.clone())
                } else {
                    issues.push(Issue::new(
                        path,
                        IssueCode::InvalidEnumValue,
                        format!(
                            "Invalid enum value. Expected {}, received '{}'",
                            quoted_options(options),
                            text
                        ),
                    ));
                    Outcome::Invalid
                }
            }

            (Schema::Object(fields), Value::Object(map)) => {
                let mut output = Map::new();
                let mut valid = true;
                for field in fields {
                    path.push(PathSegment::Key(field.name.clone()));
                    match field.schema.walk(map.get(&field.name), path, issues) {
                        Outcome::Present(parsed) => {
                            output.insert(field.name.clone(), parsed);
                        }
                        Outcome::Absent => {}
                        Outcome::Invalid => valid = false,
                    }
                    path.pop();
                }
                if valid {
                    Outcome::Present(Value::Object(output))
                } else {
                    Outcome::Invalid
                }
            }

            (Schema::Array(item), Value::Array(items)) => {
                let mut output = Vec::with_capacity(items.len());
                let mut valid = true;
                for (index, element) in items.iter().enumerate() {
                    path.push(PathSegment::Index(index));
                    match item.walk(Some(element), path, issues) {
                        Outcome::Present(parsed) => output.push(parsed),
                        Outcome::Absent => output.push(Value::Null),
                        Outcome::Invalid => valid = false,
                    }
                    path.pop();
                }
                if valid {
                    Outcome::Present(Value::Array(output))
                } else {
                    Outcome::Invalid
                }
            }

            (Schema::Record(value_schema), Value::Object(map)) => {
                let mut output = Map::new();
                let mut valid = true;
                for (key, element) in map {
                    path.push(PathSegment::Key(key.clone()));
                    match value_schema.walk(Some(element), path, issues) {
                        Outcome::Present(parsed) => {
                            output.insert(key.clone(), parsed);
                        }
                        Outcome::Absent => {}
                        Outcome::Invalid => valid = false,
                    }
                    path.pop();
                }
                if valid {
                    Outcome::Present(Value::Object(output))
                } else {
                    Outcome::Invalid
                }
            }

            (Schema::Union(alternatives), _) => {
                let mut attempts = Vec::with_capacity(alternatives.len());
                for alternative in alternatives {
                    let mut scratch = Vec::new();
                    let outcome = alternative.walk(Some(value), path, &mut scratch);
                    if scratch.is_empty() && !matches!(outcome, Outcome::Invalid) {
                        return outcome;
                    }
                    attempts.push(scratch);
                }

                // An alternative that matched the shape and only failed its
                // refinements is the more useful report.
                match attempts
                    .into_iter()
                    .find(|attempt| attempt.iter().all(|issue| issue.code.is_refinement()))
                {
                    Some(attempt) => issues.extend(attempt),
                    None => issues.push(Issue::new(path, IssueCode::InvalidUnion, "Invalid input")),
                }
                Outcome::Invalid
            }

            (Schema::Optional(_) | Schema::Nullable(_) | Schema::Default(..), _) => {
                self.walk(Some(value), path, issues)
            }

            (schema, _) => {
                issues.push(Issue::new(
                    path,
                    IssueCode::InvalidType,
                    format!(
                        "Expected {}, received {}",
                        schema.expected_type(),
                        type_name(value)
                    ),
                ));
                Outcome::Invalid
            }
        }
    }

    fn expected_type(&self) -> &'static str {
        match self {
            Schema::String(_) | Schema::Literal(_) | Schema::Enum(_) => "string",
            Schema::Object(_) | Schema::Record(_) => "object",
            Schema::Array(_) => "array",
            Schema::Union(_) => "union",
            Schema::Optional(inner) | Schema::Nullable(inner) | Schema::Default(inner, _) => {
                inner.expected_type()
            }
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn quoted_options(options: &[String]) -> String {
    options
        .iter()
        .map(|option| format!("'{}'", option))
        .collect::<Vec<_>>()
        .join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_checks_report_every_violation_in_order() {
        let schema = string().min(5).email();
        let errors = Schema::from(schema).parse(&json!("ab")).unwrap_err();

        let codes: Vec<_> = errors.issues().iter().map(|i| i.code).collect();
        assert_eq!(codes, vec![IssueCode::TooSmall, IssueCode::InvalidString]);
        assert_eq!(errors.issues()[1].message, "Invalid email");
    }

    #[test]
    fn type_mismatch_suppresses_string_checks() {
        let errors = Schema::from(string().min(2).email())
            .parse(&json!(42))
            .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.issues()[0].code, IssueCode::InvalidType);
        assert_eq!(errors.issues()[0].message, "Expected string, received number");
    }

    #[test]
    fn missing_required_field_reports_required() {
        let schema = object([field("name", string()), field("bio", string().optional())]);
        let errors = schema.parse(&json!({})).unwrap_err();

        assert_eq!(errors.fields(), vec!["name"]);
        assert_eq!(errors.issues()[0].message, "Required");
    }

    #[test]
    fn unknown_keys_are_stripped_and_optional_absent_keys_omitted() {
        let schema = object([field("name", string()), field("bio", string().optional())]);
        let parsed = schema
            .parse(&json!({ "name": "Ada", "role": "admin" }))
            .unwrap();

        assert_eq!(parsed, json!({ "name": "Ada" }));
    }

    #[test]
    fn trim_applies_before_later_checks() {
        let schema = object([field("name", string().trim().min(2))]);

        assert_eq!(
            schema.parse(&json!({ "name": "  Al  " })).unwrap(),
            json!({ "name": "Al" })
        );
        let errors = schema.parse(&json!({ "name": "  A  " })).unwrap_err();
        assert_eq!(errors.issues()[0].code, IssueCode::TooSmall);
    }

    #[test]
    fn default_substitutes_only_when_absent() {
        let schema = object([field(
            "type",
            string().default_to(json!("multiple-choice")),
        )]);

        assert_eq!(
            schema.parse(&json!({})).unwrap(),
            json!({ "type": "multiple-choice" })
        );
        assert_eq!(
            schema.parse(&json!({ "type": "open" })).unwrap(),
            json!({ "type": "open" })
        );
    }

    #[test]
    fn nested_paths_are_dotted() {
        let schema = object([field("answers", array(string()))]);
        let errors = schema
            .parse(&json!({ "answers": ["a", 3, "c", false] }))
            .unwrap_err();

        assert_eq!(errors.fields(), vec!["answers.1", "answers.3"]);
    }

    #[test]
    fn union_prefers_refinement_failures_over_generic_message() {
        let schema = literal("").or(string().url().message("Invalid URL"));

        let errors = schema.parse(&json!("not-a-url")).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.issues()[0].message, "Invalid URL");

        let errors = schema.parse(&json!(12)).unwrap_err();
        assert_eq!(errors.issues()[0].code, IssueCode::InvalidUnion);
        assert_eq!(errors.issues()[0].message, "Invalid input");
    }

    #[test]
    fn enum_rejects_values_outside_the_list() {
        let errors = enumeration(["tip", "fact"]).parse(&json!("joke")).unwrap_err();

        assert_eq!(errors.issues()[0].code, IssueCode::InvalidEnumValue);
        assert_eq!(
            errors.issues()[0].message,
            "Invalid enum value. Expected 'tip' | 'fact', received 'joke'"
        );
    }

    #[test]
    fn exact_length_reports_short_and_long_separately() {
        let schema = Schema::from(string().length(6));

        assert!(schema.parse(&json!("123456")).is_ok());
        assert_eq!(
            schema.parse(&json!("12345")).unwrap_err().issues()[0].code,
            IssueCode::TooSmall
        );
        assert_eq!(
            schema.parse(&json!("1234567")).unwrap_err().issues()[0].code,
            IssueCode::TooBig
        );
    }

    #[test]
    fn nullable_accepts_null_but_optional_does_not() {
        assert_eq!(string().nullable().parse(&json!(null)).unwrap(), json!(null));

        let errors = string().optional().parse(&json!(null)).unwrap_err();
        assert_eq!(errors.issues()[0].message, "Expected string, received null");
    }
}
