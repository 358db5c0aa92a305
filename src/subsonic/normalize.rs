//! Polymorphic field normalization
//!
//! Subsonic builds its JSON by converting an XML document, and the conversion
//! does not know the schema. Two families of quirks follow from that:
//!
//! ### Cardinality
//! A repeated element becomes a JSON array only when it occurs more than once.
//! A single folder is `{"musicFolder": {...}}`, two folders are
//! `{"musicFolder": [{...}, {...}]}`, and no folders at all is simply a missing
//! key. [`normalize_list`] folds all of these into one ordered sequence.
//!
//! ### Scalar types
//! Text content is typed by guessing: an album literally named `1984` arrives
//! as the number `1984`, an artist named `True` arrives as a boolean, and text
//! keeps its HTML entities. [`coerce_to_string`] restores the text.
//!
//! Nothing outside this module and the adapter looks at raw JSON values.

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Number, Value};

use crate::error::{Error, Result};

/// A JSON object as it appears inside a payload
pub type ItemMap = Map<String, Value>;

/// The observed shape of a container field
#[derive(Debug, Clone, Copy)]
pub enum Shape<'a> {
    /// Key missing or `null`
    Absent,
    /// A single bare object
    One(&'a ItemMap),
    /// An array of (usually) objects
    Many(&'a [Value]),
    /// Any scalar where an object or array was expected
    Scalar(&'a Value),
}

impl<'a> Shape<'a> {
    pub fn of(value: Option<&'a Value>) -> Self {
        match value {
            None | Some(Value::Null) => Shape::Absent,
            Some(Value::Object(map)) => Shape::One(map),
            Some(Value::Array(items)) => Shape::Many(items),
            Some(other) => Shape::Scalar(other),
        }
    }
}

/// Name of a JSON value's type, for error messages
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Normalize a container field into an ordered sequence of item maps.
///
/// Absent or `null` yields an empty sequence. Array elements that are not
/// objects are skipped. A scalar is a [`Error::Shape`].
pub fn normalize_list<'a>(
    value: Option<&'a Value>,
    operation: &'static str,
    field: &str,
) -> Result<Vec<&'a ItemMap>> {
    match Shape::of(value) {
        Shape::Absent => Ok(Vec::new()),
        Shape::One(map) => Ok(vec![map]),
        Shape::Many(items) => Ok(items
            .iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                other => {
                    tracing::warn!(
                        "{}: skipping non-object element ({}) in `{}`",
                        operation,
                        kind_of(other),
                        field
                    );
                    None
                }
            })
            .collect()),
        Shape::Scalar(other) => Err(Error::shape(operation, field, kind_of(other))),
    }
}

/// Coerce a text field to its canonical string form.
///
/// `null`/absent becomes `""`, booleans become `"True"`/`"False"`, strings are
/// HTML-unescaped and numbers are written as base-10 integers (fractions are
/// truncated). Arrays and objects are a [`Error::Coercion`].
pub fn coerce_to_string(value: Option<&Value>, field: &str) -> Result<String> {
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::Bool(true)) => Ok("True".to_string()),
        Some(Value::Bool(false)) => Ok("False".to_string()),
        Some(Value::String(text)) => Ok(html_escape::decode_html_entities(text).into_owned()),
        Some(Value::Number(number)) => Ok(number_to_i64(number).to_string()),
        Some(other) => Err(Error::coercion(field, kind_of(other))),
    }
}

/// Integer value of a JSON number, truncating any fraction.
pub fn number_to_i64(number: &Number) -> i64 {
    if let Some(i) = number.as_i64() {
        i
    } else if let Some(u) = number.as_u64() {
        i64::try_from(u).unwrap_or(i64::MAX)
    } else {
        // `as` saturates and truncates toward zero
        number.as_f64().map(|f| f as i64).unwrap_or_default()
    }
}

/// Parse a server timestamp.
///
/// The API is inconsistent across operations: `2013-08-12T00:12:24`,
/// `2013-08-12T00:12:24Z` and `2013-08-12T00:12:24.000Z` all occur. Values
/// without an offset are UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    let naive = trimmed.strip_suffix('Z').unwrap_or(trimmed);

    NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M:%S%.f"))
        .map(|dt| dt.and_utc())
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
}

/// Read a value as an integer: JSON numbers and numeric strings qualify.
fn integer_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => Some(number_to_i64(number)),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn bool_of(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(text) if text.eq_ignore_ascii_case("true") => Some(true),
        Value::String(text) if text.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

/// Typed accessor over one item map.
///
/// Required accessors fail with an error naming `entity` and the field;
/// `opt_*` accessors resolve absence or a type mismatch to `None`.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    entity: &'static str,
    map: &'a ItemMap,
}

impl<'a> Fields<'a> {
    pub fn new(entity: &'static str, map: &'a ItemMap) -> Self {
        Self { entity, map }
    }

    pub fn entity(&self) -> &'static str {
        self.entity
    }

    /// Read the same map under another entity name.
    pub fn as_entity(self, entity: &'static str) -> Self {
        Self { entity, ..self }
    }

    pub fn get(&self, field: &str) -> Option<&'a Value> {
        self.map.get(field).filter(|v| !v.is_null())
    }

    fn require(&self, field: &str) -> Result<&'a Value> {
        self.get(field).ok_or_else(|| Error::missing(self.entity, field))
    }

    /// A text field; absence reads as `""`.
    pub fn text(&self, field: &str) -> Result<String> {
        coerce_to_string(self.get(field), field)
    }

    /// A text field that must be present.
    pub fn required_text(&self, field: &str) -> Result<String> {
        coerce_to_string(Some(self.require(field)?), field)
    }

    /// A text field that may be absent. Arrays and objects read as absent.
    pub fn opt_text(&self, field: &str) -> Option<String> {
        match self.get(field)? {
            Value::Array(_) | Value::Object(_) => None,
            other => coerce_to_string(Some(other), field).ok(),
        }
    }

    /// A required integer; JSON numbers and numeric strings are accepted.
    pub fn int(&self, field: &str) -> Result<i64> {
        let value = self.require(field)?;
        integer_of(value).ok_or_else(|| match value {
            Value::String(_) => Error::coercion(field, "non-numeric string"),
            other => Error::coercion(field, kind_of(other)),
        })
    }

    /// A required identifier.
    pub fn id(&self, field: &str) -> Result<i64> {
        self.int(field)
    }

    /// An optional integer that must fit `T`; anything else is `None`.
    pub fn opt_int<T: TryFrom<i64>>(&self, field: &str) -> Option<T> {
        self.get(field)
            .and_then(integer_of)
            .and_then(|i| T::try_from(i).ok())
    }

    /// An optional identifier.
    pub fn opt_id(&self, field: &str) -> Option<i64> {
        self.opt_int(field)
    }

    pub fn bool(&self, field: &str) -> Result<bool> {
        let value = self.require(field)?;
        bool_of(value).ok_or_else(|| Error::coercion(field, kind_of(value)))
    }

    pub fn opt_bool(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(bool_of)
    }

    /// A marker attribute: present and true, or false.
    pub fn flag(&self, field: &str) -> bool {
        self.opt_bool(field).unwrap_or(false)
    }

    pub fn timestamp(&self, field: &str) -> Result<DateTime<Utc>> {
        match self.require(field)? {
            Value::String(raw) => parse_timestamp(raw)
                .ok_or_else(|| Error::invalid(self.entity, field, format!("bad timestamp {:?}", raw))),
            other => Err(Error::coercion(field, kind_of(other))),
        }
    }

    pub fn opt_timestamp(&self, field: &str) -> Option<DateTime<Utc>> {
        self.get(field)
            .and_then(Value::as_str)
            .and_then(parse_timestamp)
    }

    /// A duration encoded as whole seconds.
    pub fn duration(&self, field: &str) -> Result<Duration> {
        let seconds = self.int(field)?;
        u64::try_from(seconds)
            .map(Duration::from_secs)
            .map_err(|_| Error::invalid(self.entity, field, format!("negative duration {}", seconds)))
    }

    pub fn opt_duration(&self, field: &str) -> Option<Duration> {
        self.opt_int::<u64>(field).map(Duration::from_secs)
    }

    /// A nested container field, normalized like [`normalize_list`].
    pub fn list(&self, operation: &'static str, field: &str) -> Result<Vec<&'a ItemMap>> {
        normalize_list(self.get(field), operation, field)
    }
}

/// A payload section that must be present as an object.
pub fn section<'a>(payload: &'a ItemMap, operation: &'static str, key: &str) -> Result<&'a ItemMap> {
    match payload.get(key) {
        Some(Value::Object(map)) => Ok(map),
        None | Some(Value::Null) => Err(Error::shape(operation, key, "nothing")),
        Some(other) => Err(Error::shape(operation, key, kind_of(other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> ItemMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_absent_and_null_normalize_to_empty() {
        assert!(normalize_list(None, "op", "f").unwrap().is_empty());
        assert!(normalize_list(Some(&Value::Null), "op", "f").unwrap().is_empty());
    }

    #[test]
    fn test_single_object_normalizes_to_one() {
        let value = json!({"id": 0, "name": "Music"});
        let items = normalize_list(Some(&value), "op", "f").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["name"], json!("Music"));
    }

    #[test]
    fn test_array_keeps_order_and_skips_non_objects() {
        let value = json!([{"id": 1}, 7, "x", {"id": 2}]);
        let items = normalize_list(Some(&value), "op", "f").unwrap();
        let ids: Vec<_> = items.iter().map(|m| m["id"].clone()).collect();
        assert_eq!(ids, vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_scalar_is_shape_error() {
        let value = json!(42);
        let err = normalize_list(Some(&value), "getMusicFolders", "musicFolder").unwrap_err();
        assert_eq!(
            err,
            Error::Shape {
                operation: "getMusicFolders",
                field: "musicFolder".to_string(),
                found: "number"
            }
        );
    }

    #[test]
    fn test_coerce_scalars() {
        assert_eq!(coerce_to_string(None, "album").unwrap(), "");
        assert_eq!(coerce_to_string(Some(&Value::Null), "album").unwrap(), "");
        assert_eq!(coerce_to_string(Some(&json!(true)), "artist").unwrap(), "True");
        assert_eq!(coerce_to_string(Some(&json!(false)), "artist").unwrap(), "False");
        assert_eq!(coerce_to_string(Some(&json!(1984)), "album").unwrap(), "1984");
        assert_eq!(coerce_to_string(Some(&json!(311.9)), "artist").unwrap(), "311");
        assert_eq!(coerce_to_string(Some(&json!(-2.5)), "title").unwrap(), "-2");
        assert_eq!(
            coerce_to_string(Some(&json!("Simon &amp; Garfunkel")), "artist").unwrap(),
            "Simon & Garfunkel"
        );
    }

    #[test]
    fn test_coerce_rejects_containers() {
        let err = coerce_to_string(Some(&json!(["a"])), "title").unwrap_err();
        assert_eq!(
            err,
            Error::Coercion {
                field: "title".to_string(),
                found: "array"
            }
        );
        assert!(coerce_to_string(Some(&json!({})), "title").is_err());
    }

    #[test]
    fn test_coerce_unescapes_html_entities() {
        let coerce = |text: &str| coerce_to_string(Some(&json!(text)), "artist").unwrap();
        assert_eq!(coerce("plain"), "plain");
        assert_eq!(coerce("&lt;b&gt; &quot;x&quot;"), "<b> \"x\"");
        assert_eq!(coerce("Don&#39;t &#x27;stop&#X27;"), "Don't 'stop'");
        assert_eq!(coerce("Beyonc&eacute; &hellip; &copy;"), "Beyonc\u{e9} \u{2026} \u{a9}");
        assert_eq!(coerce("R&B &amp; Soul"), "R&B & Soul");
        assert_eq!(coerce("R&B & &bogus; &"), "R&B & &bogus; &");
        assert_eq!(coerce("&amp;amp;"), "&amp;");
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = "2013-08-12T00:12:24Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(parse_timestamp("2013-08-12T00:12:24"), Some(expected));
        assert_eq!(parse_timestamp("2013-08-12T00:12:24Z"), Some(expected));
        assert_eq!(
            parse_timestamp("2013-08-12T00:12:24.000Z"),
            Some(expected)
        );
        assert_eq!(
            parse_timestamp("2013-08-12T02:12:24+02:00"),
            Some(expected)
        );
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2013-08-12"), None);
    }

    #[test]
    fn test_fields_ids_accept_numbers_and_strings() {
        let item = map(json!({"id": "405", "parent": 1, "bad": "al-3", "flag": true}));
        let fields = Fields::new("directory", &item);
        assert_eq!(fields.id("id").unwrap(), 405);
        assert_eq!(fields.id("parent").unwrap(), 1);
        assert!(matches!(fields.id("bad"), Err(Error::Coercion { .. })));
        assert!(matches!(fields.id("flag"), Err(Error::Coercion { found: "boolean", .. })));
        assert_eq!(
            fields.id("missing").unwrap_err(),
            Error::missing("directory", "missing")
        );
    }

    #[test]
    fn test_fields_optional_never_fail() {
        let item = map(json!({
            "coverArt": "al-405",
            "track": 3,
            "discNumber": "2",
            "year": null,
            "genre": 1980,
            "artist": ["x"]
        }));
        let fields = Fields::new("media item", &item);
        assert_eq!(fields.opt_id("coverArt"), None);
        assert_eq!(fields.opt_int::<i32>("track"), Some(3));
        assert_eq!(fields.opt_int::<i32>("discNumber"), Some(2));
        assert_eq!(fields.opt_int::<i32>("year"), None);
        assert_eq!(fields.opt_text("genre"), Some("1980".to_string()));
        assert_eq!(fields.opt_text("artist"), None);
        assert_eq!(fields.opt_text("absent"), None);
        assert_eq!(fields.opt_int::<u32>("absent"), None);
    }

    #[test]
    fn test_fields_opt_int_rejects_out_of_range() {
        let item = map(json!({"count": -1}));
        let fields = Fields::new("artist", &item);
        assert_eq!(fields.opt_int::<u32>("count"), None);
        assert_eq!(fields.opt_int::<i64>("count"), Some(-1));
    }

    #[test]
    fn test_fields_timestamp_and_duration() {
        let item = map(json!({
            "created": "2014-01-01T00:00:00",
            "broken": "01/01/2014",
            "duration": 215,
            "negative": -5
        }));
        let fields = Fields::new("media item", &item);
        assert_eq!(
            fields.timestamp("created").unwrap(),
            "2014-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
        assert!(matches!(
            fields.timestamp("broken"),
            Err(Error::Build { entity: "media item", .. })
        ));
        assert_eq!(fields.duration("duration").unwrap(), Duration::from_secs(215));
        assert!(matches!(fields.duration("negative"), Err(Error::Build { .. })));
        assert!(fields.opt_timestamp("broken").is_none());
    }

    #[test]
    fn test_fields_bools() {
        let item = map(json!({"isDir": true, "isVideo": "false", "valid": 1}));
        let fields = Fields::new("media item", &item);
        assert!(fields.flag("isDir"));
        assert!(!fields.flag("isVideo"));
        assert!(!fields.flag("absent"));
        assert!(matches!(fields.bool("valid"), Err(Error::Coercion { found: "number", .. })));
    }

    #[test]
    fn test_section_requires_object() {
        let payload = map(json!({"license": {"valid": true}, "nowPlaying": ""}));
        assert!(section(&payload, "getLicense", "license").is_ok());
        assert!(matches!(
            section(&payload, "getNowPlaying", "nowPlaying"),
            Err(Error::Shape { found: "string", .. })
        ));
        assert!(matches!(
            section(&payload, "getIndexes", "indexes"),
            Err(Error::Shape { found: "nothing", .. })
        ));
    }
}
