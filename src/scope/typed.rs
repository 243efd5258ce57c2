//! Typed reads of string-valued sections.

use serde::de::DeserializeOwned;
use toml::{Table, Value};

use super::{ConfigScope, SettingsMap, SubsystemError};

impl ConfigScope {
    /// Deserializes the section `name` into `T`.
    ///
    /// Entry values are coerced to the most specific scalar (bool, integer,
    /// float, string) and dotted keys nest: `server.port = 8080` fills
    /// `server: { port: u16 }`.
    pub fn section_as<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, SubsystemError> {
        let Some(entries) = self.read_section(name)? else {
            return Ok(None);
        };

        Value::Table(to_table(&entries))
            .try_into()
            .map(Some)
            .map_err(|source| SubsystemError::Deserialize {
                section: name.to_string(),
                source,
            })
    }
}

fn to_table(entries: &SettingsMap) -> Table {
    let mut table = Table::new();
    for (key, value) in entries {
        let path: Vec<&str> = key.split('.').collect();
        insert_at_path(&mut table, &path, typed_value(value));
    }
    table
}

fn insert_at_path(table: &mut Table, path: &[&str], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        return;
    };

    if rest.is_empty() {
        table.insert(first.to_string(), value);
        return;
    }

    if !matches!(table.get(*first), Some(Value::Table(_))) {
        table.insert(first.to_string(), Value::Table(Table::new()));
    }

    if let Some(Value::Table(nested)) = table.get_mut(*first) {
        insert_at_path(nested, rest, value);
    }
}

/// Types an attribute value. Surrounding whitespace is ignored, and numbers
/// with a redundant leading zero (`007`) or a bare trailing dot (`1.`) stay
/// strings, since they are usually codes or versions rather than quantities.
fn typed_value(raw: &str) -> Value {
    let s = raw.trim();
    if s.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }

    match number_shape(s) {
        Some(NumberShape::Integer) => {
            if let Ok(i) = s.parse::<i64>() {
                return Value::Integer(i);
            }
        }
        Some(NumberShape::Decimal) => {
            if let Ok(f) = s.parse::<f64>() {
                return Value::Float(f);
            }
        }
        None => {}
    }

    Value::String(raw.to_string())
}

enum NumberShape {
    Integer,
    Decimal,
}

fn number_shape(s: &str) -> Option<NumberShape> {
    let unsigned = s.strip_prefix(|c| c == '-' || c == '+').unwrap_or(s);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };

    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || (whole.len() > 1 && whole.starts_with('0')) {
        return None;
    }
    match fraction {
        None => Some(NumberShape::Integer),
        Some(fraction) if all_digits(fraction) => Some(NumberShape::Decimal),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::fs;
    use tempfile::tempdir;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Settings {
        name: String,
        debug: bool,
        server: Server,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Server {
        port: u16,
        ratio: f64,
    }

    fn scope_with(content: &str) -> (tempfile::TempDir, ConfigScope) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.config");
        fs::write(&path, content).unwrap();
        (dir, ConfigScope::with_xml("typed", path))
    }

    #[test]
    fn test_section_as_coerces_and_nests() {
        let (_dir, scope) = scope_with(
            r#"<configuration>
              <appSettings>
                <add key="name" value="demo" />
                <add key="debug" value="TRUE" />
                <add key="server.port" value="8080" />
                <add key="server.ratio" value="0.5" />
              </appSettings>
            </configuration>"#,
        );

        let settings: Settings = scope.section_as("appSettings").unwrap().unwrap();
        assert_eq!(
            settings,
            Settings {
                name: "demo".into(),
                debug: true,
                server: Server {
                    port: 8080,
                    ratio: 0.5,
                },
            }
        );
    }

    #[test]
    fn test_section_as_missing_section() {
        let (_dir, scope) = scope_with("<configuration/>");
        let settings: Option<Settings> = scope.section_as("appSettings").unwrap();
        assert!(settings.is_none());
    }

    #[test]
    fn test_section_as_type_mismatch() {
        let (_dir, scope) = scope_with(
            r#"<configuration><appSettings><add key="name" value="demo" /></appSettings></configuration>"#,
        );
        let result = scope.section_as::<Settings>("appSettings");
        assert!(matches!(result, Err(SubsystemError::Deserialize { ref section, .. }) if section == "appSettings"));
    }

    #[test]
    fn test_typed_value() {
        assert_eq!(typed_value("false"), Value::Boolean(false));
        assert_eq!(typed_value("-42"), Value::Integer(-42));
        assert_eq!(typed_value("+7"), Value::Integer(7));
        assert_eq!(typed_value(" 8080 "), Value::Integer(8080));
        assert_eq!(typed_value("0"), Value::Integer(0));
        assert_eq!(typed_value("1.25"), Value::Float(1.25));
        assert_eq!(typed_value("0.5"), Value::Float(0.5));
    }

    #[test]
    fn test_typed_value_keeps_codes_as_strings() {
        assert_eq!(typed_value("007"), Value::String("007".into()));
        assert_eq!(typed_value("1."), Value::String("1.".into()));
        assert_eq!(typed_value(".5"), Value::String(".5".into()));
        assert_eq!(typed_value("1.2.3"), Value::String("1.2.3".into()));
        assert_eq!(typed_value("-"), Value::String("-".into()));
        assert_eq!(typed_value("1e5"), Value::String("1e5".into()));
        assert_eq!(typed_value("99999999999999999999"), Value::String("99999999999999999999".into()));
    }
}
