use serde_json::{Map, Value, json};

use crate::numeric::{display_value, truthy};

/// A loosely-shaped user record; field names may be lowercase or capitalized.
pub type UserRecord = Map<String, Value>;

/// Resolves one display field from a record by checking candidate keys in
/// priority order. The first truthy value wins; otherwise `default` is used.
#[derive(Debug, Clone, Copy)]
pub struct FieldResolver {
    pub candidates: &'static [&'static str],
    pub default: &'static str,
}

impl FieldResolver {
    pub const fn new(candidates: &'static [&'static str], default: &'static str) -> Self {
        Self {
            candidates,
            default,
        }
    }

    pub fn resolve(&self, record: &UserRecord) -> String {
        self.candidates
            .iter()
            .filter_map(|key| record.get(*key))
            .find(|value| truthy(value))
            .map(display_value)
            .unwrap_or_else(|| self.default.to_string())
    }
}

pub const NAME_FIELD: FieldResolver = FieldResolver::new(&["name", "Name"], "Anon");
pub const AGE_FIELD: FieldResolver = FieldResolver::new(&["age", "Age"], "??");
pub const CITY_FIELD: FieldResolver = FieldResolver::new(&["city", "City"], "");

/// Formats a record as `"<name> - age:<age> - city:<city>"`. Missing or falsy
/// fields fall back to their defaults; this never fails.
pub fn get_user_data(user: &UserRecord) -> String {
    let name = NAME_FIELD.resolve(user);
    let age = AGE_FIELD.resolve(user);
    let city = CITY_FIELD.resolve(user);

    format!("{name} - age:{age} - city:{city}")
}

/// Formats any JSON value; non-objects are treated as an empty record.
pub fn get_user_data_from_value(value: &Value) -> String {
    match value {
        Value::Object(record) => get_user_data(record),
        _ => get_user_data(&UserRecord::new()),
    }
}

/// The three fixed records formatted on every run.
pub fn sample_users() -> Vec<UserRecord> {
    [
        json!({ "Name": "Ivan", "age": 30, "City": "Kyiv" }),
        json!({ "Name": "Olga", "age": 25 }),
        json!({ "age": 41, "Name": "Stepan", "City": "Lviv" }),
    ]
    .into_iter()
    .filter_map(|value| match value {
        Value::Object(record) => Some(record),
        _ => None,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: Value) -> UserRecord {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn mixed_case_fields() {
        let user = record(json!({ "Name": "Ivan", "age": 30, "City": "Kyiv" }));
        assert_eq!(get_user_data(&user), "Ivan - age:30 - city:Kyiv");
    }

    #[test]
    fn empty_record_uses_defaults() {
        assert_eq!(get_user_data(&UserRecord::new()), "Anon - age:?? - city:");
    }

    #[test]
    fn lowercase_key_is_preferred() {
        let user = record(json!({ "name": "low", "Name": "High" }));
        assert_eq!(NAME_FIELD.resolve(&user), "low");
    }

    #[test]
    fn falsy_lowercase_falls_through_to_capitalized() {
        let user = record(json!({ "name": "", "Name": "Olga", "age": 0, "Age": 25 }));
        assert_eq!(get_user_data(&user), "Olga - age:25 - city:");
    }

    #[test]
    fn falsy_everywhere_uses_default() {
        let user = record(json!({ "age": 0, "city": null, "City": false }));
        assert_eq!(get_user_data(&user), "Anon - age:?? - city:");
    }

    #[test]
    fn non_string_values_are_rendered() {
        let user = record(json!({ "name": true, "age": 30.5, "city": ["a", "b"] }));
        assert_eq!(get_user_data(&user), "true - age:30.5 - city:a,b");
    }

    #[test]
    fn non_object_value_is_empty_record() {
        assert_eq!(get_user_data_from_value(&json!(5)), "Anon - age:?? - city:");
        assert_eq!(
            get_user_data_from_value(&json!({ "Name": "Stepan", "age": 41, "City": "Lviv" })),
            "Stepan - age:41 - city:Lviv"
        );
    }

    #[test]
    fn sample_users_format() {
        let formatted: Vec<String> = sample_users().iter().map(get_user_data).collect();
        assert_eq!(
            formatted,
            vec![
                "Ivan - age:30 - city:Kyiv",
                "Olga - age:25 - city:",
                "Stepan - age:41 - city:Lviv",
            ]
        );
    }
}
