#![forbid(unsafe_code)]

use serde::{Deserialize, Deserializer};

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`). Use together with `#[serde(default)]`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        title: Option<Option<String>>,
    }

    #[test]
    fn absent_null_and_value_stay_distinct() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"title":null}"#).unwrap();
        let value: Patch = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert_eq!(absent.title, None);
        assert_eq!(null.title, Some(None));
        assert_eq!(value.title, Some(Some("x".to_string())));
    }
}
