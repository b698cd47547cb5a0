use std::collections::BTreeMap;
use std::fmt::Display;

/// A scalar query parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Str(s) => write!(f, "{}", s),
            ParamValue::Int(n) => write!(f, "{}", n),
            ParamValue::Float(n) => write!(f, "{}", n),
            ParamValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Str(value.clone())
    }
}

macro_rules! int_param {
    ($($t:ty),*) => {
        $(impl From<$t> for ParamValue {
            fn from(value: $t) -> Self {
                ParamValue::Int(i64::from(value))
            }
        })*
    };
}

int_param!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        ParamValue::Float(f64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

/// Extra parameters forwarded verbatim to an API method.
///
/// Keys are sorted so the outgoing query string is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    inner: BTreeMap<String, ParamValue>,
}

impl Params {
    /// Create an empty parameter bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter, builder style
    pub fn with<K: Into<String>, V: Into<ParamValue>>(mut self, key: K, value: V) -> Self {
        self.insert(key, value);
        self
    }

    /// Add or replace a parameter
    pub fn insert<K: Into<String>, V: Into<ParamValue>>(
        &mut self,
        key: K,
        value: V,
    ) -> Option<ParamValue> {
        self.inner.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.inner.get(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.inner.iter()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

/// Encode contacts for `lists.add_member_batch`.
///
/// Each record is `[email, col1, col2, ...]`. Fields are joined with `,`,
/// records with `;`, and the result always ends with a `;`.
pub fn encode_batch<S: AsRef<str>>(batch: &[Vec<S>]) -> String {
    let mut encoded = batch
        .iter()
        .map(|record| {
            record
                .iter()
                .map(|field| field.as_ref())
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join(";");
    encoded.push(';');
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_encoding_matches_wire_format() {
        let batch = vec![vec!["a@x.com", "1"], vec!["b@y.com", "2", "3"]];
        assert_eq!(encode_batch(&batch), "a@x.com,1;b@y.com,2,3;");
    }

    #[test]
    fn batch_encoding_simple_pairs() {
        let batch = vec![vec!["a", "b"], vec!["c", "d"]];
        assert_eq!(encode_batch(&batch), "a,b;c,d;");
    }

    #[test]
    fn batch_encoding_single_email_records() {
        let batch = vec![vec!["only@x.com".to_string()]];
        assert_eq!(encode_batch(&batch), "only@x.com;");
    }

    #[test]
    fn empty_batch_is_a_lone_separator() {
        let batch: Vec<Vec<String>> = Vec::new();
        assert_eq!(encode_batch(&batch), ";");
    }

    #[test]
    fn param_values_render_as_query_strings() {
        assert_eq!(ParamValue::from("x").to_string(), "x");
        assert_eq!(ParamValue::from(42u32).to_string(), "42");
        assert_eq!(ParamValue::from(-7i64).to_string(), "-7");
        assert_eq!(ParamValue::from(1.5).to_string(), "1.5");
        assert_eq!(ParamValue::from(1.0).to_string(), "1");
        assert_eq!(ParamValue::from(true).to_string(), "true");
    }

    #[test]
    fn params_are_sorted_by_key() {
        let params = Params::new().with("zeta", 1).with("alpha", "a");
        let keys: Vec<&str> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["alpha", "zeta"]);
    }

    #[test]
    fn params_collect_from_pairs() {
        let params: Params = vec![("limit", 10), ("offset", 20)].into_iter().collect();
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("offset"), Some(&ParamValue::Int(20)));
    }
}
