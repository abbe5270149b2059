use serde::de::DeserializeOwned;
use serde_json::Value;

/// A read-only view over a decoded JSON reply.
///
/// Looking up a field that isn't there gives `None`, never an error.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Model(Value);

impl Model {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Looks up a top-level field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Looks up a top-level field holding a string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(Value::as_i64)
    }

    pub fn get_array(&self, field: &str) -> Option<&Vec<Value>> {
        self.get(field).and_then(Value::as_array)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Names of the top-level fields. Empty unless the reply was a JSON object.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0
            .as_object()
            .into_iter()
            .flat_map(|object| object.keys().map(String::as_str))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Deserializes the whole reply into a typed structure.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.0)
    }
}

impl From<Value> for Model {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}
