use crate::core::value::Value;

/// Ordered named parameters for a statement. Names are stored without the
/// leading `:` used in the SQL text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, Value)>,
}

impl Params {
    pub const PREFIX: &'static str = "param";

    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `value` under the next `paramN` name (numbered from 1) and
    /// returns the placeholder to splice into the SQL, e.g. `:param3`.
    pub fn push(&mut self, value: impl Into<Value>) -> String {
        let name = format!("{}{}", Self::PREFIX, self.entries.len() + 1);
        let placeholder = format!(":{name}");
        self.entries.push((name, value.into()));
        placeholder
    }

    /// Binds an explicitly named parameter. A leading `:` is ignored;
    /// binding the same name twice keeps the last value.
    pub fn bind(&mut self, name: &str, value: impl Into<Value>) {
        let name = name.trim_start_matches(':');
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.bind(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        let name = name.trim_start_matches(':');
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (name, value) in iter {
            params.bind(name.as_ref(), value);
        }
        params
    }
}
