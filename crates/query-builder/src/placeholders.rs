use std::fmt::Display;

/// Replaces every `%key%` marker in `sql` with the matching value, verbatim.
///
/// Meant for fragments that cannot be bound as parameters (HAVING, LIMIT)
/// and are passed to `QueryBuilder::expression`. Values are not escaped and
/// must be trusted. Unknown markers are left in place.
pub fn expand_placeholders<K, V>(sql: &str, values: impl IntoIterator<Item = (K, V)>) -> String
where
    K: AsRef<str>,
    V: Display,
{
    values.into_iter().fold(sql.to_string(), |acc, (key, value)| {
        acc.replace(&format!("%{}%", key.as_ref()), &value.to_string())
    })
}
