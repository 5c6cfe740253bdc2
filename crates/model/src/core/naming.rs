//! Conversions between identifier-case field names (`firstName`, `OrderLine`)
//! and snake-case storage names (`first_name`, `order_line`).

pub const DELIMITER: char = '_';

/// Converts an identifier to snake case.
///
/// A string made only of lower-case letters is returned untouched. Anything
/// else gets the delimiter inserted before every upper-case letter that is not
/// the first character, and is then lower-cased. The output never contains an
/// upper-case ASCII letter, so applying the conversion twice is a no-op.
pub fn to_snake_case(value: &str) -> String {
    if is_lowercase_word(value) {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len() + 4);
    for (i, ch) in value.chars().enumerate() {
        if i > 0 && ch.is_ascii_uppercase() {
            out.push(DELIMITER);
        }
        out.push(ch.to_ascii_lowercase());
    }
    out
}

/// Converts a snake-case name to identifier case: every delimited segment
/// gets its first letter capitalised and the delimiters are dropped.
///
/// `order_line` becomes `OrderLine`. Callers mapping a column to a field
/// lower the first letter with [`lower_first`].
pub fn to_identifier_case(value: &str) -> String {
    value
        .split(DELIMITER)
        .map(upper_first)
        .collect::<Vec<_>>()
        .concat()
}

pub fn lower_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

pub fn upper_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Field name for a storage column when no override is declared.
pub fn column_to_field(column: &str) -> String {
    lower_first(&to_identifier_case(column))
}

fn is_lowercase_word(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDENTIFIERS: &[&str] = &[
        "firstName",
        "customerId",
        "OrderLine",
        "id",
        "ABC",
        "already_snake",
        "mixed_Case",
        "createdAt",
        "x",
        "",
    ];

    #[test]
    fn test_snake_case() {
        assert_eq!(to_snake_case("firstName"), "first_name");
        assert_eq!(to_snake_case("OrderLine"), "order_line");
        assert_eq!(to_snake_case("ABC"), "a_b_c");
        assert_eq!(to_snake_case("order"), "order");
        assert_eq!(to_snake_case("first_name"), "first_name");
    }

    #[test]
    fn test_snake_case_is_idempotent() {
        for id in IDENTIFIERS {
            let once = to_snake_case(id);
            assert_eq!(to_snake_case(&once), once, "not idempotent for {id:?}");
        }
    }

    #[test]
    fn test_identifier_case() {
        assert_eq!(to_identifier_case("first_name"), "FirstName");
        assert_eq!(to_identifier_case("order"), "Order");
        assert_eq!(to_identifier_case("customer_order_line"), "CustomerOrderLine");
    }

    #[test]
    fn test_column_to_field_reverses_snake_case() {
        for id in ["firstName", "customerId", "createdAt", "total", "orderLineNo"] {
            assert_eq!(column_to_field(&to_snake_case(id)), id);
        }
    }

    #[test]
    fn test_first_letter_helpers() {
        assert_eq!(lower_first("Customer"), "customer");
        assert_eq!(upper_first("customer"), "Customer");
        assert_eq!(lower_first(""), "");
    }
}
