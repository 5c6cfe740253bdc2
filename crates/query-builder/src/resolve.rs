//! Rewrites `alias.field` tokens in free-form SQL text into `alias.column`.

use crate::{ast::common::TableReference, error::BuildError};
use mapping::context::MappingContext;
use regex::Regex;
use std::sync::LazyLock;
use tracing::trace;

/// `alias.token`, where the alias starts with a letter or underscore so
/// that numeric literals such as `1.5` are left alone.
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Za-z_]\w*)\.(\w+)").expect("valid token pattern"));

/// Resolves every `alias.token` occurrence in `text` against `tables`.
///
/// Each alias must match exactly one table reference. A token that is a
/// declared field of the bound class becomes its mapped column; any other
/// token is assumed to be a column already. Matches are rewritten in place,
/// left to right.
///
/// The scan is purely textual: a quoted literal such as `'a.b'` is also seen
/// as a token. Pass such values as parameters.
pub fn resolve_tokens(
    text: &str,
    tables: &[TableReference],
    ctx: &MappingContext,
) -> Result<String, BuildError> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for caps in TOKEN.captures_iter(text) {
        let (Some(whole), Some(alias), Some(token)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        let (alias, token) = (alias.as_str(), token.as_str());

        let mut matching = tables.iter().filter(|t| t.alias == alias);
        let table = match (matching.next(), matching.count()) {
            (Some(table), 0) => table,
            (first, rest) => {
                return Err(BuildError::UnresolvedAlias {
                    alias: alias.to_string(),
                    token: token.to_string(),
                    matches: usize::from(first.is_some()) + rest,
                });
            }
        };

        let column = ctx.info(&table.bound_type).resolve_token(token);
        trace!(alias, token, column = %column, class = %table.bound_type, "Resolved token");

        out.push_str(&text[last..whole.start()]);
        out.push_str(alias);
        out.push('.');
        out.push_str(&column);
        last = whole.end();
    }

    out.push_str(&text[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapping::{field::FieldDef, registry::EntityRegistry};
    use tracing_test::traced_test;

    fn context() -> MappingContext {
        let mut registry = EntityRegistry::new("models");
        registry
            .register(
                "User",
                &[
                    FieldDef::new("userId"),
                    FieldDef::new("firstName"),
                    FieldDef::with_column("mail", "email_address"),
                ],
            )
            .unwrap();
        registry
            .register("Order", &[FieldDef::new("orderId"), FieldDef::new("userId")])
            .unwrap();
        MappingContext::new(registry)
    }

    fn table(ctx: &MappingContext, table: &str, alias: &str) -> TableReference {
        TableReference {
            table: table.to_string(),
            alias: alias.to_string(),
            bound_type: ctx.class_for_table(table),
        }
    }

    #[test]
    fn test_declared_field_maps_to_snake_case() {
        let ctx = context();
        let tables = [table(&ctx, "user", "u")];
        assert_eq!(
            resolve_tokens("u.firstName = :v", &tables, &ctx).unwrap(),
            "u.first_name = :v"
        );
    }

    #[test]
    fn test_override_column_is_used() {
        let ctx = context();
        let tables = [table(&ctx, "user", "u")];
        assert_eq!(
            resolve_tokens("u.mail LIKE :m", &tables, &ctx).unwrap(),
            "u.email_address LIKE :m"
        );
    }

    #[test]
    fn test_undeclared_token_passes_through() {
        let ctx = context();
        let tables = [table(&ctx, "user", "u")];
        assert_eq!(
            resolve_tokens("u.legacy_flag = 1 AND u.someThing = 2", &tables, &ctx).unwrap(),
            "u.legacy_flag = 1 AND u.someThing = 2"
        );
    }

    #[test]
    fn test_unregistered_class_passes_tokens_through() {
        let ctx = context();
        let tables = [table(&ctx, "audit_log", "a")];
        assert_eq!(
            resolve_tokens("a.createdAt > :since", &tables, &ctx).unwrap(),
            "a.createdAt > :since"
        );
    }

    #[test]
    fn test_unknown_alias_fails() {
        let ctx = context();
        let tables = [table(&ctx, "user", "a"), table(&ctx, "order", "b")];
        let err = resolve_tokens("c.userId = a.userId", &tables, &ctx).unwrap_err();
        assert_eq!(
            err,
            BuildError::UnresolvedAlias {
                alias: "c".into(),
                token: "userId".into(),
                matches: 0,
            }
        );
    }

    #[test]
    fn test_ambiguous_alias_fails() {
        let ctx = context();
        let tables = [table(&ctx, "user", "x"), table(&ctx, "order", "x")];
        let err = resolve_tokens("x.userId = 1", &tables, &ctx).unwrap_err();
        assert!(matches!(err, BuildError::UnresolvedAlias { matches: 2, .. }));
    }

    #[test]
    fn test_every_occurrence_is_rewritten_in_place() {
        let ctx = context();
        let tables = [table(&ctx, "user", "u"), table(&ctx, "order", "o")];
        assert_eq!(
            resolve_tokens(
                "u.userId = o.userId AND (u.firstName = :a OR u.firstName = :b)",
                &tables,
                &ctx
            )
            .unwrap(),
            "u.user_id = o.user_id AND (u.first_name = :a OR u.first_name = :b)"
        );
    }

    #[test]
    fn test_field_name_prefix_of_another_is_not_confused() {
        let ctx = context();
        let tables = [table(&ctx, "user", "u")];
        // `u.userIdentity` is not the declared `userId`.
        assert_eq!(
            resolve_tokens("u.userIdentity = u.userId", &tables, &ctx).unwrap(),
            "u.userIdentity = u.user_id"
        );
    }

    #[test]
    fn test_wildcards_params_and_numbers_are_ignored() {
        let ctx = context();
        let tables = [table(&ctx, "user", "u")];
        assert_eq!(
            resolve_tokens("u.* , 1.5, :param1", &tables, &ctx).unwrap(),
            "u.* , 1.5, :param1"
        );
    }

    #[test]
    fn test_text_without_tokens_is_unchanged() {
        let ctx = context();
        assert_eq!(resolve_tokens("COUNT(*)", &[], &ctx).unwrap(), "COUNT(*)");
        assert_eq!(resolve_tokens("", &[], &ctx).unwrap(), "");
    }

    #[test]
    fn test_function_arguments_are_resolved() {
        let ctx = context();
        let tables = [table(&ctx, "user", "u")];
        assert_eq!(
            resolve_tokens("LOWER(u.firstName)", &tables, &ctx).unwrap(),
            "LOWER(u.first_name)"
        );
    }

    #[test]
    #[traced_test]
    fn test_resolution_is_traced() {
        let ctx = context();
        let tables = [table(&ctx, "user", "u")];
        resolve_tokens("u.firstName", &tables, &ctx).unwrap();
        assert!(logs_contain("Resolved token"));
    }
}
