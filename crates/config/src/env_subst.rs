/// Expand `${VAR}` and `${VAR:-fallback}` placeholders from the process
/// environment.
///
/// A `${VAR}` whose variable is unset is left as-is so validation can point
/// at it.
pub fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // Unterminated: keep the remainder verbatim.
            out.push_str(&rest[start..]);
            return out;
        };

        let body = &after[..end];
        let (name, fallback) = match body.split_once(":-") {
            Some((name, fallback)) => (name, Some(fallback)),
            None => (body, None),
        };
        match (lookup(name).filter(|_| !name.is_empty()), fallback) {
            (Some(value), _) => out.push_str(&value),
            (None, Some(fallback)) => out.push_str(fallback),
            (None, None) => {
                out.push_str("${");
                out.push_str(body);
                out.push('}');
            },
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "SUPPORT_BOT_TOKEN" => Some("123:abc".to_string()),
            "EMPTY" => Some(String::new()),
            _ => None,
        }
    }

    #[test]
    fn substitutes_known_var() {
        assert_eq!(
            substitute_env_with("token = \"${SUPPORT_BOT_TOKEN}\"", lookup),
            "token = \"123:abc\""
        );
    }

    #[test]
    fn leaves_unknown_var() {
        assert_eq!(
            substitute_env_with("${BOTMUX_NONEXISTENT}", lookup),
            "${BOTMUX_NONEXISTENT}"
        );
    }

    #[test]
    fn fallback_used_only_when_unset() {
        assert_eq!(substitute_env_with("${MISSING:-60}", lookup), "60");
        assert_eq!(substitute_env_with("${SUPPORT_BOT_TOKEN:-x}", lookup), "123:abc");
        assert_eq!(substitute_env_with("[${EMPTY:-x}]", lookup), "[]");
    }

    #[test]
    fn malformed_placeholders_are_literal() {
        assert_eq!(substitute_env_with("a ${UNCLOSED", lookup), "a ${UNCLOSED");
        assert_eq!(substitute_env_with("${}", lookup), "${}");
        assert_eq!(substitute_env_with("cost: $5", lookup), "cost: $5");
    }

    #[test]
    fn multiple_placeholders_on_one_line() {
        assert_eq!(
            substitute_env_with("${SUPPORT_BOT_TOKEN}/${MISSING:-d}/${SUPPORT_BOT_TOKEN}", lookup),
            "123:abc/d/123:abc"
        );
    }

    #[test]
    fn no_placeholders() {
        assert_eq!(substitute_env("plain text"), "plain text");
    }
}
