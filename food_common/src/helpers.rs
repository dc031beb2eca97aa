/// Parse a boolean flag from a string value, or return the given default value otherwise.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let value = match value {
        Some(v) => v,
        None => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Joins the items into a human-readable list: `a`, `a and b`, `a, b and c`.
///
/// An empty slice produces an empty string.
pub fn human_list<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [head @ .., last] => {
            let head = head.iter().map(|s| s.as_ref()).collect::<Vec<&str>>().join(", ");
            format!("{head} and {}", last.as_ref())
        },
    }
}
