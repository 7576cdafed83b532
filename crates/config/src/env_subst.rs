/// Expand `${NAME}` placeholders in raw config text.
///
/// Expansion happens on the file contents before parsing, so a
/// placeholder works in any string position of any supported format.
/// Placeholders that do not resolve are kept verbatim, which makes a
/// missing variable visible in the loaded value instead of silently
/// becoming an empty string.
pub fn expand_vars(input: &str) -> String {
    expand_vars_with(input, |name| std::env::var(name).ok())
}

/// Expansion core with a pluggable lookup, so tests never have to touch
/// the process environment.
fn expand_vars_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // No closing brace before EOF; keep the tail untouched.
            out.push_str(&rest[start..]);
            return out;
        };
        let name = &after[..end];
        let resolved = if name.is_empty() { None } else { lookup(name) };
        match resolved {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[start..start + end + 3]),
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}
