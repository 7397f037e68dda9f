use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::DriverResult;

const INDENT: &[u8] = b"    ";

/// Pretty print `value` with a four-space indent.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> DriverResult<String> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut ser)?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn indents_with_four_spaces() {
        let out = to_pretty_json(&json!({ "a_1": [{ "suggestion": "x", "fields": ["b"] }] })).unwrap();
        assert_eq!(
            out,
            "{\n    \"a_1\": [\n        {\n            \"suggestion\": \"x\",\n            \"fields\": [\n                \"b\"\n            ]\n        }\n    ]\n}"
        );
    }
}
