//! Identifier conversion between engine naming conventions and C#.

/// C# reserved words that must be prefixed with `@` when used as identifiers.
const CSHARP_KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// Engine type names whose PascalCase form is not derivable from the generic rules.
const PASCAL_CASE_REPLACEMENTS: &[(&str, &str)] = &[
    ("AABB", "Aabb"),
    ("RID", "Rid"),
    ("Object", "GodotObject"),
    ("GDExtension", "GDExtension"),
    ("GDScript", "GDScript"),
    ("OpenXR", "OpenXR"),
    ("WebRTC", "WebRtc"),
    ("WebXR", "WebXR"),
];

/// Acronyms longer than two letters that keep a fixed spelling.
const ACRONYMS: &[(&str, &str)] = &[("GDE", "Gde"), ("GDS", "Gds"), ("URL", "Url")];

pub fn is_csharp_keyword(name: &str) -> bool {
    CSHARP_KEYWORDS.contains(&name)
}

/// Prefix `name` with `@` if it is a C# keyword.
pub fn escape_csharp_keyword(name: &str) -> String {
    if is_csharp_keyword(name) {
        format!("@{name}")
    } else {
        name.to_string()
    }
}

fn push_empty_part(out: &mut String, parts: &[&str], i: usize) {
    if i == 0 || i == parts.len() - 1 {
        // Leading and trailing underscores survive as-is
        out.push('_');
    } else if !parts[i - 1].is_empty() {
        out.push_str("__");
    } else {
        out.push('_');
    }
}

fn capitalize_part(part: &str, lower_rest: bool, out: &mut String) {
    let mut chars = part.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        if lower_rest {
            out.extend(chars.flat_map(char::to_lowercase));
        } else {
            out.push_str(chars.as_str());
        }
    }
}

/// `get_node_or_null` -> `GetNodeOrNull`.
///
/// With `input_is_upper`, `FLAG_READ` -> `FlagRead`.
pub fn snake_to_pascal_case(identifier: &str, input_is_upper: bool) -> String {
    let parts: Vec<&str> = identifier.split('_').collect();
    let mut out = String::with_capacity(identifier.len());

    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            push_empty_part(&mut out, &parts, i);
        } else {
            capitalize_part(part, input_is_upper, &mut out);
        }
    }

    out
}

/// `node_path` -> `nodePath`.
pub fn snake_to_camel_case(identifier: &str, input_is_upper: bool) -> String {
    let parts: Vec<&str> = identifier.split('_').collect();
    let mut out = String::with_capacity(identifier.len());

    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            push_empty_part(&mut out, &parts, i);
        } else if i == 0 {
            if input_is_upper {
                out.push_str(&part.to_lowercase());
            } else {
                out.push_str(part);
            }
        } else {
            capitalize_part(part, input_is_upper, &mut out);
        }
    }

    out
}

/// Split a PascalCase identifier into words. Runs of capitals form one word,
/// except their last letter when it starts a lowercase word. Digits start a new word.
fn split_pascal_case(identifier: &str) -> Vec<String> {
    let chars: Vec<char> = identifier.chars().collect();
    let mut parts = Vec::new();
    if chars.is_empty() {
        return parts;
    }

    let mut start = 0;
    let mut prev_was_upper = chars[0].is_ascii_uppercase();
    let mut i = 1;

    while i < chars.len() {
        let c = chars[i];
        if prev_was_upper {
            if c.is_ascii_digit() || c.is_ascii_lowercase() {
                let mut split_at = i;
                if !c.is_ascii_digit() {
                    if i - start == 1 {
                        // The capital only began a word
                        prev_was_upper = false;
                        i += 1;
                        continue;
                    }
                    split_at = i - 1;
                }
                if split_at > start {
                    parts.push(chars[start..split_at].iter().collect());
                    start = split_at;
                    prev_was_upper = false;
                }
            }
        } else if c.is_ascii_digit() || c.is_ascii_uppercase() {
            parts.push(chars[start..i].iter().collect());
            start = i;
            prev_was_upper = true;
        }
        i += 1;
    }

    parts.push(chars[start..].iter().collect());
    parts
}

/// Normalise an engine PascalCase name to C# conventions:
/// `HTTPRequest` -> `HttpRequest`, `Vector2i` -> `Vector2I`, `XRServer` stays.
pub fn pascal_to_pascal_case(identifier: &str) -> String {
    if identifier.is_empty() {
        return String::new();
    }

    if identifier.chars().count() <= 2 {
        return identifier.to_uppercase();
    }

    if let Some((_, replacement)) = PASCAL_CASE_REPLACEMENTS
        .iter()
        .find(|(from, _)| *from == identifier)
    {
        return replacement.to_string();
    }

    let mut out = String::with_capacity(identifier.len());
    for part in split_pascal_case(identifier) {
        if let Some((_, acronym)) = ACRONYMS.iter().find(|(from, _)| *from == part) {
            out.push_str(acronym);
            continue;
        }

        if part.chars().count() <= 2 && part.to_uppercase() == part {
            out.push_str(&part);
            continue;
        }

        let mut prev: Option<char> = None;
        for (i, c) in part.chars().enumerate() {
            let after_digit = prev.is_some_and(|p| p.is_ascii_digit());
            if i == 0 || after_digit {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            prev = Some(c);
        }
    }

    out
}

/// C# proxy name for an engine class. Leading underscores mark engine-private
/// wrappers and are dropped.
pub fn object_proxy_name(class_name: &str) -> String {
    pascal_to_pascal_case(class_name.strip_prefix('_').unwrap_or(class_name))
}

/// Escape text for inclusion in XML doc comments.
pub fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Normalise a documentation description: dedent, drop carriage returns, trim.
pub fn fix_doc_description(text: &str) -> String {
    let text = text.replace('\r', "");
    let indent = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let dedented: Vec<&str> = text
        .lines()
        .map(|l| l.get(indent..).unwrap_or_else(|| l.trim_start()))
        .collect();

    dedented.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_to_pascal() {
        assert_eq!(snake_to_pascal_case("get_node_or_null", false), "GetNodeOrNull");
        assert_eq!(snake_to_pascal_case("FLAG_READ", true), "FlagRead");
        assert_eq!(snake_to_pascal_case("_ready", false), "_Ready");
        assert_eq!(snake_to_pascal_case("a__b", false), "A__B");
        assert_eq!(snake_to_pascal_case("trailing_", false), "Trailing_");
    }

    #[test]
    fn test_snake_to_camel() {
        assert_eq!(snake_to_camel_case("node_path", false), "nodePath");
        assert_eq!(snake_to_camel_case("MAX_VALUE", true), "maxValue");
        assert_eq!(snake_to_camel_case("x", false), "x");
    }

    #[test]
    fn test_pascal_to_pascal() {
        assert_eq!(pascal_to_pascal_case("HTTPRequest"), "HttpRequest");
        assert_eq!(pascal_to_pascal_case("GLTFAccessor"), "GltfAccessor");
        assert_eq!(pascal_to_pascal_case("XRServer"), "XRServer");
        assert_eq!(pascal_to_pascal_case("Vector2i"), "Vector2I");
        assert_eq!(pascal_to_pascal_case("Node3D"), "Node3D");
        assert_eq!(pascal_to_pascal_case("AABB"), "Aabb");
        assert_eq!(pascal_to_pascal_case("Object"), "GodotObject");
        assert_eq!(pascal_to_pascal_case("ui"), "UI");
        assert_eq!(pascal_to_pascal_case("Node"), "Node");
    }

    #[test]
    fn test_escape_keyword() {
        assert_eq!(escape_csharp_keyword("object"), "@object");
        assert_eq!(escape_csharp_keyword("params"), "@params");
        assert_eq!(escape_csharp_keyword("value"), "value");
    }

    #[test]
    fn test_object_proxy_name_strips_underscore() {
        assert_eq!(object_proxy_name("_ClassDB"), "ClassDB");
    }

    #[test]
    fn test_fix_doc_description() {
        assert_eq!(fix_doc_description("\n\t\tLine one.\r\n\t\tLine two.\n"), "Line one.\nLine two.");
    }
}
