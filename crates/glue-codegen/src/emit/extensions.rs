//! Convenience extension methods over managed arrays, declared on `GD`.

use crate::defs::{BINDINGS_GLOBAL_SCOPE_CLASS, BINDINGS_NAMESPACE, CLOSE_BLOCK, INDENT1, INDENT2, OPEN_BLOCK_L1};

/// Element types that get `IsEmpty`, `Join` and `Stringify`.
pub const ARRAY_EXTENSION_TYPES: &[&str] = &[
    "byte", "int", "long", "float", "double", "string", "Color", "Vector2", "Vector2I", "Vector3", "Vector3I",
    "Vector4", "Vector4I",
];

fn push_method(out: &mut String, doc: &[String], signature: &str, body: &str) {
    out.push('\n');
    for line in doc {
        out.push_str(INDENT1);
        out.push_str("/// ");
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&format!("{INDENT1}{signature}\n{OPEN_BLOCK_L1}{INDENT2}{body}\n{INDENT1}{CLOSE_BLOCK}"));
}

pub fn generate_array_extensions() -> String {
    let mut out = String::new();
    out.push_str(&format!("namespace {BINDINGS_NAMESPACE};\n\n"));
    out.push_str("using System;\n\n");
    out.push_str(&format!("public static partial class {BINDINGS_GLOBAL_SCOPE_CLASS}\n{{"));

    for ty in ARRAY_EXTENSION_TYPES {
        push_method(
            &mut out,
            &[
                "<summary>".into(),
                format!("Returns true if this {ty} array is empty or doesn't exist."),
                "</summary>".into(),
                format!("<param name=\"instance\">The {ty} array check.</param>"),
                "<returns>Whether or not the array is empty.</returns>".into(),
            ],
            &format!("public static bool IsEmpty(this {ty}[] instance)"),
            "return instance == null || instance.Length == 0;",
        );
        push_method(
            &mut out,
            &[
                "<summary>".into(),
                format!("Converts this {ty} array to a string delimited by the given string."),
                "</summary>".into(),
                format!("<param name=\"instance\">The {ty} array to convert.</param>"),
                "<param name=\"delimiter\">The delimiter to use between items.</param>".into(),
                "<returns>A single string with all items.</returns>".into(),
            ],
            &format!("public static string Join(this {ty}[] instance, string delimiter = \", \")"),
            "return String.Join(delimiter, instance);",
        );
        push_method(
            &mut out,
            &[
                "<summary>".into(),
                format!("Converts this {ty} array to a string with brackets."),
                "</summary>".into(),
                format!("<param name=\"instance\">The {ty} array to convert.</param>"),
                "<returns>A single string with all items.</returns>".into(),
            ],
            &format!("public static string Stringify(this {ty}[] instance)"),
            "return \"[\" + instance.Join() + \"]\";",
        );
    }

    out.push_str(CLOSE_BLOCK);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_extensions() {
        let out = generate_array_extensions();
        assert!(out.starts_with("namespace Godot;\n\nusing System;\n\npublic static partial class GD\n{\n    /// <summary>\n"));
        assert!(out.ends_with("    }\n}\n"));
        assert_eq!(out.matches("public static bool IsEmpty(").count(), ARRAY_EXTENSION_TYPES.len());
        assert!(out.contains(
            "    public static string Join(this Vector4I[] instance, string delimiter = \", \")\n    {\n        return String.Join(delimiter, instance);\n    }\n"
        ));
        assert!(out.contains("/// Returns true if this byte array is empty or doesn't exist.\n"));
    }
}
