//! Default argument values.
//!
//! A bound default is a [`Variant`]. It is turned into a C# literal once, when
//! the method is populated, and checked against the parameter type before the
//! method is emitted. Values C# cannot express as a compile-time constant make
//! the parameter nullable and are materialised in the method body instead.

use crate::error::{GlueError, Result};
use crate::reflection::{Variant, VariantType};
use crate::template::{SlotKind, Template};
use crate::types::{
    ArgumentInterface, DefaultParamMode, TypeInterface, ARRAY_GENERIC, DICTIONARY_GENERIC,
};

/// Shortest decimal rendering of `x`. Integral values keep a `.0` when
/// `trailing_zero` is set.
pub fn num_real(x: f64, trailing_zero: bool) -> String {
    if x.is_finite() && x.fract() == 0.0 {
        if trailing_zero {
            format!("{x:.1}")
        } else {
            format!("{x:.0}")
        }
    } else {
        format!("{x}")
    }
}

/// `x` rounded to `decimals` places with trailing zeros removed.
pub fn num_decimals(x: f64, decimals: usize) -> String {
    let mut s = format!("{x:.decimals$}");
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

fn real_args(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{}f", num_real(*v, true)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn int_args(values: &[i64]) -> String {
    values
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn vectors(ctor: &str, columns: &[&[f64]]) -> String {
    columns
        .iter()
        .map(|c| format!("new {ctor}({})", real_args(c)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn escape_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

const IDENTITY_BASIS: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Encode `value` as the default of `arg`, a parameter of `method`.
pub fn encode(value: &Variant, arg: &mut ArgumentInterface, method: &str) -> Result<()> {
    let fail = |reason: String| GlueError::DefaultValue {
        method: method.to_string(),
        arg: arg.name.clone(),
        reason,
    };
    let cname = arg.ty.cname.as_str();
    let only_zero = || fail(format!("Parameter of type '{cname}' can only have null/zero as the default value."));
    let wrong_type = |found: &str| {
        fail(format!("Parameter of type '{cname}' cannot have a default value of type '{found}'."))
    };

    let mut mode = DefaultParamMode::Constant;
    let literal = match value {
        Variant::Nil => "default".to_string(),
        Variant::Bool(b) => b.to_string(),
        Variant::Int(i) => {
            if cname == "int" {
                i.to_string()
            } else {
                format!("(%s)({i})")
            }
        }
        Variant::Float(f) => {
            if !f.is_finite() {
                return Err(fail(format!("non-finite value {f}")));
            }
            let mut literal = num_real(*f, true);
            if cname == "float" {
                literal.push('f');
            }
            literal
        }
        Variant::String(s) | Variant::StringName(s) | Variant::NodePath(s) => {
            if cname == "StringName" || cname == "NodePath" {
                if s.is_empty() {
                    "null".to_string()
                } else {
                    mode = DefaultParamMode::NullableRef;
                    format!("(%s)\"{}\"", escape_string(s))
                }
            } else if cname == "String" {
                format!("\"{}\"", escape_string(s))
            } else {
                return Err(wrong_type(value.variant_type().type_name()));
            }
        }
        Variant::Plane { normal, d } => {
            mode = DefaultParamMode::NullableVal;
            format!("new Plane(new Vector3({}), {}f)", real_args(normal), num_real(*d, true))
        }
        Variant::Aabb { position, size } => {
            mode = DefaultParamMode::NullableVal;
            format!("new Aabb({})", vectors("Vector3", &[position, size]))
        }
        Variant::Rect2 { position, size } => {
            mode = DefaultParamMode::NullableVal;
            format!("new Rect2({})", vectors("Vector2", &[position, size]))
        }
        Variant::Rect2i { position, size } => {
            mode = DefaultParamMode::NullableVal;
            format!(
                "new Rect2I(new Vector2I({}), new Vector2I({}))",
                int_args(position),
                int_args(size)
            )
        }
        Variant::Color(c) => {
            mode = DefaultParamMode::NullableVal;
            let args = c
                .iter()
                .map(|v| format!("{}f", num_decimals(*v, 4)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("new Color({args})")
        }
        Variant::Vector2(v) => {
            mode = DefaultParamMode::NullableVal;
            format!("new Vector2({})", real_args(v))
        }
        Variant::Vector2i(v) => {
            mode = DefaultParamMode::NullableVal;
            format!("new Vector2I({})", int_args(v))
        }
        Variant::Vector3(v) => {
            mode = DefaultParamMode::NullableVal;
            format!("new Vector3({})", real_args(v))
        }
        Variant::Vector3i(v) => {
            mode = DefaultParamMode::NullableVal;
            format!("new Vector3I({})", int_args(v))
        }
        Variant::Vector4(v) => {
            mode = DefaultParamMode::NullableVal;
            format!("new Vector4({})", real_args(v))
        }
        Variant::Vector4i(v) => {
            mode = DefaultParamMode::NullableVal;
            format!("new Vector4I({})", int_args(v))
        }
        Variant::Object(id) => {
            if *id != 0 {
                return Err(only_zero());
            }
            "null".to_string()
        }
        Variant::Dictionary(entries) => {
            if !entries.is_empty() {
                return Err(fail("Default value of type 'Dictionary' must be an empty dictionary.".into()));
            }
            "null".to_string()
        }
        Variant::Array(items) => {
            if !items.is_empty() {
                return Err(fail("Default value of type 'Array' must be an empty array.".into()));
            }
            "null".to_string()
        }
        Variant::Rid(id) => {
            if cname != "RID" {
                return Err(wrong_type("RID"));
            }
            if *id != 0 {
                return Err(only_zero());
            }
            "default".to_string()
        }
        Variant::Callable(id) | Variant::Signal(id) => {
            let found = value.variant_type().type_name();
            if cname != found {
                return Err(wrong_type(found));
            }
            if *id != 0 {
                return Err(only_zero());
            }
            "default".to_string()
        }
        Variant::Transform2D(columns) => {
            mode = DefaultParamMode::NullableVal;
            if *columns == [[1.0, 0.0], [0.0, 1.0], [0.0, 0.0]] {
                "Transform2D.Identity".to_string()
            } else {
                format!(
                    "new Transform2D({})",
                    vectors("Vector2", &[&columns[0], &columns[1], &columns[2]])
                )
            }
        }
        Variant::Transform3D { basis, origin } => {
            mode = DefaultParamMode::NullableVal;
            if *basis == IDENTITY_BASIS && *origin == [0.0; 3] {
                "Transform3D.Identity".to_string()
            } else {
                format!(
                    "new Transform3D({})",
                    vectors("Vector3", &[&basis[0], &basis[1], &basis[2], origin])
                )
            }
        }
        Variant::Projection(columns) => {
            mode = DefaultParamMode::NullableVal;
            let identity = [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ];
            if *columns == identity {
                "Projection.Identity".to_string()
            } else {
                format!(
                    "new Projection({})",
                    vectors("Vector4", &[&columns[0], &columns[1], &columns[2], &columns[3]])
                )
            }
        }
        Variant::Basis(columns) => {
            mode = DefaultParamMode::NullableVal;
            if *columns == IDENTITY_BASIS {
                "Basis.Identity".to_string()
            } else {
                format!(
                    "new Basis({})",
                    vectors("Vector3", &[&columns[0], &columns[1], &columns[2]])
                )
            }
        }
        Variant::Quaternion(q) => {
            mode = DefaultParamMode::NullableVal;
            if *q == [0.0, 0.0, 0.0, 1.0] {
                "Quaternion.Identity".to_string()
            } else {
                let args = q
                    .iter()
                    .map(|v| format!("{}f", num_real(*v, false)))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("new Quaternion({args})")
            }
        }
        Variant::PackedByteArray(_)
        | Variant::PackedInt32Array(_)
        | Variant::PackedInt64Array(_)
        | Variant::PackedFloat32Array(_)
        | Variant::PackedFloat64Array(_)
        | Variant::PackedStringArray(_)
        | Variant::PackedVector2Array(_)
        | Variant::PackedVector3Array(_)
        | Variant::PackedColorArray(_)
        | Variant::PackedVector4Array(_) => {
            mode = DefaultParamMode::NullableRef;
            "Array.Empty<%s>()".to_string()
        }
    };

    if mode == DefaultParamMode::Constant && cname == "Variant" && literal != "default" {
        mode = DefaultParamMode::NullableVal;
    }

    arg.default_argument = Some(Template::new(SlotKind::DefaultValue, literal)?);
    arg.def_param_value = Some(value.clone());
    arg.def_param_mode = mode;
    Ok(())
}

fn is_nullable_type(name: &str) -> bool {
    matches!(
        name,
        "String" | "StringName" | "NodePath" | "Array" | "Dictionary" | ARRAY_GENERIC | DICTIONARY_GENERIC
    ) || name.starts_with("Packed")
}

/// Whether a default `value` may be passed for a parameter of `arg_type`.
pub fn is_assignable(value: &Variant, arg_type: &TypeInterface) -> bool {
    let name = arg_type.name.as_str();
    if name == "Variant" {
        return true;
    }

    match value.variant_type() {
        VariantType::Nil => arg_type.is_object_type || is_nullable_type(name),
        VariantType::Bool => name == "bool",
        VariantType::Int => {
            arg_type.is_enum
                || matches!(
                    name,
                    "sbyte" | "short" | "int" | "byte" | "ushort" | "uint" | "long" | "ulong" | "float" | "double"
                )
        }
        VariantType::Float => matches!(name, "float" | "double"),
        VariantType::String | VariantType::StringName => matches!(name, "String" | "StringName" | "NodePath"),
        VariantType::NodePath => name == "NodePath",
        VariantType::Object => arg_type.is_object_type,
        VariantType::Array => name == "Array" || name == ARRAY_GENERIC,
        VariantType::Dictionary => name == "Dictionary" || name == DICTIONARY_GENERIC,
        VariantType::Vector2i => matches!(name, "Vector2" | "Vector2i"),
        VariantType::Vector3i => matches!(name, "Vector3" | "Vector3i"),
        VariantType::Vector4i => matches!(name, "Vector4" | "Vector4i"),
        VariantType::Rect2i => matches!(name, "Rect2" | "Rect2i"),
        other => name == other.type_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::{builtin_types, object_type};
    use crate::types::{ApiType, TypeReference};

    fn arg(cname: &str) -> ArgumentInterface {
        ArgumentInterface {
            ty: TypeReference::new(cname),
            name: "value".into(),
            ..Default::default()
        }
    }

    fn encoded(value: Variant, cname: &str) -> (String, DefaultParamMode) {
        let mut a = arg(cname);
        encode(&value, &mut a, "Foo.bar").unwrap();
        (a.default_argument.unwrap().as_str().to_string(), a.def_param_mode)
    }

    #[test]
    fn test_num_formatting() {
        assert_eq!(num_real(1.0, true), "1.0");
        assert_eq!(num_real(1.0, false), "1");
        assert_eq!(num_real(0.25, true), "0.25");
        assert_eq!(num_decimals(0.5, 4), "0.5");
        assert_eq!(num_decimals(1.0, 4), "1");
        assert_eq!(num_decimals(0.123456, 4), "0.1235");
    }

    #[test]
    fn test_scalars() {
        assert_eq!(encoded(Variant::Bool(true), "bool").0, "true");
        assert_eq!(encoded(Variant::Int(5), "int").0, "5");
        assert_eq!(encoded(Variant::Int(2), "Node.ProcessMode").0, "(%s)(2)");
        assert_eq!(encoded(Variant::Float(1.0), "float").0, "1.0f");
        assert_eq!(encoded(Variant::Float(0.5), "double").0, "0.5");
        assert_eq!(encoded(Variant::Nil, "Node"), ("default".to_string(), DefaultParamMode::Constant));
    }

    #[test]
    fn test_strings() {
        assert_eq!(encoded(Variant::String("a\"b".into()), "String").0, "\"a\\\"b\"");
        assert_eq!(
            encoded(Variant::StringName("idle".into()), "StringName"),
            ("(%s)\"idle\"".to_string(), DefaultParamMode::NullableRef)
        );
        assert_eq!(
            encoded(Variant::NodePath(String::new()), "NodePath"),
            ("null".to_string(), DefaultParamMode::Constant)
        );

        let mut a = arg("int");
        assert!(encode(&Variant::String("x".into()), &mut a, "Foo.bar").is_err());
    }

    #[test]
    fn test_geometry_is_nullable_value() {
        assert_eq!(
            encoded(Variant::Vector2([1.0, 0.5]), "Vector2"),
            ("new Vector2(1.0f, 0.5f)".to_string(), DefaultParamMode::NullableVal)
        );
        assert_eq!(encoded(Variant::Vector3i([1, 2, 3]), "Vector3i").0, "new Vector3I(1, 2, 3)");
        assert_eq!(
            encoded(Variant::Color([1.0, 1.0, 1.0, 1.0]), "Color").0,
            "new Color(1f, 1f, 1f, 1f)"
        );
        assert_eq!(
            encoded(Variant::Plane { normal: [0.0, 1.0, 0.0], d: 2.0 }, "Plane").0,
            "new Plane(new Vector3(0.0f, 1.0f, 0.0f), 2.0f)"
        );
        assert_eq!(
            encoded(Variant::Transform2D([[1.0, 0.0], [0.0, 1.0], [0.0, 0.0]]), "Transform2D").0,
            "Transform2D.Identity"
        );
        assert_eq!(
            encoded(Variant::Transform2D([[2.0, 0.0], [0.0, 1.0], [0.0, 0.0]]), "Transform2D").0,
            "new Transform2D(new Vector2(2.0f, 0.0f), new Vector2(0.0f, 1.0f), new Vector2(0.0f, 0.0f))"
        );
        assert_eq!(encoded(Variant::Quaternion([0.0, 0.0, 0.0, 1.0]), "Quaternion").0, "Quaternion.Identity");
        assert_eq!(
            encoded(Variant::Quaternion([0.0, 1.0, 0.0, 0.0]), "Quaternion").0,
            "new Quaternion(0f, 1f, 0f, 0f)"
        );
        assert_eq!(
            encoded(Variant::Rect2i { position: [0, 0], size: [4, 4] }, "Rect2i").0,
            "new Rect2I(new Vector2I(0, 0), new Vector2I(4, 4))"
        );
    }

    #[test]
    fn test_collections() {
        assert_eq!(
            encoded(Variant::Array(Vec::new()), "Array"),
            ("null".to_string(), DefaultParamMode::Constant)
        );
        assert_eq!(
            encoded(Variant::PackedStringArray(Vec::new()), "PackedStringArray"),
            ("Array.Empty<%s>()".to_string(), DefaultParamMode::NullableRef)
        );

        let mut a = arg("Array");
        let err = encode(&Variant::Array(vec![Variant::Int(1)]), &mut a, "Foo.bar").unwrap_err();
        assert!(err.to_string().contains("must be an empty array"));

        let mut a = arg("Dictionary");
        assert!(encode(&Variant::Dictionary(vec![(Variant::Int(1), Variant::Nil)]), &mut a, "Foo.bar").is_err());
    }

    #[test]
    fn test_illegal_pairings() {
        let mut a = arg("Node");
        let err = encode(&Variant::Object(7), &mut a, "Foo.bar").unwrap_err();
        assert!(err.to_string().contains("can only have null/zero"));
        assert!(a.default_argument.is_none());

        let mut a = arg("int");
        let err = encode(&Variant::Rid(0), &mut a, "Foo.bar").unwrap_err();
        assert!(err.to_string().contains("cannot have a default value of type 'RID'"));

        let mut a = arg("Signal");
        assert!(encode(&Variant::Callable(0), &mut a, "Foo.bar").is_err());
        assert_eq!(encoded(Variant::Callable(0), "Callable").0, "default");
    }

    #[test]
    fn test_variant_parameter_becomes_nullable() {
        assert_eq!(encoded(Variant::Int(3), "Variant").1, DefaultParamMode::NullableVal);
        assert_eq!(encoded(Variant::Nil, "Variant").1, DefaultParamMode::Constant);
    }

    #[test]
    fn test_assignability() {
        let builtins = builtin_types().unwrap();
        let node = object_type("Node", "Node", ApiType::Core, false).unwrap();

        assert!(is_assignable(&Variant::Nil, &node));
        assert!(is_assignable(&Variant::Nil, &builtins["String"]));
        assert!(!is_assignable(&Variant::Nil, &builtins["int"]));
        assert!(is_assignable(&Variant::Int(1), &builtins["float"]));
        assert!(!is_assignable(&Variant::Float(1.0), &builtins["int"]));
        assert!(is_assignable(&Variant::Vector2i([0, 0]), &builtins["Vector2"]));
        assert!(!is_assignable(&Variant::Vector2([0.0, 0.0]), &builtins["Vector2i"]));
        assert!(is_assignable(&Variant::Array(Vec::new()), &builtins[ARRAY_GENERIC]));
        assert!(is_assignable(&Variant::Color([0.0; 4]), &builtins["Variant"]));
    }
}
