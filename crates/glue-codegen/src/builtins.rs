//! The fixed table of builtin value types and the constructors shared with
//! object and enum types.
//!
//! Every template goes through [`TemplatesBuilder`], so a malformed entry in this
//! table fails when the registry is built rather than when a method using the
//! type is emitted.

use indexmap::IndexMap;

use crate::defs::{
    c_method_monoarray_from, c_method_monoarray_to, BINDINGS_NAMESPACE_COLLECTIONS,
    C_METHOD_MANAGED_FROM_CALLABLE, C_METHOD_MANAGED_FROM_SIGNAL, C_METHOD_MANAGED_TO_CALLABLE,
    C_METHOD_MANAGED_TO_SIGNAL, C_METHOD_MONOSTR_FROM_GODOT, C_METHOD_MONOSTR_TO_GODOT,
    C_METHOD_UNMANAGED_GET_MANAGED, CS_STATIC_METHOD_GETINSTANCE,
};
use crate::error::Result;
use crate::template::{Templates, TemplatesBuilder};
use crate::types::{ApiType, TypeInterface, ARRAY_GENERIC, DICTIONARY_GENERIC, VARARG};

fn bare(name: &str, proxy: &str) -> Result<TypeInterface> {
    Ok(TypeInterface {
        name: name.to_string(),
        cname: name.to_string(),
        proxy_name: proxy.to_string(),
        cs_type: proxy.to_string(),
        templates: Templates::standard()?,
        ..Default::default()
    })
}

/// A value type passed by pointer to the native-call shims.
pub fn value_type(name: &str, proxy: &str) -> Result<TypeInterface> {
    let mut itype = bare(name, proxy)?;
    itype.c_type = proxy.to_string();
    itype.c_type_in = format!("{proxy}*");
    itype.c_type_out = proxy.to_string();
    itype.templates = TemplatesBuilder::extend(itype.templates)
        .c_in_vararg(&format!(
            "%5using godot_variant %1_in = VariantUtils.CreateFrom{proxy}(%1);\n"
        ))?
        .build();
    Ok(itype)
}

/// An engine class. Members are filled in by the populators.
pub fn object_type(cname: &str, proxy: &str, api_type: ApiType, is_ref_counted: bool) -> Result<TypeInterface> {
    let mut itype = bare(cname, proxy)?;
    itype.api_type = api_type;
    itype.is_object_type = true;
    itype.is_ref_counted = is_ref_counted;
    itype.memory_own = is_ref_counted;
    itype.c_type = "IntPtr".to_string();
    itype.c_type_in = "IntPtr".to_string();
    itype.c_type_out = "GodotObject".to_string();

    let c_out = if is_ref_counted {
        format!("%5return {C_METHOD_UNMANAGED_GET_MANAGED}(%1.Reference);\n")
    } else {
        format!("%5return {C_METHOD_UNMANAGED_GET_MANAGED}(%1);\n")
    };

    itype.templates = TemplatesBuilder::extend(itype.templates)
        .c_out(&c_out)?
        .cs_in_expr(&format!("GodotObject.{CS_STATIC_METHOD_GETINSTANCE}(%0)"))?
        .cs_out("%5return (%2)%0(%1);")?
        .c_arg_in("&%s")?
        .build();
    Ok(itype)
}

/// An enum. Enums marshal exactly like 32-bit integers.
pub fn enum_type(name: &str, proxy: &str, api_type: ApiType) -> Result<TypeInterface> {
    let mut itype = bare(name, proxy)?;
    itype.is_enum = true;
    itype.api_type = api_type;
    itype.c_type = "long".to_string();
    itype.c_type_in = "int".to_string();
    itype.c_type_out = "int".to_string();
    itype.templates = TemplatesBuilder::extend(itype.templates)
        .cs_in_expr("(int)%0")?
        .cs_out("%5return (%2)%0(%1);")?
        .c_in("%5%0 %1_in = %1;\n")?
        .c_out("%5return (%0)(%1);\n")?
        .c_arg_in("&%s_in")?
        .c_in_vararg("%5using godot_variant %1_in = VariantUtils.CreateFromInt((int)%1);\n")?
        .build();
    Ok(itype)
}

fn struct_type(name: &str, proxy: &str) -> Result<TypeInterface> {
    let mut itype = value_type(name, proxy)?;
    itype.cs_in_expr_is_unsafe = true;
    itype.templates = TemplatesBuilder::extend(itype.templates).cs_in_expr("&%0")?.build();
    Ok(itype)
}

fn int_type(name: &str) -> Result<TypeInterface> {
    let mut itype = value_type(name, name)?;
    let mut builder = TemplatesBuilder::extend(itype.templates);
    if name != "long" && name != "ulong" {
        // ptrcall always expects a 64-bit integer
        itype.c_type = "long".to_string();
        builder = builder
            .c_in("%5%0 %1_in = %1;\n")?
            .c_out("%5return (%0)(%1);\n")?
            .c_arg_in("&%s_in")?;
    } else {
        builder = builder.c_arg_in("&%s")?;
    }
    itype.c_type_in = name.to_string();
    itype.c_type_out = name.to_string();
    itype.templates = builder
        .c_in_vararg("%5using godot_variant %1_in = VariantUtils.CreateFromInt(%1);\n")?
        .build();
    Ok(itype)
}

fn float_types() -> Result<[TypeInterface; 2]> {
    // ptrcall expects a double for 'float'
    let mut float = bare("float", "float")?;
    float.c_type = "double".to_string();
    float.c_type_in = "float".to_string();
    float.c_type_out = "float".to_string();
    float.templates = TemplatesBuilder::extend(float.templates)
        .c_in("%5%0 %1_in = %1;\n")?
        .c_out("%5return (%0)%1;\n")?
        .c_arg_in("&%s_in")?
        .c_in_vararg("%5using godot_variant %1_in = VariantUtils.CreateFromFloat(%1);\n")?
        .build();

    let mut double = bare("double", "double")?;
    double.c_type = "double".to_string();
    double.c_type_in = "double".to_string();
    double.c_type_out = "double".to_string();
    double.templates = TemplatesBuilder::extend(double.templates)
        .c_arg_in("&%s")?
        .c_in_vararg("%5using godot_variant %1_in = VariantUtils.CreateFromFloat(%1);\n")?
        .build();

    Ok([float, double])
}

/// A native handle type (StringName, NodePath, Array, Dictionary, Variant) whose
/// return value is taken over by the managed wrapper.
fn owned_handle(name: &str, proxy: &str, cs_type: &str, c_type: &str) -> Result<TypeInterface> {
    let mut itype = bare(name, proxy)?;
    itype.cs_type = cs_type.to_string();
    itype.c_type = c_type.to_string();
    itype.c_type_in = c_type.to_string();
    itype.c_type_out = cs_type.to_string();
    itype.c_ret_needs_default_initialization = true;
    itype.templates = TemplatesBuilder::extend(itype.templates)
        .c_out("%5return %0.CreateTakingOwnershipOfDisposableValue(%1);\n")?
        .c_arg_in("&%s")?
        .build();
    Ok(itype)
}

fn packed_array(name: &str, marshal_name: &str, c_type: &str, element: &str) -> Result<TypeInterface> {
    let proxy = format!("{element}[]");
    let mut itype = bare(name, &proxy)?;
    itype.c_type = c_type.to_string();
    itype.c_type_in = format!("ReadOnlySpan<{element}>");
    itype.c_type_out = proxy.clone();
    itype.c_type_is_disposable_struct = true;
    itype.is_span_compatible = true;
    itype.templates = TemplatesBuilder::extend(itype.templates)
        .c_in(&format!(
            "%5using %0 %1_in = {}(%1);\n",
            c_method_monoarray_to(marshal_name)
        ))?
        .c_out(&format!("%5return {}(%1);\n", c_method_monoarray_from(marshal_name)))?
        .c_arg_in("&%s_in")?
        .build();
    Ok(itype)
}

fn collection(name: &str, c_type: &str, type_parameter_count: usize) -> Result<[TypeInterface; 2]> {
    let cs_type = format!("{BINDINGS_NAMESPACE_COLLECTIONS}.{name}");
    let mut plain = owned_handle(name, name, &cs_type, c_type)?;
    plain.type_parameter_count = type_parameter_count;
    plain.templates = TemplatesBuilder::extend(plain.templates)
        .cs_in_expr("(%1)(%0 ?? new()).NativeValue")?
        .build();

    let generic_name = if type_parameter_count == 1 { ARRAY_GENERIC } else { DICTIONARY_GENERIC };
    let mut generic = plain.clone();
    generic.name = generic_name.to_string();
    generic.cname = generic_name.to_string();
    // Variant.From<T>/As<T> is slower for the generic collections
    generic.templates = TemplatesBuilder::extend(generic.templates)
        .cs_out("%5return new %2(%0(%1));")?
        .cs_variant_to_managed(&format!("VariantUtils.ConvertTo{name}(%0)"))?
        .cs_managed_to_variant(&format!("VariantUtils.CreateFrom{name}(%0)"))?
        .build();

    Ok([plain, generic])
}

/// Build the builtin type table.
pub fn builtin_types() -> Result<IndexMap<String, TypeInterface>> {
    let mut types = IndexMap::new();
    let mut insert = |itype: TypeInterface| {
        types.insert(itype.cname.clone(), itype);
    };

    for (name, proxy) in [
        ("Vector2", "Vector2"),
        ("Vector2i", "Vector2I"),
        ("Rect2", "Rect2"),
        ("Rect2i", "Rect2I"),
        ("Transform2D", "Transform2D"),
        ("Vector3", "Vector3"),
        ("Vector3i", "Vector3I"),
        ("Basis", "Basis"),
        ("Quaternion", "Quaternion"),
        ("Transform3D", "Transform3D"),
        ("AABB", "Aabb"),
        ("Color", "Color"),
        ("Plane", "Plane"),
        ("Vector4", "Vector4"),
        ("Vector4i", "Vector4I"),
        ("Projection", "Projection"),
    ] {
        insert(struct_type(name, proxy)?);
    }

    let mut boolean = value_type("bool", "bool")?;
    boolean.c_type = "godot_bool".to_string();
    boolean.c_type_in = "godot_bool".to_string();
    boolean.c_type_out = "godot_bool".to_string();
    boolean.templates = TemplatesBuilder::extend(boolean.templates)
        .cs_in_expr("%0.ToGodotBool()")?
        .cs_out("%5return %0(%1).ToBool();")?
        .c_arg_in("&%s")?
        .c_in_vararg("%5using godot_variant %1_in = VariantUtils.CreateFromBool(%1);\n")?
        .build();
    insert(boolean);

    for name in ["sbyte", "short", "int", "long", "byte", "ushort", "uint", "ulong"] {
        insert(int_type(name)?);
    }

    for itype in float_types()? {
        insert(itype);
    }

    let mut string = bare("String", "string")?;
    string.c_type = "godot_string".to_string();
    string.c_type_in = "string".to_string();
    string.c_type_out = "string".to_string();
    string.c_type_is_disposable_struct = true;
    string.templates = TemplatesBuilder::extend(string.templates)
        .c_in(&format!("%5using %0 %1_in = {C_METHOD_MONOSTR_TO_GODOT}(%1);\n"))?
        .c_out(&format!("%5return {C_METHOD_MONOSTR_FROM_GODOT}(%1);\n"))?
        .c_arg_in("&%s_in")?
        .c_in_vararg("%5using godot_variant %1_in = VariantUtils.CreateFromString(%1);\n")?
        .build();
    insert(string);

    // A null StringName/NodePath cannot be passed to ptrcall
    let mut string_name = owned_handle("StringName", "StringName", "StringName", "godot_string_name")?;
    string_name.templates = TemplatesBuilder::extend(string_name.templates)
        .cs_in_expr("(%1)(%0?.NativeValue ?? default)")?
        .c_in_vararg("%5using godot_variant %1_in = VariantUtils.CreateFromStringName(%1);\n")?
        .build();
    insert(string_name);

    let mut node_path = owned_handle("NodePath", "NodePath", "NodePath", "godot_node_path")?;
    node_path.templates = TemplatesBuilder::extend(node_path.templates)
        .cs_in_expr("(%1)(%0?.NativeValue ?? default)")?
        .build();
    insert(node_path);

    let mut rid = bare("RID", "Rid")?;
    rid.c_type = "Rid".to_string();
    rid.c_type_in = "Rid".to_string();
    rid.c_type_out = "Rid".to_string();
    rid.templates = TemplatesBuilder::extend(rid.templates).c_arg_in("&%s")?.build();
    insert(rid);

    let mut variant = bare("Variant", "Variant")?;
    variant.c_type = "godot_variant".to_string();
    variant.c_type_in = "Variant".to_string();
    variant.c_type_out = "Variant".to_string();
    variant.c_ret_needs_default_initialization = true;
    variant.templates = TemplatesBuilder::extend(variant.templates)
        .c_in("%5%0 %1_in = (%0)%1.NativeVar;\n")?
        .c_out("%5return Variant.CreateTakingOwnershipOfDisposableValue(%1);\n")?
        .c_arg_in("&%s_in")?
        .build();
    insert(variant);

    let mut callable = value_type("Callable", "Callable")?;
    callable.c_type = "godot_callable".to_string();
    callable.c_type_in = "in Callable".to_string();
    callable.c_type_out = "Callable".to_string();
    callable.c_type_is_disposable_struct = true;
    callable.templates = TemplatesBuilder::extend(callable.templates)
        .cs_in_expr("%0")?
        .c_in(&format!("%5using %0 %1_in = {C_METHOD_MANAGED_TO_CALLABLE}(in %1);\n"))?
        .c_out(&format!("%5return {C_METHOD_MANAGED_FROM_CALLABLE}(in %1);\n"))?
        .c_arg_in("&%s_in")?
        .build();
    insert(callable);

    let mut signal = bare("Signal", "Signal")?;
    signal.c_type = "godot_signal".to_string();
    signal.c_type_in = "in Signal".to_string();
    signal.c_type_out = "Signal".to_string();
    signal.c_type_is_disposable_struct = true;
    signal.templates = TemplatesBuilder::extend(signal.templates)
        .cs_in_expr("%0")?
        .c_in(&format!("%5using %0 %1_in = {C_METHOD_MANAGED_TO_SIGNAL}(in %1);\n"))?
        .c_out(&format!("%5return {C_METHOD_MANAGED_FROM_SIGNAL}(in %1);\n"))?
        .c_arg_in("&%s_in")?
        .build();
    insert(signal);

    // The vararg shim code is written by the native-call emitter itself
    let mut vararg = bare(VARARG, "ReadOnlySpan<Variant>")?;
    vararg.cs_type = "params Variant[]".to_string();
    vararg.c_type_in = "ReadOnlySpan<Variant>".to_string();
    vararg.is_span_compatible = true;
    vararg.templates = TemplatesBuilder::extend(vararg.templates)
        .cs_in_expr("%0")?
        .c_arg_in("&%s_in")?
        .build();
    insert(vararg);

    for (name, marshal_name, c_type, element) in [
        ("PackedInt32Array", "PackedInt32Array", "godot_packed_int32_array", "int"),
        ("PackedInt64Array", "PackedInt64Array", "godot_packed_int64_array", "long"),
        ("PackedByteArray", "PackedByteArray", "godot_packed_byte_array", "byte"),
        ("PackedFloat32Array", "PackedFloat32Array", "godot_packed_float32_array", "float"),
        ("PackedFloat64Array", "PackedFloat64Array", "godot_packed_float64_array", "double"),
        ("PackedStringArray", "PackedStringArray", "godot_packed_string_array", "string"),
        ("PackedColorArray", "PackedColorArray", "godot_packed_color_array", "Color"),
        ("PackedVector2Array", "PackedVector2Array", "godot_packed_vector2_array", "Vector2"),
        ("PackedVector3Array", "PackedVector3Array", "godot_packed_vector3_array", "Vector3"),
        ("PackedVector4Array", "PackedVector4Array", "godot_packed_vector4_array", "Vector4"),
    ] {
        insert(packed_array(name, marshal_name, c_type, element)?);
    }

    for itype in collection("Array", "godot_array", 1)? {
        insert(itype);
    }
    for itype in collection("Dictionary", "godot_dictionary", 2)? {
        insert(itype);
    }

    let mut void = bare("void", "void")?;
    void.c_type = "void".to_string();
    void.c_type_in = "void".to_string();
    void.c_type_out = "void".to_string();
    insert(void);

    Ok(types)
}
