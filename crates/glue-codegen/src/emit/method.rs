//! Method wrappers.
//!
//! Every bound method gets a cached `MethodBind{N}` field and a wrapper that
//! forwards to its native-call shim. Methods taking a packed array or varargs
//! additionally get a span overload sharing the same method bind.

use crate::defaults::is_assignable;
use crate::defs::{
    allows_inherited_member_hiding, BINDINGS_CLASS_NATIVECALLS, BINDINGS_CLASS_NATIVECALLS_EDITOR,
    BINDINGS_NATIVE_NAME_FIELD, CLOSE_BLOCK_L1, CS_METHOD_CALL, CS_PROPERTY_SINGLETON,
    CS_STATIC_FIELD_METHOD_BIND_PREFIX, ICALL_CLASSDB_GET_METHOD_WITH_COMPATIBILITY, INDENT1, INDENT2,
    MEMBER_BEGIN, OPEN_BLOCK_L1,
};
use crate::emit::{push_obsolete, push_summary, EmitContext};
use crate::error::{GlueError, Result};
use crate::template::TemplateArgs;
use crate::types::{DefaultParamMode, MethodInterface, TypeInterface};

/// Index of the next `MethodBind{N}` field of the class being emitted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MethodBindCursor(usize);

impl MethodBindCursor {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn current(&self) -> usize {
        self.0
    }

    fn field(&self) -> String {
        format!("{CS_STATIC_FIELD_METHOD_BIND_PREFIX}{}", self.0)
    }

    fn advance(&mut self) {
        self.0 += 1;
    }

    /// Step back onto the previous field so a span overload reuses it.
    fn step_back(&mut self) {
        self.0 = self.0.saturating_sub(1);
    }
}

/// Emit one wrapper of `imethod`, the method at `method_idx` of `itype`.
///
/// With `use_span` the span overload is emitted instead, and nothing at all
/// if the method has no span-compatible argument.
pub fn generate_method<'a>(
    ctx: &EmitContext<'a>,
    itype: &'a TypeInterface,
    imethod: &MethodInterface,
    method_idx: usize,
    cursor: &mut MethodBindCursor,
    use_span: bool,
    out: &mut String,
) -> Result<()> {
    let qualified = format!("{}.{}", itype.name, imethod.name);
    let return_type = ctx.member_type(itype, &imethod.return_type, &format!("return type of method '{qualified}'"))?;

    if imethod.is_virtual && use_span {
        return Ok(());
    }

    let mut has_span_argument = false;
    if use_span {
        has_span_argument = imethod.is_vararg;
        for iarg in &imethod.arguments {
            let context = format!("argument '{}' of method '{qualified}'", iarg.name);
            if ctx.registry.require_or_singleton(&iarg.ty, &context)?.is_span_compatible {
                has_span_argument = true;
            }
        }

        if has_span_argument {
            cursor.step_back();
        }
    }

    let method_bind_field = cursor.field();

    let mut arguments_sig = String::new();
    let mut cs_in_statements = String::new();
    let mut cs_in_expr_is_unsafe = false;
    let mut default_args_doc = String::new();
    let mut icall_params = method_bind_field.clone();

    if !imethod.is_static {
        let self_reference = if itype.is_singleton { CS_PROPERTY_SINGLETON } else { "this" };
        if !itype.templates.cs_in.is_empty() {
            cs_in_statements.push_str(&itype.templates.cs_in.render(&TemplateArgs::marshal_in(
                &itype.c_type,
                self_reference,
                INDENT2,
            )));
        }
        icall_params.push_str(", ");
        icall_params.push_str(&itype.templates.cs_in_expr.render(&TemplateArgs::in_expr(self_reference, "")));
    }

    for (i, iarg) in imethod.arguments.iter().enumerate() {
        let context = format!("argument '{}' of method '{qualified}'", iarg.name);
        let arg_type = ctx.member_type(itype, &iarg.ty, &context)?;

        if let Some(value) = iarg.default_argument.as_ref().and(iarg.def_param_value.as_ref()) {
            if !is_assignable(value, arg_type) {
                return Err(GlueError::invalid(format!(
                    "Invalid default value for parameter '{}' of method '{qualified}'.",
                    iarg.name
                )));
            }
        }

        let arg_cs_type = ctx.cs_type_of(arg_type, &iarg.ty)?;
        let use_span_for_arg = use_span && arg_type.is_span_compatible;
        let nullable_val = iarg.def_param_mode == DefaultParamMode::NullableVal;

        if i > 0 {
            arguments_sig.push_str(", ");
        }
        if nullable_val {
            arguments_sig.push_str("Nullable<");
        }
        arguments_sig.push_str(if use_span_for_arg { &arg_type.c_type_in } else { &arg_cs_type });
        arguments_sig.push_str(if nullable_val { "> " } else { " " });
        arguments_sig.push_str(&iarg.name);

        if let Some(default) = iarg.default_argument.as_ref().filter(|_| !use_span && !imethod.is_compat) {
            if iarg.def_param_mode == DefaultParamMode::Constant {
                arguments_sig.push_str(" = ");
                arguments_sig.push_str(&default.render_seq(&arg_type.cs_type));
            } else {
                arguments_sig.push_str(" = null");
            }
        }

        icall_params.push_str(", ");

        let non_constant_default = iarg
            .default_argument
            .as_ref()
            .filter(|_| iarg.def_param_mode != DefaultParamMode::Constant && !use_span_for_arg);

        let arg_in = match non_constant_default {
            Some(default) => {
                // Type argOrDefVal = arg.HasValue ? arg.Value : <default>;
                let local = format!("{}OrDefVal", iarg.name);
                let element_type = arg_cs_type.strip_suffix("[]").unwrap_or(&arg_cs_type);
                let def_arg = default.render_seq(element_type);

                cs_in_statements.push_str(&format!("{INDENT2}{arg_cs_type} {local} = {}", iarg.name));
                if nullable_val {
                    cs_in_statements.push_str(&format!(".HasValue ? {}.Value : ", iarg.name));
                } else {
                    cs_in_statements.push_str(&format!(" != null ? {} : ", iarg.name));
                }
                cs_in_statements.push_str(&def_arg);
                cs_in_statements.push_str(";\n");

                let param_tag_name = iarg.name.strip_prefix('@').unwrap_or(&iarg.name);
                let param_def_arg = def_arg.replace('<', "&lt;").replace('>', "&gt;");
                default_args_doc.push_str(&format!(
                    "{MEMBER_BEGIN}/// <param name=\"{param_tag_name}\">If the parameter is null, then the default value is <c>{param_def_arg}</c>.</param>"
                ));

                local
            }
            None => iarg.name.clone(),
        };

        if !arg_type.templates.cs_in.is_empty() {
            cs_in_statements.push_str(&arg_type.templates.cs_in.render(&TemplateArgs::marshal_in(
                &arg_type.c_type,
                &arg_in,
                INDENT2,
            )));
        }

        if arg_type.templates.cs_in_expr.is_empty() {
            icall_params.push_str(&arg_in);
        } else {
            icall_params.push_str(
                &arg_type
                    .templates
                    .cs_in_expr
                    .render(&TemplateArgs::in_expr(&arg_in, &arg_type.c_type)),
            );
        }

        cs_in_expr_is_unsafe |= arg_type.cs_in_expr_is_unsafe;
    }

    if use_span && !has_span_argument {
        return Ok(());
    }

    if imethod.is_vararg {
        icall_params.push_str(&format!(
            ", (godot_string_name)MethodName.{}.NativeValue",
            imethod.proxy_name
        ));
    }

    if !imethod.is_virtual && !imethod.requires_object_call && !use_span {
        out.push_str(MEMBER_BEGIN);
        out.push_str("[DebuggerBrowsable(DebuggerBrowsableState.Never)]\n");
        out.push_str(INDENT1);
        out.push_str("private static readonly IntPtr ");
        out.push_str(&method_bind_field);
        out.push_str(" = ");
        if itype.is_singleton {
            // Static classes do not derive GodotObject
            out.push_str("GodotObject.");
        }
        out.push_str(&format!(
            "{ICALL_CLASSDB_GET_METHOD_WITH_COMPATIBILITY}({BINDINGS_NATIVE_NAME_FIELD}, MethodName.{}, {}ul);\n",
            imethod.proxy_name, imethod.hash
        ));
    }

    if let Some(doc) = &imethod.doc {
        let xml = ctx.doc_xml(Some(itype), &doc.description, false);
        push_summary(out, &xml, MEMBER_BEGIN, INDENT1, "");
    }

    out.push_str(&default_args_doc);

    if imethod.is_deprecated {
        push_obsolete(out, MEMBER_BEGIN, &ctx.obsolete_text(Some(itype), &imethod.deprecation_message), "");
    }

    if imethod.is_hidden {
        out.push_str(MEMBER_BEGIN);
        out.push_str("[EditorBrowsable(EditorBrowsableState.Never)]");
    }

    out.push_str(MEMBER_BEGIN);
    out.push_str(if imethod.is_internal { "internal " } else { "public " });

    if allows_inherited_member_hiding(&format!("{}.{}", itype.proxy_name, imethod.proxy_name)) {
        out.push_str("new ");
    }

    if itype.is_singleton || imethod.is_static {
        out.push_str("static ");
    } else if imethod.is_virtual {
        out.push_str("virtual ");
    }

    if cs_in_expr_is_unsafe {
        out.push_str("unsafe ");
    }

    let return_cs_type = ctx.cs_type_of(return_type, &imethod.return_type)?;
    out.push_str(&format!("{return_cs_type} {}({arguments_sig})\n", imethod.proxy_name));
    out.push_str(OPEN_BLOCK_L1);

    if imethod.is_virtual {
        // Overridden by scripts; the default does nothing
        if return_type.cname != "void" {
            out.push_str(INDENT2);
            out.push_str("return default;\n");
        }
        out.push_str(CLOSE_BLOCK_L1);
        return Ok(());
    }

    if imethod.requires_object_call {
        out.push_str(&format!("{INDENT2}{CS_METHOD_CALL}(MethodName.{}", imethod.proxy_name));
        for iarg in &imethod.arguments {
            out.push_str(", ");
            out.push_str(&iarg.name);
        }
        out.push_str(");\n");
        out.push_str(CLOSE_BLOCK_L1);
        return Ok(());
    }

    let icall = ctx.icalls.for_method(itype, method_idx).ok_or_else(|| {
        GlueError::invalid(format!("No native call was registered for method '{qualified}'."))
    })?;
    let im_call = format!(
        "{}.{}",
        if icall.editor_only { BINDINGS_CLASS_NATIVECALLS_EDITOR } else { BINDINGS_CLASS_NATIVECALLS },
        icall.name
    );

    if !imethod.arguments.is_empty() {
        out.push_str(&cs_in_statements);
    }

    if return_type.cname == "void" {
        out.push_str(&format!("{INDENT2}{im_call}({icall_params});\n"));
    } else if return_type.templates.cs_out.is_empty() {
        out.push_str(&format!("{INDENT2}return {im_call}({icall_params});\n"));
    } else {
        out.push_str(&return_type.templates.cs_out.render(&TemplateArgs::managed_out(
            &im_call,
            &icall_params,
            &return_cs_type,
            &return_type.c_type_out,
            INDENT2,
        )));
        out.push('\n');
    }

    out.push_str(CLOSE_BLOCK_L1);
    cursor.advance();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icalls::IcallTable;
    use crate::reflection::{MethodBindInfo, TypeMeta, Variant, VariantType};
    use crate::testing::{build_registry, ClassBuilder, SnapshotBuilder};

    fn emit_all(class: ClassBuilder, name: &str) -> (String, MethodBindCursor) {
        let db = SnapshotBuilder::new().class(ClassBuilder::new("Object")).class(class).build();
        let (registry, icalls) = build_registry(&db).unwrap();
        let ctx = EmitContext::new(&registry, &icalls);
        let itype = &registry.obj_types[name];

        let mut out = String::new();
        let mut cursor = MethodBindCursor::new();
        for (idx, imethod) in itype.methods.iter().enumerate() {
            generate_method(&ctx, itype, imethod, idx, &mut cursor, false, &mut out).unwrap();
            if !imethod.is_internal {
                generate_method(&ctx, itype, imethod, idx, &mut cursor, true, &mut out).unwrap();
            }
        }
        (out, cursor)
    }

    #[test]
    fn test_constant_default_argument() {
        let mut method = ClassBuilder::int_method("do_thing", &["a"]);
        method
            .bind
            .get_or_insert_with(MethodBindInfo::default)
            .default_arguments
            .insert(0, Variant::Int(5));
        method.hash = 42;

        let (out, cursor) = emit_all(ClassBuilder::new("Foo").parent("Object").method(method), "Foo");

        assert!(out.contains(
            "private static readonly IntPtr MethodBind0 = ClassDB_get_method_with_compatibility(NativeName, MethodName.DoThing, 42ul);"
        ));
        assert!(out.contains("public int DoThing(int a = 5)\n    {\n"));
        assert!(out.contains("return NativeCalls.godot_icall_1_0(MethodBind0, GodotObject.GetPtr(this), a);\n"));
        assert_eq!(cursor.current(), 1);
    }

    #[test]
    fn test_nullable_default_is_materialised() {
        let mut method = ClassBuilder::void_method("set_offset", &["offset"]);
        method.arguments[0].ty = VariantType::Vector2;
        method
            .bind
            .get_or_insert_with(MethodBindInfo::default)
            .default_arguments
            .insert(0, Variant::Vector2([1.0, 2.0]));

        let (out, _) = emit_all(ClassBuilder::new("Foo").parent("Object").method(method), "Foo");

        assert!(out.contains("/// <param name=\"offset\">If the parameter is null, then the default value is <c>new Vector2(1.0f, 2.0f)</c>.</param>"));
        assert!(out.contains("public unsafe void SetOffset(Nullable<Vector2> offset = null)"));
        assert!(out.contains("Vector2 offsetOrDefVal = offset.HasValue ? offset.Value : new Vector2(1.0f, 2.0f);\n"));
        assert!(out.contains("&offsetOrDefVal);\n"));
    }

    #[test]
    fn test_span_overload_shares_method_bind() {
        let mut method = ClassBuilder::void_method("set_data", &["data"]);
        method.arguments[0].ty = VariantType::PackedByteArray;

        let (out, cursor) = emit_all(ClassBuilder::new("Foo").parent("Object").method(method), "Foo");

        assert_eq!(out.matches("private static readonly IntPtr MethodBind").count(), 1);
        assert!(out.contains("public void SetData(byte[] data)"));
        assert!(out.contains("public void SetData(ReadOnlySpan<byte> data)"));
        assert_eq!(out.matches("(MethodBind0, GodotObject.GetPtr(this), data);").count(), 2);
        assert_eq!(cursor.current(), 1);
    }

    #[test]
    fn test_vararg_passes_method_name() {
        let mut method = ClassBuilder::void_method("emit", &["name"]);
        method.arguments[0].ty = VariantType::StringName;
        method.bind.get_or_insert_with(MethodBindInfo::default).is_vararg = true;

        let (out, _) = emit_all(ClassBuilder::new("Foo").parent("Object").method(method), "Foo");

        assert!(out.contains("public void Emit(StringName name, params Variant[] @args)"));
        assert!(out.contains("public void Emit(StringName name, ReadOnlySpan<Variant> @args)"));
        assert!(out.contains(", @args, (godot_string_name)MethodName.Emit.NativeValue);"));
    }

    #[test]
    fn test_virtual_and_object_call_methods() {
        let mut ready = ClassBuilder::void_method("_ready", &[]);
        ready.is_virtual = true;
        ready.bind = None;
        let mut get_value = ClassBuilder::int_method("_get_value", &[]);
        get_value.is_virtual = true;
        get_value.bind = None;
        let mut free = ClassBuilder::void_method("free", &[]);
        free.bind = None;

        let (out, cursor) = emit_all(
            ClassBuilder::new("Foo")
                .parent("Object")
                .method(ready)
                .method(get_value)
                .method(free)
                .virtual_listed("free"),
            "Foo",
        );

        assert!(out.contains("public virtual void _Ready()\n    {\n    }\n"));
        assert!(out.contains("public virtual int _GetValue()\n    {\n        return default;\n    }\n"));
        assert!(out.contains("public void Free()\n    {\n        Call(MethodName.Free);\n    }\n"));
        assert!(!out.contains("MethodBind"));
        assert_eq!(cursor.current(), 0);
    }

    #[test]
    fn test_singleton_methods_are_static() {
        let (out, _) = emit_all(
            ClassBuilder::new("Input")
                .parent("Object")
                .singleton()
                .method(ClassBuilder::int_method("get_count", &[])),
            "Input",
        );

        assert!(out.contains("= GodotObject.ClassDB_get_method_with_compatibility(NativeName"));
        assert!(out.contains("public static int GetCount()"));
        assert!(out.contains("(MethodBind0, GodotObject.GetPtr(Singleton));"));
    }

    #[test]
    fn test_invalid_default_is_fatal() {
        let db = SnapshotBuilder::new()
            .class(ClassBuilder::new("Object").method(ClassBuilder::int_method("f", &["a"])))
            .build();
        let (mut registry, _) = build_registry(&db).unwrap();
        {
            let object = &mut registry.obj_types["Object"];
            let arg = &mut object.methods[0].arguments[0];
            arg.default_argument = Some(
                crate::template::Template::new(crate::template::SlotKind::DefaultValue, "\"x\"").unwrap(),
            );
            arg.def_param_value = Some(Variant::String("x".into()));
        }
        let icalls = IcallTable::build(&registry).unwrap();
        let ctx = EmitContext::new(&registry, &icalls);
        let object = &registry.obj_types["Object"];

        let mut out = String::new();
        let err = generate_method(&ctx, object, &object.methods[0], 0, &mut MethodBindCursor::new(), false, &mut out)
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid default value for parameter 'a' of method 'Object.f'.");
    }

    #[test]
    fn test_meta_narrows_return_type() {
        let mut method = ClassBuilder::int_method("get_id", &[]);
        method.bind.get_or_insert_with(MethodBindInfo::default).return_meta = TypeMeta::Uint64;

        let (out, _) = emit_all(ClassBuilder::new("Foo").parent("Object").method(method), "Foo");
        assert!(out.contains("public ulong GetId()"));
    }
}
