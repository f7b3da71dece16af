//! One `{Proxy}.cs` file per engine class.

use tracing::{error, info};

use crate::defs::{
    allows_inherited_member_hiding, BINDINGS_NAMESPACE, BINDINGS_NATIVE_NAME_FIELD, CLOSE_BLOCK, CLOSE_BLOCK_L1,
    CLOSE_BLOCK_L2, CS_METHOD_HAS_GODOT_CLASS_METHOD, CS_METHOD_HAS_GODOT_CLASS_SIGNAL,
    CS_METHOD_INVOKE_GODOT_CLASS_METHOD, CS_PARAM_INSTANCE, CS_PARAM_MEMORYOWN, CS_PROPERTY_SINGLETON,
    CS_SINGLETON_INSTANCE_SUFFIX, CS_STATIC_FIELD_METHOD_PROXY_NAME_PREFIX, CS_STATIC_FIELD_NATIVE_CTOR,
    CS_STATIC_FIELD_SIGNAL_PROXY_NAME_PREFIX, C_METHOD_ENGINE_GET_SINGLETON, ICALL_CLASSDB_GET_CONSTRUCTOR,
    INDENT1, INDENT2, INDENT3, INDENT4, MEMBER_BEGIN, OPEN_BLOCK, OPEN_BLOCK_L1,
};
use crate::emit::method::{generate_method, MethodBindCursor};
use crate::emit::property::generate_property;
use crate::emit::signal::generate_signal;
use crate::emit::{push_obsolete, push_summary, EmitContext};
use crate::error::{GlueError, Result};
use crate::template::TemplateArgs;
use crate::types::{ApiType, TypeInterface, ARRAY_GENERIC, DICTIONARY_GENERIC};

fn log_failure(what: &str, name: &str, class: &str) -> impl FnOnce(GlueError) -> GlueError {
    let message = format!("Failed to generate {what} '{name}' for class '{class}'.");
    move |err| {
        error!("{message}");
        err
    }
}

/// Render the C# source of object type `itype`.
pub fn generate_type<'a>(ctx: &EmitContext<'a>, itype: &'a TypeInterface) -> Result<String> {
    if !itype.is_object_type {
        return Err(GlueError::invalid(format!("'{}' is not an object type.", itype.name)));
    }

    let is_derived_type = itype.base_name.is_some();
    if !is_derived_type {
        let valid_root = itype.cname == "Object"
            && itype.is_instantiable
            && itype.api_type == ApiType::Core
            && !itype.is_ref_counted
            && !itype.is_singleton;
        if !valid_root {
            return Err(GlueError::invalid(format!(
                "Only an instantiable core 'Object' may be a root type, found '{}'.",
                itype.name
            )));
        }
    }

    info!("Generating {}.cs...", itype.proxy_name);

    let mut output = String::new();
    output.push_str(&format!("namespace {BINDINGS_NAMESPACE};\n\n"));
    output.push_str("using System;\n");
    output.push_str("using System.ComponentModel;\n");
    output.push_str("using System.Diagnostics;\n");
    output.push_str("using Godot.NativeInterop;\n");
    output.push_str("\n#nullable disable\n");

    if let Some(doc) = &itype.class_doc {
        let xml = ctx.doc_xml(Some(itype), &doc.description, false);
        push_summary(&mut output, &xml, "", "", "\n");
    }

    if itype.is_deprecated {
        push_obsolete(&mut output, "", &ctx.obsolete_text(Some(itype), &itype.deprecation_message), "\n");
    }

    // Lets introspection map the managed class back to the engine class
    if itype.name != itype.proxy_name {
        output.push_str(&format!("[GodotClassName(\"{}\")]\n", itype.name));
    }

    // Never abstract: the engine may still hand out instances
    output.push_str("public ");
    output.push_str(if itype.is_singleton { "static partial class " } else { "partial class " });
    output.push_str(&itype.proxy_name);

    if let Some(base_name) = itype.base_name.as_deref().filter(|_| !itype.is_singleton) {
        let base = ctx.registry.obj_types.get(base_name).ok_or_else(|| {
            error!("Base type '{}' does not exist, for class '{}'.", base_name, itype.name);
            GlueError::type_not_found(base_name, format!("base of '{}'", itype.name))
        })?;
        output.push_str(" : ");
        output.push_str(&base.proxy_name);
        if base.is_singleton {
            output.push_str(CS_SINGLETON_INSTANCE_SUFFIX);
        }
    }

    output.push_str("\n{");

    push_constants(ctx, itype, &mut output);
    push_enums(ctx, itype, &mut output)?;

    for iprop in &itype.properties {
        generate_property(ctx, itype, iprop, &mut output)
            .map_err(log_failure("property", &iprop.cname, &itype.name))?;
    }

    if is_derived_type && !itype.is_singleton {
        output.push_str(&format!(
            "{MEMBER_BEGIN}private static readonly System.Type CachedType = typeof({});\n",
            itype.proxy_name
        ));
    }

    output.push_str(&format!(
        "{MEMBER_BEGIN}private static readonly StringName {BINDINGS_NATIVE_NAME_FIELD} = \"{}\";\n",
        itype.name
    ));

    if itype.is_singleton || itype.is_compat_singleton {
        push_singleton_property(ctx, itype, &mut output);
    }

    if !itype.is_singleton {
        push_constructors(itype, is_derived_type, &mut output);
    }

    let mut cursor = MethodBindCursor::new();
    for (idx, imethod) in itype.methods.iter().enumerate() {
        generate_method(ctx, itype, imethod, idx, &mut cursor, false, &mut output)
            .map_err(log_failure("method", &imethod.name, &itype.name))?;
        if imethod.is_internal {
            continue;
        }
        generate_method(ctx, itype, imethod, idx, &mut cursor, true, &mut output)
            .map_err(log_failure("span overload method", &imethod.name, &itype.name))?;
    }

    for isignal in &itype.signals {
        generate_signal(ctx, itype, isignal, &mut output)
            .map_err(log_failure("signal", &isignal.name, &itype.name))?;
    }

    if !itype.is_singleton && (is_derived_type || itype.has_virtual_methods) {
        push_script_lookup(ctx, itype, is_derived_type, &mut output)?;
    }

    push_name_classes(ctx, itype, &mut output)?;

    output.push_str(CLOSE_BLOCK);
    Ok(output)
}

fn push_constants(ctx: &EmitContext<'_>, itype: &TypeInterface, output: &mut String) {
    for iconstant in &itype.constants {
        if let Some(doc) = &iconstant.doc {
            let xml = ctx.doc_xml(Some(itype), &doc.description, false);
            push_summary(output, &xml, MEMBER_BEGIN, INDENT1, "");
        }
        if iconstant.is_deprecated {
            push_obsolete(
                output,
                MEMBER_BEGIN,
                &ctx.obsolete_text(Some(itype), &iconstant.deprecation_message),
                "",
            );
        }
        output.push_str(&format!(
            "{MEMBER_BEGIN}public const long {} = {};",
            iconstant.proxy_name, iconstant.value
        ));
    }

    if !itype.constants.is_empty() {
        output.push('\n');
    }
}

fn push_enums(ctx: &EmitContext<'_>, itype: &TypeInterface, output: &mut String) -> Result<()> {
    for ienum in &itype.enums {
        if ienum.constants.is_empty() {
            return Err(GlueError::invalid(format!(
                "Enum '{}.{}' has no constants.",
                itype.name, ienum.cname
            )));
        }

        if ienum.is_flags {
            output.push_str(MEMBER_BEGIN);
            output.push_str("[System.Flags]");
        }

        output.push_str(&format!("{MEMBER_BEGIN}public enum {} : long", ienum.proxy_name));
        output.push_str(MEMBER_BEGIN);
        output.push_str(OPEN_BLOCK);

        let last = ienum.constants.len() - 1;
        for (i, iconstant) in ienum.constants.iter().enumerate() {
            if let Some(doc) = &iconstant.doc {
                let xml = ctx.doc_xml(Some(itype), &doc.description, false);
                push_summary(output, &xml, INDENT2, INDENT2, "\n");
            }
            if iconstant.is_deprecated {
                push_obsolete(
                    output,
                    INDENT2,
                    &ctx.obsolete_text(Some(itype), &iconstant.deprecation_message),
                    "\n",
                );
            }
            output.push_str(&format!(
                "{INDENT2}{} = {}{}",
                iconstant.proxy_name,
                iconstant.value,
                if i == last { "\n" } else { ",\n" }
            ));
        }

        output.push_str(INDENT1);
        output.push_str(CLOSE_BLOCK);
    }

    Ok(())
}

fn push_singleton_property(ctx: &EmitContext<'_>, itype: &TypeInterface, output: &mut String) {
    let instance_type_name = if itype.is_singleton {
        let instance_name = format!("{}{CS_SINGLETON_INSTANCE_SUFFIX}", itype.name);
        ctx.registry
            .obj_types
            .get(&instance_name)
            .map_or("GodotObject", |instance| instance.proxy_name.as_str())
    } else {
        itype.proxy_name.as_str()
    };

    output.push_str(&format!("{MEMBER_BEGIN}private static {instance_type_name} singleton;\n"));
    output.push_str(&format!(
        "{MEMBER_BEGIN}public static {instance_type_name} {CS_PROPERTY_SINGLETON} =>\n\
         {INDENT2}singleton ??= ({instance_type_name}){C_METHOD_ENGINE_GET_SINGLETON}(\"{}\");\n",
        itype.name
    ));
}

fn push_constructors(itype: &TypeInterface, is_derived_type: bool, output: &mut String) {
    // Declared here rather than in a hand-written partial so that static
    // field initialisation order stays within one file
    if itype.is_instantiable {
        output.push_str(&format!(
            "{MEMBER_BEGIN}[DebuggerBrowsable(DebuggerBrowsableState.Never)]\n\
             {INDENT1}private static readonly unsafe delegate* unmanaged<godot_bool, IntPtr> {CS_STATIC_FIELD_NATIVE_CTOR} = {ICALL_CLASSDB_GET_CONSTRUCTOR}({BINDINGS_NATIVE_NAME_FIELD});\n"
        ));
    }

    if !is_derived_type {
        return;
    }

    let memory_own = itype.memory_own;
    let construct = |ctor: &str| {
        format!(
            "{INDENT2}unsafe\n{INDENT2}{OPEN_BLOCK}{INDENT3}ConstructAndInitialize({ctor}, {BINDINGS_NATIVE_NAME_FIELD}, CachedType, refCounted: {});\n{CLOSE_BLOCK_L2}",
            itype.is_ref_counted
        )
    };

    let (visibility, ctor) = if itype.is_instantiable {
        ("public", CS_STATIC_FIELD_NATIVE_CTOR)
    } else {
        ("internal", "null")
    };
    output.push_str(&format!(
        "{MEMBER_BEGIN}{visibility} {}() : this({memory_own})\n{OPEN_BLOCK_L1}{}{CLOSE_BLOCK_L1}",
        itype.proxy_name,
        construct(ctor)
    ));

    output.push_str(&format!(
        "{MEMBER_BEGIN}internal {}(IntPtr {CS_PARAM_INSTANCE}) : this({memory_own})\n{OPEN_BLOCK_L1}{INDENT2}NativePtr = {CS_PARAM_INSTANCE};\n{}{CLOSE_BLOCK_L1}",
        itype.proxy_name,
        construct("null")
    ));

    output.push_str(&format!(
        "{MEMBER_BEGIN}public {}(bool {CS_PARAM_MEMORYOWN}) : base({CS_PARAM_MEMORYOWN}) {{ }}\n",
        itype.proxy_name
    ));
}

/// Overrides through which the engine finds script implementations of
/// virtual methods and signals.
fn push_script_lookup(
    ctx: &EmitContext<'_>,
    itype: &TypeInterface,
    is_derived_type: bool,
    output: &mut String,
) -> Result<()> {
    let modifier = if is_derived_type { "override" } else { "virtual" };
    let virtual_methods = || itype.methods.iter().filter(|m| m.is_virtual);

    for imethod in virtual_methods() {
        output.push_str(&format!(
            "{MEMBER_BEGIN}// ReSharper disable once InconsistentNaming\n\
             {INDENT1}[DebuggerBrowsable(DebuggerBrowsableState.Never)]\n\
             {INDENT1}private static readonly StringName {CS_STATIC_FIELD_METHOD_PROXY_NAME_PREFIX}{} = \"{}\";\n",
            imethod.name, imethod.proxy_name
        ));
    }

    for isignal in &itype.signals {
        output.push_str(&format!(
            "{MEMBER_BEGIN}// ReSharper disable once InconsistentNaming\n\
             {INDENT1}[DebuggerBrowsable(DebuggerBrowsableState.Never)]\n\
             {INDENT1}private static readonly StringName {CS_STATIC_FIELD_SIGNAL_PROXY_NAME_PREFIX}{} = \"{}\";\n",
            isignal.name, isignal.proxy_name
        ));
    }

    output.push_str(&format!(
        "{MEMBER_BEGIN}/// <summary>\n\
         {INDENT1}/// Invokes the method with the given name, using the given arguments.\n\
         {INDENT1}/// This method is used by Godot to invoke methods from the engine side.\n\
         {INDENT1}/// Do not call or override this method.\n\
         {INDENT1}/// </summary>\n\
         {INDENT1}/// <param name=\"method\">Name of the method to invoke.</param>\n\
         {INDENT1}/// <param name=\"args\">Arguments to use with the invoked method.</param>\n\
         {INDENT1}/// <param name=\"ret\">Value returned by the invoked method.</param>\n"
    ));
    output.push_str("#pragma warning disable CS0618 // Member is obsolete\n");
    output.push_str(&format!(
        "{INDENT1}public {modifier} bool {CS_METHOD_INVOKE_GODOT_CLASS_METHOD}(in godot_string_name method, NativeVariantPtrArgs args, out godot_variant ret)\n{INDENT1}{{\n"
    ));

    for imethod in virtual_methods() {
        let field = format!("{CS_STATIC_FIELD_METHOD_PROXY_NAME_PREFIX}{}", imethod.name);
        output.push_str(&format!(
            "{INDENT2}if ((method == {field} || method == MethodName.{}) && args.Count == {} && {CS_METHOD_HAS_GODOT_CLASS_METHOD}((godot_string_name){field}.NativeValue))\n{INDENT2}{{\n",
            imethod.proxy_name,
            imethod.arguments.len()
        ));

        let returns_value = imethod.return_type.cname != "void";
        output.push_str(INDENT3);
        if returns_value {
            output.push_str("var callRet = ");
        }
        output.push_str(&imethod.proxy_name);
        output.push('(');

        for (i, iarg) in imethod.arguments.iter().enumerate() {
            let arg_type = ctx.registry.require(&iarg.ty, &format!("argument '{}' of '{}'", iarg.name, imethod.name))?;
            if i > 0 {
                output.push_str(", ");
            }
            let value = format!("args[{i}]");
            let converted = arg_type.templates.cs_variant_to_managed.render(&TemplateArgs::variant(
                &value,
                &arg_type.cs_type,
                &arg_type.name,
            ));
            if arg_type.cname == ARRAY_GENERIC || arg_type.cname == DICTIONARY_GENERIC {
                let arg_cs_type = ctx.cs_type_of(arg_type, &iarg.ty)?;
                output.push_str(&format!("new {arg_cs_type}({converted})"));
            } else {
                output.push_str(&converted);
            }
        }
        output.push_str(");\n");

        if returns_value {
            let return_type = ctx
                .registry
                .require(&imethod.return_type, &format!("return type of '{}'", imethod.name))?;
            let converted = return_type.templates.cs_managed_to_variant.render(&TemplateArgs::variant(
                "callRet",
                &return_type.cs_type,
                &return_type.name,
            ));
            output.push_str(&format!("{INDENT3}ret = {converted};\n"));
        } else {
            output.push_str(&format!("{INDENT3}ret = default;\n"));
        }
        output.push_str(&format!("{INDENT3}return true;\n{INDENT2}}}\n"));
    }

    if is_derived_type {
        output.push_str(&format!(
            "{INDENT2}return base.{CS_METHOD_INVOKE_GODOT_CLASS_METHOD}(method, args, out ret);\n"
        ));
    } else {
        output.push_str(&format!("{INDENT2}ret = default;\n{INDENT2}return false;\n"));
    }
    output.push_str(&format!("{INDENT1}}}\n"));
    output.push_str("#pragma warning restore CS0618\n");

    output.push_str(&format!(
        "{MEMBER_BEGIN}/// <summary>\n\
         {INDENT1}/// Check if the type contains a method with the given name.\n\
         {INDENT1}/// This method is used by Godot to check if a method exists before invoking it.\n\
         {INDENT1}/// Do not call or override this method.\n\
         {INDENT1}/// </summary>\n\
         {INDENT1}/// <param name=\"method\">Name of the method to check for.</param>\n"
    ));
    output.push_str(&format!(
        "{MEMBER_BEGIN}public {modifier} bool {CS_METHOD_HAS_GODOT_CLASS_METHOD}(in godot_string_name method)\n{INDENT1}{{\n"
    ));
    for imethod in virtual_methods() {
        push_lookup_branch(
            output,
            "method",
            &format!("MethodName.{}", imethod.proxy_name),
            CS_METHOD_HAS_GODOT_CLASS_METHOD,
            &format!("{CS_STATIC_FIELD_METHOD_PROXY_NAME_PREFIX}{}", imethod.name),
        );
    }
    push_lookup_tail(output, is_derived_type, CS_METHOD_HAS_GODOT_CLASS_METHOD, "method");

    output.push_str(&format!(
        "{MEMBER_BEGIN}/// <summary>\n\
         {INDENT1}/// Check if the type contains a signal with the given name.\n\
         {INDENT1}/// This method is used by Godot to check if a signal exists before raising it.\n\
         {INDENT1}/// Do not call or override this method.\n\
         {INDENT1}/// </summary>\n\
         {INDENT1}/// <param name=\"signal\">Name of the signal to check for.</param>\n"
    ));
    output.push_str(&format!(
        "{MEMBER_BEGIN}public {modifier} bool {CS_METHOD_HAS_GODOT_CLASS_SIGNAL}(in godot_string_name signal)\n{INDENT1}{{\n"
    ));
    for isignal in &itype.signals {
        push_lookup_branch(
            output,
            "signal",
            &format!("SignalName.{}", isignal.proxy_name),
            CS_METHOD_HAS_GODOT_CLASS_SIGNAL,
            &format!("{CS_STATIC_FIELD_SIGNAL_PROXY_NAME_PREFIX}{}", isignal.name),
        );
    }
    push_lookup_tail(output, is_derived_type, CS_METHOD_HAS_GODOT_CLASS_SIGNAL, "signal");

    Ok(())
}

/// A native name match asks again with the proxy name, which script classes override.
fn push_lookup_branch(output: &mut String, param: &str, cached_name: &str, check: &str, field: &str) {
    output.push_str(&format!(
        "{INDENT2}if ({param} == {cached_name})\n{INDENT2}{{\n\
         {INDENT3}if ({check}({field}.NativeValue.DangerousSelfRef))\n{INDENT3}{{\n\
         {INDENT4}return true;\n\
         {INDENT3}}}\n{INDENT2}}}\n"
    ));
}

fn push_lookup_tail(output: &mut String, is_derived_type: bool, check: &str, param: &str) {
    if is_derived_type {
        output.push_str(&format!("{INDENT2}return base.{check}({param});\n"));
    } else {
        output.push_str(&format!("{INDENT2}return false;\n"));
    }
    output.push_str(&format!("{INDENT1}}}\n"));
}

fn push_name_class_header(output: &mut String, summary: &str, class: &str, base: Option<&TypeInterface>) {
    output.push_str(&format!(
        "{MEMBER_BEGIN}/// <summary>\n{INDENT1}/// {summary}\n{INDENT1}/// </summary>\n"
    ));
    match base {
        Some(base) => output.push_str(&format!("{INDENT1}public new class {class} : {}.{class}", base.proxy_name)),
        None => output.push_str(&format!("{INDENT1}public class {class}")),
    }
    output.push_str(&format!("\n{INDENT1}{{\n"));
}

fn push_cached_name(output: &mut String, itype: &TypeInterface, class: &str, kind: &str, proxy: &str, cname: &str) {
    let hiding = allows_inherited_member_hiding(&format!("{}.{class}.{proxy}", itype.proxy_name));
    output.push_str(&format!(
        "{INDENT2}/// <summary>\n\
         {INDENT2}/// Cached name for the '{cname}' {kind}.\n\
         {INDENT2}/// </summary>\n\
         {INDENT2}public static {}readonly StringName {proxy} = \"{cname}\";\n",
        if hiding { "new " } else { "" }
    ));
}

/// `PropertyName`, `MethodName` and `SignalName` nested classes.
fn push_name_classes(ctx: &EmitContext<'_>, itype: &TypeInterface, output: &mut String) -> Result<()> {
    let base = if itype.is_singleton { None } else { ctx.registry.base_of(itype) };

    push_name_class_header(
        output,
        "Cached StringNames for the properties and fields contained in this class, for fast lookup.",
        "PropertyName",
        base,
    );
    for iprop in &itype.properties {
        push_cached_name(output, itype, "PropertyName", "property", &iprop.proxy_name, &iprop.cname);
    }
    output.push_str(&format!("{INDENT1}}}\n"));

    push_name_class_header(
        output,
        "Cached StringNames for the methods contained in this class, for fast lookup.",
        "MethodName",
        base,
    );
    let mut method_names: Vec<(&str, &str)> = Vec::new();
    for imethod in &itype.methods {
        if let Some((_, cname)) = method_names.iter().find(|(proxy, _)| *proxy == imethod.proxy_name) {
            if *cname != imethod.cname {
                return Err(GlueError::invalid(format!(
                    "Method name '{}' already exists with a different value.",
                    imethod.proxy_name
                )));
            }
            continue;
        }
        method_names.push((imethod.proxy_name.as_str(), imethod.cname.as_str()));
        push_cached_name(output, itype, "MethodName", "method", &imethod.proxy_name, &imethod.cname);
    }
    output.push_str(&format!("{INDENT1}}}\n"));

    push_name_class_header(
        output,
        "Cached StringNames for the signals contained in this class, for fast lookup.",
        "SignalName",
        base,
    );
    for isignal in &itype.signals {
        push_cached_name(output, itype, "SignalName", "signal", &isignal.proxy_name, &isignal.cname);
    }
    output.push_str(&format!("{INDENT1}}}\n"));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflection::{ClassDb, ClassDoc, MemberDoc, SignalInfo};
    use crate::testing::{build_registry, ClassBuilder, SnapshotBuilder};

    fn generate(db: &ClassDb, class: &str) -> Result<String> {
        let (registry, icalls) = build_registry(db)?;
        let ctx = EmitContext::new(&registry, &icalls);
        generate_type(&ctx, &registry.obj_types[class])
    }

    fn object() -> ClassBuilder {
        ClassBuilder::new("Object").instantiable()
    }

    #[test]
    fn test_root_object() {
        let mut notification = ClassBuilder::void_method("_notification", &["what"]);
        notification.is_virtual = true;
        notification.bind = None;
        let db = SnapshotBuilder::new().class(object().method(notification)).build();

        let out = generate(&db, "Object").unwrap();
        assert!(out.starts_with(
            "namespace Godot;\n\nusing System;\nusing System.ComponentModel;\nusing System.Diagnostics;\nusing Godot.NativeInterop;\n\n#nullable disable\n[GodotClassName(\"Object\")]\npublic partial class GodotObject\n{"
        ));
        assert!(!out.contains("CachedType"));
        assert!(out.contains("private static readonly StringName NativeName = \"Object\";\n"));
        assert!(out.contains("delegate* unmanaged<godot_bool, IntPtr> NativeCtor = ClassDB_get_constructor(NativeName);\n"));
        assert!(!out.contains("public GodotObject()"));
        assert!(out.contains("public virtual bool InvokeGodotClassMethod("));
        assert!(out.contains("        ret = default;\n        return false;\n    }\n"));
        assert!(out.contains(
            "        if ((method == MethodProxyName__notification || method == MethodName._Notification) && args.Count == 1 && HasGodotClassMethod((godot_string_name)MethodProxyName__notification.NativeValue))\n"
        ));
        assert!(out.contains("            _Notification(VariantUtils.ConvertTo<int>(args[0]));\n            ret = default;\n            return true;\n"));
        assert!(out.contains("    public class PropertyName\n    {\n    }\n"));
        assert!(out.ends_with("    }\n}\n"));
    }

    #[test]
    fn test_root_must_be_object() {
        let db = SnapshotBuilder::new().class(ClassBuilder::new("Stray").instantiable()).build();
        assert!(generate(&db, "Stray").is_err());
    }

    #[test]
    fn test_derived_class() {
        let mut doc = ClassDoc {
            description: "A [b]thing[/b].".into(),
            ..Default::default()
        };
        doc.constants.push(MemberDoc {
            name: "MAX".into(),
            description: "Upper bound.".into(),
            ..Default::default()
        });

        let mut class = ClassBuilder::new("Foo")
            .parent("Object")
            .instantiable()
            .int_property("size", "set_size", "get_size")
            .method(ClassBuilder::void_method("set_size", &["value"]))
            .method(ClassBuilder::int_method("get_size", &[]))
            .constant("MAX", 10)
            .build();
        class.signals.push(SignalInfo {
            name: "resized".into(),
            arguments: Vec::new(),
        });

        let db = SnapshotBuilder::new()
            .class(object())
            .class_info(class)
            .doc("Foo", doc)
            .build();
        let out = generate(&db, "Foo").unwrap();

        assert!(out.contains("#nullable disable\n/// <summary>\n/// <para>A <b>thing</b>.</para>\n/// </summary>\npublic partial class Foo : GodotObject\n{"));
        assert!(out.contains("\n    /// <summary>\n    /// <para>Upper bound.</para>\n    /// </summary>\n    public const long Max = 10;\n"));
        assert!(out.contains("private static readonly System.Type CachedType = typeof(Foo);\n"));
        assert!(out.contains(
            "\n    public Foo() : this(false)\n    {\n        unsafe\n        {\n            ConstructAndInitialize(NativeCtor, NativeName, CachedType, refCounted: false);\n        }\n    }\n"
        ));
        assert!(out.contains(
            "\n    internal Foo(IntPtr ptr) : this(false)\n    {\n        NativePtr = ptr;\n        unsafe\n        {\n            ConstructAndInitialize(null, NativeName, CachedType, refCounted: false);\n        }\n    }\n"
        ));
        assert!(out.contains("\n    public Foo(bool memoryOwn) : base(memoryOwn) { }\n"));
        assert!(out.contains("public override bool InvokeGodotClassMethod("));
        assert!(out.contains("        return base.InvokeGodotClassMethod(method, args, out ret);\n"));
        assert!(out.contains("        return base.HasGodotClassMethod(method);\n"));
        assert!(out.contains(
            "        if (signal == SignalName.Resized)\n        {\n            if (HasGodotClassSignal(SignalProxyName_resized.NativeValue.DangerousSelfRef))\n            {\n                return true;\n            }\n        }\n"
        ));
        assert!(out.contains("    public new class MethodName : GodotObject.MethodName\n    {\n"));
        assert!(out.contains("        public static readonly StringName SetSize = \"set_size\";\n"));
        assert!(out.contains("        /// Cached name for the 'size' property.\n"));
    }

    #[test]
    fn test_abstract_class_hides_constructor() {
        let db = SnapshotBuilder::new()
            .class(object())
            .class(ClassBuilder::new("RefCounted").parent("Object"))
            .build();
        let out = generate(&db, "RefCounted").unwrap();

        assert!(!out.contains("NativeCtor ="));
        assert!(out.contains(
            "\n    internal RefCounted() : this(true)\n    {\n        unsafe\n        {\n            ConstructAndInitialize(null, NativeName, CachedType, refCounted: true);\n        }\n    }\n"
        ));
    }

    #[test]
    fn test_enums() {
        let db = SnapshotBuilder::new()
            .class(object())
            .class(
                ClassBuilder::new("Foo")
                    .parent("Object")
                    .enumeration("Mode", &[("MODE_A", 0), ("MODE_B", 1)])
                    .flags("Flags", &[("FLAG_X", 1), ("FLAG_Y", 2)]),
            )
            .build();
        let out = generate(&db, "Foo").unwrap();

        assert!(out.contains("\n    public enum Mode : long\n    {\n        A = 0,\n        B = 1\n    }\n"));
        assert!(out.contains("\n    [System.Flags]\n    public enum Flags : long\n    {\n        X = 1,\n        Y = 2\n    }\n"));
    }

    #[test]
    fn test_singleton_class() {
        let db = SnapshotBuilder::new()
            .class(object())
            .class(
                ClassBuilder::new("Input")
                    .parent("Object")
                    .singleton()
                    .method(ClassBuilder::int_method("get_count", &[])),
            )
            .build();
        let (registry, icalls) = build_registry(&db).unwrap();
        let ctx = EmitContext::new(&registry, &icalls);

        let out = generate_type(&ctx, &registry.obj_types["Input"]).unwrap();
        assert!(out.contains("public static partial class Input\n{"));
        assert!(!out.contains("CachedType"));
        assert!(out.contains("\n    private static InputInstance singleton;\n"));
        assert!(out.contains(
            "\n    public static InputInstance Singleton =>\n        singleton ??= (InputInstance)InteropUtils.EngineGetSingleton(\"Input\");\n"
        ));
        assert!(!out.contains("InvokeGodotClassMethod"));
        assert!(out.contains("    public class MethodName\n"));

        let instance = generate_type(&ctx, &registry.obj_types["InputInstance"]).unwrap();
        assert!(instance.contains("[GodotClassName(\"Input\")]\npublic partial class InputInstance : GodotObject\n"));
        assert!(instance.contains("internal InputInstance() : this(false)"));
    }

    #[test]
    fn test_derived_from_singleton_uses_instance() {
        let db = SnapshotBuilder::new()
            .class(object())
            .class(ClassBuilder::new("Engine").parent("Object").singleton())
            .class(ClassBuilder::new("EngineExt").parent("Engine"))
            .build();
        let out = generate(&db, "EngineExt").unwrap();
        assert!(out.contains("public partial class EngineExt : EngineInstance\n"));
        assert!(out.contains("public new class SignalName : Engine.SignalName"));
    }

    #[test]
    fn test_compat_singleton_property() {
        let db = SnapshotBuilder::new()
            .class(object())
            .class(ClassBuilder::new("EditorInterface").parent("Object").singleton().api(ApiType::Editor))
            .build();
        let out = generate(&db, "EditorInterface").unwrap();
        assert!(out.contains("public partial class EditorInterface : GodotObject\n"));
        assert!(out.contains("public static EditorInterface Singleton =>\n"));
    }
}
