//! Native-call shims: the `internal static unsafe` functions of the
//! `NativeCalls` classes that marshal arguments and invoke a method bind.

use std::borrow::Cow;

use crate::defs::{
    CLOSE_BLOCK_L1, CLOSE_BLOCK_L2, CLOSE_BLOCK_L3, CS_PARAM_INSTANCE, CS_PARAM_METHODBIND, C_CLASS_NATIVE_FUNCS,
    C_LOCAL_PTRCALL_ARGS, C_LOCAL_RET, C_LOCAL_VARARG_RET, INDENT2, INDENT3, INDENT4, MEMBER_BEGIN,
    OPEN_BLOCK_L1, OPEN_BLOCK_L2, OPEN_BLOCK_L3,
};
use crate::emit::EmitContext;
use crate::error::{GlueError, Result};
use crate::template::{SlotKind, Template, TemplateArgs};
use crate::types::{InternalCall, TypeInterface};

const OBJECT_C_IN_VARARG: &str = "%5using godot_variant %1_in = VariantUtils.CreateFromGodotObjectPtr(%1);\n";

/// Emit the shim for `icall`.
pub fn generate_native_call(ctx: &EmitContext<'_>, icall: &InternalCall, out: &mut String) -> Result<()> {
    let context = format!("native call '{}'", icall.name);
    let return_type = ctx.registry.require(&icall.return_type, &context)?;
    let ret_void = return_type.cname == "void";
    let argc = icall.argument_count();

    let mut c_func_sig = format!("IntPtr {CS_PARAM_METHODBIND}");
    if !icall.is_static {
        c_func_sig.push_str(&format!(", IntPtr {CS_PARAM_INSTANCE}"));
    }

    let mut c_in_statements = String::new();
    let mut c_args_var_content = Vec::with_capacity(argc);

    for (i, arg_ref) in icall.argument_types.iter().enumerate() {
        let arg_type = ctx.registry.require(arg_ref, &context)?;
        let c_param_name = format!("arg{}", i + 1);

        if icall.is_vararg {
            // The trailing vararg span is unpacked separately
            if i + 1 < argc {
                let c_in_vararg = vararg_template(arg_type)?;
                c_in_statements.push_str(&c_in_vararg.render(&TemplateArgs::marshal_in(
                    &arg_type.c_type,
                    &c_param_name,
                    INDENT3,
                )));
                c_in_statements.push_str(&format!(
                    "{INDENT3}{C_LOCAL_PTRCALL_ARGS}[{i}] = new IntPtr(&{c_param_name}_in);\n"
                ));
            }
        } else {
            if !arg_type.templates.c_in.is_empty() {
                c_in_statements.push_str(&arg_type.templates.c_in.render(&TemplateArgs::marshal_in(
                    &arg_type.c_type,
                    &c_param_name,
                    INDENT2,
                )));
            }
            c_args_var_content.push(arg_type.templates.c_arg_in.render_seq(&c_param_name));
        }

        c_func_sig.push_str(&format!(", {} {c_param_name}", arg_type.c_type_in));
    }

    if icall.is_vararg {
        c_func_sig.push_str(", godot_string_name caller");
    }

    let ret_cs_type = if ret_void { "void" } else { return_type.c_type_out.as_str() };
    out.push_str(&format!(
        "{MEMBER_BEGIN}internal static unsafe {ret_cs_type} {}({c_func_sig})\n",
        icall.name
    ));
    out.push_str(OPEN_BLOCK_L1);

    if !icall.is_static {
        out.push_str(&format!("{INDENT2}ExceptionUtils.ThrowIfNullPtr({CS_PARAM_INSTANCE});\n"));
    }

    if !ret_void && (!icall.is_vararg || return_type.cname != "Variant") {
        push_ret_local(return_type, out);
    }

    if argc == 0 {
        push_call_and_return(icall, return_type, INDENT2, out)?;
    } else if icall.is_vararg {
        let vararg_arg = format!("arg{argc}");
        let real_argc = argc - 1;

        out.push_str(&format!("{INDENT2}int vararg_length = {vararg_arg}.Length;\n"));
        out.push_str(&format!("{INDENT2}int total_length = {real_argc} + vararg_length;\n"));
        out.push_str(&format!(
            "{INDENT2}Span<godot_variant.movable> varargs_span = vararg_length <= VarArgsSpanThreshold ?\n\
             {INDENT3}stackalloc godot_variant.movable[VarArgsSpanThreshold] :\n\
             {INDENT3}new godot_variant.movable[vararg_length];\n"
        ));
        out.push_str(&format!(
            "{INDENT2}Span<IntPtr> {C_LOCAL_PTRCALL_ARGS}_span = total_length <= VarArgsSpanThreshold ?\n\
             {INDENT3}stackalloc IntPtr[VarArgsSpanThreshold] :\n\
             {INDENT3}new IntPtr[total_length];\n"
        ));
        out.push_str(&format!(
            "{INDENT2}fixed (godot_variant.movable* varargs = &MemoryMarshal.GetReference(varargs_span))\n\
             {INDENT2}fixed (IntPtr* {C_LOCAL_PTRCALL_ARGS} = &MemoryMarshal.GetReference({C_LOCAL_PTRCALL_ARGS}_span))\n"
        ));
        out.push_str(OPEN_BLOCK_L2);
        out.push_str(&c_in_statements);
        out.push_str(&format!("{INDENT3}for (int i = 0; i < vararg_length; i++)\n"));
        out.push_str(OPEN_BLOCK_L3);
        out.push_str(&format!("{INDENT4}varargs[i] = {vararg_arg}[i].NativeVar;\n"));
        out.push_str(&format!(
            "{INDENT4}{C_LOCAL_PTRCALL_ARGS}[{real_argc} + i] = new IntPtr(&varargs[i]);\n"
        ));
        out.push_str(CLOSE_BLOCK_L3);
        push_call_and_return(icall, return_type, INDENT3, out)?;
        out.push_str(CLOSE_BLOCK_L2);
    } else {
        out.push_str(&c_in_statements);
        out.push_str(&format!(
            "{INDENT2}void** {C_LOCAL_PTRCALL_ARGS} = stackalloc void*[{argc}] {{ {} }};\n",
            c_args_var_content.join(", ")
        ));
        push_call_and_return(icall, return_type, INDENT2, out)?;
    }

    out.push_str(CLOSE_BLOCK_L1);
    Ok(())
}

fn vararg_template(arg_type: &TypeInterface) -> Result<Cow<'_, Template>> {
    if arg_type.is_object_type {
        return Ok(Cow::Owned(Template::new(SlotKind::CInVararg, OBJECT_C_IN_VARARG)?));
    }
    if arg_type.templates.c_in_vararg.is_empty() {
        return Err(GlueError::invalid(format!(
            "VarArg support not implemented for parameter type: {}",
            arg_type.name
        )));
    }
    Ok(Cow::Borrowed(&arg_type.templates.c_in_vararg))
}

/// Declare the local receiving the ptrcall result.
fn push_ret_local(return_type: &TypeInterface, out: &mut String) {
    let (ptrcall_return_type, mut initialization) = if return_type.is_object_type {
        let c_type = if return_type.is_ref_counted { "godot_ref" } else { return_type.c_type.as_str() };
        (c_type, " = default")
    } else {
        (return_type.c_type.as_str(), "")
    };

    out.push_str(INDENT2);
    if return_type.is_ref_counted || return_type.c_type_is_disposable_struct {
        out.push_str("using ");
        initialization = " = default";
    } else if return_type.c_ret_needs_default_initialization {
        initialization = " = default";
    }
    out.push_str(&format!("{ptrcall_return_type} {C_LOCAL_RET}{initialization};\n"));
}

fn push_call_and_return(icall: &InternalCall, return_type: &TypeInterface, indent: &str, out: &mut String) -> Result<()> {
    let ret_void = return_type.cname == "void";
    let instance = if icall.is_static { "IntPtr.Zero" } else { CS_PARAM_INSTANCE };

    if icall.is_vararg {
        let args = if icall.argument_count() > 0 {
            format!("(godot_variant**){C_LOCAL_PTRCALL_ARGS}")
        } else {
            "null".to_string()
        };

        out.push_str(indent);
        if !ret_void {
            // The temporary keeps the variant alive until it has been converted
            if return_type.cname != "Variant" {
                out.push_str(&format!("using godot_variant {C_LOCAL_VARARG_RET} = "));
            } else {
                out.push_str(&format!("godot_variant {C_LOCAL_RET} = "));
            }
        }
        out.push_str(&format!(
            "{C_CLASS_NATIVE_FUNCS}.godotsharp_method_bind_call({CS_PARAM_METHODBIND}, {instance}, {args}, total_length, out godot_variant_call_error vcall_error);\n"
        ));
        out.push_str(&format!(
            "{indent}ExceptionUtils.DebugCheckCallError(caller, {instance}, {args}, total_length, vcall_error);\n"
        ));

        if !ret_void && return_type.cname != "Variant" {
            if return_type.cname != "Error" {
                return Err(GlueError::invalid(format!(
                    "Custom VarArg return type not implemented: {}",
                    return_type.name
                )));
            }
            out.push_str(&format!(
                "{indent}{C_LOCAL_RET} = VariantUtils.ConvertToInt64({C_LOCAL_VARARG_RET});\n"
            ));
        }
    } else {
        let args = if icall.argument_count() > 0 { C_LOCAL_PTRCALL_ARGS } else { "null" };
        let ret = if ret_void { "null".to_string() } else { format!("&{C_LOCAL_RET}") };
        out.push_str(&format!(
            "{indent}{C_CLASS_NATIVE_FUNCS}.godotsharp_method_bind_ptrcall({CS_PARAM_METHODBIND}, {instance}, {args}, {ret});\n"
        ));
    }

    if !ret_void {
        if return_type.templates.c_out.is_empty() {
            out.push_str(&format!("{indent}return {C_LOCAL_RET};\n"));
        } else {
            out.push_str(&return_type.templates.c_out.render(&TemplateArgs::native_out(
                &return_type.c_type_out,
                C_LOCAL_RET,
                &return_type.name,
                indent,
            )));
        }
    }

    Ok(())
}
