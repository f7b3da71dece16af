//! Signal events.
//!
//! A signal with arguments gets a delegate type and a trampoline unpacking the
//! variant arguments. Parameterless signals use `Action` directly.

use crate::defs::{
    BINDINGS_NAMESPACE, CLOSE_BLOCK_L1, CS_PROPERTY_SINGLETON, INDENT1, INDENT2, MEMBER_BEGIN, OPEN_BLOCK_L1,
};
use crate::emit::{push_obsolete, push_summary, EmitContext};
use crate::error::Result;
use crate::template::TemplateArgs;
use crate::types::{SignalInterface, TypeInterface, ARRAY_GENERIC, DICTIONARY_GENERIC};

pub fn generate_signal<'a>(
    ctx: &EmitContext<'a>,
    itype: &'a TypeInterface,
    isignal: &SignalInterface,
    out: &mut String,
) -> Result<()> {
    let qualified = format!("{}.{}", itype.name, isignal.name);

    // (resolved type, managed spelling) per argument
    let mut args = Vec::with_capacity(isignal.arguments.len());
    for iarg in &isignal.arguments {
        let context = format!("argument '{}' of signal '{qualified}'", iarg.name);
        let arg_type = ctx.member_type(itype, &iarg.ty, &context)?;
        let arg_cs_type = ctx.cs_type_of(arg_type, &iarg.ty)?;
        args.push((arg_type, arg_cs_type));
    }

    let arguments_sig = isignal
        .arguments
        .iter()
        .zip(&args)
        .map(|(iarg, (_, cs_type))| format!("{cs_type} {}", iarg.name))
        .collect::<Vec<_>>()
        .join(", ");

    let is_parameterless = isignal.arguments.is_empty();
    let delegate_name = if is_parameterless {
        "Action".to_string()
    } else {
        format!("{}EventHandler", isignal.proxy_name)
    };
    let obsolete = isignal
        .is_deprecated
        .then(|| ctx.obsolete_text(Some(itype), &isignal.deprecation_message));

    if !is_parameterless {
        out.push_str(MEMBER_BEGIN);
        out.push_str("/// <summary>\n");
        out.push_str(&format!(
            "{INDENT1}/// Represents the method that handles the <see cref=\"{BINDINGS_NAMESPACE}.{}.{}\"/> event of a <see cref=\"{BINDINGS_NAMESPACE}.{}\"/> class.\n",
            itype.proxy_name, isignal.proxy_name, itype.proxy_name
        ));
        out.push_str(INDENT1);
        out.push_str("/// </summary>");

        if let Some(message) = &obsolete {
            push_obsolete(out, MEMBER_BEGIN, message, "");
        }
        out.push_str(&format!("{MEMBER_BEGIN}public delegate void {delegate_name}({arguments_sig});\n"));

        if let Some(message) = &obsolete {
            push_obsolete(out, MEMBER_BEGIN, message, "");
        }
        out.push_str(&format!(
            "{MEMBER_BEGIN}private static void {}Trampoline(object delegateObj, NativeVariantPtrArgs args, out godot_variant ret)\n",
            isignal.proxy_name
        ));
        out.push_str(INDENT1);
        out.push_str("{\n");
        out.push_str(&format!(
            "{INDENT2}Callable.ThrowIfArgCountMismatch(args, {});\n",
            isignal.arguments.len()
        ));
        out.push_str(&format!("{INDENT2}(({delegate_name})delegateObj)("));

        for (idx, (arg_type, arg_cs_type)) in args.iter().enumerate() {
            if idx > 0 {
                out.push_str(", ");
            }
            let value = format!("args[{idx}]");
            let converted = arg_type.templates.cs_variant_to_managed.render(&TemplateArgs::variant(
                &value,
                &arg_type.cs_type,
                &arg_type.name,
            ));
            if arg_type.cname == ARRAY_GENERIC || arg_type.cname == DICTIONARY_GENERIC {
                out.push_str(&format!("new {arg_cs_type}({converted})"));
            } else {
                out.push_str(&converted);
            }
        }

        out.push_str(");\n");
        out.push_str(INDENT2);
        out.push_str("ret = default;\n");
        out.push_str(INDENT1);
        out.push_str("}\n");
    }

    if let Some(doc) = &isignal.doc {
        let xml = ctx.doc_xml(Some(itype), &doc.description, true);
        push_summary(out, &xml, MEMBER_BEGIN, INDENT1, "");
    }

    if let Some(message) = &obsolete {
        push_obsolete(out, MEMBER_BEGIN, message, "");
    }

    out.push_str(MEMBER_BEGIN);
    out.push_str("public ");
    if itype.is_singleton {
        out.push_str("static ");
    }
    if !is_parameterless {
        // Taking the trampoline's address
        out.push_str("unsafe ");
    }
    out.push_str(&format!("event {delegate_name} {}\n", isignal.proxy_name));
    out.push_str(OPEN_BLOCK_L1);

    let target = if itype.is_singleton {
        format!("{CS_PROPERTY_SINGLETON}.")
    } else {
        String::new()
    };
    let callable = if is_parameterless {
        "Callable.From(value)".to_string()
    } else {
        format!("Callable.CreateWithUnsafeTrampoline(value, &{}Trampoline)", isignal.proxy_name)
    };
    for (accessor, method) in [("add", "Connect"), ("remove", "Disconnect")] {
        out.push_str(&format!(
            "{INDENT2}{accessor} => {target}{method}(SignalName.{}, {callable});\n",
            isignal.proxy_name
        ));
    }
    out.push_str(CLOSE_BLOCK_L1);

    if itype.is_singleton {
        return Ok(());
    }

    if let Some(message) = &obsolete {
        push_obsolete(out, MEMBER_BEGIN, message, "");
    }

    let emit_params: String = isignal
        .arguments
        .iter()
        .zip(&args)
        .map(|(iarg, (arg_type, _))| {
            let cast = if arg_type.is_enum { "(long)" } else { "" };
            format!(", {cast}{}", iarg.name)
        })
        .collect();

    out.push_str(&format!(
        "{MEMBER_BEGIN}protected void EmitSignal{}({arguments_sig})\n",
        isignal.proxy_name
    ));
    out.push_str(OPEN_BLOCK_L1);
    out.push_str(&format!(
        "{INDENT2}EmitSignal(SignalName.{}{emit_params});\n",
        isignal.proxy_name
    ));
    out.push_str(CLOSE_BLOCK_L1);

    Ok(())
}
