//! Global constants on `GD` and the global enums.

use tracing::info;

use crate::defs::{BINDINGS_GLOBAL_SCOPE_CLASS, BINDINGS_NAMESPACE, CLOSE_BLOCK, INDENT1, MEMBER_BEGIN, OPEN_BLOCK};
use crate::emit::{push_obsolete, push_summary, EmitContext};
use crate::error::{GlueError, Result};

/// The only struct global enums may be nested in.
const ENUM_HOST_STRUCT: &str = "Variant";

pub fn generate_global_constants(ctx: &EmitContext<'_>) -> Result<String> {
    let registry = ctx.registry;
    let mut out = String::new();

    out.push_str(&format!("namespace {BINDINGS_NAMESPACE};\n\n"));
    out.push_str(&format!("public static partial class {BINDINGS_GLOBAL_SCOPE_CLASS}\n{OPEN_BLOCK}"));

    for iconstant in &registry.global_constants {
        if let Some(doc) = &iconstant.doc {
            push_summary(&mut out, &ctx.doc_xml(None, &doc.description, false), MEMBER_BEGIN, INDENT1, "");
        }
        out.push_str(&format!(
            "{MEMBER_BEGIN}public const long {} = {};",
            iconstant.proxy_name, iconstant.value
        ));
    }

    if !registry.global_constants.is_empty() {
        out.push('\n');
    }

    out.push_str(CLOSE_BLOCK);

    for ienum in &registry.global_enums {
        if ienum.constants.is_empty() {
            return Err(GlueError::invalid(format!("Global enum '{}' has no constants.", ienum.cname)));
        }

        let (host, enum_proxy_name) = match ienum.proxy_name.split_once('.') {
            Some((host, name)) => {
                if host != ENUM_HOST_STRUCT {
                    return Err(GlueError::invalid(format!(
                        "Global enum '{}' can only be nested in '{ENUM_HOST_STRUCT}'.",
                        ienum.proxy_name
                    )));
                }
                info!("Declaring global enum '{name}' inside struct '{host}'");
                (Some(host), name)
            }
            None => (None, ienum.proxy_name.as_str()),
        };

        let maybe_indent = if host.is_some() { INDENT1 } else { "" };
        let member_indent = format!("{maybe_indent}{INDENT1}");

        if let Some(host) = host {
            out.push_str(&format!("\npublic partial struct {host}\n{OPEN_BLOCK}"));
        }

        if ienum.is_flags {
            out.push_str(&format!("\n{maybe_indent}[System.Flags]"));
        }

        out.push_str(&format!(
            "\n{maybe_indent}public enum {enum_proxy_name} : long\n{maybe_indent}{OPEN_BLOCK}"
        ));

        for iconstant in &ienum.constants {
            if let Some(doc) = &iconstant.doc {
                let xml = ctx.doc_xml(None, &doc.description, false);
                push_summary(&mut out, &xml, &member_indent, &member_indent, "\n");
            }
            if iconstant.is_deprecated {
                push_obsolete(&mut out, &member_indent, &ctx.obsolete_text(None, &iconstant.deprecation_message), "\n");
            }
            out.push_str(&format!("{member_indent}{} = {},\n", iconstant.proxy_name, iconstant.value));
        }

        out.push_str(maybe_indent);
        out.push_str(CLOSE_BLOCK);

        if host.is_some() {
            out.push_str(CLOSE_BLOCK);
        }
    }

    Ok(out)
}
