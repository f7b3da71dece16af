//! Property wrappers. A property forwards to its accessor methods, which may
//! be declared on a base class.

use crate::defs::{
    allows_inherited_member_hiding, CLOSE_BLOCK_L1, CLOSE_BLOCK_L2, INDENT1, INDENT2, INDENT3, MEMBER_BEGIN,
    OPEN_BLOCK_L1, OPEN_BLOCK_L2,
};
use crate::emit::{push_obsolete, push_summary, EmitContext};
use crate::error::{GlueError, Result};
use crate::types::{ArgumentInterface, MethodInterface, PropertyInterface, TypeInterface};

/// Find method `cname` on `itype` or the nearest base declaring it.
fn find_inherited_method<'a>(
    ctx: &EmitContext<'a>,
    itype: &'a TypeInterface,
    cname: &str,
) -> Result<Option<&'a MethodInterface>> {
    for current in ctx.registry.ancestors(itype) {
        let current = current?;
        if let Some(imethod) = current.find_method_by_name(cname) {
            return Ok(Some(imethod));
        }
        if let Some(base) = current.base_name.as_deref() {
            if !ctx.registry.obj_types.contains_key(base) {
                return Err(GlueError::type_not_found(
                    base,
                    format!("base of '{}'", current.name),
                ));
            }
        }
    }
    Ok(None)
}

fn check_arity(iprop: &PropertyInterface, itype: &TypeInterface, role: &str, imethod: &MethodInterface, expected: usize) -> Result<()> {
    if imethod.arguments.len() == expected {
        return Ok(());
    }
    Err(GlueError::invalid(format!(
        "The {role} of property '{}.{}' takes {} arguments, expected {expected}.",
        itype.name,
        iprop.cname,
        imethod.arguments.len()
    )))
}

/// The index literal passed to an indexed accessor. A non-int index is an enum.
fn index_literal(ctx: &EmitContext<'_>, iprop: &PropertyInterface, idx_arg: &ArgumentInterface) -> Result<String> {
    if idx_arg.ty.cname == "int" {
        return Ok(iprop.index.to_string());
    }
    let idx_type = ctx
        .registry
        .require(&idx_arg.ty, &format!("index of property '{}'", iprop.cname))?;
    Ok(format!("({})({})", idx_type.proxy_name, iprop.index))
}

pub fn generate_property<'a>(
    ctx: &EmitContext<'a>,
    itype: &'a TypeInterface,
    iprop: &PropertyInterface,
    out: &mut String,
) -> Result<()> {
    let qualified = format!("{}.{}", itype.name, iprop.cname);
    let setter = find_inherited_method(ctx, itype, &iprop.setter)?;
    let getter = find_inherited_method(ctx, itype, &iprop.getter)?;

    let indexed = usize::from(iprop.is_indexed());
    if let Some(setter) = setter {
        check_arity(iprop, itype, "setter", setter, 1 + indexed)?;
    }
    if let Some(getter) = getter {
        check_arity(iprop, itype, "getter", getter, indexed)?;
    }

    let proptype = match (getter, setter) {
        (None, None) => {
            return Err(GlueError::invalid(format!(
                "Property '{qualified}' has neither a getter nor a setter."
            )))
        }
        (Some(getter), Some(setter)) => {
            let value_arg = setter.arguments.last().map(|a| &a.ty);
            if value_arg != Some(&getter.return_type) {
                return Err(GlueError::invalid(format!(
                    "Return type from getter doesn't match first argument of setter for property: '{qualified}'."
                )));
            }
            &getter.return_type
        }
        (Some(getter), None) => &getter.return_type,
        (None, Some(setter)) => match setter.arguments.last() {
            Some(arg) => &arg.ty,
            None => return Err(GlueError::invalid(format!("Setter of property '{qualified}' takes no value."))),
        },
    };

    let prop_itype = ctx.member_type(itype, proptype, &format!("property '{qualified}'"))?;

    if let Some(doc) = &iprop.doc {
        let xml = ctx.doc_xml(Some(itype), &doc.description, false);
        push_summary(out, &xml, MEMBER_BEGIN, INDENT1, "");
    }

    if iprop.is_deprecated {
        push_obsolete(out, MEMBER_BEGIN, &ctx.obsolete_text(Some(itype), &iprop.deprecation_message), "");
    }

    if iprop.is_hidden {
        out.push_str(MEMBER_BEGIN);
        out.push_str("[EditorBrowsable(EditorBrowsableState.Never)]");
        // Internal properties may forward to deprecated accessors
        out.push_str("\n#pragma warning disable CS0618 // Type or member is obsolete.");
    }

    out.push_str(MEMBER_BEGIN);
    out.push_str("public ");
    if allows_inherited_member_hiding(&format!("{}.{}", itype.proxy_name, iprop.proxy_name)) {
        out.push_str("new ");
    }
    if itype.is_singleton {
        out.push_str("static ");
    }

    out.push_str(&ctx.cs_type_of(prop_itype, proptype)?);
    out.push(' ');
    out.push_str(&iprop.proxy_name);
    out.push('\n');
    out.push_str(OPEN_BLOCK_L1);

    if let Some(getter) = getter {
        out.push_str(INDENT2);
        out.push_str("get\n");
        out.push_str(OPEN_BLOCK_L2);
        out.push_str(INDENT3);
        out.push_str("return ");
        out.push_str(&getter.proxy_name);
        out.push('(');
        if let Some(idx_arg) = getter.arguments.first().filter(|_| iprop.is_indexed()) {
            out.push_str(&index_literal(ctx, iprop, idx_arg)?);
        }
        out.push_str(");\n");
        out.push_str(CLOSE_BLOCK_L2);
    }

    if let Some(setter) = setter {
        out.push_str(INDENT2);
        out.push_str("set\n");
        out.push_str(OPEN_BLOCK_L2);
        out.push_str(INDENT3);
        out.push_str(&setter.proxy_name);
        out.push('(');
        if let Some(idx_arg) = setter.arguments.first().filter(|_| iprop.is_indexed()) {
            out.push_str(&index_literal(ctx, iprop, idx_arg)?);
            out.push_str(", ");
        }
        out.push_str("value);\n");
        out.push_str(CLOSE_BLOCK_L2);
    }

    out.push_str(CLOSE_BLOCK_L1);

    if iprop.is_hidden {
        out.push_str("#pragma warning restore CS0618 // Type or member is obsolete.\n");
    }

    Ok(())
}
