//! C# source emitters.
//!
//! Each emitter appends to a `String` buffer and fails on the first
//! inconsistency it finds in the type model.

pub mod class;
pub mod extensions;
pub mod globals;
pub mod method;
pub mod native_calls;
pub mod property;
pub mod signal;

pub use method::MethodBindCursor;

use crate::error::{GlueError, Result};
use crate::icalls::IcallTable;
use crate::markup::{bbcode_to_text, bbcode_to_xml};
use crate::naming::fix_doc_description;
use crate::registry::TypeRegistry;
use crate::types::{ApiType, TypeInterface, TypeReference};

/// Read-only state shared by every emitter during one run.
#[derive(Clone, Copy)]
pub struct EmitContext<'a> {
    pub registry: &'a TypeRegistry,
    pub icalls: &'a IcallTable,
}

impl<'a> EmitContext<'a> {
    pub fn new(registry: &'a TypeRegistry, icalls: &'a IcallTable) -> Self {
        Self { registry, icalls }
    }

    /// XML summary for a documentation description, empty if there is none.
    pub fn doc_xml(&self, itype: Option<&TypeInterface>, description: &str, is_signal: bool) -> String {
        if description.is_empty() {
            return String::new();
        }
        bbcode_to_xml(&fix_doc_description(description), itype, self.registry, is_signal)
    }

    /// Plain-text form of a deprecation message.
    pub fn obsolete_text(&self, itype: Option<&TypeInterface>, message: &str) -> String {
        bbcode_to_text(message, itype, self.registry)
    }

    /// Resolve the type of a member of `owner`. Singletons resolve to their
    /// instance type, and core types may not depend on editor types.
    pub fn member_type(&self, owner: &TypeInterface, typeref: &TypeReference, what: &str) -> Result<&'a TypeInterface> {
        let itype = self.registry.require_or_singleton(typeref, what)?;

        if itype.is_singleton {
            return Err(GlueError::invalid(format!("{what} is a singleton: '{}'.", itype.name)));
        }

        if owner.api_type == ApiType::Core && itype.api_type == ApiType::Editor {
            return Err(GlueError::ApiVisibility {
                target: itype.name.clone(),
                target_api: ApiType::Editor.display_name().to_string(),
                source_api: ApiType::Core.display_name().to_string(),
                context: what.to_string(),
            });
        }

        Ok(itype)
    }

    /// Managed spelling of a type reference, generic arguments included.
    pub fn cs_type_of(&self, itype: &TypeInterface, typeref: &TypeReference) -> Result<String> {
        let generics = self
            .registry
            .generic_type_parameters(itype, &typeref.generic_type_parameters)?;
        Ok(format!("{}{generics}", itype.cs_type))
    }
}

/// Append an XML summary block.
///
/// `open` precedes the opening line, `indent` prefixes every `///` line and
/// `close` follows the closing tag.
pub(crate) fn push_summary(out: &mut String, xml: &str, open: &str, indent: &str, close: &str) {
    if xml.is_empty() {
        return;
    }

    out.push_str(open);
    out.push_str("/// <summary>\n");
    for line in xml.split('\n') {
        out.push_str(indent);
        out.push_str("/// ");
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(indent);
    out.push_str("/// </summary>");
    out.push_str(close);
}

/// Append an `[Obsolete("...")]` attribute.
pub(crate) fn push_obsolete(out: &mut String, open: &str, message: &str, close: &str) {
    out.push_str(open);
    out.push_str("[Obsolete(\"");
    out.push_str(message);
    out.push_str("\")]");
    out.push_str(close);
}
