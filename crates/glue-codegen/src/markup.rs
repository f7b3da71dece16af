//! Documentation markup translation.
//!
//! Class reference documentation uses a small BBCode dialect. It is rendered
//! either as plain text (deprecation messages) or as XML doc comment content.
//! Both renderings share one scanner: a tag stack plus an explicit state.
//!
//! Cross-references (`[method Node.add_child]`, `[member name]`, ...) are
//! resolved against the [`TypeRegistry`]. A reference that cannot be resolved,
//! or that would cross into an API partition the current type cannot see,
//! degrades to an undeclared placeholder.

use tracing::{debug, error};

use crate::defs::{BINDINGS_GLOBAL_SCOPE_CLASS, BINDINGS_NAMESPACE, GLOBAL_SCOPE_DOC};
use crate::naming::{snake_to_camel_case, xml_escape};
use crate::registry::{validate_api_visibility, TypeRegistry};
use crate::types::{DefaultParamMode, TypeInterface};

const REFERENCE_TAGS: &[&str] = &[
    "method",
    "constructor",
    "operator",
    "member",
    "signal",
    "enum",
    "constant",
    "theme_item",
    "param",
];

/// Code spans holding one of these render as a C# keyword.
const LANGWORDS: &[&str] = &["true", "false", "null"];

const CODE_CLOSE: &str = "[/code]";

/// Render markup as plain text. Code and styled spans are single-quoted.
pub fn bbcode_to_text(bbcode: &str, itype: Option<&TypeInterface>, registry: &TypeRegistry) -> String {
    Translator::new(registry, itype, Target::Text).run(bbcode)
}

/// Render markup as XML doc comment content wrapped in `<para>`.
///
/// Signal documentation is attached to the event rather than the delegate, so
/// `[param x]` cannot become a `<paramref>` there.
pub fn bbcode_to_xml(
    bbcode: &str,
    itype: Option<&TypeInterface>,
    registry: &TypeRegistry,
    is_signal: bool,
) -> String {
    Translator::new(registry, itype, Target::Xml { is_signal }).run(bbcode)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Text,
    Xml { is_signal: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    /// Markup is not interpreted until the code span closes
    InCode { resume_suppressed: bool },
    /// Inside `[codeblocks]` but outside its C# example
    Suppressed,
}

/// A resolved cross-reference.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Link {
    /// Qualified C# name usable as a `cref`
    Cref(String),
    Method {
        path: String,
        args: Vec<LinkArg>,
    },
    /// `_init` maps to the constructor of the given proxy
    Constructor(String),
    ObjectToString,
    Param(String),
    Undeclared(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LinkArg {
    cs_type: String,
    nullable: bool,
}

/// Built-in names that map straight to a C# spelling.
struct BuiltinSpelling {
    cref: &'static str,
    array: bool,
    /// Quoted in plain text
    quoted: bool,
}

fn builtin_spelling(tag: &str) -> Option<BuiltinSpelling> {
    let spelling = |cref, array, quoted| Some(BuiltinSpelling { cref, array, quoted });
    match tag {
        "Array" => spelling("Godot.Collections.Array", false, true),
        "Dictionary" => spelling("Godot.Collections.Dictionary", false, true),
        "bool" => spelling("bool", false, false),
        "int" => spelling("int", false, false),
        "float" => spelling("float", false, false),
        "String" => spelling("string", false, false),
        "Variant" => spelling("Godot.Variant", false, true),
        "PackedByteArray" => spelling("byte", true, false),
        "PackedInt32Array" => spelling("int", true, false),
        "PackedInt64Array" => spelling("long", true, false),
        "PackedFloat32Array" => spelling("float", true, false),
        "PackedFloat64Array" => spelling("double", true, false),
        "PackedStringArray" => spelling("string", true, false),
        "PackedVector2Array" => spelling("Godot.Vector2", true, true),
        "PackedVector3Array" => spelling("Godot.Vector3", true, true),
        "PackedColorArray" => spelling("Godot.Color", true, true),
        "PackedVector4Array" => spelling("Godot.Vector4", true, true),
        _ => None,
    }
}

fn is_tag(tag: &str, name: &str) -> bool {
    tag == name || tag.strip_prefix(name).is_some_and(|rest| rest.starts_with(' '))
}

struct Translator<'a> {
    registry: &'a TypeRegistry,
    itype: Option<&'a TypeInterface>,
    target: Target,
    out: String,
    stack: Vec<String>,
    state: State,
}

impl<'a> Translator<'a> {
    fn new(registry: &'a TypeRegistry, itype: Option<&'a TypeInterface>, target: Target) -> Self {
        Self {
            registry,
            itype,
            target,
            out: String::new(),
            stack: Vec::new(),
            state: State::Normal,
        }
    }

    fn is_xml(&self) -> bool {
        matches!(self.target, Target::Xml { .. })
    }

    fn run(mut self, bbcode: &str) -> String {
        if bbcode.is_empty() {
            return String::new();
        }

        if self.is_xml() {
            self.out.push_str("<para>");
        }

        let mut pos = 0;
        while pos < bbcode.len() {
            let brk_pos = bbcode[pos..].find('[').map_or(bbcode.len(), |i| pos + i);

            if brk_pos > pos {
                self.push_text(&bbcode[pos..brk_pos]);
            }

            if brk_pos == bbcode.len() {
                break;
            }

            let Some(brk_end) = bbcode[brk_pos + 1..].find(']').map(|i| brk_pos + 1 + i) else {
                self.push_text(&bbcode[brk_pos..]);
                break;
            };

            let tag = &bbcode[brk_pos + 1..brk_end];
            pos = self.tag(bbcode, tag, brk_pos, brk_end);
        }

        if self.is_xml() {
            self.out.push_str("</para>");
        }

        self.out
    }

    fn in_span(&self) -> bool {
        matches!(self.state, State::InCode { .. }) || !self.stack.is_empty()
    }

    /// Plain text drops all of `[codeblocks]`, XML keeps its C# example.
    fn is_hidden(&self) -> bool {
        match self.state {
            State::Suppressed => true,
            State::InCode { resume_suppressed } => resume_suppressed && !self.is_xml(),
            State::Normal => false,
        }
    }

    fn push_text(&mut self, text: &str) {
        if self.is_hidden() {
            return;
        }

        match self.target {
            Target::Text if self.in_span() => {
                self.out.push('\'');
                self.out.push_str(text);
                self.out.push('\'');
            }
            Target::Text => self.out.push_str(text),
            Target::Xml { .. } if self.in_span() => self.out.push_str(&xml_escape(text)),
            Target::Xml { .. } => {
                let lines: Vec<&str> = text.split('\n').collect();
                for (i, line) in lines.iter().enumerate() {
                    if i != 0 {
                        self.out.push_str("<para>");
                    }
                    self.out.push_str(&xml_escape(line));
                    if i != lines.len() - 1 {
                        self.out.push_str("</para>\n");
                    }
                }
            }
        }
    }

    fn push_xml(&mut self, markup: &str) {
        if self.is_xml() {
            self.out.push_str(markup);
        }
    }

    fn open_code(&mut self, name: &str, xml_open: &str) {
        let resume_suppressed = self.state == State::Suppressed;
        self.push_xml(xml_open);
        self.stack.push(name.to_string());
        self.state = State::InCode { resume_suppressed };
    }

    /// Handle one bracketed tag and return the position to resume scanning at.
    fn tag(&mut self, bbcode: &str, tag: &str, brk_pos: usize, brk_end: usize) -> usize {
        if self.state == State::Suppressed {
            if tag == "/codeblocks" && self.stack.last().is_some_and(|t| t == "codeblocks") {
                self.stack.pop();
                self.state = State::Normal;
                return brk_end + 1;
            }
            if is_tag(tag, "csharp") {
                self.open_code("csharp", "<code>");
                return brk_end + 1;
            }
            return brk_pos + 1;
        }

        if let Some(name) = tag.strip_prefix('/') {
            if self.stack.last().map(String::as_str) != Some(name) {
                if !self.is_hidden() {
                    self.out.push('[');
                }
                return brk_pos + 1;
            }

            self.stack.pop();
            if let State::InCode { resume_suppressed } = self.state {
                self.state = if resume_suppressed { State::Suppressed } else { State::Normal };
            }

            match name {
                "url" => self.push_xml("</a>"),
                "code" => self.push_xml("</c>"),
                "codeblock" | "csharp" => self.push_xml("</code>"),
                "b" => self.push_xml("</b>"),
                "i" => self.push_xml("</i>"),
                _ => {}
            }
            return brk_end + 1;
        }

        if matches!(self.state, State::InCode { .. }) {
            if !self.is_hidden() {
                self.out.push('[');
            }
            return brk_pos + 1;
        }

        if let Some((link_tag, rest)) = tag.split_once(' ') {
            if REFERENCE_TAGS.contains(&link_tag) {
                self.reference(tag, link_tag, rest.trim_start_matches(' '));
                return brk_end + 1;
            }
        }

        if self.registry.documented_classes.contains(tag) {
            self.class_reference(tag);
            return brk_end + 1;
        }

        match tag {
            "b" => {
                self.push_xml("<b>");
                self.stack.push(tag.to_string());
            }
            "i" => {
                self.push_xml("<i>");
                self.stack.push(tag.to_string());
            }
            "kbd" | "center" | "u" | "s" => self.stack.push(tag.to_string()),
            "br" => self.push_xml("\n"),
            "codeblocks" => {
                self.stack.push(tag.to_string());
                self.state = State::Suppressed;
            }
            "url" => {
                let end = bbcode[brk_end..].find('[').map_or(bbcode.len(), |i| brk_end + i);
                let url = &bbcode[brk_end + 1..end];
                match self.target {
                    Target::Text => self.out.push_str(url),
                    Target::Xml { .. } => {
                        self.out.push_str(&format!("<a href=\"{url}\">{url}"));
                    }
                }
                self.stack.push(tag.to_string());
                return end;
            }
            "img" => {
                let end = bbcode[brk_end..].find('[').map_or(bbcode.len(), |i| brk_end + i);
                let image = &bbcode[brk_end + 1..end];
                self.out.push_str(&format!("[img]{image}[/img]"));
                self.stack.push(tag.to_string());
                return end;
            }
            _ if is_tag(tag, "code") => {
                if self.is_xml() {
                    let rest = &bbcode[brk_end + 1..];
                    let code = rest.find('[').map_or(rest, |i| &rest[..i]);
                    if LANGWORDS.contains(&code) && rest[code.len()..].starts_with(CODE_CLOSE) {
                        self.out.push_str(&format!("<see langword=\"{code}\"/>"));
                        return brk_end + 1 + code.len() + CODE_CLOSE.len();
                    }
                }
                self.open_code("code", "<c>");
            }
            _ if is_tag(tag, "codeblock") => self.open_code("codeblock", "<code>"),
            _ if is_tag(tag, "csharp") => self.open_code("csharp", "<code>"),
            _ => {
                if let Some(url) = tag.strip_prefix("url=") {
                    match self.target {
                        Target::Text => self.out.push_str(url),
                        Target::Xml { .. } => self.out.push_str(&format!("<a href=\"{url}\">")),
                    }
                    self.stack.push("url".to_string());
                } else if tag.starts_with("color=") {
                    self.stack.push("color".to_string());
                } else if tag.starts_with("font=") {
                    self.stack.push("font".to_string());
                } else {
                    // Unknown tag: keep the bracket and carry on with its text
                    self.out.push('[');
                    return brk_pos + 1;
                }
            }
        }

        brk_end + 1
    }

    fn class_reference(&mut self, tag: &str) {
        if let Some(spelling) = builtin_spelling(tag) {
            let suffix = if spelling.array { "[]" } else { "" };
            let rendered = match self.target {
                Target::Text if spelling.quoted => format!("'{}{suffix}'", spelling.cref),
                Target::Text => format!("{}{suffix}", spelling.cref),
                Target::Xml { .. } => format!("<see cref=\"{}\"/>{suffix}", spelling.cref),
            };
            self.out.push_str(&rendered);
            return;
        }

        if tag == "Nil" {
            let rendered = if self.is_xml() { "<see langword=\"null\"/>" } else { "null" };
            self.out.push_str(rendered);
            return;
        }

        if tag.starts_with('@') {
            self.render(Link::Undeclared(tag.to_string()));
            return;
        }

        let Some(target_itype) = self.lookup_type(tag) else {
            error!("Cannot resolve type reference in documentation: '{}'.", tag);
            self.render(Link::Undeclared(tag.to_string()));
            return;
        };

        match self.target {
            Target::Text => self.out.push_str(&format!("'{}'", target_itype.proxy_name)),
            Target::Xml { .. } => {
                let link = if validate_api_visibility(Some(target_itype), self.itype) {
                    Link::Cref(format!("{BINDINGS_NAMESPACE}.{}", target_itype.proxy_name))
                } else {
                    Link::Undeclared(target_itype.proxy_name.clone())
                };
                self.render(link);
            }
        }
    }

    /// Some reserved names are registered with a leading underscore.
    fn lookup_type(&self, name: &str) -> Option<&'a TypeInterface> {
        self.registry
            .find_by_name(name)
            .or_else(|| self.registry.find_by_name(&format!("_{name}")))
    }

    fn reference(&mut self, tag: &str, link_tag: &str, link_target: &str) {
        let parts: Vec<&str> = link_target.split('.').collect();

        if parts.len() > 2 {
            error!("Invalid reference format: '{}'.", tag);
            self.render(Link::Undeclared(tag.to_string()));
            return;
        }

        let (target_itype, target_cname) = match parts.as_slice() {
            [owner, member] => (self.lookup_type(owner), *member),
            _ => (self.itype, link_target),
        };

        let link = if !validate_api_visibility(target_itype, self.itype) {
            Link::Undeclared(link_target.to_string())
        } else {
            match link_tag {
                "method" => self.method_link(target_itype, target_cname, link_target, &parts),
                "member" => self.member_link(target_itype, target_cname, link_target),
                "signal" => self.signal_link(target_itype, target_cname, link_target),
                "enum" => self.enum_link(target_itype, target_cname, link_target),
                "constant" => self.constant_link(target_itype, target_cname, link_target, &parts),
                "param" => Link::Param(snake_to_camel_case(link_target, false)),
                // Constructors, operators and theme items have no C# declaration
                _ => Link::Undeclared(link_target.to_string()),
            }
        };

        self.render(link);
    }

    fn render(&mut self, link: Link) {
        let rendered = match (self.target, link) {
            (Target::Text, Link::Cref(path)) => format!("'{path}'"),
            (Target::Text, Link::Method { path, args }) => {
                let args: Vec<String> = args
                    .into_iter()
                    .map(|a| if a.nullable { format!("Nullable<{}>", a.cs_type) } else { a.cs_type })
                    .collect();
                format!("'{path}({})'", args.join(", "))
            }
            (Target::Text, Link::Constructor(proxy)) => format!("'new {BINDINGS_NAMESPACE}.{proxy}()'"),
            (Target::Text, Link::ObjectToString) => "'object.ToString()'".to_string(),
            (Target::Text, Link::Param(name) | Link::Undeclared(name)) => format!("'{name}'"),

            (Target::Xml { .. }, Link::Cref(path)) => format!("<see cref=\"{path}\"/>"),
            (Target::Xml { .. }, Link::Method { path, args }) => {
                let args: Vec<String> = args
                    .into_iter()
                    .map(|a| {
                        let cs_type = a.cs_type.replace('<', "{").replace('>', "}");
                        if a.nullable { format!("Nullable{{{cs_type}}}") } else { cs_type }
                    })
                    .collect();
                format!("<see cref=\"{path}({})\"/>", args.join(", "))
            }
            (Target::Xml { .. }, Link::Constructor(proxy)) => {
                format!("<see cref=\"{BINDINGS_NAMESPACE}.{proxy}.{proxy}()\"/>")
            }
            (Target::Xml { .. }, Link::ObjectToString) => "<see cref=\"object.ToString()\"/>".to_string(),
            (Target::Xml { is_signal: false }, Link::Param(name)) => format!("<paramref name=\"{name}\"/>"),
            (Target::Xml { is_signal: true }, Link::Param(name)) => format!("<c>{name}</c>"),
            (Target::Xml { .. }, Link::Undeclared(name)) => format!("<c>{name}</c>"),
        };
        self.out.push_str(&rendered);
    }

    fn method_link(
        &self,
        target_itype: Option<&TypeInterface>,
        target_cname: &str,
        link_target: &str,
        parts: &[&str],
    ) -> Link {
        if parts[0] == GLOBAL_SCOPE_DOC {
            debug!("Cannot resolve @GlobalScope method reference in documentation: {}", link_target);
            return Link::Undeclared(link_target.to_string());
        }

        let Some(target_itype) = target_itype.filter(|t| t.is_object_type) else {
            debug!("Cannot resolve method reference in documentation: {}", link_target);
            return Link::Undeclared(link_target.to_string());
        };

        match target_cname {
            "_init" => return Link::Constructor(target_itype.proxy_name.clone()),
            "to_string" => return Link::ObjectToString,
            _ => {}
        }

        let Some(imethod) = target_itype.find_method_by_name(target_cname) else {
            if !target_itype.is_intentionally_ignored(target_cname) {
                error!("Cannot resolve method reference in documentation: '{}'.", link_target);
            }
            return Link::Undeclared(link_target.to_string());
        };

        let args = imethod
            .arguments
            .iter()
            .map(|iarg| {
                let Some(arg_type) = self.registry.resolve(&iarg.ty) else {
                    error!("Cannot resolve argument type in documentation: '{}'.", link_target);
                    return LinkArg {
                        cs_type: iarg.ty.cname.clone(),
                        nullable: false,
                    };
                };

                let generics = self
                    .registry
                    .generic_type_parameters(arg_type, &iarg.ty.generic_type_parameters)
                    .unwrap_or_else(|err| {
                        error!("Cannot resolve argument type in documentation: '{}': {}", link_target, err);
                        String::new()
                    });

                LinkArg {
                    cs_type: format!("{}{generics}", arg_type.cs_type).replace("params ", ""),
                    nullable: iarg.def_param_mode == DefaultParamMode::NullableVal,
                }
            })
            .collect();

        Link::Method {
            path: format!("{BINDINGS_NAMESPACE}.{}.{}", target_itype.proxy_name, imethod.proxy_name),
            args,
        }
    }

    fn member_link(&self, target_itype: Option<&TypeInterface>, target_cname: &str, link_target: &str) -> Link {
        // Properties with a slash in the name are not declared in C#
        if link_target.contains('/') {
            return Link::Undeclared(link_target.to_string());
        }

        let Some(target_itype) = target_itype.filter(|t| t.is_object_type) else {
            debug!("Cannot resolve member reference in documentation: {}", link_target);
            return Link::Undeclared(link_target.to_string());
        };

        let found = self
            .registry
            .ancestors(target_itype)
            .map_while(|t| t.ok())
            .find_map(|owner| owner.find_property_by_name(target_cname).map(|prop| (owner, prop)));

        match found {
            Some((owner, prop)) => Link::Cref(format!(
                "{BINDINGS_NAMESPACE}.{}.{}",
                owner.proxy_name, prop.proxy_name
            )),
            None => {
                if !target_itype.is_intentionally_ignored(target_cname) {
                    error!("Cannot resolve member reference in documentation: '{}'.", link_target);
                }
                Link::Undeclared(link_target.to_string())
            }
        }
    }

    fn signal_link(&self, target_itype: Option<&TypeInterface>, target_cname: &str, link_target: &str) -> Link {
        let Some(target_itype) = target_itype.filter(|t| t.is_object_type) else {
            debug!("Cannot resolve signal reference in documentation: {}", link_target);
            return Link::Undeclared(link_target.to_string());
        };

        match target_itype.find_signal_by_name(target_cname) {
            Some(isignal) => Link::Cref(format!(
                "{BINDINGS_NAMESPACE}.{}.{}",
                target_itype.proxy_name, isignal.proxy_name
            )),
            None => {
                if !target_itype.is_intentionally_ignored(target_cname) {
                    error!("Cannot resolve signal reference in documentation: '{}'.", link_target);
                }
                Link::Undeclared(link_target.to_string())
            }
        }
    }

    fn enum_link(&self, target_itype: Option<&TypeInterface>, target_cname: &str, link_target: &str) -> Link {
        let enum_types = &self.registry.enum_types;
        let found = match target_itype {
            Some(owner) => enum_types
                .get(&format!("{}.{target_cname}", owner.name))
                .or_else(|| enum_types.get(target_cname)),
            None => enum_types.get(target_cname),
        };

        match found {
            Some(ienum) => Link::Cref(format!("{BINDINGS_NAMESPACE}.{}", ienum.proxy_name)),
            None => {
                if !target_itype.is_some_and(|t| t.is_intentionally_ignored(target_cname)) {
                    error!("Cannot resolve enum reference in documentation: '{}'.", link_target);
                }
                Link::Undeclared(link_target.to_string())
            }
        }
    }

    fn global_constant_link(&self, target_cname: &str, link_target: &str) -> Link {
        if let Some(iconst) = self.registry.global_constants.iter().find(|c| c.name == target_cname) {
            return Link::Cref(format!(
                "{BINDINGS_NAMESPACE}.{BINDINGS_GLOBAL_SCOPE_CLASS}.{}",
                iconst.proxy_name
            ));
        }

        let enum_constant = self.registry.global_enums.iter().find_map(|ienum| {
            ienum
                .constants
                .iter()
                .find(|c| c.name == target_cname)
                .map(|iconst| (ienum, iconst))
        });

        match enum_constant {
            Some((ienum, iconst)) => Link::Cref(format!(
                "{BINDINGS_NAMESPACE}.{}.{}",
                ienum.proxy_name, iconst.proxy_name
            )),
            None => {
                error!("Cannot resolve global constant reference in documentation: '{}'.", link_target);
                Link::Undeclared(link_target.to_string())
            }
        }
    }

    fn constant_link(
        &self,
        target_itype: Option<&TypeInterface>,
        target_cname: &str,
        link_target: &str,
        parts: &[&str],
    ) -> Link {
        if parts[0] == GLOBAL_SCOPE_DOC {
            return self.global_constant_link(target_cname, link_target);
        }

        let Some(mut target_itype) = target_itype.filter(|t| t.is_object_type) else {
            // No class given: the global scope is the last resort
            if parts.len() == 1 {
                return self.global_constant_link(target_cname, link_target);
            }
            debug!("Cannot resolve constant reference in documentation: {}", link_target);
            return Link::Undeclared(link_target.to_string());
        };

        // Constants and enums are declared in the static singleton class
        if target_itype.is_singleton_instance {
            if let Some(singleton) = self.registry.obj_types.get(&target_itype.cname) {
                target_itype = singleton;
            }
        }

        if let Some(iconst) = target_itype.constants.iter().find(|c| c.name == target_cname) {
            return Link::Cref(format!(
                "{BINDINGS_NAMESPACE}.{}.{}",
                target_itype.proxy_name, iconst.proxy_name
            ));
        }

        let enum_constant = target_itype.enums.iter().find_map(|ienum| {
            ienum
                .constants
                .iter()
                .find(|c| c.name == target_cname)
                .map(|iconst| (ienum, iconst))
        });

        if let Some((ienum, iconst)) = enum_constant {
            return Link::Cref(format!(
                "{BINDINGS_NAMESPACE}.{}.{}.{}",
                target_itype.proxy_name, ienum.proxy_name, iconst.proxy_name
            ));
        }

        if parts.len() == 1 {
            return self.global_constant_link(target_cname, link_target);
        }

        if !target_itype.is_intentionally_ignored(target_cname) {
            error!("Cannot resolve constant reference in documentation: '{}'.", link_target);
        }
        Link::Undeclared(link_target.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::{builtin_types, enum_type, object_type};
    use crate::types::{
        ApiType, ArgumentInterface, ConstantInterface, EnumInterface, MethodInterface, PropertyInterface,
        SignalInterface, TypeReference,
    };

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry {
            builtin_types: builtin_types().unwrap(),
            ..Default::default()
        };

        let mut object = object_type("Object", "GodotObject", ApiType::Core, false).unwrap();
        object.properties.push(PropertyInterface {
            cname: "script".into(),
            proxy_name: "Script".into(),
            index: -1,
            ..Default::default()
        });

        let mut node = object_type("Node", "Node", ApiType::Core, false).unwrap();
        node.base_name = Some("Object".into());
        node.methods.push(MethodInterface {
            name: "add_child".into(),
            cname: "add_child".into(),
            proxy_name: "AddChild".into(),
            return_type: TypeReference::new("void"),
            arguments: vec![
                ArgumentInterface {
                    ty: TypeReference::new("Node"),
                    name: "node".into(),
                    ..Default::default()
                },
                ArgumentInterface {
                    ty: TypeReference::new("bool"),
                    name: "force".into(),
                    def_param_mode: DefaultParamMode::NullableVal,
                    ..Default::default()
                },
            ],
            ..Default::default()
        });
        node.properties.push(PropertyInterface {
            cname: "name".into(),
            proxy_name: "Name".into(),
            index: -1,
            ..Default::default()
        });
        node.signals.push(SignalInterface {
            name: "ready".into(),
            cname: "ready".into(),
            proxy_name: "Ready".into(),
            ..Default::default()
        });
        node.constants
            .push(ConstantInterface::new("NOTIFICATION_READY", "NotificationReady", 13));
        let mut process_mode = EnumInterface::new("Node.ProcessMode", "ProcessModeEnum", false);
        process_mode
            .constants
            .push(ConstantInterface::new("PROCESS_MODE_INHERIT", "Inherit", 0));
        node.enums.push(process_mode);
        node.ignored_members.push("_get_configuration_warnings".into());

        let plugin = object_type("EditorPlugin", "EditorPlugin", ApiType::Editor, false).unwrap();

        for itype in [object, node, plugin] {
            registry.documented_classes.insert(itype.name.clone());
            registry.obj_types.insert(itype.name.clone(), itype);
        }

        let process_mode = enum_type("Node.ProcessMode", "Node.ProcessModeEnum", ApiType::Core).unwrap();
        registry.enum_types.insert(process_mode.name.clone(), process_mode);

        registry
            .global_constants
            .push(ConstantInterface::new("INF", "Inf", 0));
        let mut error = EnumInterface::new("Error", "Error", false);
        error.constants.push(ConstantInterface::new("OK", "Ok", 0));
        registry.global_enums.push(error);

        for name in ["int", "PackedVector2Array", "Nil", "@GlobalScope"] {
            registry.documented_classes.insert(name.into());
        }

        registry
    }

    fn xml(bbcode: &str) -> String {
        let registry = registry();
        let node = &registry.obj_types["Node"];
        bbcode_to_xml(bbcode, Some(node), &registry, false)
    }

    fn text(bbcode: &str) -> String {
        let registry = registry();
        let node = &registry.obj_types["Node"];
        bbcode_to_text(bbcode, Some(node), &registry)
    }

    #[test]
    fn test_plain_text_is_unchanged() {
        let registry = registry();
        for s in ["", "hello", "a < b && c > d", "it's \"quoted\""] {
            assert_eq!(bbcode_to_text(s, None, &registry), s);
            if !s.is_empty() {
                assert_eq!(
                    bbcode_to_xml(s, None, &registry, false),
                    format!("<para>{}</para>", xml_escape(s))
                );
            }
        }
    }

    #[test]
    fn test_xml_lines_become_paragraphs() {
        assert_eq!(xml("first\nsecond"), "<para>first</para>\n<para>second</para>");
    }

    #[test]
    fn test_tag_matching_is_structural() {
        assert_eq!(xml("[b]X[i]Y[/b]Z[/i]"), "<para><b>X<i>Y[/b]Z</i></para>");
        assert!(text("[b]X[i]Y[/b]Z[/i]").contains("/b]Z"));
    }

    #[test]
    fn test_code_span_is_raw() {
        assert_eq!(xml("[code]a[b]c[/code]"), "<para><c>a[b]c</c></para>");
        assert_eq!(text("use [code]x[/code] here"), "use 'x' here");
    }

    #[test]
    fn test_langword_code() {
        assert_eq!(xml("returns [code]null[/code]."), "<para>returns <see langword=\"null\"/>.</para>");
        assert_eq!(xml("[code]nullable[/code]"), "<para><c>nullable</c></para>");
    }

    #[test]
    fn test_codeblocks_keep_only_csharp() {
        let bbcode = "[codeblocks][gdscript]print(1)[/gdscript][csharp]GD.Print(1);[/csharp][/codeblocks]after";
        assert_eq!(xml(bbcode), "<para><code>GD.Print(1);</code>after</para>");
        assert_eq!(text(bbcode), "after");
    }

    #[test]
    fn test_codeblocks_hide_brackets_in_plain_text() {
        let bbcode = "see[codeblocks][csharp]var a = b[0];[/csharp][/codeblocks] below";
        assert_eq!(text(bbcode), "see below");
        assert_eq!(xml(bbcode), "<para>see<code>var a = b[0];</code> below</para>");
    }

    #[test]
    fn test_unknown_tag_keeps_bracket() {
        assert_eq!(xml("[unknown]x"), "<para>[unknown]x</para>");
    }

    #[test]
    fn test_urls() {
        assert_eq!(
            xml("[url=https://godotengine.org]site[/url]"),
            "<para><a href=\"https://godotengine.org\">site</a></para>"
        );
        assert_eq!(
            xml("[url]https://godotengine.org[/url]"),
            "<para><a href=\"https://godotengine.org\">https://godotengine.org</a></para>"
        );
    }

    #[test]
    fn test_method_references() {
        assert_eq!(
            xml("[method add_child]"),
            "<para><see cref=\"Godot.Node.AddChild(Node, Nullable{bool})\"/></para>"
        );
        assert_eq!(text("[method Node.add_child]"), "'Godot.Node.AddChild(Node, Nullable<bool>)'");
        assert_eq!(text("[method _init]"), "'new Godot.Node()'");
        assert_eq!(xml("[method _init]"), "<para><see cref=\"Godot.Node.Node()\"/></para>");
        assert_eq!(xml("[method to_string]"), "<para><see cref=\"object.ToString()\"/></para>");
        assert_eq!(xml("[method missing]"), "<para><c>missing</c></para>");
        assert_eq!(
            xml("[method _get_configuration_warnings]"),
            "<para><c>_get_configuration_warnings</c></para>"
        );
    }

    #[test]
    fn test_member_walks_base_chain() {
        assert_eq!(xml("[member name]"), "<para><see cref=\"Godot.Node.Name\"/></para>");
        assert_eq!(xml("[member script]"), "<para><see cref=\"Godot.GodotObject.Script\"/></para>");
        assert_eq!(xml("[member theme/font]"), "<para><c>theme/font</c></para>");
    }

    #[test]
    fn test_signal_enum_and_constant_references() {
        assert_eq!(xml("[signal ready]"), "<para><see cref=\"Godot.Node.Ready\"/></para>");
        assert_eq!(
            xml("[enum ProcessMode]"),
            "<para><see cref=\"Godot.Node.ProcessModeEnum\"/></para>"
        );
        assert_eq!(
            xml("[constant NOTIFICATION_READY]"),
            "<para><see cref=\"Godot.Node.NotificationReady\"/></para>"
        );
        assert_eq!(
            xml("[constant PROCESS_MODE_INHERIT]"),
            "<para><see cref=\"Godot.Node.ProcessModeEnum.Inherit\"/></para>"
        );
        assert_eq!(xml("[constant OK]"), "<para><see cref=\"Godot.Error.Ok\"/></para>");
        assert_eq!(xml("[constant @GlobalScope.INF]"), "<para><see cref=\"Godot.GD.Inf\"/></para>");
        assert_eq!(text("[constant OK]"), "'Godot.Error.Ok'");
    }

    #[test]
    fn test_param_references() {
        let registry = registry();
        let node = &registry.obj_types["Node"];
        assert_eq!(
            bbcode_to_xml("[param child_node]", Some(node), &registry, false),
            "<para><paramref name=\"childNode\"/></para>"
        );
        assert_eq!(
            bbcode_to_xml("[param child_node]", Some(node), &registry, true),
            "<para><c>childNode</c></para>"
        );
        assert_eq!(text("[param child_node]"), "'childNode'");
    }

    #[test]
    fn test_references_across_api_partitions_degrade() {
        assert_eq!(xml("[method EditorPlugin.add_dock]"), "<para><c>EditorPlugin.add_dock</c></para>");
        assert_eq!(xml("[EditorPlugin]"), "<para><c>EditorPlugin</c></para>");

        let registry = registry();
        let plugin = &registry.obj_types["EditorPlugin"];
        assert_eq!(
            bbcode_to_xml("[Node]", Some(plugin), &registry, false),
            "<para><see cref=\"Godot.Node\"/></para>"
        );
    }

    #[test]
    fn test_invalid_reference_format() {
        assert_eq!(xml("[method a.b.c]"), "<para><c>method a.b.c</c></para>");
    }

    #[test]
    fn test_builtin_type_spellings() {
        assert_eq!(xml("[int]"), "<para><see cref=\"int\"/></para>");
        assert_eq!(xml("[PackedVector2Array]"), "<para><see cref=\"Godot.Vector2\"/>[]</para>");
        assert_eq!(xml("[Nil]"), "<para><see langword=\"null\"/></para>");
        assert_eq!(xml("[@GlobalScope]"), "<para><c>@GlobalScope</c></para>");
        assert_eq!(text("[int]"), "int");
        assert_eq!(text("[PackedVector2Array]"), "'Godot.Vector2[]'");
        assert_eq!(text("[Node]"), "'Node'");
    }
}
