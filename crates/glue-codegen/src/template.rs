//! Marshalling templates.
//!
//! Every type carries a set of small text templates that describe how its values
//! cross the native/managed boundary. A template is parsed once, when its type is
//! registered, into literal segments and numbered slots. Each [`SlotKind`] declares
//! which slots its call sites fill, so a template that reads a slot nobody
//! provides is rejected up front instead of producing broken C#.
//!
//! Placeholders:
//! - `%0` .. `%5`: positional arguments, see [`TemplateArgs`]
//! - `%s`: the single sequential argument used by argument-passing expressions
//!   and default value literals

use crate::error::{GlueError, Result};

/// The role a template plays. Determines which placeholders it may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// Managed-side statement preparing an argument (`%0` c_type, `%1` name, `%5` indent)
    CsIn,
    /// Managed-side expression passed to the native call (`%0` name, `%1` c_type)
    CsInExpr,
    /// Managed-side return statement (`%0` call, `%1` params, `%2` cs_type, `%3` c_type_out, `%5` indent)
    CsOut,
    /// Variant to managed conversion (`%0` value, `%1` cs_type, `%2` type name)
    CsVariantToManaged,
    /// Managed to variant conversion (`%0` value, `%1` cs_type, `%2` type name)
    CsManagedToVariant,
    /// Native-call statement preparing an argument (`%0` c_type, `%1` name, `%5` indent)
    CIn,
    /// Like [`SlotKind::CIn`] but producing a `godot_variant` for vararg calls
    CInVararg,
    /// Native-call return statement (`%0` c_type_out, `%1` ret local, `%2` type name, `%5` indent)
    COut,
    /// Expression placed in the pointer-argument array (`%s` name)
    CArgIn,
    /// Default argument literal (`%s` managed type)
    DefaultValue,
}

impl SlotKind {
    pub fn name(self) -> &'static str {
        match self {
            SlotKind::CsIn => "cs_in",
            SlotKind::CsInExpr => "cs_in_expr",
            SlotKind::CsOut => "cs_out",
            SlotKind::CsVariantToManaged => "cs_variant_to_managed",
            SlotKind::CsManagedToVariant => "cs_managed_to_variant",
            SlotKind::CIn => "c_in",
            SlotKind::CInVararg => "c_in_vararg",
            SlotKind::COut => "c_out",
            SlotKind::CArgIn => "c_arg_in",
            SlotKind::DefaultValue => "default_value",
        }
    }

    fn allows_positional(self, slot: u8) -> bool {
        match self {
            SlotKind::CsIn | SlotKind::CIn | SlotKind::CInVararg => matches!(slot, 0 | 1 | 5),
            SlotKind::CsInExpr => matches!(slot, 0 | 1),
            SlotKind::CsOut => matches!(slot, 0 | 1 | 2 | 3 | 5),
            SlotKind::CsVariantToManaged | SlotKind::CsManagedToVariant => matches!(slot, 0..=2),
            SlotKind::COut => matches!(slot, 0 | 1 | 2 | 5),
            SlotKind::CArgIn | SlotKind::DefaultValue => false,
        }
    }

    fn allows_sequential(self) -> bool {
        matches!(self, SlotKind::CArgIn | SlotKind::DefaultValue)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Positional(u8),
    Sequential,
}

/// A parsed template. Empty templates are valid and mean "not applicable".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    kind: SlotKind,
    source: String,
    segments: Vec<Segment>,
}

/// Positional arguments for a template. Unused slots render as empty text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateArgs<'a> {
    slots: [&'a str; 6],
}

impl<'a> TemplateArgs<'a> {
    /// Arguments for `cs_in`, `c_in` and `c_in_vararg`.
    pub fn marshal_in(c_type: &'a str, name: &'a str, indent: &'a str) -> Self {
        Self {
            slots: [c_type, name, "", "", "", indent],
        }
    }

    /// Arguments for `cs_in_expr`.
    pub fn in_expr(name: &'a str, c_type: &'a str) -> Self {
        Self {
            slots: [name, c_type, "", "", "", ""],
        }
    }

    /// Arguments for `cs_out`.
    pub fn managed_out(
        call: &'a str,
        params: &'a str,
        cs_type: &'a str,
        c_type_out: &'a str,
        indent: &'a str,
    ) -> Self {
        Self {
            slots: [call, params, cs_type, c_type_out, "", indent],
        }
    }

    /// Arguments for `c_out`.
    pub fn native_out(c_type_out: &'a str, ret: &'a str, type_name: &'a str, indent: &'a str) -> Self {
        Self {
            slots: [c_type_out, ret, type_name, "", "", indent],
        }
    }

    /// Arguments for the variant conversion templates.
    pub fn variant(value: &'a str, cs_type: &'a str, type_name: &'a str) -> Self {
        Self {
            slots: [value, cs_type, type_name, "", "", ""],
        }
    }
}

impl Template {
    /// Parse and validate `source` for the given role.
    pub fn new(kind: SlotKind, source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                text.push(c);
                continue;
            }

            let fail = |reason: String| GlueError::Template {
                template: format!("{}: {:?}", kind.name(), source),
                reason,
            };

            let placeholder = match chars.next() {
                Some('s') if kind.allows_sequential() => Segment::Sequential,
                Some(d @ '0'..='5') => {
                    let slot = d as u8 - b'0';
                    if !kind.allows_positional(slot) {
                        return Err(fail(format!("slot %{slot} is never provided")));
                    }
                    Segment::Positional(slot)
                }
                Some(other) => return Err(fail(format!("unsupported placeholder %{other}"))),
                None => return Err(fail("dangling '%'".to_string())),
            };

            if !text.is_empty() {
                segments.push(Segment::Text(std::mem::take(&mut text)));
            }
            segments.push(placeholder);
        }

        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        Ok(Self {
            kind,
            source,
            segments,
        })
    }

    /// An empty template of the given kind.
    pub fn empty(kind: SlotKind) -> Self {
        Self {
            kind,
            source: String::new(),
            segments: Vec::new(),
        }
    }

    pub fn kind(&self) -> SlotKind {
        self.kind
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Substitute positional slots.
    pub fn render(&self, args: &TemplateArgs<'_>) -> String {
        let mut out = String::with_capacity(self.source.len() + 32);
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Positional(slot) => out.push_str(args.slots[*slot as usize]),
                Segment::Sequential => {}
            }
        }
        out
    }

    /// Substitute every `%s` with `value`.
    pub fn render_seq(&self, value: &str) -> String {
        let mut out = String::with_capacity(self.source.len() + value.len());
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Sequential => out.push_str(value),
                Segment::Positional(_) => {}
            }
        }
        out
    }

    /// Whether rendering reads the sequential slot.
    pub fn uses_sequential(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Sequential))
    }
}

/// The complete set of marshalling templates carried by a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Templates {
    pub cs_in: Template,
    pub cs_in_expr: Template,
    pub cs_out: Template,
    pub cs_variant_to_managed: Template,
    pub cs_managed_to_variant: Template,
    pub c_in: Template,
    pub c_in_vararg: Template,
    pub c_out: Template,
    pub c_arg_in: Template,
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            cs_in: Template::empty(SlotKind::CsIn),
            cs_in_expr: Template::empty(SlotKind::CsInExpr),
            cs_out: Template::empty(SlotKind::CsOut),
            cs_variant_to_managed: Template::empty(SlotKind::CsVariantToManaged),
            cs_managed_to_variant: Template::empty(SlotKind::CsManagedToVariant),
            c_in: Template::empty(SlotKind::CIn),
            c_in_vararg: Template::empty(SlotKind::CInVararg),
            c_out: Template::empty(SlotKind::COut),
            c_arg_in: Template::empty(SlotKind::CArgIn),
        }
    }
}

impl Templates {
    /// The set every type starts from before it is specialised.
    pub fn standard() -> Result<Self> {
        Ok(TemplatesBuilder::default()
            .cs_variant_to_managed("VariantUtils.ConvertTo<%1>(%0)")?
            .cs_managed_to_variant("VariantUtils.CreateFrom<%1>(%0)")?
            .c_arg_in("%s")?
            .build())
    }
}

/// Builder used by type construction so every template is validated on entry.
#[derive(Debug, Default, Clone)]
pub struct TemplatesBuilder {
    templates: Templates,
}

macro_rules! template_setter {
    ($($fn_name:ident => $field:ident: $kind:expr),* $(,)?) => {
        $(
            pub fn $fn_name(mut self, source: &str) -> Result<Self> {
                self.templates.$field = Template::new($kind, source)?;
                Ok(self)
            }
        )*
    };
}

impl TemplatesBuilder {
    pub fn extend(templates: Templates) -> Self {
        Self { templates }
    }

    template_setter! {
        cs_in => cs_in: SlotKind::CsIn,
        cs_in_expr => cs_in_expr: SlotKind::CsInExpr,
        cs_out => cs_out: SlotKind::CsOut,
        cs_variant_to_managed => cs_variant_to_managed: SlotKind::CsVariantToManaged,
        cs_managed_to_variant => cs_managed_to_variant: SlotKind::CsManagedToVariant,
        c_in => c_in: SlotKind::CIn,
        c_in_vararg => c_in_vararg: SlotKind::CInVararg,
        c_out => c_out: SlotKind::COut,
        c_arg_in => c_arg_in: SlotKind::CArgIn,
    }

    pub fn build(self) -> Templates {
        self.templates
    }
}
