//! The internal type model the emitters work from.

use crate::reflection::{ClassDoc, MemberDoc, Variant};
use crate::template::{Template, Templates};

pub use crate::reflection::ApiType;

/// Name used for the synthetic generic array type.
pub const ARRAY_GENERIC: &str = "Array_@generic";
/// Name used for the synthetic generic dictionary type.
pub const DICTIONARY_GENERIC: &str = "Dictionary_@generic";
/// Fictitious type standing for "the remaining arguments".
pub const VARARG: &str = "VarArg";

/// A reference to a type by name.
#[derive(Debug, Clone, Default)]
pub struct TypeReference {
    pub cname: String,
    pub is_enum: bool,
    pub generic_type_parameters: Vec<TypeReference>,
}

impl TypeReference {
    pub fn new(cname: impl Into<String>) -> Self {
        Self {
            cname: cname.into(),
            is_enum: false,
            generic_type_parameters: Vec::new(),
        }
    }

    pub fn enum_of(cname: impl Into<String>) -> Self {
        Self {
            is_enum: true,
            ..Self::new(cname)
        }
    }
}

impl PartialEq for TypeReference {
    fn eq(&self, other: &Self) -> bool {
        self.cname == other.cname
    }
}

impl Eq for TypeReference {}

/// How a default argument value reaches the C# signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefaultParamMode {
    /// The literal is a compile-time constant
    #[default]
    Constant,
    /// `T?` parameter, the default is materialised in the method body
    NullableVal,
    /// Reference type parameter defaulting to `null`, materialised in the body
    NullableRef,
}

#[derive(Debug, Clone, Default)]
pub struct ArgumentInterface {
    pub ty: TypeReference,
    pub name: String,
    /// C# literal; `%s` stands for the parameter's managed type
    pub default_argument: Option<Template>,
    pub def_param_value: Option<Variant>,
    pub def_param_mode: DefaultParamMode,
}

#[derive(Debug, Clone, Default)]
pub struct PropertyInterface {
    pub cname: String,
    pub proxy_name: String,
    pub setter: String,
    pub getter: String,
    /// Negative for plain properties
    pub index: i64,
    pub is_hidden: bool,
    pub is_deprecated: bool,
    pub deprecation_message: String,
    pub doc: Option<MemberDoc>,
}

impl PropertyInterface {
    pub fn is_indexed(&self) -> bool {
        self.index >= 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct MethodInterface {
    pub name: String,
    pub cname: String,
    pub proxy_name: String,
    pub hash: u32,
    pub return_type: TypeReference,
    pub arguments: Vec<ArgumentInterface>,
    pub is_vararg: bool,
    pub is_static: bool,
    pub is_virtual: bool,
    /// Dispatched by name through `GodotObject.Call`
    pub requires_object_call: bool,
    /// Only accessible from the bindings themselves
    pub is_internal: bool,
    /// Hidden from IDE completion
    pub is_hidden: bool,
    pub is_compat: bool,
    pub is_deprecated: bool,
    pub deprecation_message: String,
    pub doc: Option<MemberDoc>,
}

#[derive(Debug, Clone, Default)]
pub struct SignalInterface {
    pub name: String,
    pub cname: String,
    pub proxy_name: String,
    pub arguments: Vec<ArgumentInterface>,
    pub is_deprecated: bool,
    pub deprecation_message: String,
    pub doc: Option<MemberDoc>,
}

#[derive(Debug, Clone, Default)]
pub struct ConstantInterface {
    pub name: String,
    pub proxy_name: String,
    pub value: i64,
    pub is_deprecated: bool,
    pub deprecation_message: String,
    pub doc: Option<MemberDoc>,
}

impl ConstantInterface {
    pub fn new(name: impl Into<String>, proxy_name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            proxy_name: proxy_name.into(),
            value,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EnumInterface {
    pub cname: String,
    pub proxy_name: String,
    pub is_flags: bool,
    pub constants: Vec<ConstantInterface>,
}

impl EnumInterface {
    pub fn new(cname: impl Into<String>, proxy_name: impl Into<String>, is_flags: bool) -> Self {
        Self {
            cname: cname.into(),
            proxy_name: proxy_name.into(),
            is_flags,
            constants: Vec::new(),
        }
    }
}

/// Everything the generator knows about one type.
#[derive(Debug, Clone, Default)]
pub struct TypeInterface {
    pub name: String,
    pub cname: String,
    pub proxy_name: String,
    pub base_name: Option<String>,
    pub api_type: ApiType,

    pub is_object_type: bool,
    pub is_enum: bool,
    pub is_singleton: bool,
    pub is_singleton_instance: bool,
    pub is_compat_singleton: bool,
    pub is_ref_counted: bool,
    pub is_instantiable: bool,
    /// The managed wrapper owns a reference to the native instance
    pub memory_own: bool,
    pub is_span_compatible: bool,
    pub has_virtual_methods: bool,
    pub is_deprecated: bool,
    pub deprecation_message: String,

    /// Number of generic parameters, zero if not generic
    pub type_parameter_count: usize,

    /// Managed type used in C# signatures
    pub cs_type: String,
    /// Parameter type of the native-call shim
    pub c_type_in: String,
    /// Return type of the native-call shim
    pub c_type_out: String,
    /// Type passed to ptrcall
    pub c_type: String,
    pub cs_in_expr_is_unsafe: bool,
    /// Locals of `c_type` must be disposed
    pub c_type_is_disposable_struct: bool,
    /// The ptrcall return local needs `default` initialisation
    pub c_ret_needs_default_initialization: bool,
    pub templates: Templates,

    pub class_doc: Option<ClassDoc>,

    pub properties: Vec<PropertyInterface>,
    pub methods: Vec<MethodInterface>,
    pub signals: Vec<SignalInterface>,
    pub constants: Vec<ConstantInterface>,
    pub enums: Vec<EnumInterface>,
    /// Members skipped on purpose; documentation may still mention them
    pub ignored_members: Vec<String>,
}

impl TypeInterface {
    pub fn find_method_by_name(&self, cname: &str) -> Option<&MethodInterface> {
        self.methods.iter().find(|m| m.cname == cname)
    }

    pub fn find_method_by_proxy_name(&self, proxy_name: &str) -> Option<&MethodInterface> {
        self.methods.iter().find(|m| m.proxy_name == proxy_name)
    }

    pub fn find_property_by_name(&self, cname: &str) -> Option<&PropertyInterface> {
        self.properties.iter().find(|p| p.cname == cname)
    }

    pub fn find_property_by_proxy_name(&self, proxy_name: &str) -> Option<&PropertyInterface> {
        self.properties.iter().find(|p| p.proxy_name == proxy_name)
    }

    pub fn find_signal_by_name(&self, cname: &str) -> Option<&SignalInterface> {
        self.signals.iter().find(|s| s.cname == cname)
    }

    pub fn find_signal_by_proxy_name(&self, proxy_name: &str) -> Option<&SignalInterface> {
        self.signals.iter().find(|s| s.proxy_name == proxy_name)
    }

    /// Whether a member proxy name is already taken by a property, method or signal.
    pub fn has_member_proxy_name(&self, proxy_name: &str) -> bool {
        self.find_property_by_proxy_name(proxy_name).is_some()
            || self.find_method_by_proxy_name(proxy_name).is_some()
            || self.find_signal_by_proxy_name(proxy_name).is_some()
    }

    pub fn is_intentionally_ignored(&self, member: &str) -> bool {
        self.ignored_members.iter().any(|m| m == member)
    }
}

/// One deduplicated native entry point.
#[derive(Debug, Clone)]
pub struct InternalCall {
    pub name: String,
    pub unique_sig: String,
    pub api_type: ApiType,
    pub editor_only: bool,
    pub is_static: bool,
    pub is_vararg: bool,
    pub return_type: TypeReference,
    pub argument_types: Vec<TypeReference>,
}

impl InternalCall {
    pub fn argument_count(&self) -> usize {
        self.argument_types.len()
    }
}
