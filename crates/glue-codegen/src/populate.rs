//! Turns reflection records into the internal type model.
//!
//! Object types are populated first, then the builtin and global enums. Every
//! class enum is registered as an enum type while its class is populated, so
//! the registry is complete before anything is resolved.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{error, info, warn};

use crate::builtins::{enum_type, object_type};
use crate::defaults;
use crate::defs::{CS_SINGLETON_INSTANCE_SUFFIX, GLOBAL_SCOPE_DOC};
use crate::error::{GlueError, Result};
use crate::naming::{
    escape_csharp_keyword, object_proxy_name, pascal_to_pascal_case, snake_to_camel_case,
    snake_to_pascal_case,
};
use crate::reflection::{
    ArgumentInfo, ClassDb, ClassInfo, MemberDoc, MethodInfo, PropertyHint, PropertyInfo, PropertyUsage,
    TypeMeta, VariantType,
};
use crate::registry::TypeRegistry;
use crate::types::{
    ApiType, ArgumentInterface, ConstantInterface, DefaultParamMode, EnumInterface, MethodInterface,
    PropertyInterface, SignalInterface, TypeInterface, TypeReference, ARRAY_GENERIC, DICTIONARY_GENERIC,
    VARARG,
};

/// Classes, methods and singletons that get special treatment.
#[derive(Debug, Clone)]
pub struct PopulateConfig {
    /// Class name to method names that are never bound
    pub blacklisted_methods: FxHashMap<String, FxHashSet<String>>,
    /// Singletons that stay instance classes for compatibility
    pub compat_singletons: FxHashSet<String>,
    pub ignored_types: FxHashSet<String>,
}

impl Default for PopulateConfig {
    fn default() -> Self {
        let mut config = Self {
            blacklisted_methods: FxHashMap::default(),
            compat_singletons: FxHashSet::default(),
            ignored_types: FxHashSet::default(),
        };
        for method in ["to_string", "_to_string", "_init"] {
            config.blacklist_method("Object", method);
        }
        config.compat_singletons.insert("EditorInterface".to_string());
        config
    }
}

impl PopulateConfig {
    pub fn blacklist_method(&mut self, class: &str, method: &str) {
        self.blacklisted_methods
            .entry(class.to_string())
            .or_default()
            .insert(method.to_string());
    }

    fn is_blacklisted(&self, class: &str, method: &str) -> bool {
        self.blacklisted_methods
            .get(class)
            .is_some_and(|methods| methods.contains(method))
    }
}

/// `int`/`float` narrowed by metadata; other types keep their engine name.
pub fn type_name_from_meta(ty: VariantType, meta: TypeMeta) -> String {
    let name = match ty {
        VariantType::Int => match meta {
            TypeMeta::Int8 => "sbyte",
            TypeMeta::Int16 => "short",
            TypeMeta::Int32 => "int",
            TypeMeta::Uint8 => "byte",
            TypeMeta::Uint16 => "ushort",
            TypeMeta::Uint32 => "uint",
            TypeMeta::Uint64 => "ulong",
            TypeMeta::Char16 => "char",
            // char32 stays long for compatibility
            _ => "long",
        },
        VariantType::Float => match meta {
            TypeMeta::Float => "float",
            _ => "double",
        },
        other => other.type_name(),
    };
    name.to_string()
}

fn generic_parameters(hint_string: &str, count: usize) -> Vec<TypeReference> {
    let mut parts = hint_string.split(';');
    (0..count)
        .map(|_| TypeReference::new(parts.next().unwrap_or_default()))
        .collect()
}

/// Type of an argument or return value. `nil` is what an untyped `Nil` means.
fn type_reference(info: &ArgumentInfo, meta: TypeMeta, nil: &str) -> TypeReference {
    if info.ty == VariantType::Int
        && (info.has_usage(PropertyUsage::ClassIsEnum) || info.has_usage(PropertyUsage::ClassIsBitfield))
    {
        return TypeReference::enum_of(info.class_name.as_str());
    }

    if !info.class_name.is_empty() {
        return TypeReference::new(info.class_name.as_str());
    }

    if info.ty == VariantType::Array && info.hint == PropertyHint::ArrayType {
        return TypeReference {
            generic_type_parameters: generic_parameters(&info.hint_string, 1),
            ..TypeReference::new(ARRAY_GENERIC)
        };
    }

    if info.ty == VariantType::Dictionary && info.hint == PropertyHint::DictionaryType {
        return TypeReference {
            generic_type_parameters: generic_parameters(&info.hint_string, 2),
            ..TypeReference::new(DICTIONARY_GENERIC)
        };
    }

    if info.hint == PropertyHint::ResourceType {
        return TypeReference::new(info.hint_string.as_str());
    }

    if info.ty == VariantType::Nil {
        return TypeReference::new(nil);
    }

    TypeReference::new(type_name_from_meta(info.ty, meta))
}

fn return_type_reference(info: &ArgumentInfo, meta: TypeMeta) -> TypeReference {
    let nil = if info.has_usage(PropertyUsage::NilIsVariant) { "Variant" } else { "void" };
    type_reference(info, meta, nil)
}

fn method_has_ptr_parameter(method: &MethodInfo) -> bool {
    std::iter::once(&method.return_value)
        .chain(&method.arguments)
        .any(|info| info.ty == VariantType::Int && info.hint == PropertyHint::IntIsPointer)
}

/// Copy deprecation state from a member doc, defaulting an empty message.
fn deprecation(doc: Option<&MemberDoc>, what: &str, qualified: &str, default_message: &str) -> (bool, String) {
    let Some(doc) = doc.filter(|d| d.is_deprecated) else {
        return (false, String::new());
    };
    if doc.deprecated_message.is_empty() {
        warn!("An empty deprecation message is discouraged. {what}: '{qualified}'.");
        return (true, default_message.to_string());
    }
    (true, doc.deprecated_message.clone())
}

/// Number of leading `_`-separated words shared by every constant name.
pub fn determine_enum_prefix(ienum: &EnumInterface) -> usize {
    let Some(front) = ienum.constants.first() else {
        return 0;
    };

    let front_parts: Vec<&str> = front.name.split('_').collect();
    let mut candidate_len = front_parts.len() - 1;
    if candidate_len == 0 {
        return 0;
    }

    for iconstant in &ienum.constants {
        let parts: Vec<&str> = iconstant.name.split('_').collect();

        let mut i = 0;
        while i < candidate_len && i < parts.len() {
            if front_parts[i] != parts[i] {
                // FLAG_ and FLAGS_DEFAULT share a prefix
                let flag_exception = i == candidate_len - 1
                    && matches!((front_parts[i], parts[i]), ("FLAGS", "FLAG") | ("FLAG", "FLAGS"));
                if !flag_exception {
                    break;
                }
            }
            i += 1;
        }
        candidate_len = i;

        if candidate_len == 0 {
            return 0;
        }
    }

    candidate_len
}

/// Strip `prefix_length` words from every constant and PascalCase the rest.
/// A remainder starting with a digit keeps words until it is a valid identifier.
pub fn apply_prefix_to_enum_constants(ienum: &mut EnumInterface, prefix_length: usize) {
    if prefix_length == 0 {
        return;
    }

    for iconstant in &mut ienum.constants {
        let parts: Vec<&str> = iconstant.name.split('_').collect();
        if parts.len() <= prefix_length {
            continue;
        }

        let mut curr_prefix_length = prefix_length;
        if parts[curr_prefix_length].starts_with(|c: char| c.is_ascii_digit()) {
            while curr_prefix_length > 0 && parts[curr_prefix_length].starts_with(|c: char| c.is_ascii_digit()) {
                curr_prefix_length -= 1;
            }
        }

        let constant_name = parts[curr_prefix_length..].join("_");
        iconstant.proxy_name = snake_to_pascal_case(&constant_name, true);
    }
}

/// Whether adding `left` next to `right` would produce two indistinguishable
/// C# overloads. Return types do not count.
pub fn method_has_conflicting_signature(left: &MethodInterface, right: &MethodInterface) -> bool {
    if left.arguments.len() != right.arguments.len() {
        return false;
    }

    for (l, r) in left.arguments.iter().zip(&right.arguments) {
        if l.ty.cname != r.ty.cname {
            return false;
        }

        if l.def_param_mode != r.def_param_mode
            && (l.def_param_mode == DefaultParamMode::NullableVal || r.def_param_mode == DefaultParamMode::NullableVal)
        {
            // Nullable<T> differs from T
            return false;
        }
    }

    true
}

fn conflicts_with_existing(imethod: &MethodInterface, itype: &TypeInterface) -> bool {
    itype
        .methods
        .iter()
        .filter(|m| m.proxy_name == imethod.proxy_name)
        .any(|m| method_has_conflicting_signature(imethod, m))
}

/// Populates object types from a snapshot.
pub struct ObjectPopulator<'a> {
    db: &'a ClassDb,
    config: &'a PopulateConfig,
}

impl<'a> ObjectPopulator<'a> {
    pub fn new(db: &'a ClassDb, config: &'a PopulateConfig) -> Self {
        Self { db, config }
    }

    /// Populate every class in `class_list` into `registry`.
    pub fn populate(&self, class_list: &[String], registry: &mut TypeRegistry) -> Result<()> {
        for name in class_list {
            let class = self
                .db
                .class(name)
                .ok_or_else(|| GlueError::type_not_found(name, "class list"))?;

            if class.api == ApiType::None {
                continue;
            }

            if self.config.ignored_types.contains(name) {
                info!("Ignoring type '{}' because it's in the list of ignored types", name);
                continue;
            }

            if !class.exposed {
                info!("Ignoring type '{}' because it's not exposed", name);
                continue;
            }

            if !class.enabled {
                info!("Ignoring type '{}' because it's not enabled", name);
                continue;
            }

            let itype = self.populate_class(class, registry)?;

            if itype.is_singleton {
                let mut instance = itype.clone();
                instance.proxy_name.push_str(CS_SINGLETON_INSTANCE_SUFFIX);
                instance.cs_type = instance.proxy_name.clone();
                instance.is_singleton = false;
                instance.is_singleton_instance = true;
                // Constants and enums stay on the static class
                instance.constants.clear();
                instance.enums.clear();

                registry.obj_types.insert(itype.cname.clone(), itype);
                registry
                    .obj_types
                    .insert(format!("{}{CS_SINGLETON_INSTANCE_SUFFIX}", instance.name), instance);
            } else {
                registry.obj_types.insert(itype.cname.clone(), itype);
            }
        }

        Ok(())
    }

    fn populate_class(&self, class: &ClassInfo, registry: &mut TypeRegistry) -> Result<TypeInterface> {
        let is_ref_counted = self.db.inherits(&class.name, "RefCounted")?;
        let proxy_name = object_proxy_name(&class.name);
        let mut itype = object_type(&class.name, &proxy_name, class.api, is_ref_counted)?;

        itype.base_name = class.parent.clone();
        itype.is_singleton = class.is_singleton;
        itype.is_instantiable = class.instantiable && !class.is_singleton;
        itype.class_doc = self.db.doc(&proxy_name).cloned();

        if let Some(doc) = itype.class_doc.as_ref().filter(|d| d.is_deprecated) {
            itype.is_deprecated = true;
            itype.deprecation_message = if doc.deprecated_message.is_empty() {
                warn!("An empty deprecation message is discouraged. Type: '{}'.", itype.proxy_name);
                "This class is deprecated.".to_string()
            } else {
                doc.deprecated_message.clone()
            };
        }

        if itype.is_singleton && self.config.compat_singletons.contains(&itype.cname) {
            itype.is_singleton = false;
            itype.is_compat_singleton = true;
        }

        let mut accessor_methods = FxHashSet::default();
        for property in &class.properties {
            if property.has_usage(PropertyUsage::Group)
                || property.has_usage(PropertyUsage::Subgroup)
                || property.has_usage(PropertyUsage::Category)
                || (property.ty == VariantType::Nil && property.has_usage(PropertyUsage::Array))
            {
                continue;
            }

            // Inspector-only
            if property.name.contains('/') {
                continue;
            }

            let iprop = self.populate_property(property, &itype, &mut accessor_methods)?;
            itype.properties.push(iprop);
        }

        self.populate_methods(class, &mut itype, &accessor_methods)?;
        self.populate_signals(class, &mut itype);
        self.populate_enums_and_constants(class, &mut itype, registry)?;

        Ok(itype)
    }

    fn populate_property(
        &self,
        property: &PropertyInfo,
        itype: &TypeInterface,
        accessor_methods: &mut FxHashSet<String>,
    ) -> Result<PropertyInterface> {
        let accessors = property
            .accessors
            .as_ref()
            .ok_or_else(|| GlueError::invalid(format!("Invalid property: '{}.{}'.", itype.name, property.name)))?;

        let mut iprop = PropertyInterface {
            cname: property.name.clone(),
            setter: accessors.setter.clone(),
            getter: accessors.getter.clone(),
            index: accessors.index,
            ..Default::default()
        };

        if property.has_usage(PropertyUsage::Internal) {
            iprop.is_hidden = true;
        } else {
            for accessor in [&iprop.setter, &iprop.getter] {
                if !accessor.is_empty() {
                    accessor_methods.insert(accessor.clone());
                }
            }
        }

        iprop.proxy_name = escape_csharp_keyword(&snake_to_pascal_case(&iprop.cname, false));
        if iprop.proxy_name == itype.proxy_name {
            info!(
                "Name of property '{}' is ambiguous with the name of its enclosing class '{}'. Renaming property to '{}_'",
                iprop.proxy_name, itype.proxy_name, iprop.proxy_name
            );
            iprop.proxy_name.push('_');
        }

        iprop.doc = itype
            .class_doc
            .as_ref()
            .and_then(|d| d.property(&iprop.cname))
            .cloned();
        let qualified = format!("{}.{}", itype.proxy_name, iprop.proxy_name);
        (iprop.is_deprecated, iprop.deprecation_message) =
            deprecation(iprop.doc.as_ref(), "Property", &qualified, "This property is deprecated.");

        Ok(iprop)
    }

    fn populate_methods(
        &self,
        class: &ClassInfo,
        itype: &mut TypeInterface,
        accessor_methods: &FxHashSet<String>,
    ) -> Result<()> {
        let mut method_list: Vec<&MethodInfo> = class.methods.iter().collect();
        method_list.sort_by(|a, b| (a.id, &a.name).cmp(&(b.id, &b.name)));

        let mut compat_methods: Vec<MethodInterface> = Vec::new();

        for method in method_list {
            if method.name.is_empty() || self.config.is_blacklisted(&itype.cname, &method.name) {
                continue;
            }

            if method_has_ptr_parameter(method) {
                itype.ignored_members.push(method.name.clone());
                continue;
            }

            let imethod = self.populate_method(class, method, itype, accessor_methods)?;

            if imethod.is_compat {
                compat_methods.insert(0, imethod);
                continue;
            }

            // Underscore methods are only kept as property accessors
            if !imethod.is_virtual && imethod.name.starts_with('_') {
                let is_accessor = itype
                    .properties
                    .iter()
                    .any(|p| p.setter == imethod.name || p.getter == imethod.name);
                if is_accessor {
                    itype.methods.push(MethodInterface {
                        is_internal: true,
                        ..imethod
                    });
                }
            } else {
                itype.methods.push(imethod);
            }
        }

        for imethod in compat_methods {
            if conflicts_with_existing(&imethod, itype) {
                warn!(
                    "Method '{}' conflicts with an already existing method in type '{}' and has been ignored.",
                    imethod.name, itype.name
                );
                continue;
            }
            itype.methods.push(imethod);
        }

        Ok(())
    }

    fn populate_method(
        &self,
        class: &ClassInfo,
        method: &MethodInfo,
        itype: &mut TypeInterface,
        accessor_methods: &FxHashSet<String>,
    ) -> Result<MethodInterface> {
        let qualified = format!("{}.{}", itype.name, method.name);

        let mut imethod = MethodInterface {
            name: method.name.clone(),
            cname: method.name.clone(),
            hash: method.hash,
            is_static: method.is_static,
            is_virtual: method.is_virtual,
            ..Default::default()
        };

        if imethod.is_virtual {
            itype.has_virtual_methods = true;
        }

        let bind = if imethod.is_virtual { None } else { method.bind.as_ref() };
        if let Some(bind) = bind {
            imethod.is_compat = bind.is_compat;
            imethod.is_vararg = bind.is_vararg;
        }

        let return_info = &method.return_value;
        if bind.is_none() && !imethod.is_virtual {
            if !class.is_virtual_listed(&method.name) {
                return Err(GlueError::invalid(format!(
                    "Missing MethodBind for non-virtual method: '{qualified}'."
                )));
            }

            // No bind to ptrcall; dispatch by name instead
            imethod.requires_object_call = true;
            imethod.return_type = TypeReference::new("void");

            if itype.cname != "Object" || imethod.name != "free" {
                warn!(
                    "Notification: New unexpected virtual non-overridable method found. We only expected Object.free, but found '{}'.",
                    qualified
                );
            }
        } else {
            let meta = bind.map_or(return_info.meta, |b| b.return_meta);
            imethod.return_type = return_type_reference(return_info, meta);

            let bad_reference_hint = !imethod.is_virtual
                && !return_info.class_name.is_empty()
                && !(return_info.ty == VariantType::Int
                    && (return_info.has_usage(PropertyUsage::ClassIsEnum)
                        || return_info.has_usage(PropertyUsage::ClassIsBitfield)))
                && return_info.hint != PropertyHint::ResourceType
                && self.db.inherits(&return_info.class_name, "RefCounted")?;
            if bad_reference_hint {
                return Err(GlueError::invalid(format!(
                    "Return type is reference but hint is not 'PROPERTY_HINT_RESOURCE_TYPE'. Are you returning a reference type by pointer? Method: '{qualified}'."
                )));
            }
        }

        for (idx, arginfo) in method.arguments.iter().enumerate() {
            let meta = bind.map_or(arginfo.meta, |b| b.argument_meta(idx));
            let mut iarg = ArgumentInterface {
                ty: type_reference(arginfo, meta, "Variant"),
                name: escape_csharp_keyword(&snake_to_camel_case(&arginfo.name, false)),
                ..Default::default()
            };

            if let Some(value) = bind.and_then(|b| b.default_arguments.get(&idx)) {
                defaults::encode(value, &mut iarg, &qualified).map_err(|err| match err {
                    GlueError::DefaultValue { method, reason, .. } => GlueError::DefaultValue {
                        method,
                        arg: arginfo.name.clone(),
                        reason,
                    },
                    other => other,
                })?;
            }

            imethod.arguments.push(iarg);
        }

        if imethod.is_vararg {
            imethod.arguments.push(ArgumentInterface {
                ty: TypeReference::new(VARARG),
                name: "@args".to_string(),
                ..Default::default()
            });
        }

        imethod.proxy_name = escape_csharp_keyword(&snake_to_pascal_case(&imethod.name, false));
        if imethod.proxy_name == itype.proxy_name {
            info!(
                "Name of method '{}' is ambiguous with the name of its enclosing class '{}'. Renaming method to '{}_'",
                imethod.proxy_name, itype.proxy_name, imethod.proxy_name
            );
            imethod.proxy_name.push('_');
        }

        // Accessors are only hidden in the class declaring the property
        if accessor_methods.contains(&imethod.cname) {
            imethod.is_hidden = true;
        }

        imethod.doc = itype
            .class_doc
            .as_ref()
            .and_then(|d| d.method(&imethod.name))
            .cloned();
        let doc_qualified = format!("{}.{}", itype.proxy_name, imethod.proxy_name);
        (imethod.is_deprecated, imethod.deprecation_message) =
            deprecation(imethod.doc.as_ref(), "Method", &doc_qualified, "This method is deprecated.");

        if itype.find_property_by_name(&imethod.cname).is_some() {
            return Err(GlueError::invalid(format!(
                "Method name conflicts with property: '{qualified}'."
            )));
        }

        if imethod.is_compat {
            let uses_deprecated_type = imethod.arguments.iter().any(|arg| {
                let doc_name = arg.ty.cname.strip_prefix('_').unwrap_or(&arg.ty.cname);
                self.db.doc(doc_name).is_some_and(|d| d.is_deprecated)
            });
            if uses_deprecated_type {
                imethod.is_deprecated = true;
                imethod.deprecation_message = "This method overload is deprecated.".to_string();
            }
            imethod.is_hidden = true;
        }

        Ok(imethod)
    }

    fn populate_signals(&self, class: &ClassInfo, itype: &mut TypeInterface) {
        for signal in &class.signals {
            let mut isignal = SignalInterface {
                name: signal.name.clone(),
                cname: signal.name.clone(),
                ..Default::default()
            };

            for arginfo in &signal.arguments {
                isignal.arguments.push(ArgumentInterface {
                    ty: type_reference(arginfo, arginfo.meta, "Variant"),
                    name: escape_csharp_keyword(&snake_to_camel_case(&arginfo.name, false)),
                    ..Default::default()
                });
            }

            isignal.proxy_name = escape_csharp_keyword(&snake_to_pascal_case(&isignal.name, false));
            if isignal.proxy_name == itype.proxy_name {
                info!(
                    "Name of signal '{}' is ambiguous with the name of its enclosing class '{}'. Renaming signal to '{}_'",
                    isignal.proxy_name, itype.proxy_name, isignal.proxy_name
                );
                isignal.proxy_name.push('_');
            }

            // The host tolerates signals named like a method or property
            if itype.find_property_by_proxy_name(&isignal.proxy_name).is_some()
                || itype.find_method_by_proxy_name(&isignal.proxy_name).is_some()
            {
                isignal.proxy_name.push_str("Signal");
            }

            isignal.doc = itype
                .class_doc
                .as_ref()
                .and_then(|d| d.signal(&isignal.name))
                .cloned();
            let qualified = format!("{}.{}", itype.proxy_name, isignal.proxy_name);
            (isignal.is_deprecated, isignal.deprecation_message) =
                deprecation(isignal.doc.as_ref(), "Signal", &qualified, "This signal is deprecated.");

            itype.signals.push(isignal);
        }
    }

    fn constant_doc(itype: &TypeInterface, name: &str) -> Option<MemberDoc> {
        itype.class_doc.as_ref().and_then(|d| d.constant(name)).cloned()
    }

    fn populate_enums_and_constants(
        &self,
        class: &ClassInfo,
        itype: &mut TypeInterface,
        registry: &mut TypeRegistry,
    ) -> Result<()> {
        let mut flat_constants: Vec<&String> = class.constants.keys().collect();

        for (enum_name, enum_info) in &class.enums {
            // An enum with no bound constants is treated as a plain int
            if enum_info.constants.is_empty() {
                continue;
            }

            let mut enum_proxy_name = pascal_to_pascal_case(enum_name);
            let mut enum_cname = enum_name.clone();
            if itype.has_member_proxy_name(&enum_proxy_name) {
                enum_proxy_name.push_str("Enum");
                enum_cname = enum_proxy_name.clone();
            }

            let mut ienum = EnumInterface::new(enum_cname, enum_proxy_name.clone(), enum_info.is_bitfield);
            for constant_name in &enum_info.constants {
                let value = *class.constants.get(constant_name).ok_or_else(|| {
                    GlueError::invalid(format!(
                        "Enum constant '{}.{}' has no value.",
                        itype.name, constant_name
                    ))
                })?;
                flat_constants.retain(|c| *c != constant_name);

                let mut iconstant =
                    ConstantInterface::new(constant_name.as_str(), snake_to_pascal_case(constant_name, true), value);
                iconstant.doc = Self::constant_doc(itype, constant_name);
                let qualified = format!("{}.{}.{}", itype.proxy_name, ienum.proxy_name, iconstant.proxy_name);
                (iconstant.is_deprecated, iconstant.deprecation_message) = deprecation(
                    iconstant.doc.as_ref(),
                    "Enum member",
                    &qualified,
                    "This enum member is deprecated.",
                );

                ienum.constants.push(iconstant);
            }

            let prefix_length = determine_enum_prefix(&ienum);
            apply_prefix_to_enum_constants(&mut ienum, prefix_length);
            itype.enums.push(ienum);

            let enum_itype = enum_type(
                &format!("{}.{}", itype.name, enum_name),
                &format!("{}.{}", itype.proxy_name, enum_proxy_name),
                itype.api_type,
            )?;
            registry.enum_types.insert(enum_itype.cname.clone(), enum_itype);
        }

        for constant_name in flat_constants {
            let value = class.constants[constant_name];

            let mut proxy_name = snake_to_pascal_case(constant_name, true);
            if itype.has_member_proxy_name(&proxy_name) {
                proxy_name.push_str("Constant");
            }

            let mut iconstant = ConstantInterface::new(constant_name.as_str(), proxy_name, value);
            iconstant.doc = Self::constant_doc(itype, constant_name);
            let qualified = format!("{}.{}", itype.proxy_name, iconstant.proxy_name);
            (iconstant.is_deprecated, iconstant.deprecation_message) = deprecation(
                iconstant.doc.as_ref(),
                "Constant",
                &qualified,
                "This constant is deprecated.",
            );

            itype.constants.push(iconstant);
        }

        Ok(())
    }
}

/// Populate global constants and enums, and the enums declared on builtin types.
pub fn populate_global_constants(db: &ClassDb, registry: &mut TypeRegistry) -> Result<()> {
    let global_scope_doc = db.doc(GLOBAL_SCOPE_DOC);
    if !db.global_constants.is_empty() && global_scope_doc.is_none() {
        error!("Could not find '{}' in the documentation.", GLOBAL_SCOPE_DOC);
    }

    for constant in &db.global_constants {
        let mut iconstant = ConstantInterface::new(
            constant.name.as_str(),
            snake_to_pascal_case(&constant.name, true),
            constant.value,
        );
        iconstant.doc = global_scope_doc.and_then(|d| d.constant(&constant.name)).cloned();

        match &constant.enum_name {
            Some(enum_name) => {
                match registry.global_enums.iter_mut().find(|e| &e.cname == enum_name) {
                    Some(ienum) => ienum.constants.push(iconstant),
                    None => {
                        let mut ienum =
                            EnumInterface::new(enum_name.as_str(), pascal_to_pascal_case(enum_name), constant.is_bitfield);
                        ienum.constants.push(iconstant);
                        registry.global_enums.push(ienum);
                    }
                }
            }
            None => registry.global_constants.push(iconstant),
        }
    }

    for ienum in &mut registry.global_enums {
        let enum_itype = enum_type(&ienum.cname, &ienum.proxy_name, ApiType::Core)?;
        registry.enum_types.insert(enum_itype.cname.clone(), enum_itype);

        let mut prefix_length = determine_enum_prefix(ienum);

        // ERR_ is the prefix of everything but OK and FAILED
        if ienum.cname == "Error" {
            if prefix_length > 0 {
                error!("Prefix for enum 'Error' is not empty.");
            }
            prefix_length = 1;
        }

        apply_prefix_to_enum_constants(ienum, prefix_length);
    }

    for builtin in &db.builtin_enums {
        if builtin.type_name == "Object" {
            continue;
        }

        for enum_name in &builtin.enums {
            let name = format!("{}.{}", builtin.type_name, enum_name);
            let proxy_name = name.split('.').map(pascal_to_pascal_case).collect::<Vec<_>>().join(".");
            let enum_itype = enum_type(&name, &proxy_name, ApiType::Core)?;
            registry.enum_types.insert(enum_itype.cname.clone(), enum_itype);
        }
    }

    Ok(())
}
