//! Type registry and resolution.
//!
//! The registry is built once per run by the populators and then only read.
//! Object types are indexed by name, so base-chain walks are plain map lookups
//! bounded by the number of registered object types.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use tracing::warn;

use crate::defs::CS_SINGLETON_INSTANCE_SUFFIX;
use crate::error::{GlueError, Result};
use crate::types::{
    ApiType, ConstantInterface, EnumInterface, TypeInterface, TypeReference,
};

#[derive(Debug, Default)]
pub struct TypeRegistry {
    pub builtin_types: IndexMap<String, TypeInterface>,
    pub obj_types: IndexMap<String, TypeInterface>,
    pub enum_types: IndexMap<String, TypeInterface>,
    pub global_constants: Vec<ConstantInterface>,
    pub global_enums: Vec<EnumInterface>,
    /// Classes that have a documentation page
    pub documented_classes: FxHashSet<String>,
}

impl TypeRegistry {
    /// Resolve a reference: builtins, then objects, then enums when the
    /// reference names an enum. An enum the host bound no constants for never
    /// gets registered and resolves to `int`.
    pub fn resolve(&self, typeref: &TypeReference) -> Option<&TypeInterface> {
        if let Some(itype) = self.builtin_types.get(&typeref.cname) {
            return Some(itype);
        }

        if let Some(itype) = self.obj_types.get(&typeref.cname) {
            return Some(itype);
        }

        if typeref.is_enum {
            return self
                .enum_types
                .get(&typeref.cname)
                .or_else(|| self.builtin_types.get("int"));
        }

        None
    }

    /// Like [`TypeRegistry::resolve`] but a singleton resolves to its instance type.
    pub fn resolve_or_singleton(&self, typeref: &TypeReference) -> Option<&TypeInterface> {
        let itype = self.resolve(typeref)?;
        if itype.is_singleton {
            let instance_name = format!("{}{CS_SINGLETON_INSTANCE_SUFFIX}", itype.name);
            return self.obj_types.get(&instance_name);
        }
        Some(itype)
    }

    /// Resolve or fail with the given context.
    pub fn require(&self, typeref: &TypeReference, context: &str) -> Result<&TypeInterface> {
        self.resolve(typeref)
            .ok_or_else(|| GlueError::type_not_found(&typeref.cname, context))
    }

    pub fn require_or_singleton(&self, typeref: &TypeReference, context: &str) -> Result<&TypeInterface> {
        self.resolve_or_singleton(typeref)
            .ok_or_else(|| GlueError::type_not_found(&typeref.cname, context))
    }

    pub fn find_by_name(&self, name: &str) -> Option<&TypeInterface> {
        self.resolve(&TypeReference::new(name))
    }

    /// `<A, B>` for a generic reference, empty when it has no parameters.
    pub fn generic_type_parameters(&self, itype: &TypeInterface, params: &[TypeReference]) -> Result<String> {
        if params.is_empty() {
            return Ok(String::new());
        }

        if itype.type_parameter_count != params.len() {
            return Err(GlueError::GenericArity(format!(
                "{}: found {}, but requires {}",
                itype.name,
                params.len(),
                itype.type_parameter_count
            )));
        }

        let mut out = String::from("<");
        for (i, param) in params.iter().enumerate() {
            let context = format!("generic parameter of '{}'", itype.name);
            let param_itype = self.require_or_singleton(param, &context)?;

            if param_itype.is_singleton {
                return Err(GlueError::invalid(format!(
                    "Generic type parameter is a singleton: '{}'.",
                    param_itype.name
                )));
            }

            if itype.api_type == ApiType::Core && param_itype.api_type == ApiType::Editor {
                return Err(GlueError::ApiVisibility {
                    target: param_itype.name.clone(),
                    target_api: ApiType::Editor.display_name().to_string(),
                    source_api: ApiType::Core.display_name().to_string(),
                    context,
                });
            }

            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&param_itype.cs_type);
        }
        out.push('>');

        Ok(out)
    }

    /// `start` followed by each of its object ancestors.
    pub fn ancestors<'a>(&'a self, start: &'a TypeInterface) -> Ancestors<'a> {
        Ancestors {
            registry: self,
            next: Some(start),
            origin: &start.name,
            steps: 0,
        }
    }

    /// The immediate base object type, if registered.
    pub fn base_of(&self, itype: &TypeInterface) -> Option<&TypeInterface> {
        itype
            .base_name
            .as_deref()
            .and_then(|base| self.obj_types.get(base))
    }
}

/// Iterator over a base-type chain. Yields an error and stops if the chain
/// is longer than the number of object types.
pub struct Ancestors<'a> {
    registry: &'a TypeRegistry,
    next: Option<&'a TypeInterface>,
    origin: &'a str,
    steps: usize,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = Result<&'a TypeInterface>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.steps += 1;
        if self.steps > self.registry.obj_types.len() + 1 {
            return Some(Err(GlueError::InheritanceCycle(self.origin.to_string())));
        }
        self.next = self.registry.base_of(current);
        Some(Ok(current))
    }
}

/// Check that `source` may reference `target`. A missing type stands for the
/// global scope. Failures are logged and reported as `false`.
pub fn validate_api_visibility(target: Option<&TypeInterface>, source: Option<&TypeInterface>) -> bool {
    let target_api = target.map_or(ApiType::None, |t| t.api_type);
    let source_api = source.map_or(ApiType::None, |t| t.api_type);

    let valid = match target_api {
        ApiType::None | ApiType::Core => true,
        ApiType::Editor => matches!(source_api, ApiType::Editor | ApiType::EditorExtension),
        ApiType::Extension => matches!(source_api, ApiType::Extension | ApiType::EditorExtension),
        ApiType::EditorExtension => source_api == ApiType::EditorExtension,
    };

    if !valid {
        let target_name = target.map_or("@GlobalScope", |t| t.proxy_name.as_str());
        let source_name = source.map_or("@GlobalScope", |t| t.proxy_name.as_str());
        warn!(
            "Type '{}' has API level '{}'; it cannot be referenced by type '{}' with API level '{}'.",
            target_name,
            target_api.display_name(),
            source_name,
            source_api.display_name()
        );
    }

    valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::{builtin_types, enum_type, object_type};

    fn registry_with(types: &[(&str, Option<&str>, ApiType)]) -> TypeRegistry {
        let mut registry = TypeRegistry {
            builtin_types: builtin_types().unwrap(),
            ..Default::default()
        };
        for (name, base, api) in types {
            let mut itype = object_type(name, name, *api, false).unwrap();
            itype.base_name = base.map(str::to_string);
            registry.obj_types.insert(name.to_string(), itype);
        }
        registry
    }

    #[test]
    fn test_resolve_round_trip() {
        let registry = registry_with(&[("Object", None, ApiType::Core), ("Node", Some("Object"), ApiType::Core)]);

        for name in registry.builtin_types.keys().chain(registry.obj_types.keys()) {
            let resolved = registry.resolve(&TypeReference::new(name.as_str())).unwrap();
            assert_eq!(&resolved.cname, name);
        }
    }

    #[test]
    fn test_unbound_enum_falls_back_to_int() {
        let mut registry = registry_with(&[]);
        let itype = enum_type("Node.ProcessMode", "Node.ProcessModeEnum", ApiType::Core).unwrap();
        registry.enum_types.insert(itype.cname.clone(), itype);

        assert_eq!(
            registry.resolve(&TypeReference::enum_of("Node.ProcessMode")).unwrap().proxy_name,
            "Node.ProcessModeEnum"
        );
        assert_eq!(registry.resolve(&TypeReference::enum_of("Node.Empty")).unwrap().name, "int");
        assert!(registry.resolve(&TypeReference::new("Node.Empty")).is_none());
    }

    #[test]
    fn test_require_reports_context() {
        let registry = registry_with(&[]);
        let err = registry
            .require(&TypeReference::new("Missing"), "return type of 'Foo.bar'")
            .unwrap_err();
        assert!(err.to_string().contains("Missing"));
        assert!(err.to_string().contains("Foo.bar"));
    }

    #[test]
    fn test_singleton_redirect() {
        let mut registry = registry_with(&[("Input", None, ApiType::Core)]);
        registry.obj_types["Input"].is_singleton = true;
        let mut instance = registry.obj_types["Input"].clone();
        instance.is_singleton = false;
        instance.is_singleton_instance = true;
        instance.proxy_name = "InputInstance".into();
        registry.obj_types.insert("InputInstance".into(), instance);

        let itype = registry.resolve_or_singleton(&TypeReference::new("Input")).unwrap();
        assert_eq!(itype.proxy_name, "InputInstance");
    }

    #[test]
    fn test_api_visibility_lattice() {
        let core = object_type("A", "A", ApiType::Core, false).unwrap();
        let editor = object_type("B", "B", ApiType::Editor, false).unwrap();
        let ext = object_type("C", "C", ApiType::Extension, false).unwrap();
        let editor_ext = object_type("D", "D", ApiType::EditorExtension, false).unwrap();

        assert!(validate_api_visibility(Some(&core), Some(&editor)));
        assert!(validate_api_visibility(Some(&core), None));
        assert!(validate_api_visibility(Some(&editor), Some(&editor_ext)));
        assert!(!validate_api_visibility(Some(&editor), Some(&core)));
        assert!(!validate_api_visibility(Some(&ext), Some(&editor)));
        assert!(validate_api_visibility(Some(&ext), Some(&editor_ext)));
        assert!(!validate_api_visibility(Some(&editor_ext), Some(&ext)));
        assert!(validate_api_visibility(None, Some(&editor)));
    }

    #[test]
    fn test_ancestors_walk() {
        let registry = registry_with(&[
            ("Object", None, ApiType::Core),
            ("Node", Some("Object"), ApiType::Core),
            ("Node2D", Some("Node"), ApiType::Core),
        ]);
        let names: Vec<String> = registry
            .ancestors(&registry.obj_types["Node2D"])
            .map(|t| t.unwrap().name.clone())
            .collect();
        assert_eq!(names, ["Node2D", "Node", "Object"]);
    }

    #[test]
    fn test_ancestors_cycle_is_bounded() {
        let registry = registry_with(&[("A", Some("B"), ApiType::Core), ("B", Some("A"), ApiType::Core)]);
        let last = registry.ancestors(&registry.obj_types["A"]).last().unwrap();
        assert!(matches!(last, Err(GlueError::InheritanceCycle(_))));
    }

    #[test]
    fn test_generic_type_parameters() {
        let registry = registry_with(&[("Node", None, ApiType::Core), ("EditorPlugin", None, ApiType::Editor)]);
        let array = &registry.builtin_types["Array_@generic"];

        let params = registry
            .generic_type_parameters(array, &[TypeReference::new("Node")])
            .unwrap();
        assert_eq!(params, "<Node>");

        assert!(matches!(
            registry.generic_type_parameters(array, &[TypeReference::new("int"), TypeReference::new("int")]),
            Err(GlueError::GenericArity(_))
        ));
        assert!(matches!(
            registry.generic_type_parameters(array, &[TypeReference::new("EditorPlugin")]),
            Err(GlueError::ApiVisibility { .. })
        ));
    }
}
