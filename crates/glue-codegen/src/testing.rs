//! Fluent builders for reflection snapshots used across the unit tests.

use crate::error::Result;
use crate::generator::build_registry_with;
use crate::icalls::IcallTable;
use crate::populate::PopulateConfig;
use crate::reflection::{
    ApiType, ArgumentInfo, ClassDb, ClassDoc, ClassInfo, EnumInfo, GlobalConstant, MethodBindInfo, MethodInfo,
    PropertyAccessors, PropertyInfo, TypeMeta, VariantType,
};
use crate::registry::TypeRegistry;

/// Registry and call table for `db` under the default configuration.
pub fn build_registry(db: &ClassDb) -> Result<(TypeRegistry, IcallTable)> {
    build_registry_with(db, &PopulateConfig::default())
}

fn int_argument(name: &str) -> ArgumentInfo {
    ArgumentInfo {
        name: name.to_string(),
        ty: VariantType::Int,
        meta: TypeMeta::Int32,
        ..Default::default()
    }
}

pub struct ClassBuilder {
    class: ClassInfo,
}

impl ClassBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            class: ClassInfo::new(name),
        }
    }

    pub fn parent(mut self, parent: &str) -> Self {
        self.class.parent = Some(parent.to_string());
        self
    }

    pub fn api(mut self, api: ApiType) -> Self {
        self.class.api = api;
        self
    }

    pub fn instantiable(mut self) -> Self {
        self.class.instantiable = true;
        self
    }

    pub fn singleton(mut self) -> Self {
        self.class.is_singleton = true;
        self
    }

    pub fn int_property(mut self, name: &str, setter: &str, getter: &str) -> Self {
        self.class.properties.push(PropertyInfo {
            name: name.to_string(),
            ty: VariantType::Int,
            accessors: Some(PropertyAccessors {
                setter: setter.to_string(),
                getter: getter.to_string(),
                index: -1,
            }),
            ..Default::default()
        });
        self
    }

    pub fn method(mut self, method: MethodInfo) -> Self {
        self.class.methods.push(method);
        self
    }

    /// List `name` among the methods scripts may override.
    pub fn virtual_listed(mut self, name: &str) -> Self {
        self.class.virtual_methods.push(name.to_string());
        self
    }

    pub fn constant(mut self, name: &str, value: i64) -> Self {
        self.class.constants.insert(name.to_string(), value);
        self
    }

    fn with_enum(mut self, name: &str, constants: &[(&str, i64)], is_bitfield: bool) -> Self {
        for (constant, value) in constants {
            self.class.constants.insert(constant.to_string(), *value);
        }
        self.class.enums.insert(
            name.to_string(),
            EnumInfo {
                constants: constants.iter().map(|(c, _)| c.to_string()).collect(),
                is_bitfield,
            },
        );
        self
    }

    pub fn enumeration(self, name: &str, constants: &[(&str, i64)]) -> Self {
        self.with_enum(name, constants, false)
    }

    pub fn flags(self, name: &str, constants: &[(&str, i64)]) -> Self {
        self.with_enum(name, constants, true)
    }

    pub fn build(self) -> ClassInfo {
        self.class
    }

    /// A bound method taking and returning 32-bit ints.
    pub fn int_method(name: &str, args: &[&str]) -> MethodInfo {
        MethodInfo {
            name: name.to_string(),
            return_value: int_argument(""),
            arguments: args.iter().map(|a| int_argument(a)).collect(),
            bind: Some(MethodBindInfo {
                return_meta: TypeMeta::Int32,
                argument_meta: vec![TypeMeta::Int32; args.len()],
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// A bound method taking 32-bit ints and returning nothing.
    pub fn void_method(name: &str, args: &[&str]) -> MethodInfo {
        let mut method = Self::int_method(name, args);
        method.return_value = ArgumentInfo::default();
        if let Some(bind) = method.bind.as_mut() {
            bind.return_meta = TypeMeta::default();
        }
        method
    }
}

#[derive(Default)]
pub struct SnapshotBuilder {
    db: ClassDb,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(self, builder: ClassBuilder) -> Self {
        self.class_info(builder.build())
    }

    pub fn class_info(mut self, class: ClassInfo) -> Self {
        self.db.classes.insert(class.name.clone(), class);
        self
    }

    pub fn global_constant(mut self, name: &str, value: i64) -> Self {
        self.db.global_constants.push(GlobalConstant {
            name: name.to_string(),
            value,
            ..Default::default()
        });
        self
    }

    pub fn global_enum(mut self, name: &str, constants: &[(&str, i64)]) -> Self {
        for (constant, value) in constants {
            self.db.global_constants.push(GlobalConstant {
                name: constant.to_string(),
                value: *value,
                enum_name: Some(name.to_string()),
                is_bitfield: false,
            });
        }
        self
    }

    pub fn doc(mut self, class: &str, doc: ClassDoc) -> Self {
        self.db.docs.insert(class.to_string(), doc);
        self
    }

    pub fn build(self) -> ClassDb {
        self.db
    }
}
