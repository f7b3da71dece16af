//! The deduplicated table of native-call shims.
//!
//! Every bound method is reduced to a fingerprint of its marshalling shape.
//! Methods sharing a fingerprint share one `godot_icall_{argc}_{seq}` shim.

use rustc_hash::FxHashMap;

use crate::defs::ICALL_PREFIX;
use crate::error::Result;
use crate::registry::TypeRegistry;
use crate::types::{ApiType, InternalCall, MethodInterface, TypeInterface, ARRAY_GENERIC, DICTIONARY_GENERIC};

/// Fingerprint category of an argument type.
pub fn arg_unique_sig(itype: &TypeInterface) -> &str {
    if itype.is_object_type {
        "Obj"
    } else if itype.is_enum {
        "int"
    } else if itype.cname == ARRAY_GENERIC {
        "Array"
    } else if itype.cname == DICTIONARY_GENERIC {
        "Dictionary"
    } else {
        &itype.name
    }
}

/// Fingerprint category of a return type.
pub fn ret_unique_sig(itype: &TypeInterface) -> &str {
    if itype.is_ref_counted {
        "Ref"
    } else {
        arg_unique_sig(itype)
    }
}

/// Fingerprint of a method's native-call shape.
pub fn method_unique_sig(registry: &TypeRegistry, itype: &TypeInterface, imethod: &MethodInterface) -> Result<String> {
    let context = format!("method '{}.{}'", itype.name, imethod.name);
    let return_type = registry.require(&imethod.return_type, &context)?;

    let mut sig = format!("{},CallMethodBind", ret_unique_sig(return_type));
    if !imethod.is_static {
        sig.push_str(",CallInstance");
    }

    for iarg in &imethod.arguments {
        let arg_type = registry.require(&iarg.ty, &context)?;
        sig.push(',');
        sig.push_str(arg_unique_sig(arg_type));
    }

    Ok(sig)
}

#[derive(Debug, Default)]
pub struct IcallTable {
    calls: Vec<InternalCall>,
    by_sig: FxHashMap<String, usize>,
    /// (owner proxy name, method index) to call index
    by_method: FxHashMap<(String, usize), usize>,
}

impl IcallTable {
    /// Build the table over every object type in the registry.
    pub fn build(registry: &TypeRegistry) -> Result<Self> {
        let mut table = Self::default();
        for itype in registry.obj_types.values() {
            table.add_type(registry, itype)?;
        }
        Ok(table)
    }

    fn add_type(&mut self, registry: &TypeRegistry, itype: &TypeInterface) -> Result<()> {
        for (idx, imethod) in itype.methods.iter().enumerate() {
            if imethod.is_virtual {
                continue;
            }

            let unique_sig = method_unique_sig(registry, itype, imethod)?;

            let call_idx = match self.by_sig.get(&unique_sig) {
                Some(&existing) => {
                    if itype.api_type != ApiType::Editor {
                        self.calls[existing].editor_only = false;
                    }
                    existing
                }
                None => {
                    let call = InternalCall {
                        name: format!("{ICALL_PREFIX}{}_{}", imethod.arguments.len(), self.calls.len()),
                        unique_sig: unique_sig.clone(),
                        api_type: itype.api_type,
                        editor_only: itype.api_type == ApiType::Editor,
                        is_static: imethod.is_static,
                        is_vararg: imethod.is_vararg,
                        return_type: imethod.return_type.clone(),
                        argument_types: imethod.arguments.iter().map(|a| a.ty.clone()).collect(),
                    };
                    self.calls.push(call);
                    self.by_sig.insert(unique_sig, self.calls.len() - 1);
                    self.calls.len() - 1
                }
            };

            self.by_method.insert((itype.proxy_name.clone(), idx), call_idx);
        }

        Ok(())
    }

    pub fn calls(&self) -> &[InternalCall] {
        &self.calls
    }

    /// The shim used by method `method_idx` of `itype`.
    pub fn for_method(&self, itype: &TypeInterface, method_idx: usize) -> Option<&InternalCall> {
        self.by_method
            .get(&(itype.proxy_name.clone(), method_idx))
            .map(|&idx| &self.calls[idx])
    }
}
