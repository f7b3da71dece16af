//! Fixed names and layout fragments shared by the emitters.

pub const INDENT1: &str = "    ";
pub const INDENT2: &str = "        ";
pub const INDENT3: &str = "            ";
pub const INDENT4: &str = "                ";

pub const MEMBER_BEGIN: &str = "\n    ";
pub const OPEN_BLOCK: &str = "{\n";
pub const CLOSE_BLOCK: &str = "}\n";
pub const OPEN_BLOCK_L1: &str = "    {\n";
pub const OPEN_BLOCK_L2: &str = "        {\n";
pub const OPEN_BLOCK_L3: &str = "            {\n";
pub const CLOSE_BLOCK_L1: &str = "    }\n";
pub const CLOSE_BLOCK_L2: &str = "        }\n";
pub const CLOSE_BLOCK_L3: &str = "            }\n";

pub const BINDINGS_NAMESPACE: &str = "Godot";
pub const BINDINGS_NAMESPACE_COLLECTIONS: &str = "Godot.Collections";
pub const BINDINGS_GLOBAL_SCOPE_CLASS: &str = "GD";
pub const BINDINGS_NATIVE_NAME_FIELD: &str = "NativeName";
pub const BINDINGS_CLASS_NATIVECALLS: &str = "NativeCalls";
pub const BINDINGS_CLASS_NATIVECALLS_EDITOR: &str = "EditorNativeCalls";
pub const BINDINGS_CLASS_CONSTRUCTOR: &str = "Constructors";
pub const BINDINGS_CLASS_CONSTRUCTOR_EDITOR: &str = "EditorConstructors";
pub const BINDINGS_CLASS_CONSTRUCTOR_DICTIONARY: &str = "BuiltInMethodConstructors";

pub const CS_PARAM_MEMORYOWN: &str = "memoryOwn";
pub const CS_PARAM_METHODBIND: &str = "method";
pub const CS_PARAM_INSTANCE: &str = "ptr";
pub const CS_STATIC_METHOD_GETINSTANCE: &str = "GetPtr";
pub const CS_METHOD_CALL: &str = "Call";
pub const CS_PROPERTY_SINGLETON: &str = "Singleton";
pub const CS_METHOD_INVOKE_GODOT_CLASS_METHOD: &str = "InvokeGodotClassMethod";
pub const CS_METHOD_HAS_GODOT_CLASS_METHOD: &str = "HasGodotClassMethod";
pub const CS_METHOD_HAS_GODOT_CLASS_SIGNAL: &str = "HasGodotClassSignal";
pub const CS_STATIC_FIELD_NATIVE_CTOR: &str = "NativeCtor";
pub const CS_STATIC_FIELD_METHOD_BIND_PREFIX: &str = "MethodBind";
pub const CS_STATIC_FIELD_METHOD_PROXY_NAME_PREFIX: &str = "MethodProxyName_";
pub const CS_STATIC_FIELD_SIGNAL_PROXY_NAME_PREFIX: &str = "SignalProxyName_";
pub const CS_SINGLETON_INSTANCE_SUFFIX: &str = "Instance";

pub const ICALL_PREFIX: &str = "godot_icall_";
pub const ICALL_CLASSDB_GET_METHOD_WITH_COMPATIBILITY: &str = "ClassDB_get_method_with_compatibility";
pub const ICALL_CLASSDB_GET_CONSTRUCTOR: &str = "ClassDB_get_constructor";

pub const API_SOLUTION_NAME: &str = "GodotSharp";
pub const CORE_API_ASSEMBLY_NAME: &str = "GodotSharp";
pub const EDITOR_API_ASSEMBLY_NAME: &str = "GodotSharpEditor";

pub const C_LOCAL_RET: &str = "ret";
pub const C_LOCAL_VARARG_RET: &str = "vararg_ret";
pub const C_LOCAL_PTRCALL_ARGS: &str = "call_args";
pub const C_CLASS_NATIVE_FUNCS: &str = "NativeFuncs";
pub const C_METHOD_UNMANAGED_GET_MANAGED: &str = "InteropUtils.UnmanagedGetManaged";
pub const C_METHOD_ENGINE_GET_SINGLETON: &str = "InteropUtils.EngineGetSingleton";
pub const C_METHOD_MONOSTR_TO_GODOT: &str = "Marshaling.ConvertStringToNative";
pub const C_METHOD_MONOSTR_FROM_GODOT: &str = "Marshaling.ConvertStringToManaged";
pub const C_METHOD_MANAGED_TO_CALLABLE: &str = "Marshaling.ConvertCallableToNative";
pub const C_METHOD_MANAGED_FROM_CALLABLE: &str = "Marshaling.ConvertCallableToManaged";
pub const C_METHOD_MANAGED_TO_SIGNAL: &str = "Marshaling.ConvertSignalToNative";
pub const C_METHOD_MANAGED_FROM_SIGNAL: &str = "Marshaling.ConvertSignalToManaged";

/// Name of the class holding global scope documentation.
pub const GLOBAL_SCOPE_DOC: &str = "@GlobalScope";

/// `Type.Member` names that legitimately hide an inherited member and get `new`.
pub const ALLOWED_INHERITED_MEMBER_HIDING: &[&str] = &[
    "ArrayMesh.BlendShapeMode",
    "Button.TextDirection",
    "Label.TextDirection",
    "LineEdit.TextDirection",
    "LinkButton.TextDirection",
    "MenuBar.TextDirection",
    "RichTextLabel.TextDirection",
    "TextEdit.TextDirection",
    "FoldableContainer.TextDirection",
    "VisualShaderNodeReroute.PortType",
    "GltfAccessor.GetType",
    "GltfAccessor.MethodName.GetType",
];

pub fn allows_inherited_member_hiding(qualified: &str) -> bool {
    ALLOWED_INHERITED_MEMBER_HIDING.contains(&qualified)
}

/// `Marshaling.ConvertSystemArrayToNative{T}`
pub fn c_method_monoarray_to(array_type: &str) -> String {
    format!("Marshaling.ConvertSystemArrayToNative{array_type}")
}

/// `Marshaling.ConvertNative{T}ToSystemArray`
pub fn c_method_monoarray_from(array_type: &str) -> String {
    format!("Marshaling.ConvertNative{array_type}ToSystemArray")
}
