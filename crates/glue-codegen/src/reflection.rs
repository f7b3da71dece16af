//! Reflection snapshot.
//!
//! The host registry is consumed read-only as a JSON document. This module
//! defines its schema and a couple of queries (ancestry, lookups) that the
//! populators need. Maps whose iteration order is observable in the output use
//! [`IndexMap`] so registration order survives a round trip through JSON.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{GlueError, Result};

/// API partition a class is registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiType {
    #[default]
    Core,
    Editor,
    Extension,
    EditorExtension,
    None,
}

impl ApiType {
    pub fn display_name(self) -> &'static str {
        match self {
            ApiType::Core => "Core",
            ApiType::Editor => "Editor",
            ApiType::Extension => "Extension",
            ApiType::EditorExtension => "Editor Extension",
            ApiType::None => "None",
        }
    }
}

/// Variant type tags, spelled the way the engine names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VariantType {
    #[default]
    Nil,
    #[serde(rename = "bool")]
    Bool,
    #[serde(rename = "int")]
    Int,
    #[serde(rename = "float")]
    Float,
    String,
    Vector2,
    Vector2i,
    Rect2,
    Rect2i,
    Vector3,
    Vector3i,
    Transform2D,
    Vector4,
    Vector4i,
    Plane,
    Quaternion,
    #[serde(rename = "AABB")]
    Aabb,
    Basis,
    Transform3D,
    Projection,
    Color,
    StringName,
    NodePath,
    #[serde(rename = "RID")]
    Rid,
    Object,
    Callable,
    Signal,
    Dictionary,
    Array,
    PackedByteArray,
    PackedInt32Array,
    PackedInt64Array,
    PackedFloat32Array,
    PackedFloat64Array,
    PackedStringArray,
    PackedVector2Array,
    PackedVector3Array,
    PackedColorArray,
    PackedVector4Array,
}

impl VariantType {
    pub fn type_name(self) -> &'static str {
        match self {
            VariantType::Nil => "Nil",
            VariantType::Bool => "bool",
            VariantType::Int => "int",
            VariantType::Float => "float",
            VariantType::String => "String",
            VariantType::Vector2 => "Vector2",
            VariantType::Vector2i => "Vector2i",
            VariantType::Rect2 => "Rect2",
            VariantType::Rect2i => "Rect2i",
            VariantType::Vector3 => "Vector3",
            VariantType::Vector3i => "Vector3i",
            VariantType::Transform2D => "Transform2D",
            VariantType::Vector4 => "Vector4",
            VariantType::Vector4i => "Vector4i",
            VariantType::Plane => "Plane",
            VariantType::Quaternion => "Quaternion",
            VariantType::Aabb => "AABB",
            VariantType::Basis => "Basis",
            VariantType::Transform3D => "Transform3D",
            VariantType::Projection => "Projection",
            VariantType::Color => "Color",
            VariantType::StringName => "StringName",
            VariantType::NodePath => "NodePath",
            VariantType::Rid => "RID",
            VariantType::Object => "Object",
            VariantType::Callable => "Callable",
            VariantType::Signal => "Signal",
            VariantType::Dictionary => "Dictionary",
            VariantType::Array => "Array",
            VariantType::PackedByteArray => "PackedByteArray",
            VariantType::PackedInt32Array => "PackedInt32Array",
            VariantType::PackedInt64Array => "PackedInt64Array",
            VariantType::PackedFloat32Array => "PackedFloat32Array",
            VariantType::PackedFloat64Array => "PackedFloat64Array",
            VariantType::PackedStringArray => "PackedStringArray",
            VariantType::PackedVector2Array => "PackedVector2Array",
            VariantType::PackedVector3Array => "PackedVector3Array",
            VariantType::PackedColorArray => "PackedColorArray",
            VariantType::PackedVector4Array => "PackedVector4Array",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyHint {
    #[default]
    None,
    ResourceType,
    ArrayType,
    DictionaryType,
    IntIsPointer,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyUsage {
    Group,
    Subgroup,
    Category,
    Array,
    Internal,
    ClassIsEnum,
    ClassIsBitfield,
    NilIsVariant,
    #[serde(other)]
    Other,
}

/// Width/precision metadata attached to `int` and `float` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeMeta {
    #[default]
    None,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Char16,
    Char32,
    Float,
    Double,
}

/// A default argument value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Variant {
    Nil,
    #[serde(rename = "bool")]
    Bool(bool),
    #[serde(rename = "int")]
    Int(i64),
    #[serde(rename = "float")]
    Float(f64),
    String(String),
    StringName(String),
    NodePath(String),
    Vector2([f64; 2]),
    Vector2i([i64; 2]),
    Rect2 {
        position: [f64; 2],
        size: [f64; 2],
    },
    Rect2i {
        position: [i64; 2],
        size: [i64; 2],
    },
    Vector3([f64; 3]),
    Vector3i([i64; 3]),
    /// Column-major: x axis, y axis, origin
    Transform2D([[f64; 2]; 3]),
    Vector4([f64; 4]),
    Vector4i([i64; 4]),
    Plane {
        normal: [f64; 3],
        d: f64,
    },
    /// x, y, z, w
    Quaternion([f64; 4]),
    #[serde(rename = "AABB")]
    Aabb {
        position: [f64; 3],
        size: [f64; 3],
    },
    /// Columns
    Basis([[f64; 3]; 3]),
    Transform3D {
        basis: [[f64; 3]; 3],
        origin: [f64; 3],
    },
    /// Columns
    Projection([[f64; 4]; 4]),
    /// r, g, b, a
    Color([f64; 4]),
    /// Instance id, zero for null
    Object(u64),
    #[serde(rename = "RID")]
    Rid(u64),
    Callable(u64),
    Signal(u64),
    Dictionary(Vec<(Variant, Variant)>),
    Array(Vec<Variant>),
    PackedByteArray(Vec<u8>),
    PackedInt32Array(Vec<i32>),
    PackedInt64Array(Vec<i64>),
    PackedFloat32Array(Vec<f32>),
    PackedFloat64Array(Vec<f64>),
    PackedStringArray(Vec<String>),
    PackedVector2Array(Vec<[f64; 2]>),
    PackedVector3Array(Vec<[f64; 3]>),
    PackedColorArray(Vec<[f64; 4]>),
    PackedVector4Array(Vec<[f64; 4]>),
}

impl Variant {
    pub fn variant_type(&self) -> VariantType {
        match self {
            Variant::Nil => VariantType::Nil,
            Variant::Bool(_) => VariantType::Bool,
            Variant::Int(_) => VariantType::Int,
            Variant::Float(_) => VariantType::Float,
            Variant::String(_) => VariantType::String,
            Variant::StringName(_) => VariantType::StringName,
            Variant::NodePath(_) => VariantType::NodePath,
            Variant::Vector2(_) => VariantType::Vector2,
            Variant::Vector2i(_) => VariantType::Vector2i,
            Variant::Rect2 { .. } => VariantType::Rect2,
            Variant::Rect2i { .. } => VariantType::Rect2i,
            Variant::Vector3(_) => VariantType::Vector3,
            Variant::Vector3i(_) => VariantType::Vector3i,
            Variant::Transform2D(_) => VariantType::Transform2D,
            Variant::Vector4(_) => VariantType::Vector4,
            Variant::Vector4i(_) => VariantType::Vector4i,
            Variant::Plane { .. } => VariantType::Plane,
            Variant::Quaternion(_) => VariantType::Quaternion,
            Variant::Aabb { .. } => VariantType::Aabb,
            Variant::Basis(_) => VariantType::Basis,
            Variant::Transform3D { .. } => VariantType::Transform3D,
            Variant::Projection(_) => VariantType::Projection,
            Variant::Color(_) => VariantType::Color,
            Variant::Object(_) => VariantType::Object,
            Variant::Rid(_) => VariantType::Rid,
            Variant::Callable(_) => VariantType::Callable,
            Variant::Signal(_) => VariantType::Signal,
            Variant::Dictionary(_) => VariantType::Dictionary,
            Variant::Array(_) => VariantType::Array,
            Variant::PackedByteArray(_) => VariantType::PackedByteArray,
            Variant::PackedInt32Array(_) => VariantType::PackedInt32Array,
            Variant::PackedInt64Array(_) => VariantType::PackedInt64Array,
            Variant::PackedFloat32Array(_) => VariantType::PackedFloat32Array,
            Variant::PackedFloat64Array(_) => VariantType::PackedFloat64Array,
            Variant::PackedStringArray(_) => VariantType::PackedStringArray,
            Variant::PackedVector2Array(_) => VariantType::PackedVector2Array,
            Variant::PackedVector3Array(_) => VariantType::PackedVector3Array,
            Variant::PackedColorArray(_) => VariantType::PackedColorArray,
            Variant::PackedVector4Array(_) => VariantType::PackedVector4Array,
        }
    }
}

/// Type information for an argument or return value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArgumentInfo {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub ty: VariantType,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub hint: PropertyHint,
    #[serde(default)]
    pub hint_string: String,
    #[serde(default)]
    pub usage: Vec<PropertyUsage>,
    #[serde(default)]
    pub meta: TypeMeta,
}

impl ArgumentInfo {
    pub fn has_usage(&self, usage: PropertyUsage) -> bool {
        self.usage.contains(&usage)
    }
}

/// Registered accessors of a property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyAccessors {
    #[serde(default)]
    pub setter: String,
    #[serde(default)]
    pub getter: String,
    /// Negative when the property is not indexed
    #[serde(default = "no_index")]
    pub index: i64,
}

fn no_index() -> i64 {
    -1
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub name: String,
    #[serde(rename = "type", default)]
    pub ty: VariantType,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub hint: PropertyHint,
    #[serde(default)]
    pub hint_string: String,
    #[serde(default)]
    pub usage: Vec<PropertyUsage>,
    /// Absent for entries the class does not actually register
    #[serde(default)]
    pub accessors: Option<PropertyAccessors>,
}

impl PropertyInfo {
    pub fn has_usage(&self, usage: PropertyUsage) -> bool {
        self.usage.contains(&usage)
    }
}

/// Native binding of a method. Absent for virtual methods.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodBindInfo {
    #[serde(default)]
    pub is_vararg: bool,
    #[serde(default)]
    pub is_compat: bool,
    #[serde(default)]
    pub return_meta: TypeMeta,
    #[serde(default)]
    pub argument_meta: Vec<TypeMeta>,
    /// Keyed by argument position
    #[serde(default)]
    pub default_arguments: BTreeMap<usize, Variant>,
}

impl MethodBindInfo {
    pub fn argument_meta(&self, idx: usize) -> TypeMeta {
        self.argument_meta.get(idx).copied().unwrap_or_default()
    }
}

/// One registered version of a method. Compatibility versions of the same
/// method appear as separate entries with their own hash.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: String,
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub hash: u32,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_virtual: bool,
    #[serde(default)]
    pub return_value: ArgumentInfo,
    #[serde(default)]
    pub arguments: Vec<ArgumentInfo>,
    #[serde(default)]
    pub bind: Option<MethodBindInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalInfo {
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<ArgumentInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumInfo {
    pub constants: Vec<String>,
    #[serde(default)]
    pub is_bitfield: bool,
}

fn enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub api: ApiType,
    #[serde(default = "enabled")]
    pub exposed: bool,
    #[serde(default = "enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub is_singleton: bool,
    /// Whether the class has a creation function
    #[serde(default)]
    pub instantiable: bool,
    #[serde(default)]
    pub properties: Vec<PropertyInfo>,
    #[serde(default)]
    pub methods: Vec<MethodInfo>,
    /// Names of the methods scripts may override
    #[serde(default)]
    pub virtual_methods: Vec<String>,
    #[serde(default)]
    pub signals: Vec<SignalInfo>,
    #[serde(default)]
    pub constants: IndexMap<String, i64>,
    #[serde(default)]
    pub enums: IndexMap<String, EnumInfo>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            api: ApiType::Core,
            exposed: true,
            enabled: true,
            is_singleton: false,
            instantiable: false,
            properties: Vec::new(),
            methods: Vec::new(),
            virtual_methods: Vec::new(),
            signals: Vec::new(),
            constants: IndexMap::new(),
            enums: IndexMap::new(),
        }
    }

    pub fn find_property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn is_virtual_listed(&self, name: &str) -> bool {
        self.virtual_methods.iter().any(|m| m == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConstant {
    pub name: String,
    pub value: i64,
    #[serde(default)]
    pub enum_name: Option<String>,
    #[serde(default)]
    pub is_bitfield: bool,
}

/// Enums declared on a builtin (non-object) type, e.g. `Vector3.Axis`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltinEnums {
    pub type_name: String,
    pub enums: Vec<String>,
}

/// Documentation of a single member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDoc {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default)]
    pub deprecated_message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDoc {
    #[serde(default)]
    pub brief_description: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default)]
    pub deprecated_message: String,
    #[serde(default)]
    pub methods: Vec<MemberDoc>,
    #[serde(default)]
    pub properties: Vec<MemberDoc>,
    #[serde(default)]
    pub signals: Vec<MemberDoc>,
    #[serde(default)]
    pub constants: Vec<MemberDoc>,
}

impl ClassDoc {
    pub fn method(&self, name: &str) -> Option<&MemberDoc> {
        self.methods.iter().find(|d| d.name == name)
    }

    pub fn property(&self, name: &str) -> Option<&MemberDoc> {
        self.properties.iter().find(|d| d.name == name)
    }

    pub fn signal(&self, name: &str) -> Option<&MemberDoc> {
        self.signals.iter().find(|d| d.name == name)
    }

    pub fn constant(&self, name: &str) -> Option<&MemberDoc> {
        self.constants.iter().find(|d| d.name == name)
    }
}

/// Hashes stamped into the native-call tables for drift detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiHashes {
    pub core: u64,
    pub editor: u64,
}

/// The whole reflection snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassDb {
    #[serde(default)]
    pub classes: IndexMap<String, ClassInfo>,
    #[serde(default)]
    pub global_constants: Vec<GlobalConstant>,
    #[serde(default)]
    pub builtin_enums: Vec<BuiltinEnums>,
    /// Keyed by class name; `@GlobalScope` documents the global constants
    #[serde(default)]
    pub docs: IndexMap<String, ClassDoc>,
    #[serde(default)]
    pub api_hashes: Option<ApiHashes>,
}

impl ClassDb {
    /// Parse a snapshot from JSON text.
    pub fn from_json(text: &str, origin: &Path) -> Result<Self> {
        serde_json::from_str(text).map_err(|source| GlueError::Snapshot {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load a snapshot from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| GlueError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text, path)
    }

    /// Load every `*.json` file under `dir` and merge them, in path order.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let mut files: Vec<_> = WalkDir::new(dir.as_ref())
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();

        let mut db = ClassDb::default();
        for file in files {
            db.merge(Self::load(&file)?);
        }
        Ok(db)
    }

    /// Merge another snapshot into this one. Later entries replace earlier ones.
    pub fn merge(&mut self, other: ClassDb) {
        self.classes.extend(other.classes);
        self.global_constants.extend(other.global_constants);
        self.builtin_enums.extend(other.builtin_enums);
        self.docs.extend(other.docs);
        if other.api_hashes.is_some() {
            self.api_hashes = other.api_hashes;
        }
    }

    pub fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    pub fn doc(&self, name: &str) -> Option<&ClassDoc> {
        self.docs.get(name)
    }

    /// Whether `class` is `ancestor` or derives from it.
    pub fn inherits(&self, class: &str, ancestor: &str) -> Result<bool> {
        let mut current = Some(class);
        let mut steps = 0;
        while let Some(name) = current {
            if name == ancestor {
                return Ok(true);
            }
            steps += 1;
            if steps > self.classes.len() + 1 {
                return Err(GlueError::InheritanceCycle(class.to_string()));
            }
            current = self.classes.get(name).and_then(|c| c.parent.as_deref());
        }
        Ok(false)
    }

    /// Class names in alphabetical order.
    pub fn class_list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.classes.keys().cloned().collect();
        names.sort();
        names
    }
}
