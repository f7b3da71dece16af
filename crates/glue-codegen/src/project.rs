//! Writing the generated C# projects.
//!
//! The core project holds every non-editor type, the global scope and the
//! constructor table; the editor project holds editor types and registers its
//! constructors into the core table. Both list their sources in a
//! `GeneratedIncludes.props` the hand-written `.csproj` imports.

use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use rustc_hash::FxHasher;
use tracing::debug;

use crate::defs::{
    BINDINGS_CLASS_CONSTRUCTOR, BINDINGS_CLASS_CONSTRUCTOR_DICTIONARY, BINDINGS_CLASS_CONSTRUCTOR_EDITOR,
    BINDINGS_CLASS_NATIVECALLS, BINDINGS_CLASS_NATIVECALLS_EDITOR, BINDINGS_GLOBAL_SCOPE_CLASS, BINDINGS_NAMESPACE,
    CLOSE_BLOCK, CS_PARAM_INSTANCE, CS_SINGLETON_INSTANCE_SUFFIX, INDENT1, INDENT2, INDENT3, MEMBER_BEGIN, OPEN_BLOCK,
};
use crate::emit::class::generate_type;
use crate::emit::extensions::generate_array_extensions;
use crate::emit::globals::generate_global_constants;
use crate::emit::native_calls::generate_native_call;
use crate::emit::EmitContext;
use crate::error::{GlueError, Result};
use crate::registry::TypeRegistry;
use crate::types::{ApiType, TypeInterface};

const GENERATED_DIR: &str = "Generated";
const GODOT_OBJECTS_DIR: &str = "Generated/GodotObjects";
const INCLUDES_PROPS: &str = "Generated/GeneratedIncludes.props";

/// Destination for generated text files.
pub trait SaveText {
    fn save_text(&mut self, path: &Path, text: &str) -> Result<()>;

    fn ensure_dir(&mut self, path: &Path) -> Result<()>;
}

/// Writes to the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsWriter;

impl SaveText for FsWriter {
    fn save_text(&mut self, path: &Path, text: &str) -> Result<()> {
        debug!("Writing {}", path.display());
        fs::write(path, text).map_err(|source| GlueError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn ensure_dir(&mut self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|source| GlueError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Keeps every file in memory, in write order.
#[derive(Debug, Default)]
pub struct MemoryWriter {
    files: IndexMap<PathBuf, String>,
    dirs: Vec<PathBuf>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl SaveText for MemoryWriter {
    fn save_text(&mut self, path: &Path, text: &str) -> Result<()> {
        self.files.insert(path.to_path_buf(), text.to_string());
        Ok(())
    }

    fn ensure_dir(&mut self, path: &Path) -> Result<()> {
        if !self.dirs.iter().any(|d| d == path) {
            self.dirs.push(path.to_path_buf());
        }
        Ok(())
    }
}

/// Fingerprint of an API partition: its classes and their method hashes.
pub fn partition_api_hash(registry: &TypeRegistry, api_type: ApiType) -> u64 {
    let mut hasher = FxHasher::default();
    for itype in registry
        .obj_types
        .values()
        .filter(|t| t.api_type == api_type && !t.is_singleton_instance)
    {
        itype.name.hash(&mut hasher);
        for imethod in &itype.methods {
            imethod.cname.hash(&mut hasher);
            imethod.hash.hash(&mut hasher);
        }
    }
    hasher.finish()
}

/// Source files of one project, relative to the project directory.
struct ProjectFiles<'w> {
    proj_dir: PathBuf,
    compile_items: Vec<String>,
    writer: &'w mut dyn SaveText,
}

impl<'w> ProjectFiles<'w> {
    fn create(proj_dir: &Path, writer: &'w mut dyn SaveText) -> Result<Self> {
        writer.ensure_dir(proj_dir)?;
        writer.ensure_dir(&proj_dir.join(GENERATED_DIR))?;
        writer.ensure_dir(&proj_dir.join(GODOT_OBJECTS_DIR))?;
        Ok(Self {
            proj_dir: proj_dir.to_path_buf(),
            compile_items: Vec::new(),
            writer,
        })
    }

    fn add(&mut self, relative: String, text: &str) -> Result<()> {
        self.writer.save_text(&self.proj_dir.join(&relative), text)?;
        self.compile_items.push(relative);
        Ok(())
    }

    fn add_types<'a>(&mut self, ctx: &EmitContext<'a>, types: impl Iterator<Item = &'a TypeInterface>) -> Result<()> {
        for itype in types {
            let text = generate_type(ctx, itype)?;
            self.add(format!("{GODOT_OBJECTS_DIR}/{}.cs", itype.proxy_name), &text)?;
        }
        Ok(())
    }

    /// Write `GeneratedIncludes.props` listing everything added so far.
    fn finish(self) -> Result<()> {
        let mut props = String::from("<Project>\n  <ItemGroup>\n");
        for item in &self.compile_items {
            props.push_str(&format!("    <Compile Include=\"{}\" />\n", item.replace('/', "\\")));
        }
        props.push_str("  </ItemGroup>\n</Project>\n");
        self.writer.save_text(&self.proj_dir.join(INCLUDES_PROPS), &props)
    }
}

fn push_constructor_entries(out: &mut String, registry: &TypeRegistry, api_type: ApiType, dictionary: &str) {
    for itype in registry
        .obj_types
        .values()
        .filter(|t| t.api_type == api_type && !t.is_singleton_instance)
    {
        if itype.is_deprecated {
            out.push_str("#pragma warning disable CS0618\n");
        }

        let suffix = if itype.is_singleton && !itype.is_compat_singleton {
            CS_SINGLETON_INSTANCE_SUFFIX
        } else {
            ""
        };
        out.push_str(&format!(
            "{INDENT2}{dictionary}.Add(\"{}\", {CS_PARAM_INSTANCE} => new {}{suffix}({CS_PARAM_INSTANCE}));\n",
            itype.name, itype.proxy_name
        ));

        if itype.is_deprecated {
            out.push_str("#pragma warning restore CS0618\n");
        }
    }
}

fn core_constructors(registry: &TypeRegistry) -> String {
    let mut out = format!("namespace {BINDINGS_NAMESPACE};\n\n");
    out.push_str("using System;\nusing System.Collections.Generic;\n\n");
    out.push_str(&format!("internal static class {BINDINGS_CLASS_CONSTRUCTOR}\n{{"));

    out.push_str(&format!(
        "{MEMBER_BEGIN}internal static readonly Dictionary<string, Func<IntPtr, GodotObject>> {BINDINGS_CLASS_CONSTRUCTOR_DICTIONARY};\n"
    ));

    out.push_str(&format!(
        "{MEMBER_BEGIN}public static GodotObject Invoke(string nativeTypeNameStr, IntPtr nativeObjectPtr)\n\
         {INDENT1}{OPEN_BLOCK}\
         {INDENT2}if (!{BINDINGS_CLASS_CONSTRUCTOR_DICTIONARY}.TryGetValue(nativeTypeNameStr, out var constructor))\n\
         {INDENT3}throw new InvalidOperationException(\"Wrapper class not found for type: \" + nativeTypeNameStr);\n\
         {INDENT2}return constructor(nativeObjectPtr);\n\
         {INDENT1}{CLOSE_BLOCK}"
    ));

    out.push_str(&format!("{MEMBER_BEGIN}static {BINDINGS_CLASS_CONSTRUCTOR}()\n{INDENT1}{OPEN_BLOCK}"));
    out.push_str(&format!("{INDENT2}{BINDINGS_CLASS_CONSTRUCTOR_DICTIONARY} = new();\n"));
    push_constructor_entries(&mut out, registry, ApiType::Core, BINDINGS_CLASS_CONSTRUCTOR_DICTIONARY);
    out.push_str(INDENT1);
    out.push_str(CLOSE_BLOCK);
    out.push_str(CLOSE_BLOCK);
    out
}

fn editor_constructors(registry: &TypeRegistry) -> String {
    let mut out = format!("namespace {BINDINGS_NAMESPACE};\n\n");
    out.push_str(&format!("internal static class {BINDINGS_CLASS_CONSTRUCTOR_EDITOR}\n{{"));
    out.push_str(&format!("{MEMBER_BEGIN}private static void AddEditorConstructors()\n{INDENT1}{OPEN_BLOCK}"));
    out.push_str(&format!(
        "{INDENT2}var builtInMethodConstructors = {BINDINGS_CLASS_CONSTRUCTOR}.{BINDINGS_CLASS_CONSTRUCTOR_DICTIONARY};\n"
    ));
    push_constructor_entries(&mut out, registry, ApiType::Editor, "builtInMethodConstructors");
    out.push_str(INDENT1);
    out.push_str(CLOSE_BLOCK);
    out.push_str(CLOSE_BLOCK);
    out
}

fn native_calls_header(class: &str) -> String {
    let mut out = format!("namespace {BINDINGS_NAMESPACE};\n\n");
    out.push_str(
        "using System;\n\
         using System.Diagnostics.CodeAnalysis;\n\
         using System.Runtime.InteropServices;\n\
         using Godot.NativeInterop;\n\n",
    );
    out.push_str("[SuppressMessage(\"ReSharper\", \"InconsistentNaming\")]\n");
    out.push_str("[SuppressMessage(\"ReSharper\", \"RedundantUnsafeContext\")]\n");
    out.push_str("[SuppressMessage(\"ReSharper\", \"RedundantNameQualifier\")]\n");
    out.push_str("[System.Runtime.CompilerServices.SkipLocalsInit]\n");
    out.push_str(&format!("internal static class {class}\n"));
    out
}

fn native_calls(ctx: &EmitContext<'_>, api_hash: u64, editor_only: bool) -> Result<String> {
    let class = if editor_only {
        BINDINGS_CLASS_NATIVECALLS_EDITOR
    } else {
        BINDINGS_CLASS_NATIVECALLS
    };
    let mut out = native_calls_header(class);

    if editor_only {
        out.push_str(OPEN_BLOCK);
        out.push_str(&format!("{INDENT1}internal static ulong godot_api_hash = {api_hash};\n"));
    } else {
        out.push('{');
        out.push_str(&format!("{MEMBER_BEGIN}internal static ulong godot_api_hash = {api_hash};\n"));
    }
    out.push_str(&format!("{MEMBER_BEGIN}private const int VarArgsSpanThreshold = 10;\n"));
    if editor_only {
        out.push('\n');
    }

    for icall in ctx.icalls.calls().iter().filter(|c| c.editor_only == editor_only) {
        generate_native_call(ctx, icall, &mut out)?;
    }

    out.push_str(CLOSE_BLOCK);
    Ok(out)
}

/// Write the core project into `proj_dir`.
pub fn generate_core_project(
    ctx: &EmitContext<'_>,
    api_hash: u64,
    proj_dir: &Path,
    writer: &mut dyn SaveText,
) -> Result<()> {
    let mut files = ProjectFiles::create(proj_dir, writer)?;

    files.add(
        format!("{GENERATED_DIR}/{BINDINGS_GLOBAL_SCOPE_CLASS}_constants.cs"),
        &generate_global_constants(ctx)?,
    )?;
    files.add(
        format!("{GENERATED_DIR}/{BINDINGS_GLOBAL_SCOPE_CLASS}_extensions.cs"),
        &generate_array_extensions(),
    )?;

    files.add_types(
        ctx,
        ctx.registry.obj_types.values().filter(|t| t.api_type != ApiType::Editor),
    )?;

    files.add(
        format!("{GENERATED_DIR}/{BINDINGS_CLASS_CONSTRUCTOR}.cs"),
        &core_constructors(ctx.registry),
    )?;
    files.add(
        format!("{GENERATED_DIR}/{BINDINGS_CLASS_NATIVECALLS}.cs"),
        &native_calls(ctx, api_hash, false)?,
    )?;

    files.finish()
}

/// Write the editor project into `proj_dir`.
pub fn generate_editor_project(
    ctx: &EmitContext<'_>,
    api_hash: u64,
    proj_dir: &Path,
    writer: &mut dyn SaveText,
) -> Result<()> {
    let mut files = ProjectFiles::create(proj_dir, writer)?;

    files.add_types(
        ctx,
        ctx.registry.obj_types.values().filter(|t| t.api_type == ApiType::Editor),
    )?;

    files.add(
        format!("{GENERATED_DIR}/{BINDINGS_CLASS_CONSTRUCTOR_EDITOR}.cs"),
        &editor_constructors(ctx.registry),
    )?;
    files.add(
        format!("{GENERATED_DIR}/{BINDINGS_CLASS_NATIVECALLS_EDITOR}.cs"),
        &native_calls(ctx, api_hash, true)?,
    )?;

    files.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflection::ClassDb;
    use crate::testing::{build_registry, ClassBuilder, SnapshotBuilder};

    fn snapshot() -> ClassDb {
        SnapshotBuilder::new()
            .class(ClassBuilder::new("Object").instantiable())
            .class(
                ClassBuilder::new("Node")
                    .parent("Object")
                    .instantiable()
                    .method(ClassBuilder::int_method("get_index", &[])),
            )
            .class(ClassBuilder::new("Input").parent("Object").singleton())
            .class(
                ClassBuilder::new("EditorPlugin")
                    .parent("Node")
                    .api(ApiType::Editor)
                    .instantiable()
                    .method(ClassBuilder::void_method("add_tool", &["a", "b"])),
            )
            .class(ClassBuilder::new("EditorInterface").parent("Object").singleton().api(ApiType::Editor))
            .build()
    }

    #[test]
    fn test_core_project() {
        let db = snapshot();
        let (registry, icalls) = build_registry(&db).unwrap();
        let ctx = EmitContext::new(&registry, &icalls);
        let mut writer = MemoryWriter::new();

        let proj = Path::new("out/GodotSharp");
        generate_core_project(&ctx, 42, proj, &mut writer).unwrap();

        let paths: Vec<_> = writer.paths().map(|p| p.to_path_buf()).collect();
        assert_eq!(
            paths,
            [
                "Generated/GD_constants.cs",
                "Generated/GD_extensions.cs",
                "Generated/GodotObjects/Input.cs",
                "Generated/GodotObjects/InputInstance.cs",
                "Generated/GodotObjects/Node.cs",
                "Generated/GodotObjects/GodotObject.cs",
                "Generated/Constructors.cs",
                "Generated/NativeCalls.cs",
                "Generated/GeneratedIncludes.props",
            ]
            .iter()
            .map(|p| proj.join(p))
            .collect::<Vec<_>>()
        );
        assert!(writer.dirs().contains(&proj.join("Generated/GodotObjects")));

        let ctors = writer.get(proj.join("Generated/Constructors.cs")).unwrap();
        assert!(ctors.contains("        BuiltInMethodConstructors.Add(\"Node\", ptr => new Node(ptr));\n"));
        assert!(ctors.contains("        BuiltInMethodConstructors.Add(\"Input\", ptr => new InputInstance(ptr));\n"));
        assert!(ctors.contains("BuiltInMethodConstructors.Add(\"Object\", ptr => new GodotObject(ptr));"));
        assert!(!ctors.contains("EditorPlugin"));
        assert!(ctors.contains("throw new InvalidOperationException(\"Wrapper class not found for type: \" + nativeTypeNameStr);"));

        let calls = writer.get(proj.join("Generated/NativeCalls.cs")).unwrap();
        assert!(calls.contains("internal static class NativeCalls\n{\n    internal static ulong godot_api_hash = 42;\n"));
        assert!(calls.contains("godot_icall_0_"));
        assert!(!calls.contains("godot_icall_2_"));

        let props = writer.get(proj.join("Generated/GeneratedIncludes.props")).unwrap();
        assert!(props.starts_with("<Project>\n  <ItemGroup>\n    <Compile Include=\"Generated\\GD_constants.cs\" />\n"));
        assert!(props.contains("    <Compile Include=\"Generated\\GodotObjects\\Node.cs\" />\n"));
        assert!(props.ends_with("    <Compile Include=\"Generated\\NativeCalls.cs\" />\n  </ItemGroup>\n</Project>\n"));
    }

    #[test]
    fn test_editor_project() {
        let db = snapshot();
        let (registry, icalls) = build_registry(&db).unwrap();
        let ctx = EmitContext::new(&registry, &icalls);
        let mut writer = MemoryWriter::new();

        let proj = Path::new("GodotSharpEditor");
        generate_editor_project(&ctx, 7, proj, &mut writer).unwrap();

        assert!(writer.get(proj.join("Generated/GodotObjects/EditorPlugin.cs")).is_some());
        assert!(writer.get(proj.join("Generated/GodotObjects/Node.cs")).is_none());

        let ctors = writer.get(proj.join("Generated/EditorConstructors.cs")).unwrap();
        assert!(ctors.contains("    private static void AddEditorConstructors()\n    {\n        var builtInMethodConstructors = Constructors.BuiltInMethodConstructors;\n"));
        assert!(ctors.contains("builtInMethodConstructors.Add(\"EditorPlugin\", ptr => new EditorPlugin(ptr));"));
        // Compat singletons are constructed directly
        assert!(ctors.contains("builtInMethodConstructors.Add(\"EditorInterface\", ptr => new EditorInterface(ptr));"));

        let calls = writer.get(proj.join("Generated/EditorNativeCalls.cs")).unwrap();
        assert!(calls.contains("internal static class EditorNativeCalls\n{\n    internal static ulong godot_api_hash = 7;\n"));
        assert!(calls.contains("godot_icall_2_"));
    }

    #[test]
    fn test_partition_hash_is_stable() {
        let db = snapshot();
        let (registry, _) = build_registry(&db).unwrap();
        let core = partition_api_hash(&registry, ApiType::Core);
        assert_eq!(core, partition_api_hash(&registry, ApiType::Core));
        assert_ne!(core, partition_api_hash(&registry, ApiType::Editor));
    }

    #[test]
    fn test_fs_writer() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a/b");
        let mut writer = FsWriter;
        writer.ensure_dir(&target).unwrap();
        writer.save_text(&target.join("x.cs"), "class X {}\n").unwrap();
        assert_eq!(fs::read_to_string(target.join("x.cs")).unwrap(), "class X {}\n");

        let err = writer.save_text(&dir.path().join("missing/x.cs"), "").unwrap_err();
        assert!(matches!(err, GlueError::Io { .. }));
    }
}
