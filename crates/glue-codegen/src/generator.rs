//! Entry point tying population, call-table construction and emission together.

use std::path::Path;

use tracing::{error, info};

use crate::builtins::builtin_types;
use crate::defs::{CORE_API_ASSEMBLY_NAME, EDITOR_API_ASSEMBLY_NAME};
use crate::emit::class::generate_type;
use crate::emit::EmitContext;
use crate::error::Result;
use crate::icalls::IcallTable;
use crate::populate::{populate_global_constants, ObjectPopulator, PopulateConfig};
use crate::project::{generate_core_project, generate_editor_project, partition_api_hash, FsWriter, SaveText};
use crate::reflection::ClassDb;
use crate::registry::TypeRegistry;
use crate::types::ApiType;

const EXTENSION_OUTPUT_DIR: &str = "ExtensionGenerated";

/// Generates the C# API from a reflection snapshot.
///
/// ```rust,ignore
/// use glue_codegen::{BindingsGenerator, ClassDb};
///
/// let db = ClassDb::load("api_snapshot.json")?;
/// BindingsGenerator::new()
///     .add_ignored_type("DebugOnlyNode")
///     .write_cs_api(&db, "modules/mono/glue/GodotSharp")?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct BindingsGenerator {
    config: PopulateConfig,
}

impl BindingsGenerator {
    /// Create a generator with the default blacklist and compat singletons.
    pub fn new() -> Self {
        Self::default()
    }

    /// Never bind `class.method`.
    pub fn add_blacklisted_method(&mut self, class: impl AsRef<str>, method: impl AsRef<str>) -> &mut Self {
        self.config.blacklist_method(class.as_ref(), method.as_ref());
        self
    }

    /// Keep singleton `name` an instance class, reachable through `Singleton`.
    pub fn add_compat_singleton(&mut self, name: impl Into<String>) -> &mut Self {
        self.config.compat_singletons.insert(name.into());
        self
    }

    /// Skip class `name` entirely.
    pub fn add_ignored_type(&mut self, name: impl Into<String>) -> &mut Self {
        self.config.ignored_types.insert(name.into());
        self
    }

    pub fn config(&self) -> &PopulateConfig {
        &self.config
    }

    /// Generate the core and editor projects under `output_dir`.
    pub fn generate_cs_api(&self, db: &ClassDb, output_dir: impl AsRef<Path>, writer: &mut dyn SaveText) -> Result<()> {
        let output_dir = output_dir.as_ref();
        let (registry, icalls) = build_registry_with(db, &self.config)?;
        let ctx = EmitContext::new(&registry, &icalls);

        writer.ensure_dir(output_dir)?;

        let core_hash = db
            .api_hashes
            .as_ref()
            .map_or_else(|| partition_api_hash(&registry, ApiType::Core), |h| h.core);
        generate_core_project(&ctx, core_hash, &output_dir.join(CORE_API_ASSEMBLY_NAME), writer)
            .inspect_err(|_| error!("Generation of the Core API C# project failed."))?;

        let editor_hash = db
            .api_hashes
            .as_ref()
            .map_or_else(|| partition_api_hash(&registry, ApiType::Editor), |h| h.editor);
        generate_editor_project(&ctx, editor_hash, &output_dir.join(EDITOR_API_ASSEMBLY_NAME), writer)
            .inspect_err(|_| error!("Generation of the Editor API C# project failed."))?;

        info!("The Godot API sources were successfully generated");
        Ok(())
    }

    /// Generate the API onto the filesystem.
    pub fn write_cs_api(&self, db: &ClassDb, output_dir: impl AsRef<Path>) -> Result<()> {
        self.generate_cs_api(db, output_dir, &mut FsWriter)
    }

    /// Generate standalone sources for `class_list` under
    /// `output_dir/ExtensionGenerated`. References resolve against the whole
    /// snapshot.
    pub fn generate_extension_types(
        &self,
        db: &ClassDb,
        class_list: &[String],
        output_dir: impl AsRef<Path>,
        writer: &mut dyn SaveText,
    ) -> Result<()> {
        let (registry, icalls) = build_registry_with(db, &self.config)?;
        let ctx = EmitContext::new(&registry, &icalls);

        let target_dir = output_dir.as_ref().join(EXTENSION_OUTPUT_DIR);
        writer.ensure_dir(&target_dir)?;

        for name in class_list {
            let Some(itype) = registry.obj_types.get(name) else {
                info!("Skipping '{}', it was not populated", name);
                continue;
            };

            let text = generate_type(&ctx, itype)
                .inspect_err(|_| error!("Failed to generate C# type for: {}", itype.name))?;
            writer.save_text(&target_dir.join(format!("{}.cs", itype.proxy_name)), &text)?;

            info!("Generated C# type: {}", itype.name);
        }

        Ok(())
    }
}

/// Populate a registry from `db` and build its internal-call table.
pub(crate) fn build_registry_with(db: &ClassDb, config: &PopulateConfig) -> Result<(TypeRegistry, IcallTable)> {
    let mut registry = TypeRegistry {
        builtin_types: builtin_types()?,
        ..Default::default()
    };

    ObjectPopulator::new(db, config).populate(&db.class_list(), &mut registry)?;
    populate_global_constants(db, &mut registry)?;
    registry.documented_classes = db.docs.keys().cloned().collect();

    let icalls = IcallTable::build(&registry)?;
    Ok((registry, icalls))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::MemoryWriter;
    use crate::reflection::{ApiHashes, MethodBindInfo, Variant, VariantType};
    use crate::testing::{ClassBuilder, SnapshotBuilder};

    fn base_and_derived() -> ClassDb {
        let mut process = ClassBuilder::void_method("_process", &["delta"]);
        process.is_virtual = true;
        process.bind = None;

        let mut do_thing = ClassBuilder::int_method("do_thing", &["a"]);
        do_thing
            .bind
            .get_or_insert_with(MethodBindInfo::default)
            .default_arguments
            .insert(0, Variant::Int(5));

        SnapshotBuilder::new()
            .class(ClassBuilder::new("Object").instantiable())
            .class(ClassBuilder::new("Base").parent("Object").instantiable().method(process))
            .class(
                ClassBuilder::new("Derived")
                    .parent("Base")
                    .instantiable()
                    .int_property("size", "set_size", "get_size")
                    .method(ClassBuilder::void_method("set_size", &["value"]))
                    .method(ClassBuilder::int_method("get_size", &[]))
                    .method(do_thing)
                    .constant("MAX", 10)
                    .flags("Options", &[("OPTION_A", 1), ("OPTION_B", 2)]),
            )
            .build()
    }

    #[test]
    fn test_generate_cs_api() {
        let db = base_and_derived();
        let mut writer = MemoryWriter::new();
        BindingsGenerator::new()
            .generate_cs_api(&db, "glue/GodotSharp", &mut writer)
            .unwrap();

        let objects = Path::new("glue/GodotSharp/GodotSharp/Generated/GodotObjects");
        let base = writer.get(objects.join("Base.cs")).unwrap();
        assert!(base.contains("public partial class Base : GodotObject\n"));
        assert!(base.contains("public virtual void _Process(int delta)\n"));
        assert!(base.contains("public override bool HasGodotClassMethod(in godot_string_name method)\n"));

        let derived = writer.get(objects.join("Derived.cs")).unwrap();
        assert!(derived.contains("public partial class Derived : Base\n"));
        assert!(derived.contains("public const long Max = 10;"));
        assert!(derived.contains("public int DoThing(int a = 5)"));
        assert!(derived.contains("\n    public int Size\n"));
        assert!(derived.contains("[System.Flags]\n    public enum Options : long\n"));
        assert!(derived.contains("        return base.HasGodotClassMethod(method);\n"));
        assert!(derived.contains("public new class MethodName : Base.MethodName"));

        assert!(writer
            .get("glue/GodotSharp/GodotSharpEditor/Generated/EditorNativeCalls.cs")
            .is_some());
    }

    #[test]
    fn test_snapshot_hash_wins() {
        let mut db = base_and_derived();
        db.api_hashes = Some(ApiHashes { core: 11, editor: 22 });
        let mut writer = MemoryWriter::new();
        BindingsGenerator::new().generate_cs_api(&db, "out", &mut writer).unwrap();

        let calls = writer.get("out/GodotSharp/Generated/NativeCalls.cs").unwrap();
        assert!(calls.contains("godot_api_hash = 11;"));
        let editor_calls = writer.get("out/GodotSharpEditor/Generated/EditorNativeCalls.cs").unwrap();
        assert!(editor_calls.contains("godot_api_hash = 22;"));
    }

    #[test]
    fn test_configuration_is_applied() {
        let db = SnapshotBuilder::new()
            .class(ClassBuilder::new("Object").instantiable().method(ClassBuilder::int_method("get_id", &[])))
            .class(ClassBuilder::new("Debug").parent("Object"))
            .build();

        let mut generator = BindingsGenerator::new();
        generator.add_ignored_type("Debug").add_blacklisted_method("Object", "get_id");
        let mut writer = MemoryWriter::new();
        generator.generate_cs_api(&db, "out", &mut writer).unwrap();

        assert!(writer.get("out/GodotSharp/Generated/GodotObjects/Debug.cs").is_none());
        let object = writer.get("out/GodotSharp/Generated/GodotObjects/GodotObject.cs").unwrap();
        assert!(!object.contains("GetId"));
    }

    #[test]
    fn test_broken_snapshot_aborts() {
        let mut broken = ClassBuilder::int_method("get_node", &[]);
        broken.return_value.ty = VariantType::Object;
        broken.return_value.class_name = "Missing".into();

        let db = SnapshotBuilder::new()
            .class(ClassBuilder::new("Object").instantiable().method(broken))
            .build();
        let mut writer = MemoryWriter::new();
        assert!(BindingsGenerator::new().generate_cs_api(&db, "out", &mut writer).is_err());
    }

    #[test]
    fn test_extension_types() {
        let db = base_and_derived();
        let mut writer = MemoryWriter::new();
        BindingsGenerator::new()
            .generate_extension_types(&db, &["Derived".to_string(), "Unknown".to_string()], "ext", &mut writer)
            .unwrap();

        let paths: Vec<_> = writer.paths().collect();
        assert_eq!(paths, [Path::new("ext/ExtensionGenerated/Derived.cs")]);
    }
}
