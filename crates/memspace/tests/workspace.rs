use memspace::{
    schema::FieldType, CollisionPolicy, DatasetKind, LoadOptions, Workspace, WorkspaceConfig,
};
use memspace_engine_mem::{Dataset, Envelope, MemEngine, Value};
use pretty_assertions::assert_eq;
use std_util::prelude::*;

fn tracts() -> Dataset {
    Dataset::table([
        ("GEOID10", FieldType::Text),
        ("Name", FieldType::Text),
        ("EstTotPop16", FieldType::Integer),
    ])
    .with_row([Value::from("101"), Value::from("North Beach"), Value::from(3500)])
    .with_row([Value::from("102"), Value::from("Presidio"), Value::from(800)])
    .with_row([Value::from("103"), Value::from("Mission"), Value::from(1200)])
}

fn engine() -> MemEngine {
    MemEngine::new()
        .with_source("C:/data/tracts.dbf", tracts())
        .with_source(
            "C:/data/parcels.shp",
            Dataset::layer([("PIN", FieldType::Text)])
                .with_feature(Envelope::new(0.0, 0.0, 1.0, 1.0), [Value::from("A")]),
        )
        .with_location("C:/out.gdb")
}

#[test]
fn load_derives_prefixed_name() {
    let engine = engine();
    let workspace = Workspace::new(engine.clone());

    let tracts = assert_ok!(workspace.add_table("C:/data/tracts.dbf"));
    assert_eq!(tracts.name(), "mem_tracts");
    assert_eq!(tracts.kind(), DatasetKind::Table);

    let parcels = assert_ok!(workspace.add_layer("C:\\data\\parcels.shp"));
    assert_eq!(parcels.name(), "mem_parcels");

    assert_eq!(workspace.contents(), ["mem_tracts", "mem_parcels"]);
    assert_eq!(workspace.tables(), ["mem_tracts"]);
    assert_eq!(workspace.layers(), ["mem_parcels"]);
    assert_eq!(engine.workspace_names(), ["mem_tracts", "mem_parcels"]);
}

#[test]
fn builder_prefix_applies() {
    let workspace = Workspace::builder()
        .name_prefix("tmp_")
        .build(engine());

    let tracts = assert_ok!(workspace.add_table("C:/data/tracts.dbf"));
    assert_eq!(tracts.name(), "tmp_tracts");
}

#[test]
fn config_from_json_applies() {
    let config = assert_ok!(WorkspaceConfig::from_json(
        r#"{ "name_prefix": "", "collision_policy": "suffix" }"#
    ));
    let workspace = Workspace::builder().config(config).build(engine());

    assert_ok!(workspace.add_table("C:/data/tracts.dbf"));
    assert_ok!(workspace.add_table("C:/data/tracts.dbf"));
    assert_eq!(workspace.contents(), ["tracts", "tracts_1"]);
}

#[test]
fn load_options() {
    let workspace = Workspace::new(engine());

    let mut pop = assert_ok!(workspace.add_table_with(
        "C:/data/tracts.dbf",
        LoadOptions::new()
            .rename("tract pop")
            .limit_fields(["GEOID10", "EstTotPop16"]),
    ));

    assert_eq!(pop.name(), "mem_tract_pop");
    assert_eq!(
        assert_ok!(pop.field_mapping()).field_names(),
        ["GEOID10", "EstTotPop16"]
    );
}

#[test]
fn default_name_collision_is_rejected() {
    let engine = engine();
    let workspace = Workspace::new(engine.clone());

    assert_ok!(workspace.add_table("C:/data/tracts.dbf"));
    let err = assert_err!(workspace.add_table("C:/other/tracts.csv"));

    assert!(err.is_name_collision());
    assert_eq!(workspace.contents(), ["mem_tracts"]);
    assert_eq!(engine.workspace_names(), ["mem_tracts"]);
}

#[test]
fn default_name_collision_is_suffixed() {
    let workspace = Workspace::builder()
        .collision_policy(CollisionPolicy::Suffix)
        .build(engine());

    for _ in 0..3 {
        assert_ok!(workspace.add_table("C:/data/tracts.dbf"));
    }

    assert_eq!(
        workspace.contents(),
        ["mem_tracts", "mem_tracts_1", "mem_tracts_2"]
    );
}

#[test]
fn load_failure_wraps_engine_message() {
    let workspace = Workspace::new(engine());

    let err = assert_err!(workspace.add_table("C:/data/missing.dbf"));
    assert!(err.is_load());
    assert_eq!(
        err.to_string(),
        "failed to load `C:/data/missing.dbf`: cannot open `C:/data/missing.dbf`: no such dataset"
    );

    let err = assert_err!(workspace.add_layer("C:/data/tracts.dbf"));
    assert!(err.is_load());

    assert!(workspace.contents().is_empty());
}

#[test]
fn unusable_names_are_rejected() {
    let workspace = Workspace::new(engine());

    let err = assert_err!(workspace.add_table("C:/data/.dbf"));
    assert!(err.is_invalid_argument());

    let err = assert_err!(
        workspace.add_table_with("C:/data/tracts.dbf", LoadOptions::new().rename("  "))
    );
    assert!(err.is_invalid_argument());
}

#[test]
fn get_memory_handles() {
    let workspace = Workspace::new(engine());
    assert_ok!(workspace.add_table("C:/data/tracts.dbf"));
    assert_ok!(workspace.add_layer("C:/data/parcels.shp"));

    let tracts = assert_ok!(workspace.get_memory_table("mem_tracts"));
    assert_eq!(tracts.kind(), DatasetKind::Table);

    let parcels = assert_ok!(workspace.get_memory_layer("mem_parcels"));
    assert_eq!(parcels.kind(), DatasetKind::Layer);

    let err = assert_err!(workspace.get_memory_layer("mem_tracts"));
    assert!(err.is_not_found());

    let err = assert_err!(workspace.get_memory_table("mem_roads"));
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "not found: `mem_roads` is not registered");
}

#[test]
fn removed_dataset_leaves_dangling_handles() {
    let engine = engine();
    let workspace = Workspace::new(engine.clone());

    let mut tracts = assert_ok!(workspace.add_table("C:/data/tracts.dbf"));
    assert_ok!(workspace.remove("mem_tracts"));

    assert!(workspace.contents().is_empty());
    assert!(engine.dataset("mem_tracts").is_none());
    assert!(!tracts.is_registered());

    let err = assert_err!(tracts.field_mapping());
    assert!(err.is_dangling_handle());
    assert_eq!(
        err.to_string(),
        "dangling handle: `mem_tracts` was removed from the workspace"
    );

    assert!(assert_err!(tracts.selection().where_clause("EstTotPop16 > 0")).is_dangling_handle());
    assert!(assert_err!(tracts.export("out", "C:/out.gdb")).is_dangling_handle());
    assert!(assert_err!(tracts.joins()).is_dangling_handle());

    let err = assert_err!(workspace.remove("mem_tracts"));
    assert!(err.is_not_found());
}

#[test]
fn name_can_be_reused_after_remove() {
    let engine = engine().with_source(
        "C:/other/tracts.dbf",
        Dataset::table([("GEOID10", FieldType::Text)]).with_row([Value::from("201")]),
    );
    let workspace = Workspace::new(engine);

    let mut old = assert_ok!(workspace.add_table("C:/data/tracts.dbf"));
    assert_eq!(assert_ok!(old.field_mapping()).len(), 3);
    assert_ok!(old.selection().where_clause("EstTotPop16 > 1000"));

    assert_ok!(workspace.remove("mem_tracts"));
    let mut new = assert_ok!(workspace.add_table("C:/other/tracts.dbf"));
    assert_eq!(new.name(), "mem_tracts");
    assert_eq!(workspace.contents(), ["mem_tracts"]);

    // The old handle stays dangling even though its name is taken again.
    assert!(!old.is_registered());
    assert!(assert_err!(old.field_mapping()).is_dangling_handle());
    assert!(assert_err!(old.reload_mapping()).is_dangling_handle());
    assert!(assert_err!(old.export("out", "C:/out.gdb")).is_dangling_handle());
    assert!(assert_err!(old.export_all("out", "C:/out.gdb")).is_dangling_handle());
    assert!(assert_err!(old.selection().where_clause("GEOID10 = '201'")).is_dangling_handle());
    assert!(assert_err!(old.selection().clear()).is_dangling_handle());
    assert_none!(old.selection().state());

    // A fresh handle to the same name reaches the new dataset.
    let again = assert_ok!(workspace.get_memory_table("mem_tracts"));
    assert!(again.is_registered());
    assert_eq!(assert_ok!(new.field_mapping()).field_names(), ["GEOID10"]);
    assert_none!(again.selection().state());

    let summary = assert_ok!(new.export("out", "C:/out.gdb"));
    assert_eq!(summary.rows, 1);
}

#[test]
fn dropping_the_workspace_deletes_datasets() {
    let engine = engine();

    {
        let workspace = Workspace::new(engine.clone());
        let _tracts = assert_ok!(workspace.add_table("C:/data/tracts.dbf"));
        assert_eq!(engine.workspace_names(), ["mem_tracts"]);
    }

    assert!(engine.workspace_names().is_empty());
}

#[test]
fn handles_keep_the_workspace_alive() {
    let engine = engine();

    let tracts = {
        let workspace = Workspace::new(engine.clone());
        assert_ok!(workspace.add_table("C:/data/tracts.dbf"))
    };

    assert_eq!(engine.workspace_names(), ["mem_tracts"]);
    assert!(tracts.is_registered());

    drop(tracts);
    assert!(engine.workspace_names().is_empty());
}

#[test]
fn export_staged_schema_with_selection() {
    let engine = engine();
    let workspace = Workspace::new(engine.clone());
    let mut tracts = assert_ok!(workspace.add_table("C:/data/tracts.dbf"));

    let mapping = assert_ok!(tracts.field_mapping_mut());
    assert_ok!(mapping.reorder(&[2, 0], true));
    assert_eq!(
        mapping.current_order(),
        [(0, "EstTotPop16"), (1, "GEOID10")]
    );
    assert_ok!(mapping.rename_field("EstTotPop16", "Population"));

    let state = assert_ok!(tracts.selection().where_clause("EstTotPop16 > 1000"));
    assert_eq!(state.count(), 2);

    let summary = assert_ok!(tracts.export("tract_pop", "C:/out.gdb"));
    assert_eq!(summary.path, "C:/out.gdb/tract_pop");
    assert_eq!(summary.fields, ["Population", "GEOID10"]);
    assert_eq!(summary.rows, 2);

    let output = assert_some!(engine.output("C:/out.gdb/tract_pop"));
    assert_eq!(output.field_names(), ["Population", "GEOID10"]);
    assert_eq!(
        assert_some!(output.column_values("GEOID10")),
        [&Value::from("101"), &Value::from("103")]
    );
}

#[test]
fn export_all_ignores_selection() {
    let engine = engine();
    let workspace = Workspace::new(engine.clone());
    let mut tracts = assert_ok!(workspace.add_table("C:/data/tracts.dbf"));

    assert_ok!(tracts.selection().where_clause("Name = 'Mission'"));
    let summary = assert_ok!(tracts.export_all("all_tracts", "C:/out.gdb"));

    assert_eq!(summary.rows, 3);
    assert_eq!(summary.fields, ["GEOID10", "Name", "EstTotPop16"]);
}

#[test]
fn export_failure_keeps_mapping() {
    let workspace = Workspace::new(engine());
    let mut tracts = assert_ok!(workspace.add_table("C:/data/tracts.dbf"));
    assert_ok!(assert_ok!(tracts.field_mapping_mut()).rename_field("Name", "NhoodName"));

    let err = assert_err!(tracts.export("tract_pop", "D:/nowhere.gdb"));
    assert!(err.is_export());
    assert_eq!(
        err.to_string(),
        "failed to export `D:/nowhere.gdb/tract_pop`: output location `D:/nowhere.gdb` does not exist"
    );

    assert_eq!(
        assert_ok!(tracts.field_mapping()).field_names(),
        ["GEOID10", "NhoodName", "EstTotPop16"]
    );
}

#[test]
fn reload_mapping_discards_edits() {
    let workspace = Workspace::new(engine());
    let mut tracts = assert_ok!(workspace.add_table("C:/data/tracts.dbf"));

    assert_ok!(assert_ok!(tracts.field_mapping_mut()).drop_fields(&["Name"]));
    assert_eq!(assert_ok!(tracts.field_mapping()).len(), 2);

    let mapping = assert_ok!(tracts.reload_mapping());
    assert_eq!(mapping.field_names(), ["GEOID10", "Name", "EstTotPop16"]);
}
