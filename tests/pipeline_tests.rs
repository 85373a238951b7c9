//! Pipeline tests: registry → sheet store → mapping table → normalizer → images

use pretty_assertions::assert_eq;
use sheetmap::config::AttributeSpec;
use sheetmap::core::images::normalize_with_images;
use sheetmap::core::{
    attach_images, normalize, normalize_unchecked, AttributeRegistry, ImageAttachments, MappingTable,
    SheetStore,
};
use sheetmap::error::ImportError;
use sheetmap::types::{
    Attribute, CellValue, FileHandle, MappingPair, OutputValue, RowRecord, Sheet, Workbook,
};

fn row(cells: &[(&str, CellValue)]) -> RowRecord {
    cells.iter().map(|(k, v)| (*k, v.clone())).collect()
}

fn text(s: &str) -> CellValue {
    CellValue::Text(s.to_string())
}

fn cell(value: CellValue) -> OutputValue {
    OutputValue::Cell(value)
}

fn people() -> Sheet {
    Sheet::new(
        "People",
        vec![
            row(&[("NAME", text("Ann")), ("AGE", CellValue::Int(30))]),
            row(&[("NAME", text("Bob")), ("AGE", CellValue::Int(41))]),
        ],
    )
}

// ═══════════════════════════════════════════════════════════════════════════
// ATTRIBUTE REGISTRY
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_registry_keeps_all_unique_attributes() {
    let specs = vec![
        AttributeSpec::new("name", "Name"),
        AttributeSpec::new("age", "Age"),
        AttributeSpec::image("photo", "Photo"),
    ];
    let registry = AttributeRegistry::from_specs(&specs);
    assert_eq!(registry.attributes().len(), specs.len());
}

#[test]
fn test_registry_drops_duplicates_keeping_first() {
    let specs = vec![
        AttributeSpec::new("name", "Name"),
        AttributeSpec::new("name", "Other Name"),
        AttributeSpec::new("age", "Age"),
    ];
    let registry = AttributeRegistry::from_specs(&specs);
    assert!(registry.attributes().len() < specs.len());
    assert_eq!(registry.by_value_key("name").unwrap().title, "Name");
}

#[test]
fn test_registry_is_image_defaults_to_false() {
    let registry = AttributeRegistry::from_specs(&[AttributeSpec::new("name", "Name")]);
    assert!(!registry.attributes()[0].is_image);
}

// ═══════════════════════════════════════════════════════════════════════════
// SHEET STORE
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_store_rejects_workbook_without_sheets() {
    let mut store = SheetStore::new();
    let result = store.load(Workbook::new(vec![]), true);
    assert!(matches!(result, Err(ImportError::InvalidFile(_))));
}

#[test]
fn test_store_rejects_empty_first_sheet() {
    let mut store = SheetStore::new();
    let workbook = Workbook::new(vec![Sheet::new("Empty", vec![]), people()]);
    assert!(matches!(
        store.load(workbook, true),
        Err(ImportError::EmptyContent)
    ));
}

#[test]
fn test_store_load_resets_selection() {
    let mut store = SheetStore::new();
    store
        .load(Workbook::new(vec![people(), people()]), true)
        .unwrap();
    store.select_sheet(1).unwrap();

    store.load(Workbook::new(vec![people()]), true).unwrap();
    assert_eq!(store.selected_index(), 0);
    assert_eq!(store.row_count(), 2);
}

// ═══════════════════════════════════════════════════════════════════════════
// MAPPING TABLE
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_mapping_preselects_title_then_value_key() {
    let registry = AttributeRegistry::from_specs(&[
        AttributeSpec::new("name", "NAME"),
        AttributeSpec::new("AGE", "Age in years"),
    ]);
    let table = MappingTable::build(&people(), &registry, true);

    assert_eq!(table.selection("NAME"), Some("name"));
    assert_eq!(table.selection("AGE"), Some("AGE"));
}

#[test]
fn test_mapping_no_preselection_without_header() {
    let registry = AttributeRegistry::from_specs(&[AttributeSpec::new("name", "NAME")]);
    let table = MappingTable::build(&people(), &registry, false);
    assert!(!table.has_associations());
}

#[test]
fn test_mapping_to_pairs_skips_none() {
    let registry = AttributeRegistry::from_specs(&[
        AttributeSpec::new("name", "Name"),
        AttributeSpec::new("age", "Age"),
    ]);
    let mut table = MappingTable::build(&people(), &registry, true);
    table.set_mapping("AGE", Some("age"), &registry).unwrap();
    table.set_mapping("AGE", None, &registry).unwrap();
    table.set_mapping("NAME", Some("name"), &registry).unwrap();

    assert_eq!(table.to_pairs(), vec![MappingPair::new("NAME", "name")]);
}

// ═══════════════════════════════════════════════════════════════════════════
// NORMALIZER
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_normalize_scenario_unmapped_attribute_is_null() {
    let sheet = Sheet::new(
        "S",
        vec![row(&[("NAME", text("Ann")), ("AGE", CellValue::Int(30))])],
    );
    let attributes = vec![Attribute::new("name", "Name"), Attribute::new("age", "Age")];
    let records = normalize(&sheet, &[MappingPair::new("NAME", "name")], &attributes).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("name"), Some(&cell(text("Ann"))));
    assert_eq!(records[0].get("age"), Some(&OutputValue::Null));
    assert!(!records[0].contains_key("NAME"));
    assert!(!records[0].contains_key("AGE"));
}

#[test]
fn test_normalize_later_duplicate_mapping_wins() {
    let sheet = Sheet::new(
        "S",
        vec![row(&[("COL1", text("first")), ("COL2", text("second"))])],
    );
    let mapping = vec![MappingPair::new("COL1", "x"), MappingPair::new("COL2", "x")];
    let records = normalize(&sheet, &mapping, &[Attribute::new("x", "X")]).unwrap();

    assert_eq!(records[0].get("x"), Some(&cell(text("second"))));
    assert_eq!(records[0].len(), 1);
}

#[test]
fn test_normalize_empty_mapping_fails() {
    let result = normalize(&people(), &[], &[Attribute::new("name", "Name")]);
    assert!(matches!(result, Err(ImportError::NoAttributeAssociated)));
}

#[test]
fn test_normalize_is_idempotent() {
    let attributes = vec![Attribute::new("name", "Name"), Attribute::new("age", "Age")];
    let mapping = vec![MappingPair::new("NAME", "name")];
    let sheet = people();

    let first = normalize(&sheet, &mapping, &attributes).unwrap();
    let second = normalize(&sheet, &mapping, &attributes).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_normalize_preserves_row_order_one_to_one() {
    let attributes = vec![Attribute::new("name", "Name")];
    let records = normalize(&people(), &[MappingPair::new("NAME", "name")], &attributes).unwrap();

    let names: Vec<String> = records
        .iter()
        .map(|r| r.get("name").unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Ann", "Bob"]);
}

#[test]
fn test_normalize_never_fills_image_attributes() {
    let attributes = vec![Attribute::new("name", "Name"), Attribute::image("photo", "Photo")];
    let records = normalize(&people(), &[MappingPair::new("NAME", "name")], &attributes).unwrap();
    assert!(records.iter().all(|r| !r.contains_key("photo")));
}

#[test]
fn test_normalize_output_follows_registry_order() {
    let attributes = vec![Attribute::new("age", "Age"), Attribute::new("name", "Name")];
    let mapping = vec![MappingPair::new("NAME", "name"), MappingPair::new("AGE", "age")];
    let records = normalize(&people(), &mapping, &attributes).unwrap();

    let keys: Vec<&str> = records[0].keys().collect();
    assert_eq!(keys, vec!["age", "name"]);
}

// ═══════════════════════════════════════════════════════════════════════════
// IMAGE ATTACHMENT
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_images_missing_everywhere_is_not_an_error() {
    let attributes = vec![Attribute::new("name", "Name"), Attribute::image("photo", "Photo")];
    let records = normalize_with_images(
        &people(),
        &[MappingPair::new("NAME", "name")],
        &attributes,
        &ImageAttachments::new(),
    )
    .unwrap();

    assert_eq!(records.len(), 2);
    assert!(records
        .iter()
        .all(|r| r.get("photo") == Some(&OutputValue::Null)));
}

#[test]
fn test_images_all_null_fails() {
    let sheet = Sheet::new(
        "S",
        vec![row(&[("NAME", CellValue::Empty)]), row(&[("NAME", CellValue::Empty)])],
    );
    let attributes = vec![Attribute::new("name", "Name"), Attribute::image("photo", "Photo")];
    let records = normalize(&sheet, &[MappingPair::new("NAME", "name")], &attributes).unwrap();

    let result = attach_images(records, &attributes, &ImageAttachments::new());
    assert!(matches!(result, Err(ImportError::NoDataProcessed)));
}

#[test]
fn test_images_without_mapping_attach_to_image_only_registry() {
    let attributes = vec![Attribute::image("photo", "Photo")];
    let mut images = ImageAttachments::new();
    images.attach(0, "photo", FileHandle::new("ann.png", "/tmp/ann.png", 3));

    let records = normalize_with_images(&people(), &[], &attributes, &images).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].keys().collect::<Vec<_>>(), vec!["photo"]);
    assert!(records[0].get("photo").unwrap().as_file().is_some());
    assert_eq!(records[1].get("photo"), Some(&OutputValue::Null));
}

#[test]
fn test_images_without_mapping_or_files_is_no_data() {
    let attributes = vec![Attribute::new("age", "Age"), Attribute::image("photo", "Photo")];
    let records = normalize_unchecked(&people(), &[], &attributes);
    assert_eq!(records.len(), 2);

    let result = attach_images(records, &attributes, &ImageAttachments::new());
    assert!(matches!(result, Err(ImportError::NoDataProcessed)));
}

#[test]
fn test_images_attached_by_row() {
    let attributes = vec![Attribute::new("name", "Name"), Attribute::image("photo", "Photo")];
    let records = normalize(&people(), &[MappingPair::new("NAME", "name")], &attributes).unwrap();

    let mut images = ImageAttachments::new();
    images.attach(1, "photo", FileHandle::new("bob.png", "/tmp/bob.png", 12));
    let records = attach_images(records, &attributes, &images).unwrap();

    assert_eq!(records[0].get("photo"), Some(&OutputValue::Null));
    assert_eq!(
        records[1].get("photo").and_then(OutputValue::as_file).map(|f| f.name.as_str()),
        Some("bob.png")
    );
}

#[test]
fn test_images_from_closure_source() {
    let attributes = vec![Attribute::new("name", "Name"), Attribute::image("photo", "Photo")];
    let records = normalize(&people(), &[MappingPair::new("NAME", "name")], &attributes).unwrap();

    let source = |row: usize, _attr: &str| Some(FileHandle::new(format!("{row}.png"), "/tmp/x", 1));
    let records = attach_images(records, &attributes, &source).unwrap();
    assert!(records.iter().all(|r| r.get("photo").unwrap().as_file().is_some()));
}
