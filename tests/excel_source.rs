#![cfg(feature = "excel_test_writer")]

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use sheet_mapper::ingestion::{
    ReadOptions, SheetSelection, WorkbookSource, read_workbook_bytes, read_workbook_path,
};
use sheet_mapper::{Fields, MappingError, Processor, Record};

fn tmp_file(name: &str, ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("sheet-mapper-{name}-{nanos}.{ext}"))
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Item {
    sku: String,
    qty: u32,
    price: f64,
    active: bool,
    state: i32,
}

impl Record for Item {
    fn describe(fields: &mut Fields<Self>) {
        fields
            .field("sku", "name(SKU);unique(true)", |i| &mut i.sku)
            .field("qty", "name(Qty)", |i| &mut i.qty)
            .field("price", "name(Price)", |i| &mut i.price)
            .field("active", "name(Active)", |i| &mut i.active)
            .field("state", "name(State);mapping(open:1,closed:2)", |i| &mut i.state);
    }
}

fn inventory_workbook() -> rust_xlsxwriter::Workbook {
    use rust_xlsxwriter::Workbook;

    let mut wb = Workbook::new();

    let notes = wb.add_worksheet();
    notes.set_name("Notes").unwrap();
    notes.write_string(0, 0, "exported by the warehouse tool").unwrap();

    let ws = wb.add_worksheet();
    ws.set_name("Inventory").unwrap();
    // Table starts at B2.
    ws.write_string(1, 1, "SKU").unwrap();
    ws.write_string(1, 2, "Qty").unwrap();
    ws.write_string(1, 3, "Price").unwrap();
    ws.write_string(1, 4, "Active").unwrap();
    ws.write_string(1, 5, "State").unwrap();

    ws.write_string(2, 1, "A-100").unwrap();
    ws.write_number(2, 2, 12).unwrap();
    ws.write_number(2, 3, 9.75).unwrap();
    ws.write_boolean(2, 4, true).unwrap();
    ws.write_string(2, 5, "open").unwrap();

    ws.write_string(3, 1, "A-200").unwrap();
    ws.write_number(3, 2, -1).unwrap();
    ws.write_number(3, 3, 3).unwrap();
    ws.write_boolean(3, 4, false).unwrap();
    ws.write_string(3, 5, "lost").unwrap();

    ws.write_string(4, 1, " A-300 ").unwrap();
    ws.write_string(4, 2, "4").unwrap();

    wb
}

fn inventory_options() -> ReadOptions {
    ReadOptions {
        sheet: SheetSelection::Named("Inventory".into()),
        ..Default::default()
    }
}

#[test]
fn workbook_rows_are_rebased_to_a1() {
    let path = tmp_file("rebased", "xlsx");
    inventory_workbook().save(&path).unwrap();

    let rows = read_workbook_path(&path, &inventory_options()).unwrap();
    assert_eq!(rows[0], Vec::<String>::new());
    assert_eq!(rows[1], vec!["", "SKU", "Qty", "Price", "Active", "State"]);
    assert_eq!(rows[2], vec!["", "A-100", "12", "9.75", "TRUE", "open"]);
    assert_eq!(rows[4], vec!["", " A-300 ", "4"]);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn workbook_parse_end_to_end() {
    let path = tmp_file("inventory", "xlsx");
    inventory_workbook().save(&path).unwrap();

    let processor = Processor::new(Item::default(), false).unwrap();
    let source = WorkbookSource::from_path(&path).with_options(inventory_options());
    let report = processor.parse(source, 2, 3).unwrap();

    assert_eq!(report.data_rows(), 3);
    assert_eq!(
        report.row_errors(4).unwrap(),
        [
            "Qty cell contains illegal input, expected an unsigned integer value",
            "State cell contains illegal input",
        ]
    );
    assert_eq!(
        report.records(),
        [
            Item {
                sku: "A-100".into(),
                qty: 12,
                price: 9.75,
                active: true,
                state: 1,
            },
            Item {
                sku: "A-300".into(),
                qty: 4,
                ..Item::default()
            },
        ]
    );

    let _ = std::fs::remove_file(&path);
}

#[test]
fn first_sheet_is_the_default() {
    let bytes = inventory_workbook().save_to_buffer().unwrap();
    let rows = read_workbook_bytes(bytes, &ReadOptions::default()).unwrap();
    assert_eq!(rows, vec![vec!["exported by the warehouse tool".to_string()]]);
}

#[test]
fn uploads_are_read_from_memory() {
    let bytes = inventory_workbook().save_to_buffer().unwrap();
    let processor = Processor::new(Item::default(), false).unwrap();
    let source = WorkbookSource::from_upload("inventory.XLSX", bytes).with_options(inventory_options());
    let report = processor.parse(source, 2, 3).unwrap();
    assert_eq!(report.records().len(), 2);
}

#[test]
fn missing_sheet_is_fatal() {
    let bytes = inventory_workbook().save_to_buffer().unwrap();
    let options = ReadOptions {
        sheet: SheetSelection::Named("Archive".into()),
        ..Default::default()
    };
    let err = read_workbook_bytes(bytes, &options).unwrap_err();
    assert!(matches!(err, MappingError::MissingSheet { ref sheet } if sheet == "Archive"));
}

#[test]
fn wrong_extension_is_refused_before_reading() {
    let path = tmp_file("renamed", "ods");
    inventory_workbook().save(&path).unwrap();

    let err = read_workbook_path(&path, &ReadOptions::default()).unwrap_err();
    assert!(matches!(err, MappingError::Admission { .. }));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn size_limit_applies_to_files_on_disk() {
    let path = tmp_file("limited", "xlsx");
    inventory_workbook().save(&path).unwrap();

    let options = ReadOptions {
        max_upload_bytes: Some(64),
        ..inventory_options()
    };
    let err = read_workbook_path(&path, &options).unwrap_err();
    assert!(matches!(err, MappingError::Admission { .. }));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn corrupt_workbook_is_an_excel_error() {
    let err = read_workbook_bytes(b"not a workbook".to_vec(), &ReadOptions::default()).unwrap_err();
    assert!(matches!(err, MappingError::Excel(_)));
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Milestone {
    name: String,
    start: String,
    review: Option<String>,
}

impl Record for Milestone {
    fn describe(fields: &mut Fields<Self>) {
        fields
            .field("name", "name(名称)", |m| &mut m.name)
            .field("start", "name(开始时间);date(01-02-06,2006-01-02)", |m| &mut m.start)
            .field(
                "review",
                "name(评审);date(01-02-06 15:04,2006-01-02 15:04:05)",
                |m| &mut m.review,
            );
    }
}

#[test]
fn date_cells_render_as_the_sheet_shows_them() {
    use rust_xlsxwriter::{Format, Workbook};

    let short_date = Format::new().set_num_format_index(14);
    let short_datetime = Format::new().set_num_format_index(22);

    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.write_string(0, 0, "名称").unwrap();
    ws.write_string(0, 1, "开始时间").unwrap();
    ws.write_string(0, 2, "评审").unwrap();
    ws.write_string(1, 0, "Apollo").unwrap();
    // 2024-01-15, and the same day at noon.
    ws.write_number_with_format(1, 1, 45306.0, &short_date).unwrap();
    ws.write_number_with_format(1, 2, 45306.5, &short_datetime).unwrap();
    let bytes = wb.save_to_buffer().unwrap();

    let rows = read_workbook_bytes(bytes.clone(), &ReadOptions::default()).unwrap();
    assert_eq!(rows[1], vec!["Apollo", "01-15-24", "01-15-24 12:00"]);

    let processor = Processor::new(Milestone::default(), false).unwrap();
    let report = processor
        .parse(WorkbookSource::from_upload("plan.xlsx", bytes.clone()), 1, 2)
        .unwrap();
    assert!(!report.has_error(), "{:?}", report.errors());
    assert_eq!(
        report.records(),
        [Milestone {
            name: "Apollo".into(),
            start: "2024-01-15".into(),
            review: Some("2024-01-15 12:00:00".into()),
        }]
    );

    let iso = ReadOptions {
        date_cell_format: "%Y/%m/%d".into(),
        ..Default::default()
    };
    let rows = read_workbook_bytes(bytes, &iso).unwrap();
    assert_eq!(rows[1][1], "2024/01/15");
}
