use std::io::Cursor;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use sheet_mapper::ingestion::{CsvSource, RowSource};
use sheet_mapper::{Fields, MappingError, Processor, Record};

fn tmp_file(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("sheet-mapper-{name}-{nanos}.csv"))
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Reading {
    station: String,
    celsius: f64,
    valid: bool,
}

impl Record for Reading {
    fn describe(fields: &mut Fields<Self>) {
        fields
            .field("station", "name(Station);unique(true)", |r| &mut r.station)
            .field("celsius", "name(Temperature)", |r| &mut r.celsius)
            .field("valid", "name(Valid)", |r| &mut r.valid);
    }
}

#[test]
fn csv_rows_flow_through_the_processor() {
    let data = "\
Weather export,,
Station,Temperature,Valid
\"Oslo, Blindern\",-3.5,true
Bergen, 7 ,1
Tromso,,0
";
    let processor = Processor::new(Reading::default(), false).unwrap();
    let report = processor
        .parse(CsvSource::from_reader(Cursor::new(data)), 2, 3)
        .unwrap();

    assert!(!report.has_error(), "{:?}", report.errors());
    assert_eq!(
        report.records(),
        [
            Reading {
                station: "Oslo, Blindern".into(),
                celsius: -3.5,
                valid: true,
            },
            Reading {
                station: "Bergen".into(),
                celsius: 7.0,
                valid: true,
            },
            Reading {
                station: "Tromso".into(),
                celsius: 0.0,
                valid: false,
            },
        ]
    );
}

#[test]
fn csv_row_errors_use_sheet_row_numbers() {
    let data = "Station,Temperature,Valid\nOslo,warm,yes\nOslo,1,true\n";
    let processor = Processor::new(Reading::default(), false).unwrap();
    let report = processor
        .parse(CsvSource::from_reader(Cursor::new(data)), 1, 2)
        .unwrap();

    assert_eq!(
        report.row_errors(2).unwrap(),
        [
            "Station[Oslo] duplicate",
            "Temperature cell contains illegal input, expected a floating point value",
            "Valid cell contains illegal input, expected a boolean value",
        ]
    );
    assert_eq!(report.row_errors(3).unwrap(), ["Station[Oslo] duplicate"]);
    assert!(report.records().is_empty());
}

#[test]
fn csv_from_path_with_semicolons() {
    let path = tmp_file("semicolon");
    std::fs::write(&path, "Station;Temperature;Valid\nOslo;1.25;true\n").unwrap();

    let source = CsvSource::from_path(&path).with_delimiter(b';');
    assert_eq!(source.label(), path.display().to_string());

    let report = Processor::new(Reading::default(), false)
        .unwrap()
        .parse(source, 1, 2)
        .unwrap();
    assert_eq!(report.records()[0].celsius, 1.25);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn missing_csv_file_is_fatal() {
    let err = Processor::new(Reading::default(), false)
        .unwrap()
        .parse(CsvSource::from_path("tests/fixtures/does_not_exist.csv"), 1, 2)
        .unwrap_err();
    assert!(matches!(err, MappingError::Csv(_)));
}
