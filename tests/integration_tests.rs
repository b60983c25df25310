use std::fs;
use std::path::Path;

use calamine::{Data, Reader, Xlsx, open_workbook};
use exam_rate_analyzer::config::OutputFormat;
use exam_rate_analyzer::error::PipelineError;
use exam_rate_analyzer::output::{CsvSink, XlsxSink, sink_for};
use exam_rate_analyzer::pipeline::{run_all, run_monthly, run_yearly};
use exam_rate_analyzer::report::{Cell, MONTHLY_REPORT_STEM, YEARLY_REPORT_STEM};
use exam_rate_analyzer::source::FileSource;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

const ROWS: &[(&str, &str, f64, f64)] = &[
    ("2024-01-10", "A", 66.0, 80.0),
    ("2024-01-15", "A", 66.0, 50.0),
    ("2023-12-02", "A", 66.0, 90.0),
    ("2023-12-05", "B", 70.0, 0.0),
    ("2024-03-01", "B", 70.0, 0.0),
    ("2024-05-01", "B", 70.0, 70.0),
];

#[test]
fn test_full_pipeline_xlsx_monthly() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input_xlsx(dir.path());
    let output = dir.path().join(format!("{MONTHLY_REPORT_STEM}.xlsx"));

    let table = run_monthly(&FileSource::new(&input), &XlsxSink::new(&output)).unwrap();

    assert_eq!(table.columns, vec!["A-66", "B-70"]);
    assert_eq!(table.value(0, "A-66"), Some(&Cell::Number(100.0)));
    // December only had a missed B attempt
    assert_eq!(table.value(0, "B-70"), Some(&Cell::Blank));

    let mut workbook: Xlsx<_> = open_workbook(&output).unwrap();
    let range = workbook.worksheet_range_at(0).unwrap().unwrap();
    let column: Vec<String> = (0..4)
        .map(|r| range.get_value((r, 0)).map(|d| d.to_string()).unwrap_or_default())
        .collect();
    assert_eq!(column, vec!["Month", "23-Dec", "24-Jan", "24-May"]);
    assert_eq!(range.get_value((2, 1)), Some(&Data::Float(50.0)));
    assert_eq!(range.get_value((3, 2)), Some(&Data::Float(100.0)));
}

#[test]
fn test_full_pipeline_yearly_csv() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input_csv(dir.path());
    let output = dir.path().join(format!("{YEARLY_REPORT_STEM}.csv"));

    run_yearly(&FileSource::new(&input), &CsvSink::new(&output)).unwrap();

    let content = fs::read_to_string(&output).unwrap();
    assert_eq!(
        content,
        "Year,Exam Name,Total Exams Taken,Missed Exams Count,Average Pass Point,Average Score,Pass Rate (%),Fail Rate (%)\n\
         2023,A,1,0,66.00,90.00,100.00,0.00\n\
         2023,B,0,1,,,,\n\
         2024,A,2,0,66.00,65.00,50.00,50.00\n\
         2024,B,1,1,70.00,70.00,100.00,0.00\n"
    );
}

#[test]
fn test_native_xlsx_dates_match_text_csv_dates() {
    let dir = tempfile::tempdir().unwrap();
    let from_xlsx = dir.path().join("from_xlsx.csv");
    let from_csv = dir.path().join("from_csv.csv");

    run_yearly(
        &FileSource::new(write_input_xlsx(dir.path())),
        &CsvSink::new(&from_xlsx),
    )
    .unwrap();
    run_yearly(
        &FileSource::new(write_input_csv(dir.path())),
        &CsvSink::new(&from_csv),
    )
    .unwrap();

    let content = fs::read_to_string(&from_xlsx).unwrap();
    assert!(content.contains("\n2023,B,0,1,,,,\n"));
    assert_eq!(content, fs::read_to_string(&from_csv).unwrap());
}

#[test]
fn test_run_all_failed_yearly_write_leaves_no_monthly_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input_csv(dir.path());
    let monthly = dir.path().join(format!("{MONTHLY_REPORT_STEM}.csv"));
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, b"not a directory").unwrap();

    let err = run_all(
        &FileSource::new(&input),
        &CsvSink::new(&monthly),
        &CsvSink::new(blocker.join(format!("{YEARLY_REPORT_STEM}.csv"))),
    )
    .unwrap_err();

    assert!(matches!(err, PipelineError::Write(_)));
    assert!(!monthly.exists());
    assert!(!dir.path().join(format!("{MONTHLY_REPORT_STEM}.csv.tmp")).exists());
}

#[test]
fn test_run_all_writes_both_reports() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input_xlsx(dir.path());
    let out = dir.path().join("reports");

    let monthly = sink_for(OutputFormat::Xlsx, &out, MONTHLY_REPORT_STEM);
    let yearly = sink_for(OutputFormat::Xlsx, &out, YEARLY_REPORT_STEM);
    run_all(&FileSource::new(&input), monthly.as_ref(), yearly.as_ref()).unwrap();

    assert!(out.join("monthly_pass_rates_by_exam_type.xlsx").exists());
    assert!(out.join("exam_analysis_results.xlsx").exists());
}

#[test]
fn test_identical_input_gives_identical_csv() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input_xlsx(dir.path());
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");

    run_monthly(&FileSource::new(&input), &CsvSink::new(&first)).unwrap();
    run_monthly(&FileSource::new(&input), &CsvSink::new(&second)).unwrap();

    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn test_bad_input_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("exams.csv");
    fs::write(
        &input,
        "exam_date,exam_name,pass_point_percentage,result_percentage\n\
         2024-01-10,A,66,80\n\
         2024-01-11,A,sixty,80\n",
    )
    .unwrap();
    let output = dir.path().join(format!("{MONTHLY_REPORT_STEM}.xlsx"));

    let err = run_monthly(&FileSource::new(&input), &XlsxSink::new(&output)).unwrap_err();

    assert!(matches!(err, PipelineError::Normalize(_)));
    assert!(err.to_string().contains("row 3"));
    assert!(err.to_string().contains("sixty"));
    assert!(!output.exists());
}

#[test]
fn test_missing_input_is_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.xlsx");

    let err = run_monthly(
        &FileSource::new(dir.path().join("absent.xlsx")),
        &XlsxSink::new(&output),
    )
    .unwrap_err();

    assert!(matches!(err, PipelineError::Load(_)));
    assert!(!output.exists());
}

fn write_input_xlsx(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("exams.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, name) in [
        "exam_date",
        "exam_name",
        "pass_point_percentage",
        "result_percentage",
        "comment",
    ]
    .iter()
    .enumerate()
    {
        sheet.write_string(0, col as u16, *name).unwrap();
    }

    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    for (i, (date, name, pass_point, result)) in ROWS.iter().enumerate() {
        let row = i as u32 + 1;
        sheet
            .write_datetime_with_format(row, 0, &excel_date(date), &date_format)
            .unwrap();
        sheet.write_string(row, 1, *name).unwrap();
        sheet.write_number(row, 2, *pass_point).unwrap();
        sheet.write_number(row, 3, *result).unwrap();
        sheet.write_string(row, 4, "ignored").unwrap();
    }

    workbook.save(&path).unwrap();
    path
}

fn excel_date(text: &str) -> ExcelDateTime {
    let mut parts = text.split('-').map(|p| p.parse::<u16>().unwrap());
    let (y, m, d) = (
        parts.next().unwrap(),
        parts.next().unwrap(),
        parts.next().unwrap(),
    );
    ExcelDateTime::from_ymd(y, m as u8, d as u8).unwrap()
}

fn write_input_csv(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("exams.csv");
    let mut content = String::from("exam_date,exam_name,pass_point_percentage,result_percentage\n");
    for (date, name, pass_point, result) in ROWS {
        content.push_str(&format!("{date},{name},{pass_point},{result}\n"));
    }
    fs::write(&path, content).unwrap();
    path
}
