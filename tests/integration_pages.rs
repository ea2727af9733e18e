//! End-to-end tests driving the full public surface: dynamic values in,
//! encoded pages out, decoded back through `PageView`.

use dynpage::{
    BufferedPageWriter, BuilderOptions, ColumnOption, ColumnType, DynamicPageBuilder,
    DynamicValue, MemorySink, PageView, Schema,
};

// 2020-01-02T03:04:05Z
const TS_MICROS: i64 = 1_577_934_245_000_000;

fn full_schema() -> Schema {
    Schema::new(vec![
        ("active", ColumnType::Bool),
        ("id", ColumnType::Long),
        ("score", ColumnType::Double),
        ("created", ColumnType::Timestamp),
        ("name", ColumnType::Text),
        ("payload", ColumnType::Json),
    ])
    .unwrap()
}

fn open(
    schema: &Schema,
    options: &BuilderOptions,
) -> (
    DynamicPageBuilder<BufferedPageWriter<MemorySink>>,
    MemorySink,
) {
    let sink = MemorySink::new();
    let writer = BufferedPageWriter::new(schema.clone(), sink.clone());
    let builder = DynamicPageBuilder::new(schema.clone(), options, writer).unwrap();
    (builder, sink)
}

#[test]
fn mixed_type_records_survive_a_full_round_trip() {
    let schema = full_schema();
    let (mut builder, sink) = open(&schema, &BuilderOptions::default());

    // every field arrives as text, the way a delimited-file parser hands them over
    builder
        .set_record(&[
            DynamicValue::from("true"),
            DynamicValue::from(" 42 "),
            DynamicValue::from("3.5"),
            DynamicValue::from("2020-01-02 03:04:05.000000"),
            DynamicValue::from("alice"),
            DynamicValue::from(r#"{"k":[1,2]}"#),
        ])
        .unwrap();

    // and again with native types
    builder
        .set_record(&[
            DynamicValue::Bool(false),
            DynamicValue::Long(7),
            DynamicValue::Double(0.25),
            DynamicValue::timestamp_micros(TS_MICROS),
            DynamicValue::from("bob"),
            DynamicValue::Json(serde_json::json!({"k": null})),
        ])
        .unwrap();

    builder.finish().unwrap();
    builder.close().unwrap();

    let pages = sink.collected();
    assert_eq!(pages.len(), 1);
    let view = PageView::new(pages[0].bytes(), &schema).unwrap();
    assert_eq!(view.record_count(), 2);

    let first = view.record(0).unwrap();
    assert!(first.get_bool(0).unwrap());
    assert_eq!(first.get_long(1).unwrap(), 42);
    assert_eq!(first.get_double(2).unwrap(), 3.5);
    assert_eq!(first.get_timestamp(3).unwrap(), TS_MICROS);
    assert_eq!(first.get_text(4).unwrap(), "alice");
    assert_eq!(
        first.get_json(5).unwrap(),
        serde_json::json!({"k": [1, 2]})
    );

    let second = view.record(1).unwrap();
    assert!(!second.get_bool(0).unwrap());
    assert_eq!(second.get_long(1).unwrap(), 7);
    assert_eq!(second.get_timestamp(3).unwrap(), TS_MICROS);
    assert_eq!(second.get_json(5).unwrap(), serde_json::json!({"k": null}));
}

#[test]
fn timestamps_render_into_text_columns_with_the_column_policy() {
    let schema = Schema::new(vec![("stamp", ColumnType::Text)]).unwrap();
    let options = BuilderOptions::default().with_column_option(
        "stamp",
        ColumnOption {
            timestamp_format: Some("%Y/%m/%d".to_string()),
            ..Default::default()
        },
    );
    let (mut builder, sink) = open(&schema, &options);

    builder
        .column_by_name("stamp")
        .unwrap()
        .set(&DynamicValue::timestamp_micros(TS_MICROS))
        .unwrap();
    builder.add_record().unwrap();
    builder.finish().unwrap();

    let pages = sink.collected();
    let view = PageView::new(pages[0].bytes(), &schema).unwrap();
    assert_eq!(view.record(0).unwrap().get_text(0).unwrap(), "2020/01/02");
}

#[test]
fn record_budget_splits_the_stream_across_pages() {
    let schema = Schema::new(vec![("id", ColumnType::Long)]).unwrap();
    let sink = MemorySink::new();
    let writer = BufferedPageWriter::with_budgets(schema.clone(), sink.clone(), 3, usize::MAX);
    let mut builder =
        DynamicPageBuilder::new(schema.clone(), &BuilderOptions::default(), writer).unwrap();

    for i in 0..10 {
        builder.set_record(&[DynamicValue::Long(i)]).unwrap();
    }
    builder.finish().unwrap();

    let pages = sink.collected();
    let counts: Vec<u32> = pages.iter().map(|p| p.record_count()).collect();
    assert_eq!(counts, vec![3, 3, 3, 1]);

    // record identity is preserved across the page boundary
    let mut seen = Vec::new();
    for page in &pages {
        let view = PageView::new(page.bytes(), &schema).unwrap();
        for record in view.records() {
            seen.push(record.get_long(0).unwrap());
        }
    }
    assert_eq!(seen, (0..10).collect::<Vec<i64>>());
}

#[test]
fn unknown_fields_skip_cleanly_while_known_fields_land() {
    let schema = Schema::new(vec![
        ("id", ColumnType::Long),
        ("name", ColumnType::Text),
    ])
    .unwrap();
    let (mut builder, sink) = open(&schema, &BuilderOptions::default());

    let input = [
        ("id", DynamicValue::Long(1)),
        ("comment", DynamicValue::from("not in the schema")),
        ("name", DynamicValue::from("carol")),
        ("ratio", DynamicValue::Double(0.5)),
    ];
    for (field, value) in &input {
        builder
            .column_or_skip_by_name(field)
            .unwrap()
            .set(value)
            .unwrap();
    }
    builder.add_record().unwrap();
    builder.finish().unwrap();

    let pages = sink.collected();
    let view = PageView::new(pages[0].bytes(), &schema).unwrap();
    let record = view.record(0).unwrap();
    assert_eq!(record.get_long(0).unwrap(), 1);
    assert_eq!(record.get_text(1).unwrap(), "carol");
}

#[test]
fn coercion_failures_name_the_column_and_leave_the_builder_closable() {
    let schema = Schema::new(vec![("id", ColumnType::Long)]).unwrap();
    let (mut builder, _sink) = open(&schema, &BuilderOptions::default());

    let err = builder
        .column_by_name("id")
        .unwrap()
        .set(&DynamicValue::from("twelve"))
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("id"), "{message}");
    assert!(message.contains("twelve"), "{message}");

    builder.close().unwrap();
    builder.close().unwrap();
}

#[test]
fn builder_default_timezone_shifts_naive_timestamps() {
    let schema = Schema::new(vec![("ts", ColumnType::Timestamp)]).unwrap();
    let options = BuilderOptions::default().with_default_timezone("-07:00");
    let (mut builder, sink) = open(&schema, &options);

    builder
        .set_record(&[DynamicValue::from("2020-01-02 03:04:05.000000")])
        .unwrap();
    builder.finish().unwrap();

    let pages = sink.collected();
    let view = PageView::new(pages[0].bytes(), &schema).unwrap();
    assert_eq!(
        view.record(0).unwrap().get_timestamp(0).unwrap(),
        TS_MICROS + 7 * 3600 * 1_000_000
    );
}
