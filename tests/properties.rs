mod common;

use datalink_ingest::{
    DataStream, Schema, SchemaInferer, StreamConfig, Value, data::parse_decimal,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

use common::midnight;

fn header_strategy() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[A-Za-z_ ]{1,10}", 1..8)
}

proptest! {
    #[test]
    fn inference_is_idempotent(header in header_strategy(), other in header_strategy()) {
        let mut inferer = SchemaInferer::new();
        let first = inferer.infer(&header).clone();
        let second = inferer.infer(&other).clone();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.field_count(), header.len());
    }

    #[test]
    fn first_temporal_keyword_wins(prefix in proptest::collection::vec("[a-c]{1,4}", 0..5)) {
        let mut header = prefix.clone();
        header.push("Year".to_string());
        header.push("date".to_string());
        let schema = Schema::from_header(&header);
        let temporal = schema.temporal().expect("temporal column");
        prop_assert_eq!(temporal.index, prefix.len());
    }

    #[test]
    fn short_lines_never_fail_without_a_temporal_column(
        header in proptest::collection::vec("[a-c]{1,4}", 1..8),
        cells in proptest::collection::vec("[0-9]{0,4}", 0..10),
    ) {
        let fallback = midnight(2020, 1, 1);
        let mut stream = DataStream::new("P", StreamConfig::default());
        stream.feed(&header, fallback).expect("header");
        let record = stream
            .feed(&cells, fallback)
            .expect("data line")
            .into_record()
            .expect("record");
        prop_assert_eq!(record.time, fallback);
        for value in record.fields.values() {
            prop_assert!(value.is_number());
        }
    }

    #[test]
    fn integers_and_exponents_parse_as_numbers(mantissa in -1_000_000i64..1_000_000, exp in 0u32..6) {
        let plain = mantissa.to_string();
        prop_assert_eq!(parse_decimal(&plain), Some(Decimal::from(mantissa)));
        let scientific = format!("{mantissa}e{exp}");
        let expected = Decimal::from(mantissa) * Decimal::from(10i64.pow(exp));
        prop_assert_eq!(Value::from_token(&scientific), Value::Number(expected));
    }

    #[test]
    fn double_precision_exponent_forms_stay_numeric(
        lead in 1u8..10,
        fraction in "[0-9]{16}",
        exp in -20i32..=-10,
    ) {
        let raw = format!("{lead}.{fraction}e{exp}");
        let parsed = parse_decimal(&raw);
        prop_assert!(parsed.is_some_and(|d| d > Decimal::ZERO), "{} -> {:?}", raw, parsed);
        prop_assert!(Value::from_token(&raw).is_number());
    }
}
