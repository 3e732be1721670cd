//! Readers built from an older schema accept payloads from a newer one.

use msgbuf_conformance::evolution::{
    ClickV1, ClickV2, EventV1, EventV2, LogV1, LogV2, RecordV1, RecordV2, ScrollV2,
};
use msgbuf_runtime::{BinaryMessage, DataWriter, JsonMessage};
use serde_json::json;

fn record_v1() -> RecordV1 {
    let mut record = RecordV1::new();
    record.set_id(17).set_name("seventeen");
    record
}

fn record_v2() -> RecordV2 {
    let mut record = RecordV2::new();
    record.set_id(17).set_name("seventeen").set_note("added later");
    record
}

#[test]
fn unknown_tags_are_skipped() {
    let decoded = RecordV1::from_bytes(&record_v2().to_bytes()).unwrap();
    assert_eq!(decoded, Some(record_v1()));
}

#[test]
fn unknown_properties_are_skipped() {
    let decoded = RecordV1::from_json_value(record_v2().to_json_value()).unwrap();
    assert_eq!(decoded, Some(record_v1()));

    let decoded = RecordV1::from_json_value(json!({
        "id": 17,
        "extra": { "nested": [1, 2, { "deep": null }] },
        "name": "seventeen"
    }))
    .unwrap();
    assert_eq!(decoded, Some(record_v1()));
}

#[test]
fn appended_fields_of_every_kind_are_skipped() {
    let mut writer = DataWriter::new();
    writer.begin_object();
    writer.name(RecordV1::ID_TAG);
    writer.write_long(17);
    writer.name(RecordV1::NAME_TAG);
    writer.write_string("seventeen");
    writer.name(40);
    writer.write_double(1.5);
    writer.name(41);
    writer.begin_object();
    writer.name(1);
    writer.write_fixed_int(9);
    writer.end_object();
    writer.name(42);
    writer.begin_array(msgbuf_runtime::DataType::String, 2);
    writer.write_string("a");
    writer.write_string("b");
    writer.end_array();
    writer.end_object();

    let decoded = RecordV1::from_bytes(&writer.into_bytes()).unwrap();
    assert_eq!(decoded, Some(record_v1()));
}

#[test]
fn unknown_discriminators_read_as_absent() {
    let mut scroll = ScrollV2::new();
    scroll.set_delta(-3);
    let event = EventV2::from(scroll);

    assert_eq!(EventV1::from_bytes(&event.to_bytes()).unwrap(), None);
    assert_eq!(EventV1::from_json_value(event.to_json_value()).unwrap(), None);
}

#[test]
fn shared_discriminators_cross_versions() {
    let mut click = ClickV2::new();
    click.set_x(12);
    let event = EventV2::from(click);

    let mut expected = ClickV1::new();
    expected.set_x(12);
    let expected = EventV1::from(expected);

    assert_eq!(event.to_json_value(), json!(["Click", { "x": 12 }]));
    assert_eq!(EventV1::from_bytes(&event.to_bytes()).unwrap(), Some(expected.clone()));
    assert_eq!(EventV1::from_json_value(event.to_json_value()).unwrap(), Some(expected));
}

#[test]
fn unknown_members_drop_out_of_lists() {
    let mut log = LogV2::new();
    let mut click = ClickV2::new();
    click.set_x(1);
    let mut scroll = ScrollV2::new();
    scroll.set_delta(2);
    let mut second = ClickV2::new();
    second.set_x(3);
    log.add_events(EventV2::from(click))
        .add_events(EventV2::from(scroll))
        .add_events(EventV2::from(second));

    for decoded in [
        LogV1::from_bytes(&log.to_bytes()).unwrap().unwrap(),
        LogV1::from_json_value(log.to_json_value()).unwrap().unwrap(),
    ] {
        let xs: Vec<i32> = decoded
            .events()
            .iter()
            .map(|event| match event {
                EventV1::ClickV1(click) => click.x(),
            })
            .collect();
        assert_eq!(xs, [1, 3]);
    }
}

#[test]
fn concrete_readers_reject_siblings() {
    let mut scroll = ScrollV2::new();
    scroll.set_delta(5);
    assert_eq!(ClickV2::from_bytes(&scroll.to_bytes()).unwrap(), None);
    assert_eq!(ClickV2::from_json_value(scroll.to_json_value()).unwrap(), None);
}

#[test]
fn discriminators_are_stable() {
    assert_eq!(ClickV1::TYPE_ID, 4);
    assert_eq!(ClickV2::TYPE_ID, 4);
    assert_eq!(ScrollV2::TYPE_ID, 9);
    assert_eq!(ClickV1::JSON_TYPE, "Click");
    assert_eq!(ScrollV2::JSON_TYPE, "Scroll");
    assert_eq!((RecordV2::ID_TAG, RecordV2::NAME_TAG, RecordV2::NOTE_TAG), (1, 2, 3));
}
