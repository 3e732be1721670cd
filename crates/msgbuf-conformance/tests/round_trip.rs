//! Encode then decode under both formats.

use msgbuf_conformance::scalars::Scalars;
use msgbuf_conformance::shapes::{Circle, Drawing, Group, LineStyle, Rectangle, Shape};
use msgbuf_runtime::{BinaryMessage, JsonMessage};

fn scalars() -> Scalars {
    let mut value = Scalars::new();
    value
        .set_flag(true)
        .set_count(-3)
        .set_size(u32::MAX)
        .set_delta(-70_000)
        .set_checksum(0xDEAD_BEEF)
        .set_offset(i32::MIN)
        .set_total(-1)
        .set_capacity(u64::MAX)
        .set_drift(i64::MIN)
        .set_hash(42)
        .set_stamp(-42)
        .set_ratio(0.5)
        .set_precise(std::f64::consts::PI)
        .set_text("héllo")
        .set_blob(vec![0, 1, 254, 255])
        .set_numbers([1, -2, 300])
        .set_words(["a".to_string(), String::new()]);
    value
}

fn drawing() -> Drawing {
    let mut circle = Circle::new();
    circle.set_x(1.0).set_y(2.0).set_radius(3.0);
    let mut frame = Rectangle::new();
    frame.set_width(10.0).set_height(5.0);
    let mut square = Rectangle::new();
    square.set_width(1.0).set_height(1.0);

    let mut inner = Group::new();
    inner.add_members(Shape::from(square));
    let mut layer = Group::new();
    layer
        .set_x(-1.0)
        .add_members(Shape::from(circle.clone()))
        .add_members(Shape::from(inner));

    let mut drawing = Drawing::new();
    drawing
        .set_title("plan")
        .set_style(LineStyle::Dotted)
        .set_background(Shape::from(circle))
        .set_frame(frame)
        .add_layers(layer)
        .set_tags(["draft".to_string(), "v2".to_string()]);
    drawing
}

#[test]
fn scalars_binary() {
    let value = scalars();
    assert_eq!(Scalars::from_bytes(&value.to_bytes()).unwrap(), Some(value));
}

#[test]
fn scalars_json() {
    let value = scalars();
    let text = value.to_json_string();
    assert_eq!(Scalars::from_json_str(&text).unwrap(), Some(value));
}

#[test]
fn non_finite_floats_round_trip() {
    let mut value = scalars();
    value.set_ratio(f32::INFINITY).set_precise(f64::NEG_INFINITY);

    let json = value.to_json_value();
    assert_eq!(json["ratio"], "Infinity");
    assert_eq!(json["precise"], "-Infinity");
    assert_eq!(Scalars::from_json_str(&value.to_json_string()).unwrap(), Some(value.clone()));
    assert_eq!(Scalars::from_bytes(&value.to_bytes()).unwrap(), Some(value.clone()));

    value.set_precise(f64::NAN);
    let decoded = Scalars::from_json_value(value.to_json_value()).unwrap().unwrap();
    assert!(decoded.precise().is_nan());
    assert_eq!(decoded.ratio(), f32::INFINITY);
}

#[test]
fn defaults_round_trip() {
    let value = Scalars::new();
    assert_eq!(Scalars::from_bytes(&value.to_bytes()).unwrap(), Some(value.clone()));
    assert_eq!(Scalars::from_json_value(value.to_json_value()).unwrap(), Some(value));
}

#[test]
fn name_option_renames_the_key() {
    let value = scalars();
    let json = value.to_json_value();
    assert_eq!(json["label"], "héllo");
    assert!(json.get("text").is_none());
    assert_eq!(Scalars::TEXT_PROP, "label");
}

#[test]
fn families_binary() {
    let value = drawing();
    assert_eq!(Drawing::from_bytes(&value.to_bytes()).unwrap(), Some(value));
}

#[test]
fn families_json() {
    let value = drawing();
    assert_eq!(Drawing::from_json_str(&value.to_json_string()).unwrap(), Some(value));
}

#[test]
fn abstract_roots_round_trip() {
    let mut circle = Circle::new();
    circle.set_radius(9.0);
    let shape = Shape::from(circle);
    assert_eq!(Shape::from_bytes(&shape.to_bytes()).unwrap(), Some(shape.clone()));
    assert_eq!(Shape::from_json_value(shape.to_json_value()).unwrap(), Some(shape));
}

#[test]
fn ancestor_fields_come_first() {
    let mut circle = Circle::new();
    circle.set_radius(3.0).set_y(2.0).set_x(1.0);
    let json = circle.to_json_value();
    let keys: Vec<&String> = json[1].as_object().unwrap().keys().collect();
    assert_eq!(keys, ["x", "y", "radius"]);
}

#[test]
fn transient_fields_skip_binary_only() {
    let mut group = Group::new();
    group.set_label("scratch").set_x(4.0);

    let decoded = Group::from_bytes(&group.to_bytes()).unwrap().unwrap();
    assert_eq!(decoded.label(), "");
    assert_eq!(decoded.x(), 4.0);

    let decoded = Group::from_json_value(group.to_json_value()).unwrap().unwrap();
    assert_eq!(decoded.label(), "scratch");
}

#[test]
fn null_reads_as_absent() {
    assert_eq!(Shape::from_json_str("null").unwrap(), None);
    assert_eq!(Circle::from_json_str("null").unwrap(), None);
}
