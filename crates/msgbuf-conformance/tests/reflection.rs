//! Property access by key.

use msgbuf_conformance::scalars::Scalars;
use msgbuf_conformance::shapes::{Circle, Drawing, Group, LineStyle, Rectangle, Shape};
use msgbuf_runtime::{Error, Reflective, Value};

#[test]
fn properties_list_ancestors_first() {
    let circle = Circle::new();
    assert_eq!(circle.properties(), ["x", "y", "radius"]);
    assert_eq!(Group::new().properties(), ["x", "y", "members", "label"]);
    assert_eq!(Scalars::new().properties()[13], "label");

    let shape = Shape::from(Rectangle::new());
    assert_eq!(shape.properties(), ["x", "y", "width", "height"]);
}

#[test]
fn get_and_set_scalars() {
    let mut circle = Circle::new();
    circle.set("radius", Value::Double(2.0)).unwrap();
    circle.set("x", Value::Double(-1.0)).unwrap();

    assert_eq!(circle.radius(), 2.0);
    assert_eq!(circle.x(), -1.0);
    assert!(matches!(circle.get("radius").unwrap(), Value::Double(r) if r == 2.0));
    assert!(matches!(circle.get("x").unwrap(), Value::Double(x) if x == -1.0));
}

#[test]
fn abstract_values_dispatch() {
    let mut shape = Shape::from(Circle::new());
    shape.set("y", Value::Double(5.0)).unwrap();
    shape.set("radius", Value::Double(1.5)).unwrap();
    assert!(matches!(shape.get("y").unwrap(), Value::Double(y) if y == 5.0));
    assert!(matches!(shape.get("radius").unwrap(), Value::Double(r) if r == 1.5));
}

#[test]
fn unknown_keys_fail_at_the_root() {
    let mut circle = Circle::new();
    assert!(matches!(circle.get("width"), Err(Error::UnknownProperty(name)) if name == "width"));
    assert!(matches!(
        circle.set("width", Value::Double(1.0)),
        Err(Error::UnknownProperty(_))
    ));
}

#[test]
fn mismatched_values_fail() {
    let mut circle = Circle::new();
    let err = circle.set("radius", Value::String("wide".into())).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { property, .. } if property == "radius"));
    assert_eq!(circle.radius(), 0.0);

    let mut drawing = Drawing::new();
    assert!(matches!(
        drawing.set("style", Value::Int(1)),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn other_values_downcast() {
    let mut drawing = Drawing::new();
    drawing.set("style", Value::other(LineStyle::Dashed)).unwrap();
    assert_eq!(drawing.style(), LineStyle::Dashed);

    drawing
        .set("tags", Value::other(vec!["a".to_string()]))
        .unwrap();
    let tags: Vec<String> = drawing.get("tags").unwrap().downcast("tags").unwrap();
    assert_eq!(tags, ["a"]);

    let mut frame = Rectangle::new();
    frame.set_width(3.0);
    drawing.set("frame", Value::other(Some(frame.clone()))).unwrap();
    assert_eq!(drawing.frame(), Some(&frame));
    let back: Option<Rectangle> = drawing.get("frame").unwrap().downcast("frame").unwrap();
    assert_eq!(back, Some(frame));

    drawing.set("frame", Value::other(None::<Rectangle>)).unwrap();
    assert!(!drawing.has_frame());
}

#[test]
fn scalar_kinds() {
    let mut scalars = Scalars::new();
    scalars.set("size", Value::UInt(7)).unwrap();
    scalars.set("drift", Value::Long(-9)).unwrap();
    scalars.set("ratio", Value::Float(0.25)).unwrap();
    scalars.set("label", Value::String("hi".into())).unwrap();
    scalars.set("blob", Value::Bytes(vec![1, 2])).unwrap();

    assert_eq!(scalars.size(), 7);
    assert_eq!(scalars.drift(), -9);
    assert_eq!(scalars.ratio(), 0.25);
    assert_eq!(scalars.text(), "hi");
    assert_eq!(scalars.blob(), [1, 2]);
    assert!(matches!(scalars.get("text"), Err(Error::UnknownProperty(_))));
}
