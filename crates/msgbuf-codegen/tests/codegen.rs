//! Integration tests for msgbuf-codegen.

use msgbuf_codegen::ir::{Field, MessageDef, PrimitiveKind, Schema, Type};
use msgbuf_codegen::{
    GenerateError, GeneratorConfig, PlanError, SchemaError, analyze, compile, parse_schema_json,
};

fn load_fixture(name: &str) -> serde_json::Value {
    let path = format!("tests/fixtures/{}.json", name);
    let content =
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("fixture {} not found", name));
    serde_json::from_str(&content).expect("invalid JSON")
}

fn compile_fixture(name: &str, config: &GeneratorConfig) -> Result<String, GenerateError> {
    let schema = parse_schema_json(&load_fixture(name))?;
    compile(&schema, config)
}

fn sequential() -> GeneratorConfig {
    GeneratorConfig {
        parallel: false,
        ..Default::default()
    }
}

// === Shapes ===

#[test]
fn shapes_family_layout() {
    let code = compile_fixture("shapes", &GeneratorConfig::default()).unwrap();

    assert!(code.starts_with("// @generated by msgbuf-codegen. Do not edit."));
    assert!(code.contains("/// Anything that can be drawn."));
    assert!(code.contains("pub enum Shape {"));
    assert!(code.contains("    AtomicShape(AtomicShape),"));
    assert!(code.contains("    Group(Group),"));
    assert!(code.contains("pub enum AtomicShape {"));
    assert!(code.contains("struct ShapeBase {"));
    assert!(code.contains("pub struct Circle {"));
    assert!(code.contains("impl From<Circle> for Shape {"));
    assert!(code.contains("Shape::AtomicShape(AtomicShape::from(value))"));
}

#[test]
fn shapes_identifiers() {
    let code = compile_fixture("shapes", &sequential()).unwrap();

    assert!(code.contains("pub const JSON_TYPE: &'static str = \"Circle\";"));
    assert!(code.contains("pub const TYPE_ID: u32 = 1;"));
    assert!(code.contains("pub const TYPE_ID: u32 = 2;"));
    assert!(code.contains("pub const TYPE_ID: u32 = 3;"));
    assert!(code.contains("pub const RADIUS_TAG: u32 = 3;"));
    assert!(code.contains("pub const HEIGHT_TAG: u32 = 4;"));
    assert!(code.contains("pub const MEMBERS_TAG: u32 = 3;"));
    assert!(code.contains("pub const LABEL_PROP: &'static str = \"label\";"));
    assert!(!code.contains("LABEL_TAG"));
    assert!(code.contains(
        "pub const PROPERTY_NAMES: &'static [&'static str] = &[\"x\", \"y\", \"radius\"];"
    ));
}

#[test]
fn shapes_visitors() {
    let code = compile_fixture("shapes", &sequential()).unwrap();

    assert!(code.contains("pub trait ShapeVisitor<R, A>: AtomicShapeVisitor<R, A> {"));
    assert!(code.contains("fn visit_group(&mut self, value: &Group, arg: A) -> R;"));
    assert!(code.contains("fn visit_circle(&mut self, value: &Circle, arg: A) -> R;"));
    assert!(code.contains("visitor.visit_circle(self, arg)"));
}

#[test]
fn concrete_message_fields_read_nullable() {
    let point = || Type::custom("Point");
    let schema = Schema::single(vec![
        MessageDef::new("Point", vec![Field::new("x", Type::Primitive(PrimitiveKind::Int32))])
            .into(),
        MessageDef::new(
            "Path",
            vec![Field::new("start", point()), Field::repeated("points", point())],
        )
        .into(),
    ]);
    let code = compile(&schema, &sequential()).unwrap();

    assert!(code.contains("self.start = reader.next_nullable(Point::read_json_content)?.map(Box::new),"));
    assert!(code.contains(
        "if let Some(item) = reader.next_nullable(Point::read_json_content)? { self.points.push(item); }"
    ));
    assert!(!code.contains("(if reader.peek_null()"));
}

#[test]
fn empty_families_mark_parameters_unused() {
    let schema = Schema::single(vec![
        MessageDef::abstract_("Node", vec![Field::new("weight", Type::Primitive(PrimitiveKind::Double))])
            .into(),
    ]);
    let code = compile(&schema, &sequential()).unwrap();

    assert!(code.contains("pub enum Node {}"));
    assert!(code.contains("fn write_json_content(&self, _writer: &mut ::msgbuf_runtime::JsonWriter) {"));
    assert!(code.contains("pub fn write_binary(&self, _writer: &mut ::msgbuf_runtime::DataWriter) {"));
    assert!(code.contains("fn reflect_get(&self, _name: &str)"));
    assert!(code.contains("fn reflect_set(&mut self, _name: &str, _value: ::msgbuf_runtime::Value)"));
    assert!(code.contains("pub fn set_weight(&mut self, _value: f64) -> &mut Self {"));
    assert!(code.contains("match *self {}"));
}

#[test]
fn parallel_and_sequential_agree() {
    let parallel = compile_fixture("shapes", &GeneratorConfig::default()).unwrap();
    let sequential = compile_fixture("shapes", &sequential()).unwrap();
    assert_eq!(parallel, sequential);
}

#[test]
fn feature_flags_remove_surfaces() {
    let config = GeneratorConfig {
        no_binary: true,
        no_reflection: true,
        no_interfaces: true,
        ..sequential()
    };
    let code = compile_fixture("shapes", &config).unwrap();

    assert!(code.contains("impl ::msgbuf_runtime::JsonMessage for Shape"));
    assert!(!code.contains("BinaryMessage"));
    assert!(!code.contains("TYPE_ID"));
    assert!(!code.contains("Reflective"));
    assert!(!code.contains("ShapeVisitor"));
}

#[test]
fn schema_options_disable_features() {
    let mut schema = parse_schema_json(&load_fixture("shapes")).unwrap();
    schema.options.push(msgbuf_codegen::ir::OptionContainer {
        name: "global".into(),
        docs: None,
        options: [("NoBinary".to_string(), msgbuf_codegen::ir::OptionValue::Flag(true))]
            .into_iter()
            .collect(),
    });
    let code = compile(&schema, &sequential()).unwrap();
    assert!(!code.contains("BinaryMessage"));
}

#[test]
fn runtime_path_is_configurable() {
    let config = GeneratorConfig {
        runtime_crate: "crate::rt".into(),
        ..sequential()
    };
    let code = compile_fixture("shapes", &config).unwrap();
    assert!(code.contains("impl crate::rt::JsonMessage for Circle"));
    assert!(!code.contains("::msgbuf_runtime"));
}

// === Search ===

#[test]
fn search_enum_codes() {
    let code = compile_fixture("search", &sequential()).unwrap();

    assert!(code.contains("pub enum Corpus {"));
    assert!(code.contains("Corpus::Universal => 7,"));
    assert!(code.contains("Corpus::Web => 1,"));
    assert!(code.contains("Corpus::Images => 0,"));
    assert!(code.contains("Corpus::Universal => \"UNIVERSAL\","));
}

#[test]
fn search_field_tags() {
    let code = compile_fixture("search", &sequential()).unwrap();

    assert!(code.contains("pub const QUERY_TAG: u32 = 1;"));
    assert!(code.contains("pub const PAGE_NUMBER_TAG: u32 = 3;"));
    assert!(code.contains("pub const RESULT_PER_PAGE_TAG: u32 = 2;"));
    assert!(code.contains("pub const CORPUS_TAG: u32 = 4;"));
}

#[test]
fn search_maps() {
    let code = compile_fixture("search", &sequential()).unwrap();

    assert!(code.contains("scores: ::msgbuf_runtime::IndexMap<String, i32>,"));
    assert!(code.contains("boosts: ::msgbuf_runtime::IndexMap<Corpus, f64>,"));
    assert!(code.contains("pub fn put_scores(&mut self, key: String, value: i32)"));
    assert!(code.contains("::msgbuf_runtime::Error::DuplicateKey"));
}

#[test]
fn search_model() {
    let schema = parse_schema_json(&load_fixture("search")).unwrap();
    let model = analyze(&schema).unwrap();
    assert_eq!(model.messages.len(), 1);
    assert_eq!(model.enums.len(), 1);
    let keys: Vec<&str> = model.messages[0].fields.iter().map(|f| f.key.as_str()).collect();
    assert_eq!(
        keys,
        ["query", "page_number", "result_per_page", "corpus", "scores", "boosts"]
    );
}

// === Failures ===

#[test]
fn inheritance_cycles_fail() {
    let err = compile_fixture("cycle", &sequential()).unwrap_err();
    assert!(matches!(err, GenerateError::Schema(SchemaError::InheritanceCycle(_))));
}

#[test]
fn unresolved_types_fail() {
    let schema = Schema::single(vec![
        MessageDef::new("Drawing", vec![Field::new("shape", Type::custom("Shape"))]).into(),
    ]);
    let err = compile(&schema, &sequential()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "field `Drawing.shape` refers to unknown type `Shape`"
    );
}

#[test]
fn duplicate_definitions_fail() {
    let schema = Schema::single(vec![
        MessageDef::new("Point", vec![Field::new("x", Type::Primitive(PrimitiveKind::Int32))])
            .into(),
        MessageDef::new("Point", Vec::new()).into(),
    ]);
    let err = compile(&schema, &sequential()).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Schema(SchemaError::DuplicateDefinition(name)) if name == "Point"
    ));
}

#[test]
fn unsupported_map_keys_fail() {
    let schema = Schema::single(vec![
        MessageDef::new("Point", vec![Field::new("x", Type::Primitive(PrimitiveKind::Int32))])
            .into(),
        MessageDef::new(
            "M",
            vec![Field::new(
                "bad",
                Type::map(
                    Type::Primitive(PrimitiveKind::Double),
                    Type::Primitive(PrimitiveKind::Int32),
                ),
            )],
        )
        .into(),
    ]);
    for parallel in [false, true] {
        let config = GeneratorConfig {
            parallel,
            ..Default::default()
        };
        let model = analyze(&schema).unwrap();
        assert!(msgbuf_codegen::output::generate(&model, &config).is_err());

        let err = compile(&schema, &config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "field `M.bad` cannot be encoded: map keys must be strings, integers, booleans or enums, not double"
        );
        assert!(matches!(
            err,
            GenerateError::Unsupported { message, field, source: PlanError::MapKey(_) }
                if message == "M" && field == "bad"
        ));
    }
}
