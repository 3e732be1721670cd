use msgbuf_codegen::Builder;

fn main() {
    let xml = Builder::new().plugin("xml");
    for schema in ["schemas/shapes.json", "schemas/scalars.json"] {
        if let Err(err) = xml.compile(schema) {
            panic!("{schema}: {err}");
        }
    }
    for schema in ["schemas/scenarios.json", "schemas/evolution.json"] {
        if let Err(err) = Builder::new().compile(schema) {
            panic!("{schema}: {err}");
        }
    }
}
