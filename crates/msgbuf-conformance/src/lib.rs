//! Generated modules exercised by the conformance tests.
//!
//! Each module is compiled from the schema of the same name in `schemas/`.

#[allow(dead_code, clippy::all)]
pub mod shapes {
    include!(concat!(env!("OUT_DIR"), "/shapes.rs"));
}

#[allow(dead_code, clippy::all)]
pub mod scalars {
    include!(concat!(env!("OUT_DIR"), "/scalars.rs"));
}

#[allow(dead_code, clippy::all)]
pub mod scenarios {
    include!(concat!(env!("OUT_DIR"), "/scenarios.rs"));
}

#[allow(dead_code, clippy::all)]
pub mod evolution {
    include!(concat!(env!("OUT_DIR"), "/evolution.rs"));
}
