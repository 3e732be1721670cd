//! Build-script entry point.
//!
//! ```ignore
//! // build.rs
//! fn main() {
//!     msgbuf_codegen::Builder::new()
//!         .plugin("xml")
//!         .compile("schemas/shapes.json")
//!         .unwrap();
//! }
//! ```
//!
//! The generated module is written to `$OUT_DIR/<schema stem>.rs` and pulled
//! in with `include!(concat!(env!("OUT_DIR"), "/shapes.rs"))`.

use crate::config::GeneratorConfig;
use crate::error::GenerateError;
use crate::input::load_schema;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Compiles schema files into `OUT_DIR`.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    config: GeneratorConfig,
    out_dir: Option<PathBuf>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Run a registered plugin.
    pub fn plugin(mut self, name: impl Into<String>) -> Self {
        self.config.plugins.push(name.into());
        self
    }

    /// Write output here instead of `$OUT_DIR`.
    pub fn out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(dir.into());
        self
    }

    pub fn runtime_crate(mut self, path: impl Into<String>) -> Self {
        self.config.runtime_crate = path.into();
        self
    }

    /// Compile one schema file and return the path of the generated module.
    ///
    /// The output file is only written once compilation succeeded.
    pub fn compile(&self, schema_path: impl AsRef<Path>) -> Result<PathBuf, GenerateError> {
        let schema_path = schema_path.as_ref();
        if std::env::var_os("CARGO").is_some() {
            println!("cargo:rerun-if-changed={}", schema_path.display());
        }

        let schema = load_schema(schema_path)?;
        let code = crate::compile(&schema, &self.config)?;

        let out_dir = self.resolve_out_dir()?;
        let stem = schema_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "schema".to_string());
        let target = out_dir.join(format!("{stem}.rs"));
        std::fs::write(&target, code).map_err(|source| GenerateError::Io {
            path: target.clone(),
            source,
        })?;
        info!(schema = %schema_path.display(), output = %target.display(), "wrote generated module");
        Ok(target)
    }

    fn resolve_out_dir(&self) -> Result<PathBuf, GenerateError> {
        if let Some(dir) = &self.out_dir {
            return Ok(dir.clone());
        }
        match std::env::var_os("OUT_DIR") {
            Some(dir) => {
                debug!(out_dir = ?dir, "using OUT_DIR");
                Ok(PathBuf::from(dir))
            }
            None => Err(GenerateError::Io {
                path: PathBuf::from("$OUT_DIR"),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "OUT_DIR is not set; call Builder::out_dir outside build scripts",
                ),
            }),
        }
    }
}
