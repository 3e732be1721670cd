//! Generator configuration.
//!
//! Example `msgbuf.toml`:
//! ```toml
//! runtime-crate = "::msgbuf_runtime"
//! no-reflection = true
//! plugins = ["xml"]
//! ```

use crate::error::GenerateError;
use crate::model::Model;
use serde::Deserialize;
use std::path::Path;

pub const NO_BINARY: &str = "NoBinary";
pub const NO_REFLECTION: &str = "NoReflection";
pub const NO_INTERFACES: &str = "NoInterfaces";
pub const NO_XML: &str = "NoXml";

/// Settings for one compilation run.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct GeneratorConfig {
    /// Path of the runtime crate as seen from the generated code.
    pub runtime_crate: String,
    pub no_binary: bool,
    pub no_reflection: bool,
    /// Skip visitor traits and `visit` methods.
    pub no_interfaces: bool,
    pub no_xml: bool,
    /// Registered plugins to run, by name.
    pub plugins: Vec<String>,
    /// Emit independent definitions in parallel.
    pub parallel: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            runtime_crate: "::msgbuf_runtime".into(),
            no_binary: false,
            no_reflection: false,
            no_interfaces: false,
            no_xml: false,
            plugins: Vec::new(),
            parallel: true,
        }
    }
}

impl GeneratorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, GenerateError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, GenerateError> {
        let text = std::fs::read_to_string(path).map_err(|source| GenerateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

/// Stages that survive both the configuration and the schema options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    pub binary: bool,
    pub reflection: bool,
    pub interfaces: bool,
    pub xml: bool,
}

impl Features {
    pub fn resolve(config: &GeneratorConfig, model: &Model) -> Self {
        Self {
            binary: !config.no_binary && !model.global_flag(NO_BINARY),
            reflection: !config.no_reflection && !model.global_flag(NO_REFLECTION),
            interfaces: !config.no_interfaces && !model.global_flag(NO_INTERFACES),
            xml: !config.no_xml && !model.global_flag(NO_XML),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::resolve;
    use crate::ir::{DefinitionFile, OptionContainer, OptionValue, Schema};
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.runtime_crate, "::msgbuf_runtime");
        assert!(config.parallel);
        assert!(config.plugins.is_empty());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = GeneratorConfig::from_toml_str(
            r#"
no-reflection = true
plugins = ["xml"]
"#,
        )
        .unwrap();
        assert!(config.no_reflection);
        assert!(!config.no_binary);
        assert_eq!(config.plugins, vec!["xml".to_string()]);
        assert_eq!(config.runtime_crate, "::msgbuf_runtime");
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        assert!(matches!(
            GeneratorConfig::from_toml_str("no-binary = \"yes\""),
            Err(GenerateError::Config(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("msgbuf.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "runtime-crate = \"crate::rt\"\nparallel = false").unwrap();

        let config = GeneratorConfig::load(&path).unwrap();
        assert_eq!(config.runtime_crate, "crate::rt");
        assert!(!config.parallel);

        assert!(matches!(
            GeneratorConfig::load(&dir.path().join("missing.toml")),
            Err(GenerateError::Io { .. })
        ));
    }

    #[test]
    fn schema_options_disable_stages_globally() {
        let mut schema = Schema::new();
        let mut file = DefinitionFile {
            name: "a".into(),
            ..Default::default()
        };
        file.options.insert(NO_BINARY.into(), OptionValue::Flag(true));
        schema.add(file);
        schema.options.push(OptionContainer {
            name: "build".into(),
            docs: None,
            options: [(NO_XML.to_string(), OptionValue::Flag(true))].into(),
        });
        let model = resolve(&schema).unwrap();

        let config = GeneratorConfig {
            no_reflection: true,
            ..Default::default()
        };
        let features = Features::resolve(&config, &model);
        assert_eq!(
            features,
            Features {
                binary: false,
                reflection: false,
                interfaces: true,
                xml: false,
            }
        );
    }
}
