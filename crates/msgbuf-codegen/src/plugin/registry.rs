//! Registry for generator plugins.

use super::GeneratorPlugin;
use std::sync::{OnceLock, PoisonError, RwLock};

/// Global registry of plugins.
static PLUGINS: RwLock<Vec<&'static dyn GeneratorPlugin>> = RwLock::new(Vec::new());
static INITIALIZED: OnceLock<()> = OnceLock::new();

/// Register a custom plugin.
///
/// Built-in plugins are registered automatically on first use. Lookups
/// return the first plugin registered under a name.
pub fn register_plugin(plugin: &'static dyn GeneratorPlugin) {
    init_builtin();
    PLUGINS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .push(plugin);
}

/// Initialize built-in plugins (called automatically on first use).
fn init_builtin() {
    INITIALIZED.get_or_init(|| {
        #[cfg_attr(not(feature = "plugin-xml"), allow(unused_mut, unused_variables))]
        let mut plugins = PLUGINS.write().unwrap_or_else(PoisonError::into_inner);

        #[cfg(feature = "plugin-xml")]
        {
            plugins.push(&super::xml::XML_PLUGIN);
        }
    });
}

/// Get a plugin by name.
pub fn get_plugin(name: &str) -> Option<&'static dyn GeneratorPlugin> {
    init_builtin();
    PLUGINS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .find(|plugin| plugin.name() == name)
        .copied()
}

/// List all registered plugin names.
pub fn plugin_names() -> Vec<&'static str> {
    init_builtin();
    PLUGINS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .map(|plugin| plugin.name())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Features;
    use crate::output::CodeWriter;
    use crate::plugin::{MessageView, PluginError};

    struct Marker;

    impl GeneratorPlugin for Marker {
        fn name(&self) -> &'static str {
            "marker"
        }

        fn enabled(&self, _: &Features) -> bool {
            true
        }

        fn storage_surface(&self, _: &MessageView<'_>, _: &mut CodeWriter) -> Result<(), PluginError> {
            Ok(())
        }

        fn public_surface(&self, view: &MessageView<'_>, out: &mut CodeWriter) -> Result<(), PluginError> {
            out.line(format!("// marker: {}", view.info.name));
            Ok(())
        }
    }

    static MARKER: Marker = Marker;

    #[test]
    fn custom_plugins_are_found_by_name() {
        register_plugin(&MARKER);
        assert!(plugin_names().contains(&"marker"));
        assert_eq!(get_plugin("marker").map(|p| p.name()), Some("marker"));
        assert!(get_plugin("nope").is_none());
    }

    #[cfg(feature = "plugin-xml")]
    #[test]
    fn xml_is_built_in() {
        assert!(get_plugin("xml").is_some());
    }
}
