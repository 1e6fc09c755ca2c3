//! Engine configuration.
//!
//! Everything has a default; hosts that read settings from a file enable
//! the `serde` feature and deserialize [`Options`] directly.

/// Code generation settings.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct CodegenOptions {
    /// Name of the component context object template expressions read from.
    pub ctx_name: String,
    /// Write hyphenated component props in camelCase, with the raw
    /// spelling kept as an alias.
    pub camelize_props: bool,
    /// Type-check static attributes on platform elements.
    pub check_attributes: bool,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            ctx_name: "__v_ctx".to_owned(),
            camelize_props: true,
            check_attributes: true,
        }
    }
}

/// Snapshot retention settings.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct SnapshotOptions {
    /// How many of the newest snapshots stay alive without outside handles.
    pub retain_recent: usize,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self { retain_recent: 4 }
    }
}

/// All settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct Options {
    pub codegen: CodegenOptions,
    pub snapshots: SnapshotOptions,
}

impl Options {
    pub fn with_ctx_name(mut self, name: impl Into<String>) -> Self {
        self.codegen.ctx_name = name.into();
        self
    }

    pub fn with_camelize_props(mut self, enabled: bool) -> Self {
        self.codegen.camelize_props = enabled;
        self
    }

    pub fn with_check_attributes(mut self, enabled: bool) -> Self {
        self.codegen.check_attributes = enabled;
        self
    }

    pub fn with_retain_recent(mut self, count: usize) -> Self {
        self.snapshots.retain_recent = count;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let options = Options::default()
            .with_ctx_name("ctx")
            .with_camelize_props(false)
            .with_retain_recent(1);
        assert_eq!(options.codegen.ctx_name, "ctx");
        assert!(!options.codegen.camelize_props);
        assert!(options.codegen.check_attributes);
        assert_eq!(options.snapshots.retain_recent, 1);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_partial() {
        let options: Options =
            serde_json::from_str(r#"{ "codegen": { "ctxName": "self" } }"#).unwrap();
        assert_eq!(options.codegen.ctx_name, "self");
        assert!(options.codegen.camelize_props);
        assert_eq!(options.snapshots.retain_recent, 4);
    }
}
