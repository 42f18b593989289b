//! Embedded FileVault metadata templates and the [`VaultRenderer`].
//!
//! | Archive path                    | Template                    |
//! |---------------------------------|-----------------------------|
//! | `META-INF/vault/config.xml`     | `vault/config.xml.tera`     |
//! | `META-INF/vault/settings.xml`   | `vault/settings.xml.tera`   |
//! | `META-INF/vault/properties.xml` | `vault/properties.xml.tera` |
//! | `META-INF/vault/filter.xml`     | `vault/filter.xml.tera`     |

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tera::{Context, Tera};

use crate::error::PackageError;
use crate::filter::FilterManifest;

const FILTER_TEMPLATE: &str = "vault/filter.xml.tera";

// Baked into the binary at compile time via include_str!.
const TPLS: &[(&str, &str)] = &[
    ("vault/config.xml.tera", include_str!("templates/vault/config.xml.tera")),
    ("vault/settings.xml.tera", include_str!("templates/vault/settings.xml.tera")),
    (
        "vault/properties.xml.tera",
        include_str!("templates/vault/properties.xml.tera"),
    ),
    (FILTER_TEMPLATE, include_str!("templates/vault/filter.xml.tera")),
];

/// Support files seeded into every package, as `(archive path, template)`.
pub const SUPPORT_FILES: &[(&str, &str)] = &[
    ("META-INF/vault/config.xml", "vault/config.xml.tera"),
    ("META-INF/vault/settings.xml", "vault/settings.xml.tera"),
    ("META-INF/vault/properties.xml", "vault/properties.xml.tera"),
];

/// Identity stamped into `properties.xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMeta {
    pub name: String,
    pub group: String,
    pub version: String,
    pub description: String,
}

impl Default for PackageMeta {
    fn default() -> Self {
        Self {
            name: "aemsync".to_string(),
            group: "aemsync".to_string(),
            version: "1.0".to_string(),
            description: "Changes pushed by aemsync".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PropertiesContext<'a> {
    name: &'a str,
    group: &'a str,
    version: &'a str,
    description: &'a str,
    created: String,
}

/// Tera instance holding the vault metadata templates.
pub struct VaultRenderer {
    tera: Tera,
}

impl VaultRenderer {
    pub fn new() -> Result<Self, PackageError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TPLS.iter().copied())?;
        Ok(Self { tera })
    }

    /// Render every support file for a package created at `created`.
    pub fn render_support_files(
        &self,
        meta: &PackageMeta,
        created: DateTime<Utc>,
    ) -> Result<Vec<(&'static str, String)>, PackageError> {
        let ctx = Context::from_serialize(PropertiesContext {
            name: &meta.name,
            group: &meta.group,
            version: &meta.version,
            description: &meta.description,
            created: created.to_rfc3339_opts(SecondsFormat::Millis, false),
        })?;

        SUPPORT_FILES
            .iter()
            .map(|(path, template)| -> Result<_, PackageError> {
                Ok((*path, self.tera.render(template, &ctx)?))
            })
            .collect()
    }

    /// Wrap the manifest's fragments in the `workspaceFilter` envelope.
    pub fn render_filter(&self, manifest: &FilterManifest) -> Result<String, PackageError> {
        let ctx = Context::from_serialize(manifest.context())?;
        Ok(self.tera.render(FILTER_TEMPLATE, &ctx)?)
    }
}
