//! Template loading and lookup

use super::error::{VisionError, VisionResult};
use image::GrayImage;
use log::{info, warn};
use std::path::{Path, PathBuf};

const TEMPLATE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Reference image of one UI element
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub path: PathBuf,
    pub image: GrayImage,
}

impl Template {
    pub fn new(name: impl Into<String>, image: GrayImage) -> Self {
        let name = name.into();
        Self {
            path: PathBuf::from(&name),
            name,
            image,
        }
    }

    /// Load an image file, keyed by its file stem
    pub fn open(path: &Path) -> Result<Self, String> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| format!("Template path {} has no usable file stem", path.display()))?
            .to_string();
        let image = image::open(path)
            .map_err(|e| format!("Failed to load template {}: {}", path.display(), e))?
            .to_luma8();
        if image.width() == 0 || image.height() == 0 {
            return Err(format!("Template {} is empty", path.display()));
        }
        Ok(Self {
            name,
            path: path.to_path_buf(),
            image,
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Center tap coordinates for this template matched at offset `(x, y)`
    pub fn center_at(&self, x: u32, y: u32) -> (u32, u32) {
        (x + self.width() / 2, y + self.height() / 2)
    }
}

/// Read-only set of templates, ordered by name.
#[derive(Debug, Default)]
pub struct TemplateStore {
    templates: Vec<Template>,
}

impl TemplateStore {
    /// Build a store from already decoded templates. Duplicate names keep the
    /// first template after sorting by name and path.
    pub fn from_templates(mut templates: Vec<Template>) -> Self {
        templates.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));
        templates.dedup_by(|later, first| {
            let duplicate = later.name == first.name;
            if duplicate {
                warn!(
                    "⚠️ Duplicate template '{}': keeping {}, ignoring {}",
                    first.name,
                    first.path.display(),
                    later.path.display()
                );
            }
            duplicate
        });
        Self { templates }
    }

    /// Scan directory for image files and load them. Only an unreadable
    /// directory is an error; broken files are logged and skipped.
    pub fn load_from_directory(directory: impl AsRef<Path>) -> VisionResult<Self> {
        let dir_path = directory.as_ref();
        let entries =
            std::fs::read_dir(dir_path).map_err(|source| VisionError::TemplateDirUnreadable {
                path: dir_path.to_path_buf(),
                source,
            })?;

        let mut templates = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("⚠️ Skipping unreadable entry in {}: {}", dir_path.display(), e);
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_file() || !has_template_extension(&path) {
                continue;
            }
            match Template::open(&path) {
                Ok(template) => {
                    info!(
                        "img loaded: {} ({}x{})",
                        path.display(),
                        template.width(),
                        template.height()
                    );
                    templates.push(template);
                }
                Err(e) => warn!("⚠️ {e}"),
            }
        }

        let store = Self::from_templates(templates);
        info!(
            "✅ Loaded {} templates from {}",
            store.len(),
            dir_path.display()
        );
        Ok(store)
    }

    /// Get template by name
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.name == name)
    }

    /// Templates whose name contains `fragment`, in store order
    pub fn grouped<'a>(&'a self, fragment: &'a str) -> impl Iterator<Item = &'a Template> + 'a {
        self.templates.iter().filter(move |t| t.name.contains(fragment))
    }

    pub fn names(&self) -> Vec<&str> {
        self.templates.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn has_template_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            TEMPLATE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}
