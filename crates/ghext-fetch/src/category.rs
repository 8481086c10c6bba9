//! Extension class prefixes and where each class lives in the repository.

/// Class prefix → category directory, relative to the top-level source dir.
pub const CATEGORIES: &[(&str, &str)] = &[
    ("d", "display"),
    ("db", "db"),
    ("g", "general"),
    ("i", "imagery"),
    ("m", "misc"),
    ("ps", "postscript"),
    ("p", "paint"),
    ("r", "raster"),
    ("r3", "raster3d"),
    ("s", "sites"),
    ("t", "temporal"),
    ("v", "vector"),
    ("wx", "gui/wxpython"),
];

/// The class prefix of an extension name (`i` for `i.sentinel`).
#[must_use]
pub fn module_class(extension: &str) -> &str {
    extension.split_once('.').map_or(extension, |(class, _)| class)
}

/// Category directory for an extension. Unknown classes map to themselves.
#[must_use]
pub fn category_for(extension: &str) -> &str {
    let class = module_class(extension);
    CATEGORIES
        .iter()
        .find(|(prefix, _)| *prefix == class)
        .map_or(class, |(_, category)| *category)
}

/// Where an extension's sources live: `<top_level>/<category>/<extension>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionPath {
    top_level: String,
    category: String,
    extension: String,
}

impl ExtensionPath {
    /// Resolve the category of `extension` under `top_level`.
    #[must_use]
    pub fn new(top_level: impl Into<String>, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        Self {
            top_level: top_level.into(),
            category: category_for(&extension).to_string(),
            extension,
        }
    }

    /// Repository-relative path, e.g. `src/imagery/i.sentinel`.
    #[must_use]
    pub fn repo_path(&self) -> String {
        format!("{}/{}/{}", self.top_level, self.category, self.extension)
    }

    /// Leading components to drop so the local tree starts at the extension
    /// directory: the top-level dir plus every category component.
    #[must_use]
    pub fn strip_components(&self) -> usize {
        self.category.split('/').count().saturating_add(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_classes() {
        assert_eq!(category_for("i.sentinel"), "imagery");
        assert_eq!(category_for("r3.flow"), "raster3d");
        assert_eq!(category_for("r.learn.ml2"), "raster");
        assert_eq!(category_for("db.join"), "db");
        assert_eq!(category_for("wx.metadata"), "gui/wxpython");
    }

    #[test]
    fn unknown_class_maps_to_itself() {
        assert_eq!(category_for("x.custom"), "x");
        assert_eq!(category_for("noclass"), "noclass");
    }

    #[test]
    fn repo_path_and_strip() {
        let p = ExtensionPath::new("src", "i.sentinel");
        assert_eq!(p.repo_path(), "src/imagery/i.sentinel");
        assert_eq!(p.strip_components(), 2);
    }

    #[test]
    fn nested_category_strips_more() {
        let p = ExtensionPath::new("src", "wx.metadata");
        assert_eq!(p.repo_path(), "src/gui/wxpython/wx.metadata");
        assert_eq!(p.strip_components(), 3);
    }

    #[test]
    fn legacy_top_level() {
        let p = ExtensionPath::new("grass7", "v.in.gbif");
        assert_eq!(p.repo_path(), "grass7/vector/v.in.gbif");
        assert_eq!(p.strip_components(), 2);
    }
}
