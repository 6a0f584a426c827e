//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [base] Section Defaults
// ============================================================================

pub mod base {
    pub fn url() -> Option<String> {
        None
    }
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn configs() -> PathBuf {
        "configs".into()
    }

    pub fn models() -> PathBuf {
        "models".into()
    }

    pub fn blueprints() -> PathBuf {
        "blueprints".into()
    }

    pub fn templates() -> PathBuf {
        "assets/templates".into()
    }

    pub fn pages() -> PathBuf {
        "assets/pages".into()
    }

    pub fn static_dir() -> PathBuf {
        "assets/static".into()
    }

    pub fn output() -> PathBuf {
        "dist".into()
    }

    pub fn root_page() -> String {
        "index".into()
    }

    pub mod sitemap {
        use std::path::PathBuf;

        pub fn path() -> PathBuf {
            "sitemap.xml".into()
        }
    }

    pub mod images {
        use std::collections::BTreeMap;
        use std::path::PathBuf;

        pub fn dir() -> PathBuf {
            "img".into()
        }

        pub fn quality() -> u8 {
            80
        }

        pub fn webp() -> Vec<String> {
            vec!["cwebp".into()]
        }

        pub fn optimizers() -> BTreeMap<String, Vec<String>> {
            [
                ("png", "pngquant"),
                ("jpeg", "mozjpeg"),
                ("jpg", "mozjpeg"),
                ("gif", "gifsicle"),
                ("svg", "svgo"),
            ]
            .into_iter()
            .map(|(ext, plugin)| {
                (
                    ext.to_owned(),
                    vec!["imagemin".to_owned(), format!("--plugin={plugin}")],
                )
            })
            .collect()
        }
    }
}
