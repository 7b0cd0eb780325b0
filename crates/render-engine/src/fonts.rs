//! Font discovery for text elements.
//!
//! Elements name fonts with a CSS family list (`"Charm, cursive"`). Each
//! entry is tried in order against the font database. Generic families are
//! bound to installed faces when the book is built, sans-serif is tried after
//! the list, and any loaded face is the last resort.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use rusttype::Font;
use slidecast_common::FontConfig;

/// One entry of a CSS `font-family` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FamilyName {
    Named(String),
    Serif,
    SansSerif,
    Monospace,
    Cursive,
    Fantasy,
}

impl FamilyName {
    fn as_family(&self) -> Family<'_> {
        match self {
            Self::Named(name) => Family::Name(name),
            Self::Serif => Family::Serif,
            Self::SansSerif => Family::SansSerif,
            Self::Monospace => Family::Monospace,
            Self::Cursive => Family::Cursive,
            Self::Fantasy => Family::Fantasy,
        }
    }
}

/// Split a CSS family list into its entries.
pub fn parse_family_list(list: &str) -> Vec<FamilyName> {
    list.split(',')
        .map(|raw| raw.trim().trim_matches(|c| c == '"' || c == '\''))
        .filter(|name| !name.is_empty())
        .map(|name| match name.to_ascii_lowercase().as_str() {
            "serif" => FamilyName::Serif,
            "sans-serif" | "system-ui" => FamilyName::SansSerif,
            "monospace" => FamilyName::Monospace,
            "cursive" => FamilyName::Cursive,
            "fantasy" => FamilyName::Fantasy,
            _ => FamilyName::Named(name.to_string()),
        })
        .collect()
}

pub type SharedFont = Arc<Font<'static>>;

/// Installed families tried, in order, for each generic family.
const SANS_SERIF_FAMILIES: &[&str] = &[
    "Arial",
    "Helvetica",
    "Liberation Sans",
    "DejaVu Sans",
    "Noto Sans",
    "Open Sans",
    "Roboto",
    "Ubuntu",
    "Cantarell",
];
const SERIF_FAMILIES: &[&str] = &[
    "Times New Roman",
    "Times",
    "Liberation Serif",
    "DejaVu Serif",
    "Noto Serif",
    "Georgia",
];
const MONOSPACE_FAMILIES: &[&str] = &[
    "Courier New",
    "Courier",
    "Liberation Mono",
    "DejaVu Sans Mono",
    "Noto Sans Mono",
    "Ubuntu Mono",
];
const CURSIVE_FAMILIES: &[&str] = &["Comic Sans MS", "URW Chancery L", "Z003"];
const FANTASY_FAMILIES: &[&str] = &["Impact", "Papyrus"];

/// Font database plus a per-family-list cache of loaded faces.
pub struct FontBook {
    db: Database,
    cache: Mutex<HashMap<String, Option<SharedFont>>>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.db.len())
            .finish()
    }
}

impl Default for FontBook {
    fn default() -> Self {
        Self::empty()
    }
}

impl FontBook {
    /// A book with no fonts; text is skipped.
    pub fn empty() -> Self {
        Self::with_database(Database::new())
    }

    /// Load fonts as configured.
    pub fn from_config(config: &FontConfig) -> Self {
        let mut db = Database::new();
        if config.load_system_fonts {
            db.load_system_fonts();
        }
        for dir in &config.extra_font_dirs {
            db.load_fonts_dir(dir);
        }
        tracing::debug!(faces = db.len(), "Font database loaded");
        Self::with_database(db)
    }

    /// Wrap a loaded database, binding generic families to installed faces.
    pub fn with_database(mut db: Database) -> Self {
        bind_generic_families(&mut db);
        Self {
            db,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of font faces known.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Sorted, de-duplicated family names.
    pub fn family_names(&self) -> Vec<String> {
        installed_families(&self.db)
    }

    /// The first loadable face for a CSS family list.
    pub fn resolve(&self, family_list: &str) -> Option<SharedFont> {
        let mut cache = self.cache.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(hit) = cache.get(family_list) {
            return hit.clone();
        }

        let font = self.load(family_list);
        if font.is_none() {
            tracing::warn!(family = family_list, "No usable font; text will be skipped");
        }
        cache.insert(family_list.to_string(), font.clone());
        font
    }

    fn load(&self, family_list: &str) -> Option<SharedFont> {
        let mut candidates = parse_family_list(family_list);
        candidates.push(FamilyName::SansSerif);

        for name in &candidates {
            let families = [name.as_family()];
            let query = Query {
                families: &families,
                weight: Weight::NORMAL,
                stretch: Stretch::Normal,
                style: Style::Normal,
            };
            if let Some(font) = self.db.query(&query).and_then(|id| self.load_face(id)) {
                return Some(font);
            }
        }

        let font = self.db.faces().find_map(|face| self.load_face(face.id));
        if font.is_some() {
            tracing::debug!(family = family_list, "Using the first loadable face");
        }
        font
    }

    fn load_face(&self, id: fontdb::ID) -> Option<SharedFont> {
        self.db
            .with_face_data(id, |data, index| {
                Font::try_from_vec_and_index(data.to_vec(), index)
            })
            .flatten()
            .map(Arc::new)
    }
}

fn installed_families(db: &Database) -> Vec<String> {
    let mut names: Vec<String> = db
        .faces()
        .flat_map(|face| face.families.iter().map(|(name, _)| name.clone()))
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Point each generic family at the first preferred family that is
/// installed, or at any installed family when none is.
fn bind_generic_families(db: &mut Database) {
    let installed = installed_families(db);
    let Some(first) = installed.first().cloned() else {
        return;
    };
    let pick = |preferred: &[&str]| -> Option<String> {
        preferred.iter().find_map(|want| {
            installed
                .iter()
                .find(|have| have.eq_ignore_ascii_case(want))
                .cloned()
        })
    };

    let sans = pick(SANS_SERIF_FAMILIES).unwrap_or(first);
    let serif = pick(SERIF_FAMILIES).unwrap_or_else(|| sans.clone());
    let mono = pick(MONOSPACE_FAMILIES).unwrap_or_else(|| sans.clone());
    let cursive = pick(CURSIVE_FAMILIES).unwrap_or_else(|| sans.clone());
    let fantasy = pick(FANTASY_FAMILIES).unwrap_or_else(|| sans.clone());

    tracing::debug!(
        sans_serif = %sans,
        serif = %serif,
        monospace = %mono,
        "Generic font families bound"
    );
    db.set_sans_serif_family(sans);
    db.set_serif_family(serif);
    db.set_monospace_family(mono);
    db.set_cursive_family(cursive);
    db.set_fantasy_family(fantasy);
}
