//! Player model catalog
//!
//! Bots get a random cosmetic model per faction. The catalog is rebuilt from
//! the model descriptor listing every time the population is checked.

use crate::config::ModelSettings;
use crate::engine::ModelSource;
use crate::types::Faction;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

/// Descriptor extension used when none is configured
pub const DEFAULT_EXTENSION: &str = ".tik";

/// Marks first-person arm models, which are never player models
const FIRST_PERSON_MARKER: &str = "_fps";

const ALLIED_PREFIXES: [&str; 2] = ["/allied_", "/american_"];
const GERMAN_PREFIXES: [&str; 3] = ["/german_", "/IT_", "/SC_"];

fn has_prefix_ignore_case(filename: &str, prefix: &str) -> bool {
    filename
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn has_suffix_ignore_case(filename: &str, suffix: &str) -> bool {
    filename.len() >= suffix.len()
        && filename
            .get(filename.len() - suffix.len()..)
            .is_some_and(|tail| tail.eq_ignore_ascii_case(suffix))
}

fn is_first_person_model(filename: &str, extension: &str) -> bool {
    has_suffix_ignore_case(filename, &format!("{}{}", FIRST_PERSON_MARKER, extension))
}

/// Whether a listed descriptor names an allied player model
pub fn is_allied_player_model(filename: &str) -> bool {
    ALLIED_PREFIXES
        .iter()
        .any(|prefix| has_prefix_ignore_case(filename, prefix))
}

/// Whether a listed descriptor names a german player model
pub fn is_german_player_model(filename: &str) -> bool {
    GERMAN_PREFIXES
        .iter()
        .any(|prefix| has_prefix_ignore_case(filename, prefix))
}

/// Whether a `.tik` descriptor is a selectable player model
pub fn is_player_model(filename: &str) -> bool {
    classify_with_extension(filename, DEFAULT_EXTENSION).is_some()
}

/// Classify a `.tik` descriptor, `None` when it is not a player model
pub fn classify(filename: &str) -> Option<Faction> {
    classify_with_extension(filename, DEFAULT_EXTENSION)
}

/// Classify a descriptor listed with the given extension
pub fn classify_with_extension(filename: &str, extension: &str) -> Option<Faction> {
    if is_first_person_model(filename, extension) {
        None
    } else if is_allied_player_model(filename) {
        Some(Faction::Allied)
    } else if is_german_player_model(filename) {
        Some(Faction::German)
    } else {
        None
    }
}

/// Model name as used in userinfo: leading separator and extension removed
fn model_name(filename: &str, extension: &str) -> String {
    let end = if has_suffix_ignore_case(filename, extension) {
        filename.len() - extension.len()
    } else {
        filename.len()
    };
    filename.get(1..end.max(1)).unwrap_or_default().to_string()
}

/// Player models available on this server, split by faction
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    allied: Vec<String>,
    german: Vec<String>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a `.tik` descriptor listing
    pub fn from_listing(files: &[String]) -> Self {
        Self::from_listing_with_extension(files, DEFAULT_EXTENSION)
    }

    /// Build a catalog from a listing of descriptors with the given extension
    pub fn from_listing_with_extension(files: &[String], extension: &str) -> Self {
        let mut catalog = Self::new();
        catalog.rebuild(files, extension);
        catalog
    }

    /// Clear and repopulate both factions from the model source. A failed
    /// listing leaves the catalog empty.
    pub fn refresh(&mut self, source: &dyn ModelSource, settings: &ModelSettings) {
        self.clear();

        match source.list_files(&settings.directory, &settings.extension) {
            Ok(files) => self.rebuild(&files, &settings.extension),
            Err(e) => warn!("Failed to list player models: {}", e),
        }
    }

    /// Drop every model
    pub fn clear(&mut self) {
        self.allied = Vec::new();
        self.german = Vec::new();
    }

    fn rebuild(&mut self, files: &[String], extension: &str) {
        let factions: Vec<Option<Faction>> = files
            .iter()
            .map(|f| classify_with_extension(f, extension))
            .collect();
        let allied_count = factions
            .iter()
            .filter(|f| **f == Some(Faction::Allied))
            .count();
        let german_count = factions
            .iter()
            .filter(|f| **f == Some(Faction::German))
            .count();

        let mut allied = Vec::with_capacity(allied_count);
        let mut german = Vec::with_capacity(german_count);
        for (filename, faction) in files.iter().zip(factions) {
            match faction {
                Some(Faction::Allied) => allied.push(model_name(filename, extension)),
                Some(Faction::German) => german.push(model_name(filename, extension)),
                None => {}
            }
        }

        debug!(
            "Model catalog rebuilt: {} allied, {} german out of {} files",
            allied.len(),
            german.len(),
            files.len()
        );

        self.allied = allied;
        self.german = german;
    }

    /// Models of one faction, in listing order
    pub fn models(&self, faction: Faction) -> &[String] {
        match faction {
            Faction::Allied => &self.allied,
            Faction::German => &self.german,
        }
    }

    pub fn len(&self) -> usize {
        self.allied.len() + self.german.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Uniformly random model of a faction, `None` when the faction is empty
    pub fn pick_random<R: Rng + ?Sized>(&self, faction: Faction, rng: &mut R) -> Option<&str> {
        self.models(faction).choose(rng).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{MockModelSource, StaticModelSource};
    use crate::error::BotError;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn listing() -> Vec<String> {
        [
            "/allied_airborne.tik",
            "/american_army.tik",
            "/allied_airborne_fps.tik",
            "/german_wehrmacht_soldier.tik",
            "/IT_italian_soldier.tik",
            "/sc_officer.tik",
            "/german_panzer_fps.TIK",
            "/civilian.tik",
            "/alliedfake.tik",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn test_first_person_models_rejected() {
        assert!(!is_player_model("/allied_airborne_fps.tik"));
        assert!(!is_player_model("/german_soldier_FPS.tik"));
        assert!(!is_player_model("_fps.tik"));
        assert!(is_player_model("/allied_airborne.tik"));
    }

    #[test]
    fn test_prefix_classification() {
        assert_eq!(classify("/American_army.tik"), Some(Faction::Allied));
        assert_eq!(classify("/it_soldier.tik"), Some(Faction::German));
        assert_eq!(classify("/SC_officer.tik"), Some(Faction::German));
        assert_eq!(classify("/civilian.tik"), None);
        assert_eq!(classify("allied_missing_slash.tik"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn test_catalog_partitions_listing() {
        let catalog = ModelCatalog::from_listing(&listing());

        assert_eq!(
            catalog.models(Faction::Allied),
            ["allied_airborne", "american_army"]
        );
        assert_eq!(
            catalog.models(Faction::German),
            ["german_wehrmacht_soldier", "IT_italian_soldier", "sc_officer"]
        );
        assert_eq!(catalog.len(), 5);
    }

    #[test]
    fn test_pick_random_is_member_or_none() {
        let mut rng = SmallRng::seed_from_u64(7);
        let catalog = ModelCatalog::from_listing(&listing());

        for _ in 0..20 {
            let pick = catalog.pick_random(Faction::German, &mut rng).unwrap();
            assert!(catalog.models(Faction::German).iter().any(|m| m == pick));
        }

        let empty = ModelCatalog::new();
        assert!(empty.pick_random(Faction::Allied, &mut rng).is_none());
    }

    #[test]
    fn test_refresh_uses_configured_listing() {
        let mut source = MockModelSource::new();
        source
            .expect_list_files()
            .withf(|dir, ext| dir == "models/player" && ext == ".tik")
            .times(1)
            .returning(|_, _| Ok(vec!["/german_officer.tik".to_string()]));

        let mut catalog = ModelCatalog::from_listing(&listing());
        catalog.refresh(&source, &ModelSettings::default());

        assert!(catalog.models(Faction::Allied).is_empty());
        assert_eq!(catalog.models(Faction::German), ["german_officer"]);
    }

    #[test]
    fn test_refresh_honours_configured_extension() {
        let source = StaticModelSource::new([
            "/allied_airborne.skel",
            "/german_officer_fps.skel",
            "/IT_soldier.SKEL",
        ]);
        let settings = ModelSettings {
            extension: ".skel".to_string(),
            ..Default::default()
        };

        let mut catalog = ModelCatalog::new();
        catalog.refresh(&source, &settings);

        assert_eq!(catalog.models(Faction::Allied), ["allied_airborne"]);
        assert_eq!(catalog.models(Faction::German), ["IT_soldier"]);
        assert_eq!(
            classify_with_extension("/german_officer_fps.skel", ".skel"),
            None
        );
    }

    #[test]
    fn test_failed_listing_leaves_catalog_empty() {
        let mut source = MockModelSource::new();
        source.expect_list_files().returning(|dir, _| {
            Err(BotError::ModelListing {
                directory: dir.to_string(),
                message: "no such directory".to_string(),
            }
            .into())
        });

        let mut catalog = ModelCatalog::from_listing(&listing());
        catalog.refresh(&source, &ModelSettings::default());
        assert!(catalog.is_empty());
    }
}
