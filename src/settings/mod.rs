//! Display Settings
//!
//! Boolean display preferences (extra TVL categories, dark mode, NFT
//! display options) read and written through a [`PreferenceStore`], and
//! the [`SettingsMenu`] state machine that edits them.

mod menu;
mod store;

pub use menu::{check_marks, MenuEvent, MenuKind, MenuOption, SettingsMenu, ToggleView, EXTRA_TVL_OPTIONS};
pub use store::{FilePreferenceStore, MemoryPreferenceStore, PreferenceChange, PreferenceStore};

use thiserror::Error;

use crate::aggregate::ExtraTvlToggles;

/// Preference keys
pub mod keys {
    pub const STAKING: &str = "staking";
    pub const POOL2: &str = "pool2";
    pub const BORROWED: &str = "borrowed";
    pub const OFFERS: &str = "offers";
    pub const TREASURY: &str = "treasury";
    pub const DARK_MODE: &str = "darkmode";
    pub const HIDE_LAST_DAY: &str = "hide_last_day";
    pub const DISPLAY_USD: &str = "display_usd";

    /// Every known key
    pub const ALL: [&str; 8] = [
        STAKING,
        POOL2,
        BORROWED,
        OFFERS,
        TREASURY,
        DARK_MODE,
        HIDE_LAST_DAY,
        DISPLAY_USD,
    ];

    pub fn is_known(key: &str) -> bool {
        ALL.contains(&key)
    }
}

/// Errors from preference storage and the settings menu
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid preference file: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Unknown preference: {0}")]
    UnknownKey(String),

    #[error("Lock error: {0}")]
    Lock(String),
}

/// Extra-TVL categories currently enabled in `store`
pub fn extra_tvl_toggles(store: &dyn PreferenceStore) -> ExtraTvlToggles {
    let mut toggles = ExtraTvlToggles::new();
    for option in EXTRA_TVL_OPTIONS {
        toggles.set(option.key, store.get(option.key));
    }
    toggles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extra_tvl_toggles_from_store() {
        let store = MemoryPreferenceStore::new();
        store.set(keys::STAKING, true).unwrap();
        store.set(keys::DARK_MODE, true).unwrap();

        let toggles = extra_tvl_toggles(&store);
        assert!(toggles.is_enabled("staking"));
        assert!(!toggles.is_enabled("pool2"));
        assert!(!toggles.is_enabled("darkmode"));
    }

    #[test]
    fn test_known_keys() {
        assert!(keys::is_known("pool2"));
        assert!(!keys::is_known("doublecounted"));
    }

    #[test]
    fn test_menu_options_are_parseable_categories() {
        let list: Vec<&str> = EXTRA_TVL_OPTIONS.iter().map(|o| o.key).collect();
        let toggles = ExtraTvlToggles::try_parse_list(&list.join(",")).unwrap();

        for category in crate::aggregate::EXTRA_TVL_CATEGORIES {
            assert!(toggles.is_enabled(category));
        }
    }
}
