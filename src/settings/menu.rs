//! Settings Menu
//!
//! Framework-independent state machine for the settings flyout. The
//! rendering layer feeds it discrete input events; the menu decides
//! whether it is open and writes preference changes to the store.

use serde::Serialize;

use super::store::PreferenceStore;
use super::{keys, SettingsError};

/// Which page family the menu belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuKind {
    Defi,
    Nfts,
}

impl std::str::FromStr for MenuKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "defi" => Ok(MenuKind::Defi),
            "nfts" | "nft" => Ok(MenuKind::Nfts),
            other => Err(format!("Unknown menu kind: {}", other)),
        }
    }
}

/// A toggleable option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuOption {
    pub name: &'static str,
    pub key: &'static str,
    pub help: Option<&'static str>,
}

const STAKING: MenuOption = MenuOption {
    name: "Staking",
    key: keys::STAKING,
    help: Some("Include governance tokens staked in the protocol"),
};

const POOL2: MenuOption = MenuOption {
    name: "Pool2",
    key: keys::POOL2,
    help: Some("Include staked lp tokens where one of the coins in the pair is the governance token"),
};

const BORROWS: MenuOption = MenuOption {
    name: "Borrows",
    key: keys::BORROWED,
    help: Some("Include borrowed coins in lending protocols"),
};

const OFFERS: MenuOption = MenuOption {
    name: "Offers",
    key: keys::OFFERS,
    help: Some("Coins that are approved but not locked"),
};

const TREASURY: MenuOption = MenuOption {
    name: "Treasury",
    key: keys::TREASURY,
    help: Some("Protocol treasury"),
};

const DARK_MODE: MenuOption = MenuOption {
    name: "Dark mode",
    key: keys::DARK_MODE,
    help: None,
};

const DISPLAY_USD: MenuOption = MenuOption {
    name: "Display in USD",
    key: keys::DISPLAY_USD,
    help: Some("Display metrics in USD"),
};

const HIDE_LAST_DAY: MenuOption = MenuOption {
    name: "Hide last day",
    key: keys::HIDE_LAST_DAY,
    help: Some("Hide the last day of data"),
};

/// Extra-TVL options, in menu order
pub const EXTRA_TVL_OPTIONS: [MenuOption; 5] = [STAKING, POOL2, BORROWS, OFFERS, TREASURY];

impl MenuKind {
    /// Options shown in the flyout
    pub fn options(&self) -> Vec<MenuOption> {
        match self {
            MenuKind::Defi => {
                let mut options = EXTRA_TVL_OPTIONS.to_vec();
                options.push(DARK_MODE);
                options
            }
            MenuKind::Nfts => vec![DISPLAY_USD, HIDE_LAST_DAY, DARK_MODE],
        }
    }

    fn has_key(&self, key: &str) -> bool {
        self.options().iter().any(|o| o.key == key)
    }
}

/// Inputs the menu reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEvent {
    /// The menu button was clicked
    ButtonClicked,
    /// A click landed outside the menu
    ClickedOutside,
    /// An option's switch was flipped
    OptionToggled(String),
}

/// An option with its current value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleView {
    pub name: &'static str,
    pub key: &'static str,
    pub help: Option<&'static str>,
    pub enabled: bool,
}

impl ToggleView {
    fn from_option(option: MenuOption, store: &dyn PreferenceStore) -> Self {
        Self {
            name: option.name,
            key: option.key,
            help: option.help,
            enabled: store.get(option.key),
        }
    }
}

/// Settings flyout state
pub struct SettingsMenu<'a> {
    kind: MenuKind,
    open: bool,
    store: &'a dyn PreferenceStore,
}

impl<'a> SettingsMenu<'a> {
    /// A closed menu
    pub fn new(kind: MenuKind, store: &'a dyn PreferenceStore) -> Self {
        Self {
            kind,
            open: false,
            store,
        }
    }

    pub fn kind(&self) -> MenuKind {
        self.kind
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Apply one event.
    ///
    /// Toggles only take effect while the menu is open and only for keys
    /// the menu shows; anything else is ignored.
    pub fn handle(&mut self, event: MenuEvent) -> Result<(), SettingsError> {
        match event {
            MenuEvent::ButtonClicked => self.open = !self.open,
            MenuEvent::ClickedOutside => self.open = false,
            MenuEvent::OptionToggled(key) => {
                if !self.open {
                    tracing::debug!(key = %key, "Ignoring toggle on closed menu");
                } else if !self.kind.has_key(&key) {
                    return Err(SettingsError::UnknownKey(key));
                } else {
                    let enabled = self.store.toggle(&key)?;
                    tracing::debug!(key = %key, enabled, "Preference toggled");
                }
            }
        }
        Ok(())
    }

    /// Toggles to render, empty while closed
    pub fn toggles(&self) -> Vec<ToggleView> {
        if !self.open {
            return Vec::new();
        }
        self.kind
            .options()
            .into_iter()
            .map(|o| ToggleView::from_option(o, self.store))
            .collect()
    }
}

/// Inline toggle row shown above charts.
///
/// On the NFT overview (`/nfts`) the USD switch is hidden.
pub fn check_marks(kind: MenuKind, route: &str, store: &dyn PreferenceStore) -> Vec<ToggleView> {
    let options = match kind {
        MenuKind::Defi => vec![STAKING, BORROWS],
        MenuKind::Nfts => {
            let mut options = Vec::new();
            if route != "/nfts" {
                options.push(DISPLAY_USD);
            }
            options.push(HIDE_LAST_DAY);
            options
        }
    };

    options
        .into_iter()
        .map(|o| ToggleView::from_option(o, store))
        .collect()
}
