use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Visibility of the feed navigation menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuState {
    #[default]
    Hidden,
    Shown,
}

/// Two-state menu toggle shared between the loader and presentation code.
///
/// Cloning yields another handle to the same state. The only transitions are
/// [`toggle`](Self::toggle) and [`force_hidden`](Self::force_hidden).
#[derive(Debug, Clone)]
pub struct MenuController {
    hidden: Arc<AtomicBool>,
}

impl Default for MenuController {
    fn default() -> Self {
        Self::new()
    }
}

impl MenuController {
    pub fn new() -> Self {
        Self {
            hidden: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Flips the menu and returns the new state.
    pub fn toggle(&self) -> MenuState {
        let was_hidden = self.hidden.fetch_xor(true, Ordering::AcqRel);
        let state = if was_hidden {
            MenuState::Shown
        } else {
            MenuState::Hidden
        };
        tracing::trace!(?state, "Menu toggled");
        state
    }

    /// Hides the menu regardless of its current state.
    pub fn force_hidden(&self) {
        self.hidden.store(true, Ordering::Release);
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden.load(Ordering::Acquire)
    }

    pub fn state(&self) -> MenuState {
        if self.is_hidden() {
            MenuState::Hidden
        } else {
            MenuState::Shown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hidden_by_default() {
        let menu = MenuController::new();
        assert!(menu.is_hidden());
        assert_eq!(menu.state(), MenuState::Hidden);
        assert_eq!(MenuState::default(), MenuState::Hidden);
    }

    #[test]
    fn test_toggle_shows_then_hides() {
        let menu = MenuController::new();
        assert_eq!(menu.toggle(), MenuState::Shown);
        assert!(!menu.is_hidden());
        assert_eq!(menu.toggle(), MenuState::Hidden);
        assert!(menu.is_hidden());
    }

    #[test]
    fn test_force_hidden_is_idempotent() {
        let menu = MenuController::new();
        menu.force_hidden();
        assert!(menu.is_hidden());

        menu.toggle();
        menu.force_hidden();
        menu.force_hidden();
        assert!(menu.is_hidden());
    }

    #[test]
    fn test_clones_share_state() {
        let menu = MenuController::new();
        let handle = menu.clone();
        handle.toggle();
        assert_eq!(menu.state(), MenuState::Shown);
    }

    proptest! {
        #[test]
        fn prop_toggle_parity(toggles in 0usize..64) {
            let menu = MenuController::new();
            for _ in 0..toggles {
                menu.toggle();
            }
            prop_assert_eq!(menu.is_hidden(), toggles % 2 == 0);
        }

        #[test]
        fn prop_double_toggle_is_identity(prefix in 0usize..8) {
            let menu = MenuController::new();
            for _ in 0..prefix {
                menu.toggle();
            }
            let before = menu.state();
            menu.toggle();
            menu.toggle();
            prop_assert_eq!(menu.state(), before);
        }
    }
}
