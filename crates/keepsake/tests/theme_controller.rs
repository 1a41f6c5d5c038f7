//! Theme controller behavior across storage and color-scheme sources.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use keepsake::{
    reset_theme_detector, set_theme_detector, use_dark_mode, ColorMode, ColorScheme,
    ManualColorScheme, Storage, SystemColorScheme, ThemePreference,
};
use serial_test::serial;

#[test]
fn test_toggle_cycle_with_dark_os() {
    let storage = Storage::in_memory();
    let scheme = Arc::new(ManualColorScheme::new(Some(true)));
    let theme = use_dark_mode(&storage, Some(scheme), ThemePreference::System);

    assert_eq!(theme.theme(), ColorMode::Dark);

    theme.toggle();
    assert_eq!(theme.preference(), ThemePreference::Dark);
    assert_eq!(theme.theme(), ColorMode::Dark);

    theme.toggle();
    assert_eq!(theme.preference(), ThemePreference::Light);
    assert_eq!(theme.theme(), ColorMode::Light);
}

#[test]
fn test_os_changes_only_matter_in_system_mode() {
    let storage = Storage::in_memory();
    let scheme = Arc::new(ManualColorScheme::new(Some(false)));

    let pinned = use_dark_mode(&storage, Some(scheme.clone()), ThemePreference::Dark);
    scheme.set_prefers_dark(true);
    scheme.set_prefers_dark(false);
    assert_eq!(pinned.theme(), ColorMode::Dark);

    pinned.set_system();
    assert_eq!(pinned.theme(), ColorMode::Light);
    scheme.set_prefers_dark(true);
    assert_eq!(pinned.theme(), ColorMode::Dark);
}

#[test]
fn test_dropped_controller_leaves_no_listener() {
    let storage = Storage::in_memory();
    let scheme = Arc::new(ManualColorScheme::new(Some(false)));
    let calls = Arc::new(AtomicUsize::new(0));

    let theme = use_dark_mode(&storage, Some(scheme.clone()), ThemePreference::System);
    let counter = Arc::clone(&calls);
    let guard = theme.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    drop(theme);

    scheme.set_prefers_dark(true);
    assert_eq!(scheme.listener_count(), 0);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    drop(guard);
}

#[test]
fn test_preference_survives_new_controller() {
    let storage = Storage::in_memory();
    use_dark_mode(&storage, None, ThemePreference::System).set_dark();

    let again = use_dark_mode(&storage, None, ThemePreference::Light);
    assert_eq!(again.preference(), ThemePreference::Dark);
}

#[test]
#[serial]
fn test_system_scheme_drives_controller() {
    set_theme_detector(|| Some(ColorMode::Light));
    let scheme = SystemColorScheme::shared();
    let theme = use_dark_mode(
        &Storage::in_memory(),
        Some(scheme.clone() as Arc<dyn ColorScheme>),
        ThemePreference::System,
    );
    assert_eq!(theme.theme(), ColorMode::Light);

    set_theme_detector(|| Some(ColorMode::Dark));
    assert!(scheme.refresh());
    assert_eq!(theme.theme(), ColorMode::Dark);

    set_theme_detector(|| None);
    scheme.refresh();
    assert_eq!(theme.theme(), ColorMode::Light);

    reset_theme_detector();
}
