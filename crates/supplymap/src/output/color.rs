//! Color and styling helpers for CLI output.
//!
//! Semantic color theme:
//!   - Focus:      yellow, bold
//!   - Upstream:   red      (suppliers)
//!   - Downstream: blue     (consumers)
//!   - Info:       cyan     (node ids, counts)
//!   - Muted:      dimmed   (field labels, regions)
//!   - Emphasis:   bold     (section headers)

use colored::Colorize;

use super::OutputConfig;
use crate::roles::{Membership, Role};

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply semantic "info" color (cyan) to text.
pub fn info(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

/// Color text by the role of the node it describes.
pub(crate) fn colorize_role(text: &str, role: Role, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    match role {
        Role::Focus => text.yellow().bold().to_string(),
        Role::Upstream => text.red().to_string(),
        Role::Downstream => text.blue().to_string(),
    }
}

/// Short role tag, e.g. `[up]`, colored by role.
///
/// Dual membership is shown as `[up+down]` in the downstream color.
pub(crate) fn membership_tag(membership: Membership, config: &OutputConfig) -> String {
    let tag = match membership {
        Membership::Focus => "[focus]",
        Membership::Upstream => "[up]",
        Membership::Downstream => "[down]",
        Membership::Both => "[up+down]",
    };
    colorize_role(tag, membership.role(), config)
}

/// Apply dimmed style to text (for labels/field names).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (for section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use colored::control::set_override;
    use std::sync::{Mutex, MutexGuard};

    static GLOBAL_STATE_MUTEX: Mutex<()> = Mutex::new(());

    struct ColorGuard<'a> {
        _guard: MutexGuard<'a, ()>,
    }

    impl ColorGuard<'_> {
        fn new() -> Self {
            let guard = GLOBAL_STATE_MUTEX.lock().unwrap();
            set_override(true);
            Self { _guard: guard }
        }
    }

    impl Drop for ColorGuard<'_> {
        fn drop(&mut self) {
            set_override(false);
        }
    }

    fn with_colors_enabled<F, R>(f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = ColorGuard::new();
        f()
    }

    #[test]
    fn roles_get_distinct_ansi_colors() {
        with_colors_enabled(|| {
            let config = OutputConfig::new(80, true);
            let focus = colorize_role("F", Role::Focus, &config);
            let up = colorize_role("U", Role::Upstream, &config);
            let down = colorize_role("D", Role::Downstream, &config);

            assert!(focus.contains("\x1b["));
            assert!(up.contains("\x1b[31m"), "upstream should be red: {up:?}");
            assert!(down.contains("\x1b[34m"), "downstream should be blue: {down:?}");
        });
    }

    #[test]
    fn no_colors_means_plain_text() {
        let config = OutputConfig::new(80, false);
        assert_eq!(colorize_role("F", Role::Focus, &config), "F");
        assert_eq!(membership_tag(Membership::Both, &config), "[up+down]");
        assert_eq!(bold("Header", &config), "Header");
        assert_eq!(dimmed("label", &config), "label");
        assert_eq!(error("boom", &config), "boom");
    }

    #[test]
    fn semantic_colors_with_colors_enabled() {
        with_colors_enabled(|| {
            let config = OutputConfig::new(80, true);
            assert!(warning("w", &config).contains("\x1b[33m"));
            assert!(info("i", &config).contains("\x1b[36m"));
        });
    }
}
