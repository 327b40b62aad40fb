/// Logical pages of the dashboard. Switching views changes chrome only;
/// data loads stay timer- and filter-driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Home,
    Stats,
    Logs,
    Export,
}

impl View {
    pub const ALL: [View; 4] = [View::Home, View::Stats, View::Logs, View::Export];

    pub fn title(&self) -> &'static str {
        match self {
            View::Home => "SCANNER CONTROL",
            View::Stats => "STATISTICS & ANALYTICS",
            View::Logs => "SCAN LOGS",
            View::Export => "DATA EXPORT",
        }
    }

    pub fn nav_label(&self) -> &'static str {
        match self {
            View::Home => "HOME",
            View::Stats => "STATS",
            View::Logs => "LOGS",
            View::Export => "EXPORT",
        }
    }

    /// Keyboard shortcut to view mapping; unknown keys resolve to nothing.
    pub fn from_key(key: char) -> Option<View> {
        match key {
            '1' => Some(View::Home),
            '2' => Some(View::Stats),
            '3' => Some(View::Logs),
            '4' => Some(View::Export),
            _ => None,
        }
    }
}

const DEFAULT_TITLE: &str = "SCANNER CONSOLE";

#[derive(Debug, Default)]
pub struct ViewController {
    active: View,
}

impl ViewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> View {
        self.active
    }

    pub fn switch_to(&mut self, view: View) {
        self.active = view;
    }

    /// Page title for a nav key; unknown keys fall back to the default
    /// title without changing the active view.
    pub fn switch_by_key(&mut self, key: char) -> &'static str {
        match View::from_key(key) {
            Some(view) => {
                self.active = view;
                view.title()
            }
            None => DEFAULT_TITLE,
        }
    }

    pub fn title(&self) -> &'static str {
        self.active.title()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switch_activates_exactly_one_view() {
        let mut nav = ViewController::new();
        assert_eq!(nav.active(), View::Home);

        nav.switch_to(View::Stats);
        assert_eq!(nav.active(), View::Stats);
        assert_eq!(nav.title(), "STATISTICS & ANALYTICS");
    }

    #[test]
    fn unknown_key_falls_back_to_default_title() {
        let mut nav = ViewController::new();
        nav.switch_to(View::Logs);
        assert_eq!(nav.switch_by_key('9'), "SCANNER CONSOLE");
        // Active view is untouched by an unknown key.
        assert_eq!(nav.active(), View::Logs);
    }

    #[test]
    fn known_keys_map_to_views() {
        let mut nav = ViewController::new();
        assert_eq!(nav.switch_by_key('2'), "STATISTICS & ANALYTICS");
        assert_eq!(nav.active(), View::Stats);
        assert_eq!(nav.switch_by_key('4'), "DATA EXPORT");
        assert_eq!(nav.active(), View::Export);
    }
}
