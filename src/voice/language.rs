//! Active locale holder with change listeners

use crate::locale::Locale;

type Listener = Box<dyn Fn(Locale) + Send + Sync>;

/// Holds the active locale and notifies dependents when it changes
pub struct LanguageSelector {
    locale: Locale,
    listeners: Vec<Listener>,
}

impl LanguageSelector {
    /// Create a selector starting at `locale`
    #[must_use]
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            listeners: Vec::new(),
        }
    }

    /// Register a listener; listeners run in registration order
    pub fn subscribe(&mut self, listener: impl Fn(Locale) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Set the active locale and notify every listener synchronously
    pub fn set_locale(&mut self, locale: Locale) {
        tracing::debug!(from = %self.locale, to = %locale, "locale selected");
        self.locale = locale;
        for listener in &self.listeners {
            listener(locale);
        }
    }

    /// Currently active locale
    #[must_use]
    pub const fn current_locale(&self) -> Locale {
        self.locale
    }
}

impl Default for LanguageSelector {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}

impl std::fmt::Debug for LanguageSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageSelector")
            .field("locale", &self.locale)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
