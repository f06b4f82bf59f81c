//! Persistence of the configuration form and the display theme.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{FormInput, Theme};
use crate::infrastructure::traits::KeyValueStore;

/// Record holding the last saved form values.
pub const FORM_KEY: &str = "formData";
/// Record holding the selected theme.
pub const THEME_KEY: &str = "theme";

pub struct FormStore {
    store: Arc<dyn KeyValueStore>,
    default_theme: Theme,
}

impl FormStore {
    pub fn new(store: Arc<dyn KeyValueStore>, default_theme: Theme) -> Self {
        Self {
            store,
            default_theme,
        }
    }

    pub fn save_form(&self, form: &FormInput) -> ApplicationResult<()> {
        let body = serde_json::to_string_pretty(form).map_err(|e| ApplicationError::Storage {
            message: format!("encode {FORM_KEY}: {e}"),
        })?;
        debug!("saving form");
        self.store.set(FORM_KEY, &body).with_key_context("save", FORM_KEY)
    }

    /// The stored form, or `None` if nothing was saved.
    ///
    /// A record that no longer parses is ignored, the same as a missing one.
    pub fn load_form(&self) -> ApplicationResult<Option<FormInput>> {
        let Some(body) = self.store.get(FORM_KEY).with_key_context("load", FORM_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&body) {
            Ok(form) => Ok(Some(form)),
            Err(e) => {
                warn!("ignoring unreadable {}: {}", FORM_KEY, e);
                Ok(None)
            }
        }
    }

    pub fn clear_form(&self) -> ApplicationResult<()> {
        self.store.remove(FORM_KEY).with_key_context("clear", FORM_KEY)
    }

    /// The stored theme, falling back to the configured default.
    pub fn theme(&self) -> ApplicationResult<Theme> {
        let stored = self.store.get(THEME_KEY).with_key_context("load", THEME_KEY)?;
        Ok(stored
            .and_then(|body| match serde_json::from_str::<Theme>(&body) {
                Ok(theme) => Some(theme),
                Err(e) => {
                    warn!("ignoring unreadable {}: {}", THEME_KEY, e);
                    None
                }
            })
            .unwrap_or(self.default_theme))
    }

    pub fn set_theme(&self, theme: Theme) -> ApplicationResult<()> {
        let body = serde_json::to_string(&theme).map_err(|e| ApplicationError::Storage {
            message: format!("encode {THEME_KEY}: {e}"),
        })?;
        self.store.set(THEME_KEY, &body).with_key_context("save", THEME_KEY)
    }

    /// Switch between light and dark, returning the new theme.
    pub fn toggle_theme(&self) -> ApplicationResult<Theme> {
        let next = match self.theme()? {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        };
        self.set_theme(next)?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore(Mutex<HashMap<String, String>>);

    impl KeyValueStore for MemoryStore {
        fn get(&self, key: &str) -> io::Result<Option<String>> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> io::Result<()> {
            self.0.lock().unwrap().insert(key.into(), value.into());
            Ok(())
        }

        fn remove(&self, key: &str) -> io::Result<()> {
            self.0.lock().unwrap().remove(key);
            Ok(())
        }
    }

    #[test]
    fn given_saved_form_when_loading_then_returns_same_values() {
        let store = FormStore::new(Arc::new(MemoryStore::default()), Theme::Light);
        let form = FormInput {
            max_depth: "None".into(),
            ..FormInput::preset()
        };

        store.save_form(&form).unwrap();

        assert_eq!(store.load_form().unwrap(), Some(form));
        store.clear_form().unwrap();
        assert_eq!(store.load_form().unwrap(), None);
    }

    #[test]
    fn given_corrupt_form_record_when_loading_then_none() {
        let backing = Arc::new(MemoryStore::default());
        backing.set(FORM_KEY, "{not json").unwrap();
        let store = FormStore::new(backing, Theme::Light);
        assert_eq!(store.load_form().unwrap(), None);
    }

    #[test]
    fn given_no_theme_when_reading_then_configured_default() {
        let store = FormStore::new(Arc::new(MemoryStore::default()), Theme::Dark);
        assert_eq!(store.theme().unwrap(), Theme::Dark);
    }

    #[test]
    fn given_theme_when_toggling_then_form_record_untouched() {
        let backing = Arc::new(MemoryStore::default());
        let store = FormStore::new(backing.clone(), Theme::Light);
        store.save_form(&FormInput::preset()).unwrap();

        assert_eq!(store.toggle_theme().unwrap(), Theme::Dark);
        assert_eq!(store.theme().unwrap(), Theme::Dark);
        assert_eq!(store.load_form().unwrap(), Some(FormInput::preset()));
        assert_eq!(backing.get(THEME_KEY).unwrap().as_deref(), Some("\"dark\""));
    }
}
