//! Scoped source overrides
//!
//! [`SourceOverride`] swaps a config type's default sources and clears its
//! singleton for as long as the guard lives. Dropping the guard puts back
//! exactly what was there before, including the previously cached instance,
//! on every exit path (early returns, `?`, panics).

use std::marker::PhantomData;

use crate::resolver::{replace_slot, ConfigClass, Slot};
use crate::source::ConfigSources;

/// Guard returned by [`ConfigClass::change_sources`].
#[must_use = "the override is reverted as soon as the guard is dropped"]
pub struct SourceOverride<T: ConfigClass> {
    saved: Option<Slot>,
    _config: PhantomData<fn() -> T>,
}

impl<T: ConfigClass> SourceOverride<T> {
    /// Enter an override. `None` turns singleton mode off inside the scope.
    pub fn new(sources: Option<ConfigSources>) -> Self {
        tracing::debug!(config = std::any::type_name::<T>(), "Entering config source override");
        let saved = replace_slot::<T>(Slot { sources, instance: None });
        Self { saved: Some(saved), _config: PhantomData }
    }
}

impl<T: ConfigClass> Drop for SourceOverride<T> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            replace_slot::<T>(saved);
            tracing::debug!(config = std::any::type_name::<T>(), "Restored config sources");
        }
    }
}

impl<T: ConfigClass> std::fmt::Debug for SourceOverride<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceOverride").field("config", &std::any::type_name::<T>()).finish()
    }
}

/// Run `f` with `sources` as the default sources of `T`.
pub fn with_sources<T, R, F>(sources: Option<ConfigSources>, f: F) -> R
where
    T: ConfigClass,
    F: FnOnce() -> R,
{
    let _guard = SourceOverride::<T>::new(sources);
    f()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::loaders::DataSource;
    use crate::resolver::Config;
    use serde::Deserialize;
    use serde_json::json;

    fn data(value: serde_json::Value) -> DataSource {
        DataSource::from_value(value).expect("object")
    }

    #[derive(Debug, Deserialize)]
    struct Scoped {
        level: String,
    }

    impl ConfigClass for Scoped {
        fn default_sources() -> Option<ConfigSources> {
            Some(data(json!({"level": "base"})).into())
        }
    }

    #[derive(Debug, Deserialize)]
    struct Disabled {
        #[serde(default)]
        level: String,
    }

    impl ConfigClass for Disabled {
        fn default_sources() -> Option<ConfigSources> {
            Some(data(json!({"level": "singleton"})).into())
        }
    }

    #[test]
    fn test_override_swaps_and_restores() {
        let before = Scoped::load().expect("base");
        assert_eq!(before.level, "base");

        {
            let _guard = Scoped::change_sources(data(json!({"level": "scoped"})));
            let inside = Scoped::load().expect("scoped");
            assert_eq!(inside.level, "scoped");
            assert!(Config::ptr_eq(&inside, &Scoped::load().expect("scoped again")));
        }

        let after = Scoped::load().expect("restored");
        assert!(Config::ptr_eq(&before, &after));
    }

    #[test]
    fn test_none_disables_singleton_inside_scope() {
        let _singleton = Disabled::load().expect("singleton");
        let result = with_sources::<Disabled, _, _>(None, || {
            let mut values = crate::mapping::Mapping::new();
            values.insert("level".to_string(), json!("kw"));
            Disabled::from_values(values)
        });
        assert_eq!(result.expect("keyword values allowed").level, "kw");

        let err = Disabled::from_values(
            json!({"level": "kw"}).as_object().cloned().expect("object"),
        )
        .expect_err("singleton mode again");
        assert!(matches!(err, ConfigError::ConflictingArguments { .. }));
    }
}
