//! Read-only handle to a constructed config instance

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// A constructed configuration instance.
///
/// Fields are readable through `Deref`. There is no way to reach the value
/// mutably or to take it out of the handle, so an instance stays exactly as it
/// was built for as long as any handle to it exists.
///
/// ```
/// use confstack::{Config, ConfigClass, DataSource};
/// use serde::Deserialize;
/// use serde_json::json;
///
/// #[derive(Deserialize)]
/// struct App {
///     port: u16,
/// }
///
/// impl ConfigClass for App {}
///
/// let source = DataSource::from_value(json!({"port": "8080"})).unwrap();
/// let app: Config<App> = App::from_sources(source).unwrap();
/// assert_eq!(app.port, 8080);
/// ```
///
/// Assigning to a field does not compile:
///
/// ```compile_fail
/// use confstack::{Config, ConfigClass, DataSource};
/// use serde::Deserialize;
/// use serde_json::json;
///
/// #[derive(Deserialize)]
/// struct App {
///     port: u16,
/// }
///
/// impl ConfigClass for App {}
///
/// let source = DataSource::from_value(json!({"port": 1})).unwrap();
/// let mut app: Config<App> = App::from_sources(source).unwrap();
/// app.port = 9999;
/// ```
///
/// Neither does reaching for the shared allocation:
///
/// ```compile_fail
/// use confstack::{Config, ConfigClass, DataSource};
/// use serde::Deserialize;
/// use serde_json::json;
///
/// #[derive(Deserialize)]
/// struct App {
///     port: u16,
/// }
///
/// impl ConfigClass for App {}
///
/// let source = DataSource::from_value(json!({"port": 1})).unwrap();
/// let mut app: Config<App> = App::from_sources(source).unwrap();
/// std::sync::Arc::get_mut(&mut app).unwrap().port = 9999;
/// ```
pub struct Config<T>(Arc<T>);

impl<T> Config<T> {
    pub(crate) fn new(inner: Arc<T>) -> Self {
        Self(inner)
    }

    /// Whether both handles point at the same instance.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }
}

impl<T> Deref for Config<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> Clone for Config<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Config<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
