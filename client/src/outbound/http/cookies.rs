//! Session cookie jar for the reqwest transport.
//!
//! Wraps [`reqwest::cookie::Jar`] so that logout can forget every cookie,
//! and optionally mirrors the cookies to `cookies.json` in the state
//! directory so a later process resumes the same backend session.

use std::collections::BTreeMap;
use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard};

use cap_std::fs::Dir;
use reqwest::Url;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderValue;
use tracing::{debug, warn};

use crate::outbound::storage::write_atomic;

/// File the persistent jar is mirrored to.
pub const COOKIE_FILE_NAME: &str = "cookies.json";

/// Clearable, optionally persistent cookie store.
pub struct SessionCookies {
    jar: RwLock<Jar>,
    origins: Mutex<BTreeMap<String, String>>,
    dir: Option<Dir>,
}

impl SessionCookies {
    /// Cookies that live only as long as the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            jar: RwLock::new(Jar::default()),
            origins: Mutex::new(BTreeMap::new()),
            dir: None,
        }
    }

    /// Cookies mirrored to `dir`, starting from whatever was saved there.
    ///
    /// An unreadable cookie file is ignored with a warning.
    #[must_use]
    pub fn persistent(dir: Dir) -> Self {
        let origins = read_origins(&dir);
        let jar = Jar::default();
        for (origin, header) in &origins {
            match Url::parse(origin) {
                Ok(url) => {
                    for pair in header.split("; ").filter(|pair| !pair.is_empty()) {
                        jar.add_cookie_str(pair, &url);
                    }
                }
                Err(err) => warn!(%origin, error = %err, "skipping saved cookies for bad origin"),
            }
        }
        debug!(origins = origins.len(), "session cookies restored");
        Self {
            jar: RwLock::new(jar),
            origins: Mutex::new(origins),
            dir: Some(dir),
        }
    }

    /// Forget every cookie, in memory and on disk.
    pub fn clear(&self) {
        *self.jar.write().unwrap_or_else(PoisonError::into_inner) = Jar::default();
        self.lock_origins().clear();
        if let Some(dir) = &self.dir {
            match dir.remove_file(COOKIE_FILE_NAME) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => warn!(error = %err, "failed to remove saved cookies"),
            }
        }
        debug!("session cookies cleared");
    }

    /// Whether no origin currently holds cookies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock_origins().is_empty()
    }

    fn read_jar(&self) -> RwLockReadGuard<'_, Jar> {
        self.jar.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_origins(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.origins.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, origins: &BTreeMap<String, String>) {
        let Some(dir) = &self.dir else {
            return;
        };
        let result = serde_json::to_string_pretty(origins)
            .map_err(io::Error::other)
            .and_then(|text| write_atomic(dir, COOKIE_FILE_NAME, text.as_bytes()));
        if let Err(err) = result {
            warn!(error = %err, "failed to save session cookies");
        }
    }
}

impl CookieStore for SessionCookies {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let origin = origin_of(url);
        let current = {
            let jar = self.read_jar();
            jar.set_cookies(cookie_headers, url);
            jar.cookies(&origin)
        };
        let mut origins = self.lock_origins();
        match current.and_then(|value| value.to_str().ok().map(str::to_owned)) {
            Some(header) => {
                origins.insert(origin.to_string(), header);
            }
            None => {
                origins.remove(origin.as_str());
            }
        }
        self.persist(&origins);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.read_jar().cookies(url)
    }
}

fn origin_of(url: &Url) -> Url {
    let mut origin = url.clone();
    origin.set_path("/");
    origin.set_query(None);
    origin.set_fragment(None);
    origin
}

fn read_origins(dir: &Dir) -> BTreeMap<String, String> {
    let text = match dir.read_to_string(COOKIE_FILE_NAME) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(err) => {
            warn!(error = %err, "saved cookies unreadable; starting without a session");
            return BTreeMap::new();
        }
    };
    serde_json::from_str(&text).unwrap_or_else(|err| {
        warn!(error = %err, "saved cookies corrupt; starting without a session");
        BTreeMap::new()
    })
}
