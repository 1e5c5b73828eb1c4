//! Session cookie settings read from the environment.
//!
//! Debug builds fall back to lenient defaults with a warning; release builds
//! refuse to start on missing or malformed toggles, a short key file or an
//! ephemeral key.

use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroize;

pub const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
pub const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
pub const SAMESITE_ENV: &str = "SESSION_SAMESITE";
pub const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";

const KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
const KEY_MIN_LEN: usize = 64;
const FINGERPRINT_BYTES: usize = 8;
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Which validation regime applies.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    Debug,
    Release,
}

impl BuildMode {
    /// `Debug` when compiled with debug assertions.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }
}

/// Validated session cookie settings.
pub struct SessionSettings {
    pub key: Key,
    pub cookie_secure: bool,
    pub same_site: SameSite,
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Environment reader that applies the build-mode policy.
struct Toggles<'a, E> {
    env: &'a E,
    mode: BuildMode,
}

impl<E: Env> Toggles<'_, E> {
    /// Return `fallback` in debug builds (after `note` is logged), or `error`
    /// in release builds.
    fn lenient<T>(
        &self,
        fallback: T,
        error: SessionConfigError,
        note: &str,
    ) -> Result<T, SessionConfigError> {
        match self.mode {
            BuildMode::Debug => {
                warn!(%error, "{note}");
                Ok(fallback)
            }
            BuildMode::Release => Err(error),
        }
    }

    fn flag(&self, name: &'static str, fallback: bool) -> Result<bool, SessionConfigError> {
        let Some(value) = self.env.string(name) else {
            return self.lenient(fallback, SessionConfigError::MissingEnv { name }, "using default");
        };
        match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            _ => self.lenient(
                fallback,
                SessionConfigError::InvalidEnv {
                    name,
                    value,
                    expected: BOOL_EXPECTED,
                },
                "using default",
            ),
        }
    }

    fn same_site(&self, cookie_secure: bool) -> Result<SameSite, SessionConfigError> {
        let fallback = match self.mode {
            BuildMode::Debug => SameSite::Lax,
            BuildMode::Release => SameSite::Strict,
        };
        let Some(value) = self.env.string(SAMESITE_ENV) else {
            return self.lenient(
                fallback,
                SessionConfigError::MissingEnv { name: SAMESITE_ENV },
                "using default",
            );
        };
        match value.to_ascii_lowercase().as_str() {
            "lax" => Ok(SameSite::Lax),
            "strict" => Ok(SameSite::Strict),
            "none" if cookie_secure => Ok(SameSite::None),
            "none" => self.lenient(
                SameSite::None,
                SessionConfigError::InsecureSameSiteNone,
                "browsers may reject SameSite=None cookies without Secure",
            ),
            _ => self.lenient(
                fallback,
                SessionConfigError::InvalidEnv {
                    name: SAMESITE_ENV,
                    value,
                    expected: SAMESITE_EXPECTED,
                },
                "using default",
            ),
        }
    }

    fn key(&self, allow_ephemeral: bool) -> Result<Key, SessionConfigError> {
        let path = PathBuf::from(
            self.env
                .string(KEY_FILE_ENV)
                .unwrap_or_else(|| KEY_DEFAULT_PATH.to_owned()),
        );
        match std::fs::read(&path) {
            Ok(mut bytes) => {
                let length = bytes.len();
                if self.mode == BuildMode::Release && length < KEY_MIN_LEN {
                    bytes.zeroize();
                    return Err(SessionConfigError::KeyTooShort {
                        path,
                        length,
                        min_len: KEY_MIN_LEN,
                    });
                }
                let key = Key::derive_from(&bytes);
                bytes.zeroize();
                Ok(key)
            }
            Err(source) if self.mode == BuildMode::Debug || allow_ephemeral => {
                warn!(path = %path.display(), error = %source, "using temporary session key (dev only)");
                Ok(Key::generate())
            }
            Err(source) => Err(SessionConfigError::KeyRead { path, source }),
        }
    }
}

/// Build session settings from the environment.
///
/// # Errors
///
/// Release mode only; debug mode always yields settings.
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let toggles = Toggles { env, mode };
    let cookie_secure = toggles.flag(COOKIE_SECURE_ENV, true)?;
    let same_site = toggles.same_site(cookie_secure)?;
    let allow_ephemeral = toggles.flag(ALLOW_EPHEMERAL_ENV, false)?;
    if allow_ephemeral && mode == BuildMode::Release {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    let key = toggles.key(allow_ephemeral)?;
    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

/// Short hex fingerprint of the signing key, safe to log.
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}
