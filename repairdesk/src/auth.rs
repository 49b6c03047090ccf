use crate::config::AuthConfig;
use repairdesk_core::AccessGate;
use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of a password, the form stored in `auth.password_sha256`.
pub fn password_digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Outcome of checking the supplied credentials against the config.
/// With no `auth` section every command is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialGate {
    granted: bool,
}

impl CredentialGate {
    pub fn check(auth: Option<&AuthConfig>, user: Option<&str>, password: Option<&str>) -> Self {
        let granted = match auth {
            None => true,
            Some(a) => match (user, password) {
                (Some(u), Some(p)) => {
                    u == a.username && password_digest(p).eq_ignore_ascii_case(a.password_sha256.trim())
                }
                _ => false,
            },
        };
        CredentialGate { granted }
    }

    pub fn granted(&self) -> bool { self.granted }
}

impl AccessGate for CredentialGate {
    fn mutations_permitted(&self) -> bool { self.granted }
}
