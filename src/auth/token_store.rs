use keyring::Entry;
use thiserror::Error;

const SERVICE: &str = "alertlink";
const ACCOUNT: &str = "github";

#[derive(Debug, Error)]
#[error("keyring access failed: {0}")]
pub struct CredentialError(#[from] keyring::Error);

pub fn save_token(token: &str) -> Result<(), CredentialError> {
    let entry = Entry::new(SERVICE, ACCOUNT)?;
    entry.set_password(token)?;
    Ok(())
}

/// Stored token, or `None` when the keyring holds nothing for alertlink.
pub fn load_token() -> Result<Option<String>, CredentialError> {
    let entry = Entry::new(SERVICE, ACCOUNT)?;
    match entry.get_password() {
        Ok(token) => Ok(Some(token)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn delete_token() -> Result<(), CredentialError> {
    let entry = Entry::new(SERVICE, ACCOUNT)?;
    match entry.delete_password() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
