//! Payloads for the import credential objects.
//!
//! The caller owns creating the secret and config map; this only shapes the
//! provider secret's data into what the importer expects.

use std::collections::BTreeMap;
use tracing::warn;

/// Provider secret key holding the API user.
pub const USER_KEY: &str = "user";
/// Provider secret key holding the API password.
pub const PASSWORD_KEY: &str = "password";
/// Provider secret key holding the CA certificate.
pub const CACERT_KEY: &str = "cacert";

/// Importer secret key for the user.
pub const ACCESS_KEY_ID: &str = "accessKeyId";
/// Importer secret key for the password.
pub const SECRET_KEY: &str = "secretKey";
/// Config map key for the CA certificate.
pub const CA_PEM: &str = "ca.pem";

fn lookup<'a>(data: &'a BTreeMap<String, Vec<u8>>, key: &str) -> &'a [u8] {
    match data.get(key) {
        Some(value) => value.as_slice(),
        None => {
            warn!(key = %key, "Provider secret is missing key, using empty value");
            &[]
        }
    }
}

/// String data for the importer credential secret.
pub fn secret_data(provider: &BTreeMap<String, Vec<u8>>) -> BTreeMap<String, String> {
    BTreeMap::from([
        (
            ACCESS_KEY_ID.to_string(),
            String::from_utf8_lossy(lookup(provider, USER_KEY)).into_owned(),
        ),
        (
            SECRET_KEY.to_string(),
            String::from_utf8_lossy(lookup(provider, PASSWORD_KEY)).into_owned(),
        ),
    ])
}

/// Binary data for the CA certificate config map.
pub fn config_map_data(provider: &BTreeMap<String, Vec<u8>>) -> BTreeMap<String, Vec<u8>> {
    BTreeMap::from([(CA_PEM.to_string(), lookup(provider, CACERT_KEY).to_vec())])
}
