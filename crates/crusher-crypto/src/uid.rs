use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of the random suffix appended to fragment keys.
pub const FRAGMENT_ID_LEN: usize = 6;

/// Generate a random alphanumeric identifier of `len` characters.
///
/// No uniqueness check is made against keys already in the store.
pub fn generate_uid(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
