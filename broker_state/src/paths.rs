//! Key layout of the broker's metadata namespace.

/// Prefix under which database descriptors are stored.
pub const DATABASE_CONFIG_PATH: &str = "/database/config";

/// Prefix under which storage cluster registrations are stored.
pub const STORAGE_CONFIG_PATH: &str = "/storage/config";

pub fn storage_config_path(namespace: &str) -> String {
    format!("{STORAGE_CONFIG_PATH}/{namespace}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths() {
        assert_eq!(storage_config_path("cluster"), "/storage/config/cluster");
        assert!(storage_config_path("cluster").starts_with(STORAGE_CONFIG_PATH));
    }
}
