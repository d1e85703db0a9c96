pub const TITLE_MAX_LENGTH: usize = 255;
pub const LINK_MAX_LENGTH: usize = 255;
pub const ATTRIBUTE_NAME_MAX_LENGTH: usize = 255;
pub const USER_NAME_MAX_LENGTH: usize = 255;
pub const PASSWORD_MIN_LENGTH: usize = 5;

pub const PRICE_MAX_DIGITS: usize = 5;
pub const PRICE_DECIMAL_PLACES: usize = 2;

/// Upper bound for JSON request bodies.
pub const BODY_SIZE_LIMIT: u64 = 64 * 1024;

pub const AUTH_SCHEMES: &[&str] = &["Bearer", "Token"];

pub const DEFAULT_TOKEN_LIFETIME_HOURS: i64 = 24;
