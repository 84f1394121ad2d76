/// Fixed configuration: provider endpoint, storage field names, page selectors

/// VoilaNorbert name search endpoint
pub const SEARCH_ENDPOINT: &str = "https://api.voilanorbert.com/2018-01-08/search/name";

/// The provider ignores the Basic auth username; only the password (API key) matters.
pub const AUTH_USERNAME: &str = "any_string";

/// Confidence assigned to a first-name@domain guess
pub const GUESS_SCORE: f64 = 0.5;

// chrome.storage.sync field names
pub const API_KEY_FIELD: &str = "voilaNorbertKey";
pub const SENDER_NAME_FIELD: &str = "senderName";

// Message tags understood by the background worker
pub const FIND_EMAIL: &str = "FIND_EMAIL";
pub const CLEAR_CACHE: &str = "CLEAR_CACHE";

// Work at a Startup page structure
pub const FOUNDER_SELECTOR: &str = ".flex.flex-row .font-medium";
pub const WEBSITE_SELECTOR: &str = "a[href*=\"/website\"]";

// Injected markup
pub const BUTTON_MARKER: &str = "data-has-email-button";
pub const CONTAINER_CLASS: &str = "email-founder-container";
pub const BUTTON_CLASS: &str = "email-founder-btn";
pub const BUTTON_LABEL: &str = "Email founder";
pub const CHECKMARK_CLASS: &str = "email-founder-check";
pub const CHECKMARK_TITLE: &str = "Email found in cache";
pub const CONTAINER_STYLE: &str = "display: inline-flex; align-items: center; gap: 4px;";
pub const CHECKMARK_STYLE: &str = "color: #34D399; font-weight: bold; font-size: 16px;";

/// Delay before a requested page scan runs; later requests restart the timer.
pub const SCAN_DEBOUNCE_MS: i32 = 100;

pub const GMAIL_COMPOSE_URL: &str = "https://mail.google.com/mail/";
