//! Constants for the HubSpot v3 Web API

use std::time::Duration;

/// Default base URL for the HubSpot API
pub const API_BASE_URL: &str = "https://api.hubapi.com";

/// Browser endpoint that starts the OAuth authorization flow
pub const AUTHORIZE_URL: &str = "https://app.hubspot.com/oauth/authorize";

/// Hard per-request record cap enforced by the HubSpot API
pub const BATCH_SIZE: usize = 100;

/// Safety cap on pagination iterations, guards against server-side cursor bugs
pub const MAX_BATCHES: usize = 100;

/// Target record count used when the caller does not specify a limit.
/// HubSpot paginates in batches of 100 regardless, so this is a practical
/// "unlimited" ceiling rather than a real one.
pub const DEFAULT_TARGET_LIMIT: usize = 100_000;

/// Courtesy pause between pagination requests (pacing, not retry/backoff)
pub const INTER_BATCH_DELAY: Duration = Duration::from_millis(100);

/// Refresh the token on demand when it expires within this margin
pub const REACTIVE_REFRESH_MARGIN_MS: i64 = 60_000;

/// Refresh the token proactively when it expires within this margin
pub const PROACTIVE_REFRESH_MARGIN_MS: i64 = 300_000;

/// Timeout for single-shot API calls (token exchange, record fetch, metadata)
pub const SIMPLE_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for paginated search/list calls, which can be slow on large portals
pub const PAGINATED_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Lifetime assumed for a token when the refresh response omits `expires_in`
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Capacity of the auto-captured recent query list
pub const RECENT_QUERIES_CAP: usize = 20;

/// Capacity of the quick-link bookmark list
pub const QUICK_LINKS_CAP: usize = 10;

/// Staleness window for the cached property metadata
pub const PROPERTY_CACHE_TTL_MS: i64 = 24 * 60 * 60 * 1000;

/// Standard CRM object types with first-class API endpoints. Anything else
/// is passed through as a custom object API name.
pub const STANDARD_OBJECT_TYPES: &[&str] = &[
    "contacts", "companies", "deals", "tickets", "notes", "meetings", "calls", "emails", "tasks",
];

/// Scopes requested during the OAuth authorization flow
pub const REQUIRED_SCOPES: &[&str] = &[
    "crm.lists.read",
    "crm.objects.companies.read",
    "crm.objects.contacts.read",
    "crm.objects.deals.read",
    "crm.objects.quotes.read",
    "crm.schemas.companies.read",
    "crm.schemas.contacts.read",
    "crm.schemas.deals.read",
    "crm.schemas.quotes.read",
    "oauth",
    "tickets",
];

/// Scopes requested as optional, granted only if the portal allows them
pub const OPTIONAL_SCOPES: &[&str] = &[
    "crm.objects.custom.read",
    "crm.objects.invoices.read",
    "crm.objects.line_items.read",
    "crm.schemas.custom.read",
    "crm.schemas.invoices.read",
    "crm.schemas.line_items.read",
    "crm.schemas.subscriptions.read",
];
