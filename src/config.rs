use std::env;

/// Per-IP rate limit tiers, requests per minute.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub strict_rpm: u32,
    pub standard_rpm: u32,
    pub relaxed_rpm: u32,
}

/// Canada Post rating API credentials. The resolver falls back to static
/// tables whenever this is absent.
#[derive(Debug, Clone)]
pub struct CanadaPostConfig {
    pub api_key: String,
    pub api_secret: String,
    pub customer_number: String,
    pub api_url: String,
}

/// Resend email settings. `api_key` absent means email is disabled (log only).
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_key: Option<String>,
    pub from_email: String,
    pub admin_email: Option<String>,
    pub audience_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Public site URL, used for payment return URLs (e.g. https://shop.example.com)
    pub site_url: String,
    pub dev_mode: bool,
    pub stripe_secret_key: Option<String>,
    pub email: EmailConfig,
    pub canada_post: Option<CanadaPostConfig>,
    /// Warehouse postal code used as the rating origin.
    pub origin_postal_code: String,
    pub rate_limit: RateLimitConfig,
}

fn env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("HEIRBLOOM_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let site_url =
            env::var("SITE_URL").unwrap_or_else(|_| format!("http://{}:{}", host, port));

        // Canada Post is optional; all three credentials must be present.
        let canada_post = match (
            env::var("CANADA_POST_API_KEY"),
            env::var("CANADA_POST_API_SECRET"),
            env::var("CANADA_POST_CUSTOMER_NUMBER"),
        ) {
            (Ok(api_key), Ok(api_secret), Ok(customer_number)) => Some(CanadaPostConfig {
                api_key,
                api_secret,
                customer_number,
                api_url: env::var("CANADA_POST_API_URL")
                    .unwrap_or_else(|_| "https://ct.soa-gw.canadapost.ca".to_string()),
            }),
            _ => None,
        };

        Self {
            host,
            port,
            site_url,
            dev_mode,
            stripe_secret_key: env::var("STRIPE_SECRET_KEY").ok(),
            email: EmailConfig {
                api_key: env::var("RESEND_API_KEY").ok(),
                from_email: env::var("EMAIL_FROM")
                    .unwrap_or_else(|_| "Heirbloom Orders <orders@heirbloom.local>".to_string()),
                admin_email: env::var("ADMIN_EMAIL").ok(),
                audience_id: env::var("RESEND_AUDIENCE_ID").ok(),
            },
            canada_post,
            origin_postal_code: env::var("ORIGIN_POSTAL_CODE")
                .unwrap_or_else(|_| "H2X1Y7".to_string()),
            rate_limit: RateLimitConfig {
                strict_rpm: env_u32("RATE_LIMIT_STRICT_RPM", 10),
                standard_rpm: env_u32("RATE_LIMIT_STANDARD_RPM", 30),
                relaxed_rpm: env_u32("RATE_LIMIT_RELAXED_RPM", 60),
            },
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
