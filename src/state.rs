use crate::cart::CartStore;
use crate::config::Config;
use crate::email::EmailService;
use crate::orders::EmailLedger;
use crate::payments::StripeClient;
use crate::shipping::{CanadaPostClient, ShippingService};

/// Application state shared by all handlers. Clones are cheap - the stores
/// share their maps and the clients share their HTTP connection pools.
#[derive(Clone)]
pub struct AppState {
    pub carts: CartStore,
    pub shipping: ShippingService,
    /// Absent when STRIPE_SECRET_KEY is unset; payment endpoints then fail
    /// closed with a configuration error.
    pub stripe: Option<StripeClient>,
    pub email: EmailService,
    pub email_ledger: EmailLedger,
    /// Public site URL, used as the base for payment return URLs.
    pub site_url: String,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        let carrier = config.canada_post.clone().map(CanadaPostClient::new);
        if carrier.is_none() {
            tracing::warn!("Canada Post not configured; shipping rates will use static tables");
        }

        let stripe = config.stripe_secret_key.as_deref().map(StripeClient::new);
        if stripe.is_none() {
            tracing::warn!("Stripe not configured; checkout endpoints will be unavailable");
        }

        Self {
            carts: CartStore::new(),
            shipping: ShippingService::new(carrier, config.origin_postal_code.clone()),
            stripe,
            email: EmailService::new(
                config.email.api_key.clone(),
                config.email.from_email.clone(),
                config.email.admin_email.clone(),
                config.email.audience_id.clone(),
            ),
            email_ledger: EmailLedger::new(),
            site_url: config.site_url.clone(),
        }
    }
}
