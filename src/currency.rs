//! Exchange rates, currency symbols and amount formatting.
//!
//! Live rates come from an exchangerate-api compatible endpoint and are cached
//! per base currency. Every failure degrades to a small built-in rate table,
//! so [`CurrencyService::get_exchange_rate`] never fails.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::cache::{Clock, SystemClock, TtlCache};
use crate::config::CurrencyConfig;
use crate::http;
use crate::models::CurrencyRate;
use crate::planner::pricing::round_to_cents;
use crate::providers::ExchangeRateProvider;
use crate::{Result, TripPlannerError};

const ANCHOR_CURRENCY: &str = "USD";
const RATE_SERVICE: &str = "Currency API";

/// Currencies displayed without decimals
const ZERO_DECIMAL_CURRENCIES: [&str; 3] = ["JPY", "KRW", "VND"];

const SYMBOLS: &[(&str, &str)] = &[
    ("USD", "$"),
    ("EUR", "€"),
    ("GBP", "£"),
    ("JPY", "¥"),
    ("CAD", "C$"),
    ("AUD", "A$"),
    ("CHF", "Fr"),
    ("CNY", "¥"),
    ("SEK", "kr"),
    ("NZD", "NZ$"),
    ("MXN", "$"),
    ("SGD", "S$"),
    ("HKD", "HK$"),
    ("NOK", "kr"),
    ("TRY", "₺"),
    ("RUB", "₽"),
    ("INR", "₹"),
    ("BRL", "R$"),
    ("ZAR", "R"),
    ("KRW", "₩"),
    ("DKK", "kr"),
    ("PLN", "zł"),
    ("THB", "฿"),
    ("IDR", "Rp"),
    ("HUF", "Ft"),
    ("CZK", "Kč"),
    ("ILS", "₪"),
    ("CLP", "$"),
    ("PHP", "₱"),
    ("AED", "د.إ"),
    ("SAR", "﷼"),
    ("MYR", "RM"),
    ("BGN", "лв"),
    ("RON", "lei"),
];

/// Last-resort rates when no live data is available
const FALLBACK_RATES: &[(&str, &[(&str, f64)])] = &[
    (
        "USD",
        &[("EUR", 0.85), ("GBP", 0.73), ("JPY", 110.0), ("CAD", 1.25), ("AUD", 1.35)],
    ),
    (
        "EUR",
        &[("USD", 1.18), ("GBP", 0.86), ("JPY", 130.0), ("CAD", 1.47), ("AUD", 1.59)],
    ),
    (
        "GBP",
        &[("USD", 1.37), ("EUR", 1.16), ("JPY", 151.0), ("CAD", 1.71), ("AUD", 1.85)],
    ),
    (
        "JPY",
        &[("USD", 0.009), ("EUR", 0.0077), ("GBP", 0.0066), ("CAD", 0.011), ("AUD", 0.012)],
    ),
];

/// Address keywords that suggest a local currency. First match wins.
const ADDRESS_CURRENCIES: &[(&[&str], &str)] = &[
    (&["united states", "usa", "u.s.", "new york", "california"], "USD"),
    (&["canada", "toronto", "vancouver"], "CAD"),
    (
        &["united kingdom", "uk", "england", "scotland", "wales", "london"],
        "GBP",
    ),
    (
        &[
            "euro", "france", "germany", "italy", "spain", "netherlands", "belgium", "portugal",
            "greece", "austria", "ireland",
        ],
        "EUR",
    ),
    (&["japan", "tokyo", "osaka"], "JPY"),
    (&["india", "mumbai", "delhi", "bangalore"], "INR"),
    (&["australia", "sydney", "melbourne"], "AUD"),
    (&["new zealand", "auckland", "wellington"], "NZD"),
    (&["switzerland", "zurich", "geneva"], "CHF"),
    (&["sweden", "stockholm"], "SEK"),
    (&["norway", "oslo"], "NOK"),
    (&["denmark", "copenhagen"], "DKK"),
    (&["china", "beijing", "shanghai", "hong kong"], "CNY"),
    (&["singapore"], "SGD"),
    (&["south korea", "seoul"], "KRW"),
    (&["mexico", "mexico city"], "MXN"),
    (&["brazil", "rio de janeiro", "são paulo", "sao paulo"], "BRL"),
    (&["uae", "dubai", "abu dhabi", "united arab emirates"], "AED"),
];

/// Display symbol for an ISO currency code, or the code itself when unknown
#[must_use]
pub fn currency_symbol(code: &str) -> &str {
    SYMBOLS
        .iter()
        .find(|(known, _)| *known == code)
        .map_or(code, |(_, symbol)| *symbol)
}

/// Built-in rate for a pair, 1.0 when the pair is not in the table
#[must_use]
pub fn fallback_rate(from: &str, to: &str) -> f64 {
    FALLBACK_RATES
        .iter()
        .find(|(base, _)| *base == from)
        .and_then(|(_, rates)| rates.iter().find(|(code, _)| *code == to))
        .map_or(1.0, |(_, rate)| *rate)
}

/// Best guess at the local currency of a formatted address, USD by default
#[must_use]
pub fn detect_currency_from_address(address: &str) -> &'static str {
    let lower = address.to_lowercase();
    ADDRESS_CURRENCIES
        .iter()
        .find(|(needles, _)| needles.iter().any(|needle| lower.contains(*needle)))
        .map_or(ANCHOR_CURRENCY, |(_, code)| *code)
}

/// Amount with symbol; JPY, KRW and VND get no decimals and thousands separators
#[must_use]
pub fn format_currency(amount: f64, code: &str) -> String {
    let symbol = currency_symbol(code);
    if ZERO_DECIMAL_CURRENCIES.contains(&code) {
        let rounded = amount.round();
        let sign = if rounded < 0.0 { "-" } else { "" };
        format!("{sign}{symbol}{}", group_thousands(rounded.abs()))
    } else {
        format!("{symbol}{amount:.2}")
    }
}

fn group_thousands(whole: f64) -> String {
    let digits = format!("{whole:.0}");
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Accepts three ASCII letters, e.g. "EUR"
pub fn validate_currency_code(code: &str) -> Result<()> {
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(TripPlannerError::validation(format!(
            "Currency '{code}' is not a three-letter ISO code"
        )))
    }
}

fn round_rate(rate: f64) -> f64 {
    (rate * 1_000_000.0).round() / 1_000_000.0
}

/// Source of live exchange-rate tables
#[async_trait]
pub trait RateSource: Send + Sync {
    /// All known rates from `base` to other currencies
    async fn latest_rates(&self, base: &str) -> Result<HashMap<String, f64>>;
}

/// Client for `GET {base_url}/latest/{BASE}`
#[derive(Debug, Clone)]
pub struct ExchangeRateApiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ExchangeRateApiClient {
    pub fn new(config: &CurrencyConfig) -> Result<Self> {
        let client = http::client(config.timeout(), &http::default_user_agent())?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|key| !key.is_empty()),
        })
    }

    fn url(&self, base: &str) -> String {
        let mut url = format!("{}/latest/{}", self.base_url, urlencoding::encode(base));
        if let Some(key) = &self.api_key {
            url.push_str("?apikey=");
            url.push_str(&urlencoding::encode(key));
        }
        url
    }
}

/// Pull the rate map out of a response body. Providers disagree on the field
/// name (`rates`, `conversion_rates`) and some return the map bare.
fn extract_rates(body: &Value) -> Result<HashMap<String, f64>> {
    let table = body
        .get("rates")
        .or_else(|| body.get("conversion_rates"))
        .unwrap_or(body)
        .as_object()
        .ok_or_else(|| TripPlannerError::decode(RATE_SERVICE, "rates are not an object"))?;

    let rates: HashMap<String, f64> = table
        .iter()
        .filter_map(|(code, rate)| rate.as_f64().map(|rate| (code.clone(), rate)))
        .collect();

    if rates.is_empty() {
        return Err(TripPlannerError::decode(RATE_SERVICE, "no numeric rates"));
    }
    Ok(rates)
}

#[async_trait]
impl RateSource for ExchangeRateApiClient {
    #[instrument(skip(self))]
    async fn latest_rates(&self, base: &str) -> Result<HashMap<String, f64>> {
        let body: Value = http::fetch_json(self.client.get(self.url(base)), RATE_SERVICE).await?;
        let rates = extract_rates(&body)?;
        debug!("Fetched {} rates for base {}", rates.len(), base);
        Ok(rates)
    }
}

/// Exchange-rate lookups with caching and built-in fallbacks
pub struct CurrencyService {
    /// `None` when live rates are disabled
    source: Option<Arc<dyn RateSource>>,
    cache: TtlCache<HashMap<String, f64>>,
}

impl std::fmt::Debug for CurrencyService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrencyService")
            .field("live", &self.source.is_some())
            .field("cache", &self.cache)
            .finish()
    }
}

impl CurrencyService {
    /// Service backed by the configured exchange-rate API
    pub fn new(config: &CurrencyConfig) -> Result<Self> {
        let source: Option<Arc<dyn RateSource>> = if config.enabled {
            Some(Arc::new(ExchangeRateApiClient::new(config)?))
        } else {
            info!("Live exchange rates disabled, using built-in rates");
            None
        };
        Ok(Self::with_source(
            source,
            chrono::Duration::minutes(config.cache_ttl_minutes.into()),
            Arc::new(SystemClock),
        ))
    }

    #[must_use]
    pub fn with_source(
        source: Option<Arc<dyn RateSource>>,
        ttl: chrono::Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            cache: TtlCache::with_clock("exchange_rates", ttl, clock),
        }
    }

    /// Rate table for `base`, from cache or the live source
    async fn fetch_rates(&self, base: &str) -> Option<HashMap<String, f64>> {
        let source = self.source.as_ref()?;

        if let Some(rates) = self.cache.get(base) {
            return Some(rates);
        }

        match source.latest_rates(base).await {
            Ok(rates) => {
                self.cache.put(base, rates.clone());
                Some(rates)
            }
            Err(e) => {
                warn!("Failed to fetch exchange rates for {}, using fallback: {}", base, e);
                None
            }
        }
    }

    /// Rate from `from` to `to`.
    ///
    /// Tries, in order: same currency, a direct live rate, a USD cross rate,
    /// the built-in table. Rates are rounded to 6 decimals.
    #[instrument(skip(self))]
    pub async fn get_exchange_rate(&self, from: &str, to: &str) -> CurrencyRate {
        let from = from.trim().to_uppercase();
        let to = to.trim().to_uppercase();
        let symbol = currency_symbol(&to).to_string();

        if from == to {
            return CurrencyRate {
                from,
                to,
                rate: 1.0,
                symbol,
            };
        }

        let direct = self
            .fetch_rates(&from)
            .await
            .and_then(|rates| rates.get(&to).copied())
            .filter(|rate| *rate > 0.0);

        let rate = match direct {
            Some(rate) => rate,
            None => match self.cross_rate(&from, &to).await {
                Some(rate) => rate,
                None => {
                    debug!("No live rate for {}->{}, using built-in table", from, to);
                    fallback_rate(&from, &to)
                }
            },
        };

        CurrencyRate {
            from,
            to,
            rate: round_rate(rate),
            symbol,
        }
    }

    async fn cross_rate(&self, from: &str, to: &str) -> Option<f64> {
        if from == ANCHOR_CURRENCY {
            return None;
        }
        let anchored = self.fetch_rates(ANCHOR_CURRENCY).await?;
        let from_rate = anchored.get(from).copied().filter(|rate| *rate > 0.0)?;
        let to_rate = anchored.get(to).copied()?;
        Some(to_rate / from_rate)
    }

    /// Every currency the live source knows, or the symbol table's
    pub async fn supported_currencies(&self) -> Vec<String> {
        let mut currencies: Vec<String> = match self.fetch_rates(ANCHOR_CURRENCY).await {
            Some(rates) if !rates.is_empty() => std::iter::once(ANCHOR_CURRENCY.to_string())
                .chain(rates.into_keys())
                .collect(),
            _ => SYMBOLS.iter().map(|(code, _)| (*code).to_string()).collect(),
        };
        currencies.sort();
        currencies.dedup();
        currencies
    }

    /// Convert and round to 2 decimals
    pub async fn convert_amount(&self, amount: f64, from: &str, to: &str) -> f64 {
        if from.eq_ignore_ascii_case(to) {
            return amount;
        }
        let rate = self.get_exchange_rate(from, to).await;
        round_to_cents(amount * rate.rate)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

#[async_trait]
impl ExchangeRateProvider for CurrencyService {
    async fn exchange_rate(&self, from: &str, to: &str) -> CurrencyRate {
        self.get_exchange_rate(from, to).await
    }
}
