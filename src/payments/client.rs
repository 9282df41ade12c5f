use serde::Deserialize;

use crate::config::Config;
use crate::utils::AppError;

/// HTTP client for the hosted-checkout payment gateway.
///
/// The gateway speaks a form-encoded REST API: a checkout session is created
/// with nested `line_items[i][price_data][...]` parameters and later fetched
/// by id to learn its payment status.
#[derive(Clone)]
pub struct PaymentClient {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub payment_intent: Option<String>,
}

impl CheckoutSession {
    pub fn is_paid(&self) -> bool {
        self.payment_status.as_deref() == Some("paid")
    }
}

#[derive(Debug, Clone)]
pub struct SessionLineItem {
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    /// Unit price in the currency's minor unit (pence for GBP).
    pub unit_amount: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone)]
pub struct CreateSessionRequest {
    pub currency: String,
    pub customer_email: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
    pub line_items: Vec<SessionLineItem>,
}

/// Converts a major-unit amount to the minor unit, rounding half-up.
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

impl PaymentClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.payment_api_base.trim_end_matches('/').to_string(),
            secret_key: config.payment_secret_key.clone(),
        }
    }

    pub async fn create_checkout_session(
        &self,
        req: &CreateSessionRequest,
    ) -> Result<CheckoutSession, AppError> {
        let params = session_params(req);

        let response = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.base_url))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&params)
            .send()
            .await?;

        Self::parse_session(response).await
    }

    pub async fn retrieve_checkout_session(&self, id: &str) -> Result<CheckoutSession, AppError> {
        let response = self
            .http
            .get(format!("{}/v1/checkout/sessions/{}", self.base_url, id))
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await?;

        Self::parse_session(response).await
    }

    async fn parse_session(response: reqwest::Response) -> Result<CheckoutSession, AppError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Payment(format!(
                "gateway returned {status}: {body}"
            )));
        }

        Ok(response.json::<CheckoutSession>().await?)
    }
}

fn session_params(req: &CreateSessionRequest) -> Vec<(String, String)> {
    let mut params = vec![
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), req.success_url.clone()),
        ("cancel_url".to_string(), req.cancel_url.clone()),
    ];

    if let Some(email) = &req.customer_email {
        params.push(("customer_email".to_string(), email.clone()));
    }

    for (i, item) in req.line_items.iter().enumerate() {
        let prefix = format!("line_items[{i}]");
        params.push((
            format!("{prefix}[price_data][currency]"),
            req.currency.clone(),
        ));
        params.push((
            format!("{prefix}[price_data][product_data][name]"),
            item.name.clone(),
        ));
        if !item.description.is_empty() {
            // The gateway caps product descriptions at 300 characters.
            params.push((
                format!("{prefix}[price_data][product_data][description]"),
                item.description.chars().take(300).collect(),
            ));
        }
        if let Some(image) = &item.image_url {
            params.push((
                format!("{prefix}[price_data][product_data][images][0]"),
                image.clone(),
            ));
        }
        params.push((
            format!("{prefix}[price_data][unit_amount]"),
            item.unit_amount.to_string(),
        ));
        params.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn minor_unit_conversion_rounds_half_up() {
        assert_eq!(to_minor_units(4.99), 499);
        assert_eq!(to_minor_units(0.005), 1);
        assert_eq!(to_minor_units(12.0), 1200);
    }

    #[test]
    fn session_params_encode_nested_line_items() {
        let req = CreateSessionRequest {
            currency: "gbp".to_string(),
            customer_email: Some("jo@example.com".to_string()),
            success_url: "https://shop.test/success".to_string(),
            cancel_url: "https://shop.test/cancel".to_string(),
            line_items: vec![
                SessionLineItem {
                    name: "Chin Chin".to_string(),
                    description: "Crunchy fried snack".to_string(),
                    image_url: Some("https://cdn.test/chin-chin.jpg".to_string()),
                    unit_amount: 450,
                    quantity: 2,
                },
                SessionLineItem {
                    name: "Delivery Fee".to_string(),
                    description: String::new(),
                    image_url: None,
                    unit_amount: 399,
                    quantity: 1,
                },
            ],
        };

        let params = session_params(&req);

        assert_eq!(find(&params, "mode"), Some("payment"));
        assert_eq!(find(&params, "customer_email"), Some("jo@example.com"));
        assert_eq!(
            find(&params, "line_items[0][price_data][product_data][name]"),
            Some("Chin Chin")
        );
        assert_eq!(
            find(&params, "line_items[0][price_data][unit_amount]"),
            Some("450")
        );
        assert_eq!(find(&params, "line_items[0][quantity]"), Some("2"));
        assert_eq!(
            find(&params, "line_items[1][price_data][product_data][name]"),
            Some("Delivery Fee")
        );
        // the fee line has no description or image
        assert_eq!(
            find(&params, "line_items[1][price_data][product_data][description]"),
            None
        );
        assert_eq!(
            find(&params, "line_items[1][price_data][product_data][images][0]"),
            None
        );
    }

    #[test]
    fn long_descriptions_are_truncated() {
        let req = CreateSessionRequest {
            currency: "gbp".to_string(),
            customer_email: None,
            success_url: "https://shop.test/success".to_string(),
            cancel_url: "https://shop.test/cancel".to_string(),
            line_items: vec![SessionLineItem {
                name: "Puff Puff".to_string(),
                description: "x".repeat(500),
                image_url: None,
                unit_amount: 100,
                quantity: 1,
            }],
        };

        let params = session_params(&req);
        let desc = find(&params, "line_items[0][price_data][product_data][description]").unwrap();
        assert_eq!(desc.len(), 300);
    }
}
