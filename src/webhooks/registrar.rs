//! GraphQL-backed webhook registration.
//!
//! Registers webhook subscriptions by POSTing a `webhookSubscriptionCreate`
//! mutation to the shop's Admin GraphQL endpoint. `userErrors` in the
//! response surface as [`WebhookError::ShopifyError`].

use super::{WebhookError, WebhookRegistrar, WebhookSubscription};
use crate::config::HostUrl;
use crate::middleware::BoxFuture;

/// The Admin API version the registrar talks to.
const API_VERSION: &str = "2024-10";

/// Registers webhooks against the Shopify Admin GraphQL API.
///
/// # Example
///
/// ```rust,no_run
/// use shopify_bridge::webhooks::GraphqlWebhookRegistrar;
/// use shopify_bridge::HostUrl;
///
/// let host = HostUrl::new("https://myapp.example.com").unwrap();
/// let registrar = GraphqlWebhookRegistrar::new(host);
/// // registrar.register(&subscription).await?;
/// ```
#[derive(Clone, Debug)]
pub struct GraphqlWebhookRegistrar {
    client: reqwest::Client,
    host: HostUrl,
    admin_base_url: Option<String>,
}

impl GraphqlWebhookRegistrar {
    /// Creates a registrar delivering webhooks to paths under `host`.
    #[must_use]
    pub fn new(host: HostUrl) -> Self {
        Self {
            client: reqwest::Client::new(),
            host,
            admin_base_url: None,
        }
    }

    /// Overrides the per-shop Admin API base URL.
    ///
    /// Normally the endpoint is derived from the subscription's shop domain;
    /// tests point this at a local mock server instead.
    #[must_use]
    pub fn admin_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.admin_base_url = Some(base_url.into());
        self
    }

    fn endpoint(&self, shop: &str) -> String {
        let base = self
            .admin_base_url
            .clone()
            .unwrap_or_else(|| format!("https://{shop}"));
        format!("{base}/admin/api/{API_VERSION}/graphql.json")
    }

    fn mutation(&self, subscription: &WebhookSubscription) -> String {
        let callback_url = format!("{}{}", self.host, subscription.path);
        format!(
            r#"
            mutation {{
                webhookSubscriptionCreate(
                    topic: {topic},
                    webhookSubscription: {{ uri: "{callback_url}" }}
                ) {{
                    webhookSubscription {{
                        id
                    }}
                    userErrors {{
                        field
                        message
                    }}
                }}
            }}
            "#,
            topic = subscription.topic.graphql_format(),
        )
    }

    async fn create_subscription(
        &self,
        subscription: &WebhookSubscription,
    ) -> Result<String, WebhookError> {
        let body = serde_json::json!({ "query": self.mutation(subscription) });

        let response: serde_json::Value = self
            .client
            .post(self.endpoint(subscription.shop.as_ref()))
            .header("X-Shopify-Access-Token", &subscription.access_token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let create = &response["data"]["webhookSubscriptionCreate"];

        if let Some(errors) = create["userErrors"].as_array() {
            if !errors.is_empty() {
                let messages: Vec<String> = errors
                    .iter()
                    .filter_map(|e| e["message"].as_str().map(String::from))
                    .collect();
                return Err(WebhookError::ShopifyError {
                    message: messages.join("; "),
                });
            }
        }

        create["webhookSubscription"]["id"]
            .as_str()
            .map(ToString::to_string)
            .ok_or_else(|| WebhookError::ShopifyError {
                message: "Missing webhook subscription ID in response".to_string(),
            })
    }
}

impl WebhookRegistrar for GraphqlWebhookRegistrar {
    fn register<'a>(
        &'a self,
        subscription: &'a WebhookSubscription,
    ) -> BoxFuture<'a, Result<String, WebhookError>> {
        Box::pin(async move {
            let id = self.create_subscription(subscription).await?;
            tracing::debug!(
                shop = %subscription.shop,
                topic = %subscription.topic.graphql_format(),
                %id,
                "registered webhook subscription"
            );
            Ok(id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShopDomain;
    use crate::webhooks::WebhookTopic;

    fn subscription() -> WebhookSubscription {
        WebhookSubscription {
            shop: ShopDomain::new("demo").unwrap(),
            access_token: "token".to_string(),
            topic: WebhookTopic::AppUninstalled,
            path: "/webhooks".to_string(),
        }
    }

    fn registrar() -> GraphqlWebhookRegistrar {
        GraphqlWebhookRegistrar::new(HostUrl::new("https://myapp.example.com").unwrap())
    }

    #[test]
    fn test_endpoint_derives_from_shop_domain() {
        assert_eq!(
            registrar().endpoint("demo.myshopify.com"),
            format!("https://demo.myshopify.com/admin/api/{API_VERSION}/graphql.json")
        );
    }

    #[test]
    fn test_endpoint_override() {
        let registrar = registrar().admin_base_url("http://127.0.0.1:9999");
        assert_eq!(
            registrar.endpoint("demo.myshopify.com"),
            format!("http://127.0.0.1:9999/admin/api/{API_VERSION}/graphql.json")
        );
    }

    #[test]
    fn test_mutation_includes_topic_and_callback_url() {
        let mutation = registrar().mutation(&subscription());
        assert!(mutation.contains("APP_UNINSTALLED"));
        assert!(mutation.contains(r#"uri: "https://myapp.example.com/webhooks""#));
    }
}
