use crate::core::distribution::{
    AllowedMethods, CacheBehavior, DefaultCacheBehavior, DistributionConfig, ForwardedValues,
    Origin, TrustedSigners,
};
use crate::domain::model::DistributionReceipt;
use crate::domain::ports::CdnBackend;
use crate::utils::error::{ProvisionError, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudfront::error::{BuildError, DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_cloudfront::types as cf;
use aws_sdk_cloudfront::Client as CloudFrontClient;
use tokio::sync::OnceCell;

/// CloudFront is a global service; its control plane lives in us-east-1.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Creates CloudFront distributions. The SDK client (and with it the AWS
/// credential chain) is only loaded when a distribution is submitted.
pub struct CloudFrontBackend {
    region: String,
    client: OnceCell<CloudFrontClient>,
}

impl CloudFrontBackend {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            client: OnceCell::new(),
        }
    }

    pub fn with_client(client: CloudFrontClient) -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            client: OnceCell::new_with(Some(client)),
        }
    }

    async fn client(&self) -> &CloudFrontClient {
        self.client
            .get_or_init(|| async {
                tracing::debug!("Loading AWS configuration for region {}", self.region);
                let sdk_config = aws_config::defaults(BehaviorVersion::latest())
                    .region(Region::new(self.region.clone()))
                    .load()
                    .await;
                CloudFrontClient::new(&sdk_config)
            })
            .await
    }
}

#[async_trait]
impl CdnBackend for CloudFrontBackend {
    async fn create_distribution(&self, config: &DistributionConfig) -> Result<DistributionReceipt> {
        let sdk_config = to_sdk_config(config).map_err(|e| ProvisionError::InvalidDistribution {
            message: e.to_string(),
        })?;

        tracing::debug!(
            "Submitting CloudFront distribution with {} alias(es)",
            config.aliases.quantity()
        );
        let output = self
            .client()
            .await
            .create_distribution()
            .distribution_config(sdk_config)
            .send()
            .await
            .map_err(|e| {
                let code = e.code().unwrap_or("Unknown").to_string();
                ProvisionError::CdnError {
                    message: format!(
                        "CreateDistribution failed ({}): {}",
                        code,
                        DisplayErrorContext(&e)
                    ),
                }
            })?;

        let distribution = output.distribution().ok_or_else(|| ProvisionError::CdnError {
            message: "CreateDistribution returned no distribution".to_string(),
        })?;

        Ok(DistributionReceipt {
            id: distribution.id().to_string(),
            domain_name: distribution.domain_name().to_string(),
            status: distribution.status().to_string(),
        })
    }
}

/// Maps the typed configuration onto the SDK builders. Fails only when a
/// required CloudFront field is missing.
pub fn to_sdk_config(
    config: &DistributionConfig,
) -> std::result::Result<cf::DistributionConfig, BuildError> {
    let aliases = cf::Aliases::builder()
        .quantity(config.aliases.quantity())
        .set_items(Some(config.aliases.items().to_vec()))
        .build()?;

    let behaviors = config
        .cache_behaviors
        .items()
        .iter()
        .map(cache_behavior)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let cache_behaviors = cf::CacheBehaviors::builder()
        .quantity(config.cache_behaviors.quantity())
        .set_items(Some(behaviors))
        .build()?;

    let origins = config
        .origins
        .items()
        .iter()
        .map(origin)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let origins = cf::Origins::builder()
        .quantity(config.origins.quantity())
        .set_items(Some(origins))
        .build()?;

    cf::DistributionConfig::builder()
        .caller_reference(&config.caller_reference)
        .comment(&config.comment)
        .aliases(aliases)
        .cache_behaviors(cache_behaviors)
        .default_cache_behavior(default_cache_behavior(&config.default_cache_behavior)?)
        .origins(origins)
        .enabled(config.enabled)
        .http_version(cf::HttpVersion::from(config.http_version.as_str()))
        .is_ipv6_enabled(config.is_ipv6_enabled)
        .price_class(cf::PriceClass::from(config.price_class.as_str()))
        .build()
}

fn allowed_methods(methods: &AllowedMethods) -> std::result::Result<cf::AllowedMethods, BuildError> {
    let cached = cf::CachedMethods::builder()
        .quantity(methods.cached_methods.quantity())
        .set_items(Some(
            methods
                .cached_methods
                .items()
                .iter()
                .map(|m| cf::Method::from(m.as_str()))
                .collect(),
        ))
        .build()?;

    cf::AllowedMethods::builder()
        .quantity(methods.methods.quantity())
        .set_items(Some(
            methods
                .methods
                .items()
                .iter()
                .map(|m| cf::Method::from(m.as_str()))
                .collect(),
        ))
        .cached_methods(cached)
        .build()
}

#[allow(deprecated)]
fn forwarded_values(values: &ForwardedValues) -> std::result::Result<cf::ForwardedValues, BuildError> {
    let cookies = cf::CookiePreference::builder()
        .forward(cf::ItemSelection::from(values.cookies.forward.as_str()))
        .build()?;

    cf::ForwardedValues::builder()
        .query_string(values.query_string)
        .cookies(cookies)
        .build()
}

fn trusted_signers(signers: &TrustedSigners) -> std::result::Result<cf::TrustedSigners, BuildError> {
    cf::TrustedSigners::builder()
        .enabled(signers.enabled)
        .quantity(signers.signers.quantity())
        .set_items(Some(signers.signers.items().to_vec()))
        .build()
}

// ForwardedValues 與 MinTTL 在 SDK 中已標記為 legacy
#[allow(deprecated)]
fn cache_behavior(behavior: &CacheBehavior) -> std::result::Result<cf::CacheBehavior, BuildError> {
    cf::CacheBehavior::builder()
        .path_pattern(&behavior.path_pattern)
        .target_origin_id(&behavior.target_origin_id)
        .allowed_methods(allowed_methods(&behavior.allowed_methods)?)
        .compress(behavior.compress)
        .forwarded_values(forwarded_values(&behavior.forwarded_values)?)
        .min_ttl(behavior.min_ttl)
        .trusted_signers(trusted_signers(&behavior.trusted_signers)?)
        .viewer_protocol_policy(cf::ViewerProtocolPolicy::from(
            behavior.viewer_protocol_policy.as_str(),
        ))
        .build()
}

// ForwardedValues 與 MinTTL 在 SDK 中已標記為 legacy
#[allow(deprecated)]
fn default_cache_behavior(
    behavior: &DefaultCacheBehavior,
) -> std::result::Result<cf::DefaultCacheBehavior, BuildError> {
    cf::DefaultCacheBehavior::builder()
        .target_origin_id(&behavior.target_origin_id)
        .allowed_methods(allowed_methods(&behavior.allowed_methods)?)
        .compress(behavior.compress)
        .forwarded_values(forwarded_values(&behavior.forwarded_values)?)
        .min_ttl(behavior.min_ttl)
        .trusted_signers(trusted_signers(&behavior.trusted_signers)?)
        .viewer_protocol_policy(cf::ViewerProtocolPolicy::from(
            behavior.viewer_protocol_policy.as_str(),
        ))
        .build()
}

fn origin(origin: &Origin) -> std::result::Result<cf::Origin, BuildError> {
    let custom = &origin.custom_origin_config;
    let ssl_protocols = cf::OriginSslProtocols::builder()
        .quantity(custom.origin_ssl_protocols.quantity())
        .set_items(Some(
            custom
                .origin_ssl_protocols
                .items()
                .iter()
                .map(|p| cf::SslProtocol::from(p.as_str()))
                .collect(),
        ))
        .build()?;

    let custom_config = cf::CustomOriginConfig::builder()
        .http_port(custom.http_port)
        .https_port(custom.https_port)
        .origin_protocol_policy(cf::OriginProtocolPolicy::from(
            custom.origin_protocol_policy.as_str(),
        ))
        .origin_ssl_protocols(ssl_protocols)
        .build()?;

    cf::Origin::builder()
        .id(&origin.id)
        .domain_name(&origin.domain_name)
        .custom_origin_config(custom_config)
        .build()
}
