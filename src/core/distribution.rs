//! Typed CloudFront distribution configuration.
//!
//! Serialises to the same PascalCase shape the CloudFront API documents, so
//! `--dry-run` output can be compared against the console or fed to the AWS
//! CLI as-is.

use crate::domain::model::Target;
use crate::utils::error::{ProvisionError, Result};
use crate::utils::validation::validate_domain_name;
use serde::{Serialize, Serializer};
use std::collections::HashSet;

pub const DEFAULT_COMMENT: &str = "Created by site-cdn";

/// A CloudFront list: `Quantity` is always the number of `Items`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemList<T> {
    items: Vec<T>,
}

impl<T> ItemList<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn empty() -> Self {
        Self { items: Vec::new() }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn quantity(&self) -> i32 {
        self.items.len() as i32
    }
}

impl<T: Serialize> Serialize for ItemList<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("ItemList", 2)?;
        state.serialize_field("Items", &self.items)?;
        state.serialize_field("Quantity", &self.quantity())?;
        state.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Head,
    Options,
    Put,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewerProtocolPolicy {
    AllowAll,
    HttpsOnly,
    RedirectToHttps,
}

impl ViewerProtocolPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllowAll => "allow-all",
            Self::HttpsOnly => "https-only",
            Self::RedirectToHttps => "redirect-to-https",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CookieForwarding {
    None,
    Whitelist,
    All,
}

impl CookieForwarding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Whitelist => "whitelist",
            Self::All => "all",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OriginProtocolPolicy {
    HttpOnly,
    MatchViewer,
    HttpsOnly,
}

impl OriginProtocolPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HttpOnly => "http-only",
            Self::MatchViewer => "match-viewer",
            Self::HttpsOnly => "https-only",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SslProtocol {
    #[serde(rename = "TLSv1")]
    Tls1,
    #[serde(rename = "TLSv1.1")]
    Tls1_1,
    #[serde(rename = "TLSv1.2")]
    Tls1_2,
}

impl SslProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tls1 => "TLSv1",
            Self::Tls1_1 => "TLSv1.1",
            Self::Tls1_2 => "TLSv1.2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HttpVersion {
    #[serde(rename = "http1.1")]
    Http1_1,
    #[serde(rename = "http2")]
    Http2,
}

impl HttpVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http1_1 => "http1.1",
            Self::Http2 => "http2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PriceClass {
    #[serde(rename = "PriceClass_100")]
    Class100,
    #[serde(rename = "PriceClass_200")]
    Class200,
    #[serde(rename = "PriceClass_All")]
    All,
}

impl PriceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class100 => "PriceClass_100",
            Self::Class200 => "PriceClass_200",
            Self::All => "PriceClass_All",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AllowedMethods {
    pub cached_methods: ItemList<Method>,
    #[serde(flatten)]
    pub methods: ItemList<Method>,
}

impl AllowedMethods {
    pub fn get_head() -> Self {
        Self {
            cached_methods: ItemList::new(vec![Method::Get, Method::Head]),
            methods: ItemList::new(vec![Method::Get, Method::Head]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Cookies {
    pub forward: CookieForwarding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ForwardedValues {
    pub cookies: Cookies,
    pub query_string: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrustedSigners {
    pub enabled: bool,
    #[serde(flatten)]
    pub signers: ItemList<String>,
}

impl TrustedSigners {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            signers: ItemList::empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CacheBehavior {
    pub path_pattern: String,
    pub target_origin_id: String,
    pub allowed_methods: AllowedMethods,
    pub compress: bool,
    pub forwarded_values: ForwardedValues,
    #[serde(rename = "MinTTL")]
    pub min_ttl: i64,
    pub trusted_signers: TrustedSigners,
    pub viewer_protocol_policy: ViewerProtocolPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DefaultCacheBehavior {
    pub target_origin_id: String,
    pub allowed_methods: AllowedMethods,
    pub compress: bool,
    pub forwarded_values: ForwardedValues,
    #[serde(rename = "MinTTL")]
    pub min_ttl: i64,
    pub trusted_signers: TrustedSigners,
    pub viewer_protocol_policy: ViewerProtocolPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomOriginConfig {
    #[serde(rename = "HTTPPort")]
    pub http_port: i32,
    #[serde(rename = "HTTPSPort")]
    pub https_port: i32,
    pub origin_protocol_policy: OriginProtocolPolicy,
    pub origin_ssl_protocols: ItemList<SslProtocol>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Origin {
    pub id: String,
    pub domain_name: String,
    pub custom_origin_config: CustomOriginConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DistributionConfig {
    pub caller_reference: String,
    pub comment: String,
    pub aliases: ItemList<String>,
    pub cache_behaviors: ItemList<CacheBehavior>,
    pub default_cache_behavior: DefaultCacheBehavior,
    pub origins: ItemList<Origin>,
    pub enabled: bool,
    pub http_version: HttpVersion,
    #[serde(rename = "IsIPV6Enabled")]
    pub is_ipv6_enabled: bool,
    pub price_class: PriceClass,
}

impl DistributionConfig {
    /// Fronts `target`'s environment with an HTTPS-only custom origin and
    /// attaches `aliases`.
    pub fn for_target(
        target: &Target,
        aliases: Vec<String>,
        caller_reference: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        let origin_id = target.env.id.clone();

        let path_behavior = CacheBehavior {
            path_pattern: "/".to_string(),
            target_origin_id: origin_id.clone(),
            allowed_methods: AllowedMethods::get_head(),
            compress: true,
            forwarded_values: ForwardedValues {
                cookies: Cookies {
                    forward: CookieForwarding::All,
                },
                query_string: true,
            },
            min_ttl: 0,
            trusted_signers: TrustedSigners::disabled(),
            viewer_protocol_policy: ViewerProtocolPolicy::RedirectToHttps,
        };

        let default_behavior = DefaultCacheBehavior {
            target_origin_id: origin_id.clone(),
            allowed_methods: AllowedMethods::get_head(),
            compress: false,
            forwarded_values: ForwardedValues {
                cookies: Cookies {
                    forward: CookieForwarding::All,
                },
                query_string: false,
            },
            min_ttl: 0,
            trusted_signers: TrustedSigners::disabled(),
            viewer_protocol_policy: ViewerProtocolPolicy::RedirectToHttps,
        };

        let origin = Origin {
            id: origin_id,
            domain_name: target.env.domain.clone(),
            custom_origin_config: CustomOriginConfig {
                http_port: 80,
                https_port: 443,
                origin_protocol_policy: OriginProtocolPolicy::HttpsOnly,
                origin_ssl_protocols: ItemList::new(vec![SslProtocol::Tls1_2, SslProtocol::Tls1_1]),
            },
        };

        Self {
            caller_reference: caller_reference.into(),
            comment: comment.into(),
            aliases: ItemList::new(aliases),
            cache_behaviors: ItemList::new(vec![path_behavior]),
            default_cache_behavior: default_behavior,
            origins: ItemList::new(vec![origin]),
            enabled: true,
            http_version: HttpVersion::Http2,
            is_ipv6_enabled: true,
            price_class: PriceClass::All,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| ProvisionError::InvalidDistribution { message };

        if self.caller_reference.trim().is_empty() {
            return Err(invalid("caller reference is empty".to_string()));
        }
        if self.origins.items().is_empty() {
            return Err(invalid("at least one origin is required".to_string()));
        }

        let origin_ids: HashSet<&str> = self.origins.items().iter().map(|o| o.id.as_str()).collect();
        let behaviors = self
            .cache_behaviors
            .items()
            .iter()
            .map(|b| (b.target_origin_id.as_str(), &b.allowed_methods))
            .chain(std::iter::once((
                self.default_cache_behavior.target_origin_id.as_str(),
                &self.default_cache_behavior.allowed_methods,
            )));

        for (origin_id, methods) in behaviors {
            if !origin_ids.contains(origin_id) {
                return Err(invalid(format!(
                    "cache behavior targets unknown origin '{}'",
                    origin_id
                )));
            }
            let allowed: HashSet<&Method> = methods.methods.items().iter().collect();
            if let Some(m) = methods
                .cached_methods
                .items()
                .iter()
                .find(|m| !allowed.contains(m))
            {
                return Err(invalid(format!(
                    "cached method {} is not an allowed method",
                    m.as_str()
                )));
            }
        }

        let mut seen = HashSet::new();
        for alias in self.aliases.items() {
            let normalized = alias.to_ascii_lowercase();
            // CloudFront 允許 `*.` 開頭的萬用網域
            let host = normalized.strip_prefix("*.").unwrap_or(&normalized);
            validate_domain_name("aliases", host)
                .map_err(|e| invalid(format!("alias '{}' is invalid: {}", alias, e)))?;
            if !seen.insert(normalized.clone()) {
                return Err(invalid(format!("alias '{}' is listed twice", alias)));
            }
        }

        Ok(())
    }
}

/// Unique per invocation, like CloudFront expects.
pub fn caller_reference() -> String {
    chrono::Utc::now().timestamp_micros().to_string()
}
