// SPDX-License-Identifier: MIT

//! Supported advertising platforms and their OAuth metadata.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Advertising/analytics platform an account connection refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    GoogleAds,
    GoogleAnalytics,
    FacebookAds,
    TiktokAds,
    MicrosoftAds,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::GoogleAds,
        Platform::GoogleAnalytics,
        Platform::FacebookAds,
        Platform::TiktokAds,
        Platform::MicrosoftAds,
    ];

    /// Wire identifier ("google-ads" etc.), also the value stored in the DB.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::GoogleAds => "google-ads",
            Platform::GoogleAnalytics => "google-analytics",
            Platform::FacebookAds => "facebook-ads",
            Platform::TiktokAds => "tiktok-ads",
            Platform::MicrosoftAds => "microsoft-ads",
        }
    }

    /// OAuth and API metadata for this platform.
    pub fn config(&self) -> &'static PlatformConfig {
        match self {
            Platform::GoogleAds => &PlatformConfig {
                name: "Google Ads",
                auth_url: "https://accounts.google.com/oauth/authorize",
                scope: "https://www.googleapis.com/auth/adwords",
                api_base: "https://googleads.googleapis.com/v14",
            },
            Platform::GoogleAnalytics => &PlatformConfig {
                name: "Google Analytics",
                auth_url: "https://accounts.google.com/oauth/authorize",
                scope: "https://www.googleapis.com/auth/analytics.readonly",
                api_base: "https://analyticsreporting.googleapis.com/v4",
            },
            Platform::FacebookAds => &PlatformConfig {
                name: "Facebook Ads",
                auth_url: "https://www.facebook.com/v18.0/dialog/oauth",
                scope: "ads_read,ads_management",
                api_base: "https://graph.facebook.com/v18.0",
            },
            Platform::TiktokAds => &PlatformConfig {
                name: "TikTok Ads",
                auth_url: "https://ads.tiktok.com/marketing_api/auth",
                scope: "advertiser_read,campaign_read",
                api_base: "https://business-api.tiktok.com/open_api/v1.3",
            },
            Platform::MicrosoftAds => &PlatformConfig {
                name: "Microsoft Ads",
                auth_url: "https://login.microsoftonline.com/common/oauth2/v2.0/authorize",
                scope: "https://ads.microsoft.com/ads.manage",
                api_base: "https://advertising.microsoft.com/api/advertiser",
            },
        }
    }
}

impl FromStr for Platform {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google-ads" => Ok(Platform::GoogleAds),
            "google-analytics" => Ok(Platform::GoogleAnalytics),
            "facebook-ads" => Ok(Platform::FacebookAds),
            "tiktok-ads" => Ok(Platform::TiktokAds),
            "microsoft-ads" => Ok(Platform::MicrosoftAds),
            other => Err(AppError::UnsupportedPlatform(other.to_string())),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static OAuth/API metadata for one platform.
#[derive(Debug)]
pub struct PlatformConfig {
    /// Human-readable name ("Google Ads")
    pub name: &'static str,
    /// OAuth authorization endpoint
    pub auth_url: &'static str,
    /// OAuth scope requested for auditing
    pub scope: &'static str,
    /// Reporting API base URL
    pub api_base: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_round_trips_through_str() {
        for platform in Platform::ALL {
            assert_eq!(platform.as_str().parse::<Platform>().unwrap(), platform);
        }
    }

    #[test]
    fn unknown_platform_is_rejected() {
        let err = "unknown-platform".parse::<Platform>().unwrap_err();
        assert!(matches!(err, AppError::UnsupportedPlatform(p) if p == "unknown-platform"));
    }

    #[test]
    fn platform_config_has_display_name() {
        assert_eq!(Platform::GoogleAds.config().name, "Google Ads");
        assert_eq!(Platform::TiktokAds.config().name, "TikTok Ads");
    }
}
