// SPDX-License-Identifier: MIT

//! Synthetic advertising performance data.
//!
//! No real reporting API is called anywhere in the system; audits run
//! against these canned numbers.

use crate::models::Platform;
use serde_json::{json, Value};

/// Generate mock performance data for one connected account.
///
/// The shape varies per platform (campaigns, ad sets, video campaigns)
/// and is treated as an opaque document by the analysis client.
pub fn mock_platform_data(platform: Platform, account_name: &str) -> Value {
    let mut data = json!({
        "accountName": account_name,
        "platform": platform.as_str(),
        "dateRange": "Last 30 days",
        "currency": "USD",
    });

    let details = match platform {
        Platform::GoogleAds => json!({
            "campaigns": [
                {
                    "name": "Search Campaign 1",
                    "impressions": 125000,
                    "clicks": 3200,
                    "ctr": 2.56,
                    "cost": 4800.50,
                    "conversions": 85,
                    "conversionRate": 2.66,
                    "cpc": 1.50
                },
                {
                    "name": "Display Campaign 1",
                    "impressions": 890000,
                    "clicks": 2100,
                    "ctr": 0.24,
                    "cost": 1250.25,
                    "conversions": 22,
                    "conversionRate": 1.05,
                    "cpc": 0.60
                }
            ],
            "totalSpend": 6050.75,
            "totalImpressions": 1015000,
            "totalClicks": 5300,
            "totalConversions": 107,
            "averageCpc": 1.14
        }),
        Platform::FacebookAds => json!({
            "adSets": [
                {
                    "name": "Interest Targeting",
                    "reach": 45000,
                    "impressions": 156000,
                    "clicks": 2800,
                    "ctr": 1.79,
                    "cost": 3200.00,
                    "conversions": 92,
                    "roas": 2.87
                },
                {
                    "name": "Lookalike Audience",
                    "reach": 38000,
                    "impressions": 124000,
                    "clicks": 1950,
                    "ctr": 1.57,
                    "cost": 2400.00,
                    "conversions": 67,
                    "roas": 3.12
                }
            ],
            "totalSpend": 5600.00,
            "totalReach": 83000,
            "totalImpressions": 280000,
            "totalClicks": 4750,
            "totalConversions": 159,
            "averageRoas": 2.99
        }),
        Platform::TiktokAds => json!({
            "campaigns": [
                {
                    "name": "Video Campaign",
                    "videoViews": 245000,
                    "impressions": 890000,
                    "clicks": 12500,
                    "ctr": 1.40,
                    "cost": 1800.00,
                    "conversions": 78,
                    "videoCompletionRate": 0.68
                }
            ],
            "totalSpend": 1800.00,
            "totalVideoViews": 245000,
            "totalImpressions": 890000,
            "totalClicks": 12500,
            "averageCompletionRate": 0.68
        }),
        // Google Analytics and Microsoft Ads share the generic shape
        Platform::GoogleAnalytics | Platform::MicrosoftAds => json!({
            "campaigns": [
                {
                    "name": "Sample Campaign",
                    "impressions": 100000,
                    "clicks": 2000,
                    "cost": 1000.00,
                    "conversions": 50
                }
            ],
            "totalSpend": 1000.00
        }),
    };

    if let (Value::Object(base), Value::Object(extra)) = (&mut data, details) {
        base.extend(extra);
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_ads_data_has_campaign_totals() {
        let data = mock_platform_data(Platform::GoogleAds, "Demo Google Ads Account");

        assert_eq!(data["platform"], "google-ads");
        assert_eq!(data["accountName"], "Demo Google Ads Account");
        assert_eq!(data["campaigns"].as_array().unwrap().len(), 2);
        assert_eq!(data["totalSpend"], 6050.75);
    }

    #[test]
    fn facebook_ads_data_uses_ad_sets() {
        let data = mock_platform_data(Platform::FacebookAds, "Demo Facebook Ads Account");

        assert_eq!(data["adSets"].as_array().unwrap().len(), 2);
        assert_eq!(data["averageRoas"], 2.99);
    }

    #[test]
    fn fallback_platforms_get_generic_shape() {
        for platform in [Platform::GoogleAnalytics, Platform::MicrosoftAds] {
            let data = mock_platform_data(platform, "Demo Account");
            assert_eq!(data["campaigns"].as_array().unwrap().len(), 1);
            assert_eq!(data["totalSpend"], 1000.00);
            assert_eq!(data["currency"], "USD");
        }
    }
}
