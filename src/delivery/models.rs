use buks_shop::schema::delivery_fees;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A weight band and its shipping fee. Bands are stored sorted by
/// `min_weight`; a `None` max_weight makes the top band open-ended.
#[derive(Queryable, Selectable, Identifiable, Debug, PartialEq, Serialize)]
#[diesel(table_name=delivery_fees)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DeliveryFee {
    pub id: i32,
    pub min_weight: f64,
    pub max_weight: Option<f64>,
    pub fee: f64,
}

#[derive(Insertable, Deserialize, Validate)]
#[diesel(table_name=delivery_fees)]
pub struct NewDeliveryFee {
    #[validate(range(min = 0.0))]
    pub min_weight: f64,
    pub max_weight: Option<f64>,
    #[validate(range(min = 0.0))]
    pub fee: f64,
}

#[derive(Deserialize)]
pub struct QuoteQuery {
    pub weight: f64,
}

#[derive(Serialize)]
pub struct Quote {
    pub weight: f64,
    pub fee: f64,
}

/// Picks the fee for a package weight: first band (in min_weight order)
/// whose range contains the weight. No matching band means free delivery,
/// mirroring the storefront cart rule.
pub fn pick_fee(bands: &[DeliveryFee], weight: f64) -> f64 {
    bands
        .iter()
        .find(|band| {
            weight >= band.min_weight && band.max_weight.is_none_or(|max| weight <= max)
        })
        .map(|band| band.fee)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(id: i32, min: f64, max: Option<f64>, fee: f64) -> DeliveryFee {
        DeliveryFee {
            id,
            min_weight: min,
            max_weight: max,
            fee,
        }
    }

    fn bands() -> Vec<DeliveryFee> {
        vec![
            band(1, 0.0, Some(1.0), 2.99),
            band(2, 1.0, Some(5.0), 4.99),
            band(3, 5.0, None, 9.99),
        ]
    }

    #[test]
    fn weight_matches_first_containing_band() {
        assert_eq!(pick_fee(&bands(), 0.4), 2.99);
        assert_eq!(pick_fee(&bands(), 3.2), 4.99);
    }

    #[test]
    fn boundary_weight_matches_lower_band() {
        // 1.0 sits in both bands; the first in min_weight order wins
        assert_eq!(pick_fee(&bands(), 1.0), 2.99);
    }

    #[test]
    fn open_ended_top_band_catches_heavy_packages() {
        assert_eq!(pick_fee(&bands(), 42.0), 9.99);
    }

    #[test]
    fn no_matching_band_means_free_delivery() {
        let gapped = vec![band(1, 2.0, Some(5.0), 4.99)];
        assert_eq!(pick_fee(&gapped, 1.0), 0.0);
        assert_eq!(pick_fee(&[], 3.0), 0.0);
    }
}
