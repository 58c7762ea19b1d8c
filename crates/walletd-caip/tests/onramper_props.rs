//! Property tests for the OnRamper table

use proptest::prelude::*;
use walletd_caip::adapters::onramper::{
    asset_id_to_onramper_token_list, onramper_supported_assets, onramper_token_id_to_asset_id,
};

#[test]
fn test_round_trip_every_asset() {
    for supported in onramper_supported_assets() {
        let tokens = asset_id_to_onramper_token_list(&supported.asset_id).unwrap();
        let first = tokens.first().expect("every row has a token");
        assert_eq!(
            onramper_token_id_to_asset_id(first),
            Some(&supported.asset_id),
            "round trip failed for {}",
            supported.asset_id
        );
    }
}

#[test]
fn test_every_token_maps_back_to_its_row() {
    for supported in onramper_supported_assets() {
        for token in &supported.tokens {
            assert_eq!(onramper_token_id_to_asset_id(token), Some(&supported.asset_id));
        }
    }
}

proptest! {
    #[test]
    fn test_round_trip_by_index(idx in 0usize..64) {
        let assets = onramper_supported_assets();
        let asset = &assets[idx % assets.len()];
        let token = &asset_id_to_onramper_token_list(&asset.asset_id).unwrap()[0];
        prop_assert_eq!(onramper_token_id_to_asset_id(token), Some(&asset.asset_id));
    }

    #[test]
    fn test_unknown_tokens_have_no_asset(token in "[a-z]{1,12}") {
        // every table token is upper case
        prop_assert!(onramper_token_id_to_asset_id(&token).is_none());
    }
}
