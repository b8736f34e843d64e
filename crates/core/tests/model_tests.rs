// ═══════════════════════════════════════════════════════════════════
// Model Tests: AssetClass, PerClass, ClassSelection, holdings,
// candidates, recommendations, Settings, money parsing
// ═══════════════════════════════════════════════════════════════════

use std::io::Write;

use contribution_planner_core::errors::CoreError;
use contribution_planner_core::models::asset_class::{AssetClass, ClassSelection, PerClass};
use contribution_planner_core::models::candidate::{Candidate, CandidateLists, CandidateSpec};
use contribution_planner_core::models::holding::{
    FixedIncomePosition, Holding, HoldingsSnapshot, InstrumentProfile,
};
use contribution_planner_core::models::money::parse_brl_amount;
use contribution_planner_core::models::recommendation::{Recommendation, RecommendationsByClass};
use contribution_planner_core::models::settings::Settings;

// ═══════════════════════════════════════════════════════════════════
// AssetClass
// ═══════════════════════════════════════════════════════════════════

mod asset_class {
    use super::*;

    #[test]
    fn display_names() {
        assert_eq!(AssetClass::FundsOfRealEstate.to_string(), "FundsOfRealEstate");
        assert_eq!(AssetClass::Stocks.to_string(), "Stocks");
        assert_eq!(AssetClass::Etfs.to_string(), "ETFs");
        assert_eq!(AssetClass::FixedIncome.to_string(), "FixedIncome");
    }

    #[test]
    fn only_fixed_income_is_not_quantized() {
        for class in AssetClass::INSTRUMENT_CLASSES {
            assert!(class.is_unit_quantized());
        }
        assert!(!AssetClass::FixedIncome.is_unit_quantized());
    }

    #[test]
    fn serde_roundtrip() {
        let json = serde_json::to_string(&AssetClass::Etfs).unwrap();
        assert_eq!(json, "\"Etfs\"");
        let back: AssetClass = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AssetClass::Etfs);
    }
}

// ═══════════════════════════════════════════════════════════════════
// PerClass
// ═══════════════════════════════════════════════════════════════════

mod per_class {
    use super::*;

    #[test]
    fn get_and_get_mut_address_the_same_slot() {
        let mut table = PerClass::new(1.0, 2.0, 3.0, 4.0);
        *table.get_mut(AssetClass::Etfs) += 10.0;
        assert_eq!(*table.get(AssetClass::Etfs), 13.0);
        assert_eq!(table.sum(), 20.0);
    }

    #[test]
    fn iter_follows_presentation_order() {
        let table = PerClass::from_fn(|c| c);
        let order: Vec<AssetClass> = table.iter().map(|(c, _)| c).collect();
        assert_eq!(order, AssetClass::ALL.to_vec());
    }

    #[test]
    fn map_passes_class_and_value() {
        let table = PerClass::new(1.0, 2.0, 3.0, 4.0);
        let doubled = table.map(|_, v| v * 2.0);
        assert_eq!(doubled, PerClass::new(2.0, 4.0, 6.0, 8.0));
    }
}

// ═══════════════════════════════════════════════════════════════════
// ClassSelection
// ═══════════════════════════════════════════════════════════════════

mod class_selection {
    use super::*;

    #[test]
    fn default_selects_all() {
        let selection = ClassSelection::default();
        assert!(selection.is_all());
        assert_eq!(selection.count(), 4);
    }

    #[test]
    fn only_and_with() {
        let selection = ClassSelection::only(&[AssetClass::Stocks]).with(AssetClass::FixedIncome);
        assert!(selection.is_selected(AssetClass::Stocks));
        assert!(selection.is_selected(AssetClass::FixedIncome));
        assert!(!selection.is_selected(AssetClass::Etfs));
        let selected: Vec<AssetClass> = selection.selected().collect();
        assert_eq!(selected, vec![AssetClass::Stocks, AssetClass::FixedIncome]);
    }

    #[test]
    fn selections_compare_by_value() {
        fn requires_eq<T: Eq>(_: &T) {}
        let a = ClassSelection::only(&[AssetClass::Stocks, AssetClass::Etfs]);
        let b = ClassSelection::none().with(AssetClass::Etfs).with(AssetClass::Stocks);
        requires_eq(&a);
        requires_eq(&PerClass::new(true, false, true, false));
        assert_eq!(a, b);
        assert_ne!(a, ClassSelection::all());
    }

    #[test]
    fn none_is_empty() {
        assert!(ClassSelection::none().is_empty());
        assert!(!ClassSelection::none().is_all());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Holdings
// ═══════════════════════════════════════════════════════════════════

mod holdings {
    use super::*;

    fn snapshot() -> HoldingsSnapshot {
        HoldingsSnapshot {
            funds_of_real_estate: vec![Holding::new("hglg11", 10, 160.0)],
            stocks: vec![Holding::new("ITSA4", 100, 10.0), Holding::new("BAD3", 5, -1.0)],
            etfs: vec![],
            fixed_income: vec![FixedIncomePosition::new("CDB Banco X", "CDB-X", 2500.0)],
        }
    }

    #[test]
    fn ticker_is_uppercased_and_name_defaults_to_ticker() {
        let h = Holding::new("hglg11", 1, 1.0);
        assert_eq!(h.ticker, "HGLG11");
        assert_eq!(h.name, "HGLG11");
        assert_eq!(h.with_name("CSHG Logística").name, "CSHG Logística");
    }

    #[test]
    fn invalid_price_counts_as_zero_value() {
        assert_eq!(Holding::new("BAD3", 5, -1.0).value(), 0.0);
        assert_eq!(Holding::new("NAN3", 5, f64::NAN).value(), 0.0);
    }

    #[test]
    fn class_values_and_total() {
        let s = snapshot();
        assert_eq!(s.class_value(AssetClass::FundsOfRealEstate), 1600.0);
        assert_eq!(s.class_value(AssetClass::Stocks), 1000.0);
        assert_eq!(s.class_value(AssetClass::Etfs), 0.0);
        assert_eq!(s.class_value(AssetClass::FixedIncome), 2500.0);
        assert_eq!(s.total_value(), 5100.0);
    }

    #[test]
    fn find_is_case_insensitive() {
        let s = snapshot();
        assert!(s.find(AssetClass::FundsOfRealEstate, "HgLg11").is_some());
        assert!(s.find(AssetClass::Stocks, "HGLG11").is_none());
        assert!(s.instruments(AssetClass::FixedIncome).is_empty());
    }

    #[test]
    fn deserialized_tickers_are_normalized() {
        let json = r#"{"funds_of_real_estate":[{"ticker":" hglg11","name":"CSHG Logística","quantity":100,"unit_price":10.0}]}"#;
        let s: HoldingsSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(s.funds_of_real_estate[0].ticker, "HGLG11");
        assert!(s.find(AssetClass::FundsOfRealEstate, "HGLG11").is_some());
    }

    #[test]
    fn find_matches_tickers_set_directly() {
        let s = HoldingsSnapshot {
            stocks: vec![Holding {
                ticker: "itsa4".to_string(),
                ..Holding::new("ITSA4", 1, 10.0)
            }],
            ..HoldingsSnapshot::default()
        };
        assert!(s.find(AssetClass::Stocks, "ITSA4").is_some());
    }

    #[test]
    fn consolidated_merges_repeated_tickers() {
        let s = HoldingsSnapshot {
            funds_of_real_estate: vec![
                Holding::new("HGLG11", 10, 10.0).with_name("CSHG Logística"),
                Holding::new("KNRI11", 2, 100.0),
                Holding {
                    ticker: "hglg11".to_string(),
                    ..Holding::new("HGLG11", 5, 10.0)
                },
            ],
            ..HoldingsSnapshot::default()
        };

        let merged = s.consolidated();
        let funds = &merged.funds_of_real_estate;
        assert_eq!(funds.len(), 2);
        assert_eq!(funds[0].ticker, "HGLG11");
        assert_eq!(funds[0].name, "CSHG Logística");
        assert_eq!(funds[0].quantity, 15);
        assert_eq!(merged.class_value(AssetClass::FundsOfRealEstate), 350.0);
    }

    #[test]
    fn consolidated_takes_first_valid_price() {
        let s = HoldingsSnapshot {
            stocks: vec![Holding::new("ITSA4", 3, -1.0), Holding::new("ITSA4", 2, 10.0)],
            ..HoldingsSnapshot::default()
        };
        let merged = s.consolidated();
        assert_eq!(merged.stocks.len(), 1);
        assert_eq!(merged.stocks[0].quantity, 5);
        assert_eq!(merged.stocks[0].unit_price, 10.0);
    }

    #[test]
    fn snapshot_deserializes_with_missing_lists() {
        let json = r#"{"stocks":[{"ticker":"ITSA4","name":"Itaúsa","quantity":3,"unit_price":10.0}]}"#;
        let s: HoldingsSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(s.stocks.len(), 1);
        assert!(s.funds_of_real_estate.is_empty());
        assert_eq!(s.stocks[0].profile, InstrumentProfile::default());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Candidates & recommendations
// ═══════════════════════════════════════════════════════════════════

mod candidates {
    use super::*;

    #[test]
    fn spec_priced_keeps_listing_fields() {
        let c = CandidateSpec::new("knri11", "Kinea Renda", 25.0).priced(140.0);
        assert_eq!(c.ticker, "KNRI11");
        assert_eq!(c.ideal_weight, 25.0);
        assert_eq!(c.price, 140.0);
        assert!(c.has_valid_price());
    }

    #[test]
    fn deserialized_candidate_tickers_are_normalized() {
        let json = r#"{"ticker":"knri11 ","name":"Kinea Renda","ideal_weight":25.0,"price":140.0}"#;
        let c: Candidate = serde_json::from_str(json).unwrap();
        assert_eq!(c.ticker, "KNRI11");
        let spec: CandidateSpec =
            serde_json::from_str(r#"{"ticker":"hglg11","name":"CSHG","ideal_weight":50.0}"#).unwrap();
        assert_eq!(spec.ticker, "HGLG11");
    }

    #[test]
    fn normalized_lists_uppercase_tickers() {
        let lists = CandidateLists {
            etfs: vec![Candidate {
                ticker: "bova11".to_string(),
                ..Candidate::new("BOVA11", "Ibovespa", 100.0, 120.0)
            }],
            ..CandidateLists::default()
        };
        assert!(lists.find(AssetClass::Etfs, "BOVA11").is_some());
        assert_eq!(lists.normalized().etfs[0].ticker, "BOVA11");
    }

    #[test]
    fn non_positive_and_non_finite_prices_are_invalid() {
        assert!(!Candidate::new("A", "A", 1.0, 0.0).has_valid_price());
        assert!(!Candidate::new("A", "A", 1.0, -3.0).has_valid_price());
        assert!(!Candidate::new("A", "A", 1.0, f64::INFINITY).has_valid_price());
    }

    #[test]
    fn lists_have_no_fixed_income_slot() {
        let mut lists = CandidateLists::default();
        assert!(lists.for_class_mut(AssetClass::FixedIncome).is_none());
        assert!(lists.for_class(AssetClass::FixedIncome).is_empty());
    }

    #[test]
    fn recommendation_add_unit() {
        let c = Candidate::new("ITSA4", "Itaúsa", 50.0, 9.5);
        let mut rec = Recommendation::single_unit(AssetClass::Stocks, &c);
        assert_eq!(rec.quantity, 1);
        assert!(rec.weights.is_none());
        rec.add_unit();
        assert_eq!(rec.quantity, 2);
        assert_eq!(rec.purchase_value, 19.0);
    }

    #[test]
    fn recommendations_by_class_totals() {
        let mut recs = RecommendationsByClass::default();
        recs.stocks
            .push(Recommendation::single_unit(AssetClass::Stocks, &Candidate::new("A", "A", 1.0, 10.0)));
        recs.etfs
            .push(Recommendation::single_unit(AssetClass::Etfs, &Candidate::new("B", "B", 1.0, 5.0)));
        let totals = recs.totals();
        assert_eq!(totals.stocks, 10.0);
        assert_eq!(totals.etfs, 5.0);
        assert_eq!(totals.fixed_income, 0.0);
        assert_eq!(recs.line_count(), 2);
        assert!(recs.find(AssetClass::Etfs, "B").is_some());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Settings
// ═══════════════════════════════════════════════════════════════════

mod settings {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.target_weights, PerClass::new(30.0, 30.0, 20.0, 20.0));
        assert_eq!(s.split_tolerance, 0.01);
        assert_eq!(s.quotes.brapi_base_url, "https://brapi.dev/api");
        assert_eq!(s.quotes.timeout_secs, 10);
        assert_eq!(s.quotes.cache_ttl_minutes, 30);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let s = Settings::from_json_str(r#"{"api_keys":{"brapi":"abc"}}"#).unwrap();
        assert_eq!(s.api_keys.get("brapi").map(String::as_str), Some("abc"));
        assert_eq!(s.target_weights, Settings::default().target_weights);
    }

    #[test]
    fn weights_must_sum_to_100() {
        let err = Settings::default()
            .with_target_weights(PerClass::new(30.0, 30.0, 20.0, 10.0))
            .validate()
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidSettings(_)));
    }

    #[test]
    fn negative_weight_rejected() {
        let s = Settings::default().with_target_weights(PerClass::new(-10.0, 50.0, 40.0, 20.0));
        assert!(matches!(s.validate(), Err(CoreError::InvalidSettings(_))));
    }

    #[test]
    fn zero_timeout_rejected() {
        let mut s = Settings::default();
        s.quotes.timeout_secs = 0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn invalid_json_is_deserialization_error() {
        assert!(matches!(
            Settings::from_json_str("{not json"),
            Err(CoreError::Deserialization(_))
        ));
    }

    #[test]
    fn from_file_reads_and_validates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"target_weights":{{"funds_of_real_estate":40,"stocks":40,"etfs":10,"fixed_income":10}}}}"#
        )
        .unwrap();
        let s = Settings::from_file(file.path()).unwrap();
        assert_eq!(s.target_weights.funds_of_real_estate, 40.0);
    }

    #[test]
    fn from_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Settings::from_file(dir.path().join("missing.json"));
        assert!(matches!(result, Err(CoreError::FileIO(_))));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Money parsing
// ═══════════════════════════════════════════════════════════════════

mod money {
    use super::*;

    #[test]
    fn large_amount_with_thousands() {
        assert_eq!(parse_brl_amount("R$ 1.234.567,89").unwrap(), 1_234_567.89);
    }

    #[test]
    fn no_space_after_symbol() {
        assert_eq!(parse_brl_amount("R$500,00").unwrap(), 500.0);
    }

    #[test]
    fn garbage_is_validation_error() {
        assert!(matches!(
            parse_brl_amount("dez reais"),
            Err(CoreError::ValidationError(_))
        ));
    }
}
