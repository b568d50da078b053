use rental_underwriting::config::ScreeningConfig;
use rental_underwriting::underwriting::{
    screen_property, BuyingBoxCriteria, MetricsCalculator, MetricsError, PropertyCsvImporter,
};

fn fixture_path() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/listings.csv")
}

#[test]
fn importer_reads_listing_export() {
    let records = PropertyCsvImporter::from_path(fixture_path()).expect("fixture imports");

    assert_eq!(records.len(), 4);
    let addresses: Vec<&str> = records.iter().map(|record| record.address.as_str()).collect();
    assert_eq!(
        addresses,
        vec![
            "418 Prairie View Rd",
            "1207 Linden Ave",
            "77 Quarry St",
            "3 Harbor Ct"
        ]
    );

    let linden = &records[1].input;
    assert_eq!(linden.purchase_price, 189_900.0);
    assert_eq!(linden.intended_monthly_rent, Some(1_850.0));
    assert_eq!(linden.expenses().hoa, None);
    assert_eq!(linden.expenses().annual_total(), 980.0 + 2_750.0 + 1_200.0);
    assert_eq!(linden.financing().interest_rate(), 6.875);
}

#[test]
fn imported_rows_feed_the_metrics_engine() {
    let records = PropertyCsvImporter::from_path(fixture_path()).expect("fixture imports");
    let calculator = MetricsCalculator::new();

    let ranch = calculator.compute(&records[0].input).expect("complete row");
    assert_eq!(ranch.cash_to_close, Some(55_000.0));

    let error = calculator
        .compute(&records[2].input)
        .expect_err("sparse row lacks rent");
    assert_eq!(
        error,
        MetricsError::MissingInputs {
            missing: vec!["intended_monthly_rent"]
        }
    );
}

#[test]
fn imported_rows_can_be_screened_without_metrics() {
    let records = PropertyCsvImporter::from_path(fixture_path()).expect("fixture imports");
    let criteria = vec![BuyingBoxCriteria {
        max_purchase_price: Some(200_000.0),
        min_year_built: Some(1970),
        ..BuyingBoxCriteria::named("Older affordable stock")
    }];

    let quarry = screen_property(
        &records[2].input,
        None,
        &criteria,
        &ScreeningConfig::default(),
    );
    assert!(!quarry[0].qualifies);
    assert_eq!(quarry[0].comparison.score, 50.0);

    let linden = screen_property(
        &records[1].input,
        None,
        &criteria,
        &ScreeningConfig::default(),
    );
    assert!(linden[0].qualifies);
}
