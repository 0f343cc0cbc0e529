use tally::catalog::Catalog;
use tally::model::Variant;
use tally::options::{dia_options, maker_options, model_options};

fn variant(code: &str, maker: &str, model: &str, dia: f64) -> Variant {
    Variant {
        code: code.to_string(),
        maker: maker.to_string(),
        model: model.to_string(),
        dia,
    }
}

#[test]
fn makers_are_distinct_sorted_and_nonempty() {
    let catalog = Catalog::new(vec![
        variant("1", "banshu", "X", 1.0),
        variant("2", "Aiko", "Y", 1.0),
        variant("3", "Aiko", "Z", 2.0),
        variant("4", "", "W", 3.0),
        variant("5", "Chubu", "V", 0.3),
    ]);

    assert_eq!(maker_options(&catalog), vec!["Aiko", "banshu", "Chubu"]);
}

#[test]
fn models_require_a_maker_and_filter_by_it() {
    let catalog = Catalog::new(vec![
        variant("1", "Aiko", "SWP-B", 0.5),
        variant("2", "Aiko", "SWP-A", 0.5),
        variant("3", "Aiko", "SWP-A", 0.8),
        variant("4", "Banshu", "HDW", 1.2),
    ]);

    assert!(model_options(&catalog, "").is_empty());
    // First-seen catalog order, de-duplicated.
    assert_eq!(model_options(&catalog, "Aiko"), vec!["SWP-B", "SWP-A"]);
    assert_eq!(model_options(&catalog, "Banshu"), vec!["HDW"]);
    assert!(model_options(&catalog, "Nobody").is_empty());
}

#[test]
fn dias_require_both_upstream_fields() {
    let catalog = Catalog::new(vec![variant("1", "Aiko", "SWP-A", 0.5)]);

    assert!(dia_options(&catalog, "", "").is_empty());
    assert!(dia_options(&catalog, "Aiko", "").is_empty());
    assert!(dia_options(&catalog, "", "SWP-A").is_empty());
    assert_eq!(dia_options(&catalog, "Aiko", "SWP-A"), vec![0.5]);
}

#[test]
fn dias_are_ascending_and_deduped_within_tolerance() {
    let catalog = Catalog::new(vec![
        variant("1", "Aiko", "SWP-A", 1.2),
        variant("2", "Aiko", "SWP-A", 0.5),
        // Textual round-trip noise on an existing size.
        variant("3", "Aiko", "SWP-A", 0.5 + 1e-12),
        variant("4", "Aiko", "SWP-A", 0.8),
    ]);

    assert_eq!(dia_options(&catalog, "Aiko", "SWP-A"), vec![0.5, 0.8, 1.2]);
}
