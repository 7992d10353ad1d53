mod common;

use common::{render, superstore_rows, write_fixture};
use superstore_dashboard::config::Settings;
use superstore_dashboard::data::filter::{filter, Choice, Selection};
use superstore_dashboard::data::load_table;
use superstore_dashboard::data::model::Category;
use superstore_dashboard::error::ConfigError;

#[test]
fn test_config_file_drives_the_pipeline() {
    let (_data_dir, data) = write_fixture("superstore.csv", &render(&superstore_rows(), ';'));
    let config = format!(
        r#"
        [data]
        path = "{}"
        delimiter = ";"

        [charts]
        top_sales = 2

        [filters]
        year = "All"
        categories = ["Technology"]
        "#,
        data.display()
    );
    let (_config_dir, config_path) = write_fixture("dashboard.toml", &config);

    let settings = Settings::load(&config_path).unwrap();
    assert_eq!(settings.data.path.as_deref(), Some(data.as_path()));
    assert_eq!(settings.filters.year, Choice::All);
    assert_eq!(
        settings.filters.categories,
        Selection::AnyOf([Category::Technology].into())
    );

    let table = load_table(
        &data,
        &settings.loader_options(),
        &settings.enrich_options(),
    )
    .unwrap();
    let view = filter(&table.records, &settings.filters);
    let products: Vec<&str> = view.iter().map(|r| r.record.product_name.as_str()).collect();
    assert_eq!(products, vec!["Copier", "Phone"]);
    assert_eq!(settings.report_settings().top_sales, 2);
}

#[test]
fn test_missing_config_file_is_a_read_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let result = Settings::load(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::Read { .. })));
}

#[test]
fn test_unknown_keys_are_rejected() {
    let result = Settings::from_toml_str("[charts]\ntop_salez = 3\n");
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}
