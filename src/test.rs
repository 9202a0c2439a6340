use std::ffi::OsStr;
use std::fs::File;
use std::path::Path;

use clap::Parser as _;
use gdal::Dataset;
use gdal::DriverManager;
use gdal::spatial_ref::SpatialRef;
use gdal::vector::Feature;
use gdal::vector::FieldValue;
use gdal::vector::Geometry;
use gdal::vector::LayerAccess;
use gdal::vector::LayerOptions;
use gdal::vector::OGRFieldType;
use gdal::vector::OGRwkbGeometryType;
use serde_json::Value;
use tempfile::TempDir;

use crate::algorithms::selection::flatten_qualifying_sets;
use crate::algorithms::selection::group_by_country;
use crate::algorithms::selection::select_qualifying_cities;
use crate::city_map::QualifyingMap;
use crate::city_map::city_layer::CityLayer;
use crate::city_map::qualifying_layer::QualifyingLayer;
use crate::commands::CityFieldsArg;
use crate::commands::QualifyingCities;
use crate::commands::Task as _;
use crate::errors::CommandError;
use crate::progress::test::RecordingProgress;
use crate::typed_map::fields::IdRef;
use crate::typed_map::schema::FieldDefinition;

struct TestCity {
    country: Option<&'static str>,
    name: &'static str,
    capital: &'static str,
    settlement_type: &'static str,
    population: Option<&'static str>,
    position: Option<(f64,f64)>
}

const fn city(country: &'static str, name: &'static str, capital: &'static str, settlement_type: &'static str, population: &'static str) -> TestCity {
    TestCity {
        country: Some(country),
        name,
        capital,
        settlement_type,
        population: Some(population),
        position: Some((0.0,0.0))
    }
}

fn memory_dataset() -> Dataset {
    DriverManager::get_driver_by_name("Memory").expect("Memory driver should be available.")
        .create_vector_only("").expect("Memory dataset should have been created.")
}

fn create_cities(cities: &[TestCity]) -> Dataset {
    let mut dataset = memory_dataset();
    write_cities(&mut dataset, cities, OGRwkbGeometryType::wkbPoint);
    dataset
}

fn create_cities_file(path: &Path, cities: &[TestCity]) {
    let mut dataset = DriverManager::get_driver_by_name("GPKG").expect("GPKG driver should be available.")
        .create_vector_only(path).expect("GPKG file should have been created.");
    write_cities(&mut dataset, cities, OGRwkbGeometryType::wkbPoint);
    dataset.flush_cache().expect("GPKG file should have been written.");
}

// The population is stored as text, like the data this program was written for, so thousands separators can be tested.
fn write_cities(dataset: &mut Dataset, cities: &[TestCity], geometry_type: OGRwkbGeometryType::Type) {
    let srs = SpatialRef::from_epsg(4326).expect("EPSG 4326 should be known.");
    let layer = dataset.create_layer(LayerOptions {
        name: "cities",
        ty: geometry_type,
        srs: Some(&srs),
        options: None
    }).expect("Layer should have been created.");

    let fields = [
        FieldDefinition::new("FIPS_CNTRY", OGRFieldType::OFTString),
        FieldDefinition::new("CITY_NAME", OGRFieldType::OFTString),
        FieldDefinition::new("capital", OGRFieldType::OFTString),
        FieldDefinition::new("type", OGRFieldType::OFTString),
        FieldDefinition::new("pop", OGRFieldType::OFTString),
        FieldDefinition::new("notes", OGRFieldType::OFTString),
    ];
    for field in &fields {
        field.add_to_layer(&layer).expect("Field should have been added.");
    }

    for city in cities {
        let mut feature = Feature::new(layer.defn()).expect("Feature should have been created.");
        if let Some((x,y)) = city.position {
            let mut point = Geometry::empty(OGRwkbGeometryType::wkbPoint).expect("Point should have been created.");
            point.add_point_2d((x,y));
            let geometry = if geometry_type == OGRwkbGeometryType::wkbMultiPoint {
                let mut multi_point = Geometry::empty(OGRwkbGeometryType::wkbMultiPoint).expect("Multi-point should have been created.");
                multi_point.add_geometry(point).expect("Point should have been added.");
                multi_point
            } else {
                point
            };
            feature.set_geometry(geometry).expect("Geometry should have been set.");
        }
        let mut set_text = |index: usize, value: Option<&str>| {
            let result = match value {
                Some(value) => feature.set_field(index, &FieldValue::StringValue(value.to_owned())),
                None => feature.set_field_null(index)
            };
            result.expect("Field should have been set.")
        };
        set_text(0, city.country);
        set_text(1, Some(city.name));
        set_text(2, Some(city.capital));
        set_text(3, Some(city.settlement_type));
        set_text(4, city.population);
        set_text(5, None);
        feature.create(&layer).expect("Feature should have been written.");
    }
}

fn select_into(source: &Dataset, target: &mut Dataset, progress: &mut RecordingProgress) -> Result<usize,CommandError> {
    let mut cities_layer = CityLayer::open_from_dataset(source, "cities", &CityFieldsArg::default())?;
    let countries = group_by_country(cities_layer.read_cities(progress)?);
    let sets = select_qualifying_cities(&countries, progress);
    let fids = flatten_qualifying_sets(&sets);
    let srs = cities_layer.spatial_ref();
    let mut layer = QualifyingLayer::create_from_dataset(target, "qualifying_cities", cities_layer.schema(), srs.as_ref(), false)?;
    layer.add_cities(&cities_layer, &fids, progress)
}

fn run_command(args: &[&OsStr], progress: &mut RecordingProgress) -> Result<(),CommandError> {
    let args = [OsStr::new("qualifying-cities")].into_iter().chain(args.iter().copied());
    QualifyingCities::try_parse_from(args).expect("Arguments should have parsed.").run(progress)
}

fn output_names_in_file(path: &Path) -> Vec<String> {
    let target = Dataset::open(path).expect("Target file should have opened.");
    output_names(&target)
}

fn output_names(target: &Dataset) -> Vec<String> {
    let mut layer = target.layer_by_name("qualifying_cities").expect("Output layer should exist.");
    layer.features().map(|feature| {
        match feature.field(1).expect("Name field should be readable.") {
            Some(FieldValue::StringValue(name)) => name,
            value => panic!("Unexpected name value {:?}",value)
        }
    }).collect()
}

#[test]
fn test_select_writes_only_qualifying_cities() {
    let source = create_cities(&[
        city("NO", "Oslo", "1", "coastal", "500,000"),
        city("NO", "Bergen", "0", "coastal", "499,000"),
        city("NO", "Hamar", "0", "inland", "480000"),
        city("NO", "Lillehammer", "0", "inland", "600000"),
        city("LI", "Vaduz", "yes", "Inland", "5,000"),
        city("XX", "Nowhere", "no", "coast", "10"),
        city("XX", "Elsewhere", "", "inland", "12"),
    ]);
    let mut target = memory_dataset();
    let mut progress = RecordingProgress::default();

    let written = select_into(&source, &mut target, &mut progress).expect("Selection should have succeeded.");

    assert_eq!(written,3);
    // countries are written in code order, each capital before its match.
    assert_eq!(output_names(&target),vec!["Vaduz","Oslo","Hamar"]);
    assert!(progress.warnings.borrow().contains(&"No capital city found for country XX".to_owned()));
}

#[test]
fn test_output_copies_schema_and_values() {
    let mut capital = city("NO", "Oslo", "1", "coastal", "500,000");
    capital.position = Some((10.75,59.91));
    let mut inland = city("NO", "Hamar", "0", "inland", "480000");
    // no location, but still a city
    inland.position = None;
    let source = create_cities(&[capital,inland]);
    let mut target = memory_dataset();

    _ = select_into(&source, &mut target, &mut RecordingProgress::default()).expect("Selection should have succeeded.");

    let source_layer = source.layer_by_name("cities").expect("Source layer should exist.");
    let mut layer = target.layer_by_name("qualifying_cities").expect("Output layer should exist.");
    let source_fields: Vec<(String,u32)> = source_layer.defn().fields().map(|field| (field.name(),field.field_type())).collect();
    let target_fields: Vec<(String,u32)> = layer.defn().fields().map(|field| (field.name(),field.field_type())).collect();
    assert_eq!(source_fields,target_fields);
    assert!(layer.spatial_ref().is_some());

    let features: Vec<Feature> = layer.features().collect();
    assert_eq!(features.len(),2);

    assert_eq!(features[0].field(4).unwrap(),Some(FieldValue::StringValue("500,000".to_owned())));
    assert_eq!(features[0].field(5).unwrap(),None);
    let location = features[0].geometry().expect("Capital should have a location.").get_point(0);
    assert_eq!((location.0,location.1),(10.75,59.91));

    assert_eq!(features[1].field(1).unwrap(),Some(FieldValue::StringValue("Hamar".to_owned())));
    assert!(features[1].geometry().is_none());
}

#[test]
fn test_empty_source_gives_empty_layer() {
    let source = create_cities(&[]);
    let mut target = memory_dataset();
    let written = select_into(&source, &mut target, &mut RecordingProgress::default()).expect("Selection should have succeeded.");
    assert_eq!(written,0);
    assert_eq!(target.layer_by_name("qualifying_cities").expect("Output layer should exist.").feature_count(),0);
}

#[test]
fn test_records_without_country_or_population() {
    let mut stateless = city("NO", "Atlantis", "0", "inland", "499,999");
    stateless.country = None;
    let mut uncounted = city("NO", "Lillehammer", "0", "inland", "");
    uncounted.population = None;
    let source = create_cities(&[
        city("NO", "Oslo", "1", "coastal", "500,000"),
        stateless,
        uncounted,
        city("NO", "Hamar", "0", "inland", "about 480000"),
        city("NO", "Kongsvinger", "0", "inland", "17,000"),
    ]);
    let mut target = memory_dataset();
    let mut progress = RecordingProgress::default();

    _ = select_into(&source, &mut target, &mut progress).expect("Selection should have succeeded.");

    assert_eq!(output_names(&target),vec!["Oslo","Kongsvinger"]);
    // one for the missing country, one each for the missing and malformed populations
    assert_eq!(progress.warnings.borrow().len(),3);
}

#[test]
fn test_unknown_settlement_type_fails() {
    let source = create_cities(&[
        city("NO", "Oslo", "1", "coastal", "500,000"),
        city("NO", "Trondheim", "0", "fjord", "200,000"),
    ]);
    let mut target = memory_dataset();
    match select_into(&source, &mut target, &mut RecordingProgress::default()) {
        Err(CommandError::InvalidValueForSettlementType(value)) => assert_eq!(value,"fjord"),
        Err(err) => panic!("Unexpected error: {}",err),
        Ok(_) => panic!("'fjord' should not be accepted as a settlement type")
    }
}

#[test]
fn test_missing_source_field_fails_before_reading() {
    let source = create_cities(&[city("NO", "Oslo", "1", "coastal", "500,000")]);
    let fields = CityFieldsArg {
        population_field: "POP_1990".to_owned(),
        ..CityFieldsArg::default()
    };
    match CityLayer::open_from_dataset(&source, "cities", &fields) {
        Err(CommandError::MissingSourceField(layer,field)) => {
            assert_eq!(layer,"cities");
            assert_eq!(field,"POP_1990");
        },
        Err(err) => panic!("Unexpected error: {}",err),
        Ok(_) => panic!("POP_1990 is not a field in the layer")
    }
}

#[test]
fn test_field_names_are_case_insensitive() {
    let source = create_cities(&[city("NO", "Oslo", "1", "coastal", "500,000")]);
    let fields = CityFieldsArg {
        country_field: "fips_cntry".to_owned(),
        type_field: "TYPE".to_owned(),
        ..CityFieldsArg::default()
    };
    let mut layer = CityLayer::open_from_dataset(&source, "cities", &fields).expect("Layer should have opened.");
    let cities = layer.read_cities(&mut ()).expect("Cities should have been read.");
    assert_eq!(cities.len(),1);
    assert_eq!(cities[0].country_code,"NO");
    assert!(cities[0].is_capital);
}

#[test]
fn test_output_keeps_source_geometry_type() {
    let mut source = memory_dataset();
    write_cities(&mut source, &[
        city("NO", "Oslo", "1", "coastal", "500,000"),
        city("NO", "Hamar", "0", "inland", "480000"),
    ], OGRwkbGeometryType::wkbMultiPoint);
    let mut target = memory_dataset();

    _ = select_into(&source, &mut target, &mut RecordingProgress::default()).expect("Selection should have succeeded.");

    let mut layer = target.layer_by_name("qualifying_cities").expect("Output layer should exist.");
    assert_eq!(layer.defn().geometry_type(),OGRwkbGeometryType::wkbMultiPoint);
    let feature = layer.features().next().expect("Capital should have been written.");
    assert_eq!(feature.geometry().expect("Capital should have a location.").geometry_count(),1);
}

#[test]
fn test_existing_layer_needs_overwrite() {
    let dir = TempDir::new().expect("Temporary directory should have been created.");
    let first_source = dir.path().join("first.gpkg");
    let second_source = dir.path().join("second.gpkg");
    let target = dir.path().join("target.gpkg");
    create_cities_file(&first_source, &[
        city("NO", "Oslo", "1", "coastal", "500,000"),
        city("NO", "Hamar", "0", "inland", "480000"),
    ]);
    create_cities_file(&second_source, &[
        city("SE", "Stockholm", "1", "coastal", "900,000"),
        city("SE", "Uppsala", "0", "inland", "150,000"),
    ]);

    let mut progress = RecordingProgress::default();
    run_command(&[OsStr::new("select"), first_source.as_os_str(), target.as_os_str()], &mut progress).expect("First selection should have succeeded.");
    assert_eq!(output_names_in_file(&target),vec!["Oslo","Hamar"]);

    match run_command(&[OsStr::new("select"), second_source.as_os_str(), target.as_os_str()], &mut progress) {
        Err(CommandError::GdalError(_)) => (),
        Err(err) => panic!("Unexpected error: {}",err),
        Ok(()) => panic!("An existing layer should not be replaced without --overwrite")
    }
    assert_eq!(output_names_in_file(&target),vec!["Oslo","Hamar"]);

    run_command(&[OsStr::new("select"), second_source.as_os_str(), target.as_os_str(), OsStr::new("--overwrite")], &mut progress).expect("Overwriting selection should have succeeded.");
    assert_eq!(output_names_in_file(&target),vec!["Stockholm","Uppsala"]);
}

#[test]
fn test_failed_write_is_rolled_back() {
    let dir = TempDir::new().expect("Temporary directory should have been created.");
    let path = dir.path().join("target.gpkg");
    let source = create_cities(&[
        city("NO", "Oslo", "1", "coastal", "500,000"),
        city("NO", "Hamar", "0", "inland", "480000"),
    ]);
    let mut cities_layer = CityLayer::open_from_dataset(&source, "cities", &CityFieldsArg::default()).expect("Layer should have opened.");
    let cities = cities_layer.read_cities(&mut ()).expect("Cities should have been read.");
    // the capital is written, then the missing feature fails.
    let fids = [cities[0].fid.clone(),IdRef::new(999)];

    let mut target = QualifyingMap::create_or_edit(&path, "GPKG").expect("Target should have been created.");
    let result = target.with_transaction(|dataset| {
        let mut layer = QualifyingLayer::create_from_dataset(dataset, "qualifying_cities", cities_layer.schema(), None, false)?;
        layer.add_cities(&cities_layer, &fids, &mut ())
    });
    match result {
        Err(CommandError::MissingFeature(layer,fid)) => {
            assert_eq!(layer,"cities");
            assert_eq!(fid,IdRef::new(999));
        },
        Err(err) => panic!("Unexpected error: {}",err),
        Ok(_) => panic!("Feature 999 does not exist")
    }
    target.save(&mut ()).expect("Target should have been saved.");
    drop(target);

    let target = Dataset::open(&path).expect("Target file should have opened.");
    assert!(target.layer_by_name("qualifying_cities").is_err());
}

#[test]
fn test_report_lists_selected_cities() {
    let dir = TempDir::new().expect("Temporary directory should have been created.");
    let source = dir.path().join("source.gpkg");
    let target = dir.path().join("target.gpkg");
    let report = dir.path().join("report.json");
    create_cities_file(&source, &[
        city("NO", "Oslo", "1", "coastal", "500,000"),
        city("NO", "Hamar", "0", "inland", "480000"),
        city("LI", "Vaduz", "1", "inland", "5,000"),
        city("XX", "Nowhere", "0", "coastal", "10"),
    ]);

    let mut progress = RecordingProgress::default();
    run_command(&[OsStr::new("select"), source.as_os_str(), target.as_os_str(), OsStr::new("--report"), report.as_os_str()], &mut progress).expect("Selection should have succeeded.");

    let report_json: Value = serde_json::from_reader(File::open(&report).expect("Report should have been written.")).expect("Report should be JSON.");
    let countries = report_json["countries"].as_array().expect("Report should list countries.");
    let codes: Vec<&str> = countries.iter().map(|country| country["country"].as_str().expect("Country should have a code.")).collect();
    assert_eq!(codes,vec!["LI","NO"]);
    assert_eq!(countries[0]["capital"]["name"],"Vaduz");
    assert!(countries[0]["opposite_match"].is_null());
    assert_eq!(countries[1]["capital"]["name"],"Oslo");
    assert_eq!(countries[1]["opposite_match"]["city"]["name"],"Hamar");
    assert_eq!(countries[1]["opposite_match"]["population_difference"],20000);

    let expected_message = format!("Selection report written to {}.",report.display());
    assert!(progress.messages.borrow().contains(&expected_message));
}
