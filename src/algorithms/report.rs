use std::fs::File;
use std::io::BufWriter;
use std::io::Write as _;
use std::path::Path;

use schemars::JsonSchema;
use serde::Serialize;

use crate::algorithms::selection::QualifyingSet;
use crate::city_map::city_layer::CityRecord;
use crate::city_map::fields::Population;
use crate::city_map::fields::SettlementType;
use crate::errors::CommandError;

#[derive(Serialize,JsonSchema,Debug,PartialEq,Eq)]
/// A city that was written to the qualifying cities layer.
pub(crate) struct CityReport {
    /// The feature id of the city in the source layer.
    pub(crate) fid: u64,
    pub(crate) name: String,
    pub(crate) settlement_type: SettlementType,
    /// The population as it was read. Null if it couldn't be read as a number.
    pub(crate) population: Option<i64>
}

impl From<&CityRecord> for CityReport {

    fn from(value: &CityRecord) -> Self {
        Self {
            fid: value.fid.to_inner(),
            name: value.name.clone(),
            settlement_type: value.settlement_type,
            population: value.population.map(Population::to_inner)
        }
    }
}

#[derive(Serialize,JsonSchema,Debug,PartialEq,Eq)]
/// The city of the opposite settlement type to the capital which is closest to it in population.
pub(crate) struct MatchReport {
    pub(crate) city: CityReport,
    /// The absolute difference between this city's population and the capital's.
    pub(crate) population_difference: u64
}

#[derive(Serialize,JsonSchema,Debug,PartialEq,Eq)]
pub(crate) struct CountryReport {
    /// The value of the country code field shared by the cities.
    pub(crate) country: String,
    pub(crate) capital: CityReport,
    /// Null if no city of the opposite settlement type with a usable population was found.
    pub(crate) opposite_match: Option<MatchReport>
}

#[derive(Serialize,JsonSchema,Debug,PartialEq,Eq)]
#[schemars(title = "Selection Report")]
/// The cities selected for each country which had a capital, in country code order.
pub(crate) struct SelectionReport {
    pub(crate) countries: Vec<CountryReport>
}

impl SelectionReport {

    pub(crate) fn from_qualifying_sets(sets: &[QualifyingSet]) -> Self {
        Self {
            countries: sets.iter().map(|set| CountryReport {
                country: set.country.to_owned(),
                capital: set.capital.into(),
                opposite_match: set.opposite_match.as_ref().map(|found| MatchReport {
                    city: found.city.into(),
                    population_difference: found.population_difference
                })
            }).collect()
        }
    }

    pub(crate) fn write_to_file<FilePath: AsRef<Path>>(&self, path: &FilePath) -> Result<(),CommandError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

}

#[cfg(test)]
mod test {

    use serde_json::json;

    use super::SelectionReport;
    use crate::algorithms::selection::group_by_country;
    use crate::algorithms::selection::select_qualifying_cities;
    use crate::city_map::city_layer::CityRecord;
    use crate::city_map::fields::Population;
    use crate::city_map::fields::SettlementType;
    use crate::typed_map::fields::IdRef;

    #[test]
    fn test_report_json() {
        let countries = group_by_country(vec![
            CityRecord {
                fid: IdRef::new(1),
                country_code: "NO".to_owned(),
                name: "Oslo".to_owned(),
                is_capital: true,
                settlement_type: SettlementType::Coastal,
                population: Some(Population::new(500_000))
            },
            CityRecord {
                fid: IdRef::new(2),
                country_code: "NO".to_owned(),
                name: "Hamar".to_owned(),
                is_capital: false,
                settlement_type: SettlementType::Inland,
                population: Some(Population::new(480_000))
            },
            CityRecord {
                fid: IdRef::new(3),
                country_code: "LI".to_owned(),
                name: "Vaduz".to_owned(),
                is_capital: true,
                settlement_type: SettlementType::Inland,
                population: None
            },
        ]);
        let sets = select_qualifying_cities(&countries, &mut ());
        let report = SelectionReport::from_qualifying_sets(&sets);
        assert_eq!(serde_json::to_value(&report).unwrap(),json!({
            "countries": [
                {
                    "country": "LI",
                    "capital": { "fid": 3, "name": "Vaduz", "settlement_type": "inland", "population": null },
                    "opposite_match": null
                },
                {
                    "country": "NO",
                    "capital": { "fid": 1, "name": "Oslo", "settlement_type": "coastal", "population": 500000 },
                    "opposite_match": {
                        "city": { "fid": 2, "name": "Hamar", "settlement_type": "inland", "population": 480000 },
                        "population_difference": 20000
                    }
                }
            ]
        }));
    }

}
