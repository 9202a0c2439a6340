use indexmap::IndexMap;
use indexmap::map::Iter as IndexIter;

use crate::city_map::city_layer::CityRecord;
use crate::city_map::fields::SettlementType;
use crate::progress::ProgressObserver;
use crate::typed_map::fields::IdRef;

/// Cities grouped by country code. Countries iterate in code order, cities in the order they were read.
pub(crate) struct CountryIndex {
    inner: IndexMap<String,Vec<CityRecord>>
}

impl CountryIndex {

    pub(crate) fn iter(&self) -> IndexIter<'_, String, Vec<CityRecord>> {
        self.inner.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.len()
    }

}

pub(crate) fn group_by_country(cities: Vec<CityRecord>) -> CountryIndex {
    let mut inner: IndexMap<String,Vec<CityRecord>> = IndexMap::new();
    for city in cities {
        inner.entry(city.country_code.clone()).or_default().push(city);
    }
    // otherwise the order of countries would depend on the order of the source layer.
    inner.sort_keys();
    CountryIndex {
        inner
    }
}

#[derive(Debug)]
pub(crate) struct OppositeMatch<'records> {
    pub(crate) city: &'records CityRecord,
    pub(crate) population_difference: u64
}

/// The capital of a country, and the city of the other settlement type nearest to it in population, if there is one.
#[derive(Debug)]
pub(crate) struct QualifyingSet<'records> {
    pub(crate) country: &'records str,
    pub(crate) capital: &'records CityRecord,
    pub(crate) opposite_match: Option<OppositeMatch<'records>>
}

impl QualifyingSet<'_> {

    pub(crate) fn fids(&self) -> impl Iterator<Item = &IdRef> {
        Some(&self.capital.fid).into_iter().chain(self.opposite_match.as_ref().map(|found| &found.city.fid))
    }

}

/// The first city flagged as a capital. Any others are warned about, but they don't change the answer.
pub(crate) fn find_capital<'records, Progress: ProgressObserver>(country: &str, cities: &'records [CityRecord], progress: &Progress) -> Option<&'records CityRecord> {
    let mut capitals = cities.iter().filter(|city| city.is_capital);
    let capital = capitals.next()?;
    for extra in capitals {
        progress.warning(|| format!("Country {} has more than one capital, '{}' will be used instead of '{}'.",country,capital.name,extra.name));
    }
    Some(capital)
}

/// Looks through all of the cities for the ones of the opposite settlement type to the capital, and returns the one
/// with the population closest to the capital's. When two are equally close, the first one wins. Cities with no usable
/// population are never returned, and if the capital has no usable population there's nothing to compare against.
pub(crate) fn find_opposite_match<'records>(cities: &'records [CityRecord], capital: &CityRecord) -> Option<OppositeMatch<'records>> {
    let capital_population = capital.population?;
    let opposite_type = capital.settlement_type.opposite();

    let mut closest: Option<OppositeMatch> = None;
    for city in cities {
        if (city.settlement_type != opposite_type) || (city.fid == capital.fid) {
            continue;
        }
        let Some(population) = city.population else {
            continue;
        };
        let population_difference = population.difference(capital_population);
        // strictly less than, so ties stay with the earlier city.
        let closer = match &closest {
            Some(closest) => population_difference < closest.population_difference,
            None => true
        };
        if closer {
            closest = Some(OppositeMatch {
                city,
                population_difference
            })
        }
    }
    closest
}

pub(crate) fn select_qualifying_cities<'records, Progress: ProgressObserver>(countries: &'records CountryIndex, progress: &mut Progress) -> Vec<QualifyingSet<'records>> {

    let mut result = Vec::new();

    progress.start_known_endpoint(|| ("Selecting qualifying cities.",countries.len()));

    for (i,(country,cities)) in countries.iter().enumerate() {
        progress.message(|| format!("Processing country: {}",country));

        if let Some(capital) = find_capital(country, cities, &*progress) {

            progress.message(|| format!("Capital city added: {} with type {}",capital.name,capital.settlement_type));

            if capital.population.is_none() {
                progress.warning(|| format!("Capital city {} of country {} has no usable population, so no {} city can be matched to it.",capital.name,country,capital.settlement_type.opposite()));
            }

            let opposite_match = find_opposite_match(cities, capital);

            if let Some(found) = &opposite_match {
                progress.message(|| format!("Opposite-type city added: {} with type {}",found.city.name,found.city.settlement_type));
            }

            result.push(QualifyingSet {
                country,
                capital,
                opposite_match
            });

        } else {
            progress.warning(|| format!("No capital city found for country {}",country));
        }

        progress.update(|| i);
    }

    progress.finish(|| format!("{} qualifying cities selected from {} countries.",result.iter().map(|set| set.fids().count()).sum::<usize>(),result.len()));

    result
}

/// The feature ids of all selected cities, each capital followed by its match.
pub(crate) fn flatten_qualifying_sets(sets: &[QualifyingSet]) -> Vec<IdRef> {
    sets.iter().flat_map(|set| set.fids()).cloned().collect()
}

/// A few numbers about one country, for checking a dataset before running the selection.
#[derive(Debug,PartialEq,Eq)]
pub(crate) struct CountrySummary {
    pub(crate) country: String,
    pub(crate) cities: usize,
    pub(crate) coastal: usize,
    pub(crate) inland: usize,
    pub(crate) capitals: Vec<String>,
    pub(crate) without_population: usize
}

pub(crate) fn summarize_countries(countries: &CountryIndex) -> Vec<CountrySummary> {
    countries.iter().map(|(country,cities)| {
        let count_type = |settlement_type: SettlementType| cities.iter().filter(|city| city.settlement_type == settlement_type).count();
        CountrySummary {
            country: country.clone(),
            cities: cities.len(),
            coastal: count_type(SettlementType::Coastal),
            inland: count_type(SettlementType::Inland),
            capitals: cities.iter().filter(|city| city.is_capital).map(|city| city.name.clone()).collect(),
            without_population: cities.iter().filter(|city| city.population.is_none()).count()
        }
    }).collect()
}
