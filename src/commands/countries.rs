use clap::Args;

use crate::algorithms::selection::group_by_country;
use crate::algorithms::selection::summarize_countries;
use crate::city_map::CityMap;
use crate::commands::CityFieldsArg;
use crate::commands::SourceArg;
use crate::commands::Task;
use crate::errors::CommandError;
use crate::progress::ProgressObserver;
use crate::subcommand_def;

subcommand_def!{
    /// Lists the countries found in the cities layer, with their capitals and the number of cities of each type
    pub(crate) struct Countries {

        #[clap(flatten)]
        pub(crate) source_arg: SourceArg,

        #[clap(flatten)]
        pub(crate) fields_arg: CityFieldsArg,

    }
}

impl Task for Countries {

    fn run<Progress: ProgressObserver>(self, progress: &mut Progress) -> Result<(),CommandError> {

        let source = CityMap::open(&self.source_arg.source)?;
        let mut cities_layer = source.cities_layer(&self.source_arg.layer, &self.fields_arg)?;

        let countries = group_by_country(cities_layer.read_cities(progress)?);

        for summary in summarize_countries(&countries) {
            let capitals = if summary.capitals.is_empty() {
                "no capital".to_owned()
            } else {
                summary.capitals.join(", ")
            };
            println!("{}: {} cities ({} coastal, {} inland, {} without population), capital: {}",
                summary.country,
                summary.cities,
                summary.coastal,
                summary.inland,
                summary.without_population,
                capitals
            );
        }

        progress.announce(|| format!("{} countries found in '{}'.",countries.len(),self.source_arg.layer));

        Ok(())
    }
}
