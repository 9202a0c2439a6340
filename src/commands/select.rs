use std::path::PathBuf;

use clap::Args;

use crate::algorithms::report::SelectionReport;
use crate::algorithms::selection::flatten_qualifying_sets;
use crate::algorithms::selection::group_by_country;
use crate::algorithms::selection::select_qualifying_cities;
use crate::city_map::CityMap;
use crate::city_map::QualifyingMap;
use crate::city_map::qualifying_layer::QualifyingLayer;
use crate::commands::CityFieldsArg;
use crate::commands::SourceArg;
use crate::commands::TargetArg;
use crate::commands::Task;
use crate::errors::CommandError;
use crate::progress::ProgressObserver;
use crate::subcommand_def;

subcommand_def!{
    /// Selects the capital of each country and the city of the opposite settlement type closest to it in population,
    /// and writes them to a new layer
    pub(crate) struct Select {

        #[clap(flatten)]
        pub(crate) source_arg: SourceArg,

        #[clap(flatten)]
        pub(crate) fields_arg: CityFieldsArg,

        #[clap(flatten)]
        pub(crate) target_arg: TargetArg,

        #[arg(long)]
        /// If specified, a JSON report of the selected cities is written to this path
        pub(crate) report: Option<PathBuf>,

    }
}

impl Task for Select {

    fn run<Progress: ProgressObserver>(self, progress: &mut Progress) -> Result<(),CommandError> {

        let source = CityMap::open(&self.source_arg.source)?;
        let mut cities_layer = source.cities_layer(&self.source_arg.layer, &self.fields_arg)?;

        progress.message(|| format!("Fields in {}: {}",self.source_arg.layer,cities_layer.schema().fields().iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")));

        progress.announce(|| "Loading cities");

        let cities = cities_layer.read_cities(progress)?;
        let countries = group_by_country(cities);

        progress.announce(|| "Selecting cities");

        let qualifying_sets = select_qualifying_cities(&countries, progress);
        let fids = flatten_qualifying_sets(&qualifying_sets);

        progress.announce(|| "Writing cities");

        let mut target = QualifyingMap::create_or_edit(&self.target_arg.target, &self.target_arg.format)?;

        let srs = cities_layer.spatial_ref();
        let written = target.with_transaction(|dataset| {
            let mut layer = QualifyingLayer::create_from_dataset(dataset, &self.target_arg.target_layer, cities_layer.schema(), srs.as_ref(), self.target_arg.overwrite)?;
            layer.add_cities(&cities_layer, &fids, progress)
        })?;

        target.save(progress)?;

        if let Some(report) = &self.report {
            SelectionReport::from_qualifying_sets(&qualifying_sets).write_to_file(report)?;
            progress.announce(|| format!("Selection report written to {}.",report.display()));
        }

        progress.announce(|| format!("Qualifying cities layer created: {} cities from {} countries written to '{}'.",written,qualifying_sets.len(),self.target_arg.target_layer));

        Ok(())

    }
}
