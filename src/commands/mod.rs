use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;

use crate::errors::CommandError;
use crate::progress::ProgressObserver;

mod select;
mod countries;
mod docs;

use select::Select;
use countries::Countries;
use docs::Docs;

pub(crate) trait Task {

    fn run<Progress: ProgressObserver>(self, progress: &mut Progress) -> Result<(),CommandError>;

}

#[macro_export]
macro_rules! command_def {
    ($struct_name: ident {$($command_name: ident),*}) => {

        #[derive(Subcommand)]
        pub(crate) enum $struct_name {
            $(
                $command_name($command_name)
            ),*
        }

        impl Task for $struct_name {

            fn run<Progress: ProgressObserver>(self, progress: &mut Progress) -> Result<(),CommandError> {
                match self {
                    $(Self::$command_name(a) => a.run(progress)),*
                }
            }

        }
    };
}

#[macro_export]
macro_rules! subcommand_def {
    ($(#[$attr: meta])* $visibility: vis struct $name: ident $body: tt) => {
        #[derive(Args)]
        $(#[$attr])*
        $visibility struct $name $body
    };
}

// "Docs" is hidden, it's only for generating the files in the repository.

command_def!{
    MainCommand {
        Select,
        Countries,
        Docs
    }
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Picks the capital of each country, and the coastal or inland city closest to its population, out of a layer of
/// cities.
pub(crate) struct QualifyingCities {

    #[arg(long,global=true)]
    /// Don't print a line for each country and city as they're processed. Progress bars and warnings are still shown.
    pub(crate) quiet: bool,

    #[command(subcommand)]
    pub(crate) command: MainCommand

}

impl Task for QualifyingCities {

    fn run<Progress: ProgressObserver>(self, progress: &mut Progress) -> Result<(),CommandError> {
        self.command.run(progress)
    }
}

#[derive(Args)]
pub(crate) struct SourceArg {

    /// The path to a vector file containing the cities
    pub(crate) source: PathBuf,

    #[arg(long,default_value="cities")]
    /// The name of the layer in the source file which holds the cities
    pub(crate) layer: String,

}

pub(crate) const DEFAULT_COUNTRY_FIELD: &str = "FIPS_CNTRY";
pub(crate) const DEFAULT_CAPITAL_FIELD: &str = "capital";
pub(crate) const DEFAULT_TYPE_FIELD: &str = "type";
pub(crate) const DEFAULT_POPULATION_FIELD: &str = "pop";
pub(crate) const DEFAULT_NAME_FIELD: &str = "CITY_NAME";

#[derive(Args)]
/// Names of the fields in the cities layer. Names are matched case-insensitively if there's no exact match.
pub(crate) struct CityFieldsArg {

    #[arg(long,default_value=DEFAULT_COUNTRY_FIELD)]
    /// The field holding the country code that cities are grouped by
    pub(crate) country_field: String,

    #[arg(long,default_value=DEFAULT_CAPITAL_FIELD)]
    /// The field flagging the capital city, numbers other than 0 and text such as 'yes' or 'true' mean it's a capital
    pub(crate) capital_field: String,

    #[arg(long,default_value=DEFAULT_TYPE_FIELD)]
    /// The field holding the settlement type, either 'coastal' (or 'coast') or 'inland'
    pub(crate) type_field: String,

    #[arg(long,default_value=DEFAULT_POPULATION_FIELD)]
    /// The field holding the population, as a number or text with thousands separators
    pub(crate) population_field: String,

    #[arg(long,default_value=DEFAULT_NAME_FIELD)]
    /// The field holding the city name, used in messages and the report
    pub(crate) name_field: String,

}

impl Default for CityFieldsArg {

    fn default() -> Self {
        Self {
            country_field: DEFAULT_COUNTRY_FIELD.to_owned(),
            capital_field: DEFAULT_CAPITAL_FIELD.to_owned(),
            type_field: DEFAULT_TYPE_FIELD.to_owned(),
            population_field: DEFAULT_POPULATION_FIELD.to_owned(),
            name_field: DEFAULT_NAME_FIELD.to_owned(),
        }
    }
}

#[derive(Args)]
pub(crate) struct TargetArg {

    /// The path to the file to write the qualifying cities to. It will be created if it doesn't exist.
    pub(crate) target: PathBuf,

    #[arg(long,default_value="qualifying_cities")]
    /// The name of the layer to create in the target file
    pub(crate) target_layer: String,

    #[arg(long,default_value="GPKG")]
    /// The gdal driver used to create the target file if it doesn't exist yet
    pub(crate) format: String,

    #[arg(long)]
    /// If true and the layer already exists in the target file, it will be overwritten. Otherwise, an error will occur if the layer exists.
    pub(crate) overwrite: bool,

}
