use std::fs::File;
use std::io::Write as _;
use std::path::PathBuf;

use clap::Args;
use clap_markdown::help_markdown;
use schemars::JsonSchema;
use schemars::schema_for;

use crate::algorithms::report::SelectionReport;
use crate::commands::QualifyingCities;
use crate::commands::Task;
use crate::errors::CommandError;
use crate::progress::ProgressObserver;
use crate::subcommand_def;

fn write_command_help(target: PathBuf) -> Result<(),CommandError> {
    let mut target = File::create(target)?;
    write!(&mut target,"{}",help_markdown::<QualifyingCities>())?;
    Ok(())
}

fn write_schema<Schema: JsonSchema>(target: PathBuf) -> Result<(),CommandError> {
    let mut target = File::create(target)?;
    let schema = schema_for!(Schema);
    write!(&mut target,"{}",serde_json::to_string_pretty(&schema)?)?;
    Ok(())
}

subcommand_def!{
    /// Writes generatable documentation and json schemas to a folder.
    #[command(hide=true)]
    pub(crate) struct Docs {

        #[arg(long)]
        /// The folder to output the generated documentation to
        docs: PathBuf,

        #[arg(long)]
        /// The folder to output generated schemas to
        schemas: PathBuf

    }
}

impl Task for Docs {
    fn run<Progress: ProgressObserver>(self, progress: &mut Progress) -> Result<(),CommandError> {
        let command_help = self.docs.join("Commands.md");
        write_command_help(command_help)?;

        let report_schema = self.schemas.join("selection_report.schema.json");
        write_schema::<SelectionReport>(report_schema)?;

        progress.announce(|| format!("Documentation written to {} and {}.",self.docs.display(),self.schemas.display()));
        Ok(())
    }
}
