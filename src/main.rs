/*!
Qualifying Cities reads a layer of cities, picks the capital of each country along with the city of the opposite settlement type (coastal or inland) whose population is closest to the capital's, and writes those cities to a new layer. For instructions, see the Readme.
*/

#![warn(noop_method_call)]
#![warn(single_use_lifetimes)]
#![warn(unused_lifetimes)]
#![warn(trivial_numeric_casts)]
#![warn(unreachable_pub)]
#![warn(unused_crate_dependencies)]
#![warn(meta_variable_misuse)]
#![warn(unused_macro_rules)]
#![warn(unused_qualifications)]
#![warn(unused_results)] // It's easy to get around by adding a `_ = ` before the code.
#![warn(variant_size_differences)]

use clap::Parser;

pub(crate) mod errors;
pub(crate) mod commands;
pub(crate) mod typed_map;
pub(crate) mod city_map;
pub(crate) mod progress;
pub(crate) mod algorithms;
#[cfg(test)] mod test;

use errors::ProgramError;

use commands::QualifyingCities;
use commands::Task;
use progress::ConsoleProgressBar;

/**
Runs the program with arbitrary arguments. The first item in the arguments will be ignored. All output will be printed to Stdout or Stderr.
*/
fn run<Arg, Args>(args: &mut Args) -> Result<(),ProgramError>
where
    Arg: Clone + Into<std::ffi::OsString>,
    Args: Iterator<Item = Arg>
{
    let command = QualifyingCities::try_parse_from(args)?;
    let mut progress = ConsoleProgressBar::new(command.quiet);
    command.run(&mut progress)?;
    Ok(())
}

fn main() -> std::process::ExitCode {
    let mut args = std::env::args();
    // Returning a Result from main would print the error with Debug instead of Display.
    match run(&mut args) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}",err);
            std::process::ExitCode::FAILURE
        }
    }
}
