use std::error::Error;
use core::fmt::Display;
use std::io::Error as IOError;

pub(crate) use gdal::errors::GdalError;
use serde_json::Error as JSONError;

pub(crate) use clap::error::Error as ArgumentError;

use crate::typed_map::fields::IdRef;

#[derive(Debug)]
pub(crate) enum CommandError {
    GdalError(GdalError),
    IOError(IOError),
    ReportWrite(String),
    MissingSourceField(String,String),
    MissingField(String),
    MissingFid(String),
    MissingFeature(String,IdRef),
    InvalidValueForSettlementType(String),
    InvalidValueForCapitalFlag(String),
    InvalidValueForPopulation(String),
}

impl Error for CommandError {

}

impl Display for CommandError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GdalError(a) => write!(f,"gdal: {}",a),
            Self::IOError(a) => write!(f,"io: {}",a),
            Self::ReportWrite(a) => write!(f,"Error writing selection report: {}",a),
            Self::MissingSourceField(layer, field) => write!(f,"Layer '{}' has no field named '{}'. Check the field options.",layer,field),
            Self::MissingField(a) => write!(f,"While loading data, a record had no value for '{}'",a),
            Self::MissingFid(layer) => write!(f,"While loading data, a record in layer '{}' had no feature id",layer),
            Self::MissingFeature(layer, id) => write!(f,"While loading data, layer '{}' had no feature id '{}'",layer,id),
            Self::InvalidValueForSettlementType(a) => write!(f,"Invalid value ('{}') for settlement type field, expected 'coast', 'coastal' or 'inland'.",a),
            Self::InvalidValueForCapitalFlag(a) => write!(f,"Invalid value ('{}') for capital field.",a),
            Self::InvalidValueForPopulation(a) => write!(f,"Invalid value ('{}') for population field.",a),
        }
    }
}

impl From<GdalError> for CommandError {

    fn from(value: GdalError) -> Self {
        Self::GdalError(value)
    }
}

impl From<IOError> for CommandError {

    fn from(value: IOError) -> Self {
        Self::IOError(value)
    }
}

impl From<JSONError> for CommandError {

    fn from(value: JSONError) -> Self {
        Self::ReportWrite(format!("{}",value))
    }
}

#[derive(Debug)]
pub(crate) enum ProgramError {
    ArgumentError(ArgumentError),
    CommandError(CommandError)
}

impl Error for ProgramError {

}

impl Display for ProgramError {

    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ArgumentError(a) => write!(f,"{}",a),
            Self::CommandError(a) => write!(f,"{}",a),
        }
    }
}

impl From<ArgumentError> for ProgramError {

    fn from(value: ArgumentError) -> Self {
        Self::ArgumentError(value)
    }
}

impl From<CommandError> for ProgramError {

    fn from(value: CommandError) -> Self {
        Self::CommandError(value)
    }
}
