use core::fmt::Display;
use core::fmt::Formatter;
use core::fmt::Result as FormatResult;

use gdal::vector::Feature;
use gdal::vector::FieldValue;

use crate::errors::CommandError;

#[derive(PartialEq,Eq,Hash,PartialOrd,Ord,Clone,Debug)]
pub(crate) struct IdRef(u64);

impl IdRef {

    pub(crate) const fn new(id: u64) -> Self {
        Self(id)
    }

    pub(crate) const fn to_inner(&self) -> u64 {
        self.0
    }

}

impl Display for IdRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        write!(f,"{}",self.0)
    }
}

/// Converts the raw value of a field into a typed value. Field names are only known at run-time, so unlike a fixed
/// schema the field is looked up by an index which was resolved when the layer was opened.
pub(crate) trait TypedField: Sized {

    fn get_required<FieldType>(value: Option<FieldType>, field_id: &str) -> Result<FieldType,CommandError> {
        value.ok_or_else(|| CommandError::MissingField(field_id.to_owned()))
    }

    fn from_field_value(value: Option<FieldValue>, field_id: &str) -> Result<Self,CommandError>;

    fn get_field(feature: &Feature, field_index: usize, field_id: &str) -> Result<Self,CommandError> {
        Self::from_field_value(feature.field(field_index)?, field_id)
    }

}

/// Text for scalar values, so that numeric codes can be used as text keys.
fn field_value_to_string(value: FieldValue) -> Option<String> {
    match value {
        FieldValue::StringValue(value) => Some(value),
        FieldValue::IntegerValue(value) => Some(value.to_string()),
        FieldValue::Integer64Value(value) => Some(value.to_string()),
        FieldValue::RealValue(value) => Some(value.to_string()),
        // lists and dates don't make any sense for what this program is reading.
        _ => None
    }
}

impl TypedField for String {

    fn from_field_value(value: Option<FieldValue>, field_id: &str) -> Result<Self,CommandError> {
        Self::get_required(value.and_then(field_value_to_string), field_id)
    }

}

impl TypedField for Option<String> {

    fn from_field_value(value: Option<FieldValue>, _: &str) -> Result<Self,CommandError> {
        Ok(value.and_then(field_value_to_string))
    }

}

const TRUE_STRINGS: [&str; 5] = ["1","true","yes","y","t"];
const FALSE_STRINGS: [&str; 6] = ["","0","false","no","n","f"];

// NaN and infinity aren't flags, even though they aren't zero.
fn real_flag(value: f64) -> Option<bool> {
    value.is_finite().then_some(value != 0.0)
}

impl TypedField for bool {

    // Anything that a person would write down as a flag is accepted. A null is false, as most data sources only mark
    // the records which have the flag.
    fn from_field_value(value: Option<FieldValue>, _: &str) -> Result<Self,CommandError> {
        match value {
            None => Ok(false),
            Some(FieldValue::IntegerValue(value)) => Ok(value != 0),
            Some(FieldValue::Integer64Value(value)) => Ok(value != 0),
            Some(FieldValue::RealValue(value)) => real_flag(value).ok_or_else(|| CommandError::InvalidValueForCapitalFlag(value.to_string())),
            Some(FieldValue::StringValue(value)) => {
                let flag = value.trim().to_lowercase();
                if TRUE_STRINGS.contains(&flag.as_str()) {
                    Ok(true)
                } else if FALSE_STRINGS.contains(&flag.as_str()) {
                    Ok(false)
                } else if let Some(flag) = flag.parse::<f64>().ok().and_then(real_flag) {
                    Ok(flag)
                } else {
                    Err(CommandError::InvalidValueForCapitalFlag(value))
                }
            },
            Some(value) => Err(CommandError::InvalidValueForCapitalFlag(format!("{:?}",value)))
        }
    }

}
