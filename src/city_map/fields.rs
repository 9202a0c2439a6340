use core::fmt::Display;
use core::fmt::Formatter;
use core::fmt::Result as FormatResult;
use core::str::FromStr;

use gdal::vector::FieldValue;
use schemars::JsonSchema;
use serde::Serialize;

use crate::errors::CommandError;
use crate::typed_map::fields::TypedField;

#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash,Serialize,JsonSchema)]
#[serde(rename_all = "lowercase")]
/// Whether a city lies on the coast or inland.
pub(crate) enum SettlementType {
    Coastal,
    Inland
}

impl SettlementType {

    pub(crate) const fn opposite(self) -> Self {
        match self {
            Self::Coastal => Self::Inland,
            Self::Inland => Self::Coastal,
        }
    }

}

impl FromStr for SettlementType {
    type Err = CommandError;

    // No fallback: any other value is an error.
    fn from_str(source: &str) -> Result<Self, Self::Err> {
        match source.trim().to_lowercase().as_str() {
            "coast" | "coastal" => Ok(Self::Coastal),
            "inland" => Ok(Self::Inland),
            _ => Err(CommandError::InvalidValueForSettlementType(source.to_owned()))
        }
    }
}

impl Display for SettlementType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        match self {
            Self::Coastal => write!(f,"coastal"),
            Self::Inland => write!(f,"inland"),
        }
    }
}

impl TypedField for SettlementType {

    fn from_field_value(value: Option<FieldValue>, field_id: &str) -> Result<Self,CommandError> {
        String::from_field_value(value, field_id)?.parse()
    }

}


// Characters people put between groups of digits. A '.' is not included, since it's a decimal point in at least half
// of the data out there.
const THOUSANDS_SEPARATORS: [char; 5] = [',', '_', '\'', ' ', '\u{a0}'];

#[derive(Clone,Copy,Debug,PartialEq,Eq,PartialOrd,Ord,Hash)]
pub(crate) struct Population(i64);

impl Population {

    #[cfg(test)] pub(crate) const fn new(population: i64) -> Self {
        Self(population)
    }

    pub(crate) const fn to_inner(self) -> i64 {
        self.0
    }

    pub(crate) const fn difference(self, other: Self) -> u64 {
        self.0.abs_diff(other.0)
    }

}

impl FromStr for Population {
    type Err = CommandError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let digits: String = source.trim().chars().filter(|c| !THOUSANDS_SEPARATORS.contains(c)).collect();
        digits.parse().map(Self).map_err(|_| CommandError::InvalidValueForPopulation(source.to_owned()))
    }
}

impl Display for Population {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        write!(f,"{}",self.0)
    }
}

// anything bigger than this can't be stored in an i64
const LARGEST_REAL_POPULATION: f64 = 9.0e18;

impl TypedField for Population {

    fn from_field_value(value: Option<FieldValue>, field_id: &str) -> Result<Self,CommandError> {
        match Self::get_required(value, field_id)? {
            FieldValue::IntegerValue(value) => Ok(Self(value.into())),
            FieldValue::Integer64Value(value) => Ok(Self(value)),
            FieldValue::RealValue(value) => if value.is_finite() && value.abs() < LARGEST_REAL_POPULATION {
                // the range was checked above, so this can't truncate.
                Ok(Self(value.round() as i64))
            } else {
                Err(CommandError::InvalidValueForPopulation(value.to_string()))
            },
            FieldValue::StringValue(value) => value.parse(),
            value => Err(CommandError::InvalidValueForPopulation(format!("{:?}",value)))
        }
    }

}

#[cfg(test)]
mod test {

    use gdal::vector::FieldValue;

    use super::Population;
    use super::SettlementType;
    use crate::errors::CommandError;
    use crate::typed_map::fields::TypedField;

    #[test]
    fn test_population_separators() {
        let plain = Population::from_field_value(Some(FieldValue::IntegerValue(1_234_567)), "pop").unwrap();
        for text in ["1,234,567","1234567"," 1 234 567 ","1_234_567","1'234'567","1\u{a0}234\u{a0}567"] {
            assert_eq!(Population::from_field_value(Some(FieldValue::StringValue(text.to_owned())), "pop").unwrap(),plain,"For '{text}'");
        }
    }

    #[test]
    fn test_population_numeric_values() {
        assert_eq!(Population::from_field_value(Some(FieldValue::Integer64Value(8_000_000_000)), "pop").unwrap(),Population::new(8_000_000_000));
        assert_eq!(Population::from_field_value(Some(FieldValue::RealValue(480_000.4)), "pop").unwrap(),Population::new(480_000));
        assert!(Population::from_field_value(Some(FieldValue::RealValue(f64::NAN)), "pop").is_err());
    }

    #[test]
    fn test_population_malformed() {
        for text in ["","about 5000","1.234.567","12k"] {
            match Population::from_field_value(Some(FieldValue::StringValue(text.to_owned())), "pop") {
                Err(CommandError::InvalidValueForPopulation(value)) => assert_eq!(value,text),
                _ => panic!("'{text}' should not be accepted as a population")
            }
        }
        match Population::from_field_value(None, "pop") {
            Err(CommandError::MissingField(field)) => assert_eq!(field,"pop"),
            _ => panic!("null population should be missing")
        }
    }

    #[test]
    fn test_population_difference() {
        assert_eq!(Population::new(500_000).difference(Population::new(480_000)),20_000);
        assert_eq!(Population::new(480_000).difference(Population::new(500_000)),20_000);
        assert_eq!(Population::new(i64::MIN).difference(Population::new(i64::MAX)),u64::MAX);
    }

    #[test]
    fn test_settlement_types() {
        assert_eq!("coast".parse::<SettlementType>().unwrap(),SettlementType::Coastal);
        assert_eq!(" Coastal".parse::<SettlementType>().unwrap(),SettlementType::Coastal);
        assert_eq!("INLAND".parse::<SettlementType>().unwrap(),SettlementType::Inland);
        assert_eq!(SettlementType::Coastal.opposite(),SettlementType::Inland);
        assert_eq!(SettlementType::Inland.opposite(),SettlementType::Coastal);
    }

    #[test]
    fn test_unknown_settlement_type_fails() {
        match "riverside".parse::<SettlementType>() {
            Err(CommandError::InvalidValueForSettlementType(value)) => assert_eq!(value,"riverside"),
            _ => panic!("'riverside' is not a settlement type")
        }
        assert!(SettlementType::from_field_value(None, "type").is_err());
    }

}
