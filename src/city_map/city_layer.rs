use gdal::Dataset;
use gdal::spatial_ref::SpatialRef;
use gdal::vector::Feature;
use gdal::vector::Layer;
use gdal::vector::LayerAccess;
use gdal::vector::OGRwkbGeometryType;

use crate::city_map::fields::Population;
use crate::city_map::fields::SettlementType;
use crate::commands::CityFieldsArg;
use crate::errors::CommandError;
use crate::progress::ProgressObserver;
use crate::typed_map::fields::IdRef;
use crate::typed_map::fields::TypedField;
use crate::typed_map::schema::FieldDefinition;
use crate::typed_map::schema::read_field_definitions;
use crate::typed_map::schema::resolve_field_index;

/// Indexes of the fields the selection needs, found once when the layer is opened.
pub(crate) struct CitySchema {
    layer_name: String,
    fields: Vec<FieldDefinition>,
    geometry_type: OGRwkbGeometryType::Type,
    country_field: (usize,String),
    capital_field: (usize,String),
    type_field: (usize,String),
    population_field: (usize,String),
    name_field: (usize,String)
}

impl CitySchema {

    pub(crate) fn new(layer_name: &str, fields: Vec<FieldDefinition>, geometry_type: OGRwkbGeometryType::Type, field_names: &CityFieldsArg) -> Result<Self,CommandError> {
        let resolve = |field_name: &str| -> Result<(usize,String),CommandError> {
            let index = resolve_field_index(layer_name, &fields, field_name)?;
            Ok((index,field_name.to_owned()))
        };
        let country_field = resolve(&field_names.country_field)?;
        let capital_field = resolve(&field_names.capital_field)?;
        let type_field = resolve(&field_names.type_field)?;
        let population_field = resolve(&field_names.population_field)?;
        let name_field = resolve(&field_names.name_field)?;
        Ok(Self {
            layer_name: layer_name.to_owned(),
            fields,
            geometry_type,
            country_field,
            capital_field,
            type_field,
            population_field,
            name_field
        })
    }

    pub(crate) fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub(crate) const fn geometry_type(&self) -> OGRwkbGeometryType::Type {
        self.geometry_type
    }

}

#[derive(Clone,Debug,PartialEq,Eq)]
pub(crate) struct CityRecord {
    pub(crate) fid: IdRef,
    pub(crate) country_code: String,
    pub(crate) name: String,
    pub(crate) is_capital: bool,
    pub(crate) settlement_type: SettlementType,
    /// None if the source value was null or couldn't be read as a number. Such a city is never picked as a match.
    pub(crate) population: Option<Population>
}

pub(crate) struct CityFeature<'data_life> {
    feature: Feature<'data_life>
}

impl<'impl_life> From<Feature<'impl_life>> for CityFeature<'impl_life> {

    fn from(feature: Feature<'impl_life>) -> Self {
        Self {
            feature
        }
    }
}

impl CityFeature<'_> {

    fn get<FieldType: TypedField>(&self, field: &(usize,String)) -> Result<FieldType,CommandError> {
        FieldType::get_field(&self.feature, field.0, &field.1)
    }

    pub(crate) fn fid(&self, schema: &CitySchema) -> Result<IdRef,CommandError> {
        Ok(IdRef::new(self.feature.fid().ok_or_else(|| CommandError::MissingFid(schema.layer_name.clone()))?))
    }

    pub(crate) fn country_code(&self, schema: &CitySchema) -> Result<Option<String>,CommandError> {
        Ok(self.get::<Option<String>>(&schema.country_field)?.map(|code| code.trim().to_owned()).filter(|code| !code.is_empty()))
    }

    pub(crate) fn name(&self, schema: &CitySchema) -> Result<String,CommandError> {
        Ok(self.get::<Option<String>>(&schema.name_field)?.unwrap_or_default())
    }

    pub(crate) fn is_capital(&self, schema: &CitySchema) -> Result<bool,CommandError> {
        self.get(&schema.capital_field)
    }

    pub(crate) fn settlement_type(&self, schema: &CitySchema) -> Result<SettlementType,CommandError> {
        self.get(&schema.type_field)
    }

    pub(crate) fn population(&self, schema: &CitySchema) -> Result<Population,CommandError> {
        self.get(&schema.population_field)
    }

    /// Reads the feature into a record. Returns None, with a warning, for a feature without a country code. A
    /// population that can't be used is also warned about, but the record is still returned.
    pub(crate) fn to_record<Progress: ProgressObserver>(&self, schema: &CitySchema, progress: &Progress) -> Result<Option<CityRecord>,CommandError> {
        let fid = self.fid(schema)?;
        let name = self.name(schema)?;

        let Some(country_code) = self.country_code(schema)? else {
            progress.warning(|| format!("City '{}' (fid {}) has no value for '{}' and will be ignored.",name,fid,schema.country_field.1));
            return Ok(None)
        };

        let population = match self.population(schema) {
            Ok(population) => Some(population),
            Err(CommandError::MissingField(_)) => {
                progress.warning(|| format!("City '{}' (fid {}) has no population and can't be matched.",name,fid));
                None
            },
            Err(CommandError::InvalidValueForPopulation(value)) => {
                progress.warning(|| format!("City '{}' (fid {}) has a population that isn't a number ('{}') and can't be matched.",name,fid,value));
                None
            },
            Err(err) => return Err(err)
        };

        Ok(Some(CityRecord {
            is_capital: self.is_capital(schema)?,
            settlement_type: self.settlement_type(schema)?,
            fid,
            country_code,
            name,
            population
        }))
    }

}

pub(crate) struct CityLayer<'layer> {
    layer: Layer<'layer>,
    schema: CitySchema
}

impl<'layer> CityLayer<'layer> {

    pub(crate) fn open_from_dataset(dataset: &'layer Dataset, layer_name: &str, field_names: &CityFieldsArg) -> Result<Self,CommandError> {
        let layer = dataset.layer_by_name(layer_name)?;
        let schema = CitySchema::new(layer_name, read_field_definitions(&layer), layer.defn().geometry_type(), field_names)?;
        Ok(Self {
            layer,
            schema
        })
    }

    pub(crate) const fn schema(&self) -> &CitySchema {
        &self.schema
    }

    pub(crate) fn spatial_ref(&self) -> Option<SpatialRef> {
        self.layer.spatial_ref()
    }

    pub(crate) fn feature_count(&self) -> usize {
        self.layer.feature_count() as usize
    }

    pub(crate) fn try_feature_by_id(&self, fid: &IdRef) -> Result<Feature<'_>,CommandError> {
        self.layer.feature(fid.to_inner()).ok_or_else(|| CommandError::MissingFeature(self.schema.layer_name.clone(),fid.clone()))
    }

    /// Reads every feature in the layer, in the order the layer returns them.
    pub(crate) fn read_cities<Progress: ProgressObserver>(&mut self, progress: &mut Progress) -> Result<Vec<CityRecord>,CommandError> {
        let mut result = Vec::new();
        let count = self.feature_count();
        progress.start_known_endpoint(|| (format!("Reading {}.",self.schema.layer_name),count));
        for (i,feature) in self.layer.features().enumerate() {
            if let Some(record) = CityFeature::from(feature).to_record(&self.schema, &*progress)? {
                result.push(record)
            }
            progress.update(|| i);
        }
        progress.finish(|| format!("{} cities read.",result.len()));
        Ok(result)
    }

}
