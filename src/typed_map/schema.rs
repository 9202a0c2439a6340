use core::fmt::Display;
use core::fmt::Formatter;
use core::fmt::Result as FormatResult;

use gdal::vector::field_type_to_name;
use gdal::vector::FieldDefn;
use gdal::vector::LayerAccess;
use gdal::vector::OGRFieldType;

use crate::errors::CommandError;

/// A copy of one attribute field definition, so a layer's attribute schema can be recreated in another dataset.
#[derive(Clone,Debug,PartialEq,Eq)]
pub(crate) struct FieldDefinition {
    pub(crate) name: String,
    pub(crate) field_type: OGRFieldType::Type,
    pub(crate) width: i32,
    pub(crate) precision: i32
}

impl FieldDefinition {

    #[cfg(test)] pub(crate) fn new(name: &str, field_type: OGRFieldType::Type) -> Self {
        Self {
            name: name.to_owned(),
            field_type,
            width: 0,
            precision: 0
        }
    }

    pub(crate) fn add_to_layer<Layer: LayerAccess>(&self, layer: &Layer) -> Result<(),CommandError> {
        let defn = FieldDefn::new(&self.name, self.field_type)?;
        // a width of 0 means unlimited, so it's fine to pass it on
        defn.set_width(self.width);
        defn.set_precision(self.precision);
        defn.add_to_layer(layer)?;
        Ok(())
    }

}

impl Display for FieldDefinition {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        write!(f,"{} ({})",self.name,field_type_to_name(self.field_type))
    }
}

/// The attribute fields of a layer in order, as they are in the layer definition.
pub(crate) fn read_field_definitions<Layer: LayerAccess>(layer: &Layer) -> Vec<FieldDefinition> {
    layer.defn().fields().map(|field| FieldDefinition {
        name: field.name(),
        field_type: field.field_type(),
        width: field.width(),
        precision: field.precision()
    }).collect()
}

/// Finds the index of a named field. This is done once, when a layer is opened, so a misspelled or missing field
/// is caught before any records are read.
pub(crate) fn resolve_field_index(layer_name: &str, fields: &[FieldDefinition], field_name: &str) -> Result<usize,CommandError> {
    fields.iter()
          .position(|field| field.name == field_name)
          // shapefiles and some other formats are not careful about case
          .or_else(|| fields.iter().position(|field| field.name.eq_ignore_ascii_case(field_name)))
          .ok_or_else(|| CommandError::MissingSourceField(layer_name.to_owned(), field_name.to_owned()))
}
