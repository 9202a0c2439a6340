use gdal::Dataset;
use gdal::spatial_ref::SpatialRef;
use gdal::vector::Feature;
use gdal::vector::Layer;
use gdal::vector::LayerAccess;
use gdal::vector::LayerOptions;
use gdal::vector::OGRwkbGeometryType;

use crate::city_map::city_layer::CityLayer;
use crate::city_map::city_layer::CitySchema;
use crate::errors::CommandError;
use crate::progress::ProgressObserver;
use crate::progress::WatchableIterator as _;
use crate::typed_map::fields::IdRef;

/// The output layer. It has the same geometry type and attribute fields as the layer the cities were read from, with
/// the fields in the same order, so values can be copied over by index.
pub(crate) struct QualifyingLayer<'layer> {
    layer: Layer<'layer>,
    field_count: usize
}

impl<'layer> QualifyingLayer<'layer> {

    pub(crate) fn create_from_dataset(dataset: &'layer mut Dataset, name: &str, source: &CitySchema, srs: Option<&SpatialRef>, overwrite: bool) -> Result<Self,CommandError> {

        // Without a source reference system, 4326 (WGS 84) is assumed.
        let default_srs;
        let srs = if let Some(srs) = srs {
            srs
        } else {
            default_srs = SpatialRef::from_epsg(4326)?;
            &default_srs
        };

        let layer = dataset.create_layer(LayerOptions {
            name,
            // a source without geometry still gets a point layer, so locations can be added later.
            ty: match source.geometry_type() {
                OGRwkbGeometryType::wkbNone => OGRwkbGeometryType::wkbPoint,
                geometry_type => geometry_type
            },
            srs: Some(srs),
            options: if overwrite {
                Some(&["OVERWRITE=YES"])
            } else {
                None
            }
        })?;
        for field in source.fields() {
            field.add_to_layer(&layer)?;
        }

        Ok(Self {
            layer,
            field_count: source.fields().len()
        })
    }

    /// Copies the geometry and the attribute values of a source feature into a new feature.
    pub(crate) fn add_city(&mut self, source: &Feature) -> Result<(),CommandError> {
        let mut feature = Feature::new(self.layer.defn())?;
        // a city without a location is still a city, it just won't show up on the map.
        if let Some(geometry) = source.geometry() {
            feature.set_geometry(geometry.clone())?;
        }
        for index in 0..self.field_count {
            if let Some(value) = source.field(index)? {
                feature.set_field(index, &value)?;
            } else {
                feature.set_field_null(index)?;
            }
        }
        feature.create(&self.layer)?;
        Ok(())
    }

    /// Copies the cities, in the order given. Returns the number of features written.
    pub(crate) fn add_cities<Progress: ProgressObserver>(&mut self, source: &CityLayer, fids: &[IdRef], progress: &mut Progress) -> Result<usize,CommandError> {
        let mut written = 0;
        for fid in fids.iter().watch(progress,"Writing qualifying cities.","Qualifying cities written.") {
            let city = source.try_feature_by_id(fid)?;
            self.add_city(&city)?;
            written += 1;
        }
        Ok(written)
    }

}
