//! End-to-end scenarios for the read → colorize → reproject → write pipeline.

use laspipe::{
    colorize, point::Format, reproject, BandMapping, Builder, Color, Crs, GeoTransform, Point,
    PointCloud, Raster, Schema,
};
use std::io::Cursor;

fn format_8_builder() -> Builder {
    let mut builder = Builder::default();
    builder.point_format = Format::new(8).unwrap();
    builder
}

fn format_8_point(x: f64, y: f64, z: f64) -> Point {
    Point {
        x,
        y,
        z,
        color: Some(Color::default()),
        nir: Some(0),
        ..Default::default()
    }
}

/// A 10m x 10m raster anchored at (0, 10), one meter pixels, north-up, with
/// constant bands red=10, green=20, blue=30, infrared=40.
fn rgbn_raster() -> Raster {
    Raster::constant(
        10,
        10,
        GeoTransform::new(0., 10., 1., -1.),
        &[10., 20., 30., 40.],
    )
    .unwrap()
}

#[test]
fn quantization_error_is_bounded_by_half_scale() {
    let cloud_points = [(0., 0., 0.), (5., 5., 2.), (9.99, 9.99, 4.99)];
    let mut cloud = PointCloud::new(format_8_builder().into_header().unwrap());
    for &(x, y, z) in &cloud_points {
        cloud.append(format_8_point(x, y, z)).unwrap();
    }
    assert_eq!(0.01, cloud.header().transforms().x.scale);

    let cursor = cloud.write_to(Cursor::new(Vec::new())).unwrap();
    let read_back = PointCloud::read_from(cursor).unwrap();

    assert_eq!(3, read_back.len());
    for (&(x, y, z), point) in cloud_points.iter().zip(read_back.points()) {
        assert!((point.x - x).abs() <= 0.005, "x: {x} -> {}", point.x);
        assert!((point.y - y).abs() <= 0.005, "y: {y} -> {}", point.y);
        assert!((point.z - z).abs() <= 0.005, "z: {z} -> {}", point.z);
    }
}

#[test]
fn constant_raster_sets_exact_channel_values() {
    let mut cloud = PointCloud::new(format_8_builder().into_header().unwrap());
    cloud.append(format_8_point(5., 5., 1.)).unwrap();
    cloud.append(format_8_point(0.5, 9.5, 1.)).unwrap();

    let outcome = colorize(&mut cloud, &rgbn_raster(), &BandMapping::rgb_nir()).unwrap();
    assert_eq!(2, outcome.sampled);
    assert_eq!(0, outcome.out_of_bounds);
    for point in cloud.points() {
        assert_eq!(Some(Color::new(10, 20, 30)), point.color);
        assert_eq!(Some(40), point.nir);
    }
}

#[test]
fn out_of_bounds_point_is_counted_and_untouched() {
    let mut cloud = PointCloud::new(format_8_builder().into_header().unwrap());
    let mut outside = format_8_point(-5., 5., 1.);
    outside.color = Some(Color::new(1, 2, 3));
    outside.nir = Some(4);
    cloud.append(outside.clone()).unwrap();
    cloud.append(format_8_point(5., 5., 1.)).unwrap();

    let outcome = colorize(&mut cloud, &rgbn_raster(), &BandMapping::rgb_nir()).unwrap();
    assert_eq!(1, outcome.out_of_bounds);
    assert_eq!(1, outcome.sampled);

    // The outside record keeps whatever it had.
    assert_eq!(Some(Color::new(1, 2, 3)), cloud.points()[0].color);
    assert_eq!(Some(4), cloud.points()[0].nir);
    // The inside record is assigned.
    assert_eq!(Some(Color::new(10, 20, 30)), cloud.points()[1].color);
    assert_eq!(Some(40), cloud.points()[1].nir);
}

#[test]
fn colorization_is_deterministic() {
    let mut first = PointCloud::new(format_8_builder().into_header().unwrap());
    first.append(format_8_point(3.25, 7.75, 0.)).unwrap();
    let mut second = first.clone();

    let raster = rgbn_raster();
    let mappings = BandMapping::rgb_nir();
    colorize(&mut first, &raster, &mappings).unwrap();
    colorize(&mut second, &raster, &mappings).unwrap();
    assert_eq!(first.points(), second.points());

    // A second pass over already colorized points changes nothing either.
    let again = first.clone();
    colorize(&mut first, &raster, &mappings).unwrap();
    assert_eq!(again.points(), first.points());
}

#[test]
fn reprojecting_an_empty_cloud_updates_only_the_crs() {
    let mut builder = format_8_builder();
    builder.crs = Some(Crs::epsg(25832));
    let mut cloud = PointCloud::new(builder.into_header().unwrap());

    reproject(&mut cloud, &Crs::epsg(7416)).unwrap();

    assert!(cloud.is_empty());
    assert_eq!(Some(&Crs::epsg(7416)), cloud.header().crs());
}

#[test]
fn reprojecting_onto_the_same_crs_is_a_noop() {
    let mut builder = format_8_builder();
    builder.crs = Some(Crs::epsg(25832));
    let mut cloud = PointCloud::new(builder.into_header().unwrap());
    cloud
        .append(format_8_point(500000.123, 6200000.456, 42.789))
        .unwrap();
    let before = cloud.clone();

    reproject(&mut cloud, &Crs::epsg(25832)).unwrap();

    assert_eq!(before, cloud);
}

#[test]
fn appending_an_undeclared_auxiliary_field_fails() {
    let mut cloud = PointCloud::new(format_8_builder().into_header().unwrap());
    let mut point = format_8_point(0., 0., 0.);
    point.extra_bytes = vec![42];
    assert!(matches!(
        cloud.append(point),
        Err(laspipe::Error::UndeclaredField(_))
    ));
    assert!(cloud.is_empty());
}

#[test]
fn bulk_export_contract() {
    let mut builder = format_8_builder();
    builder
        .schema
        .declare_with_description("confidence", laspipe::schema::DataType::U8, "Confidence levels")
        .unwrap();
    let header = builder.into_header().unwrap();
    let schema = header.schema().clone();
    let mut cloud = PointCloud::new(header);
    let mut point = format_8_point(1., 2., 3.);
    point.color = Some(Color::new(10, 20, 30));
    point.nir = Some(40);
    point.classification = laspipe::point::Classification::Building;
    schema.set_value("confidence", &mut point, 7.).unwrap();
    cloud.append(point).unwrap();

    let data = cloud.to_data();
    assert_eq!(vec![(1., 2., 3.)], data.points);
    assert_eq!(vec![(10, 20, 30)], data.rgb);
    assert_eq!(vec![40], data.infrared);
    assert_eq!(vec![6], data.classification);
    assert_eq!(Some(vec![7]), data.confidence);
}

#[test]
fn bulk_export_without_optional_channels() {
    let mut builder = Builder::default();
    builder.point_format = Format::new(6).unwrap();
    let mut cloud = PointCloud::new(builder.into_header().unwrap());
    cloud.append(Point::default()).unwrap();

    let data = cloud.to_data();
    assert_eq!(1, data.points.len());
    assert!(data.rgb.is_empty());
    assert!(data.infrared.is_empty());
    assert!(data.confidence.is_none());
}

#[test]
fn failed_reprojection_leaves_the_cloud_untouched() {
    let mut builder = format_8_builder();
    builder.crs = Some(Crs::epsg(25832));
    let mut cloud = PointCloud::new(builder.into_header().unwrap());
    cloud.append(format_8_point(5., 5., 1.)).unwrap();
    let before = cloud.clone();

    // EPSG:2193 is not in the built-in definition table.
    assert!(reproject(&mut cloud, &Crs::epsg(2193)).is_err());
    assert_eq!(before, cloud);
}

#[cfg(feature = "laz")]
#[test]
fn colorize_reproject_write_read() {
    let mut builder = format_8_builder();
    builder.point_format.is_compressed = true;
    builder.crs = Some(Crs::epsg(25832));
    let mut schema = Schema::default();
    schema
        .declare_with_description("confidence", laspipe::schema::DataType::U8, "Confidence levels")
        .unwrap();
    builder.schema = schema;
    let header = builder.into_header().unwrap();
    let schema = header.schema().clone();
    let mut cloud = PointCloud::new(header);

    // A 100m x 100m orthophoto over the utm coordinates of the points.
    let raster = Raster::constant(
        100,
        100,
        GeoTransform::new(499950., 6200050., 1., -1.),
        &[10., 20., 30., 40.],
    )
    .unwrap()
    .with_crs(Crs::epsg(25832));

    for i in 0..10 {
        let mut point = format_8_point(
            499950.5 + f64::from(i) * 10.,
            6200049.5 - f64::from(i) * 10.,
            f64::from(i),
        );
        schema
            .set_value("confidence", &mut point, f64::from(i * 20))
            .unwrap();
        cloud.append(point).unwrap();
    }

    let outcome = colorize(&mut cloud, &raster, &BandMapping::rgb_nir()).unwrap();
    assert_eq!(10, outcome.sampled);
    assert_eq!(0, outcome.out_of_bounds);

    reproject(&mut cloud, &Crs::epsg(7416)).unwrap();
    assert_eq!(Some(&Crs::epsg(7416)), cloud.header().crs());

    let cursor = cloud.write_to(Cursor::new(Vec::new())).unwrap();
    let read_back = PointCloud::read_from(cursor).unwrap();

    assert_eq!(Some(&Crs::epsg(7416)), read_back.header().crs());
    assert!(read_back.header().point_format().is_compressed);
    assert!(read_back.header().schema().contains("confidence"));
    assert_eq!(10, read_back.len());
    for (original, read) in cloud.points().iter().zip(read_back.points()) {
        assert!((original.x - read.x).abs() <= 0.005);
        assert!((original.y - read.y).abs() <= 0.005);
        assert!((original.z - read.z).abs() <= 0.005);
        assert_eq!(Some(Color::new(10, 20, 30)), read.color);
        assert_eq!(Some(40), read.nir);
        assert_eq!(original.extra_bytes, read.extra_bytes);
    }

    let data = read_back.to_data();
    assert_eq!(
        Some(vec![0, 20, 40, 60, 80, 100, 120, 140, 160, 180]),
        data.confidence
    );
}
