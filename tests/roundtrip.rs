//! Write-read roundtrip tests for the supported point formats and attributes.

use laspipe::{point::Format, Builder, Color, Point, Reader, Writer};
use std::io::Cursor;

fn base_point(format: u8) -> Point {
    let mut point = Point::default();
    if format >= 7 {
        point.color = Some(Color::default());
    }
    if format >= 8 {
        point.nir = Some(0);
    }
    point
}

fn roundtrip(builder: Builder, point: &Point) {
    let header = builder.into_header().unwrap();
    let mut writer = Writer::new(Cursor::new(Vec::new()), header).unwrap();
    writer.write_point(point.clone()).unwrap();
    let header = writer.header().clone();
    let mut reader = Reader::new(writer.into_inner().unwrap()).unwrap();
    assert_eq!(*point, reader.read_point().unwrap().unwrap());
    assert!(reader.read_point().unwrap().is_none());
    assert_eq!(header, *reader.header());
}

macro_rules! roundtrip_point {
    ($name:ident, $modify_point:expr) => {
        mod $name {
            use super::super::{base_point, roundtrip};
            #[allow(unused_imports)]
            use laspipe::{
                point::{Classification, Format, ScanDirection},
                Builder, Color, Point,
            };

            fn run(format: u8) {
                let mut builder = Builder::default();
                builder.point_format = Format::new(format).unwrap();
                let mut point = base_point(format);
                let modify: fn(&mut Point) = $modify_point;
                modify(&mut point);
                roundtrip(builder, &point);
            }

            #[test]
            fn format_6() {
                run(6);
            }

            #[test]
            fn format_7() {
                run(7);
            }

            #[test]
            fn format_8() {
                run(8);
            }
        }
    };
}

mod point {
    roundtrip_point!(xyz, |p| {
        p.x = 1.;
        p.y = 2.;
        p.z = 3.;
    });
    roundtrip_point!(negative_coordinates, |p| {
        p.x = -1.5;
        p.y = -2.25;
        p.z = -3.75;
    });
    roundtrip_point!(intensity, |p| p.intensity = 42);
    roundtrip_point!(returns, |p| {
        p.return_number = 2;
        p.number_of_returns = 3;
    });
    roundtrip_point!(scan_direction, |p| {
        p.scan_direction = ScanDirection::LeftToRight
    });
    roundtrip_point!(edge_of_flight_line, |p| p.is_edge_of_flight_line = true);
    roundtrip_point!(classification, |p| {
        p.classification = Classification::Ground
    });
    roundtrip_point!(classification_flags, |p| {
        p.is_synthetic = true;
        p.is_key_point = true;
        p.is_withheld = true;
        p.is_overlap = true;
    });
    roundtrip_point!(scanner_channel, |p| p.scanner_channel = 3);
    roundtrip_point!(scan_angle, |p| p.scan_angle = 500. * 0.006);
    roundtrip_point!(user_data, |p| p.user_data = 42);
    roundtrip_point!(point_source_id, |p| p.point_source_id = 42);
    roundtrip_point!(gps_time, |p| p.gps_time = 42.);
    roundtrip_point!(color, |p| {
        if p.color.is_some() {
            p.color = Some(Color::new(1, 2, 3));
        }
    });
    roundtrip_point!(nir, |p| {
        if p.nir.is_some() {
            p.nir = Some(42);
        }
    });
}

mod builder {
    use super::{base_point, roundtrip};
    use chrono::NaiveDate;
    use laspipe::{schema::DataType, Builder, Crs, Point, Transform, Vlr};
    use uuid::Uuid;

    fn roundtrip_builder(modify: fn(&mut Builder)) {
        let mut builder = Builder::default();
        modify(&mut builder);
        roundtrip(builder, &Point::default());
    }

    #[test]
    fn file_source_id() {
        roundtrip_builder(|b| b.file_source_id = 42);
    }

    #[test]
    fn guid() {
        roundtrip_builder(|b| b.guid = Uuid::from_bytes([42; 16]));
    }

    #[test]
    fn system_identifier() {
        roundtrip_builder(|b| b.system_identifier = "roundtrip test".to_string());
    }

    #[test]
    fn generating_software() {
        roundtrip_builder(|b| b.generating_software = "roundtrip test".to_string());
    }

    #[test]
    fn date() {
        roundtrip_builder(|b| b.date = NaiveDate::from_ymd_opt(2024, 10, 30));
    }

    #[test]
    fn transforms() {
        roundtrip_builder(|b| {
            let transform = Transform {
                scale: 0.1,
                offset: -1.,
            };
            b.transforms.x = transform;
            b.transforms.y = transform;
            b.transforms.z = transform;
        });
    }

    #[test]
    fn crs() {
        roundtrip_builder(|b| b.crs = Some(Crs::epsg(25832)));
    }

    #[test]
    fn vlrs() {
        roundtrip_builder(|b| {
            b.vlrs.push(Vlr {
                user_id: "roundtrip".to_string(),
                record_id: 42,
                description: "a vlr".to_string(),
                data: vec![1, 2, 3],
                is_extended: false,
            })
        });
    }

    #[test]
    fn evlrs() {
        roundtrip_builder(|b| {
            b.evlrs.push(Vlr {
                user_id: "roundtrip".to_string(),
                record_id: 42,
                description: "an evlr".to_string(),
                data: vec![42; usize::from(u16::MAX) + 1],
                is_extended: true,
            })
        });
    }

    #[test]
    fn padding() {
        roundtrip_builder(|b| b.padding = b"You probably shouldn't do this".to_vec());
    }

    #[test]
    fn vlr_padding() {
        roundtrip_builder(|b| b.vlr_padding = b"You shouldn't do this either".to_vec());
    }

    #[test]
    fn confidence_schema() {
        let mut builder = Builder::default();
        builder
            .schema
            .declare_with_description("confidence", DataType::U8, "Confidence levels")
            .unwrap();
        let header = builder.clone().into_header().unwrap();
        let mut point = base_point(6);
        header
            .schema()
            .set_value("confidence", &mut point, 42.)
            .unwrap();
        roundtrip(builder, &point);
    }
}

#[cfg(feature = "laz")]
mod compressed {
    use super::{base_point, roundtrip};
    use laspipe::{point::Format, schema::DataType, Builder, Color, Crs};

    fn compressed_builder(format: u8) -> Builder {
        let mut builder = Builder::default();
        builder.point_format = Format::new(format).unwrap();
        builder.point_format.is_compressed = true;
        builder
    }

    #[test]
    fn format_6() {
        let mut point = base_point(6);
        point.x = 1.;
        point.intensity = 42;
        roundtrip(compressed_builder(6), &point);
    }

    #[test]
    fn format_7() {
        let mut point = base_point(7);
        point.color = Some(Color::new(1, 2, 3));
        roundtrip(compressed_builder(7), &point);
    }

    #[test]
    fn format_8() {
        let mut point = base_point(8);
        point.color = Some(Color::new(1, 2, 3));
        point.nir = Some(42);
        roundtrip(compressed_builder(8), &point);
    }

    #[test]
    fn format_8_with_crs_and_confidence() {
        let mut builder = compressed_builder(8);
        builder.crs = Some(Crs::epsg(7416));
        builder.schema.declare("confidence", DataType::U8).unwrap();
        let header = builder.clone().into_header().unwrap();
        let mut point = base_point(8);
        header
            .schema()
            .set_value("confidence", &mut point, 255.)
            .unwrap();
        roundtrip(builder, &point);
    }

    #[test]
    fn many_points() {
        use laspipe::{Point, Reader, Writer};
        use std::io::Cursor;

        let header = compressed_builder(8).into_header().unwrap();
        let mut writer = Writer::new(Cursor::new(Vec::new()), header).unwrap();
        let points: Vec<Point> = (0..1000)
            .map(|i| {
                let mut point = base_point(8);
                point.x = f64::from(i) * 0.5;
                point.y = f64::from(i) * -0.25;
                point.z = f64::from(i % 100);
                point.intensity = u16::try_from(i).unwrap();
                point
            })
            .collect();
        writer.write_points(&points).unwrap();
        let mut reader = Reader::new(writer.into_inner().unwrap()).unwrap();
        let mut read_back = Vec::new();
        assert_eq!(1000, reader.read_all_points_into(&mut read_back).unwrap());
        assert_eq!(points, read_back);
    }
}
