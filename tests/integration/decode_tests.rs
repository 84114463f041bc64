//! End-to-end decoding tests over synthetic MRW files.

use mrw_meta::{
    describe_key, parse, ByteOrder, CameraSettingsKind, ColorMode, MrwError, MrwParser, Region,
    TagValue,
};

use super::test_utils::{
    layout, prd_payload, rif_payload, sample_mrw, sample_tiff, ByteOrderType, EntryValue,
    IfdEntry, MrwBuilder, TiffImage, DOUBLE, SHORT, UNKNOWN_ROOT_TAG,
};

// =============================================================================
// Full File
// =============================================================================

#[test]
fn test_full_file_blocks() {
    let metadata = parse(&sample_mrw(ByteOrderType::BigEndian)).unwrap();

    assert_eq!(metadata.camera(), Some("Dynax/Maxxum 7D"));

    let prd = metadata.prd.as_ref().unwrap();
    assert_eq!(prd.sensor_height, 2008);
    assert_eq!(prd.sensor_width, 3016);
    assert_eq!(prd.image_width, 3008);
    assert!(prd.is_packed());

    let wbg = metadata.wbg.unwrap();
    assert_eq!(wbg.coefficients, [450, 256, 256, 380]);

    let rif = metadata.rif.as_ref().unwrap();
    assert_eq!(rif.saturation, Some(1));
    assert_eq!(rif.color_mode, Some(ColorMode::NormalColor));
    assert_eq!(rif.wb_temperature, Some(5200));

    let tiff = metadata.tiff.unwrap();
    assert_eq!(tiff.byte_order, ByteOrder::BigEndian);
    // MRM header, PRD block, TTW header
    assert_eq!(tiff.base, 8 + (8 + 24) + 8);

    assert!(
        metadata.diagnostics.is_clean(),
        "unexpected warnings: {:?}",
        metadata.diagnostics
    );
}

#[test]
fn test_full_file_root_and_exif_fields() {
    let metadata = parse(&sample_mrw(ByteOrderType::BigEndian)).unwrap();
    let exif = &metadata.exif;

    assert_eq!(
        exif.get("Exif.Image.Make"),
        Some(&TagValue::Ascii("MINOLTA".to_string()))
    );
    assert_eq!(
        exif.get("Exif.Image.Model"),
        Some(&TagValue::Ascii("DYNAX 7D".to_string()))
    );
    assert_eq!(
        exif.get("Exif.Image.Orientation"),
        Some(&TagValue::UnsignedShort(vec![1]))
    );
    assert_eq!(
        exif.get("Exif.Image.XResolution"),
        Some(&TagValue::UnsignedRational(vec![(72, 1)]))
    );
    assert_eq!(
        exif.get("Exif.Photo.ExposureTime").map(ToString::to_string),
        Some("1/125".to_string())
    );
    assert_eq!(
        exif.get("Exif.Photo.ExposureBiasValue"),
        Some(&TagValue::SignedRational(vec![(-1, 3)]))
    );
    assert_eq!(
        exif.get("Exif.Photo.ISOSpeedRatings"),
        Some(&TagValue::UnsignedShort(vec![100]))
    );
    assert_eq!(
        exif.get("Exif.Photo.UserComment"),
        Some(&TagValue::Comment("hello".to_string()))
    );
    assert_eq!(
        exif.get("Exif.Minolta.Version"),
        Some(&TagValue::Undefined(b"MLT0".to_vec()))
    );
    assert_eq!(
        exif.get("Exif.Minolta.LensID"),
        Some(&TagValue::UnsignedLong(vec![25]))
    );
}

#[test]
fn test_full_file_pass_order() {
    let metadata = parse(&sample_mrw(ByteOrderType::BigEndian)).unwrap();
    let keys: Vec<&str> = metadata.exif.iter().map(|e| e.key.as_str()).collect();

    let group_rank = |key: &str| match key.split('.').nth(1) {
        Some("Image") => 0,
        Some("Photo") => 1,
        Some("Minolta") => 2,
        Some("MinoltaCsOld") => 3,
        Some("MinoltaCsNew") => 4,
        Some("MinoltaCs7D") => 5,
        Some("MinoltaCs5D") => 6,
        other => panic!("unexpected group {:?}", other),
    };

    let ranks: Vec<_> = keys.iter().map(|k| group_rank(k)).collect();
    assert!(
        ranks.windows(2).all(|w| w[0] <= w[1]),
        "passes out of order: {:?}",
        keys
    );
    assert_eq!(keys.first(), Some(&"Exif.Image.Make"));
}

#[test]
fn test_full_file_pointers() {
    let metadata = parse(&sample_mrw(ByteOrderType::BigEndian)).unwrap();
    let pointers = metadata.pointers;

    assert_eq!(pointers.exif_ifd, Some(layout::EXIF_IFD as u64));
    assert_eq!(pointers.maker_note, Some(layout::MAKER_NOTE as u64));
    assert_eq!(
        pointers.camera_settings(CameraSettingsKind::SevenD),
        Some(Region {
            offset: layout::CS_7D as u64,
            size: 256
        })
    );
    assert_eq!(
        pointers.camera_settings(CameraSettingsKind::FiveD),
        Some(Region {
            offset: layout::CS_5D as u64,
            size: 384
        })
    );
    assert_eq!(pointers.camera_settings(CameraSettingsKind::Old), None);
    assert_eq!(pointers.print_im, None);
    assert_eq!(pointers.maker_note_print_im, None);
}

#[test]
fn test_print_im_regions_from_both_directories() {
    let mut image = TiffImage::new(ByteOrderType::BigEndian, 8);
    image.put_ifd(
        8,
        &[
            IfdEntry::new(0x8769, 4, 1, EntryValue::Offset(40)),
            IfdEntry::new(0xC4A5, 7, 16, EntryValue::Offset(120)),
        ],
        0,
    );
    image.put_ifd(40, &[IfdEntry::new(0x927C, 7, 32, EntryValue::Offset(80))], 0);
    image.put_ifd(80, &[IfdEntry::new(0x0E00, 7, 24, EntryValue::Offset(140))], 0);
    image.put_bytes(120, b"PrintIM\0root....");
    image.put_bytes(140, b"PrintIM\0maker note......");

    let file = MrwBuilder::new().with_ttw(&image.build()).build();
    let pointers = parse(&file).unwrap().pointers;

    assert_eq!(
        pointers.print_im,
        Some(Region {
            offset: 120,
            size: 16
        })
    );
    assert_eq!(
        pointers.maker_note_print_im,
        Some(Region {
            offset: 140,
            size: 24
        })
    );
}

// =============================================================================
// Camera Settings
// =============================================================================

#[test]
fn test_std_table_uses_new_namespace() {
    let metadata = parse(&sample_mrw(ByteOrderType::BigEndian)).unwrap();

    assert_eq!(
        metadata.exif.get("Exif.MinoltaCsNew.ISO"),
        Some(&TagValue::UnsignedLong(vec![0x30]))
    );
    assert_eq!(
        metadata.exif.get("Exif.MinoltaCsNew.ExposureMode"),
        Some(&TagValue::UnsignedLong(vec![1]))
    );
    assert!(!metadata.exif.iter().any(|e| e.key.starts_with("Exif.MinoltaCsOld.")));
}

#[test]
fn test_old_pointer_uses_old_namespace() {
    let mut image = TiffImage::new(ByteOrderType::BigEndian, 8);
    image.put_ifd(8, &[IfdEntry::new(0x8769, 4, 1, EntryValue::Offset(40))], 0);
    image.put_ifd(40, &[IfdEntry::new(0x927C, 7, 32, EntryValue::Offset(80))], 0);
    image.put_ifd(80, &[IfdEntry::new(0x0001, 4, 16, EntryValue::Offset(120))], 0);
    image.put_u32(120 + 4 * 0x08, 0x38);
    image.put_u32(120 + 4 * 0x0F, 0);

    let file = MrwBuilder::new().with_ttw(&image.build()).build();
    let metadata = parse(&file).unwrap();

    assert_eq!(
        metadata.exif.get("Exif.MinoltaCsOld.ISO"),
        Some(&TagValue::UnsignedLong(vec![0x38]))
    );
    assert!(!metadata.exif.iter().any(|e| e.key.starts_with("Exif.MinoltaCsNew.")));
}

#[test]
fn test_signed_color_temperature() {
    let metadata = parse(&sample_mrw(ByteOrderType::BigEndian)).unwrap();

    assert_eq!(
        metadata.exif.get("Exif.MinoltaCs7D.ColorTemperature"),
        Some(&TagValue::SignedShort(vec![-2]))
    );
    assert_eq!(
        metadata.exif.get("Exif.MinoltaCs5D.ColorTemperature"),
        Some(&TagValue::SignedShort(vec![-1]))
    );
    assert_eq!(
        metadata.exif.get("Exif.MinoltaCs7D.ISO"),
        Some(&TagValue::UnsignedShort(vec![100]))
    );
}

#[test]
fn test_camera_settings_descriptions() {
    let metadata = parse(&sample_mrw(ByteOrderType::BigEndian)).unwrap();

    let describe = |key: &str| {
        let value = metadata.exif.get(key).unwrap();
        describe_key(key, value)
    };

    assert_eq!(
        describe("Exif.MinoltaCs7D.ExposureMode"),
        Some("(A) Aperture Priority")
    );
    assert_eq!(describe("Exif.MinoltaCs7D.CameraOrientation"), Some("ClockWise"));
    assert_eq!(
        describe("Exif.MinoltaCs5D.ExposureMode"),
        Some("(?) connected copying")
    );
    assert_eq!(
        describe("Exif.MinoltaCs5D.CameraOrientation"),
        Some("CounterClockWise")
    );
}

#[test]
fn test_camera_settings_past_block_end() {
    // 7D table claims 128 values but only 8 bytes remain in the block
    let mut image = TiffImage::new(ByteOrderType::BigEndian, 8);
    image.put_ifd(8, &[IfdEntry::new(0x8769, 4, 1, EntryValue::Offset(40))], 0);
    image.put_ifd(40, &[IfdEntry::new(0x927C, 7, 32, EntryValue::Offset(80))], 0);
    image.put_ifd(80, &[IfdEntry::new(0x0004, SHORT, 0x80, EntryValue::Offset(120))], 0);
    image.put_u16(120, 3);
    image.put_u16(126, 0);

    let file = MrwBuilder::new().with_ttw(&image.build()).build();
    let metadata = parse(&file).unwrap();

    assert_eq!(
        metadata.exif.get("Exif.MinoltaCs7D.ExposureMode"),
        Some(&TagValue::UnsignedShort(vec![3]))
    );
    assert!(metadata.diagnostics.mentions("MinoltaCs7D table ends at position"));
}

#[test]
fn test_camera_settings_huge_count_finishes() {
    // 5D table declared as DOUBLE x 0xFFFFFFFF over 384 real bytes
    let mut image = TiffImage::new(ByteOrderType::BigEndian, 8);
    image.put_ifd(8, &[IfdEntry::new(0x8769, 4, 1, EntryValue::Offset(40))], 0);
    image.put_ifd(40, &[IfdEntry::new(0x927C, 7, 32, EntryValue::Offset(80))], 0);
    image.put_ifd(
        80,
        &[IfdEntry::new(0x0114, DOUBLE, u32::MAX, EntryValue::Offset(120))],
        0,
    );
    image.put_u16(120 + 2 * 0x50, 72);
    image.put_u16(120 + 2 * 0xBF, 0);

    let file = MrwBuilder::new().with_ttw(&image.build()).build();
    let started = std::time::Instant::now();
    let metadata = parse(&file).unwrap();
    assert!(started.elapsed() < std::time::Duration::from_secs(5));

    assert_eq!(
        metadata.exif.get("Exif.MinoltaCs5D.CameraOrientation"),
        Some(&TagValue::UnsignedShort(vec![72]))
    );
    assert!(metadata.exif.contains_key("Exif.MinoltaCs5D.AntiShake"));
    assert!(metadata.diagnostics.mentions("MinoltaCs5D table ends at position 192"));
}

// =============================================================================
// Byte Order
// =============================================================================

#[test]
fn test_little_endian_equivalence() {
    let big = parse(&sample_mrw(ByteOrderType::BigEndian)).unwrap();
    let little = parse(&sample_mrw(ByteOrderType::LittleEndian)).unwrap();

    assert_eq!(little.tiff.unwrap().byte_order, ByteOrder::LittleEndian);
    assert_eq!(big.exif, little.exif);
    assert_eq!(big.pointers, little.pointers);
    assert!(little.diagnostics.is_clean());
}

#[test]
fn test_bad_magic_is_warning() {
    let mut tiff = sample_tiff(ByteOrderType::BigEndian);
    tiff[3] = 43;

    let file = MrwBuilder::new().with_ttw(&tiff).build();
    let metadata = parse(&file).unwrap();

    assert!(metadata.diagnostics.mentions("magic"));
    assert!(metadata.exif.contains_key("Exif.Image.Model"));
}

// =============================================================================
// Blocks
// =============================================================================

#[test]
fn test_prd_version_d7() {
    let file = MrwBuilder::new().with_prd(b"27660001").build();
    let metadata = parse(&file).unwrap();

    assert_eq!(metadata.camera(), Some("D7"));
    assert_eq!(metadata.prd.unwrap().version, "27660001");
}

#[test]
fn test_prd_unknown_version() {
    let file = MrwBuilder::new().with_prd(b"99999999").build();
    let metadata = parse(&file).unwrap();

    assert_eq!(metadata.camera(), None);
    assert!(metadata.diagnostics.is_clean());
}

#[test]
fn test_rif_iso_100() {
    let file = MrwBuilder::new().with_rif(&rif_payload()).build();
    let rif = parse(&file).unwrap().rif.unwrap();

    let iso = rif.iso.unwrap();
    assert!((iso - 100.0).abs() < 1e-9, "iso = {}", iso);
}

#[test]
fn test_short_rif_keeps_leading_fields() {
    let file = MrwBuilder::new().with_rif(&rif_payload()[..7]).build();
    let metadata = parse(&file).unwrap();
    let rif = metadata.rif.unwrap();

    assert!(rif.iso.is_some());
    assert_eq!(rif.color_mode, None);
    assert!(metadata.diagnostics.mentions("RIF block ends before offset 7"));
}

#[test]
fn test_unknown_block_is_fatal() {
    let file = MrwBuilder::new()
        .with_prd(b"27820001")
        .with_block(b"\0XYZ", &[0; 4])
        .build();

    match parse(&file) {
        Err(MrwError::UnknownBlock { offset, .. }) => assert_eq!(offset, 8 + 8 + 24),
        other => panic!("expected UnknownBlock, got {:?}", other),
    }
}

#[test]
fn test_not_mrw() {
    assert!(matches!(
        parse(b"MM\x00\x2A\x00\x00\x00\x08"),
        Err(MrwError::InvalidSignature(_))
    ));
    assert!(matches!(parse(b"\0MR"), Err(MrwError::TooSmall { .. })));
}

#[test]
fn test_image_data_start() {
    let file = MrwBuilder::new()
        .with_prd(b"27820001")
        .with_pad(100)
        .with_image_data(512)
        .build();
    let metadata = parse(&file).unwrap();

    assert_eq!(metadata.image_data_start, (file.len() - 512) as u64);
}

#[test]
fn test_prd_payload_is_24_bytes() {
    assert_eq!(prd_payload(b"21810002").len(), 24);
}

// =============================================================================
// Robustness
// =============================================================================

#[test]
fn test_unknown_root_tag_skipped() {
    let metadata = parse(&sample_mrw(ByteOrderType::BigEndian)).unwrap();

    let needle = format!("{:04X}", UNKNOWN_ROOT_TAG);
    assert!(!metadata.exif.iter().any(|e| e.key.contains(&needle)));
    assert!(metadata.diagnostics.is_clean());
    // Entries after it in the same IFD still decoded
    assert!(metadata.exif.contains_key("Exif.Photo.FNumber"));
}

#[test]
fn test_ifd_loop_terminates() {
    let mut image = TiffImage::new(ByteOrderType::BigEndian, 8);
    let end = image.put_ifd(8, &[IfdEntry::new(0x0112, SHORT, 1, EntryValue::Short(6))], 8);
    assert!(image.len() >= end);

    let file = MrwBuilder::new().with_ttw(&image.build()).build();
    let metadata = parse(&file).unwrap();

    assert_eq!(metadata.exif.get_all("Exif.Image.Orientation").count(), 1);
    assert!(metadata.diagnostics.mentions("IFD loop"));
}

#[test]
fn test_ifd_chain_two_directories() {
    let mut image = TiffImage::new(ByteOrderType::LittleEndian, 8);
    image.put_ifd(8, &[IfdEntry::new(0x0112, SHORT, 1, EntryValue::Short(6))], 40);
    image.put_ifd(40, &[IfdEntry::new(0x0128, SHORT, 1, EntryValue::Short(2))], 0);

    let file = MrwBuilder::new().with_ttw(&image.build()).build();
    let metadata = parse(&file).unwrap();

    assert!(metadata.exif.contains_key("Exif.Image.Orientation"));
    assert_eq!(
        metadata.exif.get("Exif.Image.ResolutionUnit"),
        Some(&TagValue::UnsignedShort(vec![2]))
    );
    assert!(metadata.diagnostics.is_clean());
}

#[test]
fn test_deterministic() {
    let file = sample_mrw(ByteOrderType::LittleEndian);
    let first = parse(&file).unwrap();
    let second = parse(&file).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_truncation_never_panics() {
    let file = sample_mrw(ByteOrderType::BigEndian);
    let full = parse(&file).unwrap();

    for len in 0..=file.len() {
        match parse(&file[..len]) {
            Ok(metadata) => assert!(metadata.exif.len() <= full.exif.len()),
            Err(
                MrwError::TooSmall { .. }
                | MrwError::TruncatedBlockHeader { .. }
                | MrwError::InvalidSignature(_),
            ) => {}
            Err(e) => panic!("unexpected error at length {}: {}", len, e),
        }
    }
}

#[test]
fn test_max_size_cap() {
    let file = sample_mrw(ByteOrderType::BigEndian);
    let full = parse(&file).unwrap();

    // Image data is never needed
    let metadata = MrwParser::new()
        .with_max_size(full.image_data_start as usize)
        .parse(&file)
        .unwrap();
    assert_eq!(metadata, full);

    // Cut inside the trailing PAD payload: header intact, nothing lost
    let metadata = MrwParser::new()
        .with_max_size(full.image_data_start as usize - 8)
        .parse(&file)
        .unwrap();
    assert_eq!(metadata.exif, full.exif);
    assert_eq!(metadata.rif, full.rif);
}

#[test]
fn test_metadata_serializes_to_json() {
    let metadata = parse(&sample_mrw(ByteOrderType::BigEndian)).unwrap();
    let json = serde_json::to_value(&metadata).unwrap();

    assert_eq!(json["prd"]["camera"], "Dynax/Maxxum 7D");
    let first = &json["exif"][0];
    assert_eq!(first["key"], "Exif.Image.Make");
    assert_eq!(first["value"]["type"], "ascii");
    assert_eq!(first["value"]["value"], "MINOLTA");
}
